//! md2nb CLI: convert Markdown documents into Jupyter notebooks.
//!
//! With a path, converts that one document and prints the notebook path.
//! Without one, converts every Markdown document under the batch root.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
