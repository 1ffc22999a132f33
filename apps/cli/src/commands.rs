//! CLI definition, routing, and tracing setup.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use md2nb_core::batch::{BatchOptions, BatchReport, ProgressReporter, convert_batch, discover_documents};
use md2nb_core::convert::{convert_file, read_notebook};
use md2nb_markdown::ConvertOptions;
use md2nb_shared::{AppConfig, FailurePolicy, Md2nbError, init_config, load_config, load_config_from};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// md2nb: turn Markdown documents into Jupyter notebooks.
#[derive(Parser)]
#[command(
    name = "md2nb",
    version,
    about = "Convert Markdown documents into Jupyter notebooks, one markdown cell per paragraph.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Markdown document to convert. Omit to convert every document under the batch root.
    pub path: Option<PathBuf>,

    /// Config file (defaults to ~/.md2nb/md2nb.toml).
    #[arg(long, env = "MD2NB_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Drop empty cells produced by leading, trailing or doubled blank lines.
    #[arg(long)]
    pub drop_empty: bool,

    /// In batch mode, convert every document possible and report failures at the end.
    #[arg(long)]
    pub keep_going: bool,

    /// Maximum documents converted at once in batch mode.
    #[arg(short, long)]
    pub jobs: Option<u32>,

    /// Directory walked in batch mode (defaults to the current directory).
    #[arg(long)]
    pub root: Option<PathBuf>,

    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Auxiliary subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Parse a notebook and print its cell count.
    Check {
        /// Notebook file to read.
        notebook: PathBuf,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
///
/// Logs go to stderr: stdout carries only the notebook path in single-file mode.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "md2nb=info",
        1 => "md2nb=debug",
        _ => "md2nb=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match &cli.command {
        Some(Command::Check { notebook }) => cmd_check(notebook),
        Some(Command::Config { action }) => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(&cli),
        },
        None => {
            let config = resolve_config(&cli)?;
            match &cli.path {
                Some(path) => cmd_convert(path, &config),
                None => cmd_batch(&config).await,
            }
        }
    }
}

/// Load the config file, then let CLI flags override it.
fn resolve_config(cli: &Cli) -> Result<AppConfig> {
    let mut config = match &cli.config {
        Some(path) => load_config_from(path)?,
        None => load_config()?,
    };

    if cli.drop_empty {
        config.convert.drop_empty_cells = true;
    }
    if cli.keep_going {
        config.batch.on_error = FailurePolicy::Continue;
    }
    if let Some(jobs) = cli.jobs {
        config.batch.concurrency = jobs;
    }
    if let Some(root) = &cli.root {
        config.batch.root = root.to_string_lossy().into_owned();
    }

    config.validate()?;
    Ok(config)
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

fn cmd_convert(path: &Path, config: &AppConfig) -> Result<()> {
    let opts = ConvertOptions::from(config);
    let doc = convert_file(path, &opts)?;

    // The only stdout output: callers capture it.
    println!("{}", doc.output.display());
    Ok(())
}

async fn cmd_batch(config: &AppConfig) -> Result<()> {
    let root = PathBuf::from(&config.batch.root);
    let paths = discover_documents(&root, &config.batch.extension)?;

    info!(
        root = %root.display(),
        documents = paths.len(),
        "converting documents"
    );

    let opts = BatchOptions::from(config);
    let reporter = CliProgress::new();
    let report = convert_batch(paths, &opts, &reporter).await;
    reporter.clear();
    let report = report?;

    for failure in &report.failed {
        eprintln!("  failed: {}: {}", failure.path.display(), failure.error);
    }

    println!();
    println!("  Converted: {}", report.converted.len());
    println!("  Failed:    {}", report.failed.len());
    println!(
        "  Cells:     {}",
        report.converted.iter().map(|d| d.cell_count).sum::<usize>()
    );
    println!();

    if !report.is_success() {
        return Err(Md2nbError::Batch {
            failed: report.failed.len(),
        }
        .into());
    }

    Ok(())
}

fn cmd_check(notebook: &Path) -> Result<()> {
    let nb = read_notebook(notebook)?;
    println!(
        "{}: nbformat {}.{}, {} cell(s)",
        notebook.display(),
        nb.nbformat(),
        nb.nbformat_minor(),
        nb.len()
    );
    Ok(())
}

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show(cli: &Cli) -> Result<()> {
    let config = resolve_config(cli)?;
    let toml_str = toml::to_string_pretty(&config)
        .map_err(|e| eyre!("failed to render config: {e}"))?;
    println!("{toml_str}");
    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// Batch progress bar drawn on stderr.
struct CliProgress {
    bar: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let bar = ProgressBar::new(0);
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} [{pos}/{len}] {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        Self { bar }
    }

    fn clear(&self) {
        self.bar.finish_and_clear();
    }
}

impl ProgressReporter for CliProgress {
    fn started(&self, total: usize) {
        self.bar.set_length(total as u64);
        self.bar.set_message("Converting");
    }

    fn document_done(&self, path: &Path, current: usize, _total: usize) {
        self.bar.set_position(current as u64);
        self.bar.set_message(path.display().to_string());
    }

    fn finished(&self, _report: &BatchReport) {
        self.bar.finish_and_clear();
    }
}
