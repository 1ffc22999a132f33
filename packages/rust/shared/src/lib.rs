//! Shared types, error model, and configuration for md2nb.
//!
//! This crate is the foundation depended on by all other md2nb crates.
//! It provides:
//! - [`Md2nbError`], the unified error type
//! - The notebook data model ([`Notebook`], [`Cell`], [`CellType`], [`KernelSpec`])
//! - Configuration ([`AppConfig`], [`BatchConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, BatchConfig, ConvertConfig, FailurePolicy, NotebookConfig, config_dir,
    config_file_path, init_config, load_config, load_config_from,
};
pub use error::{Md2nbError, Result};
pub use types::{
    Cell, CellType, KernelSpec, NBFORMAT, NBFORMAT_MINOR, Notebook, cell_id,
};
