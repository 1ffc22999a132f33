//! Application configuration for md2nb.
//!
//! User config lives at `~/.md2nb/md2nb.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Md2nbError, Result};
use crate::types::KernelSpec;

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "md2nb.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".md2nb";

// ---------------------------------------------------------------------------
// Config structs (matching md2nb.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Conversion settings.
    #[serde(default)]
    pub convert: ConvertConfig,

    /// Batch-mode settings.
    #[serde(default)]
    pub batch: BatchConfig,

    /// Notebook-level metadata.
    #[serde(default)]
    pub notebook: NotebookConfig,
}

/// `[convert]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConvertConfig {
    /// Drop spans that are empty strings instead of emitting empty cells.
    #[serde(default)]
    pub drop_empty_cells: bool,
}

/// `[batch]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Directory walked for documents when no path is given.
    #[serde(default = "default_root")]
    pub root: String,

    /// Document file extension, without the dot.
    #[serde(default = "default_extension")]
    pub extension: String,

    /// Maximum documents converted at once.
    #[serde(default = "default_concurrency")]
    pub concurrency: u32,

    /// What to do when one document fails.
    #[serde(default)]
    pub on_error: FailurePolicy,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            extension: default_extension(),
            concurrency: default_concurrency(),
            on_error: FailurePolicy::default(),
        }
    }
}

fn default_root() -> String {
    ".".into()
}
fn default_extension() -> String {
    "md".into()
}
fn default_concurrency() -> u32 {
    4
}

/// Batch failure policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Stop at the first failing document and return its error.
    #[default]
    Abort,
    /// Convert every document possible, then report all failures.
    Continue,
}

/// `[notebook]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NotebookConfig {
    /// Kernel written into `metadata.kernelspec`. Omitted when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kernelspec: Option<KernelSpec>,
}

impl AppConfig {
    /// Reject values that would make a run meaningless.
    pub fn validate(&self) -> Result<()> {
        if self.batch.concurrency == 0 {
            return Err(Md2nbError::config("batch.concurrency must be at least 1"));
        }
        let ext = self.batch.extension.trim();
        if ext.is_empty() || ext.starts_with('.') {
            return Err(Md2nbError::config(format!(
                "batch.extension must be a bare extension like \"md\", got {:?}",
                self.batch.extension
            )));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.md2nb/`).
pub fn config_dir() -> Result<PathBuf> {
    let home =
        dirs::home_dir().ok_or_else(|| Md2nbError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.md2nb/md2nb.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| Md2nbError::io(path, e))?;

    let config: AppConfig = toml::from_str(&content)
        .map_err(|e| Md2nbError::config(format!("failed to parse {}: {e}", path.display())))?;
    config.validate()?;
    Ok(config)
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| Md2nbError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content = toml::to_string_pretty(&config).map_err(|e| Md2nbError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| Md2nbError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}
