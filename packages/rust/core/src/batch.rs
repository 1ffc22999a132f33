//! Batch mode: find every document under a root and convert them concurrently.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, instrument, warn};
use walkdir::WalkDir;

use md2nb_markdown::ConvertOptions;
use md2nb_shared::{AppConfig, FailurePolicy, Md2nbError, Result};

use crate::convert::{ConvertedDocument, convert_file};

/// Options for a batch run.
#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Per-document conversion options.
    pub convert: ConvertOptions,
    /// Maximum documents converted at once (at least 1).
    pub concurrency: usize,
    /// What to do when a document fails.
    pub on_error: FailurePolicy,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

impl From<&AppConfig> for BatchOptions {
    fn from(config: &AppConfig) -> Self {
        Self {
            convert: ConvertOptions::from(config),
            concurrency: config.batch.concurrency as usize,
            on_error: config.batch.on_error,
        }
    }
}

/// A document that could not be converted.
#[derive(Debug)]
pub struct BatchFailure {
    pub path: PathBuf,
    pub error: Md2nbError,
}

/// Summary of a batch run.
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Converted documents, sorted by source path.
    pub converted: Vec<ConvertedDocument>,
    /// Failed documents, sorted by path. Only filled under [`FailurePolicy::Continue`].
    pub failed: Vec<BatchFailure>,
}

impl BatchReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Progress callback for batch runs.
pub trait ProgressReporter: Send + Sync {
    /// Called once the document list is known.
    fn started(&self, total: usize);
    /// Called as each document finishes, successfully or not.
    fn document_done(&self, path: &Path, current: usize, total: usize);
    /// Called when the batch completes without aborting.
    fn finished(&self, report: &BatchReport);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn started(&self, _total: usize) {}
    fn document_done(&self, _path: &Path, _current: usize, _total: usize) {}
    fn finished(&self, _report: &BatchReport) {}
}

/// Recursively collect files under `root` whose extension is `extension`.
///
/// Directory symlinks are not descended into; symlinks to files are listed
/// under their own name. Results are sorted. Any unreadable directory entry
/// fails the whole walk.
pub fn discover_documents(root: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    let mut documents = Vec::new();

    for entry in WalkDir::new(root).follow_links(false) {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(root).to_path_buf();
            let source = e
                .into_io_error()
                .unwrap_or_else(|| std::io::Error::other("filesystem loop detected"));
            Md2nbError::io(path, source)
        })?;

        let path = entry.path();
        let is_file =
            entry.file_type().is_file() || (entry.path_is_symlink() && path.is_file());
        if is_file && path.extension().is_some_and(|ext| ext == extension) {
            documents.push(path.to_path_buf());
        }
    }

    documents.sort();
    debug!(root = %root.display(), count = documents.len(), "discovered documents");
    Ok(documents)
}

/// Convert every document in `paths`, at most `opts.concurrency` at a time.
///
/// Under [`FailurePolicy::Abort`] the first failure cancels documents still
/// waiting for a permit and is returned. Conversions already running on the
/// blocking pool cannot be cancelled and run to completion, so a notebook may
/// still be written after the error comes back; notebooks already written are
/// kept. Under
/// [`FailurePolicy::Continue`] failures are collected in the report.
#[instrument(skip_all, fields(documents = paths.len(), concurrency = opts.concurrency))]
pub async fn convert_batch(
    paths: Vec<PathBuf>,
    opts: &BatchOptions,
    progress: &dyn ProgressReporter,
) -> Result<BatchReport> {
    let total = paths.len();
    let semaphore = Arc::new(Semaphore::new(opts.concurrency.max(1)));
    let mut tasks = JoinSet::new();

    info!(total, on_error = ?opts.on_error, "starting batch conversion");
    progress.started(total);

    for path in paths {
        let sem = semaphore.clone();
        let convert_opts = opts.convert.clone();

        tasks.spawn(async move {
            let result = match sem.acquire_owned().await {
                Ok(_permit) => {
                    let doc_path = path.clone();
                    tokio::task::spawn_blocking(move || convert_file(&doc_path, &convert_opts))
                        .await
                        .unwrap_or_else(|e| Err(Md2nbError::Task(e.to_string())))
                }
                Err(e) => Err(Md2nbError::Task(e.to_string())),
            };
            (path, result)
        });
    }

    let mut report = BatchReport::default();
    let mut done = 0;

    while let Some(joined) = tasks.join_next().await {
        let (path, result) = joined.map_err(|e| Md2nbError::Task(e.to_string()))?;
        done += 1;
        progress.document_done(&path, done, total);

        match result {
            Ok(doc) => report.converted.push(doc),
            Err(error) => match opts.on_error {
                FailurePolicy::Abort => {
                    tasks.abort_all();
                    warn!(path = %path.display(), %error, "aborting batch");
                    return Err(error);
                }
                FailurePolicy::Continue => {
                    warn!(path = %path.display(), %error, "conversion failed, continuing");
                    report.failed.push(BatchFailure { path, error });
                }
            },
        }
    }

    report.converted.sort_by(|a, b| a.source.cmp(&b.source));
    report.failed.sort_by(|a, b| a.path.cmp(&b.path));

    info!(
        converted = report.converted.len(),
        failed = report.failed.len(),
        "batch conversion complete"
    );
    progress.finished(&report);

    Ok(report)
}
