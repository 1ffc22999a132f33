//! Markdown-to-notebook conversion.
//!
//! Splits a Markdown document into spans on blank lines, rewrites embed links in
//! each span, and collects the spans as markdown cells of a [`Notebook`].
//! Everything here is pure: no I/O and no process-wide state.

pub mod embed;
mod segment;

use tracing::debug;

use md2nb_shared::{AppConfig, Cell, KernelSpec, Notebook};

pub use embed::{EmbedMarker, find_embeds, rewrite_embeds};
pub use segment::SPAN_BOUNDARY;

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// Options for the Markdown-to-notebook conversion.
#[derive(Debug, Clone, Default)]
pub struct ConvertOptions {
    /// Drop spans that are empty strings. Off by default: leading, trailing
    /// and doubled blank lines then show up as empty cells.
    pub drop_empty_cells: bool,
    /// Kernel placeholder written to notebook metadata, if any.
    pub kernelspec: Option<KernelSpec>,
}

impl From<&AppConfig> for ConvertOptions {
    fn from(config: &AppConfig) -> Self {
        Self {
            drop_empty_cells: config.convert.drop_empty_cells,
            kernelspec: config.notebook.kernelspec.clone(),
        }
    }
}

/// Result of converting a Markdown document.
#[derive(Debug, Clone)]
pub struct ConvertResult {
    /// The assembled notebook.
    pub notebook: Notebook,
    /// Number of spans produced by the boundary rule (before any dropping).
    pub span_count: usize,
    /// Number of embed markers rewritten across all cells.
    pub embed_count: usize,
}

// ---------------------------------------------------------------------------
// Converter
// ---------------------------------------------------------------------------

/// Convert Markdown text to a notebook.
pub fn md_to_notebook(text: &str, opts: &ConvertOptions) -> Notebook {
    convert(text, opts).notebook
}

/// Convert Markdown text to a notebook, reporting span and embed counts.
///
/// 1. Split the text on blank lines
/// 2. Rewrite embed markers in each span
/// 3. Append one markdown cell per span, in order
pub fn convert(text: &str, opts: &ConvertOptions) -> ConvertResult {
    let mut notebook = Notebook::new();
    if let Some(kernel) = &opts.kernelspec {
        notebook.set_kernelspec(kernel);
    }

    let spans = segment::split_spans(text);
    let span_count = spans.len();
    let mut embed_count = 0;

    for span in spans {
        if opts.drop_empty_cells && span.is_empty() {
            continue;
        }
        embed_count += find_embeds(span).len();
        let source = rewrite_embeds(span);
        notebook.push_cell(Cell::markdown(notebook.len(), source));
    }

    debug!(
        span_count,
        cell_count = notebook.len(),
        embed_count,
        "markdown converted to notebook"
    );

    ConvertResult {
        notebook,
        span_count,
        embed_count,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
