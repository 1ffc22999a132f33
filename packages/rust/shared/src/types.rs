//! Notebook data model (nbformat v4).

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

/// Major notebook format version written by md2nb.
pub const NBFORMAT: u32 = 4;

/// Minor notebook format version (4.5 introduced cell ids).
pub const NBFORMAT_MINOR: u32 = 5;

// ---------------------------------------------------------------------------
// CellType
// ---------------------------------------------------------------------------

/// Kind of a notebook cell.
///
/// The converter only produces [`CellType::Markdown`]; the other variants exist
/// so notebooks written by other tools can be read back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CellType {
    Markdown,
    Code,
    Raw,
}

impl std::fmt::Display for CellType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Markdown => "markdown",
            Self::Code => "code",
            Self::Raw => "raw",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// Cell
// ---------------------------------------------------------------------------

/// One unit of notebook content.
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub cell_type: CellType,
    /// nbformat 4.5 cell identifier.
    pub id: String,
    /// Cell text as a single string (line splitting happens on write).
    pub source: String,
    pub metadata: Map<String, Value>,
}

impl Cell {
    /// A markdown cell with empty metadata and a deterministic id.
    pub fn markdown(index: usize, source: impl Into<String>) -> Self {
        let source = source.into();
        Self {
            cell_type: CellType::Markdown,
            id: cell_id(index, &source),
            source,
            metadata: Map::new(),
        }
    }
}

/// Deterministic cell id: first 8 hex digits of SHA-256 over `"{index}:{source}"`.
///
/// The position is part of the digest so repeated identical spans still get
/// distinct ids within one notebook.
pub fn cell_id(index: usize, source: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(index.to_string().as_bytes());
    hasher.update(b":");
    hasher.update(source.as_bytes());
    let digest = format!("{:x}", hasher.finalize());
    digest[..8].to_string()
}

// ---------------------------------------------------------------------------
// KernelSpec
// ---------------------------------------------------------------------------

/// Kernel placeholder stored under `metadata.kernelspec`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KernelSpec {
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    pub name: String,
}

// ---------------------------------------------------------------------------
// Notebook
// ---------------------------------------------------------------------------

/// Ordered sequence of cells plus notebook-level metadata.
///
/// Cells can only be appended; once handed to the writer the notebook is
/// treated as frozen.
#[derive(Debug, Clone, PartialEq)]
pub struct Notebook {
    cells: Vec<Cell>,
    metadata: Map<String, Value>,
    nbformat: u32,
    nbformat_minor: u32,
}

impl Default for Notebook {
    fn default() -> Self {
        Self::new()
    }
}

impl Notebook {
    /// An empty v4.5 notebook with empty metadata.
    pub fn new() -> Self {
        Self {
            cells: Vec::new(),
            metadata: Map::new(),
            nbformat: NBFORMAT,
            nbformat_minor: NBFORMAT_MINOR,
        }
    }

    /// Rebuild a notebook from parsed parts.
    pub fn from_parts(
        cells: Vec<Cell>,
        metadata: Map<String, Value>,
        nbformat: u32,
        nbformat_minor: u32,
    ) -> Self {
        Self {
            cells,
            metadata,
            nbformat,
            nbformat_minor,
        }
    }

    /// Record the kernel placeholder in `metadata.kernelspec`.
    pub fn set_kernelspec(&mut self, kernel: &KernelSpec) {
        let mut spec = Map::new();
        spec.insert("display_name".into(), Value::from(kernel.display_name.as_str()));
        if let Some(language) = &kernel.language {
            spec.insert("language".into(), Value::from(language.as_str()));
        }
        spec.insert("name".into(), Value::from(kernel.name.as_str()));
        self.metadata.insert("kernelspec".into(), Value::Object(spec));
    }

    pub fn push_cell(&mut self, cell: Cell) {
        self.cells.push(cell);
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn metadata(&self) -> &Map<String, Value> {
        &self.metadata
    }

    pub fn nbformat(&self) -> u32 {
        self.nbformat
    }

    pub fn nbformat_minor(&self) -> u32 {
        self.nbformat_minor
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}
