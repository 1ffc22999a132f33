//! nbformat v4 JSON encoding.
//!
//! Output matches Python's `nbformat.writes` byte for byte: one-space indent,
//! sorted keys, raw UTF-8, and `source` split into a list of lines the way
//! `str.splitlines(keepends=True)` splits them.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use md2nb_shared::{Cell, CellType, Md2nbError, NBFORMAT, Notebook, Result, cell_id};

// ---------------------------------------------------------------------------
// Wire structs (field order = sorted key order)
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct WireNotebook<'a> {
    cells: Vec<WireCell<'a>>,
    metadata: &'a Map<String, Value>,
    nbformat: u32,
    nbformat_minor: u32,
}

#[derive(Serialize)]
struct WireCell<'a> {
    cell_type: CellType,
    #[serde(skip_serializing_if = "Option::is_none")]
    execution_count: Option<Value>,
    id: &'a str,
    metadata: &'a Map<String, Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    outputs: Option<Vec<Value>>,
    source: Vec<&'a str>,
}

impl<'a> From<&'a Cell> for WireCell<'a> {
    fn from(cell: &'a Cell) -> Self {
        let is_code = cell.cell_type == CellType::Code;
        Self {
            cell_type: cell.cell_type,
            execution_count: is_code.then_some(Value::Null),
            id: &cell.id,
            metadata: &cell.metadata,
            outputs: is_code.then(Vec::new),
            source: split_lines(&cell.source),
        }
    }
}

#[derive(Deserialize)]
struct ParsedNotebook {
    #[serde(default)]
    cells: Vec<ParsedCell>,
    #[serde(default)]
    metadata: Map<String, Value>,
    nbformat: u32,
    #[serde(default)]
    nbformat_minor: u32,
}

#[derive(Deserialize)]
struct ParsedCell {
    cell_type: CellType,
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    metadata: Map<String, Value>,
    #[serde(default)]
    source: MultilineString,
}

/// nbformat allows `source` as one string or a list of line strings.
#[derive(Deserialize)]
#[serde(untagged)]
enum MultilineString {
    One(String),
    Lines(Vec<String>),
}

impl Default for MultilineString {
    fn default() -> Self {
        Self::One(String::new())
    }
}

impl MultilineString {
    fn into_string(self) -> String {
        match self {
            Self::One(s) => s,
            Self::Lines(lines) => lines.concat(),
        }
    }
}

// ---------------------------------------------------------------------------
// Encoding / decoding
// ---------------------------------------------------------------------------

/// Serialize a notebook to nbformat v4 JSON (no trailing newline).
pub fn to_ipynb_string(notebook: &Notebook) -> Result<String> {
    let wire = WireNotebook {
        cells: notebook.cells().iter().map(WireCell::from).collect(),
        metadata: notebook.metadata(),
        nbformat: notebook.nbformat(),
        nbformat_minor: notebook.nbformat_minor(),
    };

    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b" ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    wire.serialize(&mut ser)?;

    String::from_utf8(buf).map_err(|e| Md2nbError::Serialization(e.to_string()))
}

/// Parse nbformat v4 JSON into a [`Notebook`].
///
/// Cells without an id (nbformat < 4.5) get a deterministic one.
pub fn from_ipynb_str(json: &str) -> Result<Notebook> {
    let parsed: ParsedNotebook = serde_json::from_str(json)?;

    if parsed.nbformat != NBFORMAT {
        return Err(Md2nbError::validation(format!(
            "unsupported nbformat {} (expected {NBFORMAT})",
            parsed.nbformat
        )));
    }

    let cells = parsed
        .cells
        .into_iter()
        .enumerate()
        .map(|(index, cell)| {
            let source = cell.source.into_string();
            Cell {
                cell_type: cell.cell_type,
                id: cell.id.unwrap_or_else(|| cell_id(index, &source)),
                source,
                metadata: cell.metadata,
            }
        })
        .collect();

    Ok(Notebook::from_parts(
        cells,
        parsed.metadata,
        parsed.nbformat,
        parsed.nbformat_minor,
    ))
}

/// Split text into lines, keeping terminators, with Python `str.splitlines`
/// boundaries. Empty text yields no lines.
pub fn split_lines(text: &str) -> Vec<&str> {
    let mut lines = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        let end = match c {
            '\r' => match chars.peek() {
                Some(&(_, '\n')) => {
                    chars.next();
                    i + 2
                }
                _ => i + 1,
            },
            '\n' | '\x0b' | '\x0c' | '\x1c' | '\x1d' | '\x1e' | '\u{85}' | '\u{2028}'
            | '\u{2029}' => i + c.len_utf8(),
            _ => continue,
        };
        lines.push(&text[start..end]);
        start = end;
    }

    if start < text.len() {
        lines.push(&text[start..]);
    }
    lines
}
