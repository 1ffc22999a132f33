//! Single-document conversion: `.md` file in, `.ipynb` sibling out.

use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument};

use md2nb_markdown::ConvertOptions;
use md2nb_shared::{Md2nbError, Notebook, Result};

use crate::ipynb;

/// Notebook file extension.
pub const NOTEBOOK_EXTENSION: &str = "ipynb";

/// Outcome of converting one document.
#[derive(Debug, Clone)]
pub struct ConvertedDocument {
    /// The Markdown document that was read.
    pub source: PathBuf,
    /// The notebook that was written.
    pub output: PathBuf,
    /// Number of cells in the written notebook.
    pub cell_count: usize,
    /// Number of embed markers rewritten.
    pub embed_count: usize,
}

/// Output path for a document: same directory and stem, `.ipynb` extension.
pub fn notebook_path_for(document: &Path) -> PathBuf {
    document.with_extension(NOTEBOOK_EXTENSION)
}

/// Read a Markdown document, convert it, and write the notebook next to it.
///
/// The notebook is either fully written or left untouched.
#[instrument(skip_all, fields(path = %path.display()))]
pub fn convert_file(path: &Path, opts: &ConvertOptions) -> Result<ConvertedDocument> {
    let text = std::fs::read_to_string(path).map_err(|e| Md2nbError::io(path, e))?;

    let result = md2nb_markdown::convert(&text, opts);
    let output = notebook_path_for(path);
    write_notebook(&output, &result.notebook)?;

    info!(
        output = %output.display(),
        cells = result.notebook.len(),
        embeds = result.embed_count,
        "notebook written"
    );

    Ok(ConvertedDocument {
        source: path.to_path_buf(),
        output,
        cell_count: result.notebook.len(),
        embed_count: result.embed_count,
    })
}

/// Serialize `notebook` and write it to `path` atomically (temp file, then rename).
pub fn write_notebook(path: &Path, notebook: &Notebook) -> Result<()> {
    let json = ipynb::to_ipynb_string(notebook)?;

    let file_name = path
        .file_name()
        .ok_or_else(|| Md2nbError::validation(format!("{} has no file name", path.display())))?
        .to_string_lossy();
    let temp = path.with_file_name(format!(".{file_name}.{}.tmp", uuid::Uuid::now_v7()));

    if let Err(e) = std::fs::write(&temp, &json) {
        let _ = std::fs::remove_file(&temp);
        return Err(Md2nbError::io(&temp, e));
    }

    if let Err(e) = std::fs::rename(&temp, path) {
        let _ = std::fs::remove_file(&temp);
        return Err(Md2nbError::io(path, e));
    }

    debug!(path = %path.display(), bytes = json.len(), "wrote notebook file");
    Ok(())
}

/// Read and parse a notebook file.
pub fn read_notebook(path: &Path) -> Result<Notebook> {
    let json = std::fs::read_to_string(path).map_err(|e| Md2nbError::io(path, e))?;
    ipynb::from_ipynb_str(&json)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "md2nb-convert-test-{}",
            uuid::Uuid::now_v7()
        ));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn notebook_path_keeps_directory_and_stem() {
        assert_eq!(
            notebook_path_for(Path::new("units/C1U1_Intro.md")),
            PathBuf::from("units/C1U1_Intro.ipynb")
        );
        assert_eq!(
            notebook_path_for(Path::new("notes.v2.md")),
            PathBuf::from("notes.v2.ipynb")
        );
    }

    #[test]
    fn convert_file_writes_sibling_notebook() {
        let tmp = temp_dir();
        let md = tmp.join("multiple_sections_test.md");
        std::fs::write(
            &md,
            "# Multiple Sections Test\n\n## Introduction\n\n## Another Section\n\nThe end.\n",
        )
        .unwrap();

        let doc = convert_file(&md, &ConvertOptions::default()).unwrap();
        assert_eq!(doc.output, tmp.join("multiple_sections_test.ipynb"));
        assert_eq!(doc.cell_count, 4);
        assert_eq!(doc.embed_count, 0);

        let nb = read_notebook(&doc.output).unwrap();
        assert_eq!(nb.len(), 4);
        assert!(nb.cells()[0].source.contains("Multiple Sections Test"));
        assert!(nb.cells()[1].source.contains("Introduction"));
        assert!(nb.cells()[2].source.contains("Another Section"));

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn convert_file_rewrites_embeds() {
        let tmp = temp_dir();
        let md = tmp.join("custom_dimension_embedding_test.md");
        std::fs::write(
            &md,
            "# Custom Dimension Embedding Test\n\nIntro.\n\n[Embed-800x500](https://jackliddy.github.io/designTest1)\n\nOutro.",
        )
        .unwrap();

        let doc = convert_file(&md, &ConvertOptions::default()).unwrap();
        assert_eq!(doc.embed_count, 1);

        let nb = read_notebook(&doc.output).unwrap();
        assert_eq!(
            nb.cells()[2].source,
            r#"<iframe src="https://jackliddy.github.io/designTest1" width="800" height="500"></iframe>"#
        );

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn convert_file_overwrites_existing_notebook() {
        let tmp = temp_dir();
        let md = tmp.join("doc.md");
        std::fs::write(tmp.join("doc.ipynb"), "stale").unwrap();
        std::fs::write(&md, "fresh").unwrap();

        convert_file(&md, &ConvertOptions::default()).unwrap();
        let nb = read_notebook(&tmp.join("doc.ipynb")).unwrap();
        assert_eq!(nb.cells()[0].source, "fresh");

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn missing_document_is_io_error() {
        let tmp = temp_dir();
        let err = convert_file(&tmp.join("nope.md"), &ConvertOptions::default()).unwrap_err();
        assert!(matches!(err, Md2nbError::Io { .. }));
        assert!(!tmp.join("nope.ipynb").exists());

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn non_utf8_document_is_encoding_error() {
        let tmp = temp_dir();
        let md = tmp.join("latin1.md");
        std::fs::write(&md, [b'c', b'a', b'f', 0xe9]).unwrap();

        let err = convert_file(&md, &ConvertOptions::default()).unwrap_err();
        assert!(matches!(err, Md2nbError::Encoding { .. }));
        assert!(!tmp.join("latin1.ipynb").exists());

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn write_leaves_no_temp_files() {
        let tmp = temp_dir();
        write_notebook(&tmp.join("out.ipynb"), &Notebook::new()).unwrap();

        for entry in std::fs::read_dir(&tmp).unwrap() {
            let name = entry.unwrap().file_name().to_string_lossy().to_string();
            assert!(!name.starts_with('.'), "temp file left behind: {name}");
        }

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn failed_write_creates_nothing() {
        let tmp = temp_dir();
        let target = tmp.join("missing-dir").join("out.ipynb");

        let err = write_notebook(&target, &Notebook::new()).unwrap_err();
        assert!(matches!(err, Md2nbError::Io { .. }));
        assert!(!target.exists());

        let _ = std::fs::remove_dir_all(&tmp);
    }
}
