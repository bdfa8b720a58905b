//! Corpus loading: turns the files of a folder into plain-text documents.
//!
//! | Extension | Handling |
//! |-----------|----------|
//! | `.txt`, `.md` | read as UTF-8 |
//! | `.docx` | text of `word/document.xml`, one line per paragraph |
//! | `.pdf` | text of every page, in page order |
//!
//! Everything else is ignored silently. A PDF with no extractable text
//! (scanned pages) is skipped with a warning.

use regex::Regex;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use supportdesk_core::error::RetrievalError;
use tracing::{debug, warn};

/// A loaded source document.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// File the text came from
    pub source: PathBuf,
    /// Extracted plain text
    pub content: String,
}

static XML_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").unwrap());

/// Load every supported document in `folder`.
///
/// Files are visited in name order so chunk ids are stable across rebuilds.
pub fn load_documents(folder: &Path, recursive: bool) -> Result<Vec<Document>, RetrievalError> {
    if !folder.is_dir() {
        return Err(RetrievalError::CorpusUnavailable {
            path: folder.to_path_buf(),
        });
    }

    let mut docs = Vec::new();
    visit(folder, recursive, &mut docs)?;
    debug!(folder = %folder.display(), count = docs.len(), "Loaded corpus documents");
    Ok(docs)
}

fn visit(dir: &Path, recursive: bool, docs: &mut Vec<Document>) -> Result<(), RetrievalError> {
    let read_err = |e: std::io::Error| RetrievalError::Load {
        path: dir.to_path_buf(),
        reason: e.to_string(),
    };

    let mut entries: Vec<PathBuf> = std::fs::read_dir(dir)
        .map_err(read_err)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .collect();
    entries.sort();

    for path in entries {
        if path.is_dir() {
            if recursive {
                visit(&path, recursive, docs)?;
            }
            continue;
        }

        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();

        let content = match ext.as_str() {
            "txt" | "md" => read_text(&path)?,
            "docx" => read_docx(&path)?,
            "pdf" => {
                let text = read_pdf(&path)?;
                if text.trim().is_empty() {
                    warn!(path = %path.display(), "Skipping PDF: no extractable text");
                    continue;
                }
                text
            }
            _ => continue,
        };

        docs.push(Document {
            source: path,
            content,
        });
    }

    Ok(())
}

fn read_text(path: &Path) -> Result<String, RetrievalError> {
    std::fs::read_to_string(path).map_err(|e| RetrievalError::Load {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

/// Extract paragraph text from a Word document.
fn read_docx(path: &Path) -> Result<String, RetrievalError> {
    let load_err = |reason: String| RetrievalError::Load {
        path: path.to_path_buf(),
        reason,
    };

    let file = std::fs::File::open(path).map_err(|e| load_err(e.to_string()))?;
    let mut archive = zip::ZipArchive::new(file).map_err(|e| load_err(e.to_string()))?;
    let mut entry = archive
        .by_name("word/document.xml")
        .map_err(|e| load_err(format!("word/document.xml: {e}")))?;

    let mut xml = String::new();
    entry
        .read_to_string(&mut xml)
        .map_err(|e| load_err(e.to_string()))?;

    Ok(docx_xml_to_text(&xml))
}

fn read_pdf(path: &Path) -> Result<String, RetrievalError> {
    let bytes = std::fs::read(path).map_err(|e| RetrievalError::Load {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    let text = pdf_extract::extract_text_from_mem(&bytes).map_err(|e| RetrievalError::Load {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    Ok(text.trim().to_string())
}

/// Convert WordprocessingML to text: paragraphs and breaks become newlines.
pub(crate) fn docx_xml_to_text(xml: &str) -> String {
    let marked = xml
        .replace("</w:p>", "\n")
        .replace("<w:br/>", "\n")
        .replace("<w:tab/>", "\t");
    let stripped = XML_TAG.replace_all(&marked, "");
    unescape_xml(&stripped).trim_end().to_string()
}

fn unescape_xml(s: &str) -> String {
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}
