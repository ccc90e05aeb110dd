//! Document loading: turns a file on disk (or an uploaded DOCX body) into the
//! ordered paragraph sequence the requirement extractor consumes.

pub mod docx;

use crate::domain::error::{AppError, Result};
use std::path::Path;
use tracing::debug;

/// Load paragraphs from a `.docx`, `.txt` or `.md` file.
pub fn load_paragraphs(path: &Path) -> Result<Vec<String>> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase())
        .unwrap_or_default();

    let paragraphs = match extension.as_str() {
        "docx" => {
            let bytes = std::fs::read(path).map_err(|e| {
                AppError::IoError(format!("Failed to read DOCX file {}: {}", path.display(), e))
            })?;
            docx::read_paragraphs(&bytes)?
        }
        "txt" | "md" => {
            let text = std::fs::read_to_string(path).map_err(|e| {
                AppError::IoError(format!("Failed to read text file {}: {}", path.display(), e))
            })?;
            split_lines(&text)
        }
        other => {
            return Err(AppError::ParseError(format!(
                "Unsupported document type '{}' for {}",
                other,
                path.display()
            )))
        }
    };

    debug!(
        path = %path.display(),
        paragraphs = paragraphs.len(),
        "Loaded document"
    );
    Ok(paragraphs)
}

/// Load paragraphs from an in-memory DOCX package.
pub fn load_docx_bytes(bytes: &[u8]) -> Result<Vec<String>> {
    docx::read_paragraphs(bytes)
}

/// Plain text is one paragraph per line.
pub fn split_lines(text: &str) -> Vec<String> {
    text.lines().map(str::to_string).collect()
}
