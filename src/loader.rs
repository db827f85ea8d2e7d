//! Reading workflow documents from disk.
//!
//! Files are YAML (JSON parses too) and may hold several `---` separated
//! documents. A file pasted from Markdown may still be wrapped in a code
//! fence; the fence lines are dropped before parsing.

use serde::Deserialize;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while reading a document.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("{} contains no document", path.display())]
    Empty { path: PathBuf },
}

/// Removes a surrounding Markdown code fence, if any.
///
/// ```
/// use nagare::loader::strip_code_fence;
///
/// let text = "```yaml\nstart: a\n```\n";
/// assert_eq!(strip_code_fence(text), "start: a");
/// assert_eq!(strip_code_fence("start: a\n"), "start: a\n");
/// ```
pub fn strip_code_fence(text: &str) -> String {
    if !text.trim_start().starts_with("```") {
        return text.to_string();
    }

    let mut lines: Vec<&str> = text.lines().collect();
    if lines.first().is_some_and(|line| line.starts_with("```")) {
        lines.remove(0);
    }
    if lines.last().is_some_and(|line| line.starts_with("```")) {
        lines.pop();
    }
    lines.join("\n")
}

/// Parses every non-empty document in `text`.
pub fn parse_documents(text: &str) -> Result<Vec<Value>, LoadError> {
    let text = strip_code_fence(text);
    let mut documents = Vec::new();
    for document in serde_yaml::Deserializer::from_str(&text) {
        let value = Value::deserialize(document)?;
        if !value.is_null() {
            documents.push(value);
        }
    }
    Ok(documents)
}

/// Reads and parses every document of the file at `path`.
pub fn load_documents(path: impl AsRef<Path>) -> Result<Vec<Value>, LoadError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_documents(&text)
}

/// Reads the first document of the file at `path`.
pub fn load_document(path: impl AsRef<Path>) -> Result<Value, LoadError> {
    let path = path.as_ref();
    load_documents(path)?
        .into_iter()
        .next()
        .ok_or_else(|| LoadError::Empty {
            path: path.to_path_buf(),
        })
}
