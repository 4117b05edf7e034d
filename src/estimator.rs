//! Best-effort word count for an uploaded script.
//!
//! Plain text is counted by whitespace tokens. Word documents have markup
//! stripped first. Content that cannot be decoded falls back to a random
//! estimate, so callers must not rely on an exact figure.

use std::{
    fs,
    io,
    path::{Path, PathBuf},
};

use log::{error, warn};
use once_cell::sync::Lazy;
use rand::Rng;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Range of the fallback estimate for unreadable documents.
pub const FALLBACK_WORDS: std::ops::Range<u32> = 100..600;

static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").expect("valid tag regex"));
static NON_WORD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w\s]").expect("valid regex"));

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DocumentInfo {
    pub name: String,
    pub word_count: u32,
}

/// Upload failures; shown to the user as retryable.
#[derive(Debug, Error)]
pub enum EstimateError {
    #[error("No script selected")]
    NoFile,
    #[error("Failed to upload script {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    PlainText,
    Word,
    Other,
}

impl DocumentKind {
    pub fn from_path(path: &Path) -> Self {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);
        match extension.as_deref() {
            Some("txt") => DocumentKind::PlainText,
            Some("doc") | Some("docx") => DocumentKind::Word,
            _ => DocumentKind::Other,
        }
    }
}

/// Reads the selected file and estimates its word count.
pub fn estimate(path: Option<&Path>) -> Result<DocumentInfo, EstimateError> {
    let path = path.ok_or(EstimateError::NoFile)?;
    let bytes = fs::read(path).map_err(|source| {
        error!("Error uploading document {}: {source}", path.display());
        EstimateError::Read {
            path: path.to_path_buf(),
            source,
        }
    })?;

    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    let word_count = match parse_document(&bytes, DocumentKind::from_path(path)) {
        Ok(count) => count,
        Err(err) => {
            warn!("Error parsing document {name}, using an estimate: {err}");
            fallback_word_count(&mut rand::thread_rng())
        }
    };

    Ok(DocumentInfo { name, word_count })
}

pub fn parse_document(bytes: &[u8], kind: DocumentKind) -> Result<u32, std::str::Utf8Error> {
    let text = std::str::from_utf8(bytes)?;
    let count = match kind {
        DocumentKind::Word => {
            let without_tags = TAG_RE.replace_all(text, " ");
            let cleaned = NON_WORD_RE.replace_all(&without_tags, " ");
            count_words(&cleaned)
        }
        DocumentKind::PlainText | DocumentKind::Other => count_words(text),
    };
    Ok(count)
}

pub fn count_words(text: &str) -> u32 {
    text.split_whitespace().count() as u32
}

pub fn fallback_word_count<R: Rng + ?Sized>(rng: &mut R) -> u32 {
    rng.gen_range(FALLBACK_WORDS)
}
