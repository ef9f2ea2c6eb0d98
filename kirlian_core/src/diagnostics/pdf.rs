use std::fs;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;

use crate::error::{KirlianError, KirlianResult};

/// Extract the plain text of every page of an in-memory PDF.
pub fn extract_text(bytes: &[u8]) -> KirlianResult<String> {
    // pdf-extract panics on some malformed documents instead of erroring.
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        pdf_extract::extract_text_from_mem(bytes)
    }));

    let text = match outcome {
        Ok(Ok(text)) => text,
        Ok(Err(err)) => {
            tracing::warn!(error = %err, "PDF text extraction failed");
            return Err(KirlianError::Pdf(err.to_string()));
        }
        Err(_) => {
            tracing::warn!("PDF text extraction aborted on a malformed document");
            return Err(KirlianError::Pdf("malformed document".into()));
        }
    };

    if text.trim().is_empty() {
        tracing::warn!(bytes = bytes.len(), "PDF contains no extractable text");
        return Err(KirlianError::Pdf("document contains no text".into()));
    }
    tracing::debug!(chars = text.chars().count(), "extracted PDF text");
    Ok(text)
}

pub fn extract_text_from_file<P: AsRef<Path>>(path: P) -> KirlianResult<String> {
    let bytes = fs::read(path.as_ref())?;
    extract_text(&bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn garbage_input_is_an_error() {
        assert!(matches!(
            extract_text(b"definitely not a pdf"),
            Err(KirlianError::Pdf(_))
        ));
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = extract_text_from_file(dir.path().join("absent.pdf"));
        assert!(matches!(result, Err(KirlianError::Io(_))));
    }
}
