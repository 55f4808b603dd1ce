//! PDF statement extraction using lopdf and pdf-extract.

use lopdf::Document;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::text_table::split_rows;
use super::TableExtractor;
use crate::error::ExtractError;
use crate::models::table::RawTable;
use crate::statement::HeaderResolver;

/// Whether a PDF needs a password to be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LockStatus {
    Unlocked,
    Locked,
}

impl LockStatus {
    pub fn is_locked(&self) -> bool {
        matches!(self, LockStatus::Locked)
    }
}

/// Extracts statement rows from PDF text.
#[derive(Debug, Clone)]
pub struct PdfTableExtractor {
    password: Option<String>,
    min_column_gap: usize,
    header: HeaderResolver,
}

impl PdfTableExtractor {
    /// Create an extractor without a password.
    pub fn new() -> Self {
        Self {
            password: None,
            min_column_gap: 2,
            header: HeaderResolver::new(),
        }
    }

    /// Set the password used to decrypt protected documents.
    pub fn with_password(mut self, password: Option<String>) -> Self {
        self.password = password.filter(|p| !p.is_empty());
        self
    }

    /// Set the minimum run of spaces that separates two cells.
    pub fn with_min_column_gap(mut self, min_column_gap: usize) -> Self {
        self.min_column_gap = min_column_gap;
        self
    }

    /// Set the resolver that picks the header line whose layout data
    /// lines are aligned to.
    pub fn with_header_resolver(mut self, header: HeaderResolver) -> Self {
        self.header = header;
        self
    }

    /// Report whether the document opens without a password.
    pub fn lock_status(data: &[u8]) -> Result<LockStatus, ExtractError> {
        match open_document(data, None) {
            Ok(_) => Ok(LockStatus::Unlocked),
            Err(ExtractError::PasswordRequired) => Ok(LockStatus::Locked),
            Err(e) => Err(e),
        }
    }

    /// Check that `password` opens the document and its text is readable.
    pub fn verify_password(data: &[u8], password: &str) -> bool {
        open_document(data, Some(password))
            .and_then(|plain| extract_text(&plain))
            .is_ok()
    }
}

impl Default for PdfTableExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl TableExtractor for PdfTableExtractor {
    fn extract_table(&self, data: &[u8]) -> Result<RawTable, ExtractError> {
        let plain = open_document(data, self.password.as_deref())?;
        let text = extract_text(&plain)?;
        let table = split_rows(&text, self.min_column_gap, &self.header);

        debug!("Extracted {} text rows from PDF", table.len());
        Ok(table)
    }
}

/// Load a PDF, decrypting it when needed, and return unencrypted bytes.
fn open_document(data: &[u8], password: Option<&str>) -> Result<Vec<u8>, ExtractError> {
    let mut doc = Document::load_mem(data).map_err(|e| {
        let message = e.to_string();
        if mentions_password(&message) {
            ExtractError::PasswordRequired
        } else {
            ExtractError::Corrupt(message)
        }
    })?;

    let plain = if doc.is_encrypted() {
        if doc.decrypt(password.unwrap_or("")).is_err() {
            return Err(ExtractError::PasswordRequired);
        }
        debug!("Decrypted PDF ({} password)", if password.is_some() { "supplied" } else { "empty" });

        let mut decrypted = Vec::new();
        doc.save_to(&mut decrypted)
            .map_err(|e| ExtractError::Corrupt(format!("failed to save decrypted PDF: {}", e)))?;
        decrypted
    } else {
        data.to_vec()
    };

    if doc.get_pages().is_empty() {
        return Err(ExtractError::NoPages);
    }

    Ok(plain)
}

fn extract_text(plain: &[u8]) -> Result<String, ExtractError> {
    pdf_extract::extract_text_from_mem(plain).map_err(|e| {
        let message = e.to_string();
        if mentions_password(&message) {
            ExtractError::PasswordRequired
        } else {
            ExtractError::Corrupt(message)
        }
    })
}

fn mentions_password(message: &str) -> bool {
    let message = message.to_lowercase();
    ["password", "encrypt", "decrypt"]
        .iter()
        .any(|kw| message.contains(kw))
}
