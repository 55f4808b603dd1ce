//! Error types for the bankflow-core library.

use thiserror::Error;

/// Main error type for the bankflow library.
#[derive(Error, Debug)]
pub enum BankflowError {
    /// Table extraction error.
    #[error("extraction error: {0}")]
    Extract(#[from] ExtractError),

    /// Conversion error.
    #[error("conversion error: {0}")]
    Convert(#[from] ConvertError),

    /// XML serialization error.
    #[error("XML error: {0}")]
    Xml(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised while turning a source document into a raw table.
#[derive(Error, Debug)]
pub enum ExtractError {
    /// The document is access-protected and needs a password.
    #[error("document is password protected")]
    PasswordRequired,

    /// The document could not be parsed.
    #[error("corrupt document: {0}")]
    Corrupt(String),

    /// The input is neither a PDF nor a recognized spreadsheet.
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    /// The spreadsheet could not be decoded.
    #[error("failed to decode spreadsheet: {0}")]
    Spreadsheet(String),

    /// CSV decoding error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// The PDF is empty or has no pages.
    #[error("PDF has no pages")]
    NoPages,
}

impl ExtractError {
    /// Whether the caller can recover by supplying a password.
    pub fn needs_password(&self) -> bool {
        matches!(self, ExtractError::PasswordRequired)
    }
}

/// Errors that make a whole table unconvertible.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConvertError {
    /// No rows were extracted.
    #[error("table is empty")]
    EmptyTable,

    /// Rows exist but none can serve as a header.
    #[error("no header row found")]
    NoHeaderFound,
}

/// Result type for the bankflow library.
pub type Result<T> = std::result::Result<T, BankflowError>;
