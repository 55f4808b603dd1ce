//! Table extraction: turning source documents into raw rows of text cells.

#[cfg(feature = "native")]
pub mod pdf;
pub mod spreadsheet;
pub mod text_table;

use std::path::Path;

use crate::error::ExtractError;
use crate::models::table::RawTable;

pub use spreadsheet::{CsvDecoder, SpreadsheetDecoder};

/// Anything that can produce a raw table from document bytes.
pub trait TableExtractor {
    /// Extract all rows, in document order.
    fn extract_table(&self, data: &[u8]) -> Result<RawTable, ExtractError>;
}

/// Recognized input formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    /// PDF statement; the header row is found by scoring.
    Pdf,
    /// Excel or OpenDocument workbook; the header is row 0.
    Spreadsheet,
    /// Comma-separated text; the header is row 0.
    Csv,
}

impl SourceFormat {
    /// Detect the format from the file name, falling back to the PDF magic.
    pub fn detect(name: &str, data: &[u8]) -> Result<Self, ExtractError> {
        let extension = Path::new(name)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();

        match extension.as_str() {
            "pdf" => Ok(SourceFormat::Pdf),
            "xlsx" | "xls" | "xlsm" | "xlsb" | "ods" => Ok(SourceFormat::Spreadsheet),
            "csv" => Ok(SourceFormat::Csv),
            _ if data.starts_with(b"%PDF") => Ok(SourceFormat::Pdf),
            _ => Err(ExtractError::UnsupportedFormat(name.to_string())),
        }
    }

    /// Whether the header sits at row 0 instead of being searched for.
    pub fn is_tabular(&self) -> bool {
        !matches!(self, SourceFormat::Pdf)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SourceFormat::Pdf => "pdf",
            SourceFormat::Spreadsheet => "spreadsheet",
            SourceFormat::Csv => "csv",
        }
    }
}

/// An input document held in memory.
#[derive(Debug, Clone)]
pub struct SourceDocument {
    /// File name, used for format detection and output naming.
    pub name: String,

    /// Raw file contents.
    pub bytes: Vec<u8>,
}

impl SourceDocument {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }

    /// Read a document from disk.
    pub fn from_path(path: &Path) -> std::io::Result<Self> {
        let bytes = std::fs::read(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Self { name, bytes })
    }

    pub fn format(&self) -> Result<SourceFormat, ExtractError> {
        SourceFormat::detect(&self.name, &self.bytes)
    }

    /// Output file name: the input stem with an `.xml` extension.
    pub fn output_name(&self) -> String {
        output_name_for(&self.name, "xml")
    }
}

/// Replace the extension of an input file name.
pub fn output_name_for(name: &str, extension: &str) -> String {
    let stem = Path::new(name)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "output".to_string());
    format!("{}.{}", stem, extension)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_by_extension() {
        assert_eq!(SourceFormat::detect("stmt.PDF", b"").unwrap(), SourceFormat::Pdf);
        assert_eq!(SourceFormat::detect("sales.xlsx", b"").unwrap(), SourceFormat::Spreadsheet);
        assert_eq!(SourceFormat::detect("book.ods", b"").unwrap(), SourceFormat::Spreadsheet);
        assert_eq!(SourceFormat::detect("bank.csv", b"").unwrap(), SourceFormat::Csv);
    }

    #[test]
    fn test_detect_pdf_magic() {
        assert_eq!(SourceFormat::detect("upload", b"%PDF-1.7\n").unwrap(), SourceFormat::Pdf);
    }

    #[test]
    fn test_unsupported_format() {
        let err = SourceFormat::detect("notes.txt", b"hello").unwrap_err();
        assert!(matches!(err, ExtractError::UnsupportedFormat(_)));
    }

    #[test]
    fn test_output_name() {
        assert_eq!(SourceDocument::new("April Statement.pdf", vec![]).output_name(), "April Statement.xml");
        assert_eq!(SourceDocument::new("", vec![]).output_name(), "output.xml");
    }
}
