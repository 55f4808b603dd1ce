//! Core library for statement to voucher conversion.
//!
//! This crate provides:
//! - Table extraction from PDF statements and spreadsheets
//! - Header detection and column role inference for noisy statement tables
//! - Row normalization into canonical transaction records
//! - Balanced two-leg voucher construction for sales, purchase and bank modes
//! - Serialization of the voucher document into importer-ready XML

pub mod error;
pub mod models;
pub mod extract;
pub mod statement;
pub mod voucher;
pub mod convert;

pub use error::{BankflowError, ConvertError, ExtractError, Result};
pub use models::config::BankflowConfig;
pub use models::table::RawTable;
pub use models::transaction::{ConversionMode, FieldOutcome, TransactionRecord, VoucherKind};
pub use models::voucher::{Document, LedgerEntry, LedgerMaster, Voucher};
pub use extract::{SourceDocument, SourceFormat, TableExtractor};
pub use statement::{ColumnRole, FieldClassifier, HeaderResolver, ResolvedHeader, RowNormalizer, SchemaMapping};
pub use voucher::{DocumentAssembler, TallyXmlWriter, VoucherBuilder};
pub use convert::{BatchReport, Conversion, ConversionOutcome, ConversionRequest, ConversionStats, Converter};

#[cfg(feature = "native")]
pub use extract::pdf::{LockStatus, PdfTableExtractor};
