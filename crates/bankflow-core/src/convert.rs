//! End-to-end conversion: raw table or source document to voucher document.

use std::fmt;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{BankflowError, ConvertError, ExtractError, Result};
use crate::extract::{CsvDecoder, SourceDocument, SourceFormat, SpreadsheetDecoder, TableExtractor};
use crate::models::config::BankflowConfig;
use crate::models::table::RawTable;
use crate::models::transaction::ConversionMode;
use crate::models::voucher::Document;
use crate::statement::{FieldClassifier, HeaderResolver, ResolvedHeader, RowNormalizer, SchemaMapping};
use crate::voucher::{DocumentAssembler, VoucherBuilder};

/// What to convert a document into.
#[derive(Debug, Clone, Default)]
pub struct ConversionRequest {
    /// Statement kind.
    pub mode: ConversionMode,

    /// Main ledger name; the configured default when `None`.
    pub main_ledger: Option<String>,

    /// Password for protected PDFs.
    pub password: Option<String>,
}

impl ConversionRequest {
    pub fn new(mode: ConversionMode) -> Self {
        Self {
            mode,
            ..Default::default()
        }
    }

    pub fn with_main_ledger(mut self, main_ledger: impl Into<String>) -> Self {
        self.main_ledger = Some(main_ledger.into());
        self
    }

    pub fn with_password(mut self, password: Option<String>) -> Self {
        self.password = password;
        self
    }
}

/// Row accounting for one conversion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConversionStats {
    /// Data rows after the header.
    pub rows_seen: usize,
    /// Vouchers emitted.
    pub vouchers: usize,
    /// Rows dropped for carrying no amount.
    pub skipped_zero: usize,
    /// Emitted vouchers whose date fell back to the configured date.
    pub dates_defaulted: usize,
}

impl fmt::Display for ConversionStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} vouchers from {} rows ({} zero rows skipped, {} dates defaulted)",
            self.vouchers, self.rows_seen, self.skipped_zero, self.dates_defaulted
        )
    }
}

/// A successful conversion.
#[derive(Debug, Clone)]
pub struct Conversion {
    pub document: Document,
    pub header: ResolvedHeader,
    pub schema: SchemaMapping,
    pub stats: ConversionStats,
}

/// Document-level result of converting one source.
#[derive(Debug, Clone)]
pub enum ConversionOutcome {
    /// Converted, possibly with zero vouchers.
    Converted(Conversion),
    /// Nothing usable could be extracted.
    NoData { reason: String },
    /// The document needs a password; retry with one.
    PasswordRequired,
    /// The input is not a supported format.
    Unsupported { reason: String },
}

impl ConversionOutcome {
    pub fn voucher_count(&self) -> usize {
        match self {
            ConversionOutcome::Converted(c) => c.document.voucher_count(),
            _ => 0,
        }
    }

    pub fn is_converted(&self) -> bool {
        matches!(self, ConversionOutcome::Converted(_))
    }

    /// Short status label.
    pub fn status(&self) -> &'static str {
        match self {
            ConversionOutcome::Converted(_) => "converted",
            ConversionOutcome::NoData { .. } => "no_data",
            ConversionOutcome::PasswordRequired => "password_required",
            ConversionOutcome::Unsupported { .. } => "unsupported",
        }
    }

    /// Human-readable detail for non-converted outcomes.
    pub fn reason(&self) -> Option<&str> {
        match self {
            ConversionOutcome::NoData { reason } | ConversionOutcome::Unsupported { reason } => {
                Some(reason)
            }
            ConversionOutcome::PasswordRequired => Some("document is password protected"),
            ConversionOutcome::Converted(_) => None,
        }
    }
}

/// One batch member's result.
#[derive(Debug, Clone)]
pub struct BatchEntry {
    pub name: String,
    pub outcome: ConversionOutcome,
}

/// Results of a batch, in input order.
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    pub entries: Vec<BatchEntry>,
}

impl BatchReport {
    pub fn successes(&self) -> impl Iterator<Item = &BatchEntry> {
        self.entries.iter().filter(|e| e.outcome.is_converted())
    }

    pub fn failures(&self) -> impl Iterator<Item = &BatchEntry> {
        self.entries.iter().filter(|e| !e.outcome.is_converted())
    }

    pub fn total_vouchers(&self) -> usize {
        self.entries.iter().map(|e| e.outcome.voucher_count()).sum()
    }
}

/// Conversion pipeline: header, roles, rows, vouchers, document.
#[derive(Debug, Clone, Default)]
pub struct Converter {
    config: BankflowConfig,
}

impl Converter {
    pub fn new(config: BankflowConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &BankflowConfig {
        &self.config
    }

    /// Convert a table whose header must be located by scoring.
    pub fn convert(&self, table: &RawTable, mode: ConversionMode, main_ledger: &str) -> Result<Conversion> {
        let header = self.resolve_header(table, false)?;
        self.convert_with_header(table, header, mode, main_ledger)
    }

    /// Locate the header row. Tabular inputs use row 0 unless configured to
    /// be scored like PDFs.
    pub fn resolve_header(&self, table: &RawTable, tabular: bool) -> Result<ResolvedHeader> {
        if table.is_empty() {
            return Err(ConvertError::EmptyTable.into());
        }

        let header = if tabular && !self.config.header.score_spreadsheets {
            ResolvedHeader::first_row(table)
        } else {
            HeaderResolver::from_config(&self.config.header).resolve(table)
        };

        match header {
            Some(header) if header.has_named_columns() => Ok(header),
            _ => Err(ConvertError::NoHeaderFound.into()),
        }
    }

    /// Convert the rows after an already-resolved header.
    pub fn convert_with_header(
        &self,
        table: &RawTable,
        header: ResolvedHeader,
        mode: ConversionMode,
        main_ledger: &str,
    ) -> Result<Conversion> {
        let schema = FieldClassifier::classify(&header.columns);
        if !schema.has_amount_columns() {
            warn!("No debit, credit or amount column among {:?}", header.columns);
        }

        let normalizer = RowNormalizer::new(&schema, mode, self.config.normalize.fallback_date);
        let builder = VoucherBuilder::from_config(&self.config.ledgers, Some(main_ledger));
        let mut assembler = DocumentAssembler::new(
            mode,
            self.config.ledgers.suspense_ledger.as_str(),
            self.config.ledgers.suspense_parent.as_str(),
        );

        let mut stats = ConversionStats::default();
        for row in table.data_rows(header.index) {
            stats.rows_seen += 1;

            let Some(record) = normalizer.normalize(row) else {
                stats.skipped_zero += 1;
                continue;
            };
            let Some(voucher) = builder.build(&record, mode) else {
                stats.skipped_zero += 1;
                continue;
            };

            if record.date.is_defaulted() {
                stats.dates_defaulted += 1;
            }
            assembler.push(voucher);
        }

        let document = assembler.finish();
        stats.vouchers = document.voucher_count();

        info!("Converted {} statement: {}", mode, stats);

        Ok(Conversion {
            document,
            header,
            schema,
            stats,
        })
    }

    /// Extract the raw table of a source document.
    pub fn extract(&self, source: &SourceDocument, request: &ConversionRequest) -> std::result::Result<(RawTable, SourceFormat), ExtractError> {
        let format = source.format()?;
        let table = match format {
            SourceFormat::Pdf => self.extract_pdf(&source.bytes, request.password.clone())?,
            SourceFormat::Spreadsheet => SpreadsheetDecoder::new().extract_table(&source.bytes)?,
            SourceFormat::Csv => CsvDecoder::new().extract_table(&source.bytes)?,
        };

        debug!("{}: {} rows extracted as {}", source.name, table.len(), format.as_str());
        Ok((table, format))
    }

    #[cfg(feature = "native")]
    fn extract_pdf(&self, data: &[u8], password: Option<String>) -> std::result::Result<RawTable, ExtractError> {
        crate::extract::pdf::PdfTableExtractor::new()
            .with_password(password)
            .with_min_column_gap(self.config.pdf.min_column_gap)
            .with_header_resolver(HeaderResolver::from_config(&self.config.header))
            .extract_table(data)
    }

    #[cfg(not(feature = "native"))]
    fn extract_pdf(&self, _data: &[u8], _password: Option<String>) -> std::result::Result<RawTable, ExtractError> {
        Err(ExtractError::UnsupportedFormat(
            "PDF extraction is not available in this build".to_string(),
        ))
    }

    /// Convert one source document, classifying every failure.
    pub fn convert_source(&self, source: &SourceDocument, request: &ConversionRequest) -> ConversionOutcome {
        let (table, format) = match self.extract(source, request) {
            Ok(extracted) => extracted,
            Err(e) if e.needs_password() => {
                info!("{} is password protected", source.name);
                return ConversionOutcome::PasswordRequired;
            }
            Err(ExtractError::UnsupportedFormat(reason)) => {
                warn!("{}: unsupported format", source.name);
                return ConversionOutcome::Unsupported { reason };
            }
            Err(e) => {
                warn!("{}: extraction failed: {}", source.name, e);
                return ConversionOutcome::NoData {
                    reason: e.to_string(),
                };
            }
        };

        let main_ledger = request
            .main_ledger
            .as_deref()
            .unwrap_or(&self.config.ledgers.main_ledger);

        let converted = self
            .resolve_header(&table, format.is_tabular())
            .and_then(|header| self.convert_with_header(&table, header, request.mode, main_ledger));

        match converted {
            Ok(conversion) => ConversionOutcome::Converted(conversion),
            Err(BankflowError::Convert(e)) => {
                warn!("{}: {}", source.name, e);
                ConversionOutcome::NoData {
                    reason: e.to_string(),
                }
            }
            Err(e) => ConversionOutcome::NoData {
                reason: e.to_string(),
            },
        }
    }

    /// Convert several documents independently. One failure never stops
    /// the others.
    pub fn convert_batch(&self, sources: &[SourceDocument], request: &ConversionRequest) -> BatchReport {
        let entries: Vec<BatchEntry> = sources
            .iter()
            .map(|source| BatchEntry {
                name: source.name.clone(),
                outcome: self.convert_source(source, request),
            })
            .collect();

        let report = BatchReport { entries };
        info!(
            "Batch finished: {} converted, {} failed, {} vouchers",
            report.successes().count(),
            report.failures().count(),
            report.total_vouchers()
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn table() -> RawTable {
        RawTable::from_text_rows(vec![
            vec!["Date", "Narration", "Debit", "Credit"],
            vec!["01/04/2024", "Rent", "5000", "0"],
            vec!["N/A", "Fee", "25", ""],
            vec!["03/04/2024", "Opening Balance", "0", "0"],
            vec!["04/04/2024", "Sale", "0", "3000"],
        ])
    }

    #[test]
    fn test_stats() {
        let conversion = Converter::default()
            .convert(&table(), ConversionMode::Bank, "Bank Account")
            .unwrap();

        assert_eq!(conversion.header.index, 0);
        assert_eq!(conversion.stats.rows_seen, 4);
        assert_eq!(conversion.stats.vouchers, 3);
        assert_eq!(conversion.stats.skipped_zero, 1);
        assert_eq!(conversion.stats.dates_defaulted, 1);
        assert_eq!(conversion.document.ledgers.len(), 1);
        assert_eq!(
            conversion.stats.to_string(),
            "3 vouchers from 4 rows (1 zero rows skipped, 1 dates defaulted)"
        );
    }

    #[test]
    fn test_empty_table() {
        let err = Converter::default()
            .convert(&RawTable::default(), ConversionMode::Bank, "Bank Account")
            .unwrap_err();
        assert!(matches!(err, BankflowError::Convert(ConvertError::EmptyTable)));
    }

    #[test]
    fn test_blank_header_row() {
        let table = RawTable::new(vec![vec![None, None]]);
        let err = Converter::default()
            .convert(&table, ConversionMode::Bank, "Bank Account")
            .unwrap_err();
        assert!(matches!(err, BankflowError::Convert(ConvertError::NoHeaderFound)));
    }

    #[test]
    fn test_csv_source() {
        let source = SourceDocument::new(
            "april.csv",
            b"Date,Narration,Debit,Credit\n01/04/2024,Rent,5000,0\n".to_vec(),
        );
        let outcome = Converter::default().convert_source(&source, &ConversionRequest::new(ConversionMode::Bank));
        assert_eq!(outcome.status(), "converted");
        assert_eq!(outcome.voucher_count(), 1);
    }

    #[test]
    fn test_source_failures_are_classified() {
        let converter = Converter::default();
        let request = ConversionRequest::new(ConversionMode::Sales);

        let outcome = converter.convert_source(&SourceDocument::new("notes.txt", b"hi".to_vec()), &request);
        assert_eq!(outcome.status(), "unsupported");

        let outcome = converter.convert_source(&SourceDocument::new("empty.csv", Vec::new()), &request);
        assert_eq!(outcome.status(), "no_data");
        assert_eq!(outcome.reason(), Some("table is empty"));
    }

    #[test]
    fn test_batch_isolates_failures() {
        let sources = vec![
            SourceDocument::new("bad.txt", b"?".to_vec()),
            SourceDocument::new("good.csv", b"Date,Narration,Amount\n01/04/2024,Invoice 7,1200\n".to_vec()),
        ];
        let report = Converter::default().convert_batch(&sources, &ConversionRequest::new(ConversionMode::Sales));

        assert_eq!(report.entries.len(), 2);
        assert_eq!(report.entries[0].name, "bad.txt");
        assert_eq!(report.successes().count(), 1);
        assert_eq!(report.failures().count(), 1);
        assert_eq!(report.total_vouchers(), 1);
    }
}
