//! Spreadsheet and CSV decoding.

use std::io::Cursor;

use calamine::{open_workbook_auto_from_rs, Data, Reader};
use tracing::debug;

use super::TableExtractor;
use crate::error::ExtractError;
use crate::models::table::RawTable;

/// Decodes the first non-empty worksheet of an xlsx/xls/xlsm/xlsb/ods file.
#[derive(Debug, Clone, Default)]
pub struct SpreadsheetDecoder;

impl SpreadsheetDecoder {
    pub fn new() -> Self {
        Self
    }
}

impl TableExtractor for SpreadsheetDecoder {
    fn extract_table(&self, data: &[u8]) -> Result<RawTable, ExtractError> {
        let mut workbook = open_workbook_auto_from_rs(Cursor::new(data.to_vec()))
            .map_err(|e| ExtractError::Spreadsheet(e.to_string()))?;

        for name in workbook.sheet_names() {
            let range = match workbook.worksheet_range(&name) {
                Ok(range) => range,
                Err(e) => {
                    debug!("Skipping worksheet {}: {}", name, e);
                    continue;
                }
            };

            let rows: Vec<Vec<Option<String>>> = range
                .rows()
                .map(|row| row.iter().map(cell_to_text).collect::<Vec<_>>())
                .filter(|row| row.iter().any(Option::is_some))
                .collect();

            if !rows.is_empty() {
                debug!("Decoded {} rows from worksheet {}", rows.len(), name);
                return Ok(RawTable::new(rows));
            }
        }

        Ok(RawTable::default())
    }
}

fn cell_to_text(cell: &Data) -> Option<String> {
    let text = match cell {
        Data::Empty | Data::Error(_) => return None,
        Data::String(text) => text.trim().to_string(),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(dt) => dt.format("%Y-%m-%d").to_string(),
            None => cell.to_string(),
        },
        Data::DateTimeIso(text) => text.clone(),
        _ => cell.to_string(),
    };
    (!text.is_empty()).then_some(text)
}

/// Decodes comma-separated text. The header is not treated specially.
#[derive(Debug, Clone)]
pub struct CsvDecoder {
    delimiter: u8,
}

impl CsvDecoder {
    pub fn new() -> Self {
        Self { delimiter: b',' }
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }
}

impl Default for CsvDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl TableExtractor for CsvDecoder {
    fn extract_table(&self, data: &[u8]) -> Result<RawTable, ExtractError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .delimiter(self.delimiter)
            .from_reader(data);

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            if record.iter().any(|cell| !cell.trim().is_empty()) {
                rows.push(record.iter().map(str::to_string).collect::<Vec<_>>());
            }
        }

        debug!("Decoded {} CSV rows", rows.len());
        Ok(RawTable::from_text_rows(rows))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_csv_rows() {
        let data = b"Date,Narration,Debit,Credit\n01/04/2024,Rent,\"5,000\",0\n,,,\n02/04/2024,Sale,0,3000\n";
        let table = CsvDecoder::new().extract_table(data).unwrap();

        assert_eq!(table.len(), 3);
        assert_eq!(
            table.row(1).unwrap(),
            &[
                Some("01/04/2024".to_string()),
                Some("Rent".to_string()),
                Some("5,000".to_string()),
                Some("0".to_string()),
            ]
        );
    }

    #[test]
    fn test_csv_ragged_rows() {
        let data = b"Date;Amount\n01/04/2024;10;extra\n";
        let table = CsvDecoder::new().with_delimiter(b';').extract_table(data).unwrap();
        assert_eq!(table.row(1).unwrap().len(), 3);
    }

    #[test]
    fn test_cell_to_text() {
        assert_eq!(cell_to_text(&Data::Empty), None);
        assert_eq!(cell_to_text(&Data::String("  Rent ".to_string())), Some("Rent".to_string()));
        assert_eq!(cell_to_text(&Data::String("   ".to_string())), None);
        assert_eq!(cell_to_text(&Data::Float(5000.0)), Some("5000".to_string()));
        assert_eq!(cell_to_text(&Data::Int(12)), Some("12".to_string()));
    }

    #[test]
    fn test_invalid_workbook() {
        let err = SpreadsheetDecoder::new().extract_table(b"not a workbook").unwrap_err();
        assert!(matches!(err, ExtractError::Spreadsheet(_)));
    }
}
