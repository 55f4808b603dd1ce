//! Configuration structures for the conversion pipeline.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Keywords used to score candidate header rows.
pub const DEFAULT_HEADER_KEYWORDS: [&str; 11] = [
    "date",
    "particulars",
    "description",
    "narration",
    "debit",
    "credit",
    "withdrawal",
    "deposit",
    "balance",
    "val date",
    "txn date",
];

/// Main configuration for the bankflow pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BankflowConfig {
    /// Header detection configuration.
    pub header: HeaderConfig,

    /// Row normalization configuration.
    pub normalize: NormalizeConfig,

    /// Ledger naming configuration.
    pub ledgers: LedgerConfig,

    /// PDF extraction configuration.
    pub pdf: PdfConfig,

    /// XML output configuration.
    pub output: OutputConfig,
}

/// Header detection configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HeaderConfig {
    /// Number of leading rows considered as header candidates.
    pub scan_limit: usize,

    /// Minimum keyword score for a row to be trusted as the header.
    /// Below this the first row is used. Zero disables the floor.
    pub min_score: usize,

    /// Keywords counted as substrings of the lower-cased row text.
    pub keywords: Vec<String>,

    /// Score spreadsheet rows too, instead of taking row 0 as the header.
    pub score_spreadsheets: bool,
}

impl Default for HeaderConfig {
    fn default() -> Self {
        Self {
            scan_limit: 25,
            min_score: 2,
            keywords: DEFAULT_HEADER_KEYWORDS.iter().map(|k| k.to_string()).collect(),
            score_spreadsheets: false,
        }
    }
}

/// Row normalization configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizeConfig {
    /// Date used when a row's date cell is missing or unparseable.
    pub fallback_date: NaiveDate,
}

impl Default for NormalizeConfig {
    fn default() -> Self {
        Self {
            fallback_date: NaiveDate::from_ymd_opt(1970, 1, 1).unwrap_or_default(),
        }
    }
}

/// Ledger naming configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Main ledger used when the caller does not name one.
    pub main_ledger: String,

    /// Holding ledger for bank-mode counterparties.
    pub suspense_ledger: String,

    /// Parent group of the suspense ledger master.
    pub suspense_parent: String,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            main_ledger: "Bank Account".to_string(),
            suspense_ledger: "Suspense Account".to_string(),
            suspense_parent: "Suspense A/c".to_string(),
        }
    }
}

/// PDF extraction configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfConfig {
    /// Minimum run of spaces separating two cells on a text line.
    pub min_column_gap: usize,
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self { min_column_gap: 2 }
    }
}

/// XML output configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Indent the XML output.
    pub indent: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { indent: true }
    }
}

impl BankflowConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        std::fs::write(path, content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = BankflowConfig::default();
        assert_eq!(config.header.scan_limit, 25);
        assert_eq!(config.header.min_score, 2);
        assert_eq!(config.header.keywords.len(), 11);
        assert_eq!(config.ledgers.suspense_ledger, "Suspense Account");
        assert_eq!(
            config.normalize.fallback_date,
            NaiveDate::from_ymd_opt(1970, 1, 1).unwrap()
        );
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config: BankflowConfig =
            serde_json::from_str(r#"{"normalize": {"fallback_date": "2024-04-01"}}"#).unwrap();
        assert_eq!(
            config.normalize.fallback_date,
            NaiveDate::from_ymd_opt(2024, 4, 1).unwrap()
        );
        assert_eq!(config.ledgers.main_ledger, "Bank Account");
        assert!(config.output.indent);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = BankflowConfig::default();
        config.header.min_score = 3;
        config.ledgers.main_ledger = "HDFC Bank".to_string();
        config.save(&path).unwrap();

        let loaded = BankflowConfig::from_file(&path).unwrap();
        assert_eq!(loaded.header.min_score, 3);
        assert_eq!(loaded.ledgers.main_ledger, "HDFC Bank");
    }
}
