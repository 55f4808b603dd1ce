//! Header row detection for noisy statement tables.
//!
//! PDF statements usually open with letterhead, account details and
//! summary lines before the transaction table. Each of the leading rows is
//! scored by how many header keywords it contains, and the best one is
//! taken as the column header.

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::models::config::{HeaderConfig, DEFAULT_HEADER_KEYWORDS};
use crate::models::table::RawTable;

/// The row chosen as the column header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedHeader {
    /// Row index of the header. Rows after it are data.
    pub index: usize,

    /// Keyword score of the header row.
    pub score: usize,

    /// False when no row reached the confidence floor and row 0 was used.
    pub confident: bool,

    /// Column names, trimmed and made unique.
    pub columns: Vec<String>,
}

impl ResolvedHeader {
    /// Take row 0 as the header without scoring (spreadsheet inputs).
    pub fn first_row(table: &RawTable) -> Option<Self> {
        let row = table.row(0)?;
        Some(Self {
            index: 0,
            score: 0,
            confident: true,
            columns: unique_column_names(row),
        })
    }

    /// Check if any column has a non-empty name.
    pub fn has_named_columns(&self) -> bool {
        self.columns.iter().any(|c| !c.is_empty())
    }
}

/// Keyword-scoring header resolver.
#[derive(Debug, Clone)]
pub struct HeaderResolver {
    scan_limit: usize,
    min_score: usize,
    keywords: Vec<String>,
}

impl HeaderResolver {
    /// Create a resolver with the default keyword set, a 25 row window and
    /// a confidence floor of 2.
    pub fn new() -> Self {
        Self {
            scan_limit: 25,
            min_score: 2,
            keywords: DEFAULT_HEADER_KEYWORDS.iter().map(|k| k.to_string()).collect(),
        }
    }

    /// Create a resolver from configuration.
    pub fn from_config(config: &HeaderConfig) -> Self {
        Self::new()
            .with_scan_limit(config.scan_limit)
            .with_min_score(config.min_score)
            .with_keywords(config.keywords.iter().cloned())
    }

    /// Set the number of leading rows to score.
    pub fn with_scan_limit(mut self, scan_limit: usize) -> Self {
        self.scan_limit = scan_limit;
        self
    }

    /// Set the confidence floor.
    pub fn with_min_score(mut self, min_score: usize) -> Self {
        self.min_score = min_score;
        self
    }

    /// Replace the keyword set.
    pub fn with_keywords(mut self, keywords: impl IntoIterator<Item = String>) -> Self {
        self.keywords = keywords.into_iter().map(|k| k.to_lowercase()).collect();
        self
    }

    /// Count the distinct keywords contained in a row.
    pub fn score_row(&self, row: &[Option<String>]) -> usize {
        let text = row
            .iter()
            .map(|cell| cell.as_deref().unwrap_or("").to_lowercase())
            .collect::<Vec<_>>()
            .join(" ");

        self.keywords.iter().filter(|kw| text.contains(kw.as_str())).count()
    }

    /// Pick the header row. Returns `None` for an empty table.
    ///
    /// The first row to reach a new maximum wins; later rows with an equal
    /// score do not replace it.
    pub fn resolve(&self, table: &RawTable) -> Option<ResolvedHeader> {
        if table.is_empty() {
            return None;
        }

        let mut best_index = 0;
        let mut best_score = 0;

        for (i, row) in table.rows().iter().take(self.scan_limit).enumerate() {
            let score = self.score_row(row);
            if score > best_score {
                best_score = score;
                best_index = i;
            }
        }

        let confident = best_score >= self.min_score;
        let index = if confident {
            best_index
        } else {
            warn!(
                "No header candidate reached score {} (best {} at row {}), using row 0",
                self.min_score, best_score, best_index
            );
            0
        };

        let row = table.row(index)?;
        let columns = unique_column_names(row);

        debug!(
            "Resolved header at row {} with score {}: {:?}",
            index, best_score, columns
        );

        Some(ResolvedHeader {
            index,
            score: if confident { best_score } else { self.score_row(row) },
            confident,
            columns,
        })
    }
}

impl Default for HeaderResolver {
    fn default() -> Self {
        Self::new()
    }
}

/// Trim header cells and suffix every repeated name with its position.
pub fn unique_column_names(row: &[Option<String>]) -> Vec<String> {
    let names: Vec<String> = row
        .iter()
        .map(|cell| cell.as_deref().unwrap_or("").trim().to_string())
        .collect();

    let mut counts: HashMap<&str, usize> = HashMap::new();
    for name in &names {
        *counts.entry(name.as_str()).or_default() += 1;
    }

    names
        .iter()
        .enumerate()
        .map(|(i, name)| {
            if counts.get(name.as_str()).copied().unwrap_or(0) > 1 {
                format!("{}_{}", name, i)
            } else {
                name.clone()
            }
        })
        .collect()
}
