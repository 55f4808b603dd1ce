//! Raw tabular text as produced by the table extractors.

use serde::{Deserialize, Serialize};

/// Ordered rows of optional text cells, immutable once extracted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawTable {
    rows: Vec<Vec<Option<String>>>,
}

impl RawTable {
    /// Create a table from already-extracted rows.
    pub fn new(rows: Vec<Vec<Option<String>>>) -> Self {
        Self { rows }
    }

    /// Create a table from plain text rows. Blank cells become `None`.
    pub fn from_text_rows<R, S>(rows: impl IntoIterator<Item = R>) -> Self
    where
        R: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let rows = rows
            .into_iter()
            .map(|row| {
                row.into_iter()
                    .map(|cell| {
                        let cell = cell.as_ref().trim();
                        (!cell.is_empty()).then(|| cell.to_string())
                    })
                    .collect()
            })
            .collect();
        Self { rows }
    }

    /// All rows in extraction order.
    pub fn rows(&self) -> &[Vec<Option<String>>] {
        &self.rows
    }

    /// Get a single row.
    pub fn row(&self, index: usize) -> Option<&[Option<String>]> {
        self.rows.get(index).map(Vec::as_slice)
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Check if the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows after the given header index.
    pub fn data_rows(&self, header_index: usize) -> &[Vec<Option<String>>] {
        self.rows.get(header_index + 1..).unwrap_or(&[])
    }
}

/// Get the text of a cell, treating missing cells as absent.
pub fn cell_text(row: &[Option<String>], index: usize) -> Option<&str> {
    row.get(index).and_then(|c| c.as_deref())
}
