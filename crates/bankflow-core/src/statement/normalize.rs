//! Row normalization: one raw data row to one canonical transaction record.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::trace;

use super::classify::{ColumnRole, SchemaMapping};
use super::rules::{parse_amount, parse_date_or};
use crate::models::table::cell_text;
use crate::models::transaction::{ConversionMode, TransactionRecord};

/// Converts data rows under a fixed schema mapping.
///
/// Cell-level failures never surface: an unparseable date takes the
/// fallback date and an unparseable amount counts as absent.
#[derive(Debug, Clone)]
pub struct RowNormalizer {
    mode: ConversionMode,
    fallback_date: NaiveDate,
    date_column: Option<usize>,
    narration_column: Option<usize>,
    party_column: Option<usize>,
    debit_columns: Vec<usize>,
    credit_columns: Vec<usize>,
    amount_columns: Vec<usize>,
}

impl RowNormalizer {
    pub fn new(schema: &SchemaMapping, mode: ConversionMode, fallback_date: NaiveDate) -> Self {
        let first = |role| schema.columns_with(role).first().copied();

        Self {
            mode,
            fallback_date,
            date_column: first(ColumnRole::Date),
            narration_column: first(ColumnRole::Narration),
            party_column: first(ColumnRole::Party),
            debit_columns: schema.columns_with(ColumnRole::Debit),
            credit_columns: schema.columns_with(ColumnRole::Credit),
            amount_columns: schema.columns_with(ColumnRole::Amount),
        }
    }

    pub fn mode(&self) -> ConversionMode {
        self.mode
    }

    /// Normalize one row. Returns `None` when the row carries no amount.
    pub fn normalize(&self, row: &[Option<String>]) -> Option<TransactionRecord> {
        let date = parse_date_or(
            self.date_column.and_then(|i| cell_text(row, i)),
            self.fallback_date,
        );

        let narration = self
            .narration_column
            .and_then(|i| cell_text(row, i))
            .unwrap_or("")
            .to_string();

        let party = self
            .party_column
            .and_then(|i| cell_text(row, i))
            .filter(|p| !p.trim().is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| narration.clone());

        let mut debit = last_parsed(row, &self.debit_columns).map(|d| d.abs()).unwrap_or_default();
        let mut credit = last_parsed(row, &self.credit_columns).map(|c| c.abs()).unwrap_or_default();

        if debit.is_zero() && credit.is_zero() {
            if let Some(amount) = last_parsed(row, &self.amount_columns) {
                if amount < Decimal::ZERO {
                    debit = amount.abs();
                } else {
                    credit = amount;
                }
            }
        }

        let record = TransactionRecord::new(self.mode, date, narration, party, debit, credit);
        if record.is_none() {
            trace!("Skipping zero-amount row: {:?}", row);
        }
        record
    }
}

/// Value of the last column whose cell parses as an amount. Cells that fail
/// to parse leave the earlier value in place.
fn last_parsed(row: &[Option<String>], columns: &[usize]) -> Option<Decimal> {
    columns
        .iter()
        .filter_map(|&i| cell_text(row, i).and_then(parse_amount))
        .last()
}
