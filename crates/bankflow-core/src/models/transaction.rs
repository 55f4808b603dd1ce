//! Canonical transaction records.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// What kind of statement is being converted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConversionMode {
    /// Sales register: party debited, main (sales) ledger credited.
    Sales,
    /// Purchase register: party credited, main (purchase) ledger debited.
    Purchase,
    /// Bank statement: suspense ledger against the bank ledger.
    #[default]
    Bank,
}

impl ConversionMode {
    /// Voucher kind produced for a row with the given debit magnitude.
    pub fn voucher_kind(&self, debit: Decimal) -> VoucherKind {
        match self {
            ConversionMode::Sales => VoucherKind::Sales,
            ConversionMode::Purchase => VoucherKind::Purchase,
            ConversionMode::Bank if debit > Decimal::ZERO => VoucherKind::Payment,
            ConversionMode::Bank => VoucherKind::Receipt,
        }
    }

    /// Lower-case mode name.
    pub fn as_str(&self) -> &'static str {
        match self {
            ConversionMode::Sales => "sales",
            ConversionMode::Purchase => "purchase",
            ConversionMode::Bank => "bank",
        }
    }
}


impl fmt::Display for ConversionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConversionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sales" | "sale" => Ok(ConversionMode::Sales),
            "purchase" | "purchases" => Ok(ConversionMode::Purchase),
            "bank" | "bank_transfer" | "bank-transfer" => Ok(ConversionMode::Bank),
            other => Err(format!("unknown conversion mode: {other}")),
        }
    }
}

/// Accounting voucher type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VoucherKind {
    Sales,
    Purchase,
    Payment,
    Receipt,
}

impl VoucherKind {
    /// Voucher type name as the importer expects it.
    pub fn as_str(&self) -> &'static str {
        match self {
            VoucherKind::Sales => "Sales",
            VoucherKind::Purchase => "Purchase",
            VoucherKind::Payment => "Payment",
            VoucherKind::Receipt => "Receipt",
        }
    }
}

impl fmt::Display for VoucherKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A field value that was either parsed from its cell or substituted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "source", content = "value", rename_all = "snake_case")]
pub enum FieldOutcome<T> {
    /// Parsed from the cell text.
    Parsed(T),
    /// The cell was missing or malformed; a default was used.
    Defaulted(T),
}

impl<T> FieldOutcome<T> {
    /// The value regardless of where it came from.
    pub fn value(&self) -> &T {
        match self {
            FieldOutcome::Parsed(v) | FieldOutcome::Defaulted(v) => v,
        }
    }

    pub fn into_value(self) -> T {
        match self {
            FieldOutcome::Parsed(v) | FieldOutcome::Defaulted(v) => v,
        }
    }

    pub fn is_defaulted(&self) -> bool {
        matches!(self, FieldOutcome::Defaulted(_))
    }
}

/// One normalized statement row.
///
/// `debit` and `credit` are magnitudes. `net_amount` is the debit when it is
/// positive, otherwise the credit, and is never zero: rows that would net to
/// zero are not representable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    /// Transaction date, possibly the configured fallback.
    pub date: FieldOutcome<NaiveDate>,

    /// Free-text description.
    pub narration: String,

    /// Counterparty name; the narration when no party column exists.
    pub party: String,

    /// Outflow magnitude.
    pub debit: Decimal,

    /// Inflow magnitude.
    pub credit: Decimal,

    /// Amount carried by the voucher.
    pub net_amount: Decimal,

    /// Voucher type this row becomes.
    pub kind: VoucherKind,
}

impl TransactionRecord {
    /// Build a record, returning `None` when the row carries no amount.
    pub fn new(
        mode: ConversionMode,
        date: FieldOutcome<NaiveDate>,
        narration: impl Into<String>,
        party: impl Into<String>,
        debit: Decimal,
        credit: Decimal,
    ) -> Option<Self> {
        let debit = debit.abs();
        let credit = credit.abs();
        let net_amount = if debit > Decimal::ZERO { debit } else { credit };

        if net_amount.is_zero() {
            return None;
        }

        Some(Self {
            date,
            narration: narration.into(),
            party: party.into(),
            debit,
            credit,
            net_amount,
            kind: mode.voucher_kind(debit),
        })
    }

    /// The transaction date, fallback included.
    pub fn date(&self) -> NaiveDate {
        *self.date.value()
    }
}
