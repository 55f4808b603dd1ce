//! Voucher document models.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::transaction::VoucherKind;

/// One leg of a double entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// Ledger the amount posts against.
    pub ledger_name: String,

    /// `true` for the debit side (`ISDEEMEDPOSITIVE=Yes`).
    pub is_deemed_positive: bool,

    /// Signed amount: negative on the debit side, positive on the credit side.
    pub amount: Decimal,
}

impl LedgerEntry {
    /// Debit-side leg carrying the negated magnitude.
    pub fn debit(ledger_name: impl Into<String>, magnitude: Decimal) -> Self {
        Self {
            ledger_name: ledger_name.into(),
            is_deemed_positive: true,
            amount: -magnitude,
        }
    }

    /// Credit-side leg carrying the magnitude as is.
    pub fn credit(ledger_name: impl Into<String>, magnitude: Decimal) -> Self {
        Self {
            ledger_name: ledger_name.into(),
            is_deemed_positive: false,
            amount: magnitude,
        }
    }

    /// `Yes`/`No` flag as written to the XML.
    pub fn deemed_positive_flag(&self) -> &'static str {
        if self.is_deemed_positive { "Yes" } else { "No" }
    }
}

/// A balanced two-leg accounting voucher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Voucher {
    /// Voucher type.
    pub kind: VoucherKind,

    /// Voucher date.
    pub date: NaiveDate,

    /// Narration copied from the statement row.
    pub narration: String,

    /// The two offsetting legs.
    pub entries: [LedgerEntry; 2],
}

impl Voucher {
    /// Check that the legs net to zero.
    pub fn is_balanced(&self) -> bool {
        (self.entries[0].amount + self.entries[1].amount).is_zero()
    }
}

/// Ledger master declaration ("ensure this ledger exists").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerMaster {
    /// Ledger name.
    pub name: String,

    /// Parent account group.
    pub parent: String,
}

/// An ordered voucher document ready for serialization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Ledger masters, emitted before any voucher.
    pub ledgers: Vec<LedgerMaster>,

    /// Vouchers in statement row order.
    pub vouchers: Vec<Voucher>,
}

impl Document {
    /// Number of vouchers.
    pub fn voucher_count(&self) -> usize {
        self.vouchers.len()
    }

    /// Check if the document carries no vouchers.
    pub fn is_empty(&self) -> bool {
        self.vouchers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_legs_balance() {
        let amount = Decimal::new(123456, 2);
        let voucher = Voucher {
            kind: VoucherKind::Payment,
            date: NaiveDate::from_ymd_opt(2024, 4, 1).unwrap(),
            narration: "Rent".to_string(),
            entries: [
                LedgerEntry::debit("Suspense Account", amount),
                LedgerEntry::credit("Bank Account", amount),
            ],
        };

        assert!(voucher.is_balanced());
        assert_eq!(voucher.entries[0].amount, Decimal::new(-123456, 2));
        assert_eq!(voucher.entries[0].deemed_positive_flag(), "Yes");
        assert_eq!(voucher.entries[1].deemed_positive_flag(), "No");
    }
}
