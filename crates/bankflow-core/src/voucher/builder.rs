//! Two-leg voucher construction.

use tracing::trace;

use crate::models::config::LedgerConfig;
use crate::models::transaction::{ConversionMode, TransactionRecord, VoucherKind};
use crate::models::voucher::{LedgerEntry, Voucher};

/// Turns transaction records into balanced vouchers.
///
/// | mode     | kind     | debit leg (Yes, -net) | credit leg (No, +net) |
/// |----------|----------|-----------------------|-----------------------|
/// | sales    | Sales    | party                 | main                  |
/// | purchase | Purchase | main                  | party                 |
/// | bank     | Payment  | suspense              | main                  |
/// | bank     | Receipt  | main                  | suspense              |
///
/// The counterparty leg is always written first.
#[derive(Debug, Clone)]
pub struct VoucherBuilder {
    main_ledger: String,
    suspense_ledger: String,
}

impl VoucherBuilder {
    pub fn new(main_ledger: impl Into<String>, suspense_ledger: impl Into<String>) -> Self {
        Self {
            main_ledger: main_ledger.into(),
            suspense_ledger: suspense_ledger.into(),
        }
    }

    /// Builder using the configured ledger names, with an optional main
    /// ledger override.
    pub fn from_config(config: &LedgerConfig, main_ledger: Option<&str>) -> Self {
        Self::new(
            main_ledger.unwrap_or(&config.main_ledger),
            config.suspense_ledger.as_str(),
        )
    }

    pub fn main_ledger(&self) -> &str {
        &self.main_ledger
    }

    pub fn suspense_ledger(&self) -> &str {
        &self.suspense_ledger
    }

    /// Build the voucher for one record. Returns `None` for a zero amount.
    pub fn build(&self, record: &TransactionRecord, mode: ConversionMode) -> Option<Voucher> {
        let amount = record.net_amount.abs();
        if amount.is_zero() {
            trace!("Zero amount reached the voucher builder, skipping");
            return None;
        }

        let main = self.main_ledger.as_str();
        let kind = mode.voucher_kind(record.debit);

        let entries = match kind {
            VoucherKind::Sales => [
                LedgerEntry::debit(self.party_ledger(record), amount),
                LedgerEntry::credit(main, amount),
            ],
            VoucherKind::Purchase => [
                LedgerEntry::credit(self.party_ledger(record), amount),
                LedgerEntry::debit(main, amount),
            ],
            VoucherKind::Payment => [
                LedgerEntry::debit(self.suspense_ledger.as_str(), amount),
                LedgerEntry::credit(main, amount),
            ],
            VoucherKind::Receipt => [
                LedgerEntry::credit(self.suspense_ledger.as_str(), amount),
                LedgerEntry::debit(main, amount),
            ],
        };

        Some(Voucher {
            kind,
            date: record.date(),
            narration: record.narration.clone(),
            entries,
        })
    }

    fn party_ledger<'a>(&'a self, record: &'a TransactionRecord) -> &'a str {
        let party = record.party.trim();
        if !party.is_empty() {
            return party;
        }
        let narration = record.narration.trim();
        if !narration.is_empty() {
            return narration;
        }
        &self.suspense_ledger
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::transaction::FieldOutcome;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;

    fn record(mode: ConversionMode, party: &str, debit: i64, credit: i64) -> TransactionRecord {
        TransactionRecord::new(
            mode,
            FieldOutcome::Parsed(NaiveDate::from_ymd_opt(2024, 4, 1).unwrap()),
            "Narration",
            party,
            Decimal::new(debit, 0),
            Decimal::new(credit, 0),
        )
        .unwrap()
    }

    fn builder() -> VoucherBuilder {
        VoucherBuilder::new("Main", "Suspense Account")
    }

    fn legs(voucher: &Voucher) -> Vec<(&str, bool, Decimal)> {
        voucher
            .entries
            .iter()
            .map(|e| (e.ledger_name.as_str(), e.is_deemed_positive, e.amount))
            .collect()
    }

    #[test]
    fn test_sales() {
        let voucher = builder()
            .build(&record(ConversionMode::Sales, "Acme", 0, 1200), ConversionMode::Sales)
            .unwrap();
        assert_eq!(voucher.kind, VoucherKind::Sales);
        assert_eq!(
            legs(&voucher),
            vec![("Acme", true, Decimal::new(-1200, 0)), ("Main", false, Decimal::new(1200, 0))]
        );
    }

    #[test]
    fn test_purchase() {
        let voucher = builder()
            .build(&record(ConversionMode::Purchase, "Supplier", 800, 0), ConversionMode::Purchase)
            .unwrap();
        assert_eq!(voucher.kind, VoucherKind::Purchase);
        assert_eq!(
            legs(&voucher),
            vec![("Supplier", false, Decimal::new(800, 0)), ("Main", true, Decimal::new(-800, 0))]
        );
    }

    #[test]
    fn test_bank_payment_and_receipt() {
        let payment = builder()
            .build(&record(ConversionMode::Bank, "Rent", 5000, 0), ConversionMode::Bank)
            .unwrap();
        assert_eq!(payment.kind, VoucherKind::Payment);
        assert_eq!(
            legs(&payment),
            vec![
                ("Suspense Account", true, Decimal::new(-5000, 0)),
                ("Main", false, Decimal::new(5000, 0)),
            ]
        );

        let receipt = builder()
            .build(&record(ConversionMode::Bank, "Sale", 0, 3000), ConversionMode::Bank)
            .unwrap();
        assert_eq!(receipt.kind, VoucherKind::Receipt);
        assert_eq!(
            legs(&receipt),
            vec![
                ("Suspense Account", false, Decimal::new(3000, 0)),
                ("Main", true, Decimal::new(-3000, 0)),
            ]
        );
    }

    #[test]
    fn test_every_mode_balances() {
        for mode in [ConversionMode::Sales, ConversionMode::Purchase, ConversionMode::Bank] {
            for (debit, credit) in [(150, 0), (0, 275), (10, 99)] {
                let voucher = builder().build(&record(mode, "P", debit, credit), mode).unwrap();
                assert!(voucher.is_balanced(), "{mode} {debit}/{credit}");
            }
        }
    }

    #[test]
    fn test_blank_party_falls_back() {
        let mut rec = record(ConversionMode::Sales, "", 0, 10);
        rec.narration = "  ".to_string();
        let voucher = builder().build(&rec, ConversionMode::Sales).unwrap();
        assert_eq!(voucher.entries[0].ledger_name, "Suspense Account");
    }

    #[test]
    fn test_zero_amount_is_skipped() {
        let mut rec = record(ConversionMode::Bank, "x", 10, 0);
        rec.net_amount = Decimal::ZERO;
        assert!(builder().build(&rec, ConversionMode::Bank).is_none());
    }
}
