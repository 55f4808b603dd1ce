//! End-to-end conversion scenarios.

use bankflow_core::extract::text_table::split_rows;
use bankflow_core::models::voucher::LedgerEntry;
use bankflow_core::{
    BankflowConfig, ConversionMode, Converter, HeaderResolver, RawTable, TallyXmlWriter, VoucherKind,
};
use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;

fn legs(entries: &[LedgerEntry]) -> Vec<(&str, &str, Decimal)> {
    entries
        .iter()
        .map(|e| (e.ledger_name.as_str(), e.deemed_positive_flag(), e.amount))
        .collect()
}

#[test]
fn bank_statement_becomes_payment_and_receipt() {
    let table = RawTable::from_text_rows(vec![
        vec!["Date", "Narration", "Debit", "Credit"],
        vec!["01/04/2024", "Rent", "5000", "0"],
        vec!["02/04/2024", "Sale", "0", "3000"],
    ]);

    let conversion = Converter::default()
        .convert(&table, ConversionMode::Bank, "Bank Account")
        .unwrap();
    let document = conversion.document;

    assert_eq!(document.ledgers.len(), 1);
    assert_eq!(document.ledgers[0].name, "Suspense Account");
    assert_eq!(document.vouchers.len(), 2);

    let payment = &document.vouchers[0];
    assert_eq!(payment.kind, VoucherKind::Payment);
    assert_eq!(payment.date, NaiveDate::from_ymd_opt(2024, 4, 1).unwrap());
    assert_eq!(
        legs(&payment.entries),
        vec![
            ("Suspense Account", "Yes", Decimal::new(-5000, 0)),
            ("Bank Account", "No", Decimal::new(5000, 0)),
        ]
    );

    let receipt = &document.vouchers[1];
    assert_eq!(receipt.kind, VoucherKind::Receipt);
    assert_eq!(
        legs(&receipt.entries),
        vec![
            ("Suspense Account", "No", Decimal::new(3000, 0)),
            ("Bank Account", "Yes", Decimal::new(-3000, 0)),
        ]
    );

    let xml = TallyXmlWriter::new().serialize_to_string(&document).unwrap();
    assert_eq!(xml.matches("<LEDGER ").count(), 1);
    assert!(xml.find("<LEDGER ").unwrap() < xml.find("<VOUCHER ").unwrap());
}

#[test]
fn zero_rows_produce_no_voucher() {
    let table = RawTable::from_text_rows(vec![
        vec!["Date", "Narration", "Debit", "Credit"],
        vec!["01/04/2024", "Opening Balance", "0", "0"],
    ]);

    let conversion = Converter::default()
        .convert(&table, ConversionMode::Bank, "Bank Account")
        .unwrap();

    assert!(conversion.document.vouchers.is_empty());
    assert!(conversion.document.ledgers.is_empty());
    assert_eq!(conversion.stats.skipped_zero, 1);
}

#[test]
fn unparseable_date_uses_fallback() {
    let table = RawTable::from_text_rows(vec![
        vec!["Date", "Narration", "Debit", "Credit"],
        vec!["N/A", "Bank charges", "118", ""],
    ]);

    let mut config = BankflowConfig::default();
    config.normalize.fallback_date = NaiveDate::from_ymd_opt(2024, 3, 31).unwrap();

    let conversion = Converter::new(config)
        .convert(&table, ConversionMode::Bank, "Bank Account")
        .unwrap();

    assert_eq!(conversion.document.vouchers.len(), 1);
    assert_eq!(
        conversion.document.vouchers[0].date,
        NaiveDate::from_ymd_opt(2024, 3, 31).unwrap()
    );
    assert_eq!(conversion.stats.dates_defaulted, 1);
}

#[test]
fn letterhead_rows_are_skipped() {
    let table = RawTable::from_text_rows(vec![
        vec!["HDFC BANK LTD", "", "", "", ""],
        vec!["Account No: 50100012345678", "", "", "", ""],
        vec!["Statement From: 01/04/2024 To: 30/04/2024", "", "", "", ""],
        vec!["Txn Date", "Particulars", "Withdrawal", "Deposit", "Balance"],
        vec!["01/04/2024", "NEFT-Salary", "", "85,000.00", "1,35,000.00"],
        vec!["03/04/2024", "ATM WDL", "2,000.00", "", "1,33,000.00"],
    ]);

    assert_eq!(HeaderResolver::new().resolve(&table).unwrap().index, 3);

    let conversion = Converter::default()
        .convert(&table, ConversionMode::Bank, "HDFC Bank")
        .unwrap();
    let kinds: Vec<VoucherKind> = conversion.document.vouchers.iter().map(|v| v.kind).collect();
    assert_eq!(kinds, vec![VoucherKind::Receipt, VoucherKind::Payment]);
    assert_eq!(conversion.document.vouchers[0].entries[1].ledger_name, "HDFC Bank");
}

#[test]
fn every_mode_balances() {
    let table = RawTable::from_text_rows(vec![
        vec!["Date", "Party Name", "Narration", "Debit Amount", "Credit Amount"],
        vec!["01/04/2024", "Acme Traders", "Inv 1", "1,250.50", ""],
        vec!["02/04/2024", "", "Inv 2", "", "99.99"],
        vec!["03/04/2024", "Zenith", "Inv 3", "-40", ""],
    ]);

    for mode in [ConversionMode::Sales, ConversionMode::Purchase, ConversionMode::Bank] {
        let conversion = Converter::default().convert(&table, mode, "Main").unwrap();
        assert_eq!(conversion.document.vouchers.len(), 3);
        for voucher in &conversion.document.vouchers {
            assert!(voucher.is_balanced(), "{mode}: {voucher:?}");
            assert!(voucher.entries.iter().all(|e| !e.ledger_name.is_empty()));
        }
        let suspense_masters = conversion.document.ledgers.len();
        assert_eq!(suspense_masters, usize::from(mode == ConversionMode::Bank));
    }
}

#[test]
fn sales_party_falls_back_to_narration() {
    let table = RawTable::from_text_rows(vec![
        vec!["Date", "Party Name", "Narration", "Amount"],
        vec!["02/04/2024", "", "Walk-in customer", "450"],
    ]);

    let conversion = Converter::default()
        .convert(&table, ConversionMode::Sales, "Sales Account")
        .unwrap();
    let voucher = &conversion.document.vouchers[0];

    assert_eq!(voucher.kind, VoucherKind::Sales);
    assert_eq!(
        legs(&voucher.entries),
        vec![
            ("Walk-in customer", "Yes", Decimal::new(-450, 0)),
            ("Sales Account", "No", Decimal::new(450, 0)),
        ]
    );
}

#[test]
fn serialization_is_byte_identical() {
    let table = RawTable::from_text_rows(vec![
        vec!["Date", "Narration", "Debit", "Credit"],
        vec!["01/04/2024", "Rent", "5000", "0"],
        vec!["02/04/2024", "Sale", "0", "3000"],
    ]);
    let converter = Converter::default();
    let writer = TallyXmlWriter::new();

    let first = converter.convert(&table, ConversionMode::Bank, "Bank Account").unwrap();
    let second = converter.convert(&table, ConversionMode::Bank, "Bank Account").unwrap();

    assert_eq!(first.document, second.document);
    assert_eq!(
        writer.serialize(&first.document).unwrap(),
        writer.serialize(&first.document).unwrap()
    );
    assert_eq!(
        writer.serialize(&first.document).unwrap(),
        writer.serialize(&second.document).unwrap()
    );
}

const LAID_OUT_STATEMENT: &str = "\
IDFC FIRST Bank Ltd
Statement of Account
Account No: 10023456789     Branch: Andheri East
Txn Date      Particulars              Withdrawal     Deposit      Balance
01/04/2024    Rent                       5,000.00               95,000.00
02/04/2024    Salary                                3,000.00    98,000.00
05/04/2024    Opening Balance                                1,00,000.00
";

#[test]
fn laid_out_text_keeps_blank_amount_columns() {
    let table = split_rows(LAID_OUT_STATEMENT, 2, &HeaderResolver::new());
    let conversion = Converter::default()
        .convert(&table, ConversionMode::Bank, "Bank Account")
        .unwrap();

    assert_eq!(conversion.header.index, 3);
    assert_eq!(conversion.stats.rows_seen, 3);
    assert_eq!(conversion.stats.skipped_zero, 1);

    let vouchers = &conversion.document.vouchers;
    assert_eq!(vouchers.len(), 2);

    assert_eq!(vouchers[0].kind, VoucherKind::Payment);
    assert_eq!(
        legs(&vouchers[0].entries),
        vec![
            ("Suspense Account", "Yes", Decimal::new(-500000, 2)),
            ("Bank Account", "No", Decimal::new(500000, 2)),
        ]
    );

    assert_eq!(vouchers[1].kind, VoucherKind::Receipt);
    assert_eq!(vouchers[1].date, NaiveDate::from_ymd_opt(2024, 4, 2).unwrap());
    assert_eq!(
        legs(&vouchers[1].entries),
        vec![
            ("Suspense Account", "No", Decimal::new(300000, 2)),
            ("Bank Account", "Yes", Decimal::new(-300000, 2)),
        ]
    );
}
