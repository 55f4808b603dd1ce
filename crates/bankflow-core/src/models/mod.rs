//! Data models for statements, transactions and vouchers.

pub mod config;
pub mod table;
pub mod transaction;
pub mod voucher;
