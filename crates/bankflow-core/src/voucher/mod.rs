//! Voucher construction, document assembly and XML output.

pub mod assembler;
pub mod builder;
pub mod xml;

pub use assembler::{DocumentAssembler, SuspenseLedgerState};
pub use builder::VoucherBuilder;
pub use xml::TallyXmlWriter;
