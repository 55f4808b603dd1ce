//! Per-run document assembly.

use tracing::debug;

use crate::models::transaction::ConversionMode;
use crate::models::voucher::{Document, LedgerMaster, Voucher};

/// Tracks whether the suspense ledger master has been declared in this run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SuspenseLedgerState {
    #[default]
    Pending,
    Declared,
}

/// Collects vouchers in row order and declares the suspense ledger master
/// once, ahead of the first bank voucher.
#[derive(Debug)]
pub struct DocumentAssembler {
    mode: ConversionMode,
    suspense: LedgerMaster,
    state: SuspenseLedgerState,
    document: Document,
}

impl DocumentAssembler {
    pub fn new(mode: ConversionMode, suspense_ledger: impl Into<String>, suspense_parent: impl Into<String>) -> Self {
        Self {
            mode,
            suspense: LedgerMaster {
                name: suspense_ledger.into(),
                parent: suspense_parent.into(),
            },
            state: SuspenseLedgerState::Pending,
            document: Document::default(),
        }
    }

    pub fn state(&self) -> SuspenseLedgerState {
        self.state
    }

    /// Append a voucher.
    pub fn push(&mut self, voucher: Voucher) {
        if self.mode == ConversionMode::Bank && self.state == SuspenseLedgerState::Pending {
            debug!("Declaring suspense ledger {}", self.suspense.name);
            self.document.ledgers.push(self.suspense.clone());
            self.state = SuspenseLedgerState::Declared;
        }
        self.document.vouchers.push(voucher);
    }

    pub fn voucher_count(&self) -> usize {
        self.document.vouchers.len()
    }

    pub fn finish(self) -> Document {
        self.document
    }
}
