//! Budget metering for multi-pass scans.

use domain_query::{Budget, RefusalReason};

/// Charges a budget entity by entity and records how a scan was cut short.
///
/// The first refusal reason is kept; later ones never overwrite it. The
/// partial bit is sticky for the lifetime of the meter.
#[derive(Debug)]
pub struct ScanMeter<'b> {
    budget: &'b mut Budget,
    spent: u32,
    partial: bool,
    refusal: RefusalReason,
}

impl<'b> ScanMeter<'b> {
    pub fn new(budget: &'b mut Budget) -> Self {
        Self {
            budget,
            spent: 0,
            partial: false,
            refusal: RefusalReason::None,
        }
    }

    /// Charges `cost`; on failure marks the scan partial with reason `Budget`.
    pub fn charge(&mut self, cost: u32) -> bool {
        if self.budget.consume(cost) {
            self.spent = self.spent.saturating_add(cost);
            true
        } else {
            self.mark_partial(RefusalReason::Budget);
            false
        }
    }

    /// Marks the scan incomplete, keeping the first recorded reason.
    pub fn mark_partial(&mut self, reason: RefusalReason) {
        self.partial = true;
        if self.refusal == RefusalReason::None {
            self.refusal = reason;
        }
    }

    /// Marks the scan incomplete because part of it was deliberately skipped
    /// (a collapsed region); no refusal reason is recorded.
    pub fn mark_skipped(&mut self) {
        self.partial = true;
    }

    pub fn is_partial(&self) -> bool {
        self.partial
    }

    pub fn refusal(&self) -> RefusalReason {
        self.refusal
    }

    pub fn spent(&self) -> u32 {
        self.spent
    }

    pub fn budget(&self) -> &Budget {
        self.budget
    }
}
