use crate::Budget;
use serde::Serialize;

/// Whether a query was answered.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub enum QueryStatus {
    Ok,
    #[default]
    Refused,
}

/// How an answer was produced.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub enum Resolution {
    Analytic,
    #[default]
    Refused,
}

/// Fidelity of the returned detail fields.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub enum Confidence {
    #[default]
    Unknown,
    Exact,
}

/// Why a query or resolve pass was refused or cut short.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub enum RefusalReason {
    #[default]
    None,
    Budget,
    DomainInactive,
    NoSource,
    Internal,
}

/// Metadata attached to every sample and resolve result.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct QueryMeta {
    pub status: QueryStatus,
    pub resolution: Resolution,
    pub confidence: Confidence,
    pub refusal_reason: RefusalReason,
    /// Units charged by this call.
    pub cost_units: u32,
    /// Budget usage after the call.
    pub budget_used: u32,
    /// Budget ceiling at the time of the call.
    pub budget_max: u32,
}

impl QueryMeta {
    /// Refusal carrying a snapshot of the caller's budget.
    pub fn refused(reason: RefusalReason, budget: &Budget) -> Self {
        Self {
            status: QueryStatus::Refused,
            resolution: Resolution::Refused,
            confidence: Confidence::Unknown,
            refusal_reason: reason,
            cost_units: 0,
            budget_used: budget.used_units,
            budget_max: budget.max_units,
        }
    }

    /// Successful answer at the given confidence.
    pub fn ok(confidence: Confidence, cost_units: u32, budget: &Budget) -> Self {
        Self {
            status: QueryStatus::Ok,
            resolution: Resolution::Analytic,
            confidence,
            refusal_reason: RefusalReason::None,
            cost_units,
            budget_used: budget.used_units,
            budget_max: budget.max_units,
        }
    }

    pub fn is_refused(&self) -> bool {
        self.status == QueryStatus::Refused
    }
}
