//! Budget-metered lookups shared by every entity kind.

use crate::{flags, EntityId};
use domain_query::{Budget, Confidence, CostTier, Policy, QueryMeta, RefusalReason};
use serde::Serialize;

/// Record stored in a domain table.
pub trait Entity: Copy + Default {
    fn id(&self) -> EntityId;

    /// Grouping key; `0` means ungrouped.
    fn region_id(&self) -> EntityId;

    /// Copy carrying only the stable identity fields, every detail zeroed.
    fn identity(&self) -> Self;
}

/// Result of a single-entity query.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Sample<T> {
    /// Copied record, or its identity-only stub when collapsed.
    pub record: T,
    pub flags: u32,
    pub meta: QueryMeta,
}

impl<T: Default> Sample<T> {
    /// Zeroed sample flagged unresolved, the starting point of every query.
    pub fn unresolved() -> Self {
        Self {
            record: T::default(),
            flags: flags::UNRESOLVED,
            meta: QueryMeta::default(),
        }
    }

    pub fn refused(reason: RefusalReason, budget: &Budget) -> Self {
        let mut sample = Self::unresolved();
        sample.meta = QueryMeta::refused(reason, budget);
        sample
    }
}

/// Read-only view of a domain needed by [`query_by_id`].
#[derive(Clone, Copy)]
pub struct QueryContext<'a> {
    pub active: bool,
    pub policy: &'a Policy,
    pub is_collapsed: &'a dyn Fn(EntityId) -> bool,
}

/// Looks up `id` in `rows`, charging the full-fidelity cost tier.
///
/// Inactive domains, exhausted budgets and unknown ids all produce refusals.
/// Entities in collapsed regions only expose their identity.
pub fn query_by_id<T: Entity>(
    ctx: QueryContext<'_>,
    rows: &[T],
    id: EntityId,
    budget: &mut Budget,
) -> Sample<T> {
    if !ctx.active {
        return Sample::refused(RefusalReason::DomainInactive, budget);
    }
    let cost = ctx.policy.cost(CostTier::Full);
    if !budget.consume(cost) {
        return Sample::refused(RefusalReason::Budget, budget);
    }
    let Some(row) = rows.iter().find(|row| id != 0 && row.id() == id) else {
        let mut sample = Sample::refused(RefusalReason::NoSource, budget);
        sample.meta.cost_units = cost;
        return sample;
    };
    if (ctx.is_collapsed)(row.region_id()) {
        return Sample {
            record: row.identity(),
            flags: flags::COLLAPSED,
            meta: QueryMeta::ok(Confidence::Unknown, cost, budget),
        };
    }
    Sample {
        record: *row,
        flags: 0,
        meta: QueryMeta::ok(Confidence::Exact, cost, budget),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    struct Row {
        id: EntityId,
        region: EntityId,
        payload: u32,
    }

    impl Entity for Row {
        fn id(&self) -> EntityId {
            self.id
        }
        fn region_id(&self) -> EntityId {
            self.region
        }
        fn identity(&self) -> Self {
            Row {
                id: self.id,
                region: self.region,
                payload: 0,
            }
        }
    }

    const ROWS: [Row; 2] = [
        Row { id: 1, region: 10, payload: 5 },
        Row { id: 2, region: 20, payload: 6 },
    ];

    fn ctx<'a>(active: bool, policy: &'a Policy, collapsed: &'a dyn Fn(EntityId) -> bool) -> QueryContext<'a> {
        QueryContext {
            active,
            policy,
            is_collapsed: collapsed,
        }
    }

    #[test]
    fn exact_hit_copies_the_record() {
        let policy = Policy::default();
        let mut budget = Budget::new(4);
        let sample = query_by_id(ctx(true, &policy, &|_: EntityId| false), &ROWS, 2, &mut budget);
        assert_eq!(sample.record, ROWS[1]);
        assert_eq!(sample.meta.confidence, Confidence::Exact);
        assert_eq!(budget.used_units, 1);
    }

    #[test]
    fn collapsed_hit_exposes_identity_only() {
        let policy = Policy::default();
        let mut budget = Budget::new(4);
        let sample = query_by_id(ctx(true, &policy, &|r: EntityId| r == 10), &ROWS, 1, &mut budget);
        assert_eq!(sample.record, Row { id: 1, region: 10, payload: 0 });
        assert_eq!(sample.flags, flags::COLLAPSED);
        assert_eq!(sample.meta.confidence, Confidence::Unknown);
    }

    #[test]
    fn refusals_are_zeroed_and_flagged() {
        let policy = Policy::default();
        let mut budget = Budget::new(1);
        let missing = query_by_id(ctx(true, &policy, &|_: EntityId| false), &ROWS, 0, &mut budget);
        assert_eq!(missing.meta.refusal_reason, RefusalReason::NoSource);
        assert_eq!(missing.record, Row::default());
        assert_eq!(missing.flags, flags::UNRESOLVED);

        let broke = query_by_id(ctx(true, &policy, &|_: EntityId| false), &ROWS, 1, &mut budget);
        assert_eq!(broke.meta.refusal_reason, RefusalReason::Budget);

        let mut budget = Budget::new(5);
        let inactive = query_by_id(ctx(false, &policy, &|_: EntityId| false), &ROWS, 1, &mut budget);
        assert_eq!(inactive.meta.refusal_reason, RefusalReason::DomainInactive);
        assert_eq!(budget.used_units, 0);
    }
}
