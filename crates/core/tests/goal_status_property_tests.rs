//! Property-based integration tests for goal status derivation, the ledger
//! sum and the installment projector.

use chrono::{Days, NaiveDate};
use goalledger_core::goals::{
    derive_status, display_status, project_installments, Goal, GoalProgress, GoalStatus,
    LedgerSummary,
};
use proptest::prelude::*;

// =============================================================================
// Generators
// =============================================================================

fn base_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
}

/// A date within roughly three years of the base date.
fn arb_date() -> impl Strategy<Value = NaiveDate> {
    (0u64..1100).prop_map(|offset| base_date() + Days::new(offset))
}

fn arb_status() -> impl Strategy<Value = GoalStatus> {
    prop_oneof![
        Just(GoalStatus::Pending),
        Just(GoalStatus::InProgress),
        Just(GoalStatus::Finished),
        Just(GoalStatus::Failed),
    ]
}

/// Whole-cent amounts, so sums stay exact in f64.
fn arb_amount() -> impl Strategy<Value = f64> {
    (-50_000i64..50_000)
        .prop_filter("amount must be non-zero", |cents| *cents != 0)
        .prop_map(|cents| cents as f64 / 100.0)
}

fn arb_entries(max: usize) -> impl Strategy<Value = Vec<(f64, bool)>> {
    proptest::collection::vec((arb_amount(), any::<bool>()), 0..=max)
}

fn to_progress(entries: &[(f64, bool)]) -> Vec<GoalProgress> {
    entries
        .iter()
        .enumerate()
        .map(|(i, (amount, deleted))| GoalProgress {
            id: i as i64 + 1,
            goal_id: 1,
            amount: *amount,
            date: base_date(),
            version: 1,
            deleted: *deleted,
            created_at: base_date().and_hms_opt(0, 0, 0).unwrap(),
        })
        .collect()
}

fn goal(current: f64, target: f64, deadline: NaiveDate, status: GoalStatus) -> Goal {
    Goal {
        id: 1,
        user_id: 1,
        name: "Goal".to_string(),
        description: "Generated".to_string(),
        color: "#000000".to_string(),
        target_amount: target,
        current_amount: current,
        deadline,
        status,
        version: 1,
        deleted: false,
        created_at: base_date().and_hms_opt(0, 0, 0).unwrap(),
    }
}

// =============================================================================
// Property Tests
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Meeting the target always finishes the goal, regardless of deadline,
    /// prior status or ledger history.
    #[test]
    fn prop_reaching_target_always_finishes(
        target in 1u32..100_000,
        surplus in 0u32..10_000,
        deadline in arb_date(),
        today in arb_date(),
        prior in arb_status(),
        has_progress in any::<bool>(),
    ) {
        let target = f64::from(target);
        let current = target + f64::from(surplus);
        prop_assert_eq!(
            derive_status(current, target, deadline, today, prior, has_progress),
            GoalStatus::Finished
        );
    }

    /// Below target, the goal fails exactly when today is past the deadline.
    #[test]
    fn prop_below_target_fails_only_after_deadline(
        target in 1u32..100_000,
        shortfall in 1u32..100_000,
        deadline in arb_date(),
        today in arb_date(),
        prior in arb_status(),
        has_progress in any::<bool>(),
    ) {
        let target = f64::from(target);
        let current = target - f64::from(shortfall);
        let status = derive_status(current, target, deadline, today, prior, has_progress);
        prop_assert_eq!(status == GoalStatus::Failed, today > deadline);
        prop_assert_ne!(status, GoalStatus::Finished);
    }

    /// An open goal with entries is never reported as Pending.
    #[test]
    fn prop_open_goal_with_entries_is_in_progress(
        current in -1000i32..1000,
        deadline in arb_date(),
        prior in arb_status(),
    ) {
        let status = derive_status(f64::from(current), 1000.0, deadline, base_date(), prior, true);
        prop_assert_eq!(status, GoalStatus::InProgress);
    }

    /// The ledger total equals the sum of live entries, and the count ignores
    /// deleted ones.
    #[test]
    fn prop_ledger_sums_live_entries(entries in arb_entries(40)) {
        let progress = to_progress(&entries);
        let summary = LedgerSummary::from_entries(&progress);

        let expected_cents: i64 = entries
            .iter()
            .filter(|(_, deleted)| !deleted)
            .map(|(amount, _)| (amount * 100.0).round() as i64)
            .sum();
        let live = entries.iter().filter(|(_, deleted)| !deleted).count();

        prop_assert_eq!((summary.total * 100.0).round() as i64, expected_cents);
        prop_assert_eq!(summary.entry_count, live);
        prop_assert_eq!(summary.has_progress(), live > 0);
    }

    /// Listing never shows an expired, under-target goal as open.
    #[test]
    fn prop_display_status_never_shows_expired_goal_open(
        current in 0u32..1000,
        deadline in arb_date(),
        today in arb_date(),
        stored in arb_status(),
    ) {
        let goal = goal(f64::from(current), 1000.0, deadline, stored);
        let shown = display_status(&goal, today);
        if today > deadline {
            prop_assert!(!shown.is_open());
        } else {
            prop_assert_eq!(shown, stored);
        }
    }

    /// Installments, when offered, cover exactly the remaining amount.
    #[test]
    fn prop_installments_cover_remaining_amount(
        target in 1u32..100_000,
        current in 0u32..100_000,
        deadline in arb_date(),
        today in arb_date(),
    ) {
        let (target, current) = (f64::from(target), f64::from(current));
        let plan = project_installments(target, current, deadline, today);

        if plan.is_empty() {
            prop_assert!(deadline <= today || current >= target || plan.period_count == 0);
        } else {
            prop_assert!(deadline > today);
            prop_assert!(plan.period_count >= 1);
            let covered = plan.period_amount * f64::from(plan.period_count);
            prop_assert!((covered - (target - current)).abs() < 1e-6);
        }
    }
}
