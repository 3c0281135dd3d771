use super::goals_model::GoalProgress;
use crate::versioning::VersionedRecord;

/// Aggregate of a goal's live ledger entries.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LedgerSummary {
    /// Signed sum of entry amounts.
    pub total: f64,
    pub entry_count: usize,
}

impl LedgerSummary {
    pub fn from_entries(entries: &[GoalProgress]) -> Self {
        let live = entries.iter().filter(|entry| !entry.is_deleted());
        Self {
            total: sum_progress(live.clone()),
            entry_count: live.count(),
        }
    }

    pub fn has_progress(&self) -> bool {
        self.entry_count > 0
    }
}

/// Arithmetic sum of `amount`. Entries may be negative, so the result can
/// shrink as entries are added.
pub fn sum_progress<'a, I>(entries: I) -> f64
where
    I: IntoIterator<Item = &'a GoalProgress>,
{
    entries.into_iter().map(|entry| entry.amount).sum()
}
