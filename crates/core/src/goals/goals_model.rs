//! Goals domain models.

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::errors::{FieldErrors, Result, ValidationError};
use crate::versioning::VersionedRecord;

const MAX_NAME_BYTES: usize = 500;
const MAX_DESCRIPTION_BYTES: usize = 1000;
const MAX_COLOR_BYTES: usize = 50;

/// Lifecycle status of a goal, derived from its ledger and deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GoalStatus {
    Pending,
    InProgress,
    Finished,
    Failed,
}

impl GoalStatus {
    /// Integer code used by the store.
    pub fn code(self) -> i32 {
        match self {
            GoalStatus::Pending => 1,
            GoalStatus::InProgress => 2,
            GoalStatus::Finished => 3,
            GoalStatus::Failed => 4,
        }
    }

    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            1 => Some(GoalStatus::Pending),
            2 => Some(GoalStatus::InProgress),
            3 => Some(GoalStatus::Finished),
            4 => Some(GoalStatus::Failed),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            GoalStatus::Pending => "PENDING",
            GoalStatus::InProgress => "IN_PROGRESS",
            GoalStatus::Finished => "FINISHED",
            GoalStatus::Failed => "FAILED",
        }
    }

    /// Pending and InProgress are the open states.
    pub fn is_open(self) -> bool {
        matches!(self, GoalStatus::Pending | GoalStatus::InProgress)
    }
}

impl fmt::Display for GoalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GoalStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PENDING" => Ok(GoalStatus::Pending),
            "IN_PROGRESS" => Ok(GoalStatus::InProgress),
            "FINISHED" => Ok(GoalStatus::Finished),
            "FAILED" => Ok(GoalStatus::Failed),
            other => Err(ValidationError::InvalidInput(format!(
                "Unknown goal status '{other}'"
            ))),
        }
    }
}

/// Domain model representing a goal
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Goal {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub description: String,
    pub color: String,
    pub target_amount: f64,
    /// Sum of the goal's live ledger entries. Only reconciliation writes it.
    pub current_amount: f64,
    pub deadline: NaiveDate,
    pub status: GoalStatus,
    pub version: i32,
    #[serde(skip)]
    pub deleted: bool,
    pub created_at: NaiveDateTime,
}

impl VersionedRecord for Goal {
    fn id(&self) -> i64 {
        self.id
    }

    fn version(&self) -> i32 {
        self.version
    }

    fn is_deleted(&self) -> bool {
        self.deleted
    }

    fn set_version(&mut self, version: i32) {
        self.version = version;
    }
}

/// Input model for creating a new goal.
///
/// The store starts every goal at `current_amount = 0`, `Pending`, version 1.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct NewGoal {
    /// Filled in from the caller's identity, never from the payload.
    #[serde(skip_deserializing, default)]
    pub user_id: i64,
    pub name: String,
    pub description: String,
    pub color: String,
    pub target_amount: f64,
    pub deadline: NaiveDate,
}

impl NewGoal {
    pub fn validate(&self) -> Result<()> {
        let mut errors = FieldErrors::new();
        check_goal_fields(
            &mut errors,
            &self.name,
            &self.description,
            &self.color,
            self.target_amount,
        );
        errors.into_result()
    }
}

/// Input model for a direct edit of a goal. `version` is the token the
/// client read; a stale one is rejected as a conflict.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct GoalUpdate {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub color: String,
    pub target_amount: f64,
    pub deadline: NaiveDate,
    pub version: i32,
}

impl GoalUpdate {
    pub fn validate(&self) -> Result<()> {
        let mut errors = FieldErrors::new();
        check_goal_fields(
            &mut errors,
            &self.name,
            &self.description,
            &self.color,
            self.target_amount,
        );
        errors.check(self.version >= 1, "version", "must be provided");
        errors.into_result()
    }
}

fn check_goal_fields(
    errors: &mut FieldErrors,
    name: &str,
    description: &str,
    color: &str,
    target_amount: f64,
) {
    errors.check(!name.trim().is_empty(), "name", "must be provided");
    errors.check(
        name.len() <= MAX_NAME_BYTES,
        "name",
        "must not be more than 500 bytes long",
    );
    errors.check(
        !description.trim().is_empty(),
        "description",
        "must be provided",
    );
    errors.check(
        description.len() <= MAX_DESCRIPTION_BYTES,
        "description",
        "must not be more than 1000 bytes long",
    );
    errors.check(!color.trim().is_empty(), "color", "must be provided");
    errors.check(
        color.len() <= MAX_COLOR_BYTES,
        "color",
        "must not be more than 50 bytes long",
    );
    errors.check(
        target_amount.is_finite() && target_amount > 0.0,
        "amount",
        "must be greater than zero",
    );
}

/// One ledger entry: a dated contribution (or withdrawal, when negative)
/// toward a goal.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GoalProgress {
    pub id: i64,
    pub goal_id: i64,
    pub amount: f64,
    pub date: NaiveDate,
    pub version: i32,
    #[serde(skip)]
    pub deleted: bool,
    pub created_at: NaiveDateTime,
}

impl VersionedRecord for GoalProgress {
    fn id(&self) -> i64 {
        self.id
    }

    fn version(&self) -> i32 {
        self.version
    }

    fn is_deleted(&self) -> bool {
        self.deleted
    }

    fn set_version(&mut self, version: i32) {
        self.version = version;
    }
}

/// Input model for recording progress against a goal
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct NewGoalProgress {
    pub goal_id: i64,
    pub amount: f64,
    pub date: NaiveDate,
}

impl NewGoalProgress {
    pub fn validate(&self) -> Result<()> {
        let mut errors = FieldErrors::new();
        errors.check(self.goal_id > 0, "goal", "must be provided");
        check_progress_amount(&mut errors, self.amount);
        errors.into_result()
    }
}

/// Input model for editing a ledger entry. When `version` is given it is used
/// as the compare-and-swap token instead of the freshly read one. A missing
/// `date` keeps the entry's stored date.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct GoalProgressUpdate {
    pub id: i64,
    pub amount: f64,
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub version: Option<i32>,
}

impl GoalProgressUpdate {
    pub fn validate(&self) -> Result<()> {
        let mut errors = FieldErrors::new();
        errors.check(self.id > 0, "id", "must be provided");
        check_progress_amount(&mut errors, self.amount);
        if let Some(version) = self.version {
            errors.check(version >= 1, "version", "must be a positive number");
        }
        errors.into_result()
    }
}

fn check_progress_amount(errors: &mut FieldErrors, amount: f64) {
    errors.check(amount.is_finite(), "amount", "must be a number");
    errors.check(amount != 0.0, "amount", "must be provided");
}

/// Suggested periodic contribution to reach a goal by its deadline.
/// Advisory only; never persisted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Installments {
    pub period_amount: f64,
    pub period_count: i32,
}

impl Installments {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.period_count == 0
    }
}

/// Read model returned by goal queries.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GoalDetails {
    #[serde(flatten)]
    pub goal: Goal,
    pub installments: Installments,
}

/// Sortable columns for goal listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GoalSortColumn {
    Id,
    Name,
    Deadline,
    CreatedAt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GoalSort {
    pub column: GoalSortColumn,
    pub descending: bool,
}

/// Filters for listing a user's goals.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GoalFilters {
    /// Case-insensitive substring match on the name. Empty matches all.
    /// The SQLite store folds ASCII letters only, so "FÉRIAS" does not
    /// find "Férias".
    pub name: String,
    pub status: Option<GoalStatus>,
    pub page: i64,
    pub page_size: i64,
    /// One of `id`, `name`, `deadline`, `created_at`, optionally prefixed
    /// with `-` for descending order.
    pub sort: String,
}

impl Default for GoalFilters {
    fn default() -> Self {
        Self {
            name: String::new(),
            status: None,
            page: 1,
            page_size: 20,
            sort: "id".to_string(),
        }
    }
}

impl GoalFilters {
    pub const MAX_PAGE: i64 = 10_000_000;
    pub const MAX_PAGE_SIZE: i64 = 100;

    pub fn validate(&self) -> Result<()> {
        let mut errors = FieldErrors::new();
        errors.check(self.page > 0, "page", "must be greater than zero");
        errors.check(
            self.page <= Self::MAX_PAGE,
            "page",
            "must be a maximum of 10 million",
        );
        errors.check(self.page_size > 0, "page_size", "must be greater than zero");
        errors.check(
            self.page_size <= Self::MAX_PAGE_SIZE,
            "page_size",
            "must be a maximum of 100",
        );
        errors.check(self.parse_sort().is_some(), "sort", "invalid sort value");
        errors.into_result()
    }

    /// Parses `sort` against the safelist. `None` for anything else.
    pub fn parse_sort(&self) -> Option<GoalSort> {
        let (descending, key) = match self.sort.strip_prefix('-') {
            Some(key) => (true, key),
            None => (false, self.sort.as_str()),
        };
        let column = match key {
            "id" => GoalSortColumn::Id,
            "name" => GoalSortColumn::Name,
            "deadline" => GoalSortColumn::Deadline,
            "created_at" => GoalSortColumn::CreatedAt,
            _ => return None,
        };
        Some(GoalSort { column, descending })
    }

    pub fn limit(&self) -> i64 {
        self.page_size
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.page_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::Error;

    fn new_goal() -> NewGoal {
        NewGoal {
            user_id: 1,
            name: "Emergency fund".to_string(),
            description: "Six months of expenses".to_string(),
            color: "#00aa88".to_string(),
            target_amount: 1200.0,
            deadline: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
        }
    }

    fn invalid_fields(err: Error) -> Vec<String> {
        match err {
            Error::Validation(ValidationError::Fields(fields)) => fields.into_keys().collect(),
            other => panic!("expected field errors, got {other:?}"),
        }
    }

    #[test]
    fn new_goal_requires_name_description_color_and_positive_target() {
        assert!(new_goal().validate().is_ok());

        let mut goal = new_goal();
        goal.name = "  ".to_string();
        goal.description = String::new();
        goal.color = String::new();
        goal.target_amount = 0.0;
        let fields = invalid_fields(goal.validate().unwrap_err());
        assert_eq!(fields, vec!["amount", "color", "description", "name"]);

        let mut goal = new_goal();
        goal.target_amount = -5.0;
        assert_eq!(invalid_fields(goal.validate().unwrap_err()), vec!["amount"]);
    }

    #[test]
    fn new_goal_rejects_oversized_name() {
        let mut goal = new_goal();
        goal.name = "x".repeat(501);
        assert_eq!(invalid_fields(goal.validate().unwrap_err()), vec!["name"]);
    }

    #[test]
    fn progress_amount_may_be_negative_but_not_zero() {
        let mut entry = NewGoalProgress {
            goal_id: 3,
            amount: -40.0,
            date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
        };
        assert!(entry.validate().is_ok());

        entry.amount = 0.0;
        assert_eq!(invalid_fields(entry.validate().unwrap_err()), vec!["amount"]);

        entry.amount = f64::NAN;
        assert_eq!(invalid_fields(entry.validate().unwrap_err()), vec!["amount"]);
    }

    #[test]
    fn filters_accept_safelisted_sorts_only() {
        let mut filters = GoalFilters::default();
        assert!(filters.validate().is_ok());

        filters.sort = "-deadline".to_string();
        assert_eq!(
            filters.parse_sort(),
            Some(GoalSort {
                column: GoalSortColumn::Deadline,
                descending: true
            })
        );

        filters.sort = "current_amount".to_string();
        assert_eq!(invalid_fields(filters.validate().unwrap_err()), vec!["sort"]);
    }

    #[test]
    fn filters_bound_page_and_page_size() {
        let filters = GoalFilters {
            page: 0,
            page_size: 101,
            ..GoalFilters::default()
        };
        assert_eq!(
            invalid_fields(filters.validate().unwrap_err()),
            vec!["page", "page_size"]
        );

        let filters = GoalFilters {
            page: 3,
            page_size: 25,
            ..GoalFilters::default()
        };
        assert_eq!(filters.offset(), 50);
        assert_eq!(filters.limit(), 25);
    }

    #[test]
    fn status_codes_and_names_round_trip() {
        for status in [
            GoalStatus::Pending,
            GoalStatus::InProgress,
            GoalStatus::Finished,
            GoalStatus::Failed,
        ] {
            assert_eq!(GoalStatus::from_code(status.code()), Some(status));
            assert_eq!(status.as_str().parse::<GoalStatus>().unwrap(), status);
        }
        assert_eq!(GoalStatus::from_code(0), None);
        assert!("UNKNOWN".parse::<GoalStatus>().is_err());
        assert_eq!(
            serde_json::to_string(&GoalStatus::InProgress).unwrap(),
            "\"IN_PROGRESS\""
        );
    }
}
