//! Task domain model.
//!
//! # Responsibility
//! - Define the canonical task record rendered by the view.
//! - Define the tri-state list filter and its stable text names.
//! - Validate user-provided title/due-date input.
//!
//! # Invariants
//! - `id` is assigned by storage and never reused.
//! - `title` is never empty for a persisted task.
//! - `due_date` is either empty or a `YYYY-MM-DD` calendar date when it
//!   enters through `TaskInput::parse`.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

static DUE_DATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("valid due date regex"));

/// Text format used for `due_date` values and date comparisons.
pub const DUE_DATE_FORMAT: &str = "%Y-%m-%d";

/// Store-assigned task identifier (SQLite rowid).
pub type TaskId = i64;

/// Canonical task record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    /// Empty string when the task has no due date.
    pub due_date: String,
    pub done: bool,
}

impl Task {
    /// Validates the persisted-state invariants of this record.
    pub fn validate(&self) -> Result<(), TaskValidationError> {
        validate_title(&self.title)
    }

    /// Returns whether this task is pending and due on `day`.
    pub fn is_due_on(&self, day: NaiveDate) -> bool {
        !self.done && self.due_date == format_due_date(day)
    }
}

/// Row totals shown alongside the list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskCounts {
    pub total: u64,
    pub done: u64,
    pub pending: u64,
}

/// View predicate over tasks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskFilter {
    #[default]
    All,
    Done,
    Pending,
}

impl TaskFilter {
    /// Filters in the order the view presents them.
    pub const ALL: [TaskFilter; 3] = [TaskFilter::All, TaskFilter::Pending, TaskFilter::Done];

    /// Stable lowercase name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Done => "done",
            Self::Pending => "pending",
        }
    }

    /// Next filter in presentation order, wrapping around.
    pub fn next(self) -> Self {
        match self {
            Self::All => Self::Pending,
            Self::Pending => Self::Done,
            Self::Done => Self::All,
        }
    }

    /// Whether `task` passes this filter.
    pub fn matches(self, task: &Task) -> bool {
        match self {
            Self::All => true,
            Self::Done => task.done,
            Self::Pending => !task.done,
        }
    }
}

impl Display for TaskFilter {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskFilter {
    type Err = TaskValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "done" => Ok(Self::Done),
            "pending" => Ok(Self::Pending),
            other => Err(TaskValidationError::UnknownFilter(other.to_string())),
        }
    }
}

/// Input validation failure for task fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskValidationError {
    /// Title is empty after trimming.
    EmptyTitle,
    /// Due date is neither empty nor a valid `YYYY-MM-DD` date.
    InvalidDueDate(String),
    /// Filter name is not one of `all|done|pending`.
    UnknownFilter(String),
}

impl Display for TaskValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "title cannot be empty"),
            Self::InvalidDueDate(value) => {
                write!(f, "due date `{value}` is not a valid YYYY-MM-DD date")
            }
            Self::UnknownFilter(value) => {
                write!(f, "unknown filter `{value}`; expected all|done|pending")
            }
        }
    }
}

impl Error for TaskValidationError {}

/// Normalized title/due-date pair accepted from user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskInput {
    pub title: String,
    pub due_date: String,
}

impl TaskInput {
    /// Trims both fields and validates them.
    ///
    /// # Errors
    /// - `EmptyTitle` when the trimmed title is empty.
    /// - `InvalidDueDate` when the trimmed date is non-empty and not a real
    ///   `YYYY-MM-DD` calendar date.
    pub fn parse(title: &str, due_date: &str) -> Result<Self, TaskValidationError> {
        let title = title.trim();
        let due_date = due_date.trim();
        validate_title(title)?;
        validate_due_date(due_date)?;
        Ok(Self {
            title: title.to_string(),
            due_date: due_date.to_string(),
        })
    }
}

/// Formats a calendar day the way `due_date` stores it.
pub fn format_due_date(day: NaiveDate) -> String {
    day.format(DUE_DATE_FORMAT).to_string()
}

pub(crate) fn validate_title(title: &str) -> Result<(), TaskValidationError> {
    if title.trim().is_empty() {
        return Err(TaskValidationError::EmptyTitle);
    }
    Ok(())
}

fn validate_due_date(due_date: &str) -> Result<(), TaskValidationError> {
    if due_date.is_empty() {
        return Ok(());
    }
    if !DUE_DATE_RE.is_match(due_date)
        || NaiveDate::parse_from_str(due_date, DUE_DATE_FORMAT).is_err()
    {
        return Err(TaskValidationError::InvalidDueDate(due_date.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{Task, TaskFilter, TaskInput, TaskValidationError};
    use chrono::NaiveDate;

    fn task(done: bool, due_date: &str) -> Task {
        Task {
            id: 1,
            title: "Buy milk".to_string(),
            due_date: due_date.to_string(),
            done,
        }
    }

    #[test]
    fn parse_trims_fields() {
        let input = TaskInput::parse("  Buy milk \t", " 2024-01-01 ").unwrap();
        assert_eq!(input.title, "Buy milk");
        assert_eq!(input.due_date, "2024-01-01");
    }

    #[test]
    fn parse_rejects_blank_title() {
        let err = TaskInput::parse("   ", "2024-01-01").unwrap_err();
        assert_eq!(err, TaskValidationError::EmptyTitle);
    }

    #[test]
    fn parse_accepts_empty_due_date() {
        let input = TaskInput::parse("Pay rent", "   ").unwrap();
        assert!(input.due_date.is_empty());
    }

    #[test]
    fn parse_rejects_malformed_and_impossible_dates() {
        for bad in ["tomorrow", "2024-1-01", "2024-02-30", "01-01-2024"] {
            let err = TaskInput::parse("x", bad).unwrap_err();
            assert_eq!(err, TaskValidationError::InvalidDueDate(bad.to_string()));
        }
    }

    #[test]
    fn filter_round_trips_through_text() {
        for filter in TaskFilter::ALL {
            assert_eq!(filter.as_str().parse::<TaskFilter>().unwrap(), filter);
        }
        assert!("archived".parse::<TaskFilter>().is_err());
    }

    #[test]
    fn filter_cycle_visits_every_variant() {
        let start = TaskFilter::All;
        assert_eq!(start.next().next().next(), start);
        assert_eq!(start.next(), TaskFilter::Pending);
    }

    #[test]
    fn filter_matches_by_done_flag() {
        assert!(TaskFilter::Done.matches(&task(true, "")));
        assert!(!TaskFilter::Done.matches(&task(false, "")));
        assert!(TaskFilter::Pending.matches(&task(false, "")));
        assert!(TaskFilter::All.matches(&task(true, "")));
    }

    #[test]
    fn is_due_on_requires_pending_and_same_day() {
        let day = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        assert!(task(false, "2024-01-01").is_due_on(day));
        assert!(!task(true, "2024-01-01").is_due_on(day));
        assert!(!task(false, "2024-01-02").is_due_on(day));
    }

    #[test]
    fn serializes_with_snake_case_filter() {
        let json = serde_json::to_string(&TaskFilter::Pending).unwrap();
        assert_eq!(json, "\"pending\"");
        let value = serde_json::to_value(task(false, "")).unwrap();
        assert_eq!(value["done"], serde_json::Value::Bool(false));
        assert_eq!(value["due_date"], serde_json::Value::String(String::new()));
    }
}
