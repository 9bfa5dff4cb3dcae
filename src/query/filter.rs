use chrono::{DateTime, Utc};

use crate::dates::parse_date;
use crate::error::AppError;
use crate::models::Todo;

/// Inclusive bounds on `dueDate`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DateRange {
    pub fn contains(&self, value: &DateTime<Utc>) -> bool {
        *value >= self.start && *value <= self.end
    }
}

/// The predicate part of a listing. Every present field must match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TodoFilter {
    /// Owner predicate; set only for "my todos".
    pub owner: Option<String>,
    /// Compared verbatim against the stored status.
    pub status: Option<String>,
    /// Compared verbatim against the stored priority.
    pub priority: Option<String>,
    pub due: Option<DateRange>,
}

impl TodoFilter {
    /// Builds the predicate from raw parameters.
    ///
    /// Empty strings count as absent. The due-date range is applied only when both
    /// bounds are given; a lone bound is dropped. When both are given, an unparseable
    /// bound is a `BadRequest`.
    pub fn normalize(
        owner: Option<String>,
        status: Option<&str>,
        priority: Option<&str>,
        start_date: Option<&str>,
        end_date: Option<&str>,
    ) -> Result<Self, AppError> {
        let present = |value: Option<&str>| value.filter(|v| !v.is_empty()).map(str::to_string);

        let due = match (present(start_date), present(end_date)) {
            (Some(start), Some(end)) => Some(DateRange {
                start: parse_bound("startDate", &start)?,
                end: parse_bound("endDate", &end)?,
            }),
            _ => None,
        };

        Ok(Self {
            owner,
            status: present(status),
            priority: present(priority),
            due,
        })
    }

    /// Evaluates the predicate against one todo.
    pub fn matches(&self, todo: &Todo) -> bool {
        if let Some(owner) = &self.owner {
            if &todo.user_email != owner {
                return false;
            }
        }
        if let Some(status) = &self.status {
            if todo.status.as_str() != status {
                return false;
            }
        }
        if let Some(priority) = &self.priority {
            if todo.priority.as_str() != priority {
                return false;
            }
        }
        if let Some(range) = &self.due {
            match &todo.due_date {
                Some(due) if range.contains(due) => {}
                _ => return false,
            }
        }
        true
    }
}

fn parse_bound(name: &str, raw: &str) -> Result<DateTime<Utc>, AppError> {
    parse_date(raw).ok_or_else(|| AppError::BadRequest(format!("\"{}\" is not a valid date", name)))
}
