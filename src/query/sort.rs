use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::error::AppError;
use crate::models::Todo;

/// Fields a listing may be sorted by. Anything else is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Title,
    Description,
    Priority,
    Status,
    DueDate,
    CreatedAt,
    UserEmail,
}

impl SortField {
    pub const ALL: [SortField; 7] = [
        SortField::Title,
        SortField::Description,
        SortField::Priority,
        SortField::Status,
        SortField::DueDate,
        SortField::CreatedAt,
        SortField::UserEmail,
    ];

    /// Name used in query strings and JSON.
    pub fn api_name(&self) -> &'static str {
        match self {
            SortField::Title => "title",
            SortField::Description => "description",
            SortField::Priority => "priority",
            SortField::Status => "status",
            SortField::DueDate => "dueDate",
            SortField::CreatedAt => "createdAt",
            SortField::UserEmail => "userEmail",
        }
    }

    /// Column name in the `todos` table.
    pub fn column(&self) -> &'static str {
        match self {
            SortField::Title => "title",
            SortField::Description => "description",
            SortField::Priority => "priority",
            SortField::Status => "status",
            SortField::DueDate => "due_date",
            SortField::CreatedAt => "created_at",
            SortField::UserEmail => "user_email",
        }
    }

    /// SQL collation for text columns, so the database orders strings by byte value
    /// like [`SortField::compare`] does.
    pub fn collation(&self) -> Option<&'static str> {
        match self {
            SortField::Title | SortField::Description | SortField::UserEmail => Some("C"),
            _ => None,
        }
    }

    /// Ascending comparison on this field. Missing values sort first.
    pub fn compare(&self, a: &Todo, b: &Todo) -> Ordering {
        match self {
            SortField::Title => a.title.cmp(&b.title),
            SortField::Description => a.description.cmp(&b.description),
            SortField::Priority => a.priority.cmp(&b.priority),
            SortField::Status => a.status.cmp(&b.status),
            SortField::DueDate => a.due_date.cmp(&b.due_date),
            SortField::CreatedAt => a.created_at.cmp(&b.created_at),
            SortField::UserEmail => a.user_email.cmp(&b.user_email),
        }
    }
}

impl FromStr for SortField {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SortField::ALL
            .into_iter()
            .find(|field| field.api_name() == s)
            .ok_or_else(|| {
                let allowed: Vec<&str> = SortField::ALL.iter().map(|f| f.api_name()).collect();
                AppError::BadRequest(format!(
                    "Cannot sort by \"{}\"; allowed fields: {}",
                    s,
                    allowed.join(", ")
                ))
            })
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.api_name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// Single-key sort order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortSpec {
    pub field: SortField,
    pub direction: SortDirection,
}

impl Default for SortSpec {
    /// Newest first.
    fn default() -> Self {
        Self {
            field: SortField::CreatedAt,
            direction: SortDirection::Desc,
        }
    }
}

impl SortSpec {
    /// Resolves `sortBy`/`order`. Only the exact string `"desc"` sorts descending.
    pub fn resolve(sort_by: Option<&str>, order: Option<&str>) -> Result<Self, AppError> {
        let sort_by = match sort_by.filter(|s| !s.is_empty()) {
            Some(sort_by) => sort_by,
            None => return Ok(Self::default()),
        };

        let direction = if order == Some("desc") {
            SortDirection::Desc
        } else {
            SortDirection::Asc
        };

        Ok(Self {
            field: sort_by.parse()?,
            direction,
        })
    }

    /// Full ordering used by in-process stores: the sort key, then `id` ascending.
    pub fn compare(&self, a: &Todo, b: &Todo) -> Ordering {
        let primary = match self.direction {
            SortDirection::Asc => self.field.compare(a, b),
            SortDirection::Desc => self.field.compare(b, a),
        };
        primary.then_with(|| a.id.cmp(&b.id))
    }
}
