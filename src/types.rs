use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Workflow state of an item.
///
/// The wire values ("todo", "in-progress", "done") appear in the database,
/// in form submissions and in listing query strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Todo,
    InProgress,
    Done,
}

impl Status {
    /// All states in display order.
    pub const ALL: [Status; 3] = [Status::Todo, Status::InProgress, Status::Done];

    pub fn as_str(self) -> &'static str {
        match self {
            Status::Todo => "todo",
            Status::InProgress => "in-progress",
            Status::Done => "done",
        }
    }

    /// Human-readable label for templates.
    pub fn label(self) -> &'static str {
        match self {
            Status::Todo => "Todo",
            Status::InProgress => "In progress",
            Status::Done => "Done",
        }
    }

    pub fn parse(value: &str) -> Option<Status> {
        match value {
            "todo" => Some(Status::Todo),
            "in-progress" => Some(Status::InProgress),
            "done" => Some(Status::Done),
            _ => None,
        }
    }

    /// Fold form input back to the default state when it is not a known
    /// value. Our own forms only send known values, so anything else is
    /// worth a log line - but not a rejected request.
    pub fn coerce(value: &str) -> Status {
        match Status::parse(value) {
            Some(status) => status,
            None => {
                if !value.is_empty() {
                    tracing::warn!("Unknown status value {:?} - storing as todo", value);
                }
                Status::Todo
            }
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A tracked work item as stored in the `items` table.
#[derive(Debug, Clone)]
pub struct Item {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub status: Status,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated form data ready to be written to the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemInput {
    pub title: String,
    pub description: Option<String>,
    pub status: Status,
}

/// Validation failure for an item form. Rendered verbatim on the form page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum FormError {
    #[error("Title is required")]
    TitleRequired,
}

/// Raw fields of the create/edit form as the browser sends them.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ItemForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: String,
}

impl ItemForm {
    /// Trim and validate the raw fields. The title is mandatory, a blank
    /// description becomes NULL and the status select is coerced to a known
    /// state.
    pub fn normalize(&self) -> Result<ItemInput, FormError> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(FormError::TitleRequired);
        }
        let description = self.description.trim();
        Ok(ItemInput {
            title: title.to_string(),
            description: if description.is_empty() { None } else { Some(description.to_string()) },
            status: Status::coerce(self.status.trim()),
        })
    }
}

/// Query parameters accepted by the listing page.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListParams {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub q: Option<String>,
    #[serde(default)]
    pub notice: Option<String>,
}

impl ListParams {
    /// The filter actually applied to the query: trimmed, with empty values
    /// treated as absent. The status is kept as a raw string on purpose - an
    /// unknown value must match nothing rather than be coerced.
    pub fn filter(&self) -> ItemFilter {
        ItemFilter {
            status: self.status.as_deref().map(str::trim).filter(|s| !s.is_empty()).map(str::to_string),
            q: self.q.as_deref().map(str::trim).filter(|s| !s.is_empty()).map(str::to_string),
        }
    }

    pub fn notice(&self) -> Option<Notice> {
        self.notice.as_deref().and_then(Notice::parse)
    }
}

/// Normalized listing filter used by the store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemFilter {
    pub status: Option<String>,
    pub q: Option<String>,
}

/// Per-status item counts for the listing header, always over the whole
/// table regardless of the active filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusCounts {
    pub all: i64,
    pub todo: i64,
    pub in_progress: i64,
    pub done: i64,
}

impl StatusCounts {
    pub fn get(&self, status: Status) -> i64 {
        match status {
            Status::Todo => self.todo,
            Status::InProgress => self.in_progress,
            Status::Done => self.done,
        }
    }
}

/// One-shot banner carried through the post-mutation redirect as a query
/// parameter. Unknown values in the URL are simply not shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    Created,
    Updated,
    Deleted,
}

impl Notice {
    pub fn as_str(self) -> &'static str {
        match self {
            Notice::Created => "created",
            Notice::Updated => "updated",
            Notice::Deleted => "deleted",
        }
    }

    pub fn parse(value: &str) -> Option<Notice> {
        match value {
            "created" => Some(Notice::Created),
            "updated" => Some(Notice::Updated),
            "deleted" => Some(Notice::Deleted),
            _ => None,
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            Notice::Created => "Item created",
            Notice::Updated => "Item updated",
            Notice::Deleted => "Item deleted",
        }
    }
}
