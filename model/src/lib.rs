use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const MAX_TITLE_LEN: usize = 200;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("title must not be empty")]
    TitleEmpty,
    #[error("title must be at most 200 characters, got {0}")]
    TitleTooLong(usize),
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum TodoError {
    #[error("todo {0} not found")]
    NotFound(u64),
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

pub fn validate_title(title: &str) -> Result<(), ValidationError> {
    if title.is_empty() {
        return Err(ValidationError::TitleEmpty);
    }

    let len = title.chars().count();
    if len > MAX_TITLE_LEN {
        return Err(ValidationError::TitleTooLong(len));
    }

    Ok(())
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Todo {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub resolved: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Todo {
    pub fn new(id: u64, draft: TodoDraft) -> Result<Self, ValidationError> {
        validate_title(&draft.title)?;

        let now = Utc::now();

        Ok(Self {
            id,
            title: draft.title,
            description: draft.description,
            due_date: draft.due_date,
            resolved: draft.resolved,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn is_overdue(&self) -> bool {
        self.is_overdue_on(Utc::now().date_naive())
    }

    /// Overdue means the due date is strictly in the past and the todo is
    /// still unresolved. Never stored, recomputed on every read.
    pub fn is_overdue_on(&self, today: NaiveDate) -> bool {
        match self.due_date {
            Some(due) => !self.resolved && due < today,
            None => false,
        }
    }

    pub fn apply(&mut self, patch: TodoPatch) -> Result<(), ValidationError> {
        if let Some(title) = patch.title {
            validate_title(&title)?;
            self.title = title;
        }

        if let Some(description) = patch.description {
            self.description = description;
        }

        if let Some(due_date) = patch.due_date {
            self.due_date = due_date;
        }

        if let Some(resolved) = patch.resolved {
            self.resolved = resolved;
        }

        self.updated_at = Utc::now();

        Ok(())
    }

    pub fn toggle(&mut self) {
        self.resolved = !self.resolved;
        self.updated_at = Utc::now();
    }
}

#[derive(Clone, Debug, Default)]
pub struct TodoDraft {
    pub title: String,
    pub description: String,
    pub due_date: Option<NaiveDate>,
    pub resolved: bool,
}

/// Partial update. `due_date` is doubly optional so a patch can distinguish
/// "leave the date alone" from "clear the date".
#[derive(Clone, Debug, Default)]
pub struct TodoPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub due_date: Option<Option<NaiveDate>>,
    pub resolved: Option<bool>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StatusFilter {
    #[default]
    All,
    Active,
    Resolved,
}

impl StatusFilter {
    /// Lenient parse of the `status` query parameter: anything other than
    /// the two known values selects everything.
    pub fn from_query(value: Option<&str>) -> Self {
        match value {
            Some("active") => Self::Active,
            Some("resolved") => Self::Resolved,
            _ => Self::All,
        }
    }

    pub fn matches(self, todo: &Todo) -> bool {
        match self {
            Self::All => true,
            Self::Active => !todo.resolved,
            Self::Resolved => todo.resolved,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Active => "active",
            Self::Resolved => "resolved",
        }
    }
}
