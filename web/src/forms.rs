use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use todo_model::{Todo, TodoDraft, MAX_TITLE_LEN};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InputKind {
    Text,
    Textarea,
    Date,
    Checkbox,
}

/// Declarative description of one form field. The form template renders
/// inputs from it and `TodoForm::parse` applies its validation rules.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct FieldSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub input: InputKind,
    pub required: bool,
    pub max_len: Option<usize>,
    pub placeholder: &'static str,
}

pub const TODO_FIELDS: [FieldSpec; 4] = [
    FieldSpec {
        name: "title",
        label: "Title",
        input: InputKind::Text,
        required: true,
        max_len: Some(MAX_TITLE_LEN),
        placeholder: "Enter todo title",
    },
    FieldSpec {
        name: "description",
        label: "Description",
        input: InputKind::Textarea,
        required: false,
        max_len: None,
        placeholder: "Description (optional)",
    },
    FieldSpec {
        name: "due_date",
        label: "Due Date",
        input: InputKind::Date,
        required: false,
        max_len: None,
        placeholder: "",
    },
    FieldSpec {
        name: "resolved",
        label: "Mark as resolved",
        input: InputKind::Checkbox,
        required: false,
        max_len: None,
        placeholder: "",
    },
];

/// A raw form submission, exactly as the browser sent it. Checkboxes are
/// absent from the body when unchecked, hence the `Option`.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct TodoForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub due_date: String,
    #[serde(default)]
    pub resolved: Option<String>,
}

impl TodoForm {
    pub fn from_todo(todo: &Todo) -> Self {
        Self {
            title: todo.title.clone(),
            description: todo.description.clone(),
            due_date: todo.due_date.map(|due| due.to_string()).unwrap_or_default(),
            resolved: todo.resolved.then(|| "on".to_string()),
        }
    }

    pub fn parse(&self) -> Result<TodoDraft, FormErrors> {
        let mut errors = FormErrors::none();

        let title = self.title.trim().to_string();
        let description = self.description.trim().to_string();
        let due_date = self.due_date.trim();

        for field in &TODO_FIELDS {
            if field.input == InputKind::Checkbox {
                continue;
            }

            let value = match field.name {
                "title" => title.as_str(),
                "description" => description.as_str(),
                "due_date" => due_date,
                _ => "",
            };

            if field.required && value.is_empty() {
                errors.set(field.name, "This field is required.");
            } else if let Some(max) = field.max_len {
                let len = value.chars().count();
                if len > max {
                    errors.set(
                        field.name,
                        format!("Ensure this value has at most {max} characters (it has {len})."),
                    );
                }
            }
        }

        let due_date = if due_date.is_empty() {
            None
        } else {
            match NaiveDate::parse_from_str(due_date, "%Y-%m-%d") {
                Ok(date) => Some(date),
                Err(_) => {
                    errors.set("due_date", "Enter a valid date.");
                    None
                }
            }
        };

        if errors.any() {
            return Err(errors);
        }

        Ok(TodoDraft {
            title,
            description,
            due_date,
            resolved: self.resolved.is_some(),
        })
    }

    /// Per-field string values for re-rendering the form, keyed by field
    /// name so the template can look them up through `TODO_FIELDS`.
    pub fn values(&self) -> BTreeMap<&'static str, String> {
        BTreeMap::from([
            ("title", self.title.clone()),
            ("description", self.description.clone()),
            ("due_date", self.due_date.clone()),
            ("resolved", self.resolved.clone().unwrap_or_default()),
        ])
    }
}

/// Per-field error messages. Every field is always present (possibly with
/// an empty message) so templates can index it unconditionally.
#[derive(Clone, Debug, Serialize)]
pub struct FormErrors(BTreeMap<&'static str, String>);

impl FormErrors {
    pub fn none() -> Self {
        Self(
            TODO_FIELDS
                .iter()
                .map(|field| (field.name, String::new()))
                .collect(),
        )
    }

    fn set(&mut self, field: &'static str, message: impl Into<String>) {
        let slot = self.0.entry(field).or_default();
        if slot.is_empty() {
            *slot = message.into();
        }
    }

    pub fn get(&self, field: &str) -> &str {
        self.0.get(field).map(String::as_str).unwrap_or_default()
    }

    pub fn any(&self) -> bool {
        self.0.values().any(|message| !message.is_empty())
    }
}
