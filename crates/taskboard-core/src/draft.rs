use chrono::NaiveDate;
use taskboard_shared::{TaskCategory, TaskCreate, TaskPriority};

use crate::assignees::{AccountDirectory, AssigneeSelection};
use crate::error::{BoardError, BoardResult, FieldError};
use crate::session::SubtaskList;

pub const DUE_DATE_FORMAT: &str = "%Y-%m-%d";

pub(crate) fn require(errors: &mut Vec<FieldError>, field: &'static str, value: &str, message: &str) {
    if value.trim().is_empty() {
        errors.push(FieldError::new(field, message));
    }
}

pub(crate) fn check_due_date(errors: &mut Vec<FieldError>, field: &'static str, value: &str) {
    let value = value.trim();
    if value.is_empty() {
        errors.push(FieldError::new(field, "Due date is required"));
    } else if NaiveDate::parse_from_str(value, DUE_DATE_FORMAT).is_err() {
        errors.push(FieldError::new(field, "Due date must be YYYY-MM-DD"));
    }
}

/// The add-task form.
#[derive(Debug, Clone, Default)]
pub struct TaskDraft {
    pub title: String,
    pub description: String,
    pub due_date: String,
    /// Raw select value; empty until the user picks one.
    pub category: String,
    pub priority: TaskPriority,
    pub subtasks: SubtaskList,
    pub selection: AssigneeSelection,
}

impl TaskDraft {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn validate(&self) -> Result<TaskCategory, Vec<FieldError>> {
        let mut errors = Vec::new();
        require(&mut errors, "title", &self.title, "Title is required");
        require(&mut errors, "description", &self.description, "Description is required");
        check_due_date(&mut errors, "date", &self.due_date);

        let category = TaskCategory::parse(&self.category);
        if category.is_none() {
            errors.push(FieldError::new("categorySelect", "Category is required"));
        }

        match category {
            Some(category) if errors.is_empty() => Ok(category),
            _ => Err(errors),
        }
    }

    pub fn to_create(&self, directory: &AccountDirectory) -> BoardResult<TaskCreate> {
        let category = self.validate().map_err(BoardError::Validation)?;
        Ok(TaskCreate {
            title: self.title.trim().to_string(),
            description: self.description.trim().to_string(),
            due_date: self.due_date.trim().to_string(),
            assignee_names: self.selection.names(directory),
            category,
            priority: self.priority,
            subtasks: self.subtasks.texts(),
        })
    }

    /// Back to a blank form after a successful submit.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
