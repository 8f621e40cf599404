use taskboard_shared::{AccountId, TaskCategory, TaskId, TaskPatch, TaskPriority, TaskRecord};

use crate::assignees::{AssigneeBadge, AssigneeDropdown, AssigneeSelection};
use crate::draft::{check_due_date, require};
use crate::error::{BoardError, BoardResult};
use crate::session::TaskEditSession;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PopupMode {
    Viewing,
    Editing,
}

/// Actions offered in the popup's options menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskOption {
    Delete,
    Edit,
    Confirm,
}

/// Read-only task details as shown when the popup opens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PopupFields {
    pub title: String,
    pub description: String,
    pub due_date: String,
    pub category: TaskCategory,
    pub category_label: &'static str,
    pub priority: TaskPriority,
}

impl PopupFields {
    pub fn from_record(record: &TaskRecord) -> Self {
        Self {
            title: record.title.clone(),
            description: record.description.clone(),
            due_date: record.due_date.clone(),
            category: record.category,
            category_label: record.category.label(),
            priority: record.priority,
        }
    }
}

/// Editable inputs once the popup switches to edit mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditForm {
    pub title: String,
    pub description: String,
    pub due_date: String,
    pub category: TaskCategory,
    pub priority: TaskPriority,
}

impl EditForm {
    pub fn from_record(record: &TaskRecord) -> Self {
        Self {
            title: record.title.clone(),
            description: record.description.clone(),
            due_date: record.due_date.clone(),
            category: record.category,
            priority: record.priority,
        }
    }

    pub fn validate(&self) -> BoardResult<()> {
        let mut errors = Vec::new();
        require(&mut errors, "popupTitleInput", &self.title, "Title is required");
        check_due_date(&mut errors, "popupDueDateInput", &self.due_date);
        if errors.is_empty() {
            Ok(())
        } else {
            Err(BoardError::Validation(errors))
        }
    }
}

#[derive(Debug, Clone)]
pub struct TaskPopup {
    pub task_id: TaskId,
    pub fields: PopupFields,
    pub assignees: Vec<AssigneeBadge>,
    pub session: TaskEditSession,
    pub mode: PopupMode,
    pub options: Vec<TaskOption>,
    pub form: Option<EditForm>,
    pub selection: AssigneeSelection,
    pub dropdown: Option<AssigneeDropdown>,
    pub delete_confirmation: bool,
}

impl TaskPopup {
    pub fn open(task_id: TaskId, record: &TaskRecord, assignees: Vec<AssigneeBadge>) -> Self {
        Self {
            session: TaskEditSession::open(task_id.clone(), record),
            task_id,
            fields: PopupFields::from_record(record),
            assignees,
            mode: PopupMode::Viewing,
            options: vec![TaskOption::Delete, TaskOption::Edit],
            form: None,
            selection: AssigneeSelection::new(),
            dropdown: None,
            delete_confirmation: false,
        }
    }

    pub fn enter_edit_mode(
        &mut self,
        record: &TaskRecord,
        selection: AssigneeSelection,
        dropdown: AssigneeDropdown,
    ) {
        self.mode = PopupMode::Editing;
        self.form = Some(EditForm::from_record(record));
        self.selection = selection;
        self.dropdown = Some(dropdown);
        self.options = vec![TaskOption::Confirm];
    }

    /// Flips one checkbox of the assignee picker. `None` when the picker is
    /// closed or does not list the account.
    pub fn toggle_assignee(&mut self, id: &AccountId) -> Option<bool> {
        let dropdown = self.dropdown.as_mut()?;
        dropdown.toggle(id, &mut self.selection)
    }

    pub fn form_mut(&mut self) -> BoardResult<&mut EditForm> {
        self.form.as_mut().ok_or(BoardError::NoPopup)
    }

    /// Builds the single full update sent on save: form fields, the names of
    /// the checked assignee boxes, and the session's subtask arrays.
    pub fn build_patch(&self) -> BoardResult<TaskPatch> {
        let form = self.form.as_ref().ok_or(BoardError::NoPopup)?;
        form.validate()?;

        let assignee_names = self
            .dropdown
            .as_ref()
            .map(AssigneeDropdown::checked_names)
            .unwrap_or_default();
        let subtasks = self.session.subtasks();

        Ok(TaskPatch {
            title: Some(form.title.trim().to_string()),
            description: Some(form.description.trim().to_string()),
            due_date: Some(form.due_date.trim().to_string()),
            assignee_names: Some(assignee_names),
            category: Some(form.category),
            priority: Some(form.priority),
            subtasks: Some(subtasks.texts()),
            subtasks_checked: Some(subtasks.checked()),
        })
    }
}
