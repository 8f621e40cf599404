use taskboard_shared::{TaskId, TaskRecord};
use tracing::debug;

use crate::error::{BoardError, BoardResult, FieldError};

/// One subtask with its completion flag. Text and flag live together so a
/// removal can never shift one without the other.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubtaskRow {
    pub text: String,
    pub checked: bool,
    pub editing: bool,
}

impl SubtaskRow {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            checked: false,
            editing: false,
        }
    }
}

/// How a row is drawn: static text with edit/delete actions, or an inline
/// input with a confirm action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubtaskRowView<'a> {
    Display {
        index: usize,
        text: &'a str,
        checked: bool,
    },
    Editing {
        index: usize,
        draft: &'a str,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubtaskList {
    rows: Vec<SubtaskRow>,
}

impl SubtaskList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Zips stored texts with their flags. Missing flags read as unchecked,
    /// surplus flags are dropped.
    pub fn from_parts(subtasks: &[String], checked: &[bool]) -> Self {
        let rows = subtasks
            .iter()
            .enumerate()
            .map(|(idx, text)| SubtaskRow {
                text: text.clone(),
                checked: checked.get(idx).copied().unwrap_or(false),
                editing: false,
            })
            .collect();
        Self { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[SubtaskRow] {
        &self.rows
    }

    pub fn get(&self, index: usize) -> Option<&SubtaskRow> {
        self.rows.get(index)
    }

    pub fn push(&mut self, text: &str) -> BoardResult<usize> {
        let trimmed = required_text(text)?;
        self.rows.push(SubtaskRow::new(trimmed));
        Ok(self.rows.len() - 1)
    }

    pub fn begin_edit(&mut self, index: usize) -> BoardResult<()> {
        self.row_mut(index)?.editing = true;
        Ok(())
    }

    pub fn save(&mut self, index: usize, text: &str) -> BoardResult<()> {
        let row = self.row_mut(index)?;
        row.text = required_text(text)?.to_string();
        row.editing = false;
        Ok(())
    }

    pub fn remove(&mut self, index: usize) -> BoardResult<SubtaskRow> {
        self.check_index(index)?;
        Ok(self.rows.remove(index))
    }

    pub fn toggle_checked(&mut self, index: usize) -> BoardResult<bool> {
        let row = self.row_mut(index)?;
        row.checked = !row.checked;
        Ok(row.checked)
    }

    pub fn clear(&mut self) {
        self.rows.clear();
    }

    pub fn texts(&self) -> Vec<String> {
        self.rows.iter().map(|row| row.text.clone()).collect()
    }

    pub fn checked(&self) -> Vec<bool> {
        self.rows.iter().map(|row| row.checked).collect()
    }

    pub fn views(&self) -> Vec<SubtaskRowView<'_>> {
        self.rows
            .iter()
            .enumerate()
            .map(|(index, row)| {
                if row.editing {
                    SubtaskRowView::Editing {
                        index,
                        draft: &row.text,
                    }
                } else {
                    SubtaskRowView::Display {
                        index,
                        text: &row.text,
                        checked: row.checked,
                    }
                }
            })
            .collect()
    }

    fn check_index(&self, index: usize) -> BoardResult<()> {
        if index >= self.rows.len() {
            return Err(BoardError::SubtaskIndex {
                index,
                len: self.rows.len(),
            });
        }
        Ok(())
    }

    fn row_mut(&mut self, index: usize) -> BoardResult<&mut SubtaskRow> {
        let len = self.rows.len();
        self.rows
            .get_mut(index)
            .ok_or(BoardError::SubtaskIndex { index, len })
    }
}

fn required_text(text: &str) -> BoardResult<&str> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(BoardError::Validation(vec![FieldError::new(
            "subtask",
            "Subtask text is required",
        )]));
    }
    Ok(trimmed)
}

/// Working state of the popup editor for one task. Nothing here reaches the
/// store until the workspace saves the task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskEditSession {
    task_id: TaskId,
    subtasks: SubtaskList,
    dirty: bool,
}

impl TaskEditSession {
    pub fn open(task_id: TaskId, record: &TaskRecord) -> Self {
        let subtasks = SubtaskList::from_parts(&record.subtasks, &record.subtasks_checked);
        debug!(task = %task_id, subtasks = subtasks.len(), "edit session opened");
        Self {
            task_id,
            subtasks,
            dirty: false,
        }
    }

    pub fn task_id(&self) -> &TaskId {
        &self.task_id
    }

    pub fn subtasks(&self) -> &SubtaskList {
        &self.subtasks
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn rows(&self) -> Vec<SubtaskRowView<'_>> {
        self.subtasks.views()
    }

    pub fn add_subtask(&mut self, text: &str) -> BoardResult<usize> {
        let index = self.subtasks.push(text)?;
        self.dirty = true;
        Ok(index)
    }

    pub fn begin_edit(&mut self, index: usize) -> BoardResult<()> {
        self.subtasks.begin_edit(index)
    }

    pub fn save_subtask(&mut self, index: usize, text: &str) -> BoardResult<()> {
        self.subtasks.save(index, text)?;
        self.dirty = true;
        Ok(())
    }

    pub fn delete_subtask(&mut self, index: usize) -> BoardResult<SubtaskRow> {
        let removed = self.subtasks.remove(index)?;
        self.dirty = true;
        debug!(task = %self.task_id, index, remaining = self.subtasks.len(), "subtask removed from session");
        Ok(removed)
    }

    pub fn toggle_checked(&mut self, index: usize) -> BoardResult<bool> {
        let checked = self.subtasks.toggle_checked(index)?;
        self.dirty = true;
        Ok(checked)
    }
}
