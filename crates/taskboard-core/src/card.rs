use taskboard_shared::{BoardColumn, TaskCategory, TaskId, TaskPriority};

use crate::assignees::{AccountDirectory, AssigneeBadge};
use crate::cache::CachedTask;

const DESCRIPTION_LIMIT: usize = 75;
const DESCRIPTION_KEEP: usize = 72;

/// Everything a board card shows for one task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardView {
    pub id: TaskId,
    pub category: TaskCategory,
    pub title: String,
    pub description: String,
    pub subtasks_done: usize,
    pub subtasks_total: usize,
    pub assignees: Vec<AssigneeBadge>,
    pub priority: TaskPriority,
    pub column: BoardColumn,
}

impl CardView {
    pub fn new(task: &CachedTask, directory: &AccountDirectory) -> Self {
        let record = &task.record;
        let mut assignees = directory.badges_for_names(&record.assignee_names);
        if assignees.is_empty()
            && let Some(legacy) = task.legacy_assignee.clone()
        {
            assignees.push(legacy);
        }

        Self {
            id: task.id.clone(),
            category: record.category,
            title: record.title.clone(),
            description: truncate_description(&record.description),
            subtasks_done: record.completed_subtasks(),
            subtasks_total: record.subtasks.len(),
            assignees,
            priority: record.priority,
            column: record.state,
        }
    }

    pub fn progress_label(&self) -> String {
        format!("{}/{} Subtasks", self.subtasks_done, self.subtasks_total)
    }
}

/// Descriptions longer than 75 characters are cut to 72 plus an ellipsis.
pub fn truncate_description(text: &str) -> String {
    if text.chars().count() <= DESCRIPTION_LIMIT {
        return text.to_string();
    }
    let mut out: String = text.chars().take(DESCRIPTION_KEEP).collect();
    out.push_str("...");
    out
}
