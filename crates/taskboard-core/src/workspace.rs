use std::sync::Arc;

use taskboard_shared::{BoardColumn, TaskId, TaskPatch};
use tracing::{debug, error, info, instrument, warn};

use crate::assignees::{AccountDirectory, AssigneeDropdown, AssigneeSelection};
use crate::board::BoardView;
use crate::cache::TaskCache;
use crate::card::CardView;
use crate::draft::TaskDraft;
use crate::drag::{DragController, DragEvent};
use crate::error::{BoardError, BoardResult};
use crate::popup::TaskPopup;
use crate::session::SubtaskList;
use crate::store::TaskStore;

pub const SAVE_FAILED: &str = "Error saving task details.";
pub const REMOVE_SUBTASK_FAILED: &str = "Error removing subtask.";
pub const UPDATE_SUBTASK_FAILED: &str = "Error updating subtask.";
pub const DELETE_FAILED: &str = "Error deleting task.";
pub const ADD_FAILED: &str = "Failed to add task due to an internal error";
pub const MOVE_FAILED: &str = "Could not move the task. It was put back.";
pub const ACCOUNTS_FAILED: &str = "Error loading accounts.";

/// Messages waiting to be shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Feedback {
    Alert(String),
    Inline { field: String, message: String },
}

/// Everything one board session owns. Handlers take `&mut self`, so two of
/// them can never interleave on the cache, board or popup.
pub struct Workspace {
    store: Arc<dyn TaskStore>,
    cache: TaskCache,
    board: BoardView,
    drag: DragController,
    directory: AccountDirectory,
    popup: Option<TaskPopup>,
    feedback: Vec<Feedback>,
}

impl Workspace {
    pub fn new(store: Arc<dyn TaskStore>) -> Self {
        Self {
            store,
            cache: TaskCache::new(),
            board: BoardView::default(),
            drag: DragController::new(),
            directory: AccountDirectory::default(),
            popup: None,
            feedback: Vec::new(),
        }
    }

    pub fn cache(&self) -> &TaskCache {
        &self.cache
    }

    pub fn board(&self) -> &BoardView {
        &self.board
    }

    pub fn drag(&self) -> &DragController {
        &self.drag
    }

    pub fn directory(&self) -> &AccountDirectory {
        &self.directory
    }

    pub fn popup(&self) -> Option<&TaskPopup> {
        self.popup.as_ref()
    }

    pub fn popup_mut(&mut self) -> Option<&mut TaskPopup> {
        self.popup.as_mut()
    }

    pub fn take_feedback(&mut self) -> Vec<Feedback> {
        std::mem::take(&mut self.feedback)
    }

    /// Re-fetches every task and redraws the board. A failed fetch leaves
    /// both the cache and the board as they were.
    #[instrument(skip(self))]
    pub async fn refresh(&mut self) -> BoardResult<()> {
        self.cache.refresh(self.store.as_ref()).await?;
        self.board = BoardView::from_cache(&self.cache);
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn load_directory(&mut self) -> BoardResult<&AccountDirectory> {
        let accounts = self.store.list_accounts().await?;
        self.directory = AccountDirectory::new(accounts);
        debug!(accounts = self.directory.len(), "account directory loaded");
        Ok(&self.directory)
    }

    /// Account lookup for badges and pickers. A failed fetch yields an empty
    /// directory, so badges fall back to bare initials.
    async fn directory_or_empty(&mut self) -> AccountDirectory {
        match self.load_directory().await {
            Ok(directory) => directory.clone(),
            Err(err) => {
                warn!(error = %err, "account directory unavailable; badges degrade to initials");
                AccountDirectory::default()
            }
        }
    }

    /// Cards of one column, in board order.
    pub fn cards(&self, column: BoardColumn) -> Vec<CardView> {
        self.board
            .column(column)
            .cards()
            .filter_map(|id| self.cache.get(id))
            .map(|task| CardView::new(task, &self.directory))
            .collect()
    }

    #[instrument(skip(self), fields(task = %id))]
    pub async fn open_task(&mut self, id: &TaskId) -> bool {
        let Some(task) = self.cache.get(id) else {
            warn!("task not in cache; popup not opened");
            return false;
        };
        let record = task.record.clone();
        let legacy = task.legacy_assignee.clone();

        let directory = self.directory_or_empty().await;
        let mut badges = directory.badges_for_names(&record.assignee_names);
        if badges.is_empty()
            && let Some(legacy) = legacy
        {
            badges.push(legacy);
        }

        self.popup = Some(TaskPopup::open(id.clone(), &record, badges));
        debug!("popup opened");
        true
    }

    #[instrument(skip(self), fields(task = %id))]
    pub async fn edit_task(&mut self, id: &TaskId) -> bool {
        let Some(record) = self.cache.get(id).map(|task| task.record.clone()) else {
            warn!("task not in cache; nothing to edit");
            return false;
        };
        if !self.popup_shows(id) && !self.open_task(id).await {
            return false;
        }

        // Without the directory the picker would save an empty assignee list.
        let directory = match self.load_directory().await {
            Ok(directory) => directory.clone(),
            Err(err) => {
                error!(error = %err, "account directory unavailable; staying in view mode");
                self.alert(ACCOUNTS_FAILED);
                return false;
            }
        };
        let selection = AssigneeSelection::from_names(&record.assignee_names, &directory);
        let dropdown = AssigneeDropdown::build(&directory, &selection);

        match self.popup.as_mut() {
            Some(popup) => {
                popup.enter_edit_mode(&record, selection, dropdown);
                debug!("popup switched to edit mode");
                true
            }
            None => false,
        }
    }

    /// Persists the open editor in one full update. On failure the popup
    /// stays open in edit mode.
    #[instrument(skip(self), fields(task = %id))]
    pub async fn save_task(&mut self, id: &TaskId) -> BoardResult<()> {
        let patch = match self.popup.as_ref() {
            Some(popup) if &popup.task_id == id => popup.build_patch(),
            _ => Err(BoardError::NoPopup),
        };
        let patch = match patch {
            Ok(patch) => patch,
            Err(err) => {
                self.queue_inline(&err);
                warn!(error = %err, "task not saved");
                return Err(err);
            }
        };

        if let Some(task) = self.cache.get(id) {
            for name in task
                .record
                .assignee_names
                .iter()
                .filter(|name| self.directory.find_by_name(name).is_none())
            {
                warn!(name = %name, "stored assignee has no account; dropped from the saved task");
            }
        }

        if let Err(err) = self.store.patch_task(id, &patch).await {
            error!(error = %err, "saving task failed");
            self.alert(SAVE_FAILED);
            return Err(err);
        }

        info!("task saved");
        self.popup = None;
        self.refresh().await
    }

    /// Removes one subtask of a stored task by overwriting both subtask
    /// arrays. The cache is left alone until the refresh that follows.
    #[instrument(skip(self), fields(task = %id))]
    pub async fn remove_subtask(&mut self, id: &TaskId, index: usize) -> BoardResult<()> {
        let mut list = self.stored_subtasks(id)?;
        list.remove(index)?;
        let patch = TaskPatch {
            subtasks: Some(list.texts()),
            subtasks_checked: Some(list.checked()),
            ..TaskPatch::default()
        };

        if let Err(err) = self.store.patch_task(id, &patch).await {
            error!(error = %err, index, "removing subtask failed");
            self.alert(REMOVE_SUBTASK_FAILED);
            return Err(err);
        }

        info!(index, remaining = list.len(), "subtask removed");
        self.refresh().await?;
        if self.popup_shows(id) {
            self.open_task(id).await;
        }
        Ok(())
    }

    /// Flips one completion flag on a stored task and persists both arrays.
    #[instrument(skip(self), fields(task = %id))]
    pub async fn toggle_subtask_done(&mut self, id: &TaskId, index: usize) -> BoardResult<bool> {
        let mut list = self.stored_subtasks(id)?;
        let checked = list.toggle_checked(index)?;
        let patch = TaskPatch {
            subtasks: Some(list.texts()),
            subtasks_checked: Some(list.checked()),
            ..TaskPatch::default()
        };

        if let Err(err) = self.store.patch_task(id, &patch).await {
            error!(error = %err, index, "updating subtask failed");
            self.alert(UPDATE_SUBTASK_FAILED);
            return Err(err);
        }

        debug!(index, checked, "subtask flag persisted");
        self.refresh().await?;
        if self.popup_shows(id) {
            self.open_task(id).await;
        }
        Ok(checked)
    }

    /// Fixes the text of a single stored subtask through the edit-subtask
    /// endpoint.
    #[instrument(skip(self, text), fields(task = %id))]
    pub async fn rename_subtask(&mut self, id: &TaskId, index: usize, text: &str) -> BoardResult<()> {
        let mut list = self.stored_subtasks(id)?;
        if let Err(err) = list.save(index, text) {
            self.queue_inline(&err);
            return Err(err);
        }
        let text = text.trim();

        if let Err(err) = self.store.edit_subtask(id, index, text).await {
            error!(error = %err, index, "renaming subtask failed");
            self.alert(UPDATE_SUBTASK_FAILED);
            return Err(err);
        }

        debug!(index, "subtask renamed");
        if let Some(popup) = self.popup.as_mut().filter(|popup| &popup.task_id == id)
            && let Err(err) = popup.session.save_subtask(index, text)
        {
            warn!(error = %err, index, "open popup could not take the renamed subtask");
        }
        self.refresh().await
    }

    fn popup_shows(&self, id: &TaskId) -> bool {
        self.popup.as_ref().is_some_and(|popup| &popup.task_id == id)
    }

    fn stored_subtasks(&self, id: &TaskId) -> BoardResult<SubtaskList> {
        match self.cache.get(id) {
            Some(task) => Ok(SubtaskList::from_parts(
                &task.record.subtasks,
                &task.record.subtasks_checked,
            )),
            None => {
                warn!(task = %id, "task not in cache");
                Err(BoardError::NotFound(id.clone()))
            }
        }
    }

    /// Raises the delete confirmation on the popup showing `id`.
    pub fn request_delete(&mut self, id: &TaskId) -> bool {
        match self.popup.as_mut() {
            Some(popup) if &popup.task_id == id => {
                popup.delete_confirmation = true;
                true
            }
            _ => {
                debug!(task = %id, "no popup for task; delete confirmation not shown");
                false
            }
        }
    }

    pub fn cancel_delete(&mut self) {
        if let Some(popup) = self.popup.as_mut() {
            popup.delete_confirmation = false;
        }
    }

    #[instrument(skip(self), fields(task = %id))]
    pub async fn delete_task(&mut self, id: &TaskId) -> BoardResult<()> {
        if let Err(err) = self.store.delete_task(id).await {
            error!(error = %err, "deleting task failed");
            self.alert(DELETE_FAILED);
            return Err(err);
        }

        info!("task deleted");
        self.popup = None;
        self.refresh().await
    }

    pub fn close_popup(&mut self) {
        if let Some(popup) = self.popup.take() {
            debug!(task = %popup.task_id, dirty = popup.session.is_dirty(), "popup closed");
        }
    }

    /// Feeds one pointer event to the drag controller and performs the move
    /// a completed drop asks for.
    pub async fn handle_drag(&mut self, event: DragEvent) -> BoardResult<()> {
        match self.drag.handle(event) {
            Some(request) => self.move_task(&request.task, request.to).await,
            None => Ok(()),
        }
    }

    /// Moves a card optimistically, then persists the new column. A failed
    /// request puts the card and the cached state back.
    #[instrument(skip(self), fields(task = %id))]
    pub async fn move_task(&mut self, id: &TaskId, to: BoardColumn) -> BoardResult<()> {
        let Some(current) = self.cache.get(id).map(|task| task.record.state) else {
            warn!("task not in cache; move ignored");
            return Err(BoardError::NotFound(id.clone()));
        };
        if current == to {
            debug!("dropped on its own column; nothing to do");
            return Ok(());
        }
        let Some(origin) = self.board.move_card(id, to) else {
            warn!("task not on the board; move ignored");
            return Err(BoardError::NotFound(id.clone()));
        };
        let previous = self.cache.set_state(id, to);

        match self.store.patch_task_state(id, to).await {
            Ok(()) => {
                info!(from = %origin.column, "task moved");
                Ok(())
            }
            Err(err) => {
                error!(error = %err, "persisting move failed; reverting");
                self.board.restore_card(id, origin);
                if let Some(previous) = previous {
                    self.cache.set_state(id, previous);
                }
                self.feedback.push(Feedback::Inline {
                    field: origin.column.box_id(),
                    message: MOVE_FAILED.to_string(),
                });
                Err(err)
            }
        }
    }

    /// Creates a task from the add form. Invalid fields are reported inline
    /// and nothing is sent.
    #[instrument(skip(self, draft))]
    pub async fn submit_draft(&mut self, draft: &mut TaskDraft) -> BoardResult<()> {
        let create = match draft.to_create(&self.directory) {
            Ok(create) => create,
            Err(err) => {
                self.queue_inline(&err);
                return Err(err);
            }
        };

        if let Err(err) = self.store.add_task(&create).await {
            error!(error = %err, "adding task failed");
            self.alert(ADD_FAILED);
            return Err(err);
        }

        info!(title = %create.title, "task added");
        draft.reset();
        self.refresh().await
    }

    fn alert(&mut self, message: &str) {
        self.feedback.push(Feedback::Alert(message.to_string()));
    }

    fn queue_inline(&mut self, err: &BoardError) {
        for field in err.field_errors() {
            self.feedback.push(Feedback::Inline {
                field: field.field.to_string(),
                message: field.message.clone(),
            });
        }
    }
}
