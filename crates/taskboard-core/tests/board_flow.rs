use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use taskboard_core::board::BoardNode;
use taskboard_core::draft::TaskDraft;
use taskboard_core::drag::DragEvent;
use taskboard_core::popup::PopupMode;
use taskboard_core::store::{Endpoint, TaskStore};
use taskboard_core::workspace::{
    ACCOUNTS_FAILED, ADD_FAILED, DELETE_FAILED, MOVE_FAILED, REMOVE_SUBTASK_FAILED, SAVE_FAILED,
};
use taskboard_core::{BoardError, BoardResult, Feedback, Workspace};
use taskboard_shared::{
    Account, AccountId, BoardColumn, TaskCategory, TaskCreate, TaskId, TaskPatch, TaskPriority,
    TaskRecord,
};

#[derive(Default)]
struct Backend {
    tasks: BTreeMap<TaskId, TaskRecord>,
    accounts: BTreeMap<AccountId, Account>,
    fail_list: bool,
    fail_accounts: bool,
    fail_writes: bool,
    requests: Vec<String>,
    patches: Vec<(TaskId, TaskPatch)>,
    next_id: usize,
}

/// In-memory backend with switchable failures and a request log.
#[derive(Default)]
struct FakeStore {
    inner: Mutex<Backend>,
}

impl FakeStore {
    fn with_tasks(tasks: Vec<(&str, TaskRecord)>) -> Arc<Self> {
        let store = Self::default();
        {
            let mut backend = store.inner.lock();
            for (id, record) in tasks {
                backend.tasks.insert(TaskId::from(id), record);
            }
            for (id, first, last, color) in [
                ("a1", "Ada", "Lovelace", "#ff7a00"),
                ("a2", "Alan", "Turing", "#9327ff"),
            ] {
                backend.accounts.insert(
                    AccountId::from(id),
                    Account {
                        first_name: first.to_string(),
                        last_name: last.to_string(),
                        initials: None,
                        profile_color: Some(color.to_string()),
                    },
                );
            }
        }
        Arc::new(store)
    }

    fn set(&self, change: impl FnOnce(&mut Backend)) {
        change(&mut *self.inner.lock());
    }

    fn requests(&self) -> Vec<String> {
        self.inner.lock().requests.clone()
    }

    fn last_patch(&self) -> Option<(TaskId, TaskPatch)> {
        self.inner.lock().patches.last().cloned()
    }

    fn task(&self, id: &str) -> Option<TaskRecord> {
        self.inner.lock().tasks.get(&TaskId::from(id)).cloned()
    }
}

fn failure(endpoint: &Endpoint) -> BoardError {
    BoardError::Http {
        endpoint: endpoint.to_string(),
        status: 500,
        body: "internal error".to_string(),
    }
}

fn log(backend: &mut Backend, endpoint: &Endpoint, fail: bool) -> BoardResult<()> {
    backend.requests.push(endpoint.to_string());
    if fail {
        return Err(failure(endpoint));
    }
    Ok(())
}

#[async_trait]
impl TaskStore for FakeStore {
    async fn list_tasks(&self) -> BoardResult<BTreeMap<TaskId, TaskRecord>> {
        let mut backend = self.inner.lock();
        let fail = backend.fail_list;
        log(&mut backend, &Endpoint::ListTasks, fail)?;
        Ok(backend.tasks.clone())
    }

    async fn get_account(&self, id: &AccountId) -> BoardResult<Account> {
        let mut backend = self.inner.lock();
        let endpoint = Endpoint::GetAccount(id.clone());
        let fail = backend.fail_accounts;
        log(&mut backend, &endpoint, fail)?;
        backend.accounts.get(id).cloned().ok_or(BoardError::Http {
            endpoint: endpoint.to_string(),
            status: 404,
            body: String::new(),
        })
    }

    async fn list_accounts(&self) -> BoardResult<BTreeMap<AccountId, Account>> {
        let mut backend = self.inner.lock();
        let fail = backend.fail_accounts;
        log(&mut backend, &Endpoint::ListAccounts, fail)?;
        Ok(backend.accounts.clone())
    }

    async fn add_task(&self, create: &TaskCreate) -> BoardResult<()> {
        let mut backend = self.inner.lock();
        let fail = backend.fail_writes;
        log(&mut backend, &Endpoint::AddTask, fail)?;
        backend.next_id += 1;
        let id = TaskId::new(format!("new{}", backend.next_id));
        backend.tasks.insert(
            id,
            TaskRecord {
                title: create.title.clone(),
                description: create.description.clone(),
                due_date: create.due_date.clone(),
                category: create.category,
                priority: create.priority,
                assignee_names: create.assignee_names.clone(),
                subtasks: create.subtasks.clone(),
                subtasks_checked: vec![false; create.subtasks.len()],
                state: BoardColumn::Todo,
                assignee_id: None,
            },
        );
        Ok(())
    }

    async fn delete_task(&self, id: &TaskId) -> BoardResult<()> {
        let mut backend = self.inner.lock();
        let fail = backend.fail_writes;
        log(&mut backend, &Endpoint::DeleteTask(id.clone()), fail)?;
        backend.tasks.remove(id);
        Ok(())
    }

    async fn patch_task(&self, id: &TaskId, patch: &TaskPatch) -> BoardResult<()> {
        let mut backend = self.inner.lock();
        let fail = backend.fail_writes;
        log(&mut backend, &Endpoint::EditTask(id.clone()), fail)?;
        backend.patches.push((id.clone(), patch.clone()));
        if let Some(record) = backend.tasks.get_mut(id) {
            let patch = patch.clone();
            if let Some(title) = patch.title {
                record.title = title;
            }
            if let Some(description) = patch.description {
                record.description = description;
            }
            if let Some(due_date) = patch.due_date {
                record.due_date = due_date;
            }
            if let Some(names) = patch.assignee_names {
                record.assignee_names = names;
            }
            if let Some(category) = patch.category {
                record.category = category;
            }
            if let Some(priority) = patch.priority {
                record.priority = priority;
            }
            if let Some(subtasks) = patch.subtasks {
                record.subtasks = subtasks;
            }
            if let Some(checked) = patch.subtasks_checked {
                record.subtasks_checked = checked;
            }
        }
        Ok(())
    }

    async fn patch_task_state(&self, id: &TaskId, state: BoardColumn) -> BoardResult<()> {
        let mut backend = self.inner.lock();
        let fail = backend.fail_writes;
        log(&mut backend, &Endpoint::EditTaskState(id.clone()), fail)?;
        if let Some(record) = backend.tasks.get_mut(id) {
            record.state = state;
        }
        Ok(())
    }

    async fn edit_subtask(&self, id: &TaskId, index: usize, text: &str) -> BoardResult<()> {
        let mut backend = self.inner.lock();
        let fail = backend.fail_writes;
        log(&mut backend, &Endpoint::EditSubtask(id.clone(), index), fail)?;
        if let Some(slot) = backend
            .tasks
            .get_mut(id)
            .and_then(|record| record.subtasks.get_mut(index))
        {
            *slot = text.to_string();
        }
        Ok(())
    }

    async fn remove_subtask(&self, id: &TaskId, index: usize) -> BoardResult<()> {
        let mut backend = self.inner.lock();
        let fail = backend.fail_writes;
        log(&mut backend, &Endpoint::RemoveSubtask(id.clone(), index), fail)?;
        Ok(())
    }
}

fn record(title: &str, state: BoardColumn) -> TaskRecord {
    TaskRecord {
        title: title.to_string(),
        description: format!("{title} description"),
        due_date: "2024-09-30".to_string(),
        category: TaskCategory::UserStory,
        priority: TaskPriority::Medium,
        assignee_names: vec![],
        subtasks: vec![],
        subtasks_checked: vec![],
        state,
        assignee_id: None,
    }
}

async fn loaded(store: &Arc<FakeStore>) -> Workspace {
    let mut workspace = Workspace::new(store.clone());
    workspace.refresh().await.expect("initial refresh");
    workspace
}

#[tokio::test]
async fn failed_refresh_leaves_cache_and_board_untouched() {
    let store = FakeStore::with_tasks(vec![
        ("t1", record("Plan", BoardColumn::Todo)),
        ("t2", record("Build", BoardColumn::InProgress)),
    ]);
    let mut workspace = loaded(&store).await;
    let cache_before = workspace.cache().clone();
    let board_before = workspace.board().clone();

    store.set(|backend| {
        backend.fail_list = true;
        backend.tasks.clear();
    });
    let err = workspace.refresh().await.expect_err("refresh should fail");
    assert!(matches!(err, BoardError::Http { status: 500, .. }));

    assert_eq!(workspace.cache(), &cache_before);
    assert_eq!(workspace.board(), &board_before);
    assert_eq!(workspace.cache().generation(), 1);
}

#[tokio::test]
async fn legacy_assignee_resolves_or_degrades() {
    let mut resolved = record("Legacy", BoardColumn::Todo);
    resolved.assignee_id = Some(AccountId::from("a2"));
    let mut dangling = record("Dangling", BoardColumn::Todo);
    dangling.assignee_id = Some(AccountId::from("gone"));
    let store = FakeStore::with_tasks(vec![("t1", resolved), ("t2", dangling)]);

    let workspace = loaded(&store).await;

    let t1 = workspace.cache().get(&TaskId::from("t1")).expect("t1 cached");
    let badge = t1.legacy_assignee.as_ref().expect("resolved assignee");
    assert_eq!(badge.full_name, "Alan Turing");
    assert_eq!(badge.color.as_deref(), Some("#9327ff"));

    let t2 = workspace.cache().get(&TaskId::from("t2")).expect("t2 cached");
    assert_eq!(t2.legacy_assignee, None);

    let cards = workspace.cards(BoardColumn::Todo);
    assert_eq!(cards.len(), 2);
    assert_eq!(cards[0].assignees[0].initials, "AT");
    assert!(cards[1].assignees.is_empty());
}

#[tokio::test]
async fn dragging_last_todo_card_into_empty_done_column() {
    let store = FakeStore::with_tasks(vec![("t1", record("Ship", BoardColumn::Todo))]);
    let mut workspace = loaded(&store).await;
    let t1 = TaskId::from("t1");
    let done = BoardColumn::from_box_id("done-box").expect("box id");

    workspace
        .handle_drag(DragEvent::Start(t1.clone()))
        .await
        .expect("start");
    workspace
        .handle_drag(DragEvent::Over(done))
        .await
        .expect("over");
    assert_eq!(workspace.drag().highlighted(), Some(BoardColumn::Done));
    workspace
        .handle_drag(DragEvent::Drop(done))
        .await
        .expect("drop");

    let board = workspace.board();
    assert_eq!(
        board.column(BoardColumn::Todo).nodes(),
        &[BoardNode::Placeholder("No tasks to do.")]
    );
    assert_eq!(board.column(BoardColumn::Done).nodes(), &[BoardNode::Card(t1.clone())]);
    assert_eq!(workspace.drag().highlighted(), None);

    assert_eq!(
        workspace.cache().get(&t1).map(|task| task.record.state),
        Some(BoardColumn::Done)
    );
    assert_eq!(store.task("t1").map(|task| task.state), Some(BoardColumn::Done));
    assert_eq!(
        store.requests().last().map(String::as_str),
        Some("PATCH /api/edit-task-state/t1")
    );
}

#[tokio::test]
async fn failed_move_is_reverted_with_inline_feedback() {
    let store = FakeStore::with_tasks(vec![
        ("t1", record("Ship", BoardColumn::Todo)),
        ("t2", record("Test", BoardColumn::Todo)),
    ]);
    let mut workspace = loaded(&store).await;
    let board_before = workspace.board().clone();
    store.set(|backend| backend.fail_writes = true);

    let err = workspace
        .move_task(&TaskId::from("t1"), BoardColumn::AwaitingFeedback)
        .await
        .expect_err("move should fail");
    assert!(matches!(err, BoardError::Http { .. }));

    assert_eq!(workspace.board(), &board_before);
    assert_eq!(
        workspace
            .cache()
            .get(&TaskId::from("t1"))
            .map(|task| task.record.state),
        Some(BoardColumn::Todo)
    );
    assert_eq!(
        workspace.take_feedback(),
        vec![Feedback::Inline {
            field: "todo-box".to_string(),
            message: MOVE_FAILED.to_string(),
        }]
    );
}

#[tokio::test]
async fn dropping_on_own_column_sends_nothing() {
    let store = FakeStore::with_tasks(vec![("t1", record("Ship", BoardColumn::InProgress))]);
    let mut workspace = loaded(&store).await;
    let before = store.requests().len();

    workspace
        .move_task(&TaskId::from("t1"), BoardColumn::InProgress)
        .await
        .expect("no-op move");
    assert_eq!(store.requests().len(), before);
}

#[tokio::test]
async fn save_sends_checked_assignees_and_full_subtask_arrays() {
    let mut task = record("Popup", BoardColumn::Todo);
    task.assignee_names = vec!["Ada Lovelace".to_string()];
    task.subtasks = vec!["a".to_string(), "b".to_string()];
    task.subtasks_checked = vec![true, false];
    let store = FakeStore::with_tasks(vec![("t1", task)]);
    let mut workspace = loaded(&store).await;
    let t1 = TaskId::from("t1");

    assert!(workspace.edit_task(&t1).await);
    {
        let popup = workspace.popup_mut().expect("popup open");
        assert_eq!(popup.mode, PopupMode::Editing);
        assert_eq!(popup.toggle_assignee(&AccountId::from("a1")), Some(false));
        assert_eq!(popup.toggle_assignee(&AccountId::from("a2")), Some(true));
        popup.session.delete_subtask(0).expect("delete subtask");
        popup.form_mut().expect("form").title = "Popup v2".to_string();
    }

    workspace.save_task(&t1).await.expect("save");

    let (id, patch) = store.last_patch().expect("patch sent");
    assert_eq!(id, t1);
    assert_eq!(patch.title.as_deref(), Some("Popup v2"));
    assert_eq!(patch.assignee_names, Some(vec!["Alan Turing".to_string()]));
    assert_eq!(patch.subtasks, Some(vec!["b".to_string()]));
    assert_eq!(patch.subtasks_checked, Some(vec![false]));

    assert!(workspace.popup().is_none());
    let cached = workspace.cache().get(&t1).expect("cached");
    assert_eq!(cached.record.title, "Popup v2");
    assert_eq!(cached.record.subtasks, vec!["b".to_string()]);
}

#[tokio::test]
async fn failed_save_keeps_popup_in_edit_mode() {
    let store = FakeStore::with_tasks(vec![("t1", record("Popup", BoardColumn::Todo))]);
    let mut workspace = loaded(&store).await;
    let t1 = TaskId::from("t1");
    assert!(workspace.edit_task(&t1).await);
    store.set(|backend| backend.fail_writes = true);

    workspace.save_task(&t1).await.expect_err("save should fail");

    let popup = workspace.popup().expect("popup still open");
    assert_eq!(popup.mode, PopupMode::Editing);
    assert_eq!(
        workspace.take_feedback(),
        vec![Feedback::Alert(SAVE_FAILED.to_string())]
    );
}

#[tokio::test]
async fn invalid_edit_form_is_reported_inline_without_request() {
    let store = FakeStore::with_tasks(vec![("t1", record("Popup", BoardColumn::Todo))]);
    let mut workspace = loaded(&store).await;
    let t1 = TaskId::from("t1");
    assert!(workspace.edit_task(&t1).await);
    workspace
        .popup_mut()
        .and_then(|popup| popup.form.as_mut())
        .expect("form")
        .due_date = "next week".to_string();
    let before = store.requests().len();

    let err = workspace.save_task(&t1).await.expect_err("invalid form");
    assert!(matches!(err, BoardError::Validation(_)));
    assert_eq!(store.requests().len(), before);
    assert_eq!(
        workspace.take_feedback(),
        vec![Feedback::Inline {
            field: "popupDueDateInput".to_string(),
            message: "Due date must be YYYY-MM-DD".to_string(),
        }]
    );
}

#[tokio::test]
async fn removing_a_subtask_overwrites_both_arrays() {
    let mut task = record("Subtasks", BoardColumn::Todo);
    task.subtasks = vec!["a".to_string(), "b".to_string(), "c".to_string()];
    task.subtasks_checked = vec![false, false, true];
    let store = FakeStore::with_tasks(vec![("t1", task)]);
    let mut workspace = loaded(&store).await;
    let t1 = TaskId::from("t1");

    workspace.remove_subtask(&t1, 0).await.expect("remove");

    let (_, patch) = store.last_patch().expect("patch sent");
    assert_eq!(
        patch,
        TaskPatch {
            subtasks: Some(vec!["b".to_string(), "c".to_string()]),
            subtasks_checked: Some(vec![false, true]),
            ..TaskPatch::default()
        }
    );
    assert!(
        !store
            .requests()
            .iter()
            .any(|request| request.contains("/api/remove-subtask/"))
    );
    assert!(workspace.popup().is_none());

    assert!(workspace.open_task(&t1).await);
    workspace.remove_subtask(&t1, 0).await.expect("remove again");
    let popup = workspace.popup().expect("popup reopened");
    assert_eq!(popup.session.subtasks().texts(), vec!["c".to_string()]);
    assert_eq!(popup.session.subtasks().checked(), vec![true]);
}

#[tokio::test]
async fn failed_subtask_removal_keeps_cache() {
    let mut task = record("Subtasks", BoardColumn::Todo);
    task.subtasks = vec!["a".to_string(), "b".to_string()];
    task.subtasks_checked = vec![true, false];
    let store = FakeStore::with_tasks(vec![("t1", task)]);
    let mut workspace = loaded(&store).await;
    let cache_before = workspace.cache().clone();
    store.set(|backend| backend.fail_writes = true);

    workspace
        .remove_subtask(&TaskId::from("t1"), 1)
        .await
        .expect_err("remove should fail");

    assert_eq!(workspace.cache(), &cache_before);
    assert_eq!(
        workspace.take_feedback(),
        vec![Feedback::Alert(REMOVE_SUBTASK_FAILED.to_string())]
    );

    let err = workspace
        .remove_subtask(&TaskId::from("t1"), 7)
        .await
        .expect_err("index out of range");
    assert!(matches!(err, BoardError::SubtaskIndex { index: 7, len: 2 }));
}

#[tokio::test]
async fn toggling_a_subtask_persists_the_flag() {
    let mut task = record("Subtasks", BoardColumn::Todo);
    task.subtasks = vec!["a".to_string(), "b".to_string()];
    task.subtasks_checked = vec![false];
    let store = FakeStore::with_tasks(vec![("t1", task)]);
    let mut workspace = loaded(&store).await;

    let checked = workspace
        .toggle_subtask_done(&TaskId::from("t1"), 1)
        .await
        .expect("toggle");
    assert!(checked);
    assert_eq!(
        store.task("t1").map(|task| task.subtasks_checked),
        Some(vec![false, true])
    );
    assert_eq!(workspace.cards(BoardColumn::Todo)[0].progress_label(), "1/2 Subtasks");
}

#[tokio::test]
async fn opening_a_missing_task_changes_nothing() {
    let store = FakeStore::with_tasks(vec![("t1", record("Ship", BoardColumn::Todo))]);
    let mut workspace = loaded(&store).await;
    let before = store.requests().len();

    assert!(!workspace.open_task(&TaskId::from("nope")).await);
    assert!(!workspace.edit_task(&TaskId::from("nope")).await);
    assert!(workspace.popup().is_none());
    assert_eq!(store.requests().len(), before);
}

#[tokio::test]
async fn popup_badges_degrade_when_accounts_fail() {
    let mut task = record("Badges", BoardColumn::Todo);
    task.assignee_names = vec!["Ada Lovelace".to_string()];
    let store = FakeStore::with_tasks(vec![("t1", task)]);
    let mut workspace = loaded(&store).await;
    store.set(|backend| backend.fail_accounts = true);

    assert!(workspace.open_task(&TaskId::from("t1")).await);
    let popup = workspace.popup().expect("popup");
    assert_eq!(popup.fields.category_label, "User Story");
    assert_eq!(popup.assignees.len(), 1);
    assert_eq!(popup.assignees[0].initials, "AL");
    assert_eq!(popup.assignees[0].color, None);
}

#[tokio::test]
async fn delete_flow_with_confirmation() {
    let store = FakeStore::with_tasks(vec![
        ("t1", record("Ship", BoardColumn::Todo)),
        ("t2", record("Keep", BoardColumn::Todo)),
    ]);
    let mut workspace = loaded(&store).await;
    let t1 = TaskId::from("t1");

    assert!(!workspace.request_delete(&t1));
    assert!(workspace.open_task(&t1).await);
    assert!(workspace.request_delete(&t1));
    assert!(workspace.popup().is_some_and(|popup| popup.delete_confirmation));
    workspace.cancel_delete();
    assert!(workspace.popup().is_some_and(|popup| !popup.delete_confirmation));

    store.set(|backend| backend.fail_writes = true);
    workspace.delete_task(&t1).await.expect_err("delete should fail");
    assert_eq!(
        workspace.take_feedback(),
        vec![Feedback::Alert(DELETE_FAILED.to_string())]
    );
    assert!(workspace.popup().is_some());

    store.set(|backend| backend.fail_writes = false);
    workspace.delete_task(&t1).await.expect("delete");
    assert!(workspace.popup().is_none());
    assert!(workspace.cache().get(&t1).is_none());
    assert_eq!(workspace.board().column(BoardColumn::Todo).task_count(), 1);
}

#[tokio::test]
async fn submit_draft_validates_then_creates() {
    let store = FakeStore::with_tasks(vec![]);
    let mut workspace = loaded(&store).await;
    workspace.load_directory().await.expect("accounts");
    let before = store.requests().len();

    let mut draft = TaskDraft::new();
    let err = workspace
        .submit_draft(&mut draft)
        .await
        .expect_err("blank draft");
    assert_eq!(err.field_errors().len(), 4);
    assert_eq!(workspace.take_feedback().len(), 4);
    assert_eq!(store.requests().len(), before);

    draft.title = "Write docs".to_string();
    draft.description = "User guide".to_string();
    draft.due_date = "2024-10-01".to_string();
    draft.category = "technicalTask".to_string();
    draft.subtasks.push("outline").expect("subtask");
    draft.selection.select(AccountId::from("a1"));

    store.set(|backend| backend.fail_writes = true);
    workspace
        .submit_draft(&mut draft)
        .await
        .expect_err("backend down");
    assert_eq!(
        workspace.take_feedback(),
        vec![Feedback::Alert(ADD_FAILED.to_string())]
    );
    assert_eq!(draft.title, "Write docs");

    store.set(|backend| backend.fail_writes = false);
    workspace.submit_draft(&mut draft).await.expect("created");
    assert_eq!(draft.title, "");
    assert!(draft.selection.is_empty());

    let created = store.task("new1").expect("stored");
    assert_eq!(created.assignee_names, vec!["Ada Lovelace".to_string()]);
    assert_eq!(created.subtasks, vec!["outline".to_string()]);
    assert_eq!(workspace.cache().len(), 1);
    assert_eq!(workspace.board().column(BoardColumn::Todo).task_count(), 1);
}

#[tokio::test]
async fn renaming_a_subtask_uses_the_edit_subtask_route() {
    let mut task = record("Subtasks", BoardColumn::Todo);
    task.subtasks = vec!["draft".to_string(), "review".to_string()];
    task.subtasks_checked = vec![true, false];
    let store = FakeStore::with_tasks(vec![("t1", task)]);
    let mut workspace = loaded(&store).await;
    let t1 = TaskId::from("t1");

    let err = workspace
        .rename_subtask(&t1, 0, "   ")
        .await
        .expect_err("blank text");
    assert!(matches!(err, BoardError::Validation(_)));
    assert_eq!(workspace.take_feedback().len(), 1);

    workspace
        .rename_subtask(&t1, 1, " peer review ")
        .await
        .expect("rename");
    assert!(
        store
            .requests()
            .contains(&"PATCH /api/edit-subtask/t1/1".to_string())
    );
    let cached = workspace.cache().get(&t1).expect("cached");
    assert_eq!(cached.record.subtasks, vec!["draft".to_string(), "peer review".to_string()]);
    assert_eq!(cached.record.subtasks_checked, vec![true, false]);
}

#[tokio::test]
async fn rename_in_open_editor_survives_the_following_save() {
    let mut task = record("Subtasks", BoardColumn::Todo);
    task.subtasks = vec!["old".to_string(), "keep".to_string()];
    task.subtasks_checked = vec![false, true];
    let store = FakeStore::with_tasks(vec![("t1", task)]);
    let mut workspace = loaded(&store).await;
    let t1 = TaskId::from("t1");

    assert!(workspace.edit_task(&t1).await);
    workspace
        .rename_subtask(&t1, 0, "new")
        .await
        .expect("rename");
    let popup = workspace.popup().expect("editor still open");
    assert_eq!(
        popup.session.subtasks().texts(),
        vec!["new".to_string(), "keep".to_string()]
    );

    workspace.save_task(&t1).await.expect("save");
    assert_eq!(
        store.task("t1").map(|task| task.subtasks),
        Some(vec!["new".to_string(), "keep".to_string()])
    );
    assert_eq!(
        store.task("t1").map(|task| task.subtasks_checked),
        Some(vec![false, true])
    );
}

#[tokio::test]
async fn editing_without_accounts_keeps_stored_assignees() {
    let mut task = record("Assigned", BoardColumn::Todo);
    task.assignee_names = vec!["Ada Lovelace".to_string(), "Alan Turing".to_string()];
    let store = FakeStore::with_tasks(vec![("t1", task)]);
    let mut workspace = loaded(&store).await;
    let t1 = TaskId::from("t1");
    store.set(|backend| backend.fail_accounts = true);

    assert!(!workspace.edit_task(&t1).await);
    assert_eq!(
        workspace.take_feedback(),
        vec![Feedback::Alert(ACCOUNTS_FAILED.to_string())]
    );
    let popup = workspace.popup().expect("popup stays in view mode");
    assert_eq!(popup.mode, PopupMode::Viewing);
    assert!(popup.form.is_none());

    workspace.save_task(&t1).await.expect_err("nothing to save");
    assert!(store.last_patch().is_none());
    assert_eq!(
        store.task("t1").map(|task| task.assignee_names.len()),
        Some(2)
    );
}
