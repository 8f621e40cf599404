use std::collections::BTreeMap;

use taskboard_shared::{BoardColumn, TaskId, TaskRecord};
use tracing::{debug, info, instrument, warn};

use crate::assignees::AssigneeBadge;
use crate::error::BoardResult;
use crate::store::TaskStore;

#[derive(Debug, Clone, PartialEq)]
pub struct CachedTask {
    pub id: TaskId,
    pub record: TaskRecord,
    /// Resolved from a legacy single `assigneeId`, when the task has one and
    /// the account lookup worked.
    pub legacy_assignee: Option<AssigneeBadge>,
}

/// Every task the backend reported on the last successful fetch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskCache {
    tasks: BTreeMap<TaskId, CachedTask>,
    generation: u64,
}

impl TaskCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Number of successful refreshes so far.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn get(&self, id: &TaskId) -> Option<&CachedTask> {
        self.tasks.get(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CachedTask> {
        self.tasks.values()
    }

    /// Fetches the full collection and swaps it in. On any failure of the
    /// list call the current contents stay untouched.
    #[instrument(skip(self, store), fields(generation = self.generation))]
    pub async fn refresh(&mut self, store: &dyn TaskStore) -> BoardResult<()> {
        let fetched = match store.list_tasks().await {
            Ok(tasks) => tasks,
            Err(err) => {
                warn!(error = %err, "task refresh failed; keeping previous cache");
                return Err(err);
            }
        };

        let mut next = BTreeMap::new();
        for (id, record) in fetched {
            let legacy_assignee = match record.assignee_id.as_ref() {
                Some(account_id) => match store.get_account(account_id).await {
                    Ok(account) => Some(AssigneeBadge {
                        initials: account.initials(),
                        full_name: account.full_name(),
                        color: account.profile_color.clone(),
                    }),
                    Err(err) => {
                        warn!(task = %id, account = %account_id, error = %err, "legacy assignee lookup failed");
                        None
                    }
                },
                None => None,
            };
            next.insert(
                id.clone(),
                CachedTask {
                    id,
                    record,
                    legacy_assignee,
                },
            );
        }

        self.replace(next);
        info!(tasks = self.tasks.len(), generation = self.generation, "task cache refreshed");
        Ok(())
    }

    fn replace(&mut self, tasks: BTreeMap<TaskId, CachedTask>) {
        self.tasks = tasks;
        self.generation += 1;
    }

    /// Optimistic column change ahead of the state request. Returns the
    /// previous column so the caller can undo it.
    pub(crate) fn set_state(&mut self, id: &TaskId, state: BoardColumn) -> Option<BoardColumn> {
        let task = self.tasks.get_mut(id)?;
        let previous = task.record.state;
        task.record.state = state;
        debug!(task = %id, from = %previous, to = %state, "cached state updated");
        Some(previous)
    }
}
