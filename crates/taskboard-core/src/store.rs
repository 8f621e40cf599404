use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder};
use serde::Serialize;
use serde::de::DeserializeOwned;
use taskboard_shared::{
    Account, AccountId, BoardColumn, MessageResponse, StatePatch, SubtaskEdit, TaskCreate, TaskId,
    TaskPatch, TaskRecord, TasksResponse,
};
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use crate::config::Config;
use crate::error::{BoardError, BoardResult};

pub const CSRF_HEADER: &str = "X-CSRFToken";

/// Every REST call the board consumes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    ListTasks,
    GetAccount(AccountId),
    ListAccounts,
    AddTask,
    DeleteTask(TaskId),
    EditTask(TaskId),
    EditTaskState(TaskId),
    EditSubtask(TaskId, usize),
    RemoveSubtask(TaskId, usize),
}

impl Endpoint {
    pub fn method(&self) -> Method {
        match self {
            Endpoint::ListTasks | Endpoint::GetAccount(_) | Endpoint::ListAccounts => Method::GET,
            Endpoint::AddTask => Method::POST,
            Endpoint::DeleteTask(_) => Method::DELETE,
            Endpoint::EditTask(_)
            | Endpoint::EditTaskState(_)
            | Endpoint::EditSubtask(..)
            | Endpoint::RemoveSubtask(..) => Method::PATCH,
        }
    }

    pub fn path(&self) -> String {
        match self {
            Endpoint::ListTasks => "/api/tasks".to_string(),
            Endpoint::GetAccount(id) => format!("/api/accounts/{id}"),
            Endpoint::ListAccounts => "/api/accounts".to_string(),
            Endpoint::AddTask => "/api/add-task".to_string(),
            Endpoint::DeleteTask(id) => format!("/api/delete-task/{id}"),
            Endpoint::EditTask(id) => format!("/api/edit-task/{id}"),
            Endpoint::EditTaskState(id) => format!("/api/edit-task-state/{id}"),
            Endpoint::EditSubtask(id, index) => format!("/api/edit-subtask/{id}/{index}"),
            Endpoint::RemoveSubtask(id, index) => format!("/api/remove-subtask/{id}/{index}"),
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method(), self.path())
    }
}

/// The remote task store. The board only ever talks to the backend through
/// this trait.
#[async_trait]
pub trait TaskStore: Send + Sync {
    async fn list_tasks(&self) -> BoardResult<BTreeMap<TaskId, TaskRecord>>;

    async fn get_account(&self, id: &AccountId) -> BoardResult<Account>;

    async fn list_accounts(&self) -> BoardResult<BTreeMap<AccountId, Account>>;

    async fn add_task(&self, create: &TaskCreate) -> BoardResult<()>;

    async fn delete_task(&self, id: &TaskId) -> BoardResult<()>;

    async fn patch_task(&self, id: &TaskId, patch: &TaskPatch) -> BoardResult<()>;

    async fn patch_task_state(&self, id: &TaskId, state: BoardColumn) -> BoardResult<()>;

    async fn edit_subtask(&self, id: &TaskId, index: usize, text: &str) -> BoardResult<()>;

    async fn remove_subtask(&self, id: &TaskId, index: usize) -> BoardResult<()>;
}

#[derive(Debug, Clone)]
pub struct HttpTaskStore {
    client: Client,
    base_url: String,
    csrf_token: Option<String>,
}

impl HttpTaskStore {
    pub fn new(base_url: &str, csrf_token: Option<String>, timeout: Option<Duration>) -> anyhow::Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            csrf_token,
        })
    }

    pub fn from_config(cfg: &Config) -> anyhow::Result<Self> {
        Self::new(&cfg.api_url(), cfg.csrf_token(), cfg.api_timeout()?)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url_for(&self, endpoint: &Endpoint) -> String {
        format!("{}{}", self.base_url, endpoint.path())
    }

    fn request(&self, endpoint: &Endpoint) -> RequestBuilder {
        let mut builder = self
            .client
            .request(endpoint.method(), self.url_for(endpoint));
        if let Some(token) = self.csrf_token.as_deref() {
            builder = builder.header(CSRF_HEADER, token);
        }
        builder
    }

    async fn send<B>(&self, endpoint: &Endpoint, body: Option<&B>) -> BoardResult<String>
    where
        B: Serialize + ?Sized + Sync,
    {
        let request_id = Uuid::new_v4();
        debug!(%request_id, endpoint = %endpoint, "sending request");

        let mut builder = self.request(endpoint);
        if let Some(body) = body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|source| {
            warn!(%request_id, endpoint = %endpoint, error = %source, "request failed");
            BoardError::Transport {
                endpoint: endpoint.to_string(),
                source,
            }
        })?;

        let status = response.status();
        let text = response.text().await.map_err(|source| BoardError::Transport {
            endpoint: endpoint.to_string(),
            source,
        })?;

        if !status.is_success() {
            warn!(%request_id, endpoint = %endpoint, status = status.as_u16(), "backend rejected request");
            return Err(BoardError::Http {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
                body: text,
            });
        }

        debug!(%request_id, status = status.as_u16(), bytes = text.len(), "response received");
        Ok(text)
    }

    async fn fetch<T: DeserializeOwned>(&self, endpoint: &Endpoint) -> BoardResult<T> {
        let text = self.send::<()>(endpoint, None).await?;
        decode(endpoint, &text)
    }

    async fn write<B>(&self, endpoint: &Endpoint, body: Option<&B>) -> BoardResult<()>
    where
        B: Serialize + ?Sized + Sync,
    {
        let text = self.send(endpoint, body).await?;
        if text.trim().is_empty() {
            return Ok(());
        }
        let reply: MessageResponse = decode(endpoint, &text)?;
        if let Some(message) = reply.message {
            debug!(endpoint = %endpoint, %message, "backend message");
        }
        Ok(())
    }
}

fn decode<T: DeserializeOwned>(endpoint: &Endpoint, text: &str) -> BoardResult<T> {
    serde_json::from_str(text).map_err(|source| BoardError::Decode {
        endpoint: endpoint.to_string(),
        source,
    })
}

#[async_trait]
impl TaskStore for HttpTaskStore {
    #[instrument(skip(self))]
    async fn list_tasks(&self) -> BoardResult<BTreeMap<TaskId, TaskRecord>> {
        let response: TasksResponse = self.fetch(&Endpoint::ListTasks).await?;
        Ok(response.into_tasks())
    }

    #[instrument(skip(self), fields(account = %id))]
    async fn get_account(&self, id: &AccountId) -> BoardResult<Account> {
        self.fetch(&Endpoint::GetAccount(id.clone())).await
    }

    #[instrument(skip(self))]
    async fn list_accounts(&self) -> BoardResult<BTreeMap<AccountId, Account>> {
        let accounts: Option<BTreeMap<AccountId, Account>> =
            self.fetch(&Endpoint::ListAccounts).await?;
        Ok(accounts.unwrap_or_default())
    }

    #[instrument(skip(self, create), fields(title = %create.title))]
    async fn add_task(&self, create: &TaskCreate) -> BoardResult<()> {
        self.write(&Endpoint::AddTask, Some(create)).await
    }

    #[instrument(skip(self), fields(task = %id))]
    async fn delete_task(&self, id: &TaskId) -> BoardResult<()> {
        self.write::<()>(&Endpoint::DeleteTask(id.clone()), None).await
    }

    #[instrument(skip(self, patch), fields(task = %id))]
    async fn patch_task(&self, id: &TaskId, patch: &TaskPatch) -> BoardResult<()> {
        self.write(&Endpoint::EditTask(id.clone()), Some(patch)).await
    }

    #[instrument(skip(self), fields(task = %id, state = %state))]
    async fn patch_task_state(&self, id: &TaskId, state: BoardColumn) -> BoardResult<()> {
        let body = StatePatch { new_state: state };
        self.write(&Endpoint::EditTaskState(id.clone()), Some(&body))
            .await
    }

    #[instrument(skip(self, text), fields(task = %id))]
    async fn edit_subtask(&self, id: &TaskId, index: usize, text: &str) -> BoardResult<()> {
        let body = SubtaskEdit {
            new_subtask: text.to_string(),
        };
        self.write(&Endpoint::EditSubtask(id.clone(), index), Some(&body))
            .await
    }

    #[instrument(skip(self), fields(task = %id))]
    async fn remove_subtask(&self, id: &TaskId, index: usize) -> BoardResult<()> {
        self.write::<()>(&Endpoint::RemoveSubtask(id.clone(), index), None)
            .await
    }
}
