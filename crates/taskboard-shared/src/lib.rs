use std::collections::BTreeMap;
use std::fmt;

use serde::{
  Deserialize,
  Deserializer,
  Serialize
};

#[derive(
  Debug,
  Clone,
  PartialEq,
  Eq,
  PartialOrd,
  Ord,
  Hash,
  Serialize,
  Deserialize,
)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
  pub fn new(
    value: impl Into<String>
  ) -> Self {
    Self(value.into())
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }
}

impl fmt::Display for TaskId {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>
  ) -> fmt::Result {
    f.write_str(&self.0)
  }
}

impl From<&str> for TaskId {
  fn from(value: &str) -> Self {
    Self::new(value)
  }
}

#[derive(
  Debug,
  Clone,
  PartialEq,
  Eq,
  PartialOrd,
  Ord,
  Hash,
  Serialize,
  Deserialize,
)]
#[serde(transparent)]
pub struct AccountId(String);

impl AccountId {
  pub fn new(
    value: impl Into<String>
  ) -> Self {
    Self(value.into())
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }
}

impl fmt::Display for AccountId {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>
  ) -> fmt::Result {
    f.write_str(&self.0)
  }
}

impl From<&str> for AccountId {
  fn from(value: &str) -> Self {
    Self::new(value)
  }
}

#[derive(
  Debug,
  Clone,
  Copy,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
)]
pub enum TaskCategory {
  #[serde(rename = "technicalTask")]
  TechnicalTask,
  #[serde(rename = "userStory")]
  UserStory
}

impl TaskCategory {
  pub fn key(self) -> &'static str {
    match self {
      | Self::TechnicalTask => {
        "technicalTask"
      }
      | Self::UserStory => "userStory"
    }
  }

  pub fn label(self) -> &'static str {
    match self {
      | Self::TechnicalTask => {
        "Technical Task"
      }
      | Self::UserStory => "User Story"
    }
  }

  pub fn parse(
    value: &str
  ) -> Option<Self> {
    match value.trim() {
      | "technicalTask"
      | "technical-task"
      | "Technical Task" => {
        Some(Self::TechnicalTask)
      }
      | "userStory"
      | "user-story"
      | "User Story" => {
        Some(Self::UserStory)
      }
      | _ => None
    }
  }
}

#[derive(
  Debug,
  Clone,
  Copy,
  Default,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
)]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
  Urgent,
  #[default]
  Medium,
  Low
}

impl TaskPriority {
  pub fn key(self) -> &'static str {
    match self {
      | Self::Urgent => "urgent",
      | Self::Medium => "medium",
      | Self::Low => "low"
    }
  }

  pub fn parse(
    value: &str
  ) -> Option<Self> {
    match value
      .trim()
      .to_ascii_lowercase()
      .as_str()
    {
      | "urgent" => Some(Self::Urgent),
      | "medium" => Some(Self::Medium),
      | "low" => Some(Self::Low),
      | _ => None
    }
  }
}

/// One of the four fixed board buckets.
#[derive(
  Debug,
  Clone,
  Copy,
  Default,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
  PartialOrd,
  Ord,
  Hash,
)]
#[serde(rename_all = "kebab-case")]
pub enum BoardColumn {
  #[default]
  Todo,
  InProgress,
  AwaitingFeedback,
  Done
}

pub const BOX_ID_SUFFIX: &str = "-box";

impl BoardColumn {
  pub const ALL: [BoardColumn; 4] = [
    BoardColumn::Todo,
    BoardColumn::InProgress,
    BoardColumn::AwaitingFeedback,
    BoardColumn::Done
  ];

  pub fn key(self) -> &'static str {
    match self {
      | Self::Todo => "todo",
      | Self::InProgress => "in-progress",
      | Self::AwaitingFeedback => {
        "awaiting-feedback"
      }
      | Self::Done => "done"
    }
  }

  pub fn title(self) -> &'static str {
    match self {
      | Self::Todo => "To do",
      | Self::InProgress => "In progress",
      | Self::AwaitingFeedback => {
        "Await feedback"
      }
      | Self::Done => "Done"
    }
  }

  pub fn box_id(self) -> String {
    format!(
      "{}{BOX_ID_SUFFIX}",
      self.key()
    )
  }

  pub fn from_key(
    value: &str
  ) -> Option<Self> {
    Self::ALL
      .into_iter()
      .find(|column| column.key() == value)
  }

  /// Accepts either a bare key (`done`) or a column container id
  /// (`done-box`).
  pub fn from_box_id(
    value: &str
  ) -> Option<Self> {
    let trimmed = value.trim();
    Self::from_key(
      trimmed
        .strip_suffix(BOX_ID_SUFFIX)
        .unwrap_or(trimmed)
    )
  }

  pub fn index(self) -> usize {
    match self {
      | Self::Todo => 0,
      | Self::InProgress => 1,
      | Self::AwaitingFeedback => 2,
      | Self::Done => 3
    }
  }
}

impl fmt::Display for BoardColumn {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>
  ) -> fmt::Result {
    f.write_str(self.key())
  }
}

#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
)]
pub struct TaskRecord {
  #[serde(default)]
  pub title:            String,
  #[serde(default)]
  pub description:      String,
  #[serde(
    rename = "dueDate",
    default
  )]
  pub due_date:         String,
  pub category:         TaskCategory,
  #[serde(default)]
  pub priority:         TaskPriority,
  #[serde(
    rename = "assigneeNames",
    default,
    deserialize_with = "list_or_csv"
  )]
  pub assignee_names:   Vec<String>,
  #[serde(
    rename = "subTasks",
    default,
    deserialize_with = "list_or_csv"
  )]
  pub subtasks:         Vec<String>,
  #[serde(
    rename = "subTasksChecked",
    default,
    deserialize_with = "null_as_empty"
  )]
  pub subtasks_checked: Vec<bool>,
  #[serde(default)]
  pub state:            BoardColumn,
  #[serde(
    rename = "assigneeId",
    default,
    skip_serializing_if = "Option::is_none"
  )]
  pub assignee_id:      Option<AccountId>
}

impl TaskRecord {
  pub fn completed_subtasks(
    &self
  ) -> usize {
    self
      .subtasks_checked
      .iter()
      .take(self.subtasks.len())
      .filter(|checked| **checked)
      .count()
  }
}

#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
)]
pub struct Account {
  #[serde(
    rename = "firstName",
    default
  )]
  pub first_name:    String,
  #[serde(
    rename = "lastName",
    default
  )]
  pub last_name:     String,
  #[serde(default)]
  pub initials:      Option<String>,
  #[serde(
    rename = "profileColor",
    alias = "color",
    default
  )]
  pub profile_color: Option<String>
}

impl Account {
  pub fn full_name(&self) -> String {
    format!(
      "{} {}",
      self.first_name, self.last_name
    )
    .trim()
    .to_string()
  }

  pub fn initials(&self) -> String {
    match self.initials.as_deref() {
      | Some(value)
        if !value.trim().is_empty() =>
      {
        value.trim().to_string()
      }
      | _ => {
        initials_for_name(
          &self.full_name()
        )
      }
    }
  }
}

/// First character of every whitespace separated part, uppercased.
pub fn initials_for_name(
  name: &str
) -> String {
  name
    .split_whitespace()
    .filter_map(|part| {
      part.chars().next()
    })
    .flat_map(char::to_uppercase)
    .collect()
}

#[derive(
  Debug, Clone, Serialize, Deserialize,
)]
pub struct TasksResponse {
  #[serde(default)]
  pub tasks:
    Option<BTreeMap<TaskId, TaskRecord>>
}

impl TasksResponse {
  pub fn into_tasks(
    self
  ) -> BTreeMap<TaskId, TaskRecord> {
    self.tasks.unwrap_or_default()
  }
}

#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  Default,
)]
pub struct MessageResponse {
  #[serde(default)]
  pub message: Option<String>
}

#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
)]
pub struct TaskCreate {
  pub title:          String,
  pub description:    String,
  #[serde(rename = "dueDate")]
  pub due_date:       String,
  #[serde(rename = "assigneeNames")]
  pub assignee_names: Vec<String>,
  pub category:       TaskCategory,
  pub priority:       TaskPriority,
  #[serde(rename = "subTasks")]
  pub subtasks:       Vec<String>
}

/// Partial update for `PATCH /api/edit-task/:id`; absent fields are left
/// untouched by the backend.
#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  Default,
  PartialEq,
)]
pub struct TaskPatch {
  #[serde(
    skip_serializing_if = "Option::is_none"
  )]
  pub title:            Option<String>,
  #[serde(
    skip_serializing_if = "Option::is_none"
  )]
  pub description:      Option<String>,
  #[serde(
    rename = "dueDate",
    skip_serializing_if = "Option::is_none"
  )]
  pub due_date:         Option<String>,
  #[serde(
    rename = "assigneeNames",
    skip_serializing_if = "Option::is_none"
  )]
  pub assignee_names:
    Option<Vec<String>>,
  #[serde(
    skip_serializing_if = "Option::is_none"
  )]
  pub category:
    Option<TaskCategory>,
  #[serde(
    skip_serializing_if = "Option::is_none"
  )]
  pub priority:
    Option<TaskPriority>,
  #[serde(
    rename = "subTasks",
    skip_serializing_if = "Option::is_none"
  )]
  pub subtasks:
    Option<Vec<String>>,
  #[serde(
    rename = "subTasksChecked",
    skip_serializing_if = "Option::is_none"
  )]
  pub subtasks_checked:
    Option<Vec<bool>>
}

#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
)]
pub struct StatePatch {
  #[serde(rename = "newState")]
  pub new_state: BoardColumn
}

#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
)]
pub struct SubtaskEdit {
  #[serde(rename = "newSubtask")]
  pub new_subtask: String
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ListOrCsv {
  List(Vec<String>),
  Csv(String)
}

fn list_or_csv<'de, D>(
  deserializer: D
) -> Result<Vec<String>, D::Error>
where
  D: Deserializer<'de>
{
  let raw = Option::<ListOrCsv>::deserialize(
    deserializer
  )?;
  Ok(match raw {
    | None => vec![],
    | Some(ListOrCsv::List(items)) => {
      items
    }
    | Some(ListOrCsv::Csv(text)) => {
      text
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect()
    }
  })
}

fn null_as_empty<'de, D>(
  deserializer: D
) -> Result<Vec<bool>, D::Error>
where
  D: Deserializer<'de>
{
  Ok(
    Option::<Vec<bool>>::deserialize(
      deserializer
    )?
    .unwrap_or_default()
  )
}
