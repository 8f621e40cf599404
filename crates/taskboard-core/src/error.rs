use std::fmt;

use taskboard_shared::TaskId;

/// A validation message bound to one form field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// How an error is surfaced to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Inline next to the offending field, before any request.
    Validation,
    /// Logged and alerted; prior state kept.
    Network,
    /// Logged only.
    NotFound,
    Usage,
}

#[derive(Debug, thiserror::Error)]
pub enum BoardError {
    #[error("validation failed: {}", join_fields(.0))]
    Validation(Vec<FieldError>),

    #[error("task not found: {0}")]
    NotFound(TaskId),

    #[error("{endpoint} returned HTTP {status}")]
    Http {
        endpoint: String,
        status: u16,
        body: String,
    },

    #[error("{endpoint} request failed: {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{endpoint} returned an unreadable body: {source}")]
    Decode {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("subtask index {index} out of range (have {len})")]
    SubtaskIndex { index: usize, len: usize },

    #[error("no task popup is open")]
    NoPopup,
}

impl BoardError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            BoardError::Validation(_) => ErrorKind::Validation,
            BoardError::NotFound(_) => ErrorKind::NotFound,
            BoardError::Http { .. } | BoardError::Transport { .. } | BoardError::Decode { .. } => {
                ErrorKind::Network
            }
            BoardError::SubtaskIndex { .. } | BoardError::NoPopup => ErrorKind::Usage,
        }
    }

    pub fn field_errors(&self) -> &[FieldError] {
        match self {
            BoardError::Validation(fields) => fields,
            _ => &[],
        }
    }
}

fn join_fields(fields: &[FieldError]) -> String {
    fields
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

pub type BoardResult<T> = Result<T, BoardError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_follow_the_taxonomy() {
        let validation = BoardError::Validation(vec![
            FieldError::new("title", "Title is required"),
            FieldError::new("date", "Due date is required"),
        ]);
        assert_eq!(validation.kind(), ErrorKind::Validation);
        assert_eq!(
            validation.to_string(),
            "validation failed: title: Title is required; date: Due date is required"
        );
        assert_eq!(validation.field_errors().len(), 2);

        let http = BoardError::Http {
            endpoint: "GET /api/tasks".to_string(),
            status: 502,
            body: String::new(),
        };
        assert_eq!(http.kind(), ErrorKind::Network);
        assert!(http.field_errors().is_empty());

        assert_eq!(
            BoardError::NotFound(TaskId::from("t9")).kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            BoardError::SubtaskIndex { index: 4, len: 2 }.kind(),
            ErrorKind::Usage
        );
    }
}
