use thiserror::Error;

/// Errors produced while building value graphs.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid JSON document: {0}")]
    Json(String),
}
