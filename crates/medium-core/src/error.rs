use thiserror::Error;

use crate::dom::PathError;
use crate::exec::ExecError;

#[derive(Debug, Error)]
pub enum EditorError {
    #[error("unknown action: {0}")]
    UnknownAction(String),
    #[error("duplicate command: {0}")]
    DuplicateCommand(String),
    #[error("no editable element at index {0}")]
    NoSuchElement(usize),
    #[error("{action} has no form control .{class}")]
    UnknownControl { action: String, class: String },
    #[error(transparent)]
    Exec(#[from] ExecError),
    #[error(transparent)]
    Path(#[from] PathError),
    #[error("invalid editor config: {0}")]
    Config(#[from] serde_json::Error),
}
