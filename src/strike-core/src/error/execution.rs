use crate::error::action::ValidationError;
use thiserror::Error;

/// Reasons an execution is refused before it starts. Failures after that
/// point end up in the execution state as a message instead.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExecuteError {
    #[error("The action has no component {0}")]
    UnknownComponent(usize),

    #[error("The action is disabled")]
    Disabled,

    #[error("The action is blocked")]
    Blocked,

    #[error("Another component is executing")]
    Busy,

    #[error(transparent)]
    Validation(#[from] ValidationError),
}
