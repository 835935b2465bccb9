//! Turning a click on an action component into a canister call.
pub mod adapter;
pub mod executor;
pub mod state;

pub use adapter::{ActionAdapter, ActionContext, ClientAdapter, CONFIRM_TIMEOUT};
pub use executor::ActionExecutor;
pub use state::{ExecutionEvent, ExecutionState, ExecutionStatus};
