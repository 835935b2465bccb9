use serde::Serialize;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionStatus {
    Blocked,
    #[default]
    Idle,
    Executing,
    Success,
    Error,
}

/// Progress of the one invocation an action may run at a time.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionState {
    pub status: ExecutionStatus,
    /// Index of the component being executed.
    pub executing_action: Option<usize>,
    pub error_message: Option<String>,
    pub success_message: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ExecutionEvent {
    Initiate { executing_action: usize },
    Finish { success_message: Option<String> },
    Fail { error_message: String },
    Reset,
    /// Back to idle with a message, keeping nothing else of the attempt.
    SoftReset { error_message: Option<String> },
    Block,
    Unblock,
}

impl ExecutionState {
    pub fn blocked() -> Self {
        ExecutionState {
            status: ExecutionStatus::Blocked,
            ..Default::default()
        }
    }

    pub fn reduce(self, event: ExecutionEvent) -> Self {
        match event {
            ExecutionEvent::Initiate { executing_action } => ExecutionState {
                status: ExecutionStatus::Executing,
                executing_action: Some(executing_action),
                ..Default::default()
            },
            ExecutionEvent::Finish { success_message } => ExecutionState {
                status: ExecutionStatus::Success,
                success_message,
                error_message: None,
                ..self
            },
            ExecutionEvent::Fail { error_message } => ExecutionState {
                status: ExecutionStatus::Error,
                error_message: Some(error_message),
                success_message: None,
                ..self
            },
            ExecutionEvent::Reset | ExecutionEvent::Unblock => ExecutionState::default(),
            ExecutionEvent::SoftReset { error_message } => ExecutionState {
                status: ExecutionStatus::Idle,
                executing_action: None,
                error_message,
                success_message: None,
            },
            ExecutionEvent::Block => ExecutionState::blocked(),
        }
    }

    pub fn is_executing(&self) -> bool {
        self.status == ExecutionStatus::Executing
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn executing() -> ExecutionState {
        ExecutionState::default().reduce(ExecutionEvent::Initiate {
            executing_action: 2,
        })
    }

    #[test]
    fn initiate_clears_previous_messages() {
        let state = ExecutionState {
            error_message: Some("earlier".to_string()),
            ..Default::default()
        }
        .reduce(ExecutionEvent::Initiate {
            executing_action: 2,
        });
        assert_eq!(state.status, ExecutionStatus::Executing);
        assert_eq!(state.executing_action, Some(2));
        assert_eq!(state.error_message, None);
    }

    #[test]
    fn finish_keeps_the_executing_action() {
        let state = executing().reduce(ExecutionEvent::Finish {
            success_message: Some("42".to_string()),
        });
        assert_eq!(state.status, ExecutionStatus::Success);
        assert_eq!(state.executing_action, Some(2));
        assert_eq!(state.success_message.as_deref(), Some("42"));
    }

    #[test]
    fn fail_replaces_success() {
        let state = executing()
            .reduce(ExecutionEvent::Finish {
                success_message: Some("42".to_string()),
            })
            .reduce(ExecutionEvent::Fail {
                error_message: "boom".to_string(),
            });
        assert_eq!(state.status, ExecutionStatus::Error);
        assert_eq!(state.success_message, None);
        assert_eq!(state.error_message.as_deref(), Some("boom"));
    }

    #[test]
    fn soft_reset_surfaces_the_message() {
        let state = executing().reduce(ExecutionEvent::SoftReset {
            error_message: Some("rejected".to_string()),
        });
        assert_eq!(
            state,
            ExecutionState {
                status: ExecutionStatus::Idle,
                executing_action: None,
                error_message: Some("rejected".to_string()),
                success_message: None,
            }
        );
        assert_eq!(executing().reduce(ExecutionEvent::Reset), ExecutionState::default());
    }

    #[test]
    fn block_and_unblock() {
        let state = executing().reduce(ExecutionEvent::Block);
        assert_eq!(state, ExecutionState::blocked());
        assert_eq!(state.reduce(ExecutionEvent::Unblock), ExecutionState::default());
    }
}
