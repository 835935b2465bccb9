use ic_agent::agent::OperationStatus;
use ic_agent::AgentError;

/// A call is safe to repeat only when it never reached the replica.
pub fn retryable(agent_error: &AgentError) -> bool {
    agent_error
        .operation_info()
        .is_some_and(|op| op.status == OperationStatus::NotSent)
}
