use crate::action::{Action, ActionComponent, ActionResolver, Origin, ResolvedAction};
use crate::error::display_chain;
use crate::error::execution::ExecuteError;
use crate::execution::adapter::{ActionAdapter, ActionContext};
use crate::execution::state::{ExecutionEvent, ExecutionState, ExecutionStatus};
use crate::identity::principal_of;
use crate::idl::{idl_args_to_json, marshal_arguments, ParameterValue, ServiceInterface};
use crate::security::gate::{Disclaimer, SecurityAssessment, SecurityGate};
use slog::{debug, info, warn, Logger};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Runs the components of one action against the connected wallet.
///
/// Every attempt re-evaluates the security gate first. Once started, an
/// attempt never fails with an error: it ends in the execution state as a
/// success, a reset, or a message for the user.
pub struct ActionExecutor {
    action: Action,
    origin: Option<Origin>,
    resolver: Arc<ActionResolver>,
    gate: SecurityGate,
    adapter: Arc<dyn ActionAdapter>,
    assessment: SecurityAssessment,
    state: ExecutionState,
    logger: Logger,
}

impl ActionExecutor {
    /// Starts blocked when the action is malicious or fails the configured levels.
    pub async fn new(
        resolved: ResolvedAction,
        resolver: Arc<ActionResolver>,
        gate: SecurityGate,
        adapter: Arc<dyn ActionAdapter>,
        logger: Logger,
    ) -> Self {
        let ResolvedAction { action, origin } = resolved;
        let assessment = gate.evaluate(&action, origin.as_ref()).await;
        let state = if assessment.initially_blocked() {
            ExecutionState::blocked()
        } else {
            ExecutionState::default()
        };
        debug!(logger, "Assessed action"; "overall" => ?assessment.overall, "passes" => assessment.passes);
        ActionExecutor {
            action,
            origin,
            resolver,
            gate,
            adapter,
            assessment,
            state,
            logger,
        }
    }

    pub fn action(&self) -> &Action {
        &self.action
    }

    pub fn origin(&self) -> Option<&Origin> {
        self.origin.as_ref()
    }

    pub fn assessment(&self) -> &SecurityAssessment {
        &self.assessment
    }

    pub fn state(&self) -> &ExecutionState {
        &self.state
    }

    /// The user skipped the disclaimer. Refused for malicious actions the
    /// configured levels do not let through.
    pub fn unblock(&mut self) -> bool {
        if self.state.status != ExecutionStatus::Blocked {
            return false;
        }
        let ignorable = match self.assessment.disclaimer {
            Some(Disclaimer::Blocked { ignorable }) => ignorable,
            Some(Disclaimer::Unknown { .. }) | None => true,
        };
        if ignorable {
            self.dispatch(ExecutionEvent::Unblock);
        }
        ignorable
    }

    /// Stages `params` on component `index` and invokes it.
    ///
    /// Input that does not validate is refused before anything else happens.
    pub async fn execute(
        &mut self,
        index: usize,
        params: &BTreeMap<String, ParameterValue>,
    ) -> Result<&ExecutionState, ExecuteError> {
        if self.action.disabled || self.action.is_completed() {
            return Err(ExecuteError::Disabled);
        }
        match self.state.status {
            ExecutionStatus::Blocked => return Err(ExecuteError::Blocked),
            ExecutionStatus::Executing => return Err(ExecuteError::Busy),
            _ => {}
        }
        let mut component = self
            .action
            .component(index)
            .cloned()
            .ok_or(ExecuteError::UnknownComponent(index))?;
        component.stage(params)?;
        component.validate()?;

        if self.security_degraded().await {
            self.dispatch(ExecutionEvent::Block);
            return Ok(&self.state);
        }

        self.dispatch(ExecutionEvent::Initiate {
            executing_action: index,
        });
        let context = ActionContext {
            action: self.action.clone(),
            action_state: self.assessment.extended,
            original_url: self
                .origin
                .as_ref()
                .map(|origin| origin.url().clone())
                .unwrap_or_else(|| self.action.url.clone()),
            triggered_component: index,
            derivation_origin: self.action.derivation_origin.clone(),
        };
        let outcome = self.invoke(&component, &context).await;
        self.dispatch(outcome);
        Ok(&self.state)
    }

    /// Re-runs the gate. Degraded means the classification changed and no
    /// longer passes.
    async fn security_degraded(&mut self) -> bool {
        let assessment = self.gate.evaluate(&self.action, self.origin.as_ref()).await;
        let degraded = assessment.extended != self.assessment.extended && !assessment.passes;
        if degraded {
            warn!(self.logger, "Action classification degraded";
                "was" => ?self.assessment.overall, "now" => ?assessment.overall);
        }
        self.assessment = assessment;
        degraded
    }

    async fn invoke(
        &mut self,
        component: &ActionComponent,
        context: &ActionContext,
    ) -> ExecutionEvent {
        let Some(identity) = self.adapter.connect(context).await else {
            debug!(self.logger, "No identity, execution reset");
            return ExecutionEvent::Reset;
        };
        let Some(principal) = principal_of(identity.as_ref()) else {
            return soft_reset("The wallet returned an identity without a principal".to_string());
        };

        let payload = match self
            .resolver
            .invocation_payload(&self.action, component, &principal.to_text())
            .await
        {
            Ok(payload) => payload,
            Err(err) => return soft_reset(display_chain(&err)),
        };
        if let Some(message) = &payload.message {
            debug!(self.logger, "Action server message: {}", message);
        }

        let interface = match ServiceInterface::single(
            &payload.method,
            &payload.input,
            &payload.output,
            payload.call_type,
        ) {
            Ok(interface) => interface,
            Err(err) => return soft_reset(display_chain(&err)),
        };
        let Some(canister_id) = self.action.canister_principal() else {
            return soft_reset(format!("Invalid canister id '{}'", self.action.canister_id));
        };
        let actor = match self
            .adapter
            .create_actor(canister_id, interface.clone(), context)
            .await
        {
            Ok(actor) => actor,
            Err(err) => {
                warn!(self.logger, "Failed to create actor: {}", err);
                return ExecutionEvent::Fail {
                    error_message: err.to_string(),
                };
            }
        };

        let types = interface
            .method(&payload.method)
            .map(|signature| signature.args.clone())
            .unwrap_or_default();
        let args = match marshal_arguments(
            &payload.input_parameters,
            &types,
            component.values(),
            principal,
        ) {
            Ok(args) => args,
            Err(err) => return soft_reset(display_chain(&err)),
        };

        // The registry may have changed while the wallet was connecting.
        if self.security_degraded().await {
            return ExecutionEvent::Block;
        }

        match actor.call(&payload.method, args).await {
            Ok(result) => {
                info!(self.logger, "Action executed"; "method" => &payload.method, "canister" => %canister_id);
                let rendered = serde_json::to_string(&idl_args_to_json(&result))
                    .unwrap_or_else(|_| "null".to_string());
                ExecutionEvent::Finish {
                    success_message: Some(rendered),
                }
            }
            Err(err) => soft_reset(display_chain(&err)),
        }
    }

    fn dispatch(&mut self, event: ExecutionEvent) {
        let from = self.state.status;
        self.state = std::mem::take(&mut self.state).reduce(event);
        debug!(self.logger, "Execution state"; "from" => ?from, "to" => ?self.state.status);
    }
}

fn soft_reset(error_message: String) -> ExecutionEvent {
    ExecutionEvent::SoftReset {
        error_message: Some(error_message),
    }
}
