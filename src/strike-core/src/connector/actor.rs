use crate::config::model::network_descriptor::NetworkDescriptor;
use crate::error::connector::{ActorCallError, CreateActorError};
use crate::error::root_key::FetchRootKeyError;
use crate::identity::IdentityHandle;
use crate::idl::{CallType, ServiceInterface};
use crate::network::agent::build_agent;
use crate::network::root_key::fetch_root_key_if_needed;
use async_trait::async_trait;
use candid::{IDLArgs, Principal, TypeEnv};
use ic_agent::Agent;
use slog::{trace, Logger};
use std::sync::Arc;

/// RPC proxy for one canister, typed by an interface built at runtime.
#[async_trait]
pub trait Actor: Send + Sync {
    fn canister_id(&self) -> Principal;

    fn interface(&self) -> &ServiceInterface;

    /// Encodes `args` against the method's argument types, calls it, and
    /// decodes the reply against its result types.
    async fn call(&self, method: &str, args: IDLArgs) -> Result<IDLArgs, ActorCallError>;
}

pub struct AgentActor {
    agent: Agent,
    canister_id: Principal,
    interface: ServiceInterface,
    logger: Logger,
}

impl AgentActor {
    pub fn new(
        agent: Agent,
        canister_id: Principal,
        interface: ServiceInterface,
        logger: Logger,
    ) -> Self {
        AgentActor {
            agent,
            canister_id,
            interface,
            logger,
        }
    }

    /// Builds an agent for `identity` and binds it to `canister_id`.
    pub async fn create(
        network: &NetworkDescriptor,
        identity: IdentityHandle,
        canister_id: Principal,
        interface: ServiceInterface,
        logger: Logger,
    ) -> Result<Arc<dyn Actor>, CreateActorError> {
        let agent = build_agent(network, identity)
            .map_err(|err| CreateActorError::CreateActorFailed(err.to_string()))?;
        fetch_root_key_if_needed(&agent, network)
            .await
            .map_err(|FetchRootKeyError::AgentError(url, err)| {
                CreateActorError::FetchRootKeyFailed(format!("{url}: {err}"))
            })?;
        Ok(Arc::new(AgentActor::new(agent, canister_id, interface, logger)))
    }
}

#[async_trait]
impl Actor for AgentActor {
    fn canister_id(&self) -> Principal {
        self.canister_id
    }

    fn interface(&self) -> &ServiceInterface {
        &self.interface
    }

    async fn call(&self, method: &str, args: IDLArgs) -> Result<IDLArgs, ActorCallError> {
        let signature = self
            .interface
            .method(method)
            .ok_or_else(|| ActorCallError::MethodNotFound(method.to_string()))?;
        // Candid types are reference counted and not `Send`, so none may live across an await.
        let arg = {
            let env = TypeEnv::new();
            args.to_bytes_with_types(&env, &signature.arg_types())
                .map_err(|err| ActorCallError::EncodeArgsFailed(method.to_string(), err))?
        };

        trace!(self.logger, "Calling canister"; "canister_id" => %self.canister_id, "method" => method, "type" => %signature.call_type);
        let reply = match signature.call_type {
            CallType::Query => {
                self.agent
                    .query(&self.canister_id, method)
                    .with_arg(arg)
                    .call()
                    .await
            }
            CallType::Update => {
                self.agent
                    .update(&self.canister_id, method)
                    .with_arg(arg)
                    .call_and_wait()
                    .await
            }
        }
        .map_err(|err| ActorCallError::CallFailed(method.to_string(), err))?;

        IDLArgs::from_bytes_with_types(&reply, &TypeEnv::new(), &signature.ret_types())
            .map_err(|err| ActorCallError::DecodeResultFailed(method.to_string(), err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::logger;
    use candid::IDLValue;

    fn actor() -> AgentActor {
        let agent = Agent::builder()
            .with_url("http://127.0.0.1:1")
            .build()
            .unwrap();
        let interface =
            ServiceInterface::single("bet", &["Nat32"], &["Text"], CallType::Update).unwrap();
        AgentActor::new(agent, Principal::anonymous(), interface, logger())
    }

    fn assert_send<T: Send>(_: &T) {}

    #[test]
    fn call_future_is_send() {
        let actor = actor();
        let call = actor.call("bet", IDLArgs::new(&[IDLValue::Nat32(1)]));
        assert_send(&call);
    }

    #[tokio::test]
    async fn unknown_method_is_refused_before_calling() {
        let err = actor()
            .call("withdraw", IDLArgs::new(&[]))
            .await
            .unwrap_err();
        assert!(matches!(err, ActorCallError::MethodNotFound(method) if method == "withdraw"));
    }

    #[tokio::test]
    async fn args_of_the_wrong_type_fail_to_encode() {
        let err = actor()
            .call("bet", IDLArgs::new(&[IDLValue::Text("one".to_string())]))
            .await
            .unwrap_err();
        assert!(matches!(err, ActorCallError::EncodeArgsFailed(method, _) if method == "bet"));
    }
}
