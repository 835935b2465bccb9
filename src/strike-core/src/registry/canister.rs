use crate::error::registry::RegistryError;
use crate::network::retryable::retryable;
use crate::registry::types::{
    AddRegistryParams, GetRegistriesParams, PaginatedResponse, StrikeRegistry,
    UpdateRegistryStatusParams,
};
use async_trait::async_trait;
use backoff::future::retry;
use backoff::ExponentialBackoff;
use candid::utils::ArgumentEncoder;
use candid::{encode_args, CandidType, Decode, Deserialize, Principal};
use ic_agent::Agent;
use slog::{trace, Logger};

const ADD_ADMIN: &str = "add_admin";
const REMOVE_ADMIN: &str = "remove_admin";
const GET_ADMINS: &str = "get_admins";
const IS_ADMIN: &str = "is_admin";
const ADD_REGISTRY: &str = "add_registry";
const GET_REGISTRIES: &str = "get_registries";
const GET_STRIKE_BY_CANISTER_ID: &str = "get_strike_by_canister_id";
const UPDATE_REGISTRY_STATUS: &str = "update_registry_status";

/// The single registry read the security gate needs.
#[async_trait]
pub trait RegistryLookup: Send + Sync {
    async fn get_strike_by_canister_id(
        &self,
        canister_id: Principal,
    ) -> Result<Option<StrikeRegistry>, RegistryError>;
}

pub struct RegistryCanister {
    agent: Agent,
    canister_id: Principal,
    logger: Logger,
}

impl RegistryCanister {
    pub fn new(agent: Agent, canister_id: Principal, logger: Logger) -> Self {
        RegistryCanister {
            agent,
            canister_id,
            logger,
        }
    }

    pub fn canister_id(&self) -> Principal {
        self.canister_id
    }

    pub async fn add_admin(&self, admin: Principal) -> Result<(), RegistryError> {
        let result: Result<(), String> = self.update(ADD_ADMIN, (admin,)).await?;
        result.map_err(|message| RegistryError::Rejected(ADD_ADMIN, message))
    }

    pub async fn remove_admin(&self, admin: Principal) -> Result<(), RegistryError> {
        let result: Result<(), String> = self.update(REMOVE_ADMIN, (admin,)).await?;
        result.map_err(|message| RegistryError::Rejected(REMOVE_ADMIN, message))
    }

    pub async fn get_admins(&self) -> Result<Vec<Principal>, RegistryError> {
        self.query(GET_ADMINS, ()).await
    }

    pub async fn is_admin(&self, user: Principal) -> Result<bool, RegistryError> {
        self.query(IS_ADMIN, (user,)).await
    }

    pub async fn add_registry(&self, params: &AddRegistryParams) -> Result<(), RegistryError> {
        let result: Result<(), String> = self.update(ADD_REGISTRY, (params,)).await?;
        result.map_err(|message| RegistryError::Rejected(ADD_REGISTRY, message))
    }

    pub async fn get_registries(
        &self,
        params: &GetRegistriesParams,
    ) -> Result<PaginatedResponse, RegistryError> {
        self.query(GET_REGISTRIES, (params,)).await
    }

    pub async fn update_registry_status(
        &self,
        params: &UpdateRegistryStatusParams,
    ) -> Result<(), RegistryError> {
        let result: Result<(), String> = self.update(UPDATE_REGISTRY_STATUS, (params,)).await?;
        result.map_err(|message| RegistryError::Rejected(UPDATE_REGISTRY_STATUS, message))
    }

    /// Queries are read-only, so transport failures that never reached the
    /// replica are retried.
    async fn query<A, R>(&self, method: &'static str, args: A) -> Result<R, RegistryError>
    where
        A: ArgumentEncoder,
        R: CandidType + for<'de> Deserialize<'de>,
    {
        let arg = encode_args(args).map_err(|err| RegistryError::EncodeFailed(method, err))?;
        trace!(self.logger, "Registry query"; "method" => method);
        let response = retry(ExponentialBackoff::default(), || {
            let arg = arg.clone();
            async move {
                match self
                    .agent
                    .query(&self.canister_id, method)
                    .with_arg(arg)
                    .call()
                    .await
                {
                    Ok(bytes) => Ok(bytes),
                    Err(err) if retryable(&err) => Err(backoff::Error::transient(err)),
                    Err(err) => Err(backoff::Error::permanent(err)),
                }
            }
        })
        .await
        .map_err(|err| RegistryError::CallFailed(method, err))?;
        Decode!(&response, R).map_err(|err| RegistryError::DecodeFailed(method, err))
    }

    async fn update<A, R>(&self, method: &'static str, args: A) -> Result<R, RegistryError>
    where
        A: ArgumentEncoder,
        R: CandidType + for<'de> Deserialize<'de>,
    {
        let arg = encode_args(args).map_err(|err| RegistryError::EncodeFailed(method, err))?;
        trace!(self.logger, "Registry update"; "method" => method);
        let response = self
            .agent
            .update(&self.canister_id, method)
            .with_arg(arg)
            .call_and_wait()
            .await
            .map_err(|err| RegistryError::CallFailed(method, err))?;
        Decode!(&response, R).map_err(|err| RegistryError::DecodeFailed(method, err))
    }
}

#[async_trait]
impl RegistryLookup for RegistryCanister {
    async fn get_strike_by_canister_id(
        &self,
        canister_id: Principal,
    ) -> Result<Option<StrikeRegistry>, RegistryError> {
        self.query(GET_STRIKE_BY_CANISTER_ID, (canister_id,)).await
    }
}
