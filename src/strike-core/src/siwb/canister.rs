use crate::error::siwb::SiwbServiceError;
use crate::siwb::types::{LoginArgs, LoginDetails, SiwbSignedDelegation};
use async_trait::async_trait;
use candid::utils::ArgumentEncoder;
use candid::{encode_args, CandidType, Decode, Deserialize, Principal};
use ic_agent::identity::SignedDelegation;
use ic_agent::Agent;

pub const PREPARE_LOGIN: &str = "siwb_prepare_login";
pub const LOGIN: &str = "siwb_login";
pub const GET_DELEGATION: &str = "siwb_get_delegation";

/// The identity canister side of SIWB.
#[async_trait]
pub trait SiwbIdentityService: Send + Sync {
    /// Returns the challenge message the wallet has to sign.
    async fn prepare_login(&self, address: &str) -> Result<String, SiwbServiceError>;

    async fn login(&self, args: &LoginArgs) -> Result<LoginDetails, SiwbServiceError>;

    async fn get_delegation(
        &self,
        address: &str,
        session_key: &[u8],
        expiration: u64,
    ) -> Result<SignedDelegation, SiwbServiceError>;
}

/// `SiwbIdentityService` over an anonymous agent.
pub struct SiwbCanister {
    agent: Agent,
    canister_id: Principal,
}

impl SiwbCanister {
    pub fn new(agent: Agent, canister_id: Principal) -> Self {
        SiwbCanister { agent, canister_id }
    }

    fn encode<A: ArgumentEncoder>(method: &str, args: A) -> Result<Vec<u8>, SiwbServiceError> {
        encode_args(args).map_err(|err| SiwbServiceError::EncodeFailed {
            method: method.to_string(),
            message: err.to_string(),
        })
    }

    fn decode<T>(method: &str, bytes: &[u8]) -> Result<T, SiwbServiceError>
    where
        T: CandidType + for<'de> Deserialize<'de>,
    {
        let result = Decode!(bytes, Result<T, String>).map_err(|err| {
            SiwbServiceError::DecodeFailed {
                method: method.to_string(),
                message: err.to_string(),
            }
        })?;
        result.map_err(SiwbServiceError::Rejected)
    }

    async fn update(&self, method: &str, arg: Vec<u8>) -> Result<Vec<u8>, SiwbServiceError> {
        self.agent
            .update(&self.canister_id, method)
            .with_arg(arg)
            .call_and_wait()
            .await
            .map_err(|err| SiwbServiceError::CallFailed {
                method: method.to_string(),
                message: err.to_string(),
            })
    }

    async fn query(&self, method: &str, arg: Vec<u8>) -> Result<Vec<u8>, SiwbServiceError> {
        self.agent
            .query(&self.canister_id, method)
            .with_arg(arg)
            .call()
            .await
            .map_err(|err| SiwbServiceError::CallFailed {
                method: method.to_string(),
                message: err.to_string(),
            })
    }
}

#[async_trait]
impl SiwbIdentityService for SiwbCanister {
    async fn prepare_login(&self, address: &str) -> Result<String, SiwbServiceError> {
        let arg = Self::encode(PREPARE_LOGIN, (address,))?;
        let response = self.update(PREPARE_LOGIN, arg).await?;
        Self::decode(PREPARE_LOGIN, &response)
    }

    async fn login(&self, args: &LoginArgs) -> Result<LoginDetails, SiwbServiceError> {
        let arg = Self::encode(
            LOGIN,
            (
                &args.signature,
                &args.address,
                &args.public_key,
                &args.session_key,
                args.sign_message_type,
            ),
        )?;
        let response = self.update(LOGIN, arg).await?;
        Self::decode(LOGIN, &response)
    }

    async fn get_delegation(
        &self,
        address: &str,
        session_key: &[u8],
        expiration: u64,
    ) -> Result<SignedDelegation, SiwbServiceError> {
        let arg = Self::encode(GET_DELEGATION, (address, session_key.to_vec(), expiration))?;
        let response = self.query(GET_DELEGATION, arg).await?;
        let signed: SiwbSignedDelegation = Self::decode(GET_DELEGATION, &response)?;
        Ok(signed.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use candid::Encode;

    #[test]
    fn canister_rejections_surface_their_message() {
        let bytes = Encode!(&Result::<String, String>::Err("Address not found".to_string())).unwrap();
        assert_eq!(
            SiwbCanister::decode::<String>(PREPARE_LOGIN, &bytes),
            Err(SiwbServiceError::Rejected("Address not found".to_string()))
        );
    }

    #[test]
    fn login_details_decode_from_ok_variant() {
        let details = LoginDetails {
            expiration: 42,
            user_canister_pubkey: vec![1, 2, 3],
        };
        let bytes = Encode!(&Result::<LoginDetails, String>::Ok(details.clone())).unwrap();
        assert_eq!(SiwbCanister::decode::<LoginDetails>(LOGIN, &bytes), Ok(details));
    }

    #[test]
    fn mismatched_payload_is_a_decode_error() {
        let bytes = Encode!(&42u64).unwrap();
        assert!(matches!(
            SiwbCanister::decode::<String>(PREPARE_LOGIN, &bytes),
            Err(SiwbServiceError::DecodeFailed { .. })
        ));
    }
}
