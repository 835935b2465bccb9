use crate::wallet::SignMessageType;
use candid::{CandidType, Deserialize, Principal};
use ic_agent::identity::{Delegation, SignedDelegation};

#[derive(CandidType, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct LoginDetails {
    pub expiration: u64,
    pub user_canister_pubkey: Vec<u8>,
}

#[derive(CandidType, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct SiwbDelegation {
    pub pubkey: Vec<u8>,
    pub expiration: u64,
    pub targets: Option<Vec<Principal>>,
}

#[derive(CandidType, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct SiwbSignedDelegation {
    pub delegation: SiwbDelegation,
    pub signature: Vec<u8>,
}

impl From<SiwbSignedDelegation> for SignedDelegation {
    fn from(signed: SiwbSignedDelegation) -> Self {
        SignedDelegation {
            delegation: Delegation {
                pubkey: signed.delegation.pubkey,
                expiration: signed.delegation.expiration,
                targets: signed.delegation.targets,
            },
            signature: signed.signature,
        }
    }
}

/// Everything `siwb_login` needs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoginArgs {
    pub signature: String,
    pub address: String,
    pub public_key: String,
    pub session_key: Vec<u8>,
    pub sign_message_type: SignMessageType,
}
