use candid::{CandidType, Deserialize, Principal};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

#[derive(CandidType, Deserialize, Serialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StrikeStatus {
    Submitted,
    Trusted,
    Blocked,
}

impl fmt::Display for StrikeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StrikeStatus::Submitted => "submitted",
            StrikeStatus::Trusted => "trusted",
            StrikeStatus::Blocked => "blocked",
        };
        f.write_str(name)
    }
}

impl FromStr for StrikeStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "submitted" => Ok(StrikeStatus::Submitted),
            "trusted" => Ok(StrikeStatus::Trusted),
            "blocked" => Ok(StrikeStatus::Blocked),
            _ => Err(format!(
                "unknown status '{s}', expected one of submitted, trusted, blocked"
            )),
        }
    }
}

/// One registered canister.
#[derive(CandidType, Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
pub struct StrikeRegistry {
    pub canister_id: Principal,
    pub module_hash: Option<String>,
    pub name: String,
    pub email: String,
    pub telegram: Option<String>,
    pub twitter: Option<String>,
    pub project_name: String,
    pub description: String,
    pub website_url: Option<String>,
    /// Nanoseconds since the epoch.
    pub created_at: u64,
    pub added_by: Principal,
    pub status: StrikeStatus,
}

#[derive(CandidType, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct AddRegistryParams {
    pub canister_id: Principal,
    pub name: String,
    pub email: String,
    pub telegram: Option<String>,
    pub twitter: Option<String>,
    pub project_name: String,
    pub description: String,
    pub website_url: Option<String>,
}

/// Pages start at 1.
#[derive(CandidType, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pagination {
    pub page: u32,
    #[serde(rename = "pageSize")]
    pub page_size: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Pagination {
            page: 1,
            page_size: 20,
        }
    }
}

#[derive(CandidType, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct GetRegistriesParams {
    pub status: Option<StrikeStatus>,
    pub pagination: Pagination,
}

#[derive(CandidType, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct PaginatedResponse {
    pub items: Vec<StrikeRegistry>,
    pub total: u32,
}

#[derive(CandidType, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct UpdateRegistryStatusParams {
    pub canister_id: Principal,
    pub status: StrikeStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagination_uses_the_canister_field_name() {
        let ty = Pagination::ty().to_string();
        assert!(ty.contains("pageSize"), "{ty}");
        assert!(!ty.contains("page_size"), "{ty}");
    }

    #[test]
    fn status_parses_case_insensitively() {
        assert_eq!("Trusted".parse(), Ok(StrikeStatus::Trusted));
        assert_eq!("blocked".parse(), Ok(StrikeStatus::Blocked));
        assert!("approved".parse::<StrikeStatus>().is_err());
        assert_eq!(StrikeStatus::Submitted.to_string(), "submitted");
    }
}
