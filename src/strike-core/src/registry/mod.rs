//! Client for the STRIKE registry canister, which records who submitted a
//! canister and whether reviewers trust or block it.
pub mod canister;
pub mod types;

pub use canister::{RegistryCanister, RegistryLookup};
pub use types::{
    AddRegistryParams, GetRegistriesParams, PaginatedResponse, Pagination, StrikeRegistry,
    StrikeStatus, UpdateRegistryStatusParams,
};
