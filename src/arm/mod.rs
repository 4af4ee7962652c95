//! Azure Resource Manager plumbing
//!
//! Everything the blueprint client needs to actually reach ARM:
//!
//! - [`auth`] - access tokens via the Azure CLI, with caching
//! - [`http`] - HTTP utilities for ARM REST calls
//! - [`catalog`] - the [`crate::blueprint::api::CatalogApi`] implementation
//!
//! The core in [`crate::blueprint`] treats all of this as an external
//! collaborator; retries, polling, and credential refresh policy live here
//! or nowhere.

pub mod auth;
pub mod catalog;
pub mod http;
