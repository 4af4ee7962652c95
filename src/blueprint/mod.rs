//! Blueprint catalog client
//!
//! This module implements the resource-client layer for Azure Blueprints:
//!
//! - [`api`] - the abstract catalog capability the client is written against
//! - [`client`] - the façade exposing get/list/create/delete per resource type
//! - [`mapper`] - raw ARM records into the domain model
//! - [`models`] - domain entities (definitions, published versions, assignments)
//! - [`paging`] - draining cursor-based list responses
//! - [`dates`] - null-tolerant timestamp comparison
//! - [`latest`] - "latest published version" selection
//! - [`fanout`] - fetching across many management groups at once
//! - [`assignment`] - assignment submission specs and parameter validation
//! - [`error`] - the typed failure taxonomy

pub mod api;
pub mod assignment;
pub mod client;
pub mod dates;
pub mod error;
pub mod fanout;
pub mod latest;
pub mod mapper;
pub mod models;
pub mod paging;

pub use client::BlueprintClient;
pub use error::BlueprintError;
