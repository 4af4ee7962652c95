//! Library surface for azbp.
//!
//! The interesting parts live in [`blueprint`]: a typed client for the Azure
//! Blueprints resource provider that walks paginated ARM list responses, maps
//! raw records into domain entities, and resolves "latest published version"
//! semantics. The [`arm`] module supplies the plumbing (token acquisition,
//! HTTP, URL construction) that the blueprint client runs on.

pub mod arm;
pub mod blueprint;
pub mod commands;
pub mod config;
