//! CLI command handlers.
//!
//! Thin glue between parsed arguments and the blueprint client. Every
//! handler resolves its target containers, calls the client, and prints the
//! resulting entities as pretty JSON. All real decisions live in
//! [`crate::blueprint`].

pub mod assignment;
pub mod blueprint;

use anyhow::Result;
use serde::Serialize;

/// Print one entity per JSON document.
pub(crate) fn print_entities<T: Serialize>(entities: &[T]) -> Result<()> {
    for entity in entities {
        println!("{}", serde_json::to_string_pretty(entity)?);
    }
    Ok(())
}

pub(crate) fn print_entity<T: Serialize>(entity: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(entity)?);
    Ok(())
}
