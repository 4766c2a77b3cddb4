//! Core types and trait definitions for the FRBR catalogue.
//!
//! Holds the schema definition, the typed row model, and the store trait.
//! Free of database dependencies; backends and the CLI depend on it.

pub mod entity;
pub mod error;
pub mod kind;
pub mod link;
pub mod row;
pub mod schema;
pub mod store;
pub mod version;
pub mod view;

pub use error::{Error, Result};
