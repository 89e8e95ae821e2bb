//! Domain modules organized as vertical slices.
//!
//! Each sub-module contains:
//! - `mod.rs` — Rich domain types (validated, business-logic-ready)
//! - `wire.rs` — Raw serde structs matching backend responses
//! - `convert.rs` — `From` conversions out of the wire shape
//! - `client.rs` — Sub-client with the HTTP methods for the slice

pub mod project;
