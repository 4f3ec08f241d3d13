//! Resource payload, persisted record, and search parameter shapes.
//!
//! # Responsibility
//! - Define the values routed between dispatcher and collaborators.
//! - Keep payload validation next to the payload type.
//!
//! # Invariants
//! - Every persisted record is identified by a stable `RecordId`.
//! - The dispatcher never mutates payloads; hydrators own record mutation.

pub mod resource;
pub mod search;
