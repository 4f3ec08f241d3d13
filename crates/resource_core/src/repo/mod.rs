//! Repository layer over the `resources` table.
//!
//! # Responsibility
//! - Define record-oriented data access contracts.
//! - Isolate SQL details from hydrators, stores, and the dispatcher.
//!
//! # Invariants
//! - Repositories operate on whatever connection they are handed; they never
//!   open or commit transactions themselves.

pub mod record_repo;
