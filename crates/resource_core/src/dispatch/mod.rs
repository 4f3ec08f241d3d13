//! Resource action dispatcher.
//!
//! # Responsibility
//! - Map index/read/create/update/delete onto store, hydrator, and reply.
//! - Fire lifecycle hooks around each mutation.
//! - Wrap mutations in the configured transaction scope.
//!
//! # Invariants
//! - Hooks run in order: before-hook, persistence step, after-hook.
//! - A failed mutation never produces a response; the error propagates.
//! - The transaction scope is closed before the response is built.

mod builder;
mod dispatcher;
mod handler;

pub use builder::{DispatcherBuilder, HydratorBinding};
pub use dispatcher::ResourceDispatcher;
pub use handler::{RepositoryHandler, ResourceHandler};
