//! Resource action dispatcher for JSON:API style CRUD endpoints.
//!
//! Routes index/read/create/update/delete onto a store, a hydrator, a
//! transaction manager, and a response builder, with optional lifecycle
//! hooks around every mutation.

pub mod config;
pub mod db;
pub mod dispatch;
pub mod error;
pub mod hydrator;
pub mod logging;
pub mod model;
pub mod repo;
pub mod response;
pub mod service;
pub mod store;
pub mod tx;

pub use config::{AppConfig, ConfigError, DispatchConfig};
pub use dispatch::{
    DispatcherBuilder, HydratorBinding, RepositoryHandler, ResourceDispatcher, ResourceHandler,
};
pub use error::{DispatchError, DispatchResult};
pub use hydrator::{Hydrator, SqliteHydrator};
pub use logging::{default_log_level, init_logging, init_logging_from_config, logging_status};
pub use model::resource::{Attributes, Record, RecordId, ResourceObject, ResourceValidationError};
pub use model::search::{IndexRequest, SearchParameters};
pub use repo::record_repo::{RecordRepository, RepoError, RepoResult, SqliteRecordRepository};
pub use response::{HttpResponse, ResponseBody, ResponseBuilder, StatusReply};
pub use service::{ContainerService, ServiceContainer, ServiceContainerError};
pub use store::{SqliteStore, Store};
pub use tx::{DbConnections, TransactionManager, DEFAULT_CONNECTION};

/// Minimal health-check API.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
