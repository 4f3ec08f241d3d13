//! Error surface shared by the dispatcher and its collaborators.
//!
//! # Invariants
//! - `Runtime` is reserved for fatal dispatcher conditions (deletion failure,
//!   hydrator misconfiguration).
//! - Collaborator failures are wrapped without rewriting their message.

use crate::db::DbError;
use crate::model::resource::ResourceValidationError;
use crate::repo::record_repo::RepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type DispatchResult<T> = Result<T, DispatchError>;

#[derive(Debug)]
pub enum DispatchError {
    /// Non-recoverable dispatcher failure.
    Runtime(String),
    /// Payload rejected before or during hydration.
    Validation(ResourceValidationError),
    /// Repository failure raised by a store or hydrator.
    Repo(RepoError),
    /// Connection or transaction failure.
    Db(DbError),
    /// A lifecycle hook refused the mutation.
    Hook(String),
}

impl DispatchError {
    pub fn runtime(message: impl Into<String>) -> Self {
        Self::Runtime(message.into())
    }

    pub fn hook(message: impl Into<String>) -> Self {
        Self::Hook(message.into())
    }

    /// Stable short code used in log events.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Runtime(_) => "runtime",
            Self::Validation(_) => "validation",
            Self::Repo(_) => "repo",
            Self::Db(_) => "db",
            Self::Hook(_) => "hook",
        }
    }
}

impl Display for DispatchError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Runtime(message) => write!(f, "{message}"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::Hook(message) => write!(f, "lifecycle hook failed: {message}"),
        }
    }
}

impl Error for DispatchError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::Runtime(_) | Self::Hook(_) => None,
        }
    }
}

impl From<ResourceValidationError> for DispatchError {
    fn from(value: ResourceValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<RepoError> for DispatchError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Validation(err) => Self::Validation(err),
            other => Self::Repo(other),
        }
    }
}

impl From<DbError> for DispatchError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for DispatchError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}
