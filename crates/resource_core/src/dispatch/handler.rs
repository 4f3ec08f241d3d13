//! Per-resource handler: the deletion step plus optional lifecycle hooks.

use crate::error::DispatchResult;
use crate::model::resource::{Record, ResourceObject};
use crate::repo::record_repo::{RecordRepository, SqliteRecordRepository};
use rusqlite::Connection;

/// Resource-specific behavior plugged into a dispatcher.
///
/// Only `destroy_record` is required. Every hook defaults to a no-op, so a
/// handler overrides just the hooks it cares about. Hooks run on the same
/// connection (and transaction) as the mutation; returning an error aborts it.
pub trait ResourceHandler {
    /// Deletes `record`. Returns whether the record was actually removed.
    fn destroy_record(&self, conn: &Connection, record: &Record) -> DispatchResult<bool>;

    fn creating(&self, _conn: &Connection, _resource: &ResourceObject) -> DispatchResult<()> {
        Ok(())
    }

    fn created(
        &self,
        _conn: &Connection,
        _resource: &ResourceObject,
        _record: &Record,
    ) -> DispatchResult<()> {
        Ok(())
    }

    fn updating(
        &self,
        _conn: &Connection,
        _resource: &ResourceObject,
        _record: &Record,
    ) -> DispatchResult<()> {
        Ok(())
    }

    fn updated(
        &self,
        _conn: &Connection,
        _resource: &ResourceObject,
        _record: &Record,
    ) -> DispatchResult<()> {
        Ok(())
    }

    fn deleting(&self, _conn: &Connection, _record: &Record) -> DispatchResult<()> {
        Ok(())
    }

    fn deleted(&self, _conn: &Connection, _record: &Record) -> DispatchResult<()> {
        Ok(())
    }
}

/// Hook-free handler that hard-deletes from the `resources` table.
#[derive(Debug, Clone, Copy, Default)]
pub struct RepositoryHandler;

impl ResourceHandler for RepositoryHandler {
    fn destroy_record(&self, conn: &Connection, record: &Record) -> DispatchResult<bool> {
        Ok(SqliteRecordRepository::new(conn).delete_record(record.id)?)
    }
}
