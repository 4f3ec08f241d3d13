//! Read-path collaborator.

use crate::error::DispatchResult;
use crate::model::resource::Record;
use crate::model::search::SearchParameters;
use crate::repo::record_repo::{RecordRepository, SqliteRecordRepository};
use rusqlite::Connection;

/// Query execution for index requests.
pub trait Store {
    fn query(
        &self,
        conn: &Connection,
        resource_type: &str,
        parameters: &SearchParameters,
    ) -> DispatchResult<Vec<Record>>;
}

/// Store backed by the `resources` table.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteStore;

impl Store for SqliteStore {
    fn query(
        &self,
        conn: &Connection,
        resource_type: &str,
        parameters: &SearchParameters,
    ) -> DispatchResult<Vec<Record>> {
        let records = SqliteRecordRepository::new(conn).list_records(resource_type, parameters)?;
        Ok(records)
    }
}
