//! Transaction manager contract and named SQLite connections.
//!
//! # Responsibility
//! - Run mutation closures either inside a transaction or directly.
//! - Resolve optional connection names to registered connections.
//!
//! # Invariants
//! - `run_in_transaction` commits only when the closure returns `Ok`.
//! - Closure errors propagate unchanged after rollback.
//! - `&mut self` access keeps at most one scope open per manager.

use crate::db::{DbError, DbResult};
use crate::error::DispatchResult;
use log::{debug, warn};
use rusqlite::{Connection, TransactionBehavior};
use std::collections::BTreeMap;

/// Name of the connection used when no name is configured.
pub const DEFAULT_CONNECTION: &str = "default";

/// Unit-of-work abstraction the dispatcher runs mutations through.
pub trait TransactionManager {
    /// Runs `work` inside a transaction on the named (or default) connection.
    fn run_in_transaction<T, F>(&mut self, connection: Option<&str>, work: F) -> DispatchResult<T>
    where
        F: FnOnce(&Connection) -> DispatchResult<T>;

    /// Runs `work` on the named (or default) connection with no atomic scope.
    fn run_direct<T, F>(&mut self, connection: Option<&str>, work: F) -> DispatchResult<T>
    where
        F: FnOnce(&Connection) -> DispatchResult<T>;
}

/// Registry of SQLite connections keyed by name.
pub struct DbConnections {
    connections: BTreeMap<String, Connection>,
}

impl DbConnections {
    /// Creates a registry whose default connection is `conn`.
    pub fn new(conn: Connection) -> Self {
        let mut connections = BTreeMap::new();
        connections.insert(DEFAULT_CONNECTION.to_string(), conn);
        Self { connections }
    }

    /// Registers (or replaces) a named connection.
    pub fn with_connection(mut self, name: impl Into<String>, conn: Connection) -> Self {
        self.connections.insert(name.into(), conn);
        self
    }

    /// Returns sorted connection names.
    pub fn names(&self) -> Vec<String> {
        self.connections.keys().cloned().collect()
    }

    /// Borrows a connection for reads outside the dispatcher.
    pub fn connection(&self, name: Option<&str>) -> DbResult<&Connection> {
        let name = resolve_name(name);
        self.connections
            .get(name)
            .ok_or_else(|| DbError::UnknownConnection(name.to_string()))
    }

    fn connection_mut(&mut self, name: Option<&str>) -> DbResult<&mut Connection> {
        let name = resolve_name(name);
        self.connections
            .get_mut(name)
            .ok_or_else(|| DbError::UnknownConnection(name.to_string()))
    }
}

impl TransactionManager for DbConnections {
    fn run_in_transaction<T, F>(&mut self, connection: Option<&str>, work: F) -> DispatchResult<T>
    where
        F: FnOnce(&Connection) -> DispatchResult<T>,
    {
        let name = resolve_name(connection).to_string();
        let conn = self.connection_mut(Some(name.as_str()))?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        debug!("event=tx_begin module=tx status=ok connection={name}");

        match work(&tx) {
            Ok(value) => {
                tx.commit()?;
                debug!("event=tx_commit module=tx status=ok connection={name}");
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback_err) = tx.rollback() {
                    warn!(
                        "event=tx_rollback module=tx status=error connection={name} error={rollback_err}"
                    );
                } else {
                    debug!(
                        "event=tx_rollback module=tx status=ok connection={name} cause={}",
                        err.code()
                    );
                }
                Err(err)
            }
        }
    }

    fn run_direct<T, F>(&mut self, connection: Option<&str>, work: F) -> DispatchResult<T>
    where
        F: FnOnce(&Connection) -> DispatchResult<T>,
    {
        let conn = self.connection(connection)?;
        work(conn)
    }
}

fn resolve_name(name: Option<&str>) -> &str {
    match name.map(str::trim) {
        Some(value) if !value.is_empty() => value,
        _ => DEFAULT_CONNECTION,
    }
}

#[cfg(test)]
mod tests {
    use super::{resolve_name, DbConnections, TransactionManager, DEFAULT_CONNECTION};
    use crate::db::{open_db_in_memory, DbError};
    use crate::error::DispatchError;

    fn count_rows(connections: &DbConnections, name: Option<&str>) -> i64 {
        connections
            .connection(name)
            .expect("connection should exist")
            .query_row("SELECT COUNT(*) FROM resources;", [], |row| row.get(0))
            .expect("count should succeed")
    }

    fn insert_row(conn: &rusqlite::Connection) -> rusqlite::Result<usize> {
        conn.execute(
            "INSERT INTO resources (id, resource_type) VALUES (lower(hex(randomblob(16))), 'posts');",
            [],
        )
    }

    #[test]
    fn blank_name_resolves_to_default() {
        assert_eq!(resolve_name(None), DEFAULT_CONNECTION);
        assert_eq!(resolve_name(Some("  ")), DEFAULT_CONNECTION);
        assert_eq!(resolve_name(Some(" audit ")), "audit");
    }

    #[test]
    fn transaction_commits_on_ok_and_rolls_back_on_err() {
        let mut connections = DbConnections::new(open_db_in_memory().expect("open db"));

        connections
            .run_in_transaction(None, |conn| Ok(insert_row(conn)?))
            .expect("committed work");
        assert_eq!(count_rows(&connections, None), 1);

        let err = connections
            .run_in_transaction(None, |conn| -> Result<(), DispatchError> {
                insert_row(conn)?;
                Err(DispatchError::hook("abort"))
            })
            .expect_err("work error should propagate");
        assert!(matches!(err, DispatchError::Hook(_)));
        assert_eq!(count_rows(&connections, None), 1);
    }

    #[test]
    fn unknown_connection_is_rejected() {
        let mut connections = DbConnections::new(open_db_in_memory().expect("open db"));
        let err = connections
            .run_in_transaction(Some("audit"), |_| Ok(()))
            .expect_err("unknown connection should fail");
        assert!(
            matches!(err, DispatchError::Db(DbError::UnknownConnection(ref name)) if name == "audit")
        );
    }

    #[test]
    fn named_connection_is_isolated_from_default() {
        let mut connections = DbConnections::new(open_db_in_memory().expect("open default"))
            .with_connection("audit", open_db_in_memory().expect("open audit"));
        assert_eq!(connections.names(), vec!["audit", "default"]);

        connections
            .run_in_transaction(Some("audit"), |conn| Ok(insert_row(conn)?))
            .expect("audit write");
        assert_eq!(count_rows(&connections, Some("audit")), 1);
        assert_eq!(count_rows(&connections, None), 0);
    }
}
