use crate::config::DispatchConfig;
use crate::error::{DispatchError, DispatchResult};
use crate::hydrator::Hydrator;
use crate::model::resource::{Record, ResourceObject};
use crate::model::search::IndexRequest;
use crate::response::{ResponseBody, ResponseBuilder, StatusReply};
use crate::store::Store;
use crate::tx::TransactionManager;
use log::{error, info};
use rusqlite::Connection;
use std::sync::Arc;
use std::time::Instant;

use super::handler::ResourceHandler;

/// Routes CRUD verbs for one resource endpoint.
///
/// Build through `DispatcherBuilder`, which resolves the hydrator up front.
pub struct ResourceDispatcher<H, R = StatusReply> {
    handler: H,
    hydrator: Arc<dyn Hydrator>,
    config: DispatchConfig,
    reply: R,
}

impl<H: ResourceHandler, R: ResponseBuilder> ResourceDispatcher<H, R> {
    pub(super) fn new(
        handler: H,
        hydrator: Arc<dyn Hydrator>,
        config: DispatchConfig,
        reply: R,
    ) -> Self {
        Self {
            handler,
            hydrator,
            config,
            reply,
        }
    }

    pub fn handler(&self) -> &H {
        &self.handler
    }

    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    /// Lists records through `store`. Opens no transaction.
    pub fn index<M, S>(
        &self,
        tx: &mut M,
        store: &S,
        request: &IndexRequest,
    ) -> DispatchResult<R::Response>
    where
        M: TransactionManager,
        S: Store + ?Sized,
    {
        let started_at = Instant::now();
        let result = tx.run_direct(self.connection_name(), |conn| {
            store.query(conn, &request.resource_type, &request.parameters)
        });
        log_outcome("index", &request.resource_type, started_at, &result);

        Ok(self.reply.content(ResponseBody::Collection(result?)))
    }

    /// Returns `record` as-is.
    pub fn read(&self, record: Record) -> R::Response {
        self.reply.content(ResponseBody::Record(record))
    }

    /// Hydrates a new record from `resource`.
    pub fn create<M: TransactionManager>(
        &self,
        tx: &mut M,
        resource: &ResourceObject,
    ) -> DispatchResult<R::Response> {
        let started_at = Instant::now();
        let result = self.transaction(tx, |conn| self.do_create(conn, resource));
        log_outcome("create", &resource.resource_type, started_at, &result);

        Ok(self.reply.created(ResponseBody::Record(result?)))
    }

    /// Hydrates `resource` onto the existing `record`.
    pub fn update<M: TransactionManager>(
        &self,
        tx: &mut M,
        resource: &ResourceObject,
        record: Record,
    ) -> DispatchResult<R::Response> {
        let started_at = Instant::now();
        let result = self.transaction(tx, |conn| self.do_update(conn, resource, record));
        log_outcome("update", &resource.resource_type, started_at, &result);

        Ok(self.reply.content(ResponseBody::Record(result?)))
    }

    /// Removes `record` through the handler.
    ///
    /// # Errors
    /// - Runtime error when the handler reports the record was not deleted.
    pub fn delete<M: TransactionManager>(
        &self,
        tx: &mut M,
        record: Record,
    ) -> DispatchResult<R::Response> {
        let started_at = Instant::now();
        let result = self.transaction(tx, |conn| self.do_delete(conn, &record));
        log_outcome("delete", &record.resource_type, started_at, &result);

        result?;
        Ok(self.reply.no_content())
    }

    fn do_create(&self, conn: &Connection, resource: &ResourceObject) -> DispatchResult<Record> {
        self.handler.creating(conn, resource)?;
        let record = self.hydrator.create(conn, resource)?;
        self.handler.created(conn, resource, &record)?;
        Ok(record)
    }

    fn do_update(
        &self,
        conn: &Connection,
        resource: &ResourceObject,
        record: Record,
    ) -> DispatchResult<Record> {
        self.handler.updating(conn, resource, &record)?;
        let record = self.hydrator.update(conn, resource, record)?;
        self.handler.updated(conn, resource, &record)?;
        Ok(record)
    }

    fn do_delete(&self, conn: &Connection, record: &Record) -> DispatchResult<()> {
        self.handler.deleting(conn, record)?;
        if !self.handler.destroy_record(conn, record)? {
            return Err(DispatchError::runtime(
                "record was not successfully deleted",
            ));
        }
        self.handler.deleted(conn, record)
    }

    fn transaction<M, T, F>(&self, tx: &mut M, work: F) -> DispatchResult<T>
    where
        M: TransactionManager,
        F: FnOnce(&Connection) -> DispatchResult<T>,
    {
        if self.config.use_transactions {
            tx.run_in_transaction(self.connection_name(), work)
        } else {
            tx.run_direct(self.connection_name(), work)
        }
    }

    fn connection_name(&self) -> Option<&str> {
        self.config.connection.as_deref()
    }
}

fn log_outcome<T>(
    verb: &str,
    resource_type: &str,
    started_at: Instant,
    result: &DispatchResult<T>,
) {
    let duration_ms = started_at.elapsed().as_millis();
    match result {
        Ok(_) => info!(
            "event=resource_{verb} module=dispatch status=ok resource_type={resource_type} duration_ms={duration_ms}"
        ),
        Err(err) => error!(
            "event=resource_{verb} module=dispatch status=error resource_type={resource_type} duration_ms={duration_ms} error_code={} error={err}",
            err.code()
        ),
    }
}
