//! Write-path collaborator mapping resource payloads onto records.
//!
//! # Invariants
//! - `SqliteHydrator` only accepts payloads of its bound resource type.
//! - Updates merge payload attributes over stored ones; a JSON `null`
//!   removes the attribute.

use crate::error::DispatchResult;
use crate::model::resource::{Record, ResourceObject, ResourceValidationError};
use crate::repo::record_repo::{RecordRepository, SqliteRecordRepository};
use crate::service::ContainerService;
use rusqlite::Connection;
use std::sync::Arc;
use uuid::Uuid;

/// Persists create/update payloads.
pub trait Hydrator {
    fn create(&self, conn: &Connection, resource: &ResourceObject) -> DispatchResult<Record>;
    fn update(
        &self,
        conn: &Connection,
        resource: &ResourceObject,
        record: Record,
    ) -> DispatchResult<Record>;
}

/// Hydrator bound to one resource type over the `resources` table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqliteHydrator {
    resource_type: String,
}

impl SqliteHydrator {
    pub fn new(resource_type: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
        }
    }

    pub fn resource_type(&self) -> &str {
        &self.resource_type
    }

    fn ensure_type(&self, actual: &str) -> Result<(), ResourceValidationError> {
        if actual != self.resource_type {
            return Err(ResourceValidationError::TypeMismatch {
                expected: self.resource_type.clone(),
                actual: actual.to_string(),
            });
        }
        Ok(())
    }
}

impl Hydrator for SqliteHydrator {
    fn create(&self, conn: &Connection, resource: &ResourceObject) -> DispatchResult<Record> {
        resource.validate()?;
        self.ensure_type(&resource.resource_type)?;

        let id = resource.parsed_id()?.unwrap_or_else(Uuid::new_v4);
        let record = SqliteRecordRepository::new(conn).insert_record(
            id,
            &self.resource_type,
            &resource.attributes,
        )?;
        Ok(record)
    }

    fn update(
        &self,
        conn: &Connection,
        resource: &ResourceObject,
        record: Record,
    ) -> DispatchResult<Record> {
        resource.validate()?;
        self.ensure_type(&resource.resource_type)?;
        self.ensure_type(&record.resource_type)?;
        if let Some(payload_id) = resource.parsed_id()? {
            if payload_id != record.id {
                return Err(ResourceValidationError::IdMismatch {
                    record: record.id,
                    payload: payload_id.to_string(),
                }
                .into());
            }
        }

        let mut attributes = record.attributes;
        for (key, value) in &resource.attributes {
            if value.is_null() {
                attributes.remove(key);
            } else {
                attributes.insert(key.clone(), value.clone());
            }
        }

        let updated = SqliteRecordRepository::new(conn).update_attributes(record.id, &attributes)?;
        Ok(updated)
    }
}

impl ContainerService for SqliteHydrator {
    fn as_hydrator(self: Arc<Self>) -> Option<Arc<dyn Hydrator>> {
        Some(self)
    }
}
