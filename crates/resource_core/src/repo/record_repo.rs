//! Record repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD over canonical `resources` storage.
//! - Keep attribute JSON encoding inside the persistence boundary.
//!
//! # Invariants
//! - Read paths reject invalid persisted state instead of masking it.
//! - Listing is always ordered by `updated_at DESC, id ASC`.

use crate::db::DbError;
use crate::model::resource::{Attributes, Record, RecordId, ResourceValidationError};
use crate::model::search::{normalize_page_limit, SearchParameters};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const RECORD_SELECT_SQL: &str = "SELECT
    id,
    resource_type,
    attributes,
    created_at,
    updated_at
FROM resources";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for record persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(ResourceValidationError),
    Db(DbError),
    NotFound(RecordId),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "record not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted record data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::NotFound(_) | Self::InvalidData(_) => None,
        }
    }
}

impl From<ResourceValidationError> for RepoError {
    fn from(value: ResourceValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface for record CRUD.
pub trait RecordRepository {
    fn insert_record(
        &self,
        id: RecordId,
        resource_type: &str,
        attributes: &Attributes,
    ) -> RepoResult<Record>;
    /// Replaces the full attribute set of one record.
    fn update_attributes(&self, id: RecordId, attributes: &Attributes) -> RepoResult<Record>;
    fn get_record(&self, id: RecordId) -> RepoResult<Option<Record>>;
    fn list_records(
        &self,
        resource_type: &str,
        parameters: &SearchParameters,
    ) -> RepoResult<Vec<Record>>;
    /// Hard-deletes one record. Returns whether a row was removed.
    fn delete_record(&self, id: RecordId) -> RepoResult<bool>;
}

/// SQLite-backed record repository.
///
/// Accepts a plain connection or a `Transaction` (via deref), so callers
/// decide the atomic scope.
pub struct SqliteRecordRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteRecordRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl RecordRepository for SqliteRecordRepository<'_> {
    fn insert_record(
        &self,
        id: RecordId,
        resource_type: &str,
        attributes: &Attributes,
    ) -> RepoResult<Record> {
        if resource_type.trim().is_empty() {
            return Err(ResourceValidationError::EmptyResourceType.into());
        }

        self.conn.execute(
            "INSERT INTO resources (id, resource_type, attributes) VALUES (?1, ?2, ?3);",
            params![
                id.to_string(),
                resource_type,
                encode_attributes(attributes)?
            ],
        )?;

        self.get_record(id)?.ok_or_else(|| {
            RepoError::InvalidData(format!("inserted record {id} not found in read-back"))
        })
    }

    fn update_attributes(&self, id: RecordId, attributes: &Attributes) -> RepoResult<Record> {
        let changed = self.conn.execute(
            "UPDATE resources
             SET
                attributes = ?1,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?2;",
            params![encode_attributes(attributes)?, id.to_string()],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        self.get_record(id)?.ok_or(RepoError::NotFound(id))
    }

    fn get_record(&self, id: RecordId) -> RepoResult<Option<Record>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{RECORD_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_record_row(row)?));
        }
        Ok(None)
    }

    fn list_records(
        &self,
        resource_type: &str,
        parameters: &SearchParameters,
    ) -> RepoResult<Vec<Record>> {
        let mut sql = format!("{RECORD_SELECT_SQL} WHERE resource_type = ?");
        let mut bind_values = vec![Value::Text(resource_type.to_string())];

        for (key, expected) in &parameters.filter {
            let path = Value::Text(format!("$.\"{key}\""));
            match filter_value(expected) {
                None => {
                    sql.push_str(" AND json_extract(attributes, ?) IS NULL");
                    bind_values.push(path);
                }
                Some(value) => {
                    sql.push_str(" AND json_extract(attributes, ?) = ?");
                    bind_values.push(path);
                    bind_values.push(value);
                }
            }
        }

        sql.push_str(" ORDER BY updated_at DESC, id ASC LIMIT ?");
        bind_values.push(Value::Integer(i64::from(normalize_page_limit(
            parameters.limit,
        ))));
        if parameters.offset > 0 {
            sql.push_str(" OFFSET ?");
            bind_values.push(Value::Integer(i64::from(parameters.offset)));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut records = Vec::new();
        while let Some(row) = rows.next()? {
            records.push(parse_record_row(row)?);
        }
        Ok(records)
    }

    fn delete_record(&self, id: RecordId) -> RepoResult<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM resources WHERE id = ?1;", [id.to_string()])?;
        Ok(changed > 0)
    }
}

/// Maps a JSON filter value onto the SQL value `json_extract` yields.
///
/// Returns `None` for JSON `null`, which must be matched with `IS NULL`.
fn filter_value(value: &serde_json::Value) -> Option<Value> {
    match value {
        serde_json::Value::Null => None,
        serde_json::Value::Bool(flag) => Some(Value::Integer(i64::from(*flag))),
        serde_json::Value::Number(number) => Some(match number.as_i64() {
            Some(integer) => Value::Integer(integer),
            None => Value::Real(number.as_f64().unwrap_or_default()),
        }),
        serde_json::Value::String(text) => Some(Value::Text(text.clone())),
        other => Some(Value::Text(other.to_string())),
    }
}

fn encode_attributes(attributes: &Attributes) -> RepoResult<String> {
    serde_json::to_string(attributes)
        .map_err(|err| RepoError::InvalidData(format!("attributes are not encodable: {err}")))
}

fn parse_record_row(row: &Row<'_>) -> RepoResult<Record> {
    let id_text: String = row.get("id")?;
    let id = Uuid::parse_str(&id_text).map_err(|_| {
        RepoError::InvalidData(format!("invalid uuid value `{id_text}` in resources.id"))
    })?;

    let attributes_text: String = row.get("attributes")?;
    let attributes: Attributes = serde_json::from_str(&attributes_text).map_err(|err| {
        RepoError::InvalidData(format!(
            "invalid attributes for record {id} in resources.attributes: {err}"
        ))
    })?;

    Ok(Record {
        id,
        resource_type: row.get("resource_type")?,
        attributes,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

#[cfg(test)]
mod tests {
    use super::filter_value;
    use rusqlite::types::Value;
    use serde_json::json;

    #[test]
    fn filter_value_maps_json_scalars_to_sql_values() {
        assert_eq!(filter_value(&json!(null)), None);
        assert_eq!(filter_value(&json!(true)), Some(Value::Integer(1)));
        assert_eq!(filter_value(&json!(42)), Some(Value::Integer(42)));
        assert_eq!(filter_value(&json!(1.5)), Some(Value::Real(1.5)));
        assert_eq!(
            filter_value(&json!("draft")),
            Some(Value::Text("draft".to_string()))
        );
    }
}
