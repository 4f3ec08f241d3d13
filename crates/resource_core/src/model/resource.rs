//! Resource payload and domain record.
//!
//! # Invariants
//! - `resource_type` is never blank.
//! - A client-generated payload id must parse as a UUID.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for persisted records.
pub type RecordId = Uuid;

/// Attribute bag shared by payloads and records.
pub type Attributes = BTreeMap<String, serde_json::Value>;

/// Parsed body of an incoming create/update request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceObject {
    /// Serialized as `type` to match resource document naming.
    #[serde(rename = "type")]
    pub resource_type: String,
    /// Client-generated id on create, or the target id on update.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub attributes: Attributes,
}

impl ResourceObject {
    /// Creates a payload without a client-generated id.
    pub fn new(resource_type: impl Into<String>, attributes: Attributes) -> Self {
        Self {
            resource_type: resource_type.into(),
            id: None,
            attributes,
        }
    }

    /// Sets the payload id.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Validates shape invariants before a hydrator sees the payload.
    pub fn validate(&self) -> Result<(), ResourceValidationError> {
        if self.resource_type.trim().is_empty() {
            return Err(ResourceValidationError::EmptyResourceType);
        }
        self.parsed_id()?;
        Ok(())
    }

    /// Returns the payload id as a UUID, if one was supplied.
    pub fn parsed_id(&self) -> Result<Option<RecordId>, ResourceValidationError> {
        match self.id.as_deref() {
            None => Ok(None),
            Some(raw) => Uuid::parse_str(raw.trim())
                .map(Some)
                .map_err(|_| ResourceValidationError::InvalidId(raw.to_string())),
        }
    }
}

/// Persisted entity handed back by hydrators and stores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: RecordId,
    #[serde(rename = "type")]
    pub resource_type: String,
    pub attributes: Attributes,
    /// Epoch milliseconds.
    pub created_at: i64,
    /// Epoch milliseconds.
    pub updated_at: i64,
}

/// Payload validation failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceValidationError {
    EmptyResourceType,
    InvalidId(String),
    /// Payload type differs from the type the hydrator/record expects.
    TypeMismatch { expected: String, actual: String },
    /// Update payload id differs from the target record id.
    IdMismatch { record: RecordId, payload: String },
}

impl Display for ResourceValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyResourceType => write!(f, "resource type must not be blank"),
            Self::InvalidId(value) => write!(f, "resource id is not a valid uuid: `{value}`"),
            Self::TypeMismatch { expected, actual } => write!(
                f,
                "resource type `{actual}` does not match expected type `{expected}`"
            ),
            Self::IdMismatch { record, payload } => write!(
                f,
                "resource id `{payload}` does not match record id `{record}`"
            ),
        }
    }
}

impl Error for ResourceValidationError {}

#[cfg(test)]
mod tests {
    use super::{Attributes, ResourceObject, ResourceValidationError};
    use serde_json::json;

    #[test]
    fn validate_rejects_blank_type() {
        let payload = ResourceObject::new("  ", Attributes::new());
        assert_eq!(
            payload.validate(),
            Err(ResourceValidationError::EmptyResourceType)
        );
    }

    #[test]
    fn validate_rejects_non_uuid_id() {
        let payload = ResourceObject::new("posts", Attributes::new()).with_id("post-1");
        assert_eq!(
            payload.validate(),
            Err(ResourceValidationError::InvalidId("post-1".to_string()))
        );
    }

    #[test]
    fn deserializes_type_field_and_defaults_attributes() {
        let payload: ResourceObject =
            serde_json::from_value(json!({ "type": "posts" })).expect("payload should parse");
        assert_eq!(payload.resource_type, "posts");
        assert!(payload.id.is_none());
        assert!(payload.attributes.is_empty());
    }
}
