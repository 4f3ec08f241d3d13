//! Service container used to resolve hydrators by identifier.
//!
//! Resolution runs once, when a dispatcher is built; the dispatcher keeps the
//! resolved handle afterwards.

use crate::error::{DispatchError, DispatchResult};
use crate::hydrator::Hydrator;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

/// Capability surface of a registered service.
///
/// Services opt into capabilities by overriding the matching accessor.
pub trait ContainerService {
    fn as_hydrator(self: Arc<Self>) -> Option<Arc<dyn Hydrator>> {
        None
    }
}

/// Registration errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceContainerError {
    InvalidServiceId(String),
    DuplicateServiceId(String),
}

impl Display for ServiceContainerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidServiceId(value) => write!(f, "service id is invalid: `{value}`"),
            Self::DuplicateServiceId(value) => {
                write!(f, "service id already registered: `{value}`")
            }
        }
    }
}

impl Error for ServiceContainerError {}

/// In-process service registry.
#[derive(Default)]
pub struct ServiceContainer {
    services: BTreeMap<String, Arc<dyn ContainerService>>,
}

impl ServiceContainer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers one service under a trimmed id.
    pub fn register(
        &mut self,
        id: &str,
        service: Arc<dyn ContainerService>,
    ) -> Result<(), ServiceContainerError> {
        let id = id.trim().to_string();
        if !is_valid_service_id(&id) {
            return Err(ServiceContainerError::InvalidServiceId(id));
        }
        if self.services.contains_key(&id) {
            return Err(ServiceContainerError::DuplicateServiceId(id));
        }
        self.services.insert(id, service);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<Arc<dyn ContainerService>> {
        self.services.get(id.trim()).cloned()
    }

    /// Resolves `id` to a hydrator.
    ///
    /// # Errors
    /// - Runtime error when `id` is not registered.
    /// - Runtime error when the service lacks the hydrator capability.
    pub fn resolve_hydrator(&self, id: &str) -> DispatchResult<Arc<dyn Hydrator>> {
        let id = id.trim();
        let service = self
            .get(id)
            .ok_or_else(|| DispatchError::runtime(format!("service `{id}` is not registered")))?;
        service
            .as_hydrator()
            .ok_or_else(|| DispatchError::runtime(format!("service `{id}` is not a hydrator")))
    }
}

fn is_valid_service_id(value: &str) -> bool {
    !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | ':'))
}

#[cfg(test)]
mod tests {
    use super::{ContainerService, ServiceContainer, ServiceContainerError};
    use crate::hydrator::SqliteHydrator;
    use std::sync::Arc;

    struct Mailer;

    impl ContainerService for Mailer {}

    #[test]
    fn register_rejects_invalid_and_duplicate_ids() {
        let mut container = ServiceContainer::new();
        let err = container
            .register("  ", Arc::new(Mailer))
            .expect_err("blank id must fail");
        assert_eq!(err, ServiceContainerError::InvalidServiceId(String::new()));

        container
            .register("mailer", Arc::new(Mailer))
            .expect("first registration");
        let err = container
            .register(" mailer ", Arc::new(Mailer))
            .expect_err("duplicate id must fail");
        assert_eq!(
            err,
            ServiceContainerError::DuplicateServiceId("mailer".to_string())
        );
        assert_eq!(container.len(), 1);
    }

    #[test]
    fn resolves_registered_hydrator() {
        let mut container = ServiceContainer::new();
        container
            .register("hydrators.posts", Arc::new(SqliteHydrator::new("posts")))
            .expect("register hydrator");
        assert!(container.resolve_hydrator("hydrators.posts").is_ok());
    }

    #[test]
    fn non_hydrator_service_error_names_the_service() {
        let mut container = ServiceContainer::new();
        container
            .register("mailer", Arc::new(Mailer))
            .expect("register mailer");
        let err = container
            .resolve_hydrator("mailer")
            .err()
            .expect("mailer is not a hydrator");
        assert!(err.to_string().contains("mailer"));
    }
}
