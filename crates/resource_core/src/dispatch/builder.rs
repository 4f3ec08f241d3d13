//! Dispatcher construction and one-time hydrator resolution.

use super::dispatcher::ResourceDispatcher;
use super::handler::ResourceHandler;
use crate::config::DispatchConfig;
use crate::error::{DispatchError, DispatchResult};
use crate::hydrator::Hydrator;
use crate::response::{ResponseBuilder, StatusReply};
use crate::service::ServiceContainer;
use log::{error, info};
use std::sync::Arc;

/// How a dispatcher obtains its hydrator.
#[derive(Clone, Default)]
pub enum HydratorBinding {
    #[default]
    Unset,
    /// Pre-bound hydrator instance.
    Instance(Arc<dyn Hydrator>),
    /// Service id resolved through a `ServiceContainer` at build time.
    Service(String),
}

impl HydratorBinding {
    /// Resolves the binding to a hydrator handle.
    ///
    /// # Errors
    /// - Runtime error when the binding is unset (or a blank service id).
    /// - Runtime error naming the service when it is missing or is not a
    ///   hydrator.
    pub fn resolve(&self, container: &ServiceContainer) -> DispatchResult<Arc<dyn Hydrator>> {
        match self {
            Self::Instance(hydrator) => Ok(Arc::clone(hydrator)),
            Self::Service(id) if !id.trim().is_empty() => container.resolve_hydrator(id),
            Self::Unset | Self::Service(_) => {
                Err(DispatchError::runtime("hydrator binding must be set"))
            }
        }
    }

    fn describe(&self) -> String {
        match self {
            Self::Unset => "unset".to_string(),
            Self::Instance(_) => "instance".to_string(),
            Self::Service(id) => format!("service:{}", id.trim()),
        }
    }
}

/// Collects dispatcher settings and resolves the hydrator once.
pub struct DispatcherBuilder<H, R = StatusReply> {
    handler: H,
    hydrator: HydratorBinding,
    config: DispatchConfig,
    reply: R,
}

impl<H> DispatcherBuilder<H> {
    pub fn new(handler: H) -> Self {
        Self {
            handler,
            hydrator: HydratorBinding::Unset,
            config: DispatchConfig::default(),
            reply: StatusReply,
        }
    }
}

impl<H: ResourceHandler, R: ResponseBuilder> DispatcherBuilder<H, R> {
    pub fn hydrator(mut self, binding: HydratorBinding) -> Self {
        self.hydrator = binding;
        self
    }

    pub fn hydrator_instance(self, hydrator: Arc<dyn Hydrator>) -> Self {
        self.hydrator(HydratorBinding::Instance(hydrator))
    }

    pub fn hydrator_service(self, id: impl Into<String>) -> Self {
        self.hydrator(HydratorBinding::Service(id.into()))
    }

    pub fn config(mut self, config: DispatchConfig) -> Self {
        self.config = config;
        self
    }

    pub fn use_transactions(mut self, enabled: bool) -> Self {
        self.config.use_transactions = enabled;
        self
    }

    pub fn connection(mut self, name: impl Into<String>) -> Self {
        self.config.connection = Some(name.into());
        self
    }

    /// Swaps the response builder.
    pub fn reply<R2: ResponseBuilder>(self, reply: R2) -> DispatcherBuilder<H, R2> {
        DispatcherBuilder {
            handler: self.handler,
            hydrator: self.hydrator,
            config: self.config,
            reply,
        }
    }

    /// Resolves the hydrator binding and returns a ready dispatcher.
    pub fn build(self, container: &ServiceContainer) -> DispatchResult<ResourceDispatcher<H, R>> {
        let binding = self.hydrator.describe();
        let hydrator = self.hydrator.resolve(container).map_err(|err| {
            error!(
                "event=dispatcher_build module=dispatch status=error hydrator={binding} error={err}"
            );
            err
        })?;

        info!(
            "event=dispatcher_build module=dispatch status=ok hydrator={binding} use_transactions={} connection={}",
            self.config.use_transactions,
            self.config.connection.as_deref().unwrap_or("default")
        );
        Ok(ResourceDispatcher::new(
            self.handler,
            hydrator,
            self.config,
            self.reply,
        ))
    }
}
