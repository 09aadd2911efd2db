use std::sync::Arc;

use super::{dispatcher::Dispatcher, service::Service};
use crate::{
    config::Config,
    error::RuntimeError,
    executor::{ExecutorRef, HttpExecutor, Request},
    subscribers::{Subscribe, SubscriberSet},
};

/// Builder for constructing a [`Service`] with optional collaborators.
pub struct ServiceBuilder {
    cfg: Config,
    subscribers: Vec<Arc<dyn Subscribe>>,
    executor: Option<ExecutorRef>,
}

impl ServiceBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: Config) -> Self {
        Self {
            cfg,
            subscribers: Vec::new(),
            executor: None,
        }
    }

    /// Sets event subscribers for observability.
    ///
    /// Subscribers receive every runtime event inline and in order.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Appends one subscriber.
    pub fn with_subscriber(mut self, subscriber: Arc<dyn Subscribe>) -> Self {
        self.subscribers.push(subscriber);
        self
    }

    /// Replaces the network executor.
    ///
    /// Defaults to an [`HttpExecutor`] built in [`build`](Self::build).
    pub fn with_executor(mut self, executor: ExecutorRef) -> Self {
        self.executor = Some(executor);
        self
    }

    /// Validates the configuration and builds the service.
    ///
    /// Fails on invalid config or when the default HTTP client can't be built.
    pub fn build(self) -> Result<Service, RuntimeError> {
        self.cfg.validate()?;

        let executor = match self.executor {
            Some(ex) => ex,
            None => Arc::new(HttpExecutor::new()?),
        };
        let dispatcher = Arc::new(Dispatcher::new(
            executor,
            Request::from_config(&self.cfg),
            self.cfg.attempt_timeout,
            self.cfg.field.as_str(),
        ));
        let subs = Arc::new(SubscriberSet::new(self.subscribers));

        Ok(Service::new_internal(self.cfg, dispatcher, subs))
    }
}
