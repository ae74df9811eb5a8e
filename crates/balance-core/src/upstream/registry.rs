use parking_lot::RwLock;
use std::{collections::HashMap, sync::Arc};
use thiserror::Error;

use crate::{metrics::MetricsSink, types::EndpointConfig, upstream::http_client::HttpClient};

use super::endpoint::UpstreamEndpoint;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("at least one endpoint must be configured")]
    Empty,
    #[error("duplicate endpoint name: {0}")]
    DuplicateName(String),
}

/// Snapshot of one endpoint and its availability flag at the time of the read.
#[derive(Debug, Clone)]
pub struct EndpointStatus {
    pub endpoint: Arc<UpstreamEndpoint>,
    pub available: bool,
}

/// The configured set of endpoints plus one availability flag per endpoint.
///
/// The endpoint sequence is fixed at construction and keeps configuration order, which seeds
/// the consensus tie-break. Flags are the only mutable state and are only reachable through
/// the accessors below, all of which copy out under a read lock.
pub struct EndpointRegistry {
    endpoints: Vec<Arc<UpstreamEndpoint>>,
    index: HashMap<Arc<str>, usize>,
    available: RwLock<Vec<bool>>,
    metrics: Arc<dyn MetricsSink>,
}

impl EndpointRegistry {
    /// Builds the registry with every endpoint available and publishes the initial gauges.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError`] if `configs` is empty or contains a duplicate name.
    pub fn new(
        configs: Vec<EndpointConfig>,
        http_client: Arc<HttpClient>,
        metrics: Arc<dyn MetricsSink>,
    ) -> Result<Self, RegistryError> {
        if configs.is_empty() {
            return Err(RegistryError::Empty);
        }

        let mut index = HashMap::with_capacity(configs.len());
        let mut endpoints = Vec::with_capacity(configs.len());
        for (position, config) in configs.into_iter().enumerate() {
            if index.insert(Arc::clone(&config.name), position).is_some() {
                return Err(RegistryError::DuplicateName(config.name.to_string()));
            }
            endpoints.push(Arc::new(UpstreamEndpoint::new(config, Arc::clone(&http_client))));
        }

        for endpoint in &endpoints {
            metrics.set_availability_gauge(endpoint.name(), true);
        }

        let available = RwLock::new(vec![true; endpoints.len()]);
        Ok(Self { endpoints, index, available, metrics })
    }

    /// Every endpoint with its current flag, in configuration order.
    #[must_use]
    pub fn list_all(&self) -> Vec<EndpointStatus> {
        let flags = self.available.read();
        self.endpoints
            .iter()
            .zip(flags.iter())
            .map(|(endpoint, &available)| EndpointStatus {
                endpoint: Arc::clone(endpoint),
                available,
            })
            .collect()
    }

    /// Endpoints currently flagged available, in configuration order.
    #[must_use]
    pub fn list_available(&self) -> Vec<Arc<UpstreamEndpoint>> {
        let flags = self.available.read();
        self.endpoints
            .iter()
            .zip(flags.iter())
            .filter(|(_, &available)| available)
            .map(|(endpoint, _)| Arc::clone(endpoint))
            .collect()
    }

    #[must_use]
    pub fn has_available(&self) -> bool {
        self.available.read().iter().any(|&available| available)
    }

    #[must_use]
    pub fn is_available(&self, name: &str) -> Option<bool> {
        let position = *self.index.get(name)?;
        Some(self.available.read()[position])
    }

    /// Sets the availability flag of `name`. Unknown names change nothing.
    ///
    /// The gauge is published while the write guard is held, so concurrent writers to the same
    /// endpoint publish in the same order they write the flag.
    pub fn set_availability(&self, name: &str, available: bool) {
        let Some(&position) = self.index.get(name) else {
            tracing::debug!(endpoint = %name, "ignoring availability update for unknown endpoint");
            return;
        };

        let previous = {
            let mut flags = self.available.write();
            let previous = std::mem::replace(&mut flags[position], available);
            self.metrics.set_availability_gauge(name, available);
            previous
        };

        if previous != available {
            tracing::info!(endpoint = %name, available, "endpoint availability changed");
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    /// Always `false`: construction rejects an empty endpoint list.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }
}
