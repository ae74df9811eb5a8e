use crate::metrics::MetricsSink;

use super::{endpoint::UpstreamEndpoint, errors::FailureReason, registry::EndpointRegistry};
use futures::future::join_all;
use std::{sync::Arc, time::Duration};
use tokio::{
    sync::broadcast,
    task::JoinHandle,
    time::{interval, MissedTickBehavior},
};
use tracing::{debug, info, warn};

pub const DEFAULT_CHECK_INTERVAL: Duration = Duration::from_secs(30);
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Probes every registered endpoint and writes the outcome into the registry.
///
/// Each probe runs on its own task and applies its outcome as soon as it completes, so a slow
/// endpoint never delays the verdict on the others.
#[derive(Clone)]
pub struct HealthMonitor {
    registry: Arc<EndpointRegistry>,
    metrics: Arc<dyn MetricsSink>,
    check_interval: Duration,
    probe_timeout: Duration,
}

/// Handle on the probes spawned by one [`HealthMonitor::check_all`] sweep.
///
/// Dropping it detaches the probes; they still run to completion and update the registry.
#[must_use = "dropping the handle detaches the sweep; call `wait` to synchronise"]
pub struct SweepHandle {
    probes: Vec<JoinHandle<()>>,
}

impl SweepHandle {
    /// Number of probes dispatched by the sweep.
    #[must_use]
    pub fn len(&self) -> usize {
        self.probes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.probes.is_empty()
    }

    /// Waits until every probe of the sweep has applied its outcome.
    pub async fn wait(self) {
        for result in join_all(self.probes).await {
            if let Err(e) = result {
                warn!(error = %e, "health probe task failed");
            }
        }
    }
}

impl HealthMonitor {
    #[must_use]
    pub fn new(registry: Arc<EndpointRegistry>, metrics: Arc<dyn MetricsSink>) -> Self {
        Self {
            registry,
            metrics,
            check_interval: DEFAULT_CHECK_INTERVAL,
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
        }
    }

    #[must_use]
    pub fn with_check_interval(mut self, check_interval: Duration) -> Self {
        self.check_interval = check_interval;
        self
    }

    #[must_use]
    pub fn with_probe_timeout(mut self, probe_timeout: Duration) -> Self {
        self.probe_timeout = probe_timeout;
        self
    }

    /// Starts one probe per registered endpoint and returns without waiting for them.
    pub fn check_all(&self) -> SweepHandle {
        let probes = self
            .registry
            .list_all()
            .into_iter()
            .map(|status| {
                let monitor = self.clone();
                tokio::spawn(async move {
                    monitor.probe_and_update(&status.endpoint).await;
                })
            })
            .collect();

        SweepHandle { probes }
    }

    /// Probes one endpoint by name and applies the outcome.
    ///
    /// Returns `None` for an unknown name, otherwise the new availability.
    pub async fn check_endpoint(&self, name: &str) -> Option<bool> {
        let status = self.registry.list_all().into_iter().find(|s| s.endpoint.name() == name)?;
        Some(self.probe_and_update(&status.endpoint).await)
    }

    async fn probe_and_update(&self, endpoint: &UpstreamEndpoint) -> bool {
        let name = endpoint.name();
        let healthy = match endpoint.probe(self.probe_timeout).await {
            Ok(()) => {
                debug!(endpoint = %name, "health probe succeeded");
                true
            }
            Err(e) => {
                if e.is_transport() {
                    self.metrics.record_failure(name, FailureReason::HealthCheck);
                }
                warn!(endpoint = %name, error = %e, "health probe failed");
                false
            }
        };

        self.registry.set_availability(name, healthy);
        healthy
    }

    /// Runs a sweep immediately and then every `check_interval` until `shutdown_rx` fires.
    #[must_use]
    pub fn start_with_shutdown(
        &self,
        mut shutdown_rx: broadcast::Receiver<()>,
    ) -> JoinHandle<()> {
        let monitor = self.clone();

        tokio::spawn(async move {
            let mut interval = interval(monitor.check_interval);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        let sweep = monitor.check_all();
                        debug!(probes = sweep.len(), "health sweep dispatched");
                    }
                    _ = shutdown_rx.recv() => {
                        info!("health monitor shutting down");
                        break;
                    }
                }
            }
        })
    }
}
