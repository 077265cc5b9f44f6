//! The liveness engine: fetch one snapshot, classify it, never fail.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::time::Instant;
use tracing::{info, warn};

use oceanwatch_adapters::amqp::AmqpProber;
use oceanwatch_adapters::rabbitmq::RabbitMqManagement;
use oceanwatch_adapters::{AdapterError, ManagementApi, ProbeConnector};
use oceanwatch_types::LivenessResult;

use crate::classify::Classifier;
use crate::config::Settings;
use crate::duration::format_duration;
use crate::fetch::{Degraded, Fetched, Fetcher};

/// A liveness result together with the reasons any tier was skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inference {
    pub result: LivenessResult,
    /// Why the management tier was abandoned, if it was.
    pub management_error: Option<AdapterError>,
    /// Why the probe tier failed, if it ran and failed.
    pub probe_error: Option<AdapterError>,
}

impl Inference {
    /// Returns true if any tier failed on the way to this result.
    pub fn fell_back(&self) -> bool {
        self.management_error.is_some()
    }
}

/// Infers which sensor units and aggregators are alive.
///
/// Each run is independent; the engine holds only configuration and
/// transport handles, so it can be shared between callers.
#[derive(Debug)]
pub struct LivenessEngine {
    fetcher: Fetcher,
    classifier: Classifier,
}

impl LivenessEngine {
    pub fn new(fetcher: Fetcher, classifier: Classifier) -> Self {
        Self {
            fetcher,
            classifier,
        }
    }

    /// Build an engine talking to a real broker.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let mut management = RabbitMqManagement::builder()
            .endpoint(&settings.management.url)
            .credentials(&settings.broker.username, &settings.broker.password)
            .timeout(settings.management.request_timeout);
        if let Some(vhost) = &settings.management.vhost {
            management = management.vhost(vhost);
        }
        let management: Arc<dyn ManagementApi> = Arc::new(
            management
                .build()
                .context("Failed to build management API client")?,
        );
        let prober: Arc<dyn ProbeConnector> = Arc::new(AmqpProber::new(settings.amqp_uri()));

        let fetcher = Fetcher::new(management, prober)
            .with_candidates(&settings.probe.candidates())
            .with_management_timeout(settings.management.request_timeout)
            .with_probe_budget(settings.probe.budget);

        Ok(Self::new(fetcher, Classifier::new(settings.fleet)))
    }

    /// Run one inference, keeping the reasons for any fallback.
    pub async fn infer(&self, deadline: Instant) -> Inference {
        let started = Instant::now();

        let inference = match self.fetcher.fetch(deadline).await {
            Ok(Fetched {
                snapshot,
                fallback_reason,
            }) => Inference {
                result: self.classifier.classify(&snapshot),
                management_error: fallback_reason,
                probe_error: None,
            },
            Err(Degraded { management, probe }) => {
                warn!(
                    management_error = %management,
                    probe_error = %probe,
                    "Broker unreachable, reporting no active components"
                );
                Inference {
                    result: LivenessResult::unavailable(),
                    management_error: Some(management),
                    probe_error: Some(probe),
                }
            }
        };

        let result = &inference.result;
        info!(
            tier = result.tier.label(),
            sensor_units = result.sensor_unit_count(),
            aggregators = result.aggregator_count(),
            elapsed = %format_duration(started.elapsed()),
            "Liveness inferred"
        );
        inference
    }

    /// Classify liveness, giving up at `deadline`. Never fails: an
    /// unreachable broker yields an empty, unavailable result.
    pub async fn classify_liveness(&self, deadline: Instant) -> LivenessResult {
        self.infer(deadline).await.result
    }

    /// Classify liveness within `timeout` from now.
    pub async fn classify_liveness_within(&self, timeout: Duration) -> LivenessResult {
        self.classify_liveness(Instant::now() + timeout).await
    }
}
