//! Introspection fetcher: produces one snapshot per inference run.
//!
//! The management API is tried first. If its queue listing cannot be read
//! the fetcher falls back to a passive AMQP sweep of well-known RPC queue
//! names. Each tier boundary returns an explicit error so callers can see why
//! a fallback happened.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::{timeout_at, Instant};
use tracing::{debug, info, warn};

use oceanwatch_adapters::probe::{self, CandidateSpace};
use oceanwatch_adapters::{AdapterError, ManagementApi, ProbeConnector};
use oceanwatch_types::{Coverage, Snapshot};

/// Default bound on the whole fallback sweep.
pub const DEFAULT_PROBE_BUDGET: Duration = Duration::from_secs(10);

/// Upper bound on the management tier, so a hanging endpoint leaves time
/// for the fallback.
pub const MAX_MANAGEMENT_TIMEOUT: Duration = Duration::from_secs(5);

/// A snapshot and, if the probe tier produced it, why the management tier
/// was abandoned.
#[derive(Debug, Clone)]
pub struct Fetched {
    pub snapshot: Snapshot,
    pub fallback_reason: Option<AdapterError>,
}

/// Both tiers failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Degraded {
    pub management: AdapterError,
    pub probe: AdapterError,
}

impl std::fmt::Display for Degraded {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "management API: {}; direct probe: {}",
            self.management, self.probe
        )
    }
}

impl std::error::Error for Degraded {}

/// Fetches broker metadata through the management tier, then the probe tier.
pub struct Fetcher {
    management: Arc<dyn ManagementApi>,
    prober: Arc<dyn ProbeConnector>,
    candidates: Vec<String>,
    management_timeout: Duration,
    probe_budget: Duration,
}

impl Fetcher {
    pub fn new(management: Arc<dyn ManagementApi>, prober: Arc<dyn ProbeConnector>) -> Self {
        Self {
            management,
            prober,
            candidates: CandidateSpace::default().queue_names(),
            management_timeout: MAX_MANAGEMENT_TIMEOUT,
            probe_budget: DEFAULT_PROBE_BUDGET,
        }
    }

    /// Set the queue names probed on fallback.
    pub fn with_candidates(mut self, space: &CandidateSpace) -> Self {
        self.candidates = space.queue_names();
        self
    }

    /// Set the bound on the management tier, at most [`MAX_MANAGEMENT_TIMEOUT`].
    pub fn with_management_timeout(mut self, timeout: Duration) -> Self {
        self.management_timeout = timeout.min(MAX_MANAGEMENT_TIMEOUT);
        self
    }

    /// Set the bound on the whole fallback sweep.
    pub fn with_probe_budget(mut self, budget: Duration) -> Self {
        self.probe_budget = budget;
        self
    }

    /// Fetch one snapshot, giving up at `deadline`.
    pub async fn fetch(&self, deadline: Instant) -> Result<Fetched, Degraded> {
        let management_deadline = deadline.min(Instant::now() + self.management_timeout);
        let management = match self.fetch_management(management_deadline).await {
            Ok(snapshot) => {
                return Ok(Fetched {
                    snapshot,
                    fallback_reason: None,
                })
            }
            Err(e) => e,
        };
        if management.is_unreachable() {
            info!(error = %management, "Management API unreachable, probing broker directly");
        } else {
            warn!(error = %management, "Management API answered badly, probing broker directly");
        }

        match self.fetch_probed(deadline).await {
            Ok(snapshot) => Ok(Fetched {
                snapshot,
                fallback_reason: Some(management),
            }),
            Err(probe) => {
                warn!(error = %probe, "Direct broker probe failed");
                Err(Degraded { management, probe })
            }
        }
    }

    /// Issue the four listings concurrently, each bounded by `until`. Only
    /// the queue listing is required; losing any of the others reduces
    /// coverage.
    async fn fetch_management(&self, until: Instant) -> Result<Snapshot, AdapterError> {
        let api = self.management.as_ref();
        let (queues, consumers, channels, connections) = tokio::join!(
            bounded(until, api.queues()),
            bounded(until, api.consumers()),
            bounded(until, api.channels()),
            bounded(until, api.connections())
        );
        let queues = queues?;

        let snapshot = match (consumers, channels, connections) {
            (Ok(consumers), Ok(channels), Ok(connections)) => Snapshot {
                consumers,
                channels,
                connections,
                ..Snapshot::builder().build()
            },
            (consumers, channels, connections) => {
                let first_error = [consumers.err(), channels.err(), connections.err()]
                    .into_iter()
                    .flatten()
                    .next();
                if let Some(e) = first_error {
                    warn!(error = %e, "Partial management metadata, using queues only");
                }
                Snapshot::builder().coverage(Coverage::QueuesOnly).build()
            }
        };

        debug!(
            queues = queues.len(),
            consumers = snapshot.consumers.len(),
            channels = snapshot.channels.len(),
            connections = snapshot.connections.len(),
            coverage = ?snapshot.coverage,
            "Fetched management snapshot"
        );
        Ok(Snapshot { queues, ..snapshot })
    }

    async fn fetch_probed(&self, deadline: Instant) -> Result<Snapshot, AdapterError> {
        // Leave room to close the session before the deadline.
        let remaining = deadline
            .saturating_duration_since(Instant::now())
            .saturating_sub(probe::CLOSE_GRACE);
        let budget = self.probe_budget.min(remaining);
        if budget.is_zero() {
            return Err(AdapterError::Timeout);
        }

        let found = probe::sweep(self.prober.as_ref(), &self.candidates, budget).await?;
        Ok(Snapshot::probed(found))
    }
}

async fn bounded<T>(
    until: Instant,
    listing: impl std::future::Future<Output = Result<T, AdapterError>>,
) -> Result<T, AdapterError> {
    timeout_at(until, listing).await?
}

impl std::fmt::Debug for Fetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Fetcher")
            .field("candidates", &self.candidates.len())
            .field("management_timeout", &self.management_timeout)
            .field("probe_budget", &self.probe_budget)
            .finish()
    }
}
