//! Passive probing of well-known queue names.
//!
//! When the management API is out of reach, liveness can still be estimated
//! by asking the broker directly whether specific RPC queues exist. The
//! candidate space is small and fixed: `rpc_queue_{token}{NN}` for each
//! component token and each two-digit suffix.
//!
//! The sweep is sequential over one session and bounded by a budget covering
//! connect and all probes. The session is closed on every exit path.

use std::time::Duration;

use tokio::time::{timeout, Instant};
use tracing::{debug, warn};

use oceanwatch_types::QueueDescriptor;

use crate::{AdapterError, ProbeConnector};

/// Prefix shared by every probed queue name.
pub const RPC_QUEUE_PREFIX: &str = "rpc_queue_";

/// Component tokens probed by default, in probe order.
pub const DEFAULT_TOKENS: [&str; 4] = ["Wavy", "Aggregator", "wavy", "aggregator"];

/// Highest numeric suffix probed by default (suffixes run from 01).
pub const DEFAULT_MAX_SUFFIX: u8 = 9;

/// Upper bound on how long closing a session may take.
pub const CLOSE_GRACE: Duration = Duration::from_millis(500);

/// The set of queue names a sweep checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateSpace {
    tokens: Vec<String>,
    max_suffix: u8,
}

impl CandidateSpace {
    /// Create a candidate space from tokens and a maximum suffix.
    pub fn new<I, S>(tokens: I, max_suffix: u8) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tokens: tokens.into_iter().map(Into::into).collect(),
            max_suffix,
        }
    }

    /// Queue names in probe order: suffix-major, then token order.
    pub fn queue_names(&self) -> Vec<String> {
        (1..=self.max_suffix)
            .flat_map(|n| {
                self.tokens
                    .iter()
                    .map(move |token| format!("{}{}{:02}", RPC_QUEUE_PREFIX, token, n))
            })
            .collect()
    }

    /// Number of candidates.
    pub fn len(&self) -> usize {
        self.tokens.len() * self.max_suffix as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for CandidateSpace {
    fn default() -> Self {
        Self::new(DEFAULT_TOKENS, DEFAULT_MAX_SUFFIX)
    }
}

/// Passively check every candidate queue within `budget`.
///
/// Returns the queues that exist, with their message counts. A failure to
/// open the session is an error; a failure on an individual candidate is
/// logged and treated as "not present". When the budget runs out mid-sweep
/// the queues found so far are returned.
pub async fn sweep(
    connector: &dyn ProbeConnector,
    candidates: &[String],
    budget: Duration,
) -> Result<Vec<QueueDescriptor>, AdapterError> {
    let started = Instant::now();
    let mut session = timeout(budget, connector.open()).await??;

    let remaining = budget.saturating_sub(started.elapsed());
    let mut found = Vec::new();
    let mut failures = 0usize;

    let completed = timeout(remaining, async {
        for queue in candidates {
            match session.declare_passive(queue).await {
                Ok(Some(messages)) => {
                    debug!(queue = %queue, messages, "Probed queue exists");
                    found.push(QueueDescriptor::new(queue.clone(), 0).with_messages(messages));
                }
                Ok(None) => {}
                Err(e) => {
                    failures += 1;
                    debug!(queue = %queue, error = %e, "Probe failed, treating queue as absent");
                }
            }
        }
    })
    .await
    .is_ok();

    if timeout(CLOSE_GRACE, session.close()).await.is_err() {
        warn!("Timed out closing probe session");
    }

    if !completed {
        warn!(
            found = found.len(),
            "Probe budget of {:?} exhausted before sweep finished", budget
        );
    }
    debug!(
        candidates = candidates.len(),
        found = found.len(),
        failures,
        "Probe sweep finished"
    );

    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ProbeSession;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Arc;

    #[derive(Clone, Copy)]
    enum Answer {
        Exists(u64),
        Fails,
        Hangs,
    }

    #[derive(Default)]
    struct FakeBroker {
        answers: HashMap<String, Answer>,
        refuse: bool,
        closed: Arc<AtomicBool>,
        probes: Arc<AtomicUsize>,
    }

    struct FakeSession {
        answers: HashMap<String, Answer>,
        closed: Arc<AtomicBool>,
        probes: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl ProbeConnector for FakeBroker {
        async fn open(&self) -> Result<Box<dyn ProbeSession>, AdapterError> {
            if self.refuse {
                return Err(AdapterError::Connection("connection refused".into()));
            }
            Ok(Box::new(FakeSession {
                answers: self.answers.clone(),
                closed: self.closed.clone(),
                probes: self.probes.clone(),
            }))
        }
    }

    #[async_trait]
    impl ProbeSession for FakeSession {
        async fn declare_passive(&mut self, queue: &str) -> Result<Option<u64>, AdapterError> {
            self.probes.fetch_add(1, Ordering::SeqCst);
            match self.answers.get(queue) {
                Some(Answer::Exists(n)) => Ok(Some(*n)),
                Some(Answer::Fails) => Err(AdapterError::Probe("channel error".into())),
                Some(Answer::Hangs) => std::future::pending().await,
                None => Ok(None),
            }
        }

        async fn close(self: Box<Self>) {
            self.closed.store(true, Ordering::SeqCst);
        }
    }

    fn broker(answers: &[(&str, Answer)]) -> FakeBroker {
        FakeBroker {
            answers: answers
                .iter()
                .map(|(name, a)| (name.to_string(), *a))
                .collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_default_candidate_space() {
        let space = CandidateSpace::default();
        let names = space.queue_names();

        assert_eq!(space.len(), 36);
        assert_eq!(names.len(), 36);
        assert_eq!(names[0], "rpc_queue_Wavy01");
        assert_eq!(names[1], "rpc_queue_Aggregator01");
        assert_eq!(names[3], "rpc_queue_aggregator01");
        assert_eq!(names[4], "rpc_queue_Wavy02");
        assert_eq!(names[35], "rpc_queue_aggregator09");
    }

    #[test]
    fn test_empty_candidate_space() {
        let space = CandidateSpace::new(Vec::<String>::new(), 9);
        assert!(space.is_empty());
        assert!(space.queue_names().is_empty());
    }

    #[tokio::test]
    async fn test_sweep_collects_existing_queues() {
        let fake = broker(&[
            ("rpc_queue_wavy01", Answer::Exists(4)),
            ("rpc_queue_Aggregator02", Answer::Exists(0)),
        ]);
        let names = CandidateSpace::default().queue_names();

        let found = sweep(&fake, &names, Duration::from_secs(5)).await.unwrap();

        let found_names: Vec<_> = found.iter().map(|q| q.name.as_str()).collect();
        assert_eq!(found_names, vec!["rpc_queue_wavy01", "rpc_queue_Aggregator02"]);
        assert_eq!(found[0].messages, Some(4));
        assert!(fake.closed.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_sweep_skips_failing_candidates() {
        let fake = broker(&[
            ("rpc_queue_Wavy01", Answer::Fails),
            ("rpc_queue_wavy03", Answer::Exists(1)),
        ]);
        let names = CandidateSpace::default().queue_names();

        let found = sweep(&fake, &names, Duration::from_secs(5)).await.unwrap();

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "rpc_queue_wavy03");
        assert_eq!(fake.probes.load(Ordering::SeqCst), names.len());
    }

    #[tokio::test]
    async fn test_sweep_open_failure_is_an_error() {
        let fake = FakeBroker {
            refuse: true,
            ..Default::default()
        };

        let result = sweep(&fake, &["rpc_queue_Wavy01".to_string()], Duration::from_secs(1)).await;
        assert!(matches!(result, Err(AdapterError::Connection(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweep_budget_bounds_a_hanging_probe() {
        let fake = broker(&[
            ("rpc_queue_Wavy01", Answer::Exists(2)),
            ("rpc_queue_Aggregator01", Answer::Hangs),
        ]);
        let names = CandidateSpace::default().queue_names();
        let started = Instant::now();

        let found = sweep(&fake, &names, Duration::from_secs(3)).await.unwrap();

        assert_eq!(found.len(), 1);
        assert!(started.elapsed() <= Duration::from_secs(3) + CLOSE_GRACE);
        assert!(fake.closed.load(Ordering::SeqCst));
    }
}
