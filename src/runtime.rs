//! Threaded query runtime.
//!
//! Queries are pure functions of an immutable network, so independent
//! queries can run on separate threads with no coordination. This module
//! provides a small, bounded, thread-based runtime that shares one network
//! between a pool of workers.

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender, TrySendError};
use serde::{Deserialize, Serialize};

use crate::domain::Event;
use crate::error::{BayesError, BayesResult, RuntimeError};
use crate::factor::Factor;
use crate::inference::{InferenceConfig, VariableElimination};
use crate::network::Network;

/// A query against the runtime's network.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum Query {
    /// Joint distribution over `variables`.
    Marginal {
        /// Query variables.
        variables: Vec<String>,
    },

    /// `P(event | evidence)`.
    Conditional {
        /// Target assignment.
        event: Event,
        /// Observed assignment.
        evidence: Event,
    },
}

impl Query {
    /// Creates a marginal query.
    pub fn marginal<I, S>(variables: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Marginal {
            variables: variables.into_iter().map(Into::into).collect(),
        }
    }

    /// Creates a conditional query.
    #[must_use]
    pub fn conditional(event: Event, evidence: Event) -> Self {
        Self::Conditional { event, evidence }
    }

    fn run(self, engine: &VariableElimination, network: &Network) -> BayesResult<QueryAnswer> {
        match self {
            Self::Marginal { variables } => engine.marginal(network, variables).map(QueryAnswer::Marginal),
            Self::Conditional { event, evidence } => engine
                .conditional(network, &event, &evidence)
                .map(QueryAnswer::Conditional),
        }
    }
}

/// The answer to a [`Query`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type", content = "value")]
pub enum QueryAnswer {
    /// Joint distribution over the query variables.
    Marginal(Factor),
    /// Conditional probability.
    Conditional(f64),
}

impl QueryAnswer {
    /// Returns the factor of a marginal answer.
    #[must_use]
    pub fn as_marginal(&self) -> Option<&Factor> {
        match self {
            Self::Marginal(f) => Some(f),
            Self::Conditional(_) => None,
        }
    }

    /// Returns the probability of a conditional answer.
    #[must_use]
    pub fn as_conditional(&self) -> Option<f64> {
        match self {
            Self::Conditional(p) => Some(*p),
            Self::Marginal(_) => None,
        }
    }
}

/// Runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Number of worker threads.
    pub workers: usize,
    /// Maximum queued queries.
    pub queue_capacity: usize,
    /// Engine configuration shared by all workers.
    pub inference: InferenceConfig,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            workers: 2,
            queue_capacity: 1024,
            inference: InferenceConfig::default(),
        }
    }
}

enum Job {
    Run {
        query: Query,
        reply: Sender<BayesResult<QueryAnswer>>,
    },

    #[cfg(test)]
    Sleep {
        duration: Duration,
        reply: Sender<()>,
    },
}

/// Handle returned by [`InferenceRuntime::execute_async`].
pub struct QueryHandle {
    rx: Receiver<BayesResult<QueryAnswer>>,
}

impl QueryHandle {
    /// Waits for the query to complete.
    pub fn join(self) -> BayesResult<QueryAnswer> {
        self.rx
            .recv()
            .map_err(|_| BayesError::Runtime(RuntimeError::Disconnected))?
    }

    /// Waits for the query to complete with a timeout.
    pub fn join_timeout(self, timeout: Duration) -> BayesResult<QueryAnswer> {
        self.rx.recv_timeout(timeout).map_err(|err| match err {
            RecvTimeoutError::Timeout => BayesError::Runtime(RuntimeError::Timeout {
                duration_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
            }),
            RecvTimeoutError::Disconnected => BayesError::Runtime(RuntimeError::Disconnected),
        })?
    }
}

/// A pool of workers answering queries against one shared network.
pub struct InferenceRuntime {
    network: Arc<Network>,
    tx: Option<Sender<Job>>,
    workers: Vec<JoinHandle<()>>,
    queue_capacity: usize,
}

impl InferenceRuntime {
    /// Starts the worker pool.
    ///
    /// Zero `workers` or `queue_capacity` are raised to 1.
    pub fn new(network: Network, config: RuntimeConfig) -> BayesResult<Self> {
        let engine = Arc::new(VariableElimination::new(config.inference)?);
        let network = Arc::new(network);
        let workers = config.workers.max(1);
        let queue_capacity = config.queue_capacity.max(1);
        let (tx, rx) = bounded::<Job>(queue_capacity);

        let mut handles = Vec::with_capacity(workers);
        for idx in 0..workers {
            let rx: Receiver<Job> = rx.clone();
            let engine = Arc::clone(&engine);
            let network = Arc::clone(&network);
            let handle = thread::Builder::new()
                .name(format!("varelim-worker-{idx}"))
                .spawn(move || worker_loop(&rx, &engine, &network))
                .map_err(|err| RuntimeError::Spawn {
                    message: err.to_string(),
                })?;
            handles.push(handle);
        }

        tracing::debug!(
            workers,
            queue_capacity,
            fingerprint = %network.fingerprint(),
            "started inference runtime"
        );

        Ok(Self {
            network,
            tx: Some(tx),
            workers: handles,
            queue_capacity,
        })
    }

    /// Submits a query without waiting for it.
    pub fn execute_async(&self, query: Query) -> BayesResult<QueryHandle> {
        let (reply, rx) = bounded::<BayesResult<QueryAnswer>>(1);
        self.try_submit(Job::Run { query, reply })?;
        Ok(QueryHandle { rx })
    }

    /// Runs a query and waits for its answer.
    pub fn execute(&self, query: Query) -> BayesResult<QueryAnswer> {
        self.execute_async(query)?.join()
    }

    /// Submits every query, then collects answers in submission order.
    ///
    /// A query that cannot be queued yields its submission error in place.
    pub fn execute_batch(&self, queries: Vec<Query>) -> Vec<BayesResult<QueryAnswer>> {
        let handles: Vec<BayesResult<QueryHandle>> =
            queries.into_iter().map(|q| self.execute_async(q)).collect();
        handles
            .into_iter()
            .map(|handle| handle.and_then(QueryHandle::join))
            .collect()
    }

    /// The shared network.
    #[must_use]
    pub fn network(&self) -> &Network {
        &self.network
    }

    fn try_submit(&self, job: Job) -> Result<(), RuntimeError> {
        let tx = self.tx.as_ref().ok_or(RuntimeError::Disconnected)?;
        match tx.try_send(job) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => Err(RuntimeError::QueueFull {
                capacity: self.queue_capacity,
            }),
            Err(TrySendError::Disconnected(_)) => Err(RuntimeError::Disconnected),
        }
    }

    #[cfg(test)]
    fn submit_sleep(&self, duration: Duration) -> Result<Receiver<()>, RuntimeError> {
        let (reply, rx) = bounded::<()>(1);
        self.try_submit(Job::Sleep { duration, reply })?;
        Ok(rx)
    }
}

fn worker_loop(rx: &Receiver<Job>, engine: &VariableElimination, network: &Network) {
    loop {
        match rx.recv() {
            Ok(Job::Run { query, reply }) => {
                let _ = reply.send(query.run(engine, network));
            }
            Err(_) => break,

            #[cfg(test)]
            Ok(Job::Sleep { duration, reply }) => {
                thread::sleep(duration);
                let _ = reply.send(());
            }
        }
    }
}

impl Drop for InferenceRuntime {
    fn drop(&mut self) {
        // Closing the channel lets workers drain queued jobs, then exit.
        drop(self.tx.take());
        for handle in self.workers.drain(..) {
            let _ = handle.join();
        }
        tracing::debug!("stopped inference runtime");
    }
}
