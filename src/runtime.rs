//! Batch resolution runtime.
//!
//! Each document is solved synchronously on one worker thread; documents
//! are independent, so a small bounded pool resolves many of them in
//! parallel. A caller that needs cancellation waits with
//! [`ResolveHandle::join_timeout`]; a timeout means "no result", since the
//! intermediate state of a solve is not a partial answer.

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender, TrySendError};
use tracing::debug;

use crate::error::{CorefError, CorefResult, ExecutionError};
use crate::mention::Mention;
use crate::resolver::{CorefResolver, Resolution};
use crate::weight::PairWeight;

/// A document queued for resolution, with its own weight model.
#[derive(Clone)]
pub struct Document {
    /// Mentions in detection order
    pub mentions: Vec<Mention>,
    /// Pairwise weight model for this document only
    pub weights: Arc<dyn PairWeight + Send + Sync>,
}

impl Document {
    /// Bundle mentions with a weight model.
    pub fn new(mentions: Vec<Mention>, weights: impl PairWeight + Send + Sync + 'static) -> Self {
        Self {
            mentions,
            weights: Arc::new(weights),
        }
    }
}

/// Runtime configuration.
#[derive(Debug, Clone)]
pub struct CorefRuntimeConfig {
    /// Number of worker threads.
    pub workers: usize,
    /// Maximum queued documents.
    pub queue_capacity: usize,
}

impl Default for CorefRuntimeConfig {
    fn default() -> Self {
        Self {
            workers: 2,
            queue_capacity: 256,
        }
    }
}

enum Job {
    Resolve {
        document: Document,
        reply: Sender<CorefResult<Resolution>>,
    },

    #[cfg(test)]
    Block {
        started: Sender<()>,
        release: Receiver<()>,
    },
}

struct WorkerPool {
    tx: Sender<Job>,
    workers: Vec<JoinHandle<()>>,
    queue_capacity: usize,
}

impl WorkerPool {
    fn start(workers: usize, queue_capacity: usize, resolver: CorefResolver) -> CorefResult<Self> {
        let workers = workers.max(1);
        let queue_capacity = queue_capacity.max(1);
        let (tx, rx) = bounded::<Job>(queue_capacity);

        let mut handles = Vec::with_capacity(workers);
        for idx in 0..workers {
            let rx: Receiver<Job> = rx.clone();
            let handle = thread::Builder::new()
                .name(format!("corelax-worker-{idx}"))
                .spawn(move || loop {
                    match rx.recv() {
                        Ok(Job::Resolve { document, reply }) => {
                            let result = resolver.resolve_document(document.mentions, &*document.weights);
                            let _ = reply.send(result);
                        }
                        Err(_) => break,

                        #[cfg(test)]
                        Ok(Job::Block { started, release }) => {
                            let _ = started.send(());
                            let _ = release.recv();
                        }
                    }
                })
                .map_err(|e| CorefError::internal(format!("failed to spawn corelax worker: {e}")))?;
            handles.push(handle);
        }

        Ok(Self {
            tx,
            workers: handles,
            queue_capacity,
        })
    }

    fn try_submit(&self, job: Job) -> Result<(), CorefError> {
        match self.tx.try_send(job) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => Err(CorefError::Execution(ExecutionError::QueueFull {
                capacity: self.queue_capacity,
            })),
            Err(TrySendError::Disconnected(_)) => Err(CorefError::Execution(ExecutionError::Disconnected)),
        }
    }

    fn shutdown(self) {
        // Close the channel: workers drain queued jobs then exit.
        drop(self.tx);
        for handle in self.workers {
            let _ = handle.join();
        }
    }
}

/// Handle returned by [`CorefRuntime::submit`].
pub struct ResolveHandle {
    rx: Receiver<CorefResult<Resolution>>,
}

impl ResolveHandle {
    /// Waits for the resolution to complete.
    pub fn join(self) -> CorefResult<Resolution> {
        self.rx
            .recv()
            .map_err(|_| CorefError::Execution(ExecutionError::Disconnected))?
    }

    /// Waits for the resolution with a timeout.
    ///
    /// On timeout the document is treated as failed; the worker still
    /// finishes it and the result is discarded.
    pub fn join_timeout(self, timeout: Duration) -> CorefResult<Resolution> {
        self.rx.recv_timeout(timeout).map_err(|err| match err {
            RecvTimeoutError::Timeout => CorefError::Execution(ExecutionError::Timeout {
                duration_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
            }),
            RecvTimeoutError::Disconnected => CorefError::Execution(ExecutionError::Disconnected),
        })?
    }
}

/// Bounded worker pool resolving independent documents.
pub struct CorefRuntime {
    resolver: CorefResolver,
    pool: Option<WorkerPool>,
}

impl CorefRuntime {
    /// Start the worker threads.
    pub fn new(resolver: CorefResolver, config: &CorefRuntimeConfig) -> CorefResult<Self> {
        let pool = WorkerPool::start(config.workers, config.queue_capacity, resolver)?;
        debug!(
            workers = pool.workers.len(),
            queue_capacity = pool.queue_capacity,
            "started resolution runtime"
        );
        Ok(Self {
            resolver,
            pool: Some(pool),
        })
    }

    fn pool(&self) -> CorefResult<&WorkerPool> {
        self.pool
            .as_ref()
            .ok_or(CorefError::Execution(ExecutionError::Disconnected))
    }

    /// Queue a document without waiting.
    ///
    /// Fails fast with `QueueFull` when the queue is at capacity.
    pub fn submit(&self, document: Document) -> CorefResult<ResolveHandle> {
        let (tx, rx) = bounded::<CorefResult<Resolution>>(1);
        self.pool()?.try_submit(Job::Resolve { document, reply: tx })?;
        Ok(ResolveHandle { rx })
    }

    /// Resolve a document on the pool and wait for the result.
    pub fn resolve(&self, document: Document) -> CorefResult<Resolution> {
        self.submit(document)?.join()
    }

    /// Returns the resolver used by the workers.
    #[must_use]
    pub fn resolver(&self) -> &CorefResolver {
        &self.resolver
    }

    #[cfg(test)]
    fn submit_block(&self) -> CorefResult<(Receiver<()>, Sender<()>)> {
        let (started_tx, started_rx) = bounded::<()>(1);
        let (release_tx, release_rx) = bounded::<()>(1);
        self.pool()?.try_submit(Job::Block {
            started: started_tx,
            release: release_rx,
        })?;
        Ok((started_rx, release_tx))
    }
}

impl Drop for CorefRuntime {
    fn drop(&mut self) {
        if let Some(pool) = self.pool.take() {
            pool.shutdown();
        }
    }
}
