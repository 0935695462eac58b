use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use futures::FutureExt;
use futures::future::BoxFuture;
use tokio::sync::{Mutex, mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::error::panic_message;
use crate::{PoolConfig, PoolError, TaskError, TaskGroup, TaskHandle};

type Job = BoxFuture<'static, ()>;

#[derive(Debug, Default)]
struct Stats {
    submitted: AtomicUsize,
    started: AtomicUsize,
    running: AtomicUsize,
    succeeded: AtomicUsize,
    failed: AtomicUsize,
}

/// Point-in-time counters. `completed == succeeded + failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolMetrics {
    pub workers: usize,
    pub running: usize,
    pub submitted: usize,
    /// Queued but not yet picked up by a worker.
    pub waiting: usize,
    pub completed: usize,
    pub succeeded: usize,
    pub failed: usize,
}

/// A fixed set of tokio workers draining a bounded FIFO queue.
///
/// A panicking task is caught, counted as failed and logged; its worker
/// keeps running. Dropping the pool closes intake and lets the workers
/// finish whatever is already queued in the background.
pub struct WorkerPool {
    name: Arc<str>,
    sender: RwLock<Option<mpsc::Sender<Job>>>,
    workers: Vec<JoinHandle<()>>,
    worker_count: usize,
    stats: Arc<Stats>,
}

impl std::fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerPool")
            .field("name", &self.name)
            .field("metrics", &self.metrics())
            .finish()
    }
}

impl WorkerPool {
    /// Spawns the workers. Must be called from within a tokio runtime.
    pub fn new(config: PoolConfig) -> Result<Self, PoolError> {
        config.validate()?;

        let (sender, receiver) = mpsc::channel::<Job>(config.capacity);
        let receiver = Arc::new(Mutex::new(receiver));
        let stats = Arc::new(Stats::default());
        let name: Arc<str> = Arc::from(config.name.as_str());

        let workers = (0..config.max_workers)
            .map(|id| {
                tokio::spawn(worker(
                    Arc::clone(&name),
                    id,
                    Arc::clone(&receiver),
                    Arc::clone(&stats),
                ))
            })
            .collect();

        info!(
            pool = %name,
            workers = config.max_workers,
            capacity = config.capacity,
            "worker pool started"
        );

        Ok(Self {
            name,
            sender: RwLock::new(Some(sender)),
            workers,
            worker_count: config.max_workers,
            stats,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn sender(&self) -> Result<mpsc::Sender<Job>, PoolError> {
        self.sender
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or(PoolError::Stopped)
    }

    /// Queue a task, waiting for space if the queue is full.
    pub async fn submit<F>(&self, task: F) -> Result<(), PoolError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let sender = self.sender()?;
        self.stats.submitted.fetch_add(1, Ordering::SeqCst);
        if sender.send(Box::pin(task)).await.is_err() {
            self.stats.submitted.fetch_sub(1, Ordering::SeqCst);
            return Err(PoolError::Stopped);
        }
        Ok(())
    }

    /// Queue a task without waiting.
    pub fn try_submit<F>(&self, task: F) -> Result<(), PoolError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let sender = self.sender()?;
        self.stats.submitted.fetch_add(1, Ordering::SeqCst);
        sender.try_send(Box::pin(task)).map_err(|e| {
            self.stats.submitted.fetch_sub(1, Ordering::SeqCst);
            match e {
                mpsc::error::TrySendError::Full(_) => PoolError::Full,
                mpsc::error::TrySendError::Closed(_) => PoolError::Stopped,
            }
        })
    }

    /// Queue a task and get a handle to its output.
    pub async fn submit_with_result<F, T>(&self, task: F) -> Result<TaskHandle<T>, PoolError>
    where
        F: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        let (tx, rx) = oneshot::channel();
        self.submit(async move {
            match AssertUnwindSafe(task).catch_unwind().await {
                Ok(value) => {
                    let _ = tx.send(Ok(value));
                }
                Err(payload) => {
                    let message = panic_message(payload.as_ref());
                    let _ = tx.send(Err(TaskError::Panicked { message }));
                    // Let the worker count and log it.
                    std::panic::resume_unwind(payload);
                }
            }
        })
        .await?;
        Ok(TaskHandle::new(rx))
    }

    pub fn group<T: Send + 'static>(&self) -> TaskGroup<'_, T> {
        TaskGroup::new(self)
    }

    pub fn metrics(&self) -> PoolMetrics {
        let submitted = self.stats.submitted.load(Ordering::SeqCst);
        let started = self.stats.started.load(Ordering::SeqCst);
        let succeeded = self.stats.succeeded.load(Ordering::SeqCst);
        let failed = self.stats.failed.load(Ordering::SeqCst);
        PoolMetrics {
            workers: self.worker_count,
            running: self.stats.running.load(Ordering::SeqCst),
            submitted,
            waiting: submitted.saturating_sub(started),
            completed: succeeded + failed,
            succeeded,
            failed,
        }
    }

    /// Stop accepting tasks. Already queued tasks still run.
    pub fn close(&self) {
        self.sender
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
    }

    /// Stop intake, drain the queue and wait for every worker to exit.
    pub async fn stop_and_wait(mut self) {
        self.close();
        for handle in std::mem::take(&mut self.workers) {
            if let Err(e) = handle.await {
                error!(pool = %self.name, error = %e, "worker exited abnormally");
            }
        }
        info!(pool = %self.name, metrics = ?self.metrics(), "worker pool drained");
    }

    /// Stop intake and abort the workers. Queued and running tasks are
    /// dropped; their handles resolve to [`TaskError::Cancelled`].
    pub async fn stop(mut self) {
        self.close();
        let workers = std::mem::take(&mut self.workers);
        for handle in &workers {
            handle.abort();
        }
        for handle in workers {
            let _ = handle.await;
        }
        info!(pool = %self.name, "worker pool stopped");
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.close();
    }
}

async fn worker(
    pool: Arc<str>,
    id: usize,
    receiver: Arc<Mutex<mpsc::Receiver<Job>>>,
    stats: Arc<Stats>,
) {
    loop {
        // Guard is released before the job runs.
        let job = receiver.lock().await.recv().await;
        let Some(job) = job else { break };

        stats.started.fetch_add(1, Ordering::SeqCst);
        stats.running.fetch_add(1, Ordering::SeqCst);
        let outcome = AssertUnwindSafe(job).catch_unwind().await;
        stats.running.fetch_sub(1, Ordering::SeqCst);

        match outcome {
            Ok(()) => {
                stats.succeeded.fetch_add(1, Ordering::SeqCst);
            }
            Err(payload) => {
                stats.failed.fetch_add(1, Ordering::SeqCst);
                error!(
                    pool = %pool,
                    worker = id,
                    panic = %panic_message(payload.as_ref()),
                    "task panicked"
                );
            }
        }
    }
    debug!(pool = %pool, worker = id, "worker exiting");
}
