use std::future::Future;

use tokio::sync::oneshot;

use crate::{PoolError, TaskError, WorkerPool};

/// Output of a task submitted with
/// [`WorkerPool::submit_with_result`].
#[derive(Debug)]
pub struct TaskHandle<T> {
    rx: oneshot::Receiver<Result<T, TaskError>>,
}

impl<T> TaskHandle<T> {
    pub(crate) fn new(rx: oneshot::Receiver<Result<T, TaskError>>) -> Self {
        Self { rx }
    }

    /// Resolves to [`TaskError::Cancelled`] if the task was dropped
    /// before finishing.
    pub async fn join(self) -> Result<T, TaskError> {
        self.rx.await.unwrap_or(Err(TaskError::Cancelled))
    }
}

/// A batch of tasks whose results are collected in submission order.
#[derive(Debug)]
pub struct TaskGroup<'p, T> {
    pool: &'p WorkerPool,
    handles: Vec<TaskHandle<T>>,
}

impl<'p, T: Send + 'static> TaskGroup<'p, T> {
    pub(crate) fn new(pool: &'p WorkerPool) -> Self {
        Self {
            pool,
            handles: Vec::new(),
        }
    }

    pub async fn submit<F>(&mut self, task: F) -> Result<(), PoolError>
    where
        F: Future<Output = T> + Send + 'static,
    {
        let handle = self.pool.submit_with_result(task).await?;
        self.handles.push(handle);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Wait for every task. Fails with the first failure in submission
    /// order.
    pub async fn wait(self) -> Result<Vec<T>, TaskError> {
        let mut results = Vec::with_capacity(self.handles.len());
        for handle in self.handles {
            results.push(handle.join().await?);
        }
        Ok(results)
    }
}
