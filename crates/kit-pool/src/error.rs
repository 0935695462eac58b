#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PoolError {
    #[error("invalid pool configuration: {reason}")]
    InvalidConfig { reason: String },

    #[error("worker pool queue is full")]
    Full,

    #[error("worker pool is stopped")]
    Stopped,
}

/// Why a task submitted with a result handle produced no value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TaskError {
    #[error("task panicked: {message}")]
    Panicked { message: String },

    /// The pool was stopped before the task finished.
    #[error("task was cancelled")]
    Cancelled,
}

pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
