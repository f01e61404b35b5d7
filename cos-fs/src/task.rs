//! Join helpers for spawned units of work

use cos_core::{CosError, CosResult};
use tokio::task::JoinHandle;

/// Awaits a spawned task, folding a panic or cancellation into the error type.
pub(crate) async fn join<T>(handle: JoinHandle<CosResult<T>>) -> CosResult<T> {
    handle.await.map_err(|e| CosError::Task(e.to_string()))?
}
