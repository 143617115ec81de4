//! Execution seam between the analysis surface and the scan.
//!
//! The same pure scan is reachable two ways: inline in the caller's task,
//! or marshalled to a scanner pool. [`ScanExecutor`] is the boundary; the
//! implementation a composition uses is chosen by injection at build time,
//! never by runtime environment sniffing.

use std::future::Future;
use std::pin::Pin;

use bytes::Bytes;

use crate::error::Result;
use crate::mpeg::count_frames;
use crate::pool::PoolHandle;

/// Boxed future for executor results.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Trait for dispatching a scan over a buffer.
pub trait ScanExecutor: Send + Sync + 'static {
    /// Scan a buffer and resolve to its frame count.
    fn execute(&self, data: Bytes) -> BoxFuture<'static, Result<usize>>;
}

/// Executor that scans inline in the caller's task.
///
/// The scan is CPU-bound with no suspension points; inline execution is
/// the right fit for command-line use and tests, where nothing else is
/// starved while it runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectExecutor;

impl ScanExecutor for DirectExecutor {
    fn execute(&self, data: Bytes) -> BoxFuture<'static, Result<usize>> {
        Box::pin(async move { Ok(count_frames(&data)) })
    }
}

/// Executor that submits the buffer to a scanner pool.
///
/// Carries capacity, timeout and shutdown semantics with it; see
/// [`crate::pool::ScannerPool`].
#[derive(Clone)]
pub struct PooledExecutor {
    handle: PoolHandle,
}

impl PooledExecutor {
    /// Build from a pool handle.
    pub fn new(handle: PoolHandle) -> Self {
        Self { handle }
    }
}

impl ScanExecutor for PooledExecutor {
    fn execute(&self, data: Bytes) -> BoxFuture<'static, Result<usize>> {
        let handle = self.handle.clone();
        Box::pin(async move { handle.scan(data).await })
    }
}
