//! Bounded scanner pool.
//!
//! The scan itself is pure and synchronous; this module owns everything
//! around it: a bounded submission queue, a cap on concurrent scans, a
//! per-submission timeout, worker-failure recovery and a two-phase
//! shutdown. The pool is constructed explicitly at the composition root
//! and handed around as a cheap [`PoolHandle`]; there is no ambient global
//! state.
//!
//! # Architecture
//!
//! ```text
//! Submitter 1 ─┐
//! Submitter 2 ─┼─► mpsc::Sender<ScanJob> ─► Dispatcher ─► blocking scans
//! Submitter N ─┘        (bounded queue)     (semaphore caps concurrency)
//! ```
//!
//! Each accepted job is answered over its own oneshot channel. A submitter
//! that times out stops waiting; the scan it abandoned still runs to
//! completion on its worker thread (the scan has no suspension points to
//! cancel at) and releases its slot when done.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use bytes::Bytes;
use tokio::sync::{mpsc, oneshot, Semaphore};
use tokio::task::JoinHandle;

use crate::error::{FramescanError, Result};
use crate::mpeg::count_frames;

/// Default maximum concurrent scans.
pub const DEFAULT_WORKERS: usize = 4;

/// Default submission queue capacity.
pub const DEFAULT_QUEUE_CAPACITY: usize = 64;

/// Default per-submission time budget.
pub const DEFAULT_SCAN_TIMEOUT: Duration = Duration::from_secs(10);

/// Default grace period for shutdown phase two.
pub const DEFAULT_SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// Poll interval while waiting for in-flight scans to drain.
const DRAIN_CHECK_INTERVAL: Duration = Duration::from_millis(10);

/// One queued scan request.
#[derive(Debug)]
struct ScanJob {
    /// Buffer to scan; shared, never mutated.
    data: Bytes,
    /// Where the submitter waits for the outcome.
    reply: oneshot::Sender<Result<usize>>,
}

/// Configuration for the scanner pool.
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// Maximum scans running at once (clamped to at least 1).
    pub workers: usize,
    /// Queue capacity for submissions waiting on a worker (clamped to at
    /// least 1). A full queue rejects with [`FramescanError::Busy`].
    pub queue_capacity: usize,
    /// Time budget per submission, measured from submission and covering
    /// queue wait plus the scan itself.
    pub scan_timeout: Duration,
    /// How long shutdown waits for queued and running scans to drain
    /// before force-stopping the dispatcher.
    pub shutdown_grace: Duration,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            scan_timeout: DEFAULT_SCAN_TIMEOUT,
            shutdown_grace: DEFAULT_SHUTDOWN_GRACE,
        }
    }
}

/// Handle for submitting scans to the pool.
///
/// This is cheaply cloneable and can be shared across tasks; every clone
/// talks to the same pool.
#[derive(Clone)]
pub struct PoolHandle {
    /// Channel sender for jobs.
    tx: mpsc::Sender<ScanJob>,
    /// Accepted submissions not yet answered (queued or running).
    in_flight: Arc<AtomicUsize>,
    /// Set once the pool stops accepting work.
    closed: Arc<AtomicBool>,
    /// Per-submission time budget.
    scan_timeout: Duration,
}

impl PoolHandle {
    /// Submit a buffer and wait for its frame count.
    ///
    /// Fails fast with [`FramescanError::Busy`] when the queue is full and
    /// with [`FramescanError::Closed`] once the pool stops accepting work.
    /// When the time budget expires the submitter stops relying on the
    /// in-flight computation and gets [`FramescanError::Timeout`]; the
    /// abandoned scan finishes on its worker and its result is discarded.
    pub async fn scan(&self, data: Bytes) -> Result<usize> {
        if self.closed.load(Ordering::Acquire) {
            return Err(FramescanError::Closed);
        }

        let (reply_tx, reply_rx) = oneshot::channel();
        let job = ScanJob {
            data,
            reply: reply_tx,
        };

        self.in_flight.fetch_add(1, Ordering::AcqRel);
        if let Err(e) = self.tx.try_send(job) {
            self.in_flight.fetch_sub(1, Ordering::Release);
            return Err(match e {
                mpsc::error::TrySendError::Full(_) => {
                    tracing::warn!("Scanner pool at capacity, rejecting submission");
                    FramescanError::Busy
                }
                mpsc::error::TrySendError::Closed(_) => FramescanError::Closed,
            });
        }

        match tokio::time::timeout(self.scan_timeout, reply_rx).await {
            Ok(Ok(outcome)) => outcome,
            // The dispatcher dropped the job without answering; only
            // happens when the pool is torn down.
            Ok(Err(_)) => Err(FramescanError::Closed),
            Err(_) => {
                tracing::warn!("Scan timed out after {:?}", self.scan_timeout);
                Err(FramescanError::Timeout(self.scan_timeout))
            }
        }
    }

    /// Number of accepted scans not yet finished (queued or running).
    #[inline]
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Whether the pool has stopped accepting work.
    #[inline]
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}

/// The pool itself, owned by the composition root.
///
/// Constructed with [`ScannerPool::spawn`], torn down with
/// [`ScannerPool::shutdown`]. Consumers get a [`PoolHandle`] and never see
/// the pool object.
pub struct ScannerPool {
    handle: PoolHandle,
    dispatcher: JoinHandle<()>,
    shutdown_grace: Duration,
}

impl ScannerPool {
    /// Spawn a pool with the given configuration.
    pub fn spawn(config: PoolConfig) -> Self {
        let (tx, rx) = mpsc::channel(config.queue_capacity.max(1));
        let in_flight = Arc::new(AtomicUsize::new(0));
        let closed = Arc::new(AtomicBool::new(false));
        let workers = config.workers.max(1);
        let semaphore = Arc::new(Semaphore::new(workers));

        let handle = PoolHandle {
            tx,
            in_flight: in_flight.clone(),
            closed,
            scan_timeout: config.scan_timeout,
        };

        tracing::debug!("Scanner pool started with {} workers", workers);
        let dispatcher = tokio::spawn(dispatch_loop(rx, semaphore, in_flight));

        Self {
            handle,
            dispatcher,
            shutdown_grace: config.shutdown_grace,
        }
    }

    /// Spawn a pool with default configuration.
    pub fn spawn_default() -> Self {
        Self::spawn(PoolConfig::default())
    }

    /// Get a handle for submitting scans.
    pub fn handle(&self) -> PoolHandle {
        self.handle.clone()
    }

    /// Shutdown phase one: stop accepting new scans.
    ///
    /// Queued and running scans keep going; subsequent submissions fail
    /// with [`FramescanError::Closed`].
    pub fn close(&self) {
        self.handle.closed.store(true, Ordering::Release);
        tracing::debug!("Scanner pool closed to new work");
    }

    /// Two-phase shutdown.
    ///
    /// Closes the intake, waits up to the configured grace period for
    /// queued and running scans to drain, then force-stops the dispatcher.
    /// Work still in flight when the grace period expires is abandoned and
    /// its submitters see [`FramescanError::Closed`].
    pub async fn shutdown(self) -> Result<()> {
        self.close();

        let start = Instant::now();
        loop {
            if self.handle.in_flight.load(Ordering::Acquire) == 0 {
                self.dispatcher.abort();
                tracing::debug!("Scanner pool drained and stopped");
                return Ok(());
            }

            if start.elapsed() > self.shutdown_grace {
                self.dispatcher.abort();
                tracing::warn!(
                    "Scanner pool shutdown grace of {:?} expired with {} scans in flight",
                    self.shutdown_grace,
                    self.handle.in_flight.load(Ordering::Acquire)
                );
                return Err(FramescanError::ShutdownTimeout);
            }

            tokio::time::sleep(DRAIN_CHECK_INTERVAL).await;
        }
    }
}

/// Main dispatcher loop: pull jobs off the queue in order, gate them on
/// the worker semaphore, and run each on a blocking thread.
async fn dispatch_loop(
    mut rx: mpsc::Receiver<ScanJob>,
    semaphore: Arc<Semaphore>,
    in_flight: Arc<AtomicUsize>,
) {
    while let Some(job) = rx.recv().await {
        let permit = match semaphore.clone().acquire_owned().await {
            Ok(p) => p,
            Err(_) => break,
        };

        let in_flight = in_flight.clone();
        tokio::spawn(async move {
            // Permit is held until the scan finishes, panic included.
            let _permit = permit;
            let ScanJob { data, reply } = job;
            let outcome = run_blocking(move || count_frames(&data)).await;
            in_flight.fetch_sub(1, Ordering::Release);
            // The submitter may have timed out and gone away.
            let _ = reply.send(outcome);
        });
    }
    tracing::debug!("Scanner pool dispatcher stopped");
}

/// Run one scan on the blocking thread pool, mapping a dead worker onto
/// [`FramescanError::Worker`].
async fn run_blocking<F>(scan: F) -> Result<usize>
where
    F: FnOnce() -> usize + Send + 'static,
{
    match tokio::task::spawn_blocking(scan).await {
        Ok(count) => Ok(count),
        Err(e) => {
            tracing::error!("Scan worker failed: {}", e);
            Err(FramescanError::Worker(e.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mpeg::FrameHeader;

    /// A whole synthetic frame: header plus zeroed payload.
    fn frame(bitrate: u32, rate: u32) -> Vec<u8> {
        let word = (0x7FF << 21) | (3 << 19) | (1 << 17) | (bitrate << 12) | (rate << 10);
        let len = FrameHeader::from_word(word).frame_len().unwrap();
        let mut bytes = word.to_be_bytes().to_vec();
        bytes.resize(len, 0);
        bytes
    }

    fn audio(frames: usize) -> Bytes {
        let mut buf = Vec::new();
        for _ in 0..frames {
            buf.extend_from_slice(&frame(5, 1));
        }
        buf.extend_from_slice(&[0u8; 8]);
        Bytes::from(buf)
    }

    fn bare_handle(
        capacity: usize,
        scan_timeout: Duration,
    ) -> (PoolHandle, mpsc::Receiver<ScanJob>) {
        let (tx, rx) = mpsc::channel(capacity);
        let handle = PoolHandle {
            tx,
            in_flight: Arc::new(AtomicUsize::new(0)),
            closed: Arc::new(AtomicBool::new(false)),
            scan_timeout,
        };
        (handle, rx)
    }

    #[test]
    fn test_pool_config_default() {
        let config = PoolConfig::default();
        assert_eq!(config.workers, DEFAULT_WORKERS);
        assert_eq!(config.queue_capacity, DEFAULT_QUEUE_CAPACITY);
        assert_eq!(config.scan_timeout, DEFAULT_SCAN_TIMEOUT);
        assert_eq!(config.shutdown_grace, DEFAULT_SHUTDOWN_GRACE);
    }

    #[tokio::test]
    async fn test_scan_counts_frames() {
        let pool = ScannerPool::spawn_default();
        let buf = audio(3);

        let count = pool.handle().scan(buf.clone()).await.unwrap();
        assert_eq!(count, 3);
        assert_eq!(count, count_frames(&buf));
    }

    #[tokio::test]
    async fn test_empty_buffer_scans_to_zero() {
        let pool = ScannerPool::spawn_default();
        assert_eq!(pool.handle().scan(Bytes::new()).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_pooled_matches_direct() {
        let pool = ScannerPool::spawn_default();
        let handle = pool.handle();

        let buffers = [
            Bytes::new(),
            Bytes::from_static(b"not an mp3"),
            audio(1),
            audio(7),
            Bytes::from(vec![0u8; 4096]),
        ];
        for buf in buffers {
            let pooled = handle.scan(buf.clone()).await.unwrap();
            assert_eq!(pooled, count_frames(&buf));
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_scans_all_complete() {
        let pool = ScannerPool::spawn(PoolConfig {
            workers: 2,
            ..Default::default()
        });

        let mut tasks = Vec::new();
        for i in 0..16usize {
            let handle = pool.handle();
            let buf = audio(i % 5);
            tasks.push(tokio::spawn(async move {
                (i % 5, handle.scan(buf).await)
            }));
        }

        for task in tasks {
            let (expected, result) = task.await.unwrap();
            assert_eq!(result.unwrap(), expected);
        }
    }

    #[tokio::test]
    async fn test_full_queue_rejects_busy() {
        let (handle, _rx) = bare_handle(1, Duration::from_secs(1));

        // Fill the only queue slot; nothing drains it.
        let (reply, _keep) = oneshot::channel();
        handle
            .tx
            .try_send(ScanJob {
                data: Bytes::new(),
                reply,
            })
            .unwrap();

        let result = handle.scan(Bytes::new()).await;
        assert!(matches!(result, Err(FramescanError::Busy)));
        // The rejected submission must not leak into the accounting.
        assert_eq!(handle.in_flight(), 0);
    }

    #[tokio::test]
    async fn test_timeout_when_no_worker_answers() {
        let (handle, _rx) = bare_handle(4, Duration::from_millis(20));

        let result = handle.scan(audio(1)).await;
        assert!(matches!(result, Err(FramescanError::Timeout(_))));
    }

    #[tokio::test]
    async fn test_worker_panic_maps_to_worker_error() {
        let result = run_blocking(|| panic!("scan blew up")).await;
        assert!(matches!(result, Err(FramescanError::Worker(_))));

        // A dead worker must not poison the next scan.
        assert_eq!(run_blocking(|| 7).await.unwrap(), 7);
    }

    #[tokio::test]
    async fn test_pool_survives_many_rounds_of_work() {
        // More submissions than workers and queue slots combined, run in
        // waves; every slot must be reclaimed for the next wave.
        let pool = ScannerPool::spawn(PoolConfig {
            workers: 2,
            queue_capacity: 4,
            ..Default::default()
        });
        let handle = pool.handle();

        for _ in 0..5 {
            for _ in 0..4 {
                assert_eq!(handle.scan(audio(2)).await.unwrap(), 2);
            }
        }
        assert_eq!(handle.in_flight(), 0);
    }

    #[tokio::test]
    async fn test_close_rejects_new_work() {
        let pool = ScannerPool::spawn_default();
        let handle = pool.handle();

        assert_eq!(handle.scan(audio(1)).await.unwrap(), 1);

        pool.close();
        assert!(handle.is_closed());
        let result = handle.scan(audio(1)).await;
        assert!(matches!(result, Err(FramescanError::Closed)));
    }

    #[tokio::test]
    async fn test_close_lets_in_flight_scan_finish() {
        let pool = ScannerPool::spawn(PoolConfig {
            workers: 1,
            scan_timeout: Duration::from_secs(60),
            ..Default::default()
        });
        let handle = pool.handle();

        // A sync-free buffer big enough that the scan is still running
        // when the pool closes.
        let slow = Bytes::from(vec![0xFF; 16 * 1024 * 1024]);
        let scanning = {
            let handle = handle.clone();
            tokio::spawn(async move { handle.scan(slow).await })
        };

        let deadline = Instant::now() + Duration::from_secs(5);
        while handle.in_flight() == 0 && Instant::now() < deadline {
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
        pool.close();

        // The accepted scan runs to completion with its real count and
        // releases its slot.
        assert_eq!(scanning.await.unwrap().unwrap(), 0);
        assert_eq!(handle.in_flight(), 0);

        // New work is rejected from the moment of the close.
        assert!(matches!(
            handle.scan(Bytes::new()).await,
            Err(FramescanError::Closed)
        ));

        // Nothing left in flight, so shutdown returns without waiting.
        pool.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_shutdown_after_drain_is_clean() {
        let pool = ScannerPool::spawn_default();
        let handle = pool.handle();

        for _ in 0..3 {
            handle.scan(audio(2)).await.unwrap();
        }

        pool.shutdown().await.unwrap();
        assert!(handle.is_closed());
        assert!(matches!(
            handle.scan(audio(1)).await,
            Err(FramescanError::Closed)
        ));
    }

    #[tokio::test]
    async fn test_shutdown_times_out_with_stuck_work() {
        let pool = ScannerPool::spawn(PoolConfig {
            shutdown_grace: Duration::from_millis(50),
            ..Default::default()
        });

        // Simulate a scan that never finishes.
        pool.handle.in_flight.fetch_add(1, Ordering::AcqRel);

        let result = pool.shutdown().await;
        assert!(matches!(result, Err(FramescanError::ShutdownTimeout)));
    }
}
