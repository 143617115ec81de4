//! Analyzer builder and composition root.
//!
//! The [`AnalyzerBuilder`] provides a fluent API for wiring the intake
//! gate to an executor, and the [`Analyzer`] is the object an embedding
//! surface (HTTP handler, CLI, test harness) actually calls. Everything a
//! deployment varies lives here: intake limits, direct versus pooled
//! execution, or a caller-supplied executor.
//!
//! # Example
//!
//! ```
//! use framescan::{Analyzer, Upload};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let analyzer = Analyzer::builder().build();
//!
//! let upload = Upload::new(&b""[..]).with_name("empty.mp3");
//! let report = analyzer.analyze(upload).await.unwrap();
//! assert_eq!(report.frames, 0);
//! # }
//! ```

use std::sync::Arc;

use serde::Serialize;

use crate::error::{FramescanError, Result};
use crate::executor::{DirectExecutor, PooledExecutor, ScanExecutor};
use crate::intake::{self, IntakeConfig, Upload};
use crate::pool::{PoolConfig, ScannerPool};

/// Result of one successful analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScanReport {
    /// Number of complete valid frames found.
    pub frames: usize,
    /// Size of the scanned payload in bytes.
    pub bytes_scanned: usize,
}

/// Which executor the analyzer is built around.
enum ExecutorChoice {
    Direct,
    Pooled(PoolConfig),
    Custom(Arc<dyn ScanExecutor>),
}

/// Builder for configuring and creating an [`Analyzer`].
pub struct AnalyzerBuilder {
    intake: IntakeConfig,
    choice: ExecutorChoice,
}

impl AnalyzerBuilder {
    /// Create a new builder: direct execution, default intake limits.
    pub fn new() -> Self {
        Self {
            intake: IntakeConfig::default(),
            choice: ExecutorChoice::Direct,
        }
    }

    /// Set the upload size ceiling in bytes.
    ///
    /// Default: 100 MiB.
    pub fn max_bytes(mut self, limit: usize) -> Self {
        self.intake.max_bytes = limit;
        self
    }

    /// Scan inline in the caller's task (the default).
    pub fn direct(mut self) -> Self {
        self.choice = ExecutorChoice::Direct;
        self
    }

    /// Scan via an owned scanner pool with the given configuration.
    ///
    /// The pool is spawned when [`AnalyzerBuilder::build`] runs, so build
    /// the analyzer from within a Tokio runtime. [`Analyzer::shutdown`]
    /// tears the pool down.
    pub fn pooled(mut self, config: PoolConfig) -> Self {
        self.choice = ExecutorChoice::Pooled(config);
        self
    }

    /// Inject a caller-supplied executor.
    ///
    /// The analyzer takes no ownership of whatever sits behind it;
    /// [`Analyzer::shutdown`] becomes a no-op.
    pub fn executor(mut self, executor: Arc<dyn ScanExecutor>) -> Self {
        self.choice = ExecutorChoice::Custom(executor);
        self
    }

    /// Build the analyzer.
    pub fn build(self) -> Analyzer {
        let (executor, pool): (Arc<dyn ScanExecutor>, Option<ScannerPool>) = match self.choice {
            ExecutorChoice::Direct => (Arc::new(DirectExecutor), None),
            ExecutorChoice::Pooled(config) => {
                let pool = ScannerPool::spawn(config);
                (Arc::new(PooledExecutor::new(pool.handle())), Some(pool))
            }
            ExecutorChoice::Custom(executor) => (executor, None),
        };

        Analyzer {
            intake: self.intake,
            executor,
            pool,
        }
    }
}

impl Default for AnalyzerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// The assembled analysis surface: intake gate plus injected executor.
pub struct Analyzer {
    intake: IntakeConfig,
    executor: Arc<dyn ScanExecutor>,
    /// Owned only when the pooled executor was chosen.
    pool: Option<ScannerPool>,
}

impl Analyzer {
    /// Create a new analyzer builder.
    pub fn builder() -> AnalyzerBuilder {
        AnalyzerBuilder::new()
    }

    /// Gate an upload and scan it.
    ///
    /// Runs the intake checks (media identity, size ceiling), dispatches
    /// the buffer through the configured executor and reports the result.
    /// A recognizable upload with no valid frames is a success with
    /// `frames == 0`, not an error.
    pub async fn analyze(&self, upload: Upload) -> Result<ScanReport> {
        intake::check(&upload, &self.intake)?;

        let bytes_scanned = upload.data.len();
        let frames = self.executor.execute(upload.data).await?;

        tracing::debug!("Scanned {} bytes into {} frames", bytes_scanned, frames);
        Ok(ScanReport {
            frames,
            bytes_scanned,
        })
    }

    /// Boundary convenience for surfaces whose upload slot may be empty.
    ///
    /// `None` means the request carried no file at all, which is the one
    /// failure an upload's content can never produce on its own.
    pub async fn analyze_optional(&self, upload: Option<Upload>) -> Result<ScanReport> {
        match upload {
            Some(upload) => self.analyze(upload).await,
            None => Err(FramescanError::MissingFile),
        }
    }

    /// Stop accepting pooled work without waiting for drain.
    ///
    /// No-op for analyzers without an owned pool.
    pub fn close(&self) {
        if let Some(pool) = &self.pool {
            pool.close();
        }
    }

    /// Tear down the owned scanner pool, if the pooled executor was
    /// chosen; otherwise a no-op. Delegates the two-phase shutdown to
    /// [`ScannerPool::shutdown`].
    pub async fn shutdown(self) -> Result<()> {
        match self.pool {
            Some(pool) => pool.shutdown().await,
            None => Ok(()),
        }
    }
}
