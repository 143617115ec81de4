//! # framescan
//!
//! MPEG-1 Layer III frame counting for in-memory uploads.
//!
//! The core is a pure scanner: give it a byte buffer, get back the number
//! of complete valid audio frames it holds. Around it sit the pieces a
//! service embedding the scanner needs: an upload intake gate, an
//! injectable execution seam, and a bounded scanner pool with timeouts
//! and two-phase shutdown.
//!
//! ## Architecture
//!
//! - **Core** ([`mpeg`]): header decode, tag boundaries, the scan loop.
//!   Pure, synchronous, total over any byte content.
//! - **Surface** ([`intake`], [`executor`], [`pool`], [`Analyzer`]):
//!   upload checks, direct or pooled dispatch, bounded concurrency,
//!   explicit teardown.
//!
//! ## Example
//!
//! ```
//! use framescan::{Analyzer, PoolConfig, Upload};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> framescan::Result<()> {
//! let analyzer = Analyzer::builder()
//!     .max_bytes(32 * 1024 * 1024)
//!     .pooled(PoolConfig::default())
//!     .build();
//!
//! let upload = Upload::new(&b"not really audio"[..]).with_name("take.mp3");
//! let report = analyzer.analyze(upload).await?;
//! assert_eq!(report.frames, 0);
//!
//! analyzer.shutdown().await?;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod executor;
pub mod intake;
pub mod mpeg;
pub mod pool;

mod analyzer;

pub use analyzer::{Analyzer, AnalyzerBuilder, ScanReport};
pub use error::{FramescanError, Result};
pub use executor::{DirectExecutor, PooledExecutor, ScanExecutor};
pub use intake::{IntakeConfig, Upload};
pub use mpeg::count_frames;
pub use pool::{PoolConfig, PoolHandle, ScannerPool};
