//! Pooled analysis - bounded concurrency example.
//!
//! This example demonstrates:
//! - Spawning an analyzer around an owned scanner pool
//! - Submitting a batch of uploads concurrently
//! - Capacity rejection when the pool is saturated
//! - Orderly two-phase shutdown
//!
//! # Running
//!
//! ```sh
//! RUST_LOG=framescan=debug cargo run --example pooled_service
//! ```

use std::sync::Arc;
use std::time::Duration;

use framescan::mpeg::FrameHeader;
use framescan::{Analyzer, FramescanError, PoolConfig, Upload};

/// Build a synthetic buffer holding `n` valid frames.
fn synthetic_song(n: usize) -> Vec<u8> {
    // 64 kbps at 48 kHz, 192 bytes per frame.
    let word: u32 = (0x7FF << 21) | (3 << 19) | (1 << 17) | (5 << 12) | (1 << 10);
    let len = FrameHeader::from_word(word).frame_len().unwrap_or(192);
    let mut buf = Vec::new();
    for _ in 0..n {
        buf.extend_from_slice(&word.to_be_bytes());
        buf.resize(buf.len() + len - 4, 0);
    }
    buf.extend_from_slice(&[0u8; 8]);
    buf
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    // Small pool on purpose: two concurrent scans, a short queue.
    let analyzer = Arc::new(
        Analyzer::builder()
            .pooled(PoolConfig {
                workers: 2,
                queue_capacity: 8,
                scan_timeout: Duration::from_secs(5),
                shutdown_grace: Duration::from_secs(2),
            })
            .build(),
    );

    // Submit a batch concurrently.
    let mut tasks = Vec::new();
    for i in 0..10usize {
        let analyzer = analyzer.clone();
        tasks.push(tokio::spawn(async move {
            let upload = Upload::new(synthetic_song(i * 100)).with_name(format!("clip_{}.mp3", i));
            (i, analyzer.analyze(upload).await)
        }));
    }

    for task in tasks {
        let (i, outcome) = task.await?;
        match outcome {
            Ok(report) => println!(
                "clip_{}: {} frames in {} bytes",
                i, report.frames, report.bytes_scanned
            ),
            Err(FramescanError::Busy) => println!("clip_{}: rejected, pool saturated", i),
            Err(e) => println!("clip_{}: failed: {}", i, e),
        }
    }

    // Phase one stops intake, phase two drains and stops the pool.
    let analyzer = Arc::into_inner(analyzer).ok_or("analyzer still shared")?;
    analyzer.shutdown().await?;
    println!("pool drained and stopped");
    Ok(())
}
