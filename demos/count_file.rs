//! Count frames in a file - direct execution example.
//!
//! This example demonstrates:
//! - Building an analyzer with the builder pattern
//! - Wrapping file contents as an upload
//! - Printing the report the way an embedding service would encode it
//!
//! # Running
//!
//! ```sh
//! cargo run --example count_file -- path/to/song.mp3
//! ```

use framescan::{Analyzer, Upload};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let path = std::env::args()
        .nth(1)
        .ok_or("usage: count_file <file.mp3>")?;

    let data = tokio::fs::read(&path).await?;

    // Direct execution: the scan runs inline in this task.
    let analyzer = Analyzer::builder().build();

    let upload = Upload::new(data).with_name(path);
    let report = analyzer.analyze(upload).await?;

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
