//! MPEG-1 Layer III structural parsing.
//!
//! Everything the frame count rests on lives here:
//! - 4-byte header decode with the validity rules and length formula
//! - ID3v2 / ID3v1 tag boundaries
//! - the scan loop itself
//!
//! The module is pure and synchronous; concurrency, queueing and timeouts
//! belong to the layers above.

mod header;
mod scanner;
mod tags;

pub use header::{
    FrameHeader, BITRATE_KBPS, FRAME_HEADER_LEN, FRAME_SYNC, LAYER_III, SAMPLE_RATE_HZ,
    VERSION_MPEG1,
};
pub use scanner::count_frames;
pub use tags::{scan_end, scan_start, ID3V1_LEN, ID3V2_HEADER_LEN};
