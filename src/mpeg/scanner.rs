//! The frame-counting scan loop.

use super::header::{FrameHeader, FRAME_HEADER_LEN};
use super::tags::{scan_end, scan_start};

/// Count the complete, valid MPEG-1 Layer III frames in `data`.
///
/// Pure and total: any byte content yields a count, with malformed or
/// non-MP3 input reporting 0 rather than failing. Leading ID3v2 and
/// trailing ID3v1 blocks are excluded from the scan. On an invalid header
/// the cursor moves one byte and resynchronizes; on a valid one it jumps
/// the whole frame. A final frame whose end reaches or passes the scan
/// boundary is treated as truncated and never counted.
///
/// # Example
///
/// ```
/// use framescan::mpeg::count_frames;
///
/// assert_eq!(count_frames(&[]), 0);
/// assert_eq!(count_frames(b"not an mp3 at all"), 0);
///
/// // One 192-byte frame (64 kbps, 48 kHz) with room after it.
/// let mut buf = vec![0xFF, 0xFA, 0x54, 0x00];
/// buf.resize(192 + 8, 0);
/// assert_eq!(count_frames(&buf), 1);
/// ```
pub fn count_frames(data: &[u8]) -> usize {
    let end = scan_end(data);
    let mut pos = scan_start(data);
    let mut frames = 0usize;

    // Strict guard: more than a bare header must remain, and a start
    // position past the buffer (lying ID3v2 size) falls through here
    // without any clamping.
    while pos + FRAME_HEADER_LEN < end {
        let Some(header) = FrameHeader::decode(&data[pos..end]) else {
            // Unreachable under the guard; a bounds miss during decode
            // means the buffer is not parseable as frames at all.
            return 0;
        };
        let Some(len) = header.frame_len() else {
            pos += 1;
            continue;
        };
        let next = pos + len;
        if next >= end {
            // Truncated trailing frame.
            break;
        }
        frames += 1;
        pos = next;
    }

    frames
}
