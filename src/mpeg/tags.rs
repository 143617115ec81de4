//! Metadata tag boundaries.
//!
//! Two non-audio blocks have to be excluded from frame scanning: an
//! optional ID3v2 block at the start of the file (10-byte header plus a
//! declared body length) and an optional legacy ID3v1 block occupying the
//! final 128 bytes. Neither is parsed beyond what locating the audio
//! region requires.

/// ID3v2 header size: "ID3", two version bytes, one flags byte, 4 size bytes.
pub const ID3V2_HEADER_LEN: usize = 10;

/// ID3v1 block size, fixed.
pub const ID3V1_LEN: usize = 128;

/// Offset where frame scanning starts.
///
/// A buffer opening with `"ID3"` and a complete 10-byte tag header skips
/// the tag: its size field at bytes 6..10 is a synchsafe integer (low 7
/// bits of each byte, 28 significant bits total, chosen so the size can
/// never look like a frame sync), and the audio begins at `10 + size`.
/// The declared size is not clamped to the buffer; a lying tag pushes the
/// start past the end and the scan sees no room to work in.
pub fn scan_start(buf: &[u8]) -> usize {
    if buf.len() < ID3V2_HEADER_LEN || !buf.starts_with(b"ID3") {
        return 0;
    }
    let size = (buf[6] as usize & 0x7F) << 21
        | (buf[7] as usize & 0x7F) << 14
        | (buf[8] as usize & 0x7F) << 7
        | (buf[9] as usize & 0x7F);
    ID3V2_HEADER_LEN + size
}

/// Offset where frame scanning ends (exclusive).
///
/// A buffer of at least 128 bytes whose final 128 open with `"TAG"` has an
/// ID3v1 block there; scanning stops short of it. A corrupted marker means
/// those bytes are scanned as ordinary data.
pub fn scan_end(buf: &[u8]) -> usize {
    if buf.len() >= ID3V1_LEN && buf[buf.len() - ID3V1_LEN..].starts_with(b"TAG") {
        buf.len() - ID3V1_LEN
    } else {
        buf.len()
    }
}
