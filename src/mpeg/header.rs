//! Frame header decoding.
//!
//! Every MPEG-1 Layer III frame opens with a 4-byte big-endian header:
//! ```text
//! ┌──────────┬─────────┬────────┬──────┬─────────┬────────┬─────────┬────────┐
//! │ Sync     │ Version │ Layer  │ Prot │ Bitrate │ Rate   │ Padding │ Rest   │
//! │ 11 bits  │ 2 bits  │ 2 bits │ 1 bit│ 4 bits  │ 2 bits │ 1 bit   │ 9 bits │
//! └──────────┴─────────┴────────┴──────┴─────────┴────────┴─────────┴────────┘
//! ```
//!
//! Only sync, version, layer, bitrate index, sample-rate index and padding
//! are interpreted. The protection bit and the trailing 9 bits (private,
//! channel mode, mode extension, copyright, original, emphasis) are ignored.

/// Frame header size in bytes (fixed, exactly 4).
pub const FRAME_HEADER_LEN: usize = 4;

/// Frame sync marker, all 11 bits set.
pub const FRAME_SYNC: u16 = 0x7FF;

/// Version code for MPEG Version 1.
pub const VERSION_MPEG1: u8 = 3;

/// Layer code for Layer III.
pub const LAYER_III: u8 = 1;

/// Bitrate in kbps by bitrate index, MPEG-1 Layer III.
///
/// Index 0 is free format and index 15 is reserved; both are carried as 0
/// and rejected before any lookup.
pub const BITRATE_KBPS: [u32; 16] = [
    0, 32, 40, 48, 56, 64, 80, 96, 112, 128, 160, 192, 224, 256, 320, 0,
];

/// Sample rate in Hz by sample-rate index, MPEG-1. Index 3 is reserved.
pub const SAMPLE_RATE_HZ: [u32; 4] = [44_100, 48_000, 32_000, 0];

/// Decoded header fields.
///
/// Any 4 bytes decode into one of these; whether they mark a real frame is
/// a separate question answered by [`FrameHeader::is_valid`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    /// Frame sync bits (a frame boundary carries all 11 set).
    pub sync: u16,
    /// MPEG audio version code (3 = Version 1).
    pub version: u8,
    /// Layer code (1 = Layer III).
    pub layer: u8,
    /// Index into [`BITRATE_KBPS`].
    pub bitrate_index: u8,
    /// Index into [`SAMPLE_RATE_HZ`].
    pub sample_rate_index: u8,
    /// Whether one extra byte pads the frame.
    pub padding: bool,
}

impl FrameHeader {
    /// Decode a header from the first 4 bytes of `buf` (Big Endian).
    ///
    /// Returns `None` if fewer than 4 bytes are available.
    ///
    /// # Example
    ///
    /// ```
    /// use framescan::mpeg::FrameHeader;
    ///
    /// // 64 kbps, 48 kHz, no padding.
    /// let header = FrameHeader::decode(&[0xFF, 0xFA, 0x54, 0x00]).unwrap();
    /// assert_eq!(header.sync, 0x7FF);
    /// assert_eq!(header.bitrate_index, 5);
    /// assert_eq!(header.frame_len(), Some(192));
    /// ```
    pub fn decode(buf: &[u8]) -> Option<Self> {
        if buf.len() < FRAME_HEADER_LEN {
            return None;
        }
        let word = u32::from_be_bytes([buf[0], buf[1], buf[2], buf[3]]);
        Some(Self::from_word(word))
    }

    /// Split a 32-bit header word into its fields.
    pub fn from_word(word: u32) -> Self {
        Self {
            sync: ((word >> 21) & 0x7FF) as u16,
            version: ((word >> 19) & 0b11) as u8,
            layer: ((word >> 17) & 0b11) as u8,
            bitrate_index: ((word >> 12) & 0xF) as u8,
            sample_rate_index: ((word >> 10) & 0b11) as u8,
            padding: (word >> 9) & 1 == 1,
        }
    }

    /// Check every validity rule for an MPEG-1 Layer III frame boundary.
    ///
    /// Rejects anything that is not MPEG Version 1 Layer III, including the
    /// reserved version code, free-format bitrate (index 0), reserved
    /// bitrate (index 15) and the reserved sample-rate index (3).
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.sync == FRAME_SYNC
            && self.version == VERSION_MPEG1
            && self.layer == LAYER_III
            && self.bitrate_index != 0
            && self.bitrate_index != 15
            && self.sample_rate_index != 3
    }

    /// Bitrate in bits per second, or `None` for free-format/reserved.
    #[inline]
    pub fn bitrate_bps(&self) -> Option<u32> {
        match self.bitrate_index {
            0 | 15 => None,
            idx => Some(BITRATE_KBPS[idx as usize] * 1000),
        }
    }

    /// Sample rate in Hz, or `None` for the reserved index.
    #[inline]
    pub fn sample_rate_hz(&self) -> Option<u32> {
        match self.sample_rate_index {
            3 => None,
            idx => Some(SAMPLE_RATE_HZ[idx as usize]),
        }
    }

    /// Total frame length in bytes, header included.
    ///
    /// Computed as `144 * bitrate_bps / sample_rate + padding` with the
    /// division truncating toward zero; 144 is 1152 samples per frame over
    /// 8 bits per byte. The truncation must stay exact or every later frame
    /// boundary in the buffer drifts.
    ///
    /// Returns `None` unless the header passes [`FrameHeader::is_valid`].
    pub fn frame_len(&self) -> Option<usize> {
        if !self.is_valid() {
            return None;
        }
        let bitrate = self.bitrate_bps()? as usize;
        let sample_rate = self.sample_rate_hz()? as usize;
        Some(144 * bitrate / sample_rate + usize::from(self.padding))
    }
}
