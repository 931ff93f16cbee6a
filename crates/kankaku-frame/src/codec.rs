use std::time::Duration;

use bytes::{Buf, BufMut, BytesMut};

/// Device header: width (2) + height (2) = 4 bytes.
pub const HEADER_SIZE: usize = 4;

/// Contact record: id (1) + on-surface (1) + x (2) + y (2) = 6 bytes.
pub const RECORD_SIZE: usize = 6;

/// Bytes requested from the channel per read.
pub const DEFAULT_READ_CHUNK_SIZE: usize = 1024;

/// Upper bound on `FrameConfig::read_chunk_size`.
pub const MAX_READ_CHUNK_SIZE: usize = 64 * 1024;

/// Touchpad surface size, announced once at the start of the stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeviceDimensions {
    pub width: u16,
    pub height: u16,
}

/// One framed contact report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContactSample {
    pub contact_id: u8,
    pub on_surface: bool,
    pub x: u16,
    pub y: u16,
}

impl ContactSample {
    pub fn new(contact_id: u8, on_surface: bool, x: u16, y: u16) -> Self {
        Self {
            contact_id,
            on_surface,
            x,
            y,
        }
    }

    /// True when both samples report the same position.
    pub fn same_position(&self, other: &ContactSample) -> bool {
        self.x == other.x && self.y == other.y
    }
}

/// Frame reader configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameConfig {
    /// Maximum bytes requested from the channel per read, clamped to
    /// `1..=MAX_READ_CHUNK_SIZE` by the reader.
    pub read_chunk_size: usize,
    /// Read timeout applied to `IpcStream` channels. A timed-out read counts
    /// as "no data yet".
    pub read_timeout: Option<Duration>,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            read_chunk_size: DEFAULT_READ_CHUNK_SIZE,
            read_timeout: None,
        }
    }
}

/// Encode the device header.
///
/// Wire format:
/// ```text
/// ┌──────────────┬──────────────┐
/// │ Width (2B LE)│Height (2B LE)│
/// └──────────────┴──────────────┘
/// ```
pub fn encode_dimensions(dims: DeviceDimensions, dst: &mut BytesMut) {
    dst.reserve(HEADER_SIZE);
    dst.put_u16_le(dims.width);
    dst.put_u16_le(dims.height);
}

/// Encode one contact record.
///
/// Wire format:
/// ```text
/// ┌────────┬────────────┬─────────┬─────────┐
/// │ Id (1B)│ OnSurf (1B)│ X (2B LE)│ Y (2B LE)│
/// └────────┴────────────┴─────────┴─────────┘
/// ```
pub fn encode_contact(sample: &ContactSample, dst: &mut BytesMut) {
    dst.reserve(RECORD_SIZE);
    dst.put_u8(sample.contact_id);
    dst.put_u8(u8::from(sample.on_surface));
    dst.put_u16_le(sample.x);
    dst.put_u16_le(sample.y);
}

/// Decode the device header from a buffer.
///
/// Returns `None` until at least [`HEADER_SIZE`] bytes are buffered; a short
/// buffer is left untouched. On success, consumes the header bytes.
pub fn decode_dimensions(src: &mut BytesMut) -> Option<DeviceDimensions> {
    if src.len() < HEADER_SIZE {
        return None;
    }
    let width = src.get_u16_le();
    let height = src.get_u16_le();
    Some(DeviceDimensions { width, height })
}

/// Decode one contact record from a buffer.
///
/// Returns `None` if the buffer doesn't hold a complete record yet. Any
/// non-zero on-surface byte means the contact is touching.
pub fn decode_contact(src: &mut BytesMut) -> Option<ContactSample> {
    if src.len() < RECORD_SIZE {
        return None;
    }
    let contact_id = src.get_u8();
    let on_surface = src.get_u8() != 0;
    let x = src.get_u16_le();
    let y = src.get_u16_le();
    Some(ContactSample {
        contact_id,
        on_surface,
        x,
        y,
    })
}
