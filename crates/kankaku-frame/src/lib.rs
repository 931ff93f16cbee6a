//! Fixed-size framing of the kankaku touchpad wire format.
//!
//! The daemon writes one header, then contact records back to back:
//! - A 4-byte header: device width and height, both little-endian `u16`
//! - 6-byte records: contact id, on-surface flag, x and y (little-endian `u16`)
//!
//! There is no record count, checksum or terminator. [`FrameReader`] keeps a
//! running buffer so callers always get whole records, however the channel
//! fragments them.

pub mod codec;
pub mod error;
pub mod reader;
pub mod writer;

pub use codec::{
    decode_contact, decode_dimensions, encode_contact, encode_dimensions, ContactSample,
    DeviceDimensions, FrameConfig, DEFAULT_READ_CHUNK_SIZE, HEADER_SIZE, MAX_READ_CHUNK_SIZE,
    RECORD_SIZE,
};
pub use error::{FrameError, Result};
pub use reader::{FrameReader, Samples};
pub use writer::FrameWriter;
