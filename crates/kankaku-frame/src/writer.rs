use std::io::{ErrorKind, Write};

use bytes::BytesMut;

use crate::codec::{
    encode_contact, encode_dimensions, ContactSample, DeviceDimensions, RECORD_SIZE,
};
use crate::error::{FrameError, Result};

/// Writes the touchpad wire format to any `Write` stream.
///
/// This is the daemon side of the channel: one header, then one record per
/// contact report. Each call writes whole frames before returning.
pub struct FrameWriter<T> {
    inner: T,
    buf: BytesMut,
}

impl<T: Write> FrameWriter<T> {
    pub fn new(inner: T) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(RECORD_SIZE * 64),
        }
    }

    /// Write the device header. Must be the first frame on the channel.
    pub fn write_dimensions(&mut self, dims: DeviceDimensions) -> Result<()> {
        self.buf.clear();
        encode_dimensions(dims, &mut self.buf);
        self.write_buffered()
    }

    /// Write one contact record.
    pub fn write_contact(&mut self, sample: &ContactSample) -> Result<()> {
        self.buf.clear();
        encode_contact(sample, &mut self.buf);
        self.write_buffered()
    }

    /// Write several contact records in one burst.
    pub fn write_contacts<'a>(
        &mut self,
        samples: impl IntoIterator<Item = &'a ContactSample>,
    ) -> Result<()> {
        self.buf.clear();
        for sample in samples {
            encode_contact(sample, &mut self.buf);
        }
        self.write_buffered()
    }

    fn write_buffered(&mut self) -> Result<()> {
        let mut offset = 0usize;
        while offset < self.buf.len() {
            match self.inner.write(&self.buf[offset..]) {
                Ok(0) => return Err(FrameError::ChannelClosed { discarded: 0 }),
                Ok(n) => offset += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if err.kind() == ErrorKind::BrokenPipe => {
                    return Err(FrameError::ChannelClosed { discarded: 0 })
                }
                Err(err) => return Err(FrameError::Io(err)),
            }
        }
        self.flush()
    }

    /// Flush the underlying stream.
    pub fn flush(&mut self) -> Result<()> {
        loop {
            match self.inner.flush() {
                Ok(()) => return Ok(()),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(FrameError::Io(err)),
            }
        }
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Consume the writer and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }
}
