use bytes::BytesMut;
use kankaku_transport::{ByteSource, ChannelError, IpcStream, ReadSource, TransportError};
use tracing::debug;

use crate::codec::{
    decode_contact, decode_dimensions, ContactSample, DeviceDimensions, FrameConfig,
    MAX_READ_CHUNK_SIZE,
};
use crate::error::{FrameError, Result};

const INITIAL_BUFFER_CAPACITY: usize = 4 * 1024;

/// Frames the touchpad stream from any [`ByteSource`].
///
/// Bytes are kept in a running buffer until they form a whole header or
/// record, so callers never see partial data. The header is read exactly
/// once; everything after it is a contact record.
pub struct FrameReader<S> {
    source: S,
    buf: BytesMut,
    config: FrameConfig,
    dimensions: Option<DeviceDimensions>,
}

impl<S: ByteSource> FrameReader<S> {
    /// Create a new frame reader with default configuration.
    pub fn new(source: S) -> Self {
        Self::with_config(source, FrameConfig::default())
    }

    /// Create a new frame reader with explicit configuration.
    pub fn with_config(source: S, mut config: FrameConfig) -> Self {
        config.read_chunk_size = config.read_chunk_size.clamp(1, MAX_READ_CHUNK_SIZE);
        Self {
            source,
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            config,
            dimensions: None,
        }
    }

    /// Read the device header (blocking), or return the one already read.
    ///
    /// Returns `Err(FrameError::ShortHeader)` if the channel closes first.
    pub fn read_dimensions(&mut self) -> Result<DeviceDimensions> {
        if let Some(dims) = self.dimensions {
            return Ok(dims);
        }

        loop {
            if let Some(dims) = decode_dimensions(&mut self.buf) {
                debug!(width = dims.width, height = dims.height, "device header framed");
                self.dimensions = Some(dims);
                return Ok(dims);
            }

            match self.fill() {
                Ok(_) => {}
                Err(FrameError::ChannelClosed { .. }) => {
                    return Err(FrameError::ShortHeader {
                        received: self.buf.len(),
                    })
                }
                Err(err) => return Err(err),
            }
        }
    }

    /// Read the next contact record (blocking), reading the header first if
    /// it has not been read yet.
    ///
    /// Returns `Err(FrameError::ChannelClosed)` when the channel ends.
    pub fn read_sample(&mut self) -> Result<ContactSample> {
        self.read_dimensions()?;
        loop {
            if let Some(sample) = decode_contact(&mut self.buf) {
                return Ok(sample);
            }
            self.fill()?;
        }
    }

    /// Take one record from already-buffered bytes without reading.
    ///
    /// Always `None` until the header has been read.
    pub fn next_buffered(&mut self) -> Option<ContactSample> {
        self.dimensions?;
        decode_contact(&mut self.buf)
    }

    /// Perform one channel read into the buffer.
    ///
    /// Returns the number of bytes added; zero means no data was available
    /// yet. On closure, an incomplete trailing record is discarded and its
    /// size reported in `ChannelClosed`.
    pub fn fill(&mut self) -> Result<usize> {
        match self.source.read(self.config.read_chunk_size) {
            Ok(chunk) => {
                self.buf.extend_from_slice(&chunk);
                Ok(chunk.len())
            }
            Err(ChannelError::Closed) => {
                if self.dimensions.is_none() {
                    return Err(FrameError::ChannelClosed { discarded: 0 });
                }
                let discarded = self.buf.len();
                if discarded > 0 {
                    debug!(discarded, "discarding trailing partial record");
                    self.buf.clear();
                }
                Err(FrameError::ChannelClosed { discarded })
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Iterate over contact records until the channel closes.
    ///
    /// Closure ends the iteration; any other error is yielded once, after
    /// which the iterator is exhausted.
    pub fn samples(&mut self) -> Samples<'_, S> {
        Samples {
            reader: self,
            done: false,
        }
    }

    /// The device header, once it has been read.
    pub fn dimensions(&self) -> Option<DeviceDimensions> {
        self.dimensions
    }

    /// Bytes buffered but not yet framed.
    pub fn buffered_len(&self) -> usize {
        self.buf.len()
    }

    /// Current frame reader configuration.
    pub fn config(&self) -> &FrameConfig {
        &self.config
    }

    /// Borrow the underlying source.
    pub fn get_ref(&self) -> &S {
        &self.source
    }

    /// Mutably borrow the underlying source.
    pub fn get_mut(&mut self) -> &mut S {
        &mut self.source
    }

    /// Consume the reader and return the inner source.
    pub fn into_inner(self) -> S {
        self.source
    }
}

impl FrameReader<ReadSource<IpcStream>> {
    /// Create a frame reader for an `IpcStream` and apply the read timeout
    /// from config.
    pub fn from_ipc(stream: IpcStream, config: FrameConfig) -> Result<Self> {
        stream
            .set_read_timeout(config.read_timeout)
            .map_err(transport_to_frame_error)?;
        Ok(Self::with_config(ReadSource::new(stream), config))
    }
}

// Setting a socket option only fails with `TransportError::Io`.
fn transport_to_frame_error(err: TransportError) -> FrameError {
    match err {
        TransportError::Io(io) => FrameError::Io(io),
        other => FrameError::Io(std::io::Error::other(other)),
    }
}

/// Iterator returned by [`FrameReader::samples`].
pub struct Samples<'a, S> {
    reader: &'a mut FrameReader<S>,
    done: bool,
}

impl<S: ByteSource> Iterator for Samples<'_, S> {
    type Item = Result<ContactSample>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.reader.read_sample() {
            Ok(sample) => Some(Ok(sample)),
            Err(err) if err.is_closed() => {
                self.done = true;
                None
            }
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }
}
