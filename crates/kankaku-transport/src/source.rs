use std::io::{ErrorKind, Read};

use bytes::Bytes;

use crate::error::ChannelError;

/// A blocking source of raw channel bytes.
///
/// `read` returns at most `max_len` bytes. An empty successful read means
/// "no data yet", never end of stream: the end of the stream is always
/// reported as [`ChannelError::Closed`].
pub trait ByteSource {
    fn read(&mut self, max_len: usize) -> Result<Bytes, ChannelError>;
}

impl<S: ByteSource + ?Sized> ByteSource for &mut S {
    fn read(&mut self, max_len: usize) -> Result<Bytes, ChannelError> {
        (**self).read(max_len)
    }
}

impl<S: ByteSource + ?Sized> ByteSource for Box<S> {
    fn read(&mut self, max_len: usize) -> Result<Bytes, ChannelError> {
        (**self).read(max_len)
    }
}

/// Adapts any [`Read`] into a [`ByteSource`].
///
/// `Ok(0)` and broken-pipe style errors close the channel, `Interrupted` is
/// retried, and read timeouts surface as an empty read.
#[derive(Debug)]
pub struct ReadSource<R> {
    inner: R,
    scratch: Vec<u8>,
}

impl<R: Read> ReadSource<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            scratch: Vec::new(),
        }
    }

    /// Borrow the underlying reader.
    pub fn get_ref(&self) -> &R {
        &self.inner
    }

    /// Mutably borrow the underlying reader.
    pub fn get_mut(&mut self) -> &mut R {
        &mut self.inner
    }

    /// Consume the adapter and return the inner reader.
    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read> ByteSource for ReadSource<R> {
    fn read(&mut self, max_len: usize) -> Result<Bytes, ChannelError> {
        if max_len == 0 {
            return Ok(Bytes::new());
        }
        if self.scratch.len() < max_len {
            self.scratch.resize(max_len, 0);
        }

        loop {
            match self.inner.read(&mut self.scratch[..max_len]) {
                Ok(0) => return Err(ChannelError::Closed),
                Ok(n) => return Ok(Bytes::copy_from_slice(&self.scratch[..n])),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if is_timeout(err.kind()) => return Ok(Bytes::new()),
                Err(err) if is_closed(err.kind()) => return Err(ChannelError::Closed),
                Err(err) => return Err(ChannelError::Io(err)),
            }
        }
    }
}

fn is_timeout(kind: ErrorKind) -> bool {
    matches!(kind, ErrorKind::WouldBlock | ErrorKind::TimedOut)
}

fn is_closed(kind: ErrorKind) -> bool {
    matches!(
        kind,
        ErrorKind::BrokenPipe
            | ErrorKind::UnexpectedEof
            | ErrorKind::ConnectionReset
            | ErrorKind::ConnectionAborted
    )
}
