use std::io::{Read, Write};

use crate::error::Result;

/// A connected channel to or from the touchpad daemon. Implements Read + Write.
///
/// On Unix, this wraps a Unix domain socket stream.
/// On Windows, this wraps a named pipe client handle.
pub struct IpcStream {
    inner: IpcStreamInner,
}

enum IpcStreamInner {
    #[cfg(unix)]
    Unix(std::os::unix::net::UnixStream),
    #[cfg(windows)]
    Pipe(std::fs::File),
}

impl Read for IpcStream {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        match &mut self.inner {
            #[cfg(unix)]
            IpcStreamInner::Unix(stream) => stream.read(buf),
            #[cfg(windows)]
            IpcStreamInner::Pipe(file) => file.read(buf),
        }
    }
}

impl Write for IpcStream {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match &mut self.inner {
            #[cfg(unix)]
            IpcStreamInner::Unix(stream) => stream.write(buf),
            #[cfg(windows)]
            IpcStreamInner::Pipe(file) => file.write(buf),
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        match &mut self.inner {
            #[cfg(unix)]
            IpcStreamInner::Unix(stream) => stream.flush(),
            #[cfg(windows)]
            IpcStreamInner::Pipe(file) => file.flush(),
        }
    }
}

impl IpcStream {
    #[cfg(unix)]
    pub(crate) fn from_unix(stream: std::os::unix::net::UnixStream) -> Self {
        Self {
            inner: IpcStreamInner::Unix(stream),
        }
    }

    #[cfg(windows)]
    pub(crate) fn from_pipe(file: std::fs::File) -> Self {
        Self {
            inner: IpcStreamInner::Pipe(file),
        }
    }

    /// Set read timeout on the underlying stream.
    ///
    /// Named pipe handles opened as files have no read timeout; the call is
    /// accepted and ignored there, so reads stay fully blocking.
    pub fn set_read_timeout(&self, timeout: Option<std::time::Duration>) -> Result<()> {
        match &self.inner {
            #[cfg(unix)]
            IpcStreamInner::Unix(stream) => stream.set_read_timeout(timeout).map_err(Into::into),
            #[cfg(windows)]
            IpcStreamInner::Pipe(_) => {
                tracing::debug!(?timeout, "named pipe read timeout not supported; ignoring");
                Ok(())
            }
        }
    }

    /// Try to clone this stream (creates a new handle).
    pub fn try_clone(&self) -> Result<Self> {
        match &self.inner {
            #[cfg(unix)]
            IpcStreamInner::Unix(stream) => Ok(Self::from_unix(stream.try_clone()?)),
            #[cfg(windows)]
            IpcStreamInner::Pipe(file) => Ok(Self::from_pipe(file.try_clone()?)),
        }
    }
}

impl std::fmt::Debug for IpcStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.inner {
            #[cfg(unix)]
            IpcStreamInner::Unix(_) => f.debug_struct("IpcStream").field("type", &"unix").finish(),
            #[cfg(windows)]
            IpcStreamInner::Pipe(_) => f
                .debug_struct("IpcStream")
                .field("type", &"named-pipe")
                .finish(),
        }
    }
}
