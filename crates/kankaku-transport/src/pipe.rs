use std::path::Path;

use tracing::debug;

use crate::error::{Result, TransportError};
use crate::traits::IpcStream;

/// Name of the pipe the Windows touchpad daemon creates.
pub const DEFAULT_PIPE_NAME: &str = r"\\.\pipe\kankaku";

/// Client side of a Windows named pipe.
///
/// The daemon owns the pipe server; a client only needs a read handle, which
/// the standard library opens like any other file.
pub struct NamedPipe;

impl NamedPipe {
    /// Open an existing pipe for reading (blocking reads).
    pub fn connect(path: impl AsRef<Path>) -> Result<IpcStream> {
        let path = path.as_ref();
        let file = std::fs::OpenOptions::new()
            .read(true)
            .open(path)
            .map_err(|source| TransportError::Connect {
                path: path.to_path_buf(),
                source,
            })?;
        debug!(?path, "connected to touchpad pipe");
        Ok(IpcStream::from_pipe(file))
    }
}
