//! Byte sources for the kankaku touchpad channel.
//!
//! The touchpad daemon publishes contact data over a local IPC channel:
//! - Unix domain sockets (Linux/macOS)
//! - Named pipes (Windows, `\\.\pipe\kankaku`)
//!
//! This is the lowest layer of kankaku. The framer only ever sees the
//! [`ByteSource`] trait; [`ReadSource`] adapts any [`std::io::Read`] to it.

pub mod error;
pub mod source;
pub mod traits;

#[cfg(windows)]
pub mod pipe;
#[cfg(unix)]
pub mod uds;

use std::path::{Path, PathBuf};

pub use error::{ChannelError, Result, TransportError};
pub use source::{ByteSource, ReadSource};
pub use traits::IpcStream;

#[cfg(windows)]
pub use pipe::NamedPipe;
#[cfg(unix)]
pub use uds::UnixDomainSocket;

/// Open a client connection to the daemon channel at `path` (blocking).
pub fn connect(path: impl AsRef<Path>) -> Result<IpcStream> {
    #[cfg(unix)]
    {
        UnixDomainSocket::connect(path)
    }
    #[cfg(windows)]
    {
        NamedPipe::connect(path)
    }
}

/// Channel path the daemon listens on when none is given.
pub fn default_channel_path() -> PathBuf {
    #[cfg(windows)]
    {
        PathBuf::from(pipe::DEFAULT_PIPE_NAME)
    }
    #[cfg(not(windows))]
    {
        std::env::temp_dir().join("kankaku.sock")
    }
}
