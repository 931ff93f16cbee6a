use std::io;
use std::os::unix::fs::{FileTypeExt, MetadataExt, PermissionsExt};
use std::os::unix::net::{UnixListener, UnixStream};
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{Result, TransportError};
use crate::traits::IpcStream;

/// `sockaddr_un.sun_path` capacity: 108 bytes on Linux, 104 elsewhere.
#[cfg(target_os = "linux")]
const MAX_PATH_LEN: usize = 108;
#[cfg(not(target_os = "linux"))]
const MAX_PATH_LEN: usize = 104;

/// Unix domain socket channel.
///
/// The touchpad daemon (or `kankaku replay`) binds and accepts; the ink
/// client connects. The socket file is removed on `Drop` if it is still the
/// one this listener created.
pub struct UnixDomainSocket {
    listener: UnixListener,
    path: PathBuf,
    identity: (u64, u64),
}

impl UnixDomainSocket {
    /// Permission mode applied to the socket file.
    pub const SOCKET_MODE: u32 = 0o600;

    /// Bind and listen at `path`, replacing a stale socket left behind by a
    /// previous daemon. Regular files at `path` are never removed.
    pub fn bind(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let len = path.as_os_str().len();
        if len >= MAX_PATH_LEN {
            return Err(TransportError::PathTooLong {
                path,
                len,
                max: MAX_PATH_LEN,
            });
        }

        remove_stale_socket(&path).map_err(|source| bind_error(&path, source))?;

        let listener = UnixListener::bind(&path).map_err(|source| bind_error(&path, source))?;
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(Self::SOCKET_MODE))
            .map_err(|source| bind_error(&path, source))?;
        let meta = std::fs::symlink_metadata(&path).map_err(|source| bind_error(&path, source))?;

        info!(?path, "touchpad channel listening");
        Ok(Self {
            listener,
            path,
            identity: (meta.dev(), meta.ino()),
        })
    }

    /// Accept one client (blocking).
    pub fn accept(&self) -> Result<IpcStream> {
        let (stream, _addr) = self.listener.accept().map_err(TransportError::Accept)?;
        debug!(path = ?self.path, "accepted touchpad client");
        Ok(IpcStream::from_unix(stream))
    }

    /// Connect to a listening touchpad channel (blocking).
    pub fn connect(path: impl AsRef<Path>) -> Result<IpcStream> {
        let path = path.as_ref();
        let stream = UnixStream::connect(path).map_err(|source| TransportError::Connect {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(?path, "connected to touchpad channel");
        Ok(IpcStream::from_unix(stream))
    }

    /// The path this socket is bound to.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn still_ours(&self) -> bool {
        std::fs::symlink_metadata(&self.path)
            .map(|meta| {
                meta.file_type().is_socket() && (meta.dev(), meta.ino()) == self.identity
            })
            .unwrap_or(false)
    }
}

impl Drop for UnixDomainSocket {
    fn drop(&mut self) {
        if self.still_ours() {
            debug!(path = ?self.path, "removing socket file");
            let _ = std::fs::remove_file(&self.path);
        } else {
            debug!(path = ?self.path, "socket path replaced; leaving it alone");
        }
    }
}

fn remove_stale_socket(path: &Path) -> io::Result<()> {
    let meta = match std::fs::symlink_metadata(path) {
        Ok(meta) => meta,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(()),
        Err(err) => return Err(err),
    };
    if !meta.file_type().is_socket() {
        return Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            "existing path is not a unix socket",
        ));
    }
    debug!(?path, "removing stale socket");
    std::fs::remove_file(path)
}

fn bind_error(path: &Path, source: io::Error) -> TransportError {
    TransportError::Bind {
        path: path.to_path_buf(),
        source,
    }
}
