use kankaku_transport::ChannelError;

/// Errors that can occur while framing the touchpad stream.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The channel closed before the 4-byte device header was complete.
    #[error("channel closed before device header ({received} of 4 bytes received)")]
    ShortHeader { received: usize },

    /// The channel closed. `discarded` trailing bytes never formed a record.
    #[error("channel closed ({discarded} trailing bytes discarded)")]
    ChannelClosed { discarded: usize },

    /// An I/O error occurred while reading or writing the channel.
    #[error("frame I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl FrameError {
    /// True for the orderly end of a session.
    pub fn is_closed(&self) -> bool {
        matches!(self, FrameError::ChannelClosed { .. })
    }
}

impl From<ChannelError> for FrameError {
    fn from(err: ChannelError) -> Self {
        match err {
            ChannelError::Closed => FrameError::ChannelClosed { discarded: 0 },
            ChannelError::Io(io) => FrameError::Io(io),
        }
    }
}

pub type Result<T> = std::result::Result<T, FrameError>;
