//! Touchpad ink client.
//!
//! kankaku reads the contact stream a touchpad daemon publishes over a local
//! pipe and turns it into touch events and ink strokes.
//!
//! # Crate Structure
//!
//! - [`transport`]: Byte sources over Unix domain sockets, named pipes or any reader
//! - [`frame`]: Fixed-size framing of the device header and contact records
//! - [`ink`]: Touch-event classification and single-stroke tracking

/// Re-export transport types.
pub mod transport {
    pub use kankaku_transport::*;
}

/// Re-export frame types.
pub mod frame {
    pub use kankaku_frame::*;
}

/// Re-export ink types.
pub mod ink {
    pub use kankaku_ink::*;
}
