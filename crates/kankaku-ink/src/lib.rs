//! Touch-event classification and ink stroke tracking.
//!
//! Framed contact samples are folded into touch lifecycle events
//! (`Down`, `Move`, `Up`, or `Broken` for a release nobody saw go down) and
//! into ink strokes. Only one stroke is drawn at a time: the first contact
//! to land owns it until it lifts.

pub mod event;
pub mod pump;
pub mod session;
pub mod stroke;

pub use event::TouchEvent;
pub use pump::{open, pump, run, snapshot_channel, InkSink, SessionEnd, Snapshot, SnapshotSink};
pub use session::{Session, Update};
pub use stroke::Stroke;
