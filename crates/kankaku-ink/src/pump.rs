use std::sync::mpsc;

use kankaku_frame::{DeviceDimensions, FrameError, FrameReader, Result};
use kankaku_transport::ByteSource;
use tracing::{debug, info};

use crate::event::TouchEvent;
use crate::session::Session;
use crate::stroke::Stroke;

/// Receives the output of [`pump`].
pub trait InkSink {
    /// Called once with the device header, before any update.
    fn on_dimensions(&mut self, _dims: DeviceDimensions) {}

    /// Called for every emitted event, in arrival order.
    fn on_update(&mut self, event: &TouchEvent, stroke: Option<&Stroke>);

    /// Called after the buffered records have been drained, if ink changed.
    /// At most once per channel read; the natural place to redraw.
    fn on_batch(&mut self, _session: &Session) {}

    /// Polled after every update and before every read.
    fn keep_going(&self) -> bool {
        true
    }
}

/// Why [`pump`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// The channel closed. A trailing partial record of `discarded` bytes
    /// was dropped.
    Closed { discarded: usize },
    /// The sink asked to stop.
    Stopped,
}

/// Read the device header and start a session for it.
pub fn open<S: ByteSource>(reader: &mut FrameReader<S>) -> Result<Session> {
    let dims = reader.read_dimensions()?;
    info!(width = dims.width, height = dims.height, "touchpad session opened");
    Ok(Session::new(dims))
}

/// Drive `session` from `reader` until the channel closes or `sink` stops.
///
/// Every buffered record is classified before the channel is read again.
/// A short header or an I/O error is returned as `Err`.
pub fn pump<S, K>(
    reader: &mut FrameReader<S>,
    session: &mut Session,
    sink: &mut K,
) -> Result<SessionEnd>
where
    S: ByteSource,
    K: InkSink + ?Sized,
{
    reader.read_dimensions()?;

    loop {
        while let Some(sample) = reader.next_buffered() {
            if let Some(update) = session.apply(sample) {
                sink.on_update(&update.event, update.stroke);
            }
            if !sink.keep_going() {
                break;
            }
        }

        if session.take_dirty() {
            sink.on_batch(session);
        }
        if !sink.keep_going() {
            debug!("sink stopped the session");
            return Ok(SessionEnd::Stopped);
        }

        match reader.fill() {
            Ok(_) => {}
            Err(FrameError::ChannelClosed { discarded }) => {
                info!(
                    strokes = session.strokes().len(),
                    anomalies = session.anomalies(),
                    discarded,
                    "touchpad channel closed"
                );
                return Ok(SessionEnd::Closed { discarded });
            }
            Err(err) => return Err(err),
        }
    }
}

/// [`open`] then [`pump`], announcing the dimensions to `sink`.
pub fn run<S, K>(reader: &mut FrameReader<S>, sink: &mut K) -> Result<(Session, SessionEnd)>
where
    S: ByteSource,
    K: InkSink + ?Sized,
{
    let mut session = open(reader)?;
    sink.on_dimensions(session.dimensions());
    let end = pump(reader, &mut session, sink)?;
    Ok((session, end))
}

/// An owned copy of one update, for consumers on another thread.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub event: TouchEvent,
    pub stroke: Option<Stroke>,
}

/// Forwards every update as a [`Snapshot`] over an mpsc channel.
///
/// Stops the session once the receiver is dropped.
#[derive(Debug)]
pub struct SnapshotSink {
    tx: mpsc::Sender<Snapshot>,
    connected: bool,
}

impl InkSink for SnapshotSink {
    fn on_update(&mut self, event: &TouchEvent, stroke: Option<&Stroke>) {
        let snapshot = Snapshot {
            event: *event,
            stroke: stroke.cloned(),
        };
        if self.tx.send(snapshot).is_err() {
            debug!("snapshot receiver dropped");
            self.connected = false;
        }
    }

    fn keep_going(&self) -> bool {
        self.connected
    }
}

/// Create a [`SnapshotSink`] and the receiver for its snapshots.
pub fn snapshot_channel() -> (SnapshotSink, mpsc::Receiver<Snapshot>) {
    let (tx, rx) = mpsc::channel();
    (
        SnapshotSink {
            tx,
            connected: true,
        },
        rx,
    )
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use bytes::Bytes;
    use kankaku_frame::ContactSample;
    use kankaku_transport::ChannelError;

    use super::*;

    const HEADER: [u8; 4] = [0x80, 0x02, 0xE0, 0x01];

    struct Chunked {
        chunks: VecDeque<Vec<u8>>,
    }

    impl ByteSource for Chunked {
        fn read(&mut self, _max_len: usize) -> std::result::Result<Bytes, ChannelError> {
            self.chunks
                .pop_front()
                .map(Bytes::from)
                .ok_or(ChannelError::Closed)
        }
    }

    fn reader(chunks: Vec<Vec<u8>>) -> FrameReader<Chunked> {
        FrameReader::new(Chunked {
            chunks: chunks.into(),
        })
    }

    #[derive(Default)]
    struct Recorder {
        dims: Option<DeviceDimensions>,
        events: Vec<TouchEvent>,
        drawn: Vec<Option<usize>>,
        batches: usize,
        limit: Option<usize>,
    }

    impl InkSink for Recorder {
        fn on_dimensions(&mut self, dims: DeviceDimensions) {
            self.dims = Some(dims);
        }

        fn on_update(&mut self, event: &TouchEvent, stroke: Option<&Stroke>) {
            self.events.push(*event);
            self.drawn.push(stroke.map(Stroke::len));
        }

        fn on_batch(&mut self, _session: &Session) {
            self.batches += 1;
        }

        fn keep_going(&self) -> bool {
            self.limit.is_none_or(|limit| self.events.len() < limit)
        }
    }

    #[test]
    fn end_to_end_down_move_up() {
        let mut bytes = HEADER.to_vec();
        bytes.extend_from_slice(&[0x01, 0x01, 0x64, 0x00, 0x64, 0x00]);
        bytes.extend_from_slice(&[0x01, 0x01, 0x6E, 0x00, 0x64, 0x00]);
        bytes.extend_from_slice(&[0x01, 0x00, 0x6E, 0x00, 0x64, 0x00]);

        let mut sink = Recorder::default();
        let (session, end) = run(&mut reader(vec![bytes]), &mut sink).unwrap();

        assert_eq!(end, SessionEnd::Closed { discarded: 0 });
        assert_eq!(
            sink.dims,
            Some(DeviceDimensions {
                width: 640,
                height: 480
            })
        );
        assert_eq!(
            sink.events,
            vec![
                TouchEvent::Down(ContactSample::new(1, true, 100, 100)),
                TouchEvent::Move(ContactSample::new(1, true, 110, 100)),
                TouchEvent::Up(ContactSample::new(1, false, 110, 100)),
            ]
        );
        assert_eq!(sink.drawn, vec![Some(1), Some(2), Some(2)]);
        assert_eq!(session.strokes().len(), 1);
        assert!(session.strokes()[0].is_sealed());
        assert_eq!(sink.batches, 1, "one read, one redraw");
    }

    #[test]
    fn lone_release_is_broken() {
        let mut bytes = HEADER.to_vec();
        bytes.extend_from_slice(&[0x02, 0x00, 0x0A, 0x00, 0x0A, 0x00]);

        let mut sink = Recorder::default();
        let (session, _) = run(&mut reader(vec![bytes]), &mut sink).unwrap();

        assert_eq!(
            sink.events,
            vec![TouchEvent::Broken(ContactSample::new(2, false, 10, 10))]
        );
        assert!(session.strokes().is_empty());
        assert_eq!(session.active_contacts().count(), 0);
        assert_eq!(sink.batches, 0);
    }

    #[test]
    fn one_batch_per_read_with_ink() {
        let chunks = vec![
            HEADER.to_vec(),
            vec![0x01, 0x01, 0x01, 0x00, 0x01, 0x00, 0x01, 0x01, 0x02, 0x00],
            vec![0x02, 0x00],
            vec![0x01, 0x01, 0x02, 0x00, 0x02, 0x00],
            vec![0x01, 0x00, 0x03, 0x00, 0x03, 0x00],
        ];

        let mut sink = Recorder::default();
        let (session, _) = run(&mut reader(chunks), &mut sink).unwrap();

        assert_eq!(sink.events.len(), 3, "the repeated position is dropped");
        assert_eq!(sink.batches, 3);
        assert_eq!(session.strokes()[0].len(), 3);
    }

    #[test]
    fn trailing_bytes_reported_on_close() {
        let mut bytes = HEADER.to_vec();
        bytes.extend_from_slice(&[0x01, 0x01, 0x64, 0x00]);

        let mut sink = Recorder::default();
        let (_, end) = run(&mut reader(vec![bytes]), &mut sink).unwrap();

        assert_eq!(end, SessionEnd::Closed { discarded: 4 });
        assert!(sink.events.is_empty());
    }

    #[test]
    fn short_header_is_an_error() {
        let mut sink = Recorder::default();
        let err = run(&mut reader(vec![vec![0x80, 0x02]]), &mut sink).unwrap_err();

        assert!(matches!(err, FrameError::ShortHeader { received: 2 }));
        assert!(sink.dims.is_none());
    }

    #[test]
    fn sink_can_stop_mid_batch() {
        let mut bytes = HEADER.to_vec();
        for x in 0..5u8 {
            bytes.extend_from_slice(&[0x01, 0x01, x, 0x00, 0x00, 0x00]);
        }

        let mut sink = Recorder {
            limit: Some(2),
            ..Recorder::default()
        };
        let mut reader = reader(vec![bytes]);
        let (session, end) = run(&mut reader, &mut sink).unwrap();

        assert_eq!(end, SessionEnd::Stopped);
        assert_eq!(sink.events.len(), 2);
        assert_eq!(session.strokes()[0].len(), 2);
        assert_eq!(reader.buffered_len(), 18);
    }

    #[test]
    fn snapshots_cross_threads() {
        let mut bytes = HEADER.to_vec();
        bytes.extend_from_slice(&[0x05, 0x01, 0x0A, 0x00, 0x0A, 0x00]);
        bytes.extend_from_slice(&[0x05, 0x01, 0x0B, 0x00, 0x0A, 0x00]);
        bytes.extend_from_slice(&[0x05, 0x00, 0x0C, 0x00, 0x0A, 0x00]);

        let (mut sink, rx) = snapshot_channel();
        let consumer = std::thread::spawn(move || rx.iter().collect::<Vec<Snapshot>>());

        let (_, end) = run(&mut reader(vec![bytes]), &mut sink).unwrap();
        assert!(matches!(end, SessionEnd::Closed { .. }));
        drop(sink);

        let snapshots = consumer.join().unwrap();
        assert_eq!(snapshots.len(), 3);
        let last = snapshots[2].stroke.as_ref().unwrap();
        assert!(last.is_sealed());
        assert_eq!(last.len(), 3);
        assert!(!snapshots[1].stroke.as_ref().unwrap().is_sealed());
    }

    #[test]
    fn dropped_receiver_stops_session() {
        let mut bytes = HEADER.to_vec();
        bytes.extend_from_slice(&[0x05, 0x01, 0x0A, 0x00, 0x0A, 0x00]);

        let (mut sink, rx) = snapshot_channel();
        drop(rx);

        let (_, end) = run(&mut reader(vec![bytes]), &mut sink).unwrap();
        assert_eq!(end, SessionEnd::Stopped);
    }
}
