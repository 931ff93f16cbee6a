//! Minimal ink client. Prints each stroke as it is sealed.
//!
//! Run with:
//!   cargo run --example ink-dump -- /tmp/kankaku.sock
//!
//! A daemon stand-in can be started from a capture:
//!   cargo run -- replay capture.bin /tmp/kankaku.sock --interval 8ms

use kankaku::frame::FrameReader;
use kankaku::ink::{run, InkSink, Session, SessionEnd, Stroke, TouchEvent};
use kankaku::transport::{connect, default_channel_path, ReadSource};

struct StrokePrinter;

impl InkSink for StrokePrinter {
    fn on_update(&mut self, event: &TouchEvent, stroke: Option<&Stroke>) {
        if let (TouchEvent::Up(_), Some(stroke)) = (event, stroke) {
            println!(
                "stroke by contact {}: {} points, {:.1} units long",
                stroke.contact_id(),
                stroke.len(),
                stroke.path_length()
            );
        }
    }

    fn on_batch(&mut self, session: &Session) {
        if let Some(stroke) = session.active_stroke() {
            eprintln!("drawing: {} points", stroke.len());
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let path = std::env::args_os()
        .nth(1)
        .map(Into::into)
        .unwrap_or_else(default_channel_path);

    let stream = connect(&path)?;
    eprintln!("Connected to {}", path.display());

    let mut reader = FrameReader::new(ReadSource::new(stream));
    let (session, end) = run(&mut reader, &mut StrokePrinter)?;

    let dims = session.dimensions();
    eprintln!(
        "{}x{} device, {} strokes, {} anomalies",
        dims.width,
        dims.height,
        session.strokes().len(),
        session.anomalies()
    );
    if let SessionEnd::Closed { discarded } = end {
        eprintln!("Channel closed ({discarded} trailing bytes dropped)");
    }
    Ok(())
}
