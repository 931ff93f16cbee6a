use std::io::IsTerminal;
use std::time::{SystemTime, UNIX_EPOCH};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use kankaku_frame::DeviceDimensions;
use kankaku_ink::{Session, SessionEnd, Stroke, TouchEvent};
use serde::Serialize;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
struct DimensionsOutput {
    kind: &'static str,
    width: u16,
    height: u16,
}

#[derive(Serialize)]
struct EventOutput {
    kind: &'static str,
    event: &'static str,
    contact_id: u8,
    on_surface: bool,
    x: u16,
    y: u16,
    stroke_points: Option<usize>,
    stroke_sealed: Option<bool>,
    timestamp: String,
}

#[derive(Serialize)]
struct StrokeOutput {
    contact_id: u8,
    points: usize,
    length: f64,
    sealed: bool,
}

#[derive(Serialize)]
struct SummaryOutput {
    kind: &'static str,
    width: u16,
    height: u16,
    end: &'static str,
    discarded_bytes: usize,
    anomalies: u64,
    active_contacts: usize,
    strokes: Vec<StrokeOutput>,
}

pub fn print_dimensions(dims: DeviceDimensions, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(&DimensionsOutput {
            kind: "device",
            width: dims.width,
            height: dims.height,
        }),
        OutputFormat::Table => {
            println!("device {}x{}", dims.width, dims.height);
            println!("{}", event_header());
        }
        OutputFormat::Pretty => {
            println!("device {}x{}", dims.width, dims.height);
        }
    }
}

pub fn print_update(event: &TouchEvent, stroke: Option<&Stroke>, format: OutputFormat) {
    let sample = event.sample();
    match format {
        OutputFormat::Json => print_json(&EventOutput {
            kind: "event",
            event: event.name(),
            contact_id: sample.contact_id,
            on_surface: sample.on_surface,
            x: sample.x,
            y: sample.y,
            stroke_points: stroke.map(Stroke::len),
            stroke_sealed: stroke.map(Stroke::is_sealed),
            timestamp: now_unix_millis(),
        }),
        OutputFormat::Table => println!("{}", event_row(event, stroke)),
        OutputFormat::Pretty => {
            println!(
                "{:<6} contact={} x={} y={} stroke={}",
                event.name(),
                sample.contact_id,
                sample.x,
                sample.y,
                stroke_label(stroke)
            );
        }
    }
}

pub fn print_summary(session: &Session, end: SessionEnd, format: OutputFormat) {
    let dims = session.dimensions();
    let (end_name, discarded) = match end {
        SessionEnd::Closed { discarded } => ("closed", discarded),
        SessionEnd::Stopped => ("stopped", 0),
    };

    match format {
        OutputFormat::Json => print_json(&SummaryOutput {
            kind: "summary",
            width: dims.width,
            height: dims.height,
            end: end_name,
            discarded_bytes: discarded,
            anomalies: session.anomalies(),
            active_contacts: session.active_contacts().count(),
            strokes: session
                .strokes()
                .iter()
                .map(|stroke| StrokeOutput {
                    contact_id: stroke.contact_id(),
                    points: stroke.len(),
                    length: (stroke.path_length() * 100.0).round() / 100.0,
                    sealed: stroke.is_sealed(),
                })
                .collect(),
        }),
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["#", "CONTACT", "POINTS", "LENGTH", "STATE"]);
            for (index, stroke) in session.strokes().iter().enumerate() {
                table.add_row(vec![
                    index.to_string(),
                    stroke.contact_id().to_string(),
                    stroke.len().to_string(),
                    format!("{:.1}", stroke.path_length()),
                    sealed_label(stroke).to_string(),
                ]);
            }
            println!("{table}");
            print_totals(session, end_name, discarded);
        }
        OutputFormat::Pretty => print_totals(session, end_name, discarded),
    }
}

fn print_totals(session: &Session, end_name: &str, discarded: usize) {
    let dims = session.dimensions();
    println!(
        "session {end_name}: device={}x{} strokes={} anomalies={} discarded_bytes={}",
        dims.width,
        dims.height,
        session.strokes().len(),
        session.anomalies(),
        discarded
    );
}

// Live events stream one row each under a header printed with the dimensions.
fn event_header() -> String {
    format!("{:<7} {:>7} {:>5} {:>5}  STROKE", "EVENT", "CONTACT", "X", "Y")
}

fn event_row(event: &TouchEvent, stroke: Option<&Stroke>) -> String {
    let sample = event.sample();
    format!(
        "{:<7} {:>7} {:>5} {:>5}  {}",
        event.name().to_uppercase(),
        sample.contact_id,
        sample.x,
        sample.y,
        stroke_label(stroke)
    )
}

fn stroke_label(stroke: Option<&Stroke>) -> String {
    match stroke {
        Some(stroke) => format!("{} pts ({})", stroke.len(), sealed_label(stroke)),
        None => "-".to_string(),
    }
}

fn sealed_label(stroke: &Stroke) -> &'static str {
    if stroke.is_sealed() {
        "sealed"
    } else {
        "drawing"
    }
}

fn print_json<T: Serialize>(value: &T) {
    println!(
        "{}",
        serde_json::to_string(value).unwrap_or_else(|_| "{}".to_string())
    );
}

fn now_unix_millis() -> String {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis().to_string())
        .unwrap_or_else(|_| "0".to_string())
}

#[cfg(test)]
mod tests {
    use kankaku_frame::ContactSample;

    use super::*;

    #[test]
    fn event_rows_line_up_with_header() {
        let header = event_header();
        let row = event_row(&TouchEvent::Move(ContactSample::new(12, true, 640, 7)), None);

        assert!(!row.contains('\n'));
        assert_eq!(header.find("STROKE"), row.rfind('-'));
        let contact_end = header.find("CONTACT").map(|i| i + "CONTACT".len());
        assert_eq!(contact_end, row.find("12").map(|i| i + 2));
        assert!(row.starts_with("MOVE "));
    }
}
