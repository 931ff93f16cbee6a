use std::collections::HashMap;

use kankaku_frame::{ContactSample, DeviceDimensions};
use tracing::{debug, trace, warn};

use crate::event::TouchEvent;
use crate::stroke::Stroke;

/// Result of applying one sample: the event, and the drawn stroke it touched.
#[derive(Debug, Clone, Copy)]
pub struct Update<'a> {
    pub event: TouchEvent,
    /// The stroke this event started, extended or sealed. `None` for contacts
    /// that are tracked but not drawn, and for `Broken` events.
    pub stroke: Option<&'a Stroke>,
}

/// Classifier and stroke tracker state for one channel session.
///
/// Owned by the caller; samples must be applied in arrival order.
#[derive(Debug, Clone)]
pub struct Session {
    dimensions: DeviceDimensions,
    last_contacts: HashMap<u8, ContactSample>,
    tracking_id: Option<u8>,
    strokes: Vec<Stroke>,
    anomalies: u64,
    dirty: bool,
}

impl Session {
    pub fn new(dimensions: DeviceDimensions) -> Self {
        Self {
            dimensions,
            last_contacts: HashMap::new(),
            tracking_id: None,
            strokes: Vec::new(),
            anomalies: 0,
            dirty: false,
        }
    }

    /// Classify `sample` and fold it into the session.
    ///
    /// Returns `None` only when a landed contact reports the position it was
    /// already at; such samples change nothing.
    pub fn apply(&mut self, sample: ContactSample) -> Option<Update<'_>> {
        let id = sample.contact_id;
        let previous = self.last_contacts.get(&id).copied();

        let (event, drawn) = match (previous, sample.on_surface) {
            (Some(last), true) => {
                if last.same_position(&sample) {
                    trace!(contact_id = id, x = sample.x, y = sample.y, "duplicate move dropped");
                    return None;
                }
                self.last_contacts.insert(id, sample);
                (TouchEvent::Move(sample), self.extend_active(sample))
            }
            (Some(_), false) => {
                self.last_contacts.remove(&id);
                let drawn = self.extend_active(sample);
                if drawn {
                    self.seal_active();
                }
                (TouchEvent::Up(sample), drawn)
            }
            (None, true) => {
                self.last_contacts.insert(id, sample);
                (TouchEvent::Down(sample), self.begin_stroke(sample))
            }
            (None, false) => {
                self.anomalies += 1;
                warn!(
                    contact_id = id,
                    x = sample.x,
                    y = sample.y,
                    anomalies = self.anomalies,
                    "release for a contact that never landed"
                );
                (TouchEvent::Broken(sample), false)
            }
        };

        Some(Update {
            event,
            stroke: if drawn { self.strokes.last() } else { None },
        })
    }

    fn begin_stroke(&mut self, seed: ContactSample) -> bool {
        if let Some(owner) = self.tracking_id {
            debug!(
                contact_id = seed.contact_id,
                owner, "contact landed while another stroke is active; not drawn"
            );
            return false;
        }
        self.tracking_id = Some(seed.contact_id);
        self.strokes.push(Stroke::begin(seed));
        self.dirty = true;
        true
    }

    /// Extends the active stroke if `sample` belongs to its owner. Returns
    /// whether the sample's contact owns the active stroke.
    fn extend_active(&mut self, sample: ContactSample) -> bool {
        if self.tracking_id != Some(sample.contact_id) {
            return false;
        }
        // The owner's stroke is always the newest one.
        if let Some(stroke) = self.strokes.last_mut() {
            if stroke.extend(sample) {
                self.dirty = true;
            }
        }
        true
    }

    fn seal_active(&mut self) {
        if let Some(stroke) = self.strokes.last_mut() {
            stroke.seal();
            debug!(
                contact_id = stroke.contact_id(),
                points = stroke.len(),
                "stroke sealed"
            );
        }
        self.tracking_id = None;
    }

    pub fn dimensions(&self) -> DeviceDimensions {
        self.dimensions
    }

    /// Contact that owns the active stroke, if any.
    pub fn tracking_id(&self) -> Option<u8> {
        self.tracking_id
    }

    /// Last sample seen for a contact that is currently on the surface.
    pub fn last_contact(&self, contact_id: u8) -> Option<&ContactSample> {
        self.last_contacts.get(&contact_id)
    }

    /// Contacts currently on the surface, in no particular order.
    pub fn active_contacts(&self) -> impl Iterator<Item = &ContactSample> + '_ {
        self.last_contacts.values()
    }

    /// All strokes, oldest first.
    pub fn strokes(&self) -> &[Stroke] {
        &self.strokes
    }

    /// The stroke still being drawn.
    pub fn active_stroke(&self) -> Option<&Stroke> {
        self.tracking_id?;
        self.strokes.last()
    }

    /// Number of `Broken` samples seen so far.
    pub fn anomalies(&self) -> u64 {
        self.anomalies
    }

    /// Whether ink changed since the last call; clears the flag.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }
}
