use kankaku_frame::ContactSample;

/// The path one contact drew while it stayed on the surface.
///
/// Never empty: a stroke starts with the sample that landed. Once sealed (the
/// contact lifted) it is never modified again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stroke {
    contact_id: u8,
    points: Vec<ContactSample>,
    sealed: bool,
}

impl Stroke {
    pub(crate) fn begin(seed: ContactSample) -> Self {
        Self {
            contact_id: seed.contact_id,
            points: vec![seed],
            sealed: false,
        }
    }

    /// Append `sample` unless it repeats the last position.
    pub(crate) fn extend(&mut self, sample: ContactSample) -> bool {
        debug_assert!(!self.sealed, "sealed strokes are immutable");
        if self.last().same_position(&sample) {
            return false;
        }
        self.points.push(sample);
        true
    }

    pub(crate) fn seal(&mut self) {
        self.sealed = true;
    }

    pub fn contact_id(&self) -> u8 {
        self.contact_id
    }

    pub fn points(&self) -> &[ContactSample] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Always false: a stroke starts with its seed point.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn is_sealed(&self) -> bool {
        self.sealed
    }

    pub fn first(&self) -> &ContactSample {
        &self.points[0]
    }

    pub fn last(&self) -> &ContactSample {
        &self.points[self.points.len() - 1]
    }

    /// Consecutive point pairs, in drawing order.
    pub fn segments(&self) -> impl Iterator<Item = (&ContactSample, &ContactSample)> + '_ {
        self.points.windows(2).map(|pair| (&pair[0], &pair[1]))
    }

    /// Euclidean path length in device units.
    pub fn path_length(&self) -> f64 {
        self.segments().fold(0.0, |total, (a, b)| {
            let dx = f64::from(b.x) - f64::from(a.x);
            let dy = f64::from(b.y) - f64::from(a.y);
            total + dx.hypot(dy)
        })
    }
}
