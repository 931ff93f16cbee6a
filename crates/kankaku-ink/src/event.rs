use kankaku_frame::ContactSample;

/// Touch lifecycle event derived from one contact sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchEvent {
    /// A contact landed.
    Down(ContactSample),
    /// A landed contact moved to a new position.
    Move(ContactSample),
    /// A landed contact lifted.
    Up(ContactSample),
    /// A release for a contact that was never seen landing.
    Broken(ContactSample),
}

impl TouchEvent {
    pub fn sample(&self) -> &ContactSample {
        match self {
            TouchEvent::Down(sample)
            | TouchEvent::Move(sample)
            | TouchEvent::Up(sample)
            | TouchEvent::Broken(sample) => sample,
        }
    }

    pub fn contact_id(&self) -> u8 {
        self.sample().contact_id
    }

    /// Lowercase event name, as used in logs and CLI output.
    pub fn name(&self) -> &'static str {
        match self {
            TouchEvent::Down(_) => "down",
            TouchEvent::Move(_) => "move",
            TouchEvent::Up(_) => "up",
            TouchEvent::Broken(_) => "broken",
        }
    }

    pub fn is_anomaly(&self) -> bool {
        matches!(self, TouchEvent::Broken(_))
    }
}
