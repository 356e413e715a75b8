use glam::Vec3;

/// One recorded tap.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Event {
    pub tile_index: usize,
    /// Milliseconds since recording started.
    pub time_offset_ms: f64,
    /// Tile position at capture time.
    pub position: Vec3,
}

/// Recorded taps in capture order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Sequence {
    events: Vec<Event>,
}

impl Sequence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_events(events: Vec<Event>) -> Self {
        Self { events }
    }

    pub fn push(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Event> {
        self.events.iter()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Latest offset in the sequence, 0 when empty.
    pub fn max_offset_ms(&self) -> f64 {
        self.events
            .iter()
            .map(|e| e.time_offset_ms)
            .fold(0.0, f64::max)
    }
}

impl<'a> IntoIterator for &'a Sequence {
    type Item = &'a Event;
    type IntoIter = std::slice::Iter<'a, Event>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.iter()
    }
}
