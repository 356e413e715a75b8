use crate::sequence::{Event, Sequence};
use glam::Vec3;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
enum RecorderState {
    #[default]
    Idle,
    Armed {
        started_at_ms: f64,
    },
}

/// Captures taps into a [`Sequence`] while armed.
#[derive(Clone, Debug, Default)]
pub struct Recorder {
    state: RecorderState,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_armed(&self) -> bool {
        matches!(self.state, RecorderState::Armed { .. })
    }

    /// Start a fresh take: the previous sequence is discarded.
    pub fn arm(&mut self, sequence: &mut Sequence, now_ms: f64) {
        sequence.clear();
        self.state = RecorderState::Armed {
            started_at_ms: now_ms,
        };
        log::info!("[recorder] armed");
    }

    /// Stop capturing; the sequence is kept.
    pub fn disarm(&mut self) {
        if self.is_armed() {
            log::info!("[recorder] disarmed");
        }
        self.state = RecorderState::Idle;
    }

    /// Append a tap while armed. Taps while idle are ignored.
    pub fn capture(
        &self,
        sequence: &mut Sequence,
        tile_index: usize,
        position: Vec3,
        now_ms: f64,
    ) -> Option<Event> {
        let RecorderState::Armed { started_at_ms } = self.state else {
            return None;
        };
        // offsets never run backwards, even if the clock does
        let floor = sequence.events().last().map_or(0.0, |e| e.time_offset_ms);
        let event = Event {
            tile_index,
            time_offset_ms: (now_ms - started_at_ms).max(floor),
            position,
        };
        sequence.push(event);
        Some(event)
    }
}
