use crate::constants::{DEPTH_MAX, DEPTH_MIN, FREQ_MAX_HZ, FREQ_MIN_HZ};
use crate::error::{Result, SoundscapeError};
use crate::kits::{Envelope, Waveform};
use glam::Vec3;

/// Pitch for a tile depth: [-50, 50] maps linearly onto [150, 600] Hz.
/// Depths outside the range are clamped to the nearest end.
#[inline]
pub fn frequency_for_depth(depth: f32) -> f32 {
    let d = depth.clamp(DEPTH_MIN, DEPTH_MAX);
    FREQ_MIN_HZ + (d - DEPTH_MIN) * (FREQ_MAX_HZ - FREQ_MIN_HZ) / (DEPTH_MAX - DEPTH_MIN)
}

/// A single enveloped oscillator note, placed on a sink's clock.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tone {
    pub frequency_hz: f32,
    pub envelope: Envelope,
    pub start_sec: f64,
}

impl Tone {
    pub fn at_position(position: Vec3, envelope: Envelope, start_sec: f64) -> Self {
        Self {
            frequency_hz: frequency_for_depth(position.z),
            envelope,
            start_sec,
        }
    }

    #[inline]
    pub fn waveform(&self) -> Waveform {
        self.envelope.waveform
    }

    /// Sink time at which the oscillator stops.
    #[inline]
    pub fn end_sec(&self) -> f64 {
        self.start_sec + self.envelope.stop_offset()
    }

    /// Output of this tone at absolute sink time `t`.
    #[inline]
    pub fn sample_at(&self, t: f64) -> f32 {
        let local = t - self.start_sec;
        if local < 0.0 || local >= self.envelope.stop_offset() {
            return 0.0;
        }
        let gain = self.envelope.gain_at(local);
        self.waveform().sample(self.frequency_hz as f64 * local) * gain as f32
    }
}

/// Destination for synthesized tones.
///
/// Live sinks play on a real-time clock; the offline render target keeps a
/// virtual clock starting at zero and sums overlapping tones.
pub trait ToneSink {
    /// Current time on the sink clock, in seconds.
    fn current_time(&self) -> f64;

    fn schedule(&mut self, tone: Tone) -> Result<()>;
}

/// Synthesize one tone for `position` starting at `start_sec` on the sink clock.
pub fn synthesize(
    position: Vec3,
    envelope: &Envelope,
    start_sec: f64,
    sink: &mut dyn ToneSink,
) -> Result<Tone> {
    let tone = Tone::at_position(position, *envelope, start_sec);
    sink.schedule(tone)?;
    Ok(tone)
}

/// Synthesize one tone starting immediately.
pub fn synthesize_now(position: Vec3, envelope: &Envelope, sink: &mut dyn ToneSink) -> Result<Tone> {
    let now = sink.current_time();
    synthesize(position, envelope, now, sink)
}

/// A live sink that is created lazily, on the first user interaction.
pub struct LiveOutput<S> {
    sink: Option<S>,
}

impl<S> Default for LiveOutput<S> {
    fn default() -> Self {
        Self { sink: None }
    }
}

impl<S: ToneSink> LiveOutput<S> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_ready(&self) -> bool {
        self.sink.is_some()
    }

    pub fn get(&self) -> Option<&S> {
        self.sink.as_ref()
    }

    /// Create the sink with `init` unless it already exists.
    pub fn get_or_try_init<E>(&mut self, init: impl FnOnce() -> Result<S, E>) -> Result<&mut S, E> {
        let sink = match self.sink.take() {
            Some(sink) => sink,
            None => init()?,
        };
        Ok(self.sink.insert(sink))
    }
}

impl<S: ToneSink> ToneSink for LiveOutput<S> {
    fn current_time(&self) -> f64 {
        self.sink.as_ref().map_or(0.0, ToneSink::current_time)
    }

    fn schedule(&mut self, tone: Tone) -> Result<()> {
        self.sink
            .as_mut()
            .ok_or(SoundscapeError::AudioUnavailable)?
            .schedule(tone)
    }
}
