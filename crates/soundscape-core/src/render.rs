use crate::constants::{MAX_RENDER_SEC, RENDER_CHANNELS, RENDER_TAIL_SEC, SAMPLE_RATE};
use crate::error::{Result, SoundscapeError};
use crate::kits::SoundKit;
use crate::sequence::Sequence;
use crate::synth::{synthesize, Tone, ToneSink};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderSettings {
    pub sample_rate: u32,
    pub channels: usize,
    /// Silence appended after the last event so its tail is not cut.
    pub tail_sec: f64,
    pub max_duration_sec: f64,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            sample_rate: SAMPLE_RATE,
            channels: RENDER_CHANNELS,
            tail_sec: RENDER_TAIL_SEC,
            max_duration_sec: MAX_RENDER_SEC,
        }
    }
}

/// Planar floating point audio.
#[derive(Clone, Debug, PartialEq)]
pub struct AudioBuffer {
    sample_rate: u32,
    channels: Vec<Vec<f32>>,
}

impl AudioBuffer {
    pub fn new(sample_rate: u32, channels: Vec<Vec<f32>>) -> Self {
        Self {
            sample_rate,
            channels,
        }
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Frames per channel.
    pub fn len(&self) -> usize {
        self.channels.first().map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn duration_sec(&self) -> f64 {
        self.len() as f64 / self.sample_rate as f64
    }

    pub fn channel(&self, index: usize) -> Option<&[f32]> {
        self.channels.get(index).map(Vec::as_slice)
    }

    pub fn peak(&self) -> f32 {
        self.channels
            .iter()
            .flatten()
            .fold(0.0f32, |m, s| m.max(s.abs()))
    }

    /// Interleaved 16-bit stereo. Samples are hard clipped to [-1, 1] before
    /// scaling; a mono buffer is duplicated onto both sides.
    pub fn to_interleaved_i16(&self) -> Vec<i16> {
        let left = self.channel(0).unwrap_or(&[]);
        let right = self.channel(1).unwrap_or(left);
        let mut out = Vec::with_capacity(left.len() * 2);
        for (l, r) in left.iter().zip(right) {
            out.push(to_i16(*l));
            out.push(to_i16(*r));
        }
        out
    }
}

#[inline]
fn to_i16(sample: f32) -> i16 {
    (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16
}

/// Non-real-time render target. Its clock starts at zero; tones may be
/// scheduled anywhere on it and overlapping tones are summed.
pub struct OfflineTarget {
    sample_rate: u32,
    channels: usize,
    frames: usize,
    tones: Vec<Tone>,
}

impl OfflineTarget {
    pub fn new(channels: usize, frames: usize, sample_rate: u32) -> Self {
        Self {
            sample_rate,
            channels: channels.max(1),
            frames,
            tones: Vec::new(),
        }
    }

    pub fn scheduled(&self) -> &[Tone] {
        &self.tones
    }

    /// Render every scheduled tone. Tones are mono and land equally on all
    /// channels.
    pub fn render(self) -> AudioBuffer {
        let sr = self.sample_rate as f64;
        let mut mix = vec![0.0f32; self.frames];
        for tone in &self.tones {
            let first = (tone.start_sec * sr).ceil().max(0.0) as usize;
            let last = ((tone.end_sec() * sr).ceil() as usize).min(self.frames);
            for (n, slot) in mix.iter_mut().enumerate().take(last).skip(first) {
                *slot += tone.sample_at(n as f64 / sr);
            }
        }
        let mut channels = Vec::with_capacity(self.channels);
        for _ in 1..self.channels {
            channels.push(mix.clone());
        }
        channels.push(mix);
        AudioBuffer::new(self.sample_rate, channels)
    }
}

impl ToneSink for OfflineTarget {
    fn current_time(&self) -> f64 {
        0.0
    }

    fn schedule(&mut self, tone: Tone) -> Result<()> {
        if !tone.start_sec.is_finite() || tone.start_sec < 0.0 {
            return Err(SoundscapeError::Encode(format!(
                "tone start {} is outside the render",
                tone.start_sec
            )));
        }
        self.tones.push(tone);
        Ok(())
    }
}

/// Length of the render for `sequence`: the last event plus the tail.
pub fn render_duration_sec(sequence: &Sequence, settings: &RenderSettings) -> f64 {
    sequence.max_offset_ms() / 1000.0 + settings.tail_sec
}

/// Render `sequence` with `kit` offline, each tone at its recorded offset.
pub fn render(sequence: &Sequence, kit: SoundKit, settings: &RenderSettings) -> Result<AudioBuffer> {
    let duration = render_duration_sec(sequence, settings);
    if !duration.is_finite() || duration > settings.max_duration_sec {
        return Err(SoundscapeError::Encode(format!(
            "render of {duration:.1}s exceeds the {:.0}s limit",
            settings.max_duration_sec
        )));
    }
    let frames = (settings.sample_rate as f64 * duration).ceil() as usize;
    let mut target = OfflineTarget::new(settings.channels, frames, settings.sample_rate);
    let envelope = kit.envelope();
    for event in sequence {
        synthesize(
            event.position,
            &envelope,
            event.time_offset_ms / 1000.0,
            &mut target,
        )?;
    }
    log::info!(
        "[render] {} tones, {:.2}s at {}Hz",
        sequence.len(),
        duration,
        settings.sample_rate
    );
    Ok(target.render())
}
