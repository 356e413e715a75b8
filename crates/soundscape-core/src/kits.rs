use crate::constants::{PEAK_GAIN, RELEASE_TAIL_SEC, STOP_PAD_SEC};
use crate::error::{Result, SoundscapeError};
use std::fmt;
use std::str::FromStr;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Waveform {
    Sine,
    Triangle,
    Square,
    Sawtooth,
}

impl Waveform {
    pub const ALL: [Waveform; 4] = [
        Waveform::Sine,
        Waveform::Triangle,
        Waveform::Square,
        Waveform::Sawtooth,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Waveform::Sine => "sine",
            Waveform::Triangle => "triangle",
            Waveform::Square => "square",
            Waveform::Sawtooth => "sawtooth",
        }
    }

    /// Sample one cycle of the waveform. `phase` is in cycles; only the
    /// fractional part is used. Every shape starts at 0 (or its rising edge)
    /// and peaks at +1 in the first half of the cycle.
    #[inline]
    pub fn sample(self, phase: f64) -> f32 {
        let p = phase - phase.floor();
        let v = match self {
            Waveform::Sine => (std::f64::consts::TAU * p).sin(),
            Waveform::Square => {
                if p < 0.5 {
                    1.0
                } else {
                    -1.0
                }
            }
            Waveform::Sawtooth => {
                // starts at 0, rises to +1, wraps to -1 half way
                let q = p + 0.5;
                2.0 * (q - q.floor()) - 1.0
            }
            Waveform::Triangle => {
                if p < 0.25 {
                    4.0 * p
                } else if p < 0.75 {
                    2.0 - 4.0 * p
                } else {
                    4.0 * p - 4.0
                }
            }
        };
        v as f32
    }
}

/// One step of a gain automation timeline, mirroring `setValueAtTime` and
/// `linearRampToValueAtTime`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum GainStep {
    SetAt { time: f64, value: f64 },
    RampTo { time: f64, value: f64 },
}

/// Amplitude shape of a tone. Durations are in seconds, `sustain` is a ratio
/// of the peak gain.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Envelope {
    pub waveform: Waveform,
    pub attack: f64,
    pub decay: f64,
    pub sustain: f64,
    pub release: f64,
}

impl Envelope {
    /// Seconds from tone start until the gain reaches zero.
    pub fn active_duration(&self) -> f64 {
        self.attack + self.decay + self.release + RELEASE_TAIL_SEC
    }

    /// Seconds from tone start until the oscillator is stopped.
    pub fn stop_offset(&self) -> f64 {
        self.attack + self.decay + self.release + STOP_PAD_SEC
    }

    /// Gain timeline for a tone starting at `start` (seconds on the sink clock).
    pub fn automation(&self, start: f64) -> [GainStep; 5] {
        let sustain_gain = PEAK_GAIN * self.sustain;
        let attack_end = start + self.attack;
        let decay_end = attack_end + self.decay;
        let release_end = decay_end + self.release;
        [
            GainStep::SetAt {
                time: start,
                value: 0.0,
            },
            GainStep::RampTo {
                time: attack_end,
                value: PEAK_GAIN,
            },
            GainStep::RampTo {
                time: decay_end,
                value: sustain_gain,
            },
            GainStep::SetAt {
                time: release_end,
                value: sustain_gain,
            },
            GainStep::RampTo {
                time: release_end + RELEASE_TAIL_SEC,
                value: 0.0,
            },
        ]
    }

    /// Gain `t` seconds after tone start, evaluated from [`Envelope::automation`].
    pub fn gain_at(&self, t: f64) -> f64 {
        if t < 0.0 || t >= self.stop_offset() {
            return 0.0;
        }
        let (mut prev_time, mut prev_value) = (0.0, 0.0);
        for step in self.automation(0.0) {
            match step {
                GainStep::SetAt { time, value } => {
                    if t < time {
                        return prev_value;
                    }
                    (prev_time, prev_value) = (time, value);
                }
                GainStep::RampTo { time, value } => {
                    if t < time {
                        let span = time - prev_time;
                        if span <= 0.0 {
                            return value;
                        }
                        return prev_value + (value - prev_value) * (t - prev_time) / span;
                    }
                    (prev_time, prev_value) = (time, value);
                }
            }
        }
        prev_value
    }
}

/// The fixed set of sound kits, in selection order.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SoundKit {
    #[default]
    BellTone,
    SynthPad,
    Percussive,
    Wobble,
}

impl SoundKit {
    pub const ALL: [SoundKit; 4] = [
        SoundKit::BellTone,
        SoundKit::SynthPad,
        SoundKit::Percussive,
        SoundKit::Wobble,
    ];

    pub fn name(self) -> &'static str {
        match self {
            SoundKit::BellTone => "Bell Tone",
            SoundKit::SynthPad => "Synth Pad",
            SoundKit::Percussive => "Percussive",
            SoundKit::Wobble => "Wobble",
        }
    }

    pub fn envelope(self) -> Envelope {
        let (waveform, attack, decay, sustain, release) = match self {
            SoundKit::BellTone => (Waveform::Sine, 0.01, 0.4, 0.1, 0.8),
            SoundKit::SynthPad => (Waveform::Triangle, 0.2, 0.1, 0.8, 0.5),
            SoundKit::Percussive => (Waveform::Square, 0.01, 0.15, 0.0, 0.1),
            SoundKit::Wobble => (Waveform::Sawtooth, 0.05, 0.2, 0.6, 0.3),
        };
        Envelope {
            waveform,
            attack,
            decay,
            sustain,
            release,
        }
    }

    pub fn from_name(name: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|k| k.name() == name)
            .ok_or_else(|| SoundscapeError::UnknownKit(name.to_string()))
    }

    /// Kits are numbered from 1 in selection order.
    pub fn from_digit(digit: u32) -> Option<Self> {
        let idx = (digit as usize).checked_sub(1)?;
        Self::ALL.get(idx).copied()
    }
}

impl fmt::Display for SoundKit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SoundKit {
    type Err = SoundscapeError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_name(s)
    }
}

/// Envelope registered under `name`.
pub fn lookup(name: &str) -> Result<Envelope> {
    SoundKit::from_name(name).map(SoundKit::envelope)
}
