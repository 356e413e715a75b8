// Host-side tests for tone synthesis and sinks.

use glam::Vec3;
use soundscape_core::*;

#[derive(Default)]
struct CollectingSink {
    now: f64,
    tones: Vec<Tone>,
}

impl ToneSink for CollectingSink {
    fn current_time(&self) -> f64 {
        self.now
    }

    fn schedule(&mut self, tone: Tone) -> Result<()> {
        self.tones.push(tone);
        Ok(())
    }
}

#[test]
fn depth_maps_linearly_onto_pitch_range() {
    assert!((frequency_for_depth(-50.0) - 150.0).abs() < 1e-4);
    assert!((frequency_for_depth(0.0) - 375.0).abs() < 1e-4);
    assert!((frequency_for_depth(50.0) - 600.0).abs() < 1e-4);
    assert!((frequency_for_depth(25.0) - 487.5).abs() < 1e-4);
}

#[test]
fn depth_outside_range_is_clamped() {
    assert!((frequency_for_depth(-80.0) - 150.0).abs() < 1e-4);
    assert!((frequency_for_depth(-50.4) - 150.0).abs() < 1e-4);
    assert!((frequency_for_depth(120.0) - 600.0).abs() < 1e-4);
}

#[test]
fn pitch_ignores_x_and_y() {
    let env = SoundKit::BellTone.envelope();
    let a = Tone::at_position(Vec3::new(-30.0, 0.0, 10.0), env, 0.0);
    let b = Tone::at_position(Vec3::new(40.0, 3.0, 10.0), env, 0.0);
    assert_eq!(a.frequency_hz, b.frequency_hz);
}

#[test]
fn synthesize_schedules_at_requested_time() {
    let mut sink = CollectingSink::default();
    let env = SoundKit::Wobble.envelope();
    let tone = synthesize(Vec3::new(0.0, 0.0, 0.0), &env, 1.25, &mut sink).unwrap();
    assert_eq!(sink.tones, vec![tone]);
    assert_eq!(tone.start_sec, 1.25);
    assert_eq!(tone.waveform(), Waveform::Sawtooth);
    assert!((tone.end_sec() - (1.25 + env.stop_offset())).abs() < 1e-9);
}

#[test]
fn synthesize_now_uses_sink_clock() {
    let mut sink = CollectingSink {
        now: 7.5,
        ..Default::default()
    };
    let tone = synthesize_now(Vec3::ZERO, &SoundKit::SynthPad.envelope(), &mut sink).unwrap();
    assert_eq!(tone.start_sec, 7.5);
}

#[test]
fn tone_is_silent_outside_its_lifetime() {
    let tone = Tone::at_position(Vec3::ZERO, SoundKit::SynthPad.envelope(), 1.0);
    assert_eq!(tone.sample_at(0.5), 0.0);
    assert_eq!(tone.sample_at(tone.end_sec() + 0.01), 0.0);
    let loudest = (0..1000)
        .map(|i| tone.sample_at(1.0 + i as f64 / 1000.0).abs())
        .fold(0.0f32, f32::max);
    assert!(loudest > 0.3 && loudest <= PEAK_GAIN as f32 + 1e-6);
}

#[test]
fn live_output_is_unavailable_until_initialized() {
    let mut live: LiveOutput<CollectingSink> = LiveOutput::new();
    assert!(!live.is_ready());
    let err = synthesize_now(Vec3::ZERO, &SoundKit::BellTone.envelope(), &mut live).unwrap_err();
    assert_eq!(err, SoundscapeError::AudioUnavailable);

    live.get_or_try_init(|| Ok::<_, ()>(CollectingSink {
        now: 3.0,
        ..Default::default()
    }))
    .unwrap();
    assert!(live.is_ready());
    let tone = synthesize_now(Vec3::ZERO, &SoundKit::BellTone.envelope(), &mut live).unwrap();
    assert_eq!(tone.start_sec, 3.0);
    assert_eq!(live.get().map(|s| s.tones.len()), Some(1));
}

#[test]
fn live_output_initializes_once() {
    let mut live: LiveOutput<CollectingSink> = LiveOutput::new();
    let mut calls = 0;
    for _ in 0..3 {
        live.get_or_try_init(|| {
            calls += 1;
            Ok::<_, ()>(CollectingSink::default())
        })
        .unwrap();
    }
    assert_eq!(calls, 1);

    let mut failing: LiveOutput<CollectingSink> = LiveOutput::new();
    assert!(failing.get_or_try_init(|| Err("no device")).is_err());
    assert!(!failing.is_ready());
}
