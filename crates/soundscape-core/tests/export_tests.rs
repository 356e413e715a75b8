// Host-side tests for offline rendering, container encoding and export.

use soundscape_core::*;
use std::cell::RefCell;
use std::io::Cursor;
use std::rc::Rc;

fn sequence_of(notes: &[(usize, f64)]) -> Sequence {
    let layout = GridLayout::default();
    Sequence::from_events(
        notes
            .iter()
            .map(|&(tile_index, time_offset_ms)| Event {
                tile_index,
                time_offset_ms,
                position: layout.tile_position(tile_index).unwrap(),
            })
            .collect(),
    )
}

/// Records block sizes instead of encoding.
#[derive(Default)]
struct BlockLog {
    blocks: Vec<usize>,
    flushes: usize,
}

impl BlockEncoder for BlockLog {
    fn extension(&self) -> &'static str {
        "raw"
    }

    fn mime_type(&self) -> &'static str {
        "application/octet-stream"
    }

    fn encode_block(&mut self, left: &[i16], right: &[i16]) -> Result<()> {
        assert_eq!(left.len(), right.len());
        self.blocks.push(left.len());
        Ok(())
    }

    fn flush(&mut self) -> Result<Vec<u8>> {
        self.flushes += 1;
        Ok(Vec::new())
    }
}

struct FailingEncoder;

impl BlockEncoder for FailingEncoder {
    fn extension(&self) -> &'static str {
        "bin"
    }

    fn mime_type(&self) -> &'static str {
        "application/octet-stream"
    }

    fn encode_block(&mut self, _left: &[i16], _right: &[i16]) -> Result<()> {
        Err(SoundscapeError::Encode("disk full".into()))
    }

    fn flush(&mut self) -> Result<Vec<u8>> {
        Ok(Vec::new())
    }
}

#[test]
fn render_covers_last_event_plus_tail() {
    let seq = sequence_of(&[(5, 0.0), (7, 500.0)]);
    let buffer = render(&seq, SoundKit::BellTone, &RenderSettings::default()).unwrap();
    assert!(buffer.duration_sec() >= 2.5);
    assert_eq!(buffer.len(), 110_250);
    assert_eq!(buffer.sample_rate(), 44_100);
    assert_eq!(buffer.channel_count(), 2);
    assert_eq!(buffer.channel(0), buffer.channel(1));
}

#[test]
fn render_of_empty_sequence_is_tail_only_silence() {
    let buffer = render(&Sequence::new(), SoundKit::BellTone, &RenderSettings::default()).unwrap();
    assert!((buffer.duration_sec() - 2.0).abs() < 1e-9);
    assert_eq!(buffer.peak(), 0.0);
}

#[test]
fn rendered_samples_match_the_tone_model() {
    let seq = sequence_of(&[(100, 250.0)]);
    let settings = RenderSettings::default();
    let buffer = render(&seq, SoundKit::SynthPad, &settings).unwrap();
    let tone = Tone::at_position(seq.events()[0].position, SoundKit::SynthPad.envelope(), 0.25);
    let left = buffer.channel(0).unwrap();
    for n in (0..left.len()).step_by(97) {
        let expected = tone.sample_at(n as f64 / settings.sample_rate as f64);
        assert!((left[n] - expected).abs() < 1e-6, "frame {n}");
    }
}

#[test]
fn sound_starts_at_offset_and_ends_after_the_tone() {
    let seq = sequence_of(&[(5, 1000.0)]);
    let buffer = render(&seq, SoundKit::BellTone, &RenderSettings::default()).unwrap();
    let left = buffer.channel(0).unwrap();
    let sr = 44_100usize;
    assert!(left[..sr].iter().all(|s| *s == 0.0));
    assert!(left[sr..sr + sr / 10].iter().any(|s| s.abs() > 0.05));
    // bell tone stops 1.71s after it starts
    assert!(left[sr * 2 + sr * 3 / 4..].iter().all(|s| *s == 0.0));
}

#[test]
fn overlapping_tones_sum() {
    let settings = RenderSettings::default();
    let single = render(&sequence_of(&[(42, 0.0)]), SoundKit::Wobble, &settings).unwrap();
    let double = render(
        &sequence_of(&[(42, 0.0), (42, 0.0)]),
        SoundKit::Wobble,
        &settings,
    )
    .unwrap();
    let a = single.channel(0).unwrap();
    let b = double.channel(0).unwrap();
    assert_eq!(a.len(), b.len());
    for (x, y) in a.iter().zip(b) {
        assert_eq!(*y, x + x);
    }
}

#[test]
fn overly_long_render_is_refused() {
    let seq = sequence_of(&[(1, 0.0), (2, 3_600_000.0)]);
    let err = render(&seq, SoundKit::BellTone, &RenderSettings::default()).unwrap_err();
    assert!(matches!(err, SoundscapeError::Encode(_)));
}

#[test]
fn offline_target_rejects_negative_start() {
    let mut target = OfflineTarget::new(2, 100, 44_100);
    let tone = Tone::at_position(glam::Vec3::ZERO, SoundKit::BellTone.envelope(), -1.0);
    assert!(target.schedule(tone).is_err());
    assert!(target.scheduled().is_empty());
}

#[test]
fn interleaving_clips_then_scales() {
    let buffer = AudioBuffer::new(
        44_100,
        vec![vec![2.0, -2.0, 0.5], vec![0.0, 1.0, -0.5]],
    );
    assert_eq!(
        buffer.to_interleaved_i16(),
        vec![32767, 0, -32767, 32767, 16383, -16383]
    );
}

#[test]
fn mono_buffer_is_duplicated_when_interleaved() {
    let buffer = AudioBuffer::new(8_000, vec![vec![0.25, -0.25]]);
    let out = buffer.to_interleaved_i16();
    assert_eq!(out, vec![8191, 8191, -8191, -8191]);
}

#[test]
fn encoder_is_fed_fixed_blocks_then_flushed() {
    let samples = vec![0i16; 2500 * 2];
    let mut log = BlockLog::default();
    encode_interleaved(&samples, &mut log).unwrap();
    assert_eq!(log.blocks, vec![BLOCK_FRAMES, BLOCK_FRAMES, 196]);
    assert_eq!(log.flushes, 1);
}

#[test]
fn wav_export_has_expected_format_and_length() {
    let seq = sequence_of(&[(5, 0.0), (7, 500.0)]);
    let mut encoder = WavEncoder::new(SAMPLE_RATE);
    let file = export(
        &seq,
        SoundKit::BellTone,
        &RenderSettings::default(),
        &mut encoder,
        1_700_000_000_000,
    )
    .unwrap()
    .expect("non-empty sequence exports");
    assert_eq!(file.file_name, "Soundscape-1700000000000.wav");
    assert_eq!(file.mime_type, "audio/wav");

    let reader = hound::WavReader::new(Cursor::new(file.bytes)).unwrap();
    let spec = reader.spec();
    assert_eq!(spec.channels, 2);
    assert_eq!(spec.sample_rate, 44_100);
    assert_eq!(spec.bits_per_sample, 16);
    assert_eq!(reader.duration(), 110_250);
}

#[test]
fn wav_samples_survive_encoding() {
    let buffer = AudioBuffer::new(44_100, vec![vec![0.5, -1.5], vec![0.1, 0.0]]);
    let mut encoder = WavEncoder::new(44_100);
    let bytes = encode_interleaved(&buffer.to_interleaved_i16(), &mut encoder).unwrap();
    let mut reader = hound::WavReader::new(Cursor::new(bytes)).unwrap();
    let samples: Vec<i16> = reader.samples::<i16>().map(|s| s.unwrap()).collect();
    assert_eq!(samples, buffer.to_interleaved_i16());
}

#[test]
fn empty_sequence_exports_nothing() {
    let mut encoder = BlockLog::default();
    let out = export(
        &Sequence::new(),
        SoundKit::BellTone,
        &RenderSettings::default(),
        &mut encoder,
        1,
    )
    .unwrap();
    assert!(out.is_none());
    assert!(encoder.blocks.is_empty());
    assert_eq!(encoder.flushes, 0);
}

#[test]
fn export_name_uses_epoch_millis() {
    assert_eq!(export_file_name(42, "mp3"), "Soundscape-42.mp3");
}

#[test]
fn session_export_uses_current_kit() {
    let mut session = Session::new();
    let mut sched = ManualScheduler::new();
    session.load_shared(
        &codec::encode(&SharedState {
            theme: None,
            kit: Some("Percussive".into()),
            sequence: vec![SharedNote { i: 3, t: 0.0 }],
        })
        .unwrap(),
        &mut sched,
    )
    .unwrap();
    let mut encoder = WavEncoder::new(SAMPLE_RATE);
    let file = session
        .export(&mut encoder, &RenderSettings::default(), 5)
        .unwrap()
        .unwrap();
    let expected = render(session.sequence(), SoundKit::Percussive, &RenderSettings::default())
        .unwrap()
        .to_interleaved_i16();
    let mut reader = hound::WavReader::new(Cursor::new(file.bytes)).unwrap();
    let samples: Vec<i16> = reader.samples::<i16>().map(|s| s.unwrap()).collect();
    assert_eq!(samples, expected);
}

#[test]
fn busy_indicator_is_restored_on_success_and_failure() {
    let states = Rc::new(RefCell::new(Vec::new()));

    let run = |encoder: &mut dyn BlockEncoder| -> Result<Option<ExportedFile>> {
        let s = Rc::clone(&states);
        let _busy = BusyGuard::new(move |busy| s.borrow_mut().push(busy));
        let seq = sequence_of(&[(1, 0.0)]);
        let file = export(&seq, SoundKit::BellTone, &RenderSettings::default(), encoder, 0)?;
        Ok(file)
    };

    assert!(run(&mut WavEncoder::new(SAMPLE_RATE)).is_ok());
    assert_eq!(*states.borrow(), vec![true, false]);

    assert!(run(&mut FailingEncoder).is_err());
    assert_eq!(*states.borrow(), vec![true, false, true, false]);
}

#[cfg(feature = "mp3")]
#[test]
fn mp3_export_is_compressed_stereo_frames() {
    let seq = sequence_of(&[(5, 0.0), (7, 500.0)]);
    let mut encoder = Mp3Encoder::new(SAMPLE_RATE).unwrap();
    let file = export(
        &seq,
        SoundKit::BellTone,
        &RenderSettings::default(),
        &mut encoder,
        1_700_000_000_000,
    )
    .unwrap()
    .expect("non-empty sequence exports");
    assert_eq!(file.file_name, "Soundscape-1700000000000.mp3");
    assert_eq!(file.mime_type, "audio/mpeg");
    assert_eq!(file.bytes[0], 0xFF);
    assert_eq!(file.bytes[1] & 0xE0, 0xE0);
    // 128 kbit/s for 2.5 s is roughly 40 kB
    assert!(
        (30_000..60_000).contains(&file.bytes.len()),
        "{} bytes",
        file.bytes.len()
    );
}

#[test]
fn default_encoder_names_its_container() {
    let encoder = default_encoder(SAMPLE_RATE).unwrap();
    let expected = if cfg!(feature = "mp3") { "mp3" } else { "wav" };
    assert_eq!(encoder.extension(), expected);
}
