// Native audio (cpal): tones are mixed on the device callback against a
// frame counter, so the sink clock is the stream's own clock.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use soundscape_core::{
    synthesize_now, ManualScheduler, PlayOutcome, Session, Tone, ToneSink,
};
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::{Duration, Instant};

struct Mixer {
    sample_rate: f64,
    frames: u64,
    tones: Vec<Tone>,
}

impl Mixer {
    fn now_sec(&self) -> f64 {
        self.frames as f64 / self.sample_rate
    }

    fn next_sample(&mut self) -> f32 {
        let t = self.now_sec();
        let s: f32 = self.tones.iter().map(|tone| tone.sample_at(t)).sum();
        self.frames += 1;
        self.tones.retain(|tone| tone.end_sec() > t);
        s
    }
}

fn lock(mixer: &Mutex<Mixer>) -> MutexGuard<'_, Mixer> {
    mixer.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Default output device, fed by the shared mixer.
pub struct CpalOutput {
    mixer: Arc<Mutex<Mixer>>,
    _stream: cpal::Stream,
}

impl CpalOutput {
    pub fn start() -> anyhow::Result<Self> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| anyhow::anyhow!("no output device"))?;
        let config = device.default_output_config()?;
        let channels = config.channels() as usize;
        let mixer = Arc::new(Mutex::new(Mixer {
            sample_rate: config.sample_rate().0 as f64,
            frames: 0,
            tones: Vec::new(),
        }));
        log::info!(
            "[live] {} @ {} Hz, {} ch",
            device.name().unwrap_or_default(),
            config.sample_rate().0,
            channels
        );

        let err_fn = |err| log::error!("audio stream error: {err}");
        let stream = match config.sample_format() {
            cpal::SampleFormat::F32 => build_stream::<f32>(
                &device,
                &config.into(),
                channels,
                Arc::clone(&mixer),
                err_fn,
                |s| s,
            )?,
            cpal::SampleFormat::I16 => build_stream::<i16>(
                &device,
                &config.into(),
                channels,
                Arc::clone(&mixer),
                err_fn,
                |s| (s.clamp(-1.0, 1.0) * i16::MAX as f32) as i16,
            )?,
            cpal::SampleFormat::U16 => build_stream::<u16>(
                &device,
                &config.into(),
                channels,
                Arc::clone(&mixer),
                err_fn,
                |s| ((s * 0.5 + 0.5).clamp(0.0, 1.0) * u16::MAX as f32) as u16,
            )?,
            other => anyhow::bail!("unsupported sample format {other:?}"),
        };
        stream.play()?;
        Ok(Self {
            mixer,
            _stream: stream,
        })
    }

    pub fn active_tones(&self) -> usize {
        lock(&self.mixer).tones.len()
    }
}

impl ToneSink for CpalOutput {
    fn current_time(&self) -> f64 {
        lock(&self.mixer).now_sec()
    }

    fn schedule(&mut self, tone: Tone) -> soundscape_core::Result<()> {
        lock(&self.mixer).tones.push(tone);
        Ok(())
    }
}

fn build_stream<T: cpal::SizedSample + Send + 'static>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    channels: usize,
    mixer: Arc<Mutex<Mixer>>,
    err_fn: impl Fn(cpal::StreamError) + Send + 'static,
    convert: impl Fn(f32) -> T + Send + 'static,
) -> Result<cpal::Stream, cpal::BuildStreamError> {
    device.build_output_stream(
        config,
        move |data: &mut [T], _| {
            let mut guard = lock(&mixer);
            for frame in data.chunks_mut(channels.max(1)) {
                let v = convert(guard.next_sample());
                frame.fill(v);
            }
        },
        err_fn,
        None,
    )
}

/// Play the session's take to the end, driving the player from the wall clock.
pub fn play(mut session: Session) -> anyhow::Result<()> {
    let output = Rc::new(RefCell::new(CpalOutput::start()?));
    let mut scheduler = ManualScheduler::new();
    let voice_out = Rc::clone(&output);
    let outcome = session.play(
        &mut scheduler,
        move |event, kit| {
            let mut out = voice_out.borrow_mut();
            if let Err(e) = synthesize_now(event.position, &kit.envelope(), &mut *out) {
                log::warn!("[live] tile {}: {e}", event.tile_index);
            }
        },
        None,
    );
    if let PlayOutcome::Started {
        triggers,
        finishes_at_ms,
    } = outcome
    {
        log::info!("[live] playing {triggers} events over {finishes_at_ms:.0}ms");
    }

    let started = Instant::now();
    while session.is_playing() {
        scheduler.advance_to(started.elapsed().as_secs_f64() * 1000.0);
        thread::sleep(Duration::from_millis(5));
    }
    // let the last release tails ring out
    while output.borrow().active_tones() > 0 {
        thread::sleep(Duration::from_millis(20));
    }
    log::info!("[live] done");
    Ok(())
}
