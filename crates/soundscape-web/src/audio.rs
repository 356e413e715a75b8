use soundscape_core::{GainStep, SoundscapeError, Tone, ToneSink, Waveform};
use web_sys as web;

/// Live output on a WebAudio context: one oscillator and gain node per tone.
pub struct WebAudioOutput {
    ctx: web::AudioContext,
}

impl WebAudioOutput {
    /// Must run inside a user gesture or the context starts suspended.
    pub fn new() -> anyhow::Result<Self> {
        let ctx = web::AudioContext::new()
            .map_err(|e| anyhow::anyhow!("AudioContext error: {:?}", e))?;
        log::info!("[audio] context ready at {} Hz", ctx.sample_rate());
        Ok(Self { ctx })
    }

    /// Browsers may suspend the context again, e.g. after a tab switch.
    pub fn resume(&self) {
        if self.ctx.state() == web::AudioContextState::Suspended {
            let _ = self.ctx.resume();
        }
    }
}

fn oscillator_type(waveform: Waveform) -> web::OscillatorType {
    match waveform {
        Waveform::Sine => web::OscillatorType::Sine,
        Waveform::Triangle => web::OscillatorType::Triangle,
        Waveform::Square => web::OscillatorType::Square,
        Waveform::Sawtooth => web::OscillatorType::Sawtooth,
    }
}

fn js_err(e: wasm_bindgen::JsValue) -> SoundscapeError {
    log::error!("[audio] {:?}", e);
    SoundscapeError::AudioUnavailable
}

impl ToneSink for WebAudioOutput {
    fn current_time(&self) -> f64 {
        self.ctx.current_time()
    }

    fn schedule(&mut self, tone: Tone) -> soundscape_core::Result<()> {
        let src = web::OscillatorNode::new(&self.ctx).map_err(js_err)?;
        src.set_type(oscillator_type(tone.waveform()));
        src.frequency().set_value(tone.frequency_hz);

        let gain = web::GainNode::new(&self.ctx).map_err(js_err)?;
        let param = gain.gain();
        for step in tone.envelope.automation(tone.start_sec) {
            match step {
                GainStep::SetAt { time, value } => {
                    param.set_value_at_time(value as f32, time).map_err(js_err)?;
                }
                GainStep::RampTo { time, value } => {
                    param
                        .linear_ramp_to_value_at_time(value as f32, time)
                        .map_err(js_err)?;
                }
            }
        }

        src.connect_with_audio_node(&gain).map_err(js_err)?;
        gain.connect_with_audio_node(&self.ctx.destination())
            .map_err(js_err)?;
        src.start_with_when(tone.start_sec).map_err(js_err)?;
        src.stop_with_when(tone.end_sec()).map_err(js_err)?;
        Ok(())
    }
}
