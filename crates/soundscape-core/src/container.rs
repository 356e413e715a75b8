//! Audio file containers for exported renders.

use crate::constants::BLOCK_FRAMES;
use crate::error::{Result, SoundscapeError};
use hound::{SampleFormat, WavSpec, WavWriter};
use std::io::Cursor;

/// Stereo encoder fed in fixed-size blocks of 16-bit samples.
pub trait BlockEncoder {
    fn extension(&self) -> &'static str;

    fn mime_type(&self) -> &'static str;

    /// Encode one block. `left` and `right` have the same length, at most
    /// [`BLOCK_FRAMES`].
    fn encode_block(&mut self, left: &[i16], right: &[i16]) -> Result<()>;

    /// Emit whatever the encoder still buffers and return the finished file.
    fn flush(&mut self) -> Result<Vec<u8>>;
}

/// 16-bit PCM WAV.
pub struct WavEncoder {
    spec: WavSpec,
    interleaved: Vec<i16>,
}

impl WavEncoder {
    pub fn new(sample_rate: u32) -> Self {
        Self {
            spec: WavSpec {
                channels: 2,
                sample_rate,
                bits_per_sample: 16,
                sample_format: SampleFormat::Int,
            },
            interleaved: Vec::new(),
        }
    }
}

impl BlockEncoder for WavEncoder {
    fn extension(&self) -> &'static str {
        "wav"
    }

    fn mime_type(&self) -> &'static str {
        "audio/wav"
    }

    fn encode_block(&mut self, left: &[i16], right: &[i16]) -> Result<()> {
        if left.len() != right.len() {
            return Err(SoundscapeError::Encode(format!(
                "channel block mismatch: {} left, {} right",
                left.len(),
                right.len()
            )));
        }
        self.interleaved.reserve(left.len() * 2);
        for (l, r) in left.iter().zip(right) {
            self.interleaved.push(*l);
            self.interleaved.push(*r);
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<Vec<u8>> {
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = WavWriter::new(&mut cursor, self.spec).map_err(wav_err)?;
            for s in self.interleaved.drain(..) {
                writer.write_sample(s).map_err(wav_err)?;
            }
            writer.finalize().map_err(wav_err)?;
        }
        Ok(cursor.into_inner())
    }
}

fn wav_err(e: hound::Error) -> SoundscapeError {
    SoundscapeError::Encode(format!("wav: {e}"))
}

/// Stereo MP3 at 128 kbit/s through LAME.
#[cfg(feature = "mp3")]
pub struct Mp3Encoder {
    lame: mp3lame_encoder::Encoder,
    out: Vec<u8>,
}

#[cfg(feature = "mp3")]
impl Mp3Encoder {
    pub fn new(sample_rate: u32) -> Result<Self> {
        use mp3lame_encoder::{Bitrate, Builder, Quality};

        let mut builder =
            Builder::new().ok_or_else(|| SoundscapeError::Encode("mp3: LAME init failed".into()))?;
        builder.set_num_channels(2).map_err(mp3_err)?;
        builder.set_sample_rate(sample_rate).map_err(mp3_err)?;
        builder.set_brate(Bitrate::Kbps128).map_err(mp3_err)?;
        builder.set_quality(Quality::Good).map_err(mp3_err)?;
        Ok(Self {
            lame: builder.build().map_err(mp3_err)?,
            out: Vec::new(),
        })
    }
}

#[cfg(feature = "mp3")]
impl BlockEncoder for Mp3Encoder {
    fn extension(&self) -> &'static str {
        "mp3"
    }

    fn mime_type(&self) -> &'static str {
        "audio/mpeg"
    }

    fn encode_block(&mut self, left: &[i16], right: &[i16]) -> Result<()> {
        if left.len() != right.len() {
            return Err(SoundscapeError::Encode(format!(
                "channel block mismatch: {} left, {} right",
                left.len(),
                right.len()
            )));
        }
        self.out
            .reserve(mp3lame_encoder::max_required_buffer_size(left.len()));
        self.lame
            .encode_to_vec(mp3lame_encoder::DualPcm { left, right }, &mut self.out)
            .map_err(mp3_err)?;
        Ok(())
    }

    fn flush(&mut self) -> Result<Vec<u8>> {
        // LAME wants at least 7200 bytes of room for its final frames
        self.out.reserve(7200);
        self.lame
            .flush_to_vec::<mp3lame_encoder::FlushNoGap>(&mut self.out)
            .map_err(mp3_err)?;
        Ok(std::mem::take(&mut self.out))
    }
}

#[cfg(feature = "mp3")]
fn mp3_err(e: impl std::fmt::Debug) -> SoundscapeError {
    SoundscapeError::Encode(format!("mp3: {e:?}"))
}

/// The compressed encoder when this build has one, otherwise WAV.
pub fn default_encoder(sample_rate: u32) -> Result<Box<dyn BlockEncoder>> {
    #[cfg(feature = "mp3")]
    {
        Ok(Box::new(Mp3Encoder::new(sample_rate)?))
    }
    #[cfg(not(feature = "mp3"))]
    {
        Ok(Box::new(WavEncoder::new(sample_rate)))
    }
}

/// Feed interleaved stereo through `encoder` block by block, then flush.
pub fn encode_interleaved(samples: &[i16], encoder: &mut dyn BlockEncoder) -> Result<Vec<u8>> {
    let mut left = Vec::with_capacity(BLOCK_FRAMES);
    let mut right = Vec::with_capacity(BLOCK_FRAMES);
    for block in samples.chunks(BLOCK_FRAMES * 2) {
        left.clear();
        right.clear();
        for frame in block.chunks_exact(2) {
            left.push(frame[0]);
            right.push(frame[1]);
        }
        encoder.encode_block(&left, &right)?;
    }
    encoder.flush()
}
