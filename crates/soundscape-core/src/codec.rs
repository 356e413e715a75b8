//! Share tokens: base64 of a small JSON document, safe in a URL query.
//!
//! ```json
//! {"theme":"Oceanic Blue","kit":"Bell Tone","sequence":[{"i":5,"t":0},{"i":7,"t":500}]}
//! ```
//!
//! Positions are not stored; they come back from the tile layout on load.

use crate::constants::SHARE_QUERY_PARAM;
use crate::error::{Result, SoundscapeError};
use crate::kits::SoundKit;
use crate::layout::TileLayout;
use crate::sequence::{Event, Sequence};
use crate::themes::Theme;
use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig};
use base64::engine::DecodePaddingMode;
use base64::Engine;
use serde::{Deserialize, Serialize};

// Writes unpadded URL-safe tokens; reads padded or unpadded ones.
const TOKEN_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new()
        .with_encode_padding(false)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SharedNote {
    pub i: usize,
    pub t: f64,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SharedState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kit: Option<String>,
    #[serde(default)]
    pub sequence: Vec<SharedNote>,
}

impl SharedState {
    pub fn capture(theme: Theme, kit: SoundKit, sequence: &Sequence) -> Self {
        Self {
            theme: Some(theme.name().to_string()),
            kit: Some(kit.name().to_string()),
            sequence: sequence
                .iter()
                .map(|e| SharedNote {
                    i: e.tile_index,
                    t: e.time_offset_ms,
                })
                .collect(),
        }
    }

    /// Rebuild the sequence, taking each position from `layout`.
    pub fn to_sequence(&self, layout: &impl TileLayout) -> Result<Sequence> {
        let events = self
            .sequence
            .iter()
            .map(|note| {
                let position = layout.tile_position(note.i).ok_or_else(|| {
                    SoundscapeError::Decode(format!("tile {} is not on the floor", note.i))
                })?;
                Ok(Event {
                    tile_index: note.i,
                    time_offset_ms: note.t,
                    position,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Sequence::from_events(events))
    }
}

pub fn encode(state: &SharedState) -> Result<String> {
    let json = serde_json::to_vec(state).map_err(|e| SoundscapeError::Encode(e.to_string()))?;
    Ok(TOKEN_ENGINE.encode(json))
}

/// Parse a token produced by [`encode`]. Tokens in the standard base64
/// alphabet are accepted too, including ones whose `+` became a space when
/// the query string was parsed.
pub fn decode(token: &str) -> Result<SharedState> {
    let normalized: String = token
        .trim()
        .chars()
        .map(|c| match c {
            '+' | ' ' => '-',
            '/' => '_',
            c => c,
        })
        .collect();
    if normalized.is_empty() {
        return Err(SoundscapeError::Decode("empty token".into()));
    }
    let json = TOKEN_ENGINE
        .decode(normalized.as_bytes())
        .map_err(|e| SoundscapeError::Decode(format!("base64: {e}")))?;
    let state: SharedState = serde_json::from_slice(&json)
        .map_err(|e| SoundscapeError::Decode(format!("json: {e}")))?;
    if let Some(bad) = state
        .sequence
        .iter()
        .find(|n| !n.t.is_finite() || n.t < 0.0)
    {
        return Err(SoundscapeError::Decode(format!(
            "invalid time offset {} for tile {}",
            bad.t, bad.i
        )));
    }
    Ok(state)
}

/// `<base>?state=<token>`
pub fn share_url(base: &str, token: &str) -> String {
    format!("{base}?{SHARE_QUERY_PARAM}={token}")
}

/// Pull the token out of a share URL; anything without a `state` parameter
/// is returned as is.
pub fn extract_token(input: &str) -> &str {
    let Some((_, query)) = input.split_once('?') else {
        return input;
    };
    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| *key == SHARE_QUERY_PARAM)
        .map_or(input, |(_, value)| value)
}
