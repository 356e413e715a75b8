use anyhow::{anyhow, Context};
use clap::{Parser, Subcommand};
use soundscape_core::{
    codec, default_encoder, GridLayout, ManualScheduler, RenderSettings, Session, SharedNote,
    SharedState, SoundKit, Theme,
};
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Parser)]
#[command(name = "soundscape")]
#[command(about = "Record, share and render tile-tap soundscapes", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build a share token from notes given on the command line
    Encode {
        /// Theme name, e.g. "Oceanic Blue"
        #[arg(long, default_value = "Oceanic Blue")]
        theme: String,

        /// Sound kit name, e.g. "Bell Tone"
        #[arg(long, default_value = "Bell Tone")]
        kit: String,

        /// Note as <tile>:<offset-ms>, repeatable
        #[arg(short, long = "note", value_parser = parse_note, required = true)]
        notes: Vec<SharedNote>,

        /// Print a full share link on this page instead of the bare token
        #[arg(long)]
        base_url: Option<String>,
    },

    /// Render a share token (or share link) to an MP3 file
    Render {
        /// Token or share link
        token: String,

        /// Directory the file is written to
        #[arg(short, long, default_value = ".")]
        out_dir: PathBuf,
    },

    /// Play a share token through the default audio device
    #[cfg(feature = "live")]
    Play {
        /// Token or share link
        token: String,
    },

    /// List available kits and themes
    List,
}

pub fn parse_note(s: &str) -> Result<SharedNote, String> {
    let (i, t) = s
        .split_once(':')
        .ok_or_else(|| format!("expected <tile>:<offset-ms>, got {s:?}"))?;
    let i = i.trim().parse::<usize>().map_err(|e| format!("tile {i:?}: {e}"))?;
    let t = t.trim().parse::<f64>().map_err(|e| format!("offset {t:?}: {e}"))?;
    if !t.is_finite() || t < 0.0 {
        return Err(format!("offset must be a non-negative number, got {t}"));
    }
    Ok(SharedNote { i, t })
}

pub fn epoch_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}

pub fn encode(
    theme: &str,
    kit: &str,
    notes: Vec<SharedNote>,
    base_url: Option<&str>,
) -> anyhow::Result<String> {
    let theme = Theme::from_name(theme)?;
    let kit = SoundKit::from_name(kit)?;
    let state = SharedState {
        theme: Some(theme.name().to_string()),
        kit: Some(kit.name().to_string()),
        sequence: notes,
    };
    // reject tiles that are not on the floor before handing out a token
    state.to_sequence(&GridLayout::default())?;
    let token = codec::encode(&state)?;
    Ok(match base_url {
        Some(base) => codec::share_url(base, &token),
        None => token,
    })
}

pub fn load_session(input: &str) -> anyhow::Result<Session> {
    let mut session = Session::new();
    session
        .load_shared(codec::extract_token(input), &mut ManualScheduler::new())
        .context("loading share token")?;
    Ok(session)
}

pub fn render(input: &str, out_dir: PathBuf) -> anyhow::Result<PathBuf> {
    let session = load_session(input)?;
    let mut encoder = default_encoder(soundscape_core::SAMPLE_RATE)?;
    let file = session
        .export(encoder.as_mut(), &RenderSettings::default(), epoch_ms())?
        .ok_or_else(|| anyhow!("token has no notes to render"))?;
    std::fs::create_dir_all(&out_dir)
        .with_context(|| format!("creating {}", out_dir.display()))?;
    let path = out_dir.join(&file.file_name);
    std::fs::write(&path, &file.bytes).with_context(|| format!("writing {}", path.display()))?;
    log::info!(
        "rendered {} events with {} to {}",
        session.sequence().len(),
        session.kit(),
        path.display()
    );
    Ok(path)
}

pub fn list() {
    println!("Kits:");
    for (n, kit) in SoundKit::ALL.iter().enumerate() {
        let env = kit.envelope();
        println!(
            "  {} {:<12} {:<8} a={} d={} s={} r={}",
            n + 1,
            kit.name(),
            env.waveform.as_str(),
            env.attack,
            env.decay,
            env.sustain,
            env.release
        );
    }
    println!("Themes:");
    for theme in Theme::ALL {
        println!("  {:<14} {}", theme.name(), theme.palette().primary);
    }
}
