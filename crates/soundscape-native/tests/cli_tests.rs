// Host-side tests for the command-line helpers.
// The CLI is a binary crate, so the module is included directly.

#![allow(dead_code)]
mod cli {
    include!("../src/cli.rs");
}

use clap::Parser;
use cli::*;
use soundscape_core::{codec, SharedNote};

fn scratch_dir(name: &str) -> std::path::PathBuf {
    let dir = std::env::temp_dir().join(format!("soundscape-{name}-{}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    dir
}

#[test]
fn notes_parse_from_tile_colon_offset() {
    assert_eq!(parse_note("5:0"), Ok(SharedNote { i: 5, t: 0.0 }));
    assert_eq!(parse_note(" 7 : 500.5 "), Ok(SharedNote { i: 7, t: 500.5 }));
    assert!(parse_note("7").is_err());
    assert!(parse_note("-1:0").is_err());
    assert!(parse_note("3:-10").is_err());
    assert!(parse_note("3:NaN").is_err());
}

#[test]
fn encode_builds_a_decodable_token() {
    let notes = vec![SharedNote { i: 5, t: 0.0 }, SharedNote { i: 7, t: 500.0 }];
    let token = encode("Oceanic Blue", "Bell Tone", notes.clone(), None).unwrap();
    let state = codec::decode(&token).unwrap();
    assert_eq!(state.theme.as_deref(), Some("Oceanic Blue"));
    assert_eq!(state.kit.as_deref(), Some("Bell Tone"));
    assert_eq!(state.sequence, notes);
}

#[test]
fn encode_can_print_a_share_link() {
    let link = encode(
        "Forest Green",
        "Wobble",
        vec![SharedNote { i: 1, t: 0.0 }],
        Some("https://example.org/"),
    )
    .unwrap();
    assert!(link.starts_with("https://example.org/?state="));
    assert!(codec::decode(codec::extract_token(&link)).is_ok());
}

#[test]
fn encode_rejects_unknown_names_and_tiles() {
    let note = || vec![SharedNote { i: 1, t: 0.0 }];
    assert!(encode("Neon", "Bell Tone", note(), None).is_err());
    assert!(encode("Oceanic Blue", "Kazoo", note(), None).is_err());
    assert!(encode(
        "Oceanic Blue",
        "Bell Tone",
        vec![SharedNote { i: 9999, t: 0.0 }],
        None
    )
    .is_err());
}

#[test]
fn render_writes_an_mp3_named_after_the_time() {
    let token = encode(
        "Oceanic Blue",
        "Bell Tone",
        vec![SharedNote { i: 5, t: 0.0 }, SharedNote { i: 7, t: 500.0 }],
        None,
    )
    .unwrap();
    let dir = scratch_dir("render");
    let path = render(&token, dir.clone()).unwrap();
    let name = path.file_name().unwrap().to_string_lossy().into_owned();
    assert!(name.starts_with("Soundscape-") && name.ends_with(".mp3"), "{name}");

    let bytes = std::fs::read(&path).unwrap();
    // MPEG frame sync
    assert_eq!(bytes[0], 0xFF);
    assert_eq!(bytes[1] & 0xE0, 0xE0);
    // 2.5 s at 128 kbit/s is about 40 kB; 16-bit PCM would be 441 kB
    assert!((30_000..60_000).contains(&bytes.len()), "{} bytes", bytes.len());
    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn render_accepts_share_links_and_refuses_empty_takes() {
    let dir = scratch_dir("empty");
    let empty = codec::encode(&Default::default()).unwrap();
    let link = format!("https://example.org/?state={empty}");
    assert!(render(&link, dir.clone()).is_err());
    assert!(render("not a token", dir.clone()).is_err());
    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn cli_parses_repeated_notes() {
    let args = Cli::try_parse_from([
        "soundscape", "encode", "--kit", "Wobble", "-n", "1:0", "--note", "2:250",
    ])
    .unwrap();
    match args.command {
        Commands::Encode {
            theme, kit, notes, ..
        } => {
            assert_eq!(theme, "Oceanic Blue");
            assert_eq!(kit, "Wobble");
            assert_eq!(notes.len(), 2);
        }
        _ => panic!("expected encode"),
    }
    assert!(Cli::try_parse_from(["soundscape", "encode"]).is_err());
}
