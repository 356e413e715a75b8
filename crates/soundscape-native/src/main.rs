//! Command-line front-end: build share tokens, render them to MP3 and
//! (with the `live` feature) play them through the default output device.

use clap::Parser;
use cli::{Cli, Commands};

mod cli;
#[cfg(feature = "live")]
mod live;

fn main() -> anyhow::Result<()> {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .init();

    let args = Cli::parse();
    match args.command {
        Commands::Encode {
            theme,
            kit,
            notes,
            base_url,
        } => println!("{}", cli::encode(&theme, &kit, notes, base_url.as_deref())?),
        Commands::Render { token, out_dir } => {
            let path = cli::render(&token, out_dir)?;
            println!("{}", path.display());
        }
        #[cfg(feature = "live")]
        Commands::Play { token } => {
            let session = cli::load_session(&token)?;
            if session.sequence().is_empty() {
                anyhow::bail!("token has no notes to play");
            }
            live::play(session)?;
        }
        Commands::List => cli::list(),
    }
    Ok(())
}
