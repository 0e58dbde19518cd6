// Copyright (C) 2026 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//
use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{crate_version, Parser, Subcommand};
use midilisten::player::LoggingPlayer;
use midilisten::{config, midi, ListenToMidi, RecordBuffer};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[clap(
    author = "Michael Wilson",
    version = crate_version!(),
    about = "Routes live MIDI input to a sample player."
)]
struct Cli {
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Listens to the configured MIDI input until interrupted.
    Listen {
        /// The path to the listener config.
        config_path: String,
    },
    /// Verifies a listener config and prints the resolved settings.
    Verify {
        /// The path to the listener config.
        config_path: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Listen { config_path } => {
            let listen = config::load(&PathBuf::from(&config_path))?;
            let input = midi::get_input(listen.device())?;
            let record_buffer = listen.recording().then(RecordBuffer::new);

            let player = Arc::new(LoggingPlayer::new())
                .listen_to_midi(input.as_ref(), listen.to_options(record_buffer.clone()))?;

            tokio::signal::ctrl_c().await?;
            input.set_handler(None)?;
            info!("Stopped listening.");

            if player.active_voices() > 0 {
                warn!(
                    voices = player.active_voices(),
                    "Voices were still sounding when listening stopped."
                );
            }

            if let Some(record_buffer) = record_buffer {
                println!("{}", serde_json::to_string_pretty(&record_buffer.take())?);
            }
        }
        Commands::Verify { config_path } => {
            let listen = config::load(&PathBuf::from(&config_path))?;
            println!("{}", listen);
        }
    }

    Ok(())
}
