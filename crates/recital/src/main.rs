//! Recital command-line player.
//!
//! Plays narration scripts in the terminal with simulated speech, audits scene
//! tables against their scripts, and prints estimated timelines.

use clap::Parser;

mod cli;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let cli = Cli::parse();

    recital::init_telemetry(cli.verbose)?;

    match cli.command {
        Commands::Play {
            script,
            scenes,
            scene_dir,
            manifest,
            voice,
            rate,
            fail_voice,
        } => {
            let config = cli::load_config(cli.config.as_deref())?;
            cli::play(cli::PlayOptions {
                config,
                script,
                scenes,
                scene_dir,
                manifest,
                voice,
                rate,
                fail_voices: fail_voice,
            })
            .await?;
        }
        Commands::Check { script, scenes } => {
            if !cli::check(&script, &scenes)? {
                std::process::exit(1);
            }
        }
        Commands::Outline {
            script,
            manifest,
            rate,
            json,
        } => {
            let config = cli::load_config(cli.config.as_deref())?;
            cli::outline(&config, &script, manifest.as_deref(), rate, json)?;
        }
    }

    Ok(())
}
