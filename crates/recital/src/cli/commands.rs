//! CLI command definitions.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Recital - narrated presentation player
#[derive(Parser)]
#[command(name = "recital")]
#[command(about = "Play narration scripts and keep their scenes in sync", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Playback settings file (defaults to ~/.config/recital/recital.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Play a narration script interactively with simulated speech
    Play {
        /// Path to the script (.toml or .json)
        script: PathBuf,

        /// Scene table for the script
        #[arg(long, conflicts_with = "scene_dir")]
        scenes: Option<PathBuf>,

        /// Directory of scene tables, matched to the script by id
        #[arg(long)]
        scene_dir: Option<PathBuf>,

        /// Measured durations of pre-generated audio
        #[arg(long)]
        manifest: Option<PathBuf>,

        /// Voice to narrate with
        #[arg(long)]
        voice: Option<String>,

        /// Playback rate multiplier
        #[arg(long)]
        rate: Option<f32>,

        /// Voices the simulated engine rejects (repeatable)
        #[arg(long)]
        fail_voice: Vec<String>,
    },

    /// Check a scene table against its script
    Check {
        /// Path to the script
        script: PathBuf,

        /// Path to the scene table
        #[arg(long)]
        scenes: PathBuf,
    },

    /// Print the estimated timeline of a script
    Outline {
        /// Path to the script
        script: PathBuf,

        /// Measured durations of pre-generated audio
        #[arg(long)]
        manifest: Option<PathBuf>,

        /// Playback rate multiplier
        #[arg(long, default_value_t = 1.0)]
        rate: f32,

        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },
}
