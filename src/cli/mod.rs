//! Argument parsing, configuration loading, and result rendering for the
//! `tonewatch` binary. The engine itself (`crate::analyze`) knows nothing
//! about any of this.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "tonewatch")]
#[command(author, version, about = "Paging-tone detection for recorded radio-scanner audio")]
#[command(long_about = "Analyzes recorded radio-scanner audio for paging-style tone signals: \
    two-tone sequential (Quick Call), long single tones, hi-low warble, and pulsed single-tone.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Analyze an audio clip for paging tones
    Analyze {
        /// Audio input: a file path, an http(s) URL, or `-` to read raw bytes from stdin
        input: String,

        /// Load engine parameters from a saved TOML profile (see `tonewatch config init`)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Write the JSON result here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Pretty-print the JSON result
        #[arg(long)]
        pretty: bool,

        /// Disable the pulsed single-tone detector
        #[arg(long)]
        no_pulsed: bool,

        /// Disable the two-tone (Quick Call) detector
        #[arg(long)]
        no_two_tone: bool,

        /// Disable the long-tone detector
        #[arg(long)]
        no_long: bool,

        /// Disable the hi-low warble detector
        #[arg(long)]
        no_hi_low: bool,

        /// Enable the external MDC1200/FleetSync decoder
        #[arg(long)]
        mdc: bool,

        /// Enable the external DTMF decoder
        #[arg(long)]
        dtmf: bool,

        /// Dump a verbose per-group trace while analyzing
        #[arg(long)]
        debug: bool,
    },

    /// Manage a saved parameter profile
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Write the default parameter profile to disk
    Init {
        /// Where to write the profile (defaults to the platform config directory)
        #[arg(short, long)]
        path: Option<PathBuf>,

        /// Overwrite an existing profile
        #[arg(short, long)]
        force: bool,
    },
    /// Print the effective parameter profile (saved file, or built-in defaults)
    Show {
        #[arg(short, long)]
        path: Option<PathBuf>,
    },
    /// Delete a saved profile, reverting to built-in defaults
    Reset {
        #[arg(short, long)]
        path: Option<PathBuf>,
    },
}
