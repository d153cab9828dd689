//! `tonewatch` CLI: analyze a recorded radio-scanner clip for paging-style
//! tone signals and print the detections as JSON.

mod cli;

use std::io::{Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use cli::{Cli, ConfigAction};
use tonewatch::audio::AudioSource;
use tonewatch::config::EngineConfig;
use tonewatch::EngineError;

fn main() -> ExitCode {
    let args = Cli::parse();

    let filter = if args.verbose {
        EnvFilter::new("debug")
    } else if args.quiet {
        EnvFilter::new("error")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let result = match args.command {
        cli::Commands::Analyze {
            input,
            config,
            output,
            pretty,
            no_pulsed,
            no_two_tone,
            no_long,
            no_hi_low,
            mdc,
            dtmf,
            debug,
        } => run_analyze(AnalyzeArgs {
            input,
            config,
            output,
            pretty,
            no_pulsed,
            no_two_tone,
            no_long,
            no_hi_low,
            mdc,
            dtmf,
            debug,
        }),
        cli::Commands::Config { action } => run_config(action),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

struct AnalyzeArgs {
    input: String,
    config: Option<PathBuf>,
    output: Option<PathBuf>,
    pretty: bool,
    no_pulsed: bool,
    no_two_tone: bool,
    no_long: bool,
    no_hi_low: bool,
    mdc: bool,
    dtmf: bool,
    debug: bool,
}

fn run_analyze(args: AnalyzeArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut cfg = match &args.config {
        Some(path) => EngineConfig::try_load(path)?,
        None => EngineConfig::default(),
    };

    if args.no_pulsed {
        cfg.detectors.pulsed = false;
    }
    if args.no_two_tone {
        cfg.detectors.two_tone = false;
    }
    if args.no_long {
        cfg.detectors.long_tone = false;
    }
    if args.no_hi_low {
        cfg.detectors.hi_low = false;
    }
    if args.mdc {
        cfg.detectors.mdc = true;
    }
    if args.dtmf {
        cfg.detectors.dtmf = true;
    }
    if args.debug {
        cfg.debug = true;
    }

    let source = resolve_source(&args.input)?;
    info!(input = %args.input, "starting analysis");

    let result = tonewatch::analyze(source, &cfg)?;

    let rendered = if args.pretty {
        serde_json::to_string_pretty(&result)?
    } else {
        serde_json::to_string(&result)?
    };

    match args.output {
        Some(path) => std::fs::write(path, rendered)?,
        None => println!("{rendered}"),
    }

    Ok(())
}

/// Turn the CLI's input string into an [`AudioSource`]: `-` reads raw bytes
/// from stdin, an `http(s)://` prefix is a remote fetch, anything else is a
/// local path.
fn resolve_source(input: &str) -> Result<AudioSource, EngineError> {
    if input == "-" {
        let mut bytes = Vec::new();
        std::io::stdin()
            .read_to_end(&mut bytes)
            .map_err(|e| EngineError::AudioLoad(format!("failed to read stdin: {e}")))?;
        return Ok(AudioSource::Bytes(bytes));
    }
    if input.starts_with("http://") || input.starts_with("https://") {
        return Ok(AudioSource::Url(input.to_string()));
    }
    Ok(AudioSource::Path(PathBuf::from(input)))
}

fn run_config(action: ConfigAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ConfigAction::Init { path, force } => {
            let path = path.unwrap_or_else(EngineConfig::default_path);
            if path.exists() && !force {
                return Err(format!(
                    "{} already exists; pass --force to overwrite",
                    path.display()
                )
                .into());
            }
            EngineConfig::default().save(&path)?;
            println!("wrote default profile to {}", path.display());
            Ok(())
        }
        ConfigAction::Show { path } => {
            let path = path.unwrap_or_else(EngineConfig::default_path);
            let cfg = EngineConfig::try_load(&path)?;
            let mut stdout = std::io::stdout();
            write!(stdout, "{}", toml::to_string_pretty(&cfg)?)?;
            Ok(())
        }
        ConfigAction::Reset { path } => {
            let path = path.unwrap_or_else(EngineConfig::default_path);
            if path.exists() {
                std::fs::remove_file(&path)?;
                println!("removed {}", path.display());
            } else {
                println!("no saved profile at {}", path.display());
            }
            Ok(())
        }
    }
}
