//! `shotdiff`: classifies the screenshots of a visual regression run and
//! reports the comparison and upload manifests.

mod error;

use crate::error::{ErrorKind, Result};
use clap::{Parser, ValueEnum};
use exn::ResultExt;
use shotdiff_config::{Config, Switches};
use shotdiff_report::{
    ApiAction, ExitCoordinator, ExitStatus, ReportPayload, RunProperties, TelemetryReporter, TracingTelemetry,
    Transport, WriterTransport, load_event, send_finalize, send_to_api,
};
use shotdiff_shots::folders::{ensure_shot_folders, promote_current};
use shotdiff_shots::items::read_shot_items;
use shotdiff_shots::{ComparisonManifestBuilder, ShotListing, classify, list_shots};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
enum Mode {
    /// Compare current shots against the baseline and report the result.
    #[default]
    Compare,
    /// Replace the baseline with the current shots.
    Update,
    /// Close the build on the reporting API.
    Finalize,
}

#[derive(Debug, Parser)]
#[command(name = "shotdiff", author, version, about, long_about = None)]
struct Cli {
    #[arg(value_enum)]
    command: Option<Mode>,

    /// Same as the positional mode; wins when both are given.
    #[arg(short, long, value_enum)]
    mode: Option<Mode>,

    /// Configuration file (TOML, YAML or JSON). Discovered when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[arg(short, long)]
    verbose: bool,
}
impl Cli {
    fn mode(&self) -> Mode {
        self.mode.or(self.command).unwrap_or_default()
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    // Stdout carries the report payloads; logs go to stderr.
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let started = Instant::now();
    let mode = cli.mode();
    let switches = Switches::from_env(mode == Mode::Update);
    let config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(err) => {
            tracing::error!(error = ?err, "Could not load configuration");
            return ExitStatus::Failure.into();
        },
    };

    let reporter = TelemetryReporter::new(Arc::new(TracingTelemetry), &config.modes());
    let coordinator = ExitCoordinator::new(reporter, switches.telemetry_disabled);
    let transport = WriterTransport::stdout();

    let (properties, status) = execute(&config, switches, mode, &transport, started).await;
    coordinator.finish(&properties, Some(status)).await.into()
}

/// Runs `mode` and turns the outcome into what the run reports on exit.
async fn execute(
    config: &Config,
    switches: Switches,
    mode: Mode,
    transport: &dyn Transport,
    started: Instant,
) -> (RunProperties, ExitStatus) {
    match run(config, switches, mode, transport).await {
        Ok(shots_number) => (RunProperties::finished(started.elapsed(), shots_number), ExitStatus::Success),
        Err(err) => {
            tracing::error!(error = ?err, "Run failed");
            (RunProperties::failed(&*err), ExitStatus::Failure)
        },
    }
}

/// Returns the number of screenshots the run handled.
async fn run(config: &Config, switches: Switches, mode: Mode, transport: &dyn Transport) -> Result<usize> {
    if mode == Mode::Finalize {
        send_finalize(transport, config).await.or_raise(|| ErrorKind::Report)?;
        return Ok(0);
    }

    let paths = config.paths();
    ensure_shot_folders(&paths).or_raise(|| ErrorKind::Shots)?;
    if switches.update_mode {
        return promote_current(&paths).or_raise(|| ErrorKind::Shots);
    }

    let shots_number = list_shots(&paths.current).len();
    let changes = classify(&ShotListing::from_paths(&paths));
    if config.generate_only {
        tracing::info!(shots = shots_number, "Running in generate-only mode; nothing to report");
        return Ok(shots_number);
    }

    let destination = config.destination().or_raise(|| ErrorKind::Config)?;
    let base_url = config.image_base_url().or_raise(|| ErrorKind::Config)?;
    let event = load_event(config.event_file_path.as_deref()).or_raise(|| ErrorKind::Report)?;
    let payload = ReportPayload::from_config(config).or_raise(|| ErrorKind::Report)?;
    send_to_api(transport, ApiAction::Init, &payload).await.or_raise(|| ErrorKind::Report)?;

    let manifest = ComparisonManifestBuilder::new(&paths, &destination)
        .build(&changes, base_url)
        .or_raise(|| ErrorKind::Shots)?;
    tracing::info!(
        comparisons = manifest.comparisons.len(),
        uploads = manifest.uploads.len(),
        "Prepared comparison manifest"
    );
    let payload = payload
        .with("comparisons", &manifest.comparisons)
        .and_then(|payload| payload.with("uploads", &manifest.uploads))
        .and_then(|payload| payload.with("event", &event))
        .or_raise(|| ErrorKind::Report)?;
    // Pre-captured shots are handed on as items for the pixel-diff step.
    let payload = match &config.custom_shots {
        Some(custom) => payload
            .with("shotItems", read_shot_items(&custom.current_shots_path, &paths, config.threshold))
            .or_raise(|| ErrorKind::Report)?,
        None => payload,
    };
    send_to_api(transport, ApiAction::Result, &payload).await.or_raise(|| ErrorKind::Report)?;
    Ok(shots_number)
}
