use std::io::{self, BufRead, IsTerminal, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use time::OffsetDateTime;
use tracing_subscriber::EnvFilter;

use esxi_ping_report::config::Settings;
use esxi_ping_report::console::{Console, Terminal};
use esxi_ping_report::locate::find_input;
use esxi_ping_report::pipeline::{self, RunOutcome};
use esxi_ping_report::probe::PingProber;
use esxi_ping_report::types::Tone;

/// Command-line arguments of esxi-ping.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "esxi-ping",
    version,
    about = "Ping every ESXi host named in an inventory CSV export and write a reachability report.",
    long_about = None
)]
struct Cli {
    /// Directory searched for the single input .csv file; the report is written next to it.
    #[arg(long, default_value = ".")]
    dir: PathBuf,

    /// Use this CSV file instead of searching --dir.
    #[arg(long)]
    input: Option<PathBuf>,

    /// Do not wait for Enter before exiting.
    #[arg(long = "no-pause", default_value_t = false)]
    no_pause: bool,

    /// Disable colored console output.
    #[arg(long = "no-color", default_value_t = false)]
    no_color: bool,

    /// Log probe details to stderr (overridden by RUST_LOG).
    #[arg(short, long, default_value_t = false)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    // The local offset can only be read safely while the process is single-threaded.
    let started = local_now();

    let color = !cli.no_color && std::env::var_os("NO_COLOR").is_none() && io::stdout().is_terminal();
    let mut console = Terminal::new(color);

    let code = match execute(&cli, &mut console, started) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            console.line(Tone::Negative, &format!("Error: {e:#}"));
            ExitCode::FAILURE
        }
    };

    if !cli.no_pause && io::stdin().is_terminal() {
        pause();
    }
    code
}

fn execute(cli: &Cli, console: &mut Terminal, started: OffsetDateTime) -> Result<RunOutcome> {
    let input = match &cli.input {
        Some(path) => path.clone(),
        None => find_input(&cli.dir)?,
    };
    console.line(Tone::Neutral, &format!("Input: {}", input.display()));
    console.line(Tone::Neutral, "");

    let settings = Settings::default();
    let prober = PingProber::new(settings.probe_count, settings.probe_deadline);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start runtime")?;
    let outcome = runtime.block_on(pipeline::run(&input, &settings, &prober, console, started))?;

    let dir = input.parent().unwrap_or_else(|| std::path::Path::new("."));
    console.line(Tone::Neutral, "");
    console.line(
        Tone::Neutral,
        &format!("Results written to {}", dir.join(&settings.summary_file).display()),
    );
    Ok(outcome)
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "esxi_ping_report=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn local_now() -> OffsetDateTime {
    OffsetDateTime::now_local().unwrap_or_else(|e| {
        tracing::warn!("local UTC offset unavailable ({e}); using UTC");
        OffsetDateTime::now_utc()
    })
}

fn pause() {
    print!("Press Enter to exit...");
    if let Err(e) = io::stdout().flush() {
        tracing::debug!("failed to flush prompt: {e}");
    }
    let mut buf = String::new();
    if let Err(e) = io::stdin().lock().read_line(&mut buf) {
        tracing::debug!("failed to read from stdin: {e}");
    }
}
