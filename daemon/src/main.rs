use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::{mpsc, Arc};
use std::time::Duration;

use clap::{Parser, Subcommand};
use log::{error, info, warn};

use labelvault::scheduler::RUN_HANDLER;
use labelvault::{load_config, Config, InstallOutcome, LocalStack, RunReport, TriggerScheduler};

#[derive(Parser, Debug)]
#[command(name = "labelvault")]
#[command(version)]
#[command(about = "Archives labelled mailbox conversations as PDF documents", long_about = None)]
struct Cli {
    /// Path to the JSON configuration file
    #[arg(short, long, env = "LABELVAULT_CONFIG", default_value = "labelvault.json")]
    config: PathBuf,

    /// Log what would be archived without changing anything
    #[arg(long)]
    simulate: bool,

    /// Default log filter; RUST_LOG overrides it
    #[arg(long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Process every configured label once and exit
    Run,
    /// Process labels on a recurring schedule until interrupted
    Watch {
        /// Minutes between runs; defaults to the configured interval
        #[arg(long)]
        interval_minutes: Option<u64>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = labelvault::telemetry::init_tracing(&cli.log_level) {
        eprintln!("{}", e);
        return ExitCode::FAILURE;
    }

    info!("Starting labelvault v{}", env!("CARGO_PKG_VERSION"));

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> labelvault::Result<()> {
    let mut config = load_config(&cli.config)?;
    if cli.simulate {
        config.archive.simulation = true;
    }
    if config.archive.simulation {
        info!("Simulation mode: nothing will be written or relabelled");
    }

    let stack = LocalStack::open(&config)?;

    match cli.command {
        Command::Run => {
            let report = stack.run(&config);
            summarize(&report);
            Ok(())
        }
        Command::Watch { interval_minutes } => {
            let minutes = interval_minutes.unwrap_or(config.schedule.interval_minutes);
            watch(config, stack, Duration::from_secs(minutes.saturating_mul(60)))
        }
    }
}

fn watch(config: Config, stack: LocalStack, interval: Duration) -> labelvault::Result<()> {
    let config = Arc::new(config);
    let stack = Arc::new(stack);
    let scheduler = TriggerScheduler::new();

    let job = {
        let config = Arc::clone(&config);
        let stack = Arc::clone(&stack);
        move || summarize(&stack.run(&config))
    };

    if scheduler.install(RUN_HANDLER, interval, job)? == InstallOutcome::AlreadyExists {
        warn!("Trigger '{}' was already installed", RUN_HANDLER);
    }
    scheduler.trigger_now(RUN_HANDLER)?;

    let (stop_tx, stop_rx) = mpsc::channel();
    ctrlc::set_handler(move || {
        let _ = stop_tx.send(());
    })
    .map_err(|e| labelvault::ArchiverError::Scheduler(format!("signal handler: {}", e)))?;

    info!("Watching every {} minutes; press Ctrl-C to stop", interval.as_secs() / 60);
    let _ = stop_rx.recv();

    info!("Shutting down");
    scheduler.stop_all()
}

fn summarize(report: &RunReport) {
    for label in &report.labels {
        info!(
            "{}: {} conversations, {} archived, {} simulated, {} skipped, {} failed",
            label.label,
            label.conversations,
            label.archived(),
            label.simulated(),
            label.skipped(),
            label.failed()
        );
    }
    for failure in &report.failed_labels {
        error!("{}: {}", failure.label, failure.error);
    }
}
