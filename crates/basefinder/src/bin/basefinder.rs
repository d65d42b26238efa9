//! basefinder CLI: run the locator over a list of frames.

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use basefinder::{detect, BaseLocator, FrameList, FrameReport, LocatorParams};
use clap::{ArgAction, Args, Parser, Subcommand};
use log::{info, LevelFilter};

type CliError = Box<dyn std::error::Error>;
type CliResult<T> = Result<T, CliError>;

#[derive(Parser)]
#[command(name = "basefinder")]
#[command(about = "Locate a ground target from armor light bars and fiducial tags")]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit logs as JSON lines (requires the `tracing` feature).
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Process every frame of a frame list in order.
    Run(RunArgs),

    /// Print the default configuration as JSON.
    DefaultConfig,
}

#[derive(Debug, Clone, Args)]
struct RunArgs {
    /// Frame list JSON: {"frames": [{"image": "...", "tags": [...]}]}.
    #[arg(long)]
    frames: PathBuf,

    /// Locator configuration JSON; missing fields keep their defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Where to write the per-frame reports (stdout when omitted).
    #[arg(long)]
    out: Option<PathBuf>,
}

fn level_for(verbose: u8) -> LevelFilter {
    match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

#[cfg(not(feature = "tracing"))]
fn init_logging(verbose: u8, _json: bool) -> CliResult<()> {
    basefinder::core::init_with_level(level_for(verbose))?;
    Ok(())
}

#[cfg(feature = "tracing")]
fn init_logging(verbose: u8, json: bool) -> CliResult<()> {
    tracing_log::LogTracer::init()?;
    log::set_max_level(level_for(verbose));
    basefinder::core::init_tracing(json);
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match try_main(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn try_main(cli: Cli) -> CliResult<()> {
    init_logging(cli.verbose, cli.log_json)?;

    match cli.command {
        Commands::Run(args) => run(&args),
        Commands::DefaultConfig => {
            let json = serde_json::to_string_pretty(&LocatorParams::default())?;
            println!("{json}");
            Ok(())
        }
    }
}

fn run(args: &RunArgs) -> CliResult<()> {
    let params = match &args.config {
        Some(path) => LocatorParams::load(path)?,
        None => LocatorParams::default(),
    };
    let list = FrameList::load(&args.frames)?;
    info!("processing {} frames from {}", list.frames.len(), args.frames.display());

    let mut locator = BaseLocator::new(params)?;
    let mut reports: Vec<FrameReport> = Vec::with_capacity(list.frames.len());
    for entry in &list.frames {
        let img = detect::load_rgb(&entry.image)?;
        let report = detect::process_image(&mut locator, &img, &entry.tags);
        if let (true, Some(ground)) = (report.is_stationary(), report.ground) {
            info!(
                "frame {}: target stationary at ({:.3}, {:.3}) m",
                report.frame_index, ground.x, ground.y
            );
        }
        reports.push(report);
    }

    let json = serde_json::to_string_pretty(&reports)?;
    match &args.out {
        Some(path) => {
            std::fs::write(path, json)?;
            info!("reports written to {}", path.display());
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{json}")?;
        }
    }
    Ok(())
}
