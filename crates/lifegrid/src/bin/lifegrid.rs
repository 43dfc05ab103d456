//! # LIFEGRID
//!
//! Headless Game of Life runner.
//!
//! ## Usage
//!
//! ```bash
//! lifegrid --strategy barrier --size 40 --pattern "Glider Gun" --generations 200
//! RUST_LOG=debug lifegrid --config lifegrid.toml --quiet
//! ```

use std::process::ExitCode;
use std::sync::atomic::AtomicBool;

use lifegrid::{parse_args, run, Command, FileConfig, LogRenderer, RunConfig, RunError, TerminalRenderer, USAGE};
use lifegrid_core::Renderer;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .try_init();
}

fn load_config() -> Result<Option<RunConfig>, RunError> {
    let cli = match parse_args(std::env::args().skip(1))? {
        Command::Help => return Ok(None),
        Command::Run(cli) => cli,
    };
    let file = match &cli.config {
        Some(path) => FileConfig::load(path)?,
        None => FileConfig::default(),
    };
    Ok(Some(RunConfig::resolve(&file, &cli)?))
}

fn main() -> ExitCode {
    init_tracing();

    let config = match load_config() {
        Ok(Some(config)) => config,
        Ok(None) => {
            println!("{USAGE}");
            return ExitCode::SUCCESS;
        }
        Err(err) => {
            eprintln!("error: {err}");
            eprintln!();
            eprintln!("{USAGE}");
            return ExitCode::from(2);
        }
    };

    if config.quiet {
        println!("╔══════════════════════════════════════════════════════════════════╗");
        println!("║         LIFEGRID                                                 ║");
        println!("╚══════════════════════════════════════════════════════════════════╝");
        println!("│ Strategy:           {}", config.strategy);
        println!("│ Grid:               {0}×{0}", config.dimension);
        println!("│ Pattern:            {}", config.pattern);
        println!("│ Interval:           {} ms", config.interval.as_millis());
        if config.generations == 0 {
            println!("│ Generations:        until stopped");
        } else {
            println!("│ Generations:        {}", config.generations);
        }
        println!();
    }

    let renderer: Box<dyn Renderer> = if config.quiet {
        Box::new(LogRenderer::new(config.strategy))
    } else {
        Box::new(TerminalRenderer::stdout(config.strategy))
    };

    let stop = AtomicBool::new(false);
    match run(&config, renderer, &stop) {
        Ok(summary) => {
            println!("┌─ RUN SUMMARY ────────────────────────────────────────────────────");
            println!("│ Generations:        {}", summary.generations);
            println!("│ Live Cells:         {}", summary.live);
            println!("│ Seed:               {}", summary.seed);
            println!("│ Avg Tick Time:      {} μs", summary.stats.avg_tick_us);
            println!("│ Max Tick Time:      {} μs", summary.stats.max_tick_us);
            println!("│ Late Ticks:         {}", summary.stats.late_ticks);
            println!("│ Elapsed:            {:.2}s", summary.elapsed.as_secs_f64());
            println!("└──────────────────────────────────────────────────────────────────");
            ExitCode::SUCCESS
        }
        Err(err) => {
            tracing::error!(error = %err, "run failed");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
