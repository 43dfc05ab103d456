//! # Run Loop
//!
//! ```text
//! RunConfig ─► PatternCatalog ─► initialize ─► [wait · tick · publish]* ─► shutdown
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use lifegrid_core::{PatternProvider, Renderer, SimulationBuilder};
use lifegrid_patterns::PatternCatalog;

use crate::config::RunConfig;
use crate::error::RunError;
use crate::pacer::{TickPacer, TickStats};

/// What a finished run did.
#[derive(Clone, Copy, Debug)]
pub struct RunSummary {
    /// Generations computed.
    pub generations: u64,
    /// Live cells in the last generation.
    pub live: usize,
    /// Seed the random fill used.
    pub seed: u64,
    /// Tick timing.
    pub stats: TickStats,
    /// Wall time from first tick to shutdown.
    pub elapsed: Duration,
}

/// Seed used when none is configured.
#[must_use]
pub fn time_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| elapsed.as_secs() ^ u64::from(elapsed.subsec_nanos()))
}

/// Runs one simulation until `config.generations` ticks have completed
/// (never, if 0) or `stop` is set.
///
/// # Errors
///
/// Returns [`RunError::Life`] if the run cannot start or a tick fails.
/// Workers are shut down on every path.
pub fn run(config: &RunConfig, renderer: Box<dyn Renderer>, stop: &AtomicBool) -> Result<RunSummary, RunError> {
    let seed = config.seed.unwrap_or_else(time_seed);
    let mut catalog = PatternCatalog::new(seed);
    let cells = catalog.initial_cells(config.pattern.name(), config.dimension);

    tracing::info!(
        strategy = %config.strategy,
        dimension = config.dimension,
        pattern = %config.pattern,
        seed,
        interval_ms = u64::try_from(config.interval.as_millis()).unwrap_or(u64::MAX),
        "run starting"
    );

    let mut sim = SimulationBuilder::new(config.dimension, config.strategy)
        .cells(cells)
        .executor(config.executor)
        .stack_size(config.stack_size)
        .renderer(renderer);
    if let Some(threads) = config.pool_threads {
        sim = sim.pool_threads(threads);
    }
    let mut sim = sim.build()?;

    let mut pacer = TickPacer::new(config.interval);
    let started = Instant::now();
    let outcome = loop {
        if stop.load(Ordering::Acquire) {
            break Ok(());
        }
        if config.generations != 0 && pacer.tick_count() >= config.generations {
            break Ok(());
        }

        pacer.wait_for_next_tick();
        let tick_start = pacer.begin_tick();
        if let Err(err) = sim.tick() {
            break Err(err);
        }
        pacer.end_tick(tick_start);
    };

    let snapshot = sim.snapshot();
    sim.shutdown();
    outcome?;

    let summary = RunSummary {
        generations: snapshot.generation(),
        live: snapshot.live_count(),
        seed,
        stats: *pacer.stats(),
        elapsed: started.elapsed(),
    };
    tracing::info!(
        generations = summary.generations,
        live = summary.live,
        avg_tick_us = summary.stats.avg_tick_us,
        max_tick_us = summary.stats.max_tick_us,
        late_ticks = summary.stats.late_ticks,
        "run finished"
    );
    Ok(summary)
}
