//! # Run Configuration
//!
//! Three layers, later ones winning:
//!
//! ```text
//! defaults  <  TOML file (--config)  <  command-line flags
//! ```
//!
//! ```toml
//! [simulation]
//! strategy = "barrier-synchronized"
//! dimension = 40          # or "40"; clamped to [25, 100], non-numeric → 25
//! pattern = "Glider Gun"
//! seed = 7
//! generations = 500       # 0 = run until stopped
//!
//! [timing]
//! sequential_ms = 100
//! burst_parallel_ms = 100
//! barrier_synchronized_ms = 100
//!
//! [workers]
//! executor = "pool"       # or "scoped-threads"
//! pool_threads = 8
//! stack_kib = 128
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use lifegrid_core::{BurstExecutor, Strategy, DEFAULT_WORKER_STACK_SIZE};
use lifegrid_patterns::Pattern;
use serde::Deserialize;

use crate::error::ConfigError;

/// Smallest accepted grid dimension.
pub const MIN_DIMENSION: usize = 25;
/// Largest accepted grid dimension.
pub const MAX_DIMENSION: usize = 100;
/// Tick interval used when nothing else is configured.
pub const DEFAULT_INTERVAL_MS: u64 = 100;

/// Dimension as written by a user: a number or free text.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum DimensionInput {
    /// A TOML integer.
    Number(i64),
    /// Anything else; only all-digit text is read as a number.
    /// Surrounding whitespace makes the text non-numeric.
    Text(String),
}

impl DimensionInput {
    /// Applies the grid size policy: numbers clamp to
    /// [`MIN_DIMENSION`]..=[`MAX_DIMENSION`], anything non-numeric
    /// (including a sign) falls back to [`MIN_DIMENSION`].
    #[must_use]
    pub fn resolve(&self) -> usize {
        let resolved = match self {
            Self::Number(n) => usize::try_from(*n).map_or(MIN_DIMENSION, clamp_dimension),
            Self::Text(text) => {
                if !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit()) {
                    text.parse().map_or(MAX_DIMENSION, clamp_dimension)
                } else {
                    MIN_DIMENSION
                }
            }
        };

        let matches_input = match self {
            Self::Number(n) => usize::try_from(*n).ok() == Some(resolved),
            Self::Text(text) => text.parse().ok() == Some(resolved),
        };
        if !matches_input {
            tracing::warn!(input = ?self, dimension = resolved, "grid dimension adjusted");
        }
        resolved
    }
}

const fn clamp_dimension(n: usize) -> usize {
    if n < MIN_DIMENSION {
        MIN_DIMENSION
    } else if n > MAX_DIMENSION {
        MAX_DIMENSION
    } else {
        n
    }
}

/// `[simulation]` table.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationSection {
    /// Counting strategy, by any accepted name.
    pub strategy: Option<Strategy>,
    /// Grid dimension.
    pub dimension: Option<DimensionInput>,
    /// Pattern name.
    pub pattern: Option<String>,
    /// Random-fill seed.
    pub seed: Option<u64>,
    /// Generations to run; 0 runs until stopped.
    pub generations: Option<u64>,
}

/// `[timing]` table, milliseconds per tick.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TimingSection {
    /// Sequential cadence.
    pub sequential_ms: Option<u64>,
    /// Burst-parallel cadence.
    pub burst_parallel_ms: Option<u64>,
    /// Barrier-synchronized cadence.
    pub barrier_synchronized_ms: Option<u64>,
}

impl TimingSection {
    fn interval_ms(&self, strategy: Strategy) -> u64 {
        let configured = match strategy {
            Strategy::Sequential => self.sequential_ms,
            Strategy::BurstParallel => self.burst_parallel_ms,
            Strategy::BarrierSynchronized => self.barrier_synchronized_ms,
        };
        configured.unwrap_or(DEFAULT_INTERVAL_MS)
    }
}

/// `[workers]` table.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WorkersSection {
    /// Burst-parallel executor.
    pub executor: Option<BurstExecutor>,
    /// Burst-parallel pool size.
    pub pool_threads: Option<usize>,
    /// Per-cell thread stack, KiB.
    pub stack_kib: Option<usize>,
}

/// Contents of a config file. Every field is optional.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    /// `[simulation]`
    pub simulation: SimulationSection,
    /// `[timing]`
    pub timing: TimingSection,
    /// `[workers]`
    pub workers: WorkersSection,
}

impl FileConfig {
    /// Reads and parses a TOML file.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Parse`] if it does not match the schema.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&text)?;
        tracing::debug!(path = %path.display(), "config file loaded");
        Ok(config)
    }

    /// Parses TOML text.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Parse`] on malformed input or unknown keys.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }
}

/// Command-line overrides. `None` means "not given".
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CliArgs {
    /// `--config <PATH>`
    pub config: Option<PathBuf>,
    /// `--strategy <NAME>`
    pub strategy: Option<String>,
    /// `--size <N>`
    pub size: Option<String>,
    /// `--pattern <NAME>`
    pub pattern: Option<String>,
    /// `--seed <U64>`
    pub seed: Option<u64>,
    /// `--interval-ms <MS>`
    pub interval_ms: Option<u64>,
    /// `--generations <N>`
    pub generations: Option<u64>,
    /// `--executor <NAME>`
    pub executor: Option<String>,
    /// `--quiet`
    pub quiet: bool,
}

/// What the command line asked for.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Run a simulation.
    Run(CliArgs),
    /// Print usage and exit.
    Help,
}

/// Usage text for `--help`.
pub const USAGE: &str = "\
Usage: lifegrid [OPTIONS]

Options:
  -c, --config <PATH>        TOML config file
  -s, --strategy <NAME>      sequential | burst-parallel | barrier-synchronized
  -n, --size <N>             Grid dimension, clamped to 25..=100 (default: 25)
  -p, --pattern <NAME>       Glider | Blinker | Toad | Beacon | Glider Gun | Loafer Synth | Random
      --seed <U64>           Seed for the Random pattern
  -i, --interval-ms <MS>     Tick interval for the chosen strategy (default: 100)
  -g, --generations <N>      Stop after N generations (default: 0, run until stopped)
  -e, --executor <NAME>      Burst-parallel executor: pool | scoped-threads
  -q, --quiet                Log generations instead of drawing them
  -h, --help                 Show this help

With --generations 0 the run has no end of its own: interrupting the
process ends it without a summary and without an orderly worker shutdown.
Pass a generation limit to get both.";

fn parse_number<T: std::str::FromStr>(flag: &str, value: &str) -> Result<T, ConfigError> {
    value.parse().map_err(|_| ConfigError::InvalidValue {
        flag: flag.to_owned(),
        value: value.to_owned(),
    })
}

/// Parses arguments (without the program name).
///
/// # Errors
///
/// [`ConfigError::MissingValue`], [`ConfigError::InvalidValue`] or
/// [`ConfigError::UnknownFlag`].
pub fn parse_args<I>(args: I) -> Result<Command, ConfigError>
where
    I: IntoIterator<Item = String>,
{
    let mut cli = CliArgs::default();
    let mut args = args.into_iter();

    while let Some(flag) = args.next() {
        if matches!(flag.as_str(), "--help" | "-h") {
            return Ok(Command::Help);
        }
        if matches!(flag.as_str(), "--quiet" | "-q") {
            cli.quiet = true;
            continue;
        }

        let value = match flag.as_str() {
            "--config" | "-c" | "--strategy" | "-s" | "--size" | "-n" | "--pattern" | "-p" | "--seed"
            | "--interval-ms" | "-i" | "--generations" | "-g" | "--executor" | "-e" => {
                args.next().ok_or_else(|| ConfigError::MissingValue(flag.clone()))?
            }
            _ => return Err(ConfigError::UnknownFlag(flag)),
        };

        match flag.as_str() {
            "--config" | "-c" => cli.config = Some(PathBuf::from(value)),
            "--strategy" | "-s" => cli.strategy = Some(value),
            "--size" | "-n" => cli.size = Some(value),
            "--pattern" | "-p" => cli.pattern = Some(value),
            "--seed" => cli.seed = Some(parse_number(&flag, &value)?),
            "--interval-ms" | "-i" => cli.interval_ms = Some(parse_number(&flag, &value)?),
            "--generations" | "-g" => cli.generations = Some(parse_number(&flag, &value)?),
            _ => cli.executor = Some(value),
        }
    }

    Ok(Command::Run(cli))
}

/// Fully resolved settings for one run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunConfig {
    /// Counting strategy.
    pub strategy: Strategy,
    /// Grid dimension after clamping and pattern minimums.
    pub dimension: usize,
    /// Starting pattern.
    pub pattern: Pattern,
    /// Random-fill seed; `None` lets the runner pick one.
    pub seed: Option<u64>,
    /// Generations to run; 0 runs until stopped.
    pub generations: u64,
    /// Time between ticks.
    pub interval: Duration,
    /// Burst-parallel executor.
    pub executor: BurstExecutor,
    /// Burst-parallel pool size.
    pub pool_threads: Option<usize>,
    /// Per-cell thread stack size in bytes.
    pub stack_size: usize,
    /// Log generations instead of drawing them.
    pub quiet: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            strategy: Strategy::Sequential,
            dimension: MIN_DIMENSION,
            pattern: Pattern::Random,
            seed: None,
            generations: 0,
            interval: Duration::from_millis(DEFAULT_INTERVAL_MS),
            executor: BurstExecutor::Pool,
            pool_threads: None,
            stack_size: DEFAULT_WORKER_STACK_SIZE,
            quiet: false,
        }
    }
}

impl RunConfig {
    /// Merges a config file with command-line overrides.
    ///
    /// # Errors
    ///
    /// [`ConfigError::UnknownName`] for an unrecognized strategy, executor
    /// or pattern.
    pub fn resolve(file: &FileConfig, cli: &CliArgs) -> Result<Self, ConfigError> {
        let sim = &file.simulation;
        let defaults = Self::default();

        let strategy = match cli.strategy.as_deref() {
            Some(name) => name.parse()?,
            None => sim.strategy.unwrap_or(defaults.strategy),
        };
        let pattern = match cli.pattern.as_deref().or(sim.pattern.as_deref()) {
            Some(name) => name.parse()?,
            None => defaults.pattern,
        };
        let executor = match cli.executor.as_deref() {
            Some(name) => name.parse()?,
            None => file.workers.executor.unwrap_or(defaults.executor),
        };

        let requested = match (&cli.size, &sim.dimension) {
            (Some(text), _) => DimensionInput::Text(text.clone()).resolve(),
            (None, Some(input)) => input.resolve(),
            (None, None) => defaults.dimension,
        };
        let dimension = requested.max(pattern.min_dimension());
        if dimension != requested {
            tracing::info!(%pattern, dimension, "grid enlarged to fit pattern");
        }

        let interval_ms = cli.interval_ms.unwrap_or_else(|| file.timing.interval_ms(strategy));
        let stack_size = file
            .workers
            .stack_kib
            .map_or(defaults.stack_size, |kib| kib.saturating_mul(1024));

        Ok(Self {
            strategy,
            dimension,
            pattern,
            seed: cli.seed.or(sim.seed),
            generations: cli.generations.or(sim.generations).unwrap_or(defaults.generations),
            interval: Duration::from_millis(interval_ms),
            executor,
            pool_threads: file.workers.pool_threads,
            stack_size,
            quiet: cli.quiet,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| (*s).to_owned()).collect()
    }

    fn run_args(list: &[&str]) -> CliArgs {
        match parse_args(args(list)).unwrap() {
            Command::Run(cli) => cli,
            Command::Help => panic!("unexpected help"),
        }
    }

    #[test]
    fn test_dimension_policy() {
        assert_eq!(DimensionInput::Text("40".into()).resolve(), 40);
        assert_eq!(DimensionInput::Text("10".into()).resolve(), 25);
        assert_eq!(DimensionInput::Text("250".into()).resolve(), 100);
        assert_eq!(DimensionInput::Text("99999999999999999999999".into()).resolve(), 100);
        assert_eq!(DimensionInput::Text("abc".into()).resolve(), 25);
        assert_eq!(DimensionInput::Text("-30".into()).resolve(), 25);
        assert_eq!(DimensionInput::Text(String::new()).resolve(), 25);
        assert_eq!(DimensionInput::Text(" 40".into()).resolve(), 25);
        assert_eq!(DimensionInput::Text("40\n".into()).resolve(), 25);
        assert_eq!(DimensionInput::Text("+40".into()).resolve(), 25);
        assert_eq!(DimensionInput::Number(64).resolve(), 64);
        assert_eq!(DimensionInput::Number(-1).resolve(), 25);
        assert_eq!(DimensionInput::Number(1000).resolve(), 100);
    }

    #[test]
    fn test_defaults() {
        let config = RunConfig::resolve(&FileConfig::default(), &CliArgs::default()).unwrap();
        assert_eq!(config, RunConfig::default());
        assert_eq!(config.interval, Duration::from_millis(100));
    }

    #[test]
    fn test_file_values() {
        let file = FileConfig::from_toml_str(
            r#"
            [simulation]
            strategy = "With Barrier"
            dimension = "30"
            pattern = "toad"
            seed = 9
            generations = 12

            [timing]
            barrier_synchronized_ms = 1000

            [workers]
            executor = "scoped-threads"
            pool_threads = 3
            stack_kib = 64
            "#,
        )
        .unwrap();
        let config = RunConfig::resolve(&file, &CliArgs::default()).unwrap();

        assert_eq!(config.strategy, Strategy::BarrierSynchronized);
        assert_eq!(config.dimension, 30);
        assert_eq!(config.pattern, Pattern::Toad);
        assert_eq!(config.seed, Some(9));
        assert_eq!(config.generations, 12);
        assert_eq!(config.interval, Duration::from_millis(1000));
        assert_eq!(config.executor, BurstExecutor::ScopedThreads);
        assert_eq!(config.pool_threads, Some(3));
        assert_eq!(config.stack_size, 64 * 1024);
    }

    #[test]
    fn test_file_names_share_flag_grammar() {
        let file = FileConfig::from_toml_str("[simulation]\nstrategy = \"burst\"\n[workers]\nexecutor = \"Threads\"\n")
            .unwrap();
        assert_eq!(file.simulation.strategy, Some(Strategy::BurstParallel));
        assert_eq!(file.workers.executor, Some(BurstExecutor::ScopedThreads));

        let err = FileConfig::from_toml_str("[simulation]\nstrategy = \"quantum\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
        assert!(err.to_string().contains("unknown strategy `quantum`"));

        assert!(matches!(
            FileConfig::from_toml_str("[workers]\nexecutor = \"fibers\"\n"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_flags_override_file() {
        let file = FileConfig::from_toml_str("[simulation]\nstrategy = \"sequential\"\ndimension = 30\n").unwrap();
        let cli = run_args(&["--strategy", "parallel", "-n", "60", "--interval-ms", "5", "-q"]);
        let config = RunConfig::resolve(&file, &cli).unwrap();

        assert_eq!(config.strategy, Strategy::BurstParallel);
        assert_eq!(config.dimension, 60);
        assert_eq!(config.interval, Duration::from_millis(5));
        assert!(config.quiet);
    }

    #[test]
    fn test_large_pattern_raises_dimension() {
        let cli = run_args(&["--pattern", "Glider Gun", "--size", "30"]);
        assert_eq!(RunConfig::resolve(&FileConfig::default(), &cli).unwrap().dimension, 50);

        let cli = run_args(&["--pattern", "Loafer Synth", "--size", "80"]);
        assert_eq!(RunConfig::resolve(&FileConfig::default(), &cli).unwrap().dimension, 80);
    }

    #[test]
    fn test_unknown_names_rejected() {
        let cli = run_args(&["--strategy", "quantum"]);
        assert!(matches!(
            RunConfig::resolve(&FileConfig::default(), &cli),
            Err(ConfigError::UnknownName(_))
        ));

        let cli = run_args(&["--pattern", "Pulsar"]);
        assert!(RunConfig::resolve(&FileConfig::default(), &cli).is_err());
    }

    #[test]
    fn test_usage_describes_unbounded_runs() {
        assert!(USAGE.contains("--generations 0 the run has no end of its own"));
        assert!(USAGE.contains("Pass a generation limit"));
    }

    #[test]
    fn test_bad_flags() {
        assert!(matches!(parse_args(args(&["--seed"])), Err(ConfigError::MissingValue(_))));
        assert!(matches!(
            parse_args(args(&["--generations", "many"])),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(parse_args(args(&["--turbo"])), Err(ConfigError::UnknownFlag(_))));
        assert_eq!(parse_args(args(&["-q", "--help"])).unwrap(), Command::Help);
    }

    #[test]
    fn test_malformed_file() {
        assert!(matches!(
            FileConfig::from_toml_str("[simulation]\nspeed = 3\n"),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            FileConfig::load(Path::new("/nonexistent/lifegrid.toml")),
            Err(ConfigError::Io { .. })
        ));
    }
}
