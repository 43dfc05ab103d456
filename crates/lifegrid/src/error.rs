//! # Runner Error Types

use std::path::PathBuf;

use lifegrid_core::{LifeError, UnknownName};
use thiserror::Error;

/// Errors raised while assembling a [`RunConfig`](crate::RunConfig).
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("cannot read config file {}: {source}", path.display())]
    Io {
        /// File that failed.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The config file is not valid TOML for this schema.
    #[error("malformed config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// Unrecognized strategy, executor or pattern name.
    #[error(transparent)]
    UnknownName(#[from] UnknownName),

    /// A flag that needs a value was last on the command line.
    #[error("missing value for {0}")]
    MissingValue(String),

    /// A flag value could not be parsed.
    #[error("invalid value `{value}` for {flag}")]
    InvalidValue {
        /// The flag.
        flag: String,
        /// What was given.
        value: String,
    },

    /// Not a flag this binary knows.
    #[error("unknown argument `{0}` (try --help)")]
    UnknownFlag(String),
}

/// Errors that end a run.
#[derive(Error, Debug)]
pub enum RunError {
    /// The configuration was rejected.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The simulation core failed.
    #[error("simulation failed: {0}")]
    Life(#[from] LifeError),
}
