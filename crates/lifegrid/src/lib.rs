//! # LIFEGRID Runner
//!
//! Everything around the core that a complete run needs: configuration,
//! pacing, rendering and the loop that ties them together.
//!
//! ## Example
//!
//! ```rust
//! use std::sync::atomic::AtomicBool;
//! use std::time::Duration;
//!
//! use lifegrid::{run, LogRenderer, RunConfig};
//!
//! let config = RunConfig {
//!     generations: 3,
//!     interval: Duration::from_millis(1),
//!     seed: Some(1),
//!     ..RunConfig::default()
//! };
//! let summary = run(&config, Box::new(LogRenderer::new(config.strategy)), &AtomicBool::new(false)).unwrap();
//! assert_eq!(summary.generations, 3);
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod config;
pub mod error;
pub mod pacer;
pub mod render;
pub mod runner;

pub use config::{parse_args, CliArgs, Command, DimensionInput, FileConfig, RunConfig, USAGE};
pub use error::{ConfigError, RunError};
pub use pacer::{TickPacer, TickStats};
pub use render::{LogRenderer, TerminalRenderer};
pub use runner::{run, time_seed, RunSummary};
