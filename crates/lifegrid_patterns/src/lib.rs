//! # LIFEGRID Patterns
//!
//! Starting populations for a run: a small catalog of named glyphs plus a
//! seeded random fill.
//!
//! Glyphs are anchored at `(0, 0)` and clipped at the grid edge; a pattern
//! larger than the grid is truncated, not scaled. The two large patterns
//! declare a minimum dimension so callers can grow the grid to fit them.
//!
//! ## Example
//!
//! ```rust
//! use lifegrid_core::PatternProvider;
//! use lifegrid_patterns::PatternCatalog;
//!
//! let mut catalog = PatternCatalog::new(7);
//! let glider = catalog.initial_cells("glider", 25);
//! assert_eq!(glider.len(), 5);
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

mod glyphs;

use std::fmt;
use std::str::FromStr;

use lifegrid_core::{CellSet, PatternProvider, UnknownName};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Grid dimension the large patterns need to show their behavior.
pub const LARGE_PATTERN_MIN_DIMENSION: usize = 50;

/// A catalog entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Pattern {
    /// Period-4 spaceship.
    Glider,
    /// Period-2 oscillator.
    Blinker,
    /// Period-2 oscillator.
    Toad,
    /// Period-2 oscillator.
    Beacon,
    /// Glider gun.
    GliderGun,
    /// Loafer synthesis.
    LoaferSynth,
    /// Every cell alive with probability 1/2.
    Random,
}

impl Pattern {
    /// Every catalog entry, in menu order.
    pub const ALL: [Self; 7] = [
        Self::Glider,
        Self::Blinker,
        Self::Toad,
        Self::Beacon,
        Self::GliderGun,
        Self::LoaferSynth,
        Self::Random,
    ];

    /// Display name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Glider => "Glider",
            Self::Blinker => "Blinker",
            Self::Toad => "Toad",
            Self::Beacon => "Beacon",
            Self::GliderGun => "Glider Gun",
            Self::LoaferSynth => "Loafer Synth",
            Self::Random => "Random",
        }
    }

    /// Smallest grid the pattern should run on.
    #[must_use]
    pub const fn min_dimension(self) -> usize {
        match self {
            Self::GliderGun | Self::LoaferSynth => LARGE_PATTERN_MIN_DIMENSION,
            _ => 1,
        }
    }

    const fn glyph(self) -> Option<&'static [&'static str]> {
        match self {
            Self::Glider => Some(glyphs::GLIDER),
            Self::Blinker => Some(glyphs::BLINKER),
            Self::Toad => Some(glyphs::TOAD),
            Self::Beacon => Some(glyphs::BEACON),
            Self::GliderGun => Some(glyphs::GLIDER_GUN),
            Self::LoaferSynth => Some(glyphs::LOAFER_SYNTH),
            Self::Random => None,
        }
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| !matches!(c, ' ' | '-' | '_'))
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

impl FromStr for Pattern {
    type Err = UnknownName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = normalize(s);
        Self::ALL
            .into_iter()
            .find(|pattern| normalize(pattern.name()) == wanted)
            .ok_or_else(|| UnknownName {
                kind: "pattern",
                name: s.to_owned(),
            })
    }
}

/// Copies a glyph into a cell set, dropping cells outside n×n.
fn place(glyph: &[&str], dimension: usize) -> CellSet {
    glyph
        .iter()
        .take(dimension)
        .enumerate()
        .flat_map(|(x, row)| {
            row.bytes()
                .take(dimension)
                .enumerate()
                .filter(|&(_, b)| b == b'O')
                .map(move |(y, _)| (x, y))
        })
        .collect()
}

/// The pattern provider used by the runner.
///
/// Owns the RNG for random fills; two catalogs built from the same seed
/// produce the same random populations in the same order.
pub struct PatternCatalog {
    seed: u64,
    rng: ChaCha8Rng,
}

impl PatternCatalog {
    /// Creates a catalog whose random fills derive from `seed`.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// The seed this catalog was created with.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// Display names of every pattern.
    pub fn names() -> impl Iterator<Item = &'static str> {
        Pattern::ALL.into_iter().map(Pattern::name)
    }

    /// Live cells of `pattern` on an n×n grid.
    pub fn cells(&mut self, pattern: Pattern, dimension: usize) -> CellSet {
        match pattern.glyph() {
            Some(glyph) => place(glyph, dimension),
            None => self.random_fill(dimension),
        }
    }

    fn random_fill(&mut self, dimension: usize) -> CellSet {
        let mut cells = CellSet::new();
        for x in 0..dimension {
            for y in 0..dimension {
                if self.rng.gen_bool(0.5) {
                    cells.insert((x, y));
                }
            }
        }
        cells
    }
}

impl PatternProvider for PatternCatalog {
    fn initial_cells(&mut self, name: &str, dimension: usize) -> CellSet {
        match name.parse::<Pattern>() {
            Ok(pattern) => {
                let cells = self.cells(pattern, dimension);
                tracing::debug!(%pattern, dimension, live = cells.len(), "pattern placed");
                cells
            }
            Err(err) => {
                tracing::warn!(error = %err, "starting from an empty grid");
                CellSet::new()
            }
        }
    }
}
