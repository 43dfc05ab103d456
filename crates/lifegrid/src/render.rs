//! # Renderers
//!
//! Two sinks for finished generations:
//! - [`TerminalRenderer`] draws each generation as a text frame
//! - [`LogRenderer`] emits one `tracing` event per generation

use std::fmt::Write as _;
use std::io::{self, Write};

use lifegrid_core::{PopulationSnapshot, Renderer, Strategy};

const ALIVE: char = '█';
const DEAD: char = '·';
const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

/// Draws generations as text frames on any writer.
pub struct TerminalRenderer<W: Write + Send> {
    out: W,
    strategy: Strategy,
    clear: bool,
    failed: bool,
    frame: String,
}

impl TerminalRenderer<io::Stdout> {
    /// Renderer for standard output that redraws in place.
    #[must_use]
    pub fn stdout(strategy: Strategy) -> Self {
        Self::new(io::stdout(), strategy).clear_screen(true)
    }
}

impl<W: Write + Send> TerminalRenderer<W> {
    /// Renderer writing plain frames to `out`.
    pub fn new(out: W, strategy: Strategy) -> Self {
        Self {
            out,
            strategy,
            clear: false,
            failed: false,
            frame: String::new(),
        }
    }

    /// Clears the screen before each frame.
    #[must_use]
    pub fn clear_screen(mut self, clear: bool) -> Self {
        self.clear = clear;
        self
    }

    /// The underlying writer.
    pub fn into_inner(self) -> W {
        self.out
    }

    fn draw(&mut self, snapshot: &PopulationSnapshot) -> io::Result<()> {
        let n = snapshot.dimension();
        self.frame.clear();
        self.frame.reserve((n * 2 + 1) * n + 64);
        if self.clear {
            self.frame.push_str(CLEAR_SCREEN);
        }
        let _ = writeln!(
            self.frame,
            "{} | generation {} | {} alive",
            self.strategy,
            snapshot.generation(),
            snapshot.live_count()
        );
        for row in snapshot.rows() {
            for (i, cell) in row.iter().enumerate() {
                if i > 0 {
                    self.frame.push(' ');
                }
                self.frame.push(if cell.is_alive() { ALIVE } else { DEAD });
            }
            self.frame.push('\n');
        }

        self.out.write_all(self.frame.as_bytes())?;
        self.out.flush()
    }
}

impl<W: Write + Send> Renderer for TerminalRenderer<W> {
    fn publish(&mut self, snapshot: &PopulationSnapshot) {
        if self.failed {
            return;
        }
        if let Err(err) = self.draw(snapshot) {
            // Frames stop; the run continues.
            tracing::warn!(error = %err, "terminal output failed, frames disabled");
            self.failed = true;
        }
    }
}

/// Logs one line per generation.
pub struct LogRenderer {
    strategy: Strategy,
}

impl LogRenderer {
    /// Logger tagged with the run's strategy.
    #[must_use]
    pub const fn new(strategy: Strategy) -> Self {
        Self { strategy }
    }
}

impl Renderer for LogRenderer {
    fn publish(&mut self, snapshot: &PopulationSnapshot) {
        tracing::info!(
            strategy = %self.strategy,
            generation = snapshot.generation(),
            live = snapshot.live_count(),
            "generation"
        );
    }
}
