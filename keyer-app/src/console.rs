use std::io::{self, Stdout, Write};

use keyer_core::OperatorOutput;
use tracing::{debug, warn};

/// Prints symbol groups and decoded letters, one per line
pub struct ConsoleOperator<W> {
    out: W,
}

impl ConsoleOperator<Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> ConsoleOperator<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn line(&mut self, text: &dyn std::fmt::Display) {
        if let Err(e) = writeln!(self.out, "{}", text).and_then(|_| self.out.flush()) {
            warn!("Console write failed: {}", e);
        }
    }
}

impl<W: Write> OperatorOutput for ConsoleOperator<W> {
    fn symbols(&mut self, symbols: &str) {
        debug!(symbols, "letter complete");
        self.line(&symbols);
    }

    fn letter(&mut self, letter: char) {
        debug!(%letter, "decoded");
        self.line(&letter);
    }
}
