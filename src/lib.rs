//! # proofcheck
//! proofcheck verifies written proofs in propositional logic.
//!
//! A proof is a sequence of numbered premises `P[n]` and conclusions `C[n]`
//! over variables, `&`, `|`, `¬` (also `~`, `!`) and `->`:
//!
//! ```text
//! P[1] p | q
//! P[2] ~p
//! C[1] q
//! ```
//!
//! Premises are checked for consistency with everything established before
//! them and then forward-chained to a fixed point. Each conclusion must be among
//! the established facts. See [`Verifier`] for the state machine and
//! [`closure::close`] for the fixed point.
pub mod ast;
mod cli;
pub mod closure;
pub mod infer;
pub mod report;
pub mod simplify;
pub mod util;
pub mod verifier;

use std::fmt::{Display, Formatter};
use std::io;
use std::path::PathBuf;
use std::str::FromStr;

use thiserror::Error;

pub use ast::{parse_expr, parse_program, Expr, Label, ParseError, Statement, StatementKind};
#[cfg(feature = "bin")]
pub use cli::bin::*;
pub use closure::{close, ClosureReport, TruthSet};
pub use report::{EventHandler, TextReport};
pub use simplify::{equiv, simplify, Fact};
pub use verifier::{Event, ProofState, Verifier, VerifierConfig};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RunMode {
    #[default]
    Normal,
    ShowTruths,
    ShowStats,
}

impl RunMode {
    fn show_truths(&self) -> bool {
        matches!(self, RunMode::ShowTruths)
    }

    fn show_stats(&self) -> bool {
        matches!(self, RunMode::ShowStats)
    }
}

impl Display for RunMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        // `--show none` means a normal run
        match self {
            RunMode::Normal => write!(f, "none"),
            RunMode::ShowTruths => write!(f, "truths"),
            RunMode::ShowStats => write!(f, "stats"),
        }
    }
}

impl FromStr for RunMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(RunMode::Normal),
            "truths" => Ok(RunMode::ShowTruths),
            "stats" => Ok(RunMode::ShowStats),
            _ => Err(format!("Unknown run mode: {s}")),
        }
    }
}

impl Verifier {
    /// Checks `program` in order, passing every event to `handler`, and ends
    /// with the final verdict. Returns whether the proof is valid.
    pub fn run_program(
        &mut self,
        program: &[Statement],
        handler: &mut dyn EventHandler,
    ) -> Result<bool, Error> {
        for statement in program {
            self.run_statement_with(statement, handler)?;
        }
        handler.handle_event(&self.verdict())?;
        Ok(self.is_valid())
    }

    /// Checks a single statement, passing its event to `handler`.
    pub fn run_statement_with(
        &mut self,
        statement: &Statement,
        handler: &mut dyn EventHandler,
    ) -> Result<(), Error> {
        let event = self.run_statement(statement);
        handler.handle_event(&event)?;
        if statement.kind == StatementKind::Premise
            && !matches!(event, Event::PremiseRedundant { .. })
        {
            handler.handle_truths(self.truths())?;
            if let Some(report) = self.last_closure_report() {
                handler.handle_closure_report(report)?;
            }
        }
        Ok(())
    }

    /// Parses and checks a whole proof, returning every event including the final verdict.
    pub fn parse_and_run_program(
        &mut self,
        filename: Option<String>,
        input: &str,
    ) -> Result<Vec<Event>, Error> {
        let program = parse_program(filename, input)?;
        let mut events = Vec::new();
        self.run_program(&program, &mut events)?;
        Ok(events)
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    ParseError(#[from] ParseError),
    #[error("IO error: {0}: {1}")]
    IoError(PathBuf, io::Error),
    #[error("Failed to write report: {0}")]
    OutputError(#[from] io::Error),
}
