//! Presenting verification events to a reader.
use std::fmt::{self, Display, Formatter};
use std::io::{self, Write};

use crate::ast::{Expr, Label};
use crate::closure::{ClosureReport, TruthSet};
use crate::util::ListDisplay;
use crate::verifier::Event;
use crate::RunMode;

/// Receives events while a proof is being checked.
///
/// Only [`EventHandler::handle_event`] is required. The other hooks are called
/// after every premise that was not redundant and do nothing by default.
pub trait EventHandler {
    fn handle_event(&mut self, event: &Event) -> io::Result<()>;

    fn handle_truths(&mut self, _truths: &TruthSet) -> io::Result<()> {
        Ok(())
    }

    fn handle_closure_report(&mut self, _report: &ClosureReport) -> io::Result<()> {
        Ok(())
    }
}

impl EventHandler for Vec<Event> {
    fn handle_event(&mut self, event: &Event) -> io::Result<()> {
        self.push(event.clone());
        Ok(())
    }
}

/// Writes a plain text report, one block per statement.
pub struct TextReport<W> {
    out: W,
    run_mode: RunMode,
    messages: bool,
}

impl<W: Write> TextReport<W> {
    pub fn new(out: W, run_mode: RunMode) -> Self {
        Self {
            out,
            run_mode,
            messages: true,
        }
    }

    /// Only print the final verdict.
    pub fn disable_messages(&mut self) {
        self.messages = false;
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> EventHandler for TextReport<W> {
    fn handle_event(&mut self, event: &Event) -> io::Result<()> {
        if self.messages || matches!(event, Event::FinalVerdict { .. }) {
            writeln!(self.out, "{event}")?;
        }
        Ok(())
    }

    fn handle_truths(&mut self, truths: &TruthSet) -> io::Result<()> {
        if self.messages && self.run_mode.show_truths() {
            writeln!(self.out, "\tTruths\t{truths}.")?;
        }
        Ok(())
    }

    fn handle_closure_report(&mut self, report: &ClosureReport) -> io::Result<()> {
        if self.messages && self.run_mode.show_stats() {
            writeln!(self.out, "\t{report}")?;
        }
        Ok(())
    }
}

struct Inferences<'a>(&'a [Expr]);

impl Display for Inferences<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", ListDisplay(self.0, ", "))
    }
}

struct Source(Option<Label>);

impl Display for Source {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(label) => write!(f, " from P{label}"),
            None => Ok(()),
        }
    }
}

impl Display for Event {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Event::PremiseAccepted {
                label,
                expr,
                immediate_inferences,
                also_entailed,
            } => {
                writeln!(f, "P{label}. {expr}")?;
                write!(f, "\tThis entails\t{}.", Inferences(immediate_inferences))?;
                if !also_entailed.is_empty() {
                    write!(f, "\n\tThis also entails\t{}.", Inferences(also_entailed))?;
                }
                Ok(())
            }
            Event::PremiseRedundant { label, expr } => {
                writeln!(f, "P{label}. {expr}")?;
                write!(f, "\tP{label} is already known to be true.")
            }
            Event::PremiseContradiction {
                label,
                expr,
                immediate_inferences,
                conflicting_fact,
                source_label,
            } => {
                writeln!(f, "P{label}. {expr}")?;
                writeln!(f, "\tThis entails\t{}.", Inferences(immediate_inferences))?;
                write!(
                    f,
                    "\tP{label} is a contradiction of {conflicting_fact}{}.",
                    Source(*source_label)
                )
            }
            Event::PremiseSkipped { label, expr } => {
                writeln!(f, "P{label}. {expr}")?;
                write!(f, "\tP{label} is not used, the proof is already inconsistent.")
            }
            Event::ConclusionProved { label, expr } => {
                writeln!(f, "C{label}. {expr}")?;
                write!(f, "\tC{label} is correct.")
            }
            Event::ConclusionContradicted {
                label,
                expr,
                conflicting_fact,
                source_label,
            } => {
                writeln!(f, "C{label}. {expr}")?;
                write!(
                    f,
                    "\tC{label} is a contradiction of {conflicting_fact}{}.",
                    Source(*source_label)
                )
            }
            Event::ConclusionUnproven { label, expr } => {
                writeln!(f, "C{label}. {expr}")?;
                write!(f, "\tC{label} has not been shown.")
            }
            Event::FinalVerdict { valid: true } => write!(f, "The proof is valid."),
            Event::FinalVerdict { valid: false } => write!(f, "The proof is invalid."),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::parse_expr;

    fn e(s: &str) -> Expr {
        parse_expr(None, s).unwrap()
    }

    #[test]
    fn renders_premises() {
        let accepted = Event::PremiseAccepted {
            label: 2,
            expr: e("p -> q"),
            immediate_inferences: vec![e("p -> q"), e("~p | q")],
            also_entailed: vec![e("q")],
        };
        assert_eq!(
            accepted.to_string(),
            "P2. (p -> q)\n\tThis entails\t[(p -> q), (¬p | q)].\n\tThis also entails\t[q]."
        );

        let contradiction = Event::PremiseContradiction {
            label: 3,
            expr: e("~q"),
            immediate_inferences: vec![e("~q")],
            conflicting_fact: e("q"),
            source_label: Some(2),
        };
        assert_eq!(
            contradiction.to_string(),
            "P3. ¬q\n\tThis entails\t[¬q].\n\tP3 is a contradiction of q from P2."
        );
    }

    #[test]
    fn renders_conclusions() {
        let contradicted = Event::ConclusionContradicted {
            label: 1,
            expr: e("a"),
            conflicting_fact: e("~a"),
            source_label: None,
        };
        assert_eq!(
            contradicted.to_string(),
            "C1. a\n\tC1 is a contradiction of ¬a."
        );
        let unproven = Event::ConclusionUnproven {
            label: 4,
            expr: e("r"),
        };
        assert_eq!(unproven.to_string(), "C4. r\n\tC4 has not been shown.");
    }

    #[test]
    fn text_report_respects_messages_flag() {
        let mut report = TextReport::new(Vec::new(), RunMode::Normal);
        report.disable_messages();
        report
            .handle_event(&Event::ConclusionProved {
                label: 1,
                expr: e("p"),
            })
            .unwrap();
        report
            .handle_event(&Event::FinalVerdict { valid: true })
            .unwrap();
        let out = String::from_utf8(report.into_inner()).unwrap();
        assert_eq!(out, "The proof is valid.\n");
    }

    #[test]
    fn text_report_shows_truths_on_request() {
        use crate::simplify::Fact;

        let mut truths = TruthSet::new();
        truths.insert(Fact::new(&e("p")));
        let mut quiet = TextReport::new(Vec::new(), RunMode::Normal);
        quiet.handle_truths(&truths).unwrap();
        assert!(quiet.into_inner().is_empty());

        let mut verbose = TextReport::new(Vec::new(), RunMode::ShowTruths);
        verbose.handle_truths(&truths).unwrap();
        assert_eq!(
            String::from_utf8(verbose.into_inner()).unwrap(),
            "\tTruths\t[p].\n"
        );
    }
}
