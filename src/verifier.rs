//! Checking a proof statement by statement.
//!
//! A [`Verifier`] owns the facts established so far and where each came from.
//! Premises grow the facts through [`close`]; conclusions are looked up in them.
//! The first contradiction or unsupported conclusion makes the proof invalid for
//! the rest of the run.
use crate::ast::{Expr, Label, Statement, StatementKind};
use crate::closure::{close, ClosureReport, TruthSet};
use crate::infer::infer_simplified;
use crate::simplify::Fact;
use crate::util::HashMap;

/// What checking one statement found out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    PremiseAccepted {
        label: Label,
        expr: Expr,
        /// The premise and what follows from it in one step.
        immediate_inferences: Vec<Expr>,
        /// Facts that became known through the closure beyond the immediate inferences.
        also_entailed: Vec<Expr>,
    },
    PremiseRedundant {
        label: Label,
        expr: Expr,
    },
    PremiseContradiction {
        label: Label,
        expr: Expr,
        immediate_inferences: Vec<Expr>,
        conflicting_fact: Expr,
        source_label: Option<Label>,
    },
    /// The premise is consistent with what is known, but the proof already
    /// contradicted itself and facts are no longer accumulated.
    PremiseSkipped {
        label: Label,
        expr: Expr,
    },
    ConclusionProved {
        label: Label,
        expr: Expr,
    },
    ConclusionContradicted {
        label: Label,
        expr: Expr,
        conflicting_fact: Expr,
        source_label: Option<Label>,
    },
    ConclusionUnproven {
        label: Label,
        expr: Expr,
    },
    FinalVerdict {
        valid: bool,
    },
}

impl Event {
    /// Whether this event makes the proof invalid.
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            Event::PremiseContradiction { .. }
                | Event::ConclusionContradicted { .. }
                | Event::ConclusionUnproven { .. }
                | Event::FinalVerdict { valid: false }
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProofState {
    Consistent,
    Invalid,
}

#[derive(Debug, Clone)]
pub struct VerifierConfig {
    /// Stop accumulating facts from premises once the proof is invalid.
    /// When false, every premise is judged on its own against the facts so far.
    pub freeze_on_contradiction: bool,
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            freeze_on_contradiction: true,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Verifier {
    truths: TruthSet,
    /// The premise that most recently made each fact known.
    provenance: HashMap<Fact, Label>,
    invalid: bool,
    pub config: VerifierConfig,
    last_closure: Option<ClosureReport>,
}

impl Verifier {
    pub fn new(config: VerifierConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn truths(&self) -> &TruthSet {
        &self.truths
    }

    pub fn state(&self) -> ProofState {
        if self.invalid {
            ProofState::Invalid
        } else {
            ProofState::Consistent
        }
    }

    pub fn is_valid(&self) -> bool {
        !self.invalid
    }

    /// The premise that made `expr` known, if it is known.
    pub fn provenance(&self, expr: &Expr) -> Option<Label> {
        self.provenance.get(&Fact::new(expr)).copied()
    }

    /// Closure statistics of the last premise that added facts.
    pub fn last_closure_report(&self) -> Option<&ClosureReport> {
        self.last_closure.as_ref()
    }

    pub fn run_statement(&mut self, statement: &Statement) -> Event {
        match statement.kind {
            StatementKind::Premise => self.add_premise(statement.label, &statement.expr),
            StatementKind::Conclusion => self.check_conclusion(statement.label, &statement.expr),
        }
    }

    pub fn add_premise(&mut self, label: Label, expr: &Expr) -> Event {
        self.last_closure = None;
        let fact = Fact::new(expr);
        if self.truths.contains_fact(&fact) {
            log::debug!("P{label} is already known");
            return Event::PremiseRedundant {
                label,
                expr: expr.clone(),
            };
        }

        let candidates: Vec<Fact> = infer_simplified(expr)
            .into_iter()
            .map(Fact::from_simplified)
            .collect();
        let immediate_inferences: Vec<Expr> =
            candidates.iter().map(|c| c.expr().clone()).collect();

        let conflict = candidates
            .iter()
            .map(Fact::negated)
            .find_map(|negation| self.truths.get(&negation).cloned());
        if let Some(conflict) = conflict {
            self.invalid = true;
            let source_label = self.provenance.get(&conflict).copied();
            log::debug!("P{label} contradicts {conflict}");
            return Event::PremiseContradiction {
                label,
                expr: expr.clone(),
                immediate_inferences,
                conflicting_fact: conflict.into_expr(),
                source_label,
            };
        }

        if self.invalid && self.config.freeze_on_contradiction {
            log::debug!("P{label} skipped, the proof is already inconsistent");
            return Event::PremiseSkipped {
                label,
                expr: expr.clone(),
            };
        }

        let before = self.truths.len();
        self.truths.insert(fact);
        for candidate in candidates {
            self.truths.insert(candidate);
        }
        let immediate = self.truths.len();
        let report = close(&mut self.truths);
        log::debug!("P{label}: {report}");
        self.last_closure = Some(report);

        let also_entailed = self
            .truths
            .since(immediate)
            .map(|fact| fact.expr().clone())
            .collect();
        for fact in self.truths.since(before) {
            self.provenance.insert(fact.clone(), label);
        }

        Event::PremiseAccepted {
            label,
            expr: expr.clone(),
            immediate_inferences,
            also_entailed,
        }
    }

    pub fn check_conclusion(&mut self, label: Label, expr: &Expr) -> Event {
        self.last_closure = None;
        let fact = Fact::new(expr);
        if self.truths.contains_fact(&fact) {
            return Event::ConclusionProved {
                label,
                expr: expr.clone(),
            };
        }

        self.invalid = true;
        let negation = fact.negated();
        match self.truths.get(&negation) {
            Some(known) => {
                log::debug!("C{label} contradicts {known}");
                Event::ConclusionContradicted {
                    label,
                    expr: expr.clone(),
                    conflicting_fact: known.expr().clone(),
                    source_label: self.provenance.get(&negation).copied(),
                }
            }
            None => {
                log::debug!("C{label} does not follow");
                Event::ConclusionUnproven {
                    label,
                    expr: expr.clone(),
                }
            }
        }
    }

    pub fn verdict(&self) -> Event {
        Event::FinalVerdict {
            valid: self.is_valid(),
        }
    }
}
