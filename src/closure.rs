//! Forward chaining of a set of facts to its fixed point.
use std::fmt::{self, Display, Formatter};

use instant::{Duration, Instant};

use crate::ast::Expr;
use crate::infer::infer_simplified;
use crate::simplify::Fact;
use crate::util::IndexSet;

/// The facts established so far, in the order they became known.
///
/// Every entry is simplified and no two entries are equal as facts. The set
/// only ever grows.
#[derive(Debug, Clone, Default)]
pub struct TruthSet {
    facts: IndexSet<Fact>,
}

impl TruthSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.facts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.facts.is_empty()
    }

    /// Whether `expr` is known, up to simplification.
    pub fn contains(&self, expr: &Expr) -> bool {
        self.contains_fact(&Fact::new(expr))
    }

    pub fn contains_fact(&self, fact: &Fact) -> bool {
        self.facts.contains(fact)
    }

    /// The stored fact equal to `fact`.
    pub fn get(&self, fact: &Fact) -> Option<&Fact> {
        self.facts.get(fact)
    }

    /// Adds `fact`, returning whether it was new.
    pub fn insert(&mut self, fact: Fact) -> bool {
        self.facts.insert(fact)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Fact> + '_ {
        self.facts.iter()
    }

    /// Facts that were added after the set had `len` entries.
    pub fn since(&self, len: usize) -> impl Iterator<Item = &Fact> + '_ {
        self.facts.iter().skip(len)
    }
}

impl Display for TruthSet {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, fact) in self.facts.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            Display::fmt(fact, f)?;
        }
        write!(f, "]")
    }
}

/// What one call to [`close`] did.
#[derive(Debug, Clone, Default)]
pub struct ClosureReport {
    /// Rule expansion passes over the whole set, including the final pass that found nothing.
    pub passes: usize,
    /// Times modus ponens produced a new fact and expansion started over.
    pub restarts: usize,
    /// Number of facts added.
    pub added: usize,
    pub elapsed: Duration,
}

impl ClosureReport {
    pub fn updated(&self) -> bool {
        self.added > 0
    }
}

impl Display for ClosureReport {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "closure: {} facts added in {} passes, {} restarts, {:.3}ms",
            self.added,
            self.passes,
            self.restarts,
            self.elapsed.as_secs_f64() * 1000.0
        )
    }
}

/// Grows `truths` until neither rule expansion nor modus ponens adds anything.
///
/// Expansion adds the simplified inferences of every fact, pass after pass, until
/// a pass adds nothing. Then every `L -> R` whose `L` is known contributes `R`;
/// if that added anything, expansion starts over on the larger set.
///
/// Only finitely many facts are reachable from a finite set, so the loop ends.
pub fn close(truths: &mut TruthSet) -> ClosureReport {
    let start = Instant::now();
    let initial = truths.len();
    let mut report = ClosureReport::default();

    loop {
        loop {
            report.passes += 1;
            let derived: Vec<Fact> = truths
                .iter()
                .flat_map(|fact| infer_simplified(fact.expr()))
                .map(Fact::from_simplified)
                .filter(|fact| !truths.contains_fact(fact))
                .collect();
            let mut added = 0;
            for fact in derived {
                if truths.insert(fact) {
                    added += 1;
                }
            }
            log::trace!("expansion pass {} added {added} facts", report.passes);
            if added == 0 {
                break;
            }
        }

        let consequents: Vec<Fact> = truths
            .iter()
            .filter_map(|fact| match fact.expr() {
                Expr::Implies(l, r) if truths.contains_fact(&Fact::from_simplified((**l).clone())) => {
                    Some(Fact::from_simplified((**r).clone()))
                }
                _ => None,
            })
            .filter(|fact| !truths.contains_fact(fact))
            .collect();
        let mut added = false;
        for fact in consequents {
            log::trace!("modus ponens: {fact}");
            added |= truths.insert(fact);
        }
        if !added {
            break;
        }
        report.restarts += 1;
    }

    report.added = truths.len() - initial;
    report.elapsed = start.elapsed();
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::parse_expr;

    fn e(s: &str) -> Expr {
        parse_expr(None, s).unwrap()
    }

    fn truths(facts: &[&str]) -> TruthSet {
        let mut set = TruthSet::new();
        for f in facts {
            set.insert(Fact::new(&e(f)));
        }
        set
    }

    #[test]
    fn insert_ignores_equal_facts() {
        let mut set = truths(&["p & q"]);
        assert!(!set.insert(Fact::new(&e("q & p"))));
        assert!(!set.insert(Fact::new(&e("~~(p & q)"))));
        assert!(set.insert(Fact::new(&e("p | q"))));
        assert_eq!(set.len(), 2);
        assert!(set.contains(&e("~(~q | ~p)")));
    }

    #[test]
    fn modus_ponens() {
        let mut set = truths(&["p", "p -> q"]);
        let report = close(&mut set);
        assert!(set.contains(&e("q")));
        assert!(report.restarts >= 1);
    }

    #[test]
    fn conjunction_elimination() {
        let mut set = truths(&["p & q"]);
        close(&mut set);
        assert!(set.contains(&e("p")));
        assert!(set.contains(&e("q")));
    }

    #[test]
    fn disjunctive_syllogism() {
        let mut set = truths(&["p | q", "~p"]);
        close(&mut set);
        assert!(set.contains(&e("q")));
        assert!(!set.contains(&e("p")));
    }

    #[test]
    fn chains_through_several_restarts() {
        let mut set = truths(&["a", "a -> b & c", "c -> d", "~e | ~d", "e | f"]);
        close(&mut set);
        for fact in ["b", "c", "d", "~e", "f"] {
            assert!(set.contains(&e(fact)), "{fact} missing from {set}");
        }
    }

    #[test]
    fn closure_is_a_fixed_point() {
        let mut set = truths(&["p | q", "~p", "q -> r & s", "s -> ~t"]);
        let first = close(&mut set);
        assert!(first.updated());
        let before: Vec<Expr> = set.iter().map(|f| f.expr().clone()).collect();
        let second = close(&mut set);
        assert!(!second.updated());
        assert_eq!(second.passes, 1);
        assert_eq!(second.restarts, 0);
        let after: Vec<Expr> = set.iter().map(|f| f.expr().clone()).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn closure_only_grows() {
        let mut set = truths(&["p -> q"]);
        let mut previous: Vec<Expr> = vec![];
        for fact in ["r", "p", "q | s", "~s -> t"] {
            set.insert(Fact::new(&e(fact)));
            close(&mut set);
            let current: Vec<Expr> = set.iter().map(|f| f.expr().clone()).collect();
            assert_eq!(&current[..previous.len()], &previous[..]);
            previous = current;
        }
    }

    #[test]
    fn display_lists_facts_in_order() {
        let set = truths(&["p", "~~q", "p -> q"]);
        assert_eq!(set.to_string(), "[p, q, (p -> q)]");
    }
}
