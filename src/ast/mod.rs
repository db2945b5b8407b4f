//! Propositional expressions and the statements of a proof.
pub mod parse;

pub use parse::*;

use std::fmt::{self, Display, Formatter};

pub use symbol_table::GlobalSymbol as Symbol;

/// A premise or conclusion number, as written between the brackets of `P[n]` or `C[n]`.
pub type Label = usize;

/// A propositional formula.
///
/// The derived `PartialEq`/`Hash` compare syntax only: `p & q` and `q & p` are
/// different trees. Whether two formulas state the same truth is decided by
/// [`Expr::equiv`], which normalizes both sides first.
#[derive(Debug, PartialEq, Eq, Hash, Clone)]
pub enum Expr {
    Var(Symbol),
    Not(Box<Expr>),
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
    Implies(Box<Expr>, Box<Expr>),
}

impl Expr {
    pub fn var(symbol: impl Into<Symbol>) -> Self {
        Expr::Var(symbol.into())
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(inner: Expr) -> Self {
        Expr::Not(Box::new(inner))
    }

    pub fn and(left: Expr, right: Expr) -> Self {
        Expr::And(Box::new(left), Box::new(right))
    }

    pub fn or(left: Expr, right: Expr) -> Self {
        Expr::Or(Box::new(left), Box::new(right))
    }

    pub fn implies(left: Expr, right: Expr) -> Self {
        Expr::Implies(Box::new(left), Box::new(right))
    }

    /// Wraps a copy of this formula in a negation, without simplifying.
    pub fn negated(&self) -> Self {
        Expr::not(self.clone())
    }

    /// Nesting depth of the tree. A variable has depth 1.
    pub fn depth(&self) -> usize {
        match self {
            Expr::Var(_) => 1,
            Expr::Not(inner) => 1 + inner.depth(),
            Expr::And(l, r) | Expr::Or(l, r) | Expr::Implies(l, r) => 1 + l.depth().max(r.depth()),
        }
    }
}

impl Display for Expr {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Var(symbol) => Display::fmt(symbol, f),
            Expr::Not(inner) => write!(f, "¬{inner}"),
            Expr::And(l, r) => write!(f, "({l} & {r})"),
            Expr::Or(l, r) => write!(f, "({l} | {r})"),
            Expr::Implies(l, r) => write!(f, "({l} -> {r})"),
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum StatementKind {
    Premise,
    Conclusion,
}

impl StatementKind {
    pub fn prefix(self) -> char {
        match self {
            StatementKind::Premise => 'P',
            StatementKind::Conclusion => 'C',
        }
    }
}

/// One numbered line of a proof.
#[derive(Debug, Clone)]
pub struct Statement {
    pub span: Span,
    pub kind: StatementKind,
    pub label: Label,
    pub expr: Expr,
}

impl Statement {
    /// Builds a statement that does not come from source text.
    pub fn new(kind: StatementKind, label: Label, expr: Expr) -> Self {
        Statement {
            span: DUMMY_SPAN.clone(),
            kind,
            label,
            expr,
        }
    }

    pub fn premise(label: Label, expr: Expr) -> Self {
        Self::new(StatementKind::Premise, label, expr)
    }

    pub fn conclusion(label: Label, expr: Expr) -> Self {
        Self::new(StatementKind::Conclusion, label, expr)
    }
}

impl Display for Statement {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}] {}", self.kind.prefix(), self.label, self.expr)
    }
}
