//! Normalization of formulas and the equality built on it.
//!
//! [`simplify`] rewrites bottom-up with double-negation elimination, De Morgan,
//! and idempotence of `&` and `|`. Two formulas state the same truth when their
//! simplified forms match under [`same`]: `&` and `|` compare their operands in
//! either order, `->` only in order.
//!
//! Every recursive pass runs on a fuel budget of [`MAX_DEPTH`] levels. A pass
//! that runs out of fuel gives up: simplification returns its input unchanged
//! and comparison answers "not equal".
use std::fmt::{self, Display, Formatter};
use std::hash::{Hash, Hasher};

use rustc_hash::FxHasher;

use crate::ast::Expr;

/// Recursion budget for simplification and comparison.
///
/// Simplifying a tree of depth `d` spends fuel on the way down and again in
/// the rewrite at each node, where De Morgan pushes a negation back through the
/// subtree and idempotence compares it. That needs up to `2 * d`, so this must
/// stay at least twice [`MAX_NESTING`](crate::ast::MAX_NESTING) for everything
/// the parser accepts to simplify.
pub const MAX_DEPTH: usize = 512;

/// Returns the canonical form of `expr`.
pub fn simplify(expr: &Expr) -> Expr {
    match try_simplify(expr, MAX_DEPTH) {
        Some(simplified) => simplified,
        None => {
            log::warn!("simplification of a formula of depth {} gave up", expr.depth());
            expr.clone()
        }
    }
}

/// Whether `a` and `b` state the same truth.
pub fn equiv(a: &Expr, b: &Expr) -> bool {
    match (try_simplify(a, MAX_DEPTH), try_simplify(b, MAX_DEPTH)) {
        (Some(a), Some(b)) => same_simplified(&a, &b),
        _ => {
            log::warn!("comparison of {a} and {b} did not converge, treating them as different");
            false
        }
    }
}

/// Compares two formulas that are already simplified.
pub(crate) fn same_simplified(a: &Expr, b: &Expr) -> bool {
    same(a, b, MAX_DEPTH).unwrap_or_else(|| {
        log::warn!("comparison of {a} and {b} did not converge, treating them as different");
        false
    })
}

fn try_simplify(expr: &Expr, fuel: usize) -> Option<Expr> {
    let fuel = fuel.checked_sub(1)?;
    let expr = match expr {
        Expr::Var(_) => return Some(expr.clone()),
        Expr::Not(inner) => Expr::not(try_simplify(inner, fuel)?),
        Expr::And(l, r) => Expr::and(try_simplify(l, fuel)?, try_simplify(r, fuel)?),
        Expr::Or(l, r) => Expr::or(try_simplify(l, fuel)?, try_simplify(r, fuel)?),
        Expr::Implies(l, r) => Expr::implies(try_simplify(l, fuel)?, try_simplify(r, fuel)?),
    };
    rewrite(expr, fuel)
}

/// Applies the rewrite rules at the root of `expr`, whose children are already simplified.
fn rewrite(expr: Expr, fuel: usize) -> Option<Expr> {
    let fuel = fuel.checked_sub(1)?;
    match expr {
        Expr::And(l, r) | Expr::Or(l, r) if same(&l, &r, fuel)? => Some(*l),
        Expr::Not(inner) => match *inner {
            Expr::Not(a) => Some(*a),
            Expr::And(a, b) => {
                let (a, b) = (rewrite(Expr::Not(a), fuel)?, rewrite(Expr::Not(b), fuel)?);
                rewrite(Expr::or(a, b), fuel)
            }
            Expr::Or(a, b) => {
                let (a, b) = (rewrite(Expr::Not(a), fuel)?, rewrite(Expr::Not(b), fuel)?);
                rewrite(Expr::and(a, b), fuel)
            }
            inner => Some(Expr::not(inner)),
        },
        expr => Some(expr),
    }
}

/// Structural comparison of simplified formulas, `None` when out of fuel.
fn same(a: &Expr, b: &Expr, fuel: usize) -> Option<bool> {
    if a == b {
        return Some(true);
    }
    let fuel = fuel.checked_sub(1)?;
    let result = match (a, b) {
        (Expr::Var(x), Expr::Var(y)) => x == y,
        (Expr::Not(x), Expr::Not(y)) => same(x, y, fuel)?,
        // commutative: A & B == B & A, A | B == B | A
        (Expr::And(a1, a2), Expr::And(b1, b2)) | (Expr::Or(a1, a2), Expr::Or(b1, b2)) => {
            (same(a1, b1, fuel)? && same(a2, b2, fuel)?)
                || (same(a1, b2, fuel)? && same(a2, b1, fuel)?)
        }
        // ordered: A -> B != B -> A
        (Expr::Implies(a1, a2), Expr::Implies(b1, b2)) => {
            same(a1, b1, fuel)? && same(a2, b2, fuel)?
        }
        _ => false,
    };
    Some(result)
}

/// A simplified formula. Equality is [`same`], so `p & q` and `q & p` are one fact,
/// and hashing agrees with it.
#[derive(Debug, Clone)]
pub struct Fact(Expr);

impl Fact {
    pub fn new(expr: &Expr) -> Self {
        Fact(simplify(expr))
    }

    /// Wraps a formula that is already in simplified form.
    pub(crate) fn from_simplified(expr: Expr) -> Self {
        Fact(expr)
    }

    pub fn expr(&self) -> &Expr {
        &self.0
    }

    pub fn into_expr(self) -> Expr {
        self.0
    }

    /// The simplified negation of this fact.
    pub fn negated(&self) -> Fact {
        Fact::new(&self.0.negated())
    }
}

impl PartialEq for Fact {
    fn eq(&self, other: &Self) -> bool {
        same_simplified(&self.0, &other.0)
    }
}

impl Eq for Fact {}

impl Hash for Fact {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(fact_hash(&self.0));
    }
}

impl Display for Fact {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.0, f)
    }
}

/// Operands of `&` and `|` are combined symmetrically, those of `->` in order.
fn fact_hash(expr: &Expr) -> u64 {
    let mut hasher = FxHasher::default();
    match expr {
        Expr::Var(symbol) => {
            0u8.hash(&mut hasher);
            symbol.hash(&mut hasher);
        }
        Expr::Not(inner) => {
            1u8.hash(&mut hasher);
            fact_hash(inner).hash(&mut hasher);
        }
        Expr::And(l, r) => {
            2u8.hash(&mut hasher);
            fact_hash(l).wrapping_add(fact_hash(r)).hash(&mut hasher);
        }
        Expr::Or(l, r) => {
            3u8.hash(&mut hasher);
            fact_hash(l).wrapping_add(fact_hash(r)).hash(&mut hasher);
        }
        Expr::Implies(l, r) => {
            4u8.hash(&mut hasher);
            fact_hash(l).hash(&mut hasher);
            fact_hash(r).hash(&mut hasher);
        }
    }
    hasher.finish()
}

impl Expr {
    pub fn simplify(&self) -> Expr {
        simplify(self)
    }

    /// Whether `self` and `other` denote the same proposition after normalization.
    pub fn equiv(&self, other: &Expr) -> bool {
        equiv(self, other)
    }
}
