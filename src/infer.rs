use crate::ast::Expr;

/// Facts that follow in one step from `expr` being true, starting with `expr` itself.
///
/// - `A & B` gives `A` and `B`.
/// - `A -> B` gives `¬A | B`.
/// - `A | B` gives `¬A -> B` and `¬B -> A`, so that refuting one side lets
///   modus ponens conclude the other.
///
/// Results are not simplified.
pub fn infer(expr: &Expr) -> Vec<Expr> {
    let mut inferences = vec![expr.clone()];
    match expr {
        Expr::And(l, r) => {
            inferences.push((**l).clone());
            inferences.push((**r).clone());
        }
        Expr::Implies(l, r) => {
            inferences.push(Expr::or(l.negated(), (**r).clone()));
        }
        Expr::Or(l, r) => {
            inferences.push(Expr::implies(l.negated(), (**r).clone()));
            inferences.push(Expr::implies(r.negated(), (**l).clone()));
        }
        Expr::Var(_) | Expr::Not(_) => {}
    }
    inferences
}

/// [`infer`] followed by simplification of every result.
pub fn infer_simplified(expr: &Expr) -> Vec<Expr> {
    infer(expr).iter().map(Expr::simplify).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::parse_expr;

    fn e(s: &str) -> Expr {
        parse_expr(None, s).unwrap()
    }

    fn rendered(exprs: Vec<Expr>) -> Vec<String> {
        exprs.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn atoms_and_negations_only_imply_themselves() {
        assert_eq!(infer(&e("p")), vec![e("p")]);
        assert_eq!(infer(&e("~(p & q)")), vec![e("~(p & q)")]);
    }

    #[test]
    fn conjunction_elimination() {
        assert_eq!(rendered(infer(&e("p & (q | r)"))), ["(p & (q | r))", "p", "(q | r)"]);
    }

    #[test]
    fn material_implication() {
        assert_eq!(rendered(infer(&e("p -> q"))), ["(p -> q)", "(¬p | q)"]);
    }

    #[test]
    fn disjunctive_syllogism() {
        assert_eq!(
            rendered(infer(&e("p | ~q"))),
            ["(p | ¬q)", "(¬p -> ¬q)", "(¬¬q -> p)"]
        );
        assert_eq!(
            rendered(infer_simplified(&e("p | ~q"))),
            ["(p | ¬q)", "(¬p -> ¬q)", "(q -> p)"]
        );
    }
}
