use std::collections::HashMap;

use crate::ast::Expr;
use crate::error::EvalError;

/// Evaluates a parsed expression against a binding context.
///
/// A plain post-order walk: literals yield their value, variables are looked
/// up in `context`, operators apply to evaluated operands. No side effects;
/// deterministic for a given tree and context. Recursion is bounded by the
/// parser's nesting limit.
pub fn evaluate(expr: &Expr, context: &HashMap<String, f64>) -> Result<f64, EvalError> {
    match expr {
        Expr::Literal(value) => Ok(*value),
        Expr::Variable(name) => {
            context
                .get(name)
                .copied()
                .ok_or_else(|| EvalError::UnboundVariable { name: name.clone() })
        }
        Expr::Binary { op, left, right } => {
            let left = evaluate(left, context)?;
            let right = evaluate(right, context)?;
            op.apply(left, right)
        }
        Expr::Neg(inner) => Ok(-evaluate(inner, context)?),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::ExprParser;

    fn eval(expression: &str, context: &[(&str, f64)]) -> Result<f64, EvalError> {
        let ast = ExprParser::parse(expression).unwrap();
        let context: HashMap<String, f64> = context
            .iter()
            .map(|(name, value)| (name.to_string(), *value))
            .collect();
        evaluate(&ast, &context)
    }

    #[test]
    fn test_arithmetic() {
        assert_eq!(eval("2 + 3 * 4", &[]), Ok(14.0));
        assert_eq!(eval("(2 + 3) * 4", &[]), Ok(20.0));
        assert_eq!(eval("10 - 4 - 3", &[]), Ok(3.0));
        assert_eq!(eval("24 / 4 / 2", &[]), Ok(3.0));
    }

    #[test]
    fn test_variables_from_context() {
        assert_eq!(
            eval("a * x + b", &[("a", 2.0), ("x", 3.0), ("b", 1.0)]),
            Ok(7.0)
        );
    }

    #[test]
    fn test_unbound_variable() {
        assert_eq!(
            eval("a * x", &[("a", 2.0)]),
            Err(EvalError::UnboundVariable {
                name: "x".to_string()
            })
        );
    }

    #[test]
    fn test_power() {
        assert_eq!(eval("2 ^ 10", &[]), Ok(1024.0));
        assert_eq!(eval("2 ^ 3 ^ 2", &[]), Ok(512.0));
        assert_eq!(eval("-2 ^ 2", &[]), Ok(-4.0));
        assert_eq!(eval("2 ^ -1", &[]), Ok(0.5));
        assert_eq!(eval("4 ^ 0.5", &[]), Ok(2.0));
    }

    #[test]
    fn test_division_by_zero_is_an_error_not_infinity() {
        assert_eq!(eval("1 / 0", &[]), Err(EvalError::DivisionByZero));
        assert_eq!(
            eval("1 / x", &[("x", 0.0)]),
            Err(EvalError::DivisionByZero)
        );
    }

    #[test]
    fn test_domain_error_instead_of_nan() {
        assert_eq!(
            eval("x ^ 0.5", &[("x", -4.0)]),
            Err(EvalError::Domain {
                base: -4.0,
                exponent: 0.5
            })
        );
    }

    #[test]
    fn test_unary_negation() {
        assert_eq!(eval("-x", &[("x", 5.0)]), Ok(-5.0));
        assert_eq!(eval("--x", &[("x", 5.0)]), Ok(5.0));
        assert_eq!(eval("3 - -2", &[]), Ok(5.0));
    }

    #[test]
    fn test_determinism() {
        let ast = ExprParser::parse("a * (x + 1) / 2").unwrap();
        let context = HashMap::from([("a".to_string(), 4.0), ("x".to_string(), 2.0)]);
        let first = evaluate(&ast, &context);
        let second = evaluate(&ast, &context);
        assert_eq!(first, second);
        assert_eq!(first, Ok(6.0));
    }
}
