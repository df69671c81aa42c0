//! Recursive-descent parsing of expression text into an [`Expr`] tree.
//!
//! Precedence, lowest to highest: additive (`+ -`, left-associative),
//! multiplicative (`* /`, left-associative), unary minus, power (`^`,
//! right-associative), primary. The full token stream must be consumed;
//! anything left over after a complete expression is an error.

use std::iter::Peekable;

use log::debug;

use crate::ast::{BinaryOp, Expr, Lexer, Token};
use crate::error::ParseError;

/// Upper bound on expression source length, in bytes.
pub const MAX_EXPRESSION_LENGTH: usize = 4096;

/// Upper bound on grammar recursion while parsing one expression.
pub const MAX_NESTING_DEPTH: usize = 64;

pub struct ExprParser<'a> {
    tokens: Peekable<Lexer<'a>>,
    depth: usize,
}

impl<'a> ExprParser<'a> {
    /// Parses `input` into an AST, consuming the whole token stream.
    pub fn parse(input: &str) -> Result<Expr, ParseError> {
        debug!("parsing expression: {input}");
        if input.len() > MAX_EXPRESSION_LENGTH {
            return Err(ParseError::TooLong {
                limit: MAX_EXPRESSION_LENGTH,
            });
        }

        let mut parser = ExprParser {
            tokens: Lexer::new(input).peekable(),
            depth: 0,
        };
        let expr = parser.parse_additive()?;
        match parser.advance()? {
            None => Ok(expr),
            Some(Token::RParen) => Err(ParseError::UnbalancedParens),
            Some(other) => Err(ParseError::UnexpectedToken {
                found: other.describe(),
                expected: "end of input",
            }),
        }
    }

    fn parse_additive(&mut self) -> Result<Expr, ParseError> {
        let mut node = self.parse_multiplicative()?;
        while let Some(token) = self.peek()? {
            let op = match token {
                Token::Plus => BinaryOp::Add,
                Token::Minus => BinaryOp::Subtract,
                _ => break,
            };
            self.tokens.next();
            let right = self.parse_multiplicative()?;
            node = Expr::Binary {
                op,
                left: Box::new(node),
                right: Box::new(right),
            };
        }
        Ok(node)
    }

    fn parse_multiplicative(&mut self) -> Result<Expr, ParseError> {
        let mut node = self.parse_unary()?;
        while let Some(token) = self.peek()? {
            let op = match token {
                Token::Star => BinaryOp::Multiply,
                Token::Slash => BinaryOp::Divide,
                _ => break,
            };
            self.tokens.next();
            let right = self.parse_unary()?;
            node = Expr::Binary {
                op,
                left: Box::new(node),
                right: Box::new(right),
            };
        }
        Ok(node)
    }

    // Unary minus binds looser than `^`: -2^2 is -(2^2).
    fn parse_unary(&mut self) -> Result<Expr, ParseError> {
        self.descend()?;
        let node = if matches!(self.peek()?, Some(Token::Minus)) {
            self.tokens.next();
            Expr::Neg(Box::new(self.parse_unary()?))
        } else {
            self.parse_power()?
        };
        self.depth -= 1;
        Ok(node)
    }

    fn parse_power(&mut self) -> Result<Expr, ParseError> {
        let base = self.parse_primary()?;
        if matches!(self.peek()?, Some(Token::Caret)) {
            self.tokens.next();
            // Right-associative; the exponent may itself carry a unary minus.
            let exponent = self.parse_unary()?;
            return Ok(Expr::Binary {
                op: BinaryOp::Power,
                left: Box::new(base),
                right: Box::new(exponent),
            });
        }
        Ok(base)
    }

    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        match self.advance()? {
            Some(Token::Number(value)) => Ok(Expr::Literal(value)),
            Some(Token::Identifier(name)) => Ok(Expr::Variable(name)),
            Some(Token::LParen) => {
                self.descend()?;
                let inner = self.parse_additive()?;
                self.depth -= 1;
                match self.advance()? {
                    Some(Token::RParen) => Ok(inner),
                    Some(other) => Err(ParseError::UnexpectedToken {
                        found: other.describe(),
                        expected: "')'",
                    }),
                    None => Err(ParseError::UnbalancedParens),
                }
            }
            Some(other) => Err(ParseError::UnexpectedToken {
                found: other.describe(),
                expected: "a number, a variable, or '('",
            }),
            None => Err(ParseError::UnexpectedEndOfInput),
        }
    }

    fn descend(&mut self) -> Result<(), ParseError> {
        self.depth += 1;
        if self.depth > MAX_NESTING_DEPTH {
            return Err(ParseError::TooDeep {
                limit: MAX_NESTING_DEPTH,
            });
        }
        Ok(())
    }

    fn peek(&mut self) -> Result<Option<&Token>, ParseError> {
        match self.tokens.peek() {
            Some(Ok(token)) => Ok(Some(token)),
            Some(Err(err)) => Err(err.clone()),
            None => Ok(None),
        }
    }

    fn advance(&mut self) -> Result<Option<Token>, ParseError> {
        self.tokens.next().transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn num(value: f64) -> Box<Expr> {
        Box::new(Expr::Literal(value))
    }

    fn var(name: &str) -> Box<Expr> {
        Box::new(Expr::Variable(name.to_string()))
    }

    fn binary(op: BinaryOp, left: Box<Expr>, right: Box<Expr>) -> Box<Expr> {
        Box::new(Expr::Binary { op, left, right })
    }

    #[test]
    fn test_literal_and_variable() {
        assert_eq!(ExprParser::parse("42").unwrap(), Expr::Literal(42.0));
        assert_eq!(
            ExprParser::parse("price").unwrap(),
            Expr::Variable("price".to_string())
        );
    }

    #[test]
    fn test_precedence_mul_over_add() {
        let ast = ExprParser::parse("2 + 3 * 4").unwrap();
        assert_eq!(
            ast,
            *binary(
                BinaryOp::Add,
                num(2.0),
                binary(BinaryOp::Multiply, num(3.0), num(4.0)),
            )
        );
    }

    #[test]
    fn test_left_associativity() {
        let ast = ExprParser::parse("10 - 4 - 3").unwrap();
        assert_eq!(
            ast,
            *binary(
                BinaryOp::Subtract,
                binary(BinaryOp::Subtract, num(10.0), num(4.0)),
                num(3.0),
            )
        );
        let ast = ExprParser::parse("24 / 4 / 2").unwrap();
        assert_eq!(
            ast,
            *binary(
                BinaryOp::Divide,
                binary(BinaryOp::Divide, num(24.0), num(4.0)),
                num(2.0),
            )
        );
    }

    #[test]
    fn test_power_is_right_associative() {
        let ast = ExprParser::parse("2 ^ 3 ^ 2").unwrap();
        assert_eq!(
            ast,
            *binary(
                BinaryOp::Power,
                num(2.0),
                binary(BinaryOp::Power, num(3.0), num(2.0)),
            )
        );
    }

    #[test]
    fn test_unary_minus_binds_looser_than_power() {
        let ast = ExprParser::parse("-2 ^ 2").unwrap();
        assert_eq!(
            ast,
            Expr::Neg(binary(BinaryOp::Power, num(2.0), num(2.0)))
        );
    }

    #[test]
    fn test_unary_minus_in_exponent() {
        let ast = ExprParser::parse("2 ^ -3").unwrap();
        assert_eq!(
            ast,
            *binary(BinaryOp::Power, num(2.0), Box::new(Expr::Neg(num(3.0))))
        );
    }

    #[test]
    fn test_stacked_unary_minus() {
        let ast = ExprParser::parse("--x").unwrap();
        assert_eq!(ast, Expr::Neg(Box::new(Expr::Neg(var("x")))));
    }

    #[test]
    fn test_parentheses_override_precedence() {
        let ast = ExprParser::parse("(2 + 3) * 4").unwrap();
        assert_eq!(
            ast,
            *binary(
                BinaryOp::Multiply,
                binary(BinaryOp::Add, num(2.0), num(3.0)),
                num(4.0),
            )
        );
    }

    #[test]
    fn test_parse_is_deterministic() {
        // Re-parsing the same stored text must yield a structurally equal AST.
        let expression = "a * (x + b) ^ 2 - 1 / x";
        let first = ExprParser::parse(expression).unwrap();
        let second = ExprParser::parse(expression).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(
            ExprParser::parse(""),
            Err(ParseError::UnexpectedEndOfInput)
        );
        assert_eq!(
            ExprParser::parse("   "),
            Err(ParseError::UnexpectedEndOfInput)
        );
    }

    #[test]
    fn test_dangling_operator() {
        assert_eq!(
            ExprParser::parse("1 +"),
            Err(ParseError::UnexpectedEndOfInput)
        );
        assert!(matches!(
            ExprParser::parse("* 2"),
            Err(ParseError::UnexpectedToken { .. })
        ));
        assert!(matches!(
            ExprParser::parse("1 + * 2"),
            Err(ParseError::UnexpectedToken { .. })
        ));
    }

    #[test]
    fn test_trailing_tokens_rejected() {
        assert!(matches!(
            ExprParser::parse("1 2"),
            Err(ParseError::UnexpectedToken { .. })
        ));
        assert!(matches!(
            ExprParser::parse("a b"),
            Err(ParseError::UnexpectedToken { .. })
        ));
    }

    #[test]
    fn test_unbalanced_parens() {
        assert_eq!(
            ExprParser::parse("(1 + 2"),
            Err(ParseError::UnbalancedParens)
        );
        assert_eq!(
            ExprParser::parse("1 + 2)"),
            Err(ParseError::UnbalancedParens)
        );
        assert_eq!(
            ExprParser::parse("((x)"),
            Err(ParseError::UnbalancedParens)
        );
    }

    #[test]
    fn test_comma_is_rejected() {
        assert!(matches!(
            ExprParser::parse("f(x, y)"),
            Err(ParseError::UnexpectedToken { .. })
        ));
        assert!(matches!(
            ExprParser::parse("1, 2"),
            Err(ParseError::UnexpectedToken { .. })
        ));
    }

    #[test]
    fn test_lex_error_propagates() {
        assert_eq!(
            ExprParser::parse("1 + $"),
            Err(ParseError::UnexpectedChar {
                position: 4,
                found: '$'
            })
        );
    }

    #[test]
    fn test_length_limit() {
        let long = "1 + ".repeat(MAX_EXPRESSION_LENGTH / 4 + 1) + "1";
        assert_eq!(
            ExprParser::parse(&long),
            Err(ParseError::TooLong {
                limit: MAX_EXPRESSION_LENGTH
            })
        );
    }

    #[test]
    fn test_depth_limit() {
        let deep = format!("{}1{}", "(".repeat(100), ")".repeat(100));
        assert_eq!(
            ExprParser::parse(&deep),
            Err(ParseError::TooDeep {
                limit: MAX_NESTING_DEPTH
            })
        );
        // A long flat chain is iterative, not recursive, and must stay fine.
        let flat = vec!["1"; 200].join(" + ");
        assert!(ExprParser::parse(&flat).is_ok());
    }

    #[test]
    fn test_deep_unary_chain_hits_depth_limit() {
        let minuses = format!("{}x", "-".repeat(100));
        assert_eq!(
            ExprParser::parse(&minuses),
            Err(ParseError::TooDeep {
                limit: MAX_NESTING_DEPTH
            })
        );
    }
}
