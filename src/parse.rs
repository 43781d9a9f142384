use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

use crate::{
    ast::{BinaryOp, Node, UnaryOp},
    lex::{Lexer, Token, TokenKind},
};

#[derive(Error, Debug, Diagnostic)]
pub enum SyntaxError {
    #[error("Unexpected token '{token}'")]
    #[diagnostic(
        code(expr::unexpected_token),
        help("remove or correct the token: `{token}`")
    )]
    UnexpectedToken {
        #[source_code]
        src: NamedSource<String>,
        #[label("this token")]
        span: SourceSpan,
        token: String,
    },

    #[error("Unexpected end of input")]
    #[diagnostic(
        code(expr::unexpected_eof),
        help("the expression ended where a number, a name or `(` was expected")
    )]
    UnexpectedEof {
        #[source_code]
        src: NamedSource<String>,
        #[label("expected an operand here")]
        span: SourceSpan,
    },

    #[error("Missing close parenthesis")]
    #[diagnostic(code(expr::missing_close_paren))]
    MissingCloseParen {
        #[source_code]
        src: NamedSource<String>,
        #[label("opened here")]
        open: SourceSpan,
        #[label("expected `)` here")]
        span: SourceSpan,
    },

    #[error("Unexpected characters at end of expression")]
    #[diagnostic(
        code(expr::trailing_input),
        help("join the pieces with an operator or remove `{token}`")
    )]
    TrailingInput {
        #[source_code]
        src: NamedSource<String>,
        #[label("not part of the expression")]
        span: SourceSpan,
        token: String,
    },

    #[error("Function `{name}` called without arguments")]
    #[diagnostic(
        code(expr::empty_arguments),
        help("functions take at least one argument; write `{name}` without parentheses to read it as a variable")
    )]
    EmptyArguments {
        #[source_code]
        src: NamedSource<String>,
        #[label("empty argument list")]
        span: SourceSpan,
        name: String,
    },
}

impl SyntaxError {
    /// Where in the input the error was detected.
    pub fn span(&self) -> SourceSpan {
        match self {
            SyntaxError::UnexpectedToken { span, .. }
            | SyntaxError::UnexpectedEof { span, .. }
            | SyntaxError::MissingCloseParen { span, .. }
            | SyntaxError::TrailingInput { span, .. }
            | SyntaxError::EmptyArguments { span, .. } => *span,
        }
    }

    fn src(&self) -> &NamedSource<String> {
        match self {
            SyntaxError::UnexpectedToken { src, .. }
            | SyntaxError::UnexpectedEof { src, .. }
            | SyntaxError::MissingCloseParen { src, .. }
            | SyntaxError::TrailingInput { src, .. }
            | SyntaxError::EmptyArguments { src, .. } => src,
        }
    }

    /// 1-based line of [`SyntaxError::span`].
    pub fn line(&self) -> usize {
        self.src().inner()[..self.span().offset()].matches('\n').count() + 1
    }
}

/// Recursive-descent parser, one method per precedence level:
///
/// ```text
/// expression := add_sub EOF
/// add_sub    := mul_div (('+' | '-') mul_div)*
/// mul_div    := unary (('*' | '/') unary)*
/// unary      := '+' unary | '-' unary | leaf
/// leaf       := NUMBER | '(' add_sub ')' | IDENTIFIER ['(' add_sub (',' add_sub)* ')']
/// ```
///
/// Nesting depth is bounded only by the stack.
pub struct Parser<'de> {
    lexer: Lexer<'de>,
}

impl<'de> Parser<'de> {
    pub fn new(filename: Option<&'de str>, whole: &'de str) -> Self {
        Parser {
            lexer: Lexer::new(filename, whole),
        }
    }

    /// Parses the whole input as one expression.
    pub fn parse(mut self) -> Result<Node, SyntaxError> {
        let expression = self.parse_add_sub()?;

        let token = self.lexer.token();
        if token.kind != TokenKind::Eof {
            return Err(SyntaxError::TrailingInput {
                src: self.lexer.source(),
                span: token.span(),
                token: token.literal.to_string(),
            });
        }

        tracing::debug!(%expression, "parsed expression");
        Ok(expression)
    }

    fn parse_add_sub(&mut self) -> Result<Node, SyntaxError> {
        let mut lhs = self.parse_mul_div()?;
        loop {
            let op = match self.lexer.kind() {
                TokenKind::Plus => BinaryOp::Add,
                TokenKind::Minus => BinaryOp::Subtract,
                _ => return Ok(lhs),
            };
            self.lexer.advance();

            let rhs = self.parse_mul_div()?;
            lhs = Node::binary(op, lhs, rhs);
        }
    }

    fn parse_mul_div(&mut self) -> Result<Node, SyntaxError> {
        let mut lhs = self.parse_unary()?;
        loop {
            let op = match self.lexer.kind() {
                TokenKind::Star => BinaryOp::Multiply,
                TokenKind::Slash => BinaryOp::Divide,
                _ => return Ok(lhs),
            };
            self.lexer.advance();

            let rhs = self.parse_unary()?;
            lhs = Node::binary(op, lhs, rhs);
        }
    }

    fn parse_unary(&mut self) -> Result<Node, SyntaxError> {
        match self.lexer.kind() {
            // unary plus is a no-op
            TokenKind::Plus => {
                self.lexer.advance();
                self.parse_unary()
            }
            TokenKind::Minus => {
                self.lexer.advance();
                let operand = self.parse_unary()?;
                Ok(Node::unary(UnaryOp::Negate, operand))
            }
            _ => self.parse_leaf(),
        }
    }

    fn parse_leaf(&mut self) -> Result<Node, SyntaxError> {
        let token = self.lexer.token();
        match token.kind {
            TokenKind::Number(n) => {
                self.lexer.advance();
                Ok(Node::Literal(n))
            }
            TokenKind::LeftParen => {
                self.lexer.advance();
                let node = self.parse_add_sub()?;
                self.expect_close(token)?;
                Ok(node)
            }
            TokenKind::Ident => {
                self.lexer.advance();
                let open = self.lexer.token();
                if open.kind != TokenKind::LeftParen {
                    return Ok(Node::variable(token.literal));
                }
                self.lexer.advance();

                let close = self.lexer.token();
                if close.kind == TokenKind::RightParen {
                    return Err(SyntaxError::EmptyArguments {
                        src: self.lexer.source(),
                        span: SourceSpan::from(open.offset..close.offset + close.literal.len()),
                        name: token.literal.to_string(),
                    });
                }

                let mut arguments = vec![self.parse_add_sub()?];
                while self.lexer.kind() == TokenKind::Comma {
                    self.lexer.advance();
                    arguments.push(self.parse_add_sub()?);
                }
                self.expect_close(open)?;

                Ok(Node::call(token.literal, arguments))
            }
            TokenKind::Eof => Err(SyntaxError::UnexpectedEof {
                src: self.lexer.source(),
                span: token.span(),
            }),
            _ => Err(SyntaxError::UnexpectedToken {
                src: self.lexer.source(),
                span: token.span(),
                token: token.literal.to_string(),
            }),
        }
    }

    /// Consumes the `)` matching `open`.
    fn expect_close(&mut self, open: Token<'de>) -> Result<(), SyntaxError> {
        let token = self.lexer.token();
        if token.kind != TokenKind::RightParen {
            return Err(SyntaxError::MissingCloseParen {
                src: self.lexer.source(),
                open: open.span(),
                span: token.span(),
            });
        }
        self.lexer.advance();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::ast::TernaryOp;

    fn parse(input: &str) -> Result<Node, SyntaxError> {
        Parser::new(None, input).parse()
    }

    fn lit(n: f64) -> Node {
        Node::Literal(n)
    }

    #[test]
    fn multiplication_binds_tighter() {
        assert_eq!(
            parse("2 + 3 * 4").unwrap(),
            Node::binary(
                BinaryOp::Add,
                lit(2.0),
                Node::binary(BinaryOp::Multiply, lit(3.0), lit(4.0))
            )
        );
    }

    #[test]
    fn subtraction_is_left_associative() {
        assert_eq!(
            parse("10 - 3 - 2").unwrap(),
            Node::binary(
                BinaryOp::Subtract,
                Node::binary(BinaryOp::Subtract, lit(10.0), lit(3.0)),
                lit(2.0)
            )
        );
    }

    #[test]
    fn unary_operators_nest() {
        assert_eq!(
            parse("--5").unwrap(),
            Node::unary(UnaryOp::Negate, Node::unary(UnaryOp::Negate, lit(5.0)))
        );
        assert_eq!(parse("+ + 5").unwrap(), lit(5.0));
        assert_eq!(
            parse("2 * -x").unwrap(),
            Node::binary(
                BinaryOp::Multiply,
                lit(2.0),
                Node::unary(UnaryOp::Negate, Node::variable("x"))
            )
        );
    }

    #[test]
    fn identifiers_become_variables_or_calls() {
        assert_eq!(parse("speed").unwrap(), Node::variable("speed"));
        assert_eq!(
            parse("clamp(sin(x) + 2, 0, 1)").unwrap(),
            Node::call(
                "clamp",
                vec![
                    Node::binary(
                        BinaryOp::Add,
                        Node::call("sin", vec![Node::variable("x")]),
                        lit(2.0)
                    ),
                    lit(0.0),
                    lit(1.0),
                ]
            )
        );
        // the grammar never produces ternary nodes
        assert_ne!(
            parse("clamp(v, 0, 1)").unwrap(),
            Node::ternary(TernaryOp::Clamp, Node::variable("v"), lit(0.0), lit(1.0))
        );
    }

    #[test]
    fn literals_are_kept_as_scanned() {
        assert_eq!(parse("1E-5").unwrap(), lit(1e-5));
        assert_eq!(parse("0.1").unwrap(), lit(0.1));
    }

    #[test]
    fn missing_close_parenthesis() {
        let error = parse("(1 + 2").unwrap_err();
        assert!(matches!(error, SyntaxError::MissingCloseParen { .. }));
        assert_eq!(error.span(), SourceSpan::from(6..6));

        let error = parse("max(1, 2").unwrap_err();
        assert!(matches!(
            error,
            SyntaxError::MissingCloseParen { open, .. } if open == SourceSpan::from(3..4)
        ));
        assert!(matches!(
            parse("f(1 2)").unwrap_err(),
            SyntaxError::MissingCloseParen { .. }
        ));
    }

    #[test]
    fn unexpected_end_of_input() {
        assert!(matches!(
            parse("1 +").unwrap_err(),
            SyntaxError::UnexpectedEof { .. }
        ));
        assert!(matches!(parse("").unwrap_err(), SyntaxError::UnexpectedEof { .. }));
        assert!(matches!(parse("   ").unwrap_err(), SyntaxError::UnexpectedEof { .. }));
    }

    #[test]
    fn trailing_tokens() {
        let error = parse("1 2").unwrap_err();
        assert!(matches!(
            &error,
            SyntaxError::TrailingInput { token, .. } if token == "2"
        ));
        assert_eq!(error.span(), SourceSpan::from(2..3));
        assert!(matches!(
            parse("(1))").unwrap_err(),
            SyntaxError::TrailingInput { .. }
        ));
        assert!(matches!(
            parse("x $").unwrap_err(),
            SyntaxError::TrailingInput { token, .. } if token == "$"
        ));
    }

    #[test]
    fn tokens_that_cannot_start_an_operand() {
        for (input, bad) in [
            (")", ")"),
            ("f(, 1)", ","),
            ("2 * * 3", "*"),
            ("#", "#"),
            (".", "."),
        ] {
            let error = parse(input).unwrap_err();
            assert!(
                matches!(&error, SyntaxError::UnexpectedToken { token, .. } if token == bad),
                "{input}: {error:?}"
            );
        }
    }

    #[test]
    fn empty_argument_list_is_rejected() {
        let error = parse("rand()").unwrap_err();
        assert!(matches!(
            &error,
            SyntaxError::EmptyArguments { name, .. } if name == "rand"
        ));
        assert_eq!(error.span(), SourceSpan::from(4..6));
    }

    #[test]
    fn error_lines() {
        let error = parse("1 +\n2 +\n").unwrap_err();
        assert_eq!(error.line(), 3);
        assert_eq!(parse("1 2").unwrap_err().line(), 1);
    }

    #[test]
    fn diagnostics_name_the_source() {
        let error = Parser::new(Some("formula.txt"), "1 +").parse().unwrap_err();
        let report = miette::Report::new(error);
        assert_eq!(report.to_string(), "Unexpected end of input");
        assert!(report.source_code().is_some());
    }
}
