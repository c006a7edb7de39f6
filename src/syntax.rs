use core::slice::Iter;
use std::{convert::From, iter::Peekable};

use crate::{
    lex::{ContextualizedToken, Token},
    CalcNumber,
};

/// Takes a token stream and a pattern, consuming and returning the next token if it matches the pattern - otherwise returns a peek of the next token.
macro_rules! chase {
    ($tokens:expr, $pattern:pat $(if $guard:expr)? $(,)?) => {{
        if let Some(ctx) = $tokens.next_if(|next| match &next.token {
                $pattern $(if $guard)? => true,
                _ => false,
            }) {
            Found(ctx.token)
        } else {
            NotFound(**$tokens.peek().expect("EndOfInput can't be reached when chasing"))
        }
    }};
}

/// Parses one statement out of a lexed token stream.
///
/// Grammar, lowest to highest precedence:
/// ```text
/// Statement  := Expression [ '=' Expression ]
/// Expression := Term { ('+' | '-') Term }
/// Term       := Power { ('*' | '/' | '%') Power }
/// Power      := Unary ['^' Power]
/// Unary      := ('+' | '-') Unary | Primary
/// Primary    := NUMBER | IDENT | IDENT '(' Expression ')' | '(' Expression ')'
/// ```
#[derive(Debug, Clone)]
pub struct Parser<'t, 'src> {
    tokens: Peekable<Iter<'t, ContextualizedToken<'src>>>,
}

impl<'t, 'src> Parser<'t, 'src> {
    pub fn new(tokens: &'t [ContextualizedToken<'src>]) -> Self {
        Parser {
            tokens: tokens.iter().peekable(),
        }
    }

    /// Parses the token stream as a single statement and requires that
    /// nothing but the end-of-input marker follows it.
    pub fn parse(mut self) -> ParseExpr<'src> {
        let expr = self.parse_statement()?;

        match chase!(self.tokens, Token::EndOfInput) {
            Found(_) => Ok(expr),
            NotFound(ctx) => Err(ParseError::TrailingInput(ctx)),
        }
    }

    fn parse_statement(&mut self) -> ParseExpr<'src> {
        let expr = self.parse_expression()?;

        match chase!(self.tokens, Token::Equal) {
            Found(_) => {
                // The right-hand side is a plain expression, so `x = y = 5`
                // does not chain
                let value = self.parse_expression()?;

                match expr {
                    Expr::Variable { identifier } => Ok(Expr::Assignment {
                        identifier,
                        expr: Box::new(value),
                    }),
                    _ => Err(ParseError::InvalidAssignment(expr)),
                }
            }
            NotFound(_) => Ok(expr),
        }
    }

    fn parse_expression(&mut self) -> ParseExpr<'src> {
        let mut expr = self.parse_term()?;

        while let Found(token) = chase!(self.tokens, Token::Plus | Token::Minus) {
            let op = BinaryOp::from(token);
            let right = self.parse_term()?;
            expr = Expr::Binary {
                left: Box::new(expr),
                op,
                right: Box::new(right),
            };
        }

        Ok(expr)
    }

    fn parse_term(&mut self) -> ParseExpr<'src> {
        let mut expr = self.parse_power()?;

        while let Found(token) =
            chase!(self.tokens, Token::Star | Token::Slash | Token::Percent)
        {
            let op = BinaryOp::from(token);
            let right = self.parse_power()?;
            expr = Expr::Binary {
                left: Box::new(expr),
                op,
                right: Box::new(right),
            };
        }

        Ok(expr)
    }

    fn parse_power(&mut self) -> ParseExpr<'src> {
        let expr = self.parse_unary()?;

        // Recursing into the same level makes `^` right-associative:
        // `2^3^2` parses as `2^(3^2)`
        match chase!(self.tokens, Token::Caret) {
            Found(_) => {
                let right = self.parse_power()?;
                Ok(Expr::Binary {
                    left: Box::new(expr),
                    op: BinaryOp::Pow,
                    right: Box::new(right),
                })
            }
            NotFound(_) => Ok(expr),
        }
    }

    fn parse_unary(&mut self) -> ParseExpr<'src> {
        if let Found(token) = chase!(self.tokens, Token::Plus | Token::Minus) {
            let op = UnaryOp::from(token);
            let expr = self.parse_unary()?;
            return Ok(Expr::Unary {
                op,
                expr: Box::new(expr),
            });
        }

        self.parse_primary()
    }

    fn parse_primary(&mut self) -> ParseExpr<'src> {
        match chase!(
            self.tokens,
            Token::Number(_) | Token::Identifier(_) | Token::LeftParen
        ) {
            Found(Token::Number(num)) => Ok(Expr::Literal(num)),
            Found(Token::Identifier(identifier)) => {
                // An identifier directly followed by `(` is a function call,
                // otherwise it's a variable reference
                match chase!(self.tokens, Token::LeftParen) {
                    Found(_) => {
                        let argument = self.parse_expression()?;
                        match chase!(self.tokens, Token::RightParen) {
                            Found(_) => Ok(Expr::FunctionCall {
                                identifier,
                                argument: Box::new(argument),
                            }),
                            NotFound(ctx) => Err(ParseError::UnmatchedParens(ctx)),
                        }
                    }
                    NotFound(_) => Ok(Expr::Variable { identifier }),
                }
            }
            Found(Token::LeftParen) => {
                let expr = self.parse_expression()?;
                match chase!(self.tokens, Token::RightParen) {
                    Found(_) => Ok(Expr::Grouping {
                        expr: Box::new(expr),
                    }),
                    NotFound(ctx) => Err(ParseError::UnmatchedParens(ctx)),
                }
            }
            NotFound(ctx) => {
                if let Token::EndOfInput = ctx.token {
                    Err(ParseError::UnexpectedEnd)
                } else {
                    Err(ParseError::UnexpectedToken(ctx))
                }
            }
            _ => unreachable!(),
        }
    }
}

/// An expression in the calculator grammar.
#[derive(Debug, Clone)]
pub enum Expr<'src> {
    /// A variable assignment. Produces the assigned value.
    Assignment {
        identifier: &'src str,
        expr: Box<Expr<'src>>,
    },
    Binary {
        left: Box<Expr<'src>>,
        op: BinaryOp,
        right: Box<Expr<'src>>,
    },
    /// A single-argument function call.
    FunctionCall {
        identifier: &'src str,
        argument: Box<Expr<'src>>,
    },
    /// A parenthesised expression.
    Grouping {
        expr: Box<Expr<'src>>,
    },
    /// A numeric literal. Every base has already widened to `CalcNumber`.
    Literal(CalcNumber),
    /// An identifier referring to a variable in the environment.
    Variable {
        identifier: &'src str,
    },
    Unary {
        op: UnaryOp,
        expr: Box<Expr<'src>>,
    },
}

#[derive(thiserror::Error, Debug, Clone)]
pub enum ParseError<'src> {
    #[error("Unexpected end of expression.")]
    UnexpectedEnd,

    #[error("Expected closing parenthesis instead of {0}.")]
    UnmatchedParens(ContextualizedToken<'src>),

    #[error("Expected a variable on the left-hand side of assignment instead of \"{0:?}\".")]
    InvalidAssignment(Expr<'src>),

    #[error("Expected end of expression instead of {0}.")]
    TrailingInput(ContextualizedToken<'src>),

    #[error("Unexpected token {0}.")]
    UnexpectedToken(ContextualizedToken<'src>),
}

/// The type returned by the `chase!` macro.
enum Chased<'src> {
    Found(Token<'src>),
    NotFound(ContextualizedToken<'src>),
}

use Chased::*;

/// The unary operators in the calculator grammar.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum UnaryOp {
    /// A no-op on the value.
    Plus,
    Minus,
}

impl<'src> From<Token<'src>> for UnaryOp {
    /// Constructs a `UnaryOp` from it's equivalent `Token` counterpart.
    /// Panics if the token is not a valid unary operator.
    fn from(token: Token<'src>) -> Self {
        match token {
            Token::Plus => UnaryOp::Plus,
            Token::Minus => UnaryOp::Minus,
            _ => unreachable!("Invalid token for unary operator"),
        }
    }
}

/// The binary operators in the calculator grammar.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Pow,
}

impl<'src> From<Token<'src>> for BinaryOp {
    /// Constructs a `BinaryOp` from it's equivalent `Token` counterpart.
    /// Panics if the token is not a valid binary operator.
    fn from(token: Token<'src>) -> Self {
        match token {
            Token::Plus => BinaryOp::Add,
            Token::Minus => BinaryOp::Sub,
            Token::Star => BinaryOp::Mul,
            Token::Slash => BinaryOp::Div,
            Token::Percent => BinaryOp::Rem,
            Token::Caret => BinaryOp::Pow,
            _ => unreachable!("Invalid token for binary operator"),
        }
    }
}

pub type ParseExpr<'src> = Result<Expr<'src>, ParseError<'src>>;
