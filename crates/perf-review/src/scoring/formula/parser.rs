use super::lexer::{Spanned, Token};
use super::FormulaError;
use crate::scoring::model::Category;

pub(crate) const MAX_DEPTH: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    Divide,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Expr {
    Number(f64),
    Variable(Category),
    Negate(Box<Expr>),
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
}

/// Recursive-descent parser over the grammar
///
/// ```text
/// expr    := term (('+' | '-') term)*
/// term    := unary (('*' | '/') unary)*
/// unary   := ('+' | '-') unary | primary
/// primary := NUMBER | VARIABLE | '(' expr ')'
/// ```
///
/// Tree depth is capped at [`MAX_DEPTH`]. Each parenthesis or unary sign on the path to
/// a leaf counts one level, as does each chained binary operator.
pub(crate) fn parse(tokens: &[Spanned]) -> Result<Expr, FormulaError> {
    if tokens.is_empty() {
        return Err(FormulaError::Empty);
    }

    let mut parser = Parser {
        tokens,
        cursor: 0,
        depth: 0,
    };
    let expr = parser.expr()?;

    match parser.peek() {
        None => Ok(expr),
        Some(trailing) => Err(unexpected(trailing)),
    }
}

struct Parser<'a> {
    tokens: &'a [Spanned],
    cursor: usize,
    depth: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<&'a Spanned> {
        self.tokens.get(self.cursor)
    }

    fn advance(&mut self) -> Option<&'a Spanned> {
        let next = self.tokens.get(self.cursor);
        if next.is_some() {
            self.cursor += 1;
        }
        next
    }

    fn expr(&mut self) -> Result<Expr, FormulaError> {
        let entry_depth = self.depth;
        let mut lhs = self.term()?;
        while let Some((op, position)) = self.peek().and_then(|spanned| match spanned.token {
            Token::Plus => Some((BinaryOp::Add, spanned.position)),
            Token::Minus => Some((BinaryOp::Subtract, spanned.position)),
            _ => None,
        }) {
            self.descend(position)?;
            self.cursor += 1;
            let rhs = self.term()?;
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
        self.depth = entry_depth;
        Ok(lhs)
    }

    fn term(&mut self) -> Result<Expr, FormulaError> {
        let entry_depth = self.depth;
        let mut lhs = self.unary()?;
        while let Some((op, position)) = self.peek().and_then(|spanned| match spanned.token {
            Token::Star => Some((BinaryOp::Multiply, spanned.position)),
            Token::Slash => Some((BinaryOp::Divide, spanned.position)),
            _ => None,
        }) {
            self.descend(position)?;
            self.cursor += 1;
            let rhs = self.unary()?;
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
        self.depth = entry_depth;
        Ok(lhs)
    }

    fn descend(&mut self, position: usize) -> Result<(), FormulaError> {
        if self.depth >= MAX_DEPTH {
            return Err(FormulaError::TooDeep { position });
        }
        self.depth += 1;
        Ok(())
    }

    fn unary(&mut self) -> Result<Expr, FormulaError> {
        let Some(spanned) = self.peek() else {
            return self.primary();
        };
        match spanned.token {
            Token::Minus => {
                self.descend(spanned.position)?;
                self.cursor += 1;
                let operand = self.unary()?;
                self.depth -= 1;
                Ok(Expr::Negate(Box::new(operand)))
            }
            Token::Plus => {
                self.descend(spanned.position)?;
                self.cursor += 1;
                let operand = self.unary()?;
                self.depth -= 1;
                Ok(operand)
            }
            _ => self.primary(),
        }
    }

    fn primary(&mut self) -> Result<Expr, FormulaError> {
        let spanned = self.advance().ok_or(FormulaError::UnexpectedEnd)?;
        match spanned.token {
            Token::Number(value) => Ok(Expr::Number(value)),
            Token::Variable(category) => Ok(Expr::Variable(category)),
            Token::LeftParen => {
                self.descend(spanned.position)?;
                let inner = self.expr()?;
                self.depth -= 1;
                match self.advance() {
                    Some(Spanned {
                        token: Token::RightParen,
                        ..
                    }) => Ok(inner),
                    Some(other) => Err(unexpected(other)),
                    None => Err(FormulaError::UnclosedParen {
                        position: spanned.position,
                    }),
                }
            }
            _ => Err(unexpected(spanned)),
        }
    }
}

fn unexpected(spanned: &Spanned) -> FormulaError {
    FormulaError::UnexpectedToken {
        found: spanned.token.describe(),
        position: spanned.position,
    }
}
