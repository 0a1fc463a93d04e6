//! Sandboxed arithmetic formulas over category scores.
//!
//! Only numeric literals, the category variables (`goal_score`, `self_score`,
//! `feedback_score`, `kpi_score`, `competency_score`, `culture_score`), the four
//! arithmetic operators, unary minus, and parentheses are accepted. Anything else is
//! rejected while parsing, before any value is computed.

mod lexer;
mod parser;

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::model::{Category, CategoryScores};
use parser::{BinaryOp, Expr};

/// Parse or evaluation failure for a composite formula.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FormulaError {
    #[error("formula is empty")]
    Empty,
    #[error("unknown identifier '{name}' at position {position}")]
    UnknownIdentifier { name: String, position: usize },
    #[error("unexpected character '{character}' at position {position}")]
    UnexpectedCharacter { character: char, position: usize },
    #[error("malformed number '{literal}' at position {position}")]
    InvalidNumber { literal: String, position: usize },
    #[error("unexpected {found} at position {position}")]
    UnexpectedToken { found: String, position: usize },
    #[error("formula ends unexpectedly")]
    UnexpectedEnd,
    #[error("parenthesis opened at position {position} is never closed")]
    UnclosedParen { position: usize },
    #[error("formula nests deeper than {max} levels at position {position}", max = parser::MAX_DEPTH)]
    TooDeep { position: usize },
    #[error("'{}' is not scored by this template", .0.variable_name())]
    UnsupportedVariable(Category),
    #[error("no score supplied for '{}'", .0.variable_name())]
    MissingVariable(Category),
    #[error("division by zero")]
    DivisionByZero,
    #[error("formula produced a non-finite result")]
    NonFinite,
}

/// A validated composite formula.
#[derive(Debug, Clone, PartialEq)]
pub struct Formula {
    source: String,
    expr: Expr,
}

impl Formula {
    pub fn parse(source: &str) -> Result<Self, FormulaError> {
        let tokens = lexer::tokenize(source)?;
        let expr = parser::parse(&tokens)?;
        Ok(Self {
            source: source.trim().to_string(),
            expr,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Categories the formula reads.
    pub fn variables(&self) -> BTreeSet<Category> {
        let mut found = BTreeSet::new();
        collect_variables(&self.expr, &mut found);
        found
    }

    /// Reject formulas reading a category outside `available`.
    pub fn ensure_variables(&self, available: &[Category]) -> Result<(), FormulaError> {
        match self
            .variables()
            .into_iter()
            .find(|category| !available.contains(category))
        {
            Some(unsupported) => Err(FormulaError::UnsupportedVariable(unsupported)),
            None => Ok(()),
        }
    }

    /// Evaluate against category scores. Every referenced category must be present;
    /// the check runs before any arithmetic.
    pub fn evaluate(&self, scores: &CategoryScores) -> Result<f64, FormulaError> {
        if let Some(missing) = self
            .variables()
            .into_iter()
            .find(|category| !scores.contains_key(category))
        {
            return Err(FormulaError::MissingVariable(missing));
        }

        let value = eval(&self.expr, scores)?;
        if value.is_finite() {
            Ok(value)
        } else {
            Err(FormulaError::NonFinite)
        }
    }
}

impl fmt::Display for Formula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

impl std::str::FromStr for Formula {
    type Err = FormulaError;

    fn from_str(source: &str) -> Result<Self, Self::Err> {
        Formula::parse(source)
    }
}

impl Serialize for Formula {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.source)
    }
}

impl<'de> Deserialize<'de> for Formula {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Formula::parse(&raw).map_err(serde::de::Error::custom)
    }
}

fn collect_variables(expr: &Expr, found: &mut BTreeSet<Category>) {
    match expr {
        Expr::Number(_) => {}
        Expr::Variable(category) => {
            found.insert(*category);
        }
        Expr::Negate(inner) => collect_variables(inner, found),
        Expr::Binary { lhs, rhs, .. } => {
            collect_variables(lhs, found);
            collect_variables(rhs, found);
        }
    }
}

fn eval(expr: &Expr, scores: &CategoryScores) -> Result<f64, FormulaError> {
    match expr {
        Expr::Number(value) => Ok(*value),
        Expr::Variable(category) => scores
            .get(category)
            .copied()
            .ok_or(FormulaError::MissingVariable(*category)),
        Expr::Negate(inner) => Ok(-eval(inner, scores)?),
        Expr::Binary { op, lhs, rhs } => {
            let lhs = eval(lhs, scores)?;
            let rhs = eval(rhs, scores)?;
            match op {
                BinaryOp::Add => Ok(lhs + rhs),
                BinaryOp::Subtract => Ok(lhs - rhs),
                BinaryOp::Multiply => Ok(lhs * rhs),
                BinaryOp::Divide if rhs == 0.0 => Err(FormulaError::DivisionByZero),
                BinaryOp::Divide => Ok(lhs / rhs),
            }
        }
    }
}
