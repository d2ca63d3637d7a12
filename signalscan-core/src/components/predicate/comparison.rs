//! Typed two-column comparisons parsed from short text expressions.
//!
//! Accepted form: `<column> <op> <column>`, e.g. `MA5 == MA10`. Operators
//! are `==` (or `=`), `>` and `<`. Expressions are parsed once when a
//! strategy is built; a bad expression is a build error, never a per-row
//! failure.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{PatternPredicate, Truth};
use crate::components::indicator::{IndicatorFrame, MaColumn, ParseColumnError};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExprError {
    #[error("empty expression")]
    Empty,

    #[error("expression '{0}' has no comparison operator (expected ==, > or <)")]
    MissingOperator(String),

    #[error("expression '{expr}': {source}")]
    BadColumn {
        expr: String,
        #[source]
        source: ParseColumnError,
    },

    #[error("expression '{0}' compares a column with itself")]
    SameColumn(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CmpOp {
    Eq,
    Gt,
    Lt,
}

impl CmpOp {
    pub fn apply(self, left: f64, right: f64) -> bool {
        match self {
            CmpOp::Eq => left == right,
            CmpOp::Gt => left > right,
            CmpOp::Lt => left < right,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            CmpOp::Eq => "==",
            CmpOp::Gt => ">",
            CmpOp::Lt => "<",
        }
    }
}

/// `left <op> right`, read at `slot`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnComparison {
    pub left: MaColumn,
    pub op: CmpOp,
    pub right: MaColumn,
    pub slot: usize,
}

impl ColumnComparison {
    pub fn new(left: MaColumn, op: CmpOp, right: MaColumn, slot: usize) -> Self {
        Self { left, op, right, slot }
    }

    /// Parse `expr` and anchor it at `slot`.
    pub fn parse(expr: &str, slot: usize) -> Result<Self, ExprError> {
        let trimmed = expr.trim();
        if trimmed.is_empty() {
            return Err(ExprError::Empty);
        }

        // Longest operator first so "==" is not read as "=".
        let (pos, token, op) = [("==", CmpOp::Eq), ("=", CmpOp::Eq), (">", CmpOp::Gt), ("<", CmpOp::Lt)]
            .iter()
            .find_map(|(token, op)| trimmed.find(token).map(|pos| (pos, *token, *op)))
            .ok_or_else(|| ExprError::MissingOperator(trimmed.to_string()))?;

        let column = |s: &str| {
            MaColumn::from_str(s).map_err(|source| ExprError::BadColumn {
                expr: trimmed.to_string(),
                source,
            })
        };
        let left = column(&trimmed[..pos])?;
        let right = column(&trimmed[pos + token.len()..])?;
        if left == right {
            return Err(ExprError::SameColumn(trimmed.to_string()));
        }

        Ok(Self::new(left, op, right, slot))
    }
}

impl fmt::Display for ColumnComparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.left, self.op.symbol(), self.right)
    }
}

impl PatternPredicate for ColumnComparison {
    fn describe(&self) -> String {
        format!("{self} @{}", self.slot)
    }

    fn depth(&self) -> usize {
        self.slot
    }

    fn columns(&self) -> Vec<MaColumn> {
        vec![self.left, self.right]
    }

    fn evaluate_at(&self, frame: &IndicatorFrame, row: usize) -> Truth {
        Truth::compare(
            frame.value_at(self.left, row, self.slot),
            frame.value_at(self.right, row, self.slot),
            |l, r| self.op.apply(l, r),
        )
    }
}
