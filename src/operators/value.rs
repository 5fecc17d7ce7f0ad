//! Operand and number types for the evaluator.
//!
//! Numbers keep integer-ness: integer inputs give integer sums and products,
//! promoted to float only on overflow. JSON `6` stays `6`, not `6.0`.

use serde::{Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;

use super::error::{EvalError, EvalResult};

/// A numeric operand or result
#[derive(Debug, Clone, Copy)]
pub enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    pub fn as_f64(self) -> f64 {
        match self {
            Number::Int(v) => v as f64,
            Number::Float(v) => v,
        }
    }

    pub fn is_zero(self) -> bool {
        match self {
            Number::Int(v) => v == 0,
            Number::Float(v) => v == 0.0,
        }
    }

    pub fn is_finite(self) -> bool {
        match self {
            Number::Int(_) => true,
            Number::Float(v) => v.is_finite(),
        }
    }

    pub fn checked_add(self, rhs: Number) -> Number {
        match (self, rhs) {
            (Number::Int(a), Number::Int(b)) => match a.checked_add(b) {
                Some(v) => Number::Int(v),
                None => Number::Float(a as f64 + b as f64),
            },
            (a, b) => Number::Float(a.as_f64() + b.as_f64()),
        }
    }

    pub fn checked_sub(self, rhs: Number) -> Number {
        match (self, rhs) {
            (Number::Int(a), Number::Int(b)) => match a.checked_sub(b) {
                Some(v) => Number::Int(v),
                None => Number::Float(a as f64 - b as f64),
            },
            (a, b) => Number::Float(a.as_f64() - b.as_f64()),
        }
    }

    pub fn checked_mul(self, rhs: Number) -> Number {
        match (self, rhs) {
            (Number::Int(a), Number::Int(b)) => match a.checked_mul(b) {
                Some(v) => Number::Int(v),
                None => Number::Float(a as f64 * b as f64),
            },
            (a, b) => Number::Float(a.as_f64() * b.as_f64()),
        }
    }

    /// True division; always a float
    pub fn true_div(self, rhs: Number) -> Number {
        Number::Float(self.as_f64() / rhs.as_f64())
    }
}

impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        self.partial_cmp(other) == Some(Ordering::Equal)
    }
}

impl PartialOrd for Number {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Number::Int(a), Number::Int(b)) => Some(a.cmp(b)),
            (a, b) => a.as_f64().partial_cmp(&b.as_f64()),
        }
    }
}

impl Serialize for Number {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Number::Int(v) => serializer.serialize_i64(*v),
            Number::Float(v) => serializer.serialize_f64(*v),
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Int(v) => write!(f, "{}", v),
            Number::Float(v) => write!(f, "{}", v),
        }
    }
}

impl From<i64> for Number {
    fn from(v: i64) -> Self {
        Number::Int(v)
    }
}

impl From<f64> for Number {
    fn from(v: f64) -> Self {
        Number::Float(v)
    }
}

/// A single evaluator input
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Operand {
    Bool(bool),
    Number(Number),
}

impl Operand {
    /// Parse a JSON input; only booleans and numbers are accepted
    pub fn from_json(index: usize, value: &serde_json::Value) -> EvalResult<Self> {
        match value {
            serde_json::Value::Bool(b) => Ok(Operand::Bool(*b)),
            serde_json::Value::Number(n) => {
                if let Some(v) = n.as_i64() {
                    Ok(Operand::Number(Number::Int(v)))
                } else if let Some(v) = n.as_f64() {
                    Ok(Operand::Number(Number::Float(v)))
                } else {
                    Err(EvalError::InvalidOperand {
                        index,
                        reason: format!("unrepresentable number {}", n),
                    })
                }
            }
            other => Err(EvalError::InvalidOperand {
                index,
                reason: format!("expected a boolean or a number, got {}", json_type_name(other)),
            }),
        }
    }

    /// Parse a whole input list
    pub fn parse_all(values: &[serde_json::Value]) -> EvalResult<Vec<Self>> {
        values
            .iter()
            .enumerate()
            .map(|(i, v)| Operand::from_json(i, v))
            .collect()
    }

    /// Truthiness: numbers are true when non-zero
    pub fn truthy(self) -> bool {
        match self {
            Operand::Bool(b) => b,
            Operand::Number(n) => !n.is_zero(),
        }
    }

    /// Numeric view used by comparisons: booleans compare as 0/1
    pub fn comparable(self) -> Number {
        match self {
            Operand::Bool(b) => Number::Int(b as i64),
            Operand::Number(n) => n,
        }
    }

    /// Strict numeric view used by arithmetic
    pub fn number(self, index: usize) -> EvalResult<Number> {
        match self {
            Operand::Number(n) => Ok(n),
            Operand::Bool(_) => Err(EvalError::InvalidOperand {
                index,
                reason: "arithmetic requires a number, got a boolean".to_string(),
            }),
        }
    }
}

impl From<bool> for Operand {
    fn from(v: bool) -> Self {
        Operand::Bool(v)
    }
}

impl From<i64> for Operand {
    fn from(v: i64) -> Self {
        Operand::Number(Number::Int(v))
    }
}

impl From<f64> for Operand {
    fn from(v: f64) -> Self {
        Operand::Number(Number::Float(v))
    }
}

fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
