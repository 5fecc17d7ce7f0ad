//! Operator catalogs and evaluation.
//!
//! Two disjoint catalogs of named operators, each variant bound to an
//! [`Arity`] contract and a pure rule:
//!
//! | Logical       | Arity | Arithmetic | Arity |
//! |---------------|-------|------------|-------|
//! | `AND`         | 2     | `ADD`      | >= 1  |
//! | `OR`          | 2     | `SUBTRACT` | >= 2  |
//! | `NOT`         | 1     | `MULTIPLY` | >= 1  |
//! | `NAND`        | 2     | `DIVIDE`   | 2     |
//! | `NOR`         | 2     | `AVERAGE`  | >= 1  |
//! | `XOR`         | 2     |            |       |
//! | `XNOR`        | 2     |            |       |
//! | `GreaterThan` | 2     |            |       |
//! | `LessThan`    | 2     |            |       |
//! | `EqualTo`     | 2     |            |       |
//!
//! Names are case-sensitive. Lookups go through the process-wide
//! [`OperatorRegistry`], built once and read-only afterwards.

pub mod error;
pub mod evaluate;
pub mod value;

pub use error::{EvalError, EvalErrorKind, EvalResult};
pub use evaluate::{evaluate_logic, evaluate_math, MathOutcome};
pub use value::{Number, Operand};

use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

/// Declarative input-count contract
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "count", rename_all = "snake_case")]
pub enum Arity {
    Exactly(usize),
    AtLeast(usize),
}

impl Arity {
    pub fn accepts(&self, count: usize) -> bool {
        match *self {
            Arity::Exactly(n) => count == n,
            Arity::AtLeast(n) => count >= n,
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arity::Exactly(n) => write!(f, "exactly {}", n),
            Arity::AtLeast(n) => write!(f, "at least {}", n),
        }
    }
}

/// Logical catalog: boolean connectives and numeric comparisons
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicOp {
    And,
    Or,
    Not,
    Nand,
    Nor,
    Xor,
    Xnor,
    GreaterThan,
    LessThan,
    EqualTo,
}

impl LogicOp {
    pub fn all() -> &'static [LogicOp] {
        &[
            LogicOp::And,
            LogicOp::Or,
            LogicOp::Not,
            LogicOp::Nand,
            LogicOp::Nor,
            LogicOp::Xor,
            LogicOp::Xnor,
            LogicOp::GreaterThan,
            LogicOp::LessThan,
            LogicOp::EqualTo,
        ]
    }

    /// Wire name of the operator
    pub fn name(&self) -> &'static str {
        match self {
            LogicOp::And => "AND",
            LogicOp::Or => "OR",
            LogicOp::Not => "NOT",
            LogicOp::Nand => "NAND",
            LogicOp::Nor => "NOR",
            LogicOp::Xor => "XOR",
            LogicOp::Xnor => "XNOR",
            LogicOp::GreaterThan => "GreaterThan",
            LogicOp::LessThan => "LessThan",
            LogicOp::EqualTo => "EqualTo",
        }
    }

    pub fn arity(&self) -> Arity {
        match self {
            LogicOp::Not => Arity::Exactly(1),
            _ => Arity::Exactly(2),
        }
    }

    /// Apply the rule. Inputs must already satisfy [`LogicOp::arity`].
    pub fn apply(&self, inputs: &[Operand]) -> bool {
        let a = inputs[0];
        match self {
            LogicOp::Not => !a.truthy(),
            LogicOp::And => a.truthy() && inputs[1].truthy(),
            LogicOp::Or => a.truthy() || inputs[1].truthy(),
            LogicOp::Nand => !(a.truthy() && inputs[1].truthy()),
            LogicOp::Nor => !(a.truthy() || inputs[1].truthy()),
            LogicOp::Xor => a.truthy() != inputs[1].truthy(),
            LogicOp::Xnor => a.truthy() == inputs[1].truthy(),
            LogicOp::GreaterThan => a.comparable() > inputs[1].comparable(),
            LogicOp::LessThan => a.comparable() < inputs[1].comparable(),
            LogicOp::EqualTo => a.comparable() == inputs[1].comparable(),
        }
    }
}

/// Arithmetic catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MathOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Average,
}

impl MathOp {
    pub fn all() -> &'static [MathOp] {
        &[
            MathOp::Add,
            MathOp::Subtract,
            MathOp::Multiply,
            MathOp::Divide,
            MathOp::Average,
        ]
    }

    /// Wire name of the operator
    pub fn name(&self) -> &'static str {
        match self {
            MathOp::Add => "ADD",
            MathOp::Subtract => "SUBTRACT",
            MathOp::Multiply => "MULTIPLY",
            MathOp::Divide => "DIVIDE",
            MathOp::Average => "AVERAGE",
        }
    }

    pub fn arity(&self) -> Arity {
        match self {
            MathOp::Add | MathOp::Multiply | MathOp::Average => Arity::AtLeast(1),
            MathOp::Subtract => Arity::AtLeast(2),
            MathOp::Divide => Arity::Exactly(2),
        }
    }

    /// Apply the rule. Inputs must already satisfy [`MathOp::arity`].
    pub fn apply(&self, inputs: &[Number]) -> MathOutcome {
        match self {
            MathOp::Add => MathOutcome::Value(sum(inputs)),
            MathOp::Subtract => MathOutcome::Value(inputs[0].checked_sub(sum(&inputs[1..]))),
            MathOp::Multiply => MathOutcome::Value(
                inputs
                    .iter()
                    .fold(Number::Int(1), |acc, n| acc.checked_mul(*n)),
            ),
            MathOp::Divide => {
                if inputs[1].is_zero() {
                    MathOutcome::Absent
                } else {
                    MathOutcome::Value(inputs[0].true_div(inputs[1]))
                }
            }
            MathOp::Average => {
                MathOutcome::Value(sum(inputs).true_div(Number::Int(inputs.len() as i64)))
            }
        }
    }
}

fn sum(inputs: &[Number]) -> Number {
    inputs
        .iter()
        .fold(Number::Int(0), |acc, n| acc.checked_add(*n))
}

/// Catalog entry as listed by the API
#[derive(Debug, Clone, Serialize)]
pub struct OperatorInfo {
    pub name: &'static str,
    pub arity: Arity,
}

/// Name lookup for both catalogs.
///
/// Built once on first use; only ever read afterwards, so concurrent
/// requests share it without locking.
#[derive(Debug)]
pub struct OperatorRegistry {
    logic: HashMap<&'static str, LogicOp>,
    math: HashMap<&'static str, MathOp>,
}

static REGISTRY: LazyLock<OperatorRegistry> = LazyLock::new(OperatorRegistry::build);

impl OperatorRegistry {
    fn build() -> Self {
        Self {
            logic: LogicOp::all().iter().map(|op| (op.name(), *op)).collect(),
            math: MathOp::all().iter().map(|op| (op.name(), *op)).collect(),
        }
    }

    /// The process-wide registry
    pub fn global() -> &'static OperatorRegistry {
        &REGISTRY
    }

    pub fn logic(&self, name: &str) -> EvalResult<LogicOp> {
        self.logic
            .get(name)
            .copied()
            .ok_or_else(|| EvalError::UnknownOperation(name.to_string()))
    }

    pub fn math(&self, name: &str) -> EvalResult<MathOp> {
        self.math
            .get(name)
            .copied()
            .ok_or_else(|| EvalError::UnknownOperation(name.to_string()))
    }

    /// Logical catalog in declaration order
    pub fn logic_catalog(&self) -> Vec<OperatorInfo> {
        LogicOp::all()
            .iter()
            .map(|op| OperatorInfo {
                name: op.name(),
                arity: op.arity(),
            })
            .collect()
    }

    /// Arithmetic catalog in declaration order
    pub fn math_catalog(&self) -> Vec<OperatorInfo> {
        MathOp::all()
            .iter()
            .map(|op| OperatorInfo {
                name: op.name(),
                arity: op.arity(),
            })
            .collect()
    }
}
