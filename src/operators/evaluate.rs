//! Request validation and evaluation.
//!
//! Both entry points check, in order: operator name, input count against the
//! operator's [`Arity`](super::Arity), operand types, then apply the rule.
//! An unknown name is a validation error on both paths.

use serde::{Serialize, Serializer};

use super::error::{EvalError, EvalResult};
use super::value::{Number, Operand};
use super::{Arity, OperatorRegistry};

/// Result of an arithmetic evaluation
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MathOutcome {
    Value(Number),
    /// A defined "no result" (division by zero); not an error
    Absent,
}

impl MathOutcome {
    pub fn value(self) -> Option<Number> {
        match self {
            MathOutcome::Value(n) => Some(n),
            MathOutcome::Absent => None,
        }
    }
}

impl Serialize for MathOutcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            MathOutcome::Value(n) => n.serialize(serializer),
            MathOutcome::Absent => serializer.serialize_none(),
        }
    }
}

fn check_arity(operation: &'static str, arity: Arity, actual: usize) -> EvalResult<()> {
    if arity.accepts(actual) {
        Ok(())
    } else {
        Err(EvalError::Arity {
            operation,
            expected: arity,
            actual,
        })
    }
}

/// Evaluate a logical operation
pub fn evaluate_logic(operation: &str, inputs: &[serde_json::Value]) -> EvalResult<bool> {
    let op = OperatorRegistry::global().logic(operation)?;
    check_arity(op.name(), op.arity(), inputs.len())?;
    let operands = Operand::parse_all(inputs)?;
    Ok(op.apply(&operands))
}

/// Evaluate an arithmetic operation
pub fn evaluate_math(operation: &str, inputs: &[serde_json::Value]) -> EvalResult<MathOutcome> {
    let op = OperatorRegistry::global().math(operation)?;
    check_arity(op.name(), op.arity(), inputs.len())?;
    let numbers = Operand::parse_all(inputs)?
        .into_iter()
        .enumerate()
        .map(|(i, operand)| operand.number(i))
        .collect::<EvalResult<Vec<_>>>()?;

    let outcome = op.apply(&numbers);
    if let MathOutcome::Value(n) = outcome {
        if !n.is_finite() {
            return Err(EvalError::NonFinite {
                operation: op.name(),
            });
        }
    }
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operators::EvalErrorKind;
    use serde_json::{json, Value};

    fn inputs(values: Value) -> Vec<Value> {
        match values {
            Value::Array(v) => v,
            _ => panic!("inputs must be an array"),
        }
    }

    fn math(op: &str, values: Value) -> EvalResult<MathOutcome> {
        evaluate_math(op, &inputs(values))
    }

    fn logic(op: &str, values: Value) -> EvalResult<bool> {
        evaluate_logic(op, &inputs(values))
    }

    #[test]
    fn test_not() {
        assert!(!logic("NOT", json!([true])).unwrap());
        let err = logic("NOT", json!([true, false])).unwrap_err();
        assert_eq!(err.kind(), EvalErrorKind::Validation);
        assert_eq!(err.to_string(), "NOT requires 1 input");
    }

    #[test]
    fn test_binary_logic() {
        assert!(!logic("AND", json!([true, false])).unwrap());
        assert!(logic("OR", json!([true, false])).unwrap());
        assert!(logic("GreaterThan", json!([3, 2])).unwrap());
        assert!(!logic("LessThan", json!([3, 2])).unwrap());
        assert!(logic("EqualTo", json!([2, 2.0])).unwrap());

        let err = logic("AND", json!([true])).unwrap_err();
        assert_eq!(err.to_string(), "AND requires 2 inputs.");
    }

    #[test]
    fn test_logic_coerces_numbers() {
        assert!(logic("AND", json!([1, 5])).unwrap());
        assert!(!logic("AND", json!([1, 0])).unwrap());
        assert!(logic("GreaterThan", json!([true, false])).unwrap());
    }

    #[test]
    fn test_unknown_operation_both_paths() {
        let err = logic("IMPLIES", json!([true, false])).unwrap_err();
        assert_eq!(err, EvalError::UnknownOperation("IMPLIES".into()));
        assert_eq!(err.kind(), EvalErrorKind::Validation);

        let err = math("MODULO", json!([5, 2])).unwrap_err();
        assert_eq!(err, EvalError::UnknownOperation("MODULO".into()));
    }

    #[test]
    fn test_arithmetic() {
        assert_eq!(
            math("ADD", json!([1, 2, 3])).unwrap(),
            MathOutcome::Value(Number::Int(6))
        );
        assert_eq!(
            math("SUBTRACT", json!([10, 1, 2])).unwrap(),
            MathOutcome::Value(Number::Int(7))
        );
        assert_eq!(
            math("MULTIPLY", json!([2, 3, 4])).unwrap(),
            MathOutcome::Value(Number::Int(24))
        );
        assert_eq!(
            math("DIVIDE", json!([10, 2])).unwrap(),
            MathOutcome::Value(Number::Float(5.0))
        );
        assert_eq!(
            math("ADD", json!([1.5, 2])).unwrap(),
            MathOutcome::Value(Number::Float(3.5))
        );
    }

    #[test]
    fn test_divide_by_zero_is_absent() {
        assert_eq!(math("DIVIDE", json!([10, 0])).unwrap(), MathOutcome::Absent);
        assert_eq!(math("DIVIDE", json!([10, 0.0])).unwrap(), MathOutcome::Absent);
        assert_eq!(
            serde_json::to_value(MathOutcome::Absent).unwrap(),
            Value::Null
        );
    }

    #[test]
    fn test_math_arity() {
        let err = math("SUBTRACT", json!([1])).unwrap_err();
        assert_eq!(err.to_string(), "SUBTRACT requires at least 2 inputs.");
        assert_eq!(err.kind(), EvalErrorKind::Validation);

        assert!(math("ADD", json!([])).is_err());
        assert!(math("MULTIPLY", json!([])).is_err());
        assert!(math("DIVIDE", json!([1, 2, 3])).is_err());
        assert_eq!(
            math("ADD", json!([4])).unwrap(),
            MathOutcome::Value(Number::Int(4))
        );
    }

    #[test]
    fn test_non_numeric_input_is_a_fault() {
        let err = math("ADD", json!([1, "2"])).unwrap_err();
        assert_eq!(err.kind(), EvalErrorKind::Fault);
        assert!(err.to_string().contains("Invalid input 1"));

        let err = math("ADD", json!([true, 2])).unwrap_err();
        assert_eq!(err.kind(), EvalErrorKind::Fault);

        let err = logic("AND", json!([null, true])).unwrap_err();
        assert_eq!(err.kind(), EvalErrorKind::Fault);
    }

    #[test]
    fn test_float_overflow_is_a_fault() {
        let err = math("MULTIPLY", json!([1e308, 10])).unwrap_err();
        assert_eq!(err, EvalError::NonFinite { operation: "MULTIPLY" });
    }

    // Property-based tests using proptest
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn test_integer_add_is_exact(values in prop::collection::vec(-1_000_000i64..1_000_000, 1..20)) {
            let json: Vec<Value> = values.iter().map(|v| json!(v)).collect();
            let expected: i64 = values.iter().sum();
            prop_assert_eq!(
                evaluate_math("ADD", &json).unwrap(),
                MathOutcome::Value(Number::Int(expected))
            );
        }

        #[test]
        fn test_subtract_is_first_minus_rest(values in prop::collection::vec(-1000i64..1000, 2..20)) {
            let json: Vec<Value> = values.iter().map(|v| json!(v)).collect();
            let expected = values[0] - values[1..].iter().sum::<i64>();
            prop_assert_eq!(
                evaluate_math("SUBTRACT", &json).unwrap(),
                MathOutcome::Value(Number::Int(expected))
            );
        }

        #[test]
        fn test_arity_violations_never_evaluate(count in 0usize..6, op in prop::sample::select(vec!["NOT", "AND", "XOR", "LessThan"])) {
            let json: Vec<Value> = (0..count).map(|_| json!(true)).collect();
            let expected = if op == "NOT" { 1 } else { 2 };
            let result = evaluate_logic(op, &json);
            if count == expected {
                prop_assert!(result.is_ok());
            } else {
                prop_assert_eq!(result.unwrap_err().kind(), EvalErrorKind::Validation);
            }
        }

        #[test]
        fn test_divide_never_errors_on_zero(a in -1e6f64..1e6) {
            prop_assert_eq!(
                evaluate_math("DIVIDE", &[json!(a), json!(0)]).unwrap(),
                MathOutcome::Absent
            );
        }
    }
}
