use num_rational::BigRational;
use num_traits::Zero;
use serde_json::Value;

use crate::error::{MathError, MathResult};
use crate::number::{ensure_finite, format_rational, Number};
use crate::operation::OperationKind;

pub fn symbol(kind: OperationKind) -> &'static str {
    match kind {
        OperationKind::Add => "+",
        OperationKind::Subtract => "-",
        OperationKind::Multiply => "×",
        OperationKind::Divide => "÷",
        _ => "?",
    }
}

/// Floating point evaluation. Division by zero yields an infinity; callers
/// reject a zero divisor before getting here.
pub fn apply(kind: OperationKind, a: f64, b: f64) -> MathResult<f64> {
    match kind {
        OperationKind::Add => Ok(a + b),
        OperationKind::Subtract => Ok(a - b),
        OperationKind::Multiply => Ok(a * b),
        OperationKind::Divide => Ok(a / b),
        other => Err(MathError::Internal(format!("{other} is not an arithmetic operation"))),
    }
}

pub fn apply_exact(kind: OperationKind, a: &BigRational, b: &BigRational) -> MathResult<BigRational> {
    match kind {
        OperationKind::Add => Ok(a + b),
        OperationKind::Subtract => Ok(a - b),
        OperationKind::Multiply => Ok(a * b),
        OperationKind::Divide if b.is_zero() => {
            Err(MathError::out_of_domain("b", "division by zero"))
        }
        OperationKind::Divide => Ok(a / b),
        other => Err(MathError::Internal(format!("{other} is not an arithmetic operation"))),
    }
}

/// Evaluated arithmetic: the JSON result plus a one-line rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub value: Value,
    pub expression: String,
}

/// Evaluate `a <op> b`. In exact mode the operands are rationals and the
/// result is rendered as a `"p/q"` string.
pub fn evaluate(kind: OperationKind, a: &Number, b: &Number, exact: bool) -> MathResult<Evaluation> {
    let (value, rendered) = if exact {
        let r = apply_exact(kind, &a.to_rational(), &b.to_rational())?;
        let text = format_rational(&r);
        (Value::String(text.clone()), text)
    } else {
        let r = apply(kind, a.to_f64(), b.to_f64())?;
        ensure_finite(&[r])?;
        (Value::from(r), r.to_string())
    };
    Ok(Evaluation {
        value,
        expression: format!("{a} {} {b} = {rendered}", symbol(kind)),
    })
}
