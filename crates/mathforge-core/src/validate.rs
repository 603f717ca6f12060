//! Input validation.
//!
//! Every operation goes through [`validate`] before a calculator runs. The
//! output is a typed [`Operands`] value; any failure names the offending field.

use serde_json::{Map, Value};

use crate::error::{MathError, MathResult};
use crate::number::Number;
use crate::operation::{OperationKind, OperationRequest};

/// Normalized operands for one operation.
#[derive(Debug, Clone, PartialEq)]
pub enum Operands {
    /// In exact mode both operands are already `Number::Fraction`.
    Arithmetic { a: Number, b: Number },
    Linear { a: f64, b: f64 },
    Quadratic { a: f64, b: f64, c: f64 },
    Circle { radius: f64 },
    Rectangle { length: f64, width: f64 },
    Triangle { a: f64, b: f64, c: f64 },
    Cube { side: f64 },
    Sphere { radius: f64 },
    Statistics { data: Vec<f64> },
    QuizAnswer { answer_id: String, answer: f64 },
}

impl Operands {
    fn field_names(&self) -> &'static [&'static str] {
        match self {
            Self::Arithmetic { .. } | Self::Linear { .. } => &["a", "b"],
            Self::Quadratic { .. } => &["a", "b", "c"],
            Self::Circle { .. } | Self::Sphere { .. } => &["radius"],
            Self::Rectangle { .. } => &["length", "width"],
            Self::Triangle { .. } => &["side_a", "side_b", "side_c"],
            Self::Cube { .. } => &["side"],
            Self::Statistics { .. } => &["data"],
            Self::QuizAnswer { .. } => &["answer_id", "answer"],
        }
    }

    /// The validated fields exactly as the caller sent them, so `"3/4"`
    /// stays a string and `2` stays an integer.
    pub fn echo(&self, request: &OperationRequest) -> Map<String, Value> {
        self.field_names()
            .iter()
            .map(|&name| {
                let value = match self {
                    // the id may have arrived under its `id` alias
                    Self::QuizAnswer { answer_id, .. } if name == "answer_id" => {
                        Value::String(answer_id.clone())
                    }
                    _ => request.field(name).cloned().unwrap_or(Value::Null),
                };
                (name.to_string(), value)
            })
            .collect()
    }
}

/// Resolve the arithmetic operation named by the `operation` field.
pub fn arithmetic_kind(body: &Value) -> MathResult<OperationKind> {
    let name = match body.get("operation") {
        None | Some(Value::Null) => return Err(MathError::missing("operation")),
        Some(Value::String(s)) => s,
        Some(_) => return Err(MathError::wrong_type("operation", "a string")),
    };
    name.parse::<OperationKind>()
        .ok()
        .filter(OperationKind::is_arithmetic)
        .ok_or_else(|| {
            let choices: Vec<&str> = OperationKind::ARITHMETIC.iter().map(|k| k.as_str()).collect();
            MathError::out_of_domain(
                "operation",
                format!("'{name}' is not supported, choose from: {}", choices.join(", ")),
            )
        })
}

pub fn validate(request: &OperationRequest) -> MathResult<Operands> {
    use OperationKind::*;

    match request.kind() {
        Add | Subtract | Multiply => {
            let (a, b) = arithmetic_operands(request)?;
            Ok(Operands::Arithmetic { a, b })
        }
        Divide => {
            let (a, b) = arithmetic_operands(request)?;
            if b.is_zero() {
                return Err(MathError::out_of_domain("b", "division by zero"));
            }
            Ok(Operands::Arithmetic { a, b })
        }
        Linear => Ok(Operands::Linear {
            a: non_zero(request, "a")?,
            b: real(request, "b")?,
        }),
        Quadratic => Ok(Operands::Quadratic {
            a: non_zero(request, "a")?,
            b: real(request, "b")?,
            c: real(request, "c")?,
        }),
        Circle => Ok(Operands::Circle {
            radius: positive(request, "radius")?,
        }),
        Rectangle => Ok(Operands::Rectangle {
            length: positive(request, "length")?,
            width: positive(request, "width")?,
        }),
        Triangle => triangle(request),
        Cube => Ok(Operands::Cube {
            side: positive(request, "side")?,
        }),
        Sphere => Ok(Operands::Sphere {
            radius: positive(request, "radius")?,
        }),
        Statistics => dataset(request),
        QuizValidate => quiz_answer(request),
    }
}

// ---------------------------------------------------------------------------
// Field helpers
// ---------------------------------------------------------------------------

fn number(request: &OperationRequest, name: &str) -> MathResult<Number> {
    match request.field(name) {
        None | Some(Value::Null) => Err(MathError::missing(name)),
        Some(v) => Number::parse(name, v),
    }
}

fn finite(name: &str, n: &Number) -> MathResult<f64> {
    let x = n.to_f64();
    if x.is_finite() {
        Ok(x)
    } else {
        Err(MathError::out_of_domain(name, "must be a finite number"))
    }
}

fn real(request: &OperationRequest, name: &str) -> MathResult<f64> {
    finite(name, &number(request, name)?)
}

fn non_zero(request: &OperationRequest, name: &str) -> MathResult<f64> {
    let x = real(request, name)?;
    if x == 0.0 {
        return Err(MathError::out_of_domain(
            name,
            format!("coefficient '{name}' cannot be zero"),
        ));
    }
    Ok(x)
}

fn positive(request: &OperationRequest, name: &str) -> MathResult<f64> {
    let x = real(request, name)?;
    if x <= 0.0 {
        return Err(MathError::out_of_domain(name, format!("{name} must be positive")));
    }
    Ok(x)
}

fn arithmetic_operands(request: &OperationRequest) -> MathResult<(Number, Number)> {
    let a = number(request, "a")?;
    let b = number(request, "b")?;
    if request.wants_exact() {
        return Ok((
            Number::Fraction(a.to_rational()),
            Number::Fraction(b.to_rational()),
        ));
    }
    finite("a", &a)?;
    finite("b", &b)?;
    Ok((a, b))
}

fn triangle(request: &OperationRequest) -> MathResult<Operands> {
    let a = positive(request, "side_a")?;
    let b = positive(request, "side_b")?;
    let c = positive(request, "side_c")?;

    let (longest, name) = [(a, "side_a"), (b, "side_b"), (c, "side_c")]
        .into_iter()
        .fold((0.0, "side_a"), |acc, s| if s.0 > acc.0 { s } else { acc });
    let others = a + b + c - longest;
    if longest >= others {
        return Err(MathError::out_of_domain(
            name,
            format!("sides {a}, {b} and {c} cannot form a triangle"),
        ));
    }
    Ok(Operands::Triangle { a, b, c })
}

fn dataset(request: &OperationRequest) -> MathResult<Operands> {
    let items = match request.field("data") {
        None | Some(Value::Null) => return Err(MathError::missing("data")),
        Some(Value::Array(items)) => items,
        Some(_) => return Err(MathError::wrong_type("data", "an array of numbers")),
    };
    if items.is_empty() {
        return Err(MathError::out_of_domain("data", "dataset must not be empty"));
    }
    let data = items
        .iter()
        .enumerate()
        .map(|(i, v)| {
            let field = format!("data[{i}]");
            finite(&field, &Number::parse(&field, v)?)
        })
        .collect::<MathResult<Vec<f64>>>()?;
    Ok(Operands::Statistics { data })
}

fn quiz_answer(request: &OperationRequest) -> MathResult<Operands> {
    let answer_id = match request.field("answer_id").or_else(|| request.field("id")) {
        None | Some(Value::Null) => return Err(MathError::missing("answer_id")),
        Some(Value::String(s)) if !s.trim().is_empty() => s.trim().to_string(),
        Some(_) => return Err(MathError::wrong_type("answer_id", "a non-empty string")),
    };
    Ok(Operands::QuizAnswer {
        answer_id,
        answer: real(request, "answer")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Reason;
    use serde_json::json;

    fn check(kind: OperationKind, body: Value) -> MathResult<Operands> {
        validate(&OperationRequest::from_json(kind, body)?)
    }

    fn field_of(err: MathError) -> (String, Reason) {
        match err {
            MathError::Validation { field, reason } => (field, reason),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_arithmetic_kind() {
        assert_eq!(
            arithmetic_kind(&json!({"operation": "divide"})).unwrap(),
            OperationKind::Divide
        );
        let (field, reason) = field_of(arithmetic_kind(&json!({"operation": "linear"})).unwrap_err());
        assert_eq!(field, "operation");
        assert!(reason.to_string().contains("add, subtract, multiply, divide"));
        let (field, reason) = field_of(arithmetic_kind(&json!({})).unwrap_err());
        assert_eq!((field.as_str(), reason), ("operation", Reason::Missing));
    }

    #[test]
    fn test_divide_by_zero_rejected() {
        let (field, _) = field_of(check(OperationKind::Divide, json!({"a": 1, "b": 0})).unwrap_err());
        assert_eq!(field, "b");
        let err = check(OperationKind::Divide, json!({"a": "1/2", "b": "0/3", "exact": true}))
            .unwrap_err();
        assert_eq!(field_of(err).0, "b");
        let err = check(OperationKind::Divide, json!({"a": 1, "b": 0.0})).unwrap_err();
        assert_eq!(field_of(err).0, "b");
    }

    #[test]
    fn test_exact_mode_normalizes_to_fractions() {
        let ops = check(OperationKind::Add, json!({"a": 0.5, "b": "1/3", "exact": true})).unwrap();
        match ops {
            Operands::Arithmetic { a, b } => {
                assert_eq!(a.to_string(), "1/2");
                assert_eq!(b.to_string(), "1/3");
            }
            other => panic!("unexpected operands {other:?}"),
        }
    }

    #[test]
    fn test_missing_and_wrong_type() {
        let (field, reason) = field_of(check(OperationKind::Add, json!({"a": 1})).unwrap_err());
        assert_eq!((field.as_str(), reason), ("b", Reason::Missing));

        let (field, reason) =
            field_of(check(OperationKind::Quadratic, json!({"a": 1, "b": "x", "c": 1})).unwrap_err());
        assert_eq!(field, "b");
        assert!(matches!(reason, Reason::WrongType { .. }));
    }

    #[test]
    fn test_zero_leading_coefficient() {
        let err = check(OperationKind::Linear, json!({"a": 0, "b": 3})).unwrap_err();
        assert_eq!(field_of(err).0, "a");
        let err = check(OperationKind::Quadratic, json!({"a": 0, "b": 1, "c": 1})).unwrap_err();
        assert_eq!(field_of(err).0, "a");
    }

    #[test]
    fn test_geometry_dimensions_must_be_positive() {
        assert!(check(OperationKind::Circle, json!({"radius": 2})).is_ok());
        let err = check(OperationKind::Circle, json!({"radius": 0})).unwrap_err();
        assert_eq!(field_of(err).0, "radius");
        let err = check(OperationKind::Rectangle, json!({"length": 3, "width": -1})).unwrap_err();
        assert_eq!(field_of(err).0, "width");
        let err = check(OperationKind::Cube, json!({})).unwrap_err();
        assert_eq!(field_of(err).0, "side");
    }

    #[test]
    fn test_triangle_inequality() {
        assert!(check(OperationKind::Triangle, json!({"side_a": 3, "side_b": 4, "side_c": 5})).is_ok());
        let err = check(OperationKind::Triangle, json!({"side_a": 1, "side_b": 2, "side_c": 3}))
            .unwrap_err();
        let (field, reason) = field_of(err);
        assert_eq!(field, "side_c");
        assert!(reason.to_string().contains("cannot form a triangle"));
    }

    #[test]
    fn test_statistics_dataset() {
        let ops = check(OperationKind::Statistics, json!({"data": [1, "2.5", 3]})).unwrap();
        assert_eq!(ops, Operands::Statistics { data: vec![1.0, 2.5, 3.0] });

        let err = check(OperationKind::Statistics, json!({"data": []})).unwrap_err();
        assert_eq!(field_of(err).0, "data");
        let err = check(OperationKind::Statistics, json!({"data": [1, "two", 3]})).unwrap_err();
        assert_eq!(field_of(err).0, "data[1]");
        let err = check(OperationKind::Statistics, json!({"data": "1,2,3"})).unwrap_err();
        assert_eq!(field_of(err).0, "data");
    }

    #[test]
    fn test_quiz_answer_accepts_id_alias() {
        let ops = check(OperationKind::QuizValidate, json!({"id": "abc.def", "answer": "12"})).unwrap();
        assert_eq!(
            ops,
            Operands::QuizAnswer {
                answer_id: "abc.def".into(),
                answer: 12.0
            }
        );
        let err = check(OperationKind::QuizValidate, json!({"answer": 1})).unwrap_err();
        assert_eq!(field_of(err).0, "answer_id");
    }

    #[test]
    fn test_echo_uses_field_names() {
        let body = json!({"side_a": 3, "side_b": "4", "side_c": 5.5, "note": "ignored"});
        let request = OperationRequest::from_json(OperationKind::Triangle, body).unwrap();
        let echo = validate(&request).unwrap().echo(&request);
        assert_eq!(echo["side_a"], json!(3));
        assert_eq!(echo["side_b"], json!("4"));
        assert_eq!(echo["side_c"], json!(5.5));
        assert_eq!(echo.len(), 3);
    }

    #[test]
    fn test_echo_keeps_original_form() {
        let body = json!({"a": "3/4", "b": u64::MAX, "exact": true});
        let request = OperationRequest::from_json(OperationKind::Add, body).unwrap();
        let echo = validate(&request).unwrap().echo(&request);
        assert_eq!(echo["a"], json!("3/4"));
        assert_eq!(echo["b"], json!(u64::MAX));
        assert!(echo["b"].is_u64());

        let body = json!({"id": " abc.def ", "answer": "12"});
        let request = OperationRequest::from_json(OperationKind::QuizValidate, body).unwrap();
        let echo = validate(&request).unwrap().echo(&request);
        assert_eq!(echo["answer_id"], json!("abc.def"));
        assert_eq!(echo["answer"], json!("12"));
    }
}
