use std::fmt;
use std::str::FromStr;

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, ToPrimitive, Zero};
use serde::Serializer;
use serde_json::Value;

use crate::error::{MathError, MathResult};

const EXPECTED: &str = "a number, numeric string or fraction string";

/// A numeric input as the caller supplied it.
#[derive(Debug, Clone, PartialEq)]
pub enum Number {
    Integer(i64),
    Float(f64),
    Fraction(BigRational),
}

impl Number {
    /// Parse a raw JSON field. Anything that is not a number or a numeric
    /// string is rejected as the wrong type.
    pub fn parse(field: &str, value: &Value) -> MathResult<Self> {
        let parsed = match value {
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Some(Self::Integer(i))
                } else if let Some(u) = n.as_u64() {
                    Some(Self::Fraction(BigRational::from_integer(BigInt::from(u))))
                } else {
                    n.as_f64().map(Self::Float)
                }
            }
            Value::String(s) => s.parse().ok(),
            _ => None,
        };
        parsed.ok_or_else(|| MathError::wrong_type(field, EXPECTED))
    }

    pub fn to_f64(&self) -> f64 {
        match self {
            Self::Integer(i) => *i as f64,
            Self::Float(f) => *f,
            Self::Fraction(r) => r.to_f64().unwrap_or(f64::NAN),
        }
    }

    /// Exact rational value. Floats are converted through their shortest
    /// decimal representation, so `0.1` becomes `1/10`.
    pub fn to_rational(&self) -> BigRational {
        match self {
            Self::Integer(i) => BigRational::from_integer(BigInt::from(*i)),
            Self::Float(f) => decimal_to_rational(&f.to_string())
                .or_else(|| BigRational::from_float(*f))
                .unwrap_or_else(BigRational::zero),
            Self::Fraction(r) => r.clone(),
        }
    }

    pub fn is_zero(&self) -> bool {
        match self {
            Self::Integer(i) => *i == 0,
            Self::Float(f) => *f == 0.0,
            Self::Fraction(r) => r.is_zero(),
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Fraction(r) => write!(f, "{}", format_rational(r)),
        }
    }
}

impl FromStr for Number {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(i) = s.parse::<i64>() {
            return Ok(Self::Integer(i));
        }
        if let Some((num, den)) = s.split_once('/') {
            let num: BigInt = num.trim().parse().map_err(|_| format!("invalid fraction: {s}"))?;
            let den: BigInt = den.trim().parse().map_err(|_| format!("invalid fraction: {s}"))?;
            if den.is_zero() {
                return Err(format!("zero denominator: {s}"));
            }
            return Ok(Self::Fraction(BigRational::new(num, den)));
        }
        match s.parse::<f64>() {
            Ok(f) if f.is_finite() => Ok(Self::Float(f)),
            _ => Err(format!("not a number: {s}")),
        }
    }
}

/// `"n"` for whole values, `"p/q"` otherwise, always in lowest terms.
pub fn format_rational(r: &BigRational) -> String {
    if r.denom().is_one() {
        r.numer().to_string()
    } else {
        format!("{}/{}", r.numer(), r.denom())
    }
}

/// Round to `places` decimals for presentation. Negative zero is folded to 0.
pub fn round_to(x: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    let r = (x * factor).round() / factor;
    if r == 0.0 {
        0.0
    } else if r.is_finite() {
        r
    } else {
        x
    }
}

pub fn round6(x: f64) -> f64 {
    round_to(x, 6)
}

/// Compact rendering of a real for prompts and step strings: whole values
/// drop the fractional part, everything else is rounded to 6 decimals.
pub fn format_real(x: f64) -> String {
    let r = round6(x);
    if r.fract() == 0.0 && r.abs() < 1e15 {
        format!("{}", r as i64)
    } else {
        format!("{r}")
    }
}

/// Rendering for equation coefficients. Unlike [`format_real`] nothing is
/// rounded away, so `2.5e-9` stays `2.5e-9` instead of collapsing to `0`.
pub fn format_coefficient(x: f64) -> String {
    if x.fract() == 0.0 && x.abs() < 1e15 {
        format!("{}", x as i64)
    } else {
        format!("{x:?}")
    }
}

/// `serialize_with` adapter that writes a field rounded to 6 decimals while
/// the struct keeps full precision.
pub fn serialize_round6<S: Serializer>(x: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(round6(*x))
}

/// Calculator outputs must be finite; overflow is reported, never serialized
/// as `null`.
pub fn ensure_finite(values: &[f64]) -> MathResult<()> {
    if values.iter().all(|v| v.is_finite()) {
        Ok(())
    } else {
        Err(MathError::out_of_domain("result", "result is not a finite number"))
    }
}

// Only handles plain `[-]digits[.digits]`, which is what f64 Display emits.
fn decimal_to_rational(s: &str) -> Option<BigRational> {
    let (negative, digits) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s),
    };
    let (int_part, frac_part) = digits.split_once('.').unwrap_or((digits, ""));
    if int_part.is_empty() || !int_part.chars().chain(frac_part.chars()).all(|c| c.is_ascii_digit()) {
        return None;
    }
    let numer: BigInt = format!("{int_part}{frac_part}").parse().ok()?;
    let denom = num_traits::pow(BigInt::from(10u8), frac_part.len());
    let r = BigRational::new(numer, denom);
    Some(if negative { -r } else { r })
}
