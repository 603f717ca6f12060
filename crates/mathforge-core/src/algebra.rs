//! Linear and quadratic equation solvers.

use serde::Serialize;

use crate::error::MathResult;
use crate::number::{ensure_finite, format_coefficient, format_real, serialize_round6};

#[derive(Debug, Clone, Serialize)]
pub struct LinearSolution {
    pub equation: String,
    #[serde(serialize_with = "serialize_round6")]
    pub x: f64,
}

pub fn solve_linear(a: f64, b: f64) -> MathResult<LinearSolution> {
    let x = -b / a;
    ensure_finite(&[x])?;
    Ok(LinearSolution {
        equation: linear_equation(a, b),
        x,
    })
}

pub fn linear_steps(a: f64, b: f64, solution: &LinearSolution) -> Vec<String> {
    let (a, minus_b) = (format_coefficient(a), format_coefficient(-b));
    vec![
        format!("Given: {}", solution.equation),
        format!("Isolate the x term: {a}x = {minus_b}"),
        format!("Divide both sides by {a}: x = {minus_b} / {a}"),
        format!("Simplify: x = {}", format_real(solution.x)),
    ]
}

// ---------------------------------------------------------------------------
// Quadratic
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Regime {
    TwoReal,
    OneReal,
    Complex,
}

impl Regime {
    pub fn classify(discriminant: f64) -> Self {
        if discriminant > 0.0 {
            Self::TwoReal
        } else if discriminant == 0.0 {
            Self::OneReal
        } else {
            Self::Complex
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::TwoReal => "two real roots",
            Self::OneReal => "one repeated real root",
            Self::Complex => "complex conjugate roots",
        }
    }
}

/// A root `re + im·i`. Real roots have `im == 0`. Both parts serialize
/// rounded to 6 decimals.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Root {
    #[serde(serialize_with = "serialize_round6")]
    pub re: f64,
    #[serde(serialize_with = "serialize_round6")]
    pub im: f64,
}

impl Root {
    pub fn real(re: f64) -> Self {
        Self { re, im: 0.0 }
    }

    pub fn display(&self) -> String {
        if self.im == 0.0 {
            format_real(self.re)
        } else if self.im > 0.0 {
            format!("{} + {}i", format_real(self.re), format_real(self.im))
        } else {
            format!("{} - {}i", format_real(self.re), format_real(-self.im))
        }
    }
}

/// `discriminant` is reported unrounded so that its sign always agrees with
/// `regime`.
#[derive(Debug, Clone, Serialize)]
pub struct QuadraticSolution {
    pub equation: String,
    pub discriminant: f64,
    pub regime: Regime,
    pub regime_label: &'static str,
    pub roots: Vec<Root>,
    pub display: Vec<String>,
}

pub fn solve_quadratic(a: f64, b: f64, c: f64) -> MathResult<QuadraticSolution> {
    let discriminant = b * b - 4.0 * a * c;
    ensure_finite(&[discriminant])?;
    let regime = Regime::classify(discriminant);

    let roots = match regime {
        Regime::TwoReal => {
            // q = -(b + sign(b)·√D)/2 avoids subtracting nearly equal values;
            // the roots are q/a and c/q.
            let q = -0.5 * (b + b.signum() * discriminant.sqrt());
            let (near, far) = (Root::real(c / q), Root::real(q / a));
            // keep the (-b + √D)/2a root first
            if b < 0.0 {
                vec![far, near]
            } else {
                vec![near, far]
            }
        }
        Regime::OneReal => vec![Root::real(-b / (2.0 * a))],
        Regime::Complex => {
            let re = -b / (2.0 * a);
            let im = ((-discriminant).sqrt() / (2.0 * a)).abs();
            vec![Root { re, im }, Root { re, im: -im }]
        }
    };
    let parts: Vec<f64> = roots.iter().flat_map(|r| [r.re, r.im]).collect();
    ensure_finite(&parts)?;

    Ok(QuadraticSolution {
        equation: quadratic_equation(a, b, c),
        discriminant,
        regime,
        regime_label: regime.label(),
        display: roots.iter().map(Root::display).collect(),
        roots,
    })
}

pub fn quadratic_steps(a: f64, b: f64, c: f64, solution: &QuadraticSolution) -> Vec<String> {
    let d = format_coefficient(solution.discriminant);
    let formula = match solution.regime {
        Regime::TwoReal => "x = (-b ± √Δ) / 2a",
        Regime::OneReal => "x = -b / 2a",
        Regime::Complex => "x = (-b ± i√|Δ|) / 2a",
    };
    let roots = match solution.display.as_slice() {
        [only] => format!("x = {only}"),
        [x1, x2] => format!("x₁ = {x1}, x₂ = {x2}"),
        _ => String::new(),
    };
    vec![
        format!("Given: {}", solution.equation),
        format!(
            "Compute the discriminant: Δ = b² - 4ac = ({})² - 4({})({}) = {d}",
            format_coefficient(b),
            format_coefficient(a),
            format_coefficient(c)
        ),
        format!("Classify: Δ = {d}, so there are {}", solution.regime.label()),
        format!("Apply the formula: {formula}"),
        format!("Simplify: {roots}"),
    ]
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

fn linear_equation(a: f64, b: f64) -> String {
    format!("{}{} = 0", term(a, "x", true), constant(b))
}

fn quadratic_equation(a: f64, b: f64, c: f64) -> String {
    let mut out = term(a, "x²", true);
    if b != 0.0 {
        out.push_str(&term(b, "x", false));
    }
    out.push_str(&constant(c));
    format!("{out} = 0")
}

// `1x` renders as `x`, `-1x` as `-x`; non-leading terms carry ` + ` / ` - `.
fn term(coef: f64, var: &str, leading: bool) -> String {
    let magnitude = coef.abs();
    let body = if magnitude == 1.0 {
        var.to_string()
    } else {
        format!("{}{var}", format_coefficient(magnitude))
    };
    match (leading, coef < 0.0) {
        (true, true) => format!("-{body}"),
        (true, false) => body,
        (false, true) => format!(" - {body}"),
        (false, false) => format!(" + {body}"),
    }
}

fn constant(c: f64) -> String {
    if c == 0.0 {
        String::new()
    } else if c < 0.0 {
        format!(" - {}", format_coefficient(-c))
    } else {
        format!(" + {}", format_coefficient(c))
    }
}
