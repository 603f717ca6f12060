//! Closed-form shape properties. Inputs are validated dimensions (finite,
//! strictly positive, triangle sides already checked against the triangle
//! inequality); outputs are rounded to 6 decimals. Dimensions large enough to
//! overflow a property are rejected rather than reported as infinity.

use std::f64::consts::PI;

use serde::Serialize;

use crate::error::MathResult;
use crate::number::{ensure_finite, round6};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Circle {
    pub area: f64,
    pub circumference: f64,
    pub diameter: f64,
}

pub fn circle(radius: f64) -> MathResult<Circle> {
    let area = PI * radius * radius;
    let circumference = 2.0 * PI * radius;
    let diameter = 2.0 * radius;
    ensure_finite(&[area, circumference, diameter])?;
    Ok(Circle {
        area: round6(area),
        circumference: round6(circumference),
        diameter: round6(diameter),
    })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Rectangle {
    pub area: f64,
    pub perimeter: f64,
    pub diagonal: f64,
}

pub fn rectangle(length: f64, width: f64) -> MathResult<Rectangle> {
    let area = length * width;
    let perimeter = 2.0 * (length + width);
    let diagonal = length.hypot(width);
    ensure_finite(&[area, perimeter, diagonal])?;
    Ok(Rectangle {
        area: round6(area),
        perimeter: round6(perimeter),
        diagonal: round6(diagonal),
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TriangleKind {
    Equilateral,
    Isosceles,
    Scalene,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Triangle {
    pub area: f64,
    pub perimeter: f64,
    pub semi_perimeter: f64,
    pub kind: TriangleKind,
}

/// Heron's formula over the three side lengths.
pub fn triangle(a: f64, b: f64, c: f64) -> MathResult<Triangle> {
    let perimeter = a + b + c;
    let s = perimeter / 2.0;
    let area = (s * (s - a) * (s - b) * (s - c)).max(0.0).sqrt();
    ensure_finite(&[area, perimeter, s])?;
    Ok(Triangle {
        area: round6(area),
        perimeter: round6(perimeter),
        semi_perimeter: round6(s),
        kind: classify(a, b, c),
    })
}

fn classify(a: f64, b: f64, c: f64) -> TriangleKind {
    let same = |x: f64, y: f64| (x - y).abs() <= 1e-9 * x.abs().max(y.abs());
    match (same(a, b), same(b, c), same(a, c)) {
        (true, true, _) => TriangleKind::Equilateral,
        (false, false, false) => TriangleKind::Scalene,
        _ => TriangleKind::Isosceles,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Cube {
    pub volume: f64,
    pub surface_area: f64,
    pub space_diagonal: f64,
}

pub fn cube(side: f64) -> MathResult<Cube> {
    let volume = side.powi(3);
    let surface_area = 6.0 * side * side;
    let space_diagonal = side * 3f64.sqrt();
    ensure_finite(&[volume, surface_area, space_diagonal])?;
    Ok(Cube {
        volume: round6(volume),
        surface_area: round6(surface_area),
        space_diagonal: round6(space_diagonal),
    })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sphere {
    pub volume: f64,
    pub surface_area: f64,
    pub diameter: f64,
}

pub fn sphere(radius: f64) -> MathResult<Sphere> {
    let volume = 4.0 / 3.0 * PI * radius.powi(3);
    let surface_area = 4.0 * PI * radius * radius;
    let diameter = 2.0 * radius;
    ensure_finite(&[volume, surface_area, diameter])?;
    Ok(Sphere {
        volume: round6(volume),
        surface_area: round6(surface_area),
        diameter: round6(diameter),
    })
}
