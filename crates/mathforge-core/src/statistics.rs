use serde::{Serialize, Serializer};

use crate::error::{MathError, MathResult};
use crate::number::{ensure_finite, round6};

pub const NO_MODE: &str = "No mode";

/// Most frequent value(s) of a dataset.
///
/// Every value tied for the highest frequency is reported, ascending. When
/// all values are distinct there is no mode.
#[derive(Debug, Clone, PartialEq)]
pub enum Mode {
    Values(Vec<f64>),
    NoMode,
}

impl Serialize for Mode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Values(values) => values.serialize(serializer),
            Self::NoMode => serializer.serialize_str(NO_MODE),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub dataset_size: usize,
    pub sum: f64,
    pub mean: f64,
    pub median: f64,
    pub mode: Mode,
    pub variance: f64,
    pub standard_deviation: f64,
    pub range: f64,
    pub min: f64,
    pub max: f64,
}

/// Aggregate statistics of a non-empty dataset. Variance is the population
/// variance. Empty datasets and aggregates that overflow are rejected.
pub fn summarize(data: &[f64]) -> MathResult<Summary> {
    if data.is_empty() {
        return Err(MathError::out_of_domain("data", "dataset must not be empty"));
    }
    let n = data.len() as f64;
    let mut sorted = data.to_vec();
    sorted.sort_by(f64::total_cmp);

    let sum: f64 = data.iter().sum();
    let mean = sum / n;
    let variance = data.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;
    let min = sorted[0];
    let max = sorted[sorted.len() - 1];
    let median = median(&sorted);
    let std = variance.sqrt();
    ensure_finite(&[sum, mean, median, variance, std, max - min])?;

    Ok(Summary {
        dataset_size: data.len(),
        sum: round6(sum),
        mean: round6(mean),
        median: round6(median).clamp(min, max),
        mode: mode(&sorted),
        variance: round6(variance),
        standard_deviation: round6(std),
        range: round6(max - min),
        min,
        max,
    })
}

fn median(sorted: &[f64]) -> f64 {
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

fn mode(sorted: &[f64]) -> Mode {
    // (value, run length) for each run of equal values
    let mut runs: Vec<(f64, usize)> = Vec::new();
    for &x in sorted {
        match runs.last_mut() {
            Some((v, count)) if *v == x => *count += 1,
            _ => runs.push((x, 1)),
        }
    }
    let best = runs.iter().map(|(_, c)| *c).max().unwrap_or(0);
    if best <= 1 {
        return Mode::NoMode;
    }
    Mode::Values(
        runs.into_iter()
            .filter(|(_, c)| *c == best)
            .map(|(v, _)| v)
            .collect(),
    )
}
