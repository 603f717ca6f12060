//! Quiz questions with self-verifying answer ids.
//!
//! The correct answer travels inside the `answer_id` as
//! `base64url(payload).base64url(hmac)`, so validating an answer needs only
//! the signing key, not a table of pending questions. The payload is readable
//! by anyone holding the id; the tag only makes it tamper-evident.

use std::fmt;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use tracing::debug;

use crate::algebra::{solve_linear, solve_quadratic};
use crate::arithmetic::{apply, symbol};
use crate::error::{MathError, MathResult};
use crate::geometry;
use crate::number::{format_real, round_to};
use crate::operation::OperationKind;

type HmacSha256 = Hmac<Sha256>;

pub const DEFAULT_TOLERANCE: f64 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Arithmetic,
    Algebra,
    Geometry,
}

impl Category {
    pub const ALL: [Category; 3] = [Self::Arithmetic, Self::Algebra, Self::Geometry];
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Arithmetic => write!(f, "arithmetic"),
            Self::Algebra => write!(f, "algebra"),
            Self::Geometry => write!(f, "geometry"),
        }
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "arithmetic" => Ok(Self::Arithmetic),
            "algebra" => Ok(Self::Algebra),
            "geometry" => Ok(Self::Geometry),
            _ => Err(format!("invalid quiz type: {s}")),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    /// Upper bound for arithmetic operands.
    fn span(&self) -> i64 {
        match self {
            Self::Easy => 10,
            Self::Medium => 100,
            Self::Hard => 1000,
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Easy => write!(f, "easy"),
            Self::Medium => write!(f, "medium"),
            Self::Hard => write!(f, "hard"),
        }
    }
}

impl std::str::FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "easy" => Ok(Self::Easy),
            "medium" => Ok(Self::Medium),
            "hard" => Ok(Self::Hard),
            _ => Err(format!("invalid difficulty: {s}")),
        }
    }
}

/// A correct answer. Integers must match exactly, reals within tolerance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Answer {
    Integer(i64),
    Real(f64),
}

impl Answer {
    /// Whole results become `Integer`, anything else is rounded to 2 decimals.
    fn from_real(x: f64) -> Self {
        let r = round_to(x, 2);
        if r.fract() == 0.0 && r.abs() < 1e15 {
            Self::Integer(r as i64)
        } else {
            Self::Real(r)
        }
    }

    pub fn value(&self) -> f64 {
        match self {
            Self::Integer(i) => *i as f64,
            Self::Real(x) => *x,
        }
    }

    pub fn matches(&self, submitted: f64, tolerance: f64) -> bool {
        match self {
            Self::Integer(i) => submitted == *i as f64,
            Self::Real(x) => (submitted - x).abs() <= tolerance * x.abs().max(1.0),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct QuizQuestion {
    pub category: Category,
    pub difficulty: Difficulty,
    pub question: String,
    pub answer_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<&'static str>,
    #[serde(skip_serializing)]
    pub answer: Answer,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct QuizVerdict {
    pub correct: bool,
    pub category: Category,
    pub difficulty: Difficulty,
    pub user_answer: f64,
    pub correct_answer: Answer,
    pub message: &'static str,
}

// What gets sealed into an answer id.
#[derive(Debug, Serialize, Deserialize)]
struct Ticket {
    category: Category,
    difficulty: Difficulty,
    answer: Answer,
    nonce: String,
    issued_at: i64,
}

struct Draft {
    question: String,
    answer: Answer,
    unit: Option<&'static str>,
}

// ---------------------------------------------------------------------------
// QuizBook
// ---------------------------------------------------------------------------

/// Generates questions and checks answers against sealed answer ids.
pub struct QuizBook {
    key: Vec<u8>,
    tolerance: f64,
    default_difficulty: Difficulty,
}

impl fmt::Debug for QuizBook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuizBook")
            .field("tolerance", &self.tolerance)
            .field("default_difficulty", &self.default_difficulty)
            .finish_non_exhaustive()
    }
}

impl QuizBook {
    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        Self {
            key: secret.into(),
            tolerance: DEFAULT_TOLERANCE,
            default_difficulty: Difficulty::default(),
        }
    }

    /// Key drawn from the OS RNG. Ids stop validating after a restart.
    pub fn with_random_secret() -> Self {
        let mut key = vec![0u8; 32];
        rand::thread_rng().fill_bytes(&mut key);
        Self::new(key)
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_default_difficulty(mut self, difficulty: Difficulty) -> Self {
        self.default_difficulty = difficulty;
        self
    }

    pub fn generate(
        &self,
        category: Option<Category>,
        difficulty: Option<Difficulty>,
    ) -> MathResult<QuizQuestion> {
        self.generate_with(&mut rand::thread_rng(), category, difficulty)
    }

    pub fn generate_with<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        category: Option<Category>,
        difficulty: Option<Difficulty>,
    ) -> MathResult<QuizQuestion> {
        let category =
            category.unwrap_or_else(|| Category::ALL[rng.gen_range(0..Category::ALL.len())]);
        let difficulty = difficulty.unwrap_or(self.default_difficulty);

        let draft = match category {
            Category::Arithmetic => arithmetic_question(rng, difficulty)?,
            Category::Algebra => algebra_question(rng, difficulty)?,
            Category::Geometry => geometry_question(rng, difficulty)?,
        };

        let now = Utc::now();
        let ticket = Ticket {
            category,
            difficulty,
            answer: draft.answer,
            nonce: ulid::Ulid::new().to_string(),
            issued_at: now.timestamp(),
        };
        debug!(%category, %difficulty, "generated quiz question");

        Ok(QuizQuestion {
            category,
            difficulty,
            question: draft.question,
            answer_id: self.seal(&ticket)?,
            unit: draft.unit,
            answer: draft.answer,
            timestamp: now,
        })
    }

    /// Check a submitted answer. A malformed or tampered id is `NotFound`.
    pub fn check(&self, answer_id: &str, submitted: f64) -> MathResult<QuizVerdict> {
        let ticket = self.open(answer_id)?;
        let correct = ticket.answer.matches(submitted, self.tolerance);
        Ok(QuizVerdict {
            correct,
            category: ticket.category,
            difficulty: ticket.difficulty,
            user_answer: submitted,
            correct_answer: ticket.answer,
            message: if correct {
                "Correct! Well done!"
            } else {
                "Incorrect. Try again!"
            },
        })
    }

    fn mac(&self) -> MathResult<HmacSha256> {
        HmacSha256::new_from_slice(&self.key).map_err(|e| MathError::Internal(e.to_string()))
    }

    fn seal(&self, ticket: &Ticket) -> MathResult<String> {
        let payload = serde_json::to_vec(ticket)?;
        let mut mac = self.mac()?;
        mac.update(&payload);
        let tag = mac.finalize().into_bytes();
        Ok(format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(&payload),
            URL_SAFE_NO_PAD.encode(tag)
        ))
    }

    fn open(&self, answer_id: &str) -> MathResult<Ticket> {
        let unknown = || MathError::NotFound(answer_id.to_string());

        let (payload, tag) = answer_id.split_once('.').ok_or_else(unknown)?;
        let payload = URL_SAFE_NO_PAD.decode(payload).map_err(|_| unknown())?;
        let tag = URL_SAFE_NO_PAD.decode(tag).map_err(|_| unknown())?;

        let mut mac = self.mac()?;
        mac.update(&payload);
        if mac.verify_slice(&tag).is_err() {
            debug!("answer id signature mismatch");
            return Err(unknown());
        }
        serde_json::from_slice(&payload).map_err(|_| unknown())
    }
}

// ---------------------------------------------------------------------------
// Question drafts
// ---------------------------------------------------------------------------

fn arithmetic_question<R: Rng + ?Sized>(rng: &mut R, difficulty: Difficulty) -> MathResult<Draft> {
    const OPS: [OperationKind; 3] = [
        OperationKind::Add,
        OperationKind::Subtract,
        OperationKind::Multiply,
    ];
    let span = difficulty.span();
    let pick = |rng: &mut R| OPS[rng.gen_range(0..OPS.len())];

    let a = rng.gen_range(1..=span);
    let b = rng.gen_range(1..=span);
    let op = pick(rng);
    let first = apply(op, a as f64, b as f64)?;

    let (question, value) = if difficulty == Difficulty::Hard {
        let c = rng.gen_range(1..=span / 10);
        let op2 = pick(rng);
        (
            format!("What is ({a} {} {b}) {} {c}?", symbol(op), symbol(op2)),
            apply(op2, first, c as f64)?,
        )
    } else {
        (format!("What is {a} {} {b}?", symbol(op)), first)
    };

    Ok(Draft {
        question,
        answer: Answer::Integer(value as i64),
        unit: None,
    })
}

fn algebra_question<R: Rng + ?Sized>(rng: &mut R, difficulty: Difficulty) -> MathResult<Draft> {
    match difficulty {
        Difficulty::Easy => {
            let a = rng.gen_range(1..=5) as f64;
            let root = rng.gen_range(-10..=10) as f64;
            let b = -a * root;
            linear_draft(a, b)
        }
        Difficulty::Medium => {
            let a = rng.gen_range(1..=10) as f64;
            let b = rng.gen_range(-20..=20) as f64;
            linear_draft(a, b)
        }
        Difficulty::Hard => {
            let r1 = rng.gen_range(-12..=12);
            let mut r2 = rng.gen_range(-12..=12);
            if r2 == r1 {
                r2 += 1;
            }
            let (b, c) = (-(r1 + r2) as f64, (r1 * r2) as f64);
            let solution = solve_quadratic(1.0, b, c)?;
            let larger = solution
                .roots
                .iter()
                .map(|r| r.re)
                .fold(f64::NEG_INFINITY, f64::max);
            Ok(Draft {
                question: format!("Find the larger root of {}", solution.equation),
                answer: Answer::from_real(larger),
                unit: None,
            })
        }
    }
}

fn linear_draft(a: f64, b: f64) -> MathResult<Draft> {
    let solution = solve_linear(a, b)?;
    let answer = Answer::from_real(solution.x);
    let hint = match answer {
        Answer::Integer(_) => "",
        Answer::Real(_) => " (round to 2 decimal places)",
    };
    Ok(Draft {
        question: format!("Solve for x: {}{hint}", solution.equation),
        answer,
        unit: None,
    })
}

fn geometry_question<R: Rng + ?Sized>(rng: &mut R, difficulty: Difficulty) -> MathResult<Draft> {
    let draft = match difficulty {
        Difficulty::Easy => {
            if rng.gen_bool(0.5) {
                let (l, w) = (rng.gen_range(1..=12), rng.gen_range(1..=12));
                let area = geometry::rectangle(l as f64, w as f64)?.area;
                Draft {
                    question: format!("What is the area of a rectangle {l} long and {w} wide?"),
                    answer: Answer::from_real(area),
                    unit: Some("square units"),
                }
            } else {
                let side = rng.gen_range(1..=10);
                let volume = geometry::cube(side as f64)?.volume;
                Draft {
                    question: format!("What is the volume of a cube with side {side}?"),
                    answer: Answer::from_real(volume),
                    unit: Some("cubic units"),
                }
            }
        }
        Difficulty::Medium => {
            let radius = rng.gen_range(1..=20);
            let area = geometry::circle(radius as f64)?.area;
            Draft {
                question: format!(
                    "What is the area of a circle with radius {radius}? (round to 2 decimal places)"
                ),
                answer: Answer::from_real(area),
                unit: Some("square units"),
            }
        }
        Difficulty::Hard => {
            let radius = rng.gen_range(1..=15);
            let volume = geometry::sphere(radius as f64)?.volume;
            Draft {
                question: format!(
                    "What is the volume of a sphere with radius {}? (round to 2 decimal places)",
                    format_real(radius as f64)
                ),
                answer: Answer::from_real(volume),
                unit: Some("cubic units"),
            }
        }
    };
    Ok(draft)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use serde_json::Value;

    fn book() -> QuizBook {
        QuizBook::new(b"test-secret".to_vec())
    }

    #[test]
    fn test_correct_answer_validates() {
        let book = book();
        let mut rng = StdRng::seed_from_u64(7);
        for category in Category::ALL {
            for difficulty in [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard] {
                let q = book
                    .generate_with(&mut rng, Some(category), Some(difficulty))
                    .unwrap();
                assert_eq!(q.category, category);
                assert_eq!(q.difficulty, difficulty);
                let verdict = book.check(&q.answer_id, q.answer.value()).unwrap();
                assert!(verdict.correct, "{}: {:?}", q.question, q.answer);
                assert_eq!(verdict.message, "Correct! Well done!");
            }
        }
    }

    #[test]
    fn test_wrong_answer_discloses_correct_value() {
        let book = book();
        let mut rng = StdRng::seed_from_u64(11);
        let q = book
            .generate_with(&mut rng, Some(Category::Arithmetic), Some(Difficulty::Easy))
            .unwrap();
        let verdict = book.check(&q.answer_id, q.answer.value() + 1.0).unwrap();
        assert!(!verdict.correct);
        assert_eq!(verdict.correct_answer, q.answer);
        assert_eq!(verdict.user_answer, q.answer.value() + 1.0);
    }

    #[test]
    fn test_tampered_or_foreign_ids_are_rejected() {
        let book = book();
        let q = book.generate(Some(Category::Geometry), None).unwrap();

        let (payload, tag) = q.answer_id.split_once('.').unwrap();
        let forged = format!("{payload}x.{tag}");
        assert!(matches!(book.check(&forged, 0.0), Err(MathError::NotFound(_))));
        assert!(matches!(book.check("arithmetic_1_2_add", 3.0), Err(MathError::NotFound(_))));

        let other = QuizBook::new(b"another-secret".to_vec());
        assert!(matches!(other.check(&q.answer_id, 0.0), Err(MathError::NotFound(_))));
    }

    #[test]
    fn test_payload_is_readable_but_edits_break_the_tag() {
        let book = book();
        let q = book.generate(Some(Category::Arithmetic), None).unwrap();

        let (payload, tag) = q.answer_id.split_once('.').unwrap();
        let bytes = URL_SAFE_NO_PAD.decode(payload).unwrap();
        let mut ticket: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(ticket["answer"].as_f64(), Some(q.answer.value()));

        ticket["answer"] = Value::from(q.answer.value() + 1.0);
        let edited = URL_SAFE_NO_PAD.encode(ticket.to_string());
        let forged = format!("{edited}.{tag}");
        let err = book.check(&forged, q.answer.value() + 1.0).unwrap_err();
        assert!(matches!(err, MathError::NotFound(_)));
    }

    #[test]
    fn test_answer_ids_are_unique() {
        let book = book();
        let a = book.generate(Some(Category::Arithmetic), None).unwrap();
        let b = book.generate(Some(Category::Arithmetic), None).unwrap();
        assert_ne!(a.answer_id, b.answer_id);
    }

    #[test]
    fn test_default_difficulty_applies() {
        let book = book().with_default_difficulty(Difficulty::Hard);
        let q = book.generate(Some(Category::Algebra), None).unwrap();
        assert_eq!(q.difficulty, Difficulty::Hard);
        assert!(q.question.starts_with("Find the larger root"));
    }

    #[test]
    fn test_answer_matching() {
        assert!(Answer::Integer(42).matches(42.0, DEFAULT_TOLERANCE));
        assert!(!Answer::Integer(42).matches(42.0000001, DEFAULT_TOLERANCE));
        assert!(Answer::Real(314.16).matches(314.16, DEFAULT_TOLERANCE));
        assert!(!Answer::Real(314.16).matches(314.15, DEFAULT_TOLERANCE));
        assert!(Answer::Real(314.16).matches(314.15, 0.01));
    }

    #[test]
    fn test_answer_serializes_as_plain_number() {
        assert_eq!(serde_json::to_string(&Answer::Integer(5)).unwrap(), "5");
        assert_eq!(serde_json::to_string(&Answer::Real(2.5)).unwrap(), "2.5");
        let back: Answer = serde_json::from_str("2.5").unwrap();
        assert_eq!(back, Answer::Real(2.5));
    }

    #[test]
    fn test_parse_category_and_difficulty() {
        assert_eq!("Geometry".parse::<Category>().unwrap(), Category::Geometry);
        assert!("calculus".parse::<Category>().is_err());
        assert_eq!("hard".parse::<Difficulty>().unwrap(), Difficulty::Hard);
        assert_eq!(Difficulty::default(), Difficulty::Medium);
    }

    #[test]
    fn test_question_never_exposes_answer() {
        let q = book().generate(None, None).unwrap();
        let value = serde_json::to_value(&q).unwrap();
        assert!(value.get("answer").is_none());
        assert!(value["answer_id"].is_string());
    }
}
