use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

use crate::error::{MathError, MathResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    Add,
    Subtract,
    Multiply,
    Divide,
    Linear,
    Quadratic,
    Circle,
    Rectangle,
    Triangle,
    Cube,
    Sphere,
    Statistics,
    QuizValidate,
}

impl OperationKind {
    pub const ARITHMETIC: [OperationKind; 4] =
        [Self::Add, Self::Subtract, Self::Multiply, Self::Divide];

    pub const SHAPES: [OperationKind; 5] = [
        Self::Circle,
        Self::Rectangle,
        Self::Triangle,
        Self::Cube,
        Self::Sphere,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Subtract => "subtract",
            Self::Multiply => "multiply",
            Self::Divide => "divide",
            Self::Linear => "linear",
            Self::Quadratic => "quadratic",
            Self::Circle => "circle",
            Self::Rectangle => "rectangle",
            Self::Triangle => "triangle",
            Self::Cube => "cube",
            Self::Sphere => "sphere",
            Self::Statistics => "statistics",
            Self::QuizValidate => "quiz_validate",
        }
    }

    /// HTTP path this operation is served from.
    pub fn endpoint(&self) -> &'static str {
        match self {
            Self::Add | Self::Subtract | Self::Multiply | Self::Divide => "/api/arithmetic",
            Self::Linear => "/api/algebra/linear",
            Self::Quadratic => "/api/algebra/quadratic",
            Self::Circle => "/api/geometry/circle",
            Self::Rectangle => "/api/geometry/rectangle",
            Self::Triangle => "/api/geometry/triangle",
            Self::Cube => "/api/geometry/cube",
            Self::Sphere => "/api/geometry/sphere",
            Self::Statistics => "/api/statistics",
            Self::QuizValidate => "/api/quiz/validate",
        }
    }

    pub fn is_arithmetic(&self) -> bool {
        Self::ARITHMETIC.contains(self)
    }

    pub fn is_shape(&self) -> bool {
        Self::SHAPES.contains(self)
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OperationKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "add" => Ok(Self::Add),
            "subtract" => Ok(Self::Subtract),
            "multiply" => Ok(Self::Multiply),
            "divide" => Ok(Self::Divide),
            "linear" => Ok(Self::Linear),
            "quadratic" => Ok(Self::Quadratic),
            "circle" => Ok(Self::Circle),
            "rectangle" => Ok(Self::Rectangle),
            "triangle" => Ok(Self::Triangle),
            "cube" => Ok(Self::Cube),
            "sphere" => Ok(Self::Sphere),
            "statistics" => Ok(Self::Statistics),
            "quiz_validate" | "quiz-validate" => Ok(Self::QuizValidate),
            _ => Err(format!("invalid operation: {s}")),
        }
    }
}

// ---------------------------------------------------------------------------
// Request
// ---------------------------------------------------------------------------

/// An inbound computation: the operation plus the raw fields of the body.
#[derive(Debug, Clone, Serialize)]
pub struct OperationRequest {
    kind: OperationKind,
    fields: Map<String, Value>,
    steps: bool,
    exact: bool,
}

impl OperationRequest {
    /// Build a request from a JSON body. The body must be an object; the
    /// `steps` and `exact` (alias `fractions`) flags must be booleans when set.
    pub fn from_json(kind: OperationKind, body: Value) -> MathResult<Self> {
        let fields = match body {
            Value::Object(map) => map,
            Value::Null => Map::new(),
            _ => return Err(MathError::wrong_type("body", "a JSON object")),
        };
        let steps = flag(&fields, "steps")?;
        let exact = flag(&fields, "exact")? || flag(&fields, "fractions")?;
        Ok(Self {
            kind,
            fields,
            steps,
            exact,
        })
    }

    pub fn kind(&self) -> OperationKind {
        self.kind
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn wants_steps(&self) -> bool {
        self.steps
    }

    pub fn wants_exact(&self) -> bool {
        self.exact
    }
}

fn flag(fields: &Map<String, Value>, name: &str) -> MathResult<bool> {
    match fields.get(name) {
        None | Some(Value::Null) => Ok(false),
        Some(Value::Bool(b)) => Ok(*b),
        Some(_) => Err(MathError::wrong_type(name, "a boolean")),
    }
}

// ---------------------------------------------------------------------------
// Result
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationResult {
    pub operation: OperationKind,
    pub operands: Map<String, Value>,
    pub result: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub steps: Option<Vec<String>>,
    pub timestamp: DateTime<Utc>,
}

impl OperationResult {
    pub fn new(
        operation: OperationKind,
        operands: Map<String, Value>,
        result: Value,
        steps: Option<Vec<String>>,
    ) -> Self {
        Self {
            operation,
            operands,
            result,
            steps,
            timestamp: Utc::now(),
        }
    }
}
