use std::sync::Arc;

use chrono::Utc;
use serde_json::{json, Value};
use tracing::debug;

use mathforge_core::algebra::{linear_steps, quadratic_steps, solve_linear, solve_quadratic};
use mathforge_core::validate::arithmetic_kind;
use mathforge_core::{
    arithmetic, geometry, statistics, validate, Category, Difficulty, HistoryEntry, HistoryStore,
    MathError, MathResult, Operands, OperationKind, OperationRequest, OperationResult, QuizBook,
    QuizQuestion,
};

/// Endpoint catalog served at `GET /`.
pub fn endpoint_catalog() -> Value {
    json!({
        "name": "MathForge API",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Arithmetic, algebra, geometry, statistics and quizzes over JSON",
        "endpoints": {
            "arithmetic": {
                "path": "/api/arithmetic",
                "method": "POST",
                "params": ["operation", "a", "b", "exact?"],
                "operations": ["add", "subtract", "multiply", "divide"]
            },
            "linear": {
                "path": "/api/algebra/linear",
                "method": "POST",
                "params": ["a", "b", "steps?"]
            },
            "quadratic": {
                "path": "/api/algebra/quadratic",
                "method": "POST",
                "params": ["a", "b", "c", "steps?"]
            },
            "geometry": {
                "path": "/api/geometry/{shape}",
                "method": "POST",
                "shapes": {
                    "circle": ["radius"],
                    "rectangle": ["length", "width"],
                    "triangle": ["side_a", "side_b", "side_c"],
                    "cube": ["side"],
                    "sphere": ["radius"]
                }
            },
            "statistics": {
                "path": "/api/statistics",
                "method": "POST",
                "params": ["data"]
            },
            "quiz": {
                "path": "/api/quiz",
                "method": "GET",
                "params": ["type?", "difficulty?"],
                "types": ["arithmetic", "algebra", "geometry"],
                "difficulties": ["easy", "medium", "hard"]
            },
            "quiz_validate": {
                "path": "/api/quiz/validate",
                "method": "POST",
                "params": ["answer_id", "answer"]
            },
            "history": {
                "path": "/api/history",
                "method": "GET",
                "params": ["limit?"]
            },
            "history_clear": {
                "path": "/api/history/clear",
                "method": "DELETE"
            }
        },
        "timestamp": Utc::now(),
    })
}

/// Routes a request through validation, the matching calculator and the
/// history log. Only successful results are recorded.
#[derive(Clone)]
pub struct Dispatcher {
    history: Arc<dyn HistoryStore>,
    quiz: Arc<QuizBook>,
}

impl Dispatcher {
    pub fn new(history: Arc<dyn HistoryStore>, quiz: Arc<QuizBook>) -> Self {
        Self { history, quiz }
    }

    pub fn history(&self) -> &dyn HistoryStore {
        self.history.as_ref()
    }

    pub fn quiz(&self) -> &QuizBook {
        &self.quiz
    }

    /// Arithmetic bodies name their operation in the `operation` field.
    pub fn arithmetic(&self, body: Value) -> MathResult<OperationResult> {
        let kind = arithmetic_kind(&body)?;
        self.run(kind, body)
    }

    pub fn run(&self, kind: OperationKind, body: Value) -> MathResult<OperationResult> {
        debug!(%kind, "dispatching operation");
        let request = OperationRequest::from_json(kind, body)?;
        let operands = validate(&request)?;
        let (result, steps) = self.compute(&request, &operands)?;

        let outcome = OperationResult::new(kind, operands.echo(&request), result, steps);
        let seq = self.history.record(&request, &outcome)?;
        debug!(%kind, seq, "operation recorded");
        Ok(outcome)
    }

    fn compute(
        &self,
        request: &OperationRequest,
        operands: &Operands,
    ) -> MathResult<(Value, Option<Vec<String>>)> {
        let steps = request.wants_steps();
        let value = match operands {
            Operands::Arithmetic { a, b } => {
                let eval = arithmetic::evaluate(request.kind(), a, b, request.wants_exact())?;
                return Ok((eval.value, steps.then(|| vec![eval.expression])));
            }
            Operands::Linear { a, b } => {
                let solution = solve_linear(*a, *b)?;
                let shown = steps.then(|| linear_steps(*a, *b, &solution));
                return Ok((serde_json::to_value(&solution)?, shown));
            }
            Operands::Quadratic { a, b, c } => {
                let solution = solve_quadratic(*a, *b, *c)?;
                let shown = steps.then(|| quadratic_steps(*a, *b, *c, &solution));
                return Ok((serde_json::to_value(&solution)?, shown));
            }
            Operands::Circle { radius } => serde_json::to_value(geometry::circle(*radius)?)?,
            Operands::Rectangle { length, width } => {
                serde_json::to_value(geometry::rectangle(*length, *width)?)?
            }
            Operands::Triangle { a, b, c } => serde_json::to_value(geometry::triangle(*a, *b, *c)?)?,
            Operands::Cube { side } => serde_json::to_value(geometry::cube(*side)?)?,
            Operands::Sphere { radius } => serde_json::to_value(geometry::sphere(*radius)?)?,
            Operands::Statistics { data } => serde_json::to_value(statistics::summarize(data)?)?,
            Operands::QuizAnswer { answer_id, answer } => {
                serde_json::to_value(self.quiz.check(answer_id, *answer)?)?
            }
        };
        Ok((value, None))
    }

    /// Parse the optional `type`/`difficulty` parameters and draw a question.
    /// Generation is not recorded in the history.
    pub fn generate_quiz(
        &self,
        category: Option<&str>,
        difficulty: Option<&str>,
    ) -> MathResult<QuizQuestion> {
        let category = category
            .map(|s| s.parse::<Category>().map_err(|e| MathError::out_of_domain("type", e)))
            .transpose()?;
        let difficulty = difficulty
            .map(|s| {
                s.parse::<Difficulty>()
                    .map_err(|e| MathError::out_of_domain("difficulty", e))
            })
            .transpose()?;
        self.quiz.generate(category, difficulty)
    }

    pub fn list_history(&self, limit: Option<usize>) -> MathResult<Vec<HistoryEntry>> {
        self.history.list(limit)
    }

    pub fn clear_history(&self) -> MathResult<usize> {
        self.history.clear()
    }
}
