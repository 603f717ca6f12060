pub mod algebra;
pub mod arithmetic;
pub mod error;
pub mod geometry;
pub mod history;
pub mod number;
pub mod operation;
pub mod quiz;
pub mod statistics;
pub mod validate;

pub use error::{MathError, MathResult, Reason};
pub use history::{HistoryEntry, HistoryStore, DEFAULT_CAPACITY};
pub use number::Number;
pub use operation::{OperationKind, OperationRequest, OperationResult};
pub use quiz::{Answer, Category, Difficulty, QuizBook, QuizQuestion, QuizVerdict};
pub use statistics::{Mode, Summary};
pub use validate::{validate, Operands};
