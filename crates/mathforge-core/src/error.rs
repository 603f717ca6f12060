use std::fmt;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MathError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: Reason },

    #[error("unknown answer id: {0}")]
    NotFound(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

/// Why a field was rejected by the validator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reason {
    Missing,
    WrongType { expected: &'static str },
    OutOfDomain(String),
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing => write!(f, "missing required field"),
            Self::WrongType { expected } => write!(f, "expected {expected}"),
            Self::OutOfDomain(msg) => write!(f, "{msg}"),
        }
    }
}

impl MathError {
    pub fn missing(field: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            reason: Reason::Missing,
        }
    }

    pub fn wrong_type(field: impl Into<String>, expected: &'static str) -> Self {
        Self::Validation {
            field: field.into(),
            reason: Reason::WrongType { expected },
        }
    }

    pub fn out_of_domain(field: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            reason: Reason::OutOfDomain(msg.into()),
        }
    }

    /// True for errors caused by the caller's input.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Validation { .. } | Self::NotFound(_))
    }
}

pub type MathResult<T> = Result<T, MathError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_display_names_field() {
        let err = MathError::out_of_domain("b", "division by zero");
        assert_eq!(err.to_string(), "invalid b: division by zero");

        let err = MathError::missing("radius");
        assert_eq!(err.to_string(), "invalid radius: missing required field");

        let err = MathError::wrong_type("data", "an array of numbers");
        assert_eq!(err.to_string(), "invalid data: expected an array of numbers");
    }

    #[test]
    fn test_client_error_classification() {
        assert!(MathError::missing("a").is_client_error());
        assert!(MathError::NotFound("xyz".into()).is_client_error());
        assert!(!MathError::Internal("boom".into()).is_client_error());
    }
}
