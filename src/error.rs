// File: ./src/error.rs
// Error taxonomy for the reminder boundary
use thiserror::Error;

/// Tagged failure returned by the validator and the inference service.
///
/// Nothing in this crate retries on any of these; the caller decides what the
/// user sees.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReminderError {
    /// Input failed schema constraints. Never reaches the model.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Endpoint unreachable, timed out or answered with a non-2xx status.
    #[error("Inference unavailable: {0}")]
    InferenceUnavailable(String),

    /// The model answered, but not with the declared output schema.
    #[error("Inference output error: {0}")]
    InferenceOutput(String),
}

impl ReminderError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::InferenceUnavailable(msg.into())
    }

    pub fn output(msg: impl Into<String>) -> Self {
        Self::InferenceOutput(msg.into())
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Unavailable and malformed-output failures are handled the same way by callers.
    pub fn is_inference(&self) -> bool {
        matches!(self, Self::InferenceUnavailable(_) | Self::InferenceOutput(_))
    }

    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Validation(_) => "Invalid input provided.",
            Self::InferenceUnavailable(_) | Self::InferenceOutput(_) => {
                "The AI service may be unavailable."
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inference_errors_share_a_user_message() {
        let a = ReminderError::unavailable("timeout");
        let b = ReminderError::output("missing reasoning");
        assert!(a.is_inference() && b.is_inference());
        assert_eq!(a.user_message(), b.user_message());
        assert!(!ReminderError::validation("x").is_inference());
    }
}
