//! Error types for the version guard.

use crate::types::Component;

/// Broad class of a guard failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The requirement itself is unusable (absent, empty, bad syntax).
    Type,
    /// The requirement is well formed but the running version violates it.
    Range,
}

/// Guard errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GuardError {
    /// Requirement is absent, has no recognized component, or does not parse.
    #[error("malformed version requirement: {message}")]
    MalformedRequirement { message: String },

    /// Running version does not satisfy the required range.
    #[error(
        "{component} {running} does not satisfy required range \"{required}\"{}",
        caller_suffix(.caller)
    )]
    VersionMismatch {
        component: Component,
        running: String,
        required: String,
        caller: Option<String>,
    },
}

fn caller_suffix(caller: &Option<String>) -> String {
    match caller {
        Some(caller) => format!(" (required by {})", caller),
        None => String::new(),
    }
}

impl GuardError {
    pub(crate) fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedRequirement {
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MalformedRequirement { .. } => ErrorKind::Type,
            Self::VersionMismatch { .. } => ErrorKind::Range,
        }
    }

    /// Process exit status for this error class: 1 malformed, 2 mismatch.
    pub fn exit_code(&self) -> i32 {
        match self.kind() {
            ErrorKind::Type => 1,
            ErrorKind::Range => 2,
        }
    }
}

/// Result type for guard operations.
pub type GuardResult<T> = Result<T, GuardError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mismatch_message_with_caller() {
        let err = GuardError::VersionMismatch {
            component: Component::Runtime,
            running: "1.9.4".to_string(),
            required: "1.9.3".to_string(),
            caller: Some("file:///app/mod.rs".to_string()),
        };
        assert_eq!(
            err.to_string(),
            "runtime 1.9.4 does not satisfy required range \"1.9.3\" (required by file:///app/mod.rs)"
        );
        assert_eq!(err.kind(), ErrorKind::Range);
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_mismatch_message_without_caller() {
        let err = GuardError::VersionMismatch {
            component: Component::Engine,
            running: "9.1.269".to_string(),
            required: ">=10".to_string(),
            caller: None,
        };
        assert_eq!(
            err.to_string(),
            "engine 9.1.269 does not satisfy required range \">=10\""
        );
    }

    #[test]
    fn test_malformed_kind() {
        let err = GuardError::malformed("requirement is missing");
        assert_eq!(err.kind(), ErrorKind::Type);
        assert_eq!(err.exit_code(), 1);
        assert_eq!(
            err.to_string(),
            "malformed version requirement: requirement is missing"
        );
    }
}
