use super::framework::{FrameworkId, Level, SubjectBounds};

/// Grades the student can fix by correcting their input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InputRangeError {
    #[error("no grades entered")]
    Empty,

    #[error("{framework} takes {bounds} subjects, got {count}")]
    SubjectCount {
        framework: FrameworkId,
        count: usize,
        bounds: SubjectBounds,
    },

    #[error("'{token}' is not a valid {framework} grade")]
    InvalidGrade { framework: FrameworkId, token: String },
}

/// Engine errors.
///
/// Everything other than `InputRange` is an integration bug in the caller.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    #[error("unknown grading framework '{0}'")]
    UnknownFramework(String),

    #[error("{framework} grades {actual}, not {expected}")]
    LevelMismatch {
        framework: FrameworkId,
        expected: Level,
        actual: Level,
    },

    #[error(transparent)]
    InputRange(#[from] InputRangeError),
}

impl EngineError {
    /// Whether the user can recover by editing their grades.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, EngineError::InputRange(_))
    }
}
