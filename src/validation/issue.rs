use serde::Serialize;
use std::fmt;

/// Form field an issue is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    EntryYear,
    OLevelYear,
    ALevelYear,
    OLevelGrades,
    ALevelGrades,
    GeneralPaper,
    HighSchoolPerformanceVariance,
    HighSchoolPerformanceStabilityIndex,
}

impl Field {
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::EntryYear => "entryYear",
            Field::OLevelYear => "oLevelYear",
            Field::ALevelYear => "aLevelYear",
            Field::OLevelGrades => "oLevelGrades",
            Field::ALevelGrades => "aLevelGrades",
            Field::GeneralPaper => "generalPaper",
            Field::HighSchoolPerformanceVariance => "highSchoolPerformanceVariance",
            Field::HighSchoolPerformanceStabilityIndex => "highSchoolPerformanceStabilityIndex",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    /// Shown to the user; the caller decides whether to block submission.
    Advisory,
    /// The grades cannot be turned into features until corrected.
    InputRange,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    pub field: Field,
    pub kind: IssueKind,
    pub message: String,
}

impl ValidationIssue {
    pub fn advisory(field: Field, message: impl Into<String>) -> Self {
        Self {
            field,
            kind: IssueKind::Advisory,
            message: message.into(),
        }
    }

    pub fn input_range(field: Field, message: impl Into<String>) -> Self {
        Self {
            field,
            kind: IssueKind::InputRange,
            message: message.into(),
        }
    }

    pub fn is_blocking(&self) -> bool {
        self.kind == IssueKind::InputRange
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}
