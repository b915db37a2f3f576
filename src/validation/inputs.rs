use serde::{Deserialize, Serialize};

use super::issue::{Field, ValidationIssue};

/// A-Level step values the student enters directly instead of having them
/// derived from grades.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HighSchoolInputs {
    /// 1 if the student sat General Paper, 0 if not.
    #[serde(default)]
    pub general_paper: Option<u8>,
    #[serde(default)]
    pub performance_variance: Option<f64>,
    #[serde(default)]
    pub performance_stability_index: Option<f64>,
}

fn general_paper_ok(v: u8) -> bool {
    v <= 1
}

fn variance_ok(v: f64) -> bool {
    v.is_finite() && v >= 0.0
}

fn index_ok(v: f64) -> bool {
    v.is_finite()
}

impl HighSchoolInputs {
    /// Only the values that pass `validate_inputs`.
    pub fn accepted(&self) -> Self {
        Self {
            general_paper: self.general_paper.filter(|v| general_paper_ok(*v)),
            performance_variance: self.performance_variance.filter(|v| variance_ok(*v)),
            performance_stability_index: self.performance_stability_index.filter(|v| index_ok(*v)),
        }
    }
}

/// Values that cannot go into the payload as entered. Unset values are fine.
pub fn validate_inputs(inputs: &HighSchoolInputs) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    if let Some(v) = inputs.general_paper {
        if !general_paper_ok(v) {
            issues.push(ValidationIssue::input_range(
                Field::GeneralPaper,
                format!("General Paper must be 0 or 1, got {}.", v),
            ));
        }
    }
    if let Some(v) = inputs.performance_variance {
        if !variance_ok(v) {
            issues.push(ValidationIssue::input_range(
                Field::HighSchoolPerformanceVariance,
                "Performance variance must be a non-negative number.",
            ));
        }
    }
    if let Some(v) = inputs.performance_stability_index {
        if !index_ok(v) {
            issues.push(ValidationIssue::input_range(
                Field::HighSchoolPerformanceStabilityIndex,
                "Stability index must be a finite number.",
            ));
        }
    }

    issues
}
