use chrono::{Datelike, Utc};
use serde::{Deserialize, Serialize};

use super::issue::{Field, ValidationIssue};

/// Minimum gap between sitting O-Level and A-Level.
pub const OLEVEL_TO_ALEVEL_YEARS: i32 = 2;
/// Minimum gap between sitting A-Level and institutional entry.
pub const ALEVEL_TO_ENTRY_YEARS: i32 = 1;

/// Exam and entry years. Unset years are not validated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TemporalContext {
    #[serde(default)]
    pub entry_year: Option<i32>,
    #[serde(default)]
    pub olevel_year: Option<i32>,
    #[serde(default)]
    pub alevel_year: Option<i32>,
}

/// Check year ordering. Each rule is evaluated independently.
pub fn validate(ctx: &TemporalContext) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    if let (Some(alevel), Some(entry)) = (ctx.alevel_year, ctx.entry_year) {
        if alevel > entry - ALEVEL_TO_ENTRY_YEARS {
            issues.push(ValidationIssue::advisory(
                Field::ALevelYear,
                "A-Level year must precede entry by at least one year.",
            ));
        }
    }

    if let (Some(olevel), Some(alevel)) = (ctx.olevel_year, ctx.alevel_year) {
        if olevel > alevel - OLEVEL_TO_ALEVEL_YEARS {
            issues.push(ValidationIssue::advisory(
                Field::OLevelYear,
                "O-Level year must precede A-Level by at least two years.",
            ));
        }
    }

    issues
}

/// Years a year picker offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct YearWindow {
    pub first: i32,
    pub last: i32,
}

impl YearWindow {
    pub const DEFAULT_FIRST: i32 = 2005;

    pub fn contains(&self, year: i32) -> bool {
        year >= self.first && year <= self.last
    }

    pub fn years(&self) -> impl Iterator<Item = i32> {
        self.first..=self.last
    }
}

impl Default for YearWindow {
    /// 2005 through four years from now.
    fn default() -> Self {
        Self {
            first: Self::DEFAULT_FIRST,
            last: Utc::now().year() + 4,
        }
    }
}

/// Flag set years the picker could not have produced.
pub fn validate_window(ctx: &TemporalContext, window: &YearWindow) -> Vec<ValidationIssue> {
    [
        (Field::OLevelYear, ctx.olevel_year),
        (Field::ALevelYear, ctx.alevel_year),
        (Field::EntryYear, ctx.entry_year),
    ]
    .into_iter()
    .filter_map(|(field, year)| {
        let year = year?;
        (!window.contains(year)).then(|| {
            ValidationIssue::advisory(
                field,
                format!(
                    "{} is outside the supported years {}-{}.",
                    year, window.first, window.last
                ),
            )
        })
    })
    .collect()
}
