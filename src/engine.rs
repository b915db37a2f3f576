use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::Config;
use crate::grading::{
    self, get_framework, DerivedFeatures, EngineError, FrameworkId, GradeEntry, GradingFramework,
    Level, SubjectBounds,
};
use crate::payload::AcademicFeatures;
use crate::validation::{
    self, Field, HighSchoolInputs, TemporalContext, ValidationIssue, YearWindow,
};

/// What a framework picker needs to render one option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameworkDescriptor {
    pub id: FrameworkId,
    pub label: &'static str,
    pub subject_bounds: SubjectBounds,
}

impl From<&GradingFramework> for FrameworkDescriptor {
    fn from(fw: &GradingFramework) -> Self {
        Self {
            id: fw.id,
            label: fw.label,
            subject_bounds: fw.subject_bounds,
        }
    }
}

pub fn list_frameworks(level: Level) -> Vec<FrameworkDescriptor> {
    grading::list_frameworks(level)
        .into_iter()
        .map(FrameworkDescriptor::from)
        .collect()
}

/// Resolve a framework id string.
pub fn resolve_framework(framework_id: &str) -> Result<&'static GradingFramework, EngineError> {
    Ok(get_framework(FrameworkId::parse(framework_id)?))
}

pub fn aggregate(entries: &GradeEntry, framework_id: &str) -> Result<DerivedFeatures, EngineError> {
    let framework = resolve_framework(framework_id)?;
    Ok(grading::aggregate(entries, framework)?)
}

pub fn validate_temporal(ctx: &TemporalContext) -> Vec<ValidationIssue> {
    validation::validate(ctx)
}

/// One level's raw selections as the form holds them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawLevel {
    /// Falls back to the engine's default for the level when unset.
    #[serde(default)]
    pub framework: Option<String>,
    pub grades: GradeEntry,
}

/// Everything the academic steps of the form have collected so far.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawForm {
    #[serde(default)]
    pub olevel: Option<RawLevel>,
    #[serde(default)]
    pub alevel: Option<RawLevel>,
    #[serde(default)]
    pub years: TemporalContext,
    #[serde(default)]
    pub high_school: HighSchoolInputs,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EngineOutput {
    pub features: AcademicFeatures,
    pub olevel: Option<DerivedFeatures>,
    pub alevel: Option<DerivedFeatures>,
    pub errors: Vec<ValidationIssue>,
}

impl EngineOutput {
    /// True when some grades could not be turned into features.
    pub fn has_blocking_errors(&self) -> bool {
        self.errors.iter().any(ValidationIssue::is_blocking)
    }
}

/// Stateless between calls; holds only per-level defaults and the year window.
#[derive(Debug, Clone, PartialEq)]
pub struct Engine {
    olevel_default: FrameworkId,
    alevel_default: FrameworkId,
    window: Option<YearWindow>,
}

impl Default for Engine {
    fn default() -> Self {
        Self {
            olevel_default: FrameworkId::OLevelNumeric,
            alevel_default: FrameworkId::ALevelCompetency60,
            window: None,
        }
    }
}

impl Engine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a validated config.
    pub fn from_config(config: &Config) -> Result<Self, EngineError> {
        let mut engine = Self::default();
        if let Some(ref id) = config.olevel_framework {
            engine.olevel_default = expect_level(FrameworkId::parse(id)?, Level::OLevel)?;
        }
        if let Some(ref id) = config.alevel_framework {
            engine.alevel_default = expect_level(FrameworkId::parse(id)?, Level::ALevel)?;
        }
        engine.window = config.years;
        Ok(engine)
    }

    pub fn with_window(mut self, window: YearWindow) -> Self {
        self.window = Some(window);
        self
    }

    pub fn default_framework(&self, level: Level) -> FrameworkId {
        match level {
            Level::OLevel => self.olevel_default,
            Level::ALevel => self.alevel_default,
        }
    }

    /// Re-derive everything from the raw form.
    ///
    /// Grade problems come back in `errors` next to the temporal issues. Only
    /// an unknown or wrong-level framework id is an `Err`.
    pub fn recompute(&self, raw: &RawForm) -> Result<EngineOutput, EngineError> {
        let mut errors = Vec::new();

        let olevel = self.derive_level(raw.olevel.as_ref(), Level::OLevel, &mut errors)?;
        let alevel = self.derive_level(raw.alevel.as_ref(), Level::ALevel, &mut errors)?;

        errors.extend(validation::validate_inputs(&raw.high_school));
        errors.extend(validation::validate(&raw.years));
        if let Some(ref window) = self.window {
            errors.extend(validation::validate_window(&raw.years, window));
        }

        let features = AcademicFeatures::new(
            olevel.as_ref(),
            alevel.as_ref(),
            &raw.years,
            &raw.high_school,
        );
        debug!(
            olevel = olevel.is_some(),
            alevel = alevel.is_some(),
            issues = errors.len(),
            "recomputed features"
        );

        Ok(EngineOutput {
            features,
            olevel,
            alevel,
            errors,
        })
    }

    fn derive_level(
        &self,
        raw: Option<&RawLevel>,
        level: Level,
        errors: &mut Vec<ValidationIssue>,
    ) -> Result<Option<DerivedFeatures>, EngineError> {
        let Some(raw) = raw else {
            return Ok(None);
        };

        let id = match raw.framework {
            Some(ref id) => FrameworkId::parse(id)?,
            None => self.default_framework(level),
        };
        let framework = get_framework(expect_level(id, level)?);

        match grading::aggregate(&raw.grades, framework) {
            Ok(features) => Ok(Some(features)),
            Err(e) => {
                let field = match level {
                    Level::OLevel => Field::OLevelGrades,
                    Level::ALevel => Field::ALevelGrades,
                };
                errors.push(ValidationIssue::input_range(field, e.to_string()));
                Ok(None)
            }
        }
    }
}

fn expect_level(id: FrameworkId, expected: Level) -> Result<FrameworkId, EngineError> {
    let actual = get_framework(id).level;
    if actual == expected {
        Ok(id)
    } else {
        Err(EngineError::LevelMismatch {
            framework: id,
            expected,
            actual,
        })
    }
}

/// `Engine::default().recompute(raw)`.
pub fn recompute(raw: &RawForm) -> Result<EngineOutput, EngineError> {
    Engine::default().recompute(raw)
}
