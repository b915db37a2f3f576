pub mod config;
pub mod engine;
pub mod grading;
pub mod output;
pub mod payload;
pub mod sync;
pub mod validation;

pub use engine::{
    aggregate, list_frameworks, recompute, validate_temporal, Engine, EngineOutput,
    FrameworkDescriptor, RawForm, RawLevel,
};
pub use grading::{DerivedFeatures, EngineError, FrameworkId, GradeEntry, InputRangeError, Level};
pub use payload::AcademicFeatures;
pub use sync::{diff, ApplyOutcome, FeatureSnapshot, RecordDiff, SharedRecord, Synchronizer};
pub use validation::{HighSchoolInputs, TemporalContext, ValidationIssue};
