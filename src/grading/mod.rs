pub mod aggregate;
pub mod entry;
pub mod error;
pub mod framework;

pub use aggregate::{aggregate, DerivedFeatures, OLevelExtremes};
pub use entry::{Grade, GradeEntry, GradeToken, RawGrade};
pub use error::{EngineError, InputRangeError};
pub use framework::{
    get_framework, list_frameworks, FrameworkId, GradingFramework, Letter, Level, PointTable,
    SubjectBounds, Thresholds,
};
