pub mod diff;
pub mod record;

pub use diff::{diff, FeatureSnapshot};
pub use record::{ApplyOutcome, RecordDiff, SharedRecord, Synchronizer};
