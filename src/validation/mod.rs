pub mod inputs;
pub mod issue;
pub mod temporal;

pub use inputs::{validate_inputs, HighSchoolInputs};
pub use issue::{Field, IssueKind, ValidationIssue};
pub use temporal::{validate, validate_window, TemporalContext, YearWindow};
