pub mod formatter;

pub use formatter::{
    format_features, format_frameworks, format_issues, format_tsv, should_use_colors,
};
