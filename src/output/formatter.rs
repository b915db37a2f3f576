use owo_colors::OwoColorize;
use std::io::IsTerminal;

use crate::engine::FrameworkDescriptor;
use crate::grading::{DerivedFeatures, Level};
use crate::payload::AcademicFeatures;
use crate::validation::ValidationIssue;

/// Check if stdout is a TTY (for auto-detecting color support)
pub fn should_use_colors() -> bool {
    std::io::stdout().is_terminal()
}

/// Format frameworks one per line: "{id}  {label}  ({bounds} subjects)"
pub fn format_frameworks(frameworks: &[FrameworkDescriptor], use_colors: bool) -> String {
    if frameworks.is_empty() {
        return "No grading frameworks.".to_string();
    }

    let id_width = frameworks
        .iter()
        .map(|f| f.id.as_str().len())
        .max()
        .unwrap_or(0);

    frameworks
        .iter()
        .map(|f| {
            let id = format!("{:<width$}", f.id.as_str(), width = id_width);
            let bounds = format!("({} subjects)", f.subject_bounds);
            if use_colors {
                format!("{}  {}  {}", id.bold(), f.label, bounds.dimmed())
            } else {
                format!("{}  {}  {}", id, f.label, bounds)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Format derived features as an indented block headed by level and framework
pub fn format_features(level: Level, features: &DerivedFeatures, use_colors: bool) -> String {
    let heading = format!("{} ({})", level, features.framework);
    let mut lines = vec![if use_colors {
        heading.bold().to_string()
    } else {
        heading
    }];

    lines.push(format!("  Subjects: {}", features.count));
    lines.push(format!("  Total: {}", features.total));
    lines.push(format!("  Average: {:.2}", features.average));
    lines.push(format!("  Std dev: {:.3}", features.std_dev));
    lines.push(format!("  Dominant: {}", features.dominant));
    lines.push(format!("  Distinctions: {}", features.distinction_count));
    if let Some(credits) = features.credit_count {
        lines.push(format!("  Credits: {}", credits));
    }
    lines.push(format!("  Weak: {}", features.weak_count));

    if let Some(ref x) = features.extremes {
        lines.push(format!("  Best/worst grade: {}/{}", x.highest, x.lowest));
        let sums: Vec<String> = [
            (6, x.best_sum_of_six),
            (8, x.best_sum_of_eight),
            (10, x.best_sum_of_ten),
        ]
        .iter()
        .filter_map(|(n, sum)| sum.map(|s| format!("{} of {}", s, n)))
        .collect();
        if !sums.is_empty() {
            lines.push(format!("  Best sums: {}", sums.join(", ")));
        }
    }

    lines.join("\n")
}

/// Format validation issues, one per line, prefixed by severity
pub fn format_issues(issues: &[ValidationIssue], use_colors: bool) -> String {
    issues
        .iter()
        .map(|issue| {
            let tag = if issue.is_blocking() { "error" } else { "warning" };
            if !use_colors {
                format!("{}: {}", tag, issue)
            } else if issue.is_blocking() {
                format!("{}: {}", tag.red().bold(), issue)
            } else {
                format!("{}: {}", tag.yellow(), issue)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Format payload fields as tab-separated key/value pairs (no colors)
pub fn format_tsv(features: &AcademicFeatures) -> String {
    features
        .entries()
        .into_iter()
        .filter_map(|(key, value)| value.map(|v| format!("{}\t{}", key, v)))
        .collect::<Vec<_>>()
        .join("\n")
}
