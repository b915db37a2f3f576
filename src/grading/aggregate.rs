use serde::Serialize;
use std::collections::BTreeMap;

use super::entry::{Grade, GradeEntry, GradeToken};
use super::error::InputRangeError;
use super::framework::{FrameworkId, GradingFramework, Thresholds};

/// Summary statistics for one level's grades.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DerivedFeatures {
    pub framework: FrameworkId,
    pub count: usize,
    pub total: u32,
    /// Mean points, 2 d.p.
    pub average: f64,
    /// Population standard deviation, 3 d.p.
    pub std_dev: f64,
    /// Most frequent point value; ties go to the higher value.
    pub dominant: u32,
    pub distinction_count: usize,
    /// O-Level only.
    pub credit_count: Option<usize>,
    pub weak_count: usize,
    /// O-Level only.
    pub extremes: Option<OLevelExtremes>,
}

/// Best/worst grades and best-N sums over the 1-9 scale, where lower is better.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OLevelExtremes {
    pub highest: u32,
    pub lowest: u32,
    pub best_sum_of_six: Option<u32>,
    pub best_sum_of_eight: Option<u32>,
    pub best_sum_of_ten: Option<u32>,
}

pub fn aggregate(
    entries: &GradeEntry,
    framework: &GradingFramework,
) -> Result<DerivedFeatures, InputRangeError> {
    let buckets = entries.resolve(framework)?;
    let count = usize::try_from(entries.count()).unwrap_or(usize::MAX);

    if count == 0 {
        return Err(InputRangeError::Empty);
    }
    if !framework.subject_bounds.contains(count) {
        return Err(InputRangeError::SubjectCount {
            framework: framework.id,
            count,
            bounds: framework.subject_bounds,
        });
    }

    // Bounded by subject_bounds.max from here on.
    let grades: Vec<Grade> = buckets
        .into_iter()
        .flat_map(|(grade, n)| std::iter::repeat(grade).take(n as usize))
        .collect();

    let total: u32 = grades.iter().map(|g| g.points).sum();
    let mean = f64::from(total) / count as f64;
    let variance = grades
        .iter()
        .map(|g| {
            let d = f64::from(g.points) - mean;
            d * d
        })
        .sum::<f64>()
        / count as f64;

    let bands = classify(&grades, &framework.thresholds);

    let extremes = match framework.thresholds {
        Thresholds::Numeric { .. } => Some(olevel_extremes(&grades)),
        Thresholds::Letters { .. } => None,
    };

    Ok(DerivedFeatures {
        framework: framework.id,
        count,
        total,
        average: round_to(mean, 2),
        std_dev: round_to(variance.sqrt(), 3),
        dominant: dominant(&grades),
        distinction_count: bands.distinction,
        credit_count: bands.credit,
        weak_count: bands.weak,
        extremes,
    })
}

pub(crate) fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

fn dominant(grades: &[Grade]) -> u32 {
    let mut frequency: BTreeMap<u32, usize> = BTreeMap::new();
    for grade in grades {
        *frequency.entry(grade.points).or_insert(0) += 1;
    }
    frequency
        .into_iter()
        .max_by_key(|&(points, seen)| (seen, points))
        .map(|(points, _)| points)
        .unwrap_or_default()
}

struct BandCounts {
    distinction: usize,
    credit: Option<usize>,
    weak: usize,
}

fn classify(grades: &[Grade], thresholds: &Thresholds) -> BandCounts {
    match *thresholds {
        Thresholds::Numeric {
            distinction_max,
            credit: (credit_lo, credit_hi),
            weak_min,
        } => {
            let points = || grades.iter().map(|g| g.points);
            BandCounts {
                distinction: points().filter(|p| *p <= distinction_max).count(),
                credit: Some(
                    points()
                        .filter(|p| *p >= credit_lo && *p <= credit_hi)
                        .count(),
                ),
                weak: points().filter(|p| *p >= weak_min).count(),
            }
        }
        Thresholds::Letters { distinction, weak } => {
            let letters = || {
                grades.iter().filter_map(|g| match g.token {
                    GradeToken::Letter(l) => Some(l),
                    GradeToken::Numeric(_) => None,
                })
            };
            BandCounts {
                distinction: letters().filter(|l| distinction.contains(l)).count(),
                credit: None,
                weak: letters().filter(|l| weak.contains(l)).count(),
            }
        }
    }
}

fn olevel_extremes(grades: &[Grade]) -> OLevelExtremes {
    let mut sorted: Vec<u32> = grades.iter().map(|g| g.points).collect();
    sorted.sort_unstable();

    let best_sum = |n: usize| (sorted.len() >= n).then(|| sorted[..n].iter().sum::<u32>());

    OLevelExtremes {
        highest: sorted.first().copied().unwrap_or_default(),
        lowest: sorted.last().copied().unwrap_or_default(),
        best_sum_of_six: best_sum(6),
        best_sum_of_eight: best_sum(8),
        best_sum_of_ten: best_sum(10),
    }
}
