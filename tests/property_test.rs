use cgpa_features::grading::{
    aggregate, get_framework, FrameworkId, GradeEntry, InputRangeError, Level,
};
use cgpa_features::sync::{diff, FeatureSnapshot};
use proptest::prelude::*;
use serde_json::Value;
use std::collections::BTreeMap;

const LETTERS: [&str; 7] = ["A", "B", "C", "D", "E", "O", "F"];

fn olevel_grades() -> impl Strategy<Value = Vec<u32>> {
    prop::collection::vec(1u32..=9, 6..=10)
}

const LETTER_FRAMEWORKS: [FrameworkId; 3] = [
    FrameworkId::ALevelLegacy25,
    FrameworkId::ALevelClassic18,
    FrameworkId::ALevelCompetency60,
];

const ALL_FRAMEWORKS: [FrameworkId; 4] = [
    FrameworkId::OLevelNumeric,
    FrameworkId::ALevelLegacy25,
    FrameworkId::ALevelClassic18,
    FrameworkId::ALevelCompetency60,
];

/// A letter framework with a legal grade list for it, plus a shuffle of that list.
fn letter_case() -> impl Strategy<Value = (FrameworkId, Vec<&'static str>, Vec<&'static str>)> {
    prop::sample::select(LETTER_FRAMEWORKS.to_vec())
        .prop_flat_map(|id| {
            let bounds = get_framework(id).subject_bounds;
            let grades =
                prop::collection::vec(prop::sample::select(LETTERS.to_vec()), bounds.min..=bounds.max);
            (Just(id), grades)
        })
        .prop_flat_map(|(id, grades)| (Just(id), Just(grades.clone()), Just(grades).prop_shuffle()))
}

fn to_histogram<T: Ord + Clone>(tokens: &[T]) -> BTreeMap<T, u32> {
    let mut map = BTreeMap::new();
    for t in tokens {
        *map.entry(t.clone()).or_insert(0) += 1;
    }
    map
}

proptest! {
    #[test]
    fn order_does_not_matter(
        (grades, shuffled) in olevel_grades().prop_flat_map(|v| (Just(v.clone()), Just(v).prop_shuffle()))
    ) {
        let fw = get_framework(FrameworkId::OLevelNumeric);
        let a = aggregate(&GradeEntry::sequence(grades), fw).unwrap();
        let b = aggregate(&GradeEntry::sequence(shuffled), fw).unwrap();
        prop_assert_eq!(a, b);
    }

    #[test]
    fn sequence_and_histogram_agree_olevel(grades in olevel_grades()) {
        let fw = get_framework(FrameworkId::OLevelNumeric);
        let seq = aggregate(&GradeEntry::sequence(grades.clone()), fw).unwrap();
        let hist = aggregate(&GradeEntry::histogram(to_histogram(&grades)), fw).unwrap();
        prop_assert_eq!(seq, hist);
    }

    #[test]
    fn letter_frameworks_ignore_order((id, grades, shuffled) in letter_case()) {
        let fw = get_framework(id);
        let a = aggregate(&GradeEntry::sequence(grades), fw).unwrap();
        let b = aggregate(&GradeEntry::sequence(shuffled), fw).unwrap();
        prop_assert_eq!(a, b);
    }

    #[test]
    fn letter_frameworks_sequence_and_histogram_agree((id, grades, _) in letter_case()) {
        let fw = get_framework(id);
        let seq = aggregate(&GradeEntry::sequence(grades.clone()), fw).unwrap();
        let hist = aggregate(&GradeEntry::histogram(to_histogram(&grades)), fw).unwrap();
        prop_assert_eq!(seq, hist);
    }

    #[test]
    fn oversized_histogram_is_rejected(
        id in prop::sample::select(ALL_FRAMEWORKS.to_vec()),
        extra in 1u32..=u32::MAX,
        split in any::<bool>(),
    ) {
        let fw = get_framework(id);
        let token = match fw.level {
            Level::OLevel => "1",
            Level::ALevel => "A",
        };
        let max = fw.subject_bounds.max as u32;
        let entry = if split {
            GradeEntry::histogram([(token, max), (token, extra)])
        } else {
            GradeEntry::histogram([(token, max.saturating_add(extra))])
        };
        let result = aggregate(&entry, fw);
        prop_assert!(
            matches!(result, Err(InputRangeError::SubjectCount { .. })),
            "expected SubjectCount, got {:?}",
            result
        );
    }

    #[test]
    fn average_times_count_recovers_total(grades in olevel_grades()) {
        let fw = get_framework(FrameworkId::OLevelNumeric);
        let f = aggregate(&GradeEntry::sequence(grades), fw).unwrap();
        let tolerance = 0.005 * f.count as f64 + 1e-9;
        prop_assert!((f.average * f.count as f64 - f64::from(f.total)).abs() <= tolerance);
    }

    #[test]
    fn recompute_is_bit_identical(grades in olevel_grades()) {
        let fw = get_framework(FrameworkId::OLevelNumeric);
        let entry = GradeEntry::sequence(grades);
        let a = aggregate(&entry, fw).unwrap();
        let b = aggregate(&entry, fw).unwrap();
        prop_assert_eq!(a.average.to_bits(), b.average.to_bits());
        prop_assert_eq!(a.std_dev.to_bits(), b.std_dev.to_bits());
        prop_assert_eq!(a, b);
    }

    #[test]
    fn std_dev_is_bounded_by_scale(grades in olevel_grades()) {
        let fw = get_framework(FrameworkId::OLevelNumeric);
        let f = aggregate(&GradeEntry::sequence(grades), fw).unwrap();
        // Half the 1-9 range, plus rounding.
        prop_assert!(f.std_dev >= 0.0 && f.std_dev <= 4.0005);
    }

    #[test]
    fn applying_diff_reaches_next(
        prev in prop::collection::btree_map("[a-e]", 0i64..5, 0..5),
        next in prop::collection::btree_map("[a-e]", 0i64..5, 0..5),
    ) {
        let prev: FeatureSnapshot = prev.into_iter().map(|(k, v)| (k, Value::from(v))).collect();
        let next: FeatureSnapshot = next.into_iter().map(|(k, v)| (k, Value::from(v))).collect();

        let mut merged = prev.clone();
        for (key, value) in diff(&prev, &next) {
            if value.is_null() {
                merged.remove(&key);
            } else {
                merged.insert(key, value);
            }
        }
        prop_assert_eq!(merged, next.clone());
        prop_assert!(diff(&next, &next).is_empty());
    }
}
