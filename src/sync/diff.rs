use serde_json::Value;
use std::collections::BTreeMap;

/// Flat feature record, keyed by payload field name.
pub type FeatureSnapshot = BTreeMap<String, Value>;

/// Keys whose value changed between two snapshots.
///
/// A key present in `prev` but missing from `next` maps to `Value::Null` so
/// the receiver clears it. Equal values never appear, which is what lets a
/// caller apply the result without triggering another recompute.
pub fn diff(prev: &FeatureSnapshot, next: &FeatureSnapshot) -> BTreeMap<String, Value> {
    let mut changes = BTreeMap::new();

    for (key, value) in next {
        if prev.get(key) != Some(value) {
            changes.insert(key.clone(), value.clone());
        }
    }

    for (key, value) in prev {
        if !next.contains_key(key) && !value.is_null() {
            changes.insert(key.clone(), Value::Null);
        }
    }

    changes
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn snapshot(pairs: &[(&str, Value)]) -> FeatureSnapshot {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_identical_snapshots_produce_no_changes() {
        let a = snapshot(&[("uce_credits", json!(4)), ("average_olevel_grade", json!(3.5))]);
        assert!(diff(&a, &a.clone()).is_empty());
    }

    #[test]
    fn test_only_changed_keys() {
        let prev = snapshot(&[("uce_credits", json!(4)), ("average_olevel_grade", json!(3.5))]);
        let next = snapshot(&[("uce_credits", json!(5)), ("average_olevel_grade", json!(3.5))]);
        let changes = diff(&prev, &next);
        assert_eq!(changes.len(), 1);
        assert_eq!(changes["uce_credits"], json!(5));
    }

    #[test]
    fn test_new_keys_are_included() {
        let prev = FeatureSnapshot::new();
        let next = snapshot(&[("alevel_count_weak_grades", json!(0))]);
        assert_eq!(diff(&prev, &next), next);
    }

    #[test]
    fn test_removed_keys_become_null() {
        let prev = snapshot(&[("std_dev_olevel_grade", json!(0.5)), ("uce_credits", json!(4))]);
        let next = snapshot(&[("uce_credits", json!(4))]);
        let changes = diff(&prev, &next);
        assert_eq!(changes.len(), 1);
        assert_eq!(changes["std_dev_olevel_grade"], Value::Null);
    }

    #[test]
    fn test_float_change_detected_at_rounding_precision() {
        let prev = snapshot(&[("std_dev_olevel_grade", json!(0.816))]);
        let next = snapshot(&[("std_dev_olevel_grade", json!(0.817))]);
        assert_eq!(diff(&prev, &next).len(), 1);
    }
}
