use serde::Serialize;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, warn};

use super::diff::{diff, FeatureSnapshot};

/// Changed keys stamped with the revision that produced them.
///
/// `base_revision` is the revision the changes are relative to. A full
/// resync carries `None` and replaces every engine-owned key.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordDiff {
    pub base_revision: Option<u64>,
    pub revision: u64,
    pub changes: BTreeMap<String, Value>,
}

impl RecordDiff {
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.base_revision.is_none()
    }
}

/// What `SharedRecord::apply` did with a diff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    Applied,
    /// Not newer than what the record already holds; ignored.
    Stale,
    /// Built on a revision the record never applied. The record is
    /// unchanged and needs `Synchronizer::resync`.
    Gap { expected: u64, base: u64 },
}

impl ApplyOutcome {
    pub fn is_applied(&self) -> bool {
        *self == ApplyOutcome::Applied
    }

    pub fn needs_resync(&self) -> bool {
        matches!(self, ApplyOutcome::Gap { .. })
    }
}

/// Remembers the last snapshot handed out and emits minimal diffs.
#[derive(Debug, Default)]
pub struct Synchronizer {
    last: FeatureSnapshot,
    revision: u64,
}

impl Synchronizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `next` as current and return what changed since the last push.
    /// An unchanged snapshot yields an empty diff and keeps the revision.
    pub fn push(&mut self, next: FeatureSnapshot) -> RecordDiff {
        let changes = diff(&self.last, &next);
        let base = self.revision;
        if !changes.is_empty() {
            self.revision += 1;
            self.last = next;
        }
        debug!(revision = self.revision, changed = changes.len(), "feature diff");
        RecordDiff {
            base_revision: Some(base),
            revision: self.revision,
            changes,
        }
    }

    /// The whole current snapshot, for a record that fell behind.
    pub fn resync(&self) -> RecordDiff {
        RecordDiff {
            base_revision: None,
            revision: self.revision,
            changes: self.last.clone(),
        }
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn last(&self) -> &FeatureSnapshot {
        &self.last
    }
}

/// The record the form eventually submits. Engine diffs merge into it;
/// caller-owned keys (demographics, institutional codes) are set directly.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SharedRecord {
    values: BTreeMap<String, Value>,
    #[serde(skip)]
    engine_keys: BTreeSet<String>,
    #[serde(skip)]
    applied_revision: u64,
}

impl SharedRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge a diff that continues from the last applied revision, or
    /// replace all engine-owned keys with a full resync. Anything else
    /// leaves the record untouched.
    pub fn apply(&mut self, diff: &RecordDiff) -> ApplyOutcome {
        match diff.base_revision {
            Some(base) if base == self.applied_revision => {
                for (key, value) in &diff.changes {
                    self.merge(key, value);
                }
            }
            _ if diff.revision <= self.applied_revision => {
                warn!(
                    revision = diff.revision,
                    applied = self.applied_revision,
                    "ignoring stale feature diff"
                );
                return ApplyOutcome::Stale;
            }
            None => {
                for key in std::mem::take(&mut self.engine_keys) {
                    self.values.remove(&key);
                }
                for (key, value) in &diff.changes {
                    self.merge(key, value);
                }
                debug!(revision = diff.revision, keys = diff.changes.len(), "feature resync");
            }
            Some(base) => {
                warn!(
                    base,
                    applied = self.applied_revision,
                    "feature diff skips a revision; resync needed"
                );
                return ApplyOutcome::Gap {
                    expected: self.applied_revision,
                    base,
                };
            }
        }
        self.applied_revision = diff.revision;
        ApplyOutcome::Applied
    }

    fn merge(&mut self, key: &str, value: &Value) {
        if value.is_null() {
            self.values.remove(key);
            self.engine_keys.remove(key);
        } else {
            self.values.insert(key.to_string(), value.clone());
            self.engine_keys.insert(key.to_string());
        }
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn values(&self) -> &BTreeMap<String, Value> {
        &self.values
    }

    pub fn applied_revision(&self) -> u64 {
        self.applied_revision
    }
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
    fn test_first_push_emits_everything() {
        let mut sync = Synchronizer::new();
        let diff = sync.push(snapshot(&[("uce_credits", json!(4))]));
        assert_eq!(diff.base_revision, Some(0));
        assert_eq!(diff.revision, 1);
        assert_eq!(diff.changes.len(), 1);
    }

    #[test]
    fn test_repeat_push_is_empty() {
        let mut sync = Synchronizer::new();
        let snap = snapshot(&[("uce_credits", json!(4))]);
        sync.push(snap.clone());
        let diff = sync.push(snap);
        assert!(diff.is_empty());
        assert_eq!(diff.revision, 1);
        assert_eq!(sync.revision(), 1);
    }

    #[test]
    fn test_empty_diff_applies_as_no_op() {
        let mut sync = Synchronizer::new();
        let mut record = SharedRecord::new();
        let snap = snapshot(&[("uce_credits", json!(4))]);
        assert!(record.apply(&sync.push(snap.clone())).is_applied());
        assert!(record.apply(&sync.push(snap)).is_applied());
        assert_eq!(record.applied_revision(), 1);
    }

    #[test]
    fn test_apply_merges_and_clears() {
        let mut sync = Synchronizer::new();
        let mut record = SharedRecord::new();
        record.set("gender", 1);

        record.apply(&sync.push(snapshot(&[
            ("uce_credits", json!(4)),
            ("std_dev_olevel_grade", json!(1.2)),
        ])));
        record.apply(&sync.push(snapshot(&[("uce_credits", json!(5))])));

        assert_eq!(record.get("uce_credits"), Some(&json!(5)));
        assert_eq!(record.get("std_dev_olevel_grade"), None);
        assert_eq!(record.get("gender"), Some(&json!(1)));
        assert_eq!(record.applied_revision(), 2);
    }

    #[test]
    fn test_stale_diff_is_rejected() {
        let mut sync = Synchronizer::new();
        let mut record = SharedRecord::new();

        let first = sync.push(snapshot(&[("uce_credits", json!(3))]));
        let second = sync.push(snapshot(&[("uce_credits", json!(6))]));

        assert!(record.apply(&first).is_applied());
        assert!(record.apply(&second).is_applied());
        assert_eq!(record.apply(&first), ApplyOutcome::Stale);
        assert_eq!(record.get("uce_credits"), Some(&json!(6)));
    }

    #[test]
    fn test_reapplying_same_diff_is_rejected() {
        let mut sync = Synchronizer::new();
        let mut record = SharedRecord::new();
        let diff = sync.push(snapshot(&[("uce_credits", json!(3))]));
        assert!(record.apply(&diff).is_applied());
        assert_eq!(record.apply(&diff), ApplyOutcome::Stale);
    }

    #[test]
    fn test_out_of_order_delivery_reports_gap_then_catches_up() {
        let mut sync = Synchronizer::new();
        let mut record = SharedRecord::new();

        let d1 = sync.push(snapshot(&[("a", json!(1))]));
        let d2 = sync.push(snapshot(&[("a", json!(1)), ("b", json!(2))]));
        let d3 = sync.push(snapshot(&[("a", json!(5)), ("b", json!(2))]));

        assert!(record.apply(&d1).is_applied());
        let outcome = record.apply(&d3);
        assert_eq!(outcome, ApplyOutcome::Gap { expected: 1, base: 2 });
        assert!(outcome.needs_resync());
        assert_eq!(record.get("a"), Some(&json!(1)));

        assert!(record.apply(&d2).is_applied());
        assert!(record.apply(&d3).is_applied());
        assert_eq!(record.values(), sync.last());
    }

    #[test]
    fn test_resync_after_lost_diff_matches_latest() {
        let mut sync = Synchronizer::new();
        let mut record = SharedRecord::new();
        record.set("campus_id_code", 3);

        let d1 = sync.push(snapshot(&[("a", json!(1)), ("c", json!(7))]));
        let _lost = sync.push(snapshot(&[("a", json!(1)), ("b", json!(2))]));
        let d3 = sync.push(snapshot(&[("a", json!(5)), ("b", json!(2))]));

        assert!(record.apply(&d1).is_applied());
        assert!(record.apply(&d3).needs_resync());

        let full = sync.resync();
        assert!(full.is_full());
        assert!(record.apply(&full).is_applied());

        assert_eq!(record.get("a"), Some(&json!(5)));
        assert_eq!(record.get("b"), Some(&json!(2)));
        assert_eq!(record.get("c"), None);
        assert_eq!(record.get("campus_id_code"), Some(&json!(3)));
        assert_eq!(record.applied_revision(), 3);
    }

    #[test]
    fn test_stale_resync_is_ignored() {
        let mut sync = Synchronizer::new();
        let mut record = SharedRecord::new();

        sync.push(snapshot(&[("a", json!(1))]));
        let early = sync.resync();
        sync.push(snapshot(&[("a", json!(2))]));

        assert!(record.apply(&sync.resync()).is_applied());
        assert_eq!(record.apply(&early), ApplyOutcome::Stale);
        assert_eq!(record.get("a"), Some(&json!(2)));
    }
}
