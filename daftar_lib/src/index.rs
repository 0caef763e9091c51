//! Fingerprint index over a registry snapshot.

use std::collections::HashMap;

use daftar_store::{Position, Record};

use crate::normalize::fingerprint;

/// Maps identity fingerprints to the snapshot entries sharing them, in
/// encounter order, so duplicate names resolve deterministically. Built
/// once per import run and discarded with it; rows whose identity
/// fingerprints to empty are never indexed.
#[derive(Debug, Default)]
pub struct RecordIndex {
    buckets: HashMap<String, Vec<usize>>,
}

impl RecordIndex {
    /// One pass over the snapshot. The snapshot itself is not touched;
    /// buckets hold indices into it.
    pub fn build(snapshot: &[(Position, Record)], identity_field: &str) -> Self {
        let mut buckets: HashMap<String, Vec<usize>> = HashMap::new();
        for (idx, (_, record)) in snapshot.iter().enumerate() {
            let key = fingerprint(record.get(identity_field));
            if key.is_empty() {
                continue;
            }
            buckets.entry(key).or_default().push(idx);
        }
        Self { buckets }
    }

    /// Snapshot indices stored under a fingerprint, oldest first.
    pub fn bucket(&self, key: &str) -> &[usize] {
        self.buckets.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of distinct fingerprints.
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> Vec<(Position, Record)> {
        vec![
            (2, Record::from_pairs([("اسم", "علی رضا")])),
            (3, Record::from_pairs([("اسم", "سارا محمدی")])),
            // same person, spelled with a zero-width non-joiner
            (4, Record::from_pairs([("اسم", "علی‌رضا")])),
            (5, Record::from_pairs([("اسم", "")])),
            (6, Record::from_pairs([("اسم", "nan")])),
        ]
    }

    #[test]
    fn groups_spacing_variants_into_one_bucket() {
        let index = RecordIndex::build(&snapshot(), "اسم");
        assert_eq!(index.bucket("علیرضا"), &[0, 2]);
    }

    #[test]
    fn preserves_encounter_order() {
        let snap = vec![
            (2, Record::from_pairs([("اسم", "رضا")])),
            (3, Record::from_pairs([("اسم", "رضا")])),
            (4, Record::from_pairs([("اسم", "رضا")])),
        ];
        let index = RecordIndex::build(&snap, "اسم");
        assert_eq!(index.bucket("رضا"), &[0, 1, 2]);
    }

    #[test]
    fn unnamed_rows_are_not_indexed() {
        let index = RecordIndex::build(&snapshot(), "اسم");
        assert_eq!(index.len(), 2);
        assert!(index.bucket("").is_empty());
    }

    #[test]
    fn missing_bucket_is_empty() {
        let index = RecordIndex::build(&snapshot(), "اسم");
        assert!(index.bucket("ناشناس").is_empty());
    }
}
