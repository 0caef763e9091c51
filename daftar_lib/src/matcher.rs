//! Candidate selection: resolve an incoming row against the index.

use daftar_store::{Position, Record};

use crate::index::RecordIndex;
use crate::normalize::fingerprint;
use crate::profile::ImportProfile;

/// A selected stored record, plus how many bucket entries were
/// compatible. `compatible > 1` means the choice was ambiguous and the
/// first entry won.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CandidateMatch {
    /// Index into the snapshot slice the index was built over.
    pub snapshot_idx: usize,
    /// The stored record's position.
    pub position: Position,
    /// Compatible entries in the bucket, including the selected one.
    pub compatible: usize,
}

/// Wildcard equality over one discriminator pair: an empty side is
/// compatible with anything; non-empty sides compare
/// whitespace-insensitively.
fn values_compatible(stored: &str, incoming: &str) -> bool {
    let stored_key = fingerprint(stored);
    let incoming_key = fingerprint(incoming);
    stored_key.is_empty() || incoming_key.is_empty() || stored_key == incoming_key
}

fn records_compatible(stored: &Record, incoming: &Record, discriminators: &[String]) -> bool {
    discriminators
        .iter()
        .all(|field| values_compatible(stored.get(field), incoming.get(field)))
}

/// Select at most one stored record for an incoming row.
///
/// Walks the row's fingerprint bucket in insertion order and returns the
/// first entry whose discriminator fields are all pairwise compatible.
/// A same-name entry with a conflicting location is a different person:
/// the row falls through to an append instead of a wrong update. Rows
/// with an empty fingerprint never match.
pub fn find_candidate(
    incoming: &Record,
    snapshot: &[(Position, Record)],
    index: &RecordIndex,
    profile: &ImportProfile,
) -> Option<CandidateMatch> {
    let key = fingerprint(incoming.get(&profile.identity));
    if key.is_empty() {
        return None;
    }

    let mut selected = None;
    let mut compatible = 0usize;
    for &idx in index.bucket(&key) {
        let (_, stored) = &snapshot[idx];
        if records_compatible(stored, incoming, &profile.discriminators) {
            compatible += 1;
            if selected.is_none() {
                selected = Some(idx);
            }
        }
    }

    let snapshot_idx = selected?;
    let position = snapshot[snapshot_idx].0;
    if compatible > 1 {
        tracing::warn!(
            "{} stored records are compatible with incoming '{}'; keeping the first (position {})",
            compatible,
            incoming.get(&profile.identity),
            position
        );
    }
    Some(CandidateMatch {
        snapshot_idx,
        position,
        compatible,
    })
}
