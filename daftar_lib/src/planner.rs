//! Merge planning: turn an import batch plus a registry snapshot into
//! additions, gap-filling updates, and counts, without touching storage.

use std::collections::HashMap;

use serde::Serialize;

use daftar_store::{Position, Record, RecordStore};

use crate::error::ImportError;
use crate::index::RecordIndex;
use crate::matcher::find_candidate;
use crate::normalize::fingerprint;
use crate::profile::{ImportProfile, RawRow};

/// Change-log lines kept for operator preview; anything past the cap is
/// only counted.
pub const LOG_PREVIEW_LIMIT: usize = 40;

/// The computed outcome of one analyze pass. Holding a plan means
/// "analyzed, nothing written"; a plan is discarded after commit and
/// never reused across runs.
#[derive(Debug, Default, Serialize)]
pub struct MergePlan {
    /// New records, in incoming row order.
    pub additions: Vec<Record>,
    /// Replacement rows keyed by stored position, in match-discovery
    /// order. At most one entry per position.
    pub updates: Vec<(Position, Record)>,
    /// Matched rows that contributed nothing new.
    pub noops: usize,
    /// Rows without a usable identity, dropped from the batch.
    pub skipped: usize,
    /// Rows where more than one stored record was compatible.
    pub ambiguous: usize,
    /// Human-readable change lines, capped at `LOG_PREVIEW_LIMIT`.
    pub log: Vec<String>,
    /// Log lines suppressed by the cap.
    pub log_overflow: usize,
}

/// The numbers the reporting layer shows the operator before a commit.
#[derive(Debug, Clone, Serialize)]
pub struct PlanSummary {
    pub additions: usize,
    pub updates: usize,
    pub noops: usize,
    pub skipped: usize,
    pub ambiguous: usize,
    pub log: Vec<String>,
    pub log_overflow: usize,
}

impl MergePlan {
    pub fn addition_count(&self) -> usize {
        self.additions.len()
    }

    pub fn update_count(&self) -> usize {
        self.updates.len()
    }

    /// True when a commit would not touch the store.
    pub fn is_empty(&self) -> bool {
        self.additions.is_empty() && self.updates.is_empty()
    }

    pub fn summary(&self) -> PlanSummary {
        PlanSummary {
            additions: self.additions.len(),
            updates: self.updates.len(),
            noops: self.noops,
            skipped: self.skipped,
            ambiguous: self.ambiguous,
            log: self.log.clone(),
            log_overflow: self.log_overflow,
        }
    }

    fn push_log(&mut self, line: String) {
        if self.log.len() < LOG_PREVIEW_LIMIT {
            self.log.push(line);
        } else {
            self.log_overflow += 1;
        }
    }
}

/// Analyze an import batch against a snapshot. Read-only; the returned
/// plan is the input to `commit`.
///
/// The index is built once from the snapshot, so two batch rows naming
/// the same previously-unseen person both become additions within this
/// run; the next run folds the later duplicate into the stored record.
/// Rows matching a record that already has a pending update merge into
/// the pending replacement, keeping one update per position.
pub fn analyze(
    snapshot: &[(Position, Record)],
    rows: &[RawRow],
    profile: &ImportProfile,
) -> Result<MergePlan, ImportError> {
    profile.validate()?;
    let index = RecordIndex::build(snapshot, &profile.identity);
    let mut plan = MergePlan::default();
    let mut pending: HashMap<Position, usize> = HashMap::new();

    for (row_number, raw) in rows.iter().enumerate() {
        let incoming = profile.resolve_row(raw);
        let name = incoming.get(&profile.identity).to_string();
        if fingerprint(&name).is_empty() {
            plan.skipped += 1;
            plan.push_log(format!("row {}: no usable name, skipped", row_number + 1));
            continue;
        }

        let Some(candidate) = find_candidate(&incoming, snapshot, &index, profile) else {
            plan.push_log(format!("{}: new record", name));
            plan.additions.push(new_record(&incoming, profile));
            continue;
        };

        if candidate.compatible > 1 {
            plan.ambiguous += 1;
        }

        let base = match pending.get(&candidate.position) {
            Some(&i) => plan.updates[i].1.clone(),
            None => snapshot[candidate.snapshot_idx].1.clone(),
        };

        match merge_into(&base, &incoming, profile) {
            Some((merged, filled)) => {
                plan.push_log(format!(
                    "{} (row {}): filled {}",
                    name,
                    candidate.position,
                    filled.join(", ")
                ));
                match pending.get(&candidate.position) {
                    Some(&i) => plan.updates[i].1 = merged,
                    None => {
                        pending.insert(candidate.position, plan.updates.len());
                        plan.updates.push((candidate.position, merged));
                    }
                }
            }
            None => plan.noops += 1,
        }
    }

    Ok(plan)
}

/// Read the registry snapshot, then analyze. A failed read is fatal to
/// the run; no plan is computed.
pub fn analyze_store(
    store: &dyn RecordStore,
    rows: &[RawRow],
    profile: &ImportProfile,
) -> Result<MergePlan, ImportError> {
    let snapshot = store.read_all()?;
    analyze(&snapshot, rows, profile)
}

/// Build a brand-new record covering every layout field: the incoming
/// value where the row has one, the empty string elsewhere.
fn new_record(incoming: &Record, profile: &ImportProfile) -> Record {
    let mut record = Record::new();
    for field in &profile.fields {
        record.set(field, incoming.get(field));
    }
    record
}

/// Gap-filling merge: stored values always win; only fields whose
/// stored value normalizes to empty take the incoming value. The
/// identity field keeps the stored spelling even when the incoming one
/// differs in formatting. Returns `None` when nothing changed.
fn merge_into(
    stored: &Record,
    incoming: &Record,
    profile: &ImportProfile,
) -> Option<(Record, Vec<String>)> {
    let mut merged = stored.clone();
    let mut filled = Vec::new();
    for field in &profile.fields {
        if *field == profile.identity {
            continue;
        }
        let incoming_value = incoming.get(field);
        if !incoming_value.is_empty() && crate::normalize::normalize(stored.get(field)).is_empty() {
            merged.set(field, incoming_value);
            filled.push(field.clone());
        }
    }
    if filled.is_empty() {
        None
    } else {
        Some((merged, filled))
    }
}
