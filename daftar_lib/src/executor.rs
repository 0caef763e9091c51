//! Batch commit: apply a merge plan against a record store.

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use daftar_store::{RecordStore, StoreError};

use crate::planner::MergePlan;

/// What a commit actually applied.
#[derive(Debug, Clone, Serialize)]
pub struct CommitReceipt {
    pub additions_applied: usize,
    pub updates_applied: usize,
    pub committed_at: DateTime<Utc>,
}

/// Commit failures carry how far the run got. There is no cross-batch
/// atomicity: after an update failure the appended rows are already
/// stored. Recovery is re-running the whole pipeline; re-analysis finds
/// the appended rows by fingerprint and the already-filled fields are no
/// longer empty, so a re-run converges instead of duplicating.
#[derive(Error, Debug)]
pub enum CommitError {
    #[error("append batch failed, nothing was written: {source}")]
    Append {
        #[source]
        source: StoreError,
    },
    #[error("update batch failed after {additions_applied} appended rows: {source}")]
    Update {
        additions_applied: usize,
        #[source]
        source: StoreError,
    },
}

/// Apply a plan: one append call for all additions, then one update
/// call for all positional replacements. An empty plan never touches
/// the store.
pub fn commit(
    store: &mut dyn RecordStore,
    plan: &MergePlan,
) -> Result<CommitReceipt, CommitError> {
    if plan.is_empty() {
        return Ok(CommitReceipt {
            additions_applied: 0,
            updates_applied: 0,
            committed_at: Utc::now(),
        });
    }

    if !plan.additions.is_empty() {
        store
            .append_rows(&plan.additions)
            .map_err(|source| CommitError::Append { source })?;
    }

    if !plan.updates.is_empty() {
        store
            .update_rows(&plan.updates)
            .map_err(|source| CommitError::Update {
                additions_applied: plan.additions.len(),
                source,
            })?;
    }

    Ok(CommitReceipt {
        additions_applied: plan.additions.len(),
        updates_applied: plan.updates.len(),
        committed_at: Utc::now(),
    })
}
