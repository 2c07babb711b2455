//! Holding area for results that need explicit confirmation.
//!
//! Actions marked `requires_approval` produce a preview the user must apply
//! or discard before it takes effect. Completed results are queued here and
//! consumed by the approving surface; stale entries are pruned after the
//! configured timeout.

use std::collections::VecDeque;
use std::sync::Mutex;

use uuid::Uuid;

use crate::types::{ActionId, ActionRunResult};
use opsdeck_core::config::ApprovalConfig;
use opsdeck_core::types::Timestamp;

/// A completed result awaiting apply/discard.
#[derive(Debug, Clone)]
pub struct PendingApproval {
    pub approval_id: Uuid,
    pub action_id: ActionId,
    pub result: ActionRunResult,
    pub created_at: Timestamp,
}

/// Queue of results awaiting explicit confirmation.
///
/// Bounded by `max_pending`; the oldest entry is dropped when full.
pub struct PendingApprovals {
    config: ApprovalConfig,
    pending: Mutex<VecDeque<PendingApproval>>,
}

impl PendingApprovals {
    pub fn new(config: ApprovalConfig) -> Self {
        Self {
            config,
            pending: Mutex::new(VecDeque::new()),
        }
    }

    /// Queue a completed result, returning its approval id.
    pub fn enqueue(&self, action_id: ActionId, result: ActionRunResult) -> Uuid {
        let approval_id = Uuid::new_v4();
        let mut pending = self.pending.lock().unwrap();
        if self.config.max_pending > 0 && pending.len() >= self.config.max_pending {
            pending.pop_front();
        }
        pending.push_back(PendingApproval {
            approval_id,
            action_id,
            result,
            created_at: Timestamp::now(),
        });
        approval_id
    }

    /// Apply a pending result, removing and returning it.
    ///
    /// Returns `None` if no entry exists for the given id.
    pub fn approve(&self, approval_id: Uuid) -> Option<PendingApproval> {
        let mut pending = self.pending.lock().unwrap();
        if let Some(pos) = pending.iter().position(|p| p.approval_id == approval_id) {
            pending.remove(pos)
        } else {
            None
        }
    }

    /// Discard a pending result.
    ///
    /// Returns `true` if the entry was found and removed.
    pub fn discard(&self, approval_id: Uuid) -> bool {
        let mut pending = self.pending.lock().unwrap();
        if let Some(pos) = pending.iter().position(|p| p.approval_id == approval_id) {
            pending.remove(pos);
            true
        } else {
            false
        }
    }

    /// Number of results awaiting confirmation.
    pub fn pending_count(&self) -> usize {
        self.pending.lock().unwrap().len()
    }

    /// Drop entries older than the configured timeout, returning how many
    /// were removed.
    pub fn prune_expired(&self) -> usize {
        let timeout = self.config.timeout_seconds as i64;
        let mut pending = self.pending.lock().unwrap();
        let before = pending.len();
        pending.retain(|p| p.created_at.age_seconds() < timeout);
        before - pending.len()
    }
}
