use crate::models::board::{BoardState, MoveAction, PendingUndo};
use crate::models::issue::Issue;
use std::sync::{Arc, Mutex};

/// How long a surfaced undo opportunity stays live.
pub const UNDO_WINDOW_MS: u64 = 5_000;
/// Lifetime of the "undone" confirmation notice.
pub const UNDO_CONFIRM_MS: u64 = 2_000;

/// Arm the single undo slot with a fresh action, replacing whatever was
/// pending. Returns the action id the expiry timer must present to
/// clear the slot.
pub fn arm(state: &mut BoardState, action: MoveAction) -> u64 {
    state.next_action_id += 1;
    let id = state.next_action_id;
    state.pending_undo = Some(PendingUndo { id, action });
    id
}

/// Apply the pending undo, if any: restore the snapshot wholesale and
/// clear the slot. Returns the restored list and the action id.
pub fn apply(state: &Arc<Mutex<BoardState>>) -> Option<(Vec<Issue>, u64)> {
    let mut lock = state.lock().ok()?;
    let pending = lock.pending_undo.take()?;
    lock.issues = pending.action.snapshot;
    Some((lock.issues.clone(), pending.id))
}

/// Expire the undo opportunity for `action_id`. Only clears the slot if
/// that exact action is still armed; a newer move or an applied undo
/// invalidates older timers. Never touches the issue list.
pub fn expire(state: &Arc<Mutex<BoardState>>, action_id: u64) -> bool {
    let Ok(mut lock) = state.lock() else {
        return false;
    };
    match &lock.pending_undo {
        Some(pending) if pending.id == action_id => {
            lock.pending_undo = None;
            true
        }
        _ => false,
    }
}
