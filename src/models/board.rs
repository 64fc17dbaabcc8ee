use crate::models::issue::{Issue, IssueStatus};
use crate::models::user::User;
use serde::{Deserialize, Serialize};

/// Undo record for a single move: where the issue went plus a deep,
/// independent snapshot of the whole list from before the move.
#[derive(Debug, Clone, PartialEq)]
pub struct MoveAction {
    pub issue_id: String,
    pub from_status: IssueStatus,
    pub to_status: IssueStatus,
    pub snapshot: Vec<Issue>,
}

/// The single live undo slot. `id` comes from a monotonically
/// increasing counter; only the matching expiry callback may clear it.
#[derive(Debug, Clone)]
pub struct PendingUndo {
    pub id: u64,
    pub action: MoveAction,
}

/// Shared board state, managed as `Arc<Mutex<BoardState>>` by the
/// builder. Every mutation goes through the transition functions in
/// `crate::board`; commands lock, transition, commit, unlock.
#[derive(Debug, Default)]
pub struct BoardState {
    pub issues: Vec<Issue>,
    pub pending_undo: Option<PendingUndo>,
    pub next_action_id: u64,
    pub last_sync_at: Option<i64>,
    pub is_syncing: bool,
    pub polling_interval_ms: u64,
    pub current_user: Option<User>,
    pub recently_accessed: Vec<String>,
}

impl BoardState {
    pub fn with_issues(issues: Vec<Issue>) -> Self {
        BoardState {
            issues,
            polling_interval_ms: crate::board::sync::DEFAULT_POLL_INTERVAL_MS,
            ..BoardState::default()
        }
    }
}

/// Surfaced undo opportunity, also emitted as the `undo_available`
/// event payload. The webview replaces any visible prompt when a new
/// one arrives and dismisses it after `auto_close_ms`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UndoPrompt {
    pub action_id: u64,
    pub message: String,
    pub from_status: Option<IssueStatus>,
    pub to_status: Option<IssueStatus>,
    pub auto_close_ms: u64,
}

/// Result of any mutation command. `changed` is false for every
/// silently absorbed no-op (unknown id, edge move, denied role).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardUpdate {
    pub issues: Vec<Issue>,
    pub changed: bool,
    pub undo: Option<UndoPrompt>,
}

impl BoardUpdate {
    pub fn unchanged(issues: Vec<Issue>) -> Self {
        BoardUpdate {
            issues,
            changed: false,
            undo: None,
        }
    }
}

/// Poll loop health as shown in the footer ("last synced ...").
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncStatus {
    pub last_sync_at: Option<i64>,
    pub is_syncing: bool,
    pub polling_interval_ms: u64,
}

/// One filtered board column in display order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardColumn {
    pub status: IssueStatus,
    pub issues: Vec<Issue>,
}

/// Grouped, filtered view of the board plus the assignee list that
/// feeds the filter dropdown.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardView {
    pub columns: Vec<BoardColumn>,
    pub assignees: Vec<String>,
}
