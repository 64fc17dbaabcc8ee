use crate::board::moves::{move_directional, move_drag_drop, MoveDirection};
use crate::board::{gate, undo};
use crate::models::board::{BoardColumn, BoardState, BoardUpdate, BoardView, MoveAction, UndoPrompt};
use crate::models::issue::{Issue, IssueStatus};
use serde::Deserialize;
use serde_json::json;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tauri::Emitter;

/// Partial field update for an issue; absent fields are left alone.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub assignee: Option<String>,
    pub priority: Option<String>,
    pub severity: Option<i64>,
    pub status: Option<String>,
    pub tags: Option<Vec<String>>,
}

#[tauri::command]
pub async fn get_board(
    search: Option<String>,
    assignee: Option<String>,
    severity: Option<i64>,
    state: tauri::State<'_, Arc<Mutex<BoardState>>>,
) -> Result<BoardView, String> {
    board_view(state.inner(), search.as_deref(), assignee.as_deref(), severity)
}

#[tauri::command]
pub async fn get_issue(
    issue_id: String,
    state: tauri::State<'_, Arc<Mutex<BoardState>>>,
) -> Result<Issue, String> {
    get_issue_internal(state.inner(), &issue_id)
}

#[tauri::command]
pub async fn move_issue(
    issue_id: String,
    direction: MoveDirection,
    state: tauri::State<'_, Arc<Mutex<BoardState>>>,
    app: tauri::AppHandle,
) -> Result<BoardUpdate, String> {
    let update = apply_directional_move(state.inner(), &issue_id, direction)?;
    announce_undo(&app, state.inner(), &update);
    Ok(update)
}

#[tauri::command]
pub async fn reorder_issue(
    source_status: String,
    source_index: usize,
    dest_status: String,
    dest_index: usize,
    issue_id: String,
    state: tauri::State<'_, Arc<Mutex<BoardState>>>,
    app: tauri::AppHandle,
) -> Result<BoardUpdate, String> {
    let update = apply_drag_drop(
        state.inner(),
        &source_status,
        source_index,
        &dest_status,
        dest_index,
        &issue_id,
    )?;
    announce_undo(&app, state.inner(), &update);
    Ok(update)
}

#[tauri::command]
pub async fn undo_move(
    state: tauri::State<'_, Arc<Mutex<BoardState>>>,
    app: tauri::AppHandle,
) -> Result<BoardUpdate, String> {
    let (update, undone_id) = apply_undo(state.inner())?;
    if let Some(action_id) = undone_id {
        let _ = app.emit(
            "undo_applied",
            json!({
                "actionId": action_id,
                "message": "Issue move undone.",
                "autoCloseMs": undo::UNDO_CONFIRM_MS,
            }),
        );
    }
    Ok(update)
}

#[tauri::command]
pub async fn resolve_issue(
    issue_id: String,
    state: tauri::State<'_, Arc<Mutex<BoardState>>>,
    app: tauri::AppHandle,
) -> Result<BoardUpdate, String> {
    let update = apply_resolve(state.inner(), &issue_id)?;
    announce_undo(&app, state.inner(), &update);
    Ok(update)
}

#[tauri::command]
pub async fn update_issue(
    issue_id: String,
    fields: IssueUpdate,
    state: tauri::State<'_, Arc<Mutex<BoardState>>>,
) -> Result<BoardUpdate, String> {
    apply_update(state.inner(), &issue_id, fields)
}

/// Directional move: gate, transition, and arm undo under one lock so
/// the step is atomic to observers. Every rejection path returns the
/// current list unchanged with no undo armed.
pub fn apply_directional_move(
    state: &Arc<Mutex<BoardState>>,
    issue_id: &str,
    direction: MoveDirection,
) -> Result<BoardUpdate, String> {
    let mut lock = state
        .lock()
        .map_err(|_| "Board state lock error".to_string())?;

    if !gate::can_mutate(lock.current_user.as_ref()) {
        return Ok(BoardUpdate::unchanged(lock.issues.clone()));
    }

    match move_directional(&lock.issues, issue_id, direction) {
        Some((next, action)) => Ok(commit_move(&mut lock, next, action)),
        None => Ok(BoardUpdate::unchanged(lock.issues.clone())),
    }
}

/// Drag-and-drop move; same contract as [`apply_directional_move`].
pub fn apply_drag_drop(
    state: &Arc<Mutex<BoardState>>,
    source_status: &str,
    source_index: usize,
    dest_status: &str,
    dest_index: usize,
    issue_id: &str,
) -> Result<BoardUpdate, String> {
    let mut lock = state
        .lock()
        .map_err(|_| "Board state lock error".to_string())?;

    if !gate::can_mutate(lock.current_user.as_ref()) {
        return Ok(BoardUpdate::unchanged(lock.issues.clone()));
    }

    match move_drag_drop(
        &lock.issues,
        source_status,
        source_index,
        dest_status,
        dest_index,
        issue_id,
    ) {
        Some((next, action)) => Ok(commit_move(&mut lock, next, action)),
        None => Ok(BoardUpdate::unchanged(lock.issues.clone())),
    }
}

/// Restore the armed snapshot, if any. The second value is the undone
/// action id, used for the confirmation notice.
pub fn apply_undo(state: &Arc<Mutex<BoardState>>) -> Result<(BoardUpdate, Option<u64>), String> {
    match undo::apply(state) {
        Some((issues, action_id)) => Ok((
            BoardUpdate {
                issues,
                changed: true,
                undo: None,
            },
            Some(action_id),
        )),
        None => {
            let lock = state
                .lock()
                .map_err(|_| "Board state lock error".to_string())?;
            Ok((BoardUpdate::unchanged(lock.issues.clone()), None))
        }
    }
}

/// Direct field update from the detail page: mark an issue resolved.
/// Already-Done issues and unknown ids are silent no-ops.
pub fn apply_resolve(state: &Arc<Mutex<BoardState>>, issue_id: &str) -> Result<BoardUpdate, String> {
    let mut lock = state
        .lock()
        .map_err(|_| "Board state lock error".to_string())?;

    if !gate::can_mutate(lock.current_user.as_ref()) {
        return Ok(BoardUpdate::unchanged(lock.issues.clone()));
    }

    let Some(issue) = lock.issues.iter().find(|i| i.id == issue_id) else {
        return Ok(BoardUpdate::unchanged(lock.issues.clone()));
    };
    let Some(from) = issue.column() else {
        return Ok(BoardUpdate::unchanged(lock.issues.clone()));
    };
    if from == IssueStatus::Done {
        return Ok(BoardUpdate::unchanged(lock.issues.clone()));
    }

    let title = issue.title.clone();
    let snapshot = lock.issues.clone();
    let next: Vec<Issue> = lock
        .issues
        .iter()
        .map(|i| {
            if i.id == issue_id {
                let mut resolved = i.clone();
                resolved.status = IssueStatus::Done.as_str().to_string();
                resolved
            } else {
                i.clone()
            }
        })
        .collect();

    let action = MoveAction {
        issue_id: issue_id.to_string(),
        from_status: from,
        to_status: IssueStatus::Done,
        snapshot,
    };
    let mut update = commit_move(&mut lock, next, action);
    if let Some(prompt) = update.undo.as_mut() {
        prompt.message = format!("Issue {title} marked as resolved.");
    }
    Ok(update)
}

/// Gated partial field update. Unknown ids are an error here (the
/// detail page only edits issues it is displaying).
pub fn apply_update(
    state: &Arc<Mutex<BoardState>>,
    issue_id: &str,
    fields: IssueUpdate,
) -> Result<BoardUpdate, String> {
    let mut lock = state
        .lock()
        .map_err(|_| "Board state lock error".to_string())?;

    if !gate::can_mutate(lock.current_user.as_ref()) {
        return Ok(BoardUpdate::unchanged(lock.issues.clone()));
    }

    let Some(issue) = lock.issues.iter_mut().find(|i| i.id == issue_id) else {
        return Err(format!("Issue not found: {issue_id}"));
    };

    if let Some(title) = fields.title {
        issue.title = title;
    }
    if let Some(description) = fields.description {
        issue.description = Some(description);
    }
    if let Some(assignee) = fields.assignee {
        issue.assignee = assignee;
    }
    if let Some(priority) = fields.priority {
        issue.priority = priority;
    }
    if let Some(severity) = fields.severity {
        issue.severity = severity;
    }
    if let Some(status) = fields.status {
        issue.status = status;
    }
    if let Some(tags) = fields.tags {
        issue.tags = tags;
    }

    Ok(BoardUpdate {
        issues: lock.issues.clone(),
        changed: true,
        undo: None,
    })
}

pub fn get_issue_internal(state: &Arc<Mutex<BoardState>>, issue_id: &str) -> Result<Issue, String> {
    let lock = state
        .lock()
        .map_err(|_| "Board state lock error".to_string())?;
    lock.issues
        .iter()
        .find(|i| i.id == issue_id)
        .cloned()
        .ok_or_else(|| format!("Issue not found: {issue_id}"))
}

/// Grouped, filtered view: case-insensitive substring match on title or
/// any tag, exact assignee, exact severity. The assignee list feeds the
/// filter dropdown in first-appearance order.
pub fn board_view(
    state: &Arc<Mutex<BoardState>>,
    search: Option<&str>,
    assignee: Option<&str>,
    severity: Option<i64>,
) -> Result<BoardView, String> {
    let lock = state
        .lock()
        .map_err(|_| "Board state lock error".to_string())?;

    let query = search.unwrap_or("").trim().to_lowercase();
    let matches = |issue: &Issue| -> bool {
        let matches_search = query.is_empty()
            || issue.title.to_lowercase().contains(&query)
            || issue.tags.iter().any(|t| t.to_lowercase().contains(&query));
        let matches_assignee = assignee.map_or(true, |a| issue.assignee == a);
        let matches_severity = severity.map_or(true, |s| issue.severity == s);
        matches_search && matches_assignee && matches_severity
    };

    let columns = IssueStatus::COLUMNS
        .iter()
        .map(|status| BoardColumn {
            status: *status,
            issues: lock
                .issues
                .iter()
                .filter(|i| i.column() == Some(*status) && matches(i))
                .cloned()
                .collect(),
        })
        .collect();

    let mut assignees: Vec<String> = Vec::new();
    for issue in &lock.issues {
        if !assignees.contains(&issue.assignee) {
            assignees.push(issue.assignee.clone());
        }
    }

    Ok(BoardView { columns, assignees })
}

/// Commit a computed successor list and arm the undo slot. Caller holds
/// the lock.
fn commit_move(lock: &mut BoardState, next: Vec<Issue>, action: MoveAction) -> BoardUpdate {
    let message = format!(
        "Issue moved from {} to {}.",
        action.from_status.as_str(),
        action.to_status.as_str()
    );
    let from_status = action.from_status;
    let to_status = action.to_status;

    lock.issues = next;
    let action_id = undo::arm(lock, action);

    BoardUpdate {
        issues: lock.issues.clone(),
        changed: true,
        undo: Some(UndoPrompt {
            action_id,
            message,
            from_status: Some(from_status),
            to_status: Some(to_status),
            auto_close_ms: undo::UNDO_WINDOW_MS,
        }),
    }
}

/// Surface a fresh undo opportunity to the webview and schedule its
/// expiry. A stale timer never clears a newer action; the id check in
/// `undo::expire` guarantees that.
fn announce_undo(app: &tauri::AppHandle, state: &Arc<Mutex<BoardState>>, update: &BoardUpdate) {
    let Some(prompt) = &update.undo else {
        return;
    };
    let _ = app.emit("undo_available", prompt);

    let app = app.clone();
    let state = state.clone();
    let action_id = prompt.action_id;
    tauri::async_runtime::spawn(async move {
        tokio::time::sleep(Duration::from_millis(undo::UNDO_WINDOW_MS)).await;
        if undo::expire(&state, action_id) {
            let _ = app.emit("undo_expired", json!({ "actionId": action_id }));
        }
    });
}
