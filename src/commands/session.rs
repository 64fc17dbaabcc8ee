use crate::commands::settings::{config_dir, persist_key, RECENTS_CAPACITY};
use crate::models::board::BoardState;
use crate::models::user::{User, UserRole};
use serde_json::{json, Value};
use std::path::Path;
use std::sync::{Arc, Mutex};

#[tauri::command]
pub async fn login(
    name: String,
    role: String,
    state: tauri::State<'_, Arc<Mutex<BoardState>>>,
    app: tauri::AppHandle,
) -> Result<User, String> {
    login_internal(state.inner(), &config_dir(&app)?, &name, &role)
}

#[tauri::command]
pub async fn logout(
    state: tauri::State<'_, Arc<Mutex<BoardState>>>,
    app: tauri::AppHandle,
) -> Result<(), String> {
    logout_internal(state.inner(), &config_dir(&app)?)
}

#[tauri::command]
pub async fn current_user(
    state: tauri::State<'_, Arc<Mutex<BoardState>>>,
) -> Result<Option<User>, String> {
    let lock = state
        .lock()
        .map_err(|_| "Board state lock error".to_string())?;
    Ok(lock.current_user.clone())
}

#[tauri::command]
pub async fn record_issue_access(
    issue_id: String,
    state: tauri::State<'_, Arc<Mutex<BoardState>>>,
    app: tauri::AppHandle,
) -> Result<Vec<String>, String> {
    record_issue_access_internal(state.inner(), &config_dir(&app)?, &issue_id)
}

#[tauri::command]
pub async fn recently_accessed(
    state: tauri::State<'_, Arc<Mutex<BoardState>>>,
) -> Result<Vec<String>, String> {
    let lock = state
        .lock()
        .map_err(|_| "Board state lock error".to_string())?;
    Ok(lock.recently_accessed.clone())
}

#[tauri::command]
pub async fn set_sidebar_open(open: bool, app: tauri::AppHandle) -> Result<(), String> {
    persist_key(&config_dir(&app)?, "sidebarOpen", json!(open))?;
    Ok(())
}

/// The role is whatever the user declared on the login form; there is
/// no verification beyond parsing it. See `board::gate`.
pub fn login_internal(
    state: &Arc<Mutex<BoardState>>,
    dir: &Path,
    name: &str,
    role: &str,
) -> Result<User, String> {
    let name = name.trim();
    if name.is_empty() {
        return Err("Name is required".to_string());
    }
    let role = UserRole::parse(role).ok_or_else(|| format!("Unknown role: {role}"))?;

    let user = User {
        name: name.to_string(),
        role,
    };

    {
        let mut lock = state
            .lock()
            .map_err(|_| "Board state lock error".to_string())?;
        lock.current_user = Some(user.clone());
    }
    persist_key(
        dir,
        "currentUser",
        serde_json::to_value(&user).map_err(|e| format!("Failed to serialize user: {e}"))?,
    )?;

    Ok(user)
}

pub fn logout_internal(state: &Arc<Mutex<BoardState>>, dir: &Path) -> Result<(), String> {
    {
        let mut lock = state
            .lock()
            .map_err(|_| "Board state lock error".to_string())?;
        lock.current_user = None;
    }
    persist_key(dir, "currentUser", Value::Null)?;
    Ok(())
}

pub fn record_issue_access_internal(
    state: &Arc<Mutex<BoardState>>,
    dir: &Path,
    issue_id: &str,
) -> Result<Vec<String>, String> {
    let updated = {
        let mut lock = state
            .lock()
            .map_err(|_| "Board state lock error".to_string())?;
        let updated = updated_recents(&lock.recently_accessed, issue_id);
        lock.recently_accessed = updated.clone();
        updated
    };
    persist_key(dir, "recentlyAccessed", json!(updated))?;
    Ok(updated)
}

/// Most-recent-first, de-duplicated, bounded at [`RECENTS_CAPACITY`].
fn updated_recents(current: &[String], issue_id: &str) -> Vec<String> {
    let mut updated = Vec::with_capacity(RECENTS_CAPACITY);
    updated.push(issue_id.to_string());
    updated.extend(
        current
            .iter()
            .filter(|id| id.as_str() != issue_id)
            .cloned(),
    );
    updated.truncate(RECENTS_CAPACITY);
    updated
}
