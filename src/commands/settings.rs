use crate::board::sync::{clamp_interval_ms, DEFAULT_POLL_INTERVAL_MS};
use crate::models::user::User;
use serde_json::{json, Map, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tauri::Manager;

const SETTINGS_SCHEMA_VERSION: i64 = 1;

/// Bound on the "recently accessed" list, most-recent-first.
pub const RECENTS_CAPACITY: usize = 5;

/// Startup view of the persisted store: everything the board state
/// needs seeded before the first command arrives.
#[derive(Debug, Clone)]
pub struct EffectiveStartupState {
    pub polling_interval_ms: u64,
    pub current_user: Option<User>,
    pub recently_accessed: Vec<String>,
}

#[tauri::command]
pub async fn get_settings(app: tauri::AppHandle) -> Result<Value, String> {
    load_settings_from_dir(&config_dir(&app)?)
}

#[tauri::command]
pub async fn save_settings(app: tauri::AppHandle, settings: Value) -> Result<Value, String> {
    save_settings_to_dir(&config_dir(&app)?, settings)
}

pub fn config_dir(app: &tauri::AppHandle) -> Result<PathBuf, String> {
    app.path()
        .app_config_dir()
        .map_err(|e| format!("Could not resolve app config directory: {e}"))
}

/// Seed values for `BoardState` at startup. A corrupt store never
/// aborts initialization; sanitization substitutes defaults.
pub fn load_effective_startup_state(dir: &Path) -> Result<EffectiveStartupState, String> {
    let settings = load_settings_from_dir(dir)?;

    let polling_interval_ms = settings
        .get("pollingIntervalSeconds")
        .and_then(Value::as_u64)
        .map(|secs| clamp_interval_ms(secs * 1000))
        .unwrap_or(DEFAULT_POLL_INTERVAL_MS);

    let current_user = settings
        .get("currentUser")
        .and_then(|v| serde_json::from_value::<User>(v.clone()).ok());

    let recently_accessed = settings
        .get("recentlyAccessed")
        .and_then(Value::as_array)
        .map(|ids| {
            ids.iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    Ok(EffectiveStartupState {
        polling_interval_ms,
        current_user,
        recently_accessed,
    })
}

pub fn load_settings_from_dir(dir: &Path) -> Result<Value, String> {
    let path = settings_path(dir);
    ensure_config_dir(dir)?;

    let original = if path.exists() {
        let raw = fs::read_to_string(&path)
            .map_err(|e| format!("Failed to read settings.json: {e}"))?;
        serde_json::from_str::<Value>(&raw).unwrap_or_else(|_| json!({}))
    } else {
        json!({})
    };

    let sanitized = sanitize_document(original.clone());
    if sanitized != original || !path.exists() {
        write_settings_file(&path, &sanitized)?;
    }

    Ok(sanitized)
}

pub fn save_settings_to_dir(dir: &Path, settings: Value) -> Result<Value, String> {
    let path = settings_path(dir);
    ensure_config_dir(dir)?;

    let mut merged = load_settings_from_dir(dir).unwrap_or_else(|_| default_settings());
    merge_settings(&mut merged, &settings);

    let sanitized = sanitize_document(merged);
    write_settings_file(&path, &sanitized)?;
    Ok(sanitized)
}

/// Overwrite a single top-level key and persist. Used by the session
/// and sync commands so a user change lands on disk immediately.
pub fn persist_key(dir: &Path, key: &str, value: Value) -> Result<Value, String> {
    let mut patch = Map::new();
    patch.insert(key.to_string(), value);
    save_settings_to_dir(dir, Value::Object(patch))
}

fn settings_path(dir: &Path) -> PathBuf {
    dir.join("settings.json")
}

fn ensure_config_dir(dir: &Path) -> Result<(), String> {
    fs::create_dir_all(dir).map_err(|e| format!("Failed to create config directory: {e}"))
}

fn write_settings_file(path: &Path, settings: &Value) -> Result<(), String> {
    let raw = serde_json::to_string_pretty(settings)
        .map_err(|e| format!("Failed to serialize settings: {e}"))?;
    fs::write(path, raw).map_err(|e| format!("Failed to write settings.json: {e}"))
}

fn default_settings() -> Value {
    json!({
        "schema_version": SETTINGS_SCHEMA_VERSION,
        "pollingIntervalSeconds": DEFAULT_POLL_INTERVAL_MS / 1000,
        "theme": "light",
        "sidebarOpen": true,
        "recentlyAccessed": [],
        "currentUser": Value::Null
    })
}

fn sanitize_document(input: Value) -> Value {
    let defaults = default_settings();
    let mut out = match input {
        Value::Object(map) => Value::Object(map),
        _ => Value::Object(Map::new()),
    };

    deep_merge_defaults(&mut out, &defaults);
    sanitize_settings(&mut out);

    if let Some(obj) = out.as_object_mut() {
        obj.insert("schema_version".to_string(), json!(SETTINGS_SCHEMA_VERSION));
    }

    out
}

fn deep_merge_defaults(target: &mut Value, defaults: &Value) {
    let (Some(target_obj), Some(default_obj)) = (target.as_object_mut(), defaults.as_object())
    else {
        return;
    };

    for (key, default_value) in default_obj {
        match target_obj.get_mut(key) {
            Some(existing) => {
                if existing.is_object() && default_value.is_object() {
                    deep_merge_defaults(existing, default_value);
                }
            }
            None => {
                target_obj.insert(key.clone(), default_value.clone());
            }
        }
    }
}

fn merge_settings(target: &mut Value, incoming: &Value) {
    match (target, incoming) {
        (Value::Object(target_obj), Value::Object(incoming_obj)) => {
            for (key, value) in incoming_obj {
                if let Some(existing) = target_obj.get_mut(key) {
                    merge_settings(existing, value);
                } else {
                    target_obj.insert(key.clone(), value.clone());
                }
            }
        }
        (target_slot, incoming_value) => {
            *target_slot = incoming_value.clone();
        }
    }
}

fn sanitize_settings(settings: &mut Value) {
    let Some(obj) = settings.as_object_mut() else {
        return;
    };

    clamp_u64(
        obj,
        "pollingIntervalSeconds",
        5,
        3600,
        DEFAULT_POLL_INTERVAL_MS / 1000,
    );
    sanitize_enum(obj, "theme", &["light", "dark"], "light");
    ensure_bool(obj, "sidebarOpen", true);
    sanitize_recents(obj);
    sanitize_user(obj);
}

fn clamp_u64(map: &mut Map<String, Value>, key: &str, min: u64, max: u64, default: u64) {
    let raw = map.get(key).and_then(Value::as_u64).unwrap_or(default);
    map.insert(key.to_string(), json!(raw.clamp(min, max)));
}

fn sanitize_enum(map: &mut Map<String, Value>, key: &str, allowed: &[&str], default: &str) {
    let valid = map
        .get(key)
        .and_then(Value::as_str)
        .filter(|value| allowed.contains(value))
        .unwrap_or(default);
    map.insert(key.to_string(), json!(valid));
}

fn ensure_bool(map: &mut Map<String, Value>, key: &str, default: bool) {
    let value = map.get(key).and_then(Value::as_bool).unwrap_or(default);
    map.insert(key.to_string(), json!(value));
}

/// Recents must stay strings, de-duplicated (first occurrence wins),
/// and bounded. Anything else in the stored array is discarded.
fn sanitize_recents(map: &mut Map<String, Value>) {
    let mut seen: Vec<String> = Vec::new();
    if let Some(entries) = map.get("recentlyAccessed").and_then(Value::as_array) {
        for entry in entries {
            if let Some(id) = entry.as_str() {
                if !seen.iter().any(|existing| existing == id) {
                    seen.push(id.to_string());
                }
            }
            if seen.len() == RECENTS_CAPACITY {
                break;
            }
        }
    }
    map.insert("recentlyAccessed".to_string(), json!(seen));
}

/// A stored user that does not deserialize into the `User` shape is
/// treated as absent rather than failing startup.
fn sanitize_user(map: &mut Map<String, Value>) {
    let valid = map
        .get("currentUser")
        .cloned()
        .filter(|v| serde_json::from_value::<User>(v.clone()).is_ok())
        .unwrap_or(Value::Null);
    map.insert("currentUser".to_string(), valid);
}
