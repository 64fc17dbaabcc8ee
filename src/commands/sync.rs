use crate::api;
use crate::board::sync::{clamp_interval_ms, sync_once};
use crate::models::board::{BoardState, SyncStatus};
use serde_json::json;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tauri::Emitter;
use tokio::sync::watch;

/// Control surface for the background poll loop. Held as managed state
/// so settings changes can reschedule the timer and window teardown can
/// cancel it.
pub struct PollerHandle {
    interval_ms: watch::Sender<u64>,
    cancel: watch::Sender<bool>,
}

impl PollerHandle {
    /// Replace the tick interval. The in-flight sleep is cancelled and
    /// restarted with the new value; timers never stack.
    pub fn reschedule(&self, interval_ms: u64) {
        let _ = self.interval_ms.send(interval_ms);
    }

    /// Stop the loop. A fetch still in flight is dropped, not applied.
    pub fn cancel(&self) {
        let _ = self.cancel.send(true);
    }
}

/// Spawn the polling reconciler: an immediate sync, then one tick per
/// interval. Fetch failures are logged and retried on the next tick
/// with the previous list left untouched.
pub fn spawn_poller(
    app: tauri::AppHandle,
    state: Arc<Mutex<BoardState>>,
    initial_interval_ms: u64,
) -> PollerHandle {
    let (interval_tx, mut interval_rx) = watch::channel(clamp_interval_ms(initial_interval_ms));
    let (cancel_tx, mut cancel_rx) = watch::channel(false);

    tauri::async_runtime::spawn(async move {
        loop {
            tokio::select! {
                changed = cancel_rx.changed() => {
                    if changed.is_err() || *cancel_rx.borrow() {
                        break;
                    }
                }
                result = sync_once(&state, api::fetch_issues) => {
                    match result {
                        Ok(count) => announce_synced(&app, &state, count),
                        Err(e) => log::warn!("Polling fetch failed: {e}"),
                    }
                }
            }

            // Wait out the interval; a reschedule restarts the sleep.
            loop {
                let interval = *interval_rx.borrow();
                tokio::select! {
                    _ = tokio::time::sleep(Duration::from_millis(interval)) => break,
                    changed = interval_rx.changed() => {
                        if changed.is_err() {
                            return;
                        }
                    }
                    changed = cancel_rx.changed() => {
                        if changed.is_err() || *cancel_rx.borrow() {
                            return;
                        }
                    }
                }
            }
        }
    });

    PollerHandle {
        interval_ms: interval_tx,
        cancel: cancel_tx,
    }
}

fn announce_synced(app: &tauri::AppHandle, state: &Arc<Mutex<BoardState>>, count: usize) {
    let last_sync_at = state.lock().ok().and_then(|lock| lock.last_sync_at);
    let _ = app.emit(
        "issues_synced",
        json!({ "count": count, "lastSyncAt": last_sync_at }),
    );
}

#[tauri::command]
pub async fn sync_now(
    state: tauri::State<'_, Arc<Mutex<BoardState>>>,
    app: tauri::AppHandle,
) -> Result<SyncStatus, String> {
    match sync_once(state.inner(), api::fetch_issues).await {
        Ok(count) => announce_synced(&app, state.inner(), count),
        // Same policy as the timer path: keep the last-known-good list
        // and let the next tick retry.
        Err(e) => log::warn!("Manual sync failed: {e}"),
    }
    get_sync_status_internal(state.inner())
}

#[tauri::command]
pub async fn get_sync_status(
    state: tauri::State<'_, Arc<Mutex<BoardState>>>,
) -> Result<SyncStatus, String> {
    get_sync_status_internal(state.inner())
}

#[tauri::command]
pub async fn set_polling_interval(
    seconds: u64,
    state: tauri::State<'_, Arc<Mutex<BoardState>>>,
    poller: tauri::State<'_, PollerHandle>,
    app: tauri::AppHandle,
) -> Result<SyncStatus, String> {
    let interval_ms = apply_polling_interval(state.inner(), seconds)?;

    let dir = crate::commands::settings::config_dir(&app)?;
    crate::commands::settings::persist_key(
        &dir,
        "pollingIntervalSeconds",
        json!(interval_ms / 1000),
    )?;

    poller.reschedule(interval_ms);
    get_sync_status_internal(state.inner())
}

/// Clamp and record the new interval. Returns the effective value in
/// milliseconds.
pub fn apply_polling_interval(state: &Arc<Mutex<BoardState>>, seconds: u64) -> Result<u64, String> {
    let interval_ms = clamp_interval_ms(seconds.saturating_mul(1000));
    let mut lock = state
        .lock()
        .map_err(|_| "Board state lock error".to_string())?;
    lock.polling_interval_ms = interval_ms;
    Ok(interval_ms)
}

pub fn get_sync_status_internal(state: &Arc<Mutex<BoardState>>) -> Result<SyncStatus, String> {
    let lock = state
        .lock()
        .map_err(|_| "Board state lock error".to_string())?;
    Ok(SyncStatus {
        last_sync_at: lock.last_sync_at,
        is_syncing: lock.is_syncing,
        polling_interval_ms: lock.polling_interval_ms,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interval_below_the_floor_is_clamped() {
        let state = Arc::new(Mutex::new(BoardState::default()));
        let effective = apply_polling_interval(&state, 3).expect("set interval");
        assert_eq!(effective, 5_000);
        assert_eq!(state.lock().unwrap().polling_interval_ms, 5_000);
    }

    #[test]
    fn interval_above_the_floor_is_taken_as_is() {
        let state = Arc::new(Mutex::new(BoardState::default()));
        let effective = apply_polling_interval(&state, 30).expect("set interval");
        assert_eq!(effective, 30_000);
    }

    #[test]
    fn status_reflects_the_current_state() {
        let state = Arc::new(Mutex::new(BoardState::default()));
        {
            let mut lock = state.lock().unwrap();
            lock.last_sync_at = Some(42);
            lock.polling_interval_ms = 10_000;
        }
        let status = get_sync_status_internal(&state).expect("status");
        assert_eq!(status.last_sync_at, Some(42));
        assert!(!status.is_syncing);
        assert_eq!(status.polling_interval_ms, 10_000);
    }
}
