use crate::models::board::BoardState;
use crate::models::issue::Issue;
use std::future::Future;
use std::sync::{Arc, Mutex};

/// Hard floor for the poll interval; the settings page clamps to this.
pub const MIN_POLL_INTERVAL_MS: u64 = 5_000;
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 10_000;

pub fn clamp_interval_ms(ms: u64) -> u64 {
    ms.max(MIN_POLL_INTERVAL_MS)
}

pub fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// One reconciliation cycle. The fetch runs outside the lock; the
/// wholesale replacement commits under it, on top of whatever the state
/// is at commit time. On failure the previous list and sync timestamp
/// are left untouched and the caller retries on the next tick.
pub async fn sync_once<F, Fut>(
    state: &Arc<Mutex<BoardState>>,
    fetch: F,
) -> Result<usize, String>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<Vec<Issue>, String>>,
{
    if let Ok(mut lock) = state.lock() {
        lock.is_syncing = true;
    }

    let outcome = fetch().await;

    let mut lock = state
        .lock()
        .map_err(|_| "Board state lock error".to_string())?;
    lock.is_syncing = false;

    match outcome {
        Ok(issues) => {
            let count = issues.len();
            lock.issues = issues;
            lock.last_sync_at = Some(now_ms());
            Ok(count)
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issue(id: &str) -> Issue {
        Issue {
            id: id.to_string(),
            title: format!("Issue {id}"),
            description: None,
            assignee: "dana".to_string(),
            priority: "low".to_string(),
            severity: 1,
            status: "Backlog".to_string(),
            tags: vec![],
            created_at: 0,
        }
    }

    #[test]
    fn interval_clamp_enforces_the_floor() {
        assert_eq!(clamp_interval_ms(3_000), MIN_POLL_INTERVAL_MS);
        assert_eq!(clamp_interval_ms(5_000), 5_000);
        assert_eq!(clamp_interval_ms(60_000), 60_000);
    }

    #[tokio::test]
    async fn successful_tick_replaces_the_list_and_stamps_the_time() {
        let state = Arc::new(Mutex::new(BoardState::with_issues(vec![issue("stale")])));

        let count = sync_once(&state, || async { Ok(vec![issue("a"), issue("b")]) })
            .await
            .expect("sync");

        let lock = state.lock().unwrap();
        assert_eq!(count, 2);
        assert_eq!(lock.issues.len(), 2);
        assert!(lock.last_sync_at.is_some());
        assert!(!lock.is_syncing);
    }

    #[tokio::test]
    async fn failed_tick_leaves_list_and_timestamp_untouched() {
        let state = Arc::new(Mutex::new(BoardState::with_issues(vec![issue("keep")])));

        let result = sync_once(&state, || async { Err("feed unavailable".to_string()) }).await;

        assert!(result.is_err());
        let lock = state.lock().unwrap();
        assert_eq!(lock.issues.len(), 1);
        assert_eq!(lock.issues[0].id, "keep");
        assert_eq!(lock.last_sync_at, None);
        assert!(!lock.is_syncing);
    }

    #[tokio::test]
    async fn syncing_flag_is_visible_while_the_fetch_is_outstanding() {
        let state = Arc::new(Mutex::new(BoardState::default()));
        let observer = state.clone();

        sync_once(&state, move || async move {
            assert!(observer.lock().unwrap().is_syncing);
            Ok(vec![])
        })
        .await
        .expect("sync");

        assert!(!state.lock().unwrap().is_syncing);
    }
}
