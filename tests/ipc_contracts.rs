use issuelens_lib::board::moves::MoveDirection;
use issuelens_lib::board::sync::sync_once;
use issuelens_lib::board::undo;
use issuelens_lib::commands::board::{
    apply_directional_move, apply_drag_drop, apply_resolve, apply_undo, board_view,
    get_issue_internal,
};
use issuelens_lib::commands::session::{
    login_internal, logout_internal, record_issue_access_internal,
};
use issuelens_lib::commands::settings::{
    load_effective_startup_state, load_settings_from_dir, save_settings_to_dir,
};
use issuelens_lib::commands::sync::{apply_polling_interval, get_sync_status_internal};
use issuelens_lib::models::board::BoardState;
use issuelens_lib::models::issue::{Issue, IssueStatus};
use issuelens_lib::models::user::{User, UserRole};
use serde_json::json;
use std::fs;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

fn issue(id: &str, status: &str) -> Issue {
    Issue {
        id: id.to_string(),
        title: format!("Issue {id}"),
        description: Some("A reproducible defect".to_string()),
        assignee: "Dana Whitfield".to_string(),
        priority: "medium".to_string(),
        severity: 2,
        status: status.to_string(),
        tags: vec!["ui".to_string()],
        created_at: 1_714_306_800_000,
    }
}

fn board_with(issues: Vec<Issue>, user: Option<User>) -> Arc<Mutex<BoardState>> {
    let mut state = BoardState::with_issues(issues);
    state.current_user = user;
    Arc::new(Mutex::new(state))
}

fn admin() -> Option<User> {
    Some(User {
        name: "Dana Whitfield".to_string(),
        role: UserRole::Admin,
    })
}

fn contributor() -> Option<User> {
    Some(User {
        name: "Kim Osei".to_string(),
        role: UserRole::Contributor,
    })
}

#[tokio::test]
async fn directional_move_then_undo_restores_the_original_list() {
    let original = vec![issue("1", "Backlog"), issue("2", "Backlog")];
    let state = board_with(original.clone(), admin());

    let moved = apply_directional_move(&state, "1", MoveDirection::Right).expect("move");
    assert!(moved.changed);
    assert_eq!(moved.issues[0].status, "In Progress");
    assert_eq!(moved.issues[1].status, "Backlog");
    assert!(moved.undo.is_some());

    let (restored, _) = apply_undo(&state).expect("undo");
    assert!(restored.changed);
    assert_eq!(restored.issues, original);
}

#[tokio::test]
async fn edge_moves_and_unknown_ids_are_silent_no_ops() {
    let state = board_with(vec![issue("1", "Backlog"), issue("2", "Done")], admin());

    for (id, direction) in [
        ("1", MoveDirection::Left),
        ("2", MoveDirection::Right),
        ("missing", MoveDirection::Right),
    ] {
        let update = apply_directional_move(&state, id, direction).expect("command ok");
        assert!(!update.changed);
        assert!(update.undo.is_none());
    }
    assert!(state.lock().unwrap().pending_undo.is_none());
}

#[tokio::test]
async fn drag_drop_preserves_untouched_order_across_all_columns() {
    let state = board_with(
        vec![
            issue("a", "Backlog"),
            issue("b", "Backlog"),
            issue("c", "Backlog"),
            issue("p", "In Progress"),
            issue("q", "In Progress"),
            issue("z", "Done"),
        ],
        admin(),
    );

    let update = apply_drag_drop(&state, "Backlog", 1, "In Progress", 1, "b").expect("move");
    assert!(update.changed);

    let in_column = |status: IssueStatus| -> Vec<String> {
        update
            .issues
            .iter()
            .filter(|i| i.column() == Some(status))
            .map(|i| i.id.clone())
            .collect()
    };
    assert_eq!(in_column(IssueStatus::Backlog), ["a", "c"]);
    assert_eq!(in_column(IssueStatus::InProgress), ["p", "b", "q"]);
    assert_eq!(in_column(IssueStatus::Done), ["z"]);
}

#[tokio::test]
async fn drag_drop_to_the_same_slot_produces_no_undo_record() {
    let state = board_with(vec![issue("a", "Backlog"), issue("b", "Backlog")], admin());

    let update = apply_drag_drop(&state, "Backlog", 0, "Backlog", 0, "a").expect("command ok");
    assert!(!update.changed);
    assert!(update.undo.is_none());
    assert!(state.lock().unwrap().pending_undo.is_none());
}

#[tokio::test]
async fn non_admin_moves_are_complete_no_ops() {
    let original = vec![issue("1", "Backlog"), issue("2", "In Progress")];

    for user in [contributor(), None] {
        let state = board_with(original.clone(), user);

        let directional =
            apply_directional_move(&state, "1", MoveDirection::Right).expect("command ok");
        let dragged =
            apply_drag_drop(&state, "In Progress", 0, "Done", 0, "2").expect("command ok");
        let resolved = apply_resolve(&state, "1").expect("command ok");

        for update in [directional, dragged, resolved] {
            assert!(!update.changed);
            assert!(update.undo.is_none());
        }
        let lock = state.lock().unwrap();
        assert_eq!(lock.issues, original);
        assert!(lock.pending_undo.is_none());
    }
}

#[tokio::test]
async fn a_role_change_takes_effect_on_the_next_invocation() {
    let state = board_with(vec![issue("1", "Backlog")], contributor());

    let denied = apply_directional_move(&state, "1", MoveDirection::Right).expect("command ok");
    assert!(!denied.changed);

    state.lock().unwrap().current_user = admin();

    let admitted = apply_directional_move(&state, "1", MoveDirection::Right).expect("command ok");
    assert!(admitted.changed);
}

#[tokio::test]
async fn failed_poll_preserves_state_and_a_later_success_updates_it() {
    let state = board_with(vec![issue("keep", "Backlog")], None);

    let failed = sync_once(&state, || async { Err("feed offline".to_string()) }).await;
    assert!(failed.is_err());
    {
        let status = get_sync_status_internal(&state).expect("status");
        assert_eq!(status.last_sync_at, None);
        assert!(!status.is_syncing);
        assert_eq!(state.lock().unwrap().issues[0].id, "keep");
    }

    let fetched = vec![issue("fresh-1", "Backlog"), issue("fresh-2", "Done")];
    let replaced = {
        let fetched = fetched.clone();
        sync_once(&state, move || async move { Ok(fetched) })
            .await
            .expect("sync")
    };
    assert_eq!(replaced, 2);

    let lock = state.lock().unwrap();
    assert_eq!(lock.issues, fetched);
    assert!(lock.last_sync_at.is_some());
}

#[tokio::test]
async fn a_poll_tick_overwrites_an_uncommitted_local_move() {
    // Last poll wins: the reconciler replaces the list wholesale with
    // no merge against optimistic local edits.
    let remote = vec![issue("1", "Backlog"), issue("2", "Backlog")];
    let state = board_with(remote.clone(), admin());

    let moved = apply_directional_move(&state, "1", MoveDirection::Right).expect("move");
    assert_eq!(moved.issues[0].status, "In Progress");

    let remote_copy = remote.clone();
    sync_once(&state, move || async move { Ok(remote_copy) })
        .await
        .expect("sync");

    assert_eq!(state.lock().unwrap().issues, remote);
}

#[tokio::test]
async fn polling_interval_below_the_minimum_is_clamped() {
    let state = board_with(vec![], None);
    assert_eq!(apply_polling_interval(&state, 3).expect("set"), 5_000);
    assert_eq!(apply_polling_interval(&state, 12).expect("set"), 12_000);
    assert_eq!(
        get_sync_status_internal(&state)
            .expect("status")
            .polling_interval_ms,
        12_000
    );
}

#[tokio::test]
async fn undo_expiry_only_clears_its_own_action() {
    let state = board_with(vec![issue("1", "Backlog"), issue("2", "Backlog")], admin());

    let first = apply_directional_move(&state, "1", MoveDirection::Right)
        .expect("move")
        .undo
        .expect("armed");
    let second = apply_directional_move(&state, "2", MoveDirection::Right)
        .expect("move")
        .undo
        .expect("armed");

    // The first move's timer fires after the second move replaced it.
    assert!(!undo::expire(&state, first.action_id));
    assert!(state.lock().unwrap().pending_undo.is_some());

    // Expiry removes the opportunity without applying anything.
    assert!(undo::expire(&state, second.action_id));
    let lock = state.lock().unwrap();
    assert!(lock.pending_undo.is_none());
    assert_eq!(lock.issues[1].status, "In Progress");
}

#[tokio::test]
async fn settings_round_trip_and_merge_partial_updates() {
    let tmp = TempDir::new().expect("temp dir");

    let initial = load_settings_from_dir(tmp.path()).expect("load settings");
    assert_eq!(initial["pollingIntervalSeconds"], json!(10));
    assert_eq!(initial["sidebarOpen"], json!(true));

    let saved = save_settings_to_dir(
        tmp.path(),
        json!({ "theme": "dark", "pollingIntervalSeconds": 3 }),
    )
    .expect("save settings");

    assert_eq!(saved["theme"], json!("dark"));
    // Below-minimum interval is clamped on write.
    assert_eq!(saved["pollingIntervalSeconds"], json!(5));
    assert_eq!(saved["sidebarOpen"], initial["sidebarOpen"]);
}

#[tokio::test]
async fn a_corrupt_settings_file_is_replaced_with_defaults() {
    let tmp = TempDir::new().expect("temp dir");
    fs::write(tmp.path().join("settings.json"), "{not json at all").expect("write corrupt file");

    let loaded = load_settings_from_dir(tmp.path()).expect("load settings");
    assert_eq!(loaded["pollingIntervalSeconds"], json!(10));
    assert_eq!(loaded["currentUser"], serde_json::Value::Null);

    let startup = load_effective_startup_state(tmp.path()).expect("startup state");
    assert_eq!(startup.polling_interval_ms, 10_000);
    assert!(startup.current_user.is_none());
    assert!(startup.recently_accessed.is_empty());
}

#[tokio::test]
async fn login_persists_and_logout_clears_the_stored_user() {
    let tmp = TempDir::new().expect("temp dir");
    let state = board_with(vec![], None);

    let user = login_internal(&state, tmp.path(), "Dana Whitfield", "Admin").expect("login");
    assert_eq!(user.role, UserRole::Admin);

    let startup = load_effective_startup_state(tmp.path()).expect("startup state");
    assert_eq!(startup.current_user, Some(user));

    logout_internal(&state, tmp.path()).expect("logout");
    let startup = load_effective_startup_state(tmp.path()).expect("startup state");
    assert!(startup.current_user.is_none());
    assert!(state.lock().unwrap().current_user.is_none());
}

#[tokio::test]
async fn login_rejects_blank_names_and_unknown_roles() {
    let tmp = TempDir::new().expect("temp dir");
    let state = board_with(vec![], None);

    assert!(login_internal(&state, tmp.path(), "   ", "admin").is_err());
    assert!(login_internal(&state, tmp.path(), "Dana", "owner").is_err());
}

#[tokio::test]
async fn recents_evict_the_oldest_at_capacity_and_persist() {
    let tmp = TempDir::new().expect("temp dir");
    let state = board_with(vec![], None);

    for id in ["a", "b", "c", "d", "e"] {
        record_issue_access_internal(&state, tmp.path(), id).expect("record access");
    }
    let recents = record_issue_access_internal(&state, tmp.path(), "f").expect("record access");
    assert_eq!(recents, ["f", "e", "d", "c", "b"]);

    // Revisiting moves to the front without duplicating.
    let recents = record_issue_access_internal(&state, tmp.path(), "d").expect("record access");
    assert_eq!(recents, ["d", "f", "e", "c", "b"]);

    let startup = load_effective_startup_state(tmp.path()).expect("startup state");
    assert_eq!(startup.recently_accessed, recents);
}

#[tokio::test]
async fn issue_detail_lookup_and_filtered_board_view() {
    let mut tagged = issue("1", "Backlog");
    tagged.tags = vec!["search".to_string()];
    let state = board_with(vec![tagged, issue("2", "In Progress")], None);

    let found = get_issue_internal(&state, "1").expect("issue");
    assert_eq!(found.id, "1");
    assert!(get_issue_internal(&state, "missing").is_err());

    let view = board_view(&state, Some("search"), None, None).expect("view");
    assert_eq!(view.columns.len(), 3);
    assert_eq!(view.columns[0].issues.len(), 1);
    assert_eq!(view.columns[1].issues.len(), 0);
}
