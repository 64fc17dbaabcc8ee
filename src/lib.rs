pub mod api;
pub mod board;
pub mod commands;
pub mod models;

use commands::board::{
    get_board, get_issue, move_issue, reorder_issue, resolve_issue, undo_move, update_issue,
};
use commands::session::{
    current_user, login, logout, record_issue_access, recently_accessed, set_sidebar_open,
};
use commands::settings::{get_settings, save_settings};
use commands::sync::{get_sync_status, set_polling_interval, sync_now, PollerHandle};
use models::board::BoardState;
use std::sync::{Arc, Mutex};
use tauri::Manager;

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    let _ = env_logger::try_init();

    tauri::Builder::default()
        .plugin(tauri_plugin_opener::init())
        .setup(|app| {
            let seeded = api::seed_issues().unwrap_or_default();
            let mut board = BoardState::with_issues(seeded);

            // Persisted preferences; a corrupt store falls back to
            // defaults rather than aborting startup.
            if let Ok(dir) = commands::settings::config_dir(app.handle()) {
                match commands::settings::load_effective_startup_state(&dir) {
                    Ok(startup) => {
                        board.polling_interval_ms = startup.polling_interval_ms;
                        board.current_user = startup.current_user;
                        board.recently_accessed = startup.recently_accessed;
                    }
                    Err(e) => log::warn!("Could not load persisted preferences: {e}"),
                }
            }

            let interval_ms = board.polling_interval_ms;
            let state = Arc::new(Mutex::new(board));
            app.manage(state.clone());

            let poller = commands::sync::spawn_poller(app.handle().clone(), state, interval_ms);
            app.manage(poller);

            Ok(())
        })
        .on_window_event(|window, event| {
            if let tauri::WindowEvent::Destroyed = event {
                // Stop polling with the board view; a response landing
                // after this point is discarded, not applied.
                if let Some(poller) = window.app_handle().try_state::<PollerHandle>() {
                    poller.cancel();
                }
            }
        })
        .invoke_handler(tauri::generate_handler![
            get_board,
            get_issue,
            move_issue,
            reorder_issue,
            undo_move,
            resolve_issue,
            update_issue,
            sync_now,
            get_sync_status,
            set_polling_interval,
            get_settings,
            save_settings,
            login,
            logout,
            current_user,
            record_issue_access,
            recently_accessed,
            set_sidebar_open,
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
