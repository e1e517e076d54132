//! Shared helpers for the web API integration tests.

#![allow(dead_code)]

use axum_test::TestServer;
use cabinet::config::SessionConfig;
use cabinet::web::handlers::AppState;
use cabinet::web::router::create_router;
use cabinet::{Database, FilesystemLayout};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

/// Create a test server with an in-memory database and a temporary upload root.
///
/// The `TempDir` must be kept alive for as long as the server is used.
pub async fn create_test_server() -> (TestServer, Arc<AppState>, PathBuf, TempDir) {
    let temp = TempDir::new().expect("Failed to create temp dir");
    let upload_root = temp.path().join("uploads");

    let db = Database::open_in_memory()
        .await
        .expect("Failed to create test database");
    let layout = FilesystemLayout::new(&upload_root);
    layout.init().await.expect("Failed to create upload root");

    let app_state = Arc::new(AppState::new(db, layout, &SessionConfig::default()));
    let router = create_router(app_state.clone(), &[]);
    let server = TestServer::new(router).expect("Failed to create test server");

    (server, app_state, upload_root, temp)
}

/// Count regular files below a directory.
pub fn count_files(dir: &Path) -> usize {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return 0;
    };
    entries
        .flatten()
        .map(|entry| {
            let path = entry.path();
            if path.is_dir() {
                count_files(&path)
            } else {
                1
            }
        })
        .sum()
}
