//! Shared fixtures for repository tests.

use std::sync::Arc;
use tempfile::TempDir;

use crate::db::{create_pool, init, run_migrations, spawn_writer, DbPool, WriteHandle};

pub struct TestDb {
    // Keeps the database directory alive for the duration of a test.
    _dir: TempDir,
    pub pool: Arc<DbPool>,
    pub writer: WriteHandle,
}

/// A migrated database in a fresh temporary directory. Must be called from
/// within a Tokio runtime because it starts the writer task.
pub fn setup_db() -> TestDb {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("db").join("nestegg.db");
    let db_path = init(path.to_str().unwrap()).unwrap();
    let pool = create_pool(&db_path).unwrap();
    run_migrations(&pool).unwrap();
    let writer = spawn_writer((*pool).clone());
    TestDb {
        _dir: dir,
        pool,
        writer,
    }
}
