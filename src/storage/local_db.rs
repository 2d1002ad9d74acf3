use crate::config::RenderConfig;
use anyhow::Result;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;

pub const DB_FILE_NAME: &str = "resultgrid.db";

pub struct LocalDb {
    conn: Arc<Mutex<Connection>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportRecord {
    pub id: i64,
    pub file_path: String,
    pub row_count: i64,
    pub byte_count: i64,
    pub created_at: String,
}

impl LocalDb {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS render_config (
                id INTEGER PRIMARY KEY CHECK (id = 1),
                config TEXT NOT NULL,
                updated_at TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE TABLE IF NOT EXISTS export_history (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                file_path TEXT NOT NULL,
                row_count INTEGER NOT NULL,
                byte_count INTEGER NOT NULL,
                created_at TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE INDEX IF NOT EXISTS idx_export_created ON export_history(created_at DESC);
            ",
        )?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub async fn save_render_config(&self, config: &RenderConfig) -> Result<()> {
        let json = serde_json::to_string(config)?;
        let db = self.conn.lock().await;
        db.execute(
            "INSERT OR REPLACE INTO render_config (id, config, updated_at) VALUES (1, ?1, datetime('now'))",
            [json],
        )?;
        tracing::info!("persisted render config");
        Ok(())
    }

    pub async fn get_render_config(&self) -> Result<Option<RenderConfig>> {
        let db = self.conn.lock().await;
        let result = db.query_row("SELECT config FROM render_config WHERE id = 1", [], |row| {
            row.get::<_, String>(0)
        });
        match result {
            Ok(json) => Ok(Some(serde_json::from_str(&json)?)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn add_export(&self, file_path: &str, row_count: usize, byte_count: u64) -> Result<i64> {
        let db = self.conn.lock().await;
        db.execute(
            "INSERT INTO export_history (file_path, row_count, byte_count) VALUES (?1, ?2, ?3)",
            rusqlite::params![file_path, row_count as i64, byte_count as i64],
        )?;
        Ok(db.last_insert_rowid())
    }

    pub async fn get_export_history(&self, limit: i64) -> Result<Vec<ExportRecord>> {
        let db = self.conn.lock().await;
        let mut stmt = db.prepare(
            "SELECT id, file_path, row_count, byte_count, created_at
             FROM export_history
             ORDER BY created_at DESC, id DESC
             LIMIT ?1",
        )?;
        let rows = stmt.query_map(rusqlite::params![limit], |row| {
            Ok(ExportRecord {
                id: row.get(0)?,
                file_path: row.get(1)?,
                row_count: row.get(2)?,
                byte_count: row.get(3)?,
                created_at: row.get(4)?,
            })
        })?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }
}

/// Open the store in the app data dir and hand it to Tauri's state.
#[cfg(feature = "desktop")]
pub async fn init_local_db(app_handle: &tauri::AppHandle) -> Result<()> {
    use tauri::Manager;

    let app_dir = app_handle.path().app_data_dir()?;
    std::fs::create_dir_all(&app_dir)?;
    let local_db = LocalDb::open(&app_dir.join(DB_FILE_NAME))?;
    app_handle.manage(local_db);
    Ok(())
}
