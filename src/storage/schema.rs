use anyhow::{Context, Result};
use sqlx::SqlitePool;

const SCHEMA_META_TABLE: &str = "
CREATE TABLE IF NOT EXISTS schema_meta (
    key   TEXT PRIMARY KEY,
    value TEXT NOT NULL
)";
const SCHEMA_VERSION_KEY: &str = "schema_version";
const SCHEMA_VERSION: u32 = 1;

pub(super) async fn ensure_schema(pool: &SqlitePool) -> Result<()> {
    ensure_schema_version(pool).await?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS instances (
            name             TEXT PRIMARY KEY,
            instance_id      TEXT,
            active           INTEGER NOT NULL DEFAULT 1,
            position         INTEGER NOT NULL DEFAULT 0,
            state            TEXT,
            soft_check_count INTEGER NOT NULL DEFAULT 0,
            notified_at      TEXT,
            toggled_at       TEXT
        )",
    )
    .execute(pool)
    .await
    .context("Failed to create instances table")?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS chat_turns (
            id         INTEGER PRIMARY KEY AUTOINCREMENT,
            role       TEXT NOT NULL,
            content    TEXT NOT NULL,
            created_at TEXT NOT NULL
        )",
    )
    .execute(pool)
    .await
    .context("Failed to create chat_turns table")?;

    Ok(())
}

async fn ensure_schema_version(pool: &SqlitePool) -> Result<()> {
    sqlx::query(SCHEMA_META_TABLE)
        .execute(pool)
        .await
        .context("create schema_meta table")?;

    let stored_version: Option<(String,)> =
        sqlx::query_as("SELECT value FROM schema_meta WHERE key = $1")
            .bind(SCHEMA_VERSION_KEY)
            .fetch_optional(pool)
            .await
            .context("load schema version")?;

    if let Some((value,)) = stored_version {
        let parsed = value
            .parse::<u32>()
            .with_context(|| format!("invalid schema version value: {value}"))?;
        anyhow::ensure!(
            parsed == SCHEMA_VERSION,
            "incompatible schema version: stored={parsed}, expected={SCHEMA_VERSION}"
        );
        return Ok(());
    }

    sqlx::query("INSERT INTO schema_meta (key, value) VALUES ($1, $2)")
        .bind(SCHEMA_VERSION_KEY)
        .bind(SCHEMA_VERSION.to_string())
        .execute(pool)
        .await
        .context("persist schema version")?;

    Ok(())
}
