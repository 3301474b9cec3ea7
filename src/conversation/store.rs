use super::types::ConversationTurn;
use crate::llm::Role;
use crate::storage::Database;
use anyhow::{Context, Result};
use chrono::Utc;
use sqlx::Row;
use sqlx::sqlite::{SqliteConnection, SqliteRow};
use std::future::Future;
use std::pin::Pin;
use std::str::FromStr;

/// Append-only, strictly ordered log of chat turns.
pub trait ConversationStore: Send + Sync {
    fn append<'a>(
        &'a self,
        role: Role,
        content: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<ConversationTurn>> + Send + 'a>>;

    /// Persist a user turn and its reply together, or neither.
    fn append_exchange<'a>(
        &'a self,
        user: &'a str,
        assistant: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>>;

    /// Last `n` turns, oldest first.
    fn tail<'a>(
        &'a self,
        n: usize,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<ConversationTurn>>> + Send + 'a>>;

    /// Drop everything but the newest `keep_last` turns. Returns rows deleted.
    fn trim<'a>(
        &'a self,
        keep_last: usize,
    ) -> Pin<Box<dyn Future<Output = Result<u64>> + Send + 'a>>;

    fn count<'a>(&'a self) -> Pin<Box<dyn Future<Output = Result<u64>> + Send + 'a>>;
}

/// SQLite-backed conversation log sharing the process database.
pub struct SqliteConversationStore {
    db: Database,
}

impl SqliteConversationStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

async fn insert_turn(
    conn: &mut SqliteConnection,
    role: Role,
    content: &str,
) -> Result<ConversationTurn> {
    let created_at = Utc::now().to_rfc3339();
    let result = sqlx::query("INSERT INTO chat_turns (role, content, created_at) VALUES ($1, $2, $3)")
        .bind(role.as_ref())
        .bind(content)
        .bind(&created_at)
        .execute(&mut *conn)
        .await
        .context("insert chat turn")?;

    Ok(ConversationTurn {
        sequence_id: result.last_insert_rowid(),
        role,
        content: content.to_string(),
        created_at,
    })
}

fn map_turn_row(row: &SqliteRow) -> Result<ConversationTurn> {
    let role_raw: String = row.try_get("role")?;
    Ok(ConversationTurn {
        sequence_id: row.try_get("id")?,
        role: Role::from_str(&role_raw)
            .map_err(|e| anyhow::anyhow!("unknown chat role in database: {role_raw} ({e:?})"))?,
        content: row.try_get("content")?,
        created_at: row.try_get("created_at")?,
    })
}

fn as_limit(n: usize) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

impl ConversationStore for SqliteConversationStore {
    fn append<'a>(
        &'a self,
        role: Role,
        content: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<ConversationTurn>> + Send + 'a>> {
        Box::pin(async move {
            let mut conn = self.db.pool().acquire().await?;
            insert_turn(&mut conn, role, content).await
        })
    }

    fn append_exchange<'a>(
        &'a self,
        user: &'a str,
        assistant: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>> {
        Box::pin(async move {
            let mut tx = self.db.pool().begin().await.context("begin chat exchange")?;
            insert_turn(&mut tx, Role::User, user).await?;
            insert_turn(&mut tx, Role::Assistant, assistant).await?;
            tx.commit().await.context("commit chat exchange")?;
            Ok(())
        })
    }

    fn tail<'a>(
        &'a self,
        n: usize,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<ConversationTurn>>> + Send + 'a>> {
        Box::pin(async move {
            if n == 0 {
                return Ok(Vec::new());
            }
            let rows = sqlx::query(
                "SELECT id, role, content, created_at
                 FROM chat_turns
                 ORDER BY id DESC
                 LIMIT $1",
            )
            .bind(as_limit(n))
            .fetch_all(self.db.pool())
            .await
            .context("load chat tail")?;

            let mut turns = rows.iter().map(map_turn_row).collect::<Result<Vec<_>>>()?;
            turns.reverse();
            Ok(turns)
        })
    }

    fn trim<'a>(
        &'a self,
        keep_last: usize,
    ) -> Pin<Box<dyn Future<Output = Result<u64>> + Send + 'a>> {
        Box::pin(async move {
            let result = sqlx::query(
                "DELETE FROM chat_turns
                 WHERE id NOT IN (SELECT id FROM chat_turns ORDER BY id DESC LIMIT $1)",
            )
            .bind(as_limit(keep_last))
            .execute(self.db.pool())
            .await
            .context("trim chat turns")?;
            Ok(result.rows_affected())
        })
    }

    fn count<'a>(&'a self) -> Pin<Box<dyn Future<Output = Result<u64>> + Send + 'a>> {
        Box::pin(async move {
            let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM chat_turns")
                .fetch_one(self.db.pool())
                .await
                .context("count chat turns")?;
            Ok(u64::try_from(count).unwrap_or(0))
        })
    }
}
