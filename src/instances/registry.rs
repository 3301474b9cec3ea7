use super::types::{InstanceRecord, InstanceState};
use crate::config::InstanceEntry;
use crate::schedule::parse_rfc3339;
use crate::storage::Database;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnection, SqliteRow};
use sqlx::Row;

const SELECT_COLUMNS: &str = "SELECT name, instance_id, active, position, state, soft_check_count, notified_at, toggled_at
     FROM instances";

/// Durable table of watched instances.
///
/// Rows are never deleted: an instance dropped from configuration is only
/// flagged inactive so its notification history survives config edits.
#[derive(Clone)]
pub struct InstanceRegistry {
    db: Database,
}

impl InstanceRegistry {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Make the active set exactly `entries`, in their configured order.
    ///
    /// Existing rows keep their observation history; a supplied id replaces
    /// the stored one, an absent id leaves it alone. Idempotent.
    pub async fn reconcile(&self, entries: &[InstanceEntry]) -> Result<()> {
        let mut tx = self
            .db
            .pool()
            .begin()
            .await
            .context("begin registry reconcile")?;

        sqlx::query("UPDATE instances SET active = 0")
            .execute(&mut *tx)
            .await
            .context("deactivate instances")?;

        for (position, entry) in entries.iter().enumerate() {
            let position = i64::try_from(position).unwrap_or(i64::MAX);
            sqlx::query("INSERT OR IGNORE INTO instances (name, active, position) VALUES ($1, 1, $2)")
                .bind(&entry.name)
                .bind(position)
                .execute(&mut *tx)
                .await
                .with_context(|| format!("insert instance {}", entry.name))?;

            sqlx::query(
                "UPDATE instances
                 SET active = 1, position = $2, instance_id = COALESCE($3, instance_id)
                 WHERE name = $1",
            )
            .bind(&entry.name)
            .bind(position)
            .bind(entry.id.as_deref())
            .execute(&mut *tx)
            .await
            .with_context(|| format!("activate instance {}", entry.name))?;
        }

        tx.commit().await.context("commit registry reconcile")?;
        tracing::info!(active = entries.len(), "instance registry reconciled");
        Ok(())
    }

    /// Cloud id for an exact name, or else for the first configured name
    /// starting with `query`. `None` when nothing matches or the match has
    /// no id yet.
    pub async fn resolve_id(&self, query: &str) -> Result<Option<String>> {
        let mut conn = self.db.pool().acquire().await?;
        Ok(resolve(&mut conn, query)
            .await?
            .and_then(|record| record.instance_id))
    }

    pub async fn resolve(&self, query: &str) -> Result<Option<InstanceRecord>> {
        let mut conn = self.db.pool().acquire().await?;
        resolve(&mut conn, query).await
    }

    /// Active instances in name order.
    pub async fn active(&self) -> Result<Vec<InstanceRecord>> {
        let mut conn = self.db.pool().acquire().await?;
        list_active(&mut conn).await
    }

    /// Every row, active ones first in configured order.
    pub async fn all(&self) -> Result<Vec<InstanceRecord>> {
        let rows = sqlx::query(&format!(
            "{SELECT_COLUMNS} ORDER BY active DESC, position ASC, name ASC"
        ))
        .fetch_all(self.db.pool())
        .await
        .context("list instances")?;

        rows.iter().map(map_instance_row).collect()
    }

    pub async fn get(&self, name: &str) -> Result<Option<InstanceRecord>> {
        let mut conn = self.db.pool().acquire().await?;
        fetch(&mut conn, name).await
    }
}

pub(crate) async fn list_active(conn: &mut SqliteConnection) -> Result<Vec<InstanceRecord>> {
    let rows = sqlx::query(&format!("{SELECT_COLUMNS} WHERE active = 1 ORDER BY name ASC"))
        .fetch_all(&mut *conn)
        .await
        .context("list active instances")?;

    rows.iter().map(map_instance_row).collect()
}

pub(crate) async fn fetch(conn: &mut SqliteConnection, name: &str) -> Result<Option<InstanceRecord>> {
    let row = sqlx::query(&format!("{SELECT_COLUMNS} WHERE name = $1"))
        .bind(name)
        .fetch_optional(&mut *conn)
        .await
        .with_context(|| format!("load instance {name}"))?;

    row.map(|r| map_instance_row(&r)).transpose()
}

pub(crate) async fn resolve(
    conn: &mut SqliteConnection,
    query: &str,
) -> Result<Option<InstanceRecord>> {
    let query = query.trim();
    if query.is_empty() {
        return Ok(None);
    }

    let rows = sqlx::query(&format!(
        "{SELECT_COLUMNS} WHERE active = 1 ORDER BY position ASC, name ASC"
    ))
    .fetch_all(&mut *conn)
    .await
    .context("load instances for resolution")?;
    let records = rows
        .iter()
        .map(map_instance_row)
        .collect::<Result<Vec<_>>>()?;

    if let Some(exact) = records.iter().find(|record| record.name == query) {
        return Ok(Some(exact.clone()));
    }
    Ok(records
        .into_iter()
        .find(|record| record.name.starts_with(query)))
}

pub(crate) async fn store_observation(
    conn: &mut SqliteConnection,
    name: &str,
    state: Option<&InstanceState>,
    soft_check_count: u32,
    notified_at: Option<DateTime<Utc>>,
) -> Result<()> {
    sqlx::query(
        "UPDATE instances
         SET state = $2, soft_check_count = $3, notified_at = $4
         WHERE name = $1",
    )
    .bind(name)
    .bind(state.map(InstanceState::as_str))
    .bind(i64::from(soft_check_count))
    .bind(notified_at.as_ref().map(DateTime::to_rfc3339))
    .execute(&mut *conn)
    .await
    .with_context(|| format!("store observation for {name}"))?;
    Ok(())
}

pub(crate) async fn mark_toggled(
    conn: &mut SqliteConnection,
    name: &str,
    at: DateTime<Utc>,
) -> Result<()> {
    sqlx::query("UPDATE instances SET toggled_at = $2 WHERE name = $1")
        .bind(name)
        .bind(at.to_rfc3339())
        .execute(&mut *conn)
        .await
        .with_context(|| format!("record toggle for {name}"))?;
    Ok(())
}

fn map_instance_row(row: &SqliteRow) -> Result<InstanceRecord> {
    let state_raw: Option<String> = row.try_get("state")?;
    let soft_check_count: i64 = row.try_get("soft_check_count")?;
    let notified_raw: Option<String> = row.try_get("notified_at")?;
    let toggled_raw: Option<String> = row.try_get("toggled_at")?;
    let active: i64 = row.try_get("active")?;

    Ok(InstanceRecord {
        name: row.try_get("name")?,
        instance_id: row.try_get("instance_id")?,
        active: active != 0,
        position: row.try_get("position")?,
        state: state_raw.as_deref().map(InstanceState::parse),
        soft_check_count: u32::try_from(soft_check_count).unwrap_or(0),
        notified_at: notified_raw.as_deref().map(parse_rfc3339).transpose()?,
        toggled_at: toggled_raw.as_deref().map(parse_rfc3339).transpose()?,
    })
}
