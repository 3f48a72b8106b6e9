//! Database layer — migrations, queries, and cursor management.

use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use tracing::info;

use crate::errors::Result;
use crate::events::{EscrowEvent, EventRecord};

const EVENT_COLUMNS: &str = "id, event_id, event_type, project_id, actor, amount, total_funded, \
     milestone_index, milestone_count, ledger, timestamp, contract_id, tx_hash, created_at";

/// Establish a SQLite connection pool and run pending migrations.
pub async fn init_pool(database_url: &str) -> Result<SqlitePool> {
    let url = if database_url.starts_with("sqlite:") {
        database_url.to_string()
    } else {
        format!("sqlite:{database_url}?mode=rwc")
    };

    // Every connection to an in-memory database sees its own empty database.
    let max_connections = if url.contains(":memory:") { 1 } else { 5 };

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect(&url)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;
    info!("Database migrations applied successfully");
    Ok(pool)
}

// ─────────────────────────────────────────────────────────
// Cursor helpers
// ─────────────────────────────────────────────────────────

/// Read the last-seen ledger and pagination cursor.
/// Returns `(0, None)` when nothing has been persisted yet.
pub async fn load_cursor(pool: &SqlitePool) -> Result<(i64, Option<String>)> {
    let row: Option<(i64, Option<String>)> =
        sqlx::query_as("SELECT last_ledger, last_cursor FROM indexer_cursor WHERE id = 1")
            .fetch_optional(pool)
            .await?;
    Ok(row.unwrap_or((0, None)))
}

/// Persist the last-seen ledger (and optionally a pagination cursor string).
pub async fn save_cursor(
    pool: &SqlitePool,
    last_ledger: i64,
    last_cursor: Option<&str>,
) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO indexer_cursor (id, last_ledger, last_cursor) VALUES (1, ?1, ?2)
        ON CONFLICT(id) DO UPDATE SET last_ledger = excluded.last_ledger,
                                      last_cursor = excluded.last_cursor
        "#,
    )
    .bind(last_ledger)
    .bind(last_cursor)
    .execute(pool)
    .await?;
    Ok(())
}

// ─────────────────────────────────────────────────────────
// Event writes
// ─────────────────────────────────────────────────────────

/// Persist a batch of decoded events in one transaction. Events whose
/// `event_id` is already stored are ignored, so re-polling a ledger range is
/// harmless. Returns the number of new rows.
pub async fn insert_events(pool: &SqlitePool, events: &[EscrowEvent]) -> Result<usize> {
    let mut tx = pool.begin().await?;
    let mut count = 0usize;
    for ev in events {
        let rows_affected = sqlx::query(
            r#"
            INSERT OR IGNORE INTO events
                (event_id, event_type, project_id, actor, amount, total_funded,
                 milestone_index, milestone_count, ledger, timestamp, contract_id, tx_hash)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
            "#,
        )
        .bind(&ev.event_id)
        .bind(&ev.event_type)
        .bind(&ev.project_id)
        .bind(&ev.actor)
        .bind(&ev.amount)
        .bind(&ev.total_funded)
        .bind(ev.milestone_index)
        .bind(ev.milestone_count)
        .bind(ev.ledger)
        .bind(ev.timestamp)
        .bind(&ev.contract_id)
        .bind(&ev.tx_hash)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        count += rows_affected as usize;
    }
    tx.commit().await?;
    Ok(count)
}

// ─────────────────────────────────────────────────────────
// Event reads
// ─────────────────────────────────────────────────────────

/// Fetch all events for a given project in emission order.
pub async fn get_events_for_project(
    pool: &SqlitePool,
    project_id: &str,
) -> Result<Vec<EventRecord>> {
    let sql = format!(
        "SELECT {EVENT_COLUMNS} FROM events WHERE project_id = ?1 ORDER BY ledger ASC, id ASC"
    );
    let rows = sqlx::query_as::<_, EventRecord>(&sql)
        .bind(project_id)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// Fetch all events in emission order.
pub async fn get_all_events(pool: &SqlitePool) -> Result<Vec<EventRecord>> {
    let sql = format!("SELECT {EVENT_COLUMNS} FROM events ORDER BY ledger ASC, id ASC");
    let rows = sqlx::query_as::<_, EventRecord>(&sql).fetch_all(pool).await?;
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(event_id: &str, kind: &str, project: &str, ledger: i64) -> EscrowEvent {
        EscrowEvent {
            event_id: event_id.to_string(),
            event_type: kind.to_string(),
            project_id: Some(project.to_string()),
            actor: Some("GFUNDER".to_string()),
            amount: Some("10".to_string()),
            total_funded: Some("10".to_string()),
            milestone_index: None,
            milestone_count: None,
            ledger,
            timestamp: 0,
            contract_id: "CESCROW".to_string(),
            tx_hash: Some(format!("tx-{event_id}")),
        }
    }

    #[tokio::test]
    async fn inserts_are_idempotent() {
        let pool = init_pool("sqlite::memory:").await.unwrap();
        let batch = vec![
            event("e1", "project_created", "0", 5),
            event("e2", "project_funded", "0", 6),
        ];

        assert_eq!(insert_events(&pool, &batch).await.unwrap(), 2);
        assert_eq!(insert_events(&pool, &batch).await.unwrap(), 0);
        assert_eq!(get_all_events(&pool).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn project_events_are_filtered_and_ordered() {
        let pool = init_pool("sqlite::memory:").await.unwrap();
        let batch = vec![
            event("e3", "project_funded", "1", 9),
            event("e1", "project_created", "1", 3),
            event("e2", "project_created", "2", 4),
        ];
        insert_events(&pool, &batch).await.unwrap();

        let rows = get_events_for_project(&pool, "1").await.unwrap();
        let ids: Vec<&str> = rows.iter().map(|r| r.event_id.as_str()).collect();
        assert_eq!(ids, vec!["e1", "e3"]);
    }

    #[tokio::test]
    async fn cursor_round_trips() {
        let pool = init_pool("sqlite::memory:").await.unwrap();
        assert_eq!(load_cursor(&pool).await.unwrap(), (0, None));

        save_cursor(&pool, 1234, Some("page-2")).await.unwrap();
        assert_eq!(
            load_cursor(&pool).await.unwrap(),
            (1234, Some("page-2".to_string()))
        );
    }
}
