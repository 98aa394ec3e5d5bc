use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::{Connection, OpenFlags, params};

use crate::model::{ClickEvent, QueryRecord};

pub const CLICK_THROUGH_MESSAGE_TYPE: &str = "CLICK_THROUGH";

pub fn open_store(db_path: &Path) -> Result<Connection> {
    let connection = Connection::open(db_path)
        .with_context(|| format!("failed to open store: {}", db_path.display()))?;
    configure_connection(&connection)?;
    Ok(connection)
}

pub fn open_store_read_only(db_path: &Path) -> Result<Connection> {
    Connection::open_with_flags(
        db_path,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )
    .with_context(|| format!("failed to open store read-only: {}", db_path.display()))
}

fn configure_connection(connection: &Connection) -> Result<()> {
    connection
        .pragma_update(None, "journal_mode", "WAL")
        .context("failed to set journal_mode=WAL")?;
    connection
        .pragma_update(None, "synchronous", "NORMAL")
        .context("failed to set synchronous=NORMAL")?;
    Ok(())
}

pub fn ensure_schema(connection: &Connection) -> Result<()> {
    connection
        .execute_batch(
            "
            CREATE TABLE IF NOT EXISTS ubi_queries (
              query_id TEXT PRIMARY KEY,
              user_query TEXT NOT NULL,
              object_ids TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS ubi_events (
              event_seq INTEGER PRIMARY KEY AUTOINCREMENT,
              query_id TEXT NOT NULL,
              message_type TEXT NOT NULL,
              action_name TEXT NOT NULL,
              object_id TEXT NOT NULL,
              position INTEGER NOT NULL,
              timestamp TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_ubi_events_message_type
              ON ubi_events(message_type);
            ",
        )
        .context("failed to ensure store schema")
}

pub fn drop_tables(connection: &Connection) -> Result<()> {
    connection
        .execute_batch(
            "
            DROP TABLE IF EXISTS ubi_queries;
            DROP TABLE IF EXISTS ubi_events;
            ",
        )
        .context("failed to drop store tables")
}

pub fn upsert_query(connection: &Connection, record: &QueryRecord) -> Result<()> {
    let object_ids = serde_json::to_string(&record.shown_document_ids)
        .context("failed to serialize shown document ids")?;

    connection
        .execute(
            "
            INSERT INTO ubi_queries (query_id, user_query, object_ids)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(query_id) DO UPDATE SET
              user_query = excluded.user_query,
              object_ids = excluded.object_ids
            ",
            params![record.query_id, record.query_text, object_ids],
        )
        .with_context(|| format!("failed to upsert query: {}", record.query_id))?;

    Ok(())
}

pub fn insert_event(connection: &Connection, event: &ClickEvent, message_type: &str) -> Result<()> {
    connection
        .execute(
            "
            INSERT INTO ubi_events
              (query_id, message_type, action_name, object_id, position, timestamp)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ",
            params![
                event.query_id,
                message_type,
                event.action,
                event.document_id,
                event.position as i64,
                event.timestamp,
            ],
        )
        .with_context(|| format!("failed to insert event for query: {}", event.query_id))?;

    Ok(())
}

// The limit caps how many records are fetched, not corpus completeness.
pub fn fetch_corpus(
    connection: &Connection,
    limit: usize,
) -> Result<(Vec<QueryRecord>, Vec<ClickEvent>)> {
    let queries = fetch_queries(connection, limit)?;
    let events = fetch_click_through_events(connection, limit)?;
    Ok((queries, events))
}

fn fetch_queries(connection: &Connection, limit: usize) -> Result<Vec<QueryRecord>> {
    let mut statement = connection
        .prepare(
            "
            SELECT query_id, user_query, object_ids
            FROM ubi_queries
            ORDER BY query_id
            LIMIT ?1
            ",
        )
        .context("failed to prepare query fetch")?;

    let mut rows = statement
        .query(params![limit as i64])
        .context("failed to fetch queries")?;

    let mut out = Vec::new();
    while let Some(row) = rows.next()? {
        let query_id: String = row.get(0)?;
        let object_ids: String = row.get(2)?;
        let shown_document_ids: Vec<String> = serde_json::from_str(&object_ids)
            .with_context(|| format!("corrupt object_ids for query: {query_id}"))?;

        out.push(QueryRecord {
            query_id,
            query_text: row.get(1)?,
            shown_document_ids,
        });
    }

    Ok(out)
}

fn fetch_click_through_events(connection: &Connection, limit: usize) -> Result<Vec<ClickEvent>> {
    let mut statement = connection
        .prepare(
            "
            SELECT query_id, action_name, object_id, position, timestamp
            FROM ubi_events
            WHERE message_type = ?1
            ORDER BY event_seq
            LIMIT ?2
            ",
        )
        .context("failed to prepare event fetch")?;

    let mut rows = statement
        .query(params![CLICK_THROUGH_MESSAGE_TYPE, limit as i64])
        .context("failed to fetch events")?;

    let mut out = Vec::new();
    while let Some(row) = rows.next()? {
        out.push(ClickEvent {
            query_id: row.get(0)?,
            action: row.get(1)?,
            document_id: row.get(2)?,
            position: row.get::<_, i64>(3)?.max(0) as usize,
            timestamp: row.get(4)?,
        });
    }

    Ok(out)
}

pub fn count_rows(connection: &Connection, sql: &str) -> Result<i64> {
    let count = connection.query_row(sql, [], |row| row.get(0))?;
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn memory_store() -> Connection {
        let connection = Connection::open_in_memory().expect("in-memory store opens");
        ensure_schema(&connection).expect("schema applies");
        connection
    }

    fn sample_query(query_id: &str, shown: &[&str]) -> QueryRecord {
        QueryRecord {
            query_id: query_id.to_string(),
            query_text: format!("query text for {query_id}"),
            shown_document_ids: shown.iter().map(ToString::to_string).collect(),
        }
    }

    fn sample_event(query_id: &str, document_id: &str, position: usize) -> ClickEvent {
        ClickEvent {
            query_id: query_id.to_string(),
            document_id: document_id.to_string(),
            position,
            action: "click".to_string(),
            timestamp: "2026-08-01T00:00:00Z".to_string(),
        }
    }

    #[test]
    fn fetch_corpus_round_trips_queries_and_events() {
        let connection = memory_store();
        upsert_query(&connection, &sample_query("q1", &["d1", "d2"])).unwrap();
        insert_event(
            &connection,
            &sample_event("q1", "d2", 2),
            CLICK_THROUGH_MESSAGE_TYPE,
        )
        .unwrap();

        let (queries, events) = fetch_corpus(&connection, 100).unwrap();
        assert_eq!(queries.len(), 1);
        assert_eq!(queries[0].shown_document_ids, vec!["d1", "d2"]);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].document_id, "d2");
        assert_eq!(events[0].position, 2);
    }

    #[test]
    fn fetch_corpus_filters_out_other_message_types() {
        let connection = memory_store();
        insert_event(
            &connection,
            &sample_event("q1", "d1", 1),
            CLICK_THROUGH_MESSAGE_TYPE,
        )
        .unwrap();
        insert_event(&connection, &sample_event("q1", "d2", 2), "QUERY_ISSUED").unwrap();

        let (_, events) = fetch_corpus(&connection, 100).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].document_id, "d1");
    }

    #[test]
    fn fetch_corpus_caps_results_at_limit() {
        let connection = memory_store();
        for index in 0..5 {
            upsert_query(&connection, &sample_query(&format!("q{index}"), &["d1"])).unwrap();
            insert_event(
                &connection,
                &sample_event(&format!("q{index}"), "d1", 1),
                CLICK_THROUGH_MESSAGE_TYPE,
            )
            .unwrap();
        }

        let (queries, events) = fetch_corpus(&connection, 3).unwrap();
        assert_eq!(queries.len(), 3);
        assert_eq!(events.len(), 3);
    }

    #[test]
    fn upsert_query_replaces_existing_record() {
        let connection = memory_store();
        upsert_query(&connection, &sample_query("q1", &["d1"])).unwrap();
        upsert_query(&connection, &sample_query("q1", &["d2", "d3"])).unwrap();

        let (queries, _) = fetch_corpus(&connection, 100).unwrap();
        assert_eq!(queries.len(), 1);
        assert_eq!(queries[0].shown_document_ids, vec!["d2", "d3"]);
    }
}
