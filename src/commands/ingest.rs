use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::Connection;
use tracing::{info, warn};

use crate::cli::IngestArgs;
use crate::model::{ClickEvent, QueryRecord, UbiEventRecord, UbiQueryRecord};
use crate::store;
use crate::util::ensure_directory;

pub fn run(args: IngestArgs) -> Result<()> {
    if let Some(parent) = args.db_path.parent() {
        ensure_directory(parent)?;
    }

    let mut connection = store::open_store(&args.db_path)?;
    if args.refresh {
        info!(db_path = %args.db_path.display(), "refresh requested, dropping store tables");
        store::drop_tables(&connection)?;
    }
    store::ensure_schema(&connection)?;

    let transaction = connection
        .transaction()
        .context("failed to begin ingest transaction")?;

    let query_counts = ingest_queries(&transaction, &args.queries_path)?;
    let event_counts = ingest_events(&transaction, &args.events_path)?;

    transaction
        .commit()
        .context("failed to commit ingest transaction")?;

    info!(
        db_path = %args.db_path.display(),
        queries_ingested = query_counts.ingested,
        query_lines_skipped = query_counts.skipped,
        events_ingested = event_counts.ingested,
        event_lines_skipped = event_counts.skipped,
        "ingest complete"
    );

    Ok(())
}

#[derive(Debug, Default)]
struct LineCounts {
    ingested: usize,
    skipped: usize,
}

fn ingest_queries(connection: &Connection, path: &Path) -> Result<LineCounts> {
    let mut counts = LineCounts::default();

    for (line_number, line) in read_ndjson_lines(path)?.into_iter().enumerate() {
        match parse_query_line(&line) {
            Ok(record) => {
                store::upsert_query(connection, &record)?;
                counts.ingested += 1;
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    line = line_number + 1,
                    error = %err,
                    "skipping malformed query record"
                );
                counts.skipped += 1;
            }
        }
    }

    Ok(counts)
}

fn ingest_events(connection: &Connection, path: &Path) -> Result<LineCounts> {
    let mut counts = LineCounts::default();

    for (line_number, line) in read_ndjson_lines(path)?.into_iter().enumerate() {
        match parse_event_line(&line) {
            Ok((event, message_type)) => {
                store::insert_event(connection, &event, &message_type)?;
                counts.ingested += 1;
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    line = line_number + 1,
                    error = %err,
                    "skipping malformed event record"
                );
                counts.skipped += 1;
            }
        }
    }

    Ok(counts)
}

fn read_ndjson_lines(path: &Path) -> Result<Vec<String>> {
    let file = File::open(path)
        .with_context(|| format!("failed to open ndjson file: {}", path.display()))?;
    let reader = BufReader::new(file);

    let mut lines = Vec::new();
    for line in reader.lines() {
        let line = line.with_context(|| format!("failed to read line: {}", path.display()))?;
        if !line.trim().is_empty() {
            lines.push(line);
        }
    }

    Ok(lines)
}

fn parse_query_line(line: &str) -> Result<QueryRecord> {
    let record: UbiQueryRecord = serde_json::from_str(line).context("invalid UBI query record")?;
    Ok(record.into())
}

fn parse_event_line(line: &str) -> Result<(ClickEvent, String)> {
    let record: UbiEventRecord = serde_json::from_str(line).context("invalid UBI event record")?;
    let message_type = record.message_type.clone();
    Ok((record.into(), message_type))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_query_line_maps_ubi_fields_onto_query_record() {
        let line = r#"{"query_id":"q1","user_query":"red shoes","query_response_object_ids":["d1","d2"]}"#;

        let record = parse_query_line(line).unwrap();
        assert_eq!(record.query_id, "q1");
        assert_eq!(record.query_text, "red shoes");
        assert_eq!(record.shown_document_ids, vec!["d1", "d2"]);
    }

    #[test]
    fn parse_event_line_flattens_nested_event_attributes() {
        let line = r#"{
            "query_id": "q1",
            "message_type": "CLICK_THROUGH",
            "action_name": "click",
            "timestamp": "2026-08-01T00:00:00Z",
            "event_attributes": {
                "object": {"object_id": "d2", "position": {"ordinal": 2}}
            }
        }"#;

        let (event, message_type) = parse_event_line(line).unwrap();
        assert_eq!(message_type, "CLICK_THROUGH");
        assert_eq!(event.query_id, "q1");
        assert_eq!(event.document_id, "d2");
        assert_eq!(event.position, 2);
        assert_eq!(event.action, "click");
    }

    #[test]
    fn parse_query_line_rejects_missing_required_fields() {
        let line = r#"{"query_id":"q1","user_query":"red shoes"}"#;
        assert!(parse_query_line(line).is_err());
    }

    #[test]
    fn parse_event_line_rejects_missing_position() {
        let line = r#"{
            "query_id": "q1",
            "message_type": "CLICK_THROUGH",
            "action_name": "click",
            "timestamp": "2026-08-01T00:00:00Z",
            "event_attributes": {"object": {"object_id": "d2"}}
        }"#;
        assert!(parse_event_line(line).is_err());
    }
}
