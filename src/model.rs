use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq)]
pub struct QueryRecord {
    pub query_id: String,
    pub query_text: String,
    pub shown_document_ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClickEvent {
    pub query_id: String,
    pub document_id: String,
    // 1-based rank as reported by the event; authoritative for CTR bucketing.
    pub position: usize,
    pub action: String,
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JudgmentEntry {
    pub query_id: String,
    pub document_id: String,
    pub grade: f64,
    pub query_text: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UbiQueryRecord {
    pub query_id: String,
    pub user_query: String,
    pub query_response_object_ids: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UbiEventRecord {
    pub query_id: String,
    pub message_type: String,
    pub action_name: String,
    pub timestamp: String,
    pub event_attributes: UbiEventAttributes,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UbiEventAttributes {
    pub object: UbiEventObject,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UbiEventObject {
    pub object_id: String,
    pub position: UbiEventPosition,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UbiEventPosition {
    pub ordinal: usize,
}

impl From<UbiQueryRecord> for QueryRecord {
    fn from(record: UbiQueryRecord) -> Self {
        Self {
            query_id: record.query_id,
            query_text: record.user_query,
            shown_document_ids: record.query_response_object_ids,
        }
    }
}

impl From<UbiEventRecord> for ClickEvent {
    fn from(record: UbiEventRecord) -> Self {
        Self {
            query_id: record.query_id,
            document_id: record.event_attributes.object.object_id,
            position: record.event_attributes.object.position.ordinal,
            action: record.action_name,
            timestamp: record.timestamp,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct JudgmentStatistics {
    pub generated_at: String,
    pub grading_mode: String,
    pub total_judgments: usize,
    pub unique_queries: usize,
    pub unique_documents: usize,
    pub grade_distribution: BTreeMap<String, usize>,
    pub avg_judgments_per_query: f64,
    pub queries_with_clicks: usize,
    pub click_through_rate: f64,
}
