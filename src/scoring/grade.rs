use std::collections::{HashMap, HashSet};

use crate::model::{ClickEvent, QueryRecord};

use super::position_ctr::{CLICK_ACTION, MAX_TRACKED_POSITION, PositionCtrTable};

pub trait RelevanceGrader {
    fn grade(&self, record: &QueryRecord, document_id: &str) -> f64;
}

#[derive(Debug, Clone)]
pub struct CoecGrader {
    expected_clicks: HashMap<String, f64>,
    actual_clicks: HashMap<String, u64>,
}

impl CoecGrader {
    pub fn new(
        queries: &[QueryRecord],
        events: &[ClickEvent],
        ctr_table: &PositionCtrTable,
    ) -> Self {
        let mut expected_clicks = HashMap::<String, f64>::new();
        let mut actual_clicks = HashMap::<String, u64>::new();

        // Each query contributes CTR at the document's first-occurrence rank,
        // and only when that rank is within the tracked top 10.
        for query in queries {
            let mut seen = HashSet::<&str>::new();
            for (index, document_id) in query.shown_document_ids.iter().enumerate() {
                if !seen.insert(document_id.as_str()) {
                    continue;
                }
                let position = index + 1;
                if position <= MAX_TRACKED_POSITION {
                    *expected_clicks.entry(document_id.clone()).or_insert(0.0) +=
                        ctr_table.ctr_at(position);
                }
            }
        }

        for event in events {
            if event.action != CLICK_ACTION {
                continue;
            }
            *actual_clicks.entry(event.document_id.clone()).or_insert(0) += 1;
        }

        Self {
            expected_clicks,
            actual_clicks,
        }
    }

    pub fn expected_clicks(&self, document_id: &str) -> f64 {
        self.expected_clicks.get(document_id).copied().unwrap_or(0.0)
    }

    pub fn actual_clicks(&self, document_id: &str) -> u64 {
        self.actual_clicks.get(document_id).copied().unwrap_or(0)
    }
}

impl RelevanceGrader for CoecGrader {
    fn grade(&self, _record: &QueryRecord, document_id: &str) -> f64 {
        let expected = self.expected_clicks(document_id);
        if expected > 0.0 {
            self.actual_clicks(document_id) as f64 / expected
        } else {
            0.0
        }
    }
}

#[derive(Debug, Clone)]
pub struct PositionalGrader {
    click_position_by_query: HashMap<String, HashMap<String, usize>>,
}

impl PositionalGrader {
    pub fn new(events: &[ClickEvent]) -> Self {
        let mut click_position_by_query = HashMap::<String, HashMap<String, usize>>::new();

        // Last click per (query, document) wins.
        for event in events {
            if event.action != CLICK_ACTION {
                continue;
            }
            click_position_by_query
                .entry(event.query_id.clone())
                .or_default()
                .insert(event.document_id.clone(), event.position);
        }

        Self {
            click_position_by_query,
        }
    }
}

impl RelevanceGrader for PositionalGrader {
    fn grade(&self, record: &QueryRecord, document_id: &str) -> f64 {
        if let Some(&position) = self
            .click_position_by_query
            .get(&record.query_id)
            .and_then(|clicks| clicks.get(document_id))
        {
            if position > 3 {
                return 4.0;
            }
            if (1..=3).contains(&position) {
                return 3.0;
            }
            // A recorded position of 0 falls through to the shown-list branch.
        }

        match record
            .shown_document_ids
            .iter()
            .position(|shown| shown == document_id)
        {
            Some(index) if index < 5 => 2.0,
            Some(index) if index < MAX_TRACKED_POSITION => 1.0,
            _ => 0.0,
        }
    }
}
