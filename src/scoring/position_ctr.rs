use crate::model::{ClickEvent, QueryRecord};

pub const MAX_TRACKED_POSITION: usize = 10;
pub const CLICK_ACTION: &str = "click";

#[derive(Debug, Clone, PartialEq)]
pub struct PositionCtrTable {
    impressions: [u64; MAX_TRACKED_POSITION],
    clicks: [u64; MAX_TRACKED_POSITION],
    ctr: [f64; MAX_TRACKED_POSITION],
}

impl PositionCtrTable {
    // `position` is 1-based; anything outside 1..=10 reads as zero.
    pub fn ctr_at(&self, position: usize) -> f64 {
        if (1..=MAX_TRACKED_POSITION).contains(&position) {
            self.ctr[position - 1]
        } else {
            0.0
        }
    }

    pub fn impressions_at(&self, position: usize) -> u64 {
        if (1..=MAX_TRACKED_POSITION).contains(&position) {
            self.impressions[position - 1]
        } else {
            0
        }
    }

    pub fn clicks_at(&self, position: usize) -> u64 {
        if (1..=MAX_TRACKED_POSITION).contains(&position) {
            self.clicks[position - 1]
        } else {
            0
        }
    }

    pub fn total_impressions(&self) -> u64 {
        self.impressions.iter().sum()
    }

    pub fn total_clicks(&self) -> u64 {
        self.clicks.iter().sum()
    }
}

pub fn estimate_position_ctr(queries: &[QueryRecord], events: &[ClickEvent]) -> PositionCtrTable {
    let mut impressions = [0_u64; MAX_TRACKED_POSITION];
    let mut clicks = [0_u64; MAX_TRACKED_POSITION];

    for query in queries {
        let shown = query.shown_document_ids.len().min(MAX_TRACKED_POSITION);
        for slot in impressions.iter_mut().take(shown) {
            *slot += 1;
        }
    }

    for event in events {
        if event.action != CLICK_ACTION {
            continue;
        }
        if (1..=MAX_TRACKED_POSITION).contains(&event.position) {
            clicks[event.position - 1] += 1;
        }
    }

    let mut ctr = [0.0_f64; MAX_TRACKED_POSITION];
    for index in 0..MAX_TRACKED_POSITION {
        if impressions[index] > 0 {
            ctr[index] = clicks[index] as f64 / impressions[index] as f64;
        }
    }

    PositionCtrTable {
        impressions,
        clicks,
        ctr,
    }
}
