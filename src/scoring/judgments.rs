use crate::model::{JudgmentEntry, QueryRecord};

use super::grade::RelevanceGrader;

// One entry per shown-document occurrence, in shown order; duplicates kept.
pub fn build_judgments<G: RelevanceGrader>(
    queries: &[QueryRecord],
    grader: &G,
) -> Vec<JudgmentEntry> {
    let mut judgments =
        Vec::with_capacity(queries.iter().map(|q| q.shown_document_ids.len()).sum());

    for query in queries {
        for document_id in &query.shown_document_ids {
            judgments.push(JudgmentEntry {
                query_id: query.query_id.clone(),
                document_id: document_id.clone(),
                grade: grader.grade(query, document_id),
                query_text: query.query_text.clone(),
            });
        }
    }

    judgments
}
