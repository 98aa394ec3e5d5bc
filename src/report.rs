use std::collections::{BTreeMap, HashSet};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};

use crate::model::{JudgmentEntry, JudgmentStatistics};
use crate::util::{ensure_directory, now_utc_string};

const CSV_HEADER: &str = "qid,docid,grade,query";

pub fn write_judgment_csv(path: &Path, judgments: &[JudgmentEntry]) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_directory(parent)?;
    }

    let file = File::create(path)
        .with_context(|| format!("failed to create judgment file: {}", path.display()))?;
    let mut output = BufWriter::new(file);

    render_judgment_csv(&mut output, judgments)
        .with_context(|| format!("failed to write judgment file: {}", path.display()))?;
    output
        .flush()
        .with_context(|| format!("failed to finalize judgment file: {}", path.display()))?;

    Ok(())
}

fn render_judgment_csv<W: Write>(output: &mut W, judgments: &[JudgmentEntry]) -> std::io::Result<()> {
    writeln!(output, "{CSV_HEADER}")?;

    for entry in judgments {
        writeln!(
            output,
            "{},{},{},{}",
            entry.query_id,
            entry.document_id,
            format_grade(entry.grade),
            entry.query_text
        )?;
    }

    Ok(())
}

fn format_grade(grade: f64) -> String {
    format!("{grade:.4}")
}

pub fn summarize_judgments(judgments: &[JudgmentEntry], grading_mode: &str) -> JudgmentStatistics {
    let unique_queries = judgments
        .iter()
        .map(|entry| entry.query_id.as_str())
        .collect::<HashSet<&str>>()
        .len();
    let unique_documents = judgments
        .iter()
        .map(|entry| entry.document_id.as_str())
        .collect::<HashSet<&str>>()
        .len();

    let mut grade_distribution = BTreeMap::<String, usize>::new();
    for entry in judgments {
        *grade_distribution.entry(format_grade(entry.grade)).or_insert(0) += 1;
    }

    // Grades above 1.0 only arise from clicked documents in either mode.
    let click_bearing = judgments
        .iter()
        .filter(|entry| entry.grade > 1.0)
        .collect::<Vec<_>>();
    let queries_with_clicks = click_bearing
        .iter()
        .map(|entry| entry.query_id.as_str())
        .collect::<HashSet<&str>>()
        .len();

    let avg_judgments_per_query = if unique_queries > 0 {
        judgments.len() as f64 / unique_queries as f64
    } else {
        0.0
    };
    let click_through_rate = if judgments.is_empty() {
        0.0
    } else {
        click_bearing.len() as f64 / judgments.len() as f64
    };

    JudgmentStatistics {
        generated_at: now_utc_string(),
        grading_mode: grading_mode.to_string(),
        total_judgments: judgments.len(),
        unique_queries,
        unique_documents,
        grade_distribution,
        avg_judgments_per_query,
        queries_with_clicks,
        click_through_rate,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(query_id: &str, document_id: &str, grade: f64) -> JudgmentEntry {
        JudgmentEntry {
            query_id: query_id.to_string(),
            document_id: document_id.to_string(),
            grade,
            query_text: format!("text for {query_id}"),
        }
    }

    #[test]
    fn csv_output_has_header_and_one_row_per_entry() {
        let judgments = vec![entry("q1", "d1", 0.0), entry("q1", "d2", 1.5)];

        let mut buffer = Vec::new();
        render_judgment_csv(&mut buffer, &judgments).unwrap();
        let rendered = String::from_utf8(buffer).unwrap();

        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "qid,docid,grade,query");
        assert_eq!(lines[1], "q1,d1,0.0000,text for q1");
        assert_eq!(lines[2], "q1,d2,1.5000,text for q1");
    }

    #[test]
    fn empty_judgment_list_renders_header_only() {
        let mut buffer = Vec::new();
        render_judgment_csv(&mut buffer, &[]).unwrap();
        assert_eq!(String::from_utf8(buffer).unwrap(), "qid,docid,grade,query\n");
    }

    #[test]
    fn summary_counts_queries_documents_and_click_bearing_rows() {
        let judgments = vec![
            entry("q1", "d1", 0.0),
            entry("q1", "d2", 2.0),
            entry("q2", "d2", 1.0),
            entry("q2", "d3", 0.5),
        ];

        let stats = summarize_judgments(&judgments, "coec");
        assert_eq!(stats.total_judgments, 4);
        assert_eq!(stats.unique_queries, 2);
        assert_eq!(stats.unique_documents, 3);
        assert_eq!(stats.avg_judgments_per_query, 2.0);
        assert_eq!(stats.queries_with_clicks, 1);
        assert_eq!(stats.click_through_rate, 0.25);
        assert_eq!(stats.grade_distribution.get("0.0000"), Some(&1));
        assert_eq!(stats.grade_distribution.get("2.0000"), Some(&1));
        assert_eq!(stats.grading_mode, "coec");
    }

    #[test]
    fn summary_of_empty_table_avoids_division() {
        let stats = summarize_judgments(&[], "positional");
        assert_eq!(stats.total_judgments, 0);
        assert_eq!(stats.avg_judgments_per_query, 0.0);
        assert_eq!(stats.click_through_rate, 0.0);
        assert!(stats.grade_distribution.is_empty());
    }
}
