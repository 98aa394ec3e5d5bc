use anyhow::Result;
use tracing::{debug, info};

use crate::cli::{GenerateArgs, GradingMode};
use crate::report;
use crate::scoring::{
    CoecGrader, MAX_TRACKED_POSITION, PositionalGrader, build_judgments, estimate_position_ctr,
};
use crate::store;
use crate::util::write_json_pretty;

pub fn run(args: GenerateArgs) -> Result<()> {
    let connection = store::open_store_read_only(&args.db_path)?;
    let (queries, events) = store::fetch_corpus(&connection, args.limit)?;

    info!(
        db_path = %args.db_path.display(),
        queries = queries.len(),
        click_events = events.len(),
        limit = args.limit,
        grading = args.grading.as_str(),
        "fetched corpus"
    );

    let judgments = match args.grading {
        GradingMode::Coec => {
            let ctr_table = estimate_position_ctr(&queries, &events);
            for position in 1..=MAX_TRACKED_POSITION {
                debug!(
                    position,
                    impressions = ctr_table.impressions_at(position),
                    clicks = ctr_table.clicks_at(position),
                    ctr = ctr_table.ctr_at(position),
                    "position ctr"
                );
            }
            info!(
                impressions = ctr_table.total_impressions(),
                clicks = ctr_table.total_clicks(),
                "estimated position ctr table"
            );

            let grader = CoecGrader::new(&queries, &events, &ctr_table);
            build_judgments(&queries, &grader)
        }
        GradingMode::Positional => {
            let grader = PositionalGrader::new(&events);
            build_judgments(&queries, &grader)
        }
    };

    report::write_judgment_csv(&args.output, &judgments)?;

    let stats = report::summarize_judgments(&judgments, args.grading.as_str());
    info!(
        output = %args.output.display(),
        total_judgments = stats.total_judgments,
        unique_queries = stats.unique_queries,
        unique_documents = stats.unique_documents,
        avg_judgments_per_query = stats.avg_judgments_per_query,
        queries_with_clicks = stats.queries_with_clicks,
        click_through_rate = stats.click_through_rate,
        "judgment list written"
    );

    if let Some(stats_path) = &args.stats_path {
        write_json_pretty(stats_path, &stats)?;
        info!(stats_path = %stats_path.display(), "statistics written");
    }

    Ok(())
}
