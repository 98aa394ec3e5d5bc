use anyhow::Result;
use rusqlite::params;
use tracing::{info, warn};

use crate::cli::StatusArgs;
use crate::store;

pub fn run(args: StatusArgs) -> Result<()> {
    info!(db_path = %args.db_path.display(), "status requested");

    if args.db_path.exists() {
        let connection = store::open_store_read_only(&args.db_path)?;
        let queries_count =
            store::count_rows(&connection, "SELECT COUNT(*) FROM ubi_queries").unwrap_or(0);
        let events_count =
            store::count_rows(&connection, "SELECT COUNT(*) FROM ubi_events").unwrap_or(0);
        let click_through_count = connection
            .query_row(
                "SELECT COUNT(*) FROM ubi_events WHERE message_type = ?1",
                params![store::CLICK_THROUGH_MESSAGE_TYPE],
                |row| row.get::<_, i64>(0),
            )
            .unwrap_or(0);

        info!(
            queries = queries_count,
            events = events_count,
            click_through_events = click_through_count,
            "store status"
        );
    } else {
        warn!(path = %args.db_path.display(), "store database missing");
    }

    if args.output.exists() {
        info!(path = %args.output.display(), "judgment list present");
    } else {
        warn!(path = %args.output.display(), "judgment list not generated yet");
    }

    Ok(())
}
