mod grade;
mod judgments;
mod position_ctr;

pub use grade::{CoecGrader, PositionalGrader, RelevanceGrader};
pub use judgments::build_judgments;
pub use position_ctr::{CLICK_ACTION, MAX_TRACKED_POSITION, PositionCtrTable, estimate_position_ctr};
