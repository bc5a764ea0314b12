mod builder;

pub use builder::{build_race_table, FramePolicy, TableOptions, BAR_NUDGE};
