mod snapshots;

pub use snapshots::{
    is_snapshot_file, load_snapshots, normalize_snapshot, read_snapshot_file, sort_by_timestamp,
    unique_players_per_skill,
};
