mod level_table;

pub use level_table::LevelTable;
