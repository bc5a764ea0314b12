pub mod config;
pub mod levels;
pub mod loader;
pub mod models;
pub mod pipeline;
pub mod render;
pub mod table;
pub mod utils;

pub use config::Settings;
pub use levels::LevelTable;
pub use models::{RaceTable, Snapshot};
pub use render::{GifRenderer, RaceRenderer};
