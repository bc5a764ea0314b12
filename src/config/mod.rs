#[allow(clippy::module_inception)]
mod config;

pub use self::config::{PathSettings, RaceSettings, RenderSettings, RunMode, Settings, TextAnchor};
