//! Shared helpers.
//!
//! - [`format`] - thousands-separated integer parsing and formatting

mod format;

pub use format::{format_thousands, format_thousands_f64, parse_thousands};
