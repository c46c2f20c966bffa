//! Report surface
//!
//! Renders a finished [`HistorySize`](crate::model::HistorySize) as a table
//! or as JSON, given a minimum-severity threshold and a name-disclosure
//! style.

mod json;
mod metrics;
mod options;
mod table;

pub use json::{json_v1, json_v2};
pub use metrics::{layout, Item, Node, Rating, Section};
pub use options::{JsonVersion, NameStyle, Threshold};
pub use table::table_string;
