//! Reporting logic over tracked time. Everything here takes the user explicitly:
//!  - [date] turns an optional `YYYY-MM-DD` string into the user's day bucket.
//!  - [graph] sums hours per project for the dashboard chart.
//!  - [day_report] builds the per-day breakdown with palette colors and percentages.

pub mod date;
pub mod day_report;
pub mod graph;
pub mod palette;
