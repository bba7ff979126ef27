//! Personal time tracking served over HTTP. Users keep a list of projects, log hours spent on
//! activities per calendar day and look at daily reports and a per-project chart of any day.
//! Days are resolved in the user's own timezone.
//!

pub mod auth;
pub mod cli;
pub mod server;
pub mod storage;
pub mod tracking;
pub mod utils;
