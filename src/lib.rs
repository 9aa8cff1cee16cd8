//! Local telemetry aggregator for developer activity. An editor plugin pipes
//! raw editing signals over stdin; devtrack buckets them into per-project,
//! per-day usage metrics (time, keystrokes, line deltas, languages, hourly
//! histogram, files) and keeps the whole dataset in a single JSON document.

pub mod cli;
pub mod host;
pub mod store;
pub mod tracker;
pub mod utils;
