use std::collections::BTreeMap;

use chrono::{DateTime, Local};
use serde::Serialize;

/// Volatile counters for the current process run. Never written to the
/// backing file; every increment here has already been mirrored into the
/// persistent day bucket by the aggregator.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    pub start_time: DateTime<Local>,
    pub seconds: u64,
    pub keystrokes: u64,
    pub lines_added: u64,
    pub lines_deleted: u64,
    pub languages: BTreeMap<String, u64>,
}

impl SessionState {
    pub fn new(start_time: DateTime<Local>) -> Self {
        Self {
            start_time,
            seconds: 0,
            keystrokes: 0,
            lines_added: 0,
            lines_deleted: 0,
            languages: BTreeMap::new(),
        }
    }
}
