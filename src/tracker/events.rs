use std::path::PathBuf;

/// Message passed from the sampler to the processor. Everything the
/// aggregator needs is resolved on the sampling side; the processor only
/// applies increments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UsageEvent {
    /// One tick's worth of active time for a project/language/file triple.
    TimeCredit {
        project: PathBuf,
        language: String,
        relative_path: String,
        seconds: u64,
    },
    /// Aggregated deltas from one content-change notification.
    Edit {
        project: PathBuf,
        keystrokes: u64,
        lines_added: u64,
        lines_deleted: u64,
    },
}
