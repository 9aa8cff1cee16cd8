use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;

/// Fallback daily goal, 4 hours.
pub const DEFAULT_DAILY_GOAL_SECONDS: i64 = 14400;

fn default_daily_goal() -> i64 {
    DEFAULT_DAILY_GOAL_SECONDS
}

/// The root of the backing file. Field names follow the on-disk format, which
/// has to stay readable for documents written by older versions: every map
/// and the goal itself carry serde defaults so a missing field is repaired
/// once, at load time.
#[derive(PartialEq, Eq, Debug, Serialize, Deserialize, Clone)]
pub struct GlobalStore {
    #[serde(rename = "dailyGoal", default = "default_daily_goal")]
    pub daily_goal: i64,
    #[serde(default)]
    pub projects: BTreeMap<String, Project>,
}

impl Default for GlobalStore {
    fn default() -> Self {
        Self {
            daily_goal: DEFAULT_DAILY_GOAL_SECONDS,
            projects: BTreeMap::new(),
        }
    }
}

/// A tracked workspace root. Keyed in [GlobalStore::projects] by the
/// normalized path; `path` keeps the original spelling for display purposes.
#[derive(PartialEq, Eq, Debug, Serialize, Deserialize, Clone)]
pub struct Project {
    pub name: String,
    pub path: String,
    #[serde(default)]
    pub days: BTreeMap<String, Day>,
}

/// Metrics bucket for one project on one calendar date in local time.
///
/// `seconds`, `hours` and `languages` are parallel counters incremented
/// together by the aggregator; they are not derived from each other.
#[derive(PartialEq, Eq, Debug, Serialize, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct Day {
    pub date: String,
    #[serde(default)]
    pub seconds: u64,
    #[serde(default)]
    pub keystrokes: u64,
    #[serde(default)]
    pub lines_added: u64,
    #[serde(default)]
    pub lines_deleted: u64,
    #[serde(default)]
    pub languages: BTreeMap<String, LanguageUsage>,
    /// Keyed by unpadded hour of day, "0" to "23".
    #[serde(default)]
    pub hours: BTreeMap<String, u64>,
    /// Keyed by file path relative to the project root.
    #[serde(default)]
    pub files: BTreeMap<String, u64>,
}

#[derive(PartialEq, Eq, Debug, Serialize, Deserialize, Clone)]
pub struct LanguageUsage {
    pub name: String,
    pub seconds: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn day_missing_maps_is_repaired_at_load() {
        let raw = r#"{
            "date": "2023-11-02",
            "seconds": 55,
            "keystrokes": 7,
            "linesAdded": 3,
            "linesDeleted": 1
        }"#;

        let day: Day = serde_json::from_str(raw).unwrap();

        assert_eq!(day.seconds, 55);
        assert!(day.languages.is_empty());
        assert!(day.hours.is_empty());
        assert!(day.files.is_empty());
    }

    #[test]
    fn store_missing_goal_defaults() {
        let store: GlobalStore = serde_json::from_str(r#"{"projects": {}}"#).unwrap();

        assert_eq!(store.daily_goal, DEFAULT_DAILY_GOAL_SECONDS);
    }

    #[test]
    fn day_serializes_with_camel_case_keys() {
        let day = Day {
            date: "2024-01-01".into(),
            lines_added: 5,
            lines_deleted: 2,
            ..Day::default()
        };

        let raw = serde_json::to_string(&day).unwrap();

        assert!(raw.contains("\"linesAdded\":5"));
        assert!(raw.contains("\"linesDeleted\":2"));
    }
}
