use std::{
    collections::BTreeMap,
    path::Path,
};

use chrono::{DateTime, Local, Timelike};
use serde::Serialize;

use crate::utils::clock::Clock;

use super::{
    entities::{Day, GlobalStore, LanguageUsage, Project, DEFAULT_DAILY_GOAL_SECONDS},
    session::SessionState,
};

/// Owns the persistent store and the volatile session counters and applies
/// every usage increment to both from the same input. Constructed once per
/// process and handed to the event consumer; there is no global instance.
pub struct Aggregator {
    store: GlobalStore,
    session: SessionState,
    clock: Box<dyn Clock>,
}

impl Aggregator {
    pub fn new(store: GlobalStore, clock: Box<dyn Clock>) -> Self {
        let session = SessionState::new(clock.now());
        Self {
            store,
            session,
            clock,
        }
    }

    pub fn store(&self) -> &GlobalStore {
        &self.store
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    /// Resolves a project by its root path, creating an empty entry on first
    /// sight. Path variants that differ only in case or separator style map
    /// to the same entry.
    pub fn project_entry(&mut self, path: &Path) -> &mut Project {
        Self::project_entry_in(&mut self.store, path)
    }

    fn project_entry_in<'a>(store: &'a mut GlobalStore, path: &Path) -> &'a mut Project {
        let key = normalize_project_key(path);
        store.projects.entry(key).or_insert_with(|| Project {
            name: project_display_name(path),
            path: path.to_string_lossy().into_owned(),
            days: BTreeMap::new(),
        })
    }

    fn day_entry<'a>(
        store: &'a mut GlobalStore,
        path: &Path,
        now: DateTime<Local>,
    ) -> &'a mut Day {
        let date = date_key(now);
        let project = Self::project_entry_in(store, path);
        project.days.entry(date.clone()).or_insert_with(|| Day {
            date,
            ..Day::default()
        })
    }

    /// Credits `seconds` of active time to a project/language/file triple.
    /// Updates the day total, the hour histogram, the language counter and
    /// the file counter together, plus the session mirror.
    pub fn record_time(
        &mut self,
        project: &Path,
        language: &str,
        relative_path: &str,
        seconds: u64,
    ) {
        let now = self.clock.now();

        self.session.seconds += seconds;
        *self
            .session
            .languages
            .entry(language.to_owned())
            .or_insert(0) += seconds;

        let day = Self::day_entry(&mut self.store, project, now);
        day.seconds += seconds;
        *day.hours.entry(now.hour().to_string()).or_insert(0) += seconds;
        day.languages
            .entry(language.to_owned())
            .or_insert_with(|| LanguageUsage {
                name: language.to_owned(),
                seconds: 0,
            })
            .seconds += seconds;
        *day.files.entry(relative_path.to_owned()).or_insert(0) += seconds;
    }

    pub fn record_keystrokes(&mut self, project: &Path, count: u64) {
        let now = self.clock.now();
        self.session.keystrokes += count;
        Self::day_entry(&mut self.store, project, now).keystrokes += count;
    }

    /// A call with both deltas zero is a no-op and does not even create
    /// today's bucket.
    pub fn record_lines(&mut self, project: &Path, added: u64, deleted: u64) {
        if added == 0 && deleted == 0 {
            return;
        }
        let now = self.clock.now();
        self.session.lines_added += added;
        self.session.lines_deleted += deleted;

        let day = Self::day_entry(&mut self.store, project, now);
        day.lines_added += added;
        day.lines_deleted += deleted;
    }

    pub fn set_daily_goal(&mut self, hours: f64) {
        self.store.daily_goal = (hours * 3600.0).floor() as i64;
    }

    /// Stored goal in seconds. A zero, negative or absent stored value falls
    /// back to [DEFAULT_DAILY_GOAL_SECONDS]; the fallback is applied on every
    /// read so a corrupted persisted value never leaks out.
    pub fn daily_goal(&self) -> u64 {
        if self.store.daily_goal > 0 {
            self.store.daily_goal as u64
        } else {
            DEFAULT_DAILY_GOAL_SECONDS as u64
        }
    }

    /// Sum of today's totals across all projects.
    pub fn today_total_seconds(&self) -> u64 {
        let today = date_key(self.clock.now());
        self.store
            .projects
            .values()
            .filter_map(|project| project.days.get(&today))
            .map(|day| day.seconds)
            .sum()
    }

    /// Read-only view for a presentation layer. `last_project` selects which
    /// project's data is spotlighted; an unknown path yields no project.
    pub fn snapshot(&self, last_project: Option<&Path>) -> Snapshot<'_> {
        let project = last_project
            .and_then(|path| self.store.projects.get(&normalize_project_key(path)));
        Snapshot {
            session: &self.session,
            project,
            projects: self.store.projects.values().collect(),
            daily_goal_seconds: self.daily_goal(),
            today_total_seconds: self.today_total_seconds(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot<'a> {
    pub session: &'a SessionState,
    pub project: Option<&'a Project>,
    pub projects: Vec<&'a Project>,
    pub daily_goal_seconds: u64,
    pub today_total_seconds: u64,
}

/// This is the standard way of converting a date to a day key in devtrack.
pub fn date_key(now: DateTime<Local>) -> String {
    now.format("%Y-%m-%d").to_string()
}

/// Case-insensitive, separator-normalized project key. Keeps distinct roots
/// distinct while folding platform spelling variants together.
pub fn normalize_project_key(path: &Path) -> String {
    let normalized = path.to_string_lossy().replace('\\', "/");
    let trimmed = normalized.trim_end_matches('/');
    let key = if trimmed.is_empty() { "/" } else { trimmed };
    key.to_lowercase()
}

fn project_display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

#[cfg(test)]
mod tests {
    use std::sync::{
        atomic::{AtomicI64, Ordering},
        Arc,
    };

    use async_trait::async_trait;
    use chrono::{Duration, TimeZone};
    use tokio::time::Instant;

    use super::*;

    /// Fixed start point with a test-controlled offset, so day and hour keys
    /// are deterministic.
    #[derive(Clone)]
    struct TestClock {
        start: DateTime<Local>,
        offset_seconds: Arc<AtomicI64>,
    }

    impl TestClock {
        fn at(year: i32, month: u32, day: u32, hour: u32) -> Self {
            Self {
                start: Local.with_ymd_and_hms(year, month, day, hour, 0, 0).unwrap(),
                offset_seconds: Arc::new(AtomicI64::new(0)),
            }
        }

        fn advance(&self, seconds: i64) {
            self.offset_seconds.fetch_add(seconds, Ordering::SeqCst);
        }
    }

    #[async_trait]
    impl Clock for TestClock {
        fn now(&self) -> DateTime<Local> {
            self.start + Duration::seconds(self.offset_seconds.load(Ordering::SeqCst))
        }

        fn instant(&self) -> Instant {
            Instant::now()
        }

        async fn sleep_until(&self, instant: tokio::time::Instant) {
            tokio::time::sleep_until(instant).await;
        }
    }

    fn aggregator_at(clock: &TestClock) -> Aggregator {
        Aggregator::new(GlobalStore::default(), Box::new(clock.clone()))
    }

    #[test]
    fn record_time_sums_all_parallel_counters() {
        let clock = TestClock::at(2024, 3, 5, 10);
        let mut aggregator = aggregator_at(&clock);
        let root = Path::new("/home/dev/alpha");

        aggregator.record_time(root, "rust", "src/main.rs", 1);
        aggregator.record_time(root, "rust", "src/lib.rs", 1);
        aggregator.record_time(root, "toml", "Cargo.toml", 3);

        let project = aggregator.project_entry(root);
        let day = project.days.get("2024-03-05").unwrap();
        assert_eq!(day.seconds, 5);
        assert_eq!(day.hours.get("10"), Some(&5));
        assert_eq!(day.languages.get("rust").unwrap().seconds, 2);
        assert_eq!(day.languages.get("toml").unwrap().seconds, 3);
        assert_eq!(day.files.get("src/main.rs"), Some(&1));
        assert_eq!(day.files.get("Cargo.toml"), Some(&3));

        assert_eq!(aggregator.session().seconds, 5);
        assert_eq!(aggregator.session().languages.get("rust"), Some(&2));
    }

    #[test]
    fn record_time_splits_across_hours() {
        let clock = TestClock::at(2024, 3, 5, 10);
        let mut aggregator = aggregator_at(&clock);
        let root = Path::new("/home/dev/alpha");

        aggregator.record_time(root, "rust", "src/main.rs", 1);
        clock.advance(3600);
        aggregator.record_time(root, "rust", "src/main.rs", 1);

        let day = aggregator
            .project_entry(root)
            .days
            .get("2024-03-05")
            .unwrap()
            .clone();
        assert_eq!(day.hours.get("10"), Some(&1));
        assert_eq!(day.hours.get("11"), Some(&1));
        assert_eq!(day.seconds, 2);
    }

    #[test]
    fn record_lines_zero_zero_is_a_no_op() {
        let clock = TestClock::at(2024, 3, 5, 10);
        let mut aggregator = aggregator_at(&clock);

        aggregator.record_lines(Path::new("/home/dev/alpha"), 0, 0);

        assert!(aggregator.store().projects.is_empty());
        assert_eq!(aggregator.session().lines_added, 0);
        assert_eq!(aggregator.session().lines_deleted, 0);
    }

    #[test]
    fn record_lines_updates_day_and_session() {
        let clock = TestClock::at(2024, 3, 5, 10);
        let mut aggregator = aggregator_at(&clock);
        let root = Path::new("/home/dev/alpha");

        aggregator.record_lines(root, 5, 0);
        aggregator.record_lines(root, 0, 2);

        let day = aggregator
            .project_entry(root)
            .days
            .get("2024-03-05")
            .unwrap()
            .clone();
        assert_eq!(day.lines_added, 5);
        assert_eq!(day.lines_deleted, 2);
        assert_eq!(aggregator.session().lines_added, 5);
        assert_eq!(aggregator.session().lines_deleted, 2);
    }

    #[test]
    fn record_time_repairs_day_loaded_without_files() {
        let raw = r#"{
            "dailyGoal": 14400,
            "projects": {
                "/home/dev/alpha": {
                    "name": "alpha",
                    "path": "/home/dev/alpha",
                    "days": {
                        "2024-03-05": { "date": "2024-03-05", "seconds": 10 }
                    }
                }
            }
        }"#;
        let store: GlobalStore = serde_json::from_str(raw).unwrap();
        let clock = TestClock::at(2024, 3, 5, 10);
        let mut aggregator = Aggregator::new(store, Box::new(clock));
        let root = Path::new("/home/dev/alpha");

        aggregator.record_time(root, "rust", "src/main.rs", 1);

        let day = aggregator
            .project_entry(root)
            .days
            .get("2024-03-05")
            .unwrap()
            .clone();
        assert_eq!(day.seconds, 11);
        assert_eq!(day.files.get("src/main.rs"), Some(&1));
    }

    #[test]
    fn daily_goal_falls_back_on_invalid_stored_values() {
        let clock = TestClock::at(2024, 3, 5, 10);

        let mut aggregator = aggregator_at(&clock);
        assert_eq!(aggregator.daily_goal(), 14400);

        aggregator.set_daily_goal(2.0);
        assert_eq!(aggregator.daily_goal(), 7200);

        let zeroed = Aggregator::new(
            GlobalStore {
                daily_goal: 0,
                ..GlobalStore::default()
            },
            Box::new(clock.clone()),
        );
        assert_eq!(zeroed.daily_goal(), 14400);

        let negative = Aggregator::new(
            GlobalStore {
                daily_goal: -60,
                ..GlobalStore::default()
            },
            Box::new(clock),
        );
        assert_eq!(negative.daily_goal(), 14400);
    }

    #[test]
    fn path_variants_resolve_to_one_project() {
        let clock = TestClock::at(2024, 3, 5, 10);
        let mut aggregator = aggregator_at(&clock);

        aggregator.record_time(Path::new("/Foo/Bar"), "rust", "a.rs", 1);
        aggregator.record_time(Path::new("/foo/bar"), "rust", "a.rs", 1);
        aggregator.record_time(Path::new("/foo/bar/"), "rust", "a.rs", 1);

        assert_eq!(aggregator.store().projects.len(), 1);
        let project = aggregator.store().projects.values().next().unwrap();
        assert_eq!(project.days.get("2024-03-05").unwrap().seconds, 3);
    }

    #[test]
    fn separator_variants_share_a_key() {
        assert_eq!(
            normalize_project_key(Path::new("C:\\Foo\\Bar")),
            normalize_project_key(Path::new("c:/foo/bar")),
        );
    }

    #[test]
    fn today_total_spans_projects_but_not_other_days() {
        let clock = TestClock::at(2024, 3, 5, 10);
        let mut aggregator = aggregator_at(&clock);

        aggregator.record_time(Path::new("/home/dev/alpha"), "rust", "a.rs", 4);
        aggregator.record_time(Path::new("/home/dev/beta"), "go", "b.go", 6);

        // Yesterday's bucket must not contribute.
        let project = aggregator.project_entry(Path::new("/home/dev/alpha"));
        project.days.insert(
            "2024-03-04".into(),
            Day {
                date: "2024-03-04".into(),
                seconds: 100,
                ..Day::default()
            },
        );

        assert_eq!(aggregator.today_total_seconds(), 10);
    }

    #[test]
    fn snapshot_spotlights_last_project() {
        let clock = TestClock::at(2024, 3, 5, 10);
        let mut aggregator = aggregator_at(&clock);
        let root = Path::new("/home/dev/alpha");
        aggregator.record_time(root, "rust", "a.rs", 2);

        let snapshot = aggregator.snapshot(Some(Path::new("/HOME/dev/Alpha")));
        assert_eq!(snapshot.project.unwrap().name, "alpha");
        assert_eq!(snapshot.projects.len(), 1);
        assert_eq!(snapshot.today_total_seconds, 2);
        assert_eq!(snapshot.daily_goal_seconds, 14400);

        let unknown = aggregator.snapshot(Some(Path::new("/nowhere")));
        assert!(unknown.project.is_none());
    }
}
