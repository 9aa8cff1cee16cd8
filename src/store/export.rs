use std::fmt::Write;

use super::entities::GlobalStore;

/// Flattens the store into one CSV row per (project, day) pair, in map
/// iteration order. Read-only; no sort guarantee beyond the map order.
pub fn generate_csv(store: &GlobalStore) -> String {
    let mut csv = String::from("Project,Date,Seconds,LinesAdded,LinesDeleted,Keystrokes\n");
    for project in store.projects.values() {
        for day in project.days.values() {
            // Write into a String can't fail
            let _ = writeln!(
                csv,
                "\"{}\",\"{}\",{},{},{},{}",
                project.name,
                day.date,
                day.seconds,
                day.lines_added,
                day.lines_deleted,
                day.keystrokes,
            );
        }
    }
    csv
}
