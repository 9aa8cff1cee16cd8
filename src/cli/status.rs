use ansi_term::Colour::{Green, Yellow};

pub fn format_duration(total_seconds: u64) -> String {
    format!(
        "{:02}:{:02}:{:02}",
        total_seconds / 3600,
        total_seconds % 3600 / 60,
        total_seconds % 60
    )
}

/// Progress towards the goal, floored and capped at 100.
pub fn goal_percent(total_seconds: u64, goal_seconds: u64) -> u64 {
    if goal_seconds == 0 {
        return 0;
    }
    u64::min(100, total_seconds * 100 / goal_seconds)
}

pub fn render_status(total_seconds: u64, goal_seconds: u64) -> String {
    let formatted = format_duration(total_seconds);
    let percent = goal_percent(total_seconds, goal_seconds);
    let line = format!("{formatted} today, {percent}% of the daily goal");
    if percent >= 100 {
        format!("{} {line}", Green.paint("✔"))
    } else {
        format!("{} {line}", Yellow.paint("·"))
    }
}
