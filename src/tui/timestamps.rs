use chrono::{DateTime, Datelike, Utc};

/// Compact time for the message list:
/// - "no time" when the message has none
/// - relative within a week: "2h ago", "3d ago"
/// - otherwise absolute: "Jan 15", or "Dec 3, 2024" for other years
pub fn format_list_timestamp(timestamp: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
    let Some(timestamp) = timestamp else {
        return "no time".to_string();
    };

    let duration = now.signed_duration_since(timestamp);
    if (0..7).contains(&duration.num_days()) {
        format_relative(duration.num_seconds())
    } else if timestamp.year() == now.year() {
        timestamp.format("%b %-d").to_string()
    } else {
        timestamp.format("%b %-d, %Y").to_string()
    }
}

fn format_relative(seconds: i64) -> String {
    let minutes = seconds / 60;
    let hours = minutes / 60;
    let days = hours / 24;

    if days > 0 {
        format!("{}d ago", days)
    } else if hours > 0 {
        format!("{}h ago", hours)
    } else if minutes > 0 {
        format!("{}m ago", minutes)
    } else {
        "just now".to_string()
    }
}
