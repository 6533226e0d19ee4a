//! Human-readable rendering of review intervals.

/// Short label for an interval in days: `now`, `5d`, `1.5mo`, `2.0y`
pub fn format_interval(days: u32) -> String {
    match days {
        0 => "now".to_owned(),
        d if d >= 365 => format!("{:.1}y", f64::from(d) / 365.0),
        d if d >= 30 => format!("{:.1}mo", f64::from(d) / 30.0),
        d => format!("{d}d"),
    }
}

/// Feedback shown after a review, or `None` when the item comes back tomorrow anyway
pub fn see_you_in(days: u32) -> Option<String> {
    (days > 1).then(|| format!("See you in {days} days"))
}
