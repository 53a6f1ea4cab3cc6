//! Duration formatting for status and report output.

/// `HH:MM:SS`; negative inputs clamp to zero.
pub fn format_hms(seconds: i64) -> String {
    let s = seconds.max(0);
    format!("{:02}:{:02}:{:02}", s / 3600, (s % 3600) / 60, s % 60)
}

/// `HH:MM`, seconds truncated.
pub fn format_hm(seconds: i64) -> String {
    let s = seconds.max(0);
    format!("{:02}:{:02}", s / 3600, (s % 3600) / 60)
}
