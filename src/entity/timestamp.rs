//! Display timestamps.
//!
//! Entries carry their creation time as a display string rather than a typed
//! datetime, so files written by older versions (or edited by hand) still
//! load. Anything that needs ordering goes through [`parse_display`].

use chrono::{Local, NaiveDateTime};

/// Canonical format, e.g. `01/02/2024 09:00:00 AM`.
pub const DISPLAY_FORMAT: &str = "%m/%d/%Y %I:%M:%S %p";

/// Format written by early versions, e.g. `2024-01-02 09:00:00`.
pub const LEGACY_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub fn parse_display(raw: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw, DISPLAY_FORMAT).ok()
}

pub fn format_display(dt: &NaiveDateTime) -> String {
    dt.format(DISPLAY_FORMAT).to_string()
}

/// Rewrite a legacy timestamp into the display format. Anything else is
/// returned unchanged, including strings that parse as neither.
pub fn normalize(raw: &str) -> String {
    match NaiveDateTime::parse_from_str(raw, LEGACY_FORMAT) {
        Ok(dt) => format_display(&dt),
        Err(_) => raw.to_string(),
    }
}

/// Current local time in the display format.
pub fn now_display() -> String {
    format_display(&Local::now().naive_local())
}
