use std::io::{self, Stdout, Write};

use crate::entity::Entry;
use crate::presenter::{status_line, Presenter};
use crate::settings::{IntervalUnit, Settings};
use crate::storage::StoreStats;

const COLUMNS: [(&str, usize); 7] = [
    ("#", 3),
    ("Done", 4),
    ("Timestamp", 22),
    ("Title", 30),
    ("Caller", 16),
    ("Assignment Group", 18),
    ("State", 11),
];

/// Fit `value` into `width` characters, cutting with an ellipsis and
/// flattening line breaks.
fn cell(value: &str, width: usize) -> String {
    let flat: String = value
        .chars()
        .map(|c| if c == '\n' || c == '\r' { ' ' } else { c })
        .collect();
    let len = flat.chars().count();
    if len <= width {
        format!("{}{}", flat, " ".repeat(width - len))
    } else {
        let mut cut: String = flat.chars().take(width.saturating_sub(1)).collect();
        cut.push('…');
        cut
    }
}

/// One-line description of the current settings.
pub fn settings_summary(settings: &Settings) -> String {
    let interval = match settings.interval_display() {
        (1, IntervalUnit::Hours) => "1 hour".to_string(),
        (n, IntervalUnit::Hours) => format!("{} hours", n),
        (1, IntervalUnit::Minutes) => "1 minute".to_string(),
        (n, IntervalUnit::Minutes) => format!("{} minutes", n),
    };
    format!(
        "Reminders: {}    Interval: {}    View: {}",
        if settings.reminders_enabled { "On" } else { "Off" },
        interval,
        settings.default_view_mode
    )
}

/// Renders entry tables to a terminal (or any writer).
pub struct TerminalPresenter<W: Write> {
    out: W,
}

impl TerminalPresenter<Stdout> {
    pub fn stdout() -> Self {
        Self { out: io::stdout() }
    }
}

impl<W: Write> TerminalPresenter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn row(&mut self, values: [&str; 7]) {
        let line: Vec<String> = values
            .iter()
            .zip(COLUMNS.iter())
            .map(|(value, (_, width))| cell(value, *width))
            .collect();
        let _ = writeln!(self.out, "{}", line.join("  ").trim_end());
    }
}

impl<W: Write> Presenter for TerminalPresenter<W> {
    fn render(&mut self, view: &[&Entry], stats: StoreStats, last_saved: Option<&str>) {
        if view.is_empty() {
            let _ = writeln!(self.out, "No entries.");
        } else {
            self.row(COLUMNS.map(|(name, _)| name));
            for (i, entry) in view.iter().enumerate() {
                let number = (i + 1).to_string();
                self.row([
                    &number,
                    entry.done_glyph(),
                    &entry.timestamp,
                    &entry.title,
                    &entry.caller,
                    &entry.assignment_group,
                    entry.state.as_str(),
                ]);
            }
        }
        let _ = writeln!(self.out, "{}", status_line(stats, last_saved));
        let _ = self.out.flush();
    }

    fn notify_pending(&mut self, pending: usize) {
        let _ = writeln!(
            self.out,
            "\n⏰ Reminder: You have {} pending tickets to submit.",
            pending
        );
        let _ = self.out.flush();
    }

    fn status(&mut self, message: &str) {
        let _ = writeln!(self.out, "{}", message);
        let _ = self.out.flush();
    }
}
