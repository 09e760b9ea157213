//! User preferences persisted next to the entry file.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::error::{Result, TicketError};

pub const SETTINGS_FILE: &str = "settings.json";

/// Shortest reminder interval, in minutes.
pub const MIN_REMINDER_INTERVAL: u32 = 1;
/// Longest reminder interval (one day), in minutes.
pub const MAX_REMINDER_INTERVAL: u32 = 1440;
pub const DEFAULT_REMINDER_INTERVAL: u32 = 60;

/// How much of the table the interactive session shows at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ViewMode {
    #[default]
    #[serde(alias = "full", alias = "FULL")]
    Full,
    #[serde(alias = "compact", alias = "COMPACT")]
    Compact,
}

impl ViewMode {
    pub fn toggled(self) -> Self {
        match self {
            ViewMode::Full => ViewMode::Compact,
            ViewMode::Compact => ViewMode::Full,
        }
    }
}

impl std::fmt::Display for ViewMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ViewMode::Full => write!(f, "Full"),
            ViewMode::Compact => write!(f, "Compact"),
        }
    }
}

impl std::str::FromStr for ViewMode {
    type Err = TicketError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "full" => Ok(ViewMode::Full),
            "compact" => Ok(ViewMode::Compact),
            _ => Err(TicketError::InvalidSetting(format!("view mode '{}'", s))),
        }
    }
}

/// Unit the reminder interval is entered in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IntervalUnit {
    #[default]
    Minutes,
    Hours,
}

impl std::str::FromStr for IntervalUnit {
    type Err = TicketError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "m" | "min" | "mins" | "minute" | "minutes" => Ok(IntervalUnit::Minutes),
            "h" | "hr" | "hrs" | "hour" | "hours" => Ok(IntervalUnit::Hours),
            _ => Err(TicketError::InvalidSetting(format!("interval unit '{}'", s))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub reminders_enabled: bool,
    /// Minutes between reminders, always within
    /// [`MIN_REMINDER_INTERVAL`]..=[`MAX_REMINDER_INTERVAL`].
    #[serde(deserialize_with = "deserialize_interval")]
    pub reminder_interval: u32,
    pub default_view_mode: ViewMode,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            reminders_enabled: true,
            reminder_interval: DEFAULT_REMINDER_INTERVAL,
            default_view_mode: ViewMode::Full,
        }
    }
}

fn clamp_interval(minutes: i64) -> u32 {
    minutes.clamp(
        i64::from(MIN_REMINDER_INTERVAL),
        i64::from(MAX_REMINDER_INTERVAL),
    ) as u32
}

fn deserialize_interval<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<u32, D::Error> {
    let minutes = i64::deserialize(deserializer)?;
    Ok(clamp_interval(minutes))
}

impl Settings {
    /// Read settings from `path`. A missing or unreadable file yields the
    /// defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_slice::<Settings>(&bytes) {
            Ok(mut settings) => {
                settings.clamp();
                Ok(settings)
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "settings file is malformed, using defaults");
                Ok(Self::default())
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        debug!(path = %path.display(), "saved settings");
        Ok(())
    }

    pub fn clamp(&mut self) {
        self.reminder_interval = clamp_interval(i64::from(self.reminder_interval));
    }

    /// Set the reminder interval from an amount and unit as a user would
    /// enter them. The amount is raised to at least 1 and the total is
    /// capped at one day.
    pub fn set_interval(&mut self, amount: i64, unit: IntervalUnit) {
        let amount = amount.max(1);
        let total = match unit {
            IntervalUnit::Minutes => amount,
            IntervalUnit::Hours => amount.saturating_mul(60),
        };
        self.reminder_interval = clamp_interval(total);
    }

    /// The interval the way it is presented: whole hours as hours, anything
    /// else in minutes.
    pub fn interval_display(&self) -> (u32, IntervalUnit) {
        if self.reminder_interval % 60 == 0 {
            (self.reminder_interval / 60, IntervalUnit::Hours)
        } else {
            (self.reminder_interval, IntervalUnit::Minutes)
        }
    }
}

/// Owned, shared settings for one session.
///
/// Readers take a [`snapshot`](Self::snapshot); [`update`](Self::update) is
/// the only way to change the values and always persists them.
#[derive(Clone)]
pub struct SharedSettings {
    inner: Arc<RwLock<Settings>>,
    path: PathBuf,
}

impl SharedSettings {
    pub fn new(settings: Settings, path: impl Into<PathBuf>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(settings)),
            path: path.into(),
        }
    }

    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let settings = Settings::load(&path)?;
        Ok(Self::new(settings, path))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn snapshot(&self) -> Settings {
        self.inner.read().await.clone()
    }

    /// Apply `change`, clamp, and persist. The in-memory settings are only
    /// replaced once the file has been written.
    pub async fn update<F>(&self, change: F) -> Result<Settings>
    where
        F: FnOnce(&mut Settings),
    {
        let mut guard = self.inner.write().await;
        let mut next = guard.clone();
        change(&mut next);
        next.clamp();
        next.save(&self.path)?;
        *guard = next.clone();
        Ok(next)
    }
}
