use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Workflow state of a ticket.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum EntryState {
    #[default]
    New,
    InProgress,
    OnHold,
    Resolved,
    Cancelled,
    /// A value found in the entry file that is none of the above. Kept
    /// verbatim so saving writes it back unchanged.
    Other(String),
}

impl EntryState {
    pub const ALL: [EntryState; 5] = [
        EntryState::New,
        EntryState::InProgress,
        EntryState::OnHold,
        EntryState::Resolved,
        EntryState::Cancelled,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            EntryState::New => "New",
            EntryState::InProgress => "In Progress",
            EntryState::OnHold => "On Hold",
            EntryState::Resolved => "Resolved",
            EntryState::Cancelled => "Cancelled",
            EntryState::Other(raw) => raw,
        }
    }
}

impl std::fmt::Display for EntryState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for EntryState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace(['-', '_'], " ").as_str() {
            "new" => Ok(EntryState::New),
            "in progress" | "inprogress" => Ok(EntryState::InProgress),
            "on hold" | "onhold" => Ok(EntryState::OnHold),
            "resolved" => Ok(EntryState::Resolved),
            "cancelled" | "canceled" => Ok(EntryState::Cancelled),
            _ => Err(format!("Invalid entry state: {}", s)),
        }
    }
}

impl Serialize for EntryState {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl EntryState {
    /// Interpret a state read from the entry file. Unrecognized values are
    /// preserved as [`EntryState::Other`].
    pub fn from_stored(raw: &str) -> Self {
        raw.parse().unwrap_or_else(|_| {
            tracing::warn!(state = %raw, "unknown entry state, keeping it as is");
            EntryState::Other(raw.to_string())
        })
    }
}

impl<'de> Deserialize<'de> for EntryState {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(EntryState::from_stored(&raw))
    }
}
