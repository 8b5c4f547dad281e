use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    #[default]
    Idle,
    Tracking,
    Locked,
    Unlocked,
}

impl SessionState {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Tracking => "tracking",
            Self::Locked => "locked",
            Self::Unlocked => "unlocked",
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Read-only view of a session, published to the store and served over IPC
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TimerSnapshot {
    pub state: SessionState,
    /// Includes the in-progress interval while tracking
    pub time_spent_seconds: u64,
    /// Seconds until lockdown while tracking, or left in the grant while unlocked
    pub time_until_lockdown: u64,
    pub intent: String,
    pub is_blocked: bool,
}

impl TimerSnapshot {
    /// What an observer shows for a blocked site when no context answered and
    /// nothing was ever published.
    #[must_use]
    pub fn placeholder(warning_delay_secs: u32) -> Self {
        Self {
            state: SessionState::Idle,
            time_spent_seconds: 0,
            time_until_lockdown: u64::from(warning_delay_secs),
            intent: String::new(),
            is_blocked: true,
        }
    }
}

/// Format seconds as `MM:SS`. Minutes are not wrapped into hours.
#[must_use]
pub fn format_clock(seconds: u64) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_clock() {
        assert_eq!(format_clock(0), "00:00");
        assert_eq!(format_clock(9), "00:09");
        assert_eq!(format_clock(300), "05:00");
        assert_eq!(format_clock(3725), "62:05");
    }

    #[test]
    fn test_snapshot_json_field_names() {
        let json = serde_json::to_value(TimerSnapshot::placeholder(10)).unwrap();
        assert_eq!(json["state"], "idle");
        assert_eq!(json["timeSpentSeconds"], 0);
        assert_eq!(json["timeUntilLockdown"], 10);
        assert_eq!(json["isBlocked"], true);
    }

    #[test]
    fn test_state_display_matches_serde() {
        for state in [
            SessionState::Idle,
            SessionState::Tracking,
            SessionState::Locked,
            SessionState::Unlocked,
        ] {
            let json = serde_json::to_value(state).unwrap();
            assert_eq!(json, state.to_string());
        }
    }
}
