use serde::{Deserialize, Serialize};

/// Key holding the ordered list of blocked domains
pub const BLOCK_LIST_KEY: &str = "blockList";
/// Key holding the lockdown delay in seconds
pub const WARNING_DELAY_KEY: &str = "warningDelay";
/// Key holding the last snapshot published by a browsing context
pub const TIMER_STATE_KEY: &str = "timerState";

/// Domains seeded on first run when no block list exists yet
pub const DEFAULT_BLOCK_LIST: [&str; 5] = [
    "instagram.com",
    "twitter.com",
    "x.com",
    "youtube.com",
    "facebook.com",
];

pub const DEFAULT_WARNING_DELAY_SECS: u32 = 10;
pub const MIN_WARNING_DELAY_SECS: u32 = 1;

/// User settings read by every browsing context
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// Ordered for display; order is irrelevant for matching
    pub block_list: Vec<String>,
    pub warning_delay: u32,
}

impl Settings {
    #[must_use]
    pub fn default_settings() -> Self {
        Self {
            block_list: DEFAULT_BLOCK_LIST.iter().map(ToString::to_string).collect(),
            warning_delay: DEFAULT_WARNING_DELAY_SECS,
        }
    }

    /// Delay before lockdown in seconds.
    ///
    /// A stored zero means "unset" and falls back to the default.
    #[must_use]
    pub fn effective_delay_secs(&self) -> u32 {
        if self.warning_delay == 0 {
            DEFAULT_WARNING_DELAY_SECS
        } else {
            self.warning_delay.max(MIN_WARNING_DELAY_SECS)
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::default_settings()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings_seed_five_domains() {
        let settings = Settings::default();
        assert_eq!(settings.block_list.len(), 5);
        assert!(settings.block_list.contains(&"x.com".to_string()));
        assert_eq!(settings.warning_delay, 10);
    }

    #[test]
    fn test_zero_delay_falls_back_to_default() {
        let settings = Settings {
            block_list: Vec::new(),
            warning_delay: 0,
        };
        assert_eq!(settings.effective_delay_secs(), DEFAULT_WARNING_DELAY_SECS);
    }

    #[test]
    fn test_positive_delay_is_kept() {
        let settings = Settings {
            block_list: Vec::new(),
            warning_delay: 3,
        };
        assert_eq!(settings.effective_delay_secs(), 3);
    }

    #[test]
    fn test_settings_serialize_with_store_key_names() {
        let json = serde_json::to_value(Settings::default()).unwrap();
        assert!(json.get("blockList").is_some());
        assert!(json.get("warningDelay").is_some());
    }
}
