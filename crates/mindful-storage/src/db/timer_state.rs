use anyhow::Result;
use serde::{de::DeserializeOwned, Serialize};

use super::Database;
use crate::models::TIMER_STATE_KEY;

impl Database {
    /// Write-through cache of the latest published snapshot. Last write wins
    /// when several contexts publish.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails
    pub fn save_timer_state<T: Serialize>(&self, snapshot: &T) -> Result<()> {
        self.set_value(TIMER_STATE_KEY, snapshot)
    }

    /// Load the last published snapshot, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or the stored snapshot is malformed
    pub fn load_timer_state<T: DeserializeOwned>(&self) -> Result<Option<T>> {
        self.get_value(TIMER_STATE_KEY)
    }
}

#[cfg(test)]
mod tests {
    use crate::Database;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Probe {
        state: String,
        seconds: u64,
    }

    #[test]
    fn test_last_write_wins() {
        let db = Database::in_memory().unwrap();
        db.save_timer_state(&Probe {
            state: "tracking".to_string(),
            seconds: 3,
        })
        .unwrap();
        db.save_timer_state(&Probe {
            state: "locked".to_string(),
            seconds: 10,
        })
        .unwrap();

        let loaded: Option<Probe> = db.load_timer_state().unwrap();
        assert_eq!(
            loaded,
            Some(Probe {
                state: "locked".to_string(),
                seconds: 10,
            })
        );
    }

    #[test]
    fn test_load_without_publish_is_none() {
        let db = Database::in_memory().unwrap();
        let loaded: Option<Probe> = db.load_timer_state().unwrap();
        assert!(loaded.is_none());
    }
}
