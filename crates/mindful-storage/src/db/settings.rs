use anyhow::Result;

use super::Database;
use crate::models::{Settings, BLOCK_LIST_KEY, DEFAULT_WARNING_DELAY_SECS, WARNING_DELAY_KEY};

impl Database {
    // ==================== Settings Methods ====================

    /// Get settings, filling absent keys with defaults.
    ///
    /// Nothing is written back; seeding happens only in [`Database::seed_defaults`].
    ///
    /// # Errors
    ///
    /// Returns an error if a query fails or a stored value is malformed
    pub fn get_settings(&self) -> Result<Settings> {
        let defaults = Settings::default_settings();

        let block_list = self
            .get_value::<Vec<String>>(BLOCK_LIST_KEY)?
            .unwrap_or(defaults.block_list);
        let warning_delay = self
            .get_value::<u32>(WARNING_DELAY_KEY)?
            .unwrap_or(DEFAULT_WARNING_DELAY_SECS);

        Ok(Settings {
            block_list,
            warning_delay,
        })
    }

    /// Update settings
    ///
    /// # Errors
    ///
    /// Returns an error if the database update operation or JSON serialization fails
    pub fn update_settings(&self, settings: &Settings) -> Result<()> {
        self.set_value(BLOCK_LIST_KEY, &settings.block_list)?;
        self.set_value(WARNING_DELAY_KEY, &settings.warning_delay)?;
        log::info!(
            "Settings saved ({} blocked sites, {}s delay)",
            settings.block_list.len(),
            settings.warning_delay
        );
        Ok(())
    }

    /// Install-time seeding: store the default block list unless one exists.
    ///
    /// Returns `true` when defaults were written.
    ///
    /// # Errors
    ///
    /// Returns an error if the lookup or the write fails
    pub fn seed_defaults(&self) -> Result<bool> {
        if self.has_value(BLOCK_LIST_KEY)? {
            return Ok(false);
        }

        self.set_value(BLOCK_LIST_KEY, &Settings::default_settings().block_list)?;
        log::info!("Seeded default block list");
        Ok(true)
    }
}
