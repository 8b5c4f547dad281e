//! First-time setup: create the store and seed the default block list

use anyhow::Result;
use mindful_core::config::{get_data_dir, open_database};
use mindful_storage::Database;

/// Initialize mindful
///
/// # Errors
///
/// Returns an error if the data directory or the store cannot be created
pub fn init_command() -> Result<()> {
    println!("Initializing Mindful...\n");

    let data_dir = get_data_dir()?;
    let db = open_database()?;
    println!("Data directory: {}", data_dir.display());

    if seed_store(&db)? {
        println!("Seeded default block list.");
    } else {
        println!("Block list already configured, leaving it untouched.");
    }

    let settings = db.get_settings()?;
    println!(
        "\nBlocking {} site(s), lockdown after {}s.",
        settings.block_list.len(),
        settings.effective_delay_secs()
    );
    println!("Open a browsing context with: mindful browse <host>");

    Ok(())
}

fn seed_store(db: &Database) -> Result<bool> {
    let seeded = db.seed_defaults()?;
    if seeded {
        log::info!("Installed default block list");
    }
    Ok(seeded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mindful_storage::{Settings, DEFAULT_BLOCK_LIST};

    #[test]
    fn test_seed_store_only_once() {
        let db = Database::in_memory().unwrap();

        assert!(seed_store(&db).unwrap());
        assert_eq!(db.get_settings().unwrap().block_list, DEFAULT_BLOCK_LIST);

        db.update_settings(&Settings {
            block_list: vec!["reddit.com".to_string()],
            warning_delay: 10,
        })
        .unwrap();
        assert!(!seed_store(&db).unwrap());
        assert_eq!(
            db.get_settings().unwrap().block_list,
            vec!["reddit.com".to_string()]
        );
    }
}
