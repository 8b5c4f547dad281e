/// Block list and warning delay management
use anyhow::{bail, Result};
use mindful_core::{
    blocklist::{clean_domain, is_valid_domain},
    config::open_database,
};
use mindful_storage::{Database, Settings, DEFAULT_BLOCK_LIST, MIN_WARNING_DELAY_SECS};
use std::path::PathBuf;
use tabled::{Table, Tabled};

use super::helpers::{notify_reload, resolve_socket};

#[derive(Tabled)]
struct SiteRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "Domain")]
    domain: String,
    #[tabled(rename = "Default")]
    default: &'static str,
}

pub fn handle_sites_list() -> Result<()> {
    let db = open_database()?;
    let settings = db.get_settings()?;

    if settings.block_list.is_empty() {
        println!("No sites blocked. Add one with: mindful sites add <domain>");
        return Ok(());
    }

    let rows: Vec<SiteRow> = settings
        .block_list
        .iter()
        .enumerate()
        .map(|(i, domain)| SiteRow {
            index: i + 1,
            domain: domain.clone(),
            default: if DEFAULT_BLOCK_LIST.contains(&domain.as_str()) {
                "yes"
            } else {
                ""
            },
        })
        .collect();

    println!("{}", Table::new(rows));
    println!("Lockdown after {}s", settings.effective_delay_secs());
    Ok(())
}

pub async fn handle_sites_add(input: &str, socket: Option<PathBuf>) -> Result<()> {
    let db = open_database()?;
    let mut settings = db.get_settings()?;
    let domain = add_site(&mut settings, input)?;
    save(&db, &settings, socket).await?;
    println!("Blocked {domain}");
    Ok(())
}

pub async fn handle_sites_remove(input: &str, socket: Option<PathBuf>) -> Result<()> {
    let db = open_database()?;
    let mut settings = db.get_settings()?;
    let domain = remove_site(&mut settings, input)?;
    save(&db, &settings, socket).await?;
    println!("Unblocked {domain}");
    Ok(())
}

pub fn handle_delay_show() -> Result<()> {
    let db = open_database()?;
    let settings = db.get_settings()?;
    println!("warning_delay = {}s", settings.effective_delay_secs());
    Ok(())
}

pub async fn handle_delay_set(seconds: u32, socket: Option<PathBuf>) -> Result<()> {
    let db = open_database()?;
    let mut settings = db.get_settings()?;
    set_delay(&mut settings, seconds)?;
    save(&db, &settings, socket).await?;
    println!("Set warning_delay = {seconds}s");
    Ok(())
}

async fn save(db: &Database, settings: &Settings, socket: Option<PathBuf>) -> Result<()> {
    db.update_settings(settings)?;
    notify_reload(&resolve_socket(socket)?).await;
    Ok(())
}

fn add_site(settings: &mut Settings, input: &str) -> Result<String> {
    let domain = clean_domain(input);
    if domain.is_empty() {
        bail!("No domain given");
    }
    if !is_valid_domain(&domain) {
        bail!("Invalid domain: {domain}");
    }
    if settings.block_list.contains(&domain) {
        bail!("Already added: {domain}");
    }

    settings.block_list.push(domain.clone());
    Ok(domain)
}

fn remove_site(settings: &mut Settings, input: &str) -> Result<String> {
    let domain = clean_domain(input);
    let before = settings.block_list.len();
    settings.block_list.retain(|site| *site != domain);

    if settings.block_list.len() == before {
        bail!("{domain} is not on the block list");
    }
    Ok(domain)
}

fn set_delay(settings: &mut Settings, seconds: u32) -> Result<()> {
    if seconds < MIN_WARNING_DELAY_SECS {
        bail!("Warning delay must be at least {MIN_WARNING_DELAY_SECS}s");
    }
    settings.warning_delay = seconds;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_site_cleans_input() {
        let mut settings = Settings::default_settings();
        let domain = add_site(&mut settings, "  https://www.Reddit.com/r/rust ").unwrap();

        assert_eq!(domain, "reddit.com");
        assert_eq!(settings.block_list.last().unwrap(), "reddit.com");
    }

    #[test]
    fn test_add_site_rejects_duplicates_and_garbage() {
        let mut settings = Settings::default_settings();

        assert!(add_site(&mut settings, "x.com").is_err());
        assert!(add_site(&mut settings, "not a domain").is_err());
        assert!(add_site(&mut settings, "https://").is_err());
        assert_eq!(settings.block_list.len(), DEFAULT_BLOCK_LIST.len());
    }

    #[test]
    fn test_remove_site() {
        let mut settings = Settings::default_settings();

        assert_eq!(
            remove_site(&mut settings, "www.youtube.com").unwrap(),
            "youtube.com"
        );
        assert!(!settings.block_list.contains(&"youtube.com".to_string()));
        assert!(remove_site(&mut settings, "youtube.com").is_err());
    }

    #[test]
    fn test_set_delay_rejects_zero() {
        let mut settings = Settings::default_settings();

        assert!(set_delay(&mut settings, 0).is_err());
        set_delay(&mut settings, 30).unwrap();
        assert_eq!(settings.warning_delay, 30);
    }

    #[tokio::test]
    async fn test_save_without_live_context() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::new(&dir.path().join("mindful.db")).unwrap();
        let mut settings = db.get_settings().unwrap();
        add_site(&mut settings, "reddit.com").unwrap();

        save(&db, &settings, Some(dir.path().join("none.sock")))
            .await
            .unwrap();
        assert!(db
            .get_settings()
            .unwrap()
            .block_list
            .contains(&"reddit.com".to_string()));
    }
}
