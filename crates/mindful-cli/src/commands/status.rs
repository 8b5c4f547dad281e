/// Observer view of a browsing context's timer
use anyhow::Result;
use mindful_core::{config::open_database, observe, IpcClient};
use mindful_storage::Database;
use std::{
    future::Future,
    io::{self, Write},
    path::PathBuf,
    time::Duration,
};
use tokio::time;

use super::helpers::{format_snapshot, resolve_socket};

const REFRESH: Duration = Duration::from_secs(1);
/// A live answer slower than this would miss its refresh slot.
const LIVE_TIMEOUT: Duration = Duration::from_millis(500);
const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

pub async fn status_command(host: &str, socket: Option<PathBuf>, watch: bool) -> Result<()> {
    let db = open_database()?;
    let client = IpcClient::new(&resolve_socket(socket)?).with_timeout(LIVE_TIMEOUT);

    if !watch {
        println!("{}", render_status(host, &db, &client).await);
        return Ok(());
    }

    let stop = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::error!("Failed to listen for Ctrl-C: {e}");
        }
    };
    watch_status(host, &db, &client, &mut io::stdout(), stop).await
}

async fn render_status(host: &str, db: &Database, client: &IpcClient) -> String {
    match observe(host, db, Some(client)).await {
        None => format!("{host} is not blocked"),
        Some((snapshot, source)) => format!(
            "Timer for {host} ({})\n{}",
            source.as_str(),
            format_snapshot(&snapshot)
        ),
    }
}

/// Redraw the status every second until `stop` resolves.
async fn watch_status<W: Write>(
    host: &str,
    db: &Database,
    client: &IpcClient,
    out: &mut W,
    stop: impl Future<Output = ()>,
) -> Result<()> {
    let mut ticker = time::interval(REFRESH);
    tokio::pin!(stop);

    loop {
        tokio::select! {
            () = &mut stop => return Ok(()),
            _ = ticker.tick() => {
                let frame = render_status(host, db, client).await;
                writeln!(out, "{CLEAR_SCREEN}{frame}")?;
                out.flush()?;
            }
        }
    }
}

pub async fn reload_command(socket: Option<PathBuf>) -> Result<()> {
    let sock_path = resolve_socket(socket)?;
    let client = IpcClient::new(&sock_path);

    match client.reload_settings().await {
        Ok(true) => println!("Browsing context reloaded settings"),
        Ok(false) => println!("Browsing context could not reload settings"),
        Err(e) => {
            log::error!("Failed to reload settings: {e}");
            println!("No browsing context at {}", sock_path.display());
        }
    }
    Ok(())
}
