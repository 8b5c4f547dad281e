//! Helper utility functions for CLI commands

use anyhow::Result;
use mindful_core::{config::default_socket_path, format_clock, IpcClient, TimerSnapshot};
use std::path::{Path, PathBuf};

/// Safely truncate a string to a maximum number of characters (not bytes).
pub fn truncate_str(s: &str, max_chars: usize) -> String {
    let char_count = s.chars().count();
    if char_count > max_chars {
        let truncated: String = s.chars().take(max_chars).collect();
        format!("{truncated}...")
    } else {
        s.to_string()
    }
}

/// Socket given on the command line, or the default one in the data dir.
pub fn resolve_socket(socket: Option<PathBuf>) -> Result<PathBuf> {
    match socket {
        Some(path) => Ok(path),
        None => default_socket_path(),
    }
}

/// Tell a live browsing context that settings changed. Best effort.
pub async fn notify_reload(sock_path: &Path) {
    let client = IpcClient::new(sock_path);
    match client.reload_settings().await {
        Ok(success) => log::debug!("Browsing context reloaded settings: {success}"),
        Err(e) => log::debug!("No browsing context reloaded settings: {e}"),
    }
}

/// Multi-line timer view shared by `status` and the browse `state` command.
pub fn format_snapshot(snapshot: &TimerSnapshot) -> String {
    let mut lines = vec![
        format!("  State:          {}", snapshot.state),
        format!(
            "  Time spent:     {}",
            format_clock(snapshot.time_spent_seconds)
        ),
        format!(
            "  Until lockdown: {}",
            format_clock(snapshot.time_until_lockdown)
        ),
    ];
    if !snapshot.intent.is_empty() {
        lines.push(format!("  Intent:         {}", truncate_str(&snapshot.intent, 48)));
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use mindful_core::SessionState;

    #[test]
    fn test_truncate_str_short() {
        assert_eq!(truncate_str("hello", 10), "hello");
    }

    #[test]
    fn test_truncate_str_long() {
        assert_eq!(truncate_str("hello world", 5), "hello...");
    }

    #[test]
    fn test_resolve_socket_prefers_explicit_path() {
        let path = PathBuf::from("/tmp/ctx.sock");
        assert_eq!(resolve_socket(Some(path.clone())).unwrap(), path);
    }

    #[test]
    fn test_format_snapshot_unlocked() {
        let text = format_snapshot(&TimerSnapshot {
            state: SessionState::Unlocked,
            time_spent_seconds: 10,
            time_until_lockdown: 59,
            intent: "need to reply to client".to_string(),
            is_blocked: true,
        });

        assert!(text.contains("State:          unlocked"));
        assert!(text.contains("Time spent:     00:10"));
        assert!(text.contains("Until lockdown: 00:59"));
        assert!(text.contains("Intent:         need to reply to client"));
    }

    #[test]
    fn test_format_snapshot_hides_empty_intent() {
        let text = format_snapshot(&TimerSnapshot::placeholder(10));
        assert!(!text.contains("Intent"));
        assert!(text.contains("Until lockdown: 00:10"));
    }
}
