use mindful_storage::Database;

use crate::{
    blocklist::{normalize_domain, BlockFilter},
    config::load_settings,
    error::IpcError,
    ipc::IpcClient,
    snapshot::TimerSnapshot,
};

/// Where an observer's snapshot came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotSource {
    Live,
    Stored,
    Placeholder,
}

impl SnapshotSource {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Live => "live",
            Self::Stored => "stored",
            Self::Placeholder => "placeholder",
        }
    }
}

/// Snapshot an observer should display for `hostname`.
///
/// `None` means the hostname is not blocked and the timer view stays hidden.
/// Otherwise the live context is asked first, then the last published
/// snapshot is used, then a placeholder built from the configured delay.
/// A live context whose session belongs to another domain has nothing to
/// say about `hostname`, so the placeholder is shown instead.
pub async fn observe(
    hostname: &str,
    database: &Database,
    client: Option<&IpcClient>,
) -> Option<(TimerSnapshot, SnapshotSource)> {
    let settings = load_settings(database);
    if !BlockFilter::from_settings(&settings).is_blocked(hostname) {
        return None;
    }
    let placeholder = || {
        Some((
            TimerSnapshot::placeholder(settings.effective_delay_secs()),
            SnapshotSource::Placeholder,
        ))
    };

    if let Some(client) = client {
        match live_snapshot(client, hostname).await {
            Ok(Some(snapshot)) => return Some((snapshot, SnapshotSource::Live)),
            Ok(None) => {
                log::debug!("Live context is on another domain than {hostname}");
                return placeholder();
            }
            Err(e) => log::debug!("Live timer state unavailable: {e}"),
        }
    }

    match database.load_timer_state::<TimerSnapshot>() {
        Ok(Some(snapshot)) => return Some((snapshot, SnapshotSource::Stored)),
        Ok(None) => {}
        Err(e) => log::warn!("Stored timer state unreadable: {e:#}"),
    }

    placeholder()
}

async fn live_snapshot(
    client: &IpcClient,
    hostname: &str,
) -> Result<Option<TimerSnapshot>, IpcError> {
    let domain = client.current_domain().await?;
    if domain.as_deref() != Some(normalize_domain(hostname)) {
        return Ok(None);
    }
    client.get_timer_state().await.map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::PresentError,
        ipc::{listen, ContextIpcHandler},
        messages::WarningMessage,
        presenter::Presenter,
        runtime::SessionRuntime,
        snapshot::SessionState,
    };
    use mindful_storage::Settings;
    use rand::{rngs::StdRng, SeedableRng};
    use std::sync::Arc;

    struct NullPresenter;

    impl Presenter for NullPresenter {
        fn show_lockdown(&mut self, _message: &WarningMessage) -> Result<(), PresentError> {
            Ok(())
        }
        fn hide_lockdown(&mut self) -> Result<(), PresentError> {
            Ok(())
        }
        fn show_countdown(&mut self, _intent: &str, _remaining: u64) -> Result<(), PresentError> {
            Ok(())
        }
        fn update_countdown(&mut self, _remaining: u64) -> Result<(), PresentError> {
            Ok(())
        }
        fn hide_countdown(&mut self) -> Result<(), PresentError> {
            Ok(())
        }
        fn close_context(&mut self) -> Result<(), PresentError> {
            Ok(())
        }
    }

    fn db(block_list: &[&str], delay: u32) -> Database {
        let db = Database::in_memory().unwrap();
        db.update_settings(&Settings {
            block_list: block_list.iter().map(ToString::to_string).collect(),
            warning_delay: delay,
        })
        .unwrap();
        db
    }

    #[tokio::test]
    async fn test_hidden_for_unblocked_host() {
        let db = db(&["x.com"], 10);
        assert!(observe("example.org", &db, None).await.is_none());
    }

    #[tokio::test]
    async fn test_placeholder_without_any_state() {
        let db = db(&["x.com"], 25);
        let (snapshot, source) = observe("x.com", &db, None).await.unwrap();

        assert_eq!(source, SnapshotSource::Placeholder);
        assert_eq!(snapshot.state, SessionState::Idle);
        assert_eq!(snapshot.time_until_lockdown, 25);
        assert!(snapshot.is_blocked);
    }

    #[tokio::test]
    async fn test_stored_snapshot_when_context_unreachable() {
        let dir = tempfile::tempdir().unwrap();
        let db = db(&["x.com"], 10);
        let stored = TimerSnapshot {
            state: SessionState::Locked,
            time_spent_seconds: 10,
            time_until_lockdown: 0,
            intent: String::new(),
            is_blocked: true,
        };
        db.save_timer_state(&stored).unwrap();

        let client = IpcClient::new(&dir.path().join("gone.sock"));
        let (snapshot, source) = observe("www.x.com", &db, Some(&client)).await.unwrap();

        assert_eq!(source, SnapshotSource::Stored);
        assert_eq!(snapshot, stored);
    }

    #[tokio::test]
    async fn test_live_snapshot_only_for_the_context_domain() {
        let dir = tempfile::tempdir().unwrap();
        let sock_path = dir.path().join("ctx.sock");
        let context_db = Arc::new(db(&["x.com", "instagram.com"], 30));

        let runtime = SessionRuntime::with_rng(
            NullPresenter,
            context_db.clone(),
            StdRng::seed_from_u64(7),
        );
        let handle = runtime.handle();
        let runtime_task = tokio::spawn(runtime.run());
        let handler = Arc::new(ContextIpcHandler::new(handle.clone()));
        let listen_path = sock_path.clone();
        let server = tokio::spawn(async move { listen(handler, &listen_path).await });
        while !sock_path.exists() {
            tokio::task::yield_now().await;
        }

        handle.navigate("www.instagram.com").unwrap();
        let client = IpcClient::new(&sock_path);

        let (snapshot, source) = observe("instagram.com", &context_db, Some(&client))
            .await
            .unwrap();
        assert_eq!(source, SnapshotSource::Live);
        assert_eq!(snapshot.state, SessionState::Tracking);

        let (snapshot, source) = observe("x.com", &context_db, Some(&client))
            .await
            .unwrap();
        assert_eq!(source, SnapshotSource::Placeholder);
        assert_eq!(snapshot.state, SessionState::Idle);
        assert_eq!(snapshot.time_until_lockdown, 30);

        handle.shutdown().unwrap();
        runtime_task.await.unwrap().unwrap();
        server.abort();
    }
}
