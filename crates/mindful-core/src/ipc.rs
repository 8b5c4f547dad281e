use serde::{Deserialize, Serialize};
use std::{
    fs, io,
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::{UnixListener, UnixStream},
    time,
};

use crate::{error::IpcError, runtime::RuntimeHandle, snapshot::TimerSnapshot};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(2);

/// IPC request from an observer or the settings editor to a browsing context
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum IpcRequest {
    GetTimerState,
    /// Domain the context's session is tracking, if any
    GetDomain,
    ReloadSettings,
    CloseTab,
}

/// IPC response from a browsing context
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub enum IpcResponse {
    TimerState(TimerSnapshot),
    Domain(Option<String>),
    Reloaded { success: bool },
    Closed,
}

#[derive(Debug)]
pub struct IpcClient {
    sock_path: PathBuf,
    timeout: Duration,
}

impl IpcClient {
    #[must_use]
    pub fn new(sock_path: &Path) -> Self {
        Self {
            sock_path: sock_path.to_path_buf(),
            timeout: REQUEST_TIMEOUT,
        }
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Send one request and wait for its reply.
    ///
    /// # Errors
    ///
    /// Returns [`IpcError::NotListening`] when no context owns the socket and
    /// [`IpcError::Timeout`] when it does not answer in time.
    pub async fn send_command(&self, request: IpcRequest) -> Result<IpcResponse, IpcError> {
        if !self.sock_path.exists() {
            return Err(IpcError::NotListening(self.sock_path.clone()));
        }

        time::timeout(self.timeout, self.exchange(request))
            .await
            .map_err(|_| IpcError::Timeout)?
    }

    async fn exchange(&self, request: IpcRequest) -> Result<IpcResponse, IpcError> {
        let mut stream = UnixStream::connect(&self.sock_path)
            .await
            .map_err(|e| match e.kind() {
                io::ErrorKind::ConnectionRefused | io::ErrorKind::NotFound => {
                    IpcError::NotListening(self.sock_path.clone())
                }
                _ => IpcError::Io(e),
            })?;

        let encoded = bincode::serialize(&request)?;
        stream.write_all(&encoded).await?;
        stream.shutdown().await?;

        let mut buffer = Vec::new();
        stream.read_to_end(&mut buffer).await?;
        let response: IpcResponse = bincode::deserialize(&buffer)?;

        Ok(response)
    }

    /// Live snapshot of the context's session.
    ///
    /// # Errors
    ///
    /// Any delivery failure, or a reply of the wrong kind.
    pub async fn get_timer_state(&self) -> Result<TimerSnapshot, IpcError> {
        match self.send_command(IpcRequest::GetTimerState).await? {
            IpcResponse::TimerState(snapshot) => Ok(snapshot),
            other => Err(IpcError::Unexpected(format!("{other:?}"))),
        }
    }

    /// Domain the context's session currently belongs to.
    ///
    /// # Errors
    ///
    /// Any delivery failure, or a reply of the wrong kind.
    pub async fn current_domain(&self) -> Result<Option<String>, IpcError> {
        match self.send_command(IpcRequest::GetDomain).await? {
            IpcResponse::Domain(domain) => Ok(domain),
            other => Err(IpcError::Unexpected(format!("{other:?}"))),
        }
    }

    /// Ask the context to re-read settings and re-evaluate its page.
    ///
    /// # Errors
    ///
    /// Any delivery failure, or a reply of the wrong kind.
    pub async fn reload_settings(&self) -> Result<bool, IpcError> {
        match self.send_command(IpcRequest::ReloadSettings).await? {
            IpcResponse::Reloaded { success } => Ok(success),
            other => Err(IpcError::Unexpected(format!("{other:?}"))),
        }
    }
}

/// Answers socket requests by forwarding them into the context's event loop.
pub struct ContextIpcHandler {
    runtime: RuntimeHandle,
}

impl ContextIpcHandler {
    #[must_use]
    pub fn new(runtime: RuntimeHandle) -> Self {
        Self { runtime }
    }

    /// Answer one request on `stream`.
    ///
    /// # Errors
    ///
    /// Returns [`IpcError::ContextGone`] if the runtime has stopped, or a
    /// transport/encoding error if the reply cannot be written.
    pub async fn handle(&self, stream: &mut UnixStream, request: IpcRequest) -> Result<(), IpcError> {
        let response = self.runtime.request(request).await?;

        let encoded = bincode::serialize(&response)?;
        stream.write_all(&encoded).await?;
        Ok(())
    }
}

/// Serve requests on `sock_path` until the task is dropped.
///
/// # Errors
///
/// Returns an error if a stale socket cannot be removed or the bind fails.
pub async fn listen(handler: Arc<ContextIpcHandler>, sock_path: &Path) -> io::Result<()> {
    if sock_path.exists() {
        fs::remove_file(sock_path)?;
    }
    let listener = UnixListener::bind(sock_path)?;
    log::info!("Listening on {}", sock_path.display());

    loop {
        match listener.accept().await {
            Ok((mut stream, _)) => {
                let handler = handler.clone();
                tokio::spawn(async move {
                    let mut buf = Vec::new();
                    match stream.read_to_end(&mut buf).await {
                        Ok(n) if n > 0 => match bincode::deserialize::<IpcRequest>(&buf) {
                            Ok(request) => {
                                if let Err(e) = handler.handle(&mut stream, request).await {
                                    log::error!("IPC handle error: {e}");
                                }
                            }
                            Err(e) => {
                                log::error!("IPC deserialize error: {e}");
                            }
                        },
                        Ok(_) => {} // Connection closed
                        Err(e) => {
                            log::error!("IPC read error: {e}");
                        }
                    }
                });
            }
            Err(e) => {
                log::error!("IPC accept error: {e}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::PresentError, messages::WarningMessage, presenter::Presenter,
        runtime::SessionRuntime, snapshot::SessionState,
    };
    use mindful_storage::{Database, Settings};
    use rand::{rngs::StdRng, SeedableRng};

    struct SilentPresenter;

    impl Presenter for SilentPresenter {
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

    #[tokio::test]
    async fn test_client_reports_missing_socket() {
        let dir = tempfile::tempdir().unwrap();
        let client = IpcClient::new(&dir.path().join("absent.sock"));

        assert!(matches!(
            client.get_timer_state().await,
            Err(IpcError::NotListening(_))
        ));
    }

    #[tokio::test]
    async fn test_client_times_out_on_silent_context() {
        let dir = tempfile::tempdir().unwrap();
        let sock_path = dir.path().join("silent.sock");
        let listener = UnixListener::bind(&sock_path).unwrap();
        let silent = tokio::spawn(async move {
            let (_stream, _) = listener.accept().await.unwrap();
            std::future::pending::<()>().await;
        });

        let client = IpcClient::new(&sock_path).with_timeout(Duration::from_millis(50));
        assert!(matches!(
            client.get_timer_state().await,
            Err(IpcError::Timeout)
        ));
        silent.abort();
    }

    #[tokio::test]
    async fn test_round_trip_through_socket() {
        let dir = tempfile::tempdir().unwrap();
        let sock_path = dir.path().join("ctx.sock");

        let db = Database::in_memory().unwrap();
        db.update_settings(&Settings {
            block_list: vec!["x.com".to_string()],
            warning_delay: 30,
        })
        .unwrap();

        let runtime =
            SessionRuntime::with_rng(SilentPresenter, Arc::new(db), StdRng::seed_from_u64(1));
        let handle = runtime.handle();
        let runtime_task = tokio::spawn(runtime.run());

        let handler = Arc::new(ContextIpcHandler::new(handle.clone()));
        let listen_path = sock_path.clone();
        let server = tokio::spawn(async move { listen(handler, &listen_path).await });
        while !sock_path.exists() {
            tokio::task::yield_now().await;
        }

        handle.navigate("www.x.com").unwrap();
        let client = IpcClient::new(&sock_path);

        let snapshot = client.get_timer_state().await.unwrap();
        assert_eq!(snapshot.state, SessionState::Tracking);
        assert!(snapshot.is_blocked);

        assert_eq!(
            client.current_domain().await.unwrap().as_deref(),
            Some("x.com")
        );
        assert!(client.reload_settings().await.unwrap());

        handle.shutdown().unwrap();
        runtime_task.await.unwrap().unwrap();
        server.abort();
    }
}
