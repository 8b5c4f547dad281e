use anyhow::Result;
use chrono::{DateTime, Utc};
use mindful_storage::{Database, Settings};
use rand::{rngs::StdRng, SeedableRng};
use std::{collections::HashMap, ops::ControlFlow, sync::Arc, time::Duration};
use tokio::{
    sync::{mpsc, oneshot},
    task::JoinHandle,
    time::{self, Instant},
};

use crate::{
    config::load_settings,
    error::IpcError,
    ipc::{IpcRequest, IpcResponse},
    presenter::Presenter,
    session::{Effect, Session, TimerHandle, TimerKind},
    snapshot::TimerSnapshot,
};

/// Everything that can happen to a browsing context, processed strictly in
/// arrival order by [`SessionRuntime::run`].
#[derive(Debug)]
pub enum RuntimeEvent {
    Navigate(String),
    TimerFired(TimerHandle),
    UnlockRequested {
        intent: String,
        minutes: Option<i64>,
    },
    CloseTab,
    Request {
        request: IpcRequest,
        reply: oneshot::Sender<IpcResponse>,
    },
    Shutdown,
}

/// Cloneable sender side of a running browsing context
#[derive(Debug, Clone)]
pub struct RuntimeHandle {
    events: mpsc::UnboundedSender<RuntimeEvent>,
}

impl RuntimeHandle {
    fn send(&self, event: RuntimeEvent) -> Result<(), IpcError> {
        self.events.send(event).map_err(|_| IpcError::ContextGone)
    }

    /// Page (or single-page-app route) now shows `hostname`.
    ///
    /// # Errors
    ///
    /// Returns [`IpcError::ContextGone`] if the runtime has stopped.
    pub fn navigate(&self, hostname: impl Into<String>) -> Result<(), IpcError> {
        self.send(RuntimeEvent::Navigate(hostname.into()))
    }

    /// Submit the intent form.
    ///
    /// # Errors
    ///
    /// Returns [`IpcError::ContextGone`] if the runtime has stopped.
    pub fn request_unlock(
        &self,
        intent: impl Into<String>,
        minutes: Option<i64>,
    ) -> Result<(), IpcError> {
        self.send(RuntimeEvent::UnlockRequested {
            intent: intent.into(),
            minutes,
        })
    }

    /// The close-tab button was pressed.
    ///
    /// # Errors
    ///
    /// Returns [`IpcError::ContextGone`] if the runtime has stopped.
    pub fn close_tab(&self) -> Result<(), IpcError> {
        self.send(RuntimeEvent::CloseTab)
    }

    /// Stop the runtime without closing the context.
    ///
    /// # Errors
    ///
    /// Returns [`IpcError::ContextGone`] if the runtime has already stopped.
    pub fn shutdown(&self) -> Result<(), IpcError> {
        self.send(RuntimeEvent::Shutdown)
    }

    /// Cross-context request, answered once the runtime reaches it in order.
    ///
    /// # Errors
    ///
    /// Returns [`IpcError::ContextGone`] if the runtime stops before replying.
    pub async fn request(&self, request: IpcRequest) -> Result<IpcResponse, IpcError> {
        let (reply, response) = oneshot::channel();
        self.send(RuntimeEvent::Request { request, reply })?;
        response.await.map_err(|_| IpcError::ContextGone)
    }
}

/// Owns the [`Session`] of one browsing context and turns its effects into
/// tokio timers, presenter calls, and published snapshots.
pub struct SessionRuntime<P: Presenter> {
    session: Session,
    presenter: P,
    database: Arc<Database>,
    rng: StdRng,
    hostname: Option<String>,
    timers: HashMap<TimerHandle, JoinHandle<()>>,
    events_tx: mpsc::UnboundedSender<RuntimeEvent>,
    events_rx: mpsc::UnboundedReceiver<RuntimeEvent>,
    /// Wall clock is derived from a monotonic anchor so elapsed time stays
    /// consistent with the timers.
    anchor_wall: DateTime<Utc>,
    anchor: Instant,
}

impl<P: Presenter> SessionRuntime<P> {
    pub fn new(presenter: P, database: Arc<Database>) -> Self {
        Self::with_rng(presenter, database, StdRng::from_entropy())
    }

    /// Construct with a fixed random source for reproducible message picks.
    pub fn with_rng(presenter: P, database: Arc<Database>, rng: StdRng) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            session: Session::new(),
            presenter,
            database,
            rng,
            hostname: None,
            timers: HashMap::new(),
            events_tx,
            events_rx,
            anchor_wall: Utc::now(),
            anchor: Instant::now(),
        }
    }

    #[must_use]
    pub fn handle(&self) -> RuntimeHandle {
        RuntimeHandle {
            events: self.events_tx.clone(),
        }
    }

    /// Process events until the context is closed or shut down.
    ///
    /// # Errors
    ///
    /// Currently infallible; failures inside the loop are logged and degrade
    /// to a safe state instead of ending it.
    pub async fn run(mut self) -> Result<()> {
        log::info!("Browsing context started");

        while let Some(event) = self.events_rx.recv().await {
            if self.handle_event(event).is_break() {
                break;
            }
        }

        let effects = self.session.teardown();
        self.apply(effects);
        for (_, timer) in self.timers.drain() {
            timer.abort();
        }

        log::info!("Browsing context stopped");
        Ok(())
    }

    fn now(&self) -> DateTime<Utc> {
        let elapsed = chrono::Duration::from_std(self.anchor.elapsed())
            .unwrap_or_else(|_| chrono::Duration::zero());
        self.anchor_wall + elapsed
    }

    fn handle_event(&mut self, event: RuntimeEvent) -> ControlFlow<()> {
        match event {
            RuntimeEvent::Navigate(hostname) => {
                log::debug!("Navigated to {hostname}");
                self.hostname = Some(hostname);
                self.evaluate();
            }
            RuntimeEvent::TimerFired(handle) => {
                if handle.kind == TimerKind::Lockdown {
                    self.timers.remove(&handle);
                }
                let now = self.now();
                let effects = self.session.on_timer(handle, now, &mut self.rng);
                self.apply(effects);
            }
            RuntimeEvent::UnlockRequested { intent, minutes } => {
                let now = self.now();
                let effects = self.session.on_unlock_requested(&intent, minutes, now);
                self.apply(effects);
            }
            RuntimeEvent::CloseTab => {
                self.close_context();
                return ControlFlow::Break(());
            }
            RuntimeEvent::Request { request, reply } => {
                let close = request == IpcRequest::CloseTab;
                let response = self.answer(request);
                if reply.send(response).is_err() {
                    log::debug!("Requester went away before the reply");
                }
                if close {
                    self.close_context();
                    return ControlFlow::Break(());
                }
            }
            RuntimeEvent::Shutdown => return ControlFlow::Break(()),
        }
        ControlFlow::Continue(())
    }

    fn answer(&mut self, request: IpcRequest) -> IpcResponse {
        match request {
            IpcRequest::GetTimerState => IpcResponse::TimerState(self.session.snapshot(self.now())),
            IpcRequest::GetDomain => {
                IpcResponse::Domain(self.session.domain().map(ToString::to_string))
            }
            IpcRequest::ReloadSettings => {
                log::info!("Reloading settings");
                self.evaluate();
                IpcResponse::Reloaded { success: true }
            }
            IpcRequest::CloseTab => IpcResponse::Closed,
        }
    }

    fn evaluate(&mut self) {
        let Some(hostname) = self.hostname.clone() else {
            return;
        };
        let settings: Settings = load_settings(&self.database);
        let now = self.now();
        let effects = self.session.evaluate(&hostname, &settings, now);
        self.apply(effects);
    }

    fn close_context(&mut self) {
        match self.presenter.close_context() {
            Ok(()) => log::info!("Browsing context closed"),
            Err(e) => log::warn!("Close request failed ({e}), tearing down locally"),
        }
    }

    fn apply(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            let result = match effect {
                Effect::Arm {
                    handle,
                    after,
                    repeat,
                } => {
                    self.arm_timer(handle, after, repeat);
                    Ok(())
                }
                Effect::Disarm(handle) => {
                    if let Some(timer) = self.timers.remove(&handle) {
                        timer.abort();
                    }
                    Ok(())
                }
                Effect::ShowLockdown(message) => self.presenter.show_lockdown(message),
                Effect::HideLockdown => self.presenter.hide_lockdown(),
                Effect::ShowCountdown {
                    intent,
                    remaining_seconds,
                } => self.presenter.show_countdown(&intent, remaining_seconds),
                Effect::UpdateCountdown { remaining_seconds } => {
                    self.presenter.update_countdown(remaining_seconds)
                }
                Effect::HideCountdown => self.presenter.hide_countdown(),
                Effect::Publish(snapshot) => {
                    self.publish(&snapshot);
                    Ok(())
                }
            };

            if let Err(e) = result {
                log::error!("Presentation failed: {e}");
            }
        }
    }

    fn arm_timer(&mut self, handle: TimerHandle, after: Duration, repeat: bool) {
        if let Some(previous) = self.timers.remove(&handle) {
            previous.abort();
        }

        let events = self.events_tx.clone();
        let task = tokio::spawn(async move {
            if repeat {
                let mut interval = time::interval_at(Instant::now() + after, after);
                loop {
                    interval.tick().await;
                    if events.send(RuntimeEvent::TimerFired(handle)).is_err() {
                        break;
                    }
                }
            } else {
                time::sleep(after).await;
                let _ = events.send(RuntimeEvent::TimerFired(handle));
            }
        });

        self.timers.insert(handle, task);
    }

    fn publish(&self, snapshot: &TimerSnapshot) {
        if let Err(e) = self.database.save_timer_state(snapshot) {
            log::warn!("Failed to publish timer state: {e:#}");
        }
    }
}
