use chrono::{DateTime, Utc};
use mindful_storage::Settings;
use rand::Rng;
use std::time::Duration;

use crate::{
    blocklist::{normalize_domain, BlockFilter},
    messages::{pick_message, WarningMessage},
    snapshot::{SessionState, TimerSnapshot},
};

/// Minimum trimmed intent length, in characters, that unlocks a lockdown
pub const MIN_INTENT_LENGTH: usize = 5;
/// Grant length used when the requested minutes are missing or not positive
pub const DEFAULT_UNLOCK_MINUTES: u64 = 5;

const TICK: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerKind {
    /// One-shot, fires when the tracking delay elapses
    Lockdown,
    /// Repeating 1s tick while unlocked
    Countdown,
    /// Repeating 1s snapshot publish while tracking
    Publish,
}

/// Identifies one arming of a timer. A fire carrying a handle the session no
/// longer holds is stale and ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerHandle {
    pub kind: TimerKind,
    id: u64,
}

impl TimerHandle {
    #[must_use]
    pub const fn id(&self) -> u64 {
        self.id
    }
}

/// Work the session asks its host to carry out
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Arm {
        handle: TimerHandle,
        after: Duration,
        repeat: bool,
    },
    Disarm(TimerHandle),
    ShowLockdown(&'static WarningMessage),
    HideLockdown,
    ShowCountdown {
        intent: String,
        remaining_seconds: u64,
    },
    UpdateCountdown {
        remaining_seconds: u64,
    },
    HideCountdown,
    Publish(TimerSnapshot),
}

/// Resolve requested grant minutes. Missing, zero or negative values fall
/// back to [`DEFAULT_UNLOCK_MINUTES`]; there is no upper bound.
#[must_use]
pub fn resolve_unlock_minutes(minutes: Option<i64>) -> u64 {
    minutes
        .and_then(|m| u64::try_from(m).ok())
        .filter(|m| *m > 0)
        .unwrap_or(DEFAULT_UNLOCK_MINUTES)
}

/// Parse free-form minutes input. Anything unparsable becomes `None`.
#[must_use]
pub fn parse_unlock_minutes(input: &str) -> Option<i64> {
    input.trim().parse().ok()
}

fn whole_seconds_between(start: DateTime<Utc>, now: DateTime<Utc>) -> u64 {
    u64::try_from(now.signed_duration_since(start).num_seconds()).unwrap_or(0)
}

/// Per-context session: idle -> tracking -> locked -> unlocked -> locked ...
///
/// Every transition returns the [`Effect`]s the host must apply, in order.
/// `main_timer` holds at most one of the lockdown one-shot or the countdown,
/// `publish_timer` runs only while tracking.
#[derive(Debug, Default)]
pub struct Session {
    state: SessionState,
    domain: Option<String>,
    is_blocked: bool,
    tracking_started_at: Option<DateTime<Utc>>,
    time_spent_seconds: u64,
    lockdown_delay_secs: u64,
    intent: String,
    remaining_seconds: u64,
    main_timer: Option<TimerHandle>,
    publish_timer: Option<TimerHandle>,
    next_timer_id: u64,
}

impl Session {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    #[must_use]
    pub fn domain(&self) -> Option<&str> {
        self.domain.as_deref()
    }

    #[must_use]
    pub fn is_blocked(&self) -> bool {
        self.is_blocked
    }

    #[must_use]
    pub fn time_spent_seconds(&self) -> u64 {
        self.time_spent_seconds
    }

    #[must_use]
    pub fn remaining_seconds(&self) -> u64 {
        self.remaining_seconds
    }

    #[must_use]
    pub fn intent(&self) -> &str {
        &self.intent
    }

    /// The lockdown or countdown timer currently armed, if any.
    #[must_use]
    pub fn main_timer(&self) -> Option<TimerHandle> {
        self.main_timer
    }

    #[must_use]
    pub fn publish_timer(&self) -> Option<TimerHandle> {
        self.publish_timer
    }

    /// Re-evaluate the session for the page at `hostname`.
    ///
    /// Safe to call repeatedly: on the same domain while tracking or unlocked
    /// it neither restarts timers nor drops accumulated time.
    pub fn evaluate(
        &mut self,
        hostname: &str,
        settings: &Settings,
        now: DateTime<Utc>,
    ) -> Vec<Effect> {
        let mut effects = Vec::new();
        let domain = normalize_domain(hostname);
        self.is_blocked = BlockFilter::from_settings(settings).is_blocked(hostname);

        // A grant survives navigation; every other state starts over per domain.
        if self.domain.as_deref() != Some(domain) && self.state != SessionState::Unlocked {
            log::debug!(
                "Domain changed from {:?} to {domain}, resetting session",
                self.domain
            );
            self.reset(&mut effects);
        }

        if !self.is_blocked {
            if matches!(self.state, SessionState::Tracking | SessionState::Locked) {
                self.reset(&mut effects);
            }
            self.domain = None;
            if !effects.is_empty() {
                effects.push(Effect::Publish(self.snapshot(now)));
            }
            return effects;
        }

        self.domain = Some(domain.to_string());

        match self.state {
            SessionState::Idle => {
                self.start_tracking(u64::from(settings.effective_delay_secs()), now, &mut effects);
            }
            SessionState::Tracking if self.main_timer.is_none() => {
                self.start_tracking(u64::from(settings.effective_delay_secs()), now, &mut effects);
            }
            SessionState::Tracking | SessionState::Locked | SessionState::Unlocked => {
                log::debug!("Session already {} on {domain}, not restarting", self.state);
            }
        }

        effects
    }

    /// Dispatch a timer fire to its transition.
    pub fn on_timer<R: Rng + ?Sized>(
        &mut self,
        handle: TimerHandle,
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> Vec<Effect> {
        match handle.kind {
            TimerKind::Lockdown => self.on_lockdown_timer_fired(handle, now, rng),
            TimerKind::Countdown => self.on_countdown_tick(handle, now, rng),
            TimerKind::Publish => self.on_publish_tick(handle, now),
        }
    }

    /// The tracking delay elapsed without interruption.
    pub fn on_lockdown_timer_fired<R: Rng + ?Sized>(
        &mut self,
        handle: TimerHandle,
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> Vec<Effect> {
        if self.main_timer != Some(handle) {
            log::debug!("Ignoring stale lockdown timer {}", handle.id);
            return Vec::new();
        }
        // One-shot: the host drops it once fired.
        self.main_timer = None;

        let mut effects = Vec::new();
        self.enter_lockdown(now, rng, &mut effects);
        effects
    }

    /// Grant access for `minutes` when `intent_text` is long enough.
    ///
    /// Only honoured while locked. Short intents are ignored without error.
    pub fn on_unlock_requested(
        &mut self,
        intent_text: &str,
        minutes: Option<i64>,
        now: DateTime<Utc>,
    ) -> Vec<Effect> {
        if self.state != SessionState::Locked {
            log::debug!("Unlock requested while {}, ignoring", self.state);
            return Vec::new();
        }

        let intent = intent_text.trim();
        if intent.chars().count() < MIN_INTENT_LENGTH {
            log::debug!("Intent shorter than {MIN_INTENT_LENGTH} characters, staying locked");
            return Vec::new();
        }

        let minutes = resolve_unlock_minutes(minutes);
        let mut effects = Vec::new();

        self.intent = intent.to_string();
        self.remaining_seconds = minutes.saturating_mul(60);
        self.state = SessionState::Unlocked;
        self.arm(TimerKind::Countdown, TICK, true, &mut effects);

        log::info!("Unlocked for {minutes} min: {}", self.intent);

        effects.push(Effect::HideLockdown);
        effects.push(Effect::ShowCountdown {
            intent: self.intent.clone(),
            remaining_seconds: self.remaining_seconds,
        });
        effects.push(Effect::Publish(self.snapshot(now)));
        effects
    }

    /// One second of the grant elapsed.
    pub fn on_countdown_tick<R: Rng + ?Sized>(
        &mut self,
        handle: TimerHandle,
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> Vec<Effect> {
        if self.main_timer != Some(handle) || self.state != SessionState::Unlocked {
            log::debug!("Ignoring stale countdown tick {}", handle.id);
            return Vec::new();
        }

        let mut effects = Vec::new();
        self.remaining_seconds = self.remaining_seconds.saturating_sub(1);

        if self.remaining_seconds > 0 {
            effects.push(Effect::UpdateCountdown {
                remaining_seconds: self.remaining_seconds,
            });
            effects.push(Effect::Publish(self.snapshot(now)));
            return effects;
        }

        self.disarm_main(&mut effects);
        effects.push(Effect::HideCountdown);

        if self.is_blocked {
            log::info!("Grant expired, locking again");
            self.enter_lockdown(now, rng, &mut effects);
        } else {
            // Grant ran out away from any blocked site.
            self.state = SessionState::Idle;
            effects.push(Effect::Publish(self.snapshot(now)));
        }
        effects
    }

    /// Periodic publish while tracking so observers see the clock move.
    pub fn on_publish_tick(&mut self, handle: TimerHandle, now: DateTime<Utc>) -> Vec<Effect> {
        if self.publish_timer != Some(handle) || self.state != SessionState::Tracking {
            return Vec::new();
        }
        vec![Effect::Publish(self.snapshot(now))]
    }

    /// The browsing context is going away: disarm everything.
    pub fn teardown(&mut self) -> Vec<Effect> {
        let mut effects = Vec::new();
        self.disarm_main(&mut effects);
        self.disarm_publish(&mut effects);
        effects
    }

    /// Pure read of the session at `now`.
    #[must_use]
    pub fn snapshot(&self, now: DateTime<Utc>) -> TimerSnapshot {
        let (time_spent_seconds, time_until_lockdown) = match self.state {
            SessionState::Tracking => match self.tracking_started_at {
                Some(start) => {
                    let current = whole_seconds_between(start, now);
                    (
                        self.time_spent_seconds.saturating_add(current),
                        self.lockdown_delay_secs.saturating_sub(current),
                    )
                }
                None => (self.time_spent_seconds, 0),
            },
            SessionState::Unlocked => (self.time_spent_seconds, self.remaining_seconds),
            SessionState::Idle | SessionState::Locked => (self.time_spent_seconds, 0),
        };

        TimerSnapshot {
            state: self.state,
            time_spent_seconds,
            time_until_lockdown,
            intent: self.intent.clone(),
            is_blocked: self.is_blocked,
        }
    }

    fn start_tracking(&mut self, delay_secs: u64, now: DateTime<Utc>, effects: &mut Vec<Effect>) {
        self.state = SessionState::Tracking;
        self.tracking_started_at = Some(now);
        self.lockdown_delay_secs = delay_secs;

        self.arm(
            TimerKind::Lockdown,
            Duration::from_secs(delay_secs),
            false,
            effects,
        );
        self.arm(TimerKind::Publish, TICK, true, effects);

        log::info!(
            "Tracking {} - lockdown in {delay_secs}s",
            self.domain.as_deref().unwrap_or_default()
        );
        effects.push(Effect::Publish(self.snapshot(now)));
    }

    fn enter_lockdown<R: Rng + ?Sized>(
        &mut self,
        now: DateTime<Utc>,
        rng: &mut R,
        effects: &mut Vec<Effect>,
    ) {
        if let Some(start) = self.tracking_started_at.take() {
            self.time_spent_seconds = self
                .time_spent_seconds
                .saturating_add(whole_seconds_between(start, now));
        }
        self.disarm_main(effects);
        self.disarm_publish(effects);
        self.state = SessionState::Locked;
        self.remaining_seconds = 0;

        let message = pick_message(rng);
        log::info!(
            "Lockdown on {} after {}s: {}",
            self.domain.as_deref().unwrap_or_default(),
            self.time_spent_seconds,
            message.heading
        );

        effects.push(Effect::ShowLockdown(message));
        effects.push(Effect::Publish(self.snapshot(now)));
    }

    fn reset(&mut self, effects: &mut Vec<Effect>) {
        self.disarm_main(effects);
        self.disarm_publish(effects);
        if self.state == SessionState::Locked {
            effects.push(Effect::HideLockdown);
        }
        self.state = SessionState::Idle;
        self.tracking_started_at = None;
        self.time_spent_seconds = 0;
        self.remaining_seconds = 0;
    }

    /// Arm a timer of `kind`, clearing whatever occupied its slot first.
    fn arm(&mut self, kind: TimerKind, after: Duration, repeat: bool, effects: &mut Vec<Effect>) {
        self.next_timer_id += 1;
        let handle = TimerHandle {
            kind,
            id: self.next_timer_id,
        };

        let slot = match kind {
            TimerKind::Lockdown | TimerKind::Countdown => &mut self.main_timer,
            TimerKind::Publish => &mut self.publish_timer,
        };
        if let Some(previous) = slot.replace(handle) {
            effects.push(Effect::Disarm(previous));
        }

        effects.push(Effect::Arm {
            handle,
            after,
            repeat,
        });
    }

    fn disarm_main(&mut self, effects: &mut Vec<Effect>) {
        if let Some(handle) = self.main_timer.take() {
            effects.push(Effect::Disarm(handle));
        }
    }

    fn disarm_publish(&mut self, effects: &mut Vec<Effect>) {
        if let Some(handle) = self.publish_timer.take() {
            effects.push(Effect::Disarm(handle));
        }
    }
}
