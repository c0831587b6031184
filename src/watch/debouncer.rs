use std::time::{Duration, Instant};

/// Rewatch attempts before the watch is given up as lost.
pub const MAX_REWATCH_ATTEMPTS: u32 = 20;

/// Sleep used while nothing is pending.
const IDLE_SLEEP: Duration = Duration::from_secs(86400);

/// Debounce quiet period and delay before re-watching a vanished path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatchTiming {
    pub debounce: Duration,
    pub rewatch_delay: Duration,
}

impl WatchTiming {
    pub const fn from_millis(debounce_ms: u64, rewatch_delay_ms: u64) -> Self {
        Self {
            debounce: Duration::from_millis(debounce_ms),
            rewatch_delay: Duration::from_millis(rewatch_delay_ms),
        }
    }
}

impl Default for WatchTiming {
    fn default() -> Self {
        Self::from_millis(50, 100)
    }
}

/// What happened to the watched file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    /// Content written or file created
    Written,
    /// Renamed away or removed; the OS watch may be gone with it
    Vanished,
}

impl ChangeKind {
    /// Classify a notify event. Metadata-only and access events are ignored.
    pub fn from_event_kind(kind: &notify::EventKind) -> Option<Self> {
        use notify::EventKind;
        use notify::event::ModifyKind;

        match kind {
            EventKind::Create(_) => Some(Self::Written),
            EventKind::Modify(ModifyKind::Metadata(_)) => None,
            EventKind::Modify(ModifyKind::Name(_)) => Some(Self::Vanished),
            EventKind::Modify(_) => Some(Self::Written),
            EventKind::Remove(_) => Some(Self::Vanished),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Written => "written",
            Self::Vanished => "vanished",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchState {
    Idle,
    PendingDebounce { deadline: Instant },
    Rewatching { deadline: Instant, attempt: u32 },
}

/// Work the watch loop must do once a deadline passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Render,
    /// Re-subscribe to the path, then report back via [`Debouncer::rewatched`].
    Rewatch { attempt: u32 },
}

/// Pure debounce/rewatch state machine. Time is always passed in.
///
/// ```text
/// Idle ──written──► PendingDebounce ──deadline──► Idle (Render)
///   │                  │      ▲
///   └────vanished──────┴──►  Rewatching ──ok──┘
///                              │  └──failed──► Rewatching (retry)
///                              └──gave up────► Idle (Render)
/// ```
#[derive(Debug)]
pub struct Debouncer {
    state: WatchState,
    timing: WatchTiming,
}

impl Debouncer {
    pub fn new(timing: WatchTiming) -> Self {
        Self {
            state: WatchState::Idle,
            timing,
        }
    }

    #[cfg(test)]
    pub fn state(&self) -> WatchState {
        self.state
    }

    pub fn record(&mut self, kind: ChangeKind, now: Instant) {
        self.state = match (kind, self.state) {
            // Re-subscribing already ends in a render.
            (ChangeKind::Written, state @ WatchState::Rewatching { .. }) => state,
            (ChangeKind::Written, _) => WatchState::PendingDebounce {
                deadline: now + self.timing.debounce,
            },
            (ChangeKind::Vanished, _) => WatchState::Rewatching {
                deadline: now + self.timing.rewatch_delay,
                attempt: 0,
            },
        };
    }

    /// Action due at `now`, if any.
    pub fn poll(&mut self, now: Instant) -> Option<Action> {
        match self.state {
            WatchState::PendingDebounce { deadline } if deadline <= now => {
                self.state = WatchState::Idle;
                Some(Action::Render)
            }
            WatchState::Rewatching { deadline, attempt } if deadline <= now => {
                Some(Action::Rewatch { attempt })
            }
            _ => None,
        }
    }

    /// Outcome of an [`Action::Rewatch`].
    ///
    /// Success is treated as a write. Failure retries after another delay;
    /// after the last attempt the machine returns to `Idle` and asks for a
    /// render so the page reflects the missing file.
    pub fn rewatched(&mut self, ok: bool, now: Instant) -> Option<Action> {
        let WatchState::Rewatching { attempt, .. } = self.state else {
            return None;
        };

        if ok {
            self.state = WatchState::PendingDebounce {
                deadline: now + self.timing.debounce,
            };
            return None;
        }

        let next = attempt + 1;
        if next < MAX_REWATCH_ATTEMPTS {
            self.state = WatchState::Rewatching {
                deadline: now + self.timing.rewatch_delay,
                attempt: next,
            };
            None
        } else {
            self.state = WatchState::Idle;
            Some(Action::Render)
        }
    }

    /// Time until the next deadline.
    pub fn sleep_duration(&self, now: Instant) -> Duration {
        match self.state {
            WatchState::Idle => IDLE_SLEEP,
            WatchState::PendingDebounce { deadline } | WatchState::Rewatching { deadline, .. } => {
                deadline.saturating_duration_since(now)
            }
        }
    }
}
