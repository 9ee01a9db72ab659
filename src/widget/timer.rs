//! Focus Timer Widget
//!
//! Wires the focus-session state machine to a one-second ticker task and
//! persists the user's timer settings. Session transitions that need a
//! user decision (break prompt, completion) surface as [`TimerEvent`]s on
//! the widget's channel; the host answers through the resolve/acknowledge
//! methods. At most one ticker task is ever live; every (re)start aborts
//! the previous one first.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde::Serialize;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;

use super::{load_or_default, WidgetContext};
use crate::domain::{BreakChoice, FocusSession, SessionPhase, SessionSignal, TimerSettings};
use crate::repository::{ConfigMap, ConfigStore};

/// Store key for the timer's configuration
pub const TIMER_WIDGET_KEY: &str = "focus_timer";

/// Session transitions surfaced to the embedding UI
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimerEvent {
    /// A break boundary was reached; ask keep-working vs take-a-break
    BreakDue { minute: u32 },
    /// The break countdown ran out and the work countdown resumed
    BreakFinished,
    /// The work countdown reached zero
    SessionComplete,
}

/// Serializable view of the timer for rendering
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerSnapshot {
    pub phase: SessionPhase,
    pub task_name: String,
    pub remaining_seconds: u32,
    pub total_seconds: u32,
    pub break_remaining_seconds: u32,
}

/// Holds the single live ticker task
struct Ticker {
    handle: Option<JoinHandle<()>>,
}

impl Ticker {
    fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }

    /// Install a new ticker, cancelling any previous one first.
    fn replace(&mut self, handle: JoinHandle<()>) {
        self.stop();
        self.handle = Some(handle);
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Focus timer service
pub struct TimerWidget {
    store: Arc<dyn ConfigStore>,
    ctx: WidgetContext,
    settings: TimerSettings,
    session: Arc<Mutex<FocusSession>>,
    ticker: Ticker,
    events_tx: UnboundedSender<TimerEvent>,
}

impl TimerWidget {
    /// Returns the widget plus the receiving end of its event channel.
    pub fn new(
        store: Arc<dyn ConfigStore>,
        ctx: WidgetContext,
    ) -> (Self, UnboundedReceiver<TimerEvent>) {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let widget = Self {
            store,
            ctx,
            settings: TimerSettings::default(),
            session: Arc::new(Mutex::new(FocusSession::new())),
            ticker: Ticker { handle: None },
            events_tx,
        };
        (widget, events_rx)
    }

    /// Fetch saved settings, falling back to defaults on failure or timeout.
    pub async fn load(&mut self) {
        let map = load_or_default(self.store.as_ref(), TIMER_WIDGET_KEY).await;
        self.settings = serde_json::from_value(serde_json::Value::Object(map))
            .unwrap_or_else(|e| {
                log::warn!("timer config did not parse, using defaults: {}", e);
                TimerSettings::default()
            });
    }

    pub fn settings(&self) -> &TimerSettings {
        &self.settings
    }

    pub fn context(&self) -> &WidgetContext {
        &self.ctx
    }

    pub fn set_task_name(&mut self, name: &str) {
        let name = name.trim().to_string();
        self.edit_settings(|s| s.task_name = name);
    }

    pub fn set_duration(&mut self, hours: u32, minutes: u32, seconds: u32) {
        self.edit_settings(|s| {
            s.hours = hours;
            s.minutes = minutes;
            s.seconds = seconds;
        });
    }

    /// Break interval in minutes; values below 1 clamp to 1.
    pub fn set_break_interval(&mut self, minutes: u32) {
        self.edit_settings(|s| s.break_interval = minutes.max(1));
    }

    pub fn set_break_interval_enabled(&mut self, enabled: bool) {
        self.edit_settings(|s| s.break_interval_enabled = enabled);
    }

    /// Begin a session from the current settings and start ticking.
    pub fn start(&mut self) {
        {
            let Ok(mut session) = self.session.lock() else {
                return;
            };
            if session.phase() != SessionPhase::Idle {
                log::debug!("start ignored: a session is already active");
                return;
            }
            session.start(&self.settings);
        }
        self.spawn_ticker();
    }

    /// Apply the user's break-prompt decision and resume ticking.
    pub fn resolve_break_prompt(&mut self, choice: BreakChoice) {
        {
            let Ok(mut session) = self.session.lock() else {
                return;
            };
            if session.phase() != SessionPhase::BreakPrompt {
                log::debug!("resolve_break_prompt ignored: no prompt open");
                return;
            }
            session.resolve(choice);
        }
        self.spawn_ticker();
    }

    /// Cut the current break short and resume the work countdown.
    pub fn end_break_early(&mut self) {
        {
            let Ok(mut session) = self.session.lock() else {
                return;
            };
            if session.phase() != SessionPhase::OnBreak {
                return;
            }
            session.end_break();
        }
        self.spawn_ticker();
    }

    /// Abandon the session from any active phase.
    pub fn end_session(&mut self) {
        self.ticker.stop();
        let Ok(mut session) = self.session.lock() else {
            return;
        };
        session.end();
    }

    /// Dismiss a completed session.
    pub fn acknowledge_completion(&mut self) {
        self.ticker.stop();
        let Ok(mut session) = self.session.lock() else {
            return;
        };
        session.acknowledge();
    }

    pub fn phase(&self) -> SessionPhase {
        self.session
            .lock()
            .map(|s| s.phase())
            .unwrap_or(SessionPhase::Idle)
    }

    pub fn snapshot(&self) -> TimerSnapshot {
        let (phase, remaining, total, break_remaining) = self
            .session
            .lock()
            .map(|s| {
                (
                    s.phase(),
                    s.remaining_seconds(),
                    s.total_seconds(),
                    s.break_remaining_seconds(),
                )
            })
            .unwrap_or((SessionPhase::Idle, 0, 0, 0));
        TimerSnapshot {
            phase,
            task_name: self.settings.task_name.clone(),
            remaining_seconds: remaining,
            total_seconds: total,
            break_remaining_seconds: break_remaining,
        }
    }

    fn session_active(&self) -> bool {
        self.phase() != SessionPhase::Idle
    }

    /// Settings edits apply only between sessions and persist immediately
    /// (no debounce).
    fn edit_settings(&mut self, apply: impl FnOnce(&mut TimerSettings)) {
        if self.session_active() {
            log::debug!("ignoring settings edit during an active session");
            return;
        }
        apply(&mut self.settings);
        self.persist_settings();
    }

    fn persist_settings(&self) {
        let data = match serde_json::to_value(&self.settings) {
            Ok(serde_json::Value::Object(map)) => map,
            _ => ConfigMap::new(),
        };
        let store = Arc::clone(&self.store);
        let ctx = self.ctx.clone();
        tokio::spawn(async move {
            if let Err(e) = store.save(TIMER_WIDGET_KEY, &data).await {
                log::error!("timer settings save failed: {}", e);
                ctx.notify_save_failed(TIMER_WIDGET_KEY);
            }
        });
    }

    /// Start the one-second ticker driving whichever countdown is live.
    /// Replaces (aborts) any previous ticker, so work and break countdowns
    /// can never tick concurrently.
    fn spawn_ticker(&mut self) {
        let session = Arc::clone(&self.session);
        let events_tx = self.events_tx.clone();
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(1));
            // The first interval tick completes immediately; consume it so
            // the countdown moves one second per elapsed second.
            interval.tick().await;
            loop {
                interval.tick().await;
                let signal = {
                    let Ok(mut session) = session.lock() else {
                        break;
                    };
                    session.advance()
                };
                match signal {
                    Some(SessionSignal::BreakDue { minute }) => {
                        let _ = events_tx.send(TimerEvent::BreakDue { minute });
                        // Ticking stays cancelled while the prompt is open.
                        break;
                    }
                    Some(SessionSignal::Completed) => {
                        let _ = events_tx.send(TimerEvent::SessionComplete);
                        break;
                    }
                    Some(SessionSignal::BreakFinished) => {
                        let _ = events_tx.send(TimerEvent::BreakFinished);
                        // The same ticker keeps driving the resumed work
                        // countdown.
                    }
                    None => {}
                }
            }
        });
        self.ticker.replace(handle);
    }
}

impl Drop for TimerWidget {
    fn drop(&mut self) {
        self.ticker.stop();
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use tokio::sync::mpsc::error::TryRecvError;

    use super::*;
    use crate::domain::{DomainError, DomainResult};
    use crate::repository::MemoryConfigStore;
    use crate::widget::WidgetNotice;

    struct FailingStore;

    #[async_trait]
    impl ConfigStore for FailingStore {
        async fn load(&self, _key: &str) -> DomainResult<ConfigMap> {
            Err(DomainError::Storage("backend unreachable".to_string()))
        }

        async fn save(&self, _key: &str, _data: &ConfigMap) -> DomainResult<()> {
            Err(DomainError::Storage("backend unreachable".to_string()))
        }
    }

    fn widget_with(
        store: Arc<dyn ConfigStore>,
    ) -> (TimerWidget, UnboundedReceiver<TimerEvent>) {
        TimerWidget::new(store, WidgetContext::default())
    }

    #[tokio::test(start_paused = true)]
    async fn test_session_completes_and_emits_event() {
        let (mut widget, mut events) = widget_with(Arc::new(MemoryConfigStore::new()));
        widget.set_duration(0, 0, 2);
        widget.set_break_interval_enabled(false);
        widget.start();

        tokio::time::sleep(Duration::from_secs(3)).await;
        assert_eq!(events.try_recv(), Ok(TimerEvent::SessionComplete));
        assert_eq!(widget.phase(), SessionPhase::Completed);
        assert_eq!(widget.snapshot().remaining_seconds, 0);

        widget.acknowledge_completion();
        assert_eq!(widget.phase(), SessionPhase::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_break_prompt_stops_ticking_until_resolved() {
        let (mut widget, mut events) = widget_with(Arc::new(MemoryConfigStore::new()));
        widget.set_duration(0, 2, 0);
        widget.set_break_interval(1);
        widget.start();

        tokio::time::sleep(Duration::from_secs(61)).await;
        assert_eq!(events.try_recv(), Ok(TimerEvent::BreakDue { minute: 1 }));
        assert_eq!(widget.phase(), SessionPhase::BreakPrompt);
        let remaining = widget.snapshot().remaining_seconds;
        assert_eq!(remaining, 60);

        // No ticking while the prompt is open.
        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(widget.snapshot().remaining_seconds, remaining);

        widget.resolve_break_prompt(BreakChoice::KeepWorking);
        tokio::time::sleep(Duration::from_secs(10)).await;
        // Exactly ten seconds elapsed: one ticker, no duplicates.
        assert_eq!(widget.snapshot().remaining_seconds, remaining - 10);
    }

    #[tokio::test(start_paused = true)]
    async fn test_take_break_preserves_work_countdown() {
        let (mut widget, mut events) = widget_with(Arc::new(MemoryConfigStore::new()));
        widget.set_duration(0, 5, 0);
        widget.set_break_interval(1);
        widget.start();

        tokio::time::sleep(Duration::from_secs(61)).await;
        assert_eq!(events.try_recv(), Ok(TimerEvent::BreakDue { minute: 1 }));

        widget.resolve_break_prompt(BreakChoice::TakeBreak);
        assert_eq!(widget.phase(), SessionPhase::OnBreak);
        let work_remaining = widget.snapshot().remaining_seconds;

        tokio::time::sleep(Duration::from_secs(300)).await;
        let snapshot = widget.snapshot();
        assert_eq!(snapshot.remaining_seconds, work_remaining);
        assert!(snapshot.break_remaining_seconds < 600);

        // Let the break run out: the work countdown resumes by itself.
        tokio::time::sleep(Duration::from_secs(301)).await;
        assert_eq!(events.try_recv(), Ok(TimerEvent::BreakFinished));
        assert_eq!(widget.phase(), SessionPhase::Running);
    }

    #[tokio::test(start_paused = true)]
    async fn test_end_break_early_resumes_work() {
        let (mut widget, mut events) = widget_with(Arc::new(MemoryConfigStore::new()));
        widget.set_duration(0, 5, 0);
        widget.set_break_interval(1);
        widget.start();

        tokio::time::sleep(Duration::from_secs(61)).await;
        let _ = events.try_recv();
        widget.resolve_break_prompt(BreakChoice::TakeBreak);
        tokio::time::sleep(Duration::from_secs(5)).await;

        widget.end_break_early();
        assert_eq!(widget.phase(), SessionPhase::Running);
        let remaining = widget.snapshot().remaining_seconds;
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(widget.snapshot().remaining_seconds, remaining - 10);
    }

    #[tokio::test(start_paused = true)]
    async fn test_end_session_resets_and_stops_ticking() {
        let (mut widget, mut events) = widget_with(Arc::new(MemoryConfigStore::new()));
        widget.set_duration(0, 10, 0);
        widget.set_break_interval_enabled(false);
        widget.start();

        tokio::time::sleep(Duration::from_secs(5)).await;
        widget.end_session();
        assert_eq!(widget.phase(), SessionPhase::Idle);
        assert_eq!(widget.snapshot().remaining_seconds, 0);

        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(events.try_recv(), Err(TryRecvError::Empty));
    }

    #[tokio::test(start_paused = true)]
    async fn test_settings_edits_persist_immediately() {
        let store = Arc::new(MemoryConfigStore::new());
        let (mut widget, _events) = widget_with(store.clone());

        widget.set_task_name("  write report  ");
        widget.set_duration(0, 45, 0);
        widget.set_break_interval(15);
        tokio::time::sleep(Duration::from_millis(1)).await;

        let saved = store.load(TIMER_WIDGET_KEY).await.unwrap();
        let settings: TimerSettings =
            serde_json::from_value(serde_json::Value::Object(saved)).unwrap();
        assert_eq!(settings.task_name, "write report");
        assert_eq!(settings.minutes, 45);
        assert_eq!(settings.break_interval, 15);
    }

    #[tokio::test(start_paused = true)]
    async fn test_settings_edits_rejected_mid_session() {
        let (mut widget, _events) = widget_with(Arc::new(MemoryConfigStore::new()));
        widget.set_duration(0, 10, 0);
        widget.start();

        widget.set_duration(2, 0, 0);
        widget.set_task_name("too late");
        assert_eq!(widget.settings().hours, 0);
        assert_eq!(widget.settings().minutes, 10);
        assert_eq!(widget.settings().task_name, "");
        // The running countdown is untouched either way.
        assert_eq!(widget.snapshot().total_seconds, 600);
    }

    #[tokio::test(start_paused = true)]
    async fn test_break_interval_clamps_to_one() {
        let (mut widget, _events) = widget_with(Arc::new(MemoryConfigStore::new()));
        widget.set_break_interval(0);
        assert_eq!(widget.settings().break_interval, 1);
    }

    #[tokio::test]
    async fn test_load_falls_back_to_defaults_on_store_error() {
        let (mut widget, _events) = widget_with(Arc::new(FailingStore));
        widget.load().await;
        assert_eq!(*widget.settings(), TimerSettings::default());
    }

    #[tokio::test(start_paused = true)]
    async fn test_save_failure_emits_notice() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let ctx = WidgetContext {
            notices: Some(tx),
            ..Default::default()
        };
        let (mut widget, _events) = TimerWidget::new(Arc::new(FailingStore), ctx);

        widget.set_task_name("doomed");
        tokio::time::sleep(Duration::from_millis(1)).await;

        assert_eq!(
            rx.try_recv().ok(),
            Some(WidgetNotice::SaveFailed {
                widget_key: TIMER_WIDGET_KEY.to_string()
            })
        );
        // No rollback.
        assert_eq!(widget.settings().task_name, "doomed");
    }

    #[tokio::test(start_paused = true)]
    async fn test_load_restores_saved_settings() {
        let store = Arc::new(MemoryConfigStore::new());
        {
            let (mut widget, _events) = widget_with(store.clone());
            widget.set_duration(1, 30, 0);
            widget.set_task_name("thesis");
            tokio::time::sleep(Duration::from_millis(1)).await;
        }

        let (mut widget, _events) = widget_with(store);
        widget.load().await;
        assert_eq!(widget.settings().hours, 1);
        assert_eq!(widget.settings().minutes, 30);
        assert_eq!(widget.settings().task_name, "thesis");
    }
}
