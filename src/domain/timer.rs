//! Focus Session State Machine
//!
//! A countdown timer with pause-for-break semantics:
//!
//! Idle -> Running -> {Running, BreakPrompt, OnBreak} -> Completed -> Idle
//!
//! The machine is pure: it is advanced by explicit `tick()` calls (one per
//! wall-clock second) and user decisions, and reports transitions through
//! [`SessionSignal`]. Driving the ticks and presenting prompts is the
//! caller's job, which keeps the whole lifecycle unit-testable.

use serde::{Deserialize, Serialize};

/// Length of a break countdown, in seconds (10 minutes).
pub const BREAK_SECONDS: u32 = 600;

/// User-editable timer configuration, persisted per widget
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TimerSettings {
    /// Free-text label for the session
    pub task_name: String,
    pub hours: u32,
    /// Conventionally < 60, not enforced
    pub minutes: u32,
    /// Conventionally < 60, not enforced
    pub seconds: u32,
    /// Minutes between break prompts, >= 1
    pub break_interval: u32,
    pub break_interval_enabled: bool,
}

impl Default for TimerSettings {
    fn default() -> Self {
        Self {
            task_name: String::new(),
            hours: 1,
            minutes: 0,
            seconds: 0,
            break_interval: 30,
            break_interval_enabled: true,
        }
    }
}

impl TimerSettings {
    /// Total session duration in seconds
    pub fn total_seconds(&self) -> u32 {
        self.hours * 3600 + self.minutes * 60 + self.seconds
    }
}

/// Lifecycle phase of a focus session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionPhase {
    /// No countdown active
    Idle,
    /// Work countdown ticking
    Running,
    /// Waiting on the user's keep-working / take-break decision
    BreakPrompt,
    /// Break countdown ticking
    OnBreak,
    /// Countdown reached zero, waiting for acknowledgement
    Completed,
}

/// Transition reported by a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionSignal {
    /// A break boundary was reached; ticking stopped, prompt the user
    BreakDue { minute: u32 },
    /// The break countdown ran out; work countdown resumed
    BreakFinished,
    /// The work countdown reached zero; ticking stopped
    Completed,
}

/// The user's answer to a break prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakChoice {
    KeepWorking,
    TakeBreak,
}

/// Live countdown state for one focus session.
///
/// Duration and break parameters are copied out of [`TimerSettings`] at
/// `start()` and stay fixed for the life of the session; editing settings
/// mid-session cannot skew the elapsed-minute arithmetic.
#[derive(Debug, Clone)]
pub struct FocusSession {
    phase: SessionPhase,
    total_seconds: u32,
    remaining_seconds: u32,
    break_remaining_seconds: u32,
    break_interval_minutes: u32,
    break_prompts_enabled: bool,
    /// Last elapsed minute a prompt fired for, so one boundary
    /// prompts at most once
    last_break_minute: Option<u32>,
}

impl FocusSession {
    pub fn new() -> Self {
        Self {
            phase: SessionPhase::Idle,
            total_seconds: 0,
            remaining_seconds: 0,
            break_remaining_seconds: 0,
            break_interval_minutes: 1,
            break_prompts_enabled: false,
            last_break_minute: None,
        }
    }

    /// Begin a session from the given settings. Ignored unless Idle.
    pub fn start(&mut self, settings: &TimerSettings) {
        if self.phase != SessionPhase::Idle {
            return;
        }
        let total = settings.total_seconds();
        self.phase = SessionPhase::Running;
        self.total_seconds = total;
        self.remaining_seconds = total;
        self.break_remaining_seconds = 0;
        self.break_interval_minutes = settings.break_interval.max(1);
        self.break_prompts_enabled = settings.break_interval_enabled;
        self.last_break_minute = None;
    }

    /// Advance the work countdown by one second. Only valid while Running.
    pub fn tick(&mut self) -> Option<SessionSignal> {
        if self.phase != SessionPhase::Running {
            return None;
        }
        if self.remaining_seconds > 0 {
            self.remaining_seconds -= 1;
        }
        if self.remaining_seconds == 0 {
            self.phase = SessionPhase::Completed;
            return Some(SessionSignal::Completed);
        }
        if self.break_prompts_enabled {
            let elapsed = (self.total_seconds - self.remaining_seconds) / 60;
            if elapsed > 0
                && elapsed % self.break_interval_minutes == 0
                && self.last_break_minute != Some(elapsed)
            {
                self.last_break_minute = Some(elapsed);
                self.phase = SessionPhase::BreakPrompt;
                return Some(SessionSignal::BreakDue { minute: elapsed });
            }
        }
        None
    }

    /// Advance the break countdown by one second. Only valid while OnBreak.
    /// Reaching zero resumes the work countdown, exactly as KeepWorking would.
    pub fn break_tick(&mut self) -> Option<SessionSignal> {
        if self.phase != SessionPhase::OnBreak {
            return None;
        }
        if self.break_remaining_seconds > 0 {
            self.break_remaining_seconds -= 1;
        }
        if self.break_remaining_seconds == 0 {
            self.phase = SessionPhase::Running;
            return Some(SessionSignal::BreakFinished);
        }
        None
    }

    /// Advance whichever countdown is live. Work and break countdowns are
    /// mutually exclusive, so one dispatch point serves a single ticker.
    pub fn advance(&mut self) -> Option<SessionSignal> {
        match self.phase {
            SessionPhase::Running => self.tick(),
            SessionPhase::OnBreak => self.break_tick(),
            _ => None,
        }
    }

    /// Apply the user's break-prompt decision. Ignored unless BreakPrompt.
    pub fn resolve(&mut self, choice: BreakChoice) {
        if self.phase != SessionPhase::BreakPrompt {
            return;
        }
        match choice {
            BreakChoice::KeepWorking => {
                self.phase = SessionPhase::Running;
            }
            BreakChoice::TakeBreak => {
                self.phase = SessionPhase::OnBreak;
                self.break_remaining_seconds = BREAK_SECONDS;
            }
        }
    }

    /// Cut a break short and resume the work countdown.
    pub fn end_break(&mut self) {
        if self.phase != SessionPhase::OnBreak {
            return;
        }
        self.break_remaining_seconds = 0;
        self.phase = SessionPhase::Running;
    }

    /// Abandon the session from any active phase.
    pub fn end(&mut self) {
        match self.phase {
            SessionPhase::Running | SessionPhase::BreakPrompt | SessionPhase::OnBreak => {
                self.reset();
            }
            SessionPhase::Idle | SessionPhase::Completed => {}
        }
    }

    /// Dismiss a completed session, returning the machine to Idle.
    pub fn acknowledge(&mut self) {
        if self.phase == SessionPhase::Completed {
            self.reset();
        }
    }

    fn reset(&mut self) {
        self.phase = SessionPhase::Idle;
        self.remaining_seconds = 0;
        self.break_remaining_seconds = 0;
        self.last_break_minute = None;
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn remaining_seconds(&self) -> u32 {
        self.remaining_seconds
    }

    pub fn break_remaining_seconds(&self) -> u32 {
        self.break_remaining_seconds
    }

    pub fn total_seconds(&self) -> u32 {
        self.total_seconds
    }

    /// Whole minutes elapsed since the session started
    pub fn elapsed_minutes(&self) -> u32 {
        (self.total_seconds - self.remaining_seconds) / 60
    }

    pub fn is_running(&self) -> bool {
        self.phase == SessionPhase::Running
    }

    pub fn is_on_break(&self) -> bool {
        self.phase == SessionPhase::OnBreak
    }
}

impl Default for FocusSession {
    fn default() -> Self {
        Self::new()
    }
}
