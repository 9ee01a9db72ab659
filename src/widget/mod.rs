//! Widget Layer
//!
//! The service layer the hosting surface talks to: each widget owns its
//! in-memory state, exposes the mutating operations a UI would call, and
//! persists its configuration per widget key through a [`ConfigStore`].
//! The planner and timer widgets are independent of each other.

mod debounce;
mod planner;
mod timer;

pub use debounce::Debouncer;
pub use planner::{PlannerConfig, PlannerWidget, PLANNER_WIDGET_KEY};
pub use timer::{TimerEvent, TimerSnapshot, TimerWidget, TIMER_WIDGET_KEY};

use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;

use crate::repository::{ConfigMap, ConfigStore};

/// Bound on the initial configuration fetch. Saves carry no timeout.
pub const LOAD_TIMEOUT: Duration = Duration::from_secs(5);

/// Generic user-facing notifications emitted by widgets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WidgetNotice {
    /// A background save failed; in-memory state is kept as-is.
    SaveFailed { widget_key: String },
}

/// Per-widget context supplied by the host.
///
/// Carries the profile accent color as an explicit per-widget value
/// rather than process-wide shared state, plus an optional channel for
/// surfacing notices to the user.
#[derive(Debug, Clone, Default)]
pub struct WidgetContext {
    /// Accent color (hex) the hosting surface renders the widget with
    pub accent_color: String,
    /// Where save failures are reported; dropped silently when absent
    pub notices: Option<UnboundedSender<WidgetNotice>>,
}

impl WidgetContext {
    pub(crate) fn notify_save_failed(&self, widget_key: &str) {
        if let Some(tx) = &self.notices {
            let _ = tx.send(WidgetNotice::SaveFailed {
                widget_key: widget_key.to_string(),
            });
        }
    }
}

/// Fetch `key` under [`LOAD_TIMEOUT`], falling back to an empty config
/// (caller fills defaults) on failure or timeout.
pub(crate) async fn load_or_default(store: &dyn ConfigStore, key: &str) -> ConfigMap {
    match tokio::time::timeout(LOAD_TIMEOUT, store.load(key)).await {
        Ok(Ok(map)) => map,
        Ok(Err(e)) => {
            log::warn!("config load for '{}' failed, using defaults: {}", key, e);
            ConfigMap::new()
        }
        Err(_) => {
            log::warn!(
                "config load for '{}' timed out after {:?}, using defaults",
                key,
                LOAD_TIMEOUT
            );
            ConfigMap::new()
        }
    }
}
