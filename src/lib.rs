//! FocusDeck Backend
//!
//! Pluggable productivity widgets (task planner, focus timer) backed by
//! a per-widget key-value configuration store.
//!
//! Layered architecture:
//! - domain: Core entities and business rules
//! - repository: Configuration persistence abstractions and implementations
//! - widget: Planner and timer services wiring domain state to a store

pub mod domain;
pub mod repository;
pub mod widget;

pub use domain::{BreakChoice, SessionPhase, SortOrder, Task, TimerSettings};
pub use repository::{ConfigMap, ConfigStore};
pub use widget::{PlannerWidget, TimerEvent, TimerWidget, WidgetContext, WidgetNotice};
