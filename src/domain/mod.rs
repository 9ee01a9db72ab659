//! Domain Layer
//!
//! Contains all domain entities and core business rules.
//! This layer has NO external dependencies (except serde for serialization).

mod error;
mod task;
mod timer;

pub use error::{DomainError, DomainResult};
pub use task::{sorted_view, DisplayRow, SortOrder, Task};
pub use timer::{
    BreakChoice, FocusSession, SessionPhase, SessionSignal, TimerSettings, BREAK_SECONDS,
};
