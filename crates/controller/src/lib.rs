//! Interaction controllers for the query tool: event-driven state machines
//! that emit effects, and a tokio session that executes them.

use std::time::Duration;

use shared::domain::LlmProvider;

pub mod drop_zone;
pub mod effects;
pub mod events;
pub mod ingest;
pub mod orchestration;
pub mod query;
pub mod reducer;
pub mod schema;

pub use effects::{Effect, ResultsView};
pub use events::{DragLeave, Event, Key, KeyChord};
pub use ingest::{IncomingFile, JobOrigin};
pub use orchestration::{Renderer, Session, SessionHandle};
pub use reducer::Controller;
pub use schema::SchemaSnapshot;

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(400);
pub const DEFAULT_NOTICE_TTL: Duration = Duration::from_millis(3000);

#[derive(Debug, Clone)]
pub struct ControllerConfig {
    pub debounce: Duration,
    pub notice_ttl: Duration,
    pub provider: LlmProvider,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_DEBOUNCE,
            notice_ttl: DEFAULT_NOTICE_TTL,
            provider: LlmProvider::default(),
        }
    }
}

#[cfg(test)]
#[path = "tests/query_tests.rs"]
mod query_tests;

#[cfg(test)]
#[path = "tests/upload_tests.rs"]
mod upload_tests;

#[cfg(test)]
#[path = "tests/schema_tests.rs"]
mod schema_tests;

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod session_tests;
