//! Domain events emitted by the admission engine.
//!
//! Events are advisory: they let interested parties (the promotion runner,
//! log sinks) react early, but no invariant depends on their delivery.

pub mod queue;

pub use queue::{EntryKind, QueueEvent};
