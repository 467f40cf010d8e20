//! Notification delivery for the web server runtime.
//!
//! The savings service emits events after a commit. They are queued here and
//! persisted by a background worker, so delivery never blocks or fails a
//! savings mutation.

mod sink;
mod worker;

pub use sink::ServerNotificationSink;
