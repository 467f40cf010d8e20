//! Notification events module.
//!
//! Provides the notification event type, the message templates and the sink
//! trait that receives events after a savings mutation has been committed.
//! Runtime adapters implement the sink to persist and deliver notifications.

mod messages;
mod notification;
mod sink;

pub use messages::{completed_message, unresolved_message};
pub use notification::*;
pub use sink::*;
