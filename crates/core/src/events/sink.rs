use super::NotificationEvent;

/// Receives the notifications of a committed savings mutation.
///
/// Called while the user's lock is still held, so implementations hand the
/// events off (a channel, a queue) instead of doing I/O inline. Delivery is
/// best-effort and never fails the mutation.
pub trait NotificationSink: Send + Sync {
    fn emit(&self, event: NotificationEvent);

    fn emit_batch(&self, events: Vec<NotificationEvent>) {
        events.into_iter().for_each(|event| self.emit(event));
    }
}

/// Keeps every emitted event in memory for assertions.
#[cfg(test)]
#[derive(Default)]
pub struct MockNotificationSink {
    events: std::sync::Mutex<Vec<NotificationEvent>>,
}

#[cfg(test)]
impl MockNotificationSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<NotificationEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn is_empty(&self) -> bool {
        self.events.lock().unwrap().is_empty()
    }
}

#[cfg(test)]
impl NotificationSink for MockNotificationSink {
    fn emit(&self, event: NotificationEvent) {
        self.events.lock().unwrap().push(event);
    }
}
