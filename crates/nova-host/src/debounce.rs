//! Input debouncing.
//!
//! Keystrokes on one field arrive as a burst of `input` events. Only the
//! latest event of a burst is kept, and it is released once typing pauses
//! for the configured delay. A burst ends early when input moves to another
//! element or a non-input event needs to go through the pipeline first.

use std::time::Duration;

use nova_protocols::RecordedEvent;
use tokio::time::Instant;

#[derive(Debug)]
struct Pending {
    event: RecordedEvent,
    deadline: Instant,
}

#[derive(Debug)]
pub struct InputDebouncer {
    delay: Duration,
    pending: Option<Pending>,
}

impl InputDebouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    /// Buffer an `input` event, restarting the wait.
    ///
    /// Returns the buffered event of a previous burst on a different
    /// element, which must be processed before this one.
    pub fn push(&mut self, event: RecordedEvent, now: Instant) -> Option<RecordedEvent> {
        let deadline = now + self.delay;
        let previous = self.pending.take().and_then(|pending| {
            if same_element(&pending.event, &event) {
                None
            } else {
                Some(pending.event)
            }
        });
        self.pending = Some(Pending { event, deadline });
        previous
    }

    /// Release the buffered event if its deadline has passed.
    pub fn take_due(&mut self, now: Instant) -> Option<RecordedEvent> {
        match &self.pending {
            Some(pending) if pending.deadline <= now => self.flush(),
            _ => None,
        }
    }

    /// Release the buffered event regardless of its deadline.
    pub fn flush(&mut self) -> Option<RecordedEvent> {
        self.pending.take().map(|pending| pending.event)
    }

    /// Drop the buffered event.
    pub fn cancel(&mut self) {
        self.pending = None;
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|pending| pending.deadline)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

fn same_element(a: &RecordedEvent, b: &RecordedEvent) -> bool {
    a.selector == b.selector && a.xpath == b.xpath
}
