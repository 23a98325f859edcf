use std::sync::{
    Mutex,
    atomic::{AtomicU64, Ordering},
};

/// Identifies one fetch. Later fetches get larger tickets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ticket(u64);

/// Holds the result of the most recently *issued* fetch.
///
/// A fetch takes a ticket before it starts and publishes with it when it
/// resolves. Results carrying a ticket older than the newest one issued are
/// dropped, so a slow superseded fetch cannot overwrite a later one.
pub struct LatestOnly<T> {
    issued: AtomicU64,
    current: Mutex<Option<(Ticket, T)>>,
}

impl<T: Clone> LatestOnly<T> {
    pub fn new() -> Self {
        Self {
            issued: AtomicU64::new(0),
            current: Mutex::new(None),
        }
    }

    pub fn begin(&self) -> Ticket {
        Ticket(self.issued.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Stores `value` if `ticket` is still the newest. Returns whether it was kept.
    pub fn publish(&self, ticket: Ticket, value: T) -> bool {
        if ticket.0 != self.issued.load(Ordering::SeqCst) {
            tracing::debug!(ticket = ticket.0, "Dropping superseded fetch result");
            return false;
        }

        let mut current = self
            .current
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        // a newer ticket may have published between the check and the lock
        if current.as_ref().is_some_and(|(held, _)| *held > ticket) {
            return false;
        }
        *current = Some((ticket, value));
        true
    }

    pub fn snapshot(&self) -> Option<T> {
        self.current
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .as_ref()
            .map(|(_, value)| value.clone())
    }
}

impl<T: Clone> Default for LatestOnly<T> {
    fn default() -> Self {
        Self::new()
    }
}
