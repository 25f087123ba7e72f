//! Latest-request-wins slots.
//!
//! A slot is a logical target such as "the outreach draft for Lotus
//! Hospital". Each request takes a ticket; only the newest ticket for a
//! slot may store its result. Older responses that resolve late are
//! dropped.

use dashmap::DashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

/// Proof of a started request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    key: String,
    generation: u64,
}

impl Ticket {
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[derive(Debug)]
struct Slot<T> {
    generation: u64,
    value: Option<T>,
}

impl<T> Default for Slot<T> {
    fn default() -> Self {
        Self {
            generation: 0,
            value: None,
        }
    }
}

/// Generations come from one counter shared by every slot and never
/// restart, so a ticket issued before `clear` cannot match a later one.
#[derive(Debug)]
pub struct RequestSlots<T> {
    slots: DashMap<String, Slot<T>>,
    next_generation: AtomicU64,
}

impl<T> Default for RequestSlots<T> {
    fn default() -> Self {
        Self {
            slots: DashMap::new(),
            next_generation: AtomicU64::new(1),
        }
    }
}

impl<T: Clone> RequestSlots<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a request for `key`, superseding any in flight.
    pub fn begin(&self, key: impl Into<String>) -> Ticket {
        let key = key.into();
        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);
        let mut slot = self.slots.entry(key.clone()).or_default();
        // A racing begin may have stored a newer generation already
        slot.generation = slot.generation.max(generation);
        Ticket { key, generation }
    }

    /// True while no newer request has begun for the ticket's slot.
    pub fn is_latest(&self, ticket: &Ticket) -> bool {
        self.slots
            .get(&ticket.key)
            .map(|slot| slot.generation == ticket.generation)
            .unwrap_or(false)
    }

    /// Store `value` if `ticket` is still the newest. Returns whether it was kept.
    pub fn complete(&self, ticket: &Ticket, value: T) -> bool {
        let Some(mut slot) = self.slots.get_mut(&ticket.key) else {
            return false;
        };
        if slot.generation != ticket.generation {
            debug!(
                slot = %ticket.key,
                stale = ticket.generation,
                latest = slot.generation,
                "Discarding stale response"
            );
            return false;
        }
        slot.value = Some(value);
        true
    }

    /// Last accepted value for `key`.
    pub fn current(&self, key: &str) -> Option<T> {
        self.slots.get(key).and_then(|slot| slot.value.clone())
    }

    /// Run `request` in slot `key`. `None` when a newer request superseded it.
    pub async fn run<F>(&self, key: impl Into<String>, request: F) -> Option<T>
    where
        F: Future<Output = T>,
    {
        let ticket = self.begin(key);
        let value = request.await;
        if self.complete(&ticket, value.clone()) {
            Some(value)
        } else {
            None
        }
    }

    /// Forget a slot, e.g. when its view closes.
    pub fn clear(&self, key: &str) {
        self.slots.remove(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn stale_ticket_is_rejected() {
        let slots = RequestSlots::new();
        let first = slots.begin("outreach:Lotus");
        let second = slots.begin("outreach:Lotus");

        assert!(!slots.is_latest(&first));
        assert!(slots.complete(&second, "new"));
        assert!(!slots.complete(&first, "old"));
        assert_eq!(slots.current("outreach:Lotus"), Some("new"));
    }

    #[test]
    fn slots_are_independent() {
        let slots = RequestSlots::new();
        let a = slots.begin("a");
        let _b = slots.begin("b");
        assert!(slots.complete(&a, 1));
        assert_eq!(slots.current("a"), Some(1));
        assert_eq!(slots.current("b"), None);
    }

    #[test]
    fn cleared_slot_rejects_outstanding_ticket() {
        let slots = RequestSlots::new();
        let ticket = slots.begin("match");
        slots.clear("match");
        assert!(!slots.complete(&ticket, 3));
    }

    #[test]
    fn ticket_from_before_clear_loses_to_new_request() {
        let slots = RequestSlots::new();
        let stale = slots.begin("outreach:Lotus");
        slots.clear("outreach:Lotus");
        let fresh = slots.begin("outreach:Lotus");

        assert_ne!(stale.generation(), fresh.generation());
        assert!(slots.complete(&fresh, "fresh"));
        assert!(!slots.complete(&stale, "stale"));
        assert_eq!(slots.current("outreach:Lotus"), Some("fresh"));
    }

    #[tokio::test]
    async fn late_response_does_not_overwrite_newer() {
        let slots = std::sync::Arc::new(RequestSlots::new());

        let slow = {
            let slots = slots.clone();
            tokio::spawn(async move {
                slots
                    .run("classify", async {
                        tokio::time::sleep(Duration::from_millis(50)).await;
                        "stale"
                    })
                    .await
            })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;
        let fresh = slots.run("classify", async { "fresh" }).await;

        assert_eq!(fresh, Some("fresh"));
        assert_eq!(slow.await.unwrap(), None);
        assert_eq!(slots.current("classify"), Some("fresh"));
    }
}
