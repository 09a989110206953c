//! Publish/subscribe channel for "this resource changed" notices.
//!
//! Mutation flows publish after a successful request; list views subscribe to
//! the resources they show and refetch when a notice arrives.

use crate::models::Resource;
use crossbeam_channel::{unbounded, Receiver, Sender};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Change {
    Created { id: Option<String> },
    Updated { id: String },
    Deleted { id: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invalidation {
    pub resource: Resource,
    pub change: Change,
}

struct Subscriber {
    resources: Vec<Resource>,
    tx: Sender<Invalidation>,
}

/// Shared bus; clones publish to and subscribe on the same subscriber set.
#[derive(Clone, Default)]
pub struct InvalidationBus {
    subscribers: Arc<Mutex<Vec<Subscriber>>>,
}

impl InvalidationBus {
    pub fn new() -> Self {
        Self::default()
    }

    fn subscribers(&self) -> MutexGuard<'_, Vec<Subscriber>> {
        // A panic while holding the lock leaves the list itself intact.
        match self.subscribers.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Receive notices for any of `resources`. Dropping the receiver
    /// unsubscribes on the next publish.
    pub fn subscribe(&self, resources: &[Resource]) -> Receiver<Invalidation> {
        let (tx, rx) = unbounded();
        self.subscribers().push(Subscriber {
            resources: resources.to_vec(),
            tx,
        });
        rx
    }

    /// Deliver `invalidation` to matching subscribers.
    ///
    /// # Returns
    /// Number of subscribers the notice was delivered to.
    pub fn publish(&self, invalidation: Invalidation) -> usize {
        let mut subscribers = self.subscribers();
        subscribers.retain(|subscriber| {
            if !subscriber.resources.contains(&invalidation.resource) {
                return true;
            }
            subscriber.tx.send(invalidation.clone()).is_ok()
        });
        let delivered = subscribers
            .iter()
            .filter(|subscriber| subscriber.resources.contains(&invalidation.resource))
            .count();
        debug!(
            resource = %invalidation.resource,
            change = ?invalidation.change,
            delivered,
            "published invalidation"
        );
        delivered
    }

    #[cfg(test)]
    fn subscriber_count(&self) -> usize {
        self.subscribers().len()
    }
}
