//! Notifications emitted by a traversal.
//!
//! Every emitted event is recorded in [`Outputs`] (cleared at the start of each
//! tick or mutating call) and forwarded to registered observers in the same
//! order.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ids::{IdAllocator, SubscriptionId};
use crate::math::{Quat, Vec3};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum TraversalEvent {
    /// A pose was applied to the sink.
    Updated { position: Vec3, rotation: Quat },
    /// A loop boundary was crossed; `loops` is the completed loop count.
    Completed { loops: u32 },
}

impl TraversalEvent {
    #[inline]
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed { .. })
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Outputs {
    #[serde(default)]
    pub events: Vec<TraversalEvent>,
}

impl Outputs {
    #[inline]
    pub fn clear(&mut self) {
        self.events.clear();
    }

    #[inline]
    pub fn push_event(&mut self, event: TraversalEvent) {
        self.events.push(event);
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn completed_count(&self) -> usize {
        self.events.iter().filter(|e| e.is_completed()).count()
    }

    /// Most recent applied pose, if any.
    pub fn last_update(&self) -> Option<(Vec3, Quat)> {
        self.events.iter().rev().find_map(|e| match e {
            TraversalEvent::Updated { position, rotation } => Some((*position, *rotation)),
            _ => None,
        })
    }
}

pub type Observer = Box<dyn FnMut(&TraversalEvent)>;

/// Typed callback registry.
#[derive(Default)]
pub struct Observers {
    ids: IdAllocator,
    entries: Vec<(SubscriptionId, Observer)>,
}

impl Observers {
    pub fn subscribe(&mut self, observer: Observer) -> SubscriptionId {
        let id = self.ids.alloc_subscription();
        self.entries.push((id, observer));
        id
    }

    /// Returns false when `id` was not subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(sid, _)| *sid != id);
        self.entries.len() != before
    }

    pub fn notify(&mut self, event: &TraversalEvent) {
        for (_, observer) in self.entries.iter_mut() {
            observer(event);
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for Observers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observers")
            .field("count", &self.entries.len())
            .finish()
    }
}
