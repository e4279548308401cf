//! Host-originated events and toolbar subscriptions to them.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Events the host pushes to the panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostEvent {
    /// The global "apply code from chat" shortcut was pressed.
    ApplyCodeFromChat,
}

/// A subscription to a single host event.
///
/// The listener is only registered while `active` holds, and it is torn down
/// and registered again whenever its dependency key changes.
#[derive(Debug, Clone)]
pub struct Listener {
    event: HostEvent,
    deps: Option<u64>,
    subscribed: bool,
    subscriptions: u32,
}

impl Listener {
    pub fn new(event: HostEvent) -> Self {
        Self {
            event,
            deps: None,
            subscribed: false,
            subscriptions: 0,
        }
    }

    /// Bring the subscription in line with the current gate and dependencies.
    /// Returns true when a new registration was made.
    pub fn sync<D: Hash>(&mut self, active: bool, deps: &D) -> bool {
        let key = dependency_key(deps);
        let changed = self.deps != Some(key);
        self.deps = Some(key);

        if !active {
            if self.subscribed {
                tracing::trace!(event = ?self.event, "unsubscribe");
            }
            self.subscribed = false;
            return false;
        }

        if changed || !self.subscribed {
            self.subscribed = true;
            self.subscriptions += 1;
            tracing::trace!(event = ?self.event, "subscribe");
            return true;
        }
        false
    }

    /// Whether an incoming event should reach the handler.
    pub fn accepts(&self, event: HostEvent) -> bool {
        self.subscribed && self.event == event
    }

    pub fn is_subscribed(&self) -> bool {
        self.subscribed
    }

    /// How many times the listener has been registered.
    pub fn subscriptions(&self) -> u32 {
        self.subscriptions
    }
}

fn dependency_key<D: Hash>(deps: &D) -> u64 {
    let mut hasher = DefaultHasher::new();
    deps.hash(&mut hasher);
    hasher.finish()
}
