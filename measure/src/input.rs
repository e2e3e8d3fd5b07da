//! Input model: pointer event kinds, the panel-drag gesture, and the event
//! bus through which tools subscribe to pointer events.
//!
//! A tool subscribes while its context is enabled and keeps the returned ids
//! in a [`SubscriptionSet`]. Disabling the context hands the whole set back to
//! [`EventBus::release_all`], so no listener outlives its tool.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use frames::ToolType;

use crate::camera::ScreenPoint;

/// Pointer events a tool can listen to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerKind {
    Down,
    Move,
    Up,
}

impl PointerKind {
    /// All kinds, in the order tools subscribe to them.
    pub const ALL: [Self; 3] = [Self::Down, Self::Move, Self::Up];
}

/// State of the panel-drag gesture between pointer-down and pointer-up.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum DragState {
    /// No drag in progress.
    #[default]
    Idle,
    /// The user pressed on the panel and is moving it.
    DraggingPanel {
        /// Screen position of the previous pointer event, used to compute the delta.
        last_screen: ScreenPoint,
    },
}

impl DragState {
    #[must_use]
    pub fn is_dragging(&self) -> bool {
        matches!(self, Self::DraggingPanel { .. })
    }
}

/// Handle returned by [`EventBus::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

#[derive(Debug, Clone, Copy)]
struct Subscription {
    id: SubscriptionId,
    owner: ToolType,
    kind: PointerKind,
}

/// Registry of active pointer subscriptions.
#[derive(Debug, Default)]
pub struct EventBus {
    next_id: u64,
    active: Vec<Subscription>,
}

impl EventBus {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `owner` for `kind` events.
    pub fn subscribe(&mut self, owner: ToolType, kind: PointerKind) -> SubscriptionId {
        self.next_id += 1;
        let id = SubscriptionId(self.next_id);
        self.active.push(Subscription { id, owner, kind });
        id
    }

    /// Drop one subscription. Unknown ids are ignored.
    pub fn release(&mut self, id: SubscriptionId) {
        self.active.retain(|s| s.id != id);
    }

    /// Drop every subscription in `set` and empty it.
    pub fn release_all(&mut self, set: &mut SubscriptionSet) {
        for id in set.ids.drain(..) {
            self.release(id);
        }
    }

    /// Whether `owner` currently listens to `kind`.
    #[must_use]
    pub fn wants(&self, owner: ToolType, kind: PointerKind) -> bool {
        self.active.iter().any(|s| s.owner == owner && s.kind == kind)
    }

    /// Number of live subscriptions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.active.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }
}

/// The subscriptions held by one tool, released together.
#[derive(Debug, Default)]
pub struct SubscriptionSet {
    ids: Vec<SubscriptionId>,
}

impl SubscriptionSet {
    pub fn push(&mut self, id: SubscriptionId) {
        self.ids.push(id);
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }
}
