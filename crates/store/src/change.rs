use crate::map_store::MapState;

/// What a store mutation changed. Emitted once per effective mutation; setters
/// that leave the state untouched emit nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreChange {
    EventReplaced {
        code: Option<String>,
    },
    ParticipantsReplaced {
        count: usize,
    },
    SelectionChanged {
        selected: Option<String>,
        reason: SelectionReason,
    },
    CurrentUserChanged {
        user_id: Option<String>,
    },
    ParticipantListToggled {
        visible: bool,
    },
    AutoRotateChanged {
        enabled: bool,
    },
    LoadingChanged {
        loading: bool,
    },
    LoadErrorChanged {
        message: Option<String>,
    },
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SelectionReason {
    /// Explicit select or clear.
    User,
    /// The selected participant vanished from a refreshed roster, or the
    /// requested id was never in it.
    Stale,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

pub type Listener = Box<dyn FnMut(&StoreChange, &MapState)>;

/// Publish/subscribe fan-out for store changes.
///
/// Listeners run synchronously, in subscription order, after the state has
/// been updated.
#[derive(Default)]
pub struct ChangeBus {
    next_id: u64,
    listeners: Vec<(SubscriptionId, Listener)>,
}

impl ChangeBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, listener: Listener) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, listener));
        id
    }

    /// Returns `true` if the subscription existed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sid, _)| *sid != id);
        self.listeners.len() != before
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    pub fn emit(&mut self, change: &StoreChange, state: &MapState) {
        for (_, listener) in &mut self.listeners {
            listener(change, state);
        }
    }
}

impl std::fmt::Debug for ChangeBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangeBus")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
