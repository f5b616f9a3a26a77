use roster::{Event, Participant, Roster, completion_percentage};
use tracing::{debug, warn};

use crate::change::{ChangeBus, Listener, SelectionReason, StoreChange, SubscriptionId};

/// Snapshot of everything the map UI renders from.
///
/// Fields are read through accessors; writes go through [`MapStore`] so every
/// mutation is observed.
#[derive(Debug, Clone, PartialEq)]
pub struct MapState {
    event: Option<Event>,
    participants: Roster,
    selected_id: Option<String>,
    current_user_id: Option<String>,
    show_participant_list: bool,
    auto_rotate: bool,
    is_loading: bool,
    load_error: Option<String>,
    revision: u64,
}

impl Default for MapState {
    fn default() -> Self {
        Self {
            event: None,
            participants: Roster::new(),
            selected_id: None,
            current_user_id: None,
            show_participant_list: false,
            auto_rotate: true,
            is_loading: false,
            load_error: None,
            revision: 0,
        }
    }
}

impl MapState {
    pub fn event(&self) -> Option<&Event> {
        self.event.as_ref()
    }

    pub fn participants(&self) -> &Roster {
        &self.participants
    }

    /// The selected participant, resolved against the current roster.
    pub fn selected_participant(&self) -> Option<&Participant> {
        self.participants.get(self.selected_id.as_deref()?)
    }

    pub fn selected_id(&self) -> Option<&str> {
        self.selected_id.as_deref()
    }

    pub fn current_user_id(&self) -> Option<&str> {
        self.current_user_id.as_deref()
    }

    pub fn is_current_user(&self, participant: &Participant) -> bool {
        self.current_user_id.as_deref() == Some(participant.id.as_str())
    }

    pub fn current_user(&self) -> Option<&Participant> {
        self.participants.get(self.current_user_id.as_deref()?)
    }

    pub fn show_participant_list(&self) -> bool {
        self.show_participant_list
    }

    /// The stored auto-rotate preference. Use [`Self::camera_should_rotate`]
    /// to drive the camera.
    pub fn auto_rotate(&self) -> bool {
        self.auto_rotate
    }

    /// Rotation is suppressed while anyone is selected, whatever the flag says.
    pub fn camera_should_rotate(&self) -> bool {
        self.auto_rotate && self.selected_id.is_none()
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn load_error(&self) -> Option<&str> {
        self.load_error.as_deref()
    }

    /// Incremented once per setter call that changed anything.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Participants for the list panel: most complete first, ties by username.
    pub fn participants_by_progress(&self) -> Vec<&Participant> {
        let mut out: Vec<&Participant> = self.participants.iter().collect();
        out.sort_by(|a, b| {
            completion_percentage(b)
                .total_cmp(&completion_percentage(a))
                .then_with(|| a.username.cmp(&b.username))
        });
        out
    }
}

/// The single authoritative state container for the map UI.
///
/// Not synchronized: it expects one writer at a time, the way a UI event loop
/// drives it. Every setter is a single transition that cannot fail.
#[derive(Debug, Default)]
pub struct MapStore {
    state: MapState,
    bus: ChangeBus,
}

impl MapStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &MapState {
        &self.state
    }

    pub fn subscribe(
        &mut self,
        listener: impl FnMut(&StoreChange, &MapState) + 'static,
    ) -> SubscriptionId {
        let listener: Listener = Box::new(listener);
        self.bus.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.bus.unsubscribe(id)
    }

    pub fn set_event(&mut self, event: Option<Event>) {
        if self.state.event == event {
            return;
        }
        let code = event.as_ref().map(|e| e.code.clone());
        self.state.event = event;
        self.publish(vec![StoreChange::EventReplaced { code }]);
    }

    /// Replaces the roster wholesale.
    ///
    /// A selection whose participant is gone from the new roster is cleared
    /// in the same transition; a selection that survives resolves to the
    /// fresh record.
    pub fn set_participants(&mut self, participants: Roster) {
        let count = participants.len();
        self.state.participants = participants;
        let mut changes = vec![StoreChange::ParticipantsReplaced { count }];

        let stale = self
            .state
            .selected_id
            .as_deref()
            .is_some_and(|id| !self.state.participants.contains(id));
        if stale {
            debug!(
                selected = ?self.state.selected_id,
                "selected participant left the roster; clearing selection"
            );
            changes.extend(self.clear_selection(SelectionReason::Stale));
        }
        self.publish(changes);
    }

    /// Selects a participant by id, or clears the selection with `None`.
    ///
    /// Selecting pauses auto-rotate and clearing resumes it. An id that is
    /// not in the roster clears the selection instead of pointing at nothing.
    pub fn set_selected_participant(&mut self, id: Option<&str>) {
        let changes = match id {
            Some(id) if self.state.participants.contains(id) => {
                if self.state.selected_id.as_deref() == Some(id) {
                    return;
                }
                self.state.selected_id = Some(id.to_string());
                let mut changes = vec![StoreChange::SelectionChanged {
                    selected: Some(id.to_string()),
                    reason: SelectionReason::User,
                }];
                changes.extend(self.apply_auto_rotate(false));
                changes
            }
            Some(id) => {
                warn!(participant_id = id, "cannot select unknown participant");
                self.clear_selection(SelectionReason::Stale)
            }
            None => self.clear_selection(SelectionReason::User),
        };
        self.publish(changes);
    }

    pub fn set_current_user_id(&mut self, user_id: Option<String>) {
        if self.state.current_user_id == user_id {
            return;
        }
        self.state.current_user_id = user_id.clone();
        self.publish(vec![StoreChange::CurrentUserChanged { user_id }]);
    }

    pub fn toggle_participant_list(&mut self) {
        self.state.show_participant_list = !self.state.show_participant_list;
        let visible = self.state.show_participant_list;
        self.publish(vec![StoreChange::ParticipantListToggled { visible }]);
    }

    pub fn set_auto_rotate(&mut self, enabled: bool) {
        let changes = self.apply_auto_rotate(enabled).into_iter().collect();
        self.publish(changes);
    }

    pub fn set_is_loading(&mut self, loading: bool) {
        if self.state.is_loading == loading {
            return;
        }
        self.state.is_loading = loading;
        self.publish(vec![StoreChange::LoadingChanged { loading }]);
    }

    /// Message for the error display; `None` clears it.
    pub fn set_load_error(&mut self, message: Option<String>) {
        if self.state.load_error == message {
            return;
        }
        self.state.load_error = message.clone();
        self.publish(vec![StoreChange::LoadErrorChanged { message }]);
    }

    fn apply_auto_rotate(&mut self, enabled: bool) -> Option<StoreChange> {
        if self.state.auto_rotate == enabled {
            return None;
        }
        self.state.auto_rotate = enabled;
        Some(StoreChange::AutoRotateChanged { enabled })
    }

    fn clear_selection(&mut self, reason: SelectionReason) -> Vec<StoreChange> {
        if self.state.selected_id.take().is_none() {
            return Vec::new();
        }
        let mut changes = vec![StoreChange::SelectionChanged {
            selected: None,
            reason,
        }];
        changes.extend(self.apply_auto_rotate(true));
        changes
    }

    /// Emits the changes of one transition. Every field is already written,
    /// so each listener call sees the finished state.
    fn publish(&mut self, changes: Vec<StoreChange>) {
        if changes.is_empty() {
            return;
        }
        self.state.revision += 1;
        for change in &changes {
            self.bus.emit(change, &self.state);
        }
    }
}


#[cfg(test)]
mod tests {
    use super::MapStore;
    use super::fixtures::{participant, roster};
    use crate::change::{SelectionReason, StoreChange};
    use pretty_assertions::assert_eq;
    use roster::Event;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn recorded(store: &mut MapStore) -> Rc<RefCell<Vec<StoreChange>>> {
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&log);
        store.subscribe(move |change, _| sink.borrow_mut().push(change.clone()));
        log
    }

    fn event(code: &str) -> Event {
        Event {
            code: code.to_string(),
            name: "Way Back Home".to_string(),
            description: None,
            active: true,
            max_participants: None,
            participant_count: 0,
        }
    }

    #[test]
    fn fresh_store_defaults() {
        let store = MapStore::new();
        let s = store.state();
        assert!(s.event().is_none());
        assert!(s.participants().is_empty());
        assert!(s.selected_participant().is_none());
        assert!(s.auto_rotate());
        assert!(s.camera_should_rotate());
        assert!(!s.is_loading());
        assert!(!s.show_participant_list());
        assert_eq!(s.revision(), 0);
    }

    #[test]
    fn removed_selection_is_cleared_on_refresh() {
        let a = participant("a", 0.1, [true, false, false, false, false]);
        let b = participant("b", 0.2, [false; 5]);
        let mut store = MapStore::new();

        store.set_participants(roster(vec![a.clone(), b.clone()]));
        store.set_selected_participant(Some("a"));
        assert_eq!(store.state().selected_participant(), Some(&a));

        let log = recorded(&mut store);
        store.set_participants(roster(vec![b]));

        assert!(store.state().selected_participant().is_none());
        assert_eq!(store.state().selected_id(), None);
        assert_eq!(
            *log.borrow(),
            vec![
                StoreChange::ParticipantsReplaced { count: 1 },
                StoreChange::SelectionChanged {
                    selected: None,
                    reason: SelectionReason::Stale,
                },
                StoreChange::AutoRotateChanged { enabled: true },
            ]
        );
    }

    #[test]
    fn listeners_never_see_a_half_applied_transition() {
        let mut store = MapStore::new();
        store.set_participants(roster(vec![
            participant("a", 0.1, [false; 5]),
            participant("b", 0.2, [false; 5]),
        ]));

        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        store.subscribe(move |change, state| {
            sink.borrow_mut().push((
                change.clone(),
                state.selected_id().map(str::to_string),
                state.selected_id().is_none() || state.selected_participant().is_some(),
                state.auto_rotate(),
                state.revision(),
            ));
        });

        store.set_selected_participant(Some("a"));
        for (change, selected, resolves, rotate, _) in seen.borrow().iter() {
            assert_eq!(selected.as_deref(), Some("a"), "during {change:?}");
            assert!(resolves, "during {change:?}");
            assert!(!rotate, "during {change:?}");
        }

        seen.borrow_mut().clear();
        let before = store.state().revision();
        store.set_participants(roster(vec![participant("b", 0.2, [false; 5])]));

        let seen = seen.borrow();
        assert_eq!(seen.len(), 3);
        for (change, selected, resolves, rotate, revision) in seen.iter() {
            assert_eq!(*selected, None, "during {change:?}");
            assert!(resolves, "during {change:?}");
            assert!(rotate, "during {change:?}");
            assert_eq!(*revision, before + 1, "during {change:?}");
        }
    }

    #[test]
    fn surviving_selection_resolves_to_fresh_record() {
        let mut store = MapStore::new();
        store.set_participants(roster(vec![participant("a", 0.1, [false; 5])]));
        store.set_selected_participant(Some("a"));

        let updated = participant("a", 0.1, [true, true, false, false, false]);
        store.set_participants(roster(vec![updated.clone()]));
        assert_eq!(store.state().selected_participant(), Some(&updated));
    }

    #[test]
    fn selecting_pauses_rotation_and_clearing_resumes() {
        let mut store = MapStore::new();
        store.set_participants(roster(vec![participant("a", 0.1, [false; 5])]));

        store.set_selected_participant(Some("a"));
        assert!(!store.state().auto_rotate());
        assert!(!store.state().camera_should_rotate());

        // A stored flag turned back on still cannot rotate the camera while
        // someone is selected.
        store.set_auto_rotate(true);
        assert!(store.state().auto_rotate());
        assert!(!store.state().camera_should_rotate());

        store.set_selected_participant(None);
        assert!(store.state().camera_should_rotate());
    }

    #[test]
    fn selecting_unknown_id_clears_selection() {
        let mut store = MapStore::new();
        store.set_participants(roster(vec![participant("a", 0.1, [false; 5])]));
        store.set_selected_participant(Some("a"));

        let log = recorded(&mut store);
        store.set_selected_participant(Some("ghost"));
        assert!(store.state().selected_participant().is_none());
        assert_eq!(
            log.borrow()[0],
            StoreChange::SelectionChanged {
                selected: None,
                reason: SelectionReason::Stale,
            }
        );
    }

    #[test]
    fn no_op_setters_emit_nothing() {
        let mut store = MapStore::new();
        store.set_event(Some(event("nyc")));
        store.set_current_user_id(Some("a".to_string()));
        let log = recorded(&mut store);
        let revision = store.state().revision();

        store.set_event(Some(event("nyc")));
        store.set_current_user_id(Some("a".to_string()));
        store.set_auto_rotate(true);
        store.set_is_loading(false);
        store.set_load_error(None);
        store.set_selected_participant(None);

        assert!(log.borrow().is_empty());
        assert_eq!(store.state().revision(), revision);
    }

    #[test]
    fn toggle_flips_list_visibility() {
        let mut store = MapStore::new();
        let log = recorded(&mut store);
        store.toggle_participant_list();
        store.toggle_participant_list();
        assert!(!store.state().show_participant_list());
        assert_eq!(
            *log.borrow(),
            vec![
                StoreChange::ParticipantListToggled { visible: true },
                StoreChange::ParticipantListToggled { visible: false },
            ]
        );
    }

    #[test]
    fn event_is_replaced_wholesale() {
        let mut store = MapStore::new();
        store.set_event(Some(event("nyc")));
        store.set_event(Some(event("sf")));
        assert_eq!(store.state().event().map(|e| e.code.as_str()), Some("sf"));
        store.set_event(None);
        assert!(store.state().event().is_none());
    }

    #[test]
    fn current_user_lookup() {
        let mut store = MapStore::new();
        let a = participant("a", 0.1, [false; 5]);
        store.set_participants(roster(vec![a.clone()]));
        store.set_current_user_id(Some("a".to_string()));
        assert!(store.state().is_current_user(&a));
        assert_eq!(store.state().current_user(), Some(&a));

        store.set_current_user_id(None);
        assert!(!store.state().is_current_user(&a));
    }

    #[test]
    fn listeners_see_updated_state() {
        let mut store = MapStore::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let id = store.subscribe(move |_, state| sink.borrow_mut().push(state.is_loading()));

        store.set_is_loading(true);
        store.set_is_loading(false);
        assert!(store.unsubscribe(id));
        store.set_is_loading(true);

        assert_eq!(*seen.borrow(), vec![true, false]);
    }

    #[test]
    fn list_order_is_by_progress_then_name() {
        let mut store = MapStore::new();
        let mut zed = participant("zed", 0.1, [true, false, false, false, false]);
        zed.username = "zed".to_string();
        let amy = participant("amy", 0.2, [true, false, false, false, false]);
        let mut top = participant("top", 0.3, [false; 5]);
        top.completion_percentage = Some(95.0);
        store.set_participants(roster(vec![zed, amy, top]));

        let order: Vec<&str> = store
            .state()
            .participants_by_progress()
            .into_iter()
            .map(|p| p.id.as_str())
            .collect();
        assert_eq!(order, vec!["top", "amy", "zed"]);
    }
}
