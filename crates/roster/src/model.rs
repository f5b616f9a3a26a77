use std::collections::HashSet;

use foundation::math::MapPosition;
use tracing::warn;

use crate::error::RosterError;
use crate::wire::{EventRecord, ParticipantRecord};

/// Number of completion flags a participant carries.
pub const LEVEL_FLAG_COUNT: usize = 5;

/// One workshop instance. Replaced wholesale whenever it is re-fetched.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub active: bool,
    pub max_participants: Option<u32>,
    pub participant_count: u32,
}

impl Event {
    /// Builds an event from its record, falling back to the code it was
    /// requested under when the backend does not echo one.
    pub fn from_record(requested_code: &str, record: EventRecord) -> Self {
        Self {
            code: record.code.unwrap_or_else(|| requested_code.to_string()),
            name: record.name,
            description: record.description,
            active: record.active,
            max_participants: record.max_participants,
            participant_count: record.participant_count,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Participant {
    pub id: String,
    pub username: String,
    pub position: MapPosition,
    pub icon_url: Option<String>,
    /// `levels_complete[i]` is the backend's `level_{i+1}_complete`.
    pub levels_complete: [bool; LEVEL_FLAG_COUNT],
    /// Carried as supplied; never recomputed from the flags.
    pub completion_percentage: Option<f64>,
    pub event_code: Option<String>,
}

impl TryFrom<ParticipantRecord> for Participant {
    type Error = RosterError;

    fn try_from(record: ParticipantRecord) -> Result<Self, Self::Error> {
        let levels_complete = record.level_flags();
        let position = MapPosition::from_percent(record.x, record.y).map_err(|source| {
            RosterError::InvalidCoordinate {
                participant_id: record.participant_id.clone(),
                source,
            }
        })?;
        Ok(Self {
            id: record.participant_id,
            username: record.username,
            position,
            icon_url: record.icon_url,
            levels_complete,
            completion_percentage: record.completion_percentage,
            event_code: record.event_code,
        })
    }
}

/// Participants of one event, in backend order, with unique ids.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Roster {
    participants: Vec<Participant>,
}

/// Result of lenient ingestion: the usable roster plus what was dropped.
#[derive(Debug, Default)]
pub struct Ingested {
    pub roster: Roster,
    pub rejected: Vec<RosterError>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Strict construction: any duplicate id is an error.
    pub fn try_from_participants(participants: Vec<Participant>) -> Result<Self, RosterError> {
        let mut seen = HashSet::with_capacity(participants.len());
        for p in &participants {
            if !seen.insert(p.id.as_str()) {
                return Err(RosterError::DuplicateParticipant(p.id.clone()));
            }
        }
        Ok(Self { participants })
    }

    /// Lenient construction from backend records.
    ///
    /// Records with non-finite coordinates are dropped; for a repeated id the
    /// first record wins. Every drop is logged and reported in `rejected`.
    pub fn ingest(records: Vec<ParticipantRecord>) -> Ingested {
        let mut participants = Vec::with_capacity(records.len());
        let mut rejected = Vec::new();
        let mut seen = HashSet::with_capacity(records.len());

        for record in records {
            if seen.contains(&record.participant_id) {
                warn!(participant_id = %record.participant_id, "dropping duplicate participant");
                rejected.push(RosterError::DuplicateParticipant(record.participant_id));
                continue;
            }
            match Participant::try_from(record) {
                Ok(p) => {
                    seen.insert(p.id.clone());
                    participants.push(p);
                }
                Err(err) => {
                    warn!("dropping participant: {err}");
                    rejected.push(err);
                }
            }
        }

        Ingested {
            roster: Self { participants },
            rejected,
        }
    }

    pub fn len(&self) -> usize {
        self.participants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Participant> {
        self.participants.iter().find(|p| p.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Participant> + '_ {
        self.participants.iter()
    }

    pub fn as_slice(&self) -> &[Participant] {
        &self.participants
    }
}

impl<'a> IntoIterator for &'a Roster {
    type Item = &'a Participant;
    type IntoIter = std::slice::Iter<'a, Participant>;

    fn into_iter(self) -> Self::IntoIter {
        self.participants.iter()
    }
}
