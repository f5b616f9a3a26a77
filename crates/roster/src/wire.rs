//! JSON records as served by the events backend.
//!
//! These mirror the backend responses field for field. Coordinates are in map
//! percent (`[0, 100]`); conversion to the normalized domain happens when a
//! record becomes a [`crate::Participant`].

use serde::{Deserialize, Serialize};

use crate::error::RosterError;

/// `GET /events/{code}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Echoed by the backend; absent in some deployments.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_true")]
    pub active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_participants: Option<u32>,
    #[serde(default)]
    pub participant_count: u32,
}

/// One element of `GET /events/{code}/participants`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticipantRecord {
    pub participant_id: String,
    pub username: String,
    pub x: f64,
    pub y: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<String>,
    #[serde(default)]
    pub level_1_complete: bool,
    #[serde(default)]
    pub level_2_complete: bool,
    #[serde(default)]
    pub level_3_complete: bool,
    #[serde(default)]
    pub level_4_complete: bool,
    #[serde(default)]
    pub level_5_complete: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completion_percentage: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_code: Option<String>,
}

impl ParticipantRecord {
    /// Completion flags in level order.
    pub fn level_flags(&self) -> [bool; 5] {
        [
            self.level_1_complete,
            self.level_2_complete,
            self.level_3_complete,
            self.level_4_complete,
            self.level_5_complete,
        ]
    }
}

fn default_true() -> bool {
    true
}

pub fn decode_event(body: &str) -> Result<EventRecord, RosterError> {
    Ok(serde_json::from_str(body)?)
}

pub fn decode_participants(body: &str) -> Result<Vec<ParticipantRecord>, RosterError> {
    Ok(serde_json::from_str(body)?)
}
