use foundation::CoordinateError;

#[derive(Debug, thiserror::Error)]
pub enum RosterError {
    #[error("participant {participant_id} has an invalid position: {source}")]
    InvalidCoordinate {
        participant_id: String,
        #[source]
        source: CoordinateError,
    },

    #[error("participant id {0} appears more than once")]
    DuplicateParticipant(String),

    #[error("malformed roster payload: {0}")]
    Decode(#[from] serde_json::Error),
}
