use roster::RosterError;

/// Any failure to obtain the event or its participants.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("event {0} not found")]
    EventNotFound(String),

    #[error("event {0} has ended")]
    EventEnded(String),

    #[error(transparent)]
    Decode(#[from] RosterError),

    #[error("invalid client configuration: {0}")]
    Config(String),
}
