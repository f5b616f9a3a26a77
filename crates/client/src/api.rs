use std::future::Future;
use std::pin::Pin;

use roster::{EventRecord, ParticipantRecord};

use crate::error::FetchError;

/// Type alias for a boxed future that can be sent between threads.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Read-only view of the events backend.
///
/// Methods return boxed futures so the loader can hold the API behind a
/// trait object as easily as behind a generic.
pub trait EventsApi: Send + Sync {
    /// `GET /events/{code}`
    fn fetch_event<'a>(&'a self, code: &'a str) -> BoxFuture<'a, Result<EventRecord, FetchError>>;

    /// `GET /events/{code}/participants`
    fn fetch_participants<'a>(
        &'a self,
        code: &'a str,
    ) -> BoxFuture<'a, Result<Vec<ParticipantRecord>, FetchError>>;
}

impl<T: EventsApi + ?Sized> EventsApi for Box<T> {
    fn fetch_event<'a>(&'a self, code: &'a str) -> BoxFuture<'a, Result<EventRecord, FetchError>> {
        (**self).fetch_event(code)
    }

    fn fetch_participants<'a>(
        &'a self,
        code: &'a str,
    ) -> BoxFuture<'a, Result<Vec<ParticipantRecord>, FetchError>> {
        (**self).fetch_participants(code)
    }
}
