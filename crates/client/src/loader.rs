use roster::{Event, Ingested, Roster};
use store::MapStore;
use tracing::{debug, info, warn};

use crate::api::EventsApi;
use crate::error::FetchError;

/// Ticket for one participant request, in issue order.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestSeq(u64);

/// Orders responses of overlapping roster requests.
///
/// A response is applied only if no response to a later-issued request has
/// been applied already, so a slow old fetch cannot overwrite fresh data.
#[derive(Debug, Default)]
pub struct RequestSequencer {
    next: u64,
    applied: Option<RequestSeq>,
}

impl RequestSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&mut self) -> RequestSeq {
        let seq = RequestSeq(self.next);
        self.next += 1;
        seq
    }

    /// Returns `true` and records `seq` if its response should be applied.
    pub fn accept(&mut self, seq: RequestSeq) -> bool {
        if self.applied.is_some_and(|latest| latest >= seq) {
            return false;
        }
        self.applied = Some(seq);
        true
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct LoadSummary {
    pub participants: usize,
    pub rejected: usize,
}

/// Drives a [`MapStore`] from an [`EventsApi`].
#[derive(Debug)]
pub struct MapLoader<A> {
    api: A,
    sequencer: RequestSequencer,
}

impl<A: EventsApi> MapLoader<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            sequencer: RequestSequencer::new(),
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// Initial load of the event and its roster.
    ///
    /// `is_loading` is raised on entry and lowered on every exit. A failure
    /// leaves the previous data in place, records the message as the store's
    /// load error, and is returned to the caller.
    pub async fn load(
        &mut self,
        store: &mut MapStore,
        code: &str,
    ) -> Result<LoadSummary, FetchError> {
        store.set_is_loading(true);
        store.set_load_error(None);

        let seq = self.sequencer.issue();
        let fetched = self.fetch_all(code).await;
        let outcome = match fetched {
            Ok((event, ingested)) => {
                store.set_event(Some(event));
                let summary = summarize(&ingested);
                self.apply_participants(store, seq, ingested.roster);
                info!(
                    event = code,
                    participants = summary.participants,
                    rejected = summary.rejected,
                    "map data loaded"
                );
                Ok(summary)
            }
            Err(err) => {
                warn!(event = code, "map data load failed: {err}");
                store.set_load_error(Some(err.to_string()));
                Err(err)
            }
        };

        store.set_is_loading(false);
        outcome
    }

    /// Re-fetches the roster without touching the loading flag. On failure
    /// the current roster stays as is.
    ///
    /// Returns whether the result was applied.
    pub async fn refresh_participants(
        &mut self,
        store: &mut MapStore,
        code: &str,
    ) -> Result<bool, FetchError> {
        let seq = self.sequencer.issue();
        let ingested = self.fetch_participants(code).await?;
        Ok(self.apply_participants(store, seq, ingested.roster))
    }

    /// Starts a roster request whose result will go through
    /// [`Self::apply_participants`]. Use with [`Self::fetch_participants`]
    /// when several refreshes may be in flight at once.
    pub fn begin_request(&mut self) -> RequestSeq {
        self.sequencer.issue()
    }

    pub async fn fetch_participants(&self, code: &str) -> Result<Ingested, FetchError> {
        let records = self.api.fetch_participants(code).await?;
        Ok(Roster::ingest(records))
    }

    /// Applies a roster unless a newer one is already in the store.
    pub fn apply_participants(
        &mut self,
        store: &mut MapStore,
        seq: RequestSeq,
        roster: Roster,
    ) -> bool {
        if !self.sequencer.accept(seq) {
            debug!(?seq, "discarding out-of-date participant list");
            return false;
        }
        store.set_participants(roster);
        true
    }

    async fn fetch_all(&self, code: &str) -> Result<(Event, Ingested), FetchError> {
        let record = self.api.fetch_event(code).await?;
        let event = Event::from_record(code, record);
        let ingested = self.fetch_participants(code).await?;
        Ok((event, ingested))
    }
}

fn summarize(ingested: &Ingested) -> LoadSummary {
    LoadSummary {
        participants: ingested.roster.len(),
        rejected: ingested.rejected.len(),
    }
}
