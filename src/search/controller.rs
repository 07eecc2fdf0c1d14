use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::deezer::{Track, TrackSearch};
use crate::error::Result;
use crate::search::debounce::Debouncer;

/// Query used whenever the settled input is empty.
pub const DEFAULT_QUERY: &str = "top songs";
pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(500);
pub const FETCH_FAILED_MESSAGE: &str = "Failed to fetch tracks.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchPhase {
    Idle,
    Loading,
    Success,
    Error(String),
}

#[derive(Debug, Clone)]
pub struct SearchState {
    /// Text as typed, updated on every keystroke.
    pub query: String,
    /// Last value that survived the debounce window.
    pub debounced_query: Option<String>,
    pub tracks: Vec<Track>,
    pub phase: SearchPhase,
}

impl SearchState {
    fn new() -> Self {
        Self {
            query: String::new(),
            debounced_query: None,
            tracks: Vec::new(),
            phase: SearchPhase::Idle,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.phase == SearchPhase::Loading
    }

    pub fn error(&self) -> Option<&str> {
        match &self.phase {
            SearchPhase::Error(message) => Some(message),
            _ => None,
        }
    }

    /// The query actually sent upstream for the current debounced value.
    pub fn effective_query(&self) -> &str {
        effective_query(self.debounced_query.as_deref().unwrap_or_default())
    }

    /// User-facing message for a successful search that found nothing.
    pub fn empty_notice(&self) -> Option<String> {
        if self.phase == SearchPhase::Success && self.tracks.is_empty() {
            Some(format!("No tracks found for '{}'.", self.effective_query()))
        } else {
            None
        }
    }
}

/// Maps a settled input to the query sent upstream.
pub fn effective_query(debounced: &str) -> &str {
    if debounced.is_empty() {
        DEFAULT_QUERY
    } else {
        debounced
    }
}

/// Identifies one issued search. Only the ticket with the latest generation
/// may update the visible state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTicket {
    pub generation: u64,
    pub query: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchEvent {
    /// A settled input issued a new request.
    Started(SearchTicket),
    /// The latest request completed and its outcome is now visible.
    Applied(SearchTicket),
    /// A superseded request completed and its outcome was ignored.
    Discarded(SearchTicket),
}

type Completion = (SearchTicket, Result<Vec<Track>>);

/// Debounces query input, issues searches and keeps the visible result state.
pub struct SearchController<S> {
    source: Arc<S>,
    state: SearchState,
    generation: u64,
    debouncer: Debouncer<String>,
    completions_tx: mpsc::UnboundedSender<Completion>,
    completions_rx: mpsc::UnboundedReceiver<Completion>,
}

impl<S: TrackSearch> SearchController<S> {
    pub fn new(source: S) -> Self {
        Self::with_delay(source, SEARCH_DEBOUNCE)
    }

    pub fn with_delay(source: S, delay: Duration) -> Self {
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();

        Self {
            source: Arc::new(source),
            state: SearchState::new(),
            generation: 0,
            debouncer: Debouncer::new(delay),
            completions_tx,
            completions_rx,
        }
    }

    pub fn state(&self) -> &SearchState {
        &self.state
    }

    /// Issues the initial search for the empty input.
    pub fn start(&mut self) -> Option<SearchTicket> {
        self.settle(String::new())
    }

    /// Records a change of the raw input and restarts the debounce window.
    pub fn input(&mut self, raw: impl Into<String>) {
        let raw = raw.into();
        self.state.query = raw.clone();
        self.debouncer.push(raw);
    }

    /// Applies a settled input. Issues a request unless the value is already
    /// the debounced query.
    pub fn settle(&mut self, value: String) -> Option<SearchTicket> {
        if self.state.debounced_query.as_deref() == Some(value.as_str()) {
            debug!("Settled query unchanged, no search issued");
            return None;
        }

        self.state.debounced_query = Some(value);
        let ticket = self.begin_search();
        self.spawn_request(ticket.clone());

        Some(ticket)
    }

    /// Moves to `Loading` for the current debounced query and returns its ticket.
    fn begin_search(&mut self) -> SearchTicket {
        self.generation += 1;
        self.state.tracks.clear();
        self.state.phase = SearchPhase::Loading;

        let ticket = SearchTicket {
            generation: self.generation,
            query: self.state.effective_query().to_string(),
        };
        info!(
            generation = ticket.generation,
            query = %ticket.query,
            "Searching tracks"
        );

        ticket
    }

    fn spawn_request(&self, ticket: SearchTicket) {
        let source = Arc::clone(&self.source);
        let completions = self.completions_tx.clone();

        tokio::spawn(async move {
            let result = source.search(&ticket.query).await;
            // The receiver lives as long as the controller.
            let _ = completions.send((ticket, result));
        });
    }

    /// Applies a finished request. Returns `false` when the ticket was
    /// superseded and the result ignored.
    pub fn complete(&mut self, ticket: &SearchTicket, result: Result<Vec<Track>>) -> bool {
        if ticket.generation != self.generation {
            debug!(
                generation = ticket.generation,
                latest = self.generation,
                query = %ticket.query,
                "Discarding superseded search result"
            );
            return false;
        }

        match result {
            Ok(tracks) => {
                info!(query = %ticket.query, count = tracks.len(), "Search completed");
                self.state.tracks = tracks;
                self.state.phase = SearchPhase::Success;
            }
            Err(e) => {
                warn!(query = %ticket.query, error = %e, "Search failed");
                self.state.tracks.clear();
                self.state.phase = SearchPhase::Error(FETCH_FAILED_MESSAGE.to_string());
            }
        }

        true
    }

    /// Waits for the next settled input or finished request and applies it.
    pub async fn next_event(&mut self) -> SearchEvent {
        loop {
            tokio::select! {
                value = self.debouncer.settled() => {
                    if let Some(ticket) = self.settle(value) {
                        return SearchEvent::Started(ticket);
                    }
                }
                Some((ticket, result)) = self.completions_rx.recv() => {
                    return if self.complete(&ticket, result) {
                        SearchEvent::Applied(ticket)
                    } else {
                        SearchEvent::Discarded(ticket)
                    };
                }
            }
        }
    }
}
