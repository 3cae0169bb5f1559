//! Incremental search state machine.
//!
//! [`SearchCoordinator`] owns the query and decides when a suggestions fetch
//! goes out. It never performs I/O: transitions that need a fetch return a
//! [`SuggestionRequest`] for the caller to run, and the result comes back
//! through [`SearchCoordinator::on_fetch_settled`].
//!
//! ```text
//!            query != ""                 settle
//!   Idle ───────────────▶ Searching ───────────────▶ DisplayingSuggestions
//!    ▲  ╲                    ▲                           │   │
//!    │   ╲ (debounce)        │ delay elapsed / submit    │   │ query != ""
//!    │    ▶ Debouncing ──────┘◀──────────────────────────┘◀──┘
//!    │          │ query == ""                 │ query == ""
//!    └──────────┴─────────────────────────────┘
//! ```
//!
//! At most one suggestions fetch is in flight. The displayed card list is not
//! stored here; it is derived from [`SearchCoordinator::query`] with
//! [`crate::view::project`].

use crate::debounce::Debouncer;
use crate::feed::{FeedError, Item};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchState {
    #[default]
    Idle,
    Debouncing,
    Searching,
    DisplayingSuggestions,
}

impl SearchState {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Debouncing => "typing",
            Self::Searching => "searching",
            Self::DisplayingSuggestions => "suggestions",
        }
    }
}

/// Identifies one suggestions fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SuggestionTicket(u64);

/// A suggestions fetch the caller must run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuggestionRequest {
    pub ticket: SuggestionTicket,
    /// Query the fetch is issued for
    pub query: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchCoordinator {
    state: SearchState,
    query: String,
    suggestions: Vec<Item>,
    suggestions_query: String,
    in_flight: Option<SuggestionRequest>,
    next_ticket: u64,
    debounce: Debouncer<()>,
}

impl Default for SearchCoordinator {
    fn default() -> Self {
        Self::new(0)
    }
}

impl SearchCoordinator {
    /// Create an idle coordinator. A `debounce_ms` of zero goes straight
    /// from a query change to `Searching`.
    pub const fn new(debounce_ms: u64) -> Self {
        Self {
            state: SearchState::Idle,
            query: String::new(),
            suggestions: Vec::new(),
            suggestions_query: String::new(),
            in_flight: None,
            next_ticket: 0,
            debounce: Debouncer::new(debounce_ms),
        }
    }

    pub const fn state(&self) -> SearchState {
        self.state
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn is_active(&self) -> bool {
        !self.query.is_empty()
    }

    /// Whether the loading indicator should show.
    pub fn is_loading(&self) -> bool {
        self.state == SearchState::Searching
    }

    pub fn is_debouncing(&self) -> bool {
        self.state == SearchState::Debouncing
    }

    /// Whether `ticket` is the suggestions fetch in flight.
    pub fn is_awaiting(&self, ticket: SuggestionTicket) -> bool {
        self.in_flight.as_ref().is_some_and(|req| req.ticket == ticket)
    }

    /// Last settled suggestions and the query they were fetched for.
    pub fn suggestions(&self) -> (&[Item], &str) {
        (&self.suggestions, &self.suggestions_query)
    }

    /// The user edited the query.
    pub fn on_query_changed(
        &mut self,
        query: impl Into<String>,
        now_ms: u64,
    ) -> Option<SuggestionRequest> {
        let query = query.into();
        let from = self.state;
        self.query = query;

        let request = match self.state {
            // One fetch per lane; the settle handler catches up with the query.
            SearchState::Searching => None,
            SearchState::Idle | SearchState::DisplayingSuggestions | SearchState::Debouncing => {
                if self.query.is_empty() {
                    self.debounce.cancel();
                    self.state = SearchState::Idle;
                    None
                } else if self.debounce.delay_ms() > 0 {
                    self.debounce.queue((), now_ms);
                    self.state = SearchState::Debouncing;
                    None
                } else {
                    Some(self.enter_searching())
                }
            }
        };
        self.log_transition("query_changed", from);
        request
    }

    /// The user pressed Enter in the search box.
    pub fn on_submit(&mut self) -> Option<SuggestionRequest> {
        if self.state != SearchState::DisplayingSuggestions {
            return None;
        }
        let from = self.state;
        let request = self.enter_searching();
        self.log_transition("submit", from);
        Some(request)
    }

    /// Advance the debounce timer.
    pub fn on_tick(&mut self, now_ms: u64) -> Option<SuggestionRequest> {
        if self.state != SearchState::Debouncing {
            return None;
        }
        self.debounce.take_ready(now_ms)?;
        let from = self.state;
        let request = self.enter_searching();
        self.log_transition("debounce_elapsed", from);
        Some(request)
    }

    /// A suggestions fetch settled.
    ///
    /// Always leaves `Searching`. If the query moved on while the fetch was
    /// in flight, a follow-up fetch for the current query is returned.
    pub fn on_fetch_settled(
        &mut self,
        ticket: SuggestionTicket,
        outcome: Result<Vec<Item>, FeedError>,
    ) -> Option<SuggestionRequest> {
        let Some(issued) = self.in_flight.take_if(|req| req.ticket == ticket) else {
            tracing::debug!(ticket = ticket.0, "dropping unknown suggestions response");
            return None;
        };
        let from = self.state;

        match outcome {
            Ok(items) => {
                tracing::debug!(query = %issued.query, count = items.len(), "suggestions resolved");
                self.suggestions = items;
            }
            Err(err) => {
                tracing::warn!(query = %issued.query, error = %err, "suggestions fetch failed");
                self.suggestions.clear();
            }
        }
        self.suggestions_query = issued.query;
        self.state = SearchState::DisplayingSuggestions;
        self.log_transition("fetch_settled", from);

        if !self.query.is_empty() && self.query != self.suggestions_query {
            let request = self.enter_searching();
            self.log_transition("requery", SearchState::DisplayingSuggestions);
            return Some(request);
        }
        None
    }

    fn enter_searching(&mut self) -> SuggestionRequest {
        self.debounce.cancel();
        let request = SuggestionRequest {
            ticket: SuggestionTicket(self.next_ticket),
            query: self.query.clone(),
        };
        self.next_ticket += 1;
        self.in_flight = Some(request.clone());
        self.state = SearchState::Searching;
        request
    }

    fn log_transition(&self, event: &'static str, from: SearchState) {
        if from != self.state {
            tracing::debug!(
                event,
                from = from.label(),
                to = self.state.label(),
                query = %self.query,
                "search transition"
            );
        }
    }
}
