use std::sync::Arc;

use image::DynamicImage;

use crate::app::{Command, Message};
use crate::feed::{FeedError, FeedSource, Item};
use crate::image::decode_thumbnail;
use crate::lanes::FetchLane;
use crate::pager::PageTicket;
use crate::search::{SuggestionRequest, SuggestionTicket};

type Fetched = Result<Vec<Item>, FeedError>;

/// A thumbnail fetch that finished (or could not be started).
#[derive(Debug)]
pub struct ThumbnailOutcome {
    pub id: String,
    pub result: Result<DynamicImage, FeedError>,
}

/// Background workers for every kind of fetch.
///
/// Pages, suggestions and thumbnails run on separate lanes so a slow
/// thumbnail never holds up the next page.
pub struct Lanes {
    pages: FetchLane<PageTicket, (PageTicket, Fetched)>,
    suggestions: FetchLane<SuggestionRequest, (SuggestionTicket, Fetched)>,
    thumbnails: FetchLane<(String, String), ThumbnailOutcome>,
    rejected: Vec<ThumbnailOutcome>,
}

impl Lanes {
    /// Start the workers. Suggestions are served from feed page
    /// `suggestions_page`.
    pub fn spawn(source: Arc<dyn FeedSource>, suggestions_page: u32) -> Self {
        let page_source = Arc::clone(&source);
        let pages = FetchLane::spawn("pages", move |ticket: PageTicket| {
            (ticket, page_source.fetch_page(ticket.page()))
        });

        let suggestion_source = Arc::clone(&source);
        let suggestions = FetchLane::spawn("suggestions", move |request: SuggestionRequest| {
            tracing::debug!(
                query = %request.query,
                page = suggestions_page,
                "fetching suggestions"
            );
            (
                request.ticket,
                suggestion_source.fetch_page(suggestions_page),
            )
        });

        let thumbnails = FetchLane::spawn("thumbnails", move |(id, url): (String, String)| {
            let result = source
                .fetch_bytes(&url)
                .and_then(|bytes| decode_thumbnail(&bytes));
            ThumbnailOutcome { id, result }
        });

        Self {
            pages,
            suggestions,
            thumbnails,
            rejected: Vec::new(),
        }
    }

    /// Hand commands to their lanes.
    ///
    /// Returns failure messages for requests whose lane is down, so the
    /// state machines still see every request settle.
    pub fn dispatch(&mut self, commands: Vec<Command>) -> Vec<Message> {
        let mut settled = Vec::new();
        for command in commands {
            match command {
                Command::FetchPage(ticket) => {
                    if !self.pages.submit(ticket) {
                        settled.push(Message::PageLoaded(ticket, Err(lane_down("pages"))));
                    }
                }
                Command::FetchSuggestions(request) => {
                    let ticket = request.ticket;
                    if !self.suggestions.submit(request) {
                        settled.push(Message::SuggestionsLoaded(
                            ticket,
                            Err(lane_down("suggestions")),
                        ));
                    }
                }
                Command::FetchThumbnail { id, url } => {
                    if !self.thumbnails.submit((id.clone(), url)) {
                        self.rejected.push(ThumbnailOutcome {
                            id,
                            result: Err(lane_down("thumbnails")),
                        });
                    }
                }
            }
        }
        settled
    }

    /// Page and suggestion results that are ready.
    pub fn drain(&self) -> Vec<Message> {
        let mut ready = Vec::new();
        while let Some((ticket, outcome)) = self.pages.try_recv() {
            ready.push(Message::PageLoaded(ticket, outcome));
        }
        while let Some((ticket, outcome)) = self.suggestions.try_recv() {
            ready.push(Message::SuggestionsLoaded(ticket, outcome));
        }
        ready
    }

    /// Thumbnail results that are ready.
    pub fn drain_thumbnails(&mut self) -> Vec<ThumbnailOutcome> {
        let mut ready = std::mem::take(&mut self.rejected);
        while let Some(outcome) = self.thumbnails.try_recv() {
            ready.push(outcome);
        }
        ready
    }
}

fn lane_down(lane: &str) -> FeedError {
    FeedError::Network(format!("{lane} worker unavailable"))
}
