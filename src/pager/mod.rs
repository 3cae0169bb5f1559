//! Page accumulation for the infinite feed.
//!
//! [`PageAccumulator`] owns the append-only item list and the next-page
//! cursor. Fetching is split in two halves so the network call can run on a
//! background lane:
//!
//! 1. [`PageAccumulator::begin_advance`] checks the in-flight guard and hands
//!    out a [`PageTicket`] for the current cursor.
//! 2. [`PageAccumulator::finish_advance`] merges the outcome for that ticket.
//!
//! Only one ticket is outstanding at a time, so pages are merged in cursor
//! order regardless of how the transport behaves.
//!
//! # Example
//!
//! ```
//! use photofeed::feed::{Item, MemoryFeed};
//! use photofeed::pager::PageAccumulator;
//!
//! let feed = MemoryFeed::new().with_page(1, vec![Item::new("1", "Cat nap", "/t/1.jpg")]);
//! let mut pager = PageAccumulator::new();
//! let appended = pager.advance_page(&feed);
//! assert_eq!(appended.len(), 1);
//! assert_eq!(pager.cursor(), 2);
//! ```

use std::collections::HashSet;

use crate::feed::{FeedError, FeedSource, Item};

/// Claim on a single page fetch.
///
/// The generation changes on [`PageAccumulator::reset`], so responses for
/// fetches issued before a reload are recognised and dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PageTicket {
    generation: u64,
    page: u32,
}

impl PageTicket {
    /// The 1-based page number this ticket fetches.
    pub const fn page(self) -> u32 {
        self.page
    }
}

/// Append-only list of feed items plus the pagination cursor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageAccumulator {
    items: Vec<Item>,
    seen: HashSet<String>,
    cursor: u32,
    generation: u64,
    in_flight: Option<PageTicket>,
    exhausted: bool,
}

impl Default for PageAccumulator {
    fn default() -> Self {
        Self::new()
    }
}

impl PageAccumulator {
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            seen: HashSet::new(),
            cursor: 1,
            generation: 0,
            in_flight: None,
            exhausted: false,
        }
    }

    /// Items in page-arrival order.
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Next page to fetch.
    pub const fn cursor(&self) -> u32 {
        self.cursor
    }

    /// Page currently being fetched, if any.
    pub fn loading_page(&self) -> Option<u32> {
        self.in_flight.map(PageTicket::page)
    }

    pub const fn is_loading(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Whether `ticket` is the fetch currently in flight.
    pub fn is_current(&self, ticket: PageTicket) -> bool {
        self.in_flight == Some(ticket)
    }

    /// True once the feed returned an empty page.
    pub const fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// Claim the fetch for the current cursor.
    ///
    /// Returns `None` while another fetch is in flight or after end of feed.
    pub fn begin_advance(&mut self) -> Option<PageTicket> {
        if self.exhausted {
            tracing::trace!(cursor = self.cursor, "feed exhausted, not fetching");
            return None;
        }
        if let Some(ticket) = self.in_flight {
            tracing::trace!(page = ticket.page, "page fetch already in flight");
            return None;
        }
        let ticket = PageTicket {
            generation: self.generation,
            page: self.cursor,
        };
        self.in_flight = Some(ticket);
        tracing::debug!(page = ticket.page, "page fetch issued");
        Some(ticket)
    }

    /// Merge the outcome of the fetch for `ticket`.
    ///
    /// Returns the items actually appended. Failures are logged and leave the
    /// cursor and list untouched; a ticket that is not the one in flight is
    /// ignored.
    pub fn finish_advance(
        &mut self,
        ticket: PageTicket,
        outcome: Result<Vec<Item>, FeedError>,
    ) -> Vec<Item> {
        if !self.is_current(ticket) {
            tracing::debug!(
                page = ticket.page,
                generation = ticket.generation,
                current_generation = self.generation,
                "dropping stale page response"
            );
            return Vec::new();
        }
        self.in_flight = None;

        let page_items = match outcome {
            Ok(items) => items,
            Err(err) => {
                tracing::warn!(page = ticket.page, error = %err, "page fetch failed");
                return Vec::new();
            }
        };

        self.cursor += 1;
        if page_items.is_empty() {
            self.exhausted = true;
            tracing::info!(page = ticket.page, "end of feed");
            return Vec::new();
        }

        let received = page_items.len();
        let appended: Vec<Item> = page_items
            .into_iter()
            .filter(|item| self.seen.insert(item.id.clone()))
            .collect();
        if appended.len() < received {
            tracing::debug!(
                page = ticket.page,
                duplicates = received - appended.len(),
                "suppressed duplicate items"
            );
        }
        self.items.extend(appended.iter().cloned());
        tracing::debug!(
            page = ticket.page,
            appended = appended.len(),
            total = self.items.len(),
            "page merged"
        );
        appended
    }

    /// Fetch the next page synchronously from `source`.
    ///
    /// Returns the appended items; empty when a fetch is already in flight,
    /// the feed is exhausted, or the fetch failed.
    pub fn advance_page(&mut self, source: &dyn FeedSource) -> Vec<Item> {
        let Some(ticket) = self.begin_advance() else {
            return Vec::new();
        };
        let outcome = source.fetch_page(ticket.page);
        self.finish_advance(ticket, outcome)
    }

    /// Drop everything and start again from page 1.
    ///
    /// A fetch still in flight becomes stale.
    pub fn reset(&mut self) {
        self.items.clear();
        self.seen.clear();
        self.cursor = 1;
        self.generation += 1;
        self.in_flight = None;
        self.exhausted = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::MemoryFeed;

    fn page(ids: std::ops::Range<u32>) -> Vec<Item> {
        ids.map(|i| Item::new(i.to_string(), format!("Photo {i}"), format!("/t/{i}.jpg")))
            .collect()
    }

    fn server_error() -> FeedError {
        FeedError::Status {
            status: 500,
            url: "/app-api/v1/photo-gallery-feed-page/page/1".to_string(),
        }
    }

    #[test]
    fn test_fresh_load_appends_first_page_and_advances_cursor() {
        let feed = MemoryFeed::new().with_page(1, page(0..10));
        let mut pager = PageAccumulator::new();

        let appended = pager.advance_page(&feed);

        assert_eq!(appended.len(), 10);
        assert_eq!(pager.len(), 10);
        assert_eq!(pager.cursor(), 2);
        assert!(!pager.is_loading());
    }

    #[test]
    fn test_second_begin_while_in_flight_is_refused() {
        let feed = MemoryFeed::new().with_page(1, page(0..10));
        let mut pager = PageAccumulator::new();
        pager.advance_page(&feed);

        let ticket = pager.begin_advance().unwrap();
        assert_eq!(ticket.page(), 2);
        assert_eq!(pager.begin_advance(), None);
        assert_eq!(pager.loading_page(), Some(2));
        assert_eq!(pager.cursor(), 2, "cursor must not move while pending");

        pager.finish_advance(ticket, Ok(page(10..15)));
        assert_eq!(pager.cursor(), 3);
        assert!(pager.begin_advance().is_some());
    }

    #[test]
    fn test_server_error_leaves_list_and_cursor_unchanged() {
        let feed = MemoryFeed::new().with_failure(1, server_error());
        let mut pager = PageAccumulator::new();

        let appended = pager.advance_page(&feed);

        assert!(appended.is_empty());
        assert!(pager.is_empty());
        assert_eq!(pager.cursor(), 1);
        assert!(!pager.is_loading(), "failure must release the in-flight guard");
    }

    #[test]
    fn test_failed_page_is_retried_on_next_advance() {
        let feed = MemoryFeed::new().with_failure(1, server_error());
        let mut pager = PageAccumulator::new();
        pager.advance_page(&feed);

        feed.set_page(1, Ok(page(0..3)));
        pager.advance_page(&feed);

        assert_eq!(feed.requested_pages(), vec![1, 1]);
        assert_eq!(pager.len(), 3);
        assert_eq!(pager.cursor(), 2);
    }

    #[test]
    fn test_duplicate_ids_across_pages_are_suppressed() {
        let feed = MemoryFeed::new()
            .with_page(1, page(0..5))
            .with_page(2, page(3..8));
        let mut pager = PageAccumulator::new();

        pager.advance_page(&feed);
        let appended = pager.advance_page(&feed);

        let ids: Vec<_> = appended.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["5", "6", "7"]);
        assert_eq!(pager.len(), 8);
        assert_eq!(pager.cursor(), 3);
    }

    #[test]
    fn test_empty_page_marks_feed_exhausted() {
        let feed = MemoryFeed::new().with_page(1, page(0..2));
        let mut pager = PageAccumulator::new();
        pager.advance_page(&feed);
        pager.advance_page(&feed);

        assert!(pager.is_exhausted());
        assert_eq!(pager.begin_advance(), None);
        pager.advance_page(&feed);
        assert_eq!(feed.requested_pages(), vec![1, 2]);
    }

    #[test]
    fn test_reset_makes_in_flight_response_stale() {
        let mut pager = PageAccumulator::new();
        let old = pager.begin_advance().unwrap();
        pager.reset();

        let appended = pager.finish_advance(old, Ok(page(0..4)));
        assert!(appended.is_empty());
        assert!(pager.is_empty());

        let fresh = pager.begin_advance().unwrap();
        assert_eq!(fresh.page(), 1);
        assert_ne!(fresh, old);
    }

    #[test]
    fn test_unknown_ticket_does_not_release_guard() {
        let mut pager = PageAccumulator::new();
        let stale = pager.begin_advance().unwrap();
        pager.reset();
        let current = pager.begin_advance().unwrap();

        pager.finish_advance(stale, Ok(page(0..1)));
        assert!(pager.is_loading());
        pager.finish_advance(current, Ok(page(0..1)));
        assert!(!pager.is_loading());
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn distinct_pages_accumulate_exactly(sizes in proptest::collection::vec(1..20u32, 1..12)) {
                let mut feed = MemoryFeed::new();
                let mut next_id = 0;
                for (idx, size) in sizes.iter().enumerate() {
                    let page_no = u32::try_from(idx).unwrap() + 1;
                    feed = feed.with_page(page_no, page(next_id..next_id + size));
                    next_id += size;
                }
                let mut pager = PageAccumulator::new();
                for (idx, _) in sizes.iter().enumerate() {
                    pager.advance_page(&feed);
                    prop_assert_eq!(pager.cursor(), u32::try_from(idx).unwrap() + 2);
                }

                let expected: u32 = sizes.iter().sum();
                prop_assert_eq!(pager.len(), expected as usize);
                let unique: HashSet<_> = pager.items().iter().map(|i| &i.id).collect();
                prop_assert_eq!(unique.len(), pager.len());
            }

            #[test]
            fn overlapping_pages_never_duplicate(
                ranges in proptest::collection::vec((0..50u32, 1..15u32), 1..10)
            ) {
                let mut feed = MemoryFeed::new();
                for (idx, (start, len)) in ranges.iter().enumerate() {
                    let page_no = u32::try_from(idx).unwrap() + 1;
                    feed = feed.with_page(page_no, page(*start..start + len));
                }
                let mut pager = PageAccumulator::new();
                for _ in &ranges {
                    pager.advance_page(&feed);
                }
                let unique: HashSet<_> = pager.items().iter().map(|i| &i.id).collect();
                prop_assert_eq!(unique.len(), pager.len());
            }
        }
    }
}
