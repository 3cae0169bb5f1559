use std::collections::HashMap;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use image::DynamicImage;
use ratatui_image::picker::Picker;
use ratatui_image::protocol::StatefulProtocol;

use crate::config::Settings;
use crate::feed::{FeedError, Item};
use crate::image::{ThumbnailCache, fit_to_cells};
use crate::pager::{PageAccumulator, PageTicket};
use crate::scroll::{ScrollSentinel, SentinelEvent};
use crate::search::{SearchCoordinator, SuggestionRequest};
use crate::ui::CHROME_ROWS;
use crate::ui::grid::{self, THUMB_COLS, THUMB_ROWS};
use crate::ui::viewport::Viewport;
use crate::view::{project, projected_len};

const THUMBNAIL_CACHE_SIZE: usize = 256;
const TOAST_DURATION: Duration = Duration::from_secs(4);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone)]
struct Toast {
    level: ToastLevel,
    message: String,
    expires_at: Instant,
}

/// Load state of one card's thumbnail.
pub enum ThumbnailSlot {
    /// Fetch issued, bytes not back yet
    Pending,
    Ready(Box<StatefulProtocol>),
    /// Fetch or decode failed; not retried until reload
    Failed,
}

impl std::fmt::Debug for ThumbnailSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => f.write_str("Pending"),
            Self::Ready(_) => f.write_str("Ready(..)"),
            Self::Failed => f.write_str("Failed"),
        }
    }
}

/// Side effects requested by [`super::update`], run by the event loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    FetchPage(PageTicket),
    FetchSuggestions(SuggestionRequest),
    FetchThumbnail { id: String, url: String },
}

/// Everything the browser knows: loaded pages, search, scroll window,
/// thumbnails and the commands waiting for the lanes.
pub struct Model {
    /// Visible window over the card grid
    pub viewport: Viewport,
    /// Accumulated feed pages
    pub feed: PageAccumulator,
    /// Query and suggestions state machine
    pub search: SearchCoordinator,
    pub sentinel: ScrollSentinel,
    /// Keystrokes go to the query
    pub search_focused: bool,
    pub help_visible: bool,
    pub should_quit: bool,
    pub images_enabled: bool,
    /// `None` when thumbnails are off
    pub picker: Option<Picker>,
    /// Per-card thumbnail state, keyed by item id
    pub thumbnails: HashMap<String, ThumbnailSlot>,
    /// Scaled thumbnails kept after their protocol is dropped
    pub thumbnail_cache: ThumbnailCache,
    /// Shown in the search bar
    pub base_url: String,
    /// Listed in the help popup
    pub config_global_path: Option<PathBuf>,
    pub config_local_path: Option<PathBuf>,
    toast: Option<Toast>,
    commands: Vec<Command>,
    now_ms: u64,
}

impl std::fmt::Debug for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Model")
            .field("viewport", &self.viewport)
            .field("items", &self.feed.len())
            .field("cursor", &self.feed.cursor())
            .field("search", &self.search.state())
            .field("thumbnails", &self.thumbnails.len())
            .finish_non_exhaustive()
    }
}

impl Model {
    /// Create a model for a terminal of `terminal_size` (columns, rows).
    pub fn new(terminal_size: (u16, u16), settings: &Settings) -> Self {
        Self {
            viewport: Viewport::new(
                terminal_size.0,
                terminal_size.1.saturating_sub(CHROME_ROWS),
                0,
            ),
            search: SearchCoordinator::new(settings.search_debounce_ms),
            sentinel: ScrollSentinel::new(settings.threshold),
            images_enabled: settings.images_enabled,
            base_url: settings.base_url.clone(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_picker(mut self, picker: Option<Picker>) -> Self {
        self.picker = picker;
        self
    }

    /// Attach the sentinel and take the first sample, which requests page 1.
    pub fn start(&mut self) {
        self.sentinel.attach();
        self.sync_layout();
        self.observe_scroll();
    }

    pub fn stop(&mut self) {
        self.sentinel.detach();
    }

    /// Drain the side effects queued since the last call.
    pub fn take_commands(&mut self) -> Vec<Command> {
        std::mem::take(&mut self.commands)
    }

    pub(super) fn push_command(&mut self, command: Command) {
        self.commands.push(command);
    }

    pub const fn now_ms(&self) -> u64 {
        self.now_ms
    }

    pub(super) const fn set_now_ms(&mut self, now_ms: u64) {
        self.now_ms = now_ms;
    }

    /// Recompute the grid height from the projected list.
    pub fn sync_layout(&mut self) {
        let shown = projected_len(self.feed.items(), self.search.query());
        self.viewport
            .set_total_rows(grid::content_height(shown, self.viewport.width()));
    }

    /// Sample the scroll position and request the next page when near the
    /// bottom.
    pub fn observe_scroll(&mut self) {
        if self.sentinel.observe(self.viewport.geometry()) == Some(SentinelEvent::Advance) {
            self.request_next_page();
        }
    }

    /// A scroll that could not move because the viewport is already at the
    /// bottom re-arms the sentinel, so a failed page is retried.
    pub(super) fn rearm_if_at_bottom(&mut self) {
        if !self.viewport.can_scroll_down() {
            self.sentinel.rearm();
        }
    }

    fn request_next_page(&mut self) {
        if let Some(ticket) = self.feed.begin_advance() {
            self.commands.push(Command::FetchPage(ticket));
        }
    }

    /// Drop all pages and thumbnails and start again from page 1.
    pub(super) fn reload(&mut self) {
        self.feed.reset();
        self.thumbnails.clear();
        self.thumbnail_cache.clear();
        self.viewport.go_to_top();
        self.sentinel.rearm();
        tracing::info!("feed reloaded");
    }

    /// Whether background work is outstanding (drives the poll interval).
    pub fn is_busy(&self) -> bool {
        self.feed.is_loading()
            || self.search.is_loading()
            || self.search.is_debouncing()
            || self
                .thumbnails
                .values()
                .any(|slot| matches!(slot, ThumbnailSlot::Pending))
    }

    /// Request thumbnails for cards within two screens of the viewport and
    /// drop protocols for cards far outside it.
    pub fn load_nearby_thumbnails(&mut self) {
        if !self.images_enabled {
            return;
        }
        let Some(picker) = &self.picker else { return };

        let height = usize::from(self.viewport.height());
        let lookahead = height * 2;
        let start = self.viewport.offset().saturating_sub(lookahead);
        let end = self.viewport.offset() + height + lookahead;
        let range = grid::cards_in_rows(start..end, self.viewport.width());

        let items = project(self.feed.items(), self.search.query());
        let nearby: &[&Item] = &items[range.start.min(items.len())..range.end.min(items.len())];

        for item in nearby {
            if self.thumbnails.contains_key(&item.id) {
                continue;
            }
            if let Some(image) = self.thumbnail_cache.get(&item.id) {
                let protocol = picker.new_resize_protocol(image.clone());
                self.thumbnails
                    .insert(item.id.clone(), ThumbnailSlot::Ready(Box::new(protocol)));
                continue;
            }
            self.thumbnails
                .insert(item.id.clone(), ThumbnailSlot::Pending);
            self.commands.push(Command::FetchThumbnail {
                id: item.id.clone(),
                url: item.thumbnail_url.clone(),
            });
        }

        let keep: std::collections::HashSet<&str> =
            nearby.iter().map(|item| item.id.as_str()).collect();
        let before = self.thumbnails.len();
        self.thumbnails.retain(|id, slot| {
            !matches!(slot, ThumbnailSlot::Ready(_)) || keep.contains(id.as_str())
        });
        if self.thumbnails.len() < before {
            tracing::trace!(
                dropped = before - self.thumbnails.len(),
                "released offscreen thumbnails"
            );
        }
    }

    /// Install a fetched thumbnail.
    ///
    /// Results for cards no longer pending (reload, released) are cached but
    /// not displayed.
    pub fn install_thumbnail(&mut self, id: &str, outcome: Result<DynamicImage, FeedError>) {
        let image = match outcome {
            Ok(image) => image,
            Err(err) => {
                tracing::warn!(id, error = %err, "thumbnail unavailable");
                if let Some(slot) = self.thumbnails.get_mut(id) {
                    *slot = ThumbnailSlot::Failed;
                }
                return;
            }
        };
        let Some(picker) = &self.picker else { return };

        let fitted = fit_to_cells(picker, &image, THUMB_COLS, THUMB_ROWS);
        if matches!(self.thumbnails.get(id), Some(ThumbnailSlot::Pending)) {
            let protocol = picker.new_resize_protocol(fitted.clone());
            self.thumbnails
                .insert(id.to_string(), ThumbnailSlot::Ready(Box::new(protocol)));
        }
        self.thumbnail_cache.insert(id.to_string(), fitted);
    }

    pub(super) fn show_toast(&mut self, level: ToastLevel, message: impl Into<String>) {
        self.toast = Some(Toast {
            level,
            message: message.into(),
            expires_at: Instant::now() + TOAST_DURATION,
        });
    }

    pub(super) fn expire_toast(&mut self, now: Instant) -> bool {
        if self
            .toast
            .as_ref()
            .is_some_and(|toast| toast.expires_at <= now)
        {
            self.toast = None;
            return true;
        }
        false
    }

    pub fn active_toast(&self) -> Option<(&str, ToastLevel)> {
        self.toast
            .as_ref()
            .map(|toast| (toast.message.as_str(), toast.level))
    }
}

// `update` takes the model by value via `std::mem::take`.
impl Default for Model {
    fn default() -> Self {
        Self {
            viewport: Viewport::new(80, 24 - CHROME_ROWS, 0),
            feed: PageAccumulator::new(),
            search: SearchCoordinator::default(),
            sentinel: ScrollSentinel::default(),
            search_focused: false,
            help_visible: false,
            should_quit: false,
            images_enabled: true,
            picker: None,
            thumbnails: HashMap::new(),
            thumbnail_cache: ThumbnailCache::new(THUMBNAIL_CACHE_SIZE),
            base_url: String::new(),
            config_global_path: None,
            config_local_path: None,
            toast: None,
            commands: Vec::new(),
            now_ms: 0,
        }
    }
}
