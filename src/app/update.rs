use crate::app::model::{Command, Model, ToastLevel};
use crate::feed::{FeedError, Item};
use crate::pager::PageTicket;
use crate::search::{SuggestionRequest, SuggestionTicket};
use crate::ui::CHROME_ROWS;

/// All possible events and actions in the application.
///
/// These represent user input, system events, and fetch results coming back
/// from the background lanes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    // Navigation
    /// Scroll up by n rows
    ScrollUp(usize),
    /// Scroll down by n rows
    ScrollDown(usize),
    PageUp,
    PageDown,
    HalfPageUp,
    HalfPageDown,
    GoToTop,
    GoToBottom,

    // Search
    /// Focus the query input
    StartSearch,
    /// Replace the query
    SearchInput(String),
    /// Refresh suggestions for the current query
    SubmitSearch,
    /// Empty the query and leave the input
    ClearSearch,

    // Fetch results
    PageLoaded(PageTicket, Result<Vec<Item>, FeedError>),
    SuggestionsLoaded(SuggestionTicket, Result<Vec<Item>, FeedError>),
    /// Milliseconds since startup; drives the search debounce
    Tick(u64),
    /// Drop everything and fetch page 1 again
    Reload,

    ToggleHelp,
    HideHelp,

    // Window
    /// Terminal resized
    Resize(u16, u16),
    /// Redraw screen
    Redraw,

    // Application
    /// Quit the application
    Quit,
}

/// Pure function that updates the model based on a message.
///
/// Side effects are queued on the model as [`Command`]s and run by the event
/// loop.
pub fn update(mut model: Model, msg: Message) -> Model {
    match msg {
        // Navigation
        Message::ScrollUp(n) => model.viewport.scroll_up(n),
        Message::ScrollDown(n) => {
            model.rearm_if_at_bottom();
            model.viewport.scroll_down(n);
        }
        Message::PageUp => model.viewport.page_up(),
        Message::PageDown => {
            model.rearm_if_at_bottom();
            model.viewport.page_down();
        }
        Message::HalfPageUp => model.viewport.half_page_up(),
        Message::HalfPageDown => {
            model.rearm_if_at_bottom();
            model.viewport.half_page_down();
        }
        Message::GoToTop => model.viewport.go_to_top(),
        Message::GoToBottom => {
            model.rearm_if_at_bottom();
            model.viewport.go_to_bottom();
        }

        // Search
        Message::StartSearch => {
            model.search_focused = true;
            model.help_visible = false;
        }
        Message::SearchInput(query) => {
            let now = model.now_ms();
            if let Some(request) = model.search.on_query_changed(query, now) {
                queue_suggestions(&mut model, request);
            }
            model.viewport.go_to_top();
        }
        Message::SubmitSearch => {
            model.search_focused = false;
            if let Some(request) = model.search.on_submit() {
                queue_suggestions(&mut model, request);
            }
        }
        Message::ClearSearch => {
            model.search_focused = false;
            let now = model.now_ms();
            if let Some(request) = model.search.on_query_changed(String::new(), now) {
                queue_suggestions(&mut model, request);
            }
            model.viewport.go_to_top();
        }

        // Fetch results
        Message::PageLoaded(ticket, outcome) => apply_page(&mut model, ticket, outcome),
        Message::SuggestionsLoaded(ticket, outcome) => {
            apply_suggestions(&mut model, ticket, outcome);
        }
        Message::Tick(now_ms) => {
            model.set_now_ms(now_ms);
            if let Some(request) = model.search.on_tick(now_ms) {
                queue_suggestions(&mut model, request);
            }
        }
        Message::Reload => {
            model.reload();
            model.show_toast(ToastLevel::Info, "Reloading feed");
        }

        Message::ToggleHelp => model.help_visible = !model.help_visible,
        Message::HideHelp => model.help_visible = false,

        // Window
        Message::Resize(width, height) => {
            model
                .viewport
                .resize(width, height.saturating_sub(CHROME_ROWS));
        }
        Message::Redraw => {}

        // Application
        Message::Quit => model.should_quit = true,
    }

    model.sync_layout();
    model.observe_scroll();
    model
}

fn queue_suggestions(model: &mut Model, request: SuggestionRequest) {
    model.push_command(Command::FetchSuggestions(request));
}

fn apply_page(model: &mut Model, ticket: PageTicket, outcome: Result<Vec<Item>, FeedError>) {
    let current = model.feed.is_current(ticket);
    let was_exhausted = model.feed.is_exhausted();
    let failure = outcome.as_ref().err().cloned();

    model.feed.finish_advance(ticket, outcome);
    if !current {
        return;
    }

    if let Some(err) = failure {
        model.show_toast(
            ToastLevel::Error,
            format!("Couldn't load page {}: {err}", ticket.page()),
        );
        return;
    }

    // A merged page may leave the grid height unchanged (partial row, all
    // duplicates), so the next observation must be free to fire.
    model.sentinel.rearm();
    if !was_exhausted && model.feed.is_exhausted() {
        model.show_toast(ToastLevel::Info, "End of feed");
    }
}

fn apply_suggestions(
    model: &mut Model,
    ticket: SuggestionTicket,
    outcome: Result<Vec<Item>, FeedError>,
) {
    let awaited = model.search.is_awaiting(ticket);
    let failure = outcome.as_ref().err().cloned();

    if let Some(request) = model.search.on_fetch_settled(ticket, outcome) {
        queue_suggestions(model, request);
    }

    if awaited && let Some(err) = failure {
        model.show_toast(
            ToastLevel::Warning,
            format!("Suggestions unavailable: {err}"),
        );
    }
}
