use super::*;
use crate::app::{Command, Message, Model, update};
use crate::config::Settings;
use crate::feed::{FeedError, Item};
use image::{DynamicImage, RgbImage};
use ratatui::Terminal;
use ratatui::backend::TestBackend;
use ratatui::layout::Rect;
use ratatui_image::picker::Picker;

fn create_test_terminal() -> Terminal<TestBackend> {
    let backend = TestBackend::new(80, 27);
    Terminal::new(backend).unwrap()
}

fn started_model() -> Model {
    let mut model = Model::new((80, 27), &Settings::default());
    model.base_url = "http://photos.test".to_string();
    model.start();
    model
}

fn with_first_page(mut model: Model, items: Vec<Item>) -> Model {
    let ticket = model
        .take_commands()
        .into_iter()
        .find_map(|command| match command {
            Command::FetchPage(ticket) => Some(ticket),
            _ => None,
        })
        .unwrap();
    let mut model = update(model, Message::PageLoaded(ticket, Ok(items)));
    model.take_commands();
    model
}

fn photos(titles: &[&str]) -> Vec<Item> {
    titles
        .iter()
        .enumerate()
        .map(|(i, title)| Item::new(i.to_string(), *title, format!("/t/{i}.jpg")))
        .collect()
}

fn screen_text(model: &mut Model) -> String {
    let mut terminal = create_test_terminal();
    terminal.draw(|frame| render(model, frame)).unwrap();
    let buffer = terminal.backend().buffer();
    let width = buffer.area.width as usize;
    buffer
        .content()
        .chunks(width)
        .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
        .collect::<Vec<_>>()
        .join("\n")
}

#[test]
fn test_split_screen_reserves_chrome_rows() {
    let [search, strip, grid, status] = split_screen(Rect::new(0, 0, 80, 27));
    assert_eq!(search, Rect::new(0, 0, 80, 1));
    assert_eq!(strip, Rect::new(0, 1, 80, 1));
    assert_eq!(grid.height, 27 - CHROME_ROWS);
    assert_eq!(status, Rect::new(0, 26, 80, 1));
}

#[test]
fn test_first_load_shows_loading_state() {
    let mut model = started_model();
    let text = screen_text(&mut model);
    assert!(text.contains("Loading photos…"));
    assert!(text.contains("Loading page 1…"));
    assert!(text.contains("http://photos.test"));
}

#[test]
fn test_cards_show_titles_and_status_counts() {
    let mut model = with_first_page(started_model(), photos(&["Cat nap", "Dog walk", "Bird"]));
    let text = screen_text(&mut model);

    assert!(text.contains("Cat nap"));
    assert!(text.contains("Dog walk"));
    assert!(text.contains("Bird"));
    assert!(text.contains("3/3 photos"));
    assert!(text.contains("search: idle"));
}

#[test]
fn test_long_titles_are_truncated_inside_card() {
    let long = "An extraordinarily long photo title that never ends";
    let mut model = with_first_page(started_model(), photos(&[long]));
    let text = screen_text(&mut model);

    assert!(!text.contains(long));
    assert!(text.contains("An extraordinarily"));
    assert!(text.contains('…'));
}

#[test]
fn test_search_filters_cards_and_shows_query() {
    let model = with_first_page(started_model(), photos(&["Cat nap", "Dog walk", "cat toy"]));
    let model = update(model, Message::StartSearch);
    let mut model = update(model, Message::SearchInput("cat".to_string()));
    let text = screen_text(&mut model);

    assert!(text.contains("/cat"));
    assert!(text.contains("Searching for \"cat\"…"));
    assert!(text.contains("Cat nap"));
    assert!(text.contains("cat toy"));
    assert!(!text.contains("Dog walk"));
    assert!(text.contains("2/3 photos"));
}

#[test]
fn test_no_match_shows_empty_state() {
    let model = with_first_page(started_model(), photos(&["Cat nap"]));
    let mut model = update(model, Message::SearchInput("zebra".to_string()));
    let text = screen_text(&mut model);
    assert!(text.contains("No photos match \"zebra\""));
}

#[test]
fn test_settled_suggestions_render_in_strip() {
    let model = with_first_page(started_model(), photos(&["Cat nap"]));
    let mut model = update(model, Message::SearchInput("nap".to_string()));
    let request = model
        .take_commands()
        .into_iter()
        .find_map(|command| match command {
            Command::FetchSuggestions(request) => Some(request),
            _ => None,
        })
        .unwrap();
    let mut model = update(
        model,
        Message::SuggestionsLoaded(request.ticket, Ok(photos(&["Sunday nap", "Beach"]))),
    );
    let text = screen_text(&mut model);

    assert!(text.contains("Suggestions:"));
    assert!(text.contains("Sunday nap"));
    assert!(!text.contains("Beach"));
}

#[test]
fn test_strip_is_blank_when_query_cleared_before_settle() {
    let model = with_first_page(started_model(), photos(&["Cat nap"]));
    let mut model = update(model, Message::SearchInput("nap".to_string()));
    let request = model
        .take_commands()
        .into_iter()
        .find_map(|command| match command {
            Command::FetchSuggestions(request) => Some(request),
            _ => None,
        })
        .unwrap();
    let model = update(model, Message::ClearSearch);
    let mut model = update(
        model,
        Message::SuggestionsLoaded(request.ticket, Ok(photos(&["Sunday nap"]))),
    );
    let text = screen_text(&mut model);

    assert!(!text.contains("Suggestions:"));
    assert!(!text.contains("Sunday nap"));
    assert!(!text.contains("No suggestions"));
    assert!(text.contains("Cat nap"));
}

#[test]
fn test_failed_page_shows_error_toast() {
    let mut model = started_model();
    let ticket = model
        .take_commands()
        .into_iter()
        .find_map(|command| match command {
            Command::FetchPage(ticket) => Some(ticket),
            _ => None,
        })
        .unwrap();
    let mut model = update(
        model,
        Message::PageLoaded(
            ticket,
            Err(FeedError::Status {
                status: 500,
                url: "/page/1".to_string(),
            }),
        ),
    );
    let text = screen_text(&mut model);

    assert!(text.contains("[error]"));
    assert!(text.contains("Press r to retry"));
}

#[test]
fn test_help_overlay_lists_keys() {
    let mut model = update(started_model(), Message::ToggleHelp);
    let text = screen_text(&mut model);
    assert!(text.contains("Navigation"));
    assert!(text.contains("Reload from page 1"));
}

#[test]
fn test_halfblock_thumbnail_renders_when_scrolled_mid_card() {
    let titles: Vec<String> = (0..30).map(|i| format!("Photo {i}")).collect();
    let refs: Vec<&str> = titles.iter().map(String::as_str).collect();
    let model = with_first_page(started_model(), photos(&refs));
    let mut model = model.with_picker(Some(Picker::halfblocks()));
    model.load_nearby_thumbnails();
    model.take_commands();
    model.install_thumbnail("0", Ok(DynamicImage::ImageRgb8(RgbImage::new(40, 30))));
    model.install_thumbnail("4", Err(FeedError::Image("bad".into())));

    // Offset 3 cuts the first card row in half.
    let mut model = update(model, Message::ScrollDown(3));
    let text = screen_text(&mut model);

    assert!(text.contains("Photo 0"));
    assert!(text.contains("no image"));
    assert!(text.contains("loading…"));
}
