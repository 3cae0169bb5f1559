use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

use crate::app::{Model, ToastLevel};
use crate::search::SearchState;
use crate::view::{project, projected_len};

use super::grid::truncate_to_width;

pub fn render_search_bar(model: &Model, frame: &mut Frame, area: Rect) {
    let query = model.search.query();
    let (text, style) = if model.search_focused {
        (
            format!(" /{query}\u{258f}  Enter: suggestions  Esc: clear"),
            Style::default().bg(Color::Blue).fg(Color::White),
        )
    } else if model.search.is_active() {
        (
            format!(" filter: {query}  /: edit  Esc: clear"),
            Style::default().bg(Color::Blue).fg(Color::White),
        )
    } else {
        (
            format!(" photofeed  {}  /: search  ?: help", model.base_url),
            Style::default().bg(Color::DarkGray).fg(Color::White),
        )
    };
    frame.render_widget(Paragraph::new(text).style(style), area);
}

pub fn render_suggestions_strip(model: &Model, frame: &mut Frame, area: Rect) {
    let dim = Style::default().fg(Color::Indexed(245));
    let line = match model.search.state() {
        SearchState::Idle => Line::default(),
        SearchState::Debouncing => Line::styled(format!(" \"{}\"…", model.search.query()), dim),
        SearchState::Searching => {
            let query = model.search.query();
            let text = if query.is_empty() {
                " Searching…".to_string()
            } else {
                format!(" Searching for \"{query}\"…")
            };
            Line::styled(text, Style::default().fg(Color::Yellow))
        }
        // Cleared while the fetch was out: nothing left to suggest for.
        SearchState::DisplayingSuggestions if !model.search.is_active() => Line::default(),
        SearchState::DisplayingSuggestions => suggestions_line(model, usize::from(area.width)),
    };
    frame.render_widget(Paragraph::new(line), area);
}

fn suggestions_line(model: &Model, width: usize) -> Line<'static> {
    let (items, query) = model.search.suggestions();
    let matches = project(items, query);
    if matches.is_empty() {
        return Line::styled(
            format!(" No suggestions for \"{query}\""),
            Style::default().fg(Color::Indexed(245)),
        );
    }
    let label = " Suggestions: ";
    let titles = matches
        .iter()
        .map(|item| item.title.as_str())
        .collect::<Vec<_>>()
        .join(" · ");
    let rest = truncate_to_width(&titles, width.saturating_sub(label.len()));
    Line::from(vec![
        Span::styled(
            label,
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(rest),
    ])
}

pub fn render_status_bar(model: &Model, frame: &mut Frame, area: Rect) {
    let total = model.feed.len();
    let shown = projected_len(model.feed.items(), model.search.query());
    let percent = model.viewport.scroll_percent();

    let loading = model
        .feed
        .loading_page()
        .map_or_else(String::new, |page| format!("  Loading page {page}…"));
    let end = if model.feed.is_exhausted() {
        "  [end of feed]"
    } else {
        ""
    };

    let status = format!(
        " {shown}/{total} photos  page {}  search: {}{loading}{end}  [{percent}%]  ?:help",
        model.feed.cursor(),
        model.search.state().label(),
    );

    let status_bar =
        Paragraph::new(status).style(Style::default().bg(Color::DarkGray).fg(Color::White));

    frame.render_widget(status_bar, area);
}

pub fn render_toast_bar(model: &Model, frame: &mut Frame, area: Rect) {
    let Some((message, level)) = model.active_toast() else {
        return;
    };
    let (prefix, style) = match level {
        ToastLevel::Info => (
            "[info]",
            Style::default().bg(Color::DarkGray).fg(Color::White),
        ),
        ToastLevel::Warning => (
            "[warn]",
            Style::default().bg(Color::Yellow).fg(Color::Black),
        ),
        ToastLevel::Error => ("[error]", Style::default().bg(Color::Red).fg(Color::White)),
    };
    let toast = Paragraph::new(format!("{prefix} {message}")).style(style);
    frame.render_widget(toast, area);
}
