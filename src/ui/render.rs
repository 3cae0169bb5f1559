use ratatui::prelude::*;

use crate::app::Model;

use super::{grid, overlays, status};

/// Split the screen into search bar, suggestions strip, grid and status bar.
pub fn split_screen(area: Rect) -> [Rect; 4] {
    Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(area)
}

/// Render the complete UI.
pub fn render(model: &mut Model, frame: &mut Frame) {
    let area = frame.area();
    let [search_area, strip_area, grid_area, status_area] = split_screen(area);

    status::render_search_bar(model, frame, search_area);
    status::render_suggestions_strip(model, frame, strip_area);
    grid::render_grid(model, frame, grid_area);
    status::render_status_bar(model, frame, status_area);

    // The toast sits on the last grid row so the layout never shifts.
    if model.active_toast().is_some() && grid_area.height > 0 {
        let toast_area = Rect {
            y: grid_area.bottom() - 1,
            height: 1,
            ..grid_area
        };
        status::render_toast_bar(model, frame, toast_area);
    }

    if model.help_visible {
        overlays::render_help_overlay(model, frame, area);
    }
}
