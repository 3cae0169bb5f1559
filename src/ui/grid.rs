//! Card grid layout and drawing.
//!
//! Cards are laid out left to right in fixed-height rows. The grid is taller
//! than the screen, so each card is drawn into its own buffer and the rows
//! inside the viewport are copied onto the frame.

use std::ops::Range;

use ratatui::buffer::Buffer;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use ratatui_image::protocol::{StatefulProtocol, StatefulProtocolType};
use ratatui_image::{Resize, StatefulImage};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::app::{Model, ThumbnailSlot};
use crate::feed::Item;
use crate::view::project;

/// Minimum card width in columns; spare width is shared between cards.
pub const CARD_WIDTH: u16 = 24;
/// Card height in rows, borders included.
pub const CARD_HEIGHT: u16 = 8;
/// Thumbnail box inside a card, in cells.
pub const THUMB_COLS: u16 = CARD_WIDTH - 2;
pub const THUMB_ROWS: u16 = CARD_HEIGHT - 3;

/// Cards per grid row for a viewport `width` columns wide.
pub fn columns(width: u16) -> usize {
    usize::from((width / CARD_WIDTH).max(1))
}

/// Grid height in rows for `items` cards.
pub fn content_height(items: usize, width: u16) -> usize {
    items.div_ceil(columns(width)) * usize::from(CARD_HEIGHT)
}

/// Indices of the cards that intersect the grid `rows`.
pub fn cards_in_rows(rows: Range<usize>, width: u16) -> Range<usize> {
    let cols = columns(width);
    let height = usize::from(CARD_HEIGHT);
    let first = rows.start / height;
    let last = rows.end.div_ceil(height);
    first * cols..last.max(first) * cols
}

pub fn render_grid(model: &mut Model, frame: &mut Frame, area: Rect) {
    frame.render_widget(Clear, area);
    let items = project(model.feed.items(), model.search.query());
    if items.is_empty() {
        render_empty_state(model, frame, area);
        return;
    }

    let cols = columns(area.width);
    #[allow(clippy::cast_possible_truncation)]
    // cols <= width / CARD_WIDTH
    let card_width = area.width / cols as u16;
    let offset = model.viewport.offset();
    let window = offset..offset + usize::from(area.height);
    let truecolor = crate::image::supports_truecolor_terminal();

    for idx in cards_in_rows(window.clone(), area.width) {
        let Some(item) = items.get(idx) else {
            break;
        };
        #[allow(clippy::cast_possible_truncation)]
        // idx % cols < cols
        let column = (idx % cols) as u16;
        let placement = CardPlacement {
            x: area.x + column * card_width,
            top: (idx / cols) * usize::from(CARD_HEIGHT),
            width: card_width,
        };
        let slot = model.thumbnails.get_mut(&item.id);
        draw_card(
            frame.buffer_mut(),
            area,
            &window,
            placement,
            item,
            slot,
            model.images_enabled,
            truecolor,
        );
    }
}

#[derive(Debug, Clone, Copy)]
struct CardPlacement {
    x: u16,
    // Grid row of the card's top border
    top: usize,
    width: u16,
}

#[allow(clippy::too_many_arguments)]
fn draw_card(
    frame_buf: &mut Buffer,
    area: Rect,
    window: &Range<usize>,
    placement: CardPlacement,
    item: &Item,
    slot: Option<&mut ThumbnailSlot>,
    images_enabled: bool,
    truecolor: bool,
) {
    let card = Rect::new(0, 0, placement.width, CARD_HEIGHT);
    let mut temp = Buffer::empty(card);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));
    let inner = block.inner(card);
    block.render(card, &mut temp);

    let thumb = Rect {
        height: inner.height.saturating_sub(1),
        ..inner
    };
    let title_area = Rect {
        y: inner.y + thumb.height,
        height: 1,
        ..inner
    };
    Paragraph::new(truncate_to_width(&item.title, usize::from(title_area.width)))
        .style(Style::default().add_modifier(Modifier::BOLD))
        .render(title_area, &mut temp);

    let card_end = placement.top + usize::from(CARD_HEIGHT);
    let fully_visible = placement.top >= window.start && card_end <= window.end;
    let mut direct: Option<&mut StatefulProtocol> = None;

    match slot {
        Some(ThumbnailSlot::Ready(protocol)) => {
            if is_halfblocks(protocol) {
                // Half-block cells are plain text and survive row slicing.
                StatefulImage::default()
                    .resize(Resize::Fit(None))
                    .render(thumb, &mut temp, protocol.as_mut());
                if !truecolor {
                    downgrade_colors(&mut temp, thumb);
                }
            } else if fully_visible {
                direct = Some(protocol.as_mut());
            } else {
                draw_placeholder(&mut temp, thumb, "");
            }
        }
        Some(ThumbnailSlot::Pending) => draw_placeholder(&mut temp, thumb, "loading…"),
        Some(ThumbnailSlot::Failed) => draw_placeholder(&mut temp, thumb, "no image"),
        None if images_enabled => draw_placeholder(&mut temp, thumb, "…"),
        None => draw_placeholder(&mut temp, thumb, ""),
    }

    for row in 0..CARD_HEIGHT {
        let grid_row = placement.top + usize::from(row);
        if !window.contains(&grid_row) {
            continue;
        }
        #[allow(clippy::cast_possible_truncation)]
        // grid_row - window.start < area.height
        let dst_y = area.y + (grid_row - window.start) as u16;
        for col in 0..placement.width {
            let dst_x = placement.x + col;
            if dst_x >= area.right() {
                break;
            }
            frame_buf[(dst_x, dst_y)] = temp[(col, row)].clone();
        }
    }

    if let Some(protocol) = direct {
        #[allow(clippy::cast_possible_truncation)]
        // fully visible, so the card top is inside the window
        let card_y = area.y + (placement.top - window.start) as u16;
        let target = Rect::new(
            placement.x + thumb.x,
            card_y + thumb.y,
            thumb.width,
            thumb.height,
        );
        StatefulImage::default()
            .resize(Resize::Fit(None))
            .render(target, frame_buf, protocol);
    }
}

fn is_halfblocks(protocol: &StatefulProtocol) -> bool {
    matches!(protocol.protocol_type(), StatefulProtocolType::Halfblocks(_))
}

fn draw_placeholder(buf: &mut Buffer, thumb: Rect, text: &str) {
    if thumb.height == 0 {
        return;
    }
    let middle = Rect {
        y: thumb.y + thumb.height / 2,
        height: 1,
        ..thumb
    };
    Paragraph::new(text)
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::Indexed(245)))
        .render(middle, buf);
}

// Terminals without truecolor render repeated RGB updates poorly.
fn downgrade_colors(buf: &mut Buffer, area: Rect) {
    for row in area.top()..area.bottom() {
        for col in area.left()..area.right() {
            let cell = &mut buf[(col, row)];
            if let Color::Rgb(r, g, b) = cell.fg {
                cell.fg = Color::Indexed(crate::image::rgb_to_xterm_256(r, g, b));
            }
            if let Color::Rgb(r, g, b) = cell.bg {
                cell.bg = Color::Indexed(crate::image::rgb_to_xterm_256(r, g, b));
            }
        }
    }
}

fn render_empty_state(model: &Model, frame: &mut Frame, area: Rect) {
    let query = model.search.query();
    let message = if !query.is_empty() {
        format!("No photos match \"{query}\"")
    } else if model.feed.is_loading() {
        "Loading photos…".to_string()
    } else if model.feed.is_exhausted() {
        "The feed is empty".to_string()
    } else {
        "No photos yet. Press r to retry".to_string()
    };
    let middle = Rect {
        y: area.y + area.height / 2,
        height: area.height.min(1),
        ..area
    };
    frame.render_widget(
        Paragraph::new(message)
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::Indexed(245))),
        middle,
    );
}

/// Cut `text` to at most `max` display columns, marking the cut with `…`.
pub fn truncate_to_width(text: &str, max: usize) -> String {
    if UnicodeWidthStr::width(text) <= max {
        return text.to_string();
    }
    if max == 0 {
        return String::new();
    }
    let mut out = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w + 1 > max {
            break;
        }
        out.push(ch);
        used += w;
    }
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_columns_never_zero() {
        assert_eq!(columns(0), 1);
        assert_eq!(columns(23), 1);
        assert_eq!(columns(80), 3);
        assert_eq!(columns(120), 5);
    }

    #[test]
    fn test_content_height_rounds_up_partial_rows() {
        assert_eq!(content_height(0, 80), 0);
        assert_eq!(content_height(1, 80), 8);
        assert_eq!(content_height(3, 80), 8);
        assert_eq!(content_height(10, 80), 32);
    }

    #[test]
    fn test_cards_in_rows_covers_partial_rows() {
        // Rows 4..20 touch card rows 0, 1 and 2.
        assert_eq!(cards_in_rows(4..20, 80), 0..9);
        assert_eq!(cards_in_rows(16..24, 80), 6..9);
        assert_eq!(cards_in_rows(0..0, 80), 0..0);
    }

    #[test]
    fn test_truncate_to_width() {
        assert_eq!(truncate_to_width("Cat nap", 10), "Cat nap");
        assert_eq!(truncate_to_width("Sunset over the bay", 8), "Sunset …");
        assert_eq!(truncate_to_width("猫の昼寝", 5), "猫の…");
        assert_eq!(truncate_to_width("anything", 0), "");
    }
}
