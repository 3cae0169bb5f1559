//! The scroll window over the card grid, in terminal rows.

use std::ops::Range;

use crate::scroll::ScrollGeometry;

/// Visible window over the card grid.
///
/// `top` is the first grid row on screen. It is kept within
/// `0..=content_rows - rows` whenever the grid or the terminal changes size.
///
/// ```
/// use photofeed::ui::viewport::Viewport;
///
/// let mut vp = Viewport::new(80, 24, 100);
/// vp.scroll_down(10);
/// assert_eq!(vp.visible_range(), 10..34);
/// assert_eq!(vp.geometry().distance_from_bottom(), 66);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Viewport {
    cols: u16,
    rows: u16,
    top: usize,
    content_rows: usize,
}

impl Viewport {
    pub const fn new(cols: u16, rows: u16, content_rows: usize) -> Self {
        Self {
            cols,
            rows,
            top: 0,
            content_rows,
        }
    }

    pub const fn offset(&self) -> usize {
        self.top
    }

    pub const fn width(&self) -> u16 {
        self.cols
    }

    pub const fn height(&self) -> u16 {
        self.rows
    }

    pub const fn total_rows(&self) -> usize {
        self.content_rows
    }

    pub fn visible_range(&self) -> Range<usize> {
        let end = self.content_rows.min(self.top + usize::from(self.rows));
        self.top..end.max(self.top)
    }

    /// What the scroll sentinel sees.
    pub const fn geometry(&self) -> ScrollGeometry {
        ScrollGeometry {
            content_height: self.content_rows,
            scroll_top: self.top,
            viewport_height: self.rows as usize,
        }
    }

    /// Position for the status bar. A grid that fits on screen reads 100.
    pub fn scroll_percent(&self) -> u8 {
        let last = self.last_top();
        if last == 0 {
            return 100;
        }
        let percent = (self.top * 100 + last / 2) / last;
        u8::try_from(percent.min(100)).unwrap_or(100)
    }

    pub const fn can_scroll_up(&self) -> bool {
        self.top > 0
    }

    pub const fn can_scroll_down(&self) -> bool {
        self.top < self.last_top()
    }

    pub fn scroll_up(&mut self, rows: usize) {
        self.move_by(rows, false);
    }

    pub fn scroll_down(&mut self, rows: usize) {
        self.move_by(rows, true);
    }

    pub fn page_up(&mut self) {
        self.move_by(self.page(), false);
    }

    pub fn page_down(&mut self) {
        self.move_by(self.page(), true);
    }

    pub fn half_page_up(&mut self) {
        self.move_by(self.page() / 2, false);
    }

    pub fn half_page_down(&mut self) {
        self.move_by(self.page() / 2, true);
    }

    pub const fn go_to_top(&mut self) {
        self.top = 0;
    }

    pub const fn go_to_bottom(&mut self) {
        self.top = self.last_top();
    }

    /// New terminal size for the grid area. Column count changes reflow the
    /// grid, so callers follow up with [`Self::set_total_rows`].
    pub fn resize(&mut self, cols: u16, rows: u16) {
        self.cols = cols;
        self.rows = rows;
        self.clamp();
    }

    /// New grid height after a page arrives or the filter changes.
    pub fn set_total_rows(&mut self, content_rows: usize) {
        self.content_rows = content_rows;
        self.clamp();
    }

    fn move_by(&mut self, rows: usize, down: bool) {
        self.top = if down {
            self.top.saturating_add(rows)
        } else {
            self.top.saturating_sub(rows)
        };
        self.clamp();
    }

    fn clamp(&mut self) {
        self.top = self.top.min(self.last_top());
    }

    const fn page(&self) -> usize {
        self.rows as usize
    }

    const fn last_top(&self) -> usize {
        self.content_rows.saturating_sub(self.rows as usize)
    }
}
