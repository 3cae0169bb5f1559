//! Terminal UI components.
//!
//! - [`viewport`]: Scroll position over the card grid
//! - [`grid`]: Card layout and drawing
//! - status and search bars, the suggestions strip and the help overlay

pub mod grid;
pub mod viewport;

mod overlays;
mod render;
mod status;

pub use render::{render, split_screen};

/// Rows not available to the grid: search bar, suggestions strip, status bar.
pub const CHROME_ROWS: u16 = 3;

#[cfg(test)]
mod tests;
