#![allow(
    // reqwest and ratatui-image pull in duplicate transitive versions
    clippy::multiple_crate_versions
)]

//! # photofeed
//!
//! A terminal viewer for an infinite, paginated photo feed.
//!
//! - Pages are fetched as the viewport nears the bottom of the card grid
//! - Thumbnails render through the terminal's graphics protocol, with a
//!   half-block fallback
//! - An incremental search filters the loaded cards and fetches suggestions
//!
//! ## Architecture
//!
//! Keys, resizes and fetch results become [`app::Message`]s. `update` folds
//! them into the [`app::Model`] and queues fetch commands, which background
//! [`lanes`] run. [`ui::render`] draws the model.
//!
//! ## Modules
//!
//! - [`app`]: Model, messages and the event loop
//! - [`feed`]: Feed endpoint client and item model
//! - [`pager`]: Page accumulation and the next-page cursor
//! - [`scroll`]: Near-bottom detection
//! - [`search`]: Query and suggestions state machine
//! - [`view`]: Query filtering of the loaded items
//! - [`lanes`]: Background fetch workers
//! - [`image`]: Thumbnail decoding and caching
//! - [`ui`]: Grid, bars and help popup

pub mod app;
pub mod config;
pub mod debounce;
pub mod feed;
pub mod image;
pub mod lanes;
pub mod logging;
pub mod pager;
pub mod scroll;
pub mod search;
pub mod ui;
pub mod view;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::app::{App, Message, Model};
    pub use crate::feed::{FeedError, FeedSource, Item};
    pub use crate::pager::PageAccumulator;
    pub use crate::search::{SearchCoordinator, SearchState};
    pub use crate::ui::viewport::Viewport;
}
