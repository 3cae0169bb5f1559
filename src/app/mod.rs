//! The feed browser as a TEA loop.
//!
//! [`Model`] holds everything on screen, keys and fetch results arrive as
//! [`Message`]s, and [`update`] folds one message into a new model.
//! [`App::run`] owns the terminal.
//!
//! Network work never happens inside [`update`]. It queues [`Command`]s,
//! which the event loop hands to background [`Lanes`]; their results come
//! back as messages.

mod effects;
mod event_loop;
mod input;
mod model;
mod update;

pub use effects::{Lanes, ThumbnailOutcome};
pub use model::{Command, Model, ThumbnailSlot, ToastLevel};
pub use update::{Message, update};

use std::path::PathBuf;
use std::sync::Arc;

use crate::config::Settings;
use crate::feed::FeedSource;

/// Main application struct that owns the terminal and runs the event loop.
pub struct App {
    source: Arc<dyn FeedSource>,
    settings: Settings,
    config_global_path: Option<PathBuf>,
    config_local_path: Option<PathBuf>,
}

impl App {
    /// Create a viewer for `source` with default settings.
    pub fn new(source: Arc<dyn FeedSource>) -> Self {
        Self {
            source,
            settings: Settings::default(),
            config_global_path: None,
            config_local_path: None,
        }
    }

    #[must_use]
    pub fn with_settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    /// Set config paths to show in help.
    #[must_use]
    pub fn with_config_paths(
        mut self,
        global_path: Option<PathBuf>,
        local_path: Option<PathBuf>,
    ) -> Self {
        self.config_global_path = global_path;
        self.config_local_path = local_path;
        self
    }
}
