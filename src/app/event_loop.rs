use std::io::stdout;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event;
use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use crossterm::execute;
use ratatui::DefaultTerminal;

use crate::app::{App, Lanes, Message, Model, update};
use crate::debounce::Debouncer;

const RESIZE_DEBOUNCE_MS: u64 = 100;
const BUSY_POLL_MS: u64 = 30;
const IDLE_POLL_MS: u64 = 250;

pub(super) type ResizeDebouncer = Debouncer<(u16, u16)>;

impl App {
    /// Run the main event loop.
    ///
    /// # Errors
    ///
    /// Returns an error if terminal initialization or the event loop hits an
    /// I/O failure. Feed failures are shown in the UI, not returned.
    pub fn run(&mut self) -> Result<()> {
        // The picker queries stdio, so it runs before raw mode.
        let picker = if self.settings.images_enabled {
            crate::image::create_picker(self.settings.force_half_cell)
        } else {
            None
        };

        let mut terminal = ratatui::try_init()
            .context("Failed to initialize terminal: photofeed requires an interactive terminal")?;
        let size = terminal.size()?;

        let mut model = Model::new((size.width, size.height), &self.settings).with_picker(picker);
        model
            .config_global_path
            .clone_from(&self.config_global_path);
        model.config_local_path.clone_from(&self.config_local_path);

        let mut lanes = Lanes::spawn(
            std::sync::Arc::clone(&self.source),
            self.settings.suggestions_page,
        );
        tracing::info!(
            base_url = %self.settings.base_url,
            threshold = self.settings.threshold,
            debounce_ms = self.settings.search_debounce_ms,
            "feed viewer started"
        );

        model.start();
        let result = execute!(stdout(), EnableMouseCapture)
            .context("Failed to enable mouse capture")
            .and_then(|()| Self::event_loop(&mut terminal, &mut model, &mut lanes));
        model.stop();

        // Restore terminal
        let _ = execute!(stdout(), DisableMouseCapture);
        ratatui::restore();

        result
    }

    fn event_loop(
        terminal: &mut DefaultTerminal,
        model: &mut Model,
        lanes: &mut Lanes,
    ) -> Result<()> {
        let start = Instant::now();
        let elapsed_ms = || u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
        let mut resize_debouncer = ResizeDebouncer::new(RESIZE_DEBOUNCE_MS);
        let mut needs_render = true;

        loop {
            if model.expire_toast(Instant::now()) {
                needs_render = true;
            }

            let now_ms = elapsed_ms();
            let search_before = model.search.state();
            *model = update(std::mem::take(model), Message::Tick(now_ms));
            if model.search.state() != search_before {
                needs_render = true;
            }

            if let Some((width, height)) = resize_debouncer.take_ready(now_ms) {
                tracing::debug!(width, height, "applying resize");
                *model = update(std::mem::take(model), Message::Resize(width, height));
                needs_render = true;
            }

            // Fetch results
            for msg in lanes.drain() {
                *model = update(std::mem::take(model), msg);
                needs_render = true;
            }
            for outcome in lanes.drain_thumbnails() {
                model.install_thumbnail(&outcome.id, outcome.result);
                needs_render = true;
            }
            Self::flush_commands(model, lanes);

            // Handle events
            let poll_ms = if needs_render {
                0
            } else if model.is_busy() || resize_debouncer.is_pending() {
                BUSY_POLL_MS
            } else {
                IDLE_POLL_MS
            };
            if event::poll(Duration::from_millis(poll_ms))? {
                let event_ms = elapsed_ms();
                if let Some(msg) =
                    Self::handle_event(&event::read()?, model, event_ms, &mut resize_debouncer)
                {
                    tracing::trace!(?msg, "input");
                    *model = update(std::mem::take(model), msg);
                    needs_render = true;
                }

                // Coalesce key repeat bursts into a single render.
                while event::poll(Duration::from_millis(0))? {
                    let drain_ms = elapsed_ms();
                    if let Some(msg) =
                        Self::handle_event(&event::read()?, model, drain_ms, &mut resize_debouncer)
                    {
                        *model = update(std::mem::take(model), msg);
                        needs_render = true;
                    }
                }
                Self::flush_commands(model, lanes);
            }

            if needs_render {
                // Request thumbnails near the viewport before drawing
                model.load_nearby_thumbnails();
                Self::flush_commands(model, lanes);
                terminal.draw(|frame| crate::ui::render(model, frame))?;
                needs_render = false;
            }

            if model.should_quit {
                break;
            }
        }
        Ok(())
    }

    /// Run queued commands; requests that could not start settle at once.
    fn flush_commands(model: &mut Model, lanes: &mut Lanes) {
        let mut commands = model.take_commands();
        while !commands.is_empty() {
            for msg in lanes.dispatch(commands) {
                *model = update(std::mem::take(model), msg);
            }
            commands = model.take_commands();
        }
    }
}
