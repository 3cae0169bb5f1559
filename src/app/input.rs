use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseEvent, MouseEventKind,
};

use crate::app::{App, Message, Model};

use super::event_loop::ResizeDebouncer;

const WHEEL_STEP: usize = 3;

impl App {
    pub(super) fn handle_event(
        event: &Event,
        model: &Model,
        now_ms: u64,
        resize_debouncer: &mut ResizeDebouncer,
    ) -> Option<Message> {
        match event {
            Event::Key(key) if key.kind == KeyEventKind::Press => Self::handle_key(*key, model),
            Event::Mouse(mouse) => Self::handle_mouse(*mouse, model),
            Event::Resize(w, h) => {
                tracing::trace!(width = w, height = h, "resize queued");
                resize_debouncer.queue((*w, *h), now_ms);
                None
            }
            _ => None,
        }
    }

    pub(super) fn handle_key(key: KeyEvent, model: &Model) -> Option<Message> {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        if model.help_visible {
            return Some(Message::HideHelp);
        }
        if model.search_focused {
            return Self::handle_search_key(key, model);
        }

        match key.code {
            KeyCode::Char('c') if ctrl => Some(Message::Quit),
            KeyCode::Char('d') if ctrl => Some(Message::HalfPageDown),
            KeyCode::Char('u') if ctrl => Some(Message::HalfPageUp),
            KeyCode::Char('j') | KeyCode::Down => Some(Message::ScrollDown(1)),
            KeyCode::Char('k') | KeyCode::Up if model.viewport.can_scroll_up() => {
                Some(Message::ScrollUp(1))
            }
            KeyCode::Char(' ') | KeyCode::PageDown => Some(Message::PageDown),
            KeyCode::Char('b') | KeyCode::PageUp => Some(Message::PageUp),
            KeyCode::Char('g') | KeyCode::Home => Some(Message::GoToTop),
            KeyCode::Char('G') | KeyCode::End => Some(Message::GoToBottom),
            KeyCode::Char('/') => Some(Message::StartSearch),
            KeyCode::Esc if model.search.is_active() => Some(Message::ClearSearch),
            KeyCode::Enter if model.search.is_active() => Some(Message::SubmitSearch),
            KeyCode::Char('r' | 'R') => Some(Message::Reload),
            KeyCode::Char('?') | KeyCode::F(1) => Some(Message::ToggleHelp),
            KeyCode::Char('q') => Some(Message::Quit),
            _ => None,
        }
    }

    fn handle_search_key(key: KeyEvent, model: &Model) -> Option<Message> {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char('c') if ctrl => Some(Message::Quit),
            KeyCode::Esc => Some(Message::ClearSearch),
            KeyCode::Enter => Some(Message::SubmitSearch),
            KeyCode::Backspace => {
                let mut query = model.search.query().to_string();
                query.pop().map(|_| Message::SearchInput(query))
            }
            KeyCode::Char(c) if !ctrl => {
                let mut query = model.search.query().to_string();
                query.push(c);
                Some(Message::SearchInput(query))
            }
            KeyCode::Down => Some(Message::ScrollDown(1)),
            KeyCode::Up => Some(Message::ScrollUp(1)),
            KeyCode::PageDown => Some(Message::PageDown),
            KeyCode::PageUp => Some(Message::PageUp),
            _ => None,
        }
    }

    pub(super) fn handle_mouse(mouse: MouseEvent, model: &Model) -> Option<Message> {
        if model.help_visible {
            return None;
        }
        match mouse.kind {
            MouseEventKind::ScrollDown => Some(Message::ScrollDown(WHEEL_STEP)),
            MouseEventKind::ScrollUp => Some(Message::ScrollUp(WHEEL_STEP)),
            _ => None,
        }
    }
}
