use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::tui::app::{App, Mode};

const PAGE: isize = 10;

pub(super) fn handle_navigate(app: &mut App, key: KeyEvent) {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        match key.code {
            KeyCode::Char('c') => app.should_quit = true,
            KeyCode::Char('d') => app.move_cursor(PAGE),
            KeyCode::Char('u') => app.move_cursor(-PAGE),
            _ => {}
        }
        return;
    }

    match key.code {
        KeyCode::Char('q') => app.should_quit = true,

        // Movement
        KeyCode::Char('j') | KeyCode::Down => app.move_cursor(1),
        KeyCode::Char('k') | KeyCode::Up => app.move_cursor(-1),
        KeyCode::PageDown => app.move_cursor(PAGE),
        KeyCode::PageUp => app.move_cursor(-PAGE),
        KeyCode::Char('g') | KeyCode::Home => app.cursor = 0,
        KeyCode::Char('G') | KeyCode::End => app.move_cursor(isize::MAX),

        KeyCode::Enter => app.show_cursor_note(),
        KeyCode::Char(' ') => app.toggle_select(),

        // Notes
        KeyCode::Char('n') => app.open_new_form(),
        KeyCode::Char('e') => app.open_edit_form(),
        KeyCode::Char('p') => app.toggle_pin(),
        KeyCode::Char('d') | KeyCode::Delete => app.request_delete(),
        KeyCode::Char('x') => app.export(),
        KeyCode::Char('r') => app.reload(),

        // Search
        KeyCode::Char('/') => {
            app.search_input = app.session.last_search.clone().unwrap_or_default();
            app.mode = Mode::Search;
            app.cursor = 0;
        }
        KeyCode::Esc => {
            if app.session.last_search.is_some() {
                app.clear_search();
            } else {
                app.session.selection.clear();
            }
        }
        _ => {}
    }
}
