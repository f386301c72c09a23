use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::tui::app::App;

/// Live search: the list is filtered on every keystroke.
pub(super) fn handle_search(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Enter => app.commit_search(),
        KeyCode::Esc => app.clear_search(),
        KeyCode::Backspace => {
            if app.search_input.pop().is_none() {
                app.clear_search();
                return;
            }
            app.cursor = 0;
        }
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.search_input.clear();
            app.cursor = 0;
        }
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.search_input.push(c);
            app.cursor = 0;
        }
        _ => {}
    }
}
