use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::tui::app::{App, FormField};

use super::common::{TextEdit, apply_text_edit};

pub(super) fn handle_form(app: &mut App, key: KeyEvent) {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Char('s') if ctrl => {
            app.save_form();
            return;
        }
        KeyCode::Esc => {
            app.close_form();
            return;
        }
        _ => {}
    }

    let categories = app.session.notebook.config.ui.categories.clone();
    let Some(form) = app.form.as_mut() else {
        return;
    };
    form.error = None;

    match key.code {
        KeyCode::Tab => {
            let next = form.field.next();
            form.focus(next);
            return;
        }
        KeyCode::BackTab => {
            let prev = form.field.prev();
            form.focus(prev);
            return;
        }
        _ => {}
    }

    match form.field {
        FormField::Category => match key.code {
            KeyCode::Right | KeyCode::Char(' ') | KeyCode::Char('l') => {
                form.cycle_category(&categories, true)
            }
            KeyCode::Left | KeyCode::Char('h') => form.cycle_category(&categories, false),
            KeyCode::Enter => form.focus(FormField::Reminder),
            _ => {}
        },
        FormField::Pinned => match key.code {
            KeyCode::Char(' ') | KeyCode::Left | KeyCode::Right => form.pinned = !form.pinned,
            KeyCode::Enter => form.focus(FormField::Content),
            _ => {}
        },
        FormField::Title | FormField::Reminder | FormField::Content => {
            let multiline = form.field == FormField::Content;
            let edit = match key.code {
                KeyCode::Enter if multiline => TextEdit::Insert('\n'),
                KeyCode::Enter => {
                    let next = form.field.next();
                    form.focus(next);
                    return;
                }
                KeyCode::Char(c) if !ctrl => TextEdit::Insert(c),
                KeyCode::Char('a') if ctrl => TextEdit::Home,
                KeyCode::Char('e') if ctrl => TextEdit::End,
                KeyCode::Backspace => TextEdit::Backspace,
                KeyCode::Delete => TextEdit::Delete,
                KeyCode::Left => TextEdit::Left,
                KeyCode::Right => TextEdit::Right,
                KeyCode::Home => TextEdit::Home,
                KeyCode::End => TextEdit::End,
                _ => return,
            };
            let mut cursor = form.cursor;
            if let Some(buf) = form.text_mut() {
                apply_text_edit(buf, &mut cursor, edit);
            }
            form.cursor = cursor;
        }
    }
}
