use ratatui::Frame;
use ratatui::layout::{Position, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use crate::tui::app::{App, FormField, FormState};
use crate::util::unicode;

const LABEL_W: u16 = 10;
/// Rows above the content area: four fields, a blank and the content label
const HEADER_ROWS: u16 = 6;

/// Popup form for creating or editing a note
pub fn render_form(frame: &mut Frame, app: &App, area: Rect) {
    let Some(form) = app.form.as_ref() else {
        return;
    };
    let bg = app.theme.background;

    let width = area.width.saturating_sub(4).min(72);
    let height = area.height.saturating_sub(2).max(HEADER_ROWS + 3).min(area.height);
    let popup = Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    };
    frame.render_widget(Clear, popup);

    let title = if form.id.is_some() {
        " Edit note "
    } else {
        " New note "
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .title(Span::styled(
            title,
            Style::default()
                .fg(app.theme.highlight)
                .add_modifier(Modifier::BOLD),
        ))
        .border_style(Style::default().fg(app.theme.highlight))
        .style(Style::default().bg(bg));
    let inner = block.inner(popup);
    frame.render_widget(block, popup);
    if inner.height == 0 || inner.width <= LABEL_W {
        return;
    }

    let field_w = (inner.width - LABEL_W) as usize;
    let text_style = Style::default().fg(app.theme.text_bright).bg(bg);
    let dim_style = Style::default().fg(app.theme.dim).bg(bg);

    let pinned = if form.pinned { "[x]" } else { "[ ]" };
    let reminder = if form.reminder.is_empty() && form.field != FormField::Reminder {
        Span::styled("YYYY-MM-DDTHH:MM", dim_style)
    } else {
        Span::styled(single_line_tail(&form.reminder, form, FormField::Reminder, field_w), text_style)
    };

    let mut lines = vec![
        field_line(
            app,
            form,
            FormField::Title,
            Span::styled(single_line_tail(&form.title, form, FormField::Title, field_w), text_style),
        ),
        field_line(
            app,
            form,
            FormField::Category,
            Span::styled(
                format!("◀ {} ▶", form.category),
                Style::default()
                    .fg(app.theme.category_color(&form.category))
                    .bg(bg),
            ),
        ),
        field_line(app, form, FormField::Reminder, reminder),
        field_line(app, form, FormField::Pinned, Span::styled(pinned, text_style)),
        Line::from(""),
        Line::from(label_span(app, form, FormField::Content)),
    ];

    let content_rows = inner.height.saturating_sub(HEADER_ROWS) as usize;
    let (cursor_line, cursor_col) = content_cursor(form);
    let offset = content_scroll(cursor_line, content_rows);
    for text in form.content.split('\n').skip(offset).take(content_rows) {
        lines.push(Line::from(Span::styled(
            format!(" {}", unicode::truncate_to_width(text, inner.width as usize - 1)),
            text_style,
        )));
    }

    frame.render_widget(Paragraph::new(lines), inner);

    // Terminal cursor for text fields
    let position = match form.field {
        FormField::Title | FormField::Reminder => {
            let row = if form.field == FormField::Title { 0 } else { 2 };
            let text = form.text().unwrap_or_default();
            let col = unicode::byte_offset_to_display_col(text, form.cursor).min(field_w);
            Some(Position::new(inner.x + LABEL_W + col as u16, inner.y + row))
        }
        FormField::Content if content_rows > 0 => {
            let col = (cursor_col + 1).min(inner.width as usize - 1);
            let row = (cursor_line - offset) as u16;
            Some(Position::new(inner.x + col as u16, inner.y + HEADER_ROWS + row))
        }
        _ => None,
    };
    if let Some(pos) = position {
        frame.set_cursor_position(pos);
    }
}

fn label_span(app: &App, form: &FormState, field: FormField) -> Span<'static> {
    let label = match field {
        FormField::Title => "Title",
        FormField::Category => "Category",
        FormField::Reminder => "Reminder",
        FormField::Pinned => "Pinned",
        FormField::Content => "Content",
    };
    let style = if form.field == field {
        Style::default()
            .fg(app.theme.highlight)
            .bg(app.theme.background)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(app.theme.dim).bg(app.theme.background)
    };
    Span::styled(
        format!(" {:<width$}", format!("{}:", label), width = LABEL_W as usize - 1),
        style,
    )
}

fn field_line<'a>(app: &App, form: &FormState, field: FormField, value: Span<'a>) -> Line<'a> {
    Line::from(vec![label_span(app, form, field), value])
}

/// Text of a one-line field, cut to `width`. The focused field keeps its end visible.
fn single_line_tail(text: &str, form: &FormState, field: FormField, width: usize) -> String {
    if form.field != field || unicode::display_width(text) <= width {
        return unicode::truncate_to_width(text, width);
    }
    let mut start = 0;
    while unicode::display_width(&text[start..]) > width {
        match unicode::next_grapheme_boundary(text, start) {
            Some(next) => start = next,
            None => break,
        }
    }
    text[start..].to_string()
}

/// Line and display column of the cursor within the content field
fn content_cursor(form: &FormState) -> (usize, usize) {
    if form.field != FormField::Content {
        return (0, 0);
    }
    let before = &form.content[..form.cursor.min(form.content.len())];
    let line = before.matches('\n').count();
    let line_start = before.rfind('\n').map_or(0, |i| i + 1);
    (line, unicode::display_width(&before[line_start..]))
}

fn content_scroll(cursor_line: usize, rows: usize) -> usize {
    if rows == 0 {
        0
    } else {
        cursor_line.saturating_sub(rows - 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::note::NoteId;
    use crate::ops::session::test_support::note;
    use crate::tui::render::test_helpers::*;
    use tempfile::TempDir;

    #[test]
    fn new_form_shows_fields_and_hint() {
        let tmp = TempDir::new().unwrap();
        let mut app = app_with_notes(tmp.path(), vec![]);
        app.open_new_form();
        let out = render_to_string(TERM_W, 16, |frame, area| render_form(frame, &app, area));
        assert!(out.contains("New note"));
        assert!(out.contains("Title:"));
        assert!(out.contains("◀ Miscellaneous ▶"));
        assert!(out.contains("YYYY-MM-DDTHH:MM"));
        assert!(out.contains("Pinned:  [ ]"));
        assert!(out.contains("Content:"));
    }

    #[test]
    fn edit_form_is_prefilled() {
        let tmp = TempDir::new().unwrap();
        let mut n = note(1, "Groceries", "Milk\nEggs");
        n.is_pinned = true;
        let mut app = app_with_notes(tmp.path(), vec![n]);
        app.session.current = Some(NoteId(1));
        app.open_edit_form();
        let out = render_to_string(TERM_W, 16, |frame, area| render_form(frame, &app, area));
        assert!(out.contains("Edit note"));
        assert!(out.contains("Groceries"));
        assert!(out.contains("[x]"));
        assert!(out.contains("Milk"));
        assert!(out.contains("Eggs"));
    }

    #[test]
    fn long_title_keeps_its_end_visible_while_focused() {
        let form = FormState {
            title: "abcdefghij".into(),
            ..FormState::new_note("Work")
        };
        assert_eq!(single_line_tail(&form.title, &form, FormField::Title, 4), "ghij");
        assert_eq!(single_line_tail(&form.title, &form, FormField::Reminder, 4), "abc\u{2026}");
    }

    #[test]
    fn content_cursor_tracks_line_and_column() {
        let mut form = FormState::new_note("Work");
        form.content = "one\ntwo three".into();
        form.focus(FormField::Content);
        assert_eq!(content_cursor(&form), (1, 9));
        assert_eq!(content_scroll(5, 3), 3);
        assert_eq!(content_scroll(1, 3), 0);
    }
}
