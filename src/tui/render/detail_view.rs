use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Paragraph, Wrap};

use crate::model::note::REMINDER_DISPLAY;
use crate::tui::app::App;

use super::push_highlighted_spans;

/// Render the current note, or a placeholder when none is shown
pub fn render_detail_view(frame: &mut Frame, app: &App, area: Rect) {
    let bg = app.theme.background;
    let area = Rect {
        x: area.x + 2,
        width: area.width.saturating_sub(3),
        ..area
    };

    let Some(note) = app.session.current.and_then(|id| app.session.find(id)) else {
        let placeholder = Paragraph::new("Select a note to view its content.")
            .style(Style::default().fg(app.theme.dim).bg(bg));
        frame.render_widget(placeholder, area);
        return;
    };

    let search_re = app.active_search_re();
    let match_style = Style::default()
        .fg(app.theme.search_match_fg)
        .bg(app.theme.search_match_bg);
    let text_style = Style::default().fg(app.theme.text).bg(bg);
    let dim_style = Style::default().fg(app.theme.dim).bg(bg);

    let mut lines: Vec<Line> = Vec::new();

    // Title
    let mut title = Vec::new();
    if note.is_pinned {
        title.push(Span::styled("📌 ", text_style));
    }
    push_highlighted_spans(
        &mut title,
        note.display_title(),
        Style::default()
            .fg(app.theme.text_bright)
            .bg(bg)
            .add_modifier(Modifier::BOLD),
        match_style,
        search_re.as_ref(),
    );
    lines.push(Line::from(title));
    lines.push(Line::from(""));

    // Meta
    let mut meta = vec![
        Span::styled("Category: ", dim_style),
        Span::styled(
            note.category.clone(),
            Style::default()
                .fg(app.theme.category_color(&note.category))
                .bg(bg),
        ),
    ];
    if let Some(reminder) = note.reminder_date {
        meta.push(Span::styled("   ⏰ Reminder: ", dim_style));
        meta.push(Span::styled(
            reminder.format(REMINDER_DISPLAY).to_string(),
            Style::default().fg(app.theme.yellow).bg(bg),
        ));
    }
    lines.push(Line::from(meta));
    lines.push(Line::from(""));

    // Content
    for text in note.content.lines() {
        let mut spans = Vec::new();
        push_highlighted_spans(&mut spans, text, text_style, match_style, search_re.as_ref());
        lines.push(Line::from(spans));
    }

    let paragraph = Paragraph::new(lines)
        .style(Style::default().bg(bg))
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::note::{NoteId, parse_reminder};
    use crate::ops::session::test_support::note;
    use crate::tui::render::test_helpers::*;
    use tempfile::TempDir;

    #[test]
    fn placeholder_without_current_note() {
        let tmp = TempDir::new().unwrap();
        let app = app_with_notes(tmp.path(), vec![note(1, "A", "B")]);
        let out = render_to_string(50, 5, |frame, area| render_detail_view(frame, &app, area));
        assert!(out.contains("Select a note to view its content."));
    }

    #[test]
    fn shows_title_meta_and_content() {
        let tmp = TempDir::new().unwrap();
        let mut n = note(1, "Trip", "Pack bags\nBook hotel");
        n.category = "Personal".into();
        n.reminder_date = parse_reminder("2025-08-01T07:30");
        let mut app = app_with_notes(tmp.path(), vec![n]);
        app.session.current = Some(NoteId(1));

        let out = render_to_string(70, 8, |frame, area| render_detail_view(frame, &app, area));
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0].trim(), "Trip");
        assert!(lines[2].contains("Category: Personal"));
        assert!(lines[2].contains("Reminder: Fri Aug 1 2025, 07:30"));
        assert_eq!(lines[4].trim(), "Pack bags");
        assert_eq!(lines[5].trim(), "Book hotel");
    }

    #[test]
    fn long_content_wraps() {
        let tmp = TempDir::new().unwrap();
        let mut app = app_with_notes(
            tmp.path(),
            vec![note(1, "T", "one two three four five six seven eight")],
        );
        app.session.current = Some(NoteId(1));
        let out = render_to_string(23, 8, |frame, area| render_detail_view(frame, &app, area));
        assert!(out.lines().count() > 5);
        assert!(out.contains("eight"));
    }
}
