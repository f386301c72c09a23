use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::model::note::Note;
use crate::tui::app::App;
use crate::util::unicode;

use super::push_highlighted_spans;

/// The note list: one row per note with tick, pin, title and snippet
pub fn render_list_view(frame: &mut Frame, app: &mut App, area: Rect) {
    let block = Block::default()
        .borders(Borders::RIGHT)
        .border_style(Style::default().fg(app.theme.dim).bg(app.theme.background));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let height = inner.height as usize;
    let count = app.visible_notes().len();
    app.clamp_cursor();

    // Keep the cursor row on screen
    if app.cursor < app.scroll_offset {
        app.scroll_offset = app.cursor;
    } else if height > 0 && app.cursor >= app.scroll_offset + height {
        app.scroll_offset = app.cursor + 1 - height;
    }
    app.scroll_offset = app.scroll_offset.min(count.saturating_sub(height.max(1)));

    if count == 0 {
        let msg = if app.search_term().is_some() {
            " No matching notes."
        } else {
            " No notes yet. Press n to write one."
        };
        frame.render_widget(
            Paragraph::new(Span::styled(msg, Style::default().fg(app.theme.dim))),
            inner,
        );
        return;
    }

    let search_re = app.active_search_re();
    let lines: Vec<Line> = app
        .visible_notes()
        .into_iter()
        .enumerate()
        .skip(app.scroll_offset)
        .take(height)
        .map(|(i, note)| note_row(app, note, i == app.cursor, inner.width as usize, search_re.as_ref()))
        .collect();

    frame.render_widget(Paragraph::new(lines), inner);
}

fn note_row<'a>(
    app: &App,
    note: &Note,
    is_cursor: bool,
    width: usize,
    search_re: Option<&regex::Regex>,
) -> Line<'a> {
    let theme = &app.theme;
    let bg = if is_cursor {
        theme.selection_bg
    } else {
        theme.background
    };
    let selected = app.session.selection.contains(note.id);
    let is_current = app.session.current == Some(note.id);

    let tick = if selected { "[✔] " } else { "[ ] " };
    let pin = if note.is_pinned { "📌 " } else { "" };
    let prefix_w = unicode::display_width(tick) + unicode::display_width(pin) + 1;
    let room = width.saturating_sub(prefix_w);

    let title = unicode::truncate_to_width(note.display_title(), room);
    let title_w = unicode::display_width(&title);
    let snippet_room = room.saturating_sub(title_w + 2);
    let snippet = unicode::truncate_to_width(&note.snippet().replace('\n', " "), snippet_room);

    let title_style = if is_current {
        Style::default()
            .fg(theme.highlight)
            .bg(bg)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(theme.text_bright).bg(bg)
    };
    let match_style = Style::default()
        .fg(theme.search_match_fg)
        .bg(theme.search_match_bg);

    let mut spans = vec![
        Span::styled(" ", Style::default().bg(bg)),
        Span::styled(
            tick,
            Style::default()
                .fg(if selected { theme.highlight } else { theme.dim })
                .bg(bg),
        ),
        Span::styled(pin, Style::default().bg(bg)),
    ];
    push_highlighted_spans(&mut spans, &title, title_style, match_style, search_re);
    if snippet_room > 0 {
        spans.push(Span::styled("  ", Style::default().bg(bg)));
        push_highlighted_spans(
            &mut spans,
            &snippet,
            Style::default().fg(theme.dim).bg(bg),
            match_style,
            search_re,
        );
    }

    let used: usize = spans.iter().map(|s| unicode::display_width(&s.content)).sum();
    if used < width {
        spans.push(Span::styled(" ".repeat(width - used), Style::default().bg(bg)));
    }
    Line::from(spans)
}
