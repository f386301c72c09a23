use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::model::notebook::Mode;
use crate::tui::app::App;
use crate::util::unicode;

/// Top row: notebook name on the left, storage mode and selection on the right
pub fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let bg = app.theme.background;
    let width = area.width as usize;

    let left = vec![
        Span::styled(
            " quill ",
            Style::default()
                .fg(app.theme.highlight)
                .bg(bg)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            app.session.notebook.name().to_string(),
            Style::default().fg(app.theme.text_bright).bg(bg),
        ),
    ];

    let mut right = Vec::new();
    if let Some(summary) = app.session.selection.summary() {
        right.push(Span::styled(
            format!("{}  ", summary),
            Style::default().fg(app.theme.highlight).bg(bg),
        ));
    }
    let mode = match app.session.mode() {
        Mode::Guest => Span::styled("guest ", Style::default().fg(app.theme.dim).bg(bg)),
        Mode::Authenticated => Span::styled(
            format!(
                "● {} ",
                app.session.notebook.config.remote.url.as_deref().unwrap_or("server")
            ),
            Style::default().fg(app.theme.green).bg(bg),
        ),
    };
    right.push(mode);

    let left_w: usize = left.iter().map(|s| unicode::display_width(&s.content)).sum();
    let right_w: usize = right.iter().map(|s| unicode::display_width(&s.content)).sum();

    let mut spans = left;
    if left_w + right_w < width {
        spans.push(Span::styled(
            " ".repeat(width - left_w - right_w),
            Style::default().bg(bg),
        ));
        spans.extend(right);
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
