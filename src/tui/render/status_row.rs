use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::tui::app::{App, Mode};
use crate::util::unicode;

const NAVIGATE_HINT: &str = "n new  e edit  d delete  space select  p pin  x export  / search  q quit";
const SEARCH_HINT: &str = "Enter keep  Esc clear";
const FORM_HINT: &str = "Tab next field  Ctrl-S save  Esc cancel";

/// Render the status row (bottom of screen)
pub fn render_status_row(frame: &mut Frame, app: &App, area: Rect) {
    let bg = app.theme.background;
    let width = area.width as usize;
    let dim = Style::default().fg(app.theme.dim).bg(bg);

    let spans = match app.mode {
        Mode::Navigate => {
            if let Some(msg) = &app.status_message {
                vec![Span::styled(
                    format!(" {}", msg),
                    Style::default().fg(app.theme.yellow).bg(bg),
                )]
            } else if let Some(term) = app.search_term() {
                with_hint(vec![Span::styled(format!("/{}", term), dim)], "Esc clear", dim, width)
            } else {
                vec![Span::styled(format!(" {}", NAVIGATE_HINT), dim)]
            }
        }
        Mode::Search => {
            // Search prompt: /term▌
            let prompt = vec![
                Span::styled(
                    format!("/{}", app.search_input),
                    Style::default().fg(app.theme.text_bright).bg(bg),
                ),
                Span::styled("\u{258C}", Style::default().fg(app.theme.highlight).bg(bg)),
            ];
            with_hint(prompt, SEARCH_HINT, dim, width)
        }
        Mode::Form => match app.form.as_ref().and_then(|f| f.error.as_ref()) {
            Some(err) => vec![Span::styled(
                format!(" {}", err),
                Style::default().fg(app.theme.red).bg(bg),
            )],
            None => vec![Span::styled(format!(" {}", FORM_HINT), dim)],
        },
        Mode::Confirm => {
            let prompt = app.confirm.as_ref().map_or("", |c| c.prompt.as_str());
            vec![
                Span::styled(
                    format!(" {} ", prompt),
                    Style::default().fg(app.theme.text_bright).bg(bg),
                ),
                Span::styled("[y/n]", Style::default().fg(app.theme.highlight).bg(bg)),
            ]
        }
    };

    let mut spans = spans;
    let used: usize = spans.iter().map(|s| unicode::display_width(&s.content)).sum();
    if used < width {
        spans.push(Span::styled(" ".repeat(width - used), Style::default().bg(bg)));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Right-align `hint` after `spans` when it fits
fn with_hint<'a>(mut spans: Vec<Span<'a>>, hint: &'a str, style: Style, width: usize) -> Vec<Span<'a>> {
    let content_width: usize = spans.iter().map(|s| unicode::display_width(&s.content)).sum();
    let hint_width = unicode::display_width(hint);
    if content_width + hint_width < width {
        spans.push(Span::styled(
            " ".repeat(width - content_width - hint_width),
            Style::default().bg(style.bg.unwrap_or_default()),
        ));
        spans.push(Span::styled(hint, style));
    }
    spans
}
