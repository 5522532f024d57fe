use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Wrap};

use crate::app::{App, Column, Focus};
use crate::models::{Segment, Token};

const STATUS_DURATION_MS: u128 = 1500;
const HELP_TOKENS: &str =
    "Esc quit  F2 template  Tab/↑↓ field  Enter insert  ^N add  ^D remove  ^C copy  ^T copy tokens";
const HELP_TEMPLATE: &str = "Esc quit  F2 tokens  ^B insert token  ^E $EDITOR  ^C copy";

pub(crate) fn render_app(frame: &mut Frame, app: &mut App) {
    let area = frame.area();
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Fill(1), Constraint::Length(1)])
        .split(area);

    let content_area = layout[0];
    let status_area = layout[1];

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(content_area);

    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(horizontal[1]);

    render_tokens(frame, app, horizontal[0]);
    render_template(frame, app, right[0]);
    render_output(frame, &app.rendered(), right[1]);
    render_status(frame, app, status_area);
}

fn render_tokens(frame: &mut Frame, app: &mut App, area: Rect) {
    let title = format!("Tokens ({})", app.tokens.len());
    let block = Block::bordered()
        .title(title)
        .border_style(focus_style(app.focus == Focus::Tokens));
    let inner = inner_rect(area);
    frame.render_widget(block, area);
    app.tokens_area = inner;

    if app.tokens.is_empty() {
        let hint = Paragraph::new("No tokens. Ctrl+N adds one.")
            .style(Style::new().fg(Color::DarkGray));
        frame.render_widget(hint, inner);
        return;
    }

    let row_height = app.row_height.max(1);
    let view_capacity = (inner.height / row_height) as usize;
    app.token_scroll = ensure_visible(
        app.token_scroll,
        app.active_token,
        app.tokens.len(),
        view_capacity,
    );

    let start = app.token_scroll;
    let end = (start + view_capacity).min(app.tokens.len());
    let tokens_focused = app.focus == Focus::Tokens;

    for (idx, token) in app.tokens[start..end].iter().enumerate() {
        let row_area = Rect {
            x: inner.x,
            y: inner.y + (idx as u16) * row_height,
            width: inner.width,
            height: row_height,
        };
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(row_area);

        let is_active_row = start + idx == app.active_token;
        for (column, column_area) in [(Column::Name, columns[0]), (Column::Value, columns[1])] {
            let is_active = tokens_focused && is_active_row && app.active_column == column;
            render_field(frame, token, column, is_active, column_area);
        }
    }
}

fn render_field(frame: &mut Frame, token: &Token, column: Column, is_active: bool, area: Rect) {
    let (title, mut value) = match column {
        Column::Name => ("Name", token.name.clone()),
        Column::Value => ("Value", token.value.clone()),
    };
    if is_active {
        value.push('|');
    }
    let border_style = if is_active {
        Style::new().fg(Color::Blue)
    } else {
        Style::new().fg(Color::DarkGray)
    };
    let block = Block::bordered().title(title).border_style(border_style);
    let paragraph = Paragraph::new(value).block(block);
    frame.render_widget(paragraph, area);
}

fn render_template(frame: &mut Frame, app: &mut App, area: Rect) {
    let focused = app.focus == Focus::Template;
    app.template_area = inner_rect(area);

    let mut lines = template_lines(&app.template.segments, &app.tokens);
    if app.template.is_empty() && !focused {
        lines = vec![Line::styled(
            "Press F2 to type, Enter on a token to insert it.",
            Style::new().fg(Color::DarkGray),
        )];
    } else if focused {
        match lines.last_mut() {
            Some(line) => line.push_span(Span::raw("|")),
            None => lines.push(Line::from("|")),
        }
    }

    let paragraph = Paragraph::new(lines)
        .block(
            Block::bordered()
                .title("Template")
                .border_style(focus_style(focused)),
        )
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

fn render_output(frame: &mut Frame, rendered: &str, area: Rect) {
    let paragraph = Paragraph::new(rendered)
        .block(Block::bordered().title("Output"))
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

fn render_status(frame: &mut Frame, app: &App, area: Rect) {
    let mut status = match app.focus {
        Focus::Tokens => HELP_TOKENS.to_string(),
        Focus::Template => HELP_TEMPLATE.to_string(),
    };
    if let Some(message) = app
        .status
        .as_ref()
        .filter(|msg| msg.since.elapsed().as_millis() <= STATUS_DURATION_MS)
    {
        status.push_str("  |  ");
        status.push_str(&message.text);
    }
    let status = Paragraph::new(status).style(Style::new().fg(Color::DarkGray));
    frame.render_widget(status, area);
}

/// Splits the template into display lines, drawing each bubble as a
/// highlighted token label.
fn template_lines(segments: &[Segment], tokens: &[Token]) -> Vec<Line<'static>> {
    let bubble_style = Style::new()
        .fg(Color::Black)
        .bg(Color::Cyan)
        .add_modifier(Modifier::BOLD);

    let mut lines: Vec<Line<'static>> = Vec::new();
    let mut current: Vec<Span<'static>> = Vec::new();
    for segment in segments {
        match segment {
            Segment::Text(text) => {
                let mut parts = text.split('\n');
                if let Some(first) = parts.next() {
                    if !first.is_empty() {
                        current.push(Span::raw(first.to_string()));
                    }
                }
                for part in parts {
                    lines.push(Line::from(std::mem::take(&mut current)));
                    if !part.is_empty() {
                        current.push(Span::raw(part.to_string()));
                    }
                }
            }
            Segment::Bubble { token_id } => {
                if let Some(token) = tokens.iter().find(|token| token.id == *token_id) {
                    current.push(Span::styled(format!(" {} ", token.label()), bubble_style));
                }
            }
        }
    }
    if !current.is_empty() || !lines.is_empty() {
        lines.push(Line::from(current));
    }
    lines
}

fn focus_style(focused: bool) -> Style {
    if focused {
        Style::new().fg(Color::Blue)
    } else {
        Style::new()
    }
}

fn inner_rect(area: Rect) -> Rect {
    let mut inner = area;
    if inner.width >= 2 {
        inner.x += 1;
        inner.width -= 2;
    }
    if inner.height >= 2 {
        inner.y += 1;
        inner.height -= 2;
    }
    inner
}

fn ensure_visible(current_scroll: usize, selected: usize, total: usize, view_height: usize) -> usize {
    if total == 0 || view_height == 0 {
        return 0;
    }
    let mut scroll = current_scroll.min(total.saturating_sub(1));
    if selected < scroll {
        scroll = selected;
    } else if selected >= scroll + view_height {
        scroll = selected + 1 - view_height;
    }
    scroll
}
