use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};
use retrieval_chat_core::{ChatMessage, ChatRole, MessageStatus};
use crate::app::{App, InputMode};

const CLEAR_LABEL: &str = "[c]";
const ZOOM_LABEL: &str = "[□]";
const UNZOOM_LABEL: &str = "[▣]";

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    // Desktop: everything behind the floating panel
    let [desktop_area, footer_area] = Layout::vertical([
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(area);

    render_desktop(app, frame, desktop_area);
    render_footer(app, frame, footer_area);

    // Resizes and zoom can push a dragged panel off screen
    app.desktop_area = Some(desktop_area);
    app.keep_window_on_screen(desktop_area);
    let panel = app.panel_rect(desktop_area);
    render_panel(app, frame, panel);

    if let Some(history) = app.history_popup.clone() {
        render_history_popup(&history, frame, desktop_area);
    }
}

fn render_desktop(app: &App, frame: &mut Frame, area: Rect) {
    let desktop = Block::default()
        .borders(Borders::NONE)
        .style(Style::default().bg(Color::Rgb(0, 128, 128)));
    frame.render_widget(desktop, area);

    let label = Line::from(vec![
        Span::styled(" retrieval-chat ", Style::default().fg(Color::White).bold()),
        Span::styled(
            format!("v{} ", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::Gray),
        ),
        Span::styled(app.client.base_url().to_string(), Style::default().fg(Color::Gray)),
    ]);
    frame.render_widget(Paragraph::new(label), Rect { height: 1, ..area });
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let mode_style = match app.input_mode {
        InputMode::Normal => Style::default().fg(Color::Black).bg(Color::Cyan),
        InputMode::Editing => Style::default().fg(Color::Black).bg(Color::Yellow),
    };
    let mode = match app.input_mode {
        InputMode::Normal => " NORMAL ",
        InputMode::Editing => " INSERT ",
    };
    let hints = match app.input_mode {
        InputMode::Normal => " i:type  c:clear  z:zoom  t:search type  h:history  j/k:scroll  q:quit",
        InputMode::Editing => " Enter:send  Esc:normal mode  drag title bar to move",
    };

    let mut spans = vec![
        Span::styled(mode, mode_style),
        Span::styled(
            format!(" {} ", app.config.search_type.as_str()),
            Style::default().fg(Color::Magenta),
        ),
        Span::styled(hints, Style::default().fg(Color::DarkGray)),
    ];
    if let Some(status) = &app.status {
        spans.push(Span::styled(format!("  {}", status), Style::default().fg(Color::Yellow)));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_panel(app: &mut App, frame: &mut Frame, area: Rect) {
    frame.render_widget(Clear, area);

    let border_color = if app.window.is_dragging() { Color::Yellow } else { Color::Gray };
    let window = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .style(Style::default().bg(Color::Black));
    let inner = window.inner(area);
    frame.render_widget(window, area);

    let [title_area, chat_area, input_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(1),
        Constraint::Length(3),
    ])
    .areas(inner);

    // Store areas for mouse hit-testing
    app.panel_area = Some(area);
    app.chat_area = Some(chat_area);
    render_title_bar(app, frame, title_area);

    // Store chat area dimensions for scroll calculations
    app.chat_height = chat_area.height;
    app.chat_width = chat_area.width;

    render_transcript(app, frame, chat_area);
    render_input(app, frame, input_area);
}

fn render_title_bar(app: &mut App, frame: &mut Frame, area: Rect) {
    let zoom_label = if app.window.is_zoomed() { UNZOOM_LABEL } else { ZOOM_LABEL };
    let controls_width = (CLEAR_LABEL.chars().count() + 1 + zoom_label.chars().count()) as u16;

    let [caption_area, controls_area] = Layout::horizontal([
        Constraint::Min(0),
        Constraint::Length(controls_width.min(area.width)),
    ])
    .areas(area);

    // The whole row is the drag handle; the buttons sit on top of it
    app.title_area = Some(area);
    app.clear_button_area = Some(Rect {
        width: (CLEAR_LABEL.chars().count() as u16).min(controls_area.width),
        ..controls_area
    });
    app.zoom_button_area = Some(Rect {
        x: controls_area.x + controls_area.width.saturating_sub(zoom_label.chars().count() as u16),
        width: (zoom_label.chars().count() as u16).min(controls_area.width),
        ..controls_area
    });

    let bar_style = Style::default().bg(Color::Blue).fg(Color::White);
    let caption = Paragraph::new(Line::from(vec![
        Span::styled(" Knowledge Search", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(format!("  session {}", short_session(app.chat.session_id().as_str()))),
    ]))
    .style(bar_style);
    frame.render_widget(caption, caption_area);

    let controls = Paragraph::new(Line::from(vec![
        Span::raw(CLEAR_LABEL),
        Span::raw(" "),
        Span::raw(zoom_label),
    ]))
    .style(bar_style.add_modifier(Modifier::BOLD));
    frame.render_widget(controls, controls_area);
}

fn short_session(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}

fn render_transcript(app: &App, frame: &mut Frame, area: Rect) {
    let messages = app.chat.messages();

    let text = if messages.is_empty() {
        Text::from(Span::styled(
            "Ask a question about your documents...",
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        let mut lines: Vec<Line> = Vec::new();
        for msg in messages {
            lines.extend(message_lines(msg, app.animation_frame));
            lines.push(Line::default());
        }
        Text::from(lines)
    };

    let transcript = Paragraph::new(text)
        .wrap(Wrap { trim: true })
        .scroll((app.chat_scroll, 0));

    frame.render_widget(transcript, area);
}

fn message_lines(msg: &ChatMessage, animation_frame: u8) -> Vec<Line<'static>> {
    let mut lines = Vec::new();

    match msg.role {
        ChatRole::User => {
            lines.push(Line::from(Span::styled(
                "You:",
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            )));
            lines.push(Line::from(msg.content.clone()));
        }
        ChatRole::Assistant => {
            lines.push(Line::from(Span::styled(
                "Assistant:",
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            )));
            match msg.status {
                MessageStatus::Pending => {
                    // Animated ellipsis: cycles through ".", "..", "..."
                    let dots = ".".repeat((animation_frame as usize) + 1);
                    lines.push(Line::from(Span::styled(
                        format!("Thinking{}", dots),
                        Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
                    )));
                }
                MessageStatus::Failed => {
                    for line in msg.content.lines() {
                        lines.push(Line::from(Span::styled(
                            line.to_string(),
                            Style::default().fg(Color::Red),
                        )));
                    }
                }
                MessageStatus::Complete => {
                    for line in msg.content.lines() {
                        lines.push(Line::from(line.to_string()));
                    }
                    for citation in &msg.citations {
                        lines.push(Line::from(Span::styled(
                            citation.display_line(),
                            Style::default().fg(Color::Magenta).add_modifier(Modifier::ITALIC),
                        )));
                    }
                }
            }
        }
    }

    lines
}

fn render_input(app: &App, frame: &mut Frame, area: Rect) {
    let editing = app.input_mode == InputMode::Editing;
    let border_color = if editing { Color::Yellow } else { Color::DarkGray };
    let title = if app.chat.is_pending() { " Ask (waiting for answer) " } else { " Ask " };

    let input_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(title);

    // Calculate visible portion of input with horizontal scrolling
    let inner_width = area.width.saturating_sub(2) as usize;
    let cursor_pos = app.input_cursor;
    let scroll_offset = if inner_width == 0 {
        0
    } else if cursor_pos >= inner_width {
        cursor_pos - inner_width + 1
    } else {
        0
    };

    let visible_text: String = app.input
        .chars()
        .skip(scroll_offset)
        .take(inner_width)
        .collect();

    let input = Paragraph::new(visible_text)
        .style(Style::default().fg(Color::Cyan))
        .block(input_block);
    frame.render_widget(input, area);

    // Show cursor when editing
    if editing && app.history_popup.is_none() {
        let cursor_x = (cursor_pos - scroll_offset) as u16;
        frame.set_cursor_position((area.x + cursor_x + 1, area.y + 1));
    }
}

fn render_history_popup(history: &str, frame: &mut Frame, area: Rect) {
    let popup_width = (area.width * 2 / 3).max(20).min(area.width);
    let popup_height = (area.height * 2 / 3).max(6).min(area.height);
    let popup_area = Rect::new(
        area.x + (area.width - popup_width) / 2,
        area.y + (area.height - popup_height) / 2,
        popup_width,
        popup_height,
    );

    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" Server conversation history (Esc to close) ");

    let popup = Paragraph::new(history.to_string())
        .block(block)
        .wrap(Wrap { trim: false });
    frame.render_widget(popup, popup_area);
}
