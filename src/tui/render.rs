use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::session::{Message, MessageKind, SessionView};

/// Render the chat screen
pub fn render_ui(frame: &mut Frame, view: &SessionView) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(0)
        .constraints(
            [
                Constraint::Length(2), // Header
                Constraint::Min(5),    // History
                Constraint::Length(3), // Input
                Constraint::Length(1), // Status bar
            ]
            .as_ref(),
        )
        .split(frame.area());

    render_header(frame, chunks[0], view);
    render_chat(frame, chunks[1], view);
    render_input(frame, chunks[2], view);
    render_status_bar(frame, chunks[3], view);
}

fn render_header(frame: &mut Frame, area: Rect, view: &SessionView) {
    let model = view.current_model.unwrap_or("no model selected");
    let mut spans = vec![
        Span::styled(
            "Dmitry",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Span::raw(" | Model: "),
        Span::styled(
            model,
            Style::default().fg(if view.current_model.is_some() {
                Color::Green
            } else {
                Color::Yellow
            }),
        ),
    ];
    if view.streaming {
        spans.push(Span::raw(" | "));
        spans.push(Span::styled("streaming…", Style::default().fg(Color::Magenta)));
    }

    let header = Paragraph::new(Line::from(spans))
        .block(
            Block::default()
                .borders(Borders::BOTTOM)
                .border_style(Style::default().fg(Color::DarkGray)),
        )
        .alignment(Alignment::Center);

    frame.render_widget(header, area);
}

fn kind_color(kind: MessageKind) -> Color {
    match kind {
        MessageKind::User => Color::Green,
        MessageKind::Assistant => Color::Yellow,
        MessageKind::Info => Color::Cyan,
        MessageKind::Error => Color::Red,
    }
}

/// Lines for one log entry: a `[HH:MM:SS] Label:` heading, then the content
pub fn message_lines(message: &Message) -> Vec<Line<'static>> {
    let mut lines = vec![Line::from(vec![
        Span::styled(
            format!("[{}] ", message.timestamp().format("%H:%M:%S")),
            Style::default().fg(Color::DarkGray),
        ),
        Span::styled(
            format!("{}:", message.kind().label()),
            Style::default()
                .fg(kind_color(message.kind()))
                .add_modifier(Modifier::BOLD),
        ),
    ])];

    for line in message.content().lines() {
        lines.push(Line::from(line.to_string()));
    }
    lines.push(Line::from(""));
    lines
}

/// Rows `lines` occupy when wrapped to `width` columns
pub fn wrapped_height(lines: &[Line], width: u16) -> u16 {
    let width = width.max(1) as usize;
    let rows: usize = lines
        .iter()
        .map(|line| line.width().max(1).div_ceil(width))
        .sum();
    rows.min(u16::MAX as usize) as u16
}

fn render_chat(frame: &mut Frame, area: Rect, view: &SessionView) {
    let mut lines: Vec<Line> = view.messages.iter().flat_map(message_lines).collect();

    if let Some(partial) = view.partial_output {
        lines.push(Line::from(Span::styled(
            "Assistant:",
            Style::default()
                .fg(kind_color(MessageKind::Assistant))
                .add_modifier(Modifier::BOLD),
        )));
        for line in partial.lines() {
            lines.push(Line::from(line.to_string()));
        }
        lines.push(Line::from(Span::styled(
            "▋",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::SLOW_BLINK),
        )));
    }

    if lines.is_empty() {
        lines.push(Line::from(Span::styled(
            "Type a message and press Enter. /help lists commands.",
            Style::default().fg(Color::DarkGray),
        )));
    }

    // Keep the newest lines in view
    let inner_height = area.height.saturating_sub(2);
    let inner_width = area.width.saturating_sub(2);
    let scroll = wrapped_height(&lines, inner_width).saturating_sub(inner_height);

    let paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .title(" Chat ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray)),
        )
        .wrap(Wrap { trim: false })
        .scroll((scroll, 0));

    frame.render_widget(paragraph, area);
}

fn render_input(frame: &mut Frame, area: Rect, view: &SessionView) {
    let (before, under, after) = view.input.split_at_cursor();

    let line = Line::from(vec![
        Span::styled("> ", Style::default().fg(Color::Green)),
        Span::raw(before.to_string()),
        Span::styled(
            under.map(String::from).unwrap_or_else(|| " ".to_string()),
            Style::default().add_modifier(Modifier::REVERSED),
        ),
        Span::raw(after.to_string()),
    ]);

    let title = if view.streaming {
        " Message (waiting for reply) "
    } else {
        " Message "
    };

    let input = Paragraph::new(line)
        .style(Style::default().fg(Color::White))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray))
                .title(title),
        );

    frame.render_widget(input, area);

    let prompt_width = 2 + Span::raw(before).width() as u16;
    let cursor_x = (area.x + 1 + prompt_width).min(area.x + area.width.saturating_sub(2));
    frame.set_cursor_position((cursor_x, area.y + 1));
}

fn render_status_bar(frame: &mut Frame, area: Rect, view: &SessionView) {
    let status = if view.streaming {
        "Generating response..."
    } else {
        "Ready"
    };

    let spans = vec![
        Span::styled(
            " CHAT ",
            Style::default()
                .bg(Color::Green)
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" | "),
        Span::raw(status),
        Span::raw(" | "),
        Span::styled("/help: commands", Style::default().fg(Color::DarkGray)),
        Span::raw(" | "),
        Span::styled("Ctrl+C: quit", Style::default().fg(Color::DarkGray)),
    ];

    let status_bar = Paragraph::new(Line::from(spans))
        .style(Style::default().bg(Color::Black))
        .block(Block::default());

    frame.render_widget(status_bar, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::EditorBuffer;
    use ratatui::{backend::TestBackend, Terminal};

    fn screen_text(terminal: &Terminal<TestBackend>) -> String {
        terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn test_message_lines_have_timestamp_and_label() {
        let message = Message::user("first\nsecond");
        let lines = message_lines(&message);
        assert_eq!(lines.len(), 4);

        let heading: String = lines[0].spans.iter().map(|s| s.content.as_ref()).collect();
        assert!(heading.starts_with('['));
        assert!(heading.ends_with("You:"));
        assert_eq!(lines[1].to_string(), "first");
    }

    #[test]
    fn test_wrapped_height() {
        let lines = vec![Line::from("abcdef"), Line::from(""), Line::from("abc")];
        assert_eq!(wrapped_height(&lines, 3), 4);
        assert_eq!(wrapped_height(&lines, 10), 3);
        assert_eq!(wrapped_height(&lines, 0), 10);
    }

    #[test]
    fn test_render_shows_model_history_and_partial() {
        let messages = vec![Message::user("hello"), Message::assistant("hi there")];
        let view = SessionView {
            messages: &messages,
            partial_output: Some("still typ"),
            input: EditorBuffer { text: "next".to_string(), cursor: 4 },
            current_model: Some("llama3.2:latest"),
            streaming: true,
        };

        let mut terminal = Terminal::new(TestBackend::new(80, 20)).unwrap();
        terminal.draw(|f| render_ui(f, &view)).unwrap();

        let text = screen_text(&terminal);
        assert!(text.contains("llama3.2:latest"));
        assert!(text.contains("hi there"));
        assert!(text.contains("still typ"));
        assert!(text.contains("> next"));
        assert!(text.contains("Generating response..."));
    }

    #[test]
    fn test_render_without_model() {
        let view = SessionView {
            messages: &[],
            partial_output: None,
            input: EditorBuffer::default(),
            current_model: None,
            streaming: false,
        };

        let mut terminal = Terminal::new(TestBackend::new(80, 12)).unwrap();
        terminal.draw(|f| render_ui(f, &view)).unwrap();
        assert!(screen_text(&terminal).contains("no model selected"));
    }
}
