use anyhow::Result;
use crossterm::event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use futures::StreamExt;
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
    Frame,
};

use super::terminal::TerminalSession;
use crate::ollama::ModelDescriptor;

/// How the selector screen was left
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectorOutcome {
    Selected(String),
    /// Continue into the chat without a model
    Skipped,
    Quit,
}

/// Startup screen listing installed models, or explaining why there are none
pub struct ModelSelector {
    models: Vec<ModelDescriptor>,
    notice: Vec<String>,
    selected: usize,
}

impl ModelSelector {
    pub fn new(models: Vec<ModelDescriptor>) -> Self {
        Self {
            models,
            notice: Vec::new(),
            selected: 0,
        }
    }

    /// A selector with nothing to pick, only an explanation
    pub fn with_notice(notice: Vec<String>) -> Self {
        Self {
            models: Vec::new(),
            notice,
            selected: 0,
        }
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    /// Apply a key press; `Some` once the screen is done
    pub fn handle_key(&mut self, key: KeyEvent) -> Option<SelectorOutcome> {
        if key.kind == KeyEventKind::Release {
            return None;
        }
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Some(SelectorOutcome::Quit);
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => Some(SelectorOutcome::Skipped),
            KeyCode::Enter => Some(match self.models.get(self.selected) {
                Some(model) => SelectorOutcome::Selected(model.full_name.clone()),
                None => SelectorOutcome::Skipped,
            }),
            KeyCode::Down | KeyCode::Char('j') => {
                if self.selected + 1 < self.models.len() {
                    self.selected += 1;
                }
                None
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.selected = self.selected.saturating_sub(1);
                None
            }
            KeyCode::Home => {
                self.selected = 0;
                None
            }
            KeyCode::End => {
                self.selected = self.models.len().saturating_sub(1);
                None
            }
            _ => None,
        }
    }

    /// Show the selector until the user picks, skips or quits
    pub async fn run(mut self, session: &mut TerminalSession) -> Result<SelectorOutcome> {
        let mut events = EventStream::new();
        loop {
            session.terminal().draw(|f| render_selector(f, &self))?;

            match events.next().await {
                Some(Ok(Event::Key(key))) => {
                    if let Some(outcome) = self.handle_key(key) {
                        return Ok(outcome);
                    }
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => return Err(e.into()),
                None => return Ok(SelectorOutcome::Quit),
            }
        }
    }
}

fn render_selector(f: &mut Frame, selector: &ModelSelector) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(5),
            Constraint::Length(3),
        ])
        .split(f.area());

    let title = Paragraph::new("Select a model to chat with")
        .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        .block(Block::default().borders(Borders::ALL).title(" Dmitry - Models "));
    f.render_widget(title, chunks[0]);

    if selector.models.is_empty() {
        let lines: Vec<Line> = selector
            .notice
            .iter()
            .map(|l| Line::from(Span::styled(l.clone(), Style::default().fg(Color::Yellow))))
            .collect();
        let notice = Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .block(Block::default().borders(Borders::ALL).title(" No models "));
        f.render_widget(notice, chunks[1]);
    } else {
        let items: Vec<ListItem> = selector
            .models
            .iter()
            .enumerate()
            .map(|(i, model)| {
                let style = if i == selector.selected {
                    Style::default()
                        .bg(Color::Blue)
                        .fg(Color::White)
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default()
                };

                ListItem::new(vec![
                    Line::from(Span::styled(model.full_name.clone(), style)),
                    Line::from(Span::styled(
                        format!("  {} | modified {}", model.size, model.modified),
                        style.fg(Color::Gray),
                    )),
                ])
            })
            .collect();

        let list = List::new(items).block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Installed Models "),
        );
        f.render_widget(list, chunks[1]);
    }

    let help = vec![Line::from(vec![
        Span::raw("Up/k: Up  Down/j: Down  "),
        Span::styled("Enter", Style::default().fg(Color::Green)),
        Span::raw(": Select  "),
        Span::styled("Esc", Style::default().fg(Color::Yellow)),
        Span::raw(": Skip  "),
        Span::styled("Ctrl+C", Style::default().fg(Color::Red)),
        Span::raw(": Quit"),
    ])];
    let help_widget = Paragraph::new(help)
        .style(Style::default().fg(Color::DarkGray))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(help_widget, chunks[2]);
}
