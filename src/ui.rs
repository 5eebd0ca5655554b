use crate::{
    api::TaskApi,
    board_view::{BoardView, Card, CardAction, ColumnEntry},
    kanban_board::{BoardController, Prompter},
    status::Status,
};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    terminal::{disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame, Terminal,
};
use std::io;
use tokio::runtime::Runtime;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Browse,
    Editing,
}

#[derive(Debug, Default)]
pub struct UiState {
    pub selected_status: usize,
    pub selected_task: usize,
    pub mode: Mode,
}

impl UiState {
    fn selected_stage(&self) -> Status {
        Status::ALL[self.selected_status]
    }

    fn selected_card<'a>(&self, view: &'a BoardView) -> Option<&'a Card> {
        view.column(self.selected_stage())?
            .cards()
            .nth(self.selected_task)
    }

    /// Keeps the cursor on an existing card after the board was rebuilt.
    pub fn clamp(&mut self, view: &BoardView) {
        let cards = view
            .column(self.selected_stage())
            .map_or(0, |column| column.cards().count());
        self.selected_task = self.selected_task.min(cards.saturating_sub(1));
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Quit,
    Reload,
    Submit,
    Card(u64, CardAction),
}

pub fn handle_key(ui: &mut UiState, view: &mut BoardView, code: KeyCode) -> Option<Command> {
    if ui.mode == Mode::Editing {
        let input = view.input.as_mut()?;
        match code {
            KeyCode::Esc => ui.mode = Mode::Browse,
            KeyCode::Enter if view.has_submit => return Some(Command::Submit),
            KeyCode::Backspace => {
                input.value.pop();
            }
            KeyCode::Char(c) => input.value.push(c),
            _ => {}
        }
        return None;
    }

    match code {
        KeyCode::Char('q') => Some(Command::Quit),
        KeyCode::Char('r') => Some(Command::Reload),
        KeyCode::Char('s') => card_command(ui, view, CardAction::Start),
        KeyCode::Char('c') => card_command(ui, view, CardAction::Complete),
        KeyCode::Char('d') => card_command(ui, view, CardAction::Delete),
        // Move to the next stage, whichever that is for this card
        KeyCode::Enter => card_command(ui, view, CardAction::Start)
            .or_else(|| card_command(ui, view, CardAction::Complete)),
        KeyCode::Char('a') => {
            if view.input.is_some() {
                ui.mode = Mode::Editing;
            }
            None
        }
        KeyCode::Left => {
            if ui.selected_status > 0 {
                ui.selected_status -= 1;
                ui.selected_task = 0;
            }
            None
        }
        KeyCode::Right => {
            if ui.selected_status < Status::ALL.len() - 1 {
                ui.selected_status += 1;
                ui.selected_task = 0;
            }
            None
        }
        KeyCode::Up => {
            ui.selected_task = ui.selected_task.saturating_sub(1);
            None
        }
        KeyCode::Down => {
            ui.selected_task += 1;
            ui.clamp(view);
            None
        }
        _ => None,
    }
}

fn card_command(ui: &UiState, view: &BoardView, action: CardAction) -> Option<Command> {
    ui.selected_card(view)
        .filter(|card| card.exposes(action))
        .map(|card| Command::Card(card.id, action))
}

pub fn draw(f: &mut Frame, view: &BoardView, ui: &UiState) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![
            Constraint::Length(3),
            Constraint::Min(5),
            Constraint::Length(1),
        ])
        .split(f.area());

    draw_input(f, rows[0], view, ui);

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(vec![
            Constraint::Percentage(33),
            Constraint::Percentage(33),
            Constraint::Percentage(34),
        ])
        .split(rows[1]);

    for stage in Status::ALL {
        let i = stage.index();
        let Some(column) = view.column(stage) else {
            continue;
        };

        let items: Vec<ListItem> = column.entries.iter().map(entry_item).collect();
        let title = match view.count(stage) {
            Some(count) => format!("{} ({count})", stage.backend_label()),
            None => stage.backend_label().to_string(),
        };
        let focused = ui.selected_status == i && ui.mode == Mode::Browse;

        let list = List::new(items)
            .block(
                Block::default()
                    .title(title)
                    .borders(Borders::ALL)
                    .border_style(if focused {
                        Style::default().fg(Color::Cyan)
                    } else {
                        Style::default()
                    }),
            )
            .highlight_style(Style::default().add_modifier(Modifier::BOLD | Modifier::REVERSED));

        let mut state = ListState::default();
        if focused && column.cards().next().is_some() {
            state.select(Some(ui.selected_task));
        }
        f.render_stateful_widget(list, chunks[i], &mut state);
    }

    f.render_widget(status_line(view), rows[2]);
}

fn draw_input(f: &mut Frame, area: Rect, view: &BoardView, ui: &UiState) {
    let Some(input) = view.input.as_ref() else {
        return;
    };
    let editing = ui.mode == Mode::Editing;
    let hint = if !editing {
        "New task (a)"
    } else if view.has_submit {
        "New task (Enter to add, Esc to cancel)"
    } else {
        "New task (Esc to cancel)"
    };
    let paragraph = Paragraph::new(input.value.as_str()).block(
        Block::default()
            .title(hint)
            .borders(Borders::ALL)
            .border_style(if editing {
                Style::default().fg(Color::Cyan)
            } else {
                Style::default()
            }),
    );
    f.render_widget(paragraph, area);
}

fn entry_item(entry: &ColumnEntry) -> ListItem<'_> {
    match entry {
        ColumnEntry::EmptyState(message) => ListItem::new(Line::from(Span::styled(
            *message,
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC),
        ))),
        ColumnEntry::Card(card) => {
            let mut lines = vec![Line::from(vec![
                Span::raw(format!("[#{}] ", card.id)),
                Span::styled(&card.title, Style::default().fg(status_color(card.status))),
            ])];
            if let Some(description) = &card.description {
                lines.push(Line::from(Span::styled(
                    format!("  {description}"),
                    Style::default().fg(Color::Gray),
                )));
            }
            if let Some(assignee) = &card.assignee {
                lines.push(Line::from(Span::raw(format!("  @{assignee}"))));
            }
            let actions: Vec<&str> = card.actions.iter().map(|a| a.label()).collect();
            lines.push(Line::from(Span::styled(
                format!("  {}", actions.join("  ")),
                Style::default().fg(Color::DarkGray),
            )));
            ListItem::new(lines)
        }
    }
}

fn status_color(status: Status) -> Color {
    match status {
        Status::Todo => Color::White,
        Status::InProgress => Color::Yellow,
        Status::Done => Color::Green,
    }
}

fn status_line(view: &BoardView) -> Paragraph<'_> {
    if let Some(message) = &view.diagnostic {
        return Paragraph::new(message.as_str()).style(Style::default().fg(Color::Red));
    }
    let synced = view.last_synced.map_or_else(
        || "never synced".to_string(),
        |at| format!("synced {}", at.format("%H:%M:%S")),
    );
    Paragraph::new(format!(
        "{synced} | ←→↑↓ select  s start  c complete  d delete  a add  r reload  q quit"
    ))
}

/// Runs the key loop. Each command is awaited to completion on `runtime`
/// before the next key is read.
pub fn run_app<B: Backend, A: TaskApi, P: Prompter>(
    terminal: &mut Terminal<B>,
    runtime: &Runtime,
    controller: &mut BoardController<A, P>,
) -> io::Result<()> {
    let mut ui = UiState::default();
    loop {
        terminal.draw(|f| draw(f, controller.view(), &ui))?;

        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }
        let Some(command) = handle_key(&mut ui, controller.view_mut(), key.code) else {
            continue;
        };

        let result = match command {
            Command::Quit => return Ok(()),
            Command::Reload => runtime.block_on(controller.load()),
            Command::Submit => {
                let result = runtime.block_on(controller.submit());
                if result.is_ok() {
                    ui.mode = Mode::Browse;
                }
                terminal.clear()?;
                result
            }
            Command::Card(id, action) => {
                let result = runtime.block_on(controller.perform(id, action));
                if action == CardAction::Delete {
                    terminal.clear()?;
                }
                result
            }
        };
        if let Err(err) = result {
            debug!(error = %err, "command did not complete");
        }
        ui.clamp(controller.view());
    }
}

/// Prompts on the plain terminal, outside raw mode.
pub struct TerminalPrompter;

impl Prompter for TerminalPrompter {
    fn confirm(&mut self, message: &str) -> bool {
        prompt(&format!("{message} [y/N]"))
            .is_some_and(|answer| matches!(answer.to_ascii_lowercase().as_str(), "y" | "yes"))
    }

    fn alert(&mut self, message: &str) {
        prompt(&format!("{message} (press Enter)"));
    }
}

fn prompt(message: &str) -> Option<String> {
    disable_raw_mode().ok();
    println!("{}", message);
    let mut input = String::new();
    if io::stdin().read_line(&mut input).is_ok() {
        enable_raw_mode().ok();
        Some(input.trim().to_string())
    } else {
        enable_raw_mode().ok();
        None
    }
}
