//! Display tree for the board and the full-rebuild render pass.
//!
//! `BoardView` is what the terminal draws. Every slot is optional: a board
//! assembled without, say, count indicators still renders, the missing
//! elements are just skipped.

use chrono::{DateTime, Local};
use tracing::debug;

use crate::{status::Status, task::Task};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardAction {
    Start,
    Complete,
    Delete,
}

impl CardAction {
    pub fn label(self) -> &'static str {
        match self {
            CardAction::Start => "▶ Start",
            CardAction::Complete => "✓ Complete",
            CardAction::Delete => "✕ Delete",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Card {
    pub id: u64,
    pub title: String,
    pub description: Option<String>,
    pub assignee: Option<String>,
    pub status: Status,
    pub actions: Vec<CardAction>,
}

impl Card {
    pub fn for_task(task: &Task) -> Self {
        let mut actions = Vec::with_capacity(2);
        match task.status {
            Status::Todo => actions.push(CardAction::Start),
            Status::InProgress => actions.push(CardAction::Complete),
            Status::Done => {}
        }
        actions.push(CardAction::Delete);

        Self {
            id: task.id,
            title: task.title.clone(),
            description: task.description.clone(),
            assignee: task.assignee.clone(),
            status: task.status,
            actions,
        }
    }

    /// Internal status key, the card's display class.
    pub fn class(&self) -> &'static str {
        self.status.internal_key()
    }

    pub fn exposes(&self, action: CardAction) -> bool {
        self.actions.contains(&action)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnEntry {
    Card(Card),
    EmptyState(&'static str),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Column {
    pub entries: Vec<ColumnEntry>,
}

impl Column {
    pub fn cards(&self) -> impl Iterator<Item = &Card> {
        self.entries.iter().filter_map(|entry| match entry {
            ColumnEntry::Card(card) => Some(card),
            ColumnEntry::EmptyState(_) => None,
        })
    }

    pub fn empty_state(&self) -> Option<&'static str> {
        self.entries.iter().find_map(|entry| match entry {
            ColumnEntry::EmptyState(message) => Some(*message),
            ColumnEntry::Card(_) => None,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputField {
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoardView {
    columns: [Option<Column>; 3],
    /// `None` where the count indicator element is absent.
    counts: [Option<usize>; 3],
    pub input: Option<InputField>,
    pub has_submit: bool,
    pub diagnostic: Option<String>,
    pub last_synced: Option<DateTime<Local>>,
}

impl BoardView {
    /// A board with every element present.
    pub fn full() -> Self {
        Self {
            columns: [
                Some(Column::default()),
                Some(Column::default()),
                Some(Column::default()),
            ],
            counts: [Some(0); 3],
            input: Some(InputField::default()),
            has_submit: true,
            diagnostic: None,
            last_synced: None,
        }
    }

    pub fn without_column(mut self, stage: Status) -> Self {
        self.columns[stage.index()] = None;
        self
    }

    pub fn without_count(mut self, stage: Status) -> Self {
        self.counts[stage.index()] = None;
        self
    }

    pub fn without_input(mut self) -> Self {
        self.input = None;
        self.has_submit = false;
        self
    }

    pub fn column(&self, stage: Status) -> Option<&Column> {
        self.columns[stage.index()].as_ref()
    }

    pub fn count(&self, stage: Status) -> Option<usize> {
        self.counts[stage.index()]
    }

    pub fn input_value(&self) -> &str {
        self.input.as_ref().map_or("", |input| input.value.as_str())
    }

    pub fn set_input(&mut self, value: impl Into<String>) {
        if let Some(input) = self.input.as_mut() {
            input.value = value.into();
        }
    }

    pub fn clear_input(&mut self) {
        if let Some(input) = self.input.as_mut() {
            input.value.clear();
        }
    }

    pub fn show_error(&mut self, message: impl Into<String>) {
        self.diagnostic = Some(format!("⚠️ {}", message.into()));
    }

    fn clear_columns(&mut self) {
        for column in self.columns.iter_mut().flatten() {
            column.entries.clear();
        }
    }

    fn push(&mut self, stage: Status, entry: ColumnEntry) {
        if let Some(column) = self.columns[stage.index()].as_mut() {
            column.entries.push(entry);
        }
    }

    fn set_count(&mut self, stage: Status, count: usize) {
        if let Some(slot) = self.counts[stage.index()].as_mut() {
            *slot = count;
        }
    }
}

/// Throws away everything on the board and rebuilds it from `tasks`.
pub fn reconcile(view: &mut BoardView, tasks: &[Task]) {
    view.clear_columns();
    view.diagnostic = None;

    let mut counts = [0usize; 3];
    for task in tasks {
        debug!(id = task.id, status = task.status.internal_key(), "rendering card");
        view.push(task.status, ColumnEntry::Card(Card::for_task(task)));
        counts[task.status.index()] += 1;
    }

    for stage in Status::ALL {
        let count = counts[stage.index()];
        view.set_count(stage, count);
        if count == 0 {
            view.push(stage, ColumnEntry::EmptyState(stage.empty_message()));
        }
    }
}
