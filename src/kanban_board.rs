use chrono::Local;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::{
    api::{ApiError, TaskApi},
    board_view::{reconcile, BoardView, CardAction},
    status::Status,
    task::NewTask,
};

pub const EMPTY_TITLE_ALERT: &str = "Please enter a task title";
pub const DELETE_CONFIRMATION: &str = "Are you sure you want to delete this task?";

/// Blocking interactive prompts.
pub trait Prompter {
    fn confirm(&mut self, message: &str) -> bool;
    fn alert(&mut self, message: &str);
}

#[derive(Debug, Error)]
pub enum BoardError {
    #[error("task title must not be empty")]
    EmptyTitle,
    #[error("deletion of task {0} was not confirmed")]
    NotConfirmed(u64),
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Sole writer of the board. Every successful mutation is followed by a full
/// reload; nothing is ever patched in place.
pub struct BoardController<A, P> {
    api: A,
    prompter: P,
    view: BoardView,
    backend_url: String,
}

impl<A: TaskApi, P: Prompter> BoardController<A, P> {
    pub fn new(api: A, prompter: P, view: BoardView, backend_url: impl Into<String>) -> Self {
        Self {
            api,
            prompter,
            view,
            backend_url: backend_url.into(),
        }
    }

    pub fn view(&self) -> &BoardView {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut BoardView {
        &mut self.view
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn prompter(&self) -> &P {
        &self.prompter
    }

    pub async fn load(&mut self) -> Result<(), BoardError> {
        info!("fetching tasks");
        match self.api.list_tasks().await {
            Ok(tasks) => {
                info!(count = tasks.len(), "tasks fetched");
                reconcile(&mut self.view, &tasks);
                self.view.last_synced = Some(Local::now());
                Ok(())
            }
            Err(err) => {
                error!(error = %err, "failed to fetch tasks");
                self.view.show_error(format!(
                    "Failed to load tasks. Make sure the backend is running on {}",
                    self.backend_url
                ));
                Err(err.into())
            }
        }
    }

    /// Submits whatever is currently in the input field.
    pub async fn submit(&mut self) -> Result<(), BoardError> {
        let title = self.view.input_value().to_string();
        self.create(&title).await
    }

    pub async fn create(&mut self, title: &str) -> Result<(), BoardError> {
        let title = title.trim();
        if title.is_empty() {
            self.prompter.alert(EMPTY_TITLE_ALERT);
            return Err(BoardError::EmptyTitle);
        }

        info!(title, "creating task");
        if let Err(err) = self.api.create_task(&NewTask::titled(title)).await {
            return Err(self.mutation_failed("create", err));
        }
        self.view.clear_input();
        self.load().await
    }

    /// Moves a task to `target`. Transition legality is the caller's business;
    /// cards only ever offer the next stage.
    pub async fn advance(&mut self, id: u64, target: Status) -> Result<(), BoardError> {
        info!(id, status = target.backend_label(), "advancing task");
        if let Err(err) = self.api.update_status(id, target).await {
            return Err(self.mutation_failed("update", err));
        }
        self.load().await
    }

    pub async fn delete(&mut self, id: u64) -> Result<(), BoardError> {
        if !self.prompter.confirm(DELETE_CONFIRMATION) {
            info!(id, "delete cancelled");
            return Err(BoardError::NotConfirmed(id));
        }

        info!(id, "deleting task");
        if let Err(err) = self.api.delete_task(id).await {
            return Err(self.mutation_failed("delete", err));
        }
        self.load().await
    }

    pub async fn perform(&mut self, id: u64, action: CardAction) -> Result<(), BoardError> {
        match action {
            CardAction::Start => self.advance(id, Status::InProgress).await,
            CardAction::Complete => self.advance(id, Status::Done).await,
            CardAction::Delete => self.delete(id).await,
        }
    }

    // Rejections on mutations stay in the log; only transport trouble reaches the banner.
    fn mutation_failed(&mut self, action: &str, err: ApiError) -> BoardError {
        if err.is_rejection() {
            warn!(action, error = %err, "server rejected task mutation");
        } else {
            error!(action, error = %err, "task mutation failed");
            self.view.show_error(format!(
                "Could not {action} task. Make sure the backend is running on {}",
                self.backend_url
            ));
        }
        err.into()
    }
}

#[cfg(test)]
#[path = "tests/kanban_board_tests.rs"]
mod tests;
