//! Terminal kanban board backed by a remote task API.
//!
//! The board is always rebuilt from a fresh `GET /tasks` snapshot; see
//! [`board_view::reconcile`]. [`kanban_board::BoardController`] is the only
//! thing that writes to it.

pub mod api;
pub mod board_view;
pub mod config;
pub mod kanban_board;
pub mod status;
pub mod task;
pub mod ui;
