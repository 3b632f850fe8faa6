#![warn(clippy::all, missing_docs)]

//! Core domain logic for the dayboard terminal app.
//!
//! This crate hosts the relational board model (resources, destination
//! cards, allocation counts), the drag-session state machine with its
//! pointer hit testing, the badge reconciler, the HTTP feed client, the
//! goal catalog, and configuration handling used by the terminal UI and
//! any future frontends.

pub mod board;
pub mod client;
pub mod config;
pub mod error;
pub mod goals;
pub mod models;

pub use board::{
    Board, BoardBadges, BoardPhase, CardId, DestinationCard, DragPayload, DragSession,
    DropOutcome, LoadOutcome, RowBand,
};
pub use client::DayClient;
pub use config::AppConfig;
pub use error::LoadError;
pub use goals::GoalCatalog;
pub use models::{BlockedResource, DayRoster, Goal, Resource};
