#![doc = "The `todo_lists` library crate."]
#![doc = ""]
#![doc = "This crate contains the domain models and business rules (overdue tasks, completion"]
#![doc = "timestamps, comment snippets), authentication, routing, HTML views and error handling"]
#![doc = "of the group to-do list service, plus the `harness` used to drive it end to end."]
#![doc = "It is used by the main binary (`main.rs`) to construct and run the application."]

pub mod auth;
pub mod clock;
pub mod config;
pub mod db;
pub mod error;
pub mod flash;
pub mod harness;
pub mod models;
pub mod routes;
pub mod seed;
pub mod state;
pub mod views;

pub use crate::error::AppError;
pub use crate::state::AppState;
