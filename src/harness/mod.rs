//! Scripted end-to-end sessions.
//!
//! A [`LiveServer`] serves the application on a local port and a [`Browser`] drives it the
//! way a person would: it follows links, submits forms and reads the resulting pages.
//! Every step returns the text a user would check (headings, alerts, footers).

pub mod browser;
pub mod config;
pub mod date_entry;
pub mod error;
pub mod page;
pub mod server;

pub use browser::Browser;
pub use config::HarnessConfig;
pub use date_entry::{Combined, DateEntry, DateEntryStyle, Segmented};
pub use error::{HarnessError, HarnessResult};
pub use page::{Element, Page};
pub use server::LiveServer;
