use std::fmt;
use std::time::Duration;

use crate::error::AppError;

/// Failures of a scripted browser session.
#[derive(Debug)]
pub enum HarnessError {
    /// The request itself failed (connection refused, bad redirect, unreadable body).
    Http(reqwest::Error),
    /// Binding or running the live server failed.
    Io(std::io::Error),
    /// Setting up application state failed.
    App(AppError),
    /// A waited-for element never appeared.
    Timeout { waiting_for: String, after: Duration },
    /// The current page lacks an element a step needs.
    MissingElement(String),
    /// A step was called with arguments it cannot use, such as a malformed date.
    InvalidInput(String),
    /// The application answered with an error page or an error alert.
    Rejected(String),
}

impl fmt::Display for HarnessError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            HarnessError::Http(e) => write!(f, "HTTP error: {}", e),
            HarnessError::Io(e) => write!(f, "IO error: {}", e),
            HarnessError::App(e) => write!(f, "Application error: {}", e),
            HarnessError::Timeout { waiting_for, after } => {
                write!(f, "Timed out after {:?} waiting for {}", after, waiting_for)
            }
            HarnessError::MissingElement(what) => write!(f, "Missing element: {}", what),
            HarnessError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            HarnessError::Rejected(msg) => write!(f, "Rejected by the application: {}", msg),
        }
    }
}

impl std::error::Error for HarnessError {}

impl From<reqwest::Error> for HarnessError {
    fn from(error: reqwest::Error) -> Self {
        HarnessError::Http(error)
    }
}

impl From<std::io::Error> for HarnessError {
    fn from(error: std::io::Error) -> Self {
        HarnessError::Io(error)
    }
}

impl From<AppError> for HarnessError {
    fn from(error: AppError) -> Self {
        HarnessError::App(error)
    }
}

pub type HarnessResult<T> = Result<T, HarnessError>;
