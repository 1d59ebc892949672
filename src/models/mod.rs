pub mod comment;
pub mod list;
pub mod task;
pub mod user;

pub use comment::{snippet, Comment, CommentForm, SNIPPET_LENGTH};
pub use list::{slugify, ListForm, ListSummary, TaskList};
pub use task::{is_overdue, NewTask, Task, TaskForm};
pub use user::{Group, Role, User, UserInput};

use crate::error::AppError;

/// Collapses a lookup result that must match exactly one record.
///
/// Zero matches is `NotFound`; several is `Conflict`, never an arbitrary pick.
pub(crate) fn exactly_one<T>(mut rows: Vec<T>, what: &str) -> Result<T, AppError> {
    match rows.len() {
        0 => Err(AppError::NotFound(format!("{} not found", what))),
        1 => Ok(rows.remove(0)),
        n => Err(AppError::Conflict(format!(
            "Expected one {}, found {}",
            what.to_lowercase(),
            n
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exactly_one() {
        assert_eq!(exactly_one(vec![7], "Task").unwrap(), 7);
        assert!(matches!(
            exactly_one(Vec::<i32>::new(), "Task"),
            Err(AppError::NotFound(_))
        ));
        match exactly_one(vec![1, 2], "Task") {
            Err(AppError::Conflict(msg)) => assert_eq!(msg, "Expected one task, found 2"),
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
