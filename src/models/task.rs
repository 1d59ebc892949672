use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use uuid::Uuid;
use validator::Validate;

use crate::clock::{local_date, Clock};
use crate::error::AppError;
use crate::models::exactly_one;

const SELECT_TASK: &str = "SELECT t.id, t.task_list_id, t.title, t.note, t.due_date, t.priority, \
     t.completed, t.completed_date, t.created_by, u.username AS created_by_username, t.created_date \
     FROM tasks t JOIN users u ON u.id = t.created_by";

/// True when `due_date` lies strictly before `today`. A task due today is not overdue yet.
pub fn is_overdue(due_date: Option<NaiveDate>, today: NaiveDate) -> bool {
    matches!(due_date, Some(due) if due < today)
}

/// A single to-do item within a list.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Task {
    pub id: Uuid,
    pub task_list_id: Uuid,
    pub title: String,
    pub note: Option<String>,
    pub due_date: Option<NaiveDate>,
    /// Lower values sort first.
    pub priority: i64,
    pub completed: bool,
    /// Set by [`Task::save`] when the task is saved completed; cleared when it is reopened.
    pub completed_date: Option<DateTime<Utc>>,
    pub created_by: i64,
    pub created_by_username: String,
    pub created_date: DateTime<Utc>,
}

/// Values for a task that has not been stored yet.
#[derive(Debug, Clone)]
pub struct NewTask {
    pub task_list_id: Uuid,
    pub title: String,
    pub note: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub priority: i64,
    pub created_by: i64,
}

/// Fields posted by the add-task form.
///
/// The due date arrives either as one `due_date` value (`dd-mm-yyyy`, or `yyyy-mm-dd` from
/// a date picker) or as three separate `due_date_day`, `due_date_month` and
/// `due_date_year` fields.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct TaskForm {
    #[validate(length(min = 1, max = 140))]
    pub title: String,
    #[serde(default)]
    #[validate(length(max = 2000))]
    pub note: String,
    #[serde(default)]
    pub due_date: String,
    #[serde(default)]
    pub due_date_day: String,
    #[serde(default)]
    pub due_date_month: String,
    #[serde(default)]
    pub due_date_year: String,
    #[serde(default)]
    pub priority: String,
}

impl TaskForm {
    pub fn parsed_due_date(&self) -> Result<Option<NaiveDate>, AppError> {
        let combined = self.due_date.trim();
        if !combined.is_empty() {
            return NaiveDate::parse_from_str(combined, "%d-%m-%Y")
                .or_else(|_| NaiveDate::parse_from_str(combined, "%Y-%m-%d"))
                .map(Some)
                .map_err(|_| invalid_date(combined));
        }

        let parts = [
            self.due_date_day.trim(),
            self.due_date_month.trim(),
            self.due_date_year.trim(),
        ];
        if parts.iter().all(|part| part.is_empty()) {
            return Ok(None);
        }
        let joined = parts.join("-");
        let [day, month, year] = parts.map(|part| part.parse::<u32>().ok());
        match (day, month, year) {
            (Some(day), Some(month), Some(year)) => {
                NaiveDate::from_ymd_opt(year as i32, month, day)
                    .map(Some)
                    .ok_or_else(|| invalid_date(&joined))
            }
            _ => Err(invalid_date(&joined)),
        }
    }

    pub fn parsed_priority(&self) -> Result<i64, AppError> {
        let raw = self.priority.trim();
        if raw.is_empty() {
            return Ok(0);
        }
        raw.parse()
            .map_err(|_| AppError::BadRequest(format!("Priority \"{}\" is not a number", raw)))
    }

    /// Validates the form with surrounding whitespace removed, so a blank title is rejected.
    pub fn into_new_task(mut self, task_list_id: Uuid, created_by: i64) -> Result<NewTask, AppError> {
        self.title = self.title.trim().to_string();
        self.validate()?;
        let due_date = self.parsed_due_date()?;
        let priority = self.parsed_priority()?;
        let note = self.note.trim();
        Ok(NewTask {
            task_list_id,
            title: self.title,
            note: (!note.is_empty()).then(|| note.to_string()),
            due_date,
            priority,
            created_by,
        })
    }
}

fn invalid_date(raw: &str) -> AppError {
    AppError::BadRequest(format!(
        "\"{}\" is not a valid date. Enter the due date as day-month-year.",
        raw
    ))
}

impl Task {
    pub fn url(&self) -> String {
        format!("/task/{}/", self.id)
    }

    pub fn toggle_url(&self) -> String {
        format!("/toggle_done/{}/", self.id)
    }

    pub fn delete_url(&self) -> String {
        format!("/delete_task/{}/", self.id)
    }

    /// Whether the due date has passed, judged against the clock's current date on every call.
    pub fn overdue_status(&self, clock: &dyn Clock) -> bool {
        is_overdue(self.due_date, clock.today())
    }

    /// Local calendar date of completion, if completed.
    pub fn completed_on(&self) -> Option<NaiveDate> {
        self.completed_date.map(local_date)
    }

    pub fn toggle_completed(&mut self) {
        self.completed = !self.completed;
    }

    /// Brings `completed_date` in line with `completed` as of `now`.
    pub fn apply_completion_stamp(&mut self, now: DateTime<Utc>) {
        match (self.completed, self.completed_date) {
            (true, None) => self.completed_date = Some(now),
            (true, Some(_)) => {}
            (false, _) => self.completed_date = None,
        }
    }

    pub async fn create(
        pool: &SqlitePool,
        clock: &dyn Clock,
        new_task: NewTask,
    ) -> Result<Task, AppError> {
        let id = Uuid::new_v4();
        sqlx::query(
            "INSERT INTO tasks (id, task_list_id, title, note, due_date, priority, completed, created_by, created_date)
             VALUES (?, ?, ?, ?, ?, ?, 0, ?, ?)",
        )
        .bind(id)
        .bind(new_task.task_list_id)
        .bind(&new_task.title)
        .bind(&new_task.note)
        .bind(new_task.due_date)
        .bind(new_task.priority)
        .bind(new_task.created_by)
        .bind(clock.now())
        .execute(pool)
        .await?;

        Self::find(pool, id).await
    }

    pub async fn find(pool: &SqlitePool, id: Uuid) -> Result<Task, AppError> {
        sqlx::query_as::<_, Task>(&format!("{} WHERE t.id = ?", SELECT_TASK))
            .bind(id)
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Task not found".into()))
    }

    /// The one task titled `title`; several matches are an error.
    pub async fn get_by_title(pool: &SqlitePool, title: &str) -> Result<Task, AppError> {
        let tasks = sqlx::query_as::<_, Task>(&format!("{} WHERE t.title = ?", SELECT_TASK))
            .bind(title)
            .fetch_all(pool)
            .await?;
        exactly_one(tasks, "Task")
    }

    /// Tasks of a list in the given completion state. Incomplete tasks come in ascending
    /// `priority` order, completed ones most recently completed first.
    pub async fn for_list(
        pool: &SqlitePool,
        task_list_id: Uuid,
        completed: bool,
    ) -> Result<Vec<Task>, AppError> {
        let order = if completed {
            "t.completed_date DESC"
        } else {
            "t.priority, t.created_date"
        };
        let sql = format!(
            "{} WHERE t.task_list_id = ? AND t.completed = ? ORDER BY {}",
            SELECT_TASK, order
        );
        let tasks = sqlx::query_as::<_, Task>(&sql)
            .bind(task_list_id)
            .bind(completed)
            .fetch_all(pool)
            .await?;
        Ok(tasks)
    }

    /// Persists the editable fields, stamping or clearing the completion date first.
    pub async fn save(&mut self, pool: &SqlitePool, clock: &dyn Clock) -> Result<(), AppError> {
        self.apply_completion_stamp(clock.now());

        let result = sqlx::query(
            "UPDATE tasks SET title = ?, note = ?, due_date = ?, priority = ?, completed = ?, completed_date = ?
             WHERE id = ?",
        )
        .bind(&self.title)
        .bind(&self.note)
        .bind(self.due_date)
        .bind(self.priority)
        .bind(self.completed)
        .bind(self.completed_date)
        .bind(self.id)
        .execute(pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Task not found".into()));
        }
        Ok(())
    }

    /// Deletes the task along with its comments.
    pub async fn delete(self, pool: &SqlitePool) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = ?")
            .bind(self.id)
            .execute(pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Task not found".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use chrono::{Duration, TimeZone};

    fn sample_task(due_date: Option<NaiveDate>) -> Task {
        Task {
            id: Uuid::new_v4(),
            task_list_id: Uuid::new_v4(),
            title: "Test task".into(),
            note: None,
            due_date,
            priority: 1,
            completed: false,
            completed_date: None,
            created_by: 1,
            created_by_username: "testUser1".into(),
            created_date: Utc::now(),
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_is_overdue_is_strict() {
        let today = date(2018, 5, 18);
        assert!(is_overdue(Some(date(2000, 12, 3)), today));
        assert!(is_overdue(Some(date(2018, 5, 17)), today));
        assert!(!is_overdue(Some(today), today));
        assert!(!is_overdue(Some(date(9999, 12, 3)), today));
        assert!(!is_overdue(None, today));
    }

    #[test]
    fn test_overdue_status_follows_the_clock() {
        let clock = FixedClock::new(Utc.with_ymd_and_hms(2018, 5, 18, 12, 0, 0).unwrap());
        let due = clock.today() + Duration::days(1);
        let task = sample_task(Some(due));
        assert!(!task.overdue_status(&clock));

        clock.advance(Duration::days(2));
        assert!(task.overdue_status(&clock));
    }

    #[test]
    fn test_completion_stamp_transitions() {
        let first = Utc.with_ymd_and_hms(2018, 5, 18, 9, 0, 0).unwrap();
        let later = first + Duration::days(3);
        let mut task = sample_task(None);

        task.apply_completion_stamp(first);
        assert_eq!(task.completed_date, None);

        task.toggle_completed();
        task.apply_completion_stamp(first);
        assert_eq!(task.completed_date, Some(first));

        // Saving again keeps the original completion instant.
        task.apply_completion_stamp(later);
        assert_eq!(task.completed_date, Some(first));

        task.toggle_completed();
        task.apply_completion_stamp(later);
        assert_eq!(task.completed_date, None);
    }

    #[test]
    fn test_task_form_due_dates() {
        let form = |combined: &str, d: &str, m: &str, y: &str| TaskForm {
            title: "Test Task *Selenium*".into(),
            due_date: combined.into(),
            due_date_day: d.into(),
            due_date_month: m.into(),
            due_date_year: y.into(),
            ..Default::default()
        };

        assert_eq!(
            form("01-10-2018", "", "", "").parsed_due_date().unwrap(),
            Some(date(2018, 10, 1))
        );
        assert_eq!(
            form("2018-10-01", "", "", "").parsed_due_date().unwrap(),
            Some(date(2018, 10, 1))
        );
        assert_eq!(
            form("", "01", "10", "2018").parsed_due_date().unwrap(),
            Some(date(2018, 10, 1))
        );
        assert_eq!(form("", "", "", "").parsed_due_date().unwrap(), None);

        assert!(form("31-02-2018", "", "", "").parsed_due_date().is_err());
        assert!(form("", "01", "", "2018").parsed_due_date().is_err());
        assert!(form("tomorrow", "", "", "").parsed_due_date().is_err());
    }

    #[test]
    fn test_task_form_into_new_task() {
        let list_id = Uuid::new_v4();
        let form = TaskForm {
            title: "  Buy milk ".into(),
            note: "   ".into(),
            priority: "3".into(),
            ..Default::default()
        };
        let new_task = form.into_new_task(list_id, 9).unwrap();
        assert_eq!(new_task.title, "Buy milk");
        assert_eq!(new_task.note, None);
        assert_eq!(new_task.priority, 3);
        assert_eq!(new_task.task_list_id, list_id);

        let empty_title = TaskForm::default().into_new_task(list_id, 9);
        assert!(matches!(empty_title, Err(AppError::ValidationError(_))));

        let blank_title = TaskForm {
            title: "    ".into(),
            ..Default::default()
        };
        assert!(matches!(
            blank_title.into_new_task(list_id, 9),
            Err(AppError::ValidationError(_))
        ));

        let bad_priority = TaskForm {
            title: "x".into(),
            priority: "high".into(),
            ..Default::default()
        };
        assert!(matches!(
            bad_priority.into_new_task(list_id, 9),
            Err(AppError::BadRequest(_))
        ));
    }
}
