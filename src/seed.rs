//! Fixture users and demo data.
//!
//! The fixture accounts are fixed so that scripted sessions can log in without setup:
//! `staffer` administers both workgroups, `user1` and `user2` are members of one each.

use chrono::Duration;
use rand::seq::SliceRandom;
use rand::Rng;
use sqlx::SqlitePool;

use crate::clock::Clock;
use crate::error::AppError;
use crate::models::{Group, NewTask, Role, Task, TaskList, User, UserInput};

pub const GROUP_ONE: &str = "Workgroup One";
pub const GROUP_TWO: &str = "Workgroup Two";

/// A user created by [`load_fixture_users`].
pub struct FixtureUser {
    pub username: &'static str,
    pub password: &'static str,
    pub role: Role,
    pub groups: &'static [&'static str],
}

pub const FIXTURE_USERS: &[FixtureUser] = &[
    FixtureUser {
        username: "staffer",
        password: "staffer",
        role: Role::Administrator,
        groups: &[GROUP_ONE, GROUP_TWO],
    },
    FixtureUser {
        username: "user1",
        password: "user1",
        role: Role::Member,
        groups: &[GROUP_ONE],
    },
    FixtureUser {
        username: "user2",
        password: "user2",
        role: Role::Member,
        groups: &[GROUP_TWO],
    },
];

const LIST_NAMES: &[&str] = &[
    "Office Supplies",
    "Quarterly Report",
    "Team Offsite",
    "Website Refresh",
    "Hiring",
    "Server Migration",
    "Budget Review",
    "Customer Follow-ups",
];

const TASK_TITLES: &[&str] = &[
    "Order printer toner",
    "Call the landlord about the heating",
    "Draft the agenda",
    "Book a meeting room",
    "Review pull requests",
    "Update the staff directory",
    "Renew the domain name",
    "Back up the shared drive",
    "Collect receipts",
    "Email the catering company",
    "Fix the broken link on the contact page",
    "Prepare interview questions",
    "Archive last year's invoices",
    "Check fire extinguisher dates",
    "Write release notes",
    "Schedule the team lunch",
];

/// Credentials of the first fixture user with `role`.
pub fn credentials_for(role: Role) -> (&'static str, &'static str) {
    FIXTURE_USERS
        .iter()
        .find(|user| user.role == role)
        .map(|user| (user.username, user.password))
        .unwrap_or(("staffer", "staffer"))
}

/// Creates the fixture groups and users that do not exist yet.
pub async fn load_fixture_users(
    pool: &SqlitePool,
    clock: &dyn Clock,
    bcrypt_cost: u32,
) -> Result<(), AppError> {
    for fixture in FIXTURE_USERS {
        let user = match User::find_by_username(pool, fixture.username).await? {
            Some(user) => user,
            None => {
                let input = UserInput {
                    username: fixture.username.to_string(),
                    email: format!("{}@example.com", fixture.username),
                    password: fixture.password.to_string(),
                    role: fixture.role,
                };
                User::create(pool, clock, &input, bcrypt_cost).await?
            }
        };

        for group_name in fixture.groups {
            let group = Group::find_or_create(pool, group_name).await?;
            group.add_member(pool, user.id).await?;
        }
    }
    Ok(())
}

/// A list to generate: its name and, per task, a title and an optional due-date offset
/// in days from today.
struct DemoList {
    name: &'static str,
    tasks: Vec<(&'static str, Option<i64>)>,
}

/// Three distinct list names, each with three to six tasks due from a week ago to two
/// weeks ahead. About a quarter of the tasks have no due date.
fn plan_demo_lists<R: Rng + ?Sized>(rng: &mut R) -> Vec<DemoList> {
    LIST_NAMES
        .choose_multiple(&mut *rng, 3)
        .map(|&name| {
            let task_count = rng.gen_range(3..=6);
            let tasks = (0..task_count)
                .map(|_| {
                    let title = TASK_TITLES[rng.gen_range(0..TASK_TITLES.len())];
                    let offset = rng.gen_bool(0.75).then(|| rng.gen_range(-7i64..=13));
                    (title, offset)
                })
                .collect();
            DemoList { name, tasks }
        })
        .collect()
}

/// Replaces every list with freshly generated ones: three per group, each with a few
/// incomplete tasks and one completed task.
///
/// Returns the created lists.
pub async fn reset_demo_lists(
    pool: &SqlitePool,
    clock: &dyn Clock,
) -> Result<Vec<TaskList>, AppError> {
    sqlx::query("DELETE FROM task_lists").execute(pool).await?;

    let (staffer, _) = credentials_for(Role::Administrator);
    let creator = User::find_by_username(pool, staffer)
        .await?
        .ok_or_else(|| AppError::NotFound("Fixture users are not loaded".into()))?;

    let groups = Group::all(pool).await?;
    let plans: Vec<Vec<DemoList>> = {
        let mut rng = rand::thread_rng();
        groups.iter().map(|_| plan_demo_lists(&mut rng)).collect()
    };

    let mut created = Vec::new();
    for (group, plan) in groups.iter().zip(plans) {
        for demo in plan {
            let list = TaskList::create(pool, demo.name, group.id).await?;
            let last = demo.tasks.len() - 1;
            for (i, (title, offset)) in demo.tasks.into_iter().enumerate() {
                let new_task = NewTask {
                    task_list_id: list.id,
                    title: title.to_string(),
                    note: None,
                    due_date: offset.map(|days| clock.today() + Duration::days(days)),
                    priority: i as i64,
                    created_by: creator.id,
                };
                let mut task = Task::create(pool, clock, new_task).await?;
                if i == last {
                    task.toggle_completed();
                    task.save(pool, clock).await?;
                }
            }
            created.push(list);
        }
    }

    log::info!("Generated {} demo lists", created.len());
    Ok(created)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::SystemClock;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_credentials_for_roles() {
        assert_eq!(credentials_for(Role::Administrator), ("staffer", "staffer"));
        assert_eq!(credentials_for(Role::Member), ("user1", "user1"));
    }

    #[test]
    fn test_demo_plan_shape() {
        let mut rng = StdRng::seed_from_u64(5501);
        for _ in 0..20 {
            let plan = plan_demo_lists(&mut rng);
            assert_eq!(plan.len(), 3);

            let mut names: Vec<_> = plan.iter().map(|list| list.name).collect();
            names.sort_unstable();
            names.dedup();
            assert_eq!(names.len(), 3);

            for list in &plan {
                assert!((3..=6).contains(&list.tasks.len()));
                for (title, offset) in &list.tasks {
                    assert!(TASK_TITLES.contains(title));
                    assert!(offset.map_or(true, |days| (-7..=13).contains(&days)));
                }
            }
        }
    }

    #[actix_rt::test]
    async fn test_fixture_loading_is_idempotent() {
        let pool = crate::db::connect_in_memory().await.unwrap();
        load_fixture_users(&pool, &SystemClock, 4).await.unwrap();
        load_fixture_users(&pool, &SystemClock, 4).await.unwrap();

        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count.0, 3);

        let staffer = User::find_by_username(&pool, "staffer").await.unwrap().unwrap();
        assert_eq!(User::groups(&pool, staffer.id).await.unwrap().len(), 2);
    }

    #[actix_rt::test]
    async fn test_reset_generates_three_lists_per_group() {
        let pool = crate::db::connect_in_memory().await.unwrap();
        load_fixture_users(&pool, &SystemClock, 4).await.unwrap();

        reset_demo_lists(&pool, &SystemClock).await.unwrap();
        let lists = reset_demo_lists(&pool, &SystemClock).await.unwrap();
        assert_eq!(lists.len(), 6);

        for list in &lists {
            let (incomplete, completed) = list.task_counts(&pool).await.unwrap();
            assert!(incomplete >= 2);
            assert_eq!(completed, 1);
        }
    }
}
