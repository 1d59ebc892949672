//! Scripted sessions against a live server, one per user story.

use pretty_assertions::assert_eq;
use todo_lists::harness::{DateEntryStyle, HarnessConfig, HarnessError, LiveServer};
use todo_lists::models::Role;

const FOOTER_STAFFER: &str = "CITS5501-Todo, 2018. Logged in as \"staffer\"";

#[test_log::test(actix_rt::test)]
async fn test_admin_login_create_list_add_task() {
    let server = LiveServer::start().await.unwrap();
    let mut browser = server.browser_with(HarnessConfig::default()).unwrap();

    let heading = browser.login_as(Role::Administrator).await.unwrap();
    assert_eq!(heading, "Todo Lists");
    assert_eq!(browser.footer_text().unwrap(), FOOTER_STAFFER);

    let alert = browser.create_list("A new List").await.unwrap();
    assert_eq!(alert, "A new list has been added.");

    let heading = browser.open_list("a-new-list").await.unwrap();
    assert_eq!(heading, "Tasks in \"A new List\"");
    assert!(browser.current().unwrap().url().contains("a-new-list"));

    let alert = browser
        .add_task(
            "Test Task *Selenium*",
            "Random Task Added by automated test",
            "01-10-2018",
        )
        .await
        .unwrap();
    assert_eq!(alert, "New task \"Test Task *Selenium*\" has been added.");
    assert_eq!(browser.incomplete_task_count().unwrap(), 1);

    let heading = browser.logout().await.unwrap();
    assert_eq!(heading, "Log in");
    assert!(!browser.footer_text().unwrap().contains("Logged in as"));

    server.stop().await;
}

#[test_log::test(actix_rt::test)]
async fn test_segmented_date_entry_adds_the_same_task() {
    let server = LiveServer::start().await.unwrap();
    let config = HarnessConfig::default().with_date_entry(DateEntryStyle::Segmented);
    let mut browser = server.browser_with(config).unwrap();

    browser.login_as(Role::Administrator).await.unwrap();
    browser.create_list("A new List").await.unwrap();
    browser.open_list("a-new-list").await.unwrap();

    let alert = browser
        .add_task("Segmented", "Entered as three fields", "01-10-2018")
        .await
        .unwrap();
    assert_eq!(alert, "New task \"Segmented\" has been added.");

    let task = todo_lists::models::Task::get_by_title(&server.state().pool, "Segmented")
        .await
        .unwrap();
    assert_eq!(task.due_date, chrono::NaiveDate::from_ymd_opt(2018, 10, 1));
}

#[test_log::test(actix_rt::test)]
async fn test_user_comment_mark_task_done() {
    let server = LiveServer::start().await.unwrap();
    server.seed_demo_lists().await.unwrap();
    let mut browser = server.browser_with(HarnessConfig::default()).unwrap();

    let heading = browser.login_as(Role::Member).await.unwrap();
    assert_eq!(heading, "Todo Lists");

    let list_name = browser.open_first_list().await.unwrap();
    assert_eq!(browser.heading().unwrap(), format!("Tasks in \"{}\"", list_name));

    let number_of_tasks = browser.incomplete_task_count().unwrap();
    assert!(number_of_tasks > 0);

    let task_name = browser.open_first_task().await.unwrap();
    assert_eq!(browser.card_title().unwrap(), task_name);

    let headings = browser
        .add_comment("Issue has been resolved. Marking complete now")
        .await
        .unwrap();
    assert_eq!(headings[1], "Comments on this task");

    let alert = browser.toggle_done().await.unwrap();
    assert_eq!(alert, format!("Task status changed for '{}'", task_name));
    assert_eq!(browser.heading().unwrap(), format!("Tasks in \"{}\"", list_name));
    assert_eq!(browser.incomplete_task_count().unwrap(), number_of_tasks - 1);

    browser.logout().await.unwrap();
}

#[test_log::test(actix_rt::test)]
async fn test_admin_remove_list() {
    let server = LiveServer::start().await.unwrap();
    server.seed_demo_lists().await.unwrap();
    let mut browser = server.browser_with(HarnessConfig::default()).unwrap();

    let heading = browser.login_as(Role::Administrator).await.unwrap();
    assert_eq!(heading, "Todo Lists");
    assert_eq!(browser.footer_text().unwrap(), FOOTER_STAFFER);

    let before = browser.list_names().await.unwrap();
    let list_to_delete_name = browser.open_first_list().await.unwrap();

    let heading = browser.open_delete_for_current_list().await.unwrap();
    assert_eq!(heading, format!("Delete entire list: {} ?", list_to_delete_name));

    let alert = browser.confirm_delete().await.unwrap();
    assert_eq!(alert, format!("{} is gone.", list_to_delete_name));

    let remaining = browser.list_names().await.unwrap();
    assert_eq!(remaining.len(), 5);

    // The other group may hold a list of the same name; exactly one copy goes
    let copies = |names: &[String]| names.iter().filter(|n| **n == list_to_delete_name).count();
    assert_eq!(copies(&remaining), copies(&before) - 1);

    browser.logout().await.unwrap();
}

#[test_log::test(actix_rt::test)]
async fn test_member_cannot_reach_the_delete_page() {
    let server = LiveServer::start().await.unwrap();
    server.seed_demo_lists().await.unwrap();
    let mut browser = server.browser_with(HarnessConfig::default()).unwrap();

    browser.login_as(Role::Member).await.unwrap();
    browser.open_first_list().await.unwrap();

    match browser.open_delete_for_current_list().await {
        Err(HarnessError::MissingElement(_)) => {}
        other => panic!("Members should not see a delete link, got {:?}", other),
    }
}

#[test_log::test(actix_rt::test)]
async fn test_waiting_for_a_missing_element_times_out() {
    let server = LiveServer::start().await.unwrap();
    let config = HarnessConfig {
        timeout: std::time::Duration::from_millis(300),
        poll_interval: std::time::Duration::from_millis(50),
        ..HarnessConfig::default()
    };
    let mut browser = server.browser_with(config).unwrap();
    browser.login_as(Role::Administrator).await.unwrap();

    let result = browser
        .wait_for("a success alert", |page| page.find_with_class("div", "alert-success"))
        .await;
    match result {
        Err(HarnessError::Timeout { waiting_for, .. }) => assert_eq!(waiting_for, "a success alert"),
        other => panic!("Expected a timeout, got {:?}", other.map(|el| el.text())),
    }
}

#[test_log::test(actix_rt::test)]
async fn test_wrong_credentials_are_rejected() {
    let server = LiveServer::start().await.unwrap();
    let mut browser = server.browser_with(HarnessConfig::default()).unwrap();

    browser.visit("/login/").await.unwrap();
    let result = browser
        .submit(
            "/login/",
            &[("username", "staffer".to_string()), ("password", "nope".to_string())],
        )
        .await
        .map(|page| page.url().to_string());

    match result {
        Err(HarnessError::Rejected(msg)) => {
            assert!(msg.contains("Please enter a correct username and password."))
        }
        other => panic!("Expected the login to be rejected, got {:?}", other),
    }
}
