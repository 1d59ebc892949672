use chrono::NaiveDate;

use crate::auth::AuthenticatedUser;
use crate::flash::FlashMessage;
use crate::models::{Group, ListSummary, Task, TaskList};
use crate::views::{escape, layout};

pub(crate) fn format_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format("%d-%m-%Y").to_string())
        .unwrap_or_default()
}

/// The index: every visible list with its group and incomplete task count.
pub fn index_page(user: &AuthenticatedUser, lists: &[ListSummary], flashes: &[FlashMessage]) -> String {
    let mut body = String::from("<h1>Todo Lists</h1>\n");

    if lists.is_empty() {
        body.push_str("<p>There are no lists yet.</p>\n");
    } else {
        body.push_str("<ul class=\"todo-lists\">\n");
        for list in lists {
            body.push_str(&format!(
                "<li><a href=\"{}\">{}</a> <small class=\"group\">{}</small> <span class=\"badge\">{}</span></li>\n",
                list.url(),
                escape(&list.name),
                escape(&list.group_name),
                list.incomplete
            ));
        }
        body.push_str("</ul>\n");
    }

    if user.role.is_administrator() {
        body.push_str("<a class=\"btn btn-primary\" href=\"/add_list/\">Create new todo list</a>\n");
    }

    layout::page("Todo Lists", Some(user), flashes, &body)
}

pub fn add_list_page(user: &AuthenticatedUser, groups: &[Group], flashes: &[FlashMessage]) -> String {
    let options: String = groups
        .iter()
        .map(|group| format!("<option value=\"{}\">{}</option>", group.id, escape(&group.name)))
        .collect();
    let body = format!(
        r#"<h1>Create new todo list</h1>
<form method="post" action="/add_list/">
<div class="form-group">
<label for="id_name">Name</label>
<input type="text" name="name" id="id_name" maxlength="60" required>
</div>
<div class="form-group">
<label for="id_group">Group</label>
<select name="group" id="id_group">{}</select>
</div>
<button type="submit" class="btn btn-primary">Submit</button>
</form>
"#,
        options
    );
    layout::page("Create new todo list", Some(user), flashes, &body)
}

/// Incomplete tasks of a list and the add-task form.
pub fn list_page(
    user: &AuthenticatedUser,
    list: &TaskList,
    tasks: &[Task],
    today: NaiveDate,
    flashes: &[FlashMessage],
) -> String {
    let rows: String = tasks
        .iter()
        .map(|task| {
            let overdue = crate::models::is_overdue(task.due_date, today);
            format!(
                "<tr class=\"task{}\"><td><a href=\"{}\">{}</a></td><td>{}</td><td>{}</td><td>{}</td><td><a href=\"{}\">Mark done</a></td></tr>\n",
                if overdue { " overdue" } else { "" },
                task.url(),
                escape(&task.title),
                task.created_date.format("%d-%m-%Y"),
                format_date(task.due_date),
                escape(&task.created_by_username),
                task.toggle_url()
            )
        })
        .collect();

    let mut body = format!(
        r#"<h1>Tasks in &quot;{name}&quot;</h1>
<table class="table tasks">
<tr><th>Task</th><th>Created</th><th>Due on</th><th>Owner</th><th>Done</th></tr>
{rows}</table>
<p><a href="{completed}">View completed tasks</a></p>
<h3>Add task</h3>
<form method="post" action="{action}" id="add-task-form">
<div class="form-group">
<label for="id_title">Task</label>
<input type="text" name="title" id="id_title" maxlength="140" required>
</div>
<div class="form-group">
<label for="id_note">Note</label>
<textarea name="note" id="id_note"></textarea>
</div>
<div class="form-group">
<label for="id_due_date">Due date (dd-mm-yyyy)</label>
<input type="text" name="due_date" id="id_due_date" placeholder="dd-mm-yyyy">
<input type="text" name="due_date_day" size="2" placeholder="dd">
<input type="text" name="due_date_month" size="2" placeholder="mm">
<input type="text" name="due_date_year" size="4" placeholder="yyyy">
</div>
<div class="form-group">
<label for="id_priority">Priority</label>
<input type="number" name="priority" id="id_priority">
</div>
<button type="submit" class="btn btn-primary" id="AddTaskButton" name="add_edit_task">Add task</button>
</form>
"#,
        name = escape(&list.name),
        rows = rows,
        completed = list.completed_url(),
        action = list.url(),
    );

    if user.role.is_administrator() {
        body.push_str(&format!(
            "<p><a class=\"btn btn-danger\" href=\"{}\">Delete this list</a></p>\n",
            list.delete_url()
        ));
    }

    layout::page(&format!("Tasks in \"{}\"", list.name), Some(user), flashes, &body)
}

pub fn completed_page(
    user: &AuthenticatedUser,
    list: &TaskList,
    tasks: &[Task],
    flashes: &[FlashMessage],
) -> String {
    let rows: String = tasks
        .iter()
        .map(|task| {
            format!(
                "<tr class=\"task\"><td><a href=\"{}\">{}</a></td><td>{}</td><td>{}</td><td><a href=\"{}\">Mark not done</a></td></tr>\n",
                task.url(),
                escape(&task.title),
                format_date(task.completed_on()),
                escape(&task.created_by_username),
                task.toggle_url()
            )
        })
        .collect();

    let body = format!(
        r#"<h1>Completed tasks in &quot;{}&quot;</h1>
<table class="table tasks">
<tr><th>Task</th><th>Completed on</th><th>Owner</th><th>Done</th></tr>
{}</table>
<p><a href="{}">View incomplete tasks</a></p>
"#,
        escape(&list.name),
        rows,
        list.url()
    );
    layout::page("Completed tasks", Some(user), flashes, &body)
}

pub fn delete_list_page(
    user: &AuthenticatedUser,
    list: &TaskList,
    counts: (i64, i64),
    flashes: &[FlashMessage],
) -> String {
    let (incomplete, completed) = counts;
    let body = format!(
        r#"<h1>Delete entire list: {name} ?</h1>
<p>This list holds {incomplete} incomplete and {completed} completed tasks. They will be deleted with it.</p>
<form method="post" action="{action}">
<button type="submit" class="btn btn-danger" name="delete-confirm" value="1">Delete list</button>
<a class="btn btn-secondary" href="{back}">Cancel</a>
</form>
"#,
        name = escape(&list.name),
        incomplete = incomplete,
        completed = completed,
        action = list.delete_url(),
        back = list.url(),
    );
    layout::page("Delete list", Some(user), flashes, &body)
}
