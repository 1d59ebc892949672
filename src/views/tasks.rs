use chrono::NaiveDate;

use crate::auth::AuthenticatedUser;
use crate::flash::FlashMessage;
use crate::models::{is_overdue, Comment, Task, TaskList};
use crate::views::lists::format_date;
use crate::views::{escape, layout};

/// Task detail with its comments and the comment form.
pub fn task_page(
    user: &AuthenticatedUser,
    list: &TaskList,
    task: &Task,
    comments: &[Comment],
    today: NaiveDate,
    flashes: &[FlashMessage],
) -> String {
    let note = task
        .note
        .as_deref()
        .map(|note| format!("<p class=\"card-text\">{}</p>\n", escape(note)))
        .unwrap_or_default();

    let due = match task.due_date {
        Some(_) if is_overdue(task.due_date, today) => format!(
            "<span class=\"overdue\">{} (overdue)</span>",
            format_date(task.due_date)
        ),
        Some(_) => format_date(task.due_date),
        None => "No due date".to_string(),
    };

    let status = if task.completed {
        format!("Completed on {}", format_date(task.completed_on()))
    } else {
        "Not completed".to_string()
    };

    let toggle_label = if task.completed { "Mark not done" } else { "Mark done" };

    let comment_list: String = if comments.is_empty() {
        "<p>No comments (yet).</p>\n".to_string()
    } else {
        comments
            .iter()
            .map(|comment| {
                format!(
                    "<div class=\"comment\"><p class=\"comment-meta\"><strong>{}</strong>, {}</p><p>{}</p></div>\n",
                    escape(&comment.author_username),
                    comment.date.format("%d-%m-%Y %H:%M"),
                    escape(&comment.body)
                )
            })
            .collect()
    };

    let body = format!(
        r#"<div class="card">
<div class="card-body">
<h3 class="card-title">{title}</h3>
{note}<ul class="task-details">
<li>In list: <a href="{list_url}">{list_name}</a></li>
<li>Created by {owner} on {created}</li>
<li>Due: {due}</li>
<li>Priority: {priority}</li>
<li>{status}</li>
</ul>
<a class="btn btn-info" id="toggle-done" href="{toggle_url}">{toggle_label}</a>
<form method="post" action="{delete_url}" class="inline">
<button type="submit" class="btn btn-danger" id="delete-task">Delete task</button>
</form>
</div>
</div>
<h5>Add comment</h5>
<form method="post" action="{task_url}" id="add-comment-form">
<textarea name="comment-body" id="id_comment_body" rows="4" required></textarea>
<button type="submit" class="btn btn-primary" name="add-comment">Post comment</button>
</form>
<h5>Comments on this task</h5>
<div class="comments">
{comment_list}</div>
"#,
        title = escape(&task.title),
        note = note,
        list_url = list.url(),
        list_name = escape(&list.name),
        owner = escape(&task.created_by_username),
        created = task.created_date.format("%d-%m-%Y"),
        due = due,
        priority = task.priority,
        status = status,
        toggle_url = task.toggle_url(),
        toggle_label = toggle_label,
        delete_url = task.delete_url(),
        task_url = task.url(),
        comment_list = comment_list,
    );
    layout::page(&task.title, Some(user), flashes, &body)
}
