use crate::{
    auth::AuthenticatedUser,
    error::AppError,
    models::{Comment, CommentForm, Task, TaskList},
    routes::{html, see_other},
    state::AppState,
    views::tasks::task_page,
};
use actix_web::{get, post, web, HttpResponse};
use uuid::Uuid;
use validator::Validate;

/// Loads a task together with its list, checking the user may see the list.
async fn visible_task(
    state: &AppState,
    user: &AuthenticatedUser,
    task_id: Uuid,
) -> Result<(Task, TaskList), AppError> {
    let task = Task::find(&state.pool, task_id).await?;
    let list = TaskList::find(&state.pool, task.task_list_id).await?;
    list.ensure_visible(&state.pool, user).await?;
    Ok((task, list))
}

/// Task detail with comments
#[get("/task/{task_id}/")]
pub async fn task_detail(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    task_id: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let (task, list) = visible_task(&state, &user, task_id.into_inner()).await?;
    let comments = Comment::for_task(&state.pool, task.id).await?;
    let flashes = state.flash.take(user.session);
    Ok(html(task_page(
        &user,
        &list,
        &task,
        &comments,
        state.clock.today(),
        &flashes,
    )))
}

/// Post a comment on a task
#[post("/task/{task_id}/")]
pub async fn add_comment(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    task_id: web::Path<Uuid>,
    form: web::Form<CommentForm>,
) -> Result<HttpResponse, AppError> {
    form.validate()?;
    let (task, _list) = visible_task(&state, &user, task_id.into_inner()).await?;

    Comment::create(
        &state.pool,
        state.clock.as_ref(),
        task.id,
        user.id,
        form.body.trim(),
    )
    .await?;
    state.flash.success(user.session, "Comment posted.");
    Ok(see_other(&task.url()))
}

/// Toggle a task between done and not done
///
/// The completion date is stamped (or cleared) when the task is saved, then the browser
/// returns to the list's incomplete tasks.
#[get("/toggle_done/{task_id}/")]
pub async fn toggle_done(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    task_id: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let (mut task, list) = visible_task(&state, &user, task_id.into_inner()).await?;

    task.toggle_completed();
    task.save(&state.pool, state.clock.as_ref()).await?;

    log::info!(
        "{} marked task {} as {}",
        user.username,
        task.id,
        if task.completed { "done" } else { "not done" }
    );
    state
        .flash
        .success(user.session, format!("Task status changed for '{}'", task.title));
    Ok(see_other(&list.url()))
}

/// Delete a task and its comments
#[post("/delete_task/{task_id}/")]
pub async fn delete_task(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    task_id: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let (task, list) = visible_task(&state, &user, task_id.into_inner()).await?;
    let title = task.title.clone();

    task.delete(&state.pool).await?;
    state
        .flash
        .success(user.session, format!("Task \"{}\" has been deleted.", title));
    Ok(see_other(&list.url()))
}
