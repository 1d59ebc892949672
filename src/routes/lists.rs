use crate::{
    auth::AuthenticatedUser,
    error::AppError,
    models::{Group, ListForm, Task, TaskForm, TaskList, User},
    routes::{html, see_other},
    state::AppState,
    views::lists::{add_list_page, completed_page, delete_list_page, index_page, list_page},
};
use actix_web::{get, post, web, HttpResponse};
use uuid::Uuid;

/// Loads a list the user may open.
///
/// A stale or mistyped slug is not an error; callers redirect to the list's canonical URL.
async fn visible_list(
    state: &AppState,
    user: &AuthenticatedUser,
    list_id: Uuid,
) -> Result<TaskList, AppError> {
    let list = TaskList::find(&state.pool, list_id).await?;
    list.ensure_visible(&state.pool, user).await?;
    Ok(list)
}

/// Index of the lists visible to the user
#[get("/")]
pub async fn index(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let lists = TaskList::visible_to(&state.pool, &user).await?;
    let flashes = state.flash.take(user.session);
    Ok(html(index_page(&user, &lists, &flashes)))
}

#[get("/add_list/")]
pub async fn add_list_form(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    user.require_administrator()?;
    let groups = Group::all(&state.pool).await?;
    let flashes = state.flash.take(user.session);
    Ok(html(add_list_page(&user, &groups, &flashes)))
}

/// Create a list
///
/// Without an explicit `group` the list goes to the creator's first group.
#[post("/add_list/")]
pub async fn add_list(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    form: web::Form<ListForm>,
) -> Result<HttpResponse, AppError> {
    user.require_administrator()?;
    let form = form.into_inner().cleaned()?;

    let group = match form.group {
        Some(group_id) => Group::find(&state.pool, group_id).await?,
        None => User::groups(&state.pool, user.id)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| AppError::BadRequest("Choose a group for the new list".into()))?,
    };

    let list = TaskList::create(&state.pool, &form.name, group.id).await?;
    log::info!("{} created list {} in {}", user.username, list.name, group.name);
    state.flash.success(user.session, "A new list has been added.");
    Ok(see_other("/"))
}

/// Incomplete tasks of a list
#[get("/lists/{list_id}/{slug}/")]
pub async fn list_detail(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<(Uuid, String)>,
) -> Result<HttpResponse, AppError> {
    let (list_id, slug) = path.into_inner();
    let list = visible_list(&state, &user, list_id).await?;
    if slug != list.slug {
        return Ok(see_other(&list.url()));
    }

    let tasks = Task::for_list(&state.pool, list.id, false).await?;
    let flashes = state.flash.take(user.session);
    Ok(html(list_page(&user, &list, &tasks, state.clock.today(), &flashes)))
}

/// Add a task to a list
#[post("/lists/{list_id}/{slug}/")]
pub async fn add_task(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<(Uuid, String)>,
    form: web::Form<TaskForm>,
) -> Result<HttpResponse, AppError> {
    let (list_id, _slug) = path.into_inner();
    let list = visible_list(&state, &user, list_id).await?;

    let new_task = form.into_inner().into_new_task(list.id, user.id)?;
    let task = Task::create(&state.pool, state.clock.as_ref(), new_task).await?;

    log::info!("{} added task {} to {}", user.username, task.id, list.name);
    state
        .flash
        .success(user.session, format!("New task \"{}\" has been added.", task.title));
    Ok(see_other(&list.url()))
}

/// Completed tasks of a list, with their completion dates
#[get("/lists/{list_id}/{slug}/completed/")]
pub async fn completed_tasks(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<(Uuid, String)>,
) -> Result<HttpResponse, AppError> {
    let (list_id, slug) = path.into_inner();
    let list = visible_list(&state, &user, list_id).await?;
    if slug != list.slug {
        return Ok(see_other(&list.completed_url()));
    }

    let tasks = Task::for_list(&state.pool, list.id, true).await?;
    let flashes = state.flash.take(user.session);
    Ok(html(completed_page(&user, &list, &tasks, &flashes)))
}

#[get("/lists/{list_id}/{slug}/delete/")]
pub async fn delete_list_form(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<(Uuid, String)>,
) -> Result<HttpResponse, AppError> {
    user.require_administrator()?;
    let (list_id, _slug) = path.into_inner();
    let list = TaskList::find(&state.pool, list_id).await?;
    let counts = list.task_counts(&state.pool).await?;
    let flashes = state.flash.take(user.session);
    Ok(html(delete_list_page(&user, &list, counts, &flashes)))
}

/// Delete a list with all its tasks
#[post("/lists/{list_id}/{slug}/delete/")]
pub async fn delete_list(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<(Uuid, String)>,
) -> Result<HttpResponse, AppError> {
    user.require_administrator()?;
    let (list_id, _slug) = path.into_inner();
    let list = TaskList::find(&state.pool, list_id).await?;
    let name = list.name.clone();

    list.delete(&state.pool).await?;
    state.flash.success(user.session, format!("{} is gone.", name));
    Ok(see_other("/"))
}
