use crate::{
    auth::AuthenticatedUser, error::AppError, models::Comment, routes::html, state::AppState,
    views::comments::recent_page,
};
use actix_web::{get, web, HttpResponse};

const RECENT_COMMENTS: i64 = 50;

/// Newest comments across all lists, as snippets
#[get("/comments/")]
pub async fn recent_comments(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    user.require_administrator()?;
    let comments = Comment::recent(&state.pool, RECENT_COMMENTS).await?;
    let flashes = state.flash.take(user.session);
    Ok(html(recent_page(&user, &comments, &flashes)))
}
