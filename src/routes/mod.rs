pub mod auth;
pub mod comments;
pub mod health;
pub mod lists;
pub mod tasks;

use actix_web::{http::header, web, HttpResponse};

use crate::auth::AuthMiddleware;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(health::health).service(
        web::scope("")
            .wrap(AuthMiddleware)
            .service(auth::login_form)
            .service(auth::login)
            .service(auth::logout)
            .service(lists::index)
            .service(lists::add_list_form)
            .service(lists::add_list)
            .service(lists::list_detail)
            .service(lists::add_task)
            .service(lists::completed_tasks)
            .service(lists::delete_list_form)
            .service(lists::delete_list)
            .service(tasks::task_detail)
            .service(tasks::add_comment)
            .service(tasks::toggle_done)
            .service(tasks::delete_task)
            .service(comments::recent_comments),
    );
}

pub(crate) fn html(page: String) -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(page)
}

/// `303 See Other`, so the browser follows up a form post with a GET.
pub(crate) fn see_other(location: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, location))
        .finish()
}
