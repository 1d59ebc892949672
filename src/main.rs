use std::sync::Arc;

use actix_web::{middleware::Logger, web, App, HttpServer};
use todo_lists::{clock::SystemClock, config::Config, db, routes, seed, AppState};

fn startup_error(error: todo_lists::AppError) -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::Other, error.to_string())
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::from_env().map_err(startup_error)?;
    let pool = db::connect(&config.database_url)
        .await
        .map_err(startup_error)?;
    let state = AppState::from_config(pool, Arc::new(SystemClock), &config);
    seed::load_fixture_users(&state.pool, state.clock.as_ref(), config.bcrypt_cost)
        .await
        .map_err(startup_error)?;

    let reset_requested = std::env::args().nth(1).as_deref() == Some("reset");
    if reset_requested || config.seed_demo_data {
        seed::reset_demo_lists(&state.pool, state.clock.as_ref())
            .await
            .map_err(startup_error)?;
        if reset_requested {
            return Ok(());
        }
    }

    let state = web::Data::new(state);
    log::info!("Starting todo lists server at {}", config.server_url());
    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(Logger::default())
            .configure(routes::config)
    })
    .bind((config.server_host.as_str(), config.server_port))?
    .run()
    .await
}
