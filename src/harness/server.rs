use std::net::TcpListener;
use std::sync::Arc;

use actix_web::{dev::ServerHandle, middleware::Logger, web, App, HttpServer};

use crate::clock::SystemClock;
use crate::harness::browser::Browser;
use crate::harness::config::HarnessConfig;
use crate::harness::error::HarnessResult;
use crate::models::TaskList;
use crate::routes;
use crate::seed;
use crate::state::AppState;

/// The application served on an ephemeral local port.
///
/// Must be started from within an actix system (`#[actix_rt::test]`). The server stops when
/// the `LiveServer` is dropped, also when a scenario fails half-way.
pub struct LiveServer {
    base_url: String,
    state: web::Data<AppState>,
    handle: ServerHandle,
    task: Option<tokio::task::JoinHandle<std::io::Result<()>>>,
}

impl LiveServer {
    /// Serves a fresh in-memory database holding only the fixture users.
    pub async fn start() -> HarnessResult<Self> {
        let state = AppState::ephemeral(Arc::new(SystemClock)).await?;
        Self::start_with(state)
    }

    pub fn start_with(state: AppState) -> HarnessResult<Self> {
        let state = web::Data::new(state);
        let listener = TcpListener::bind("127.0.0.1:0")?;
        let address = listener.local_addr()?;

        let app_state = state.clone();
        let server = HttpServer::new(move || {
            App::new()
                .app_data(app_state.clone())
                .wrap(Logger::default())
                .configure(routes::config)
        })
        .workers(1)
        .disable_signals()
        .listen(listener)?
        .run();

        let handle = server.handle();
        let task = actix_web::rt::spawn(server);
        log::info!("Live server listening on {}", address);

        Ok(LiveServer {
            base_url: format!("http://{}", address),
            state,
            handle,
            task: Some(task),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Replaces all lists with generated demo lists.
    pub async fn seed_demo_lists(&self) -> HarnessResult<Vec<TaskList>> {
        let lists = seed::reset_demo_lists(&self.state.pool, self.state.clock.as_ref()).await?;
        Ok(lists)
    }

    /// A fresh session with the configuration read from the environment.
    pub fn browser(&self) -> HarnessResult<Browser> {
        Browser::new(self.base_url.clone(), HarnessConfig::from_env()?)
    }

    pub fn browser_with(&self, config: HarnessConfig) -> HarnessResult<Browser> {
        Browser::new(self.base_url.clone(), config)
    }

    /// Stops accepting connections and waits for the server to shut down.
    pub async fn stop(mut self) {
        self.handle.stop(false).await;
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for LiveServer {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            // Sends the stop command; the returned future only waits for completion.
            drop(self.handle.stop(false));
            task.abort();
        }
    }
}
