use std::sync::Arc;

use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use rocket::fs::FileServer;
use rocket::http::Status;
use rocket::response::Redirect;
use rocket::serde::json::Json;
use rocket::{get, post, routes, State};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::{error, info};

use common::Config;

use crate::llm::ChatCompleter;
use crate::view::{self, FeedView};
use crate::{chat, store};

/// Application state stored inside Rocket managed state.
#[derive(Clone)]
pub struct AppState {
    pub started_at: DateTime<Utc>,
    pub config: Option<Arc<Config>>,
    pub db: SqlitePool,
    pub completer: Option<Arc<dyn ChatCompleter>>,
}

/// Response structure for `/api/v1/status`.
#[derive(Serialize)]
struct StatusResponse {
    status: &'static str,
    uptime_seconds: i64,
    assistant_configured: bool,
}

/// Redirect root to static index.html
#[get("/")]
async fn index_redirect() -> Redirect {
    Redirect::to("/static/index.html")
}

#[get("/health")]
async fn health() -> &'static str {
    "OK"
}

/// Status endpoint returning simple JSON with uptime and configured surfaces.
#[get("/api/v1/status")]
async fn status(state: &State<AppState>) -> Json<StatusResponse> {
    let now = Utc::now();
    let uptime = (now - state.started_at).num_seconds();

    Json(StatusResponse {
        status: "ok",
        uptime_seconds: uptime,
        assistant_configured: state.completer.is_some(),
    })
}

/// The feed pane, re-rendered from a fresh store read on every call.
/// `active_id` marks the article currently bound to the caller's chat pane.
///
/// A store failure is not an HTTP error: the client receives an empty view
/// with the failure as a notice, and the user can simply reload.
#[get("/api/v1/feed?<active_id>")]
async fn feed(state: &State<AppState>, active_id: Option<i64>) -> Json<FeedView> {
    match store::list_articles(&state.db).await {
        Ok(articles) => Json(view::render_feed(&articles, active_id, Utc::now())),
        Err(e) => {
            error!("feed: {}", e);
            Json(view::render_unavailable_feed(&e.to_string()))
        }
    }
}

/// Request body for the two flag-toggle endpoints.
#[derive(Deserialize)]
struct FlagUpdate {
    value: bool,
}

#[post("/api/v1/articles/<id>/favorite", data = "<body>")]
async fn set_favorite(
    state: &State<AppState>,
    id: i64,
    body: Json<FlagUpdate>,
) -> Result<Status, Status> {
    store::set_favorite(&state.db, id, body.value)
        .await
        .map_err(|e| {
            error!("set_favorite: {}", e);
            Status::ServiceUnavailable
        })?;
    Ok(Status::NoContent)
}

#[post("/api/v1/articles/<id>/hide", data = "<body>")]
async fn set_hidden(
    state: &State<AppState>,
    id: i64,
    body: Json<FlagUpdate>,
) -> Result<Status, Status> {
    store::set_hidden(&state.db, id, body.value)
        .await
        .map_err(|e| {
            error!("set_hidden: {}", e);
            Status::ServiceUnavailable
        })?;
    Ok(Status::NoContent)
}

/// Build and launch a Rocket server.
///
/// The DB pool, optional application config and optional completion
/// provider are supplied by the caller; the server does not re-init or
/// migrate the database here. This function blocks until Rocket shuts down.
pub async fn launch_rocket(
    db_pool: Arc<SqlitePool>,
    config: Option<Arc<Config>>,
    completer: Option<Arc<dyn ChatCompleter>>,
) -> Result<()> {
    let mut fig = rocket::Config::figment();
    if let Some(server_cfg) = config.as_ref().and_then(|c| c.server.as_ref()) {
        if let Some(ref bind) = server_cfg.bind {
            fig = fig.merge(("address", bind.clone()));
        }
        if let Some(port) = server_cfg.port {
            fig = fig.merge(("port", port));
        }
    }

    let state = AppState {
        started_at: Utc::now(),
        config,
        db: db_pool.as_ref().clone(), // Unwrap Arc since SqlitePool is already ref-counted
        completer,
    };

    let rocket = rocket::custom(fig)
        .manage(state)
        .mount(
            "/",
            routes![
                index_redirect,
                health,
                status,
                feed,
                set_favorite,
                set_hidden,
            ],
        )
        .mount("/ws", routes![chat::websocket::chat_websocket])
        .mount("/static", FileServer::from("insight/static"));

    info!("Starting Rocket HTTP server");
    rocket
        .launch()
        .await
        .map_err(|e| anyhow!("Rocket failed: {}", e))?;

    info!("Rocket HTTP server has shut down");
    Ok(())
}
