//! REST handlers of the demo service.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};

use crate::app::users::{NewUser, User, UserDirectory};
use crate::components::HttpClient;
use crate::errors::http::HttpFailure;
use crate::errors::{Error, FieldViolation};
use crate::http::RequestContext;

#[derive(Clone)]
pub struct AppState {
    pub users: Arc<UserDirectory>,
    /// Client for the peer instance, when one is configured. Resolved from
    /// the registry by the composition root, which exits if it cannot be built.
    pub peer: Option<Arc<HttpClient>>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(|| async { "ok" }))
        .route("/users", post(create_user))
        .route("/users/{id}", get(get_user))
        .route("/peer/users/{id}", get(get_peer_user))
        .with_state(state)
}

async fn get_user(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<User>, HttpFailure> {
    state.users.get(&id).map(Json).map_err(|e| ctx.fail("rest.get_user", e))
}

async fn create_user(
    ctx: RequestContext,
    State(state): State<AppState>,
    body: Result<Json<NewUser>, JsonRejection>,
) -> Result<(StatusCode, Json<User>), HttpFailure> {
    const OP: &str = "rest.create_user";

    let Json(new) = body.map_err(|rejection| {
        ctx.fail(OP, Error::bad_request([FieldViolation::new("body", rejection.body_text())]))
    })?;
    let user = state.users.create(new).map_err(|e| ctx.fail(OP, e))?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// Fetch a user from the peer instance, relaying its error as our own.
async fn get_peer_user(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<User>, HttpFailure> {
    const OP: &str = "rest.get_peer_user";

    let Some(client) = &state.peer else {
        return Err(ctx.fail(
            OP,
            Error::failed_precondition("CONFIG", "components.peer", "no peer configured"),
        ));
    };

    client
        .get_json::<User>(&format!("/users/{id}"), &ctx.request_id)
        .await
        .map(Json)
        .map_err(|e| ctx.fail(OP, e))
}
