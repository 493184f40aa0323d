use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;

use super::handlers::jobs;
use super::handlers::probes::{healthz, livez};
use super::state::AppState;
use crate::prelude::Result;

pub async fn build_routes() -> Result<Router> {
    let state = AppState::new().await?;
    Ok(routes(state))
}

/// Every resource URL answers with and without the trailing slash.
fn job_resource() -> Router<AppState> {
    let list = get(jobs::list)
        .post(jobs::create)
        .put(jobs::replace_list)
        .delete(jobs::delete_list);
    let detail = get(jobs::detail)
        .put(jobs::replace)
        .patch(jobs::patch)
        .delete(jobs::delete);

    Router::new()
        .route("/job", list.clone())
        .route("/job/", list)
        .route("/job/schema", get(jobs::schema))
        .route("/job/schema/", get(jobs::schema))
        .route("/job/set/{ids}", get(jobs::set))
        .route("/job/set/{ids}/", get(jobs::set))
        .route("/job/{id}", detail.clone())
        .route("/job/{id}/", detail)
}

pub fn routes(state: AppState) -> Router {
    let prefix = state.resource.api_prefix.clone();
    let api = if prefix.is_empty() {
        job_resource()
    } else {
        Router::new().nest(&prefix, job_resource())
    };

    Router::new()
        .merge(api)
        .route("/healthz", get(healthz))
        .route("/livez", get(livez))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
