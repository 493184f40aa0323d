use axum::{
    Json,
    body::Bytes,
    extract::{Path, State},
    http::{StatusCode, header::LOCATION},
    response::{IntoResponse, Response},
};
use serde_json::Value;

use crate::{
    pkg::{
        internal::{
            adaptors::jobs::spec::{JobPatch, NewJob},
            resource::{self, JobBundle, JobList, JobSet},
        },
        server::state::AppState,
    },
    prelude::{Error, Result},
};

fn parse_body(body: &Bytes) -> Result<Value> {
    if body.is_empty() {
        return Err(Error::bad_request("The request body is empty."));
    }
    serde_json::from_slice(body)
        .map_err(|e| Error::bad_request(format!("The request body is not valid JSON: {e}")))
}

fn parse_id(raw: &str) -> Result<i64> {
    raw.parse::<i64>().map_err(|_| {
        Error::not_found("Invalid resource lookup data provided (mismatched type).")
    })
}

fn missing(id: i64) -> Error {
    Error::not_found(format!("No job found with id {id}."))
}

pub async fn list(State(state): State<AppState>) -> Result<Json<JobList>> {
    let rows = state.store.list().await?;
    Ok(Json(state.resource.list(rows)))
}

pub async fn create(State(state): State<AppState>, body: Bytes) -> Result<Response> {
    let job = NewJob::from_value(&parse_body(&body)?)?;
    let row = state.store.create(job).await?;
    let bundle = state.resource.bundle(row);
    tracing::info!(id = bundle.id, "job created");
    let location = [(LOCATION, bundle.resource_uri.clone())];
    if state.resource.always_return_data {
        Ok((StatusCode::CREATED, location, Json(bundle)).into_response())
    } else {
        Ok((StatusCode::CREATED, location).into_response())
    }
}

pub async fn replace_list(State(state): State<AppState>, body: Bytes) -> Result<Response> {
    let payload = parse_body(&body)?;
    let objects = payload
        .get("objects")
        .and_then(Value::as_array)
        .ok_or_else(|| Error::bad_request("The request body must carry an 'objects' list."))?;
    let jobs = objects
        .iter()
        .map(NewJob::from_value)
        .collect::<Result<Vec<_>>>()?;
    let rows = state.store.replace_all(jobs).await?;
    tracing::info!(count = rows.len(), "job collection replaced");
    if state.resource.always_return_data {
        Ok((StatusCode::OK, Json(state.resource.list(rows))).into_response())
    } else {
        Ok(StatusCode::NO_CONTENT.into_response())
    }
}

pub async fn delete_list(State(state): State<AppState>) -> Result<StatusCode> {
    state.store.delete_all().await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn detail(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<JobBundle>> {
    let id = parse_id(&id)?;
    let row = state.store.get(id).await?.ok_or_else(|| missing(id))?;
    Ok(Json(state.resource.bundle(row)))
}

pub async fn replace(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Response> {
    let id = parse_id(&id)?;
    let job = NewJob::from_value(&parse_body(&body)?)?;
    let (row, created) = state.store.replace(id, job).await?;
    let bundle = state.resource.bundle(row);
    let always = state.resource.always_return_data;
    let response = match (created, always) {
        (true, true) => (
            StatusCode::CREATED,
            [(LOCATION, bundle.resource_uri.clone())],
            Json(bundle),
        )
            .into_response(),
        (true, false) => (StatusCode::CREATED, [(LOCATION, bundle.resource_uri)]).into_response(),
        (false, true) => (StatusCode::ACCEPTED, Json(bundle)).into_response(),
        (false, false) => StatusCode::NO_CONTENT.into_response(),
    };
    Ok(response)
}

pub async fn patch(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Response> {
    let id = parse_id(&id)?;
    let patch = JobPatch::from_value(&parse_body(&body)?)?;
    let row = state.store.update(id, patch).await?.ok_or_else(|| missing(id))?;
    if state.resource.always_return_data {
        Ok((StatusCode::ACCEPTED, Json(state.resource.bundle(row))).into_response())
    } else {
        Ok(StatusCode::ACCEPTED.into_response())
    }
}

pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> Result<StatusCode> {
    let id = parse_id(&id)?;
    if !state.store.delete(id).await? {
        return Err(missing(id));
    }
    tracing::info!(id, "job deleted");
    Ok(StatusCode::NO_CONTENT)
}

pub async fn schema() -> Json<Value> {
    Json(resource::schema())
}

pub async fn set(State(state): State<AppState>, Path(ids): Path<String>) -> Result<Json<JobSet>> {
    let keys = resource::parse_id_set(&ids);
    let rows = state.store.get_many(&resource::set_ids(&keys)).await?;
    Ok(Json(state.resource.set(&keys, &rows)))
}
