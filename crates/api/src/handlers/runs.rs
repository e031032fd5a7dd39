//! Read endpoints for assembled hash run records.

use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::Json;

use hareline_core::assemble::assemble_events;
use hareline_core::event::HashEvent;
use hareline_core::fields::FormConfig;
use hareline_core::filter::RunParams;
use hareline_core::phpserde;
use hareline_db::{DbPool, MetaRepo, OptionRepo, PostQuery, PostRepo};

use crate::auth;
use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// WordPress option holding the submit form field configuration.
pub const FORM_FIELDS_OPTION: &str = "event_manager_submit_event_form_fields";

/// `GET /runs/all`: all matching runs, newest first.
pub async fn list_runs(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<RunParams>,
) -> AppResult<Json<Vec<HashEvent>>> {
    auth::api_token_valid(&headers, state.api_token.as_deref())?;
    params.validate()?;

    let events = fetch_runs(&state, &params).await?;
    Ok(Json(events))
}

/// `GET /runs/{id}`: a single run or 404.
pub async fn get_run(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> AppResult<Json<HashEvent>> {
    auth::api_token_valid(&headers, state.api_token.as_deref())?;

    let params = RunParams {
        id: Some(id),
        ..Default::default()
    };
    let events = fetch_runs(&state, &params).await?;

    events
        .into_iter()
        .next()
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Run not found".to_string()))
}

/// Shared fetch pipeline: posts (with `last_update` pushdown), their
/// metadata, the form configuration, then assembly.
pub(crate) async fn fetch_runs(
    state: &AppState,
    params: &RunParams,
) -> AppResult<Vec<HashEvent>> {
    let query = PostQuery {
        id: params.id,
        modified: params.last_update_bound(),
    };
    let posts = PostRepo::fetch(&state.pool, &query).await?;
    if posts.is_empty() {
        return Ok(Vec::new());
    }

    let post_ids: Vec<i64> = posts.iter().map(|post| post.id).collect();
    let meta_rows = MetaRepo::for_posts(&state.pool, &post_ids).await?;
    let form = load_form_config(&state.pool).await?;

    Ok(assemble_events(
        &posts,
        &meta_rows,
        &form,
        &state.settings,
        params,
    ))
}

/// Load and decode the dynamic form configuration. A missing or
/// malformed option degrades the resolver to pass-through.
async fn load_form_config(pool: &DbPool) -> AppResult<FormConfig> {
    let form = OptionRepo::get(pool, FORM_FIELDS_OPTION)
        .await?
        .and_then(|blob| match phpserde::decode(&blob) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to decode form field configuration");
                None
            }
        })
        .and_then(|value| FormConfig::from_php(&value))
        .unwrap_or_default();
    Ok(form)
}
