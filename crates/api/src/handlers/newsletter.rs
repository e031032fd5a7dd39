//! Publish a run as a Listmonk mailing campaign.

use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;
use serde_json::Value;

use hareline_core::event::{EventTime, HashEvent};
use hareline_core::filter::RunParams;
use hareline_db::{MetaRepo, UserMetaRepo};
use hareline_listmonk::NewCampaign;

use crate::auth;
use crate::error::{AppError, AppResult};
use crate::handlers::runs::fetch_runs;
use crate::state::AppState;

/// Post meta key remembering the campaign a run was published as.
const CAMPAIGN_ID_META: &str = "listmonk_campaign_id";

/// Request body: the WordPress user and raw session token presented by
/// the submit-form frontend.
#[derive(Debug, Deserialize)]
pub struct SendNewsletterParams {
    pub user: i64,
    pub token: String,
}

/// `POST /send-newsletter/{post_id}`: create (or update) a Listmonk
/// campaign from the assembled run record and optionally start it.
pub async fn send_newsletter(
    State(state): State<AppState>,
    Path(post_id): Path<i64>,
    Json(params): Json<SendNewsletterParams>,
) -> AppResult<Json<Value>> {
    let listmonk = state
        .listmonk
        .as_ref()
        .ok_or_else(|| AppError::NotFound("Newsletter publishing is not enabled".to_string()))?;

    // The caller must hold a live WordPress session.
    let user_meta = UserMetaRepo::for_user(&state.pool, params.user).await?;
    auth::verify_session_token(
        &user_meta,
        params.user,
        &params.token,
        chrono::Utc::now().timestamp(),
    )?;

    let run_params = RunParams {
        id: Some(post_id),
        ..Default::default()
    };
    let mut event = fetch_runs(&state, &run_params)
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| AppError::NotFound("Run not found".to_string()))?;

    let template_id = listmonk.config().body_template_id;
    let template = listmonk.get_template(template_id).await.ok_or_else(|| {
        AppError::NotFound(format!("Listmonk template {template_id} not found"))
    })?;

    let template_body = template
        .pointer("/data/body")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| event.event_description.clone());

    // Mail clients want centered paragraphs.
    event.event_description = event
        .event_description
        .replace("<p>", "<p style=\"text-align: center;\">");

    let campaign_body = render_template(&template_body, &event);

    // A previously published run becomes an update instead of a new
    // announcement.
    let post_meta = MetaRepo::for_posts(&state.pool, &[post_id]).await?;
    let existing_campaign_id = post_meta
        .iter()
        .find(|row| row.key == CAMPAIGN_ID_META)
        .map(|row| row.value.clone());
    let subject_prefix = if existing_campaign_id.is_some() {
        "UPDATE: "
    } else {
        ""
    };

    let campaign = NewCampaign {
        name: format!("{subject_prefix}{}", event.event_name),
        subject: format!(
            "{subject_prefix}[{}] Run #{}, {} @ {}",
            event.kennel_name,
            event.run_number.map(|n| n.to_string()).unwrap_or_default(),
            format_start_date(&event.start_date),
            event.location_name.clone().unwrap_or_default(),
        ),
        lists: listmonk.config().list_ids.clone(),
        campaign_type: "regular".to_string(),
        content_type: "html".to_string(),
        body: campaign_body,
        template_id: listmonk.config().campaign_template_id,
    };

    let mut result = listmonk
        .create_campaign(&campaign)
        .await
        .ok_or_else(|| AppError::Upstream("Upstream request failed".to_string()))?;

    let campaign_id = result
        .pointer("/data/id")
        .and_then(Value::as_i64)
        .ok_or_else(|| {
            AppError::Upstream("Listmonk did not return a campaign id".to_string())
        })?;

    if listmonk.config().send_campaign {
        result = listmonk
            .set_campaign_status(campaign_id, "running")
            .await
            .ok_or_else(|| {
                AppError::Upstream("Upstream request failed, unable to start campaign".to_string())
            })?;
    }

    if existing_campaign_id.is_some() {
        MetaRepo::update(&state.pool, post_id, CAMPAIGN_ID_META, &campaign_id.to_string()).await?;
    } else {
        MetaRepo::add(&state.pool, post_id, CAMPAIGN_ID_META, &campaign_id.to_string()).await?;
    }

    Ok(Json(result))
}

/// Substitute `{field}` placeholders with values from the serialized
/// record. Unknown placeholders stay literal; unset fields render empty.
fn render_template(template: &str, event: &HashEvent) -> String {
    let Ok(Value::Object(fields)) = serde_json::to_value(event) else {
        return template.to_string();
    };

    let mut rendered = template.to_string();
    for (key, value) in fields {
        let placeholder = format!("{{{key}}}");
        if !rendered.contains(&placeholder) {
            continue;
        }
        let replacement = match value {
            Value::String(s) => s,
            Value::Null => String::new(),
            other => other.to_string(),
        };
        rendered = rendered.replace(&placeholder, &replacement);
    }
    rendered
}

/// Subject-line timestamp, e.g. `Wednesday 01 May 2024, 10:00`.
fn format_start_date(start: &EventTime) -> String {
    const FORMAT: &str = "%A %d %B %Y, %H:%M";
    match start {
        EventTime::Naive(naive) => naive.format(FORMAT).to_string(),
        EventTime::Zoned(zoned) => zoned.format(FORMAT).to_string(),
    }
}
