//! REST API client for a Listmonk mailing server.
//!
//! Wraps the handful of Listmonk endpoints needed to publish an event as
//! a mailing campaign. Requests use basic auth and a fixed five-second
//! timeout. Every call converts failures (network, timeout, non-2xx) to
//! `None` after logging; the caller decides whether that is fatal.

use std::time::Duration;

use serde::Serialize;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);
const USER_AGENT: &str = concat!("hareline/", env!("CARGO_PKG_VERSION"));

/// Connection settings for the Listmonk server.
#[derive(Debug, Clone)]
pub struct ListmonkConfig {
    /// Whether campaign publishing is enabled at all.
    pub enabled: bool,
    /// Hostname; the API is always addressed as `https://<host>/api`.
    pub host: String,
    pub username: String,
    pub password: String,
    /// Template whose body supplies the campaign text.
    pub body_template_id: i64,
    /// Optional layout template applied to created campaigns.
    pub campaign_template_id: Option<i64>,
    /// Subscriber lists campaigns are addressed to.
    pub list_ids: Vec<i64>,
    /// Start created campaigns immediately.
    pub send_campaign: bool,
}

/// Payload for `POST /api/campaigns`.
#[derive(Debug, Clone, Serialize)]
pub struct NewCampaign {
    pub name: String,
    pub subject: String,
    pub lists: Vec<i64>,
    #[serde(rename = "type")]
    pub campaign_type: String,
    pub content_type: String,
    pub body: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template_id: Option<i64>,
}

/// HTTP client for one Listmonk server.
pub struct ListmonkClient {
    client: reqwest::Client,
    api_url: String,
    config: ListmonkConfig,
}

/// Errors from client construction. Requests themselves never error out
/// to the caller; they degrade to `None`.
#[derive(Debug, thiserror::Error)]
pub enum ListmonkError {
    #[error("Failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
    #[error("Listmonk connection to '{0}' failed")]
    Unreachable(String),
}

impl ListmonkClient {
    /// Build the client from its configuration.
    pub fn new(config: ListmonkConfig) -> Result<Self, ListmonkError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()?;
        let api_url = format!("https://{}/api", config.host);
        Ok(Self {
            client,
            api_url,
            config,
        })
    }

    pub fn config(&self) -> &ListmonkConfig {
        &self.config
    }

    /// Verify the server is reachable by fetching `/api/config` and log
    /// the detected Listmonk version.
    pub async fn connect(&self) -> Result<(), ListmonkError> {
        tracing::debug!("Initializing Listmonk connection");

        let response = self
            .request(reqwest::Method::GET, "config", None)
            .await
            .ok_or_else(|| ListmonkError::Unreachable(self.api_url.clone()))?;

        let version = response
            .pointer("/data/version")
            .and_then(|v| v.as_str())
            .unwrap_or("unknown");

        tracing::info!(url = %self.api_url, version, "Successfully connected to Listmonk");
        Ok(())
    }

    /// Fetch a template by id.
    pub async fn get_template(&self, template_id: i64) -> Option<serde_json::Value> {
        self.request(
            reqwest::Method::GET,
            &format!("templates/{template_id}"),
            None,
        )
        .await
    }

    /// Create a new campaign.
    pub async fn create_campaign(&self, campaign: &NewCampaign) -> Option<serde_json::Value> {
        let body = match serde_json::to_value(campaign) {
            Ok(body) => body,
            Err(e) => {
                tracing::error!(error = %e, "Failed to serialize campaign payload");
                return None;
            }
        };
        self.request(reqwest::Method::POST, "campaigns", Some(body))
            .await
    }

    /// Change a campaign's status (e.g. `running` to start sending).
    pub async fn set_campaign_status(
        &self,
        campaign_id: i64,
        status: &str,
    ) -> Option<serde_json::Value> {
        self.request(
            reqwest::Method::PUT,
            &format!("campaigns/{campaign_id}/status"),
            Some(serde_json::json!({ "status": status })),
        )
        .await
    }

    /// Perform one request against an endpoint below `/api/`. Any failure
    /// is logged and yields `None`.
    async fn request(
        &self,
        method: reqwest::Method,
        endpoint: &str,
        body: Option<serde_json::Value>,
    ) -> Option<serde_json::Value> {
        let url = format!("{}/{endpoint}", self.api_url);

        let mut request = self
            .client
            .request(method.clone(), &url)
            .basic_auth(&self.config.username, Some(&self.config.password));
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(%url, error = %e, "Listmonk request failed");
                return None;
            }
        };

        let status = response.status();
        tracing::debug!(%status, "Received Listmonk HTTP status");

        let result: Option<serde_json::Value> = response.json().await.ok();

        if !status.is_success() {
            tracing::error!(
                %method, %url, %status,
                body = %result.as_ref().map(|r| r.to_string()).unwrap_or_default(),
                "Listmonk returned an error status"
            );
            return None;
        }

        result
    }
}
