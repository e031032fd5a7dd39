//! Server and event configuration.
//!
//! Loaded from environment variables at startup. Event settings left
//! unset in the environment are hydrated from the WordPress `wp_options`
//! table (WordPress itself stores `timezone_string` and the blog options
//! there), then validated into an immutable [`EventSettings`].

use std::str::FromStr;

use chrono_tz::Tz;

use hareline_core::settings::EventSettings;
use hareline_core::text::split_quoted;
use hareline_db::{DbPool, OptionRepo};
use hareline_listmonk::ListmonkConfig;

const DEFAULT_MAPS_URL_TEMPLATE: &str = "https://www.openstreetmap.org/#map=17/{lat}/{long}";

/// Validation failures that make the process unable to serve requests.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("'HASH_KENNELS' must name at least one kennel")]
    NoKennels,
    #[error("Time zone unknown: {0}")]
    UnknownTimezone(String),
    #[error("Hash kennel '{0}' must be in the list of 'HASH_KENNELS'")]
    DefaultKennelNotListed(String),
    #[error("'{key}' is not an integer: {value}")]
    InvalidNumber { key: &'static str, value: String },
}

/// Raw event settings as read from the environment/store, before
/// validation.
#[derive(Debug, Clone, Default)]
pub struct EventConfig {
    pub hash_kennels: Option<String>,
    pub default_kennel: Option<String>,
    pub default_event_type: String,
    pub default_hash_cash: Option<String>,
    pub default_hash_cash_non_members: Option<String>,
    pub default_currency: Option<String>,
    pub default_facebook_group_id: Option<String>,
    pub timezone_string: Option<String>,
    pub maps_url_template: String,
}

/// Server configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// MySQL connection string for the WordPress database.
    pub database_url: String,
    /// Optional static API token guarding the run endpoints.
    pub api_token: Option<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    pub event: EventConfig,
    /// Listmonk settings; `None` when `LISTMONK_ENABLED` is not set.
    pub listmonk: Option<ListmonkConfig>,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// Panics on malformed values; misconfiguration should fail fast.
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let event = EventConfig {
            hash_kennels: env_opt("HASH_KENNELS"),
            default_kennel: env_opt("DEFAULT_KENNEL"),
            default_event_type: std::env::var("DEFAULT_EVENT_TYPE")
                .unwrap_or_else(|_| "Hash Run".into()),
            default_hash_cash: env_opt("DEFAULT_HASH_CASH"),
            default_hash_cash_non_members: env_opt("DEFAULT_HASH_CASH_NON_MEMBERS"),
            default_currency: env_opt("DEFAULT_CURRENCY"),
            default_facebook_group_id: env_opt("DEFAULT_FACEBOOK_GROUP_ID"),
            timezone_string: env_opt("TIMEZONE_STRING"),
            maps_url_template: std::env::var("MAPS_URL_TEMPLATE")
                .unwrap_or_else(|_| DEFAULT_MAPS_URL_TEMPLATE.into()),
        };

        Self {
            host,
            port,
            database_url,
            api_token: env_opt("API_TOKEN"),
            request_timeout_secs,
            event,
            listmonk: listmonk_from_env(),
        }
    }

    /// Fill event settings left unset in the environment from the
    /// `wp_options` table.
    pub async fn hydrate_from_store(&mut self, pool: &DbPool) -> Result<(), sqlx::Error> {
        let fields: [(&str, &mut Option<String>); 7] = [
            ("hash_kennels", &mut self.event.hash_kennels),
            ("default_kennel", &mut self.event.default_kennel),
            ("default_hash_cash", &mut self.event.default_hash_cash),
            (
                "default_hash_cash_non_members",
                &mut self.event.default_hash_cash_non_members,
            ),
            ("timezone_string", &mut self.event.timezone_string),
            ("default_currency", &mut self.event.default_currency),
            (
                "default_facebook_group_id",
                &mut self.event.default_facebook_group_id,
            ),
        ];

        for (option_name, slot) in fields {
            if slot.is_some() {
                continue;
            }
            if let Some(value) = OptionRepo::get(pool, option_name).await? {
                tracing::debug!(option = option_name, %value, "Hydrated setting from wp_options");
                *slot = Some(value);
            }
        }
        Ok(())
    }

    /// Validate the raw event settings into [`EventSettings`].
    pub fn build_settings(&self) -> Result<EventSettings, ConfigError> {
        let hash_kennels = split_quoted(
            self.event.hash_kennels.as_deref().unwrap_or_default(),
            true,
        );
        if hash_kennels.is_empty() {
            return Err(ConfigError::NoKennels);
        }

        let default_kennel = match &self.event.default_kennel {
            Some(kennel) if !hash_kennels.contains(kennel) => {
                return Err(ConfigError::DefaultKennelNotListed(kennel.clone()));
            }
            other => other.clone(),
        };

        let timezone = self
            .event
            .timezone_string
            .as_deref()
            .map(|name| {
                Tz::from_str(name).map_err(|_| ConfigError::UnknownTimezone(name.to_string()))
            })
            .transpose()?;

        let default_hash_cash = parse_opt_i64("DEFAULT_HASH_CASH", &self.event.default_hash_cash)?;
        let default_hash_cash_non_members = parse_opt_i64(
            "DEFAULT_HASH_CASH_NON_MEMBERS",
            &self.event.default_hash_cash_non_members,
        )?;
        let default_facebook_group_id = parse_opt_i64(
            "DEFAULT_FACEBOOK_GROUP_ID",
            &self.event.default_facebook_group_id,
        )?;

        Ok(EventSettings {
            hash_kennels,
            default_kennel,
            default_event_type: self.event.default_event_type.clone(),
            default_hash_cash,
            default_hash_cash_non_members,
            default_currency: self.event.default_currency.clone(),
            default_facebook_group_id,
            timezone,
            maps_url_template: self.event.maps_url_template.clone(),
        })
    }
}

fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_opt_i64(key: &'static str, value: &Option<String>) -> Result<Option<i64>, ConfigError> {
    value
        .as_deref()
        .map(|raw| {
            raw.trim().parse().map_err(|_| ConfigError::InvalidNumber {
                key,
                value: raw.to_string(),
            })
        })
        .transpose()
}

/// Listmonk settings; only assembled when `LISTMONK_ENABLED` is truthy.
/// Required fields panic when missing, the same fail-fast rule as above.
fn listmonk_from_env() -> Option<ListmonkConfig> {
    if !env_bool("LISTMONK_ENABLED") {
        return None;
    }

    let list_ids = std::env::var("LISTMONK_LIST_IDS")
        .expect("LISTMONK_LIST_IDS must be set when Listmonk is enabled")
        .split(',')
        .map(|id| {
            id.trim()
                .parse()
                .expect("LISTMONK_LIST_IDS must be comma-separated integers")
        })
        .collect();

    Some(ListmonkConfig {
        enabled: true,
        host: std::env::var("LISTMONK_HOST")
            .expect("LISTMONK_HOST must be set when Listmonk is enabled"),
        username: std::env::var("LISTMONK_USERNAME")
            .expect("LISTMONK_USERNAME must be set when Listmonk is enabled"),
        password: std::env::var("LISTMONK_PASSWORD")
            .expect("LISTMONK_PASSWORD must be set when Listmonk is enabled"),
        body_template_id: std::env::var("LISTMONK_BODY_TEMPLATE_ID")
            .expect("LISTMONK_BODY_TEMPLATE_ID must be set when Listmonk is enabled")
            .parse()
            .expect("LISTMONK_BODY_TEMPLATE_ID must be an integer"),
        campaign_template_id: env_opt("LISTMONK_CAMPAIGN_TEMPLATE_ID")
            .map(|id| id.parse().expect("LISTMONK_CAMPAIGN_TEMPLATE_ID must be an integer")),
        list_ids,
        send_campaign: env_bool("LISTMONK_SEND_CAMPAIGN"),
    })
}

fn env_bool(key: &str) -> bool {
    matches!(
        std::env::var(key).unwrap_or_default().to_lowercase().as_str(),
        "1" | "true" | "yes"
    )
}
