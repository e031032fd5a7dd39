//! Global assembly settings.
//!
//! Assembled once at startup (environment plus `wp_options` hydration, see
//! the api crate) and passed by reference into the assembler. Nothing here
//! is mutated after startup.

use chrono_tz::Tz;

/// Defaults and whitelists applied during record assembly.
#[derive(Debug, Clone)]
pub struct EventSettings {
    /// Whitelist of kennel names. The first entry is the fallback
    /// `kennel_name` for events without a recognized kennel. Never empty.
    pub hash_kennels: Vec<String>,
    /// Default kennel pre-selected in the submit form. Must be a member of
    /// `hash_kennels` when set.
    pub default_kennel: Option<String>,
    /// Event type label used when a post carries no taxonomy term.
    pub default_event_type: String,
    pub default_hash_cash: Option<i64>,
    /// Distinct non-member default; when unset the non-member amount falls
    /// back to the member amount.
    pub default_hash_cash_non_members: Option<i64>,
    pub default_currency: Option<String>,
    pub default_facebook_group_id: Option<i64>,
    /// Global timezone; overridden per event by the `_event_timezone`
    /// field. `None` leaves timestamps naive.
    pub timezone: Option<Tz>,
    /// Template used to synthesize a map URL from stored coordinates.
    /// `{lat}` and `{long}` placeholders are substituted.
    pub maps_url_template: String,
}

impl EventSettings {
    /// The fallback kennel name.
    pub fn fallback_kennel(&self) -> &str {
        &self.hash_kennels[0]
    }
}

#[cfg(test)]
pub(crate) fn test_settings() -> EventSettings {
    EventSettings {
        hash_kennels: vec!["Berlin H3".to_string(), "Full Moon H3".to_string()],
        default_kennel: Some("Berlin H3".to_string()),
        default_event_type: "hash-run".to_string(),
        default_hash_cash: Some(5),
        default_hash_cash_non_members: None,
        default_currency: Some("\u{20ac}".to_string()),
        default_facebook_group_id: Some(123456),
        timezone: None,
        maps_url_template: "https://www.openstreetmap.org/#map=17/{lat}/{long}".to_string(),
    }
}
