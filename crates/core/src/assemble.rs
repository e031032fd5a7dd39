//! Record assembler: joins raw post rows with their scattered metadata and
//! produces validated [`HashEvent`] records.
//!
//! Assembly is per-post and soft-failing: a post that cannot become a valid
//! record is skipped with a logged [`Skip`] reason, and the remaining posts
//! are unaffected. Posts are processed in the order given (the store query
//! returns descending-id order) and production stops once the caller's
//! result limit is reached.

use std::collections::HashMap;
use std::sync::LazyLock;

use chrono::NaiveDateTime;
use chrono_tz::Tz;
use regex::Regex;
use url::Url;

use crate::event::{EventTime, HashAttribute, HashEvent, HashScope};
use crate::fields::{FormConfig, ResolvedField};
use crate::filter::RunParams;
use crate::settings::EventSettings;
use crate::store::{RawMetaRow, RawPost};
use crate::text::{strip_to_none, unescape_entities};

/// Statuses that count as "not deleted" (together with `_cancelled == "0"`).
const LIVE_STATUSES: [&str; 2] = ["publish", "expired"];

/// Coordinates embedded in an OpenStreetMap-style fragment:
/// `.../#map=15/52.4512/13.4471`.
static OSM_COORDS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"#map=\d+/(-?\d+\.\d+)/(-?\d+\.\d+)").expect("valid regex")
});

/// Coordinates embedded in a Google-Maps-style URL: `...!3d52.45!4d13.44...`.
static GOOGLE_COORDS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"!3d(-?\d+\.\d+)!4d(-?\d+\.\d+)").expect("valid regex"));

/// Why a post produced no record. Field-level soft failures never reach
/// this level; they degrade individual fields to "no value" instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Skip {
    /// No `_event_start_date` metadata: not an event we can serve.
    MissingStartDate,
    /// Post body absent or empty.
    EmptyBody,
    /// `_event_start_date` present but not `YYYY-MM-DD HH:MM:SS`.
    UnparsableStartDate(String),
    /// A required field or typed field failed validation.
    Invalid(String),
}

impl Skip {
    fn log(&self, post_id: i64) {
        match self {
            Skip::MissingStartDate | Skip::EmptyBody => {
                tracing::debug!(post_id, reason = ?self, "Skipping post");
            }
            Skip::UnparsableStartDate(raw) => {
                tracing::error!(post_id, start_date = %raw, "Start date is not parsable, skipping post");
            }
            Skip::Invalid(msg) => {
                tracing::error!(post_id, error = %msg, "Event validation failed, skipping post");
            }
        }
    }
}

/// Assemble all qualifying posts into records, apply the filter parameters,
/// and stop at the result limit.
pub fn assemble_events(
    posts: &[RawPost],
    meta_rows: &[RawMetaRow],
    form: &FormConfig,
    settings: &EventSettings,
    params: &RunParams,
) -> Vec<HashEvent> {
    let mut meta_by_post = group_meta(meta_rows);
    let mut results = Vec::new();

    for post in posts {
        let attrs = meta_by_post.remove(&post.id).unwrap_or_default();

        let event = match build_event(post, &attrs, form, settings) {
            Ok(event) => event,
            Err(skip) => {
                skip.log(post.id);
                continue;
            }
        };

        if !params.matches(&event) {
            continue;
        }

        results.push(event);
        if params.limit.is_some_and(|limit| results.len() >= limit) {
            break;
        }
    }

    tracing::debug!(count = results.len(), "Assembled run/event results");
    results
}

/// Group metadata rows into per-post key/value maps, dropping keys whose
/// value is empty.
fn group_meta(rows: &[RawMetaRow]) -> HashMap<i64, HashMap<String, String>> {
    let mut grouped: HashMap<i64, HashMap<String, String>> = HashMap::new();
    for row in rows {
        if row.value.is_empty() {
            continue;
        }
        grouped
            .entry(row.post_id)
            .or_default()
            .insert(row.key.clone(), row.value.clone());
    }
    grouped
}

/// Build one validated record from a post and its metadata map.
pub fn build_event(
    post: &RawPost,
    attrs: &HashMap<String, String>,
    form: &FormConfig,
    settings: &EventSettings,
) -> Result<HashEvent, Skip> {
    let start_raw = attrs
        .get("_event_start_date")
        .ok_or(Skip::MissingStartDate)?;

    let body = match post.content.as_deref() {
        Some(content) if !content.is_empty() => content,
        _ => return Err(Skip::EmptyBody),
    };

    let start_naive = parse_meta_datetime(start_raw)
        .ok_or_else(|| Skip::UnparsableStartDate(start_raw.clone()))?;

    let end_naive = attrs.get("_event_end_date").and_then(|raw| {
        let parsed = parse_meta_datetime(raw);
        if parsed.is_none() {
            tracing::warn!(post_id = post.id, end_date = %raw, "End date is not parsable, dropping it");
        }
        parsed
    });

    // Only published and expired events that are not cancelled count as live.
    let deleted = !(LIVE_STATUSES.contains(&post.status.as_str())
        && attrs.get("_cancelled").map(String::as_str) == Some("0"));

    let event_name = required_string("event_name", &post.title)?;
    let event_description = required_string("event_description", body)?;
    let event_type = post
        .category
        .as_deref()
        .and_then(strip_to_none)
        .unwrap_or_else(|| settings.default_event_type.clone());

    let run_number = parse_opt_int("run_number", attrs.get("_hash_run_number"))?;

    // Hash cash: both amounts default from settings, metadata overrides;
    // a still-unset non-member amount falls back to the member amount.
    let mut hash_cash_members = settings.default_hash_cash;
    if let Some(amount) = attrs.get("_hash_cash") {
        hash_cash_members = parse_opt_int("hash_cash_members", Some(amount))?;
    }
    let mut hash_cash_non_members = settings.default_hash_cash_non_members;
    if let Some(amount) = attrs.get("_hash_cash_non_members") {
        hash_cash_non_members = parse_opt_int("hash_cash_non_members", Some(amount))?;
    }
    if hash_cash_non_members.is_none() {
        hash_cash_non_members = hash_cash_members;
    }
    let hash_cash_extras = parse_opt_int("hash_cash_extras", attrs.get("_hash_cash_extras"))?;

    let event_url = post
        .guid
        .as_deref()
        .and_then(strip_to_none)
        .map(|guid| parse_url("event_url", &unescape_entities(&guid)))
        .transpose()?;

    let image_url = form
        .resolve("_event_banner", attrs.get("_event_banner").map(String::as_str))
        .and_then(ResolvedField::into_text)
        .as_deref()
        .and_then(strip_to_none)
        .map(|raw| parse_url("image_url", &raw))
        .transpose()?;

    // Kennel whitelist: an unrecognized kennel keeps the configured fallback.
    let mut kennel_name = settings.fallback_kennel().to_string();
    if let Some(resolved) = form
        .resolve("_hash_kennel", attrs.get("_hash_kennel").map(String::as_str))
        .and_then(ResolvedField::into_text)
    {
        if settings.hash_kennels.contains(&resolved) {
            kennel_name = resolved;
        }
    }

    let event_geographic_scope = attrs
        .get("_hash_scope")
        .and_then(|slug| HashScope::from_slug(slug))
        .unwrap_or(HashScope::Unspecified);

    // Attribute list is all-or-nothing: one unknown slug rejects the list.
    let event_attributes = form
        .resolve(
            "_hash_attributes",
            attrs.get("_hash_attributes").map(String::as_str),
        )
        .and_then(ResolvedField::into_list)
        .and_then(|slugs| {
            slugs
                .iter()
                .map(|slug| HashAttribute::from_slug(slug))
                .collect::<Option<Vec<_>>>()
        });

    let geo = resolve_geo(
        attrs.get("geolocation_lat").map(String::as_str),
        attrs.get("geolocation_long").map(String::as_str),
        attrs.get("_hash_geo_map_url").map(String::as_str),
        settings,
    )?;

    // Timezone: per-event override wins over the global setting; the
    // record's last-update stamp always uses the global setting.
    let event_tz = form
        .resolve(
            "_event_timezone",
            attrs.get("_event_timezone").map(String::as_str),
        )
        .and_then(ResolvedField::into_timezone)
        .or(settings.timezone);

    Ok(HashEvent {
        id: post.id,
        last_update: EventTime::localize(post.modified, settings.timezone),
        event_name,
        kennel_name,
        event_description,
        event_type,
        event_attributes,
        event_geographic_scope,
        start_date: EventTime::localize(start_naive, event_tz),
        end_date: end_naive.map(|n| EventTime::localize(n, event_tz)),
        deleted,
        run_number,
        run_is_counted: true,
        hares: attrs.get("_hash_hares").and_then(|s| strip_to_none(s)),
        contact: attrs.get("_hash_contact").and_then(|s| strip_to_none(s)),
        geo_lat: geo.lat,
        geo_long: geo.long,
        geo_location_name: attrs
            .get("geolocation_formatted_address")
            .and_then(|s| strip_to_none(s)),
        geo_map_url: geo.map_url,
        location_name: attrs.get("_event_location").and_then(|s| strip_to_none(s)),
        location_additional_info: attrs
            .get("_hash_location_specifics")
            .and_then(|s| strip_to_none(s)),
        image_url,
        event_url,
        facebook_group_id: settings.default_facebook_group_id,
        hash_cash_members,
        hash_cash_non_members,
        event_currency: settings
            .default_currency
            .as_deref()
            .and_then(strip_to_none),
        hash_cash_extras,
        extras_description: attrs
            .get("_hash_extras_description")
            .and_then(|s| strip_to_none(s)),
        event_hidden: attrs.get("_hash_event_hidden").map(String::as_str) == Some("1"),
    })
}

/// The store's datetime format for meta values. Stricter than the filter
/// parameter parser on purpose: a `T` separator in stored data is invalid.
fn parse_meta_datetime(raw: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S").ok()
}

fn required_string(field: &str, value: &str) -> Result<String, Skip> {
    strip_to_none(value).ok_or_else(|| Skip::Invalid(format!("'{field}' must not be empty")))
}

fn parse_opt_int(field: &str, value: Option<&String>) -> Result<Option<i64>, Skip> {
    match value.map(|v| v.trim()).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(raw) => raw
            .parse::<i64>()
            .map(Some)
            .map_err(|_| Skip::Invalid(format!("'{field}' is not an integer: {raw}"))),
    }
}

fn parse_url(field: &str, raw: &str) -> Result<Url, Skip> {
    let url = Url::parse(raw)
        .map_err(|e| Skip::Invalid(format!("'{field}' is not a valid URL: {e}")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(Skip::Invalid(format!(
            "'{field}' must be an http(s) URL: {raw}"
        )));
    }
    Ok(url)
}

struct GeoFields {
    lat: Option<String>,
    long: Option<String>,
    map_url: Option<Url>,
}

/// Reconcile stored coordinates with the stored map URL.
///
/// Coordinates win a map URL synthesized from the configured template;
/// a map URL without stored coordinates backfills them by extracting the
/// latitude/longitude from an OpenStreetMap or Google Maps fragment.
fn resolve_geo(
    lat: Option<&str>,
    long: Option<&str>,
    map_url: Option<&str>,
    settings: &EventSettings,
) -> Result<GeoFields, Skip> {
    let mut lat = lat.and_then(strip_to_none);
    let mut long = long.and_then(strip_to_none);
    let stored_url = map_url.and_then(strip_to_none);

    let raw_url = match stored_url {
        None => match (&lat, &long) {
            (Some(lat), Some(long)) => Some(
                settings
                    .maps_url_template
                    .replace("{lat}", lat)
                    .replace("{long}", long),
            ),
            _ => None,
        },
        Some(stored) => {
            let pattern: &Regex = if stored.contains("google") {
                &GOOGLE_COORDS_RE
            } else {
                &OSM_COORDS_RE
            };
            if let Some(captures) = pattern.captures(&stored) {
                lat = Some(captures[1].to_string());
                long = Some(captures[2].to_string());
            }
            Some(stored)
        }
    };

    let map_url = raw_url
        .map(|raw| parse_url("geo_map_url", &raw))
        .transpose()?;

    Ok(GeoFields { lat, long, map_url })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::test_settings;

    fn post(id: i64) -> RawPost {
        RawPost {
            id,
            title: format!("Run #{id}"),
            content: Some("hi".to_string()),
            modified: parse_meta_datetime("2024-04-30 18:00:00").unwrap(),
            status: "publish".to_string(),
            guid: Some("https://example.org/?post_type=event_listing&#038;p=7".to_string()),
            category: Some("Hash Run".to_string()),
        }
    }

    fn meta(post_id: i64, key: &str, value: &str) -> RawMetaRow {
        RawMetaRow {
            post_id,
            key: key.to_string(),
            value: value.to_string(),
        }
    }

    fn base_meta(post_id: i64) -> Vec<RawMetaRow> {
        vec![
            meta(post_id, "_event_start_date", "2024-05-01 10:00:00"),
            meta(post_id, "_cancelled", "0"),
        ]
    }

    fn assemble_one(posts: &[RawPost], rows: &[RawMetaRow]) -> Vec<HashEvent> {
        assemble_events(
            posts,
            rows,
            &FormConfig::default(),
            &test_settings(),
            &RunParams::default(),
        )
    }

    #[test]
    fn published_post_becomes_live_event() {
        let events = assemble_one(&[post(7)], &base_meta(7));
        assert_eq!(events.len(), 1);

        let event = &events[0];
        assert_eq!(event.id, 7);
        assert!(!event.deleted);
        assert_eq!(
            event.start_date,
            EventTime::Naive(parse_meta_datetime("2024-05-01 10:00:00").unwrap())
        );
        assert_eq!(event.kennel_name, "Berlin H3");
        assert_eq!(event.event_type, "Hash Run");
        assert!(event.run_is_counted);
        // guid entities were unescaped before URL validation
        assert_eq!(
            event.event_url.as_ref().unwrap().as_str(),
            "https://example.org/?post_type=event_listing&p=7"
        );
    }

    #[test]
    fn missing_start_date_yields_nothing() {
        let rows = vec![meta(7, "_cancelled", "0")];
        assert!(assemble_one(&[post(7)], &rows).is_empty());
    }

    #[test]
    fn empty_body_yields_nothing() {
        let mut p = post(7);
        p.content = Some(String::new());
        assert!(assemble_one(&[p], &base_meta(7)).is_empty());

        let mut p = post(7);
        p.content = None;
        assert!(assemble_one(&[p], &base_meta(7)).is_empty());
    }

    #[test]
    fn unparsable_start_date_skips_post() {
        let rows = vec![
            meta(7, "_event_start_date", "2024-05-01"),
            meta(7, "_cancelled", "0"),
        ];
        assert!(assemble_one(&[post(7)], &rows).is_empty());
    }

    #[test]
    fn unparsable_end_date_is_dropped_not_fatal() {
        let mut rows = base_meta(7);
        rows.push(meta(7, "_event_end_date", "sometime later"));
        let events = assemble_one(&[post(7)], &rows);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].end_date, None);
    }

    #[test]
    fn deleted_unless_live_status_and_not_cancelled() {
        // cancelled flag "1"
        let rows = vec![
            meta(7, "_event_start_date", "2024-05-01 10:00:00"),
            meta(7, "_cancelled", "1"),
        ];
        assert!(assemble_one(&[post(7)], &rows)[0].deleted);

        // draft status
        let mut p = post(7);
        p.status = "draft".to_string();
        assert!(assemble_one(&[p], &base_meta(7))[0].deleted);

        // expired still counts as live
        let mut p = post(7);
        p.status = "expired".to_string();
        assert!(!assemble_one(&[p], &base_meta(7))[0].deleted);

        // missing cancelled flag means deleted
        let rows = vec![meta(7, "_event_start_date", "2024-05-01 10:00:00")];
        assert!(assemble_one(&[post(7)], &rows)[0].deleted);
    }

    #[test]
    fn hash_cash_override_and_non_member_fallback() {
        // defaults only: both amounts take the configured default
        let events = assemble_one(&[post(7)], &base_meta(7));
        assert_eq!(events[0].hash_cash_members, Some(5));
        assert_eq!(events[0].hash_cash_non_members, Some(5));

        // member override propagates to the absent non-member amount
        let mut rows = base_meta(7);
        rows.push(meta(7, "_hash_cash", "8"));
        let events = assemble_one(&[post(7)], &rows);
        assert_eq!(events[0].hash_cash_members, Some(8));
        assert_eq!(events[0].hash_cash_non_members, Some(8));

        // explicit non-member amount wins
        let mut rows = base_meta(7);
        rows.push(meta(7, "_hash_cash", "8"));
        rows.push(meta(7, "_hash_cash_non_members", "10"));
        let events = assemble_one(&[post(7)], &rows);
        assert_eq!(events[0].hash_cash_non_members, Some(10));
    }

    #[test]
    fn distinct_non_member_default_survives_member_override() {
        let mut settings = test_settings();
        settings.default_hash_cash_non_members = Some(3);

        let assemble = |rows: &[RawMetaRow]| {
            assemble_events(
                &[post(7)],
                rows,
                &FormConfig::default(),
                &settings,
                &RunParams::default(),
            )
        };

        // defaults only: the non-member amount keeps its own default
        let events = assemble(&base_meta(7));
        assert_eq!(events[0].hash_cash_members, Some(5));
        assert_eq!(events[0].hash_cash_non_members, Some(3));

        // a member override does not touch the configured non-member default
        let mut rows = base_meta(7);
        rows.push(meta(7, "_hash_cash", "8"));
        let events = assemble(&rows);
        assert_eq!(events[0].hash_cash_members, Some(8));
        assert_eq!(events[0].hash_cash_non_members, Some(3));
    }

    #[test]
    fn non_numeric_run_number_skips_post() {
        let mut rows = base_meta(7);
        rows.push(meta(7, "_hash_run_number", "one thousand"));
        assert!(assemble_one(&[post(7)], &rows).is_empty());
    }

    #[test]
    fn osm_map_url_backfills_coordinates() {
        let mut rows = base_meta(7);
        rows.push(meta(
            7,
            "_hash_geo_map_url",
            "https://www.openstreetmap.org/#map=15/52.4512/13.4471",
        ));
        let events = assemble_one(&[post(7)], &rows);
        assert_eq!(events[0].geo_lat.as_deref(), Some("52.4512"));
        assert_eq!(events[0].geo_long.as_deref(), Some("13.4471"));
    }

    #[test]
    fn google_map_url_backfills_coordinates() {
        let mut rows = base_meta(7);
        rows.push(meta(
            7,
            "_hash_geo_map_url",
            "https://www.google.com/maps/place/x/@52.45,13.44,17z/data=!3m1!4b1!4m5!3m4!8m2!3d-52.4512!4d13.4471",
        ));
        let events = assemble_one(&[post(7)], &rows);
        assert_eq!(events[0].geo_lat.as_deref(), Some("-52.4512"));
        assert_eq!(events[0].geo_long.as_deref(), Some("13.4471"));
    }

    #[test]
    fn coordinates_synthesize_map_url() {
        let mut rows = base_meta(7);
        rows.push(meta(7, "geolocation_lat", "52.4512"));
        rows.push(meta(7, "geolocation_long", "13.4471"));
        let events = assemble_one(&[post(7)], &rows);
        assert_eq!(
            events[0].geo_map_url.as_ref().unwrap().as_str(),
            "https://www.openstreetmap.org/#map=17/52.4512/13.4471"
        );
    }

    #[test]
    fn invalid_map_url_skips_post() {
        let mut rows = base_meta(7);
        rows.push(meta(7, "_hash_geo_map_url", "not a url"));
        assert!(assemble_one(&[post(7)], &rows).is_empty());
    }

    #[test]
    fn unknown_attribute_slug_rejects_whole_list() {
        let form = FormConfig::from_php(
            &crate::phpserde::decode(
                "a:1:{s:5:\"event\";a:1:{s:15:\"hash_attributes\";a:1:{s:4:\"type\";s:11:\"multiselect\";}}}",
            )
            .unwrap(),
        )
        .unwrap();

        let mut rows = base_meta(7);
        rows.push(meta(7, "_hash_attributes", "a:1:{i:0;s:8:\"bad-slug\";}"));
        let events = assemble_events(
            &[post(7)],
            &rows,
            &form,
            &test_settings(),
            &RunParams::default(),
        );
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_attributes, None);

        let mut rows = base_meta(7);
        rows.push(meta(
            7,
            "_hash_attributes",
            "a:2:{i:0;s:12:\"walker-trail\";i:1;s:8:\"on-after\";}",
        ));
        let events = assemble_events(
            &[post(7)],
            &rows,
            &form,
            &test_settings(),
            &RunParams::default(),
        );
        assert_eq!(
            events[0].event_attributes,
            Some(vec![HashAttribute::WalkerTrail, HashAttribute::OnAfter])
        );
    }

    #[test]
    fn kennel_outside_whitelist_keeps_fallback() {
        let form = FormConfig::from_php(
            &crate::phpserde::decode(
                "a:1:{s:5:\"event\";a:1:{s:11:\"hash_kennel\";a:2:{s:4:\"type\";s:6:\"select\";\
                 s:7:\"options\";a:2:{s:12:\"full-moon-h3\";s:12:\"Full Moon H3\";s:8:\"other-h3\";s:8:\"Other H3\";}}}}",
            )
            .unwrap(),
        )
        .unwrap();

        let mut rows = base_meta(7);
        rows.push(meta(7, "_hash_kennel", "full-moon-h3"));
        let events = assemble_events(
            &[post(7)],
            &rows,
            &form,
            &test_settings(),
            &RunParams::default(),
        );
        assert_eq!(events[0].kennel_name, "Full Moon H3");

        let mut rows = base_meta(7);
        rows.push(meta(7, "_hash_kennel", "other-h3"));
        let events = assemble_events(
            &[post(7)],
            &rows,
            &form,
            &test_settings(),
            &RunParams::default(),
        );
        assert_eq!(events[0].kennel_name, "Berlin H3");
    }

    #[test]
    fn event_timezone_override_wins_over_global() {
        let form = FormConfig::from_php(
            &crate::phpserde::decode(
                "a:1:{s:5:\"event\";a:1:{s:14:\"event_timezone\";a:1:{s:4:\"type\";s:8:\"timezone\";}}}",
            )
            .unwrap(),
        )
        .unwrap();

        let mut settings = test_settings();
        settings.timezone = Some(chrono_tz::Europe::London);

        let mut rows = base_meta(7);
        rows.push(meta(7, "_event_timezone", "Europe/Berlin"));
        let events = assemble_events(
            &[post(7)],
            &rows,
            &form,
            &settings,
            &RunParams::default(),
        );

        // start date localized to the event's own zone...
        assert_eq!(
            serde_json::to_value(&events[0].start_date).unwrap(),
            serde_json::json!("2024-05-01T10:00:00+02:00")
        );
        // ...while last_update stays on the global zone.
        assert_eq!(
            serde_json::to_value(&events[0].last_update).unwrap(),
            serde_json::json!("2024-04-30T18:00:00+01:00")
        );
    }

    #[test]
    fn scope_falls_back_to_unspecified() {
        let mut rows = base_meta(7);
        rows.push(meta(7, "_hash_scope", "continental-breakfast"));
        let events = assemble_one(&[post(7)], &rows);
        assert_eq!(events[0].event_geographic_scope, HashScope::Unspecified);

        let mut rows = base_meta(7);
        rows.push(meta(7, "_hash_scope", "nash-hash-event"));
        let events = assemble_one(&[post(7)], &rows);
        assert_eq!(events[0].event_geographic_scope, HashScope::NashHashEvent);
    }

    #[test]
    fn empty_meta_values_are_dropped_before_grouping() {
        let rows = vec![
            meta(7, "_event_start_date", "2024-05-01 10:00:00"),
            meta(7, "_cancelled", "0"),
            meta(7, "_hash_hares", ""),
        ];
        let events = assemble_one(&[post(7)], &rows);
        assert_eq!(events[0].hares, None);
    }

    #[test]
    fn respects_post_order_and_limit() {
        let posts = vec![post(9), post(8), post(7)];
        let rows: Vec<RawMetaRow> = [9, 8, 7].iter().flat_map(|id| base_meta(*id)).collect();

        let params = RunParams {
            limit: Some(2),
            ..Default::default()
        };
        let events = assemble_events(
            &posts,
            &rows,
            &FormConfig::default(),
            &test_settings(),
            &params,
        );
        assert_eq!(
            events.iter().map(|e| e.id).collect::<Vec<_>>(),
            vec![9, 8]
        );
    }

    #[test]
    fn filter_params_are_applied() {
        let posts = vec![post(9), post(8)];
        let mut rows: Vec<RawMetaRow> = base_meta(9);
        rows.extend(base_meta(8));
        rows.push(meta(8, "_hash_hares", "No Name"));

        let params = RunParams {
            hares: Some("no name".to_string()),
            ..Default::default()
        };
        let events = assemble_events(
            &posts,
            &rows,
            &FormConfig::default(),
            &test_settings(),
            &params,
        );
        assert_eq!(events.iter().map(|e| e.id).collect::<Vec<_>>(), vec![8]);
    }
}
