//! Managed Event Manager form fields.
//!
//! The WordPress Event Manager plugin renders its submit form from a
//! PHP-serialized option blob. The custom hash fields (`hash_kennel`,
//! `hash_attributes`, ...) are managed from here: at startup the blob is
//! patched so every managed field exists and the derived attributes
//! (option maps, placeholders, kennel default) match the current
//! configuration. Patching is pure and idempotent; the caller persists the
//! result only when something changed.

use crate::event::{HashAttribute, HashScope};
use crate::phpserde::{PhpKey, PhpValue};
use crate::settings::EventSettings;
use crate::text::format_slug;

/// Minimum supported Event Manager plugin version. Older versions store
/// the form configuration in an incompatible shape.
pub const MIN_EVENT_MANAGER_VERSION: &str = "3.1.21";

const SLUG_MAX_LEN: usize = 50;

/// Version gate: same major, minor and patch at least the minimum.
/// Anything unparsable is unsupported.
pub fn version_supported(installed: &str) -> bool {
    match (parse_version(installed), parse_version(MIN_EVENT_MANAGER_VERSION)) {
        (Some([major, minor, patch]), Some([min_major, min_minor, min_patch])) => {
            major == min_major && minor >= min_minor && patch >= min_patch
        }
        _ => false,
    }
}

fn parse_version(version: &str) -> Option<[i64; 3]> {
    let mut parts = version.split('.');
    let major = parts.next()?.trim().parse().ok()?;
    let minor = parts.next()?.trim().parse().ok()?;
    let patch = parts.next()?.trim().parse().ok()?;
    Some([major, minor, patch])
}

fn array(entries: Vec<(&str, PhpValue)>) -> PhpValue {
    PhpValue::Array(
        entries
            .into_iter()
            .map(|(k, v)| (PhpKey::Str(k.to_string()), v))
            .collect(),
    )
}

fn string(value: &str) -> PhpValue {
    PhpValue::String(value.to_string())
}

fn options(pairs: impl IntoIterator<Item = (String, String)>) -> PhpValue {
    PhpValue::Array(
        pairs
            .into_iter()
            .map(|(code, label)| (PhpKey::Str(code), PhpValue::String(label)))
            .collect(),
    )
}

fn attribute_options() -> PhpValue {
    options(
        HashAttribute::ALL
            .iter()
            .map(|a| (a.slug().to_string(), a.name().to_string())),
    )
}

fn scope_options() -> PhpValue {
    options(
        HashScope::ALL
            .iter()
            .map(|s| (s.slug().to_string(), s.name().to_string())),
    )
}

fn kennel_options(settings: &EventSettings) -> PhpValue {
    options(
        settings
            .hash_kennels
            .iter()
            .map(|k| (format_slug(k, SLUG_MAX_LEN), k.clone())),
    )
}

fn kennel_default(settings: &EventSettings) -> PhpValue {
    string(&format_slug(
        settings.default_kennel.as_deref().unwrap_or(""),
        SLUG_MAX_LEN,
    ))
}

fn hash_cash_placeholder(settings: &EventSettings) -> PhpValue {
    match settings.default_hash_cash {
        Some(amount) => PhpValue::Int(amount),
        None => string(""),
    }
}

/// Full definitions of the managed fields, in the order they are added to
/// the form.
pub fn managed_fields(settings: &EventSettings) -> Vec<(&'static str, PhpValue)> {
    vec![
        (
            "hash_attributes",
            array(vec![
                ("label", string("Attributes")),
                ("description", string("select run attributes")),
                ("type", string("multiselect")),
                ("required", PhpValue::Bool(false)),
                ("options", attribute_options()),
            ]),
        ),
        (
            "hash_scope",
            array(vec![
                ("label", string("Event Promotion")),
                ("description", string("Select a scope for this run/event")),
                ("type", string("select")),
                ("required", PhpValue::Bool(false)),
                ("options", scope_options()),
            ]),
        ),
        (
            "hash_run_number",
            array(vec![
                ("label", string("Run Number")),
                ("description", string("The number of the run")),
                ("placeholder", string("123")),
                ("type", string("number")),
                ("required", PhpValue::Bool(false)),
            ]),
        ),
        (
            "hash_contact",
            array(vec![
                ("label", string("Contact")),
                ("description", string("eMail or phone number")),
                ("required", PhpValue::Bool(false)),
                ("type", string("text")),
            ]),
        ),
        (
            "hash_hares",
            array(vec![
                ("label", string("Hares")),
                ("description", string("Name of the Hares")),
                ("required", PhpValue::Bool(false)),
                ("type", string("text")),
            ]),
        ),
        (
            "hash_cash",
            array(vec![
                ("label", string("Hash Cash")),
                ("description", string("Amount of Hash Cash")),
                ("placeholder", hash_cash_placeholder(settings)),
                ("type", string("number")),
                ("required", PhpValue::Bool(false)),
            ]),
        ),
        (
            "hash_cash_non_members",
            array(vec![
                ("label", string("Hash Cash Non Members")),
                (
                    "description",
                    string("Amount of Hash Cash which are visiting or not members of this kennel"),
                ),
                ("placeholder", hash_cash_placeholder(settings)),
                ("type", string("number")),
                ("required", PhpValue::Bool(false)),
            ]),
        ),
        (
            "hash_kennel",
            array(vec![
                ("label", string("Kennel")),
                ("description", string("pick a Kennel")),
                ("type", string("select")),
                ("required", PhpValue::Bool(false)),
                ("options", kennel_options(settings)),
                ("default", kennel_default(settings)),
            ]),
        ),
        (
            "hash_location_specifics",
            array(vec![
                ("label", string("Location Specifics")),
                (
                    "description",
                    string("additional description to find the location/event"),
                ),
                ("required", PhpValue::Bool(false)),
                ("type", string("text")),
            ]),
        ),
        (
            "hash_cash_extras",
            array(vec![
                ("label", string("Hash Cash Extras")),
                (
                    "description",
                    string("additional Hash Cash amount for specials (food/drinks)"),
                ),
                ("required", PhpValue::Bool(false)),
                ("type", string("number")),
            ]),
        ),
        (
            "hash_extras_description",
            array(vec![
                ("label", string("Hash Cash Extras Description")),
                (
                    "description",
                    string("What will other Hashers be provided for the extra buck"),
                ),
                ("required", PhpValue::Bool(false)),
                ("type", string("text")),
            ]),
        ),
        (
            "hash_event_hidden",
            array(vec![
                ("label", string("Event Hidden")),
                (
                    "description",
                    string("Hide event from exposure on consumer site (Harrier Central)"),
                ),
                ("required", PhpValue::Bool(false)),
                ("type", string("checkbox")),
            ]),
        ),
    ]
}

/// Attribute overrides re-applied on every startup, so option maps and
/// defaults track the current configuration.
fn default_field_updates(settings: &EventSettings) -> Vec<(&'static str, Vec<(&'static str, PhpValue)>)> {
    vec![
        (
            "event_end_date",
            vec![("visibility", PhpValue::Int(1)), ("required", string("0"))],
        ),
        (
            "event_end_time",
            vec![("visibility", PhpValue::Int(1)), ("required", string("0"))],
        ),
        ("hash_attributes", vec![("options", attribute_options())]),
        ("hash_scope", vec![("options", scope_options())]),
        ("hash_cash", vec![("placeholder", hash_cash_placeholder(settings))]),
        (
            "hash_kennel",
            vec![
                ("options", kennel_options(settings)),
                ("default", kennel_default(settings)),
            ],
        ),
    ]
}

/// Patch the decoded form blob: add missing managed fields (priority
/// continues from the current maximum) and re-apply the fixed attribute
/// overrides.
///
/// Returns the patched blob and whether anything changed, or `None` when
/// the blob is not an array (unknown format, nothing to patch).
pub fn apply_managed_fields(
    form: &PhpValue,
    settings: &EventSettings,
) -> Option<(PhpValue, bool)> {
    if !matches!(form, PhpValue::Array(_)) {
        return None;
    }

    let mut event = form
        .get("event")
        .cloned()
        .unwrap_or(PhpValue::Array(Vec::new()));
    let mut changed = false;

    let mut priority = event
        .entries()
        .iter()
        .filter_map(|(_, field)| {
            field
                .get("priority")
                .and_then(PhpValue::as_text)
                .and_then(|p| p.parse::<i64>().ok())
        })
        .max()
        .unwrap_or(0);

    for (key, definition) in managed_fields(settings) {
        if event.get(key).is_some() {
            continue;
        }
        let mut definition = definition;
        definition.insert("priority", PhpValue::Int(priority));
        priority += 1;
        event.insert(key, definition);
        changed = true;
        tracing::info!(field = key, "Added new field to Event Manager form");
    }

    for (key, updates) in default_field_updates(settings) {
        let Some(field) = event.get_mut(key) else {
            continue;
        };
        for (attr, value) in updates {
            if field.get(attr).is_some_and(|current| loose_eq(current, &value)) {
                continue;
            }
            field.insert(attr, value);
            changed = true;
            tracing::info!(field = key, attribute = attr, "Updated Event Manager form field");
        }
    }

    let mut patched = form.clone();
    patched.insert("event", event);
    Some((patched, changed))
}

/// Stored blobs hold scalars in mixed representations (`"1"` vs `1`), so
/// scalar comparison goes through the textual form. Arrays compare
/// entry-wise with the same rule for keys.
fn loose_eq(a: &PhpValue, b: &PhpValue) -> bool {
    if let (Some(a), Some(b)) = (a.as_text(), b.as_text()) {
        return a == b;
    }
    match (a, b) {
        (PhpValue::Array(a), PhpValue::Array(b)) => {
            a.len() == b.len()
                && a.iter().zip(b.iter()).all(|((ak, av), (bk, bv))| {
                    ak.to_string() == bk.to_string() && loose_eq(av, bv)
                })
        }
        (a, b) => a == b,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::test_settings;

    fn form_with_event(fields: Vec<(&str, PhpValue)>) -> PhpValue {
        array(vec![("event", array(fields))])
    }

    fn text_field(priority: i64) -> PhpValue {
        array(vec![
            ("type", string("text")),
            ("priority", PhpValue::Int(priority)),
        ])
    }

    #[test]
    fn version_gate() {
        assert!(version_supported("3.1.21"));
        assert!(version_supported("3.1.22"));
        assert!(version_supported("3.2.21"));
        // patch level is compared independently of the minor bump
        assert!(!version_supported("3.2.0"));
        assert!(!version_supported("3.1.20"));
        assert!(!version_supported("2.9.30"));
        assert!(!version_supported("4.0.0"));
        assert!(!version_supported("3.1"));
        assert!(!version_supported("three.one.twentyone"));
        assert!(!version_supported(""));
    }

    #[test]
    fn adds_missing_fields_with_continued_priority() {
        let form = form_with_event(vec![("event_title", text_field(5))]);
        let (patched, changed) = apply_managed_fields(&form, &test_settings()).unwrap();
        assert!(changed);

        let event = patched.get("event").unwrap();
        for (key, _) in managed_fields(&test_settings()) {
            assert!(event.get(key).is_some(), "missing {key}");
        }

        // first added field takes over from the current maximum
        let first = event.get("hash_attributes").unwrap();
        assert_eq!(first.get("priority").unwrap().as_int(), Some(5));
        let second = event.get("hash_scope").unwrap();
        assert_eq!(second.get("priority").unwrap().as_int(), Some(6));
        let last = event.get("hash_event_hidden").unwrap();
        assert_eq!(last.get("priority").unwrap().as_int(), Some(16));
    }

    #[test]
    fn second_application_is_a_no_op() {
        let form = form_with_event(vec![
            ("event_title", text_field(5)),
            ("event_end_date", text_field(6)),
        ]);
        let settings = test_settings();

        let (patched, changed) = apply_managed_fields(&form, &settings).unwrap();
        assert!(changed);
        let (again, changed) = apply_managed_fields(&patched, &settings).unwrap();
        assert!(!changed);
        assert_eq!(again, patched);
    }

    #[test]
    fn reapplies_end_date_visibility() {
        let mut end_date = text_field(6);
        end_date.insert("visibility", PhpValue::Int(0));
        let form = form_with_event(vec![("event_end_date", end_date)]);

        let (patched, changed) = apply_managed_fields(&form, &test_settings()).unwrap();
        assert!(changed);
        let field = patched.get("event").unwrap().get("event_end_date").unwrap();
        assert_eq!(field.get("visibility").unwrap().as_int(), Some(1));
        assert_eq!(field.get("required").unwrap().as_str(), Some("0"));
    }

    #[test]
    fn stringly_stored_scalars_compare_equal() {
        // visibility stored as "1" (string) must not count as a change
        let mut end_date = text_field(6);
        end_date.insert("visibility", string("1"));
        end_date.insert("required", string("0"));
        let form = form_with_event(vec![("event_end_date", end_date)]);

        let (patched, _) = apply_managed_fields(&form, &test_settings()).unwrap();
        let (_, changed) = apply_managed_fields(&patched, &test_settings()).unwrap();
        assert!(!changed);
    }

    #[test]
    fn refreshes_kennel_options_when_config_changes() {
        let settings = test_settings();
        let form = form_with_event(vec![("event_title", text_field(1))]);
        let (patched, _) = apply_managed_fields(&form, &settings).unwrap();

        let mut settings = settings;
        settings.hash_kennels.push("New Town H3".to_string());
        let (patched, changed) = apply_managed_fields(&patched, &settings).unwrap();
        assert!(changed);

        let kennel = patched.get("event").unwrap().get("hash_kennel").unwrap();
        assert!(kennel
            .get("options")
            .unwrap()
            .get("new-town-h3")
            .is_some());
    }

    #[test]
    fn option_maps_hold_identifier_names_keyed_by_slug() {
        let form = form_with_event(vec![("event_title", text_field(1))]);
        let (patched, _) = apply_managed_fields(&form, &test_settings()).unwrap();
        let event = patched.get("event").unwrap();

        let attributes = event.get("hash_attributes").unwrap().get("options").unwrap();
        assert_eq!(
            attributes.get("harriette-run").unwrap().as_str(),
            Some("harriette_run")
        );
        assert_eq!(attributes.get("agm").unwrap().as_str(), Some("agm"));

        let scopes = event.get("hash_scope").unwrap().get("options").unwrap();
        assert_eq!(
            scopes.get("special-local-event").unwrap().as_str(),
            Some("special_local_event")
        );
    }

    #[test]
    fn non_array_blob_is_rejected() {
        assert!(apply_managed_fields(&PhpValue::String("b0rked".to_string()), &test_settings())
            .is_none());
        assert!(apply_managed_fields(&PhpValue::Null, &test_settings()).is_none());
    }

    #[test]
    fn missing_event_section_is_created() {
        let form = array(vec![("other", PhpValue::Int(1))]);
        let (patched, changed) = apply_managed_fields(&form, &test_settings()).unwrap();
        assert!(changed);
        assert!(patched.get("event").unwrap().get("hash_kennel").is_some());
    }
}
