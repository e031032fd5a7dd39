//! Field-Resolver: interprets the dynamic Event Manager form configuration.
//!
//! The WordPress option `event_manager_submit_event_form_fields` is a
//! PHP-serialized blob describing custom form fields. A stored meta value
//! only becomes meaningful through its field's declared type: a `select`
//! code maps to an option label, a `file` value is a serialized list whose
//! first entry is the URL, and so on.
//!
//! Resolution is field-level soft-fail throughout: any malformed field
//! definition or stored value yields `None` and never aborts assembly of
//! the rest of the record.

use std::collections::HashMap;
use std::str::FromStr;

use chrono_tz::Tz;

use crate::phpserde::{self, PhpValue};

/// Declared type of one dynamic form field. Closed dispatch: each variant
/// resolves through its own pure function below.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    Select,
    Radio,
    File,
    Multiselect,
    Timezone,
    /// Any other declared type (`text`, `number`, `checkbox`, ...); stored
    /// values pass through unchanged.
    Other(String),
}

impl FieldKind {
    fn from_tag(tag: &str) -> FieldKind {
        match tag {
            "select" => FieldKind::Select,
            "radio" => FieldKind::Radio,
            "file" => FieldKind::File,
            "multiselect" => FieldKind::Multiselect,
            "timezone" => FieldKind::Timezone,
            other => FieldKind::Other(other.to_string()),
        }
    }
}

/// One entry of the form configuration: a type tag and, for choice types,
/// the stored-code to label option map.
#[derive(Debug, Clone)]
pub struct FieldConfig {
    pub kind: FieldKind,
    pub options: Vec<(String, String)>,
}

impl FieldConfig {
    fn option_label(&self, code: &str) -> Option<&str> {
        self.options
            .iter()
            .find(|(c, _)| c == code)
            .map(|(_, label)| label.as_str())
    }
}

/// The semantic value of a resolved field.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedField {
    Text(String),
    List(Vec<String>),
    Timezone(Tz),
}

impl ResolvedField {
    pub fn into_text(self) -> Option<String> {
        match self {
            ResolvedField::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn into_list(self) -> Option<Vec<String>> {
        match self {
            ResolvedField::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn into_timezone(self) -> Option<Tz> {
        match self {
            ResolvedField::Timezone(tz) => Some(tz),
            _ => None,
        }
    }
}

/// Parsed view of the `event` section of the form configuration blob.
#[derive(Debug, Clone, Default)]
pub struct FormConfig {
    fields: HashMap<String, FieldConfig>,
}

impl FormConfig {
    /// Build from the decoded option blob. Returns `None` when the blob has
    /// no usable `event` section; the resolver then degrades to pass-through.
    pub fn from_php(value: &PhpValue) -> Option<FormConfig> {
        let event = value.get("event")?;
        let mut fields = HashMap::new();

        for (key, field) in event.entries() {
            let tag = match field.get("type").and_then(PhpValue::as_str) {
                Some(tag) => tag,
                None => continue,
            };
            let options = field
                .get("options")
                .map(|opts| {
                    opts.entries()
                        .iter()
                        .filter_map(|(code, label)| {
                            Some((code.to_string(), label.as_text()?))
                        })
                        .collect()
                })
                .unwrap_or_default();

            fields.insert(
                key.to_string(),
                FieldConfig {
                    kind: FieldKind::from_tag(tag),
                    options,
                },
            );
        }

        Some(FormConfig { fields })
    }

    pub fn field(&self, key: &str) -> Option<&FieldConfig> {
        self.fields.get(key)
    }

    /// Resolve a stored meta value through its field definition.
    ///
    /// `field_key` carries the meta-table sigil (`_event_banner`); the form
    /// configuration stores it without. A key without sigil, or one with no
    /// matching field, passes the stored value through unchanged.
    pub fn resolve(&self, field_key: &str, stored: Option<&str>) -> Option<ResolvedField> {
        let bare_key = match field_key.strip_prefix('_') {
            Some(bare) => bare,
            None => return stored.map(|s| ResolvedField::Text(s.to_string())),
        };

        let config = match self.fields.get(bare_key) {
            Some(config) => config,
            None => return stored.map(|s| ResolvedField::Text(s.to_string())),
        };

        let stored = stored?;
        match &config.kind {
            FieldKind::Select | FieldKind::Radio => resolve_choice(stored, config),
            FieldKind::File => resolve_file(stored),
            FieldKind::Multiselect => resolve_multiselect(stored),
            FieldKind::Timezone => resolve_timezone(stored),
            FieldKind::Other(_) => Some(ResolvedField::Text(stored.to_string())),
        }
    }
}

/// `select`/`radio`: map the stored code to its option label.
pub fn resolve_choice(stored: &str, config: &FieldConfig) -> Option<ResolvedField> {
    config
        .option_label(stored)
        .map(|label| ResolvedField::Text(label.to_string()))
}

/// `file`: the stored value is a PHP-serialized list; take entry 0.
pub fn resolve_file(stored: &str) -> Option<ResolvedField> {
    let value = phpserde::decode(stored).ok()?;
    value
        .get_index(0)
        .and_then(PhpValue::as_text)
        .map(ResolvedField::Text)
}

/// `multiselect`: the stored value is a PHP-serialized list of codes.
/// Values are kept as stored (not mapped to option labels).
pub fn resolve_multiselect(stored: &str) -> Option<ResolvedField> {
    let value = phpserde::decode(stored).ok()?;
    match value {
        PhpValue::Array(entries) => Some(ResolvedField::List(
            entries
                .into_iter()
                .filter_map(|(_, v)| v.as_text())
                .collect(),
        )),
        _ => None,
    }
}

/// `timezone`: the stored value is an IANA timezone name.
pub fn resolve_timezone(stored: &str) -> Option<ResolvedField> {
    Tz::from_str(stored).ok().map(ResolvedField::Timezone)
}
