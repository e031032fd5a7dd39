//! Client-supplied filter parameters and the record matcher.
//!
//! `last_update*` bounds are pushed down into the store query; everything
//! else is evaluated here against fully assembled records.

use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer};

use crate::error::CoreError;
use crate::event::{EventTime, HashAttribute, HashEvent, HashScope};

/// Comparison flavor for a range-able field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compare {
    Eq,
    Lt,
    Gt,
}

/// Filter predicate set, deserialized from the query string.
///
/// String fields match by case-insensitive substring; `deleted` and
/// `event_geographic_scope` by equality; `start_date`/`run_number` support
/// `__gt`/`__lt` range variants. At most one variant per range-able field
/// may be set.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RunParams {
    pub id: Option<i64>,
    pub limit: Option<usize>,

    pub event_name: Option<String>,
    pub kennel_name: Option<String>,
    pub event_description: Option<String>,
    pub event_type: Option<String>,
    pub event_geographic_scope: Option<HashScope>,
    /// List-valued filters have no containment semantics: a set attribute
    /// filter matches nothing. Still validated so an unknown slug is a 422.
    pub event_attributes: Option<HashAttribute>,
    pub deleted: Option<bool>,
    pub event_hidden: Option<bool>,
    pub hares: Option<String>,
    pub contact: Option<String>,
    pub location_name: Option<String>,

    pub run_number: Option<i64>,
    pub run_number__gt: Option<i64>,
    pub run_number__lt: Option<i64>,

    #[serde(default, deserialize_with = "deserialize_opt_datetime")]
    pub start_date: Option<NaiveDateTime>,
    #[serde(default, deserialize_with = "deserialize_opt_datetime")]
    pub start_date__gt: Option<NaiveDateTime>,
    #[serde(default, deserialize_with = "deserialize_opt_datetime")]
    pub start_date__lt: Option<NaiveDateTime>,

    #[serde(default, deserialize_with = "deserialize_opt_datetime")]
    pub last_update: Option<NaiveDateTime>,
    #[serde(default, deserialize_with = "deserialize_opt_datetime")]
    pub last_update__gt: Option<NaiveDateTime>,
    #[serde(default, deserialize_with = "deserialize_opt_datetime")]
    pub last_update__lt: Option<NaiveDateTime>,
}

/// Accept both `2024-05-01 10:00:00` and ISO `2024-05-01T10:00:00`.
fn deserialize_opt_datetime<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw {
        None => Ok(None),
        Some(s) => parse_datetime(&s)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid datetime: {s}"))),
    }
}

/// Parse the store's `YYYY-MM-DD HH:MM:SS` form, or the same with a `T`.
pub fn parse_datetime(s: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S"))
        .ok()
}

impl RunParams {
    /// Request-level validation: equality and range bounds on the same
    /// field are mutually exclusive.
    pub fn validate(&self) -> Result<(), CoreError> {
        let exclusive: [(&str, [bool; 3]); 3] = [
            (
                "last_update",
                [
                    self.last_update.is_some(),
                    self.last_update__gt.is_some(),
                    self.last_update__lt.is_some(),
                ],
            ),
            (
                "start_date",
                [
                    self.start_date.is_some(),
                    self.start_date__gt.is_some(),
                    self.start_date__lt.is_some(),
                ],
            ),
            (
                "run_number",
                [
                    self.run_number.is_some(),
                    self.run_number__gt.is_some(),
                    self.run_number__lt.is_some(),
                ],
            ),
        ];

        for (field, set) in exclusive {
            if set.iter().filter(|&&s| s).count() > 1 {
                return Err(CoreError::Validation(format!(
                    "only one of '{field}', '{field}__gt', '{field}__lt' may be set"
                )));
            }
        }
        Ok(())
    }

    /// The effective `last_update` bound for store-query pushdown.
    pub fn last_update_bound(&self) -> Option<(NaiveDateTime, Compare)> {
        if let Some(ts) = self.last_update {
            Some((ts, Compare::Eq))
        } else if let Some(ts) = self.last_update__lt {
            Some((ts, Compare::Lt))
        } else {
            self.last_update__gt.map(|ts| (ts, Compare::Gt))
        }
    }

    /// Evaluate every set filter field against an assembled record.
    ///
    /// Pure and total: identical inputs always yield the same result and
    /// nothing here can fail. `id`, `limit`, and `last_update*` are handled
    /// upstream and skipped. The record matches only if every examined
    /// field matches; no filters means match-all.
    pub fn matches(&self, event: &HashEvent) -> bool {
        let mut checks = Vec::new();

        checks.push(contains(&self.event_name, Some(&event.event_name)));
        checks.push(contains(&self.kennel_name, Some(&event.kennel_name)));
        checks.push(contains(
            &self.event_description,
            Some(&event.event_description),
        ));
        checks.push(contains(&self.event_type, Some(&event.event_type)));
        checks.push(contains(&self.hares, event.hares.as_deref()));
        checks.push(contains(&self.contact, event.contact.as_deref()));
        checks.push(contains(&self.location_name, event.location_name.as_deref()));

        checks.push(self.deleted.map(|want| want == event.deleted));
        checks.push(self.event_hidden.map(|want| want == event.event_hidden));
        checks.push(
            self.event_geographic_scope
                .map(|want| want == event.event_geographic_scope),
        );
        checks.push(self.event_attributes.map(|_| false));

        checks.push(ordered(
            self.run_number.map(|n| (n, Compare::Eq)),
            event.run_number,
        ));
        checks.push(ordered(
            self.run_number__gt.map(|n| (n, Compare::Gt)),
            event.run_number,
        ));
        checks.push(ordered(
            self.run_number__lt.map(|n| (n, Compare::Lt)),
            event.run_number,
        ));

        checks.push(ordered(
            self.start_date
                .map(|ts| (EventTime::Naive(ts), Compare::Eq)),
            Some(event.start_date),
        ));
        checks.push(ordered(
            self.start_date__gt
                .map(|ts| (EventTime::Naive(ts), Compare::Gt)),
            Some(event.start_date),
        ));
        checks.push(ordered(
            self.start_date__lt
                .map(|ts| (EventTime::Naive(ts), Compare::Lt)),
            Some(event.start_date),
        ));

        checks.into_iter().flatten().all(|matched| matched)
    }
}

/// Case-insensitive substring containment. `None` when the filter is unset.
fn contains(filter: &Option<String>, value: Option<&str>) -> Option<bool> {
    filter.as_ref().map(|needle| match value {
        Some(haystack) => haystack.to_lowercase().contains(&needle.to_lowercase()),
        None => false,
    })
}

/// Ordered comparison of a bound against a record value. `None` when the
/// bound is unset; a record without the value, or operands that do not
/// order (naive vs zoned timestamps), fail the check.
fn ordered<T: PartialOrd>(bound: Option<(T, Compare)>, value: Option<T>) -> Option<bool> {
    let (bound, compare) = bound?;
    let Some(value) = value else {
        return Some(false);
    };
    let result = match compare {
        Compare::Eq => value.partial_cmp(&bound) == Some(std::cmp::Ordering::Equal),
        Compare::Gt => value.partial_cmp(&bound) == Some(std::cmp::Ordering::Greater),
        Compare::Lt => value.partial_cmp(&bound) == Some(std::cmp::Ordering::Less),
    };
    Some(result)
}
