//! The assembled hash-run event record and its closed enumerations.

use std::cmp::Ordering;

use chrono::{DateTime, NaiveDateTime};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use url::Url;

/// Geographic scope of an event. Unrecognized or missing stored values fall
/// back to [`HashScope::Unspecified`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HashScope {
    Unspecified,
    RegularRun,
    SpecialLocalEvent,
    SpecialRegionalEvent,
    NashHashEvent,
    InterhashEvent,
    WorldInterhashEvent,
    OtherSpecialEvent,
}

impl HashScope {
    pub const ALL: [HashScope; 8] = [
        HashScope::Unspecified,
        HashScope::RegularRun,
        HashScope::SpecialLocalEvent,
        HashScope::SpecialRegionalEvent,
        HashScope::NashHashEvent,
        HashScope::InterhashEvent,
        HashScope::WorldInterhashEvent,
        HashScope::OtherSpecialEvent,
    ];

    /// The stored wire form, e.g. `special-local-event`.
    pub fn slug(self) -> &'static str {
        match self {
            HashScope::Unspecified => "unspecified",
            HashScope::RegularRun => "regular-run",
            HashScope::SpecialLocalEvent => "special-local-event",
            HashScope::SpecialRegionalEvent => "special-regional-event",
            HashScope::NashHashEvent => "nash-hash-event",
            HashScope::InterhashEvent => "interhash-event",
            HashScope::WorldInterhashEvent => "world-interhash-event",
            HashScope::OtherSpecialEvent => "other-special-event",
        }
    }

    /// Identifier name written into the submit-form option map.
    pub fn name(self) -> &'static str {
        match self {
            HashScope::Unspecified => "unspecified",
            HashScope::RegularRun => "regular_run",
            HashScope::SpecialLocalEvent => "special_local_event",
            HashScope::SpecialRegionalEvent => "special_regional_event",
            HashScope::NashHashEvent => "nash_hash_event",
            HashScope::InterhashEvent => "interhash_event",
            HashScope::WorldInterhashEvent => "world_interhash_event",
            HashScope::OtherSpecialEvent => "other_special_event",
        }
    }

    pub fn from_slug(slug: &str) -> Option<HashScope> {
        Self::ALL.iter().copied().find(|s| s.slug() == slug)
    }
}

/// Attribute slugs an event can carry. A stored multiselect value is
/// accepted only if every entry is one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HashAttribute {
    HarrietteRun,
    MenOnlyHash,
    WomanOnlyHash,
    KidsAllowed,
    NoKidsAllowed,
    BringFlashlight,
    WaterOnTrail,
    WalkerTrail,
    RunnerTrail,
    LongRunTrail,
    PubCrawl,
    OnAfter,
    BabyJoggerFriendly,
    ShiggyRun,
    AccessibleByPublicTransport,
    BikeHash,
    CityRun,
    LiveHare,
    DeadHare,
    NighttimeRun,
    SteepHills,
    CharityEvent,
    DogFriendly,
    PickUpHash,
    CatchTheHare,
    BringCashOnTrail,
    BagDropAvailable,
    Agm,
}

impl HashAttribute {
    pub const ALL: [HashAttribute; 28] = [
        HashAttribute::HarrietteRun,
        HashAttribute::MenOnlyHash,
        HashAttribute::WomanOnlyHash,
        HashAttribute::KidsAllowed,
        HashAttribute::NoKidsAllowed,
        HashAttribute::BringFlashlight,
        HashAttribute::WaterOnTrail,
        HashAttribute::WalkerTrail,
        HashAttribute::RunnerTrail,
        HashAttribute::LongRunTrail,
        HashAttribute::PubCrawl,
        HashAttribute::OnAfter,
        HashAttribute::BabyJoggerFriendly,
        HashAttribute::ShiggyRun,
        HashAttribute::AccessibleByPublicTransport,
        HashAttribute::BikeHash,
        HashAttribute::CityRun,
        HashAttribute::LiveHare,
        HashAttribute::DeadHare,
        HashAttribute::NighttimeRun,
        HashAttribute::SteepHills,
        HashAttribute::CharityEvent,
        HashAttribute::DogFriendly,
        HashAttribute::PickUpHash,
        HashAttribute::CatchTheHare,
        HashAttribute::BringCashOnTrail,
        HashAttribute::BagDropAvailable,
        HashAttribute::Agm,
    ];

    pub fn slug(self) -> &'static str {
        match self {
            HashAttribute::HarrietteRun => "harriette-run",
            HashAttribute::MenOnlyHash => "men-only-hash",
            HashAttribute::WomanOnlyHash => "woman-only-hash",
            HashAttribute::KidsAllowed => "kids-allowed",
            HashAttribute::NoKidsAllowed => "no-kids-allowed",
            HashAttribute::BringFlashlight => "bring-flashlight",
            HashAttribute::WaterOnTrail => "water-on-trail",
            HashAttribute::WalkerTrail => "walker-trail",
            HashAttribute::RunnerTrail => "runner-trail",
            HashAttribute::LongRunTrail => "long-run-trail",
            HashAttribute::PubCrawl => "pub-crawl",
            HashAttribute::OnAfter => "on-after",
            HashAttribute::BabyJoggerFriendly => "baby-jogger-friendly",
            HashAttribute::ShiggyRun => "shiggy-run",
            HashAttribute::AccessibleByPublicTransport => "accessible-by-public-transport",
            HashAttribute::BikeHash => "bike-hash",
            HashAttribute::CityRun => "city-run",
            HashAttribute::LiveHare => "live-hare",
            HashAttribute::DeadHare => "dead-hare",
            HashAttribute::NighttimeRun => "nighttime-run",
            HashAttribute::SteepHills => "steep-hills",
            HashAttribute::CharityEvent => "charity-event",
            HashAttribute::DogFriendly => "dog-friendly",
            HashAttribute::PickUpHash => "pick-up-hash",
            HashAttribute::CatchTheHare => "catch-the-hare",
            HashAttribute::BringCashOnTrail => "bring-cash-on-trail",
            HashAttribute::BagDropAvailable => "bag-drop-available",
            HashAttribute::Agm => "agm",
        }
    }

    /// Identifier name written into the submit-form option map.
    pub fn name(self) -> &'static str {
        match self {
            HashAttribute::HarrietteRun => "harriette_run",
            HashAttribute::MenOnlyHash => "men_only_hash",
            HashAttribute::WomanOnlyHash => "woman_only_hash",
            HashAttribute::KidsAllowed => "kids_allowed",
            HashAttribute::NoKidsAllowed => "no_kids_allowed",
            HashAttribute::BringFlashlight => "bring_flashlight",
            HashAttribute::WaterOnTrail => "water_on_trail",
            HashAttribute::WalkerTrail => "walker_trail",
            HashAttribute::RunnerTrail => "runner_trail",
            HashAttribute::LongRunTrail => "long_run_trail",
            HashAttribute::PubCrawl => "pub_crawl",
            HashAttribute::OnAfter => "on_after",
            HashAttribute::BabyJoggerFriendly => "baby_jogger_friendly",
            HashAttribute::ShiggyRun => "shiggy_run",
            HashAttribute::AccessibleByPublicTransport => "accessible_by_public_transport",
            HashAttribute::BikeHash => "bike_hash",
            HashAttribute::CityRun => "city_run",
            HashAttribute::LiveHare => "live_hare",
            HashAttribute::DeadHare => "dead_hare",
            HashAttribute::NighttimeRun => "nighttime_run",
            HashAttribute::SteepHills => "steep_hills",
            HashAttribute::CharityEvent => "charity_event",
            HashAttribute::DogFriendly => "dog_friendly",
            HashAttribute::PickUpHash => "pick_up_hash",
            HashAttribute::CatchTheHare => "catch_the_hare",
            HashAttribute::BringCashOnTrail => "bring_cash_on_trail",
            HashAttribute::BagDropAvailable => "bag_drop_available",
            HashAttribute::Agm => "agm",
        }
    }

    pub fn from_slug(slug: &str) -> Option<HashAttribute> {
        Self::ALL.iter().copied().find(|a| a.slug() == slug)
    }
}

/// A timestamp that is either naive (no timezone configured anywhere) or
/// localized to an explicit IANA timezone.
///
/// Serializes to ISO-8601; the zoned form carries its UTC offset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EventTime {
    Naive(NaiveDateTime),
    Zoned(DateTime<Tz>),
}

impl EventTime {
    /// Localize a naive timestamp. Falls back to the naive form when the
    /// local time does not exist in the target zone (DST gap).
    pub fn localize(naive: NaiveDateTime, tz: Option<Tz>) -> EventTime {
        match tz {
            Some(tz) => match naive.and_local_timezone(tz).earliest() {
                Some(zoned) => EventTime::Zoned(zoned),
                None => EventTime::Naive(naive),
            },
            None => EventTime::Naive(naive),
        }
    }
}

impl PartialOrd for EventTime {
    /// Ordered comparison only between timestamps of the same flavor; a
    /// naive bound never orders against a zoned timestamp.
    fn partial_cmp(&self, other: &EventTime) -> Option<Ordering> {
        match (self, other) {
            (EventTime::Naive(a), EventTime::Naive(b)) => a.partial_cmp(b),
            (EventTime::Zoned(a), EventTime::Zoned(b)) => a.partial_cmp(b),
            _ => None,
        }
    }
}

impl Serialize for EventTime {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            EventTime::Naive(naive) => {
                serializer.serialize_str(&naive.format("%Y-%m-%dT%H:%M:%S").to_string())
            }
            EventTime::Zoned(zoned) => serializer.serialize_str(&zoned.to_rfc3339()),
        }
    }
}

/// One fully assembled hash run/event record.
///
/// Constructed fresh per request by the assembler; never persisted. String
/// fields are normalized so that empty means `None`, never `Some("")`.
#[derive(Debug, Clone, Serialize)]
pub struct HashEvent {
    pub id: i64,
    pub last_update: EventTime,

    pub event_name: String,
    pub kennel_name: String,
    pub event_description: String,
    pub event_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_attributes: Option<Vec<HashAttribute>>,
    pub event_geographic_scope: HashScope,

    pub start_date: EventTime,
    pub end_date: Option<EventTime>,
    pub deleted: bool,

    pub run_number: Option<i64>,
    pub run_is_counted: bool,
    pub hares: Option<String>,

    pub contact: Option<String>,
    pub geo_lat: Option<String>,
    pub geo_long: Option<String>,
    pub geo_location_name: Option<String>,
    pub geo_map_url: Option<Url>,
    pub location_name: Option<String>,
    pub location_additional_info: Option<String>,

    pub image_url: Option<Url>,
    pub event_url: Option<Url>,
    pub facebook_group_id: Option<i64>,
    pub hash_cash_members: Option<i64>,
    pub hash_cash_non_members: Option<i64>,
    pub event_currency: Option<String>,
    pub hash_cash_extras: Option<i64>,
    pub extras_description: Option<String>,

    /// Hidden from consumer-facing calendars; still served by this API.
    pub event_hidden: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn naive(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    #[test]
    fn scope_slug_round_trip() {
        for scope in HashScope::ALL {
            assert_eq!(HashScope::from_slug(scope.slug()), Some(scope));
        }
        assert_eq!(HashScope::from_slug("bad-slug"), None);
    }

    #[test]
    fn attribute_slug_round_trip() {
        for attr in HashAttribute::ALL {
            assert_eq!(HashAttribute::from_slug(attr.slug()), Some(attr));
        }
        assert_eq!(HashAttribute::from_slug("bad-slug"), None);
    }

    #[test]
    fn scope_serializes_as_kebab_case() {
        let json = serde_json::to_string(&HashScope::SpecialLocalEvent).unwrap();
        assert_eq!(json, "\"special-local-event\"");
        let back: HashScope = serde_json::from_str(&json).unwrap();
        assert_eq!(back, HashScope::SpecialLocalEvent);
    }

    #[test]
    fn naive_time_serializes_without_offset() {
        let t = EventTime::Naive(naive("2024-05-01 10:00:00"));
        assert_eq!(
            serde_json::to_string(&t).unwrap(),
            "\"2024-05-01T10:00:00\""
        );
    }

    #[test]
    fn zoned_time_carries_offset() {
        let t = EventTime::localize(naive("2024-05-01 10:00:00"), Some(chrono_tz::Europe::Berlin));
        assert_eq!(
            serde_json::to_string(&t).unwrap(),
            "\"2024-05-01T10:00:00+02:00\""
        );
    }

    #[test]
    fn mixed_flavors_do_not_order() {
        let a = EventTime::Naive(naive("2024-05-01 10:00:00"));
        let b = EventTime::localize(naive("2024-05-01 10:00:00"), Some(chrono_tz::Europe::Berlin));
        assert_eq!(a.partial_cmp(&b), None);
        assert!(a < EventTime::Naive(naive("2024-05-02 00:00:00")));
    }

    #[test]
    fn localize_without_zone_stays_naive() {
        let n = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        assert_eq!(EventTime::localize(n, None), EventTime::Naive(n));
    }
}
