use std::fmt;

use serde::{Serialize, Serializer};

use crate::period::Period;

pub const UNKNOWN_FACILITY: &str = "不明";
pub const UNSPECIFIED_LABEL: &str = "記載無し";
pub const ANYTIME_LABEL: &str = "いつでも可能";

/// Day number used when a numeric family name yields no digit run.
pub const MISSING_DAY: u32 = 999;

/// One `p.res_mail` entry from the monthly listing.
#[derive(Debug, Clone)]
pub struct RawNotice {
    pub html: String,
    pub href: String,
}

/// Canonical contact-time slots, in report order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FixedSlot {
    Unspecified,
    Anytime,
    /// One-hour window starting at the given hour.
    Hour(u8),
}

pub const FIRST_SLOT_HOUR: u8 = 10;
pub const LAST_SLOT_HOUR: u8 = 19;

impl FixedSlot {
    pub fn label(self) -> String {
        match self {
            FixedSlot::Unspecified => UNSPECIFIED_LABEL.to_string(),
            FixedSlot::Anytime => ANYTIME_LABEL.to_string(),
            FixedSlot::Hour(h) => format!("{}時から{}時", h, h + 1),
        }
    }

    /// Every slot in display order.
    pub fn all() -> Vec<FixedSlot> {
        let mut slots = vec![FixedSlot::Unspecified, FixedSlot::Anytime];
        slots.extend((FIRST_SLOT_HOUR..=LAST_SLOT_HOUR).map(FixedSlot::Hour));
        slots
    }
}

/// Resolved availability: a canonical slot or the verbatim field text.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ContactTime {
    Fixed(FixedSlot),
    Other(String),
}

impl ContactTime {
    pub fn unspecified() -> Self {
        ContactTime::Fixed(FixedSlot::Unspecified)
    }

    pub fn label(&self) -> String {
        match self {
            ContactTime::Fixed(slot) => slot.label(),
            ContactTime::Other(text) => text.clone(),
        }
    }
}

impl fmt::Display for ContactTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

impl Serialize for ContactTime {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bucket {
    Normal,
    /// Family name carries a call-back day number.
    Numeric(u32),
    /// Family name carries the follow-up marker.
    Flagged,
    /// Family name carries only zero digits: no action needed.
    ZeroOnly,
}

impl Bucket {
    pub fn extracted_number(self) -> Option<u32> {
        match self {
            Bucket::Numeric(n) => Some(n),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReservationRecord {
    pub url: String,
    pub facility: String,
    pub name: String,
    pub family_name: String,
    pub given_name: String,
    /// `N月` token found in the notice text, defaulting to the scanned month.
    pub notice_month: u32,
    pub bucket: Bucket,
    pub contact_time: ContactTime,
    /// Set by the aggregator.
    pub period: Option<Period>,
    pub responder: String,
}

impl ReservationRecord {
    pub fn extracted_number(&self) -> Option<u32> {
        self.bucket.extracted_number()
    }
}

/// Reservation id carried in a detail url as `id=...`.
pub fn reservation_id(url: &str) -> &str {
    url.split_once("id=")
        .map(|(_, rest)| rest.split('&').next().unwrap_or(""))
        .unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slot_labels() {
        assert_eq!(FixedSlot::Hour(14).label(), "14時から15時");
        assert_eq!(FixedSlot::Anytime.label(), "いつでも可能");
        assert_eq!(FixedSlot::all().len(), 12);
        assert_eq!(FixedSlot::all().last(), Some(&FixedSlot::Hour(19)));
    }

    #[test]
    fn slot_order_matches_report_order() {
        let mut slots = FixedSlot::all();
        slots.reverse();
        slots.sort();
        assert_eq!(slots, FixedSlot::all());
    }

    #[test]
    fn reservation_id_from_url() {
        assert_eq!(reservation_id("https://x/detail.php?id=123&c=mail"), "123");
        assert_eq!(reservation_id("https://x/detail.php?id=77"), "77");
        assert_eq!(reservation_id("https://x/detail.php"), "");
    }

    #[test]
    fn other_contact_time_keeps_text() {
        let ct = ContactTime::Other("夕方以降".into());
        assert_eq!(ct.to_string(), "夕方以降");
        assert_eq!(serde_json::to_string(&ct).unwrap(), "\"夕方以降\"");
    }
}
