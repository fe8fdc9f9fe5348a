//! Every pattern that couples the parser to the calendar site's markup.

use std::sync::LazyLock;

use regex::Regex;

use crate::model::{FixedSlot, ANYTIME_LABEL, FIRST_SLOT_HOUR, LAST_SLOT_HOUR};

/// `family given様`, either ASCII or full-width spaces.
pub static NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\S+)[\s　](\S+?)[\s　]?様").unwrap());

/// Facility keyword right before the `HH:MM` time, after the mail icon.
pub static FACILITY_PRIMARY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"mail\.gif">([^\d]*(院|宇都宮|心斎橋|高松|博多|天神)[^\d]*?)(\d{1,2}:\d{2})"#).unwrap()
});

/// Looser facility match against the plain-text rendering.
pub static FACILITY_FALLBACK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([^\s]+院|宇都宮|心斎橋|高松|博多|天神)[\d:]+").unwrap());

pub static NOTICE_MONTH: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\d+)月").unwrap());

pub static DIGIT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[0-9]").unwrap());
pub static DIGIT_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[0-9]+").unwrap());

pub static BREAK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)<br\s*/?>").unwrap());
/// Closing tags of block elements, which end a rendered line.
pub static BLOCK_END: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)</(?:p|div|li|tr|td|th|h[1-6])\s*>").unwrap());
pub static ANCHOR_CLOSE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)</a\s*>").unwrap());
pub static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").unwrap());

/// `<td>` following the `受電内容` (call content) header cell.
pub static CALL_CONTENT_CELL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<th[^>]*>\s*受電内容\s*</th>\s*<td[^>]*>(.*?)</td>").unwrap()
});

/// `<td>` following the `対応者` (responder) header cell.
pub static RESPONDER_CELL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<th[^>]*>\s*対応者\s*</th>\s*<td[^>]*>(.*?)</td>").unwrap()
});

/// Value of `連絡可能時間：` up to the next line break.
pub static CONTACT_TIME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"連絡可能時間：(.*?)(?:<[bB][rR]\s*/?>|\n|$)").unwrap());

/// Closed keyword list for contact-time slots, first containment match wins.
pub static SLOT_KEYWORDS: LazyLock<Vec<(String, FixedSlot)>> = LazyLock::new(|| {
    let mut table = vec![(ANYTIME_LABEL.to_string(), FixedSlot::Anytime)];
    table.extend((FIRST_SLOT_HOUR..=LAST_SLOT_HOUR).map(|h| {
        let slot = FixedSlot::Hour(h);
        (slot.label(), slot)
    }));
    table
});
