use tracing::debug;

use super::patterns::{ANCHOR_CLOSE, BREAK, FACILITY_FALLBACK, FACILITY_PRIMARY, NAME, NOTICE_MONTH};
use super::text::{normalize_ws, strip_tags, to_plain};
use crate::model::{RawNotice, UNKNOWN_FACILITY};
use crate::period::Period;

/// A notice whose name matched, before bucket classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub url: String,
    pub facility: String,
    pub name: String,
    pub family_name: String,
    pub given_name: String,
    pub notice_month: u32,
}

/// Parse one listing fragment. `None` means it is not a reservation notice.
pub fn extract(notice: &RawNotice, period: Period) -> Option<Candidate> {
    let plain = to_plain(&notice.html);
    let name_part = normalize_ws(&isolate_name(&notice.html, &plain));

    let Some(caps) = NAME.captures(&name_part) else {
        debug!("Name pattern did not match: {}", name_part);
        return None;
    };
    let family_name = caps[1].to_string();
    let given_name = caps[2].to_string();

    Some(Candidate {
        url: notice.href.clone(),
        facility: facility(&notice.html, &plain),
        name: format!("{} {}", family_name, given_name),
        family_name,
        given_name,
        notice_month: notice_month(&plain).unwrap_or(period.month),
    })
}

/// Text between the first break and the closing anchor. Older mail layouts
/// have no break, there the second rendered line holds the name.
fn isolate_name(html: &str, plain: &str) -> String {
    if let Some(br) = BREAK.find(html) {
        let rest = &html[br.end()..];
        let rest = BREAK.find(rest).map_or(rest, |m| &rest[..m.start()]);
        let rest = ANCHOR_CLOSE.find(rest).map_or(rest, |m| &rest[..m.start()]);
        return strip_tags(rest).trim().to_string();
    }
    plain
        .lines()
        .nth(1)
        .unwrap_or(plain)
        .trim()
        .to_string()
}

fn facility(html: &str, plain: &str) -> String {
    if let Some(caps) = FACILITY_PRIMARY.captures(html) {
        let name = strip_tags(&caps[1]).trim().to_string();
        if !name.is_empty() {
            return name;
        }
    }
    FACILITY_FALLBACK
        .captures(plain)
        .map(|c| c[1].to_string())
        .unwrap_or_else(|| UNKNOWN_FACILITY.to_string())
}

fn notice_month(plain: &str) -> Option<u32> {
    NOTICE_MONTH
        .captures(plain)
        .and_then(|c| c[1].parse::<u32>().ok())
        .filter(|m| (1..=12).contains(m))
}

// ── Tests ──
