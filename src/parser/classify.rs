use super::notice::Candidate;
use super::patterns::{DIGIT, DIGIT_RUN};
use crate::model::{Bucket, ContactTime, ReservationRecord, MISSING_DAY};

/// Family-name glyph meaning the reservation needs a follow-up.
pub const FOLLOW_UP_MARKER: char = '追';

/// Bucket for a family name. Checks run in a fixed order and the first
/// hit wins, so `追` beats any digit and zero-only beats numeric.
pub fn bucket_for(family_name: &str) -> Bucket {
    if family_name.contains(FOLLOW_UP_MARKER) {
        Bucket::Flagged
    } else if is_zero_only(family_name) {
        Bucket::ZeroOnly
    } else if DIGIT.is_match(family_name) {
        Bucket::Numeric(last_number(family_name).unwrap_or(MISSING_DAY))
    } else {
        Bucket::Normal
    }
}

fn is_zero_only(family_name: &str) -> bool {
    let mut digits = family_name.chars().filter(char::is_ascii_digit).peekable();
    digits.peek().is_some() && digits.all(|c| c == '0')
}

/// Rightmost maximal digit run.
fn last_number(family_name: &str) -> Option<u32> {
    DIGIT_RUN
        .find_iter(family_name)
        .last()
        .and_then(|m| m.as_str().parse().ok())
}

/// Classify a candidate. Only normal records get a contact time later, all
/// other buckets stay unspecified.
pub fn classify(candidate: Candidate) -> ReservationRecord {
    let bucket = bucket_for(&candidate.family_name);
    ReservationRecord {
        url: candidate.url,
        facility: candidate.facility,
        name: candidate.name,
        family_name: candidate.family_name,
        given_name: candidate.given_name,
        notice_month: candidate.notice_month,
        bucket,
        contact_time: ContactTime::unspecified(),
        period: None,
        responder: String::new(),
    }
}
