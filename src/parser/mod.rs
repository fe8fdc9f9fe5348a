pub mod classify;
pub mod contact;
pub mod notice;
pub mod patterns;
pub mod text;

use tracing::{debug, info, warn};

use crate::model::{Bucket, RawNotice, ReservationRecord};
use crate::period::Period;

/// Records of one scanned month, split by bucket in discovery order.
#[derive(Debug, Default, Clone)]
pub struct PeriodBatch {
    pub normal: Vec<ReservationRecord>,
    pub numeric: Vec<ReservationRecord>,
    pub flagged: Vec<ReservationRecord>,
    pub zero_only: Vec<ReservationRecord>,
}

impl PeriodBatch {
    pub fn push(&mut self, record: ReservationRecord) {
        match record.bucket {
            Bucket::Normal => self.normal.push(record),
            Bucket::Numeric(_) => self.numeric.push(record),
            Bucket::Flagged => self.flagged.push(record),
            Bucket::ZeroOnly => self.zero_only.push(record),
        }
    }

    pub fn len(&self) -> usize {
        self.normal.len() + self.numeric.len() + self.flagged.len() + self.zero_only.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Two-pass pipeline: fragment → candidate → classified record.
pub fn process_notices(notices: &[RawNotice], period: Period) -> PeriodBatch {
    let mut batch = PeriodBatch::default();
    let mut skipped = 0usize;

    for (i, notice) in notices.iter().enumerate() {
        let Some(candidate) = notice::extract(notice, period) else {
            skipped += 1;
            continue;
        };
        let record = classify::classify(candidate);
        debug!(
            "family={} given={} bucket={:?}",
            record.family_name, record.given_name, record.bucket
        );
        match record.bucket {
            Bucket::Flagged => info!("Follow-up name: {}", record.name),
            Bucket::ZeroOnly => info!("No action needed: {}", record.name),
            Bucket::Numeric(day) => info!("Numbered name: {} (day {})", record.name, day),
            Bucket::Normal => {}
        }
        if record.url.is_empty() {
            warn!("Notice {} has no detail link: {}", i + 1, record.name);
        }
        batch.push(record);
    }

    info!(
        "{}: normal={}, numeric={}, flagged={}, zero_only={}, filtered={}",
        period,
        batch.normal.len(),
        batch.numeric.len(),
        batch.flagged.len(),
        batch.zero_only.len(),
        skipped
    );
    batch
}

// ── Tests ──
