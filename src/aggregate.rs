use std::collections::BTreeMap;

use tracing::{info, warn};

use crate::model::{ContactTime, FixedSlot, ReservationRecord, MISSING_DAY};
use crate::parser::PeriodBatch;
use crate::period::Period;

/// Accumulates classified records across the scan window.
///
/// Normal records are keyed by their canonical slot. Records whose contact
/// time is a verbatim `ContactTime::Other` text share one list kept in
/// discovery order.
#[derive(Debug, Default)]
pub struct Aggregator {
    numeric: Vec<ReservationRecord>,
    flagged: Vec<ReservationRecord>,
    zero_only: Vec<ReservationRecord>,
    slots: BTreeMap<FixedSlot, Vec<ReservationRecord>>,
    others: Vec<ReservationRecord>,
    scanned: Vec<Period>,
}

/// Final grouping handed to the renderer.
#[derive(Debug, Default)]
pub struct Grouped {
    /// Ascending by day number across the whole window.
    pub numeric: Vec<ReservationRecord>,
    /// Discovery order.
    pub flagged: Vec<ReservationRecord>,
    /// Discovery order.
    pub zero_only: Vec<ReservationRecord>,
    /// Each list ascending by period.
    pub slots: BTreeMap<FixedSlot, Vec<ReservationRecord>>,
    /// Verbatim fallbacks, ascending by period, discovery order within one.
    pub others: Vec<ReservationRecord>,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stamp and append one period. Returns `false` when the period had no
    /// records at all and was skipped.
    pub fn add_period(&mut self, period: Period, batch: PeriodBatch) -> bool {
        if batch.is_empty() {
            warn!("No records found for {}", period);
            return false;
        }
        info!(
            "{} done: normal={}, numeric={}, flagged={}, zero_only={}",
            period,
            batch.normal.len(),
            batch.numeric.len(),
            batch.flagged.len(),
            batch.zero_only.len()
        );

        let stamp = |mut r: ReservationRecord| {
            r.period = Some(period);
            r
        };
        for record in batch.normal.into_iter().map(stamp) {
            match record.contact_time {
                ContactTime::Fixed(slot) => self.slots.entry(slot).or_default().push(record),
                ContactTime::Other(_) => self.others.push(record),
            }
        }
        self.numeric.extend(batch.numeric.into_iter().map(stamp));
        self.flagged.extend(batch.flagged.into_iter().map(stamp));
        self.zero_only.extend(batch.zero_only.into_iter().map(stamp));
        self.scanned.push(period);
        true
    }

    pub fn total(&self) -> usize {
        self.numeric.len()
            + self.flagged.len()
            + self.zero_only.len()
            + self.normal_count()
    }

    pub fn normal_count(&self) -> usize {
        self.slots.values().map(Vec::len).sum::<usize>() + self.others.len()
    }

    pub fn numeric_count(&self) -> usize {
        self.numeric.len()
    }

    pub fn flagged_count(&self) -> usize {
        self.flagged.len()
    }

    pub fn zero_only_count(&self) -> usize {
        self.zero_only.len()
    }

    /// Periods that contributed at least one record.
    pub fn scanned(&self) -> &[Period] {
        &self.scanned
    }

    pub fn finish(self) -> Grouped {
        let Aggregator {
            mut numeric,
            flagged,
            zero_only,
            mut slots,
            mut others,
            ..
        } = self;

        // Day priority is global: the month is deliberately not part of the key.
        numeric.sort_by_key(|r| r.extracted_number().unwrap_or(MISSING_DAY));
        for records in slots.values_mut() {
            records.sort_by_key(|r| r.period);
        }
        others.sort_by_key(|r| r.period);

        Grouped {
            numeric,
            flagged,
            zero_only,
            slots,
            others,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Bucket;

    fn record(name: &str, bucket: Bucket, contact_time: ContactTime) -> ReservationRecord {
        ReservationRecord {
            url: format!("https://cal.example/view.php?id={}", name),
            facility: "梅田院".into(),
            name: name.into(),
            family_name: name.into(),
            given_name: "花子".into(),
            notice_month: 1,
            bucket,
            contact_time,
            period: None,
            responder: String::new(),
        }
    }

    fn p(year: i32, month: u32) -> Period {
        Period::new(year, month).unwrap()
    }

    #[test]
    fn empty_period_is_skipped() {
        let mut agg = Aggregator::new();
        assert!(!agg.add_period(p(2025, 4), PeriodBatch::default()));
        assert_eq!(agg.total(), 0);
        assert!(agg.scanned().is_empty());
    }

    #[test]
    fn stamps_period() {
        let mut agg = Aggregator::new();
        let mut batch = PeriodBatch::default();
        batch.push(record("a", Bucket::Flagged, ContactTime::unspecified()));
        agg.add_period(p(2025, 6), batch);
        let g = agg.finish();
        assert_eq!(g.flagged[0].period, Some(p(2025, 6)));
    }

    #[test]
    fn numeric_sorted_by_day_across_months() {
        let mut agg = Aggregator::new();
        let mut april = PeriodBatch::default();
        april.push(record("a20", Bucket::Numeric(20), ContactTime::unspecified()));
        april.push(record("b3", Bucket::Numeric(3), ContactTime::unspecified()));
        let mut may = PeriodBatch::default();
        may.push(record("c1", Bucket::Numeric(1), ContactTime::unspecified()));
        may.push(record("d3", Bucket::Numeric(3), ContactTime::unspecified()));
        agg.add_period(p(2025, 4), april);
        agg.add_period(p(2025, 5), may);

        let g = agg.finish();
        let names: Vec<&str> = g.numeric.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["c1", "b3", "d3", "a20"]);
        for w in g.numeric.windows(2) {
            assert!(w[0].extracted_number() <= w[1].extracted_number());
        }
    }

    #[test]
    fn slots_sorted_by_period_and_flagged_kept() {
        let slot = FixedSlot::Hour(10);
        let mut agg = Aggregator::new();
        let mut june = PeriodBatch::default();
        june.push(record("june", Bucket::Normal, ContactTime::Fixed(slot)));
        june.push(record("f1", Bucket::Flagged, ContactTime::unspecified()));
        let mut april = PeriodBatch::default();
        april.push(record("april", Bucket::Normal, ContactTime::Fixed(slot)));
        april.push(record("f2", Bucket::Flagged, ContactTime::unspecified()));
        agg.add_period(p(2025, 6), june);
        agg.add_period(p(2025, 4), april);

        let g = agg.finish();
        let names: Vec<&str> = g.slots[&slot].iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["april", "june"]);
        let flagged: Vec<&str> = g.flagged.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(flagged, vec!["f1", "f2"]);
    }

    #[test]
    fn verbatim_fallbacks_keep_discovery_order() {
        let mut agg = Aggregator::new();
        let mut may = PeriodBatch::default();
        may.push(record("m1", Bucket::Normal, ContactTime::Other("夕方".into())));
        let mut april = PeriodBatch::default();
        april.push(record("x", Bucket::Normal, ContactTime::Other("夕方".into())));
        april.push(record("y", Bucket::Normal, ContactTime::Other("午前中".into())));
        april.push(record("z", Bucket::Normal, ContactTime::Other("夕方".into())));
        agg.add_period(p(2025, 5), may);
        agg.add_period(p(2025, 4), april);
        assert_eq!(agg.normal_count(), 4);
        assert_eq!(agg.total(), 4);

        let g = agg.finish();
        assert!(g.slots.is_empty());
        let names: Vec<&str> = g.others.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["x", "y", "z", "m1"]);
        assert_eq!(g.others[1].contact_time.label(), "午前中");
    }
}
