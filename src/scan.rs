use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};

use crate::aggregate::Aggregator;
use crate::model::ContactTime;
use crate::parser::{self, contact, PeriodBatch};
use crate::period::{Period, WINDOW_LEN};
use crate::source::PageSource;

/// Scan the three-month window starting at `start`, one page at a time.
///
/// A failed listing or an empty month is logged and skipped; failed detail
/// lookups fall back to unspecified values.
pub async fn scan_window<S: PageSource>(source: &mut S, start: Period) -> Aggregator {
    let mut agg = Aggregator::new();

    for period in start.window(WINDOW_LEN) {
        info!("Scanning {}", period);
        let notices = match source.monthly_notices(period).await {
            Ok(n) => n,
            Err(e) => {
                warn!("Listing for {} failed: {}", period, e);
                continue;
            }
        };

        let mut batch = parser::process_notices(&notices, period);
        if !batch.is_empty() {
            resolve_details(source, &mut batch).await;
        }
        agg.add_period(period, batch);
    }

    info!(
        "Window done: total={} (normal={}, numeric={}, flagged={}, zero_only={})",
        agg.total(),
        agg.normal_count(),
        agg.numeric_count(),
        agg.flagged_count(),
        agg.zero_only_count()
    );
    agg
}

/// Contact times for normal records, responders for numeric ones. Flagged
/// and zero-only records are never looked up.
async fn resolve_details<S: PageSource>(source: &mut S, batch: &mut PeriodBatch) {
    let pb = ProgressBar::new((batch.normal.len() + batch.numeric.len()) as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40} {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> "),
    );

    for record in batch.normal.iter_mut() {
        pb.set_message(record.name.clone());
        record.contact_time = match source.detail_page(&record.url).await {
            Ok(page) => contact::resolve_contact_time(&page),
            Err(e) => {
                warn!("Contact time lookup failed for {}: {}", record.url, e);
                ContactTime::unspecified()
            }
        };
        pb.inc(1);
    }

    for record in batch.numeric.iter_mut() {
        pb.set_message(record.name.clone());
        record.responder = match source.detail_page(&record.url).await {
            Ok(page) => contact::resolve_responder(&page),
            Err(e) => {
                warn!("Responder lookup failed for {}: {}", record.url, e);
                String::new()
            }
        };
        pb.inc(1);
    }

    pb.finish_and_clear();
}

// ── Tests ──
