use std::fmt;

use chrono::{Datelike, FixedOffset, Utc};
use serde::Serialize;

use crate::error::{Error, Result};

/// Months scanned per run, starting at the requested period.
pub const WINDOW_LEN: usize = 3;

/// Accepted start years. The window may run one year past the upper bound.
pub const YEARS: std::ops::RangeInclusive<i32> = 1..=9999;

const JST_OFFSET_SECS: i32 = 9 * 3600;

/// Asia/Tokyo has no DST, a fixed offset is exact.
pub fn jst() -> FixedOffset {
    FixedOffset::east_opt(JST_OFFSET_SECS).expect("+09:00 is a valid offset")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Period {
    pub year: i32,
    pub month: u32,
}

impl Period {
    pub fn new(year: i32, month: u32) -> Result<Self> {
        if !(1..=12).contains(&month) || !YEARS.contains(&year) {
            return Err(Error::InvalidPeriod { year, month });
        }
        Ok(Period { year, month })
    }

    /// The current year/month on the Tokyo civil calendar.
    pub fn current() -> Self {
        let now = Utc::now().with_timezone(&jst());
        Period {
            year: now.year(),
            month: now.month(),
        }
    }

    pub fn next(self) -> Self {
        if self.month == 12 {
            Period {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Period {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    pub fn window(self, len: usize) -> Vec<Period> {
        std::iter::successors(Some(self), |p| Some(p.next()))
            .take(len)
            .collect()
    }

    /// Last period of the scan window starting here.
    pub fn end_of_window(self) -> Self {
        self.window(WINDOW_LEN).last().copied().unwrap_or(self)
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}年{}月", self.year, self.month)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_bad_month() {
        assert!(Period::new(2025, 0).is_err());
        assert!(Period::new(2025, 13).is_err());
        assert!(Period::new(2025, 12).is_ok());
    }

    #[test]
    fn rejects_out_of_range_year() {
        assert!(Period::new(i32::MAX, 12).is_err());
        assert!(Period::new(0, 1).is_err());
        let last = Period::new(9999, 12).unwrap();
        assert_eq!(last.end_of_window(), Period { year: 10000, month: 2 });
    }

    #[test]
    fn window_rolls_over_year() {
        let start = Period::new(2024, 11).unwrap();
        let w = start.window(WINDOW_LEN);
        assert_eq!(
            w,
            vec![
                Period { year: 2024, month: 11 },
                Period { year: 2024, month: 12 },
                Period { year: 2025, month: 1 },
            ]
        );
        assert_eq!(start.end_of_window(), Period { year: 2025, month: 1 });
    }

    #[test]
    fn display_uses_japanese_units() {
        assert_eq!(Period::new(2025, 3).unwrap().to_string(), "2025年3月");
    }
}
