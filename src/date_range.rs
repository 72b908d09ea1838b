//! Validated, inclusive date windows for statistics queries.

use std::ops::RangeInclusive;

use time::Date;

use crate::Error;

/// The longest window, in days, that a statistics query may span by default.
pub const DEFAULT_MAX_RANGE_DAYS: i64 = 5 * 366;

/// An inclusive range of calendar days `[start, end]`.
///
/// A `DateRange` can only be created through [DateRange::new], so `start <= end`
/// and the number of days is bounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start: Date,
    end: Date,
}

impl DateRange {
    /// Create a range covering `start` through `end`, both inclusive.
    ///
    /// # Errors
    /// Returns a:
    /// - [Error::InvalidDateRange] if `end` is before `start`,
    /// - or [Error::DateRangeTooLong] if the range covers more than `max_days` days.
    pub fn new(start: Date, end: Date, max_days: i64) -> Result<Self, Error> {
        if end < start {
            return Err(Error::InvalidDateRange { start, end });
        }

        let days = (end - start).whole_days() + 1;
        if days > max_days {
            return Err(Error::DateRangeTooLong { days, max_days });
        }

        Ok(Self { start, end })
    }

    /// The first day in the range.
    pub fn start(&self) -> Date {
        self.start
    }

    /// The last day in the range.
    pub fn end(&self) -> Date {
        self.end
    }

    /// The number of calendar days in the range, counting both ends.
    pub fn num_days(&self) -> i64 {
        (self.end - self.start).whole_days() + 1
    }

    /// Whether `date` falls inside the range, boundaries included.
    pub fn contains(&self, date: Date) -> bool {
        self.start <= date && date <= self.end
    }

    /// Iterate over every day in the range in ascending order.
    pub fn days(&self) -> impl Iterator<Item = Date> {
        days_in_range(self.start, self.end)
    }
}

impl From<DateRange> for RangeInclusive<Date> {
    fn from(range: DateRange) -> Self {
        range.start..=range.end
    }
}

/// Iterate over every day from `start` to `end` inclusive.
///
/// Yields nothing when `end` is before `start`. The sequence stops at
/// [Date::MAX] so it always terminates.
pub fn days_in_range(start: Date, end: Date) -> impl Iterator<Item = Date> {
    std::iter::successors(Some(start), |date| date.next_day()).take_while(move |date| *date <= end)
}
