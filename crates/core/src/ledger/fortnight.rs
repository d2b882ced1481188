//! Fortnight partitioning and locking.
//!
//! Every calendar month is split into two accounting periods: days 1-15 and
//! day 16 through the last day of the month. The fortnight containing today
//! is open; every earlier fortnight is closed for non-privileged callers.

use chrono::{Datelike, Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};

/// Last day of the first half of any month.
pub const FIRST_HALF_LAST_DAY: u32 = 15;

/// Which half of the month a fortnight covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Half {
    /// Days 1 to 15.
    First,
    /// Day 16 to the last day of the month.
    Second,
}

impl Half {
    /// Half containing the given day of month.
    #[must_use]
    pub const fn of_day(day: u32) -> Self {
        if day <= FIRST_HALF_LAST_DAY {
            Self::First
        } else {
            Self::Second
        }
    }
}

/// One half of a calendar month.
///
/// Ordering is chronological.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Fortnight {
    month_start: NaiveDate,
    half: Half,
}

impl Fortnight {
    /// Fortnight the date falls in.
    #[must_use]
    pub fn containing(date: NaiveDate) -> Self {
        Self {
            month_start: date - Days::new(u64::from(date.day0())),
            half: Half::of_day(date.day()),
        }
    }

    /// Builds a fortnight from its parts, or `None` for an invalid month.
    #[must_use]
    pub fn new(year: i32, month: u32, half: Half) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(|month_start| Self { month_start, half })
    }

    /// Calendar year.
    #[must_use]
    pub fn year(&self) -> i32 {
        self.month_start.year()
    }

    /// Calendar month (1-12).
    #[must_use]
    pub fn month(&self) -> u32 {
        self.month_start.month()
    }

    /// Half of the month.
    #[must_use]
    pub const fn half(&self) -> Half {
        self.half
    }

    /// First day of the month this fortnight belongs to.
    #[must_use]
    pub const fn month_start(&self) -> NaiveDate {
        self.month_start
    }

    /// First day covered (the 1st or the 16th).
    #[must_use]
    pub fn first_day(&self) -> NaiveDate {
        match self.half {
            Half::First => self.month_start,
            Half::Second => self.month_start + Days::new(u64::from(FIRST_HALF_LAST_DAY)),
        }
    }

    /// Last day covered (the 15th or the last day of the month).
    #[must_use]
    pub fn last_day(&self) -> NaiveDate {
        match self.half {
            Half::First => self.month_start + Days::new(u64::from(FIRST_HALF_LAST_DAY - 1)),
            Half::Second => last_day_of_month(self.month_start),
        }
    }

    /// Returns true if the date falls in this fortnight.
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        Self::containing(date) == *self
    }

    /// The fortnight immediately after this one.
    #[must_use]
    pub fn next(&self) -> Self {
        Self::containing(self.last_day() + Days::new(1))
    }

    /// The fortnight immediately before this one.
    #[must_use]
    pub fn previous(&self) -> Self {
        Self::containing(self.first_day() - Days::new(1))
    }

    /// Human-readable date range, e.g. `16/02/2024 - 29/02/2024`.
    #[must_use]
    pub fn range_label(&self) -> String {
        format!(
            "{} - {}",
            self.first_day().format("%d/%m/%Y"),
            self.last_day().format("%d/%m/%Y")
        )
    }
}

impl std::fmt::Display for Fortnight {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let ordinal = match self.half {
            Half::First => "1st",
            Half::Second => "2nd",
        };
        write!(f, "{ordinal} fortnight of {:02}/{}", self.month(), self.year())
    }
}

/// Last day of the month containing `date`.
///
/// Computed as the day before the first day of the next month, so month
/// lengths and leap years need no lookup table and December rolls into
/// January of the following year.
#[must_use]
pub fn last_day_of_month(date: NaiveDate) -> NaiveDate {
    let month_start = date - Days::new(u64::from(date.day0()));
    month_start + Months::new(1) - Days::new(1)
}

/// Returns true if `fortnight` is the one containing `today`.
#[must_use]
pub fn is_open(fortnight: Fortnight, today: NaiveDate) -> bool {
    fortnight == Fortnight::containing(today)
}

/// Returns true if `date` belongs to a fortnight that is locked for the caller.
///
/// Privileged callers never see a closed fortnight. Otherwise only fortnights
/// strictly before today's are closed; today's and any future fortnight stay
/// unlocked (future dates are rejected elsewhere).
#[must_use]
pub fn is_closed(date: NaiveDate, today: NaiveDate, privileged: bool) -> bool {
    if privileged {
        return false;
    }
    Fortnight::containing(date) < Fortnight::containing(today)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    /// Strategy for any date between 1970 and 2100.
    fn date_strategy() -> impl Strategy<Value = NaiveDate> {
        (0i64..47_482).prop_map(|offset| date(1970, 1, 1) + chrono::Duration::days(offset))
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        /// The first half holds exactly days 1 to 15.
        #[test]
        fn prop_first_half_iff_day_up_to_15(d in date_strategy()) {
            let fortnight = Fortnight::containing(d);
            prop_assert_eq!(fortnight.half() == Half::First, d.day() <= 15);
            prop_assert_eq!(fortnight.year(), d.year());
            prop_assert_eq!(fortnight.month(), d.month());
            prop_assert!(fortnight.first_day() <= d && d <= fortnight.last_day());
        }

        /// Privileged callers never see a closed fortnight.
        #[test]
        fn prop_privileged_never_closed(d in date_strategy(), today in date_strategy()) {
            prop_assert!(!is_closed(d, today, true));
        }

        /// Consecutive fortnights tile the calendar without gaps.
        #[test]
        fn prop_next_starts_the_day_after(d in date_strategy()) {
            let fortnight = Fortnight::containing(d);
            let next = fortnight.next();
            prop_assert_eq!(next.first_day(), fortnight.last_day() + Days::new(1));
            prop_assert_eq!(next.previous(), fortnight);
        }

        /// Today's own fortnight is always open and never closed.
        #[test]
        fn prop_today_is_open(today in date_strategy()) {
            prop_assert!(is_open(Fortnight::containing(today), today));
            prop_assert!(!is_closed(today, today, false));
        }
    }

    #[rstest]
    #[case(date(2024, 1, 31), date(2024, 2, 1))]
    #[case(date(2024, 2, 29), date(2024, 3, 1))]
    #[case(date(2023, 2, 28), date(2023, 3, 1))]
    #[case(date(2023, 12, 31), date(2024, 1, 1))]
    #[case(date(2024, 4, 30), date(2024, 5, 1))]
    fn test_month_rollover(#[case] last: NaiveDate, #[case] first: NaiveDate) {
        let before = Fortnight::containing(last);
        let after = Fortnight::containing(first);

        assert_eq!(before.half(), Half::Second);
        assert_eq!(after.half(), Half::First);
        assert_eq!(before.last_day(), last);
        assert_eq!(after.first_day(), first);
        assert_eq!(after.year(), first.year());
        assert_eq!(after.month(), first.month());
        assert_eq!(before.next(), after);
        assert!(before < after);
    }

    #[rstest]
    #[case(2024, 2, 29)]
    #[case(2023, 2, 28)]
    #[case(2024, 4, 30)]
    #[case(2024, 12, 31)]
    #[case(2024, 7, 31)]
    fn test_last_day_of_month(#[case] year: i32, #[case] month: u32, #[case] expected: u32) {
        assert_eq!(last_day_of_month(date(year, month, 10)), date(year, month, expected));
    }

    #[rstest]
    #[case(date(2024, 3, 10), true)] // earlier half of the current month
    #[case(date(2024, 3, 20), false)] // today
    #[case(date(2024, 3, 16), false)] // same fortnight as today
    #[case(date(2024, 3, 31), false)] // later day, same fortnight
    #[case(date(2024, 4, 1), false)] // future month
    #[case(date(2024, 2, 20), true)] // earlier month
    #[case(date(2023, 12, 31), true)] // earlier year
    fn test_is_closed_in_second_half(#[case] d: NaiveDate, #[case] closed: bool) {
        let today = date(2024, 3, 20);
        assert_eq!(is_closed(d, today, false), closed);
        assert!(!is_closed(d, today, true));
    }

    #[test]
    fn test_first_half_of_month_keeps_second_half_of_previous_closed() {
        let today = date(2024, 3, 5);
        assert!(is_closed(date(2024, 2, 29), today, false));
        assert!(!is_closed(date(2024, 3, 1), today, false));
        assert!(!is_closed(date(2024, 3, 16), today, false));
    }

    #[test]
    fn test_is_open() {
        let today = date(2024, 3, 20);
        assert!(is_open(Fortnight::containing(date(2024, 3, 16)), today));
        assert!(!is_open(Fortnight::containing(date(2024, 3, 15)), today));
        assert!(!is_open(Fortnight::containing(date(2024, 4, 16)), today));
    }

    #[test]
    fn test_new_validates_month() {
        assert!(Fortnight::new(2024, 13, Half::First).is_none());
        assert_eq!(
            Fortnight::new(2024, 3, Half::Second),
            Some(Fortnight::containing(date(2024, 3, 16)))
        );
    }

    #[test]
    fn test_labels() {
        let fortnight = Fortnight::containing(date(2024, 2, 20));
        assert_eq!(fortnight.to_string(), "2nd fortnight of 02/2024");
        assert_eq!(fortnight.range_label(), "16/02/2024 - 29/02/2024");
        assert_eq!(
            Fortnight::containing(date(2024, 2, 1)).range_label(),
            "01/02/2024 - 15/02/2024"
        );
    }
}
