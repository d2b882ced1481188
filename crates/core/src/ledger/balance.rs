//! Balance calculations over the hour bank log.
//!
//! Nothing here is cached: every figure is folded from the full entry list
//! each time it is asked for.

use chrono::{Datelike, Days, Months, NaiveDate};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use super::entry::LedgerEntry;
use super::fortnight::{FIRST_HALF_LAST_DAY, Half};
use super::resolver::EntryDateResolver;

/// Decimal places kept for displayed hour figures.
pub const HOURS_DISPLAY_DP: u32 = 1;

/// Decimal places kept for monetary figures.
pub const MONEY_DP: u32 = 2;

/// Longest trend a single call produces, in months.
pub const MAX_TREND_MONTHS: u32 = 1200;

/// Signed running total: credit hours minus debit hours.
pub fn balance<'a>(entries: impl IntoIterator<Item = &'a LedgerEntry>) -> Decimal {
    entries.into_iter().map(LedgerEntry::signed_hours).sum()
}

/// Hours rounded for display.
#[must_use]
pub fn display_hours(hours: Decimal) -> Decimal {
    hours.round_dp_with_strategy(HOURS_DISPLAY_DP, RoundingStrategy::MidpointAwayFromZero)
}

/// Informational value of `hours` at `hourly_rate`, rounded to cents.
#[must_use]
pub fn monetary_value(hours: Decimal, hourly_rate: Decimal) -> Decimal {
    (hours * hourly_rate).round_dp_with_strategy(MONEY_DP, RoundingStrategy::MidpointAwayFromZero)
}

/// Signed totals of one month, split by fortnight.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FortnightTotals {
    /// Days 1 to 15.
    pub first_half: Decimal,
    /// Day 16 to month end.
    pub second_half: Decimal,
    /// Whole month (`first_half + second_half`).
    pub month: Decimal,
}

impl FortnightTotals {
    /// Total of the given half.
    #[must_use]
    pub const fn of(&self, half: Half) -> Decimal {
        match half {
            Half::First => self.first_half,
            Half::Second => self.second_half,
        }
    }
}

/// Totals of the month containing `month_anchor`, split at day 15.
#[must_use]
pub fn fortnight_totals(
    entries: &[LedgerEntry],
    resolver: &EntryDateResolver,
    month_anchor: NaiveDate,
) -> FortnightTotals {
    let mut totals = FortnightTotals::default();

    for entry in entries {
        let date = resolver.resolve(entry);
        if !same_month(date, month_anchor) {
            continue;
        }
        if date.day() <= FIRST_HALF_LAST_DAY {
            totals.first_half += entry.signed_hours();
        } else {
            totals.second_half += entry.signed_hours();
        }
    }

    totals.month = totals.first_half + totals.second_half;
    totals
}

/// One bucket of the monthly trend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyHours {
    /// First day of the month.
    pub month: NaiveDate,
    /// Signed hours of the month, rounded to one decimal place.
    pub hours: Decimal,
    /// `hours * hourly_rate`, rounded to two decimal places.
    pub monetary_value: Decimal,
}

/// Chronologically ascending monthly buckets ending at the current month.
///
/// The iterator is finite and `Clone`, so a trend can be replayed without
/// touching the store again.
#[derive(Debug, Clone)]
pub struct TrailingMonths<'a> {
    entries: &'a [LedgerEntry],
    resolver: EntryDateResolver,
    hourly_rate: Decimal,
    next_month: NaiveDate,
    remaining: u32,
}

impl Iterator for TrailingMonths<'_> {
    type Item = MonthlyHours;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        let month = self.next_month;
        let hours: Decimal = self
            .entries
            .iter()
            .filter(|entry| same_month(self.resolver.resolve(entry), month))
            .map(LedgerEntry::signed_hours)
            .sum();

        self.remaining -= 1;
        if self.remaining > 0 {
            self.next_month = month + Months::new(1);
        }

        Some(MonthlyHours {
            month,
            hours: display_hours(hours),
            monetary_value: monetary_value(hours, self.hourly_rate),
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = usize::try_from(self.remaining).unwrap_or(usize::MAX);
        (len, Some(len))
    }
}

impl ExactSizeIterator for TrailingMonths<'_> {}

/// Trend of the last `count` months, the month containing `today` last.
///
/// `count` is capped at [`MAX_TREND_MONTHS`]. A trend that would start
/// before the earliest representable month is empty.
#[must_use]
pub fn trailing_months<'a>(
    entries: &'a [LedgerEntry],
    resolver: &EntryDateResolver,
    today: NaiveDate,
    count: u32,
    hourly_rate: Decimal,
) -> TrailingMonths<'a> {
    let current_month = today - Days::new(u64::from(today.day0()));
    let count = count.min(MAX_TREND_MONTHS);
    let (next_month, remaining) =
        match current_month.checked_sub_months(Months::new(count.saturating_sub(1))) {
            Some(first) => (first, count),
            None => (current_month, 0),
        };
    TrailingMonths {
        entries,
        resolver: *resolver,
        hourly_rate,
        next_month,
        remaining,
    }
}

fn same_month(date: NaiveDate, anchor: NaiveDate) -> bool {
    date.year() == anchor.year() && date.month() == anchor.month()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::entry::EntryKind;
    use chrono::{TimeZone, Utc};
    use hourbank_shared::types::{LedgerEntryId, WorkerId};
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn entry_on(kind: EntryKind, hours: Decimal, on: NaiveDate) -> LedgerEntry {
        LedgerEntry {
            id: LedgerEntryId::new(),
            owner_id: WorkerId::new(),
            hours,
            kind,
            note: Some(format!("Entry - {}", on.format("%d/%m/%Y"))),
            created_at: Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    // ========================================================================
    // Balance is credit minus debit, independent of order
    // ========================================================================

    fn entry_strategy() -> impl Strategy<Value = LedgerEntry> {
        (
            prop_oneof![Just(EntryKind::Credit), Just(EntryKind::Debit)],
            1i64..10_000i64,
            0u64..730u64,
        )
            .prop_map(|(kind, tenths, offset)| {
                entry_on(kind, Decimal::new(tenths, 1), date(2023, 1, 1) + Days::new(offset))
            })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn prop_balance_is_credits_minus_debits(
            entries in prop::collection::vec(entry_strategy(), 0..40),
        ) {
            let credits: Decimal = entries
                .iter()
                .filter(|e| e.kind == EntryKind::Credit)
                .map(|e| e.hours)
                .sum();
            let debits: Decimal = entries
                .iter()
                .filter(|e| e.kind == EntryKind::Debit)
                .map(|e| e.hours)
                .sum();
            prop_assert_eq!(balance(&entries), credits - debits);
        }

        #[test]
        fn prop_balance_is_order_independent(
            shuffled in prop::collection::vec(entry_strategy(), 0..40)
                .prop_flat_map(|v| (Just(v.clone()), Just(v).prop_shuffle())),
        ) {
            let (original, permuted) = shuffled;
            prop_assert_eq!(balance(&original), balance(&permuted));
        }

        #[test]
        fn prop_month_is_sum_of_halves(
            entries in prop::collection::vec(entry_strategy(), 0..40),
            offset in 0u64..730,
        ) {
            let resolver = EntryDateResolver::default();
            let anchor = date(2023, 1, 1) + Days::new(offset);
            let totals = fortnight_totals(&entries, &resolver, anchor);
            prop_assert_eq!(totals.month, totals.first_half + totals.second_half);
        }
    }

    // ========================================================================
    // Unit tests for specific examples
    // ========================================================================

    #[test]
    fn test_balance_examples() {
        let entries = vec![
            entry_on(EntryKind::Credit, dec!(12), date(2024, 3, 1)),
            entry_on(EntryKind::Credit, dec!(6.5), date(2024, 3, 2)),
            entry_on(EntryKind::Debit, dec!(8), date(2024, 3, 3)),
        ];
        assert_eq!(balance(&entries), dec!(10.5));
        assert_eq!(balance(&Vec::<LedgerEntry>::new()), Decimal::ZERO);
    }

    #[test]
    fn test_fortnight_totals_split_at_day_15() {
        let resolver = EntryDateResolver::default();
        let entries = vec![
            entry_on(EntryKind::Credit, dec!(12), date(2024, 3, 1)),
            entry_on(EntryKind::Credit, dec!(4), date(2024, 3, 15)),
            entry_on(EntryKind::Credit, dec!(6), date(2024, 3, 16)),
            entry_on(EntryKind::Debit, dec!(8), date(2024, 3, 31)),
            // Other months are ignored.
            entry_on(EntryKind::Credit, dec!(100), date(2024, 2, 29)),
            entry_on(EntryKind::Credit, dec!(100), date(2023, 3, 10)),
        ];

        let totals = fortnight_totals(&entries, &resolver, date(2024, 3, 20));
        assert_eq!(totals.first_half, dec!(16));
        assert_eq!(totals.second_half, dec!(-2));
        assert_eq!(totals.month, dec!(14));
        assert_eq!(totals.of(Half::Second), dec!(-2));
    }

    #[test]
    fn test_trailing_months_ascending_and_ending_now() {
        let resolver = EntryDateResolver::default();
        let entries = vec![
            entry_on(EntryKind::Credit, dec!(10), date(2023, 9, 5)),
            entry_on(EntryKind::Credit, dec!(5), date(2023, 12, 31)),
            entry_on(EntryKind::Debit, dec!(2), date(2024, 1, 1)),
            entry_on(EntryKind::Credit, dec!(7), date(2024, 2, 20)),
            // Before the window.
            entry_on(EntryKind::Credit, dec!(99), date(2023, 8, 31)),
        ];

        let trend: Vec<_> =
            trailing_months(&entries, &resolver, date(2024, 2, 20), 6, dec!(25)).collect();

        let months: Vec<_> = trend.iter().map(|b| b.month).collect();
        assert_eq!(
            months,
            vec![
                date(2023, 9, 1),
                date(2023, 10, 1),
                date(2023, 11, 1),
                date(2023, 12, 1),
                date(2024, 1, 1),
                date(2024, 2, 1),
            ]
        );
        let hours: Vec<_> = trend.iter().map(|b| b.hours).collect();
        assert_eq!(hours, vec![dec!(10), dec!(0), dec!(0), dec!(5), dec!(-2), dec!(7)]);
        assert_eq!(trend[0].monetary_value, dec!(250.00));
        assert_eq!(trend[4].monetary_value, dec!(-50.00));
    }

    #[test]
    fn test_trailing_months_is_restartable() {
        let resolver = EntryDateResolver::default();
        let entries = vec![entry_on(EntryKind::Credit, dec!(3), date(2024, 3, 2))];
        let trend = trailing_months(&entries, &resolver, date(2024, 3, 20), 6, dec!(10));

        assert_eq!(trend.len(), 6);
        let first: Vec<_> = trend.clone().collect();
        let second: Vec<_> = trend.collect();
        assert_eq!(first, second);
        assert!(trailing_months(&entries, &resolver, date(2024, 3, 20), 0, dec!(10))
            .next()
            .is_none());
    }

    #[test]
    fn test_trailing_months_out_of_range_count() {
        let resolver = EntryDateResolver::default();
        let entries = vec![entry_on(EntryKind::Credit, dec!(3), date(2024, 3, 2))];

        let trend = trailing_months(&entries, &resolver, date(2024, 3, 20), u32::MAX, dec!(10));
        assert_eq!(trend.len(), MAX_TREND_MONTHS as usize);
        let months: Vec<_> = trend.collect();
        assert_eq!(months.first().unwrap().month, date(1924, 4, 1));
        assert_eq!(months.last().unwrap().month, date(2024, 3, 1));
        assert_eq!(months.last().unwrap().hours, dec!(3));

        let earliest = NaiveDate::MIN + Days::new(40);
        assert_eq!(trailing_months(&entries, &resolver, earliest, 24, dec!(10)).count(), 0);
    }

    #[test]
    fn test_trend_rounding() {
        let resolver = EntryDateResolver::default();
        let entries = vec![
            entry_on(EntryKind::Credit, dec!(1.25), date(2024, 3, 2)),
            entry_on(EntryKind::Credit, dec!(0.08), date(2024, 3, 3)),
        ];
        let bucket = trailing_months(&entries, &resolver, date(2024, 3, 20), 1, dec!(33.333))
            .next()
            .unwrap();

        assert_eq!(bucket.hours, dec!(1.3));
        // 1.33 * 33.333 = 44.33289
        assert_eq!(bucket.monetary_value, dec!(44.33));
    }

    #[test]
    fn test_monetary_value_rounds_half_away_from_zero() {
        assert_eq!(monetary_value(dec!(1), dec!(0.125)), dec!(0.13));
        assert_eq!(monetary_value(dec!(-1), dec!(0.125)), dec!(-0.13));
        assert_eq!(display_hours(dec!(2.25)), dec!(2.3));
    }
}
