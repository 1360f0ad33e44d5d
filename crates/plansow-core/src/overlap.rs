//! Advisory overlap detection for new seasons and plantings.
//!
//! Overlaps never block creation. Callers log the result and go on.

use chrono::NaiveDate;

use crate::period::{AsPeriod, Period};

/// True if `candidate` overlaps any of `periods` that is active on `today`.
pub fn check_overlap<P: AsPeriod>(candidate: &Period, periods: &[P], today: NaiveDate) -> bool {
    periods.iter().any(|p| {
        let period = p.period();
        period.is_active(today) && period.overlaps(candidate)
    })
}

/// The active items among `items` that overlap `candidate`.
pub fn find_overlaps<'a, P: AsPeriod>(
    candidate: &Period,
    items: &'a [P],
    today: NaiveDate,
) -> Vec<&'a P> {
    items
        .iter()
        .filter(|item| {
            let period = item.period();
            period.is_active(today) && period.overlaps(candidate)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn two_open_seasons_overlap() {
        let first = Period::open(d(2024, 1, 1));
        let second = Period::open(d(2024, 6, 1));
        assert!(check_overlap(&second, &[first], d(2024, 6, 1)));
    }

    #[test]
    fn inactive_periods_are_ignored() {
        let finished = Period::new(d(2023, 1, 1), Some(d(2023, 12, 31)));
        let future = Period::open(d(2025, 1, 1));
        let candidate = Period::open(d(2023, 6, 1));
        assert!(!check_overlap(&candidate, &[finished, future], d(2024, 6, 1)));
    }

    #[test]
    fn active_but_disjoint_is_not_an_overlap() {
        let current = Period::new(d(2024, 1, 1), Some(d(2024, 6, 30)));
        let later = Period::new(d(2024, 7, 1), Some(d(2024, 9, 30)));
        assert!(!check_overlap(&later, &[current], d(2024, 3, 1)));
    }

    #[test]
    fn find_overlaps_returns_conflicts_only() {
        let a = Period::open(d(2024, 1, 1));
        let b = Period::new(d(2024, 1, 1), Some(d(2024, 2, 1)));
        let c = Period::new(d(2024, 3, 1), Some(d(2024, 8, 1)));
        let periods = [a, b, c];
        let candidate = Period::new(d(2024, 5, 1), Some(d(2024, 5, 31)));

        let hits = find_overlaps(&candidate, &periods, d(2024, 4, 1));
        assert_eq!(hits, vec![&a, &c]);
    }
}
