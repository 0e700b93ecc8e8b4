//! Maximum-window selection with suppression.
//!
//! Given a station's daily series and a window length `k` (in recorded rows),
//! the finder repeatedly:
//!
//! 1. computes trailing `k`-row sums over a mutable working copy of the
//!    rainfall values (missing measurements contribute 0),
//! 2. picks the maximum sum over valid end positions, stopping early when the
//!    maximum is ≤ 0, breaking ties toward the earliest end date,
//! 3. records the period (`start_date = end_date - (k - 1)` calendar days),
//! 4. zeroes the working value of every row whose date falls inside the
//!    recorded range, so those rows cannot feed a later selection,
//!
//! until `max_periods` periods are found or nothing positive remains.
//!
//! Complexity: O(n·k) per selected period (the sums are fully recomputed
//! after each suppression). With `max_periods` bounded at a small constant
//! this is fine even for multi-decade daily series; callers with unusual
//! sizes should expect `max_periods · n · k` additions per query.
//!
//! Gap semantics: the window counts rows, not calendar days. When the rows
//! of a window straddle a calendar gap, the derived `start_date` can name a
//! date with no observation, and rows that contributed to the sum can lie
//! before the derived range — suppression masks by date range and therefore
//! leaves such rows untouched. This mirrors a fixed-count rolling sum over a
//! non-gap-filled table and is deliberate; series without gaps (the normal
//! case for quality-controlled climatology files) cannot double count.

use chrono::Duration;

use crate::domain::{PeriodSet, RainyPeriod, StationSeries};
use crate::error::AppError;
use crate::finder::rolling::trailing_sums;

/// How many periods a query returns unless the caller asks otherwise.
pub const DEFAULT_MAX_PERIODS: usize = 5;

/// Find the up-to-`max_periods` wettest non-overlapping windows of
/// `window_length` rows in `series`.
///
/// The input series is borrowed immutably and never modified; the finder
/// works on an internal copy. A series with fewer than `window_length` rows
/// (or an empty one) yields an empty `PeriodSet` — that is a valid outcome,
/// not an error. `window_length == 0` is an invalid argument.
pub fn find_rainy_periods(
    series: &StationSeries,
    window_length: usize,
    max_periods: usize,
) -> Result<PeriodSet, AppError> {
    if window_length == 0 {
        return Err(AppError::invalid_argument(
            "Window length must be a positive number of days.",
        ));
    }

    let dates: Vec<_> = series.observations().iter().map(|o| o.date).collect();
    let mut working: Vec<f64> = series
        .observations()
        .iter()
        .map(|o| o.rainfall_mm.unwrap_or(0.0))
        .collect();

    let mut periods = Vec::new();

    for _ in 0..max_periods {
        let sums = trailing_sums(&working, window_length);

        let Some((end_idx, cumulative_mm)) = max_valid_position(&sums) else {
            break;
        };
        if cumulative_mm <= 0.0 {
            break;
        }

        let end_date = dates[end_idx];
        let start_date = end_date
            .checked_sub_signed(Duration::days(window_length as i64 - 1))
            .ok_or_else(|| {
                AppError::internal(format!(
                    "Window start underflows the calendar (end {end_date}, {window_length} days)."
                ))
            })?;

        periods.push(RainyPeriod {
            station_id: series.station_id().to_string(),
            start_date,
            end_date,
            cumulative_mm,
        });

        // Suppress: days inside the recorded range never contribute again.
        for (value, date) in working.iter_mut().zip(&dates) {
            if (start_date..=end_date).contains(date) {
                *value = 0.0;
            }
        }
    }

    Ok(PeriodSet {
        station_id: series.station_id().to_string(),
        window_length,
        periods,
    })
}

/// Maximum over valid end positions, earliest index on ties.
///
/// The strict `>` while scanning ascending is what pins the tie-break: a
/// later position only wins by being strictly larger.
fn max_valid_position(sums: &[Option<f64>]) -> Option<(usize, f64)> {
    let mut best: Option<(usize, f64)> = None;
    for (idx, sum) in sums.iter().enumerate() {
        let Some(sum) = *sum else { continue };
        match best {
            Some((_, current)) if sum <= current => {}
            _ => best = Some((idx, sum)),
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DailyObservation;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    /// Consecutive days starting 2023-01-01; `None` marks a missing value.
    fn series_from(values: &[Option<f64>]) -> StationSeries {
        let start = date(2023, 1, 1);
        let observations = values
            .iter()
            .enumerate()
            .map(|(i, v)| DailyObservation {
                date: start + Duration::days(i as i64),
                rainfall_mm: *v,
                quality: None,
            })
            .collect();
        StationSeries::new("07460001", observations).unwrap()
    }

    fn series_of(values: &[f64]) -> StationSeries {
        let values: Vec<Option<f64>> = values.iter().copied().map(Some).collect();
        series_from(&values)
    }

    #[test]
    fn ten_day_scenario_window_two() {
        // Hand-derived: sums ending at each day are
        // [-, 0, 5, 10, 5, 0, 0, 8, 16, 16]; the first pass takes 16 at the
        // earlier of the tied ends (day 9), the second takes 10 at day 4, the
        // third takes the leftover 8 at day 10, then nothing positive remains.
        let series = series_of(&[0.0, 0.0, 5.0, 5.0, 0.0, 0.0, 0.0, 8.0, 8.0, 8.0]);
        let set = find_rainy_periods(&series, 2, DEFAULT_MAX_PERIODS).unwrap();

        assert_eq!(set.window_length, 2);
        assert_eq!(set.len(), 3);

        assert_eq!(set.periods[0].start_date, date(2023, 1, 8));
        assert_eq!(set.periods[0].end_date, date(2023, 1, 9));
        assert_eq!(set.periods[0].cumulative_mm, 16.0);

        assert_eq!(set.periods[1].start_date, date(2023, 1, 3));
        assert_eq!(set.periods[1].end_date, date(2023, 1, 4));
        assert_eq!(set.periods[1].cumulative_mm, 10.0);

        assert_eq!(set.periods[2].start_date, date(2023, 1, 9));
        assert_eq!(set.periods[2].end_date, date(2023, 1, 10));
        assert_eq!(set.periods[2].cumulative_mm, 8.0);
    }

    #[test]
    fn cumulative_is_non_increasing() {
        let series = series_of(&[0.0, 0.0, 5.0, 5.0, 0.0, 0.0, 0.0, 8.0, 8.0, 8.0]);
        let set = find_rainy_periods(&series, 2, DEFAULT_MAX_PERIODS).unwrap();
        for pair in set.periods.windows(2) {
            assert!(pair[0].cumulative_mm >= pair[1].cumulative_mm);
        }
    }

    #[test]
    fn separated_humps_yield_disjoint_ranges() {
        let mut values = vec![0.0; 30];
        values[2..5].fill(10.0); // days 3-5
        values[14..17].fill(7.0); // days 15-17
        values[24..27].fill(5.0); // days 25-27
        let series = series_of(&values);

        let set = find_rainy_periods(&series, 3, DEFAULT_MAX_PERIODS).unwrap();
        assert_eq!(set.len(), 3);
        assert_eq!(set.periods[0].cumulative_mm, 30.0);
        assert_eq!(set.periods[1].cumulative_mm, 21.0);
        assert_eq!(set.periods[2].cumulative_mm, 15.0);

        for (i, a) in set.periods.iter().enumerate() {
            for b in &set.periods[i + 1..] {
                assert!(
                    a.end_date < b.start_date || b.end_date < a.start_date,
                    "ranges overlap: {a:?} vs {b:?}"
                );
            }
        }
    }

    #[test]
    fn tie_break_prefers_earliest_end_date() {
        // Every valid window sums to 6; the first selection must land on the
        // earliest end (day 2), not any of the later ties.
        let series = series_of(&[3.0, 3.0, 3.0, 3.0]);
        let set = find_rainy_periods(&series, 2, DEFAULT_MAX_PERIODS).unwrap();

        assert_eq!(set.len(), 2);
        assert_eq!(set.periods[0].start_date, date(2023, 1, 1));
        assert_eq!(set.periods[0].end_date, date(2023, 1, 2));
        assert_eq!(set.periods[1].start_date, date(2023, 1, 3));
        assert_eq!(set.periods[1].end_date, date(2023, 1, 4));
    }

    #[test]
    fn repeated_runs_are_identical() {
        let series = series_of(&[1.0, 4.0, 4.0, 1.0, 4.0, 4.0, 1.0]);
        let a = find_rainy_periods(&series, 3, DEFAULT_MAX_PERIODS).unwrap();
        let b = find_rainy_periods(&series, 3, DEFAULT_MAX_PERIODS).unwrap();
        assert_eq!(a.periods, b.periods);
    }

    #[test]
    fn missing_values_contribute_zero() {
        let series = series_from(&[Some(5.0), None, Some(5.0)]);
        let set = find_rainy_periods(&series, 3, DEFAULT_MAX_PERIODS).unwrap();

        assert_eq!(set.len(), 1);
        assert_eq!(set.periods[0].cumulative_mm, 10.0);
        assert_eq!(set.periods[0].start_date, date(2023, 1, 1));
        assert_eq!(set.periods[0].end_date, date(2023, 1, 3));
    }

    #[test]
    fn window_may_straddle_a_calendar_gap() {
        // Rows on Jan 1, 2, 10, 11. The window counts rows, so (Jan 2, Jan 10)
        // is a valid 2-row window summing 12; its derived start (Jan 9) names a
        // date with no observation, and suppression of [Jan 9, Jan 10] leaves
        // the Jan 2 row untouched.
        let observations = vec![
            (date(2023, 1, 1), 2.0),
            (date(2023, 1, 2), 3.0),
            (date(2023, 1, 10), 9.0),
            (date(2023, 1, 11), 1.0),
        ]
        .into_iter()
        .map(|(date, mm)| DailyObservation {
            date,
            rainfall_mm: Some(mm),
            quality: None,
        })
        .collect();
        let series = StationSeries::new("07460001", observations).unwrap();

        let set = find_rainy_periods(&series, 2, DEFAULT_MAX_PERIODS).unwrap();

        assert_eq!(set.len(), 3);
        assert_eq!(set.periods[0].start_date, date(2023, 1, 9));
        assert_eq!(set.periods[0].end_date, date(2023, 1, 10));
        assert_eq!(set.periods[0].cumulative_mm, 12.0);

        assert_eq!(set.periods[1].start_date, date(2023, 1, 1));
        assert_eq!(set.periods[1].end_date, date(2023, 1, 2));
        assert_eq!(set.periods[1].cumulative_mm, 5.0);

        assert_eq!(set.periods[2].start_date, date(2023, 1, 10));
        assert_eq!(set.periods[2].end_date, date(2023, 1, 11));
        assert_eq!(set.periods[2].cumulative_mm, 1.0);
    }

    #[test]
    fn series_shorter_than_window_is_empty_result() {
        let series = series_of(&[10.0, 10.0]);
        let set = find_rainy_periods(&series, 3, DEFAULT_MAX_PERIODS).unwrap();
        assert!(set.is_empty());
    }

    #[test]
    fn empty_series_is_empty_result() {
        let series = series_of(&[]);
        let set = find_rainy_periods(&series, 3, DEFAULT_MAX_PERIODS).unwrap();
        assert!(set.is_empty());
        assert_eq!(set.station_id, "07460001");
    }

    #[test]
    fn all_zero_series_is_empty_result() {
        let series = series_of(&[0.0; 20]);
        let set = find_rainy_periods(&series, 4, 100).unwrap();
        assert!(set.is_empty());
    }

    #[test]
    fn zero_window_is_invalid_argument() {
        let series = series_of(&[1.0, 2.0]);
        let err = find_rainy_periods(&series, 0, DEFAULT_MAX_PERIODS).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn max_periods_caps_the_result() {
        let series = series_of(&[1.0; 12]);
        let set = find_rainy_periods(&series, 2, 2).unwrap();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn input_series_is_untouched() {
        let series = series_of(&[5.0, 5.0, 5.0, 5.0]);
        let before = series.observations().to_vec();
        let _ = find_rainy_periods(&series, 2, DEFAULT_MAX_PERIODS).unwrap();
        assert_eq!(series.observations(), before.as_slice());
    }
}
