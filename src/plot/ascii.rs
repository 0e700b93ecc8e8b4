//! ASCII plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements:
//! - daily rainfall: `|` bars over a calendar x-axis
//! - selected periods: the same bars drawn as `#` (a period with no recorded
//!   rain still gets a bottom-row `#` so its span stays visible)
//!
//! When the series spans more days than there are columns, each column shows
//! the maximum daily amount of the days it covers.

use crate::domain::{PeriodSet, StationSeries};

/// Render the rainfall bars with the selected periods highlighted.
pub fn render_rainfall_plot(
    series: &StationSeries,
    set: &PeriodSet,
    width: usize,
    height: usize,
) -> String {
    let width = width.max(10);
    let height = height.max(4);

    let (Some(first), Some(last)) = (series.first_date(), series.last_date()) else {
        return "Plot: no observations\n".to_string();
    };

    let span_days = (last - first).num_days().max(1) as f64;
    let y_max = pad_max(series.max_daily_mm().unwrap_or(0.0));

    // Column -> (max amount, inside a selected period?)
    let mut columns: Vec<(Option<f64>, bool)> = vec![(None, false); width];

    for observation in series.observations() {
        let offset = (observation.date - first).num_days() as f64;
        let col = map_x(offset, span_days, width);

        if let Some(value) = observation.rainfall_mm {
            let slot = &mut columns[col].0;
            *slot = Some(slot.map_or(value, |v| v.max(value)));
        }
        let highlighted = set
            .periods
            .iter()
            .any(|p| (p.start_date..=p.end_date).contains(&observation.date));
        columns[col].1 |= highlighted;
    }

    let mut grid = vec![vec![' '; width]; height];
    for (col, (value, highlighted)) in columns.iter().enumerate() {
        let ch = if *highlighted { '#' } else { '|' };

        let cells = match value {
            Some(v) if *v > 0.0 => bar_cells(*v, y_max, height),
            // Keep the span of a dry highlighted day visible.
            _ if *highlighted => 1,
            _ => 0,
        };
        for row in 0..cells {
            grid[height - 1 - row][col] = ch;
        }
    }

    let mut out = String::new();
    out.push_str(&format!(
        "Plot: dates=[{first}, {last}] | daily=[0.0, {y_max:.1}]mm | window={}d\n",
        set.window_length
    ));
    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }

    out
}

fn pad_max(max: f64) -> f64 {
    if max > 0.0 { max * 1.05 } else { 1.0 }
}

fn map_x(offset: f64, span: f64, width: usize) -> usize {
    let u = (offset / span).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn bar_cells(value: f64, y_max: f64, height: usize) -> usize {
    let u = (value / y_max).clamp(0.0, 1.0);
    let cells = (u * (height as f64 - 1.0)).round() as usize;
    cells.max(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DailyObservation, RainyPeriod};
    use chrono::{Duration, NaiveDate};

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 1, d).unwrap()
    }

    fn series_of(values: &[f64]) -> StationSeries {
        let observations = values
            .iter()
            .enumerate()
            .map(|(i, &v)| DailyObservation {
                date: date(1) + Duration::days(i as i64),
                rainfall_mm: Some(v),
                quality: None,
            })
            .collect();
        StationSeries::new("07460001", observations).unwrap()
    }

    fn period(start: u32, end: u32, cumul: f64) -> RainyPeriod {
        RainyPeriod {
            station_id: "07460001".to_string(),
            start_date: date(start),
            end_date: date(end),
            cumulative_mm: cumul,
        }
    }

    #[test]
    fn plot_golden_snapshot_small() {
        let series = series_of(&[0.0, 0.0, 5.0, 5.0, 0.0, 0.0, 0.0, 8.0, 8.0, 8.0]);
        let set = PeriodSet {
            station_id: "07460001".to_string(),
            window_length: 2,
            periods: vec![period(8, 9, 16.0), period(3, 4, 10.0), period(9, 10, 8.0)],
        };

        let txt = render_rainfall_plot(&series, &set, 10, 4);
        let expected = concat!(
            "Plot: dates=[2023-01-01, 2023-01-10] | daily=[0.0, 8.4]mm | window=2d\n",
            "          \n",
            "       ###\n",
            "  ##   ###\n",
            "  ##   ###\n",
        );
        assert_eq!(txt, expected);
    }

    #[test]
    fn dry_highlighted_day_keeps_a_mark() {
        let series = series_of(&[0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 4.0]);
        let set = PeriodSet {
            station_id: "07460001".to_string(),
            window_length: 2,
            periods: vec![period(9, 10, 4.0)],
        };

        let txt = render_rainfall_plot(&series, &set, 10, 4);
        let bottom = txt.lines().last().unwrap();
        assert_eq!(&bottom[8..10], "##");
    }

    #[test]
    fn empty_series_renders_placeholder() {
        let series = series_of(&[]);
        let set = PeriodSet {
            station_id: "07460001".to_string(),
            window_length: 2,
            periods: vec![],
        };
        assert_eq!(
            render_rainfall_plot(&series, &set, 20, 10),
            "Plot: no observations\n"
        );
    }
}
