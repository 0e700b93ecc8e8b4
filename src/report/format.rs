//! Formatted terminal output.

use chrono::NaiveDate;

use crate::domain::{PeriodSet, RainyPeriod, Station, StationSeries};

/// One station's wettest window, as produced by a scan.
#[derive(Debug, Clone)]
pub struct StationBest {
    pub station_id: String,
    pub name: Option<String>,
    /// `None` for stations with no positive-rainfall window.
    pub best: Option<RainyPeriod>,
}

/// Order scan results: wettest first, dry stations last, ties by id.
pub fn rank_scan(mut results: Vec<StationBest>) -> Vec<StationBest> {
    results.sort_by(|a, b| {
        let ka = a.best.as_ref().map(|p| p.cumulative_mm);
        let kb = b.best.as_ref().map(|p| p.cumulative_mm);
        kb.partial_cmp(&ka)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.station_id.cmp(&b.station_id))
    });
    results
}

/// Format the run header (station metadata + series coverage).
pub fn format_run_summary(station: &Station, series: &StationSeries) -> String {
    let mut out = String::new();

    out.push_str("=== pluvio - Rainy periods ===\n");
    out.push_str(&format!("Station: {}\n", station.display_label()));
    if let Some(commune) = &station.commune {
        out.push_str(&format!("Commune: {commune}\n"));
    }
    if let Some(altitude) = station.altitude_m {
        out.push_str(&format!("Altitude: {altitude:.0} m\n"));
    }

    match (series.first_date(), series.last_date()) {
        (Some(first), Some(last)) => {
            out.push_str(&format!(
                "Series: {} to {} | n={} obs | missing={}\n",
                fmt_date(first),
                fmt_date(last),
                series.len(),
                series.missing_count(),
            ));
        }
        _ => out.push_str("Series: empty\n"),
    }

    out
}

/// Format the selected periods (or the empty-result message).
pub fn format_periods(set: &PeriodSet) -> String {
    if set.is_empty() {
        return "No rainy period found for this station.\n".to_string();
    }

    let mut out = String::new();
    out.push_str(&format!(
        "Top {} rainiest {}-day period(s):\n",
        set.len(),
        set.window_length
    ));

    for (idx, period) in set.periods.iter().enumerate() {
        out.push_str(&format!("\nPeriod {}:\n", idx + 1));
        out.push_str(&format!(
            "  From {} to {}\n",
            fmt_date(period.start_date),
            fmt_date(period.end_date)
        ));
        out.push_str(&format!("  Cumulative: {:.1} mm\n", period.cumulative_mm));
        out.push_str(&format!(
            "  Daily mean: {:.1} mm/day\n",
            set.daily_mean_mm(period)
        ));
    }

    out
}

/// Format the scan ranking table.
pub fn format_scan_table(results: &[StationBest], window_length: usize) -> String {
    let mut out = String::new();

    out.push_str(&format!(
        "Wettest {window_length}-day window per station:\n"
    ));
    out.push_str(&format!(
        "{:<12} {:<24} {:>12} {:>12} {:>12}\n",
        "station", "name", "start", "end", "cumul (mm)"
    ));
    out.push_str(&format!(
        "{:-<12} {:-<24} {:-<12} {:-<12} {:-<12}\n",
        "", "", "", "", ""
    ));

    for result in results {
        let name = truncate(result.name.as_deref().unwrap_or(""), 24);
        match &result.best {
            Some(period) => out.push_str(&format!(
                "{:<12} {:<24} {:>12} {:>12} {:>12.1}\n",
                result.station_id,
                name,
                fmt_date(period.start_date),
                fmt_date(period.end_date),
                period.cumulative_mm,
            )),
            None => out.push_str(&format!(
                "{:<12} {:<24} {:>12} {:>12} {:>12}\n",
                result.station_id, name, "-", "-", "dry"
            )),
        }
    }

    out
}

fn fmt_date(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DailyObservation;
    use chrono::Duration;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 1, d).unwrap()
    }

    fn period(station: &str, start: u32, end: u32, cumul: f64) -> RainyPeriod {
        RainyPeriod {
            station_id: station.to_string(),
            start_date: date(start),
            end_date: date(end),
            cumulative_mm: cumul,
        }
    }

    #[test]
    fn summary_includes_metadata_and_coverage() {
        let station = Station {
            name: Some("ARBENT".to_string()),
            commune: Some("Arbent".to_string()),
            altitude_m: Some(534.0),
            ..Station::with_id("01014002")
        };
        let observations = (0..3)
            .map(|i| DailyObservation {
                date: date(1) + Duration::days(i),
                rainfall_mm: if i == 1 { None } else { Some(1.0) },
                quality: None,
            })
            .collect();
        let series = StationSeries::new("01014002", observations).unwrap();

        let text = format_run_summary(&station, &series);
        assert!(text.contains("ARBENT (n°01014002)"));
        assert!(text.contains("Altitude: 534 m"));
        assert!(text.contains("01/01/2023 to 03/01/2023"));
        assert!(text.contains("missing=1"));
    }

    #[test]
    fn periods_block_lists_each_period() {
        let set = PeriodSet {
            station_id: "X".to_string(),
            window_length: 5,
            periods: vec![period("X", 3, 7, 154.2), period("X", 10, 14, 80.0)],
        };

        let text = format_periods(&set);
        assert!(text.contains("Top 2 rainiest 5-day period(s):"));
        assert!(text.contains("From 03/01/2023 to 07/01/2023"));
        assert!(text.contains("Cumulative: 154.2 mm"));
        assert!(text.contains("Daily mean: 30.8 mm/day"));
        assert!(text.contains("Period 2:"));
    }

    #[test]
    fn empty_set_is_a_message_not_an_error() {
        let set = PeriodSet {
            station_id: "X".to_string(),
            window_length: 3,
            periods: vec![],
        };
        assert_eq!(format_periods(&set), "No rainy period found for this station.\n");
    }

    #[test]
    fn scan_ranking_orders_wettest_first_dry_last() {
        let results = vec![
            StationBest {
                station_id: "B".to_string(),
                name: None,
                best: Some(period("B", 1, 2, 10.0)),
            },
            StationBest {
                station_id: "A".to_string(),
                name: None,
                best: None,
            },
            StationBest {
                station_id: "C".to_string(),
                name: None,
                best: Some(period("C", 1, 2, 25.0)),
            },
        ];

        let ranked = rank_scan(results);
        let ids: Vec<_> = ranked.iter().map(|r| r.station_id.as_str()).collect();
        assert_eq!(ids, ["C", "B", "A"]);

        let table = format_scan_table(&ranked, 2);
        assert!(table.contains("dry"));
        assert!(table.contains("25.0"));
    }
}
