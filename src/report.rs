//! Plain-text rendering of a batch report.

use std::fmt::{self, Write as _};

use skiday_decision::{BatchReport, Reason, ResortFailure, ResortResult, Summary};

/// Placeholder for values the providers did not deliver.
const MISSING: &str = "–";

/// Human sentence for a reason code and its parameters.
pub fn reason_text(reason: &Reason) -> String {
    let param = |name: &str| {
        reason
            .params()
            .into_iter()
            .find(|(key, _)| *key == name)
            .map(|(_, v)| number(v, 0))
            .unwrap_or_else(|| MISSING.to_string())
    };

    match reason.code() {
        "lifts_closed" => "Lifts are closed outside the season.".to_string(),
        "no_resort_in_range" => "No ski resort within range.".to_string(),
        "temp_range" => format!(
            "Temperature outside {} to {} °C.",
            param("min"),
            param("max")
        ),
        "wind" => format!("Wind above {} km/h.", param("max")),
        "snow_top" => format!("Less than {} cm of snow at the top.", param("min")),
        "snow_bottom" => format!("Less than {} cm of snow at the bottom.", param("min")),
        "fresh_snow" => format!("Less than {} cm of fresh snow.", param("min")),
        "great" => "Great conditions.".to_string(),
        "good" => "Good conditions.".to_string(),
        "ok" => "Acceptable conditions.".to_string(),
        "marginal" => "Marginal conditions.".to_string(),
        other => other.to_string(),
    }
}

pub fn summary_text(summary: Summary, max_distance_km: f64) -> String {
    match summary {
        Summary::NoResortInRange => {
            format!("No ski resort within {} km.", number(max_distance_km, 0))
        }
        Summary::NoneMatch => "No resort meets your criteria.".to_string(),
        Summary::OneMatches => "1 resort meets your criteria.".to_string(),
        Summary::ManyMatch(count) => format!("{} resorts meet your criteria.", count),
    }
}

/// Fixed-precision number, or a dash when not finite.
pub fn number(value: f64, decimals: usize) -> String {
    if value.is_finite() {
        format!("{:.*}", decimals, value)
    } else {
        MISSING.to_string()
    }
}

fn write_row(out: &mut String, cells: [&str; 9], reason: &str) -> fmt::Result {
    let [outcome, name, km, tmin, tmax, wind, top, bottom, fresh] = cells;
    writeln!(
        out,
        "{:<9} {:<28} {:>6} {:>6} {:>6} {:>6} {:>6} {:>6} {:>6}  {}",
        outcome, name, km, tmin, tmax, wind, top, bottom, fresh, reason
    )
}

fn write_table(out: &mut String, results: &[ResortResult]) -> fmt::Result {
    write_row(
        out,
        ["Outcome", "Resort", "km", "Tmin", "Tmax", "Wind", "Top", "Bottom", "Fresh"],
        "Reason",
    )?;
    for r in results {
        let w = &r.weather;
        write_row(
            out,
            [
                r.outcome.label(),
                r.resort.name.as_str(),
                &number(r.distance_km, 0),
                &number(w.temp_min, 1),
                &number(w.temp_max, 1),
                &number(w.wind_max, 0),
                &number(w.snow_top_cm, 0),
                &number(w.snow_bottom_cm, 0),
                &number(w.fresh_snow_cm, 1),
            ],
            &reason_text(&r.reason),
        )?;
    }
    Ok(())
}

fn write_failure(out: &mut String, failure: &ResortFailure) -> fmt::Result {
    write!(out, "{}: {}", failure.resort.name, failure.error.user_message())?;
    if failure.error.is_retryable() && !failure.error.is_rate_limited() {
        write!(out, " (temporary, rerun to retry)")?;
    }
    writeln!(out)
}

fn write_report(
    out: &mut String,
    report: &BatchReport,
    city: &str,
    max_distance_km: f64,
) -> fmt::Result {
    writeln!(out, "Skiing near {} on {}: {}", city, report.date, report.overall)?;
    writeln!(out, "{}", summary_text(report.summary, max_distance_km))?;
    if !report.season_open {
        writeln!(out, "{}", reason_text(&Reason::LiftsClosed))?;
    }

    if !report.results.is_empty() {
        writeln!(out)?;
        write_table(out, &report.results)?;
    }

    if !report.failures.is_empty() {
        writeln!(out)?;
        for failure in &report.failures {
            write_failure(out, failure)?;
        }
    }
    if report.rate_limited() {
        writeln!(out, "Some forecasts were rate limited. Try again in a few minutes.")?;
    }
    Ok(())
}

/// Full report for the terminal.
pub fn render(report: &BatchReport, city: &str, max_distance_km: f64) -> String {
    let mut out = String::new();
    // writing into a String cannot fail
    let _ = write_report(&mut out, report, city, max_distance_km);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use skiday_core::{Resort, WeatherError};
    use skiday_decision::Outcome;
    use skiday_weather::ResortWeather;

    fn resort(name: &str) -> Resort {
        Resort {
            id: name.to_lowercase(),
            name: name.to_string(),
            lat: 47.7,
            lon: 11.9,
            elevation_top: 1500.0,
            elevation_bottom: 800.0,
            snow_forecast_slug: None,
            snow_forecast_record: None,
        }
    }

    fn report(results: Vec<ResortResult>, failures: Vec<ResortFailure>) -> BatchReport {
        BatchReport {
            date: NaiveDate::from_ymd_opt(2026, 1, 15).unwrap(),
            season_open: true,
            overall: Outcome::best(results.iter().map(|r| r.outcome)),
            summary: Summary::OneMatches,
            matching: 1,
            results,
            failures,
        }
    }

    #[test]
    fn test_reason_text_uses_params() {
        let text = reason_text(&Reason::TemperatureRange {
            min: -15.0,
            max: 5.0,
        });
        assert_eq!(text, "Temperature outside -15 to 5 °C.");
        assert_eq!(
            reason_text(&Reason::WindTooStrong { max: 50.0 }),
            "Wind above 50 km/h."
        );
        assert_eq!(
            reason_text(&Reason::Conditions {
                grade: Outcome::Okay
            }),
            "Acceptable conditions."
        );
    }

    #[test]
    fn test_summary_sentences() {
        assert_eq!(
            summary_text(Summary::NoResortInRange, 150.0),
            "No ski resort within 150 km."
        );
        assert_eq!(
            summary_text(Summary::ManyMatch(3), 150.0),
            "3 resorts meet your criteria."
        );
    }

    #[test]
    fn test_non_finite_values_render_as_dash() {
        assert_eq!(number(f64::NAN, 1), "–");
        assert_eq!(number(f64::INFINITY, 0), "–");
        assert_eq!(number(-3.26, 1), "-3.3");
    }

    #[test]
    fn test_render_lists_results_and_failures() {
        let result = ResortResult {
            resort: resort("Sudelfeld"),
            distance_km: 61.4,
            weather: ResortWeather {
                temp_min: -6.0,
                temp_max: -1.0,
                wind_max: 12.0,
                snow_top_cm: 70.0,
                snow_bottom_cm: f64::NAN,
                fresh_snow_cm: 4.0,
            },
            outcome: Outcome::Good,
            reason: Reason::Conditions {
                grade: Outcome::Good,
            },
        };
        let failure = ResortFailure {
            resort: resort("Wendelstein"),
            distance_km: 58.0,
            error: WeatherError::RateLimited {
                provider: "open-meteo",
                retry_after_secs: 60,
            },
        };

        let outage = ResortFailure {
            resort: resort("Brauneck"),
            distance_km: 52.0,
            error: WeatherError::Api {
                provider: "open-meteo",
                status: 503,
                message: "maintenance".to_string(),
            },
        };

        let text = render(
            &report(vec![result], vec![failure, outage]),
            "Munich",
            150.0,
        );

        assert!(text.starts_with("Skiing near Munich on 2026-01-15: Good"));
        assert!(text.contains("1 resort meets your criteria."));
        assert!(text.contains("Sudelfeld"));
        assert!(text.contains("–"));
        // fresh snow keeps one decimal
        assert!(text.contains("   4.0  Good conditions."));
        let line = |name: &str| text.lines().find(|l| l.starts_with(name)).unwrap_or_default();
        assert!(line("Wendelstein:").contains("Too many requests"));
        assert!(!line("Wendelstein:").contains("(temporary"));
        assert!(line("Brauneck:").ends_with("(temporary, rerun to retry)"));
        assert!(text.contains("Try again in a few minutes."));
    }
}
