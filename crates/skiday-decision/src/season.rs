use chrono::{Datelike, NaiveDate};
use skiday_core::SeasonWindow;

/// Whether lifts are presumed open on `date`.
///
/// Dates compare as `month * 100 + day`. A window whose start lies after its
/// end wraps over New Year.
pub fn is_season_open(date: NaiveDate, season: &SeasonWindow) -> bool {
    let value = date.month() * 100 + date.day();
    let start = season.start.key();
    let end = season.end.key();

    if start > end {
        value >= start || value <= end
    } else {
        value >= start && value <= end
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skiday_core::MonthDay;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn window(start: (u32, u32), end: (u32, u32)) -> SeasonWindow {
        SeasonWindow {
            start: MonthDay::new(start.0, start.1).unwrap(),
            end: MonthDay::new(end.0, end.1).unwrap(),
        }
    }

    #[test]
    fn test_wrapped_window() {
        let season = SeasonWindow::default();
        assert!(is_season_open(day(2026, 1, 1), &season));
        assert!(!is_season_open(day(2026, 7, 1), &season));
        assert!(is_season_open(day(2025, 12, 31), &season));
    }

    #[test]
    fn test_wrapped_window_boundaries() {
        let season = SeasonWindow::default();
        assert!(is_season_open(day(2025, 12, 1), &season));
        assert!(!is_season_open(day(2025, 11, 30), &season));
        assert!(is_season_open(day(2026, 4, 15), &season));
        assert!(!is_season_open(day(2026, 4, 16), &season));
    }

    #[test]
    fn test_non_wrapping_window() {
        // glacier summer season
        let season = window((6, 15), (9, 30));
        assert!(is_season_open(day(2025, 7, 1), &season));
        assert!(is_season_open(day(2025, 6, 15), &season));
        assert!(!is_season_open(day(2025, 10, 1), &season));
        assert!(!is_season_open(day(2025, 1, 1), &season));
    }

    #[test]
    fn test_single_day_window() {
        let season = window((3, 1), (3, 1));
        assert!(is_season_open(day(2025, 3, 1), &season));
        assert!(!is_season_open(day(2025, 3, 2), &season));
    }
}
