mod report;

use std::process::ExitCode;
use std::time::Duration;

use chrono::{Local, NaiveDate};
use skiday_core::{AppError, Config, ConfigError, ResortCatalog};
use skiday_decision::{evaluate_from, sort_results, SortDirection, SortKey};
use skiday_weather::{Geocoder, WeatherService};

#[derive(Debug, PartialEq)]
struct Args {
    city: String,
    date: NaiveDate,
    /// Table order; `None` keeps the ranking
    sort: Option<(SortKey, SortDirection)>,
}

/// `KEY` alone uses the key's default direction.
fn parse_sort(value: &str) -> Result<(SortKey, SortDirection), AppError> {
    let (key, direction) = match value.split_once(':') {
        Some((key, direction)) => (key, Some(direction)),
        None => (value, None),
    };
    let key: SortKey = key.parse().map_err(AppError::Usage)?;
    let direction = match direction {
        Some(direction) => direction.parse().map_err(AppError::Usage)?,
        None => key.default_direction(),
    };
    Ok((key, direction))
}

/// An optional city and an optional date, in either order, plus `--sort KEY[:asc|:desc]`.
fn parse_args(args: &[String], default_city: &str) -> Result<Args, AppError> {
    let mut city = None;
    let mut date = None;
    let mut sort = None;

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if let Some(value) = arg.strip_prefix("--sort=") {
            sort = Some(parse_sort(value)?);
        } else if arg == "--sort" {
            let value = iter
                .next()
                .ok_or_else(|| AppError::Usage("--sort needs a key".to_string()))?;
            sort = Some(parse_sort(value)?);
        } else if let Ok(parsed) = NaiveDate::parse_from_str(arg, "%Y-%m-%d") {
            if date.replace(parsed).is_some() {
                return Err(AppError::Usage("more than one date given".to_string()));
            }
        } else if city.replace(arg.clone()).is_some() {
            return Err(AppError::Usage("more than one city given".to_string()));
        }
    }

    let date = match date {
        Some(date) => date,
        None => Local::now()
            .date_naive()
            .succ_opt()
            .ok_or_else(|| AppError::Usage("no date after today".to_string()))?,
    };

    Ok(Args {
        city: city.unwrap_or_else(|| default_city.to_string()),
        date,
        sort,
    })
}

fn load_catalog(config: &Config) -> Result<ResortCatalog, ConfigError> {
    match &config.search.catalog_path {
        Some(path) => ResortCatalog::load(path),
        None => Ok(ResortCatalog::builtin()),
    }
}

async fn run() -> Result<(), AppError> {
    let (config, _validation) =
        Config::load_validated().map_err(|e| ConfigError::Invalid(format!("{:#}", e)))?;
    let catalog = load_catalog(&config)?;

    let cli: Vec<String> = std::env::args().skip(1).collect();
    let args = parse_args(&cli, &config.search.default_city)?;

    tracing::info!(
        "skiday started: {} on {} ({} resorts in catalog)",
        args.city,
        args.date,
        catalog.len()
    );

    let timeout = Duration::from_secs(config.weather.timeout_secs);
    let geocoder = Geocoder::new(&config.geocoding, timeout)?;
    let origin = geocoder.geocode(&args.city).await?;

    let weather = WeatherService::new(&config.weather)?;
    let mut report = evaluate_from(
        &weather,
        origin,
        catalog.resorts(),
        args.date,
        &config.criteria,
        &config.season,
    )
    .await;

    if let Some((key, direction)) = args.sort {
        sort_results(&mut report.results, key, direction);
    }

    print!(
        "{}",
        report::render(&report, &args.city, config.criteria.max_distance_km)
    );
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    if let Err(e) = skiday_core::init() {
        eprintln!("skiday: {:#}", e);
        return ExitCode::FAILURE;
    }

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}", e);
            eprintln!("skiday: {}\n  {}", e.user_message(), e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_args_defaults() {
        let parsed = parse_args(&[], "Munich").unwrap();
        assert_eq!(parsed.city, "Munich");
        assert_eq!(Some(parsed.date), Local::now().date_naive().succ_opt());
        assert_eq!(parsed.sort, None);
    }

    #[test]
    fn test_parse_args_city_and_date() {
        let parsed = parse_args(&args(&["Innsbruck", "2027-02-03"]), "Munich").unwrap();
        assert_eq!(parsed.city, "Innsbruck");
        assert_eq!(parsed.date, NaiveDate::from_ymd_opt(2027, 2, 3).unwrap());

        let parsed = parse_args(&args(&["2027-02-03", "Salzburg"]), "Munich").unwrap();
        assert_eq!(parsed.city, "Salzburg");
    }

    #[test]
    fn test_parse_args_rejects_duplicates() {
        assert!(matches!(
            parse_args(&args(&["A", "B"]), "Munich"),
            Err(AppError::Usage(_))
        ));
        assert!(parse_args(&args(&["2027-01-01", "2027-01-02"]), "Munich").is_err());
    }

    #[test]
    fn test_parse_args_sort() {
        let parsed = parse_args(&args(&["Munich", "--sort", "fresh-snow"]), "X").unwrap();
        assert_eq!(parsed.city, "Munich");
        assert_eq!(
            parsed.sort,
            Some((SortKey::FreshSnow, SortDirection::Ascending))
        );

        let parsed = parse_args(&args(&["--sort=distance"]), "Munich").unwrap();
        assert_eq!(
            parsed.sort,
            Some((SortKey::Distance, SortDirection::Descending))
        );

        let parsed = parse_args(&args(&["--sort", "wind:desc"]), "Munich").unwrap();
        assert_eq!(
            parsed.sort,
            Some((SortKey::WindMax, SortDirection::Descending))
        );
    }

    #[test]
    fn test_parse_args_bad_sort() {
        assert!(matches!(
            parse_args(&args(&["--sort"]), "Munich"),
            Err(AppError::Usage(_))
        ));
        assert!(matches!(
            parse_args(&args(&["--sort", "altitude"]), "Munich"),
            Err(AppError::Usage(_))
        ));
        assert!(matches!(
            parse_args(&args(&["--sort", "name:sideways"]), "Munich"),
            Err(AppError::Usage(_))
        ));
    }
}
