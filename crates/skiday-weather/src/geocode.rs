//! Forward geocoding: convert a place name to coordinates.
//! Uses Nominatim (OpenStreetMap) - free, no API key required.

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use skiday_core::error::{retry_after_secs, StatusErrorExt};
use skiday_core::{Coordinate, GeocodingConfig, WeatherError};
use tracing::instrument;

pub const PROVIDER_NAME: &str = "nominatim";

/// Nominatim returns coordinates as strings
#[derive(Debug, Deserialize)]
struct NominatimPlace {
    lat: String,
    lon: String,
    #[allow(dead_code)]
    display_name: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Geocoder {
    client: Client,
    url: String,
}

impl Geocoder {
    /// `timeout` bounds each request, like the weather clients.
    pub fn new(config: &GeocodingConfig, timeout: Duration) -> Result<Self, WeatherError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self {
            client,
            url: config.url.clone(),
        })
    }

    /// Look up the best match for `place`.
    #[instrument(skip(self), level = "info")]
    pub async fn geocode(&self, place: &str) -> Result<Coordinate, WeatherError> {
        let place = place.trim();
        if place.is_empty() {
            return Err(WeatherError::LocationNotFound(String::new()));
        }

        let response = self
            .client
            .get(&self.url)
            .header("Accept", "application/json")
            .query(&[("q", place), ("format", "json"), ("limit", "1")])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                return Err(WeatherError::RateLimited {
                    provider: PROVIDER_NAME,
                    retry_after_secs: retry_after_secs(response.headers()),
                });
            }
            let body = response.text().await.unwrap_or_default();
            return Err(status.into_weather_error(PROVIDER_NAME, body));
        }

        let places: Vec<NominatimPlace> = response
            .json()
            .await
            .map_err(|e| WeatherError::invalid_response(PROVIDER_NAME, e.to_string()))?;

        let first = places
            .into_iter()
            .next()
            .ok_or_else(|| WeatherError::LocationNotFound(place.to_string()))?;

        let parse = |raw: &str| {
            raw.trim()
                .parse::<f64>()
                .map_err(|_| WeatherError::invalid_response(PROVIDER_NAME, format!("bad coordinate {:?}", raw)))
        };
        let coordinate = Coordinate::new(parse(&first.lat)?, parse(&first.lon)?);

        tracing::info!(
            "Geocoded {} to {:.4}, {:.4}",
            place,
            coordinate.lat,
            coordinate.lon
        );
        Ok(coordinate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn geocoder_with_timeout(uri: &str, timeout: Duration) -> Geocoder {
        Geocoder::new(
            &GeocodingConfig {
                url: format!("{}/search", uri),
                user_agent: "SkiDayTest/1.0".to_string(),
            },
            timeout,
        )
        .unwrap()
    }

    fn geocoder(uri: &str) -> Geocoder {
        geocoder_with_timeout(uri, Duration::from_secs(10))
    }

    #[tokio::test]
    async fn test_geocode_munich() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/search"))
            .and(query_param("q", "Munich"))
            .and(query_param("limit", "1"))
            .and(header("User-Agent", "SkiDayTest/1.0"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"lat": "48.1371079", "lon": "11.5753822", "display_name": "München, Bayern, Deutschland"}
            ])))
            .mount(&mock_server)
            .await;

        let coordinate = geocoder(&mock_server.uri()).geocode("Munich").await.unwrap();
        assert!((coordinate.lat - 48.1371079).abs() < 1e-9);
        assert!((coordinate.lon - 11.5753822).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_geocode_not_found() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .mount(&mock_server)
            .await;

        let result = geocoder(&mock_server.uri()).geocode("Atlantis").await;
        assert!(matches!(result, Err(WeatherError::LocationNotFound(name)) if name == "Atlantis"));
    }

    #[tokio::test]
    async fn test_geocode_rate_limited() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(429).append_header("Retry-After", "5"))
            .mount(&mock_server)
            .await;

        let result = geocoder(&mock_server.uri()).geocode("Munich").await;
        assert!(matches!(
            result,
            Err(WeatherError::RateLimited {
                provider: PROVIDER_NAME,
                retry_after_secs: 5
            })
        ));
    }

    #[tokio::test]
    async fn test_geocode_bad_coordinates() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"lat": "north", "lon": "11.5"}
            ])))
            .mount(&mock_server)
            .await;

        let result = geocoder(&mock_server.uri()).geocode("Munich").await;
        assert!(matches!(result, Err(WeatherError::InvalidResponse { .. })));
    }

    #[tokio::test]
    async fn test_geocode_empty_name_skips_request() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&mock_server)
            .await;

        let result = geocoder(&mock_server.uri()).geocode("   ").await;
        assert!(matches!(result, Err(WeatherError::LocationNotFound(_))));
    }

    #[tokio::test]
    async fn test_geocode_honors_timeout() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!([{"lat": "48.1", "lon": "11.5"}]))
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&mock_server)
            .await;

        let result = geocoder_with_timeout(&mock_server.uri(), Duration::from_millis(200))
            .geocode("Munich")
            .await;
        assert!(matches!(result, Err(WeatherError::Network(_))));
    }
}
