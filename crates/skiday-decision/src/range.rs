//! Great-circle distance and the resort range filter.

use skiday_core::{Coordinate, Resort};

/// Mean Earth radius used by the haversine formula
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Haversine distance between two WGS84 points, in km.
pub fn haversine_km(a: Coordinate, b: Coordinate) -> f64 {
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lon = (b.lon - a.lon).to_radians();
    let h = (d_lat / 2.0).sin().powi(2)
        + a.lat.to_radians().cos() * b.lat.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    EARTH_RADIUS_KM * c
}

/// A catalog resort annotated with its distance from the origin.
#[derive(Debug, Clone, PartialEq)]
pub struct ResortInRange {
    pub resort: Resort,
    pub distance_km: f64,
}

/// Resorts within `radius_km` of `origin`, nearest first. Equal distances
/// keep catalog order.
pub fn resorts_in_range(origin: Coordinate, radius_km: f64, catalog: &[Resort]) -> Vec<ResortInRange> {
    let mut found: Vec<ResortInRange> = catalog
        .iter()
        .filter_map(|resort| {
            let distance_km = haversine_km(origin, resort.coordinate());
            (distance_km <= radius_km).then(|| ResortInRange {
                resort: resort.clone(),
                distance_km,
            })
        })
        .collect();

    // stable sort
    found.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));

    tracing::debug!(
        "{} of {} resorts within {} km",
        found.len(),
        catalog.len(),
        radius_km
    );
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use skiday_core::ResortCatalog;

    const MUNICH: Coordinate = Coordinate {
        lat: 48.1371,
        lon: 11.5754,
    };

    fn resort_at(id: &str, lat: f64, lon: f64) -> Resort {
        Resort {
            id: id.to_string(),
            name: id.to_string(),
            lat,
            lon,
            elevation_top: 2000.0,
            elevation_bottom: 1000.0,
            snow_forecast_slug: None,
            snow_forecast_record: None,
        }
    }

    #[test]
    fn test_haversine_symmetric() {
        let innsbruck = Coordinate::new(47.2692, 11.4041);
        let ab = haversine_km(MUNICH, innsbruck);
        let ba = haversine_km(innsbruck, MUNICH);
        assert!((ab - ba).abs() < 1e-9);
        // roughly 97 km as the crow flies
        assert!((ab - 97.0).abs() < 2.0, "got {}", ab);
    }

    #[test]
    fn test_haversine_zero_iff_same_point() {
        assert_eq!(haversine_km(MUNICH, MUNICH), 0.0);
        assert!(haversine_km(MUNICH, Coordinate::new(48.1372, 11.5754)) > 0.0);
    }

    #[test]
    fn test_haversine_quarter_meridian() {
        let d = haversine_km(Coordinate::new(0.0, 0.0), Coordinate::new(90.0, 0.0));
        let expected = EARTH_RADIUS_KM * std::f64::consts::FRAC_PI_2;
        assert!((d - expected).abs() < 1e-6);
    }

    #[test]
    fn test_in_range_sorted_nearest_first() {
        let catalog = ResortCatalog::builtin();
        let found = resorts_in_range(MUNICH, 150.0, catalog.resorts());

        assert!(!found.is_empty());
        assert!(found.windows(2).all(|w| w[0].distance_km <= w[1].distance_km));
        assert!(found.iter().all(|r| r.distance_km <= 150.0));
        assert_eq!(found[0].resort.id, "tegernsee");
    }

    #[test]
    fn test_radius_excludes_far_resorts() {
        let catalog = ResortCatalog::builtin();
        assert!(resorts_in_range(MUNICH, 10.0, catalog.resorts()).is_empty());
        assert!(resorts_in_range(Coordinate::new(52.52, 13.405), 150.0, catalog.resorts()).is_empty());
    }

    #[test]
    fn test_ties_keep_catalog_order() {
        let catalog = vec![
            resort_at("b", 47.5, 11.5),
            resort_at("a", 47.5, 11.5),
            resort_at("near", 48.0, 11.5754),
        ];
        let found = resorts_in_range(MUNICH, 500.0, &catalog);
        let ids: Vec<&str> = found.iter().map(|r| r.resort.id.as_str()).collect();
        assert_eq!(ids, vec!["near", "b", "a"]);
    }

    #[test]
    fn test_radius_is_inclusive() {
        let catalog = vec![resort_at("x", 47.5, 11.5)];
        let d = haversine_km(MUNICH, catalog[0].coordinate());
        assert_eq!(resorts_in_range(MUNICH, d, &catalog).len(), 1);
    }
}
