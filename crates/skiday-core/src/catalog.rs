//! Static resort catalog.
//!
//! The built-in list covers the Bavarian and Tyrolean resorts reachable from
//! Munich. A TOML file with `[[resort]]` tables can replace it.

use std::path::Path;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::types::Resort;

/// Read-only list of resorts, in catalog order.
#[derive(Debug, Clone)]
pub struct ResortCatalog {
    resorts: Vec<Resort>,
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    resort: Vec<Resort>,
}

impl ResortCatalog {
    /// Build a catalog, rejecting resorts whose top station is below the bottom one.
    pub fn new(resorts: Vec<Resort>) -> Result<Self, ConfigError> {
        if let Some(bad) = resorts
            .iter()
            .find(|r| r.elevation_top < r.elevation_bottom)
        {
            return Err(ConfigError::Invalid(format!(
                "resort {}: elevation_top ({}) is below elevation_bottom ({})",
                bad.id, bad.elevation_top, bad.elevation_bottom
            )));
        }
        Ok(Self { resorts })
    }

    pub fn builtin() -> Self {
        Self {
            resorts: builtin_resorts(),
        }
    }

    /// Load a catalog from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::NotFound(format!("{}: {}", path.display(), e)))?;
        let file: CatalogFile = toml::from_str(&contents)
            .map_err(|e| ConfigError::ParseError(format!("{}: {}", path.display(), e)))?;
        let catalog = Self::new(file.resort)?;
        tracing::info!(
            "Loaded {} resorts from {}",
            catalog.len(),
            path.display()
        );
        Ok(catalog)
    }

    pub fn resorts(&self) -> &[Resort] {
        &self.resorts
    }

    pub fn get(&self, id: &str) -> Option<&Resort> {
        self.resorts.iter().find(|r| r.id == id)
    }

    pub fn len(&self) -> usize {
        self.resorts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resorts.is_empty()
    }
}

impl Default for ResortCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

fn resort(id: &str, name: &str, lat: f64, lon: f64, top: f64, bottom: f64, slug: &str) -> Resort {
    Resort {
        id: id.to_string(),
        name: name.to_string(),
        lat,
        lon,
        elevation_top: top,
        elevation_bottom: bottom,
        snow_forecast_slug: Some(slug.to_string()),
        snow_forecast_record: None,
    }
}

fn builtin_resorts() -> Vec<Resort> {
    vec![
        resort("spitzingsee", "Spitzingsee", 47.67, 11.88, 1600.0, 1100.0, "Spitzingsee"),
        resort("sudelfeld", "Sudelfeld / Bayrischzell", 47.67, 12.0, 1610.0, 780.0, "Bayrischzell"),
        resort("lenggries", "Lenggries / Brauneck", 47.68, 11.55, 1555.0, 700.0, "Lenggries"),
        resort(
            "garmisch",
            "Garmisch-Partenkirchen / Zugspitze",
            47.42,
            10.98,
            2962.0,
            700.0,
            "Garmisch-Partenkirchen",
        ),
        resort("oberammergau", "Oberammergau", 47.6, 11.07, 2050.0, 830.0, "Oberammergau"),
        resort("mittenwald", "Mittenwald / Karwendel", 47.45, 11.28, 2244.0, 920.0, "Mittenwald"),
        resort(
            "wendelstein",
            "Wendelstein",
            47.7,
            12.01,
            1838.0,
            780.0,
            "Bayrischzell-Brannenburg-Wendelstein",
        ),
        resort("tegernsee", "Tegernsee / Wallberg", 47.7, 11.73, 1722.0, 700.0, "Tegernsee"),
        resort("kitzbuehel", "Kitzbühel (AT)", 47.45, 12.39, 2000.0, 800.0, "Kitzbuhel"),
        resort("zell-am-see", "Zell am See / Kaprun (AT)", 47.32, 12.8, 3029.0, 750.0, "Zell-am-See"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_builtin_catalog_is_consistent() {
        let catalog = ResortCatalog::builtin();
        assert!(!catalog.is_empty());
        for r in catalog.resorts() {
            assert!(r.elevation_top >= r.elevation_bottom, "{}", r.id);
        }
        assert!(catalog.get("garmisch").is_some());
        assert!(catalog.get("nowhere").is_none());
    }

    #[test]
    fn test_rejects_inverted_elevations() {
        let mut r = ResortCatalog::builtin().resorts()[0].clone();
        r.elevation_bottom = r.elevation_top + 1.0;
        let err = ResortCatalog::new(vec![r]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_load_from_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[[resort]]
id = "stubai"
name = "Stubaier Gletscher"
lat = 46.99
lon = 11.12
elevation_top = 3210.0
elevation_bottom = 1750.0
snow_forecast_record = 4711
"#
        )
        .unwrap();

        let catalog = ResortCatalog::load(file.path()).unwrap();
        assert_eq!(catalog.len(), 1);
        let stubai = catalog.get("stubai").unwrap();
        assert_eq!(stubai.snow_forecast_record, Some(4711));
        assert_eq!(stubai.snow_forecast_slug, None);
    }

    #[test]
    fn test_load_missing_file() {
        let err = ResortCatalog::load(Path::new("/nonexistent/resorts.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }
}
