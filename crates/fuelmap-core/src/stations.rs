use std::collections::HashSet;
use std::path::Path;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::brands::{BrandClassifier, BrandTag};
use crate::ConfigError;

/// Price per litre of one fuel grade, in HUF.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FuelPrice {
    pub grade: String,
    pub price: Decimal,
}

/// Static station configuration read once at session start: the brand list
/// used for classification and filter chips, and the fuel price table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StationConfig {
    pub brands: Vec<BrandTag>,
    pub fuel_prices: Vec<FuelPrice>,
}

impl StationConfig {
    #[must_use]
    pub fn classifier(&self) -> BrandClassifier {
        BrandClassifier::new(&self.brands)
    }
}

impl Default for StationConfig {
    fn default() -> Self {
        let price = |grade: &str, huf: i64| FuelPrice {
            grade: grade.to_string(),
            price: Decimal::from(huf),
        };
        Self {
            brands: BrandTag::ALL.to_vec(),
            fuel_prices: vec![
                price("95", 593),
                price("Diesel", 597),
                price("Keverék", 645),
                price("LPG", 334),
                price("CNG", 810),
            ],
        }
    }
}

/// Load and validate the station configuration from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_station_config(path: &Path) -> Result<StationConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::StationsFileIo {
        path: path.display().to_string(),
        source: e,
    })?;
    parse_station_config(&content)
}

/// Parse and validate station configuration YAML.
///
/// # Errors
///
/// Returns [`ConfigError::StationsFileParse`] for malformed YAML and
/// [`ConfigError::Validation`] for semantically invalid content.
pub fn parse_station_config(content: &str) -> Result<StationConfig, ConfigError> {
    let config: StationConfig =
        serde_yaml::from_str(content).map_err(ConfigError::StationsFileParse)?;
    validate_station_config(&config)?;
    Ok(config)
}

fn validate_station_config(config: &StationConfig) -> Result<(), ConfigError> {
    if config.brands.is_empty() {
        return Err(ConfigError::Validation(
            "brand list must contain at least one brand".to_string(),
        ));
    }

    let mut seen_brands = HashSet::new();
    for brand in &config.brands {
        if !seen_brands.insert(*brand) {
            return Err(ConfigError::Validation(format!(
                "duplicate brand: '{brand}'"
            )));
        }
    }

    let mut seen_grades = HashSet::new();
    for fuel in &config.fuel_prices {
        if fuel.grade.trim().is_empty() {
            return Err(ConfigError::Validation(
                "fuel grade name must be non-empty".to_string(),
            ));
        }
        if fuel.price.is_sign_negative() {
            return Err(ConfigError::Validation(format!(
                "fuel grade '{}' has negative price {}",
                fuel.grade, fuel.price
            )));
        }
        if !seen_grades.insert(fuel.grade.to_lowercase()) {
            return Err(ConfigError::Validation(format!(
                "duplicate fuel grade: '{}'",
                fuel.grade
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = r#"
brands: [MOL, Shell, OMV, Oplus]
fuel_prices:
  - grade: "95"
    price: "593"
  - grade: Diesel
    price: "597.9"
"#;

    #[test]
    fn parses_valid_config() {
        let cfg = parse_station_config(VALID).unwrap();
        assert_eq!(cfg.brands, BrandTag::ALL.to_vec());
        assert_eq!(cfg.fuel_prices.len(), 2);
        assert_eq!(cfg.fuel_prices[1].grade, "Diesel");
        assert_eq!(cfg.fuel_prices[1].price, Decimal::new(5979, 1));
    }

    #[test]
    fn brand_order_drives_classifier() {
        let cfg = parse_station_config(
            "brands: [OMV, Shell]\nfuel_prices: []\n",
        )
        .unwrap();
        let classifier = cfg.classifier();
        assert_eq!(classifier.classify("Shell + OMV"), Some(BrandTag::Omv));
        assert_eq!(classifier.classify("MOL"), None);
    }

    #[test]
    fn rejects_unknown_brand() {
        let err = parse_station_config("brands: [MOL, Lukoil]\nfuel_prices: []\n").unwrap_err();
        assert!(matches!(err, ConfigError::StationsFileParse(_)), "{err:?}");
    }

    #[test]
    fn rejects_empty_brand_list() {
        let err = parse_station_config("brands: []\nfuel_prices: []\n").unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn rejects_duplicate_brand() {
        let err = parse_station_config("brands: [MOL, MOL]\nfuel_prices: []\n").unwrap_err();
        assert!(
            matches!(err, ConfigError::Validation(ref msg) if msg.contains("duplicate brand")),
            "{err:?}"
        );
    }

    #[test]
    fn rejects_negative_price() {
        let yaml = "brands: [MOL]\nfuel_prices:\n  - grade: LPG\n    price: \"-1\"\n";
        let err = parse_station_config(yaml).unwrap_err();
        assert!(
            matches!(err, ConfigError::Validation(ref msg) if msg.contains("negative")),
            "{err:?}"
        );
    }

    #[test]
    fn rejects_duplicate_grade_case_insensitively() {
        let yaml = "brands: [MOL]\nfuel_prices:\n  - grade: LPG\n    price: \"334\"\n  - grade: lpg\n    price: \"335\"\n";
        let err = parse_station_config(yaml).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn default_matches_published_prices() {
        let cfg = StationConfig::default();
        assert_eq!(cfg.brands.len(), 4);
        let cng = cfg.fuel_prices.iter().find(|p| p.grade == "CNG").unwrap();
        assert_eq!(cng.price, Decimal::from(810));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_station_config(Path::new("/nonexistent/stations.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::StationsFileIo { .. }));
    }
}
