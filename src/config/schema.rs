use serde::{Deserialize, Serialize};

use crate::validation::YearWindow;

/// Engine configuration.
///
/// Example YAML:
/// ```yaml
/// olevel_framework: OLEVEL_NUMERIC
/// alevel_framework: ALEVEL_COMPETENCY_60
/// years: { first: 2005, last: 2029 }
/// ```
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Framework used when an O-Level entry doesn't name one
    #[serde(default)]
    pub olevel_framework: Option<String>,

    /// Framework used when an A-Level entry doesn't name one
    #[serde(default)]
    pub alevel_framework: Option<String>,

    /// Year window offered by the year pickers; years outside it are flagged
    #[serde(default)]
    pub years: Option<YearWindow>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_config_parse() {
        let yaml = r#"
olevel_framework: OLEVEL_NUMERIC
alevel_framework: classic-18
years:
  first: 2005
  last: 2029
"#;
        let config: Config = serde_saphyr::from_str(yaml).unwrap();
        assert_eq!(config.olevel_framework.as_deref(), Some("OLEVEL_NUMERIC"));
        assert_eq!(config.alevel_framework.as_deref(), Some("classic-18"));
        assert_eq!(config.years, Some(YearWindow { first: 2005, last: 2029 }));
    }

    #[test]
    fn test_empty_config_parse() {
        let config: Config = serde_saphyr::from_str("{}").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_unknown_field_rejected() {
        let result: Result<Config, _> = serde_saphyr::from_str("scoring: {}\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_config_serde_roundtrip() {
        let config = Config {
            olevel_framework: Some("OLEVEL_NUMERIC".to_string()),
            alevel_framework: None,
            years: Some(YearWindow { first: 2010, last: 2020 }),
        };
        let yaml = serde_saphyr::to_string(&config).unwrap();
        let parsed: Config = serde_saphyr::from_str(&yaml).unwrap();
        assert_eq!(config, parsed);
    }
}
