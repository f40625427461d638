// ============================================================================
// Configuration du dashboard
// ============================================================================
// Liste ordonnée des tickers (symbole + couleur), annotation verticale,
// plage initiale du slider et politique en cas d'échec de chargement.
//
// Fichier JSON optionnel :
//   {
//     "tickers": { "ENVX": { "colour": "rgba(75,192,192,1)" }, ... },
//     "annotation": { "date": "2024-08-26", "label": "August", "colour": "red" },
//     "initial_range": [0, 100]
//   }
//
// L'ordre des clés de "tickers" est conservé (feature serde_json
// "preserve_order") : c'est l'ordre de chargement et d'affichage.
// ============================================================================

use std::path::Path;

use chrono::NaiveDate;
use serde::Deserialize;
use tracing::{debug, info};

use crate::error::{DashboardError, Result};
use crate::models::series::DATE_FORMAT;
use crate::models::{Rgb, VisibleRange};

/// Tickers par défaut (symbole, couleur CSS)
const DEFAULT_TICKERS: [(&str, &str); 4] = [
    ("ENVX", "rgba(75,192,192,1)"),
    ("NG", "rgba(192,75,75,1)"),
    ("GME", "rgba(75,192,75,1)"),
    ("INTC", "rgba(75,75,192,1)"),
];

/// Un ticker configuré
#[derive(Debug, Clone, PartialEq)]
pub struct TickerEntry {
    pub symbol: String,
    pub colour: Rgb,
}

impl TickerEntry {
    pub fn new(symbol: impl Into<String>, colour: Rgb) -> Self {
        Self {
            symbol: symbol.into(),
            colour,
        }
    }
}

/// Ligne verticale marquant une date remarquable
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    pub date: NaiveDate,
    pub label: String,
    pub colour: Rgb,
}

impl Default for Annotation {
    fn default() -> Self {
        Self {
            date: NaiveDate::from_ymd_opt(2024, 8, 26).unwrap_or(NaiveDate::MIN),
            label: "August".to_string(),
            colour: Rgb::new(255, 0, 0),
        }
    }
}

/// Que faire quand un ticker ne peut pas être chargé
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Le premier échec arrête tout le chargement : pas de graphique partiel
    #[default]
    Abort,
    /// Le ticker en échec est ignoré, les autres sont affichés
    Skip,
}

/// Configuration complète, figée au démarrage
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardConfig {
    pub tickers: Vec<TickerEntry>,
    pub annotation: Option<Annotation>,
    pub initial_range: VisibleRange,
    pub failure_policy: FailurePolicy,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            tickers: DEFAULT_TICKERS
                .iter()
                .filter_map(|(symbol, colour)| Rgb::parse(colour).ok().map(|c| TickerEntry::new(*symbol, c)))
                .collect(),
            annotation: Some(Annotation::default()),
            initial_range: VisibleRange::full(),
            failure_policy: FailurePolicy::Abort,
        }
    }
}

// ============================================================================
// Format du fichier
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    tickers: serde_json::Map<String, serde_json::Value>,
    #[serde(default = "default_annotation_field")]
    annotation: Option<AnnotationFile>,
    #[serde(default)]
    initial_range: Option<[i64; 2]>,
}

/// Annotation absente du fichier => annotation par défaut ; `null` => aucune
fn default_annotation_field() -> Option<AnnotationFile> {
    Some(AnnotationFile::default())
}

#[derive(Debug, Deserialize)]
struct TickerStyle {
    colour: String,
}

#[derive(Debug, Deserialize)]
struct AnnotationFile {
    date: String,
    #[serde(default)]
    label: String,
    #[serde(default = "default_annotation_colour")]
    colour: String,
}

impl Default for AnnotationFile {
    fn default() -> Self {
        Self {
            date: "2024-08-26".to_string(),
            label: "August".to_string(),
            colour: default_annotation_colour(),
        }
    }
}

fn default_annotation_colour() -> String {
    "red".to_string()
}

impl DashboardConfig {
    /// Parse une configuration JSON
    pub fn from_json_str(input: &str) -> Result<Self> {
        let file: ConfigFile =
            serde_json::from_str(input).map_err(|e| DashboardError::Config(e.to_string()))?;

        if file.tickers.is_empty() {
            return Err(DashboardError::EmptyConfig);
        }

        // CONCEPT RUST : collect() sur un itérateur de Result
        // - Iterator<Item = Result<T, E>> -> Result<Vec<T>, E>
        // - S'arrête à la première erreur
        let tickers = file
            .tickers
            .into_iter()
            .map(|(symbol, value)| -> Result<TickerEntry> {
                let style: TickerStyle = serde_json::from_value(value)
                    .map_err(|e| DashboardError::Config(format!("ticker {symbol}: {e}")))?;
                Ok(TickerEntry::new(symbol, Rgb::parse(&style.colour)?))
            })
            .collect::<Result<Vec<_>>>()?;

        let annotation = file
            .annotation
            .map(|a| -> Result<Annotation> {
                let date = NaiveDate::parse_from_str(&a.date, DATE_FORMAT)
                    .map_err(|_| DashboardError::Config(format!("annotation date {:?} is not YYYY-MM-DD", a.date)))?;
                Ok(Annotation {
                    date,
                    label: a.label,
                    colour: Rgb::parse(&a.colour)?,
                })
            })
            .transpose()?;

        let initial_range = match file.initial_range {
            Some([start, end]) => {
                if !(0..=100).contains(&start) || !(0..=100).contains(&end) {
                    return Err(DashboardError::InvalidRange { start, end });
                }
                VisibleRange::new(start as u8, end as u8)?
            }
            None => VisibleRange::full(),
        };

        debug!(tickers = tickers.len(), "Parsed dashboard configuration");
        Ok(Self {
            tickers,
            annotation,
            initial_range,
            failure_policy: FailurePolicy::Abort,
        })
    }

    /// Charge la configuration depuis un fichier
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| DashboardError::Config(format!("cannot read {}: {e}", path.display())))?;
        let config = Self::from_json_str(&content)?;
        info!(path = %path.display(), tickers = config.tickers.len(), "Loaded configuration file");
        Ok(config)
    }

    /// Vérifie qu'il y a au moins un ticker
    pub fn validate(&self) -> Result<()> {
        if self.tickers.is_empty() {
            return Err(DashboardError::EmptyConfig);
        }
        Ok(())
    }

    pub fn symbols(&self) -> impl Iterator<Item = &str> {
        self.tickers.iter().map(|t| t.symbol.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = DashboardConfig::default();
        let symbols: Vec<&str> = config.symbols().collect();
        assert_eq!(symbols, vec!["ENVX", "NG", "GME", "INTC"]);
        assert_eq!(config.tickers[1].colour, Rgb::new(192, 75, 75));
        assert_eq!(config.initial_range, VisibleRange::full());
        assert_eq!(config.failure_policy, FailurePolicy::Abort);

        let annotation = config.annotation.clone().unwrap();
        assert_eq!(annotation.date.to_string(), "2024-08-26");
        assert_eq!(annotation.label, "August");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_file_order_is_preserved() {
        let json = r##"{
            "tickers": {
                "ZZZ": {"colour": "red"},
                "AAA": {"colour": "#00ff00"},
                "MMM": {"colour": "rgb(0,0,255)"}
            },
            "initial_range": [42, 100]
        }"##;

        let config = DashboardConfig::from_json_str(json).unwrap();
        let symbols: Vec<&str> = config.symbols().collect();
        assert_eq!(symbols, vec!["ZZZ", "AAA", "MMM"]);
        assert_eq!(config.initial_range, VisibleRange::new(42, 100).unwrap());
        // Annotation absente => valeur par défaut
        assert_eq!(config.annotation, Some(Annotation::default()));
    }

    #[test]
    fn test_null_annotation_disables_it() {
        let json = r#"{"tickers": {"A": {"colour": "red"}}, "annotation": null}"#;
        let config = DashboardConfig::from_json_str(json).unwrap();
        assert_eq!(config.annotation, None);
    }

    #[test]
    fn test_custom_annotation() {
        let json = r#"{
            "tickers": {"A": {"colour": "red"}},
            "annotation": {"date": "2024-03-01", "label": "Split", "colour": "yellow"}
        }"#;
        let annotation = DashboardConfig::from_json_str(json).unwrap().annotation.unwrap();
        assert_eq!(annotation.label, "Split");
        assert_eq!(annotation.colour, Rgb::new(255, 255, 0));
    }

    #[test]
    fn test_rejects_invalid_files() {
        assert!(matches!(
            DashboardConfig::from_json_str(r#"{"tickers": {}}"#),
            Err(DashboardError::EmptyConfig)
        ));
        assert!(matches!(
            DashboardConfig::from_json_str(r#"{"tickers": {"A": {"colour": "nope"}}}"#),
            Err(DashboardError::InvalidColour(_))
        ));
        assert!(matches!(
            DashboardConfig::from_json_str(r#"{"tickers": {"A": {"colour": "red"}}, "initial_range": [80, 20]}"#),
            Err(DashboardError::InvalidRange { .. })
        ));
        assert!(matches!(
            DashboardConfig::from_json_str(r#"{"tickers": {"A": {}}}"#),
            Err(DashboardError::Config(_))
        ));
        assert!(matches!(
            DashboardConfig::from_json_str(r#"{"tickers": {"A": {"colour": "red"}}, "extra": 1}"#),
            Err(DashboardError::Config(_))
        ));
    }
}
