// ============================================================================
// Séries de prix de clôture
// ============================================================================
// Du document JSON brut d'un ticker jusqu'au jeu de données du graphique
//
// Document source (un par ticker, le plus récent en premier) :
//   {
//     "2024-01-02": { "1. open": "...", "4. close": "12.0", ... },
//     "2024-01-01": { "4. close": "10.0" }
//   }
//
// Pipeline :
//   RawSeries (date -> prix)  ──┐
//   DateAxis (dates croissantes) ─┴─> ChartDataset (valeurs alignées sur l'axe)
//
// CONCEPTS RUST :
// 1. BTreeMap : map triée par clé, les dates sortent dans l'ordre croissant
// 2. Serde untagged : accepter "12.0" (chaîne) ou 12.0 (nombre)
// 3. Option<f64> : un trou dans la série plutôt qu'un panic
// ============================================================================

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Deserialize;

use crate::error::{DashboardError, Result};
use crate::models::colour::Rgb;

/// Format des clés de date dans les documents source
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Tension de courbe appliquée à toutes les séries
pub const DEFAULT_TENSION: f64 = 0.1;

// ============================================================================
// Structures pour parser le document JSON
// ============================================================================

/// Une journée du document source : seul le prix de clôture nous intéresse
#[derive(Debug, Deserialize)]
struct DailyRecord {
    #[serde(rename = "4. close")]
    close: PriceField,
}

/// Le prix arrive en chaîne décimale, mais un nombre JSON est aussi accepté
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PriceField {
    Text(String),
    Number(f64),
}

// ============================================================================
// RawSeries
// ============================================================================

/// Série brute d'un ticker : date -> prix de clôture
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawSeries {
    points: BTreeMap<NaiveDate, f64>,
}

impl RawSeries {
    /// Parse un document JSON `<SYMBOL>.json`
    ///
    /// # Erreurs
    /// * `Parse` - JSON invalide ou champ "4. close" manquant
    /// * `InvalidDate` - clé qui n'est pas une date YYYY-MM-DD
    /// * `InvalidPrice` - prix non numérique
    pub fn from_json_slice(symbol: &str, bytes: &[u8]) -> Result<Self> {
        let records: serde_json::Map<String, serde_json::Value> = serde_json::from_slice(bytes)
            .map_err(|source| DashboardError::Parse {
                symbol: symbol.to_string(),
                source,
            })?;

        let mut points = BTreeMap::new();
        for (key, value) in records {
            let date = NaiveDate::parse_from_str(&key, DATE_FORMAT).map_err(|_| {
                DashboardError::InvalidDate {
                    symbol: symbol.to_string(),
                    key: key.clone(),
                }
            })?;

            let record: DailyRecord =
                serde_json::from_value(value).map_err(|source| DashboardError::Parse {
                    symbol: symbol.to_string(),
                    source,
                })?;

            let close = match record.close {
                PriceField::Number(n) => n,
                PriceField::Text(text) => {
                    text.trim()
                        .parse::<f64>()
                        .map_err(|_| DashboardError::InvalidPrice {
                            symbol: symbol.to_string(),
                            date: key.clone(),
                            value: text.clone(),
                        })?
                }
            };

            points.insert(date, close);
        }

        Ok(Self { points })
    }

    /// Construit une série depuis des paires (date, prix), pratique pour les tests
    pub fn from_points(points: impl IntoIterator<Item = (NaiveDate, f64)>) -> Self {
        Self {
            points: points.into_iter().collect(),
        }
    }

    /// Prix de clôture à une date donnée
    pub fn close_on(&self, date: &NaiveDate) -> Option<f64> {
        self.points.get(date).copied()
    }

    pub fn dates(&self) -> impl Iterator<Item = &NaiveDate> {
        self.points.keys()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

// ============================================================================
// DateAxis
// ============================================================================

/// Axe des dates partagé par toutes les séries, ordre chronologique croissant
///
/// CONCEPT : Newtype pattern
/// - Vec<NaiveDate> enveloppé dans un type dédié
/// - Garantit l'invariant "trié croissant" à la construction
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DateAxis(Vec<NaiveDate>);

impl DateAxis {
    /// Dérive l'axe depuis les dates d'une série brute
    ///
    /// Les documents source sont du plus récent au plus ancien ; le BTreeMap
    /// les restitue déjà en ordre croissant, ce qui revient à les inverser.
    pub fn from_series(series: &RawSeries) -> Self {
        Self(series.dates().copied().collect())
    }

    /// Construit un axe depuis des dates quelconques (triées et dédupliquées)
    pub fn from_dates(dates: impl IntoIterator<Item = NaiveDate>) -> Self {
        let mut dates: Vec<NaiveDate> = dates.into_iter().collect();
        dates.sort_unstable();
        dates.dedup();
        Self(dates)
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

// ============================================================================
// ChartDataset
// ============================================================================

/// Une série prête à être tracée : valeurs alignées par position sur l'axe
#[derive(Debug, Clone, PartialEq)]
pub struct ChartDataset {
    /// Symbole du ticker (ex: "GME")
    pub symbol: String,

    /// Libellé affiché dans la légende : "<ticker> Closing Price"
    pub label: String,

    /// Une valeur par date de l'axe, None si le ticker n'a pas cette date
    pub values: Vec<Option<f64>>,

    /// Couleur de la ligne
    pub colour: Rgb,

    /// Remplissage sous la courbe (toujours désactivé)
    pub fill: bool,

    /// Tension de la courbe
    pub tension: f64,
}

impl ChartDataset {
    /// Réindexe une série brute sur l'axe partagé
    ///
    /// CONCEPT : Alignement explicite
    /// - L'axe est passé en paramètre, chaque date est cherchée dans la série
    /// - Une date absente devient un trou (None) au lieu d'une erreur
    pub fn aligned(symbol: &str, colour: Rgb, raw: &RawSeries, axis: &DateAxis) -> Self {
        Self {
            symbol: symbol.to_string(),
            label: dataset_label(symbol),
            values: axis.dates().iter().map(|date| raw.close_on(date)).collect(),
            colour,
            fill: false,
            tension: DEFAULT_TENSION,
        }
    }

    /// Nombre de dates de l'axe sans valeur pour ce ticker
    pub fn gap_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_none()).count()
    }

    /// Copie du dataset limitée aux positions [start, end)
    pub fn sliced(&self, start: usize, end: usize) -> Self {
        Self {
            values: self.values[start..end].to_vec(),
            ..self.clone()
        }
    }

    /// Min et max des valeurs présentes
    pub fn bounds(&self) -> Option<(f64, f64)> {
        self.values.iter().flatten().fold(None, |acc, &v| match acc {
            None => Some((v, v)),
            Some((min, max)) => Some((min.min(v), max.max(v))),
        })
    }
}

/// Libellé d'une série dans la légende
pub fn dataset_label(symbol: &str) -> String {
    format!("{} Closing Price", symbol)
}

// ============================================================================
// FullDataset
// ============================================================================

/// Jeu de données complet (non filtré) : l'état de référence après chargement
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FullDataset {
    pub axis: DateAxis,
    pub datasets: Vec<ChartDataset>,
}

impl FullDataset {
    pub fn new(axis: DateAxis, datasets: Vec<ChartDataset>) -> Self {
        Self { axis, datasets }
    }

    pub fn is_empty(&self) -> bool {
        self.axis.is_empty()
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, DATE_FORMAT).unwrap()
    }

    #[test]
    fn test_parse_newest_first_document() {
        let json = br#"{
            "2024-01-03": {"1. open": "11.0", "4. close": "13.5"},
            "2024-01-02": {"4. close": "12.0"},
            "2024-01-01": {"4. close": "10.0"}
        }"#;

        let raw = RawSeries::from_json_slice("A", json).unwrap();
        assert_eq!(raw.len(), 3);
        assert_eq!(raw.close_on(&date("2024-01-02")), Some(12.0));

        // L'axe est chronologique croissant
        let axis = DateAxis::from_series(&raw);
        assert_eq!(
            axis.dates(),
            &[date("2024-01-01"), date("2024-01-02"), date("2024-01-03")]
        );
    }

    #[test]
    fn test_parse_accepts_numeric_close() {
        let raw = RawSeries::from_json_slice("A", br#"{"2024-01-01": {"4. close": 7.25}}"#).unwrap();
        assert_eq!(raw.close_on(&date("2024-01-01")), Some(7.25));
    }

    #[test]
    fn test_parse_missing_close_is_parse_error() {
        let err = RawSeries::from_json_slice("A", br#"{"2024-01-01": {"1. open": "1"}}"#).unwrap_err();
        assert!(matches!(err, DashboardError::Parse { ref symbol, .. } if symbol == "A"));
    }

    #[test]
    fn test_parse_malformed_json_is_parse_error() {
        let err = RawSeries::from_json_slice("A", b"not json").unwrap_err();
        assert!(matches!(err, DashboardError::Parse { .. }));
    }

    #[test]
    fn test_parse_invalid_date_and_price() {
        let err = RawSeries::from_json_slice("A", br#"{"01/02/2024": {"4. close": "1"}}"#).unwrap_err();
        assert!(matches!(err, DashboardError::InvalidDate { ref key, .. } if key == "01/02/2024"));

        let err = RawSeries::from_json_slice("A", br#"{"2024-01-01": {"4. close": "n/a"}}"#).unwrap_err();
        assert!(matches!(err, DashboardError::InvalidPrice { ref value, .. } if value == "n/a"));
    }

    #[test]
    fn test_aligned_dataset_marks_gaps() {
        let axis = DateAxis::from_dates([date("2024-01-01"), date("2024-01-02"), date("2024-01-03")]);
        let raw = RawSeries::from_points([(date("2024-01-01"), 5.0), (date("2024-01-03"), 5.5)]);

        let dataset = ChartDataset::aligned("NG", Rgb::new(192, 75, 75), &raw, &axis);
        assert_eq!(dataset.label, "NG Closing Price");
        assert_eq!(dataset.values, vec![Some(5.0), None, Some(5.5)]);
        assert_eq!(dataset.gap_count(), 1);
        assert!(!dataset.fill);
        assert_eq!(dataset.tension, 0.1);
        assert_eq!(dataset.bounds(), Some((5.0, 5.5)));
    }

    #[test]
    fn test_axis_from_dates_sorts_and_dedups() {
        let axis = DateAxis::from_dates([date("2024-01-02"), date("2024-01-01"), date("2024-01-02")]);
        assert_eq!(axis.dates(), &[date("2024-01-01"), date("2024-01-02")]);
    }
}
