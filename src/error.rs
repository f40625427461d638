// ============================================================================
// Erreurs de la bibliothèque
// ============================================================================
// Une seule enum pour toutes les erreurs du chargement et de la configuration
//
// CONCEPT RUST : thiserror
// - #[derive(Error)] génère l'implémentation de std::error::Error
// - #[error("...")] génère Display avec interpolation des champs
// - #[source] chaîne l'erreur sous-jacente (reqwest, io, serde_json)
// ============================================================================

use thiserror::Error;

/// Erreurs pouvant survenir pendant le chargement des séries ou la configuration
#[derive(Debug, Error)]
pub enum DashboardError {
    /// La ressource a répondu avec un statut HTTP non-succès
    #[error("fetching {symbol}.json failed: HTTP {status}")]
    Fetch { symbol: String, status: u16 },

    /// Erreur réseau (connexion, timeout, lecture du corps)
    #[error("request for {symbol}.json failed")]
    Transport {
        symbol: String,
        #[source]
        source: reqwest::Error,
    },

    /// Erreur de lecture d'un fichier local
    #[error("reading {symbol}.json failed")]
    Io {
        symbol: String,
        #[source]
        source: std::io::Error,
    },

    /// JSON invalide ou champ "4. close" absent
    #[error("{symbol}.json is not a valid time series")]
    Parse {
        symbol: String,
        #[source]
        source: serde_json::Error,
    },

    /// Clé de date qui n'est pas au format YYYY-MM-DD
    #[error("{symbol}.json has an invalid date key {key:?}")]
    InvalidDate { symbol: String, key: String },

    /// Prix de clôture qui n'est pas un nombre
    #[error("{symbol}.json has an invalid closing price {value:?} on {date}")]
    InvalidPrice {
        symbol: String,
        date: String,
        value: String,
    },

    /// Aucun ticker n'a pu être chargé
    #[error("no ticker could be loaded")]
    NoSeries,

    /// La configuration ne contient aucun ticker
    #[error("ticker configuration is empty")]
    EmptyConfig,

    /// Couleur CSS non reconnue
    #[error("unsupported colour {0:?}")]
    InvalidColour(String),

    /// Plage de pourcentages invalide
    #[error("invalid range {start}:{end} (expected 0 <= start <= end <= 100)")]
    InvalidRange { start: i64, end: i64 },

    /// Fichier de configuration mal formé
    #[error("invalid configuration: {0}")]
    Config(String),
}

/// Alias pratique pour les résultats de la bibliothèque
pub type Result<T> = std::result::Result<T, DashboardError>;
