// ============================================================================
// Stockdash - Library
// ============================================================================
// Expose les modules publics pour le binaire et les tests
// ============================================================================

pub mod api;    // Sources de séries et chargement
pub mod app;    // État de l'application
pub mod config; // Configuration (tickers, annotation, plage initiale)
pub mod error;  // Erreurs typées
pub mod models; // Structures de données
pub mod ui;     // Interface utilisateur

pub use error::{DashboardError, Result};
