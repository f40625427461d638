// ============================================================================
// Module : api
// ============================================================================
// Récupération des séries de prix : sources (HTTP, répertoire local) et
// pipeline de chargement séquentiel.
// ============================================================================

pub mod loader; // Pipeline fetch_all -> assemble, tâche annulable
pub mod source; // Trait SeriesSource et ses implémentations

// Re-export des éléments principaux
pub use loader::{assemble, fetch_all, load_dataset, LoadOutcome, LoadTask, TickerSeries};
pub use source::{source_from_location, DirSource, HttpSource, SeriesSource};
