// ============================================================================
// Module : models
// ============================================================================
// Structures de données de l'application : couleurs, séries de prix,
// axe des dates, plage visible et vue filtrée.
//
// Aucune dépendance vers l'UI ou le réseau : tout ici est testable
// avec des données en mémoire.
// ============================================================================

pub mod colour; // Couleurs CSS -> RGB
pub mod range;  // Plage visible et vue filtrée
pub mod series; // Séries brutes, axe des dates, datasets

// Re-export des structures principales pour simplifier les imports
pub use colour::Rgb;
pub use range::{FilteredView, Handle, VisibleRange};
pub use series::{ChartDataset, DateAxis, FullDataset, RawSeries};
