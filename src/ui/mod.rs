// ============================================================================
// Module : ui
// ============================================================================
// Gère toute l'interface utilisateur (Terminal User Interface)
// ============================================================================

pub mod chart;     // Graphique multi-séries + annotation
pub mod dashboard; // Layout de la page
pub mod events;    // Gestion des événements clavier
pub mod slider;    // Slider à deux poignées

// Re-exports pour simplifier les imports
pub use dashboard::render;
pub use events::{Event, EventHandler};
