// ============================================================================
// Structure : App
// ============================================================================
// Gère l'état global du dashboard
//
// CONCEPTS RUST :
// 1. State Management : centraliser l'état dans une seule structure
// 2. Mutabilité contrôlée : &mut self pour modifier l'état
// 3. État dérivé : la vue filtrée est recalculée, jamais modifiée en place
//
// PATTERN : "Application State"
// - L'UI lit depuis App
// - Toutes les modifications passent par les méthodes de App
// - Seule la boucle d'événements possède App : un seul écrivain
// ============================================================================

use crate::config::{Annotation, DashboardConfig};
use crate::error::DashboardError;
use crate::models::{FilteredView, FullDataset, Handle, VisibleRange};

/// Pas du slider pour un déplacement fin
pub const FINE_STEP: i16 = 1;

/// Pas du slider pour un déplacement rapide (Shift)
pub const COARSE_STEP: i16 = 10;

// ============================================================================
// Enum : LoadState
// ============================================================================
// CONCEPT RUST : Enums pour state machines
// - Loading -> Ready : chargement réussi
// - Loading -> Failed : chargement interrompu, le graphique n'apparaît jamais
// ============================================================================

/// État du chargement des données
#[derive(Debug, Clone, PartialEq)]
pub enum LoadState {
    /// Requêtes en cours
    Loading,

    /// Toutes les séries sont chargées
    Ready,

    /// Le chargement a échoué (l'erreur est seulement loggée)
    Failed { reason: String },
}

/// État principal de l'application
pub struct App {
    /// Indique si l'application doit continuer à tourner
    pub running: bool,

    /// Two-step quit : première pression de 'q' => true
    pub confirm_quit: bool,

    /// Où en est le chargement
    pub load_state: LoadState,

    /// Jeu de données complet (None tant que rien n'est chargé)
    full: Option<FullDataset>,

    /// Fenêtre visible choisie au slider
    range: VisibleRange,

    /// Plage de départ, restaurée par reset_range()
    initial_range: VisibleRange,

    /// Poignée du slider déplacée par les flèches
    pub active_handle: Handle,

    /// Vue filtrée courante : dérivée de (full, range)
    view: FilteredView,

    /// Ligne verticale optionnelle
    pub annotation: Option<Annotation>,

    /// Symboles configurés (pour l'affichage pendant le chargement)
    pub symbols: Vec<String>,
}

impl App {
    /// Crée une App en état de chargement
    pub fn new(config: &DashboardConfig) -> Self {
        Self {
            running: true,
            confirm_quit: false,
            load_state: LoadState::Loading,
            full: None,
            range: config.initial_range,
            initial_range: config.initial_range,
            active_handle: Handle::Start,
            view: FilteredView::empty(),
            annotation: config.annotation.clone(),
            symbols: config.symbols().map(str::to_string).collect(),
        }
    }

    /// Quitte l'application
    pub fn quit(&mut self) {
        self.running = false;
    }

    /// Vérifie si l'application doit continuer
    pub fn is_running(&self) -> bool {
        self.running
    }

    // ========================================================================
    // Chargement
    // ========================================================================

    /// Installe le jeu de données chargé : Loading -> Ready
    pub fn apply_dataset(&mut self, full: FullDataset) {
        self.full = Some(full);
        self.load_state = LoadState::Ready;
        self.refresh_view();
    }

    /// Enregistre l'échec du chargement : Loading -> Failed
    ///
    /// Aucune donnée partielle n'est conservée.
    pub fn apply_failure(&mut self, error: &DashboardError) {
        self.full = None;
        self.view = FilteredView::empty();
        self.load_state = LoadState::Failed {
            reason: error.to_string(),
        };
    }

    pub fn is_ready(&self) -> bool {
        self.load_state == LoadState::Ready
    }

    pub fn full_dataset(&self) -> Option<&FullDataset> {
        self.full.as_ref()
    }

    // ========================================================================
    // Slider
    // ========================================================================

    pub fn range(&self) -> VisibleRange {
        self.range
    }

    pub fn view(&self) -> &FilteredView {
        &self.view
    }

    /// Remplace la plage visible et recalcule la vue
    pub fn set_range(&mut self, range: VisibleRange) {
        self.range = range;
        self.refresh_view();
    }

    /// Déplace la poignée active
    pub fn nudge(&mut self, delta: i16) {
        let mut range = self.range;
        range.shift(self.active_handle, delta);
        if range != self.range {
            self.set_range(range);
        }
    }

    /// Bascule entre la poignée de début et de fin
    pub fn toggle_handle(&mut self) {
        self.active_handle = self.active_handle.other();
    }

    /// Revient à la plage de départ
    pub fn reset_range(&mut self) {
        self.set_range(self.initial_range);
    }

    /// Recalcule la vue filtrée depuis zéro
    ///
    /// CONCEPT : État dérivé
    /// - Aucune accumulation : l'ancienne vue est simplement remplacée
    fn refresh_view(&mut self) {
        self.view = match &self.full {
            Some(full) => FilteredView::derive(full, self.range),
            None => FilteredView::empty(),
        };
    }

    // ========================================================================
    // Two-step quit
    // ========================================================================

    /// Demande la confirmation de quitter
    pub fn request_quit(&mut self) {
        self.confirm_quit = true;
    }

    /// Annule la demande de quit
    pub fn cancel_quit(&mut self) {
        self.confirm_quit = false;
    }

    /// Vérifie si on attend la confirmation de quit
    pub fn is_awaiting_quit_confirmation(&self) -> bool {
        self.confirm_quit
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new(&DashboardConfig::default())
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================
