// ============================================================================
// Gestion des événements
// ============================================================================
// Gère les événements clavier et les ticks de l'application
//
// CONCEPTS RUST :
// 1. Enums avec variants : représenter différents types d'événements
// 2. Pattern matching sur KeyCode et KeyModifiers
// 3. Error handling avec Result
// ============================================================================

use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event as CrosstermEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::app::{COARSE_STEP, FINE_STEP};

/// Délai max d'attente d'un événement avant un Tick
const POLL_TIMEOUT_MS: u64 = 100;

/// Événements de l'application
#[derive(Debug, Clone)]
pub enum Event {
    /// Touche pressée
    Key(KeyEvent),

    /// Tick régulier (pas d'entrée utilisateur)
    Tick,
}

/// Gestionnaire d'événements
pub struct EventHandler;

impl EventHandler {
    /// Crée un nouveau gestionnaire d'événements
    pub fn new() -> Self {
        Self
    }

    /// Lit le prochain événement (bloquant avec timeout)
    ///
    /// CONCEPT : Non-blocking I/O avec timeout
    /// - poll(timeout) attend au plus POLL_TIMEOUT_MS
    /// - Le timeout court permet de voir arriver le résultat du chargement
    pub fn next(&self) -> Result<Event> {
        if event::poll(Duration::from_millis(POLL_TIMEOUT_MS))? {
            match event::read()? {
                // Sur certains OS on reçoit Press ET Release : on garde Press
                CrosstermEvent::Key(key) if key.kind == KeyEventKind::Press => Ok(Event::Key(key)),
                // Release, resize, souris... : le prochain draw s'adapte
                _ => Ok(Event::Tick),
            }
        } else {
            Ok(Event::Tick)
        }
    }
}

impl Default for EventHandler {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Helpers : Convertir KeyEvent en action
// ============================================================================

/// Vérifie si l'événement est la touche 'q' (quitter)
pub fn is_quit_event(event: &Event) -> bool {
    if let Event::Key(key) = event {
        matches!(key.code, KeyCode::Char('q') | KeyCode::Char('Q'))
    } else {
        false
    }
}

/// Vérifie si l'événement est Tab / Shift+Tab (changer de poignée)
pub fn is_switch_handle_event(event: &Event) -> bool {
    if let Event::Key(key) = event {
        matches!(key.code, KeyCode::Tab | KeyCode::BackTab)
    } else {
        false
    }
}

/// Vérifie si l'événement est 'r' (réinitialiser la plage)
pub fn is_reset_event(event: &Event) -> bool {
    if let Event::Key(key) = event {
        matches!(key.code, KeyCode::Char('r') | KeyCode::Char('R'))
    } else {
        false
    }
}

/// Déplacement du slider demandé par l'événement, en points de pourcentage
///
/// CONCEPT RUST : Multiple patterns avec |
/// - ← / h : -1, → / l : +1
/// - Shift+← / H : -10, Shift+→ / L : +10
pub fn slider_delta(event: &Event) -> Option<i16> {
    let Event::Key(key) = event else {
        return None;
    };
    let shifted = key.modifiers.contains(KeyModifiers::SHIFT);

    match key.code {
        KeyCode::Left if shifted => Some(-COARSE_STEP),
        KeyCode::Right if shifted => Some(COARSE_STEP),
        KeyCode::Left | KeyCode::Char('h') => Some(-FINE_STEP),
        KeyCode::Right | KeyCode::Char('l') => Some(FINE_STEP),
        KeyCode::Char('H') => Some(-COARSE_STEP),
        KeyCode::Char('L') => Some(COARSE_STEP),
        _ => None,
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::empty()))
    }

    #[test]
    fn test_is_quit_event() {
        assert!(is_quit_event(&key(KeyCode::Char('q'))));
        assert!(!is_quit_event(&key(KeyCode::Char('a'))));
        assert!(!is_quit_event(&Event::Tick));
    }

    #[test]
    fn test_slider_delta() {
        assert_eq!(slider_delta(&key(KeyCode::Left)), Some(-1));
        assert_eq!(slider_delta(&key(KeyCode::Char('l'))), Some(1));
        assert_eq!(slider_delta(&key(KeyCode::Char('H'))), Some(-10));

        let shift_right = Event::Key(KeyEvent::new(KeyCode::Right, KeyModifiers::SHIFT));
        assert_eq!(slider_delta(&shift_right), Some(10));

        assert_eq!(slider_delta(&key(KeyCode::Up)), None);
        assert_eq!(slider_delta(&Event::Tick), None);
    }

    #[test]
    fn test_switch_and_reset() {
        assert!(is_switch_handle_event(&key(KeyCode::Tab)));
        assert!(is_switch_handle_event(&key(KeyCode::BackTab)));
        assert!(is_reset_event(&key(KeyCode::Char('r'))));
        assert!(!is_reset_event(&key(KeyCode::Enter)));
    }
}
