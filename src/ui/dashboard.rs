// ============================================================================
// Dashboard - Rendu de l'interface principale
// ============================================================================
// Une seule page, découpée verticalement :
//
//   ┌ header ─────────────────────┐  titre + état du chargement
//   ├ chart ──────────────────────┤  graphique (ou écran d'attente)
//   ├ slider ─────────────────────┤  plage visible (seulement si prêt)
//   └ footer ─────────────────────┘  raccourcis clavier
//
// CONCEPTS RATATUI :
// 1. Frame : surface de dessin
// 2. Layout : découpage de l'espace en zones
// 3. Style : couleurs et attributs de texte
// ============================================================================

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::{App, LoadState};
use crate::ui::{chart, slider};

/// Hauteur du slider (bordures comprises)
const SLIDER_HEIGHT: u16 = 4;

/// Dessine l'interface complète
pub fn render(frame: &mut Frame, app: &App) {
    let chunks = create_layout(frame.size(), app.is_ready());

    render_header(frame, app, chunks[0]);
    chart::render_chart(frame, app, chunks[1]);

    if app.is_ready() {
        slider::render_slider(frame, app, chunks[2]);
    }

    render_footer(frame, app, chunks[3]);
}

/// Crée le layout principal (header, chart, slider, footer)
///
/// Le slider n'a pas de hauteur tant que les données ne sont pas prêtes.
fn create_layout(area: Rect, ready: bool) -> Vec<Rect> {
    let slider_height = if ready { SLIDER_HEIGHT } else { 0 };

    Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),             // Header
            Constraint::Min(0),                // Chart : tout le reste
            Constraint::Length(slider_height), // Slider
            Constraint::Length(3),             // Footer
        ])
        .split(area)
        .to_vec()
}

/// Dessine le header avec le titre et l'état du chargement
fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" My Stock Dashboard ")
        .title_alignment(Alignment::Center);

    // Un échec reste présenté comme un chargement : l'erreur est dans les logs
    let status = match &app.load_state {
        LoadState::Ready => Span::styled(
            format!("{} séries", app.view().datasets.len()),
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        ),
        LoadState::Loading | LoadState::Failed { .. } => Span::styled(
            "Chargement...",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        ),
    };

    let paragraph = Paragraph::new(Line::from(vec![Span::raw("📈 "), status]))
        .block(block)
        .alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}

/// Dessine le footer avec les raccourcis clavier
fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let key = |k: &'static str| Span::styled(k, Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD));

    let shortcuts = if app.is_awaiting_quit_confirmation() {
        Line::from(vec![
            Span::styled(
                "⚠  Appuyez sur ",
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                "[q]",
                Style::default()
                    .fg(Color::Red)
                    .add_modifier(Modifier::BOLD)
                    .add_modifier(Modifier::SLOW_BLINK),
            ),
            Span::styled(
                " à nouveau pour quitter, ou n'importe quelle autre touche pour annuler ⚠",
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            ),
        ])
    } else if app.is_ready() {
        Line::from(vec![
            key("[q]"),
            Span::raw(" Quit  "),
            key("[←→ / h l]"),
            Span::raw(" Move  "),
            key("[H L]"),
            Span::raw(" Move ×10  "),
            key("[Tab]"),
            Span::raw(" Handle  "),
            key("[r]"),
            Span::raw(" Reset"),
        ])
    } else {
        Line::from(vec![key("[q]"), Span::raw(" Quit")])
    };

    let paragraph = Paragraph::new(vec![shortcuts])
        .block(block)
        .alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}

// ============================================================================
// Tests de rendu
// ============================================================================
