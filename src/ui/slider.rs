// ============================================================================
// Slider - Contrôle de plage à deux poignées
// ============================================================================
// Piste 0..100 dessinée en caractères, poignées ◆ (active surlignée) et
// portion sélectionnée en surbrillance. Sous la piste : pourcentages et
// dates de début/fin de la fenêtre visible.
//
//   ──────◆━━━━━━━━━━━━━━━━━◆──────
//   Début 25%  2024-01-02 → 2024-01-04  Fin 75%
// ============================================================================

use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::App;
use crate::models::{Handle, VisibleRange};

const HANDLE: &str = "◆";
const TRACK: &str = "─";
const SELECTED: &str = "━";

/// Colonne d'une poignée sur une piste de `width` cellules
pub fn handle_column(percent: u8, width: usize) -> usize {
    if width == 0 {
        return 0;
    }
    (percent as usize * (width - 1)) / 100
}

/// Construit la piste du slider
fn track_line(range: VisibleRange, active: Handle, width: usize) -> Line<'static> {
    let start_col = handle_column(range.start(), width);
    let end_col = handle_column(range.end(), width);

    let handle_style = |handle: Handle| {
        if handle == active {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        }
    };

    let spans: Vec<Span<'static>> = (0..width)
        .map(|col| {
            if col == end_col {
                // Poignées confondues : la poignée active est dessinée
                let handle = if col == start_col { active } else { Handle::End };
                Span::styled(HANDLE, handle_style(handle))
            } else if col == start_col {
                Span::styled(HANDLE, handle_style(Handle::Start))
            } else if col > start_col && col < end_col {
                Span::styled(SELECTED, Style::default().fg(Color::Cyan))
            } else {
                Span::styled(TRACK, Style::default().fg(Color::DarkGray))
            }
        })
        .collect();

    Line::from(spans)
}

/// Dessine le slider
pub fn render_slider(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" Plage de dates ");

    let inner_width = area.width.saturating_sub(2) as usize;
    let range = app.range();
    let view = app.view();

    let label_style = |handle: Handle| {
        let style = Style::default().add_modifier(Modifier::BOLD);
        if handle == app.active_handle {
            style.fg(Color::Yellow)
        } else {
            style.fg(Color::Gray)
        }
    };

    let span_text = match (view.first_date(), view.last_date()) {
        (Some(first), Some(last)) => format!("  {} → {}  ", first, last),
        _ => "  —  ".to_string(),
    };

    let legend = Line::from(vec![
        Span::styled(format!("Début {}%", range.start()), label_style(Handle::Start)),
        Span::raw(span_text),
        Span::styled(format!("Fin {}%", range.end()), label_style(Handle::End)),
    ]);

    let paragraph = Paragraph::new(vec![track_line(range, app.active_handle, inner_width), legend])
        .block(block)
        .alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handle_column() {
        assert_eq!(handle_column(0, 101), 0);
        assert_eq!(handle_column(100, 101), 100);
        assert_eq!(handle_column(50, 11), 5);
        assert_eq!(handle_column(100, 0), 0);
    }

    #[test]
    fn test_track_has_two_handles() {
        let line = track_line(VisibleRange::new(20, 80).unwrap(), Handle::Start, 50);
        let handles = line.spans.iter().filter(|s| s.content == HANDLE).count();
        assert_eq!(line.spans.len(), 50);
        assert_eq!(handles, 2);
    }

    #[test]
    fn test_track_with_equal_handles() {
        let line = track_line(VisibleRange::new(50, 50).unwrap(), Handle::End, 20);
        let handles = line.spans.iter().filter(|s| s.content == HANDLE).count();
        assert_eq!(handles, 1);
    }
}
