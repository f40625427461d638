// ============================================================================
// Chart - Rendu du graphique des prix de clôture
// ============================================================================
// Une ligne colorée par ticker sur la fenêtre visible, plus une ligne
// verticale d'annotation si sa date est dans la fenêtre.
//
// CONCEPTS RATATUI :
// 1. Chart widget : graphique ligne multi-séries
// 2. Dataset : une série de points (x, y) ; x = position dans la vue
// 3. Axis : bornes et labels des axes X et Y
//
// Les trous (None) coupent la ligne : chaque segment continu devient un
// Dataset séparé, seul le premier porte le nom pour la légende.
// ============================================================================

use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph},
    Frame,
};

use crate::app::App;
use crate::config::Annotation;
use crate::models::{FilteredView, Rgb};

/// Marge verticale autour des prix (5%)
const PRICE_MARGIN_RATIO: f64 = 0.05;

/// Convertit une couleur du modèle en couleur ratatui
pub fn to_color(rgb: Rgb) -> Color {
    Color::Rgb(rgb.r, rgb.g, rgb.b)
}

/// Dessine le graphique (ou l'écran d'attente)
pub fn render_chart(frame: &mut Frame, app: &App, area: Rect) {
    if !app.is_ready() {
        // Chargement en cours ou échoué : même écran, l'erreur est dans les logs
        render_loading(frame, app, area);
        return;
    }

    let view = app.view();
    match view.price_bounds() {
        Some(bounds) if !view.is_empty() => {
            render_chart_graph(frame, view, app.annotation.as_ref(), bounds, area)
        }
        _ => render_message(frame, area, "Aucune donnée dans la plage sélectionnée"),
    }
}

// ============================================================================
// Graphique principal
// ============================================================================

/// Découpe une série en segments continus de points (x, y)
///
/// CONCEPT RUST : Iterator + état local
/// - Chaque Some(v) prolonge le segment courant
/// - Chaque None ferme le segment courant
pub fn continuous_runs(values: &[Option<f64>]) -> Vec<Vec<(f64, f64)>> {
    let mut runs = Vec::new();
    let mut current = Vec::new();

    for (i, value) in values.iter().enumerate() {
        match value {
            Some(v) => current.push((i as f64, *v)),
            None if !current.is_empty() => runs.push(std::mem::take(&mut current)),
            None => {}
        }
    }
    if !current.is_empty() {
        runs.push(current);
    }
    runs
}

/// Bornes de l'axe Y avec marge ; évite une plage nulle
fn y_bounds(min_price: f64, max_price: f64) -> (f64, f64) {
    let span = max_price - min_price;
    let margin = if span > 0.0 {
        span * PRICE_MARGIN_RATIO
    } else {
        (max_price.abs() * PRICE_MARGIN_RATIO).max(1.0)
    };
    ((min_price - margin).max(0.0), max_price + margin)
}

fn render_chart_graph(
    frame: &mut Frame,
    view: &FilteredView,
    annotation: Option<&Annotation>,
    (min_price, max_price): (f64, f64),
    area: Rect,
) {
    let (y_min, y_max) = y_bounds(min_price, max_price);
    let x_max = (view.len().saturating_sub(1)).max(1) as f64;

    // Les points doivent vivre plus longtemps que les Dataset qui les empruntent
    let runs: Vec<(usize, Vec<(f64, f64)>)> = view
        .datasets
        .iter()
        .enumerate()
        .flat_map(|(i, dataset)| continuous_runs(&dataset.values).into_iter().map(move |run| (i, run)))
        .collect();

    let annotation_points: Option<(&Annotation, [(f64, f64); 2])> = annotation.and_then(|a| {
        let x = view.position_of(&a.date)? as f64;
        Some((a, [(x, y_min), (x, y_max)]))
    });

    let mut named = vec![false; view.datasets.len()];
    let mut datasets: Vec<Dataset> = Vec::with_capacity(runs.len() + 1);

    for (index, points) in &runs {
        let source = &view.datasets[*index];
        let mut dataset = Dataset::default()
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(to_color(source.colour)))
            .data(points);

        // Un seul nom par série dans la légende
        if !named[*index] {
            named[*index] = true;
            dataset = dataset.name(source.label.clone());
        }
        datasets.push(dataset);
    }

    if let Some((a, points)) = &annotation_points {
        datasets.push(
            Dataset::default()
                .name(a.label.clone())
                .marker(symbols::Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(to_color(a.colour)))
                .data(points),
        );
    }

    let x_labels = date_labels(view);
    let x_axis = Axis::default()
        .title("Date")
        .style(Style::default().fg(Color::Gray))
        .bounds([0.0, x_max])
        .labels(x_labels);

    let y_axis = Axis::default()
        .title("Clôture ($)")
        .style(Style::default().fg(Color::Gray))
        .bounds([y_min, y_max])
        .labels(vec![
            Span::raw(format!("{:.2}", y_min)),
            Span::raw(format!("{:.2}", (y_min + y_max) / 2.0)),
            Span::raw(format!("{:.2}", y_max)),
        ]);

    let chart = Chart::new(datasets)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::White))
                .title(format!(" Stock Performance Chart - {} jours ", view.len())),
        )
        .x_axis(x_axis)
        .y_axis(y_axis);

    frame.render_widget(chart, area);
}

/// Labels de l'axe X : première, milieu et dernière date visibles
fn date_labels(view: &FilteredView) -> Vec<Span<'static>> {
    let label = |i: usize| {
        view.dates
            .get(i)
            .map(|d| d.to_string())
            .unwrap_or_default()
    };

    match view.len() {
        0 => Vec::new(),
        1 => vec![Span::raw(label(0)), Span::raw(label(0))],
        n => vec![
            Span::raw(label(0)),
            Span::raw(label((n - 1) / 2)),
            Span::raw(label(n - 1)),
        ],
    }
}

// ============================================================================
// Écrans sans graphique
// ============================================================================

/// Écran d'attente : le chargement n'est pas terminé (ou a échoué)
fn render_loading(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .title(" Stock Performance Chart ");

    let text = vec![
        Line::from(""),
        Line::from(Span::styled(
            "Chargement du graphique...",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            app.symbols.join("  "),
            Style::default().fg(Color::Gray),
        )),
    ];

    let paragraph = Paragraph::new(text).block(block).alignment(Alignment::Center);
    frame.render_widget(paragraph, area);
}

/// Affiche un message à la place du graphique
fn render_message(frame: &mut Frame, area: Rect, message: &str) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Gray))
        .title(" Stock Performance Chart ");

    let text = vec![
        Line::from(""),
        Line::from(Span::styled(message, Style::default().fg(Color::Gray))),
    ];

    let paragraph = Paragraph::new(text).block(block).alignment(Alignment::Center);
    frame.render_widget(paragraph, area);
}
