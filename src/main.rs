// ============================================================================
// Stockdash - Dashboard des prix de clôture
// ============================================================================
// Programme TUI : charge un fichier <SYMBOL>.json par ticker, trace les prix
// de clôture et permet de restreindre la fenêtre de dates avec un slider.
//
// CONCEPTS RUST CLÉS :
// 1. Terminal raw mode : contrôle total du terminal
// 2. Event loop : boucle qui gère événements et rendering
// 3. Runtime tokio + tâche de fond : le chargement ne bloque pas l'UI
// 4. RAII : LoadTask annule le chargement à sa destruction
// ============================================================================

use std::io;
use std::path::PathBuf;
use std::sync::{mpsc, Arc};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{debug, error, info, warn};

use stockdash::api::{source_from_location, LoadOutcome, LoadTask};
use stockdash::app::{App, LoadState};
use stockdash::config::{DashboardConfig, FailurePolicy};
use stockdash::models::VisibleRange;
use stockdash::ui::{events::EventHandler, render, Event};
use stockdash::DashboardError;

// ============================================================================
// Ligne de commande
// ============================================================================

#[derive(Debug, Parser)]
#[command(name = "stockdash", version, about = "Historical closing prices dashboard")]
struct Args {
    /// URL de base (http://...) ou répertoire contenant les fichiers <SYMBOL>.json
    #[arg(long, default_value = "public")]
    source: String,

    /// Fichier de configuration JSON (tickers, annotation, plage initiale)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Plage visible initiale, en pourcentages : START:END
    #[arg(long)]
    range: Option<VisibleRange>,

    /// Ignore les tickers en échec au lieu d'arrêter le chargement
    #[arg(long)]
    skip_failed: bool,
}

// ============================================================================
// Initialisation du logging
// ============================================================================
// CONCEPT : Logging dans une app TUI
// - Les println! ne fonctionnent pas une fois le TUI lancé
// - On log vers un fichier à rotation quotidienne
// ============================================================================

/// Répertoire des logs : <data_local_dir>/stockdash/logs, sinon ./logs
fn log_directory() -> PathBuf {
    dirs::data_local_dir()
        .map(|dir| dir.join("stockdash").join("logs"))
        .unwrap_or_else(|| PathBuf::from("./logs"))
}

/// Initialise le système de logging vers fichier
///
/// # Utilisation
/// ```bash
/// tail -f ~/.local/share/stockdash/logs/stockdash.log.*
/// RUST_LOG=stockdash=trace stockdash --source public
/// ```
fn init_logging() -> Result<()> {
    use tracing_appender::rolling::{RollingFileAppender, Rotation};
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let log_dir = log_directory();
    std::fs::create_dir_all(&log_dir).context("Échec de la création du répertoire de logs")?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, log_dir.clone(), "stockdash.log");

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(true)
                .with_line_number(true),
        )
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "stockdash=debug,info".into()),
        )
        .init();

    info!(?log_dir, "Logging initialisé");
    Ok(())
}

/// Construit la configuration : fichier (ou défauts) puis options CLI
fn build_config(args: &Args) -> Result<DashboardConfig> {
    let mut config = match &args.config {
        Some(path) => DashboardConfig::from_file(path)
            .with_context(|| format!("Configuration invalide : {}", path.display()))?,
        None => DashboardConfig::default(),
    };

    if let Some(range) = args.range {
        config.initial_range = range;
    }
    if args.skip_failed {
        config.failure_policy = FailurePolicy::Skip;
    }

    config.validate()?;
    Ok(config)
}

// ============================================================================
// Point d'entrée du programme
// ============================================================================

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging().unwrap_or_else(|e| {
        eprintln!("⚠️  Warning: Failed to initialize logging: {}", e);
        eprintln!("   Continuing without logging...");
    });

    info!(?args, "Stockdash starting up");

    let config = build_config(&args)?;
    let source = Arc::from(source_from_location(&args.source)?);

    // Runtime multi-thread : la tâche de chargement tourne pendant que
    // la boucle d'événements dessine l'écran d'attente
    let runtime = tokio::runtime::Runtime::new().context("Échec de la création du runtime tokio")?;

    let mut app = App::new(&config);
    let (outcome_tx, outcome_rx) = mpsc::channel::<LoadOutcome>();
    let load_task = LoadTask::spawn(runtime.handle(), source, config, outcome_tx);

    debug!("Setting up terminal");
    let mut terminal = setup_terminal()?;

    let events = EventHandler::new();

    info!("Starting event loop");
    let result = run(&mut terminal, &mut app, &events, &outcome_rx);

    // Ordre de teardown : annule le chargement, restaure le terminal,
    // puis arrête le runtime sans attendre les tâches restantes
    load_task.cancel();

    debug!("Restoring terminal");
    restore_terminal(&mut terminal)?;

    runtime.shutdown_background();

    match &result {
        Ok(_) => info!("Application exited normally"),
        Err(e) => error!(error = ?e, "Application exited with error"),
    }

    result
}

// ============================================================================
// Event Loop Principal
// ============================================================================
// À chaque itération :
//   0. Résultat du chargement (non bloquant)
//   1. Render
//   2. Input (met à jour l'état)
// ============================================================================

/// Exécute la boucle principale de l'application
///
/// `app` n'est modifiée que depuis cette boucle : un seul écrivain.
fn run(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &EventHandler,
    outcome_rx: &mpsc::Receiver<LoadOutcome>,
) -> Result<()> {
    while app.is_running() {
        // ========================================
        // 0. CHARGEMENT : un seul résultat attendu
        // ========================================
        match outcome_rx.try_recv() {
            Ok(LoadOutcome::Ready(full)) => {
                info!(dates = full.axis.len(), series = full.datasets.len(), "Dataset ready");
                app.apply_dataset(full);
            }
            Ok(LoadOutcome::Failed(e)) => {
                error!(error = ?e, "Error loading JSON");
                app.apply_failure(&e);
            }
            Err(mpsc::TryRecvError::Empty) => {}
            Err(mpsc::TryRecvError::Disconnected) => {
                // Normal une fois le résultat reçu ; sinon la tâche est morte
                if app.load_state == LoadState::Loading {
                    warn!("Load task ended without an outcome");
                    app.apply_failure(&DashboardError::NoSeries);
                }
            }
        }

        // ========================================
        // 1. RENDER
        // ========================================
        terminal.draw(|frame| render(frame, app))?;

        // ========================================
        // 2. INPUT
        // ========================================
        match events.next() {
            Ok(event) => handle_event(app, event),
            Err(e) => debug!(error = ?e, "Failed to read terminal event"),
        }
    }

    Ok(())
}

// ============================================================================
// Gestion des événements
// ============================================================================

/// Traite un événement et met à jour l'état de l'application
///
/// CONCEPT RUST : Pattern matching avec guards
/// - Les actions du slider ne sont actives qu'une fois les données prêtes
fn handle_event(app: &mut App, event: Event) {
    use stockdash::ui::events::{is_quit_event, is_reset_event, is_switch_handle_event, slider_delta};

    match event {
        Event::Key(_) if is_quit_event(&event) => {
            // Two-step confirmation pour éviter les quits accidentels
            if app.is_awaiting_quit_confirmation() {
                info!("User confirmed quit");
                app.quit();
            } else {
                info!("User requested quit (awaiting confirmation)");
                app.request_quit();
            }
        }

        Event::Key(_) if is_switch_handle_event(&event) && app.is_ready() => {
            app.cancel_quit();
            app.toggle_handle();
            debug!(handle = ?app.active_handle, "User switched slider handle");
        }

        Event::Key(_) if is_reset_event(&event) && app.is_ready() => {
            app.cancel_quit();
            app.reset_range();
            info!(range = %app.range(), "User reset range");
        }

        Event::Key(_) if app.is_ready() && slider_delta(&event).is_some() => {
            app.cancel_quit();
            if let Some(delta) = slider_delta(&event) {
                app.nudge(delta);
                debug!(range = %app.range(), visible = app.view().len(), "User moved slider");
            }
        }

        Event::Key(_) => {
            // Toute autre touche : annule la confirmation si active
            app.cancel_quit();
        }

        Event::Tick => {}
    }
}

// ============================================================================
// Setup et restauration du terminal
// ============================================================================

/// Configure le terminal en mode TUI
fn setup_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend).map_err(|e| e.into())
}

/// Restaure le terminal à son état normal
///
/// Appelé dans main() même en cas d'erreur de la boucle.
fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}
