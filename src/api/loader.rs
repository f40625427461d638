// ============================================================================
// Chargement des séries : pipeline séquentiel + réduction pure
// ============================================================================
// 1. fetch_all : un ticker après l'autre (pas de parallélisme, pas de retry)
//    -> Vec<TickerSeries> immuables
// 2. assemble : l'axe vient du premier ticker non vide, chaque série est réindexée
//    dessus -> FullDataset
//
// LoadTask enveloppe le tout dans une tâche tokio annulable : si la vue
// est détruite, le drop du LoadTask abandonne les requêtes en cours.
//
// CONCEPTS RUST :
// 1. async/await séquentiel : chaque .await suspend jusqu'à la réponse
// 2. RAII : Drop::drop() annule la tâche automatiquement
// 3. Channels (mpsc) : le résultat remonte vers la boucle d'événements
// ============================================================================

use std::sync::{mpsc, Arc};

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::api::source::SeriesSource;
use crate::config::{DashboardConfig, FailurePolicy};
use crate::error::{DashboardError, Result};
use crate::models::{ChartDataset, DateAxis, FullDataset, RawSeries, Rgb};

/// Résultat immuable du chargement d'un ticker
#[derive(Debug, Clone, PartialEq)]
pub struct TickerSeries {
    pub symbol: String,
    pub colour: Rgb,
    pub raw: RawSeries,
}

/// Ce que la tâche de chargement renvoie à l'UI
#[derive(Debug)]
pub enum LoadOutcome {
    /// Toutes les séries sont prêtes
    Ready(FullDataset),
    /// Le chargement a échoué, rien n'est affiché
    Failed(DashboardError),
}

// ============================================================================
// Étape 1 : récupération séquentielle
// ============================================================================

/// Récupère les séries de tous les tickers, dans l'ordre de la configuration
///
/// # Politique d'échec
/// * `Abort` - la première erreur arrête la passe et est retournée
/// * `Skip` - le ticker est ignoré ; erreur `NoSeries` si tous échouent
pub async fn fetch_all(
    source: &dyn SeriesSource,
    config: &DashboardConfig,
) -> Result<Vec<TickerSeries>> {
    config.validate()?;

    let total = config.tickers.len();
    let mut fetched = Vec::with_capacity(total);

    for (i, ticker) in config.tickers.iter().enumerate() {
        debug!(ticker = %ticker.symbol, progress = i + 1, total, "Fetching series");

        match source.fetch(&ticker.symbol).await {
            Ok(raw) => {
                info!(ticker = %ticker.symbol, points = raw.len(), "Series fetched");
                fetched.push(TickerSeries {
                    symbol: ticker.symbol.clone(),
                    colour: ticker.colour,
                    raw,
                });
            }
            Err(e) => match config.failure_policy {
                FailurePolicy::Abort => {
                    error!(ticker = %ticker.symbol, error = ?e, "Failed to load series, aborting");
                    return Err(e);
                }
                FailurePolicy::Skip => {
                    warn!(ticker = %ticker.symbol, error = ?e, "Failed to load series, skipping");
                }
            },
        }
    }

    if fetched.is_empty() {
        return Err(DashboardError::NoSeries);
    }
    Ok(fetched)
}

// ============================================================================
// Étape 2 : réduction pure
// ============================================================================

/// Assemble les séries en un jeu de données aligné sur un axe commun
///
/// L'axe est dérivé une seule fois depuis la première série qui a des dates,
/// puis passé à chaque extraction. Une date de l'axe absente d'un ticker
/// devient un trou.
pub fn assemble(series: &[TickerSeries]) -> FullDataset {
    let axis = series
        .iter()
        .find(|s| !s.raw.is_empty())
        .map(|first| DateAxis::from_series(&first.raw))
        .unwrap_or_default();

    let datasets = series
        .iter()
        .map(|s| {
            let dataset = ChartDataset::aligned(&s.symbol, s.colour, &s.raw, &axis);
            let gaps = dataset.gap_count();
            if gaps > 0 {
                warn!(ticker = %s.symbol, gaps, axis_len = axis.len(), "Series does not cover the shared date axis");
            }
            dataset
        })
        .collect();

    FullDataset::new(axis, datasets)
}

/// Pipeline complet : récupération puis assemblage
pub async fn load_dataset(source: &dyn SeriesSource, config: &DashboardConfig) -> Result<FullDataset> {
    let series = fetch_all(source, config).await?;
    let full = assemble(&series);
    info!(dates = full.axis.len(), series = full.datasets.len(), "Dataset assembled");
    Ok(full)
}

// ============================================================================
// LoadTask : chargement en arrière-plan, annulable
// ============================================================================

/// Tâche de chargement liée à la durée de vie de la vue
///
/// CONCEPT : Scoped task
/// - La tâche tokio vit tant que le LoadTask existe
/// - Drop => abort() : le futur en cours (requête HTTP comprise) est abandonné
/// - Aucun résultat n'est envoyé après l'annulation
pub struct LoadTask {
    handle: JoinHandle<()>,
}

impl LoadTask {
    /// Lance le chargement sur le runtime donné
    ///
    /// Le résultat est envoyé une seule fois sur `outcome_tx`.
    pub fn spawn(
        runtime: &Handle,
        source: Arc<dyn SeriesSource>,
        config: DashboardConfig,
        outcome_tx: mpsc::Sender<LoadOutcome>,
    ) -> Self {
        info!(source = %source.describe(), tickers = config.tickers.len(), "Spawning load task");

        let handle = runtime.spawn(async move {
            let outcome = match load_dataset(source.as_ref(), &config).await {
                Ok(full) => LoadOutcome::Ready(full),
                Err(e) => LoadOutcome::Failed(e),
            };
            // Le receveur a pu disparaître (vue fermée) : rien à faire
            if outcome_tx.send(outcome).is_err() {
                debug!("Load outcome dropped, receiver is gone");
            }
        });

        Self { handle }
    }

    /// Annule explicitement le chargement
    pub fn cancel(&self) {
        if !self.handle.is_finished() {
            debug!("Cancelling in-flight load task");
        }
        self.handle.abort();
    }
}

impl Drop for LoadTask {
    fn drop(&mut self) {
        self.cancel();
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;
    use chrono::NaiveDate;

    use super::*;
    use crate::config::TickerEntry;

    /// Source en mémoire : symbol -> document JSON, compte les appels
    struct MemorySource {
        documents: HashMap<String, String>,
        calls: AtomicUsize,
    }

    impl MemorySource {
        fn new(documents: &[(&str, &str)]) -> Self {
            Self {
                documents: documents
                    .iter()
                    .map(|(s, d)| (s.to_string(), d.to_string()))
                    .collect(),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl SeriesSource for MemorySource {
        fn describe(&self) -> String {
            "memory".to_string()
        }

        async fn fetch(&self, symbol: &str) -> Result<RawSeries> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.documents.get(symbol) {
                Some(doc) => RawSeries::from_json_slice(symbol, doc.as_bytes()),
                None => Err(DashboardError::Fetch {
                    symbol: symbol.to_string(),
                    status: 404,
                }),
            }
        }
    }

    /// Source qui ne répond jamais ; signale quand son futur est abandonné
    struct HangingSource {
        dropped: Arc<AtomicBool>,
    }

    struct DropFlag(Arc<AtomicBool>);

    impl Drop for DropFlag {
        fn drop(&mut self) {
            self.0.store(true, Ordering::SeqCst);
        }
    }

    #[async_trait]
    impl SeriesSource for HangingSource {
        fn describe(&self) -> String {
            "hanging".to_string()
        }

        async fn fetch(&self, _symbol: &str) -> Result<RawSeries> {
            let _flag = DropFlag(self.dropped.clone());
            std::future::pending::<()>().await;
            Ok(RawSeries::default())
        }
    }

    fn config(symbols: &[&str], policy: FailurePolicy) -> DashboardConfig {
        DashboardConfig {
            tickers: symbols
                .iter()
                .map(|s| TickerEntry::new(*s, Rgb::new(75, 192, 192)))
                .collect(),
            failure_policy: policy,
            ..DashboardConfig::default()
        }
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    const DOC_A: &str = r#"{"2024-01-02": {"4. close": "12.0"}, "2024-01-01": {"4. close": "10.0"}}"#;
    const DOC_B: &str = r#"{"2024-01-02": {"4. close": "5.5"}, "2024-01-01": {"4. close": "5.0"}}"#;

    #[tokio::test]
    async fn test_load_two_tickers_end_to_end() {
        let source = MemorySource::new(&[("A", DOC_A), ("B", DOC_B)]);
        let full = load_dataset(&source, &config(&["A", "B"], FailurePolicy::Abort))
            .await
            .unwrap();

        assert_eq!(full.axis.dates(), &[date("2024-01-01"), date("2024-01-02")]);
        assert_eq!(full.datasets.len(), 2);
        assert_eq!(full.datasets[0].label, "A Closing Price");
        assert_eq!(full.datasets[0].values, vec![Some(10.0), Some(12.0)]);
        assert_eq!(full.datasets[1].label, "B Closing Price");
        assert_eq!(full.datasets[1].values, vec![Some(5.0), Some(5.5)]);
    }

    #[tokio::test]
    async fn test_abort_policy_stops_at_first_failure() {
        let source = MemorySource::new(&[("A", DOC_A), ("C", DOC_B)]);
        let err = load_dataset(&source, &config(&["A", "MISSING", "C"], FailurePolicy::Abort))
            .await
            .unwrap_err();

        assert!(matches!(err, DashboardError::Fetch { ref symbol, status: 404 } if symbol == "MISSING"));
        // C n'a jamais été demandé
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_parse_error_aborts_like_fetch_error() {
        let source = MemorySource::new(&[("A", "{broken"), ("B", DOC_B)]);
        let err = load_dataset(&source, &config(&["A", "B"], FailurePolicy::Abort))
            .await
            .unwrap_err();
        assert!(matches!(err, DashboardError::Parse { .. }));
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_skip_policy_keeps_the_rest() {
        let source = MemorySource::new(&[("B", DOC_B)]);
        let full = load_dataset(&source, &config(&["MISSING", "B"], FailurePolicy::Skip))
            .await
            .unwrap();

        assert_eq!(full.datasets.len(), 1);
        assert_eq!(full.datasets[0].symbol, "B");
        // L'axe vient du premier ticker chargé
        assert_eq!(full.axis.len(), 2);
    }

    #[tokio::test]
    async fn test_skip_policy_with_no_survivor() {
        let source = MemorySource::new(&[]);
        let err = load_dataset(&source, &config(&["X", "Y"], FailurePolicy::Skip))
            .await
            .unwrap_err();
        assert!(matches!(err, DashboardError::NoSeries));
    }

    #[tokio::test]
    async fn test_empty_config_is_rejected() {
        let source = MemorySource::new(&[]);
        let err = load_dataset(&source, &config(&[], FailurePolicy::Abort)).await.unwrap_err();
        assert!(matches!(err, DashboardError::EmptyConfig));
        assert_eq!(source.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_assemble_reindexes_on_first_axis() {
        let a = TickerSeries {
            symbol: "A".to_string(),
            colour: Rgb::new(1, 1, 1),
            raw: RawSeries::from_points([(date("2024-01-01"), 1.0), (date("2024-01-02"), 2.0)]),
        };
        // B a un jour en moins et un jour hors axe
        let b = TickerSeries {
            symbol: "B".to_string(),
            colour: Rgb::new(2, 2, 2),
            raw: RawSeries::from_points([(date("2024-01-02"), 20.0), (date("2024-01-03"), 30.0)]),
        };

        let full = assemble(&[a, b]);
        assert_eq!(full.axis.len(), 2);
        assert_eq!(full.datasets[1].values, vec![None, Some(20.0)]);
    }

    #[test]
    fn test_assemble_skips_empty_leading_series_for_axis() {
        let a = TickerSeries {
            symbol: "A".to_string(),
            colour: Rgb::new(1, 1, 1),
            raw: RawSeries::default(),
        };
        let b = TickerSeries {
            symbol: "B".to_string(),
            colour: Rgb::new(2, 2, 2),
            raw: RawSeries::from_points([(date("2024-01-01"), 5.0), (date("2024-01-02"), 5.5)]),
        };

        let full = assemble(&[a, b]);
        assert_eq!(full.axis.len(), 2);
        assert_eq!(full.datasets[0].values, vec![None, None]);
        assert_eq!(full.datasets[1].values, vec![Some(5.0), Some(5.5)]);
    }

    #[test]
    fn test_assemble_nothing_is_empty() {
        let full = assemble(&[]);
        assert!(full.is_empty());
        assert!(full.datasets.is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_load_task_delivers_outcome() {
        let (tx, rx) = mpsc::channel();
        let source: Arc<dyn SeriesSource> = Arc::new(MemorySource::new(&[("A", DOC_A)]));
        let _task = LoadTask::spawn(&Handle::current(), source, config(&["A"], FailurePolicy::Abort), tx);

        let outcome = tokio::task::spawn_blocking(move || rx.recv_timeout(Duration::from_secs(5)))
            .await
            .unwrap()
            .unwrap();
        assert!(matches!(outcome, LoadOutcome::Ready(ref full) if full.datasets.len() == 1));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_dropping_load_task_cancels_fetch() {
        let dropped = Arc::new(AtomicBool::new(false));
        let (tx, rx) = mpsc::channel();
        let source: Arc<dyn SeriesSource> = Arc::new(HangingSource {
            dropped: dropped.clone(),
        });

        let task = LoadTask::spawn(&Handle::current(), source, config(&["A"], FailurePolicy::Abort), tx);
        // Laisse la tâche démarrer la requête
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!dropped.load(Ordering::SeqCst));

        drop(task);

        for _ in 0..100 {
            if dropped.load(Ordering::SeqCst) {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert!(dropped.load(Ordering::SeqCst));
        // Aucun résultat après annulation
        assert!(rx.try_recv().is_err());
    }
}
