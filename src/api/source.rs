// ============================================================================
// Sources de séries : où trouver <SYMBOL>.json
// ============================================================================
// Deux implémentations du même trait :
// - HttpSource : GET <base_url>/<SYMBOL>.json (reqwest)
// - DirSource  : lecture de <dir>/<SYMBOL>.json (tokio::fs)
//
// CONCEPT RUST : Trait async avec async-trait
// - Les méthodes async dans un trait objet (dyn SeriesSource) passent par
//   la macro #[async_trait] qui les transforme en Pin<Box<dyn Future>>
// - Send + Sync : la source est partagée avec la tâche de chargement
// ============================================================================

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, error, instrument};

use crate::error::{DashboardError, Result};
use crate::models::RawSeries;

/// Timeout d'une requête HTTP
const HTTP_TIMEOUT_SECS: u64 = 30;

/// Fournit la série brute d'un ticker
#[async_trait]
pub trait SeriesSource: Send + Sync {
    /// Description lisible pour les logs (URL ou chemin)
    fn describe(&self) -> String;

    /// Récupère et parse `<SYMBOL>.json`
    async fn fetch(&self, symbol: &str) -> Result<RawSeries>;
}

/// Nom de fichier conventionnel d'un ticker
pub fn resource_name(symbol: &str) -> String {
    format!("{}.json", symbol)
}

// ============================================================================
// HttpSource
// ============================================================================

/// Source HTTP : les fichiers sont servis statiquement sous une URL de base
#[derive(Debug, Clone)]
pub struct HttpSource {
    http: reqwest::Client,
    base_url: String,
}

impl HttpSource {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let base_url = base_url.into();
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
            .build()
            .map_err(|source| DashboardError::Transport {
                symbol: String::new(),
                source,
            })?;

        Ok(Self { http, base_url })
    }

    /// URL complète d'un ticker : <base>/<SYMBOL>.json
    pub fn url_for(&self, symbol: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), resource_name(symbol))
    }
}

#[async_trait]
impl SeriesSource for HttpSource {
    fn describe(&self) -> String {
        self.base_url.clone()
    }

    #[instrument(skip(self))]
    async fn fetch(&self, symbol: &str) -> Result<RawSeries> {
        let url = self.url_for(symbol);
        debug!(url = %url, "Sending HTTP request");

        let transport = |source| DashboardError::Transport {
            symbol: symbol.to_string(),
            source,
        };

        let response = self.http.get(&url).send().await.map_err(transport)?;

        let status = response.status();
        debug!(status = %status, "Received HTTP response");

        // Vérifie que la réponse est un succès HTTP (200-299)
        if !status.is_success() {
            error!(status = %status, "Series resource returned error status");
            return Err(DashboardError::Fetch {
                symbol: symbol.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(transport)?;
        RawSeries::from_json_slice(symbol, &body)
    }
}

// ============================================================================
// DirSource
// ============================================================================

/// Source locale : un répertoire contenant les fichiers <SYMBOL>.json
#[derive(Debug, Clone)]
pub struct DirSource {
    root: PathBuf,
}

impl DirSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn path_for(&self, symbol: &str) -> PathBuf {
        self.root.join(resource_name(symbol))
    }
}

#[async_trait]
impl SeriesSource for DirSource {
    fn describe(&self) -> String {
        self.root.display().to_string()
    }

    #[instrument(skip(self))]
    async fn fetch(&self, symbol: &str) -> Result<RawSeries> {
        let path = self.path_for(symbol);
        debug!(path = %path.display(), "Reading series file");

        let bytes = tokio::fs::read(&path).await.map_err(|source| DashboardError::Io {
            symbol: symbol.to_string(),
            source,
        })?;

        RawSeries::from_json_slice(symbol, &bytes)
    }
}

/// Choisit la source selon la forme de l'argument : URL http(s) ou répertoire
pub fn source_from_location(location: &str) -> Result<Box<dyn SeriesSource>> {
    if location.starts_with("http://") || location.starts_with("https://") {
        Ok(Box::new(HttpSource::new(location)?))
    } else {
        Ok(Box::new(DirSource::new(location)))
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    /// Répertoire temporaire propre à un test
    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("stockdash-{}-{}", name, std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_url_for_trims_trailing_slash() {
        let source = HttpSource::new("http://localhost:3000/").unwrap();
        assert_eq!(source.url_for("GME"), "http://localhost:3000/GME.json");
    }

    #[test]
    fn test_source_from_location() {
        assert!(source_from_location("https://example.com/data").unwrap().describe().starts_with("https://"));
        assert_eq!(source_from_location("public").unwrap().describe(), "public");
    }

    #[tokio::test]
    async fn test_dir_source_reads_symbol_file() {
        let dir = scratch_dir("dir-ok");
        std::fs::write(
            dir.join("ENVX.json"),
            r#"{"2024-01-02": {"4. close": "12.0"}, "2024-01-01": {"4. close": "10.0"}}"#,
        )
        .unwrap();

        let raw = DirSource::new(&dir).fetch("ENVX").await.unwrap();
        assert_eq!(raw.len(), 2);

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[tokio::test]
    async fn test_dir_source_missing_file_is_io_error() {
        let dir = scratch_dir("dir-missing");
        let err = DirSource::new(&dir).fetch("NOPE").await.unwrap_err();
        assert!(matches!(err, DashboardError::Io { ref symbol, .. } if symbol == "NOPE"));
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
