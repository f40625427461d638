// ============================================================================
// Filtre de plage : VisibleRange -> FilteredView
// ============================================================================
// Le slider à deux poignées produit une paire de pourcentages [start, end].
// On les convertit en bornes d'index sur l'axe des dates :
//
//   startIndex = floor(start / 100 * L)
//   endIndex   = floor(end   / 100 * L)
//
// puis on découpe l'axe et chaque série sur [startIndex, endIndex] inclus.
//
// La vue filtrée est un état dérivé : toujours recalculée depuis
// (FullDataset, VisibleRange), jamais modifiée en place.
// ============================================================================

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;

use crate::error::DashboardError;
use crate::models::series::{ChartDataset, FullDataset};

/// Borne maximale du slider
pub const MAX_PERCENT: u8 = 100;

/// Poignée du slider
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handle {
    Start,
    End,
}

impl Handle {
    /// Passe à l'autre poignée
    pub fn other(self) -> Self {
        match self {
            Handle::Start => Handle::End,
            Handle::End => Handle::Start,
        }
    }
}

/// Fenêtre visible de l'axe, en pourcentages entiers
///
/// Invariant : 0 <= start <= end <= 100
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisibleRange {
    start: u8,
    end: u8,
}

impl VisibleRange {
    /// Crée une plage validée
    pub fn new(start: u8, end: u8) -> Result<Self, DashboardError> {
        if start > end || end > MAX_PERCENT {
            return Err(DashboardError::InvalidRange {
                start: start as i64,
                end: end as i64,
            });
        }
        Ok(Self { start, end })
    }

    /// Plage complète [0, 100]
    pub const fn full() -> Self {
        Self {
            start: 0,
            end: MAX_PERCENT,
        }
    }

    pub fn start(&self) -> u8 {
        self.start
    }

    pub fn end(&self) -> u8 {
        self.end
    }

    pub fn get(&self, handle: Handle) -> u8 {
        match handle {
            Handle::Start => self.start,
            Handle::End => self.end,
        }
    }

    /// Déplace une poignée de `delta` points
    ///
    /// La poignée est bornée à [0, 100] et ne croise jamais l'autre :
    /// start reste <= end.
    pub fn shift(&mut self, handle: Handle, delta: i16) {
        match handle {
            Handle::Start => {
                let moved = (self.start as i16).saturating_add(delta).clamp(0, self.end as i16);
                self.start = moved as u8;
            }
            Handle::End => {
                let moved = (self.end as i16).saturating_add(delta).clamp(self.start as i16, MAX_PERCENT as i16);
                self.end = moved as u8;
            }
        }
    }

    /// Bornes d'index demi-ouvertes [from, to) pour un axe de longueur `len`
    ///
    /// CONCEPT : Arithmétique entière
    /// - start * len / 100 == floor(start / 100 * len) sans erreur d'arrondi
    /// - to est borné à len (end = 100 donne endIndex = len, hors axe)
    /// - to >= from : une plage dégénérée donne une vue vide, pas un panic
    pub fn index_bounds(&self, len: usize) -> (usize, usize) {
        let start_index = self.start as usize * len / MAX_PERCENT as usize;
        let end_index = self.end as usize * len / MAX_PERCENT as usize;

        let from = start_index.min(len);
        let to = (end_index + 1).min(len).max(from);
        (from, to)
    }
}

impl Default for VisibleRange {
    fn default() -> Self {
        Self::full()
    }
}

impl fmt::Display for VisibleRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.start, self.end)
    }
}

/// Parse "START:END", utilisé par l'option --range
impl FromStr for VisibleRange {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (start, end) = s
            .split_once(':')
            .ok_or_else(|| DashboardError::Config(format!("range {s:?} must look like START:END")))?;

        let parse = |v: &str| {
            v.trim()
                .parse::<i64>()
                .map_err(|_| DashboardError::Config(format!("range bound {v:?} is not an integer")))
        };
        let (start, end) = (parse(start)?, parse(end)?);

        if !(0..=MAX_PERCENT as i64).contains(&start) || !(0..=MAX_PERCENT as i64).contains(&end) {
            return Err(DashboardError::InvalidRange { start, end });
        }
        Self::new(start as u8, end as u8)
    }
}

// ============================================================================
// FilteredView
// ============================================================================

/// Ce qui est réellement tracé : dates visibles et valeurs correspondantes
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilteredView {
    pub dates: Vec<NaiveDate>,
    pub datasets: Vec<ChartDataset>,
}

impl FilteredView {
    /// Vue vide (rien de chargé)
    pub fn empty() -> Self {
        Self::default()
    }

    /// Dérive la vue filtrée
    ///
    /// CONCEPT : Fonction pure
    /// - Prend des références, ne modifie rien
    /// - Mêmes entrées => même sortie (idempotence)
    pub fn derive(full: &FullDataset, range: VisibleRange) -> Self {
        let (from, to) = range.index_bounds(full.axis.len());

        Self {
            dates: full.axis.dates()[from..to].to_vec(),
            datasets: full
                .datasets
                .iter()
                // Un dataset plus court que l'axe ne doit pas faire paniquer le slice
                .map(|dataset| {
                    let end = to.min(dataset.values.len());
                    dataset.sliced(from.min(end), end)
                })
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn first_date(&self) -> Option<&NaiveDate> {
        self.dates.first()
    }

    pub fn last_date(&self) -> Option<&NaiveDate> {
        self.dates.last()
    }

    /// Position d'une date dans la vue (pour l'annotation)
    pub fn position_of(&self, date: &NaiveDate) -> Option<usize> {
        self.dates.iter().position(|d| d == date)
    }

    /// Min et max de toutes les valeurs visibles, toutes séries confondues
    pub fn price_bounds(&self) -> Option<(f64, f64)> {
        self.datasets
            .iter()
            .filter_map(ChartDataset::bounds)
            .reduce(|(min_a, max_a), (min_b, max_b)| (min_a.min(min_b), max_a.max(max_b)))
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================
