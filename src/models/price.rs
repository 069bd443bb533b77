// ============================================================================
// Structure : PricePoint (+ Granularity, TimeRange, PriceQuery)
// ============================================================================
// Représente un point de la série de prix d'un titre
//
// CONCEPTS RUST :
// 1. Enums Copy : Granularity et TimeRange sont de simples étiquettes
// 2. f64 : les prix et volumes arrivent comme nombres JSON quelconques
// 3. chrono : parsing tolérant des timestamps de l'API
// ============================================================================

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Résolution temporelle d'une série de prix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Granularity {
    /// Une barre par jour
    Daily,
    /// Échantillons intra-journaliers
    Intraday,
}

impl Granularity {
    /// Valeur du paramètre `type` attendue par l'API
    pub fn as_query_value(&self) -> &'static str {
        match self {
            Granularity::Daily => "DAILY",
            Granularity::Intraday => "INTRADAY",
        }
    }
}

/// Paramètres d'une requête de prix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceQuery {
    /// Nombre de jours demandés
    pub days: u32,
    /// Résolution demandée
    pub granularity: Granularity,
    /// Nombre maximum de points (paramètre optionnel `limit`)
    pub limit: Option<u32>,
}

impl PriceQuery {
    pub fn new(days: u32, granularity: Granularity) -> Self {
        Self {
            days,
            granularity,
            limit: None,
        }
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Plage de temps sélectionnable dans la vue détail
///
/// CONCEPT : Label UI → paramètres de requête
/// - 1D implique une granularité intraday
/// - toutes les autres plages sont en daily
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeRange {
    OneDay,
    OneWeek,
    #[default]
    OneMonth,
    ThreeMonths,
}

impl TimeRange {
    /// Toutes les plages, dans l'ordre d'affichage
    pub const ALL: [TimeRange; 4] = [
        TimeRange::OneDay,
        TimeRange::OneWeek,
        TimeRange::OneMonth,
        TimeRange::ThreeMonths,
    ];

    /// Label court pour l'affichage
    pub fn label(&self) -> &'static str {
        match self {
            TimeRange::OneDay => "1D",
            TimeRange::OneWeek => "1W",
            TimeRange::OneMonth => "1M",
            TimeRange::ThreeMonths => "3M",
        }
    }

    /// Paramètres de requête correspondant à la plage
    pub fn query(&self) -> PriceQuery {
        match self {
            TimeRange::OneDay => PriceQuery::new(1, Granularity::Intraday),
            TimeRange::OneWeek => PriceQuery::new(7, Granularity::Daily),
            TimeRange::OneMonth => PriceQuery::new(30, Granularity::Daily),
            TimeRange::ThreeMonths => PriceQuery::new(90, Granularity::Daily),
        }
    }

    /// Vrai pour la plage chargée à l'ouverture de la vue détail
    pub fn is_default(&self) -> bool {
        *self == TimeRange::default()
    }

    /// Plage suivante (cycle)
    pub fn next(&self) -> TimeRange {
        match self {
            TimeRange::OneDay => TimeRange::OneWeek,
            TimeRange::OneWeek => TimeRange::OneMonth,
            TimeRange::OneMonth => TimeRange::ThreeMonths,
            TimeRange::ThreeMonths => TimeRange::OneDay, // Boucle
        }
    }

    /// Plage précédente (cycle)
    pub fn previous(&self) -> TimeRange {
        match self {
            TimeRange::OneDay => TimeRange::ThreeMonths, // Boucle
            TimeRange::OneWeek => TimeRange::OneDay,
            TimeRange::OneMonth => TimeRange::OneWeek,
            TimeRange::ThreeMonths => TimeRange::OneMonth,
        }
    }

    /// Plage à partir d'un chiffre 1..=4 (raccourcis clavier)
    pub fn from_digit(digit: char) -> Option<TimeRange> {
        let index = digit.to_digit(10)? as usize;
        index.checked_sub(1).and_then(|i| Self::ALL.get(i).copied())
    }
}

/// Un point de prix (une barre daily ou un échantillon intraday)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    /// Timestamp tel que fourni par l'API
    pub timestamp: String,

    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,

    /// Clôture de la séance précédente
    pub prev_close: f64,

    /// Variation absolue
    pub change_abs: f64,

    /// Variation en pourcentage
    pub change_percent: f64,

    /// Valeur échangée
    pub traded_value: f64,
}

impl PricePoint {
    /// Point minimal (OHLC + volume), les autres champs à zéro
    pub fn new(timestamp: impl Into<String>, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Self {
        Self {
            timestamp: timestamp.into(),
            open,
            high,
            low,
            close,
            volume,
            prev_close: 0.0,
            change_abs: 0.0,
            change_percent: 0.0,
            traded_value: 0.0,
        }
    }

    /// Variation depuis l'ouverture (close - open)
    pub fn change_from_open(&self) -> f64 {
        self.close - self.open
    }

    /// Parse le timestamp, quel que soit le format renvoyé par l'API
    ///
    /// Formats acceptés : RFC 3339, "YYYY-MM-DD HH:MM:SS",
    /// "YYYY-MM-DDTHH:MM:SS" et "YYYY-MM-DD".
    pub fn parsed_time(&self) -> Option<NaiveDateTime> {
        let raw = self.timestamp.trim();

        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.naive_local());
        }

        for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
            if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
                return Some(dt);
            }
        }

        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
    }
}
