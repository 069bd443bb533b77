// ============================================================================
// Normalisation des réponses de l'API
// ============================================================================
// L'API de marché ne renvoie pas toujours la même forme de JSON :
// - la recherche renvoie soit un tableau, soit un objet qui enveloppe le
//   tableau sous une clé conventionnelle
// - les champs numériques peuvent manquer ou valoir null
//
// Ce module transforme un serde_json::Value brut en types fixes
// (StockSummary, PricePoint, MoversSnapshot) sans jamais paniquer.
//
// CONCEPT RUST : serde_json::Value
// - Représentation dynamique du JSON (Null, Bool, Number, String, Array, Object)
// - Permet d'essayer plusieurs formes avant de choisir
// ============================================================================

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::ApiError;
use crate::models::{MoverEntry, MoversSnapshot, PricePoint, StockSummary};

// ============================================================================
// Recherche : stratégies d'extraction ordonnées
// ============================================================================

/// Forme possible d'une réponse de recherche
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchShape {
    /// `[ {...}, {...} ]`
    BareArray,
    /// `{ "<clé>": [ {...}, {...} ] }`
    Wrapped(&'static str),
}

/// Formes essayées dans l'ordre, la première qui correspond gagne
pub const SEARCH_SHAPES: [SearchShape; 4] = [
    SearchShape::BareArray,
    SearchShape::Wrapped("data"),
    SearchShape::Wrapped("results"),
    SearchShape::Wrapped("stocks"),
];

impl SearchShape {
    /// Extrait le tableau de résultats si la réponse a cette forme
    pub fn extract<'a>(&self, body: &'a Value) -> Option<&'a Vec<Value>> {
        match self {
            SearchShape::BareArray => body.as_array(),
            SearchShape::Wrapped(key) => body.get(*key)?.as_array(),
        }
    }
}

/// Normalise une réponse de recherche en liste de StockSummary
///
/// Aucune forme reconnue : liste vide + warning (jamais d'erreur).
pub fn search_results(body: &Value) -> Vec<StockSummary> {
    let Some((shape, items)) = SEARCH_SHAPES
        .iter()
        .find_map(|shape| shape.extract(body).map(|items| (shape, items)))
    else {
        warn!(body = %truncate_for_log(body), "Unrecognized search response shape, treating as empty");
        return Vec::new();
    };

    let results: Vec<StockSummary> = items.iter().filter_map(stock_summary).collect();

    if results.len() < items.len() {
        warn!(
            skipped = items.len() - results.len(),
            total = items.len(),
            "Skipped search items that are not objects"
        );
    }

    debug!(?shape, count = results.len(), "Normalized search response");
    results
}

/// Convertit un élément de recherche en StockSummary
///
/// - `symbol` : chaîne non vide, sinon absent
/// - `company` : champ "company", sinon "name", sinon chaîne vide
/// - `kind` : champ "type", sinon "stock"
fn stock_summary(item: &Value) -> Option<StockSummary> {
    let object = item.as_object()?;

    let text = |key: &str| {
        object
            .get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
    };

    let symbol = text("symbol").map(str::to_string);
    let company = text("company").or_else(|| text("name")).unwrap_or_default();
    let mut summary = StockSummary::new(symbol, company);

    if let Some(kind) = text("type") {
        summary = summary.with_kind(kind);
    }

    Some(summary)
}

// ============================================================================
// Séries de prix
// ============================================================================

/// Point de prix tel que renvoyé par l'API (tous les champs optionnels)
#[derive(Debug, Deserialize)]
struct RawPricePoint {
    #[serde(default, alias = "timestamp", alias = "time")]
    date: Option<String>,
    #[serde(default)]
    open: Option<f64>,
    #[serde(default)]
    high: Option<f64>,
    #[serde(default)]
    low: Option<f64>,
    #[serde(default)]
    close: Option<f64>,
    #[serde(default)]
    volume: Option<f64>,
    #[serde(default)]
    prev_close: Option<f64>,
    #[serde(default)]
    change: Option<f64>,
    #[serde(default)]
    percent: Option<f64>,
    #[serde(default)]
    value: Option<f64>,
}

impl From<RawPricePoint> for PricePoint {
    fn from(raw: RawPricePoint) -> Self {
        Self {
            timestamp: raw.date.unwrap_or_default(),
            open: raw.open.unwrap_or(0.0),
            high: raw.high.unwrap_or(0.0),
            low: raw.low.unwrap_or(0.0),
            close: raw.close.unwrap_or(0.0),
            volume: raw.volume.unwrap_or(0.0),
            prev_close: raw.prev_close.unwrap_or(0.0),
            change_abs: raw.change.unwrap_or(0.0),
            change_percent: raw.percent.unwrap_or(0.0),
            traded_value: raw.value.unwrap_or(0.0),
        }
    }
}

/// Normalise une réponse de prix (tableau uniquement)
///
/// Les éléments illisibles sont ignorés (avec un warning), l'ordre de l'API
/// est conservé tel quel : trous et doublons de timestamps sont tolérés.
pub fn price_points(body: &Value) -> Result<Vec<PricePoint>, ApiError> {
    let items = body
        .as_array()
        .ok_or_else(|| ApiError::Parse(format!("expected a price array, got {}", kind_of(body))))?;

    let points: Vec<PricePoint> = items
        .iter()
        .filter_map(|item| RawPricePoint::deserialize(item).ok())
        .map(PricePoint::from)
        .collect();

    if points.len() < items.len() {
        warn!(
            skipped = items.len() - points.len(),
            total = items.len(),
            "Skipped unreadable price points"
        );
    }

    Ok(points)
}

// ============================================================================
// Movers
// ============================================================================

/// Normalise la réponse de l'endpoint movers
///
/// Chaque liste est lue entrée par entrée : une entrée invalide est ignorée
/// sans perdre le reste de la photographie.
pub fn movers_snapshot(body: &Value) -> Result<MoversSnapshot, ApiError> {
    if !body.is_object() {
        return Err(ApiError::Parse(format!("expected a movers object, got {}", kind_of(body))));
    }

    let count = |key: &str| body.get(key).and_then(Value::as_u64);
    let text = |key: &str| body.get(key).and_then(Value::as_str).map(str::to_string);

    Ok(MoversSnapshot {
        gainers: mover_list(body, &["gainers"]),
        losers: mover_list(body, &["losers"]),
        volume_movers: mover_list(body, &["volume_movers", "volumeMovers"]),
        total_count: count("total_count"),
        gainers_count: count("gainers_count"),
        losers_count: count("losers_count"),
        index_name: text("index_name"),
        exchange: text("exchange"),
    })
}

/// Lit une liste de movers sous la première clé présente
fn mover_list(body: &Value, keys: &[&str]) -> Vec<MoverEntry> {
    let Some(items) = keys.iter().find_map(|key| body.get(*key)?.as_array()) else {
        return Vec::new();
    };

    let entries: Vec<MoverEntry> = items
        .iter()
        .filter_map(|item| MoverEntry::deserialize(item).ok())
        .filter(|entry| !entry.symbol.is_empty())
        .collect();

    if entries.len() < items.len() {
        warn!(
            list = keys[0],
            skipped = items.len() - entries.len(),
            total = items.len(),
            "Skipped unreadable mover entries"
        );
    }

    entries
}

// ============================================================================
// Helpers
// ============================================================================

/// Nom du type JSON, pour les messages d'erreur
fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Aperçu court d'une réponse pour les logs
fn truncate_for_log(value: &Value) -> String {
    let text = value.to_string();
    if text.chars().count() <= 200 {
        text
    } else {
        let head: String = text.chars().take(199).collect();
        format!("{}…", head)
    }
}

// ============================================================================
// Tests
// ============================================================================
