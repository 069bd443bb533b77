// ============================================================================
// Contrôleur de la page détail d'un titre
// ============================================================================
// Chargement initial : fiche du titre (via la recherche) + 30 jours de prix
// quotidiens. Changement de plage : nouvelle requête, sauf retour à la plage
// par défaut (1M) qui réaffiche la série initiale sans requête.
//
// CONCEPTS RUST :
// 1. Option<InFlight<_>> : une seule requête de plage à la fois, remplacer le
//    slot avorte la précédente
// 2. let-else : sortie anticipée quand rien n'est prêt
// ============================================================================

use std::sync::Arc;

use tokio::runtime::Handle;
use tracing::{debug, info, warn};

use crate::api::MarketApi;
use crate::models::{PricePoint, StockSummary, TimeRange};
use crate::task::InFlight;

/// État du chargement initial
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailPhase {
    Loading,
    Ready,
    NotFound,
}

/// Résultat du chargement initial
type Loaded = Option<(StockSummary, Vec<PricePoint>)>;

/// Page détail d'un titre
pub struct StockDetail {
    api: Arc<dyn MarketApi>,
    runtime: Handle,

    symbol: String,
    phase: DetailPhase,
    stock: Option<StockSummary>,
    is_favorite: bool,

    range: TimeRange,
    /// Série affichée
    prices: Vec<PricePoint>,
    /// Série de la plage par défaut, chargée à l'ouverture
    initial_prices: Vec<PricePoint>,

    initial_load: Option<InFlight<Loaded>>,
    range_fetch: Option<InFlight<Vec<PricePoint>>>,
}

impl StockDetail {
    /// Ouvre la page et lance le chargement initial
    pub fn open(api: Arc<dyn MarketApi>, runtime: Handle, symbol: impl Into<String>, is_favorite: bool) -> Self {
        let symbol = symbol.into();
        info!(symbol = %symbol, "Opening stock detail");

        let initial_load = InFlight::spawn(&runtime, load_stock(Arc::clone(&api), symbol.clone()));

        Self {
            api,
            runtime,
            symbol,
            phase: DetailPhase::Loading,
            stock: None,
            is_favorite,
            range: TimeRange::default(),
            prices: Vec::new(),
            initial_prices: Vec::new(),
            initial_load: Some(initial_load),
            range_fetch: None,
        }
    }

    // ========================================================================
    // Accesseurs
    // ========================================================================

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn phase(&self) -> DetailPhase {
        self.phase
    }

    pub fn stock(&self) -> Option<&StockSummary> {
        self.stock.as_ref()
    }

    pub fn is_favorite(&self) -> bool {
        self.is_favorite
    }

    pub fn set_favorite(&mut self, is_favorite: bool) {
        self.is_favorite = is_favorite;
    }

    pub fn range(&self) -> TimeRange {
        self.range
    }

    pub fn prices(&self) -> &[PricePoint] {
        &self.prices
    }

    /// Vrai pendant le chargement d'une plage autre que celle par défaut
    pub fn chart_loading(&self) -> bool {
        self.range_fetch.is_some()
    }

    /// Dernier point de la série affichée
    pub fn latest(&self) -> Option<&PricePoint> {
        self.prices.last()
    }

    /// Variation du dernier point (close - open)
    pub fn day_change(&self) -> Option<f64> {
        self.latest().map(PricePoint::change_from_open)
    }

    // ========================================================================
    // Plages
    // ========================================================================

    /// Change la plage affichée
    pub fn set_range(&mut self, range: TimeRange) {
        if range == self.range {
            return;
        }
        debug!(symbol = %self.symbol, from = self.range.label(), to = range.label(), "Changing range");
        self.range = range;

        if range.is_default() {
            // Série initiale déjà en mémoire
            self.range_fetch = None;
            self.prices = self.initial_prices.clone();
            return;
        }

        let api = Arc::clone(&self.api);
        let symbol = self.resolved_symbol().to_string();
        let query = range.query();
        self.range_fetch = Some(InFlight::spawn(&self.runtime, async move {
            api.stock_prices(&symbol, query).await
        }));
    }

    pub fn next_range(&mut self) {
        self.set_range(self.range.next());
    }

    pub fn previous_range(&mut self) {
        self.set_range(self.range.previous());
    }

    /// Symbole de la fiche chargée, sinon celui de la route
    ///
    /// Sert aux requêtes de prix et aux favoris.
    pub fn resolved_symbol(&self) -> &str {
        self.stock
            .as_ref()
            .and_then(|stock| stock.symbol.as_deref())
            .unwrap_or(&self.symbol)
    }

    // ========================================================================
    // Poll
    // ========================================================================

    /// Applique les résultats arrivés (appelé à chaque tick)
    ///
    /// Retourne true quand la fiche vient d'être chargée : le symbole résolu
    /// peut différer de celui de la route, l'appelant rafraîchit le favori.
    pub fn poll(&mut self) -> bool {
        let loaded = self.poll_initial_load();
        self.poll_range_fetch();
        loaded
    }

    fn poll_initial_load(&mut self) -> bool {
        let Some(outcome) = self.initial_load.as_mut().and_then(InFlight::try_result) else {
            return false;
        };
        self.initial_load = None;

        match outcome {
            Ok(Some((stock, prices))) => {
                info!(symbol = %self.symbol, points = prices.len(), "Stock detail loaded");
                self.stock = Some(stock);
                self.initial_prices = prices;
                if self.range.is_default() {
                    self.prices = self.initial_prices.clone();
                }
                self.phase = DetailPhase::Ready;
                true
            }
            Ok(None) => {
                warn!(symbol = %self.symbol, "Stock not found");
                self.phase = DetailPhase::NotFound;
                false
            }
            Err(e) => {
                warn!(symbol = %self.symbol, error = %e, "Stock detail load failed");
                self.phase = DetailPhase::NotFound;
                false
            }
        }
    }

    fn poll_range_fetch(&mut self) {
        let Some(outcome) = self.range_fetch.as_mut().and_then(InFlight::try_result) else {
            return;
        };
        self.range_fetch = None;

        match outcome {
            Ok(prices) => {
                debug!(symbol = %self.symbol, range = self.range.label(), points = prices.len(), "Range prices received");
                self.prices = prices;
            }
            Err(e) => {
                warn!(symbol = %self.symbol, error = %e, "Range fetch failed");
                self.prices.clear();
            }
        }
    }
}

/// Fiche du titre (première entrée de la recherche) + série par défaut
///
/// None si la recherche est vide ou si la première entrée n'a pas de symbole.
async fn load_stock(api: Arc<dyn MarketApi>, symbol: String) -> Loaded {
    let stock = api.search_stocks(&symbol).await.into_iter().next()?;
    let stock_symbol = stock.symbol.clone()?;
    let prices = api.stock_prices(&stock_symbol, TimeRange::default().query()).await;
    Some((stock, prices))
}

// ============================================================================
// Tests
// ============================================================================
