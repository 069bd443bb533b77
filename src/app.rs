// ============================================================================
// Structure : App
// ============================================================================
// Gère l'état global de l'application TUI
//
// CONCEPTS RUST :
// 1. State Management : centraliser l'état dans une seule structure
// 2. Composition : App possède les contrôleurs (recherche, détail, bandeau)
// 3. Drop : fermer la page détail avorte ses requêtes en cours
//
// PATTERN : Cette structure suit le pattern "Application State"
// - Tous les composants de l'UI lisent depuis App
// - Toutes les modifications passent par les méthodes de App
// ============================================================================

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::runtime::Handle;
use tracing::{debug, error, info};

use crate::api::MarketApi;
use crate::detail::StockDetail;
use crate::favorites::{Favorites, KeyValueStore};
use crate::feed::{FeedUpdate, TickerFeed};
use crate::search::{SearchController, SearchSettings};

/// Délai entre deux décalages du bandeau défilant
pub const MARQUEE_STEP: Duration = Duration::from_millis(150);

/// Store des favoris tel que possédé par App
pub type FavoritesStore = Box<dyn KeyValueStore + Send>;

// ============================================================================
// Enum : Screen
// ============================================================================
// CONCEPT RUST : Enums pour state machines
// - Un seul écran actif à la fois
// - Detail porte le symbole affiché
// ============================================================================

/// Écrans de l'application
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    /// Accueil : bandeau, recherche, top movers
    Home,

    /// Page détail d'un titre
    Detail(String),
}

/// État principal de l'application
pub struct App {
    /// Indique si l'application doit continuer à tourner
    pub running: bool,

    /// Écran actuellement affiché
    pub current_screen: Screen,

    /// Two-step quit : première pression de 'q' = confirmation demandée
    pub confirm_quit: bool,

    /// Recherche "as-you-type" de l'accueil
    pub search: SearchController,

    /// Movers affichés dans le bandeau
    pub feed: TickerFeed,

    /// Page détail ouverte (None sur l'accueil)
    pub detail: Option<StockDetail>,

    /// Décalage courant du bandeau défilant
    pub marquee_offset: usize,

    /// Message transitoire affiché dans le footer (ex: erreur d'écriture)
    pub status_message: Option<String>,

    favorites: Favorites<FavoritesStore>,
    api: Arc<dyn MarketApi>,
    runtime: Handle,
    last_scroll: Option<Instant>,
}

impl App {
    /// Crée l'application sur l'écran d'accueil
    pub fn new(
        api: Arc<dyn MarketApi>,
        runtime: Handle,
        store: FavoritesStore,
        settings: SearchSettings,
    ) -> Self {
        Self {
            running: true,
            current_screen: Screen::Home,
            confirm_quit: false,
            search: SearchController::new(Arc::clone(&api), runtime.clone(), settings),
            feed: TickerFeed::new(),
            detail: None,
            marquee_offset: 0,
            status_message: None,
            favorites: Favorites::new(store),
            api,
            runtime,
            last_scroll: None,
        }
    }

    // ========================================================================
    // Cycle de vie
    // ========================================================================

    pub fn quit(&mut self) {
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn request_quit(&mut self) {
        self.confirm_quit = true;
    }

    pub fn cancel_quit(&mut self) {
        self.confirm_quit = false;
    }

    pub fn is_awaiting_quit_confirmation(&self) -> bool {
        self.confirm_quit
    }

    /// Tick : fait avancer les contrôleurs et le bandeau
    ///
    /// CONCEPT : Event Loop Pattern
    /// - appelé à chaque itération de la boucle, avec l'instant courant
    /// - les résultats des requêtes sont appliqués ici, jamais ailleurs
    pub fn tick(&mut self, now: Instant) {
        self.search.poll(now);

        if let Some(detail) = self.detail.as_mut() {
            if detail.poll() {
                // L'indicateur suit le symbole résolu, comme la bascule
                let is_favorite = self.favorites.contains(detail.resolved_symbol());
                detail.set_favorite(is_favorite);
            }
        }

        match self.last_scroll {
            Some(last) if now.duration_since(last) < MARQUEE_STEP => {}
            _ => {
                self.marquee_offset = self.marquee_offset.wrapping_add(1);
                self.last_scroll = Some(now);
            }
        }
    }

    /// Remplace la liste du bandeau
    pub fn apply_feed(&mut self, update: FeedUpdate) {
        debug!(count = update.entries.len(), "Applying movers feed update");
        self.feed.apply(update);
    }

    // ========================================================================
    // Navigation
    // ========================================================================

    pub fn is_on_home(&self) -> bool {
        self.current_screen == Screen::Home
    }

    pub fn is_on_detail(&self) -> bool {
        matches!(self.current_screen, Screen::Detail(_))
    }

    /// Ouvre la page détail de `symbol`
    pub fn open_detail(&mut self, symbol: String) {
        info!(symbol = %symbol, "Navigating to stock detail");

        let is_favorite = self.favorites.contains(&symbol);
        self.detail = Some(StockDetail::open(
            Arc::clone(&self.api),
            self.runtime.clone(),
            symbol.clone(),
            is_favorite,
        ));
        self.current_screen = Screen::Detail(symbol);
        self.status_message = None;
    }

    /// Sélectionne le résultat `index` de la recherche et ouvre sa page
    pub fn select_result(&mut self, index: usize) {
        if let Some(symbol) = self.search.select(index) {
            self.open_detail(symbol);
        }
    }

    /// Sélectionne le résultat surligné
    pub fn select_highlighted(&mut self) {
        if let Some(symbol) = self.search.select_highlighted() {
            self.open_detail(symbol);
        }
    }

    /// Retour à l'accueil (les requêtes de la page détail sont avortées)
    pub fn back_home(&mut self) {
        debug!("Returning to home screen");
        self.detail = None;
        self.current_screen = Screen::Home;
        self.status_message = None;
    }

    // ========================================================================
    // Favoris
    // ========================================================================

    pub fn favorites(&self) -> Vec<String> {
        self.favorites.list()
    }

    /// Bascule le favori du titre affiché
    ///
    /// Une erreur d'écriture est loggée et signalée dans le footer ;
    /// l'indicateur reste inchangé.
    pub fn toggle_favorite(&mut self) {
        let Some(detail) = self.detail.as_mut() else {
            return;
        };

        let symbol = detail.resolved_symbol().to_string();

        match self.favorites.toggle(&symbol) {
            Ok(is_favorite) => {
                detail.set_favorite(is_favorite);
                self.status_message = None;
            }
            Err(e) => {
                error!(symbol = %symbol, error = ?e, "Failed to save favorites");
                self.status_message = Some(format!("Could not save favorites: {}", e));
            }
        }
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================
