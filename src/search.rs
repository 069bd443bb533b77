// ============================================================================
// Contrôleur de recherche
// ============================================================================
// Gère la saisie du champ de recherche : debounce, annulation de la requête
// en cours, affichage/masquage des résultats et sélection
//
// Machine à états :
//
//   Idle ──saisie (len > 1)──> Debouncing ──300 ms de silence──> Searching
//                                   ^                                 │
//                                   └────────── nouvelle saisie ──────┤
//                                                                     v
//   ResultsHidden <──saisie (len <= 1) / blur + 200 ms── ResultsShown
//
// Garanties :
// - au plus une requête de recherche en cours
// - un résultat d'une requête remplacée n'est jamais affiché : toute nouvelle
//   frappe droppe (donc avorte) la requête en cours, son résultat devient
//   inobservable
// - la sélection gagne sur le masquage différé après perte de focus
//
// CONCEPTS RUST :
// 1. Option<Scheduled<_>> / Option<InFlight<_>> : l'annulation est visible
//    dans les types (remplacer ou vider le slot)
// 2. Temps injecté (now: Instant) : tests déterministes sans horloge réelle
// ============================================================================

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::runtime::Handle;
use tracing::{debug, info, warn};

use crate::api::MarketApi;
use crate::models::StockSummary;
use crate::task::{take_due, InFlight, Scheduled};

/// Longueur minimale d'une requête pour lancer une recherche
pub const MIN_QUERY_LEN: usize = 2;

/// État courant du contrôleur
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchPhase {
    /// Rien n'a encore été recherché
    Idle,
    /// Une recherche est planifiée, en attente de silence
    Debouncing,
    /// Une requête est en cours
    Searching,
    /// Les résultats (éventuellement vides) sont affichés
    ResultsShown,
    /// Les résultats sont masqués
    ResultsHidden,
}

/// Délais du contrôleur
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchSettings {
    /// Silence requis avant de lancer la recherche
    pub debounce: Duration,
    /// Délai de masquage après perte de focus
    pub hide_delay: Duration,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(300),
            hide_delay: Duration::from_millis(200),
        }
    }
}

/// Contrôleur de la recherche "as-you-type"
pub struct SearchController {
    api: Arc<dyn MarketApi>,
    runtime: Handle,
    settings: SearchSettings,

    query: String,
    results: Vec<StockSummary>,
    is_loading: bool,
    results_visible: bool,
    focused: bool,
    highlighted: usize,
    phase: SearchPhase,

    /// Recherche planifiée (payload : la requête à envoyer)
    pending_debounce: Option<Scheduled<String>>,
    /// Requête en cours
    in_flight: Option<InFlight<Vec<StockSummary>>>,
    /// Masquage planifié après perte de focus
    pending_hide: Option<Scheduled<()>>,
}

impl SearchController {
    /// Crée un contrôleur avec le champ de saisie focalisé
    pub fn new(api: Arc<dyn MarketApi>, runtime: Handle, settings: SearchSettings) -> Self {
        Self {
            api,
            runtime,
            settings,
            query: String::new(),
            results: Vec::new(),
            is_loading: false,
            results_visible: false,
            focused: true,
            highlighted: 0,
            phase: SearchPhase::Idle,
            pending_debounce: None,
            in_flight: None,
            pending_hide: None,
        }
    }

    // ========================================================================
    // Accesseurs
    // ========================================================================

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn results(&self) -> &[StockSummary] {
        &self.results
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn results_visible(&self) -> bool {
        self.results_visible
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    pub fn highlighted(&self) -> usize {
        self.highlighted
    }

    pub fn phase(&self) -> SearchPhase {
        self.phase
    }

    /// Vrai si une requête est en cours
    pub fn has_in_flight(&self) -> bool {
        self.in_flight.is_some()
    }

    // ========================================================================
    // Saisie
    // ========================================================================

    /// Remplace la requête (chaque frappe passe par ici)
    ///
    /// - len > 1 : (re)planifie la recherche, la dernière frappe gagne ; la
    ///   requête en cours porte sur une saisie dépassée, elle est abandonnée
    /// - len <= 1 : annule tout, vide et masque les résultats, aucune requête
    pub fn set_query(&mut self, query: impl Into<String>, now: Instant) {
        self.query = query.into();

        if self.query.chars().count() >= MIN_QUERY_LEN {
            self.pending_debounce = Some(Scheduled::after(now, self.settings.debounce, self.query.clone()));
            self.in_flight = None; // drop = abort
            self.is_loading = false;
            self.phase = SearchPhase::Debouncing;
        } else {
            self.pending_debounce = None;
            self.in_flight = None; // drop = abort
            self.results.clear();
            self.highlighted = 0;
            self.is_loading = false;
            self.results_visible = false;
            self.phase = SearchPhase::ResultsHidden;
        }
    }

    /// Ajoute un caractère à la requête
    pub fn push_char(&mut self, c: char, now: Instant) {
        let mut query = self.query.clone();
        query.push(c);
        self.set_query(query, now);
    }

    /// Supprime le dernier caractère de la requête
    pub fn pop_char(&mut self, now: Instant) {
        let mut query = self.query.clone();
        if query.pop().is_some() {
            self.set_query(query, now);
        }
    }

    // ========================================================================
    // Focus
    // ========================================================================

    /// Le champ gagne le focus : réaffiche les résultats s'il y en a
    pub fn focus(&mut self) {
        self.focused = true;
        self.pending_hide = None;

        if !self.results.is_empty() {
            self.results_visible = true;
            self.phase = SearchPhase::ResultsShown;
        }
    }

    /// Le champ perd le focus : masquage différé
    ///
    /// Le délai laisse une sélection (clic sur un résultat) s'enregistrer
    /// avant que la liste ne disparaisse.
    pub fn blur(&mut self, now: Instant) {
        self.focused = false;
        self.pending_hide = Some(Scheduled::after(now, self.settings.hide_delay, ()));
    }

    // ========================================================================
    // Boucle d'événements
    // ========================================================================

    /// Fait avancer la machine à états (appelé à chaque tick)
    ///
    /// Ordre : masquage dû, puis debounce dû, puis résultat de la requête.
    pub fn poll(&mut self, now: Instant) {
        if take_due(&mut self.pending_hide, now).is_some() {
            debug!("Hiding search results after blur");
            self.results_visible = false;
            self.phase = SearchPhase::ResultsHidden;
        }

        if let Some(query) = take_due(&mut self.pending_debounce, now) {
            self.start_search(query);
        }

        let Some(in_flight) = self.in_flight.as_mut() else {
            return;
        };

        let Some(outcome) = in_flight.try_result() else {
            return;
        };
        self.in_flight = None;

        match outcome {
            Ok(results) => {
                info!(query = %self.query, count = results.len(), "Search results received");
                self.results = results;
                self.show_results();
            }
            Err(e) => {
                // La tâche n'a rien renvoyé (panic) : on sort de l'état "Searching"
                warn!(query = %self.query, error = %e, "Search failed");
                self.results.clear();
                self.show_results();
            }
        }
    }

    /// Lance la requête, en remplaçant (donc en avortant) la précédente
    fn start_search(&mut self, query: String) {
        debug!(query = %query, superseded = self.in_flight.is_some(), "Debounce elapsed, searching");

        let api = Arc::clone(&self.api);
        self.in_flight = Some(InFlight::spawn(&self.runtime, async move {
            api.search_stocks(&query).await
        }));

        self.is_loading = true;
        self.phase = SearchPhase::Searching;
    }

    fn show_results(&mut self) {
        self.highlighted = 0;
        self.is_loading = false;
        self.results_visible = true;
        self.phase = SearchPhase::ResultsShown;
    }

    // ========================================================================
    // Sélection
    // ========================================================================

    /// Sélectionne le résultat `index` et retourne le symbole à ouvrir
    ///
    /// - possible seulement si les résultats sont visibles (un masquage
    ///   planifié mais pas encore appliqué ne bloque pas la sélection)
    /// - une entrée sans symbole n'est pas sélectionnable : None, rien ne change
    pub fn select(&mut self, index: usize) -> Option<String> {
        if !self.results_visible {
            return None;
        }

        let symbol = self.results.get(index)?.symbol.clone()?;
        info!(symbol = %symbol, "Search result selected");

        self.query.clear();
        self.results.clear();
        self.highlighted = 0;
        self.is_loading = false;
        self.results_visible = false;
        self.pending_debounce = None;
        self.pending_hide = None;
        self.in_flight = None;
        self.phase = SearchPhase::ResultsHidden;

        Some(symbol)
    }

    /// Sélectionne le résultat surligné
    pub fn select_highlighted(&mut self) -> Option<String> {
        self.select(self.highlighted)
    }

    /// Surligne le résultat suivant
    pub fn highlight_next(&mut self) {
        let max_index = self.results.len().saturating_sub(1);
        self.highlighted = (self.highlighted + 1).min(max_index);
    }

    /// Surligne le résultat précédent
    pub fn highlight_previous(&mut self) {
        self.highlighted = self.highlighted.saturating_sub(1);
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::FakeApi;

    fn controller(api: &Arc<FakeApi>) -> SearchController {
        let api: Arc<dyn MarketApi> = api.clone();
        SearchController::new(api, Handle::current(), SearchSettings::default())
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    /// Laisse tourner le runtime jusqu'à ce que la requête en cours soit traitée
    async fn settle(ctrl: &mut SearchController, now: Instant) {
        for _ in 0..200 {
            ctrl.poll(now);
            if !ctrl.has_in_flight() {
                return;
            }
            tokio::time::sleep(ms(1)).await;
        }
        panic!("search never settled");
    }

    /// Tape une chaîne caractère par caractère, `gap` entre chaque frappe
    fn type_text(ctrl: &mut SearchController, text: &str, start: Instant, gap: Duration) -> Instant {
        let mut now = start;
        for c in text.chars() {
            ctrl.push_char(c, now);
            ctrl.poll(now);
            now += gap;
        }
        now - gap
    }

    #[tokio::test]
    async fn test_short_query_never_requests() {
        let api = Arc::new(FakeApi::default());
        let mut ctrl = controller(&api);
        let t0 = Instant::now();

        ctrl.set_query("t", t0);
        ctrl.poll(t0 + ms(1000));
        ctrl.set_query("", t0 + ms(1000));
        ctrl.poll(t0 + ms(5000));
        tokio::time::sleep(ms(10)).await;

        assert!(api.search_calls().is_empty());
        assert_eq!(ctrl.phase(), SearchPhase::ResultsHidden);
        assert!(!ctrl.results_visible());
    }

    #[tokio::test]
    async fn test_fast_typing_issues_single_request() {
        let api = Arc::new(FakeApi::default().with_search("reli", &[Some("RELIANCE")]));
        let mut ctrl = controller(&api);
        let t0 = Instant::now();

        let last = type_text(&mut ctrl, "reli", t0, ms(100));
        assert_eq!(ctrl.phase(), SearchPhase::Debouncing);

        // Pas encore 300 ms de silence depuis la dernière frappe
        ctrl.poll(last + ms(299));
        assert!(!ctrl.is_loading());

        ctrl.poll(last + ms(300));
        assert!(ctrl.is_loading());
        assert_eq!(ctrl.phase(), SearchPhase::Searching);

        settle(&mut ctrl, last + ms(300)).await;

        assert_eq!(api.search_calls(), vec!["reli".to_string()]);
        assert_eq!(ctrl.phase(), SearchPhase::ResultsShown);
        assert_eq!(ctrl.results()[0].symbol.as_deref(), Some("RELIANCE"));
        assert!(!ctrl.is_loading());
    }

    #[tokio::test(start_paused = true)]
    async fn test_superseded_response_is_never_shown() {
        let api = Arc::new(
            FakeApi::default()
                .with_search("ta", &[Some("TATA_OLD")])
                .with_search_delay("ta", ms(500))
                .with_search("tat", &[Some("TATASTEEL")]),
        );
        let mut ctrl = controller(&api);
        let t0 = Instant::now();

        ctrl.set_query("ta", t0);
        ctrl.poll(t0 + ms(300)); // "ta" part, lente
        assert!(ctrl.has_in_flight());
        tokio::time::sleep(ms(10)).await;

        ctrl.set_query("tat", t0 + ms(310));
        ctrl.poll(t0 + ms(610)); // "tat" remplace "ta"

        settle(&mut ctrl, t0 + ms(610)).await;
        assert_eq!(ctrl.results()[0].symbol.as_deref(), Some("TATASTEEL"));

        // Largement après la fin prévue de "ta" : toujours les résultats de "tat"
        tokio::time::sleep(ms(2000)).await;
        ctrl.poll(t0 + ms(5000));
        assert_eq!(ctrl.results().len(), 1);
        assert_eq!(ctrl.results()[0].symbol.as_deref(), Some("TATASTEEL"));
        assert_eq!(api.search_calls(), vec!["ta".to_string(), "tat".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_result_landing_during_debounce_is_dropped() {
        let api = Arc::new(
            FakeApi::default()
                .with_search("ta", &[Some("TATA_OLD")])
                .with_search_delay("ta", ms(100))
                .with_search("tat", &[Some("TATASTEEL")]),
        );
        let mut ctrl = controller(&api);
        let t0 = Instant::now();

        ctrl.set_query("ta", t0);
        ctrl.poll(t0 + ms(300));
        assert!(ctrl.is_loading());

        // Nouvelle frappe pendant que "ta" est en cours
        ctrl.set_query("tat", t0 + ms(310));
        assert!(!ctrl.has_in_flight());
        assert!(!ctrl.is_loading());

        // "ta" aurait répondu ici, le debounce de "tat" n'est pas encore dû
        tokio::time::sleep(ms(200)).await;
        ctrl.poll(t0 + ms(400));
        assert_eq!(ctrl.phase(), SearchPhase::Debouncing);
        assert!(ctrl.results().is_empty());
        assert!(!ctrl.results_visible());

        ctrl.poll(t0 + ms(610));
        assert_eq!(ctrl.phase(), SearchPhase::Searching);
        settle(&mut ctrl, t0 + ms(610)).await;

        assert_eq!(ctrl.phase(), SearchPhase::ResultsShown);
        assert_eq!(ctrl.results().len(), 1);
        assert_eq!(ctrl.results()[0].symbol.as_deref(), Some("TATASTEEL"));
    }

    #[tokio::test]
    async fn test_crashed_search_task_clears_loading() {
        let api = Arc::new(FakeApi::default().with_crashing_search());
        let mut ctrl = controller(&api);
        let t0 = Instant::now();

        ctrl.set_query("tcs", t0);
        ctrl.poll(t0 + ms(300));
        settle(&mut ctrl, t0 + ms(300)).await;

        assert!(!ctrl.is_loading());
        assert!(ctrl.results().is_empty());
        assert!(ctrl.results_visible());
        assert_eq!(ctrl.phase(), SearchPhase::ResultsShown);
    }

    #[tokio::test(start_paused = true)]
    async fn test_clearing_query_drops_in_flight_result() {
        let api = Arc::new(
            FakeApi::default()
                .with_search("in", &[Some("INFY")])
                .with_search_delay("in", ms(500)),
        );
        let mut ctrl = controller(&api);
        let t0 = Instant::now();

        ctrl.set_query("in", t0);
        ctrl.poll(t0 + ms(300));
        ctrl.set_query("i", t0 + ms(350));

        tokio::time::sleep(ms(2000)).await;
        ctrl.poll(t0 + ms(3000));

        assert!(ctrl.results().is_empty());
        assert!(!ctrl.results_visible());
        assert!(!ctrl.is_loading());
    }

    #[tokio::test]
    async fn test_empty_results_are_shown() {
        let api = Arc::new(FakeApi::default());
        let mut ctrl = controller(&api);
        let t0 = Instant::now();

        ctrl.set_query("zzzz", t0);
        ctrl.poll(t0 + ms(300));
        settle(&mut ctrl, t0 + ms(300)).await;

        assert!(ctrl.results().is_empty());
        assert!(ctrl.results_visible());
        assert_eq!(ctrl.phase(), SearchPhase::ResultsShown);
    }

    #[tokio::test]
    async fn test_failure_shows_no_results() {
        let api = Arc::new(FakeApi::default().with_failing_search());
        let mut ctrl = controller(&api);
        let t0 = Instant::now();

        ctrl.set_query("tcs", t0);
        ctrl.poll(t0 + ms(300));
        settle(&mut ctrl, t0 + ms(300)).await;

        assert!(ctrl.results().is_empty());
        assert!(ctrl.results_visible());
        assert!(!ctrl.is_loading());
    }

    #[tokio::test]
    async fn test_blur_hides_after_delay_and_focus_restores() {
        let api = Arc::new(FakeApi::default().with_search("tcs", &[Some("TCS")]));
        let mut ctrl = controller(&api);
        let t0 = Instant::now();

        ctrl.set_query("tcs", t0);
        ctrl.poll(t0 + ms(300));
        settle(&mut ctrl, t0 + ms(300)).await;
        assert!(ctrl.results_visible());

        let t1 = t0 + ms(1000);
        ctrl.blur(t1);
        ctrl.poll(t1 + ms(199));
        assert!(ctrl.results_visible());
        ctrl.poll(t1 + ms(200));
        assert!(!ctrl.results_visible());
        assert_eq!(ctrl.phase(), SearchPhase::ResultsHidden);

        ctrl.focus();
        assert!(ctrl.results_visible());
        assert_eq!(ctrl.phase(), SearchPhase::ResultsShown);
    }

    #[tokio::test]
    async fn test_selection_wins_over_blur() {
        let api = Arc::new(FakeApi::default().with_search("tcs", &[Some("TCS"), Some("TCI")]));
        let mut ctrl = controller(&api);
        let t0 = Instant::now();

        ctrl.set_query("tcs", t0);
        ctrl.poll(t0 + ms(300));
        settle(&mut ctrl, t0 + ms(300)).await;

        // Clic sur un résultat : le blur arrive d'abord, puis la sélection
        let t1 = t0 + ms(1000);
        ctrl.blur(t1);
        ctrl.poll(t1 + ms(50));
        let selected = ctrl.select(1);

        assert_eq!(selected.as_deref(), Some("TCI"));
        assert_eq!(ctrl.query(), "");
        assert!(!ctrl.results_visible());

        // Le masquage planifié ne fait plus rien d'inattendu
        ctrl.poll(t1 + ms(500));
        assert!(ctrl.results().is_empty());
    }

    #[tokio::test]
    async fn test_null_symbol_is_not_selectable() {
        let api = Arc::new(FakeApi::default().with_search("nifty", &[None, Some("NIFTYBEES")]));
        let mut ctrl = controller(&api);
        let t0 = Instant::now();

        ctrl.set_query("nifty", t0);
        ctrl.poll(t0 + ms(300));
        settle(&mut ctrl, t0 + ms(300)).await;

        assert_eq!(ctrl.select(0), None);
        assert_eq!(ctrl.query(), "nifty");
        assert!(ctrl.results_visible());
        assert_eq!(ctrl.results().len(), 2);

        ctrl.highlight_next();
        assert_eq!(ctrl.select_highlighted().as_deref(), Some("NIFTYBEES"));
    }

    #[tokio::test]
    async fn test_select_requires_visible_results() {
        let api = Arc::new(FakeApi::default().with_search("tcs", &[Some("TCS")]));
        let mut ctrl = controller(&api);
        let t0 = Instant::now();

        ctrl.set_query("tcs", t0);
        ctrl.poll(t0 + ms(300));
        settle(&mut ctrl, t0 + ms(300)).await;

        ctrl.blur(t0 + ms(400));
        ctrl.poll(t0 + ms(700));

        assert_eq!(ctrl.select(0), None);
    }

    #[tokio::test]
    async fn test_highlight_bounds() {
        let api = Arc::new(FakeApi::default().with_search("hd", &[Some("HDFC"), Some("HDFCBANK")]));
        let mut ctrl = controller(&api);
        let t0 = Instant::now();

        ctrl.set_query("hd", t0);
        ctrl.poll(t0 + ms(300));
        settle(&mut ctrl, t0 + ms(300)).await;

        ctrl.highlight_previous();
        assert_eq!(ctrl.highlighted(), 0);
        ctrl.highlight_next();
        ctrl.highlight_next();
        assert_eq!(ctrl.highlighted(), 1);
    }

    #[tokio::test]
    async fn test_backspace_below_min_length_clears() {
        let api = Arc::new(FakeApi::default().with_search("tc", &[Some("TCS")]));
        let mut ctrl = controller(&api);
        let t0 = Instant::now();

        ctrl.set_query("tc", t0);
        ctrl.poll(t0 + ms(300));
        settle(&mut ctrl, t0 + ms(300)).await;
        assert_eq!(ctrl.results().len(), 1);

        ctrl.pop_char(t0 + ms(400));
        assert_eq!(ctrl.query(), "t");
        assert!(ctrl.results().is_empty());
        assert!(!ctrl.results_visible());
    }
}
