// ============================================================================
// Outils de test partagés
// ============================================================================
// FakeApi : implémentation scriptée de MarketApi
// - enregistre chaque appel (pour vérifier ce qui a été demandé)
// - répond selon des réponses préparées, avec délai ou échec optionnels
// ============================================================================

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::api::MarketApi;
use crate::error::ApiError;
use crate::models::{MoversSnapshot, PricePoint, PriceQuery, StockSummary};

/// Faux client de marché pour les tests
#[derive(Default)]
pub struct FakeApi {
    search_calls: Mutex<Vec<String>>,
    price_calls: Mutex<Vec<(String, PriceQuery)>>,
    movers_calls: AtomicUsize,

    search_responses: HashMap<String, Vec<StockSummary>>,
    search_delays: HashMap<String, Duration>,
    search_fails: bool,
    search_crashes: bool,

    prices_by_days: HashMap<u32, Vec<PricePoint>>,

    movers_script: Mutex<VecDeque<Result<MoversSnapshot, ApiError>>>,
}

impl FakeApi {
    /// Réponse de recherche pour `keyword` (None = entrée sans symbole)
    pub fn with_search(mut self, keyword: &str, symbols: &[Option<&str>]) -> Self {
        let results = symbols
            .iter()
            .map(|s| StockSummary::new(s.map(str::to_string), format!("{} Ltd", s.unwrap_or("Unlisted"))))
            .collect();
        self.search_responses.insert(keyword.to_string(), results);
        self
    }

    /// Délai avant de répondre à `keyword`
    pub fn with_search_delay(mut self, keyword: &str, delay: Duration) -> Self {
        self.search_delays.insert(keyword.to_string(), delay);
        self
    }

    /// Toutes les recherches échouent (erreur de transport)
    pub fn with_failing_search(mut self) -> Self {
        self.search_fails = true;
        self
    }

    /// La tâche de recherche panique au lieu de répondre
    pub fn with_crashing_search(mut self) -> Self {
        self.search_crashes = true;
        self
    }

    /// Série renvoyée pour une requête de `days` jours
    pub fn with_prices(mut self, days: u32, closes: &[f64]) -> Self {
        let points = closes
            .iter()
            .enumerate()
            .map(|(i, &close)| PricePoint::new(format!("2024-03-{:02}", i + 1), close, close, close, close, 1000.0))
            .collect();
        self.prices_by_days.insert(days, points);
        self
    }

    /// Réponses successives de l'endpoint movers (la dernière est répétée)
    pub fn with_movers(self, script: Vec<Result<MoversSnapshot, ApiError>>) -> Self {
        *self.movers_script.lock().unwrap() = script.into();
        self
    }

    pub fn search_calls(&self) -> Vec<String> {
        self.search_calls.lock().unwrap().clone()
    }

    pub fn price_calls(&self) -> Vec<(String, PriceQuery)> {
        self.price_calls.lock().unwrap().clone()
    }

    pub fn movers_calls(&self) -> usize {
        self.movers_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MarketApi for FakeApi {
    async fn fetch_search(&self, keyword: &str) -> Result<Vec<StockSummary>, ApiError> {
        self.search_calls.lock().unwrap().push(keyword.to_string());

        if let Some(delay) = self.search_delays.get(keyword) {
            tokio::time::sleep(*delay).await;
        }
        if self.search_crashes {
            panic!("search backend crashed");
        }
        if self.search_fails {
            return Err(ApiError::Transport("HTTP 503".to_string()));
        }

        Ok(self.search_responses.get(keyword).cloned().unwrap_or_default())
    }

    async fn fetch_prices(&self, symbol: &str, query: PriceQuery) -> Result<Vec<PricePoint>, ApiError> {
        self.price_calls.lock().unwrap().push((symbol.to_string(), query));

        self.prices_by_days
            .get(&query.days)
            .cloned()
            .ok_or_else(|| ApiError::Transport("HTTP 404".to_string()))
    }

    async fn fetch_movers(&self) -> Result<MoversSnapshot, ApiError> {
        self.movers_calls.fetch_add(1, Ordering::SeqCst);

        let mut script = self.movers_script.lock().unwrap();
        let next = if script.len() > 1 { script.pop_front() } else { script.front().cloned() };
        next.unwrap_or_else(|| Ok(MoversSnapshot::default()))
    }
}
