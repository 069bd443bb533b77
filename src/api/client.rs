// ============================================================================
// API Client : marché (search, prix, movers)
// ============================================================================
// Récupère les données depuis l'API REST de marché
//
// CONCEPTS RUST AVANCÉS :
// 1. async/await : programmation asynchrone (non-bloquante)
// 2. Traits + async_trait : une interface commune pour le vrai client HTTP
//    et les faux clients des tests
// 3. Deux niveaux d'API :
//    - fetch_* : Result<T, ApiError> (l'appelant voit l'erreur)
//    - search_stocks / stock_prices / movers_snapshot : l'erreur est loggée
//      et remplacée par un résultat vide
// ============================================================================

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, error, info, instrument};

use crate::api::normalize;
use crate::config::Config;
use crate::error::ApiError;
use crate::models::{MoversSnapshot, PricePoint, PriceQuery, StockSummary};

/// Nombre de résultats demandés à l'endpoint de recherche
pub const SEARCH_LENGTH: u32 = 10;

// ============================================================================
// Trait MarketApi
// ============================================================================
// CONCEPT RUST : Trait object
// - Arc<dyn MarketApi> est partagé entre l'UI et les tâches tokio
// - Send + Sync : requis pour traverser les threads du runtime
// ============================================================================

/// Source de données de marché
///
/// Chaque opération est isolée : l'échec de l'une n'affecte pas les autres.
#[async_trait]
pub trait MarketApi: Send + Sync {
    /// Recherche de titres par mot-clé
    async fn fetch_search(&self, keyword: &str) -> Result<Vec<StockSummary>, ApiError>;

    /// Série de prix d'un titre
    async fn fetch_prices(&self, symbol: &str, query: PriceQuery) -> Result<Vec<PricePoint>, ApiError>;

    /// Photographie des movers de l'indice
    async fn fetch_movers(&self) -> Result<MoversSnapshot, ApiError>;

    /// Recherche, liste vide en cas d'erreur
    async fn search_stocks(&self, keyword: &str) -> Vec<StockSummary> {
        match self.fetch_search(keyword).await {
            Ok(results) => results,
            Err(ApiError::Cancelled) => Vec::new(),
            Err(e) => {
                error!(keyword = %keyword, error = %e, "Error searching stocks");
                Vec::new()
            }
        }
    }

    /// Prix, série vide en cas d'erreur
    async fn stock_prices(&self, symbol: &str, query: PriceQuery) -> Vec<PricePoint> {
        match self.fetch_prices(symbol, query).await {
            Ok(points) => points,
            Err(ApiError::Cancelled) => Vec::new(),
            Err(e) => {
                error!(symbol = %symbol, days = query.days, error = %e, "Error fetching stock prices");
                Vec::new()
            }
        }
    }

    /// Movers, photographie vide (trois listes vides) en cas d'erreur
    async fn movers_snapshot(&self) -> MoversSnapshot {
        match self.fetch_movers().await {
            Ok(snapshot) => snapshot,
            Err(ApiError::Cancelled) => MoversSnapshot::default(),
            Err(e) => {
                error!(error = %e, "Error fetching movers snapshot");
                MoversSnapshot::default()
            }
        }
    }
}

// ============================================================================
// MarketClient : implémentation HTTP (reqwest)
// ============================================================================

/// Client HTTP de l'API de marché
///
/// CONCEPT : Un seul reqwest::Client réutilisé
/// - Le client garde un pool de connexions
/// - Le cloner est peu coûteux (Arc interne)
#[derive(Debug, Clone)]
pub struct MarketClient {
    http: Client,
    base_url: String,
    index: String,
}

impl MarketClient {
    /// Crée un client à partir de la configuration
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        use anyhow::Context;

        let http = Client::builder()
            .user_agent(concat!("lazyticker/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Échec de la création du client HTTP")?;

        Ok(Self::with_client(http, &config.api_base, &config.index))
    }

    /// Crée un client avec un reqwest::Client déjà construit
    pub fn with_client(http: Client, base_url: &str, index: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            index: index.to_string(),
        }
    }

    /// URL de recherche
    fn search_url(&self) -> String {
        format!("{}/search", self.base_url)
    }

    /// URL de la série de prix d'un titre
    fn prices_url(&self, symbol: &str) -> String {
        format!("{}/stock/{}/prices", self.base_url, symbol)
    }

    /// URL des movers de l'indice (le slash final fait partie de la route)
    fn movers_url(&self) -> String {
        format!("{}/index/{}/movers/", self.base_url, self.index)
    }

    /// Envoie un GET et lit le corps en JSON
    ///
    /// CONCEPT RUST : ? avec From
    /// - reqwest::Error est converti en ApiError par From
    /// - Un statut non 2xx devient ApiError::Transport
    async fn get_json(&self, request: reqwest::RequestBuilder) -> Result<Value, ApiError> {
        let response = request.send().await?;

        let status = response.status();
        debug!(status = %status, url = %response.url(), "Received HTTP response");

        if !status.is_success() {
            return Err(ApiError::Transport(format!("HTTP {}", status)));
        }

        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl MarketApi for MarketClient {
    #[instrument(skip(self))]
    async fn fetch_search(&self, keyword: &str) -> Result<Vec<StockSummary>, ApiError> {
        let length = SEARCH_LENGTH.to_string();
        let request = self
            .http
            .get(self.search_url())
            .query(&[("keyword", keyword), ("length", length.as_str())]);

        let body = self.get_json(request).await?;
        let results = normalize::search_results(&body);

        info!(count = results.len(), "Search completed");
        Ok(results)
    }

    #[instrument(skip(self), fields(days = query.days, granularity = query.granularity.as_query_value()))]
    async fn fetch_prices(&self, symbol: &str, query: PriceQuery) -> Result<Vec<PricePoint>, ApiError> {
        let mut params = vec![
            ("days", query.days.to_string()),
            ("type", query.granularity.as_query_value().to_string()),
        ];
        if let Some(limit) = query.limit {
            params.push(("limit", limit.to_string()));
        }

        let request = self.http.get(self.prices_url(symbol)).query(&params);

        let body = self.get_json(request).await?;
        let points = normalize::price_points(&body)?;

        info!(points = points.len(), "Fetched price series");
        Ok(points)
    }

    #[instrument(skip(self), fields(index = %self.index))]
    async fn fetch_movers(&self) -> Result<MoversSnapshot, ApiError> {
        let body = self.get_json(self.http.get(self.movers_url())).await?;
        let snapshot = normalize::movers_snapshot(&body)?;

        info!(
            gainers = snapshot.gainers.len(),
            losers = snapshot.losers.len(),
            volume_movers = snapshot.volume_movers.len(),
            "Fetched movers snapshot"
        );
        Ok(snapshot)
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================
