// ============================================================================
// Bandeau des movers : polling périodique
// ============================================================================
// Récupère la photographie des movers au démarrage, puis toutes les 30 s,
// et envoie la liste fusionnée/dédupliquée à l'UI via un channel
//
// CONCEPTS RUST :
// 1. tokio::time::interval : premier tick immédiat, puis périodique
// 2. mpsc unbounded : l'UI lit sans bloquer (try_recv) dans sa boucle
// 3. RAII : dropper le FeedPoller arrête la boucle (abort)
// ============================================================================

use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use crate::api::MarketApi;
use crate::models::MoverEntry;

/// Nouvelle liste à afficher (remplace la précédente en bloc)
#[derive(Debug, Clone, PartialEq)]
pub struct FeedUpdate {
    pub entries: Vec<MoverEntry>,
}

// ============================================================================
// FeedPoller
// ============================================================================

/// Tâche de polling des movers, arrêtée quand elle est droppée
#[derive(Debug)]
pub struct FeedPoller {
    handle: JoinHandle<()>,
}

impl FeedPoller {
    /// Lance le polling sur le runtime
    ///
    /// En cas d'échec de la requête, une liste vide est envoyée : l'UI
    /// n'affiche jamais une ancienne photographie comme si elle était à jour.
    pub fn spawn(
        runtime: &Handle,
        api: Arc<dyn MarketApi>,
        every: Duration,
        updates: UnboundedSender<FeedUpdate>,
    ) -> Self {
        let handle = runtime.spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;

                let snapshot = api.movers_snapshot().await;
                let entries = snapshot.merged_unique();
                debug!(count = entries.len(), "Movers feed refreshed");

                if updates.send(FeedUpdate { entries }).is_err() {
                    info!("Feed receiver dropped, stopping poller");
                    break;
                }
            }
        });

        info!(interval_secs = every.as_secs(), "Movers feed poller started");
        Self { handle }
    }

}

impl Drop for FeedPoller {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

// ============================================================================
// TickerFeed : état affiché
// ============================================================================

/// Liste des movers affichée dans le bandeau et le panneau "Top Movers"
#[derive(Debug, Clone, Default)]
pub struct TickerFeed {
    entries: Vec<MoverEntry>,
    loaded: bool,
}

impl TickerFeed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remplace la liste en bloc (vide si la requête a échoué)
    pub fn apply(&mut self, update: FeedUpdate) {
        self.entries = update.entries;
        self.loaded = true;
    }

    /// Vrai tant que la première réponse n'est pas arrivée
    pub fn is_loading(&self) -> bool {
        !self.loaded
    }

    pub fn entries(&self) -> &[MoverEntry] {
        &self.entries
    }

    /// Les `n` premiers movers
    pub fn top_movers(&self, n: usize) -> &[MoverEntry] {
        &self.entries[..self.entries.len().min(n)]
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiError;
    use crate::models::MoversSnapshot;
    use crate::test_support::FakeApi;
    use tokio::sync::mpsc;

    fn snapshot(gainers: &[&str], losers: &[&str], volume: &[&str]) -> MoversSnapshot {
        let entries = |symbols: &[&str]| symbols.iter().map(|s| MoverEntry::new(*s)).collect();
        MoversSnapshot {
            gainers: entries(gainers),
            losers: entries(losers),
            volume_movers: entries(volume),
            ..MoversSnapshot::default()
        }
    }

    fn symbols(update: &FeedUpdate) -> Vec<&str> {
        update.entries.iter().map(|e| e.symbol.as_str()).collect()
    }

    #[tokio::test(start_paused = true)]
    async fn test_polls_immediately_then_every_interval() {
        let api = Arc::new(FakeApi::default().with_movers(vec![
            Ok(snapshot(&["A"], &["A", "B"], &["C"])),
            Ok(snapshot(&["D"], &[], &[])),
        ]));
        let (tx, mut rx) = mpsc::unbounded_channel();
        let start = tokio::time::Instant::now();

        let _poller = FeedPoller::spawn(&Handle::current(), api.clone(), Duration::from_secs(30), tx);

        let first = rx.recv().await.unwrap();
        assert_eq!(symbols(&first), vec!["A", "B", "C"]);
        assert!(start.elapsed() < Duration::from_secs(1));

        let second = rx.recv().await.unwrap();
        assert_eq!(symbols(&second), vec!["D"]);
        assert!(start.elapsed() >= Duration::from_secs(30));
        assert_eq!(api.movers_calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_clears_the_list() {
        let api = Arc::new(FakeApi::default().with_movers(vec![
            Ok(snapshot(&["A"], &[], &[])),
            Err(ApiError::Transport("HTTP 500".to_string())),
        ]));
        let (tx, mut rx) = mpsc::unbounded_channel();
        let _poller = FeedPoller::spawn(&Handle::current(), api, Duration::from_secs(30), tx);

        let mut feed = TickerFeed::new();
        assert!(feed.is_loading());

        feed.apply(rx.recv().await.unwrap());
        assert_eq!(feed.entries().len(), 1);

        feed.apply(rx.recv().await.unwrap());
        assert!(feed.entries().is_empty());
        assert!(!feed.is_loading());
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_poller_stops_updates() {
        let api = Arc::new(FakeApi::default().with_movers(vec![Ok(snapshot(&["A"], &[], &[]))]));
        let (tx, mut rx) = mpsc::unbounded_channel();
        let poller = FeedPoller::spawn(&Handle::current(), api.clone(), Duration::from_secs(30), tx);

        assert!(rx.recv().await.is_some());
        drop(poller);

        // La tâche avortée libère l'émetteur : le channel se ferme
        assert!(rx.recv().await.is_none());
        assert_eq!(api.movers_calls(), 1);
    }

    #[test]
    fn test_top_movers_slice() {
        let mut feed = TickerFeed::new();
        feed.apply(FeedUpdate {
            entries: ["A", "B", "C"].iter().map(|s| MoverEntry::new(*s)).collect(),
        });

        assert_eq!(feed.top_movers(2).len(), 2);
        assert_eq!(feed.top_movers(6).len(), 3);
    }
}
