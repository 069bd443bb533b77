// ============================================================================
// LazyTicker - Library
// ============================================================================
// Expose les modules publics pour le binaire et les tests
// ============================================================================

pub mod api;       // Client de l'API de marché + normalisation des réponses
pub mod app;       // État de l'application
pub mod config;    // Configuration (variables d'environnement / .env)
pub mod detail;    // Page détail : chargement, plages de temps
pub mod error;     // Erreurs typées du client API
pub mod favorites; // Favoris persistants
pub mod feed;      // Polling des movers pour le bandeau
pub mod models;    // Structures de données
pub mod search;    // Recherche "as-you-type" (debounce, annulation)
pub mod task;      // Actions planifiées et requêtes annulables
pub mod ui;        // Interface utilisateur

#[cfg(test)]
mod test_support;
