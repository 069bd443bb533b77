// ============================================================================
// Module : models
// ============================================================================
// Ce module contient toutes les structures de données de l'application
//
// CONCEPT RUST : Modules et visibilité
// - "pub mod" : déclare un sous-module public (accessible depuis l'extérieur)
// - Sans "pub", le module serait privé au crate
// ============================================================================

pub mod movers; // Movers d'un indice (gainers, losers, volume)
pub mod price;  // Séries de prix, granularité, plages de temps
pub mod stock;  // Résultats de recherche

// Re-export des structures principales pour simplifier les imports
// Au lieu de : use lazyticker::models::stock::StockSummary;
// On peut faire : use lazyticker::models::StockSummary;
pub use movers::{MoverEntry, MoversSnapshot};
pub use price::{Granularity, PricePoint, PriceQuery, TimeRange};
pub use stock::StockSummary;
