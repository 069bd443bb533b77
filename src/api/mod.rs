// ============================================================================
// Module : api
// ============================================================================
// Ce module contient le client de l'API de marché et la normalisation des
// réponses JSON
// ============================================================================

pub mod client;    // Trait MarketApi + client HTTP
pub mod normalize; // JSON brut -> types fixes

// Re-export des types principaux
pub use client::{MarketApi, MarketClient};
