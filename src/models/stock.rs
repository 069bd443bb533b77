// ============================================================================
// Structure : StockSummary
// ============================================================================
// Une entrée de résultat de recherche : symbole, société, type d'actif
//
// CONCEPTS RUST :
// 1. Option<String> : le symbole peut manquer dans la réponse de l'API
// 2. Méthodes "as_deref" : passer de &Option<String> à Option<&str>
// ============================================================================

use serde::{Deserialize, Serialize};

/// Type appliqué quand l'API ne précise pas le champ "type"
pub const DEFAULT_KIND: &str = "stock";

/// Résultat de recherche normalisé
///
/// Un résultat sans symbole reste affichable dans la liste mais n'est pas
/// navigable (pas de vue détail possible).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockSummary {
    /// Symbole du titre (ex: "TCS"), absent si l'API l'omet
    pub symbol: Option<String>,

    /// Nom de la société (ex: "Tata Consultancy")
    pub company: String,

    /// Type d'actif (ex: "stock", "index")
    pub kind: String,
}

impl StockSummary {
    /// Crée un résultat avec le type par défaut
    pub fn new(symbol: Option<String>, company: impl Into<String>) -> Self {
        Self {
            symbol,
            company: company.into(),
            kind: DEFAULT_KIND.to_string(),
        }
    }

    /// Remplace le type d'actif (builder)
    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = kind.into();
        self
    }

    /// Clé stable pour l'affichage en liste
    ///
    /// Le symbole si présent, sinon le nom de la société.
    pub fn list_key(&self) -> &str {
        self.symbol.as_deref().unwrap_or(&self.company)
    }

    /// Vrai si l'entrée peut ouvrir une vue détail
    pub fn is_navigable(&self) -> bool {
        self.symbol.is_some()
    }
}
