// ============================================================================
// Structures : MoverEntry et MoversSnapshot
// ============================================================================
// Photographie des "movers" d'un indice : plus fortes hausses, plus fortes
// baisses et plus gros volumes
//
// CONCEPTS RUST :
// 1. #[serde(flatten)] : récupère les champs inconnus dans une map
//    → l'API peut ajouter des champs sans casser le parsing
// 2. #[serde(alias = "...")] : plusieurs noms JSON pour un même champ
// 3. HashSet : déduplication en un seul passage
// ============================================================================

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Un titre classé comme "mover" par l'API
///
/// Enregistrement ouvert : les champs non reconnus sont conservés dans `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MoverEntry {
    #[serde(default)]
    pub symbol: String,

    #[serde(default, alias = "companyName", alias = "comp_name", alias = "name")]
    pub company_name: String,

    #[serde(default)]
    pub open: Option<f64>,
    #[serde(default)]
    pub high: Option<f64>,
    #[serde(default)]
    pub low: Option<f64>,
    #[serde(default)]
    pub close: Option<f64>,
    #[serde(default)]
    pub volume: Option<f64>,

    #[serde(default, alias = "prevClose")]
    pub prev_close: Option<f64>,

    #[serde(default, rename = "change", alias = "change_abs")]
    pub change_abs: Option<f64>,

    #[serde(default, rename = "percent", alias = "change_percent")]
    pub change_percent: Option<f64>,

    #[serde(default, rename = "value", alias = "traded_value")]
    pub traded_value: Option<f64>,

    #[serde(default, alias = "marketCap", alias = "mcap")]
    pub market_cap: Option<f64>,

    #[serde(default, alias = "peRatio", alias = "pe")]
    pub pe_ratio: Option<f64>,

    #[serde(default)]
    pub roe: Option<f64>,

    #[serde(default)]
    pub roce: Option<f64>,

    /// Champs que l'on ne connaît pas (ignorés mais conservés)
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl MoverEntry {
    /// Entrée minimale (symbole uniquement), utile pour construire des fixtures
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            ..Self::default()
        }
    }

    /// Dernier prix connu (close, sinon 0)
    pub fn price(&self) -> f64 {
        self.close.unwrap_or(0.0)
    }

    /// Variation absolue (0 si absente)
    pub fn change(&self) -> f64 {
        self.change_abs.unwrap_or(0.0)
    }

    /// Variation en pourcentage (0 si absente)
    pub fn percent(&self) -> f64 {
        self.change_percent.unwrap_or(0.0)
    }
}

/// Photographie complète renvoyée par l'endpoint movers
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MoversSnapshot {
    #[serde(default)]
    pub gainers: Vec<MoverEntry>,

    #[serde(default)]
    pub losers: Vec<MoverEntry>,

    #[serde(default, alias = "volumeMovers")]
    pub volume_movers: Vec<MoverEntry>,

    #[serde(default)]
    pub total_count: Option<u64>,

    #[serde(default)]
    pub gainers_count: Option<u64>,

    #[serde(default)]
    pub losers_count: Option<u64>,

    #[serde(default)]
    pub index_name: Option<String>,

    #[serde(default)]
    pub exchange: Option<String>,
}

impl MoversSnapshot {
    /// Vrai si les trois listes sont vides
    pub fn is_empty(&self) -> bool {
        self.gainers.is_empty() && self.losers.is_empty() && self.volume_movers.is_empty()
    }

    /// Vue fusionnée et dédupliquée : gainers, puis losers, puis volume movers
    ///
    /// CONCEPT : Première occurrence gagnante
    /// - HashSet::insert retourne false si le symbole a déjà été vu
    /// - L'ordre de rencontre est conservé (gainers > losers > volume)
    pub fn merged_unique(&self) -> Vec<MoverEntry> {
        let mut seen: HashSet<String> = HashSet::new();

        self.gainers
            .iter()
            .chain(self.losers.iter())
            .chain(self.volume_movers.iter())
            .filter(|entry| seen.insert(entry.symbol.clone()))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn symbols(entries: &[MoverEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.symbol.as_str()).collect()
    }

    #[test]
    fn test_merged_unique_keeps_first_occurrence() {
        let snapshot = MoversSnapshot {
            gainers: vec![MoverEntry::new("A")],
            losers: vec![MoverEntry::new("A"), MoverEntry::new("B")],
            volume_movers: vec![MoverEntry::new("C")],
            ..MoversSnapshot::default()
        };

        assert_eq!(symbols(&snapshot.merged_unique()), vec!["A", "B", "C"]);
    }

    #[test]
    fn test_merged_unique_gainer_wins_collision() {
        let mut gainer = MoverEntry::new("TCS");
        gainer.change_abs = Some(12.0);
        let mut volume = MoverEntry::new("TCS");
        volume.change_abs = Some(-3.0);

        let snapshot = MoversSnapshot {
            gainers: vec![gainer],
            volume_movers: vec![volume],
            ..MoversSnapshot::default()
        };

        let merged = snapshot.merged_unique();
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].change(), 12.0);
    }

    #[test]
    fn test_entry_keeps_unknown_fields() {
        let entry: MoverEntry = serde_json::from_value(json!({
            "symbol": "INFY",
            "comp_name": "Infosys",
            "close": 1500.5,
            "change": 20,
            "percent": 1.35,
            "mcap": 620000.0,
            "sector": "IT",
            "year_high": 1700
        }))
        .unwrap();

        assert_eq!(entry.symbol, "INFY");
        assert_eq!(entry.company_name, "Infosys");
        assert_eq!(entry.price(), 1500.5);
        assert_eq!(entry.change(), 20.0);
        assert_eq!(entry.market_cap, Some(620000.0));
        assert_eq!(entry.extra.get("sector"), Some(&json!("IT")));
        assert!(entry.extra.contains_key("year_high"));
    }

    #[test]
    fn test_snapshot_defaults_missing_lists() {
        let snapshot: MoversSnapshot = serde_json::from_value(json!({
            "gainers": [{ "symbol": "A" }],
            "index_name": "NIFTY 50"
        }))
        .unwrap();

        assert_eq!(snapshot.gainers.len(), 1);
        assert!(snapshot.losers.is_empty());
        assert!(snapshot.volume_movers.is_empty());
        assert_eq!(snapshot.index_name.as_deref(), Some("NIFTY 50"));
        assert!(!snapshot.is_empty());
    }
}
