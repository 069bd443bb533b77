// ============================================================================
// Configuration
// ============================================================================
// Lit la configuration depuis les variables d'environnement (avec support
// d'un fichier .env via dotenvy, chargé dans main)
//
// CONCEPTS RUST :
// 1. Closures en paramètre : from_lookup() reçoit la fonction de lecture,
//    ce qui permet de tester sans modifier l'environnement du process
// 2. anyhow::Context : message clair si une valeur numérique est invalide
// ============================================================================

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

/// URL de base par défaut de l'API de marché
pub const DEFAULT_API_BASE: &str = "https://portal.tradebrains.in/api/assignment";

/// Indice par défaut pour les movers
pub const DEFAULT_INDEX: &str = "NIFTY";

/// Configuration de l'application
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// URL de base de l'API (sans slash final)
    pub api_base: String,

    /// Indice dont on affiche les movers
    pub index: String,

    /// Période de rafraîchissement du bandeau
    pub poll_interval: Duration,

    /// Silence requis avant de lancer une recherche
    pub debounce: Duration,

    /// Délai avant de cacher les résultats après perte de focus
    pub hide_delay: Duration,

    /// Répertoire des données locales (favoris)
    pub data_dir: PathBuf,

    /// Répertoire des logs
    pub log_dir: PathBuf,
}

impl Config {
    /// Charge la configuration depuis l'environnement du process
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Charge la configuration avec une fonction de lecture quelconque
    ///
    /// CONCEPT RUST : Generic + trait bound Fn
    /// - F: Fn(&str) -> Option<String> : n'importe quelle closure de lecture
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let millis = |key: &str, default: u64| -> Result<Duration> {
            match var(key) {
                Some(raw) => raw
                    .parse::<u64>()
                    .map(Duration::from_millis)
                    .with_context(|| format!("{} doit être un nombre de millisecondes (reçu : {:?})", key, raw)),
                None => Ok(Duration::from_millis(default)),
            }
        };

        let poll_interval = match var("LAZYTICKER_POLL_SECS") {
            Some(raw) => raw
                .parse::<u64>()
                .map(Duration::from_secs)
                .with_context(|| format!("LAZYTICKER_POLL_SECS doit être un nombre de secondes (reçu : {:?})", raw))?,
            None => Duration::from_secs(30),
        };

        let data_dir = var("LAZYTICKER_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(default_data_dir);

        let log_dir = var("LAZYTICKER_LOG_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| data_dir.join("logs"));

        Ok(Self {
            api_base: var("LAZYTICKER_API_BASE")
                .unwrap_or_else(|| DEFAULT_API_BASE.to_string())
                .trim_end_matches('/')
                .to_string(),
            index: var("LAZYTICKER_INDEX").unwrap_or_else(|| DEFAULT_INDEX.to_string()),
            poll_interval,
            debounce: millis("LAZYTICKER_DEBOUNCE_MS", 300)?,
            hide_delay: millis("LAZYTICKER_HIDE_DELAY_MS", 200)?,
            data_dir,
            log_dir,
        })
    }
}

/// Répertoire de données par défaut
///
/// - Linux : ~/.local/share/lazyticker
/// - macOS : ~/Library/Application Support/lazyticker
/// - Windows : C:\Users\<user>\AppData\Local\lazyticker
fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("lazyticker")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();

        assert_eq!(config.api_base, DEFAULT_API_BASE);
        assert_eq!(config.index, "NIFTY");
        assert_eq!(config.poll_interval, Duration::from_secs(30));
        assert_eq!(config.debounce, Duration::from_millis(300));
        assert_eq!(config.hide_delay, Duration::from_millis(200));
        assert!(config.data_dir.ends_with("lazyticker"));
        assert_eq!(config.log_dir, config.data_dir.join("logs"));
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("LAZYTICKER_API_BASE", "http://localhost:8080/api/"),
            ("LAZYTICKER_INDEX", "BANKNIFTY"),
            ("LAZYTICKER_POLL_SECS", "5"),
            ("LAZYTICKER_DEBOUNCE_MS", "150"),
            ("LAZYTICKER_DATA_DIR", "/tmp/lt"),
        ])
        .unwrap();

        assert_eq!(config.api_base, "http://localhost:8080/api");
        assert_eq!(config.index, "BANKNIFTY");
        assert_eq!(config.poll_interval, Duration::from_secs(5));
        assert_eq!(config.debounce, Duration::from_millis(150));
        assert_eq!(config.data_dir, PathBuf::from("/tmp/lt"));
        assert_eq!(config.log_dir, PathBuf::from("/tmp/lt/logs"));
    }

    #[test]
    fn test_blank_values_use_defaults() {
        let config = config_from(&[("LAZYTICKER_INDEX", "   ")]).unwrap();
        assert_eq!(config.index, DEFAULT_INDEX);
    }

    #[test]
    fn test_invalid_number_is_an_error() {
        let err = config_from(&[("LAZYTICKER_DEBOUNCE_MS", "fast")]).unwrap_err();
        assert!(err.to_string().contains("LAZYTICKER_DEBOUNCE_MS"));
    }
}
