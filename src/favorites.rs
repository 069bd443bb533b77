// ============================================================================
// Favoris persistants
// ============================================================================
// Les symboles favoris sont stockés sous la clé "favoriteStocks", sous forme
// de tableau JSON de chaînes, dans un petit store clé/valeur.
//
// Stockage : <data_dir>/store.json (un objet JSON { clé: valeur })
//
// CONCEPTS RUST :
// 1. Trait KeyValueStore : fichier en production, mémoire dans les tests
// 2. Generics : Favorites<S: KeyValueStore>
// 3. anyhow::Context : erreurs d'E/S avec le chemin concerné
// ============================================================================

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

/// Clé sous laquelle la liste des favoris est stockée
pub const FAVORITES_KEY: &str = "favoriteStocks";

/// Nom du fichier du store dans le répertoire de données
pub const STORE_FILE: &str = "store.json";

// ============================================================================
// Store clé/valeur
// ============================================================================

/// Stockage clé/valeur de chaînes
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

/// CONCEPT RUST : impl pour Box<dyn Trait>
/// - Permet Favorites<Box<dyn KeyValueStore + Send>> dans App
impl<S: KeyValueStore + ?Sized> KeyValueStore for Box<S> {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }
}

/// Store adossé à un fichier JSON
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    /// Store dans `<data_dir>/store.json`
    pub fn in_dir(data_dir: &Path) -> Self {
        Self {
            path: data_dir.join(STORE_FILE),
        }
    }

    /// Lit l'objet complet (vide si le fichier n'existe pas encore)
    fn read_all(&self) -> Result<HashMap<String, String>> {
        if !self.path.exists() {
            return Ok(HashMap::new());
        }

        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read {}", self.path.display()))?;
        let entries = serde_json::from_str(&content)
            .with_context(|| format!("Invalid JSON in {}", self.path.display()))?;
        Ok(entries)
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        match self.read_all() {
            Ok(mut entries) => entries.remove(key),
            Err(e) => {
                warn!(error = %e, "Store unreadable");
                None
            }
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        // Un fichier illisible est remplacé plutôt que de bloquer l'écriture
        let mut entries = match self.read_all() {
            Ok(entries) => entries,
            Err(e) => {
                warn!(error = %e, path = %self.path.display(), "Store unreadable, replacing it");
                HashMap::new()
            }
        };
        entries.insert(key.to_string(), value.to_string());

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        let content = serde_json::to_string_pretty(&entries)?;
        fs::write(&self.path, content)
            .with_context(|| format!("Failed to write {}", self.path.display()))?;

        debug!(key = %key, path = %self.path.display(), "Store updated");
        Ok(())
    }
}

/// Store en mémoire
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().ok()?.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries
            .lock()
            .map_err(|_| anyhow::anyhow!("memory store poisoned"))?
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

// ============================================================================
// Favorites
// ============================================================================

/// Liste des symboles favoris
#[derive(Debug)]
pub struct Favorites<S> {
    store: S,
}

impl<S: KeyValueStore> Favorites<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Symboles favoris, dans l'ordre d'ajout
    ///
    /// Une valeur stockée illisible compte comme une liste vide.
    pub fn list(&self) -> Vec<String> {
        let Some(raw) = self.store.get(FAVORITES_KEY) else {
            return Vec::new();
        };

        serde_json::from_str(&raw).unwrap_or_else(|e| {
            warn!(error = %e, "Stored favorites unreadable, treating as empty");
            Vec::new()
        })
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.list().iter().any(|s| s == symbol)
    }

    /// Ajoute ou retire `symbol`, retourne le nouvel état (true = favori)
    ///
    /// La liste complète est réécrite à chaque bascule.
    pub fn toggle(&self, symbol: &str) -> Result<bool> {
        let mut symbols = self.list();

        let now_favorite = match symbols.iter().position(|s| s == symbol) {
            Some(index) => {
                symbols.remove(index);
                false
            }
            None => {
                symbols.push(symbol.to_string());
                true
            }
        };

        let value = serde_json::to_string(&symbols)?;
        self.store.set(FAVORITES_KEY, &value)?;

        info!(symbol = %symbol, favorite = now_favorite, "Favorite toggled");
        Ok(now_favorite)
    }
}
