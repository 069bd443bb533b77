// ============================================================================
// Erreurs du client API
// ============================================================================
// Familles d'erreurs :
// - Transport : réseau injoignable, statut HTTP non 2xx
// - Parse : JSON invalide ou forme inattendue
// - Cancelled : requête remplacée par une plus récente
// - TaskFailed : la tâche de la requête s'est arrêtée sans résultat (panic)
//
// CONCEPT RUST : thiserror
// - #[derive(Error)] implémente std::error::Error et Display
// - #[error("...")] définit le message affiché
// ============================================================================

use thiserror::Error;

/// Erreur d'une opération du client API
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// Réseau injoignable ou statut HTTP non 2xx
    #[error("échec du transport HTTP : {0}")]
    Transport(String),

    /// Réponse illisible ou de forme inattendue
    #[error("réponse illisible : {0}")]
    Parse(String),

    /// Requête remplacée par une plus récente (jamais affichée)
    #[error("requête annulée")]
    Cancelled,

    /// Tâche arrêtée avant d'avoir produit un résultat
    #[error("la tâche de la requête s'est arrêtée sans résultat")]
    TaskFailed,
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiError::Parse(err.to_string())
        } else {
            ApiError::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Parse(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_error_maps_to_parse() {
        let err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        assert!(matches!(ApiError::from(err), ApiError::Parse(_)));
    }
}
