// ============================================================================
// Tâches possédées : action planifiée et opération en cours
// ============================================================================
// Le debounce, le masquage différé et les requêtes HTTP sont modélisés comme
// des valeurs possédées plutôt que comme des timers ambiants :
// - Scheduled<T> : une action planifiée pour un instant donné
// - InFlight<T> : une opération async en cours sur le runtime tokio
//
// Annuler = dropper la valeur. Un InFlight droppé avorte sa tâche et ferme
// son canal de résultat : un résultat tardif ne peut plus être observé.
// Tant que l'InFlight vit, un canal fermé sans valeur veut donc dire que la
// tâche s'est arrêtée d'elle-même (panic) : c'est une erreur, pas une annulation.
//
// CONCEPTS RUST :
// 1. RAII : Drop avorte la tâche tokio
// 2. oneshot channel : un seul résultat, lu sans bloquer (try_recv)
// 3. Temps injecté : Scheduled compare un Instant fourni par l'appelant
// ============================================================================

use std::future::Future;
use std::time::{Duration, Instant};

use tokio::runtime::Handle;
use tokio::sync::oneshot::{self, error::TryRecvError};
use tokio::task::JoinHandle;

use crate::error::ApiError;

// ============================================================================
// Scheduled<T>
// ============================================================================

/// Action planifiée, qui se déclenche à `fires_at`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scheduled<T> {
    fires_at: Instant,
    payload: T,
}

impl<T> Scheduled<T> {
    /// Planifie `payload` pour `now + delay`
    pub fn after(now: Instant, delay: Duration, payload: T) -> Self {
        Self {
            fires_at: now + delay,
            payload,
        }
    }

    /// Vrai si l'instant de déclenchement est atteint
    pub fn is_due(&self, now: Instant) -> bool {
        now >= self.fires_at
    }
}

/// Retire et retourne le payload du slot s'il est arrivé à échéance
///
/// CONCEPT RUST : Option::take
/// - Remplace le contenu par None et retourne l'ancienne valeur
/// - Le slot est vidé uniquement si l'action est due
pub fn take_due<T>(slot: &mut Option<Scheduled<T>>, now: Instant) -> Option<T> {
    if slot.as_ref().is_some_and(|scheduled| scheduled.is_due(now)) {
        slot.take().map(|scheduled| scheduled.payload)
    } else {
        None
    }
}

// ============================================================================
// InFlight<T>
// ============================================================================

/// Opération async en cours, annulable
///
/// Le résultat est lu par `try_result()` depuis la boucle d'événements.
#[derive(Debug)]
pub struct InFlight<T> {
    handle: JoinHandle<()>,
    result: oneshot::Receiver<T>,
}

impl<T: Send + 'static> InFlight<T> {
    /// Lance `future` sur le runtime et garde la main sur son résultat
    pub fn spawn<F>(runtime: &Handle, future: F) -> Self
    where
        F: Future<Output = T> + Send + 'static,
    {
        let (tx, rx) = oneshot::channel();

        let handle = runtime.spawn(async move {
            let value = future.await;
            // Le receveur a pu être droppé entre-temps : rien à faire
            let _ = tx.send(value);
        });

        Self { handle, result: rx }
    }
}

impl<T> InFlight<T> {
    /// Résultat de l'opération, sans bloquer
    ///
    /// - None : toujours en cours
    /// - Some(Ok(value)) : terminée
    /// - Some(Err(ApiError::TaskFailed)) : la tâche s'est arrêtée sans résultat
    pub fn try_result(&mut self) -> Option<Result<T, ApiError>> {
        match self.result.try_recv() {
            Ok(value) => Some(Ok(value)),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Closed) => Some(Err(ApiError::TaskFailed)),
        }
    }
}

impl<T> Drop for InFlight<T> {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

// ============================================================================
// Tests
// ============================================================================
