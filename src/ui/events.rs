// ============================================================================
// Gestion des événements
// ============================================================================
// Gère les événements clavier, souris et les ticks de l'application
//
// CONCEPTS RUST :
// 1. Enums avec variants : représenter différents types d'événements
// 2. Pattern matching avec guards : filtrer touches et modificateurs
// 3. Error handling avec Result
// ============================================================================

use std::time::Duration;

use anyhow::Result;
use crossterm::event::{
    self, Event as CrosstermEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton,
    MouseEvent, MouseEventKind,
};

use crate::models::TimeRange;

/// Timeout par défaut du poll : assez court pour que debounce (300 ms) et
/// masquage (200 ms) se déclenchent à l'heure
pub const DEFAULT_POLL_TIMEOUT: Duration = Duration::from_millis(50);

// ============================================================================
// Enum Event
// ============================================================================

/// Événements de l'application
#[derive(Debug, Clone)]
pub enum Event {
    /// Touche pressée
    Key(KeyEvent),

    /// Action souris (clic, molette...)
    Mouse(MouseEvent),

    /// Tick régulier (pas d'événement pendant le timeout)
    Tick,
}

/// Gestionnaire d'événements
pub struct EventHandler {
    poll_timeout: Duration,
}

impl EventHandler {
    /// Crée un gestionnaire avec le timeout de poll donné
    pub fn new(poll_timeout: Duration) -> Self {
        Self { poll_timeout }
    }

    /// Lit le prochain événement (bloquant avec timeout)
    ///
    /// CONCEPT : Non-blocking I/O avec timeout
    /// - Si pas d'événement avant le timeout, retourne Ok(Event::Tick)
    /// - Les relâchements de touche sont ignorés (doublons sur certains OS)
    pub fn next(&self) -> Result<Event> {
        if !event::poll(self.poll_timeout)? {
            return Ok(Event::Tick);
        }

        let event = match event::read()? {
            CrosstermEvent::Key(key) if key.kind == KeyEventKind::Press => Event::Key(key),
            CrosstermEvent::Mouse(mouse) => Event::Mouse(mouse),
            // Resize, focus, paste, relâchements : le prochain draw suffit
            _ => Event::Tick,
        };
        Ok(event)
    }
}

impl Default for EventHandler {
    fn default() -> Self {
        Self::new(DEFAULT_POLL_TIMEOUT)
    }
}

// ============================================================================
// Helpers : Convertir un événement en action
// ============================================================================

/// Ctrl+C : quitte immédiatement, quel que soit l'écran
pub fn is_ctrl_c_event(event: &Event) -> bool {
    if let Event::Key(key) = event {
        key.modifiers.contains(KeyModifiers::CONTROL) && matches!(key.code, KeyCode::Char('c') | KeyCode::Char('C'))
    } else {
        false
    }
}

/// Vérifie si l'événement est la touche 'q' (quitter)
pub fn is_quit_event(event: &Event) -> bool {
    if let Event::Key(key) = event {
        matches!(key.code, KeyCode::Char('q') | KeyCode::Char('Q'))
    } else {
        false
    }
}

/// Vérifie si l'événement est Échap
pub fn is_escape_event(event: &Event) -> bool {
    matches!(event, Event::Key(key) if key.code == KeyCode::Esc)
}

/// Vérifie si l'événement est Entrée
pub fn is_enter_event(event: &Event) -> bool {
    matches!(event, Event::Key(key) if key.code == KeyCode::Enter)
}

/// Vérifie si l'événement est Backspace
pub fn is_backspace_event(event: &Event) -> bool {
    matches!(event, Event::Key(key) if key.code == KeyCode::Backspace)
}

/// Flèche vers le haut (pas de 'k' : le champ de recherche capture les lettres)
pub fn is_up_event(event: &Event) -> bool {
    matches!(event, Event::Key(key) if key.code == KeyCode::Up)
}

/// Flèche vers le bas
pub fn is_down_event(event: &Event) -> bool {
    matches!(event, Event::Key(key) if key.code == KeyCode::Down)
}

/// '/' ou 'i' : focalise le champ de recherche (Vim-like)
pub fn is_focus_search_event(event: &Event) -> bool {
    if let Event::Key(key) = event {
        matches!(key.code, KeyCode::Char('/') | KeyCode::Char('i'))
    } else {
        false
    }
}

/// 'l' ou → : plage suivante
pub fn is_next_range_event(event: &Event) -> bool {
    if let Event::Key(key) = event {
        matches!(key.code, KeyCode::Char('l') | KeyCode::Right)
    } else {
        false
    }
}

/// 'h' ou ← : plage précédente
pub fn is_previous_range_event(event: &Event) -> bool {
    if let Event::Key(key) = event {
        matches!(key.code, KeyCode::Char('h') | KeyCode::Left)
    } else {
        false
    }
}

/// '1'..'4' : plage directe
pub fn get_range_from_event(event: &Event) -> Option<TimeRange> {
    match event {
        Event::Key(key) => match key.code {
            KeyCode::Char(c) => TimeRange::from_digit(c),
            _ => None,
        },
        _ => None,
    }
}

/// 'f' : bascule le favori
pub fn is_favorite_event(event: &Event) -> bool {
    if let Event::Key(key) = event {
        matches!(key.code, KeyCode::Char('f') | KeyCode::Char('F'))
    } else {
        false
    }
}

/// Extrait le caractère tapé (sans Ctrl/Alt)
pub fn get_char_from_event(event: &Event) -> Option<char> {
    let Event::Key(key) = event else {
        return None;
    };
    if key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) {
        return None;
    }
    match key.code {
        KeyCode::Char(c) => Some(c),
        _ => None,
    }
}

/// Position (colonne, ligne) d'un clic gauche
pub fn get_left_click(event: &Event) -> Option<(u16, u16)> {
    match event {
        Event::Mouse(mouse) if mouse.kind == MouseEventKind::Down(MouseButton::Left) => {
            Some((mouse.column, mouse.row))
        }
        _ => None,
    }
}

// ============================================================================
// Tests
// ============================================================================
