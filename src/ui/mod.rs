// ============================================================================
// Module : ui
// ============================================================================
// Gère toute l'interface utilisateur (Terminal User Interface)
// ============================================================================

pub mod chart;  // Graphique de prix de la page détail
pub mod detail; // Rendu de la page détail
pub mod events; // Gestion des événements clavier/souris
pub mod home;   // Rendu de l'accueil (bandeau, recherche, movers)

use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
    Frame,
};

use crate::app::{App, Screen};

// Re-exports pour simplifier les imports
pub use events::{Event, EventHandler};

/// Dessine l'écran courant
///
/// CONCEPT RUST : Routing avec match sur enum
/// - Le compilateur garantit l'exhaustivité (tous les écrans gérés)
pub fn render(frame: &mut Frame, app: &App) {
    match &app.current_screen {
        Screen::Home => home::render_home(frame, app),
        Screen::Detail(_) => detail::render_detail(frame, app),
    }
}

// ============================================================================
// Helpers partagés par les footers
// ============================================================================

/// Raccourci clavier mis en évidence, suivi de son libellé
pub(crate) fn shortcut<'a>(key: &'a str, label: &'a str) -> Vec<Span<'a>> {
    vec![
        Span::styled(key, Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
        Span::raw(format!(" {}  ", label)),
    ]
}

/// Message de confirmation du two-step quit
pub(crate) fn quit_confirmation_line() -> Line<'static> {
    Line::from(vec![
        Span::styled(
            "⚠  Press ",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            "[q]",
            Style::default()
                .fg(Color::Red)
                .add_modifier(Modifier::BOLD)
                .add_modifier(Modifier::SLOW_BLINK),
        ),
        Span::styled(
            " again to quit, any other key to cancel ⚠",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        ),
    ])
}

/// Message d'erreur transitoire (ex: favoris non sauvegardés)
pub(crate) fn status_line(message: &str) -> Line<'_> {
    Line::from(Span::styled(
        message,
        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
    ))
}

/// Couleur d'une variation : vert si >= 0, rouge sinon
pub(crate) fn change_color(change: f64) -> Color {
    if change >= 0.0 {
        Color::Green
    } else {
        Color::Red
    }
}

/// Flèche d'une variation
pub(crate) fn change_arrow(change: f64) -> &'static str {
    if change >= 0.0 {
        "▲"
    } else {
        "▼"
    }
}
