// ============================================================================
// Accueil - Bandeau, recherche, top movers
// ============================================================================
// Dessine l'écran d'accueil :
//
//   ┌ Market Movers ───────────────────────────────┐  bandeau défilant
//   ┌ Search stocks ───────────────────────────────┐  champ de saisie
//   ┌ Results ─────────────────────────────────────┐  (si visibles)
//   ┌ Top Movers ──────────────────────────────────┐
//   ┌──────────────────────────────────────────────┐  raccourcis
//
// Le même calcul de layout sert au rendu et au hit-testing des clics souris.
//
// CONCEPTS RATATUI :
// 1. Layout : découpage de l'espace en zones
// 2. List + ListState : résultats avec ligne surlignée, défilement pour la
//    garder visible
// 3. Line/Span : texte multi-couleurs (bandeau)
// ============================================================================

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

use crate::api::client::SEARCH_LENGTH;
use crate::app::App;
use crate::models::{MoverEntry, StockSummary};
use crate::ui::{change_arrow, change_color, quit_confirmation_line, shortcut, status_line};

/// Nombre de lignes du panneau "Top Movers"
pub const TOP_MOVERS: usize = 6;

/// Séparateur entre deux titres du bandeau
const MARQUEE_SEPARATOR: &str = "   •   ";

// ============================================================================
// Layout + hit-testing
// ============================================================================

/// Zones de l'écran d'accueil
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HomeLayout {
    pub ticker: Rect,
    pub search: Rect,
    /// Liste déroulante, présente seulement si les résultats sont visibles
    pub results: Option<Rect>,
    pub movers: Rect,
    pub footer: Rect,
}

/// Cible d'un clic sur l'accueil
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HomeTarget {
    SearchBox,
    Result(usize),
    Elsewhere,
}

/// Calcule les zones de l'accueil
///
/// `visible_results` : None si la liste est masquée, sinon le nombre
/// d'entrées (0 = message "No stocks found")
pub fn layout(area: Rect, visible_results: Option<usize>) -> HomeLayout {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Bandeau
            Constraint::Length(3), // Recherche
            Constraint::Min(0),    // Résultats + movers
            Constraint::Length(3), // Footer
        ])
        .split(area);

    let body = chunks[2];
    let (results, movers) = match visible_results {
        Some(count) => {
            let rows = count.clamp(1, SEARCH_LENGTH as usize) as u16;
            let parts = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Length(rows + 2), Constraint::Min(0)])
                .split(body);
            (Some(parts[0]), parts[1])
        }
        None => (None, body),
    };

    HomeLayout {
        ticker: chunks[0],
        search: chunks[1],
        results,
        movers,
        footer: chunks[3],
    }
}

/// Layout correspondant à l'état courant de l'app
pub fn layout_for(area: Rect, app: &App) -> HomeLayout {
    let visible = app
        .search
        .results_visible()
        .then(|| app.search.results().len());
    layout(area, visible)
}

/// Index du premier résultat visible
///
/// La liste défile juste assez pour que la ligne surlignée reste la
/// dernière visible quand elle dépasse la hauteur de la zone.
pub fn results_offset(layout: &HomeLayout, highlighted: usize) -> usize {
    let Some(results) = layout.results else {
        return 0;
    };
    let visible_rows = results.height.saturating_sub(2).max(1) as usize;
    (highlighted + 1).saturating_sub(visible_rows)
}

/// Identifie la zone cliquée
///
/// `offset` : index du premier résultat visible (voir `results_offset`)
pub fn hit_test(
    layout: &HomeLayout,
    result_count: usize,
    offset: usize,
    column: u16,
    row: u16,
) -> HomeTarget {
    if contains(layout.search, column, row) {
        return HomeTarget::SearchBox;
    }

    if let Some(results) = layout.results {
        // Lignes intérieures (hors bordures)
        let first_row = results.y + 1;
        let inside_x = column > results.x && column < results.x + results.width.saturating_sub(1);
        if inside_x && row >= first_row {
            let index = offset + (row - first_row) as usize;
            if index < result_count && row < results.y + results.height.saturating_sub(1) {
                return HomeTarget::Result(index);
            }
        }
    }

    HomeTarget::Elsewhere
}

fn contains(rect: Rect, column: u16, row: u16) -> bool {
    column >= rect.x && column < rect.x + rect.width && row >= rect.y && row < rect.y + rect.height
}

// ============================================================================
// Rendu
// ============================================================================

/// Dessine l'écran d'accueil
pub fn render_home(frame: &mut Frame, app: &App) {
    let zones = layout_for(frame.size(), app);

    render_ticker_bar(frame, app, zones.ticker);
    render_search_box(frame, app, zones.search);
    if let Some(area) = zones.results {
        let offset = results_offset(&zones, app.search.highlighted());
        render_results(frame, app, area, offset);
    }
    render_top_movers(frame, app, zones.movers);
    render_footer(frame, app, zones.footer);
}

/// Bandeau défilant des movers
fn render_ticker_bar(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" 📈 LazyTicker · Market Movers ");

    let width = area.width.saturating_sub(2) as usize;
    let line = if app.feed.is_loading() {
        Line::from(Span::styled("Loading market movers...", Style::default().fg(Color::Gray)))
    } else if app.feed.entries().is_empty() {
        Line::from(Span::styled("No market data available", Style::default().fg(Color::Gray)))
    } else {
        marquee_line(app.feed.entries(), app.marquee_offset, width)
    };

    frame.render_widget(Paragraph::new(line).block(block), area);
}

/// Champ de recherche
fn render_search_box(frame: &mut Frame, app: &App, area: Rect) {
    let search = &app.search;
    let border = if search.is_focused() { Color::Yellow } else { Color::Gray };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border))
        .title(" 🔍 Search stocks ");

    let mut spans = Vec::new();
    if search.query().is_empty() && !search.is_focused() {
        spans.push(Span::styled(
            "Press / to search by name or symbol",
            Style::default().fg(Color::DarkGray),
        ));
    } else {
        spans.push(Span::styled(search.query(), Style::default().fg(Color::White)));
        if search.is_focused() {
            spans.push(Span::styled(
                "█",
                Style::default().fg(Color::White).add_modifier(Modifier::SLOW_BLINK),
            ));
        }
    }
    if search.is_loading() {
        spans.push(Span::styled("  ⏳ Searching...", Style::default().fg(Color::Cyan)));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}

/// Liste déroulante des résultats
fn render_results(frame: &mut Frame, app: &App, area: Rect, offset: usize) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .title(" Results ");

    let results = app.search.results();
    if results.is_empty() {
        let text = Line::from(Span::styled("No stocks found", Style::default().fg(Color::Gray)));
        frame.render_widget(Paragraph::new(text).block(block).alignment(Alignment::Center), area);
        return;
    }

    let items: Vec<ListItem> = results
        .iter()
        .map(|stock| {
            let style = if stock.is_navigable() {
                Style::default().fg(Color::White)
            } else {
                Style::default().fg(Color::DarkGray)
            };
            ListItem::new(result_row(stock)).style(style)
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().add_modifier(Modifier::BOLD).add_modifier(Modifier::REVERSED));

    // CONCEPT RATATUI : ListState porte la sélection et le décalage
    let mut state = ListState::default()
        .with_offset(offset)
        .with_selected(Some(app.search.highlighted()));

    frame.render_stateful_widget(list, area, &mut state);
}

/// Ligne d'un résultat : clé (symbole, sinon société), société, type
fn result_row(stock: &StockSummary) -> String {
    let company = if stock.is_navigable() { stock.company.as_str() } else { "" };
    format!(" {:<12} {:<40} {}", stock.list_key(), company, stock.kind)
}

/// Panneau des premiers movers
fn render_top_movers(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" 📊 Top Movers ");

    let movers = app.feed.top_movers(TOP_MOVERS);
    if movers.is_empty() {
        let message = if app.feed.is_loading() { "Loading..." } else { "No movers to show" };
        let text = vec![
            Line::from(""),
            Line::from(Span::styled(message, Style::default().fg(Color::Gray))),
        ];
        frame.render_widget(Paragraph::new(text).block(block).alignment(Alignment::Center), area);
        return;
    }

    let items: Vec<ListItem> = movers
        .iter()
        .map(|entry| {
            let percent = entry.percent();
            let line = format!(
                " {:<12} {:<32} {:>12}  {} {:+.2}%",
                entry.symbol,
                entry.company_name,
                format!("₹{:.2}", entry.price()),
                change_arrow(percent),
                percent
            );
            ListItem::new(line).style(Style::default().fg(change_color(percent)))
        })
        .collect();

    frame.render_widget(List::new(items).block(block), area);
}

/// Footer : raccourcis selon le focus, confirmation de quit ou erreur
fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let line = if let Some(message) = &app.status_message {
        status_line(message)
    } else if app.is_awaiting_quit_confirmation() {
        quit_confirmation_line()
    } else if app.search.is_focused() {
        Line::from(
            [
                shortcut("[↑↓]", "Highlight"),
                shortcut("[Enter]", "Open"),
                shortcut("[Esc]", "Leave search"),
                shortcut("[Ctrl+C]", "Quit"),
            ]
            .concat(),
        )
    } else {
        Line::from([shortcut("[/ i]", "Search"), shortcut("[q]", "Quit")].concat())
    };

    frame.render_widget(Paragraph::new(line).block(block).alignment(Alignment::Center), area);
}

// ============================================================================
// Bandeau défilant
// ============================================================================
// CONCEPT : Rotation caractère par caractère
// - Le texte complet est une suite de (char, couleur)
// - On commence à `offset % longueur` et on boucle pour remplir la largeur
// - Les caractères consécutifs de même couleur sont regroupés en Spans
// ============================================================================

/// Contenu du bandeau, décalé de `offset` caractères, sur `width` colonnes
pub fn marquee_line(entries: &[MoverEntry], offset: usize, width: usize) -> Line<'static> {
    let cells = marquee_cells(entries);
    if cells.is_empty() || width == 0 {
        return Line::default();
    }

    let start = offset % cells.len();
    let mut spans: Vec<Span<'static>> = Vec::new();
    let mut current = String::new();
    let mut current_color = cells[start].1;

    for i in 0..width {
        let (c, color) = cells[(start + i) % cells.len()];
        if color != current_color && !current.is_empty() {
            spans.push(Span::styled(std::mem::take(&mut current), Style::default().fg(current_color)));
        }
        current_color = color;
        current.push(c);
    }
    spans.push(Span::styled(current, Style::default().fg(current_color)));

    Line::from(spans)
}

fn marquee_cells(entries: &[MoverEntry]) -> Vec<(char, Color)> {
    let mut cells = Vec::new();
    for entry in entries {
        let percent = entry.percent();
        let text = format!(
            "{} ₹{:.2} {} {:+.2}%",
            entry.symbol,
            entry.price(),
            change_arrow(percent),
            percent
        );
        let color = change_color(percent);
        cells.extend(text.chars().map(|c| (c, color)));
        cells.extend(MARQUEE_SEPARATOR.chars().map(|c| (c, Color::DarkGray)));
    }
    cells
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn line_text(line: &Line) -> String {
        line.spans.iter().map(|span| span.content.as_ref()).collect()
    }

    fn mover(symbol: &str, close: f64, percent: f64) -> MoverEntry {
        MoverEntry {
            close: Some(close),
            change_percent: Some(percent),
            ..MoverEntry::new(symbol)
        }
    }

    #[test]
    fn test_marquee_scrolls_and_wraps() {
        let entries = vec![mover("TCS", 3850.5, 1.25)];

        let first = line_text(&marquee_line(&entries, 0, 12));
        assert_eq!(first, "TCS ₹3850.50");

        let shifted = line_text(&marquee_line(&entries, 4, 8));
        assert_eq!(shifted, "₹3850.50");

        // Le texte complet fait une boucle : même rendu après un tour
        let full_len = marquee_cells(&entries).len();
        assert_eq!(
            line_text(&marquee_line(&entries, full_len + 4, 8)),
            shifted
        );
    }

    #[test]
    fn test_marquee_colors_follow_change() {
        let entries = vec![mover("UP", 10.0, 2.0), mover("DOWN", 10.0, -2.0)];
        let line = marquee_line(&entries, 0, 200);

        assert!(line.spans.iter().any(|s| s.content.contains("UP") && s.style.fg == Some(Color::Green)));
        assert!(line.spans.iter().any(|s| s.content.contains("DOWN") && s.style.fg == Some(Color::Red)));
    }

    #[test]
    fn test_marquee_empty() {
        assert!(marquee_line(&[], 3, 40).spans.is_empty());
    }

    #[test]
    fn test_layout_without_results() {
        let zones = layout(Rect::new(0, 0, 80, 30), None);
        assert_eq!(zones.ticker, Rect::new(0, 0, 80, 3));
        assert_eq!(zones.search, Rect::new(0, 3, 80, 3));
        assert_eq!(zones.results, None);
        assert_eq!(zones.footer, Rect::new(0, 27, 80, 3));
    }

    #[test]
    fn test_hit_test() {
        let zones = layout(Rect::new(0, 0, 80, 30), Some(3));
        let results = zones.results.unwrap();
        assert_eq!(results, Rect::new(0, 6, 80, 5));

        assert_eq!(hit_test(&zones, 3, 0, 10, 4), HomeTarget::SearchBox);
        assert_eq!(hit_test(&zones, 3, 0, 10, 7), HomeTarget::Result(0));
        assert_eq!(hit_test(&zones, 3, 0, 10, 9), HomeTarget::Result(2));

        // Bordure basse de la liste, puis zone des movers
        assert_eq!(hit_test(&zones, 3, 0, 10, 10), HomeTarget::Elsewhere);
        assert_eq!(hit_test(&zones, 3, 0, 10, 20), HomeTarget::Elsewhere);

        // Sans résultats : la ligne "No stocks found" n'est pas une cible
        let empty = layout(Rect::new(0, 0, 80, 30), Some(0));
        assert_eq!(hit_test(&empty, 0, 0, 10, 7), HomeTarget::Elsewhere);
    }

    #[test]
    fn test_results_scroll_to_highlight() {
        // 12 résultats, 10 lignes visibles
        let zones = layout(Rect::new(0, 0, 80, 40), Some(12));
        assert_eq!(zones.results, Some(Rect::new(0, 6, 80, 12)));

        assert_eq!(results_offset(&zones, 0), 0);
        assert_eq!(results_offset(&zones, 9), 0);
        assert_eq!(results_offset(&zones, 11), 2);

        // Liste décalée de 2 : la première ligne est le résultat 2
        assert_eq!(hit_test(&zones, 12, 2, 10, 7), HomeTarget::Result(2));
        assert_eq!(hit_test(&zones, 12, 2, 10, 16), HomeTarget::Result(11));

        assert_eq!(results_offset(&layout(Rect::new(0, 0, 80, 40), None), 11), 0);
    }

    #[test]
    fn test_result_row_uses_list_key() {
        let listed = StockSummary::new(Some("TCS".to_string()), "Tata Consultancy");
        let unlisted = StockSummary::new(None, "Nifty Bank");

        assert!(result_row(&listed).starts_with(" TCS "));
        assert!(result_row(&listed).contains("Tata Consultancy"));
        assert!(result_row(&unlisted).starts_with(" Nifty Bank "));
    }
}
