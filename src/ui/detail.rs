// ============================================================================
// Page détail - Rendu
// ============================================================================
// Header (symbole, société, type, favori), résumé du dernier prix,
// onglets de plage et graphique
// ============================================================================

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Tabs},
    Frame,
};

use crate::app::App;
use crate::detail::{DetailPhase, StockDetail};
use crate::models::TimeRange;
use crate::ui::{chart, change_arrow, change_color, quit_confirmation_line, shortcut, status_line};

/// Dessine la page détail
pub fn render_detail(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Length(4), // Résumé
            Constraint::Length(3), // Plages
            Constraint::Min(0),    // Graphique
            Constraint::Length(3), // Footer
        ])
        .split(frame.size());

    render_footer(frame, app, chunks[4]);

    let Some(detail) = app.detail.as_ref() else {
        return;
    };

    // Chargement / introuvable : un seul panneau sur toute la zone centrale
    let body = Rect {
        height: chunks[0].height + chunks[1].height + chunks[2].height + chunks[3].height,
        ..chunks[0]
    };
    match detail.phase() {
        DetailPhase::Loading => {
            render_message(frame, body, detail.symbol(), "Loading...", Color::Cyan);
        }
        DetailPhase::NotFound => {
            render_message(frame, body, detail.symbol(), "Stock not found", Color::Red);
        }
        DetailPhase::Ready => {
            render_header(frame, detail, chunks[0]);
            render_summary(frame, detail, chunks[1]);
            render_ranges(frame, detail.range(), chunks[2]);
            chart::render_price_chart(frame, detail, chunks[3]);
        }
    }
}

/// Symbole, société, type et indicateur favori
fn render_header(frame: &mut Frame, detail: &StockDetail, area: Rect) {
    let (symbol, company, kind) = match detail.stock() {
        Some(stock) => (
            stock.symbol.as_deref().unwrap_or(detail.symbol()),
            stock.company.as_str(),
            stock.kind.as_str(),
        ),
        None => (detail.symbol(), "", ""),
    };

    let heart = if detail.is_favorite() {
        Span::styled("♥ Favorite", Style::default().fg(Color::Red).add_modifier(Modifier::BOLD))
    } else {
        Span::styled("♡", Style::default().fg(Color::Gray))
    };

    let line = Line::from(vec![
        Span::styled(symbol, Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
        Span::raw("  "),
        Span::styled(company, Style::default().fg(Color::White)),
        Span::raw("  "),
        Span::styled(format!("[{}]", kind), Style::default().fg(Color::DarkGray)),
        Span::raw("  "),
        heart,
    ]);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    frame.render_widget(Paragraph::new(line).block(block).alignment(Alignment::Center), area);
}

/// Dernier prix, variation du jour et OHLC/volume du dernier point
fn render_summary(frame: &mut Frame, detail: &StockDetail, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let (Some(latest), Some(change)) = (detail.latest(), detail.day_change()) else {
        let text = Line::from(Span::styled("No price data", Style::default().fg(Color::Gray)));
        frame.render_widget(Paragraph::new(text).block(block).alignment(Alignment::Center), area);
        return;
    };

    let color = change_color(change);
    let percent = if latest.open != 0.0 { change / latest.open * 100.0 } else { 0.0 };

    let price_line = Line::from(vec![
        Span::styled(
            format!("₹{:.2}", latest.close),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled(
            format!("{} {:+.2} ({:+.2}%)", change_arrow(change), change, percent),
            Style::default().fg(color),
        ),
    ]);

    let ohlc_line = Line::from(Span::styled(
        format!(
            "O {:.2}   H {:.2}   L {:.2}   Vol {:.0}",
            latest.open, latest.high, latest.low, latest.volume
        ),
        Style::default().fg(Color::Gray),
    ));

    frame.render_widget(
        Paragraph::new(vec![price_line, ohlc_line])
            .block(block)
            .alignment(Alignment::Center),
        area,
    );
}

/// Onglets 1D / 1W / 1M / 3M
fn render_ranges(frame: &mut Frame, selected: TimeRange, area: Rect) {
    let titles: Vec<Line> = TimeRange::ALL
        .iter()
        .enumerate()
        .map(|(i, range)| Line::from(format!("{} {}", i + 1, range.label())))
        .collect();

    let index = TimeRange::ALL.iter().position(|r| *r == selected).unwrap_or_default();

    let tabs = Tabs::new(titles)
        .block(Block::default().borders(Borders::ALL).title(" Range "))
        .select(index)
        .style(Style::default().fg(Color::Gray))
        .highlight_style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD));

    frame.render_widget(tabs, area);
}

fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let line = if let Some(message) = &app.status_message {
        status_line(message)
    } else if app.is_awaiting_quit_confirmation() {
        quit_confirmation_line()
    } else {
        Line::from(
            [
                shortcut("[h l / ← →]", "Range"),
                shortcut("[1-4]", "Pick range"),
                shortcut("[f]", "Favorite"),
                shortcut("[Esc]", "Back"),
                shortcut("[q]", "Quit"),
            ]
            .concat(),
        )
    };

    frame.render_widget(Paragraph::new(line).block(block).alignment(Alignment::Center), area);
}

fn render_message(frame: &mut Frame, area: Rect, symbol: &str, message: &str, color: Color) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color))
        .title(format!(" {} ", symbol));

    let text = vec![
        Line::from(""),
        Line::from(Span::styled(message.to_string(), Style::default().fg(color))),
        Line::from(""),
        Line::from(Span::styled("[Esc] Back", Style::default().fg(Color::Gray))),
    ];

    frame.render_widget(Paragraph::new(text).block(block).alignment(Alignment::Center), area);
}
