// ============================================================================
// Chart - Graphique de prix de la page détail
// ============================================================================
// Affiche la série de clôtures de la plage sélectionnée en graphique ligne
//
// CONCEPTS RUST :
// 1. Iterator fold : min/max en un seul passage
// 2. Fonctions pures (bornes, labels) testables sans terminal
//
// CONCEPTS RATATUI :
// 1. Chart widget : graphique ligne
// 2. Dataset : série de données à afficher
// 3. Axis : configuration des axes X et Y
// ============================================================================

use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Style},
    symbols,
    text::{Line, Span},
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph},
    Frame,
};

use crate::detail::StockDetail;
use crate::models::{Granularity, PricePoint};
use crate::ui::change_color;

/// Dessine le graphique de la page détail
pub fn render_price_chart(frame: &mut Frame, detail: &StockDetail, area: Rect) {
    let range = detail.range();
    let title = format!(" {} · {} ", detail.symbol(), range.label());

    if detail.chart_loading() {
        render_message(frame, area, &title, "Loading chart...", Color::Cyan);
        return;
    }

    let prices = detail.prices();
    let Some((y_min, y_max)) = y_bounds(prices) else {
        render_message(frame, area, &title, "No price data for this range", Color::Gray);
        return;
    };

    let points: Vec<(f64, f64)> = prices
        .iter()
        .enumerate()
        .map(|(i, point)| (i as f64, point.close))
        .collect();

    // Couleur selon la variation sur la plage
    let first = prices.first().map(|p| p.close).unwrap_or_default();
    let last = prices.last().map(|p| p.close).unwrap_or_default();
    let color = change_color(last - first);

    let datasets = vec![Dataset::default()
        .name(detail.symbol())
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(color))
        .data(&points)];

    let granularity = range.query().granularity;
    let x_axis = Axis::default()
        .style(Style::default().fg(Color::Gray))
        .bounds([0.0, points.len().saturating_sub(1).max(1) as f64])
        .labels(x_labels(prices, granularity).into_iter().map(Span::raw).collect());

    let y_axis = Axis::default()
        .title("₹")
        .style(Style::default().fg(Color::Gray))
        .bounds([y_min, y_max])
        .labels(vec![
            Span::raw(format!("{:.0}", y_min)),
            Span::raw(format!("{:.0}", (y_min + y_max) / 2.0)),
            Span::raw(format!("{:.0}", y_max)),
        ]);

    let chart = Chart::new(datasets)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::White))
                .title(title),
        )
        .x_axis(x_axis)
        .y_axis(y_axis);

    frame.render_widget(chart, area);
}

/// Bornes de l'axe Y avec 5% de marge (None si la série est vide)
pub fn y_bounds(prices: &[PricePoint]) -> Option<(f64, f64)> {
    if prices.is_empty() {
        return None;
    }

    let (min_price, max_price) = prices.iter().fold((f64::MAX, f64::MIN), |(min, max), p| {
        (min.min(p.close), max.max(p.close))
    });

    // Série plate : on ouvre quand même une fenêtre visible
    let margin = match (max_price - min_price) * 0.05 {
        m if m > 0.0 => m,
        _ => (max_price.abs() * 0.01).max(1.0),
    };

    Some(((min_price - margin).max(0.0), max_price + margin))
}

/// Labels de l'axe X : début, milieu, fin
///
/// - intraday : heure (HH:MM)
/// - daily : jour et mois (15 Mar)
/// - timestamp illisible : affiché tel quel
pub fn x_labels(prices: &[PricePoint], granularity: Granularity) -> Vec<String> {
    let format = match granularity {
        Granularity::Intraday => "%H:%M",
        Granularity::Daily => "%d %b",
    };

    let label = |point: &PricePoint| match point.parsed_time() {
        Some(time) => time.format(format).to_string(),
        None => point.timestamp.clone(),
    };

    match prices {
        [] => Vec::new(),
        [only] => vec![label(only)],
        [first, .., last] => vec![label(first), label(&prices[prices.len() / 2]), label(last)],
    }
}

/// Message à la place du graphique
fn render_message(frame: &mut Frame, area: Rect, title: &str, message: &str, color: Color) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color))
        .title(title.to_string());

    let text = vec![
        Line::from(""),
        Line::from(Span::styled(message.to_string(), Style::default().fg(color))),
    ];

    frame.render_widget(Paragraph::new(text).block(block).alignment(Alignment::Center), area);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(timestamp: &str, close: f64) -> PricePoint {
        PricePoint::new(timestamp, close, close, close, close, 0.0)
    }

    #[test]
    fn test_y_bounds_margin() {
        let prices = vec![point("2024-03-01", 100.0), point("2024-03-02", 200.0)];
        let (min, max) = y_bounds(&prices).unwrap();
        assert_eq!(min, 95.0);
        assert_eq!(max, 205.0);

        assert_eq!(y_bounds(&[]), None);
    }

    #[test]
    fn test_y_bounds_flat_series() {
        let (min, max) = y_bounds(&[point("2024-03-01", 500.0)]).unwrap();
        assert!(min < 500.0 && max > 500.0);
    }

    #[test]
    fn test_x_labels_by_granularity() {
        let daily = vec![
            point("2024-03-01", 1.0),
            point("2024-03-15", 1.0),
            point("2024-03-29", 1.0),
        ];
        assert_eq!(x_labels(&daily, Granularity::Daily), vec!["01 Mar", "15 Mar", "29 Mar"]);

        let intraday = vec![
            point("2024-03-15 09:15:00", 1.0),
            point("2024-03-15 12:30:00", 1.0),
            point("2024-03-15 15:30:00", 1.0),
        ];
        assert_eq!(x_labels(&intraday, Granularity::Intraday), vec!["09:15", "12:30", "15:30"]);

        assert_eq!(x_labels(&[point("yesterday", 1.0)], Granularity::Daily), vec!["yesterday"]);
    }
}
