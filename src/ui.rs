use crate::app::App;
use crate::map::MapLayers;
use crate::risk::{station_ratio, RiskBand};
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
    Frame,
};

/// Render the UI
pub fn render(frame: &mut Frame, app: &mut App) {
    let area = frame.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // Header
            Constraint::Min(3),    // Map + detail panel
            Constraint::Length(1), // Legend
            Constraint::Length(1), // Status bar
        ])
        .split(area);

    render_header(frame, chunks[0]);

    // Detail panel claims a fixed column when a district is selected
    let main = if app.selected.is_some() {
        Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(30), Constraint::Length(42)])
            .split(chunks[1])
    } else {
        Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(30)])
            .split(chunks[1])
    };

    render_map(frame, app, main[0]);
    if app.selected.is_some() {
        render_detail(frame, app, main[1]);
    }

    render_legend(frame, chunks[2]);
    render_status_bar(frame, app, chunks[3]);
}

fn render_header(frame: &mut Frame, area: Rect) {
    let title = Line::from(vec![
        Span::styled(
            " FloodStatus ",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            "— 실시간 하천 수위 모니터링",
            Style::default().fg(Color::DarkGray),
        ),
    ]);
    let subtitle = Line::from(Span::styled(
        " Click a district for live gauge readings",
        Style::default().fg(Color::DarkGray),
    ));
    frame.render_widget(Paragraph::new(vec![title, subtitle]), area);
}

fn render_map(frame: &mut Frame, app: &mut App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(Span::styled(
            " 서울 하천 수위 지도 ",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let proj = app.fit_to(inner).clone();
    let layers = app
        .map
        .render(inner.width as usize, inner.height as usize, &proj, |name| {
            app.fill_for(name)
        });

    let widget = MapWidget {
        layers,
        cursor_pos: app.cursor_in_map(),
    };
    frame.render_widget(widget, inner);
}

/// Custom widget layering per-district fills, outlines, labels and the
/// mouse cursor marker.
struct MapWidget {
    layers: MapLayers,
    cursor_pos: Option<(u16, u16)>,
}

impl MapWidget {
    fn render_canvas(
        canvas: &crate::braille::BrailleCanvas,
        color: Color,
        area: Rect,
        buf: &mut Buffer,
    ) {
        for (row_idx, row_str) in canvas.rows().enumerate() {
            if row_idx >= area.height as usize {
                break;
            }
            let y = area.y + row_idx as u16;

            for (col_idx, ch) in row_str.chars().enumerate() {
                if col_idx >= area.width as usize {
                    break;
                }
                // Skip empty braille characters (U+2800)
                if ch == '\u{2800}' {
                    continue;
                }
                let x = area.x + col_idx as u16;
                buf[(x, y)].set_char(ch).set_fg(color);
            }
        }
    }
}

impl Widget for MapWidget {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // District fills first, then shared outlines on top
        for layer in &self.layers.fills {
            Self::render_canvas(&layer.canvas, layer.color, area, buf);
        }
        Self::render_canvas(&self.layers.outlines, Color::White, area, buf);

        // District name labels
        let label_style = Style::default().fg(Color::White).add_modifier(Modifier::BOLD);
        for (lx, ly, text) in &self.layers.labels {
            if *ly >= area.height || *lx >= area.width {
                continue;
            }
            let y = area.y + *ly;
            for (i, ch) in text.chars().enumerate() {
                let x = area.x + *lx + i as u16;
                if x < area.x + area.width {
                    buf[(x, y)].set_char(ch).set_style(label_style);
                }
            }
        }

        // Mouse cursor marker
        if let Some((cx, cy)) = self.cursor_pos {
            if cx < area.width && cy < area.height {
                buf[(area.x + cx, area.y + cy)].set_char('╋').set_fg(Color::Red);
            }
        }
    }
}

fn render_detail(frame: &mut Frame, app: &App, area: Rect) {
    let Some(district) = app.selected.as_deref() else {
        return;
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(Span::styled(
            format!(" {district} "),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ));

    let mut lines: Vec<Line> = Vec::new();

    if app.detail.is_empty() {
        let message = if app.loading {
            "Loading river readings...".to_string()
        } else {
            format!("No live river readings for {district}")
        };
        lines.push(Line::from(Span::styled(
            message,
            Style::default().fg(Color::DarkGray),
        )));
    }

    for group in &app.detail {
        lines.push(Line::from(Span::styled(
            group.river.clone(),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )));

        for station in &group.stations {
            lines.push(Line::from(vec![
                Span::raw("  "),
                Span::styled(
                    station.station.clone(),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
                Span::styled(
                    format!(" ({})", station.district),
                    Style::default().fg(Color::DarkGray),
                ),
            ]));

            let current = station
                .current_level
                .map(|v| format!("{v:.2}m"))
                .unwrap_or_else(|| "-".to_string());
            let planned = station
                .planned_flood_level
                .map(|v| format!("{v:.2}m"))
                .unwrap_or_else(|| "-".to_string());
            lines.push(Line::from(vec![
                Span::raw("    level "),
                Span::styled(current, Style::default().fg(Color::LightBlue)),
                Span::raw(format!(" / plan {planned}")),
            ]));

            let band = station_ratio(station)
                .map(RiskBand::from_score)
                .unwrap_or(RiskBand::NoData);
            let ratio_text = station_ratio(station)
                .map(|r| format!(" ({:.0}%)", r * 100.0))
                .unwrap_or_default();
            lines.push(Line::from(vec![
                Span::raw("    risk  "),
                Span::styled(
                    format!("{}{}", band.label(), ratio_text),
                    Style::default().fg(band.color()).add_modifier(Modifier::BOLD),
                ),
            ]));

            if let Some(ts) = station.observed_at {
                lines.push(Line::from(Span::styled(
                    format!("    at {}", ts.format("%Y-%m-%d %H:%M")),
                    Style::default().fg(Color::DarkGray),
                )));
            }
            lines.push(Line::default());
        }
    }

    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((app.detail_scroll, 0));
    frame.render_widget(paragraph, area);
}

fn render_legend(frame: &mut Frame, area: Rect) {
    let entry = |band: RiskBand, text: &'static str| {
        [
            Span::styled("■", Style::default().fg(band.color())),
            Span::styled(format!(" {text}  "), Style::default().fg(Color::Gray)),
        ]
    };

    let mut spans = vec![Span::raw(" ")];
    spans.extend(entry(RiskBand::Danger, "danger ≥95%"));
    spans.extend(entry(RiskBand::Alert, "alert ≥85%"));
    spans.extend(entry(RiskBand::Caution, "caution ≥70%"));
    spans.extend(entry(RiskBand::Advisory, "advisory ≥30%"));
    spans.extend(entry(RiskBand::NoData, "no data"));

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let updated = app
        .last_updated
        .map(|ts| ts.format("%H:%M:%S").to_string())
        .unwrap_or_else(|| "--:--:--".to_string());

    let status = Line::from(vec![
        Span::styled(" updated ", Style::default().fg(Color::DarkGray)),
        Span::styled(updated, Style::default().fg(Color::Yellow)),
        Span::styled(
            if app.loading { "  fetching… " } else { "  " },
            Style::default().fg(Color::LightBlue),
        ),
        Span::styled(
            "| click:select tab:cycle r:refresh l:labels esc:close q:quit ",
            Style::default().fg(Color::DarkGray),
        ),
        Span::styled(
            "| reference only — follow official advisories",
            Style::default().fg(Color::DarkGray),
        ),
    ]);

    frame.render_widget(Paragraph::new(status), area);
}
