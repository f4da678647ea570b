// Terminal renderings of the five EDA charts

use healthcare_eda::{BarSeries, HistogramChart, Orientation, PieChart};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{
        canvas::{Canvas, Points},
        Axis, Bar, BarChart, BarGroup, Block, Borders, Chart, Dataset as ChartDataset, GraphType,
        Paragraph,
    },
    Frame,
};

pub const SLICE_COLORS: [Color; 6] = [
    Color::Blue,
    Color::Rgb(221, 132, 82),
    Color::Green,
    Color::Red,
    Color::Magenta,
    Color::Yellow,
];

fn chart_block(title: &str) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::White))
        .title(format!(" {} ", title))
}

fn empty_chart(f: &mut Frame, area: Rect, title: &str) {
    let paragraph = Paragraph::new("No data").block(chart_block(title));
    f.render_widget(paragraph, area);
}

/// Histogram bars as outlines plus the density curve
pub fn render_histogram(f: &mut Frame, area: Rect, chart: &HistogramChart) {
    let hist = &chart.histogram;
    let (Some(&lo), Some(&hi)) = (hist.edges.first(), hist.edges.last()) else {
        empty_chart(f, area, &chart.title);
        return;
    };

    let mut outline = Vec::with_capacity(hist.counts.len() * 4);
    for (left, right, count) in hist.bins() {
        let c = count as f64;
        outline.extend_from_slice(&[(left, 0.0), (left, c), (right, c), (right, 0.0)]);
    }

    let y_max = chart
        .kde
        .iter()
        .map(|(_, y)| *y)
        .fold(hist.max_count() as f64, f64::max)
        .max(1.0)
        .ceil();

    let datasets = vec![
        ChartDataset::default()
            .name("Patients")
            .marker(Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(Color::Cyan))
            .data(&outline),
        ChartDataset::default()
            .name("KDE")
            .marker(Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(Color::Red))
            .data(&chart.kde),
    ];

    let mid = (lo + hi) / 2.0;
    let widget = Chart::new(datasets)
        .block(chart_block(&chart.title))
        .x_axis(
            Axis::default()
                .title(chart.x_label.as_str())
                .style(Style::default().fg(Color::Gray))
                .bounds([lo, hi])
                .labels(vec![
                    Span::raw(format!("{:.0}", lo)),
                    Span::raw(format!("{:.0}", mid)),
                    Span::raw(format!("{:.0}", hi)),
                ]),
        )
        .y_axis(
            Axis::default()
                .title(chart.y_label.as_str())
                .style(Style::default().fg(Color::Gray))
                .bounds([0.0, y_max])
                .labels(vec![
                    Span::raw("0"),
                    Span::raw(format!("{:.0}", y_max / 2.0)),
                    Span::raw(format!("{:.0}", y_max)),
                ]),
        );

    f.render_widget(widget, area);
}

/// Index of the slice containing `angle` (degrees, counterclockwise)
pub fn slice_for_angle(angles: &[(f64, f64)], angle: f64) -> Option<usize> {
    let (first_start, _) = *angles.first()?;
    // Shift into the sweep that starts at the first slice
    let offset = (angle - first_start).rem_euclid(360.0);
    let idx = angles
        .iter()
        .position(|(start, end)| offset >= start - first_start && offset < end - first_start);
    // Percentages may not sum to exactly 100; the last slice closes the circle
    Some(idx.unwrap_or(angles.len() - 1))
}

/// Pie drawn on a braille canvas with a legend beside it
pub fn render_pie(f: &mut Frame, area: Rect, chart: &PieChart) {
    if chart.slices.is_empty() {
        empty_chart(f, area, &chart.title);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(20), Constraint::Length(30)])
        .split(area);

    let angles = chart.slice_angles();
    let mut coords: Vec<Vec<(f64, f64)>> = vec![Vec::new(); chart.slices.len()];

    const STEPS: i32 = 80;
    for i in -STEPS..=STEPS {
        for j in -STEPS..=STEPS {
            let (x, y) = (i as f64 / STEPS as f64, j as f64 / STEPS as f64);
            if x * x + y * y > 1.0 {
                continue;
            }
            let angle = y.atan2(x).to_degrees();
            if let Some(idx) = slice_for_angle(&angles, angle) {
                coords[idx].push((x, y));
            }
        }
    }

    // Terminal cells are about twice as tall as wide; widen x so the pie stays round
    let canvas_area = chunks[0];
    let inner_w = canvas_area.width.saturating_sub(2).max(1) as f64;
    let inner_h = canvas_area.height.saturating_sub(2).max(1) as f64;
    let y_span = 1.1;
    let x_span = (y_span * inner_w / (inner_h * 2.0)).max(y_span);

    let canvas = Canvas::default()
        .block(chart_block(&chart.title))
        .marker(Marker::Braille)
        .x_bounds([-x_span, x_span])
        .y_bounds([-y_span, y_span])
        .paint(|ctx| {
            for (i, points) in coords.iter().enumerate() {
                ctx.draw(&Points {
                    coords: points,
                    color: SLICE_COLORS[i % SLICE_COLORS.len()],
                });
            }
            for (slice, (start, end)) in chart.slices.iter().zip(&angles) {
                let mid = ((start + end) / 2.0).to_radians();
                ctx.print(
                    0.6 * mid.cos(),
                    0.6 * mid.sin(),
                    Span::styled(
                        slice.percent_label(),
                        Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
                    ),
                );
            }
        });
    f.render_widget(canvas, canvas_area);

    let legend: Vec<Line> = chart
        .slices
        .iter()
        .enumerate()
        .flat_map(|(i, slice)| {
            [
                Line::from(vec![
                    Span::styled("██ ", Style::default().fg(SLICE_COLORS[i % SLICE_COLORS.len()])),
                    Span::styled(slice.label.clone(), Style::default().add_modifier(Modifier::BOLD)),
                ]),
                Line::from(format!("   {} patients ({})", slice.count, slice.percent_label())),
            ]
        })
        .collect();

    let legend = Paragraph::new(legend).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(" Legend "),
    );
    f.render_widget(legend, chunks[1]);
}

/// Count plot or average-value bars
pub fn render_bars(f: &mut Frame, area: Rect, series: &BarSeries) {
    if series.bars.is_empty() {
        empty_chart(f, area, &series.title);
        return;
    }

    let bars: Vec<Bar> = series
        .bars
        .iter()
        .enumerate()
        .map(|(i, (label, value))| {
            Bar::default()
                .label(Line::from(label.clone()))
                .value(value.round().max(0.0) as u64)
                .text_value(series.format_value(*value))
                .style(Style::default().fg(SLICE_COLORS[i % SLICE_COLORS.len()]))
                .value_style(Style::default().fg(Color::Black).bg(SLICE_COLORS[i % SLICE_COLORS.len()]))
        })
        .collect();

    let title = format!("{} ({} vs {})", series.title, series.x_label, series.y_label);
    let mut widget = BarChart::default()
        .block(chart_block(&title))
        .data(BarGroup::default().bars(&bars))
        .bar_gap(1);

    widget = match series.orientation {
        Orientation::Horizontal => widget.direction(Direction::Horizontal).bar_width(1),
        Orientation::Vertical => {
            let n = series.bars.len() as u16;
            let inner = area.width.saturating_sub(2);
            let width = (inner / n.max(1)).saturating_sub(1).clamp(3, 18);
            widget.direction(Direction::Vertical).bar_width(width)
        }
    };

    f.render_widget(widget, area);
}
