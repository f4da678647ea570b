// Inline SVG charts for the web dashboard

use minijinja::HtmlEscape;
use crate::report::{BarSeries, HistogramChart, Orientation, PieChart};
use std::fmt::Write;

const WIDTH: f64 = 640.0;
const HEIGHT: f64 = 400.0;
const MARGIN_LEFT: f64 = 70.0;
const MARGIN_RIGHT: f64 = 20.0;
const MARGIN_TOP: f64 = 20.0;
const MARGIN_BOTTOM: f64 = 60.0;

/// Slice and bar fill colors, cycled
pub const PALETTE: [&str; 8] = [
    "#4c72b0", "#dd8452", "#55a868", "#c44e52", "#8172b3", "#937860", "#da8bc3", "#8c8c8c",
];

fn open_svg(out: &mut String, label: &str) {
    let _ = write!(
        out,
        r#"<svg class="chart" viewBox="0 0 {WIDTH} {HEIGHT}" role="img" aria-label="{}" xmlns="http://www.w3.org/2000/svg">"#,
        HtmlEscape(label)
    );
}

fn axis_labels(out: &mut String, x_label: &str, y_label: &str) {
    let _ = write!(
        out,
        r#"<text class="axis-label" x="{:.1}" y="{:.1}" text-anchor="middle">{}</text>"#,
        MARGIN_LEFT + (WIDTH - MARGIN_LEFT - MARGIN_RIGHT) / 2.0,
        HEIGHT - 10.0,
        HtmlEscape(x_label)
    );
    let _ = write!(
        out,
        r#"<text class="axis-label" x="15" y="{:.1}" text-anchor="middle" transform="rotate(-90 15 {:.1})">{}</text>"#,
        MARGIN_TOP + (HEIGHT - MARGIN_TOP - MARGIN_BOTTOM) / 2.0,
        MARGIN_TOP + (HEIGHT - MARGIN_TOP - MARGIN_BOTTOM) / 2.0,
        HtmlEscape(y_label)
    );
}

fn axes(out: &mut String) {
    let x0 = MARGIN_LEFT;
    let y0 = HEIGHT - MARGIN_BOTTOM;
    let _ = write!(
        out,
        r#"<line class="axis" x1="{x0}" y1="{y0}" x2="{:.1}" y2="{y0}"/><line class="axis" x1="{x0}" y1="{MARGIN_TOP}" x2="{x0}" y2="{y0}"/>"#,
        WIDTH - MARGIN_RIGHT
    );
}

/// Histogram bars with the density curve drawn over them
pub fn histogram_svg(chart: &HistogramChart) -> String {
    let mut out = String::new();
    open_svg(&mut out, &chart.title);

    let hist = &chart.histogram;
    let (Some(&lo), Some(&hi)) = (hist.edges.first(), hist.edges.last()) else {
        out.push_str(r#"<text x="50%" y="50%" text-anchor="middle">No data</text></svg>"#);
        return out;
    };

    let plot_w = WIDTH - MARGIN_LEFT - MARGIN_RIGHT;
    let plot_h = HEIGHT - MARGIN_TOP - MARGIN_BOTTOM;
    let y_max = chart
        .kde
        .iter()
        .map(|(_, y)| *y)
        .fold(hist.max_count() as f64, f64::max)
        .max(1.0);

    let sx = |x: f64| MARGIN_LEFT + (x - lo) / (hi - lo) * plot_w;
    let sy = |y: f64| MARGIN_TOP + plot_h - y / y_max * plot_h;

    for (left, right, count) in hist.bins() {
        let x = sx(left);
        let w = (sx(right) - x).max(0.0);
        let y = sy(count as f64);
        let _ = write!(
            out,
            r#"<rect class="bar" x="{x:.1}" y="{y:.1}" width="{w:.1}" height="{:.1}" fill="{}"><title>{left:.1}-{right:.1}: {count}</title></rect>"#,
            sy(0.0) - y,
            PALETTE[0]
        );
    }

    if !chart.kde.is_empty() {
        let points = chart
            .kde
            .iter()
            .map(|(x, y)| format!("{:.1},{:.1}", sx(*x), sy(*y)))
            .collect::<Vec<_>>()
            .join(" ");
        let _ = write!(
            out,
            r#"<polyline class="kde" fill="none" stroke="{}" stroke-width="2" points="{points}"/>"#,
            PALETTE[3]
        );
    }

    axes(&mut out);
    let _ = write!(
        out,
        r#"<text class="tick" x="{:.1}" y="{:.1}" text-anchor="middle">{lo:.0}</text><text class="tick" x="{:.1}" y="{:.1}" text-anchor="middle">{hi:.0}</text>"#,
        sx(lo),
        HEIGHT - MARGIN_BOTTOM + 18.0,
        sx(hi),
        HEIGHT - MARGIN_BOTTOM + 18.0
    );
    let _ = write!(
        out,
        r#"<text class="tick" x="{:.1}" y="{:.1}" text-anchor="end">{:.0}</text>"#,
        MARGIN_LEFT - 6.0,
        MARGIN_TOP + 4.0,
        y_max
    );
    axis_labels(&mut out, &chart.x_label, &chart.y_label);
    out.push_str("</svg>");
    out
}

fn polar(cx: f64, cy: f64, r: f64, degrees: f64) -> (f64, f64) {
    let rad = degrees.to_radians();
    // SVG y grows downward, so counterclockwise means subtracting sin
    (cx + r * rad.cos(), cy - r * rad.sin())
}

/// Pie with percentage labels, slices laid out counterclockwise
pub fn pie_svg(chart: &PieChart) -> String {
    let mut out = String::new();
    open_svg(&mut out, &chart.title);

    let (cx, cy, r) = (WIDTH / 2.0 - 80.0, HEIGHT / 2.0, 150.0);

    for (i, (slice, (start, end))) in chart.slices.iter().zip(chart.slice_angles()).enumerate() {
        let color = PALETTE[i % PALETTE.len()];
        let sweep = end - start;

        if sweep >= 359.999 {
            let _ = write!(
                out,
                r#"<circle class="slice" cx="{cx:.1}" cy="{cy:.1}" r="{r:.1}" fill="{color}"/>"#
            );
        } else if sweep > 0.0 {
            let (x0, y0) = polar(cx, cy, r, start);
            let (x1, y1) = polar(cx, cy, r, end);
            let large = if sweep > 180.0 { 1 } else { 0 };
            let _ = write!(
                out,
                r#"<path class="slice" d="M{cx:.1},{cy:.1} L{x0:.2},{y0:.2} A{r:.1},{r:.1} 0 {large} 0 {x1:.2},{y1:.2} Z" fill="{color}"><title>{}: {}</title></path>"#,
                HtmlEscape(&slice.label),
                slice.count
            );
        }

        if sweep > 0.0 {
            let (lx, ly) = polar(cx, cy, r * 0.6, start + sweep / 2.0);
            let _ = write!(
                out,
                r#"<text class="pct" x="{lx:.1}" y="{ly:.1}" text-anchor="middle">{}</text>"#,
                slice.percent_label()
            );
        }

        let legend_y = MARGIN_TOP + 30.0 + i as f64 * 24.0;
        let legend_x = WIDTH - 170.0;
        let _ = write!(
            out,
            r#"<rect x="{legend_x:.1}" y="{:.1}" width="14" height="14" fill="{color}"/><text class="legend" x="{:.1}" y="{legend_y:.1}">{}</text>"#,
            legend_y - 11.0,
            legend_x + 20.0,
            HtmlEscape(&slice.label)
        );
    }

    out.push_str("</svg>");
    out
}

/// Count plot or value bar chart, horizontal or vertical
pub fn bar_svg(series: &BarSeries) -> String {
    let mut out = String::new();
    open_svg(&mut out, &series.title);

    if series.bars.is_empty() {
        out.push_str(r#"<text x="50%" y="50%" text-anchor="middle">No data</text></svg>"#);
        return out;
    }

    let max = series.max_value().max(f64::MIN_POSITIVE);
    let n = series.bars.len() as f64;

    match series.orientation {
        Orientation::Horizontal => {
            let left = MARGIN_LEFT + 70.0;
            let plot_w = WIDTH - left - MARGIN_RIGHT - 50.0;
            let slot = (HEIGHT - MARGIN_TOP - MARGIN_BOTTOM) / n;
            for (i, (label, value)) in series.bars.iter().enumerate() {
                let y = MARGIN_TOP + slot * i as f64 + slot * 0.1;
                let h = slot * 0.8;
                let w = value / max * plot_w;
                let _ = write!(
                    out,
                    r#"<rect class="bar" x="{left:.1}" y="{y:.1}" width="{w:.1}" height="{h:.1}" fill="{}"/><text class="tick" x="{:.1}" y="{:.1}" text-anchor="end">{}</text><text class="value" x="{:.1}" y="{:.1}">{}</text>"#,
                    PALETTE[i % PALETTE.len()],
                    left - 6.0,
                    y + h / 2.0 + 4.0,
                    HtmlEscape(label),
                    left + w + 4.0,
                    y + h / 2.0 + 4.0,
                    series.format_value(*value)
                );
            }
        }
        Orientation::Vertical => {
            let plot_w = WIDTH - MARGIN_LEFT - MARGIN_RIGHT;
            let plot_h = HEIGHT - MARGIN_TOP - MARGIN_BOTTOM - 20.0;
            let slot = plot_w / n;
            let base = HEIGHT - MARGIN_BOTTOM;
            for (i, (label, value)) in series.bars.iter().enumerate() {
                let x = MARGIN_LEFT + slot * i as f64 + slot * 0.15;
                let w = slot * 0.7;
                let h = value / max * plot_h;
                let _ = write!(
                    out,
                    r#"<rect class="bar" x="{x:.1}" y="{:.1}" width="{w:.1}" height="{h:.1}" fill="{}"/><text class="tick" x="{:.1}" y="{:.1}" text-anchor="middle">{}</text><text class="value" x="{:.1}" y="{:.1}" text-anchor="middle">{}</text>"#,
                    base - h,
                    PALETTE[i % PALETTE.len()],
                    x + w / 2.0,
                    base + 16.0,
                    HtmlEscape(label),
                    x + w / 2.0,
                    base - h - 4.0,
                    series.format_value(*value)
                );
            }
        }
    }

    axes(&mut out);
    axis_labels(&mut out, &series.x_label, &series.y_label);
    out.push_str("</svg>");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::PieSlice;
    use crate::stats::histogram;

    #[test]
    fn test_histogram_svg_has_one_rect_per_bin() {
        let chart = HistogramChart {
            title: "Ages".into(),
            x_label: "Age".into(),
            y_label: "Number of Patients".into(),
            histogram: histogram(&[20.0, 30.0, 40.0, 50.0], 4),
            kde: vec![(20.0, 0.5), (50.0, 0.5)],
        };

        let svg = histogram_svg(&chart);
        assert_eq!(svg.matches(r#"class="bar""#).count(), 4);
        assert!(svg.contains(r#"class="kde""#));
        assert!(svg.contains("Number of Patients"));
        assert!(svg.ends_with("</svg>"));
    }

    #[test]
    fn test_empty_histogram_svg() {
        let chart = HistogramChart {
            title: "Ages".into(),
            x_label: "Age".into(),
            y_label: "Count".into(),
            histogram: Default::default(),
            kde: vec![],
        };
        assert!(histogram_svg(&chart).contains("No data"));
    }

    #[test]
    fn test_pie_svg_labels_and_full_circle() {
        let mut pie = PieChart {
            title: "Gender".into(),
            start_angle: 90.0,
            slices: vec![
                PieSlice { label: "Female".into(), count: 2, percent: 66.666 },
                PieSlice { label: "Male".into(), count: 1, percent: 33.334 },
            ],
        };

        let svg = pie_svg(&pie);
        assert_eq!(svg.matches("<path").count(), 2);
        assert!(svg.contains("66.7%"));
        assert!(svg.contains("33.3%"));

        pie.slices.truncate(1);
        pie.slices[0].percent = 100.0;
        let svg = pie_svg(&pie);
        assert!(svg.contains("<circle"));
        assert!(svg.contains("100.0%"));
    }

    #[test]
    fn test_bar_svg_escapes_labels() {
        let series = BarSeries {
            title: "Billing".into(),
            x_label: "Provider".into(),
            y_label: "Average".into(),
            orientation: Orientation::Vertical,
            bars: vec![("A&B <Health>".into(), 120.5), ("Cigna".into(), 60.0)],
            currency: true,
        };

        let svg = bar_svg(&series);
        assert!(svg.contains("A&amp;B &lt;Health&gt;"));
        assert!(svg.contains("$120.50"));
        assert!(!svg.contains("<Health>"));
    }
}
