//! HTML rendering for the browser dashboard.
//!
//! The page is rendered on the server: the sidebar is a radio form that
//! submits the selected label as `?page=`, and the matching view template
//! under `web/templates/` extends the shared `base.html` layout.

pub mod svg;

use crate::report::{
    EdaCharts, Page, Report, DASHBOARD_TITLE, OVERVIEW_TOPICS, PAGE_TITLE, PROJECT_OVERVIEW,
};
use minijinja::{context, Environment, UndefinedBehavior};
use serde::Serialize;

// Names end in `.html` so every `{{ }}` expression is auto-escaped
const TEMPLATES: [(&str, &str); 4] = [
    ("base.html", include_str!("../../web/templates/base.html")),
    ("overview.html", include_str!("../../web/templates/overview.html")),
    ("eda.html", include_str!("../../web/templates/eda.html")),
    ("insights.html", include_str!("../../web/templates/insights.html")),
];

/// Sidebar radio entry
#[derive(Serialize)]
struct NavEntry {
    label: &'static str,
    selected: bool,
}

/// Pre-rendered inline SVG with its heading
#[derive(Serialize)]
struct ChartView {
    title: &'static str,
    svg: String,
}

fn environment() -> Result<Environment<'static>, minijinja::Error> {
    let mut env = Environment::new();
    env.set_undefined_behavior(UndefinedBehavior::Strict);
    for (name, source) in TEMPLATES {
        env.add_template(name, source)?;
    }
    Ok(env)
}

fn template_name(page: Page) -> &'static str {
    match page {
        Page::Overview => "overview.html",
        Page::Eda => "eda.html",
        Page::Insights => "insights.html",
    }
}

fn chart_views(charts: &EdaCharts) -> Vec<ChartView> {
    let rendered = [
        svg::histogram_svg(&charts.age),
        svg::pie_svg(&charts.gender),
        svg::bar_svg(&charts.conditions),
        svg::bar_svg(&charts.admission_types),
        svg::bar_svg(&charts.billing_by_provider),
    ];

    EdaCharts::TITLES
        .into_iter()
        .zip(rendered)
        .map(|(title, svg)| ChartView { title, svg })
        .collect()
}

/// Full HTML document for one page of the dashboard
pub fn render_page(report: &Report, page: Page) -> Result<String, minijinja::Error> {
    let env = environment()?;
    let pages: Vec<NavEntry> = Page::ALL
        .into_iter()
        .map(|p| NavEntry {
            label: p.label(),
            selected: p == page,
        })
        .collect();
    let charts = match page {
        Page::Eda => chart_views(&report.charts),
        _ => Vec::new(),
    };

    env.get_template(template_name(page))?.render(context! {
        page_title => PAGE_TITLE,
        dashboard_title => DASHBOARD_TITLE,
        selected => page.label(),
        heading => page.title(),
        pages => pages,
        project_overview => PROJECT_OVERVIEW,
        overview_topics => OVERVIEW_TOPICS,
        report => report,
        charts => charts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::tests::sample_dataset;
    use crate::report::ReportOptions;

    fn sample_report() -> Report {
        Report::build(&sample_dataset(), &ReportOptions::default()).unwrap()
    }

    #[test]
    fn test_templates_compile() {
        let env = environment().unwrap();
        for page in Page::ALL {
            assert!(env.get_template(template_name(page)).is_ok());
        }
    }

    #[test]
    fn test_sidebar_marks_selected_page() {
        let html = render_page(&sample_report(), Page::Eda).unwrap();

        assert_eq!(html.matches(r#"type="radio""#).count(), 3);
        assert!(html.contains(r#"value="EDA" onchange="this.form.submit()" checked>"#));
        assert!(html.contains(r#"value="Insights &amp; Conclusion""#));
        assert_eq!(html.matches(" checked").count(), 1);
    }

    #[test]
    fn test_document_title() {
        let html = render_page(&sample_report(), Page::Insights).unwrap();

        assert!(html.contains("<title>Healthcare EDA Dashboard - Insights &amp; Conclusion</title>"));
        assert!(html.contains("<h2>Healthcare Dashboard</h2>"));
    }

    #[test]
    fn test_overview_page() {
        let html = render_page(&sample_report(), Page::Overview).unwrap();

        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(!html.contains("{{"));
        assert!(html.contains("Total Records"));
        assert!(html.contains("$30124.65"));
        assert!(html.contains("<td>Bobby Jackson</td>"));
        // Preview is capped at five rows
        assert!(!html.contains("Emily Johnson"));
    }

    #[test]
    fn test_dataset_text_is_escaped() {
        let mut report = sample_report();
        report.overview.preview.rows[0][0] = "<script>alert(1)</script>".to_string();
        report.insights.findings[0].detail = "Tom & Jerry".to_string();

        let overview = render_page(&report, Page::Overview).unwrap();
        assert!(!overview.contains("<script>"));
        assert!(overview.contains("&lt;script&gt;"));

        let insights = render_page(&report, Page::Insights).unwrap();
        assert!(insights.contains("Tom &amp; Jerry"));
    }

    #[test]
    fn test_eda_page_has_five_charts() {
        let html = render_page(&sample_report(), Page::Eda).unwrap();

        // SVG markup is inserted unescaped
        assert_eq!(html.matches("<svg").count(), 5);
        assert!(!html.contains("&lt;svg"));
        for title in EdaCharts::TITLES {
            assert!(html.contains(title), "missing chart {title}");
        }
    }

    #[test]
    fn test_insights_page() {
        let html = render_page(&sample_report(), Page::Insights).unwrap();

        assert!(html.contains("Key Insights"));
        assert!(html.contains("Conclusion"));
        assert!(html.contains("Most common condition"));
        assert!(!html.contains("Dataset Summary"));
    }
}
