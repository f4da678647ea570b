// Dashboard views - Overview, EDA charts, Insights & Conclusion
// Everything a front end draws is computed here once per dataset

use crate::dataset::{
    Dataset, ADMISSION_TYPE, AGE, BILLING_AMOUNT, DATE_OF_ADMISSION, DISCHARGE_DATE, GENDER,
    INSURANCE_PROVIDER, MEDICAL_CONDITION,
};
use crate::error::DatasetResult;
use crate::stats::{self, Histogram, ValueCount};
use serde::{Deserialize, Serialize};

pub const DASHBOARD_TITLE: &str = "Healthcare Dashboard";
/// Browser document title
pub const PAGE_TITLE: &str = "Healthcare EDA Dashboard";

// ============================================================================
// NAVIGATION
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Page {
    Overview,
    Eda,
    Insights,
}

impl Page {
    pub const ALL: [Page; 3] = [Page::Overview, Page::Eda, Page::Insights];

    /// Map a navigation label to a page. Unknown labels show the Overview.
    pub fn from_selection(selection: &str) -> Self {
        match selection {
            "EDA" => Page::Eda,
            "Insights & Conclusion" => Page::Insights,
            _ => Page::Overview,
        }
    }

    /// Label shown in the navigation selector
    pub fn label(&self) -> &'static str {
        match self {
            Page::Overview => "Overview",
            Page::Eda => "EDA",
            Page::Insights => "Insights & Conclusion",
        }
    }

    /// Heading shown at the top of the page
    pub fn title(&self) -> &'static str {
        match self {
            Page::Overview => "Healthcare Exploratory Data Analysis",
            Page::Eda => "Exploratory Data Analysis",
            Page::Insights => "Insights & Conclusion",
        }
    }

    pub fn next(&self) -> Self {
        match self {
            Page::Overview => Page::Eda,
            Page::Eda => Page::Insights,
            Page::Insights => Page::Overview,
        }
    }

    pub fn previous(&self) -> Self {
        match self {
            Page::Overview => Page::Insights,
            Page::Eda => Page::Overview,
            Page::Insights => Page::Eda,
        }
    }
}

// ============================================================================
// OPTIONS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportOptions {
    pub preview_rows: usize,
    pub histogram_bins: usize,
    pub kde_points: usize,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            preview_rows: 5,
            histogram_bins: 20,
            kde_points: 100,
        }
    }
}

// ============================================================================
// OVERVIEW
// ============================================================================

pub const PROJECT_OVERVIEW: &str = "This dashboard performs Exploratory Data Analysis (EDA) on a \
healthcare dataset to understand patient demographics, medical conditions, admission types and \
billing patterns. The goal is to extract meaningful insights that can help hospitals and \
healthcare providers make data-driven decisions.";

pub const OVERVIEW_TOPICS: [&str; 4] = [
    "Patient demographics",
    "Medical conditions",
    "Admission types",
    "Billing patterns",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricTile {
    pub label: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preview {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Overview {
    pub total_records: usize,
    pub total_features: usize,
    pub avg_billing: Option<f64>,
    pub metrics: Vec<MetricTile>,
    pub preview: Preview,
}

impl Overview {
    pub fn build(dataset: &Dataset, preview_rows: usize) -> DatasetResult<Self> {
        let (total_records, total_features) = dataset.shape();
        let avg_billing = stats::mean(&dataset.numeric_column(BILLING_AMOUNT)?);

        let metrics = vec![
            MetricTile {
                label: "Total Records".to_string(),
                value: total_records.to_string(),
            },
            MetricTile {
                label: "Total Features".to_string(),
                value: total_features.to_string(),
            },
            MetricTile {
                label: "Avg Billing Amount".to_string(),
                value: format_currency(avg_billing),
            },
        ];

        Ok(Self {
            total_records,
            total_features,
            avg_billing,
            metrics,
            preview: Preview {
                headers: dataset.headers().to_vec(),
                rows: dataset.head(preview_rows),
            },
        })
    }
}

/// `$1234.57`; `n/a` when there was nothing to average
pub fn format_currency(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("${:.2}", v),
        None => "n/a".to_string(),
    }
}

// ============================================================================
// EDA CHARTS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistogramChart {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub histogram: Histogram,
    /// KDE scaled to counts so it overlays the bars
    pub kde: Vec<(f64, f64)>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PieSlice {
    pub label: String,
    pub count: usize,
    pub percent: f64,
}

impl PieSlice {
    /// Slice label the way the chart annotates it, e.g. `50.3%`
    pub fn percent_label(&self) -> String {
        format!("{:.1}%", self.percent)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PieChart {
    pub title: String,
    /// Angle of the first slice's leading edge, degrees counterclockwise from 3 o'clock
    pub start_angle: f64,
    pub slices: Vec<PieSlice>,
}

impl PieChart {
    /// (start, end) angle in degrees per slice, counterclockwise
    pub fn slice_angles(&self) -> Vec<(f64, f64)> {
        let mut start = self.start_angle;
        self.slices
            .iter()
            .map(|slice| {
                let end = start + 360.0 * slice.percent / 100.0;
                let span = (start, end);
                start = end;
                span
            })
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Orientation {
    Horizontal,
    Vertical,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarSeries {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub orientation: Orientation,
    pub bars: Vec<(String, f64)>,
    /// Bars carry currency values rather than counts
    pub currency: bool,
}

impl BarSeries {
    fn counts(
        title: &str,
        x_label: &str,
        y_label: &str,
        orientation: Orientation,
        counts: &[ValueCount],
    ) -> Self {
        Self {
            title: title.to_string(),
            x_label: x_label.to_string(),
            y_label: y_label.to_string(),
            orientation,
            bars: counts
                .iter()
                .map(|c| (c.value.clone(), c.count as f64))
                .collect(),
            currency: false,
        }
    }

    pub fn max_value(&self) -> f64 {
        self.bars.iter().map(|(_, v)| *v).fold(0.0, f64::max)
    }

    pub fn format_value(&self, value: f64) -> String {
        if self.currency {
            format!("${:.2}", value)
        } else {
            format!("{}", value.round() as i64)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdaCharts {
    pub age: HistogramChart,
    pub gender: PieChart,
    pub conditions: BarSeries,
    pub admission_types: BarSeries,
    pub billing_by_provider: BarSeries,
}

impl EdaCharts {
    pub const TITLES: [&'static str; 5] = [
        "Age Distribution of Patients",
        "Gender Distribution",
        "Medical Conditions Distribution",
        "Admission Type Distribution",
        "Average Billing Amount by Insurance Provider",
    ];

    pub fn build(dataset: &Dataset, options: &ReportOptions) -> DatasetResult<Self> {
        let ages = dataset.numeric_column(AGE)?;
        let histogram = stats::histogram(&ages, options.histogram_bins);
        let scale = ages.len() as f64 * histogram.bin_width();
        let kde = stats::kde(&ages, options.kde_points)
            .into_iter()
            .map(|(x, density)| (x, density * scale))
            .collect();

        let gender_counts = stats::value_counts(dataset.column(GENDER)?);
        let gender_pct = stats::percentages(&gender_counts);
        let slices = gender_counts
            .iter()
            .zip(gender_pct)
            .map(|(c, percent)| PieSlice {
                label: c.value.clone(),
                count: c.count,
                percent,
            })
            .collect();

        let conditions = stats::value_counts(dataset.column(MEDICAL_CONDITION)?);
        let admissions = stats::value_counts(dataset.column(ADMISSION_TYPE)?);

        let billing = stats::group_mean(
            dataset.column(INSURANCE_PROVIDER)?,
            &dataset.numeric_cells(BILLING_AMOUNT)?,
        );

        Ok(Self {
            age: HistogramChart {
                title: Self::TITLES[0].to_string(),
                x_label: "Age".to_string(),
                y_label: "Number of Patients".to_string(),
                histogram,
                kde,
            },
            gender: PieChart {
                title: Self::TITLES[1].to_string(),
                start_angle: 90.0,
                slices,
            },
            conditions: BarSeries::counts(
                Self::TITLES[2],
                "Number of Patients",
                "Medical Condition",
                Orientation::Horizontal,
                &conditions,
            ),
            admission_types: BarSeries::counts(
                Self::TITLES[3],
                "Admission Type",
                "Number of Patients",
                Orientation::Vertical,
                &admissions,
            ),
            billing_by_provider: BarSeries {
                title: Self::TITLES[4].to_string(),
                x_label: "Insurance Provider".to_string(),
                y_label: "Average Billing Amount".to_string(),
                orientation: Orientation::Vertical,
                bars: billing.iter().map(|g| (g.group.clone(), g.mean)).collect(),
                currency: true,
            },
        })
    }
}

// ============================================================================
// INSIGHTS
// ============================================================================

pub const CONCLUSION: &str = "The dataset shows a broadly balanced patient population across \
genders and age groups. Chronic conditions account for a large share of admissions, and \
billing varies between insurance providers. Hospitals can use these patterns to plan \
resources, prepare for emergency and urgent intake, and review billing practices with \
providers.";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insight {
    pub heading: String,
    pub detail: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insights {
    pub findings: Vec<Insight>,
    pub conclusion: String,
}

impl Insights {
    pub fn build(dataset: &Dataset, charts: &EdaCharts) -> DatasetResult<Self> {
        let mut findings = Vec::new();
        let total = dataset.shape().0;

        if let Some(age) = stats::mean(&dataset.numeric_column(AGE)?) {
            findings.push(Insight {
                heading: "Patient age".to_string(),
                detail: format!("The average patient is {:.1} years old.", age),
            });
        }

        if !charts.gender.slices.is_empty() {
            let split = charts
                .gender
                .slices
                .iter()
                .map(|s| format!("{} {}", s.label, s.percent_label()))
                .collect::<Vec<_>>()
                .join(", ");
            findings.push(Insight {
                heading: "Gender balance".to_string(),
                detail: format!("Patients split {}.", split),
            });
        }

        if let Some((condition, count)) = charts.conditions.bars.first() {
            findings.push(Insight {
                heading: "Most common condition".to_string(),
                detail: format!(
                    "{} is the most frequent medical condition ({} of {} patients).",
                    condition, *count as usize, total
                ),
            });
        }

        if let Some((admission, count)) = charts.admission_types.bars.first() {
            findings.push(Insight {
                heading: "Admission type".to_string(),
                detail: format!(
                    "{} admissions are the most frequent ({} patients).",
                    admission, *count as usize
                ),
            });
        }

        if let (Some(top), Some(bottom)) = (
            charts.billing_by_provider.bars.first(),
            charts.billing_by_provider.bars.last(),
        ) {
            findings.push(Insight {
                heading: "Billing by provider".to_string(),
                detail: format!(
                    "{} has the highest average billing (${:.2}); {} the lowest (${:.2}).",
                    top.0, top.1, bottom.0, bottom.1
                ),
            });
        }

        if dataset.has_column(DATE_OF_ADMISSION) && dataset.has_column(DISCHARGE_DATE) {
            let stays = stats::length_of_stay(
                &dataset.date_column(DATE_OF_ADMISSION)?,
                &dataset.date_column(DISCHARGE_DATE)?,
            );
            let days: Vec<f64> = stays.iter().map(|d| *d as f64).collect();
            if let Some(avg) = stats::mean(&days) {
                findings.push(Insight {
                    heading: "Length of stay".to_string(),
                    detail: format!("Patients stay {:.1} days on average.", avg),
                });
            }
        }

        Ok(Self {
            findings,
            conclusion: CONCLUSION.to_string(),
        })
    }
}

// ============================================================================
// REPORT
// ============================================================================

/// All three views, computed once from a dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub source: String,
    pub overview: Overview,
    pub charts: EdaCharts,
    pub insights: Insights,
}

impl Report {
    pub fn build(dataset: &Dataset, options: &ReportOptions) -> DatasetResult<Self> {
        let overview = Overview::build(dataset, options.preview_rows)?;
        let charts = EdaCharts::build(dataset, options)?;
        let insights = Insights::build(dataset, &charts)?;

        tracing::debug!(
            "Built report: {} findings, {} conditions, {} providers",
            insights.findings.len(),
            charts.conditions.bars.len(),
            charts.billing_by_provider.bars.len()
        );

        Ok(Self {
            source: dataset.source().display().to_string(),
            overview,
            charts,
            insights,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::tests::sample_dataset;

    #[test]
    fn test_page_from_selection() {
        assert_eq!(Page::from_selection("Overview"), Page::Overview);
        assert_eq!(Page::from_selection("EDA"), Page::Eda);
        assert_eq!(Page::from_selection("Insights & Conclusion"), Page::Insights);
        assert_eq!(Page::from_selection("nope"), Page::Overview);

        for page in Page::ALL {
            assert_eq!(Page::from_selection(page.label()), page);
        }
    }

    #[test]
    fn test_page_cycle() {
        assert_eq!(Page::Overview.next(), Page::Eda);
        assert_eq!(Page::Insights.next(), Page::Overview);
        assert_eq!(Page::Overview.previous(), Page::Insights);
        for page in Page::ALL {
            assert_eq!(page.next().previous(), page);
        }
    }

    #[test]
    fn test_overview_metrics() {
        let ds = sample_dataset();
        let overview = Overview::build(&ds, 5).unwrap();

        assert_eq!(overview.total_records, 6);
        assert_eq!(overview.total_features, 10);
        assert_eq!(overview.metrics[0].value, "6");
        assert_eq!(overview.metrics[1].value, "10");
        // (18856.28 + 33643.33 + 27955.10 + 37909.78 + 14238.32 + 48145.11) / 6
        assert_eq!(overview.metrics[2].label, "Avg Billing Amount");
        assert_eq!(overview.metrics[2].value, "$30124.65");
        assert_eq!(overview.preview.rows.len(), 5);
        assert_eq!(overview.preview.headers.len(), 10);
    }

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(Some(1234.5)), "$1234.50");
        assert_eq!(format_currency(None), "n/a");
    }

    #[test]
    fn test_eda_charts() {
        let ds = sample_dataset();
        let charts = EdaCharts::build(&ds, &ReportOptions::default()).unwrap();

        assert_eq!(charts.age.histogram.counts.len(), 20);
        assert_eq!(charts.age.histogram.total(), 6);
        assert_eq!(charts.age.kde.len(), 100);

        assert_eq!(charts.gender.slices.len(), 2);
        assert_eq!(charts.gender.slices[0].label, "Male");
        assert_eq!(charts.gender.slices[0].percent_label(), "50.0%");

        assert_eq!(charts.conditions.orientation, Orientation::Horizontal);
        assert_eq!(charts.conditions.bars[0], ("Cancer".to_string(), 2.0));
        assert_eq!(charts.conditions.bars[1], ("Obesity".to_string(), 2.0));
        assert_eq!(charts.conditions.bars.len(), 4);

        assert_eq!(charts.admission_types.bars[0], ("Urgent".to_string(), 3.0));

        let billing = &charts.billing_by_provider;
        assert!(billing.currency);
        assert_eq!(billing.bars[0].0, "UnitedHealthcare");
        assert_eq!(billing.bars.last().unwrap().0, "Blue Cross");
        assert_eq!(billing.format_value(10.0), "$10.00");
    }

    #[test]
    fn test_pie_angles_start_at_ninety() {
        let pie = PieChart {
            title: "t".into(),
            start_angle: 90.0,
            slices: vec![
                PieSlice { label: "a".into(), count: 1, percent: 25.0 },
                PieSlice { label: "b".into(), count: 3, percent: 75.0 },
            ],
        };

        let angles = pie.slice_angles();
        assert_eq!(angles[0], (90.0, 180.0));
        assert_eq!(angles[1], (180.0, 450.0));
    }

    #[test]
    fn test_insights_findings() {
        let ds = sample_dataset();
        let report = Report::build(&ds, &ReportOptions::default()).unwrap();
        let findings = &report.insights.findings;

        let headings: Vec<&str> = findings.iter().map(|f| f.heading.as_str()).collect();
        assert_eq!(
            headings,
            vec![
                "Patient age",
                "Gender balance",
                "Most common condition",
                "Admission type",
                "Billing by provider",
                "Length of stay",
            ]
        );
        assert!(findings[2].detail.starts_with("Cancer"));
        assert!(findings[4].detail.contains("UnitedHealthcare"));
        assert!(!report.insights.conclusion.is_empty());
        assert_eq!(report.source, "sample.csv");
    }

    #[test]
    fn test_report_skips_na_cells() {
        let csv = "\
Age,Gender,Medical Condition,Admission Type,Insurance Provider,Billing Amount
nan,Male,Cancer,Urgent,Cigna,NaN
30,Female,Asthma,Elective,Aetna,100
NA,Female,Asthma,Elective,Cigna,300
50,Male,Cancer,Urgent,Aetna,N/A
";
        let ds = Dataset::from_reader(csv.as_bytes(), std::path::Path::new("na.csv")).unwrap();
        let report = Report::build(&ds, &ReportOptions::default()).unwrap();

        assert_eq!(report.overview.total_records, 4);
        assert_eq!(report.overview.avg_billing, Some(200.0));
        assert_eq!(report.overview.metrics[2].value, "$200.00");

        let age = &report.charts.age;
        assert_eq!(age.histogram.total(), 2);
        assert_eq!(age.histogram.counts[0], 1);
        assert!(age.kde.iter().all(|(x, y)| x.is_finite() && y.is_finite()));

        assert_eq!(
            report.charts.billing_by_provider.bars,
            vec![("Cigna".to_string(), 300.0), ("Aetna".to_string(), 100.0)]
        );
    }

    #[test]
    fn test_report_json_shape() {
        let report = Report::build(&sample_dataset(), &ReportOptions::default()).unwrap();
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["overview"]["total_records"], 6);
        assert_eq!(json["charts"]["gender"]["start_angle"], 90.0);
        assert_eq!(json["charts"]["conditions"]["orientation"], "Horizontal");
        assert_eq!(json["charts"]["conditions"]["bars"][0][0], "Cancer");
        assert!(json["insights"]["findings"].is_array());
    }
}
