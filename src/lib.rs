// Healthcare EDA Dashboard - Core Library
// Shared by the terminal dashboard, the web server, and tests

pub mod cache;
pub mod config;
pub mod dataset;
pub mod error;
pub mod report;
pub mod stats;
pub mod web;

// Re-export commonly used types
pub use cache::{load_data, resolve_data_path, DatasetCache};
pub use config::AppConfig;
pub use dataset::{Dataset, REQUIRED_COLUMNS};
pub use error::{DatasetError, DatasetResult};
pub use report::{
    BarSeries, EdaCharts, HistogramChart, Insight, Insights, MetricTile, Orientation, Overview,
    Page, PieChart, PieSlice, Preview, Report, ReportOptions,
};
pub use stats::{GroupMean, Histogram, ValueCount};
