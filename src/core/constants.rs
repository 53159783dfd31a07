//! Application-wide constants to avoid magic values throughout the codebase.

/// Default paths
pub mod paths {
    /// Input dataset
    pub const INPUT: &str = "socioeconomic_data.csv";
    /// PDF summary report
    pub const REPORT: &str = "socioeconomic_report.pdf";
    /// Income distribution histogram
    pub const DISTRIBUTION_CHART: &str = "income_distribution.png";
    /// Deforestation time series
    pub const TIMESERIES_CHART: &str = "deforestation_by_year.png";
    /// Config file looked up in the working directory and its parents
    pub const CONFIG_FILE: &str = ".forestwatch.toml";
}

/// Logical dataset columns and their default header names
pub mod columns {
    pub const YEAR: &str = "year";
    pub const INCOME: &str = "income";
    pub const DEFORESTED_AREA: &str = "deforested_area";
    pub const ACTIVITY: &str = "activity";
    /// Measure plotted by the activity bar chart
    pub const BAR_MEASURE: &str = DEFORESTED_AREA;

    /// Cell values treated as missing (compared after trimming)
    pub const MISSING_TOKENS: [&str; 10] = [
        "", "NA", "N/A", "NaN", "nan", "-NaN", "null", "NULL", "None", "#N/A",
    ];
}

/// Chart layout and labels
pub mod charts {
    /// Default histogram bin count
    pub const DEFAULT_BINS: usize = 30;
    pub const MAX_BINS: usize = 1000;
    /// Default raster size in pixels
    pub const DEFAULT_WIDTH: u32 = 1000;
    pub const DEFAULT_HEIGHT: u32 = 600;
    pub const MIN_DIMENSION: u32 = 100;
    pub const MAX_DIMENSION: u32 = 10_000;
    /// Dashboard SVG size in pixels
    pub const SVG_WIDTH: u32 = 800;
    pub const SVG_HEIGHT: u32 = 420;
    /// Points sampled along the density curve
    pub const KDE_GRID_POINTS: usize = 200;

    pub const DISTRIBUTION_TITLE: &str = "Income Distribution";
    pub const DISTRIBUTION_X: &str = "Income";
    pub const DISTRIBUTION_Y: &str = "Frequency";

    pub const TIMESERIES_TITLE: &str = "Deforestation Over the Years";
    pub const TIMESERIES_X: &str = "Year";
    pub const TIMESERIES_Y: &str = "Deforested Area (ha)";
}

/// PDF report layout
pub mod report {
    pub const DEFAULT_TITLE: &str = "Socioeconomic Data Report";
    /// A4 portrait in millimetres
    pub const PAGE_WIDTH_MM: f32 = 210.0;
    pub const PAGE_HEIGHT_MM: f32 = 297.0;
    pub const MARGIN_MM: f32 = 10.0;
    /// Auto page break margin
    pub const BOTTOM_MARGIN_MM: f32 = 15.0;
    pub const TITLE_FONT_SIZE: f32 = 12.0;
    pub const BODY_FONT_SIZE: f32 = 8.0;
    pub const TITLE_LINE_HEIGHT_MM: f32 = 10.0;
    pub const BODY_LINE_HEIGHT_MM: f32 = 4.5;
    /// Millimetres per typographic point
    pub const MM_PER_PT: f32 = 0.3528;
}

/// Dashboard page and server
pub mod dashboard {
    pub const DEFAULT_TITLE: &str = "Socioeconomic Analysis";
    pub const DEFAULT_HOST: &str = "127.0.0.1";
    pub const DEFAULT_PORT: u16 = 8050;

    /// Component ids shared by the page and the update endpoint
    pub const DROPDOWN_ID: &str = "activity-dropdown";
    pub const ACTIVITY_CHART_ID: &str = "activity-chart";
    pub const STATIC_CHART_ID: &str = "deforestation-chart";

    pub const UPDATE_ROUTE: &str = "/_update";
}

/// Failure policy names accepted in config files
pub mod failure_policies {
    pub const CONTINUE: &str = "continue";
    pub const FAIL_FAST: &str = "fail-fast";

    pub const ALL: [&str; 2] = [CONTINUE, FAIL_FAST];
}

/// Display and formatting constants
pub mod display {
    pub const SUCCESS_EMOJI: &str = "✅";
    pub const ERROR_EMOJI: &str = "❌";
    pub const REPORT_EMOJI: &str = "📄";
    pub const CHART_EMOJI: &str = "📊";
    pub const SERVER_EMOJI: &str = "🌐";
}
