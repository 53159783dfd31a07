use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;

use crate::config::Config;
use crate::core::constants::{charts, dashboard};
use crate::core::error::{ForestError, Result};
use crate::dashboard::binding::Binding;
use crate::dashboard::page::DashboardPage;
use crate::dataset::ObservationTable;
use crate::reporting::charts::{ChartLabels, StaticChartExporter, bar_chart_svg};

use std::io;
use std::sync::Arc;

/// Body of an update request sent when an input component changes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateRequest {
    /// Id of the component that changed
    pub input: String,
    pub value: String,
}

/// New content for the bound output component
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateResponse {
    /// Id of the component to replace
    pub output: String,
    pub value: String,
    /// Rows matching the selection
    pub rows: usize,
    pub svg: String,
}

/// Error type for dashboard requests
#[derive(Debug)]
pub enum DashboardError {
    UnknownInput(String),
    Render(ForestError),
}

impl std::fmt::Display for DashboardError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DashboardError::UnknownInput(id) => write!(f, "No binding for input '{id}'"),
            DashboardError::Render(e) => write!(f, "Failed to update chart: {e}"),
        }
    }
}

impl std::error::Error for DashboardError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DashboardError::UnknownInput(_) => None,
            DashboardError::Render(e) => Some(e),
        }
    }
}

impl From<ForestError> for DashboardError {
    fn from(e: ForestError) -> Self {
        DashboardError::Render(e)
    }
}

impl IntoResponse for DashboardError {
    fn into_response(self) -> Response {
        let status = match &self {
            DashboardError::UnknownInput(_) => StatusCode::BAD_REQUEST,
            DashboardError::Render(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = serde_json::json!({ "error": self.to_string() });
        (status, Json(body)).into_response()
    }
}

/// Read-only state shared by every request handler
#[derive(Debug)]
pub struct DashboardState {
    table: Arc<ObservationTable>,
    bindings: Vec<Binding>,
    options: Vec<String>,
    default_value: Option<String>,
    page: String,
}

impl DashboardState {
    /// Build the state once at startup: dropdown options, the bound chart
    /// for the default selection and the static chart are rendered here.
    pub fn new(table: Arc<ObservationTable>, config: &Config) -> Result<Self> {
        let binding = Binding::activity(&config.columns);
        let options = binding.filter().options(&table)?;
        let default_value = options.first().cloned();

        let activity_svg = match &default_value {
            Some(value) => binding.update(&table, value)?.to_svg()?,
            None => bar_chart_svg(
                &ChartLabels::new("No activities", charts::TIMESERIES_X, &config.columns.bar_measure),
                &[],
                (charts::SVG_WIDTH, charts::SVG_HEIGHT),
            )?,
        };
        let static_svg = StaticChartExporter::new()
            .with_columns(config.columns.clone())
            .timeseries_svg(&table)?;

        let page = DashboardPage {
            title: config.dashboard_title(),
            options: &options,
            selected: default_value.as_deref(),
            activity_svg: &activity_svg,
            static_svg: &static_svg,
        }
        .render();

        debug!(
            "Dashboard state: {} option(s), default {:?}",
            options.len(),
            default_value
        );

        Ok(Self {
            table,
            bindings: vec![binding],
            options,
            default_value,
            page,
        })
    }

    pub fn options(&self) -> &[String] {
        &self.options
    }

    pub fn default_value(&self) -> Option<&str> {
        self.default_value.as_deref()
    }

    pub fn page(&self) -> &str {
        &self.page
    }

    /// Dispatch an update to the binding registered for its input
    pub fn update(&self, request: &UpdateRequest) -> std::result::Result<UpdateResponse, DashboardError> {
        let binding = self
            .bindings
            .iter()
            .find(|binding| binding.handles(&request.input))
            .ok_or_else(|| DashboardError::UnknownInput(request.input.clone()))?;

        let spec = binding.update(&self.table, &request.value)?;
        Ok(UpdateResponse {
            output: binding.output.clone(),
            value: request.value.clone(),
            rows: spec.row_count(),
            svg: spec.to_svg()?,
        })
    }
}

async fn index(State(state): State<Arc<DashboardState>>) -> Html<String> {
    Html(state.page().to_string())
}

async fn update(
    State(state): State<Arc<DashboardState>>,
    Json(request): Json<UpdateRequest>,
) -> std::result::Result<Json<UpdateResponse>, DashboardError> {
    debug!("Update: {} = '{}'", request.input, request.value);
    let response = state.update(&request)?;
    debug!("  -> {} ({} row(s))", response.output, response.rows);
    Ok(Json(response))
}

pub fn create_router(state: Arc<DashboardState>) -> Router {
    Router::new()
        .route("/", get(index))
        .route(dashboard::UPDATE_ROUTE, post(update))
        .with_state(state)
}

pub async fn bind(address: &str) -> Result<TcpListener> {
    TcpListener::bind(address).await.map_err(|e| {
        ForestError::Io(io::Error::new(e.kind(), format!("cannot bind {address}: {e}")))
    })
}

/// Serve the dashboard until the process is killed
pub async fn serve(listener: TcpListener, state: Arc<DashboardState>) -> Result<()> {
    info!("Dashboard listening on http://{}", listener.local_addr()?);
    axum::serve(listener, create_router(state)).await?;
    Ok(())
}
