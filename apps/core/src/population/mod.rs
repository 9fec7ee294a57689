//! # Population Module
//!
//! Batch job: fetch the World Bank population series, fit a straight line,
//! extrapolate, draw an SVG chart and write it to disk. Runs once, start to
//! finish; every step can fail with an `AppError`.

pub mod chart;
pub mod dataset;
pub mod export;
pub mod regression;
pub mod scale;

use reqwest::Client;
use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, instrument};

use crate::config::Settings;
use crate::error::AppError;
use chart::ChartData;

pub use dataset::Observation;
pub use regression::{LinearFit, Projection};

const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Summary of a finished run
#[derive(Debug, Clone, Serialize)]
pub struct PopulationReport {
    pub observations: usize,
    pub first_year: i32,
    pub last_year: i32,
    pub fit: LinearFit,
    /// Last projected year and its value
    pub projected_to: Option<Projection>,
    pub chart_path: PathBuf,
}

/// Fitted model and rendered chart for a set of observations.
#[derive(Debug, Clone)]
pub struct ChartBuild {
    pub fit: LinearFit,
    pub projections: Vec<Projection>,
    pub svg: String,
}

pub struct PopulationPipeline {
    client: Client,
    dataset_url: String,
    output_dir: PathBuf,
    projection_years: u32,
}

impl PopulationPipeline {
    pub fn new(
        dataset_url: impl Into<String>,
        output_dir: impl Into<PathBuf>,
        projection_years: u32,
    ) -> Result<Self, AppError> {
        let client = Client::builder().timeout(FETCH_TIMEOUT).build()?;
        Ok(Self {
            client,
            dataset_url: dataset_url.into(),
            output_dir: output_dir.into(),
            projection_years,
        })
    }

    pub fn from_settings(settings: &Settings) -> Result<Self, AppError> {
        Self::new(
            settings.population_dataset_url.clone(),
            settings.chart_output_dir.clone(),
            settings.projection_years,
        )
    }

    /// Fit, project and render without touching the network or disk.
    pub fn build_chart(&self, observations: &[Observation]) -> Result<ChartBuild, AppError> {
        let fit = LinearFit::fit_observations(observations)?;
        let last_year = observations
            .iter()
            .map(|o| o.year)
            .max()
            .ok_or_else(|| AppError::Validation("no observations to project from".to_string()))?;
        let projections = regression::project(&fit, last_year, self.projection_years)?;
        let svg = chart::render_svg(&ChartData {
            observations,
            fit: &fit,
            projections: &projections,
        })?;
        Ok(ChartBuild {
            fit,
            projections,
            svg,
        })
    }

    #[instrument(skip(self), fields(url = %self.dataset_url))]
    pub async fn run(&self) -> Result<PopulationReport, AppError> {
        let observations = dataset::fetch_observations(&self.client, &self.dataset_url).await?;
        let build = self.build_chart(&observations)?;

        info!(
            slope = build.fit.slope,
            intercept = build.fit.intercept,
            r_squared = build.fit.r_squared,
            "Linear fit computed"
        );

        let chart_path = export::write_chart(&self.output_dir, &build.svg).await?;

        Ok(PopulationReport {
            observations: observations.len(),
            first_year: observations.first().map(|o| o.year).unwrap_or_default(),
            last_year: observations.last().map(|o| o.year).unwrap_or_default(),
            fit: build.fit,
            projected_to: build.projections.last().copied(),
            chart_path,
        })
    }
}
