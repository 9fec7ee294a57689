// population-chart - World Bank population projection
// Fetches the series, fits a line, projects forward and writes an SVG chart.

use anyhow::Context;
use chatline_core::config::Settings;
use chatline_core::logging::init_tracing;
use chatline_core::population::PopulationPipeline;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().context("Failed to load settings")?;
    init_tracing("population-chart", settings.log_format)?;

    let pipeline = PopulationPipeline::from_settings(&settings)?;
    let report = pipeline
        .run()
        .await
        .with_context(|| format!("Population pipeline failed for {}", settings.population_dataset_url))?;

    info!(
        observations = report.observations,
        first_year = report.first_year,
        last_year = report.last_year,
        "Chart saved to {}",
        report.chart_path.display()
    );
    if let Some(last) = report.projected_to {
        info!("Projected population in {}: {:.0}", last.year, last.population);
    }
    Ok(())
}
