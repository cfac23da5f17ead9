mod bootstrap;
mod report;

use anyhow::{Context, Result};
use bikeshare_core::settings::{OutputFormat, Settings};
use bikeshare_data::analysis::FilterOptions;
use bikeshare_runtime::dashboard::evaluate;
use bikeshare_runtime::dataset_store::DatasetStore;

fn main() -> Result<()> {
    let settings = Settings::load_with_last_used();

    bootstrap::setup_logging(&settings.log_level, settings.log_file.as_ref())?;

    tracing::info!("Bike-Sharing Dashboard v{} starting", env!("CARGO_PKG_VERSION"));

    let data_path = bootstrap::resolve_data_path(&settings)?;
    let mut store = DatasetStore::new(data_path.clone());
    let dataset = store
        .dataset()
        .with_context(|| format!("failed to load {}", data_path.display()))?;

    let options = FilterOptions::from_hours(&dataset.hours);
    let params = bootstrap::filter_params(&settings, &options)?;
    tracing::info!(
        seasons = params.seasons.len(),
        weather = params.weather.len(),
        "Format: {}",
        settings.format
    );

    let snapshot = evaluate(dataset, &params);

    let output = match settings.output_format()? {
        OutputFormat::Json => report::render_json(&snapshot)?,
        OutputFormat::Text => report::render_text(&snapshot),
    };
    println!("{output}");

    Ok(())
}
