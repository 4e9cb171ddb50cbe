mod app;
mod config;
mod data_aquisition;
mod network;
mod parsers;
mod render;
mod topology;

use std::error::Error;

use app::App;
use config::{ROUTER_LOCATION_VAR, RouterInventory};
use data_aquisition::ssh::SshConnector;
use render::PngRenderer;

fn init_logger() {
    let mut builder = pretty_env_logger::formatted_timed_builder();
    builder.filter_level(log::LevelFilter::Info);
    if let Ok(filters) = std::env::var("RUST_LOG") {
        builder.parse_filters(&filters);
    }
    builder.init();
}

fn main() -> Result<(), Box<dyn Error>> {
    // a missing .env is fine, the variables may come from the environment
    let dotenv = dotenvy::dotenv();
    init_logger();
    if let Ok(path) = dotenv {
        log::debug!("Loaded environment from {}", path.display());
    }

    let mut inventory = RouterInventory::from_env()?;
    if let Ok(location) = std::env::var(ROUTER_LOCATION_VAR) {
        inventory = inventory.by_location(&location);
        log::info!("Restricting run to {} router(s) at {location}", inventory.len());
    }
    if inventory.is_empty() {
        log::warn!("No routers configured");
        return Ok(());
    }

    let app = App::new(
        Box::new(SshConnector),
        Box::new(PngRenderer::default()),
        std::env::current_dir()?,
    );
    let rt = tokio::runtime::Runtime::new()?;
    let report = rt.block_on(app.run(&inventory));
    if !report.failed.is_empty() {
        log::warn!("Failed routers: {}", report.failed_ids().join(", "));
    }
    Ok(())
}
