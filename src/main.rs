use anyhow::{Context, Result};
use edge_stress::{client, config, domain, driver, telemetry};
use client::HttpConnector;
use config::Config;
use domain::Schedule;
use driver::LoadDriver;
use std::sync::Arc;
use telemetry::init_tracing;
use tracing::info;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cfg = Config::load().context("failed to load configuration")?;
    init_tracing(cfg.log_format);

    let base_url = cfg.base_url()?;
    let schedule = Schedule::default();
    info!(
        base_url = %base_url,
        targets = ?cfg.targets,
        phases = schedule.phases().len(),
        nominal_secs = schedule.nominal_duration().as_secs(),
        "starting load schedule"
    );

    let driver = LoadDriver::new(Arc::new(HttpConnector::new(&base_url)), cfg.targets.clone())?;
    let results = driver
        .run_schedule(schedule.phases(), &mut std::io::stdout())
        .await?;

    let total_requests: u64 = results.iter().map(|s| s.requests()).sum();
    info!(total_requests, "schedule complete");
    Ok(())
}
