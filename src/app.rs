/*!
Per-router driver: connect, fetch the BGP table and local AS, build the topology, render it.

One router failing never stops the others. The session of a router is always disconnected once
it was opened.
*/

use std::{
    path::{Path, PathBuf},
    time::{Duration, Instant},
};

use thiserror::Error;

use crate::{
    config::{RouterConnectionConfig, RouterInventory},
    data_aquisition::core::{CommandOutput, DeviceConnector, DeviceSession, OutputMode, SessionError},
    network::route::RoutingTableRow,
    parsers::bgp_parser::local_as_from_output,
    render::{RenderError, Renderer},
    topology,
};

pub const BGP_TABLE_COMMAND: &str = "show ip bgp";
pub const LOCAL_AS_COMMAND: &str = "show run | include router bgp";

#[derive(Debug, Error)]
pub enum RouterError {
    #[error("Connection failed ({location}): {source}")]
    Connection {
        router_id: String,
        location: String,
        source: SessionError,
    },
    #[error("Retrieval failed ({location}): {source}")]
    Retrieval {
        router_id: String,
        location: String,
        source: SessionError,
    },
    #[error("Rendering failed ({location}): {source}")]
    Render {
        router_id: String,
        location: String,
        source: RenderError,
    },
}

impl RouterError {
    pub fn router_id(&self) -> &str {
        match self {
            RouterError::Connection { router_id, .. }
            | RouterError::Retrieval { router_id, .. }
            | RouterError::Render { router_id, .. } => router_id,
        }
    }
}

/// Outcome of one run over the inventory.
#[derive(Debug, Default)]
pub struct RunReport {
    /// Router id and the image written for it.
    pub succeeded: Vec<(String, PathBuf)>,
    pub failed: Vec<RouterError>,
}

impl RunReport {
    pub fn failed_ids(&self) -> Vec<&str> {
        self.failed.iter().map(RouterError::router_id).collect()
    }
}

pub struct App {
    connector: Box<dyn DeviceConnector>,
    renderer: Box<dyn Renderer>,
    output_dir: PathBuf,
}

impl App {
    pub fn new(
        connector: Box<dyn DeviceConnector>,
        renderer: Box<dyn Renderer>,
        output_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            connector,
            renderer,
            output_dir: output_dir.into(),
        }
    }

    pub fn artifact_path(&self, router_id: &str) -> PathBuf {
        artifact_path(&self.output_dir, router_id)
    }

    /// Processes every router of `inventory` in order.
    pub async fn run(&self, inventory: &RouterInventory) -> RunReport {
        let mut report = RunReport::default();
        for (router_id, config) in inventory.iter() {
            log::info!("Connecting to {router_id} ({})...", config.location);
            let started = Instant::now();
            match self.process_router(router_id, config).await {
                Ok(path) => {
                    let elapsed = Duration::from_millis(started.elapsed().as_millis() as u64);
                    log::info!(
                        "Saved {} for {router_id} in {}",
                        path.display(),
                        humantime::format_duration(elapsed)
                    );
                    report.succeeded.push((router_id.to_string(), path));
                }
                Err(e) => {
                    log::error!("Error with router {router_id}: {e}");
                    report.failed.push(e);
                }
            }
        }
        log::info!(
            "Finished: {} succeeded, {} failed",
            report.succeeded.len(),
            report.failed.len()
        );
        report
    }

    async fn process_router(
        &self,
        router_id: &str,
        config: &RouterConnectionConfig,
    ) -> Result<PathBuf, RouterError> {
        let mut session =
            self.connector
                .connect(config)
                .await
                .map_err(|source| RouterError::Connection {
                    router_id: router_id.to_string(),
                    location: config.location.clone(),
                    source,
                })?;

        let result = self.visualize(session.as_mut(), router_id, config).await;

        if let Err(e) = session.disconnect().await {
            log::warn!("[App] process_router: disconnect from {router_id} failed: {e}");
        }
        result
    }

    async fn visualize(
        &self,
        session: &mut dyn DeviceSession,
        router_id: &str,
        config: &RouterConnectionConfig,
    ) -> Result<PathBuf, RouterError> {
        let retrieval = |source: SessionError| RouterError::Retrieval {
            router_id: router_id.to_string(),
            location: config.location.clone(),
            source,
        };

        let rows: Vec<RoutingTableRow> = session
            .send_command(BGP_TABLE_COMMAND, OutputMode::Structured)
            .await
            .and_then(CommandOutput::into_rows)
            .map_err(retrieval)?
            .iter()
            .map(RoutingTableRow::from_structured)
            .collect();
        dump_table(router_id, &rows);

        let local_as = session
            .send_command(LOCAL_AS_COMMAND, OutputMode::Raw)
            .await
            .and_then(CommandOutput::into_text)
            .and_then(|text| Ok(local_as_from_output(&text)?))
            .map_err(retrieval)?;
        log::debug!("[App] visualize: {router_id} is in AS {local_as}");

        let graph = topology::build(&rows, &local_as);
        let path = self.artifact_path(router_id);
        let title = format!("BGP Network Topology - {}", config.location);
        self.renderer
            .render(&graph, &title, &path)
            .map_err(|source| RouterError::Render {
                router_id: router_id.to_string(),
                location: config.location.clone(),
                source,
            })?;
        Ok(path)
    }
}

pub fn artifact_path(output_dir: &Path, router_id: &str) -> PathBuf {
    output_dir.join(format!("bgp_topology_{router_id}.png"))
}

fn dump_table(router_id: &str, rows: &[RoutingTableRow]) {
    if !log::log_enabled!(log::Level::Debug) {
        return;
    }
    match serde_json::to_string_pretty(rows) {
        Ok(json) => log::debug!("[App] BGP table of {router_id}:\n{json}"),
        Err(e) => log::debug!("[App] could not serialize BGP table of {router_id}: {e}"),
    }
}
