/*!
Rendering of topology graphs into image files.

- `labels`: per-node label text.
- `layout`: spring layout of the nodes.
- `scene`: the SVG drawing.
- `raster`: SVG to PNG.
*/

pub mod labels;
pub mod layout;
pub mod raster;
pub mod scene;

use std::path::Path;

use thiserror::Error;

use crate::network::topology_graph::TopologyGraph;
use layout::{LayoutSettings, spring_layout};
use scene::{SceneSettings, render_svg};

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Failed to build the scene: {0}")]
    Scene(String),
    #[error("Failed to rasterize the scene: {0}")]
    Raster(String),
    #[error("Failed to write the image: {0}")]
    Encode(String),
}

/// Produces an image file of a topology graph.
pub trait Renderer: Send + Sync {
    fn render(&self, graph: &TopologyGraph, title: &str, path: &Path) -> Result<(), RenderError>;
}

/// Spring layout, SVG scene, PNG output.
#[derive(Debug, Clone, Default)]
pub struct PngRenderer {
    pub layout: LayoutSettings,
    pub scene: SceneSettings,
}

impl Renderer for PngRenderer {
    fn render(&self, graph: &TopologyGraph, title: &str, path: &Path) -> Result<(), RenderError> {
        let positions = spring_layout(graph.node_count(), &graph.index_edges(), &self.layout);
        let svg = render_svg(graph, title, &positions, &self.scene);
        let pixmap = raster::rasterize_svg(&svg)?;
        raster::save_png(&pixmap, path)?;
        log::debug!("[PngRenderer] render: wrote {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{network::route::RoutingTableRow, topology};

    #[test]
    fn test_png_renderer_writes_image() {
        let rows = vec![
            RoutingTableRow::new("10.0.0.0/8", "100 200 300"),
            RoutingTableRow::new("172.16.0.0/12", "100 400"),
        ];
        let graph = topology::build(&rows, "65000");
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bgp_topology_r1.png");

        PngRenderer::default()
            .render(&graph, "BGP Network Topology - Lab", &path)
            .unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(b"\x89PNG"));
    }

    #[test]
    fn test_png_renderer_local_only() {
        let graph = topology::build(&[], "65000");
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("local.png");
        assert!(PngRenderer::default().render(&graph, "empty", &path).is_ok());
    }
}
