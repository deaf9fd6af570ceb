use serde::{Deserialize, Serialize};
use std::path::Path;

/// Grid search implementation used when an orthogonal link has to route around.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PathfinderKind {
    #[default]
    AStar,
    Bfs,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutingConfig {
    /// Clearance kept between a routed line and any obstacle.
    pub padding: f32,
    /// Side length of a routing grid cell.
    pub cell_size: f32,
    /// Extra cells around the routing bounds so routes can pass outside edge obstacles.
    pub margin_cells: u32,
    /// Largest grid the router will allocate before giving up on the search.
    pub max_cells: usize,
    pub pathfinder: PathfinderKind,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            padding: 20.0,
            cell_size: 20.0,
            margin_cells: 5,
            max_cells: 250_000,
            pathfinder: PathfinderKind::AStar,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    pub pretty: bool,
    /// Emit `[x0, y0, x1, y1, ...]` instead of `[[x, y], ...]`.
    pub flat: bool,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Config {
    pub routing: RoutingConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    padding: Option<f32>,
    cell_size: Option<f32>,
    margin_cells: Option<u32>,
    max_cells: Option<usize>,
    pathfinder: Option<PathfinderKind>,
    pretty: Option<bool>,
    flat: Option<bool>,
}

fn positive(value: Option<f32>) -> Option<f32> {
    value.filter(|v| v.is_finite() && *v > 0.0)
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let contents = std::fs::read_to_string(path)?;
    parse_config(&contents)
}

/// Layers a JSON override document onto the defaults. Padding may be zero; other
/// sizes must be positive. Invalid values keep the default.
pub fn parse_config(contents: &str) -> anyhow::Result<Config> {
    let mut config = Config::default();
    let parsed: ConfigFile = serde_json::from_str(contents)?;

    if let Some(v) = parsed.padding.filter(|v| v.is_finite() && *v >= 0.0) {
        config.routing.padding = v;
    }
    if let Some(v) = positive(parsed.cell_size) {
        config.routing.cell_size = v;
    }
    if let Some(v) = parsed.margin_cells {
        config.routing.margin_cells = v;
    }
    if let Some(v) = parsed.max_cells.filter(|v| *v > 0) {
        config.routing.max_cells = v;
    }
    if let Some(v) = parsed.pathfinder {
        config.routing.pathfinder = v;
    }
    if let Some(v) = parsed.pretty {
        config.output.pretty = v;
    }
    if let Some(v) = parsed.flat {
        config.output.flat = v;
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_layer_on_defaults() {
        let config =
            parse_config(r#"{"cellSize": 10, "pathfinder": "bfs", "pretty": true}"#).unwrap();
        assert_eq!(config.routing.cell_size, 10.0);
        assert_eq!(config.routing.padding, 20.0);
        assert_eq!(config.routing.pathfinder, PathfinderKind::Bfs);
        assert!(config.output.pretty);
        assert!(!config.output.flat);
    }

    #[test]
    fn invalid_sizes_keep_defaults() {
        let config = parse_config(r#"{"cellSize": -4, "padding": -1, "maxCells": 0}"#).unwrap();
        assert_eq!(config.routing, RoutingConfig::default());
        let zero_pad = parse_config(r#"{"padding": 0}"#).unwrap();
        assert_eq!(zero_pad.routing.padding, 0.0);
    }

    #[test]
    fn missing_path_yields_defaults() {
        assert_eq!(load_config(None).unwrap(), Config::default());
        assert!(parse_config("not json").is_err());
    }
}
