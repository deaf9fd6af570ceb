use crate::config::{PathfinderKind, load_config};
use crate::route_dump::write_route_dump;
use crate::scene::{RouteCache, Scene, load_scene, parse_scene};
use anyhow::Result;
use clap::{Parser, ValueEnum};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "linkr", version, about = "Route links between cards on a canvas")]
pub struct Args {
    /// Scene file (.json / .json5) or '-' for stdin
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Output file for the routed links. Defaults to stdout.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Config JSON file (padding, cellSize, marginCells, maxCells, pathfinder)
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Pretty-print the JSON output
    #[arg(long = "pretty")]
    pub pretty: bool,

    /// Emit flat [x0, y0, x1, y1, ...] coordinate arrays
    #[arg(long = "flat")]
    pub flat: bool,

    /// Grid search used for route-around links
    #[arg(long = "pathfinder", value_enum)]
    pub pathfinder: Option<PathfinderArg>,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum PathfinderArg {
    Astar,
    Bfs,
}

impl From<PathfinderArg> for PathfinderKind {
    fn from(arg: PathfinderArg) -> Self {
        match arg {
            PathfinderArg::Astar => PathfinderKind::AStar,
            PathfinderArg::Bfs => PathfinderKind::Bfs,
        }
    }
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    let mut config = load_config(args.config.as_deref())?;
    if let Some(pathfinder) = args.pathfinder {
        config.routing.pathfinder = pathfinder.into();
    }
    config.output.pretty |= args.pretty;
    config.output.flat |= args.flat;

    let scene = read_scene(args.input.as_deref())?;
    let mut cache = RouteCache::new();
    let routes = scene.route_all(&config.routing, &mut cache);
    info!(
        cards = scene.cards.len(),
        links = routes.len(),
        "routed scene"
    );
    write_route_dump(args.output.as_deref(), &routes, &config.output)
}

fn read_scene(path: Option<&Path>) -> Result<Scene> {
    if let Some(path) = path
        && path != Path::new("-")
    {
        return load_scene(path);
    }
    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    parse_scene(&buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_flags() {
        let args = Args::try_parse_from([
            "linkr",
            "-i",
            "scene.json5",
            "--pretty",
            "--pathfinder",
            "bfs",
        ])
        .unwrap();
        assert_eq!(args.input, Some(PathBuf::from("scene.json5")));
        assert!(args.pretty);
        assert!(!args.flat);
        assert_eq!(
            args.pathfinder.map(PathfinderKind::from),
            Some(PathfinderKind::Bfs)
        );
    }
}
