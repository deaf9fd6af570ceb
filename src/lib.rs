#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod geometry;
pub mod route_dump;
pub mod routing;
pub mod scene;

#[cfg(feature = "cli")]
pub use cli::run;
pub use config::{Config, PathfinderKind, RoutingConfig, load_config};
pub use geometry::{Point, Rect, Side};
pub use routing::{LinkPath, LinkRequest, LinkStyle, compute_path, compute_path_with};
pub use scene::{RouteCache, Scene, parse_scene};
