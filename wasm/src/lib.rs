use card_link_router::config::{OutputConfig, PathfinderKind, RoutingConfig};
use card_link_router::route_dump::RouteDump;
use card_link_router::{LinkRequest, RouteCache, compute_path, parse_scene};
use serde::Deserialize;
use wasm_bindgen::prelude::*;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RouterOptions {
    padding: Option<f32>,
    cell_size: Option<f32>,
    pathfinder: Option<PathfinderKind>,
    flat: Option<bool>,
}

fn parse_options(options_json: Option<String>) -> Result<RouterOptions, String> {
    match options_json {
        Some(raw) => serde_json::from_str(&raw).map_err(|error| error.to_string()),
        None => Ok(RouterOptions::default()),
    }
}

fn build_routing_config(options: &RouterOptions) -> RoutingConfig {
    let mut config = RoutingConfig::default();
    if let Some(padding) = options.padding.filter(|v| v.is_finite() && *v >= 0.0) {
        config.padding = padding;
    }
    if let Some(cell_size) = options.cell_size.filter(|v| v.is_finite() && *v > 0.0) {
        config.cell_size = cell_size;
    }
    if let Some(pathfinder) = options.pathfinder {
        config.pathfinder = pathfinder;
    }
    config
}

fn route_link_json(request_json: &str, options: &RouterOptions) -> Result<String, String> {
    let request: LinkRequest = serde_json::from_str(request_json).map_err(|e| e.to_string())?;
    let path = compute_path(&request, &build_routing_config(options));
    serde_json::to_string(&path).map_err(|e| e.to_string())
}

fn route_scene_json(scene_json: &str, options: &RouterOptions) -> Result<String, String> {
    let scene = parse_scene(scene_json).map_err(|e| e.to_string())?;
    let mut cache = RouteCache::new();
    let routes = scene.route_all(&build_routing_config(options), &mut cache);
    let output = OutputConfig {
        pretty: false,
        flat: options.flat.unwrap_or(true),
    };
    serde_json::to_string(&RouteDump::from_routes(&routes, &output)).map_err(|e| e.to_string())
}

/// Routes one link. Returns the path as JSON, or `null` when the link is not drawn.
#[wasm_bindgen]
pub fn route_link(request_json: &str, options_json: Option<String>) -> Result<String, JsValue> {
    let options = parse_options(options_json).map_err(|error| JsValue::from_str(&error))?;
    route_link_json(request_json, &options).map_err(|error| JsValue::from_str(&error))
}

#[wasm_bindgen]
pub fn route_scene(scene_json: &str, options_json: Option<String>) -> Result<String, JsValue> {
    let options = parse_options(options_json).map_err(|error| JsValue::from_str(&error))?;
    route_scene_json(scene_json, &options).map_err(|error| JsValue::from_str(&error))
}
