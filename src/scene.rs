//! Cards and links as the canvas stores them, plus a per-link memo so unchanged
//! links are not re-routed when unrelated cards move.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use anyhow::bail;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::config::{PathfinderKind, RoutingConfig};
use crate::geometry::Rect;
use crate::routing::{LinkPath, LinkRequest, LinkStyle, compute_path, obstacles_for_link};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CardSize {
    pub width: f32,
    pub height: f32,
}

impl Default for CardSize {
    fn default() -> Self {
        Self {
            width: 200.0,
            height: 120.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
    pub id: String,
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub width: Option<f32>,
    #[serde(default)]
    pub height: Option<f32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Link {
    #[serde(default)]
    pub id: Option<String>,
    pub from: String,
    pub to: String,
    #[serde(default, alias = "linkStyle")]
    pub style: LinkStyle,
    #[serde(default)]
    pub route_around: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scene {
    #[serde(default)]
    pub card_size: CardSize,
    pub cards: Vec<Card>,
    #[serde(default)]
    pub links: Vec<Link>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RoutedLink {
    pub id: Option<String>,
    pub from: String,
    pub to: String,
    pub style: LinkStyle,
    /// `None` when the link is not drawn.
    pub path: Option<LinkPath>,
}

/// Parses a scene document. JSON5 is accepted so hand-written scenes can carry
/// comments and trailing commas.
pub fn parse_scene(input: &str) -> anyhow::Result<Scene> {
    let scene: Scene = json5::from_str(input)?;
    scene.validate()?;
    Ok(scene)
}

pub fn load_scene(path: &Path) -> anyhow::Result<Scene> {
    let contents = std::fs::read_to_string(path)?;
    parse_scene(&contents)
}

impl Scene {
    pub fn validate(&self) -> anyhow::Result<()> {
        let mut seen = HashSet::new();
        for card in &self.cards {
            if !seen.insert(card.id.as_str()) {
                bail!("duplicate card id '{}'", card.id);
            }
            let rect = self.card_rect(card);
            if rect.width < 0.0 || rect.height < 0.0 {
                bail!("card '{}' has a negative size", card.id);
            }
        }
        Ok(())
    }

    pub fn card_rect(&self, card: &Card) -> Rect {
        Rect::new(
            card.x,
            card.y,
            card.width.unwrap_or(self.card_size.width),
            card.height.unwrap_or(self.card_size.height),
        )
    }

    pub fn rect_of(&self, id: &str) -> Option<Rect> {
        self.cards
            .iter()
            .find(|card| card.id == id)
            .map(|card| self.card_rect(card))
    }

    /// Builds the routing request for `link`, or `None` when an endpoint is missing.
    /// Obstacles are only attached when the link can use them, which keeps memo
    /// keys stable for links that ignore obstacles.
    pub fn request_for(&self, link: &Link) -> Option<LinkRequest> {
        let source = self.rect_of(&link.from)?;
        let target = self.rect_of(&link.to)?;
        let obstacles = if link.route_around && link.style == LinkStyle::Orthogonal {
            let rects: Vec<Rect> = self.cards.iter().map(|card| self.card_rect(card)).collect();
            obstacles_for_link(&rects, &source, &target)
        } else {
            Vec::new()
        };
        Some(LinkRequest {
            source,
            target,
            style: link.style,
            route_around: link.route_around,
            obstacles,
        })
    }

    pub fn route_all(&self, config: &RoutingConfig, cache: &mut RouteCache) -> Vec<RoutedLink> {
        let mut routed = Vec::with_capacity(self.links.len());
        for link in &self.links {
            let Some(request) = self.request_for(link) else {
                warn!(
                    from = %link.from,
                    to = %link.to,
                    "link references an unknown card, skipping"
                );
                continue;
            };
            routed.push(RoutedLink {
                id: link.id.clone(),
                from: link.from.clone(),
                to: link.to.clone(),
                style: link.style,
                path: cache.get_or_compute(&request, config),
            });
        }
        routed
    }
}

type RectKey = [u32; 4];

fn rect_key(rect: &Rect) -> RectKey {
    [
        rect.x.to_bits(),
        rect.y.to_bits(),
        rect.width.to_bits(),
        rect.height.to_bits(),
    ]
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct RouteKey {
    source: RectKey,
    target: RectKey,
    style: LinkStyle,
    route_around: bool,
    obstacles: Vec<RectKey>,
    padding: u32,
    cell_size: u32,
    margin_cells: u32,
    max_cells: usize,
    pathfinder: PathfinderKind,
}

impl RouteKey {
    fn new(request: &LinkRequest, config: &RoutingConfig) -> Self {
        Self {
            source: rect_key(&request.source),
            target: rect_key(&request.target),
            style: request.style,
            route_around: request.route_around,
            obstacles: request.obstacles.iter().map(rect_key).collect(),
            padding: config.padding.to_bits(),
            cell_size: config.cell_size.to_bits(),
            margin_cells: config.margin_cells,
            max_cells: config.max_cells,
            pathfinder: config.pathfinder,
        }
    }
}

/// Memo of routed links keyed on the full routing input, bit-exact.
#[derive(Debug, Default)]
pub struct RouteCache {
    entries: HashMap<RouteKey, Option<LinkPath>>,
    hits: usize,
    misses: usize,
}

impl RouteCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_compute(
        &mut self,
        request: &LinkRequest,
        config: &RoutingConfig,
    ) -> Option<LinkPath> {
        let key = RouteKey::new(request, config);
        if let Some(path) = self.entries.get(&key) {
            self.hits += 1;
            return path.clone();
        }
        self.misses += 1;
        let path = compute_path(request, config);
        self.entries.insert(key, path.clone());
        path
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn hits(&self) -> usize {
        self.hits
    }

    pub fn misses(&self) -> usize {
        self.misses
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.hits = 0;
        self.misses = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCENE: &str = r#"{
        // three cards in a row, the middle one in the way
        cards: [
            { id: "a", x: 0, y: 0 },
            { id: "b", x: 250, y: 50, width: 100, height: 80 },
            { id: "c", x: 400, y: 0 },
        ],
        links: [
            { from: "a", to: "c", routeAround: true },
            { from: "a", to: "c", style: "free" },
            { from: "a", to: "missing" },
        ],
    }"#;

    #[test]
    fn parses_json5_with_defaults() {
        let scene = parse_scene(SCENE).unwrap();
        assert_eq!(scene.cards.len(), 3);
        assert_eq!(scene.rect_of("a"), Some(Rect::new(0.0, 0.0, 200.0, 120.0)));
        assert_eq!(scene.links[0].style, LinkStyle::Orthogonal);
        assert_eq!(scene.links[1].style, LinkStyle::Free);
    }

    #[test]
    fn rejects_duplicate_ids() {
        let err = parse_scene(r#"{ cards: [{ id: "a", x: 0, y: 0 }, { id: "a", x: 1, y: 1 }] }"#)
            .unwrap_err();
        assert!(err.to_string().contains("duplicate card id"));
    }

    #[test]
    fn obstacles_only_attached_when_used() {
        let scene = parse_scene(SCENE).unwrap();
        let routed = scene.request_for(&scene.links[0]).unwrap();
        assert_eq!(routed.obstacles, vec![Rect::new(250.0, 50.0, 100.0, 80.0)]);
        let free = scene.request_for(&scene.links[1]).unwrap();
        assert!(free.obstacles.is_empty());
        assert!(scene.request_for(&scene.links[2]).is_none());
    }

    #[test]
    fn route_all_skips_unknown_cards_and_memoizes() {
        let scene = parse_scene(SCENE).unwrap();
        let config = RoutingConfig::default();
        let mut cache = RouteCache::new();
        let first = scene.route_all(&config, &mut cache);
        assert_eq!(first.len(), 2);
        assert_eq!(cache.misses(), 2);
        assert_eq!(cache.hits(), 0);

        let second = scene.route_all(&config, &mut cache);
        assert_eq!(first, second);
        assert_eq!(cache.hits(), 2);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn moving_an_obstacle_invalidates_only_routed_links() {
        let mut scene = parse_scene(SCENE).unwrap();
        let config = RoutingConfig::default();
        let mut cache = RouteCache::new();
        scene.route_all(&config, &mut cache);
        scene.cards[1].y = 400.0;
        scene.route_all(&config, &mut cache);
        assert_eq!(cache.hits(), 1);
        assert_eq!(cache.misses(), 3);
    }
}
