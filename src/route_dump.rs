use crate::config::OutputConfig;
use crate::routing::LinkStyle;
use crate::scene::RoutedLink;
use serde::Serialize;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

#[derive(Debug, Serialize)]
pub struct RouteDump {
    pub links: Vec<LinkDump>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum Coords {
    Pairs(Vec<[f32; 2]>),
    Flat(Vec<f32>),
}

#[derive(Debug, Serialize)]
pub struct LinkDump {
    pub id: Option<String>,
    pub from: String,
    pub to: String,
    pub style: LinkStyle,
    pub rendered: bool,
    pub points: Coords,
    pub arrow: Coords,
}

impl RouteDump {
    pub fn from_routes(routes: &[RoutedLink], output: &OutputConfig) -> Self {
        let coords = |points: &[(f32, f32)]| {
            if output.flat {
                Coords::Flat(points.iter().flat_map(|&(x, y)| [x, y]).collect())
            } else {
                Coords::Pairs(points.iter().map(|&(x, y)| [x, y]).collect())
            }
        };
        let links = routes
            .iter()
            .map(|route| LinkDump {
                id: route.id.clone(),
                from: route.from.clone(),
                to: route.to.clone(),
                style: route.style,
                rendered: route.path.is_some(),
                points: coords(route.path.as_ref().map_or(&[][..], |p| &p.points[..])),
                arrow: coords(route.path.as_ref().map_or(&[][..], |p| &p.arrow[..])),
            })
            .collect();
        RouteDump { links }
    }
}

pub fn write_route_dump(
    path: Option<&Path>,
    routes: &[RoutedLink],
    output: &OutputConfig,
) -> anyhow::Result<()> {
    let dump = RouteDump::from_routes(routes, output);
    let mut writer: Box<dyn Write> = match path {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(io::stdout().lock()),
    };
    if output.pretty {
        serde_json::to_writer_pretty(&mut writer, &dump)?;
    } else {
        serde_json::to_writer(&mut writer, &dump)?;
    }
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}
