use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context};
use clap::Parser;
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde_json::json;
use svgmap::prelude::*;

#[derive(Parser, Debug)]
#[command(author, version, about = "Clusters seeded markers on an SVG map and reports per-level counts")]
struct Args {
    /// SVG source file; a 2000x1000 world map is used when omitted
    #[arg(long)]
    svg: Option<PathBuf>,

    /// JSON file with map options
    #[arg(long)]
    options: Option<PathBuf>,

    /// Number of markers to scatter
    #[arg(long, default_value_t = 500)]
    markers: usize,

    /// Seed for marker placement
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Container width in pixels
    #[arg(long, default_value_t = 1000.0)]
    width: f64,

    /// Container height in pixels
    #[arg(long, default_value_t = 500.0)]
    height: f64,

    /// Cluster cell size in pixels
    #[arg(long)]
    cell_size: Option<f64>,

    /// Cluster on the worker thread regardless of marker count
    #[arg(long)]
    background: bool,
}

const BUILT_IN_MAP: &str =
    r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 2000 1000" geoViewBox="-180 85 180 -85"></svg>"#;

/// Uniform draw between two bounds given in either order
fn between(rng: &mut StdRng, a: f64, b: f64) -> f64 {
    if a == b {
        return a;
    }
    rng.random_range(a.min(b)..a.max(b))
}

fn scatter_markers(source: &SourceMeta, count: usize, seed: u64) -> Vec<Marker> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|i| {
            let id = format!("marker-{}", i);
            match source.geo_view_box {
                Some(frame) => Marker::from_geo(
                    id,
                    GeoPoint::new(
                        between(&mut rng, frame.south(), frame.north()),
                        between(&mut rng, frame.west(), frame.east()),
                    ),
                ),
                None => {
                    let view_box = source.view_box;
                    Marker::new(
                        id,
                        Point::new(
                            between(&mut rng, view_box.x, view_box.max_x()),
                            between(&mut rng, view_box.y, view_box.max_y()),
                        ),
                    )
                }
            }
        })
        .collect()
}

fn main() -> anyhow::Result<()> {
    svgmap::init_logging();

    let args = Args::parse();

    let source = match &args.svg {
        Some(path) => SourceMeta::from_file(path)
            .with_context(|| format!("reading map frame from {}", path.display()))?,
        None => SourceMeta::from_svg(BUILT_IN_MAP)?,
    };

    let mut options = match &args.options {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("reading options from {}", path.display()))?;
            MapOptions::from_json(&json)?
        }
        None => MapOptions::default(),
    };
    options.clustering.on = true;
    if let Some(cell_size) = args.cell_size {
        if cell_size <= 0.0 {
            bail!("cell size must be positive, got {}", cell_size);
        }
        options.clustering.cell_size = cell_size;
    }
    if args.background {
        options.clustering.background = true;
        options.clustering.background_threshold = 0;
    }

    let [min_level, max_level] = options.zoom.limit;
    let mut map = MapBuilder::from_source(&source)
        .id("demo")
        .container(args.width, args.height)
        .options(options)
        .build()?;

    let positioned = map.load_markers(scatter_markers(&source, args.markers, args.seed));
    log::info!("placed {} of {} markers", positioned, args.markers);

    if !map.wait_for_clusters(Duration::from_secs(30)) {
        bail!("clustering did not finish in time");
    }

    let levels: Vec<_> = (min_level..=max_level)
        .filter_map(|level| {
            let clusters = map.clustering().clusters(level)?;
            let largest = clusters.iter().map(Cluster::count).max().unwrap_or(0);
            let singles = clusters.iter().filter(|cluster| cluster.is_single()).count();
            Some(json!({
                "zoomLevel": level,
                "clusters": clusters.len(),
                "singles": singles,
                "largest": largest,
            }))
        })
        .collect();

    let report = json!({
        "viewBox": source.view_box,
        "geographic": map.is_geographic(),
        "markers": positioned,
        "cellSize": map.clustering().cell_size(),
        "levels": levels,
    });
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}
