//! # svgmap
//!
//! Viewport, coordinate transform and marker-clustering engine for
//! interactive SVG maps.
//!
//! A map is an SVG drawing with its own native coordinate system, optionally
//! tied to geography through a Mercator frame. This crate keeps the visible
//! window over that drawing (pan, discrete zoom levels, limits, padding),
//! converts points between native units, screen pixels and latitude and
//! longitude, and groups markers into per-zoom-level grid clusters, with the
//! bucketing optionally running on a background worker thread.

pub mod background;
pub mod core;
pub mod data;
pub mod input;
pub mod layers;
pub mod prelude;
pub mod spatial;
pub mod traits;
pub use crate::core::constants;

// Re-export public API
pub use crate::core::{
    bounds::{Bounds, GeoViewBox, ViewBox},
    builder::MapBuilder,
    config::MapOptions,
    converter::CoordinateConverter,
    geo::{GeoPoint, Point, ScreenPoint},
    map::{LoadState, SvgMap},
    projection::Projection,
    registry::MapRegistry,
    viewport::{ContainerSize, ViewportChange, ViewportController},
};

pub use layers::{MapObject, Marker, Region, RenderItem};

pub use input::{EventOutcome, InputEvent};

pub use spatial::{Cluster, Clustering};

pub use data::SourceMeta;

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, MapError>;

/// Common error types
#[derive(Debug, thiserror::Error)]
pub enum MapError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("XML error: {0}")]
    Xml(#[from] roxmltree::Error),

    #[error("Invalid source: {0}")]
    InvalidSource(String),

    #[error("Invalid view box: {0}")]
    InvalidViewBox(String),

    #[error("Map has no geographic frame")]
    NotGeographic,

    #[error("Unknown map: {0}")]
    UnknownMap(String),

    #[error("Worker error: {0}")]
    Worker(String),
}

/// Error type alias for convenience
pub type Error = MapError;

/// Installs an `env_logger` backend for the `log` output of this crate.
/// Safe to call more than once.
#[cfg(feature = "debug")]
pub fn init_logging() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .try_init();
}
