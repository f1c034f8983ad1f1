//! Prelude module for common svgmap types and traits
//!
//! This module re-exports the most commonly used types, traits, and functions
//! for easy importing with `use svgmap::prelude::*;`

pub use crate::core::{
    bounds::{Bounds, GeoViewBox, ViewBox},
    builder::MapBuilder,
    config::{ClusteringOptions, MapOptions, Padding, ZoomOptions},
    converter::CoordinateConverter,
    geo::{GeoPoint, Point, ScreenPoint},
    map::{LoadState, SvgMap},
    projection::Projection,
    registry::MapRegistry,
    viewport::{ContainerSize, PanOutcome, ViewportChange, ViewportController},
};

pub use crate::layers::{MapObject, Marker, ObjectKind, Region, RenderItem};

pub use crate::input::{EventOutcome, HitTarget, InputEvent, KeyCode};

pub use crate::spatial::{Cluster, Clustering, MarkerIndex};

pub use crate::background::{
    BackgroundTask, BackgroundTaskManager, ClusterRequest, ClusterResponse, TaskManagerConfig,
    TaskPriority,
};

pub use crate::data::SourceMeta;

pub use crate::traits::MapObjectOps;

pub use crate::{Error as MapError, Result};

pub use fxhash::{FxHashMap as HashMap, FxHashSet as HashSet};
