//! Map configuration.
//!
//! Every section is optional on the wire and falls back to the engine
//! defaults, so a partial JSON document such as `{"zoom": {"limit": [-2, 2]}}`
//! is a complete configuration.

use crate::core::{bounds::ViewBox, constants::*};
use crate::Result;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct MapOptions {
    pub zoom: ZoomOptions,
    pub scroll: ScrollOptions,
    pub padding: Padding,
    pub clustering: ClusteringOptions,
    /// Initial view box; the source file's native view box when absent.
    /// Malformed input is logged and read as an empty box, which the
    /// viewport replaces with the native one.
    #[serde(deserialize_with = "lenient_view_box")]
    pub view_box: Option<ViewBox>,
    pub basemap: BasemapOptions,
    /// Fit the viewport to the markers once after each data load
    pub fit_markers_on_load: bool,
}

impl MapOptions {
    pub fn from_json(json: &str) -> Result<Self> {
        let options: Self = serde_json::from_str(json)?;
        Ok(options.normalized())
    }

    /// Repairs values that cannot be honoured, logging each fix.
    pub fn normalized(mut self) -> Self {
        if !(self.zoom.delta.is_finite() && self.zoom.delta > 1.0) {
            log::warn!(
                "zoom delta {} must be greater than 1, using {}",
                self.zoom.delta,
                DEFAULT_ZOOM_DELTA
            );
            self.zoom.delta = DEFAULT_ZOOM_DELTA;
        }
        let [min, max] = self.zoom.limit;
        if min > max {
            log::warn!("zoom limit [{}, {}] is inverted, swapping", min, max);
            self.zoom.limit = [max, min];
        }
        if !(self.clustering.cell_size.is_finite() && self.clustering.cell_size > 0.0) {
            log::warn!(
                "cluster cell size {} is not positive, using {}",
                self.clustering.cell_size,
                DEFAULT_CLUSTER_CELL_SIZE
            );
            self.clustering.cell_size = DEFAULT_CLUSTER_CELL_SIZE;
        }
        self
    }
}

fn lenient_view_box<'de, D>(deserializer: D) -> std::result::Result<Option<ViewBox>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => None,
        value => Some(ViewBox::from_value(&value)),
    })
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ZoomOptions {
    /// Inclusive `[min, max]` range of reachable zoom levels
    pub limit: [i32; 2],
    /// Scale multiplier between adjacent levels
    pub delta: f64,
}

impl ZoomOptions {
    pub fn min(&self) -> i32 {
        self.limit[0]
    }

    pub fn max(&self) -> i32 {
        self.limit[1]
    }

    pub fn allows(&self, level: i32) -> bool {
        level >= self.min() && level <= self.max()
    }
}

impl Default for ZoomOptions {
    fn default() -> Self {
        Self {
            limit: DEFAULT_ZOOM_LIMIT,
            delta: DEFAULT_ZOOM_DELTA,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ScrollOptions {
    /// Keep the viewport inside the native default view box
    pub limit: bool,
}

/// Container insets in pixels. A zero side is left untouched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Padding {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Padding {
    pub fn is_zero(&self) -> bool {
        self.top == 0.0 && self.right == 0.0 && self.bottom == 0.0 && self.left == 0.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ClusteringOptions {
    pub on: bool,
    /// Cell side in screen pixels
    pub cell_size: f64,
    /// Allow offloading bucketing to the worker thread
    pub background: bool,
    /// Marker count from which the worker is used
    pub background_threshold: usize,
}

impl Default for ClusteringOptions {
    fn default() -> Self {
        Self {
            on: false,
            cell_size: DEFAULT_CLUSTER_CELL_SIZE,
            background: true,
            background_threshold: DEFAULT_BACKGROUND_THRESHOLD,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BasemapOptions {
    /// An embedded tiled basemap is shown under the SVG; enables world wrap
    pub on: bool,
}
