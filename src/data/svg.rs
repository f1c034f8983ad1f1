//! Reads the map frame out of an SVG source file.
//!
//! Only the root `<svg>` element's attributes matter here; the drawing
//! itself is handed to the renderer untouched. `roxmltree` is used directly
//! because `usvg` drops the custom `geoViewBox` attribute.

use crate::core::{
    bounds::{GeoViewBox, ViewBox},
    geo::parse_number,
};
use crate::{MapError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Frame information declared by a source file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceMeta {
    /// Native default view box
    pub view_box: ViewBox,
    pub width: Option<f64>,
    pub height: Option<f64>,
    /// Geographic frame from the `geoViewBox` attribute, if any
    pub geo_view_box: Option<GeoViewBox>,
}

impl SourceMeta {
    pub fn new(view_box: ViewBox) -> Self {
        Self {
            view_box,
            width: Some(view_box.width),
            height: Some(view_box.height),
            geo_view_box: None,
        }
    }

    pub fn with_geo_view_box(mut self, geo_view_box: GeoViewBox) -> Self {
        self.geo_view_box = Some(geo_view_box);
        self
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let source = std::fs::read_to_string(path)?;
        Self::from_svg(&source)
    }

    pub fn from_svg(source: &str) -> Result<Self> {
        let mut options = roxmltree::ParsingOptions::default();
        options.allow_dtd = true;
        let document = roxmltree::Document::parse_with_options(source, options)?;
        let root = document.root_element();
        if root.tag_name().name() != "svg" {
            return Err(MapError::InvalidSource(format!(
                "root element is <{}>, not <svg>",
                root.tag_name().name()
            )));
        }

        let width = root.attribute("width").and_then(parse_length);
        let height = root.attribute("height").and_then(parse_length);

        let declared = match root.attribute("viewBox") {
            Some(value) => match ViewBox::parse(value) {
                Ok(view_box) if view_box.is_valid() => Some(view_box),
                Ok(_) | Err(_) => {
                    log::warn!("ignoring unusable viewBox \"{}\"", value);
                    None
                }
            },
            None => None,
        };

        let view_box = match (declared, width, height) {
            (Some(view_box), _, _) => view_box,
            (None, Some(width), Some(height)) if width > 0.0 && height > 0.0 => {
                ViewBox::new(0.0, 0.0, width, height)
            }
            _ => {
                return Err(MapError::InvalidSource(
                    "svg declares neither a viewBox nor a width and height".to_string(),
                ))
            }
        };

        let geo_view_box = match root.attribute("geoViewBox") {
            Some(value) => match GeoViewBox::parse(value) {
                Ok(geo) => Some(geo),
                Err(err) => {
                    log::warn!("ignoring geoViewBox: {}", err);
                    None
                }
            },
            None => None,
        };

        Ok(Self {
            view_box,
            width,
            height,
            geo_view_box,
        })
    }

    pub fn is_geographic(&self) -> bool {
        self.geo_view_box.is_some()
    }
}

/// Lengths like `1000`, `1000px` or `1e3`; percentages carry no size.
fn parse_length(value: &str) -> Option<f64> {
    let value = value.trim();
    if value.ends_with('%') {
        return None;
    }
    parse_number(value).filter(|number| number.is_finite())
}
