//! Map builder for fluent API configuration
//!
//! Collects the frame, container and options of an [`SvgMap`] and validates
//! them together in [`MapBuilder::build`].

use crate::{
    background::tasks::TaskManagerConfig,
    core::{
        bounds::{GeoViewBox, ViewBox},
        config::MapOptions,
        map::SvgMap,
        viewport::ContainerSize,
    },
    data::svg::SourceMeta,
    MapError, Result,
};

/// Builder for creating and configuring SvgMap instances
#[derive(Debug, Clone, Default)]
pub struct MapBuilder {
    id: Option<String>,
    view_box: Option<ViewBox>,
    geo_view_box: Option<GeoViewBox>,
    container: Option<ContainerSize>,
    options: MapOptions,
    task_config: Option<TaskManagerConfig>,
}

impl MapBuilder {
    /// Create a new MapBuilder with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from the frame declared by a source file
    pub fn from_source(source: &SourceMeta) -> Self {
        Self {
            view_box: Some(source.view_box),
            geo_view_box: source.geo_view_box,
            ..Self::default()
        }
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Native default view box
    pub fn view_box(mut self, view_box: ViewBox) -> Self {
        self.view_box = Some(view_box);
        self
    }

    pub fn geo_view_box(mut self, geo_view_box: GeoViewBox) -> Self {
        self.geo_view_box = Some(geo_view_box);
        self
    }

    /// Container size in pixels; defaults to the view box size
    pub fn container(mut self, width: f64, height: f64) -> Self {
        self.container = Some(ContainerSize::new(width, height));
        self
    }

    pub fn options(mut self, options: MapOptions) -> Self {
        self.options = options;
        self
    }

    pub fn zoom_limit(mut self, min: i32, max: i32) -> Self {
        self.options.zoom.limit = [min, max];
        self
    }

    pub fn clustering(mut self, on: bool) -> Self {
        self.options.clustering.on = on;
        self
    }

    pub fn task_config(mut self, config: TaskManagerConfig) -> Self {
        self.task_config = Some(config);
        self
    }

    pub fn build(self) -> Result<SvgMap> {
        let view_box = self
            .view_box
            .ok_or_else(|| MapError::InvalidSource("map has no native view box".to_string()))?;
        let container = self
            .container
            .unwrap_or_else(|| ContainerSize::new(view_box.width, view_box.height));
        let id = self.id.unwrap_or_else(|| "map".to_string());

        let map = SvgMap::new(id, view_box, self.geo_view_box, container, self.options)?;
        Ok(match self.task_config {
            Some(config) => map.with_task_config(config),
            None => map,
        })
    }
}
