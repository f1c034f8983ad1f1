use crate::{
    background::{
        clustering::{compute_clusters, take_responses, ClusterRequest, ClusterResponse, ClusterTask},
        tasks::{BackgroundTaskManager, TaskManagerConfig, TaskResult},
    },
    core::{
        bounds::{Bounds, GeoViewBox, ViewBox},
        config::{MapOptions, Padding},
        constants::HIT_RADIUS,
        converter::CoordinateConverter,
        geo::{Point, ScreenPoint},
        projection::Projection,
        viewport::{ContainerSize, PanOutcome, ViewportChange, ViewportController},
    },
    data::svg::SourceMeta,
    input::events::{EventOutcome, HitTarget, InputEvent, MapAction},
    layers::{
        marker::Marker,
        object::{MapObject, ObjectKind, RenderItem},
        region::Region,
    },
    prelude::{HashMap, HashSet},
    spatial::{
        clustering::{Cluster, ClusterObject, Clustering},
        index::{IndexedMarker, MarkerIndex},
    },
    traits::MapObjectOps,
    MapError, Result,
};
use std::sync::Arc;
use std::time::Duration;

/// Where the current marker data set is in its load cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    /// No markers loaded yet
    Uninitialized,
    /// Markers loaded, viewport not yet fitted to them
    Loaded,
    /// Viewport fitted once for this load
    Fitted,
}

/// One SVG map: its viewport, optional geographic frame, markers, regions
/// and their clusters.
///
/// Every transition goes through the map so cluster state follows the zoom
/// level. Nothing here is global; several maps can live side by side, see
/// [`MapRegistry`](crate::core::registry::MapRegistry).
pub struct SvgMap {
    id: String,
    options: MapOptions,
    viewport: ViewportController,
    projection: Option<Projection>,
    markers: Vec<Marker>,
    marker_slots: HashMap<String, usize>,
    regions: Vec<Region>,
    index: MarkerIndex,
    clustering: Clustering,
    task_config: TaskManagerConfig,
    background_tasks: Option<BackgroundTaskManager>,
    load_state: LoadState,
    /// Level whose clusters were last available, kept visible while a newer level computes
    shown_level: Option<i32>,
}

impl SvgMap {
    pub fn new(
        id: impl Into<String>,
        native: ViewBox,
        geo_view_box: Option<GeoViewBox>,
        container: ContainerSize,
        options: MapOptions,
    ) -> Result<Self> {
        let options = options.normalized();
        let viewport = ViewportController::new(native, container, &options)?;
        let projection = geo_view_box
            .map(GeoViewBox::validated)
            .transpose()?
            .map(|frame| Projection::new(frame, native));
        let id = id.into();

        log::debug!(
            "created map '{}' over {} ({})",
            id,
            native.to_attribute(),
            if projection.is_some() { "geographic" } else { "flat" }
        );

        Ok(Self {
            id,
            clustering: Clustering::new(options.clustering.cell_size),
            options,
            viewport,
            projection,
            markers: Vec::new(),
            marker_slots: HashMap::default(),
            regions: Vec::new(),
            index: MarkerIndex::new(),
            task_config: TaskManagerConfig::default(),
            background_tasks: None,
            load_state: LoadState::Uninitialized,
            shown_level: None,
        })
    }

    pub fn from_source(
        id: impl Into<String>,
        source: &SourceMeta,
        container: ContainerSize,
        options: MapOptions,
    ) -> Result<Self> {
        Self::new(id, source.view_box, source.geo_view_box, container, options)
    }

    pub fn from_svg(
        id: impl Into<String>,
        svg: &str,
        container: ContainerSize,
        options: MapOptions,
    ) -> Result<Self> {
        Self::from_source(id, &SourceMeta::from_svg(svg)?, container, options)
    }

    /// Replaces the worker configuration; takes effect on the next offloaded request.
    pub fn with_task_config(mut self, config: TaskManagerConfig) -> Self {
        self.task_config = config;
        self.background_tasks = None;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn options(&self) -> &MapOptions {
        &self.options
    }

    pub fn viewport(&self) -> &ViewportController {
        &self.viewport
    }

    pub fn projection(&self) -> Option<&Projection> {
        self.projection.as_ref()
    }

    pub fn is_geographic(&self) -> bool {
        self.projection.is_some()
    }

    pub fn converter(&self) -> CoordinateConverter<'_> {
        CoordinateConverter::new(
            &self.viewport,
            self.projection.as_ref(),
            self.options.basemap.on,
        )
    }

    pub fn load_state(&self) -> LoadState {
        self.load_state
    }

    pub fn zoom_level(&self) -> i32 {
        self.viewport.zoom_level()
    }

    pub fn view_box(&self) -> ViewBox {
        self.viewport.view_box()
    }

    // --- viewport transitions ----------------------------------------------------------------

    pub fn set_view_box(&mut self, view_box: Option<ViewBox>) -> ViewportChange {
        let change = self.viewport.set_view_box(view_box);
        self.after_view_change(change)
    }

    pub fn zoom_by(&mut self, direction: i32, center: Option<Point>) -> Option<ViewportChange> {
        let change = self.viewport.zoom_by(direction, center)?;
        Some(self.after_view_change(change))
    }

    pub fn zoom_in(&mut self, center: Option<Point>) -> Option<ViewportChange> {
        self.zoom_by(1, center)
    }

    pub fn zoom_out(&mut self, center: Option<Point>) -> Option<ViewportChange> {
        self.zoom_by(-1, center)
    }

    pub fn zoom_to_exact(&mut self, scale_factor: f64, center: Option<Point>) -> ViewportChange {
        let change = self.viewport.zoom_to_exact(scale_factor, center);
        self.after_view_change(change)
    }

    /// Pans by container pixels. The outcome tells an embedded basemap which axes to follow.
    pub fn pan_by(&mut self, dx: f64, dy: f64) -> PanOutcome {
        self.viewport.pan_by(dx, dy)
    }

    pub fn reset_to_initial(&mut self) -> ViewportChange {
        let change = self.viewport.reset_to_initial();
        self.after_view_change(change)
    }

    pub fn reset_to_current_fit(&mut self) -> ViewportChange {
        let change = self.viewport.reset_to_current_fit();
        self.after_view_change(change)
    }

    pub fn fit_to_bounds(&mut self, bounds: &Bounds) -> ViewportChange {
        let change = self.viewport.fit_to_bounds(bounds);
        self.after_view_change(change)
    }

    pub fn fit_geo_bounds(&mut self, frame: &GeoViewBox) -> Result<ViewportChange> {
        let projection = self.projection.as_ref().ok_or(MapError::NotGeographic)?;
        let bounds = projection.forward_bounds(frame);
        Ok(self.fit_to_bounds(&bounds))
    }

    /// Resizes the container. A new width changes every level's pixel scale,
    /// so cached clusters are discarded.
    pub fn resize(&mut self, container: ContainerSize) -> ViewportChange {
        let width = self.viewport.container().width;
        let change = self.viewport.resize_container(container);
        if self.viewport.container().width != width {
            self.clustering.invalidate();
            self.shown_level = None;
        }
        self.after_view_change(change)
    }

    pub fn set_scroll_limit(&mut self, limit: bool) -> ViewportChange {
        self.options.scroll.limit = limit;
        let change = self.viewport.set_scroll_limit(limit);
        self.after_view_change(change)
    }

    pub fn set_zoom_limit(&mut self, limit: [i32; 2]) {
        self.viewport.set_zoom_limit(limit);
        self.options.zoom.limit = self.viewport.zoom_options().limit;
    }

    pub fn set_padding(&mut self, padding: Padding) -> ViewportChange {
        self.options.padding = padding;
        let change = self.viewport.set_padding(padding);
        self.after_view_change(change)
    }

    pub fn zoom_to_marker(&mut self, id: &str, scale_factor: f64) -> Option<ViewportChange> {
        let position = self.marker(id)?.position()?;
        Some(self.zoom_to_exact(scale_factor, Some(position)))
    }

    pub fn zoom_to_cluster(&mut self, cluster: &Cluster) -> ViewportChange {
        self.fit_to_bounds(&cluster.bounds)
    }

    fn after_view_change(&mut self, change: ViewportChange) -> ViewportChange {
        self.ensure_clusters();
        change
    }

    // --- data ----------------------------------------------------------------------------------

    /// Replaces the marker data set and starts a new load cycle.
    ///
    /// Returns how many markers ended up with a usable native position.
    /// Later markers reusing an id already in the set are dropped.
    pub fn load_markers(&mut self, mut markers: Vec<Marker>) -> usize {
        let mut seen = HashSet::default();
        markers.retain(|marker| {
            let first = seen.insert(marker.id.clone());
            if !first {
                log::warn!("dropping marker with duplicate id '{}'", marker.id);
            }
            first
        });

        self.markers = markers;
        for marker in &mut self.markers {
            marker.resolve(self.projection.as_ref());
        }

        self.marker_slots = self
            .markers
            .iter()
            .enumerate()
            .map(|(slot, marker)| (marker.id.clone(), slot))
            .collect();

        self.rebuild_marker_state();
        self.load_state = LoadState::Loaded;

        let positioned = self.index.len();
        log::debug!(
            "map '{}' loaded {} markers, {} positioned",
            self.id,
            self.markers.len(),
            positioned
        );

        if self.options.fit_markers_on_load {
            self.fit_markers_once();
        }
        self.ensure_clusters();
        positioned
    }

    /// Adds one marker. Returns `false` and keeps the existing one when the id is taken.
    pub fn add_marker(&mut self, mut marker: Marker) -> bool {
        if self.marker_slots.contains_key(&marker.id) {
            log::warn!("marker id '{}' is already in use", marker.id);
            return false;
        }
        marker.resolve(self.projection.as_ref());
        self.marker_slots.insert(marker.id.clone(), self.markers.len());
        self.markers.push(marker);
        self.rebuild_marker_state();
        self.ensure_clusters();
        true
    }

    pub fn clear_markers(&mut self) {
        self.markers.clear();
        self.marker_slots = HashMap::default();
        self.rebuild_marker_state();
        self.load_state = LoadState::Uninitialized;
    }

    fn rebuild_marker_state(&mut self) {
        let positioned: Vec<(&str, Point)> = self
            .markers
            .iter()
            .filter_map(|marker| marker.position().map(|point| (marker.id.as_str(), point)))
            .collect();

        self.index = MarkerIndex::bulk_load(
            positioned
                .iter()
                .map(|&(id, point)| IndexedMarker::new(id, point))
                .collect(),
        );
        self.clustering.set_objects(
            positioned
                .iter()
                .map(|&(id, point)| ClusterObject::new(id, point))
                .collect(),
        );
        self.shown_level = None;
    }

    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    pub fn marker(&self, id: &str) -> Option<&Marker> {
        self.marker_slots.get(id).map(|&slot| &self.markers[slot])
    }

    /// Bounds of every positioned marker
    pub fn marker_bounds(&self) -> Option<Bounds> {
        self.index.bounds()
    }

    /// Fits the viewport to the markers, once per load.
    pub fn fit_markers_once(&mut self) -> Option<ViewportChange> {
        if self.load_state != LoadState::Loaded {
            return None;
        }
        self.load_state = LoadState::Fitted;
        let bounds = self.marker_bounds()?;
        Some(self.fit_to_bounds(&bounds))
    }

    pub fn add_region(&mut self, region: Region) {
        self.regions.push(region);
    }

    pub fn set_regions(&mut self, regions: Vec<Region>) {
        self.regions = regions;
    }

    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    // --- clustering ----------------------------------------------------------------------------

    pub fn is_clustering(&self) -> bool {
        self.options.clustering.on
    }

    /// Switches clustering; either way the cluster caches are discarded.
    pub fn toggle_clustering(&mut self, on: bool) {
        self.options.clustering.on = on;
        self.clustering.invalidate();
        self.shown_level = None;
        self.ensure_clusters();
    }

    pub fn set_cluster_cell_size(&mut self, cell_size: f64) {
        if !(cell_size.is_finite() && cell_size > 0.0) {
            log::warn!("ignoring cluster cell size {}", cell_size);
            return;
        }
        self.options.clustering.cell_size = cell_size;
        self.clustering.set_cell_size(cell_size);
        self.shown_level = None;
        self.ensure_clusters();
    }

    pub fn clustering(&self) -> &Clustering {
        &self.clustering
    }

    /// Clusters for the current level, if computed yet
    pub fn clusters(&self) -> Option<&[Cluster]> {
        self.clustering.clusters(self.viewport.zoom_level())
    }

    /// Clusters being shown: the current level's, else the last level that had any.
    fn displayed_clusters(&self) -> Option<&[Cluster]> {
        if !self.options.clustering.on {
            return None;
        }
        self.clusters()
            .or_else(|| self.shown_level.and_then(|level| self.clustering.clusters(level)))
    }

    fn cluster_request(&self) -> ClusterRequest {
        let current = self.viewport.zoom_level();
        let zoom = self.viewport.zoom_options();
        let table = self.viewport.table();

        ClusterRequest {
            objects: self.clustering.objects().to_vec(),
            cell_size: self.clustering.cell_size(),
            map_width: self.viewport.container().width,
            zoom_levels: table
                .iter()
                .filter(|entry| entry.level == current || zoom.allows(entry.level))
                .map(|entry| (entry.level, *entry))
                .collect(),
            zoom_level: current,
            zoom_delta: table.delta(),
            svg_view_box: self.viewport.native_view_box(),
            generation: self.clustering.generation(),
        }
    }

    fn wants_background(&self) -> bool {
        self.options.clustering.background
            && self.clustering.len() >= self.options.clustering.background_threshold
    }

    /// Makes sure the current level has clusters or a request in flight for them.
    fn ensure_clusters(&mut self) {
        if !self.options.clustering.on || self.clustering.is_empty() {
            return;
        }

        let level = self.viewport.zoom_level();
        if self.clustering.has_level(level) {
            self.shown_level = Some(level);
            return;
        }
        // An in-flight request covers every level; wait for it.
        if self.clustering.is_pending() {
            return;
        }

        let task = Arc::new(ClusterTask::new(self.cluster_request()));

        if self.wants_background() {
            let config = &self.task_config;
            let tasks = self
                .background_tasks
                .get_or_insert_with(|| BackgroundTaskManager::new(config.clone()));

            if !tasks.is_synchronous() {
                match tasks.submit_task(task.clone()) {
                    Ok(()) => {
                        log::debug!(
                            "offloaded clustering of {} markers for level {}",
                            self.clustering.len(),
                            level
                        );
                        self.clustering.mark_pending();
                        return;
                    }
                    Err(err) => log::warn!("{}; clustering on the calling thread", err),
                }
            }
        }

        let responses = compute_clusters(task.request());
        self.apply_responses(responses);
    }

    /// Turns worker responses into renderable clusters, dropping stale ones.
    fn apply_responses(&mut self, responses: Vec<ClusterResponse>) -> usize {
        let mut applied = 0;

        for response in responses {
            let generation = response.generation;
            let level = response.zoom_level;
            let clusters = response
                .clusters
                .values()
                .map(|cell| {
                    let bounds = Bounds::from_points(
                        cell.markers
                            .iter()
                            .filter_map(|member| self.marker_slots.get(&member.id))
                            .filter_map(|&slot| self.markers[slot].position())
                            .collect::<Vec<_>>()
                            .iter(),
                    )
                    .unwrap_or_else(|| Bounds::from_point(cell.center()));
                    Cluster::from_cell(cell, bounds, level)
                })
                .collect();

            if self.clustering.store(generation, level, clusters) {
                applied += 1;
            }
            self.clustering.finish_pending(generation);
        }

        let current = self.viewport.zoom_level();
        if self.clustering.has_level(current) {
            self.shown_level = Some(current);
        }
        applied
    }

    fn handle_task_result(&mut self, result: TaskResult) -> usize {
        match result.result.and_then(take_responses) {
            Ok(responses) => self.apply_responses(responses),
            Err(err) => {
                log::warn!("clustering task '{}' failed: {}", result.task_id, err);
                match ClusterTask::generation_of(&result.task_id) {
                    Some(generation) => self.clustering.finish_pending(generation),
                    None => log::warn!("task id '{}' names no generation", result.task_id),
                }
                0
            }
        }
    }

    /// Applies finished worker results without blocking. Returns the number
    /// of levels stored.
    pub fn poll_background(&mut self) -> usize {
        let results = match &self.background_tasks {
            Some(tasks) => tasks.try_recv_results(),
            None => return 0,
        };

        let mut applied = 0;
        for result in results {
            applied += self.handle_task_result(result);
        }
        if applied > 0 {
            self.ensure_clusters();
        }
        applied
    }

    /// Blocks until the in-flight clustering request resolves or `timeout` passes.
    pub fn wait_for_clusters(&mut self, timeout: Duration) -> bool {
        let started = instant::Instant::now();

        while self.clustering.is_pending() {
            let elapsed = started.elapsed();
            if elapsed >= timeout {
                break;
            }
            let remaining = timeout - elapsed;
            let result = match &self.background_tasks {
                Some(tasks) => tasks.recv_result_timeout(remaining),
                None => break,
            };
            if let Some(result) = result {
                self.handle_task_result(result);
            }
        }

        self.ensure_clusters();
        !self.clustering.is_pending()
    }

    // --- output --------------------------------------------------------------------------------

    /// Everything to draw at the current level, regions first.
    ///
    /// Size-1 clusters come back as the plain marker they contain.
    pub fn objects(&self) -> Vec<MapObject> {
        let mut objects: Vec<MapObject> = self.regions.iter().cloned().map(MapObject::from).collect();

        match self.displayed_clusters() {
            Some(clusters) => {
                for cluster in clusters {
                    if cluster.is_single() {
                        if let Some(marker) = self.marker(&cluster.members[0]) {
                            objects.push(MapObject::Marker(marker.clone()));
                        }
                    } else {
                        objects.push(MapObject::Cluster(cluster.clone()));
                    }
                }
            }
            None => objects.extend(
                self.markers
                    .iter()
                    .filter(|marker| marker.position().is_some())
                    .cloned()
                    .map(MapObject::from),
            ),
        }

        objects
    }

    /// Container-pixel positions of everything to draw
    pub fn render_items(&self) -> Vec<RenderItem> {
        let converter = self.converter();
        self.objects()
            .into_iter()
            .filter_map(|object| {
                let position = object.screen_position(&converter)?;
                let count = match &object {
                    MapObject::Cluster(cluster) => cluster.count(),
                    _ => 1,
                };
                Some(RenderItem {
                    id: object.id().to_string(),
                    kind: object.kind(),
                    position,
                    count,
                })
            })
            .collect()
    }

    /// Markers inside the current view box, in load order
    pub fn visible_markers(&self) -> Vec<&Marker> {
        let mut slots: Vec<usize> = self
            .index
            .query(&Bounds::from(self.viewport.view_box()))
            .into_iter()
            .filter_map(|item| self.marker_slots.get(&item.id).copied())
            .collect();
        slots.sort_unstable();
        slots.dedup();
        slots.into_iter().map(|slot| &self.markers[slot]).collect()
    }

    /// Marker within `radius` container pixels of `position`
    pub fn marker_at(&self, position: &ScreenPoint, radius: f64) -> Option<&Marker> {
        let native = self.converter().container_to_native(position);
        let item = self
            .index
            .nearest_within(&native, radius / self.viewport.scale())?;
        self.marker(&item.id)
    }

    /// Topmost region under a container position
    pub fn region_at(&self, position: &ScreenPoint) -> Option<&Region> {
        let native = self.converter().container_to_native(position);
        self.regions.iter().rev().find(|region| region.contains(&native))
    }

    /// Cluster drawn within `radius` container pixels of `position`
    pub fn cluster_at(&self, position: &ScreenPoint, radius: f64) -> Option<&Cluster> {
        let converter = self.converter();
        self.displayed_clusters()?
            .iter()
            .filter(|cluster| !cluster.is_single())
            .find(|cluster| {
                let anchor = converter.native_to_container(&cluster.center);
                let dx = anchor.x - position.x;
                let dy = anchor.y - position.y;
                (dx * dx + dy * dy).sqrt() <= radius
            })
    }

    pub fn hit_test(&self, position: &ScreenPoint) -> Option<HitTarget> {
        if let Some(cluster) = self.cluster_at(position, HIT_RADIUS) {
            return Some(HitTarget {
                id: cluster.id.clone(),
                kind: ObjectKind::Cluster,
            });
        }
        if let Some(marker) = self.marker_at(position, HIT_RADIUS) {
            return Some(HitTarget {
                id: marker.id.clone(),
                kind: ObjectKind::Marker,
            });
        }
        self.region_at(position).map(|region| HitTarget {
            id: region.id.clone(),
            kind: ObjectKind::Region,
        })
    }

    // --- input ---------------------------------------------------------------------------------

    pub fn handle_event(&mut self, event: InputEvent) -> EventOutcome {
        let Some(action) = event.action() else {
            return EventOutcome::Ignored;
        };

        match action {
            MapAction::PanBy { dx, dy } => {
                let outcome = self.pan_by(dx, dy);
                if outcome.moved() {
                    EventOutcome::Panned(outcome)
                } else {
                    EventOutcome::Ignored
                }
            }
            MapAction::Zoom {
                direction,
                position,
            } => {
                let center = position.map(|p| self.converter().container_to_native(&p));
                match self.zoom_by(direction, center) {
                    Some(change) => EventOutcome::Zoomed(change),
                    None => EventOutcome::Ignored,
                }
            }
            MapAction::ResetView => EventOutcome::Zoomed(self.reset_to_initial()),
            MapAction::Resize(size) => EventOutcome::Resized(self.resize(size)),
            MapAction::Select(position) => EventOutcome::Selected(self.hit_test(&position)),
        }
    }
}
