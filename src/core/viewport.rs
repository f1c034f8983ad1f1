use crate::core::{
    bounds::{Bounds, ViewBox},
    config::{MapOptions, Padding, ZoomOptions},
    constants::{NO_ANIMATION_WINDOW_MS, ZOOM_TABLE_RANGE},
    geo::Point,
};
use crate::{MapError, Result};
use instant::{Duration, Instant};
use serde::{Deserialize, Serialize};

/// Pixel size of the element the map is drawn into
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ContainerSize {
    pub width: f64,
    pub height: f64,
}

impl ContainerSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn is_valid(&self) -> bool {
        self.width > 0.0 && self.height > 0.0 && self.width.is_finite() && self.height.is_finite()
    }

    pub fn aspect_ratio(&self) -> f64 {
        self.width / self.height
    }
}

/// One precomputed step of the zoom ladder
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoomLevel {
    pub level: i32,
    /// Magnification relative to level 0
    pub scale_factor: f64,
    /// View box at this level, centred on the initial view box
    pub view_box: ViewBox,
}

/// Every level in `[-ZOOM_TABLE_RANGE, ZOOM_TABLE_RANGE]` mapped to its scale and view box.
#[derive(Debug, Clone, PartialEq)]
pub struct ZoomTable {
    delta: f64,
    levels: Vec<ZoomLevel>,
}

impl ZoomTable {
    pub fn new(initial: ViewBox, delta: f64) -> Self {
        let center = initial.center();
        let levels = (-ZOOM_TABLE_RANGE..=ZOOM_TABLE_RANGE)
            .map(|level| {
                let scale_factor = delta.powi(level);
                ZoomLevel {
                    level,
                    scale_factor,
                    view_box: ViewBox::from_center(
                        center,
                        initial.width / scale_factor,
                        initial.height / scale_factor,
                    ),
                }
            })
            .collect();

        Self { delta, levels }
    }

    pub fn get(&self, level: i32) -> Option<&ZoomLevel> {
        if !(-ZOOM_TABLE_RANGE..=ZOOM_TABLE_RANGE).contains(&level) {
            return None;
        }
        self.levels.get((level + ZOOM_TABLE_RANGE) as usize)
    }

    /// Levels from most zoomed out to most zoomed in
    pub fn iter(&self) -> impl Iterator<Item = &ZoomLevel> {
        self.levels.iter()
    }

    pub fn delta(&self) -> f64 {
        self.delta
    }

    /// Table level whose scale factor is closest to `scale_factor` on a log scale
    pub fn nearest_level(&self, scale_factor: f64) -> i32 {
        let level = (scale_factor.ln() / self.delta.ln()).round();
        if level.is_finite() {
            (level as i32).clamp(-ZOOM_TABLE_RANGE, ZOOM_TABLE_RANGE)
        } else {
            0
        }
    }
}

/// State after a viewport transition
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewportChange {
    pub view_box: ViewBox,
    pub zoom_level: i32,
    /// Screen pixels per native unit
    pub scale: f64,
    /// Width or height changed, as opposed to a pure pan
    pub zoomed: bool,
}

/// Axes that actually moved during a pan
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PanOutcome {
    pub moved_x: bool,
    pub moved_y: bool,
}

impl PanOutcome {
    pub fn moved(&self) -> bool {
        self.moved_x || self.moved_y
    }
}

/// Owns the current view box, the discrete zoom level and the derived scale.
///
/// All transitions are synchronous and mutate state in call order. Callers
/// read the result from the returned [`ViewportChange`] or the getters.
#[derive(Debug, Clone)]
pub struct ViewportController {
    /// The source file's native view box; the clamping extent
    native: ViewBox,
    /// The configured starting view box; level 0 of the zoom table
    initial: ViewBox,
    view_box: ViewBox,
    /// Last requested box before padding and aspect fitting
    last_requested: ViewBox,
    zoom_level: i32,
    scale: f64,
    container: ContainerSize,
    zoom: ZoomOptions,
    scroll_limit: bool,
    padding: Padding,
    table: ZoomTable,
    suppress_animation_until: Option<Instant>,
}

impl ViewportController {
    pub fn new(native: ViewBox, container: ContainerSize, options: &MapOptions) -> Result<Self> {
        if !native.is_valid() {
            return Err(MapError::InvalidViewBox(format!(
                "native view box {} must have positive width and height",
                native.to_attribute()
            )));
        }

        let initial = match options.view_box {
            Some(view_box) if view_box.is_valid() => view_box,
            Some(view_box) => {
                log::warn!(
                    "configured view box {} is not usable, falling back to the native one",
                    view_box.to_attribute()
                );
                native
            }
            None => native,
        };

        let container = if container.is_valid() {
            container
        } else {
            log::warn!(
                "container size {}x{} is not usable, sizing it to the view box",
                container.width,
                container.height
            );
            ContainerSize::new(initial.width, initial.height)
        };

        let mut controller = Self {
            native,
            initial,
            view_box: ViewBox::empty(),
            last_requested: initial,
            zoom_level: 0,
            scale: 0.0,
            container,
            zoom: options.zoom.clone(),
            scroll_limit: options.scroll.limit,
            padding: options.padding,
            table: ZoomTable::new(initial, options.zoom.delta),
            suppress_animation_until: None,
        };
        controller.reset_to_initial();
        Ok(controller)
    }

    pub fn view_box(&self) -> ViewBox {
        self.view_box
    }

    pub fn native_view_box(&self) -> ViewBox {
        self.native
    }

    pub fn initial_view_box(&self) -> ViewBox {
        self.initial
    }

    pub fn zoom_level(&self) -> i32 {
        self.zoom_level
    }

    /// Screen pixels per native unit
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Magnification relative to the initial view box
    pub fn scale_factor(&self) -> f64 {
        self.initial.width / self.view_box.width
    }

    pub fn container(&self) -> ContainerSize {
        self.container
    }

    pub fn table(&self) -> &ZoomTable {
        &self.table
    }

    pub fn zoom_options(&self) -> &ZoomOptions {
        &self.zoom
    }

    pub fn scroll_limit(&self) -> bool {
        self.scroll_limit
    }

    pub fn set_scroll_limit(&mut self, limit: bool) -> ViewportChange {
        self.scroll_limit = limit;
        self.reset_to_current_fit()
    }

    pub fn set_zoom_limit(&mut self, limit: [i32; 2]) {
        self.zoom.limit = if limit[0] <= limit[1] {
            limit
        } else {
            [limit[1], limit[0]]
        };
    }

    pub fn set_padding(&mut self, padding: Padding) -> ViewportChange {
        self.padding = padding;
        self.reset_to_current_fit()
    }

    /// True while marker repositioning should skip animation after a zoom
    pub fn is_animation_suppressed(&self) -> bool {
        self.suppress_animation_until
            .map_or(false, |until| Instant::now() < until)
    }

    /// Snapshot of the current state
    pub fn state(&self) -> ViewportChange {
        ViewportChange {
            view_box: self.view_box,
            zoom_level: self.zoom_level,
            scale: self.scale,
            zoomed: false,
        }
    }

    /// Sets the view box, or restores the native default when `None` or degenerate.
    ///
    /// The discrete level snaps to the table entry nearest the new scale.
    pub fn set_view_box(&mut self, view_box: Option<ViewBox>) -> ViewportChange {
        let requested = match view_box {
            Some(view_box) if view_box.is_valid() => view_box,
            Some(view_box) => {
                log::warn!(
                    "ignoring degenerate view box {}, using the native default",
                    view_box.to_attribute()
                );
                self.native
            }
            None => self.native,
        };
        self.zoom_level = self.table.nearest_level(self.initial.width / requested.width);
        self.apply(requested)
    }

    /// Moves one step along the zoom table, optionally re-centring on `center`.
    ///
    /// Returns `None` and leaves the viewport untouched when the target level
    /// is outside the table or the configured limit.
    pub fn zoom_by(&mut self, direction: i32, center: Option<Point>) -> Option<ViewportChange> {
        let step = direction.signum();
        if step == 0 {
            return None;
        }

        let target_level = self.zoom_level + step;
        let entry = *self.table.get(target_level)?;

        if !self.zoom.allows(target_level) && !self.moves_toward_limit(target_level) {
            log::debug!(
                "zoom to level {} rejected by limit [{}, {}]",
                target_level,
                self.zoom.min(),
                self.zoom.max()
            );
            return None;
        }

        let center = center.unwrap_or_else(|| self.view_box.center());
        self.zoom_level = target_level;
        Some(self.apply(entry.view_box.centered_on(center)))
    }

    pub fn zoom_in(&mut self, center: Option<Point>) -> Option<ViewportChange> {
        self.zoom_by(1, center)
    }

    pub fn zoom_out(&mut self, center: Option<Point>) -> Option<ViewportChange> {
        self.zoom_by(-1, center)
    }

    /// Sizes the view box to `initial / scale_factor`, bypassing the zoom table.
    ///
    /// The discrete level snaps to the nearest table entry so later
    /// [`zoom_by`](Self::zoom_by) steps continue from a sensible place.
    pub fn zoom_to_exact(&mut self, scale_factor: f64, center: Option<Point>) -> ViewportChange {
        if !(scale_factor.is_finite() && scale_factor > 0.0) {
            log::warn!("ignoring invalid zoom scale factor {}", scale_factor);
            return self.state();
        }

        let center = center.unwrap_or_else(|| self.view_box.center());
        self.zoom_level = self.table.nearest_level(scale_factor);
        self.apply(ViewBox::from_center(
            center,
            self.initial.width / scale_factor,
            self.initial.height / scale_factor,
        ))
    }

    /// Translates the viewport by a pixel delta, converted to native units by the current scale.
    pub fn pan_by(&mut self, dx: f64, dy: f64) -> PanOutcome {
        if self.scale <= 0.0 || !(dx.is_finite() && dy.is_finite()) {
            return PanOutcome::default();
        }

        let before = self.view_box;
        let mut target = ViewBox::new(
            before.x + dx / self.scale,
            before.y + dy / self.scale,
            before.width,
            before.height,
        );
        if self.scroll_limit {
            target = self.clamp_to_native(target);
        }

        self.view_box = target;
        self.last_requested = self.last_requested.centered_on(
            self.last_requested
                .center()
                .add(&Point::new(target.x - before.x, target.y - before.y)),
        );

        PanOutcome {
            moved_x: target.x != before.x,
            moved_y: target.y != before.y,
        }
    }

    /// Back to level 0 and the configured initial view box
    pub fn reset_to_initial(&mut self) -> ViewportChange {
        self.zoom_level = 0;
        self.apply(self.initial)
    }

    /// Re-applies the last requested view box without touching the level
    pub fn reset_to_current_fit(&mut self) -> ViewportChange {
        self.apply(self.last_requested)
    }

    /// Picks the most zoomed-in allowed level whose view box still holds `bounds`,
    /// centred on the bounds.
    pub fn fit_to_bounds(&mut self, bounds: &Bounds) -> ViewportChange {
        if !bounds.is_valid() || !bounds.center().is_finite() {
            log::warn!("ignoring invalid bounds {:?}", bounds);
            return self.state();
        }

        let mut chosen: Option<ZoomLevel> = None;
        for entry in self.table.iter().filter(|entry| self.zoom.allows(entry.level)) {
            if chosen.is_none() || entry.view_box.can_contain(bounds) {
                chosen = Some(*entry);
            }
        }

        let Some(entry) = chosen.or_else(|| self.table.get(0).copied()) else {
            return self.state();
        };

        log::debug!(
            "fitting {}x{} bounds at zoom level {}",
            bounds.width(),
            bounds.height(),
            entry.level
        );
        self.zoom_level = entry.level;
        self.apply(entry.view_box.centered_on(bounds.center()))
    }

    /// Updates the container size and re-fits the current view to its aspect ratio.
    pub fn resize_container(&mut self, container: ContainerSize) -> ViewportChange {
        if !container.is_valid() {
            log::warn!(
                "ignoring container resize to {}x{}",
                container.width,
                container.height
            );
            return self.state();
        }
        self.container = container;
        self.reset_to_current_fit()
    }

    fn moves_toward_limit(&self, target_level: i32) -> bool {
        (self.zoom_level < self.zoom.min() && target_level > self.zoom_level)
            || (self.zoom_level > self.zoom.max() && target_level < self.zoom_level)
    }

    fn apply(&mut self, requested: ViewBox) -> ViewportChange {
        self.last_requested = requested;

        let mut target = self.apply_padding(requested);
        target = self.fit_aspect(target);
        if self.scroll_limit {
            target = self.clamp_to_native(target);
        }

        let zoomed = !target.same_size(&self.view_box);
        self.view_box = target;
        self.scale = self.container.width / target.width;

        if zoomed {
            self.suppress_animation_until =
                Some(Instant::now() + Duration::from_millis(NO_ANIMATION_WINDOW_MS));
        }

        ViewportChange {
            view_box: self.view_box,
            zoom_level: self.zoom_level,
            scale: self.scale,
            zoomed,
        }
    }

    /// Grows the box so its content lands inside the padded area of the container.
    fn apply_padding(&self, view_box: ViewBox) -> ViewBox {
        if self.padding.is_zero() {
            return view_box;
        }

        let Padding {
            top,
            right,
            bottom,
            left,
        } = self.padding;
        let inner_width = self.container.width - left - right;
        let inner_height = self.container.height - top - bottom;
        if inner_width <= 0.0 || inner_height <= 0.0 {
            log::warn!("padding leaves no room in the container, ignoring it");
            return view_box;
        }

        let mut padded = view_box;
        if left != 0.0 || right != 0.0 {
            let scale = inner_width / view_box.width;
            padded.x -= left / scale;
            padded.width = self.container.width / scale;
        }
        if top != 0.0 || bottom != 0.0 {
            let scale = inner_height / view_box.height;
            padded.y -= top / scale;
            padded.height = self.container.height / scale;
        }
        padded
    }

    /// Expands the smaller dimension so the box matches the container's aspect ratio.
    fn fit_aspect(&self, view_box: ViewBox) -> ViewBox {
        let container_ratio = self.container.aspect_ratio();
        let ratio = view_box.aspect_ratio();
        if (ratio - container_ratio).abs() <= 1e-9 * container_ratio {
            return view_box;
        }

        let center = view_box.center();
        if ratio < container_ratio {
            ViewBox::from_center(center, view_box.height * container_ratio, view_box.height)
        } else {
            ViewBox::from_center(center, view_box.width, view_box.width / container_ratio)
        }
    }

    /// Keeps the box inside the native extent; the min edge wins when the box is larger.
    fn clamp_to_native(&self, view_box: ViewBox) -> ViewBox {
        let mut clamped = view_box;

        if clamped.x < self.native.x {
            clamped.x = self.native.x;
        } else if clamped.max_x() > self.native.max_x() {
            clamped.x = (self.native.max_x() - clamped.width).max(self.native.x);
        }

        if clamped.y < self.native.y {
            clamped.y = self.native.y;
        } else if clamped.max_y() > self.native.max_y() {
            clamped.y = (self.native.max_y() - clamped.height).max(self.native.y);
        }

        clamped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller(native: ViewBox, container: ContainerSize, options: MapOptions) -> ViewportController {
        ViewportController::new(native, container, &options).unwrap()
    }

    fn square() -> ViewportController {
        controller(
            ViewBox::new(0.0, 0.0, 100.0, 100.0),
            ContainerSize::new(100.0, 100.0),
            MapOptions::default(),
        )
    }

    #[test]
    fn test_viewport_creation() {
        let viewport = square();
        assert_eq!(viewport.zoom_level(), 0);
        assert_eq!(viewport.view_box(), ViewBox::new(0.0, 0.0, 100.0, 100.0));
        assert_eq!(viewport.scale(), 1.0);
        assert!(ViewportController::new(
            ViewBox::empty(),
            ContainerSize::new(10.0, 10.0),
            &MapOptions::default()
        )
        .is_err());
    }

    #[test]
    fn test_zoom_table_monotonic() {
        let viewport = square();
        let widths: Vec<f64> = viewport.table().iter().map(|e| e.view_box.width).collect();
        assert_eq!(widths.len(), 41);
        assert!(widths.windows(2).all(|pair| pair[1] < pair[0]));
        assert_eq!(viewport.table().get(0).unwrap().scale_factor, 1.0);
        assert_eq!(viewport.table().get(1).unwrap().view_box.width, 50.0);
        assert!(viewport.table().get(21).is_none());
    }

    #[test]
    fn test_zoom_in_halves_view_box() {
        let mut viewport = square();
        let change = viewport.zoom_in(None).unwrap();
        assert!(change.zoomed);
        assert_eq!(change.zoom_level, 1);
        assert_eq!(viewport.view_box(), ViewBox::new(25.0, 25.0, 50.0, 50.0));
        assert_eq!(viewport.scale(), 2.0);
        assert!(viewport.is_animation_suppressed());
    }

    #[test]
    fn test_zoom_centred_on_point() {
        let mut viewport = square();
        viewport.zoom_in(Some(Point::new(20.0, 30.0))).unwrap();
        assert_eq!(viewport.view_box().center(), Point::new(20.0, 30.0));
    }

    #[test]
    fn test_zoom_limit_enforced() {
        let mut options = MapOptions::default();
        options.zoom.limit = [-2, 2];
        let mut viewport = controller(
            ViewBox::new(0.0, 0.0, 100.0, 100.0),
            ContainerSize::new(100.0, 100.0),
            options,
        );

        assert!(viewport.zoom_in(None).is_some());
        assert!(viewport.zoom_in(None).is_some());
        assert_eq!(viewport.zoom_level(), 2);

        let before = viewport.view_box();
        assert!(viewport.zoom_in(None).is_none());
        assert_eq!(viewport.view_box(), before);
        assert_eq!(viewport.zoom_level(), 2);
        assert!(viewport.zoom_by(0, None).is_none());
    }

    #[test]
    fn test_zoom_moves_toward_limit_when_outside() {
        let mut options = MapOptions::default();
        options.zoom.limit = [2, 4];
        let mut viewport = controller(
            ViewBox::new(0.0, 0.0, 100.0, 100.0),
            ContainerSize::new(100.0, 100.0),
            options,
        );

        assert!(viewport.zoom_out(None).is_none());
        assert!(viewport.zoom_in(None).is_some());
        assert_eq!(viewport.zoom_level(), 1);
    }

    #[test]
    fn test_pan_clamped_to_native_extent() {
        let mut options = MapOptions::default();
        options.scroll.limit = true;
        let mut viewport = controller(
            ViewBox::new(0.0, 0.0, 100.0, 100.0),
            ContainerSize::new(100.0, 100.0),
            options,
        );
        viewport.zoom_in(None).unwrap();

        let outcome = viewport.pan_by(-1_000.0, 0.0);
        assert!(outcome.moved_x);
        assert!(!outcome.moved_y);
        assert_eq!(viewport.view_box().x, 0.0);

        let outcome = viewport.pan_by(-10.0, 0.0);
        assert!(!outcome.moved());
        assert_eq!(viewport.view_box().x, 0.0);

        viewport.pan_by(1_000.0, 1_000.0);
        assert_eq!(viewport.view_box().max_x(), 100.0);
        assert_eq!(viewport.view_box().max_y(), 100.0);
    }

    #[test]
    fn test_pan_at_level_zero_clamps_min_x() {
        let mut options = MapOptions::default();
        options.scroll.limit = true;
        let mut viewport = controller(
            ViewBox::new(0.0, 0.0, 100.0, 100.0),
            ContainerSize::new(100.0, 100.0),
            options,
        );

        viewport.pan_by(-250.0, 0.0);
        assert_eq!(viewport.view_box().x, 0.0);
    }

    #[test]
    fn test_pan_without_limit() {
        let mut viewport = square();
        let outcome = viewport.pan_by(-50.0, 20.0);
        assert!(outcome.moved_x && outcome.moved_y);
        assert_eq!(viewport.view_box(), ViewBox::new(-50.0, 20.0, 100.0, 100.0));
    }

    #[test]
    fn test_set_view_box_detects_zoom_versus_pan() {
        let mut viewport = square();
        let pan = viewport.set_view_box(Some(ViewBox::new(10.0, 10.0, 100.0, 100.0)));
        assert!(!pan.zoomed);
        let zoom = viewport.set_view_box(Some(ViewBox::new(10.0, 10.0, 20.0, 20.0)));
        assert!(zoom.zoomed);
        assert_eq!(zoom.scale, 5.0);
    }

    #[test]
    fn test_set_view_box_snaps_level() {
        let mut viewport = square();
        let change = viewport.set_view_box(Some(ViewBox::new(40.0, 40.0, 12.5, 12.5)));
        assert_eq!(change.zoom_level, 3);

        let zoomed = viewport.zoom_in(None).unwrap();
        assert_eq!(zoomed.zoom_level, 4);
        assert!(zoomed.view_box.width < 12.5);

        let change = viewport.set_view_box(Some(ViewBox::new(0.0, 0.0, 30.0, 30.0)));
        assert_eq!(change.zoom_level, 2);
        assert_eq!(viewport.set_view_box(None).zoom_level, 0);
    }

    #[test]
    fn test_set_view_box_none_restores_native() {
        let mut viewport = square();
        viewport.set_view_box(Some(ViewBox::new(10.0, 10.0, 20.0, 20.0)));
        viewport.set_view_box(None);
        assert_eq!(viewport.view_box(), ViewBox::new(0.0, 0.0, 100.0, 100.0));
        viewport.set_view_box(Some(ViewBox::new(5.0, 5.0, 0.0, 10.0)));
        assert_eq!(viewport.view_box(), ViewBox::new(0.0, 0.0, 100.0, 100.0));
    }

    #[test]
    fn test_aspect_ratio_expands_smaller_dimension() {
        let mut viewport = controller(
            ViewBox::new(0.0, 0.0, 100.0, 100.0),
            ContainerSize::new(200.0, 100.0),
            MapOptions::default(),
        );
        assert_eq!(viewport.view_box(), ViewBox::new(-50.0, 0.0, 200.0, 100.0));

        viewport.resize_container(ContainerSize::new(100.0, 200.0));
        assert_eq!(viewport.view_box(), ViewBox::new(0.0, -50.0, 100.0, 200.0));
        assert_eq!(viewport.view_box().center(), Point::new(50.0, 50.0));
    }

    #[test]
    fn test_padding_expands_view_box() {
        let mut options = MapOptions::default();
        options.padding.left = 20.0;
        options.padding.right = 20.0;
        options.padding.top = 20.0;
        options.padding.bottom = 20.0;
        let viewport = controller(
            ViewBox::new(0.0, 0.0, 100.0, 100.0),
            ContainerSize::new(200.0, 200.0),
            options,
        );

        // content keeps 160px of the 200px container
        let view_box = viewport.view_box();
        assert!((view_box.width - 125.0).abs() < 1e-9);
        assert!((view_box.x + 12.5).abs() < 1e-9);
        assert!((viewport.scale() - 1.6).abs() < 1e-9);
    }

    #[test]
    fn test_zoom_to_exact() {
        let mut viewport = square();
        let change = viewport.zoom_to_exact(4.0, Some(Point::new(50.0, 50.0)));
        assert_eq!(change.view_box, ViewBox::new(37.5, 37.5, 25.0, 25.0));
        assert_eq!(change.zoom_level, 2);

        let unchanged = viewport.zoom_to_exact(-1.0, None);
        assert!(!unchanged.zoomed);
        assert_eq!(unchanged.view_box, change.view_box);
    }

    #[test]
    fn test_fit_to_bounds_picks_tightest_level() {
        let mut viewport = square();
        let change = viewport.fit_to_bounds(&Bounds::from_coords(10.0, 10.0, 30.0, 20.0));
        // level 2 is 25 wide, level 3 is 12.5 wide and too small
        assert_eq!(change.zoom_level, 2);
        assert_eq!(viewport.view_box().center(), Point::new(20.0, 15.0));
        assert!(viewport.view_box().can_contain(&Bounds::from_coords(10.0, 10.0, 30.0, 20.0)));
    }

    #[test]
    fn test_fit_to_bounds_respects_limits() {
        let mut options = MapOptions::default();
        options.zoom.limit = [0, 1];
        let mut viewport = controller(
            ViewBox::new(0.0, 0.0, 100.0, 100.0),
            ContainerSize::new(100.0, 100.0),
            options,
        );
        let change = viewport.fit_to_bounds(&Bounds::from_point(Point::new(5.0, 5.0)));
        assert_eq!(change.zoom_level, 1);
    }

    #[test]
    fn test_reset_operations() {
        let mut viewport = square();
        viewport.zoom_in(None);
        viewport.zoom_in(None);
        viewport.pan_by(10.0, 10.0);

        let fit = viewport.reset_to_current_fit();
        assert_eq!(fit.zoom_level, 2);
        assert_eq!(fit.view_box.width, 25.0);

        let reset = viewport.reset_to_initial();
        assert_eq!(reset.zoom_level, 0);
        assert_eq!(reset.view_box, ViewBox::new(0.0, 0.0, 100.0, 100.0));
    }

    #[test]
    fn test_initial_view_box_option() {
        let mut options = MapOptions::default();
        options.view_box = Some(ViewBox::new(20.0, 20.0, 50.0, 50.0));
        let mut viewport = controller(
            ViewBox::new(0.0, 0.0, 100.0, 100.0),
            ContainerSize::new(100.0, 100.0),
            options,
        );
        assert_eq!(viewport.view_box(), ViewBox::new(20.0, 20.0, 50.0, 50.0));
        assert_eq!(viewport.scale_factor(), 1.0);
        viewport.set_view_box(None);
        assert_eq!(viewport.view_box(), ViewBox::new(0.0, 0.0, 100.0, 100.0));
    }
}
