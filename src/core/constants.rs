//! Engine-wide constants.
//! Keeping them in a single place makes it easier to tweak engine-wide magic numbers.

/// The zoom table spans `[-ZOOM_TABLE_RANGE, ZOOM_TABLE_RANGE]`.
pub const ZOOM_TABLE_RANGE: i32 = 20;

/// Programmatic scale multiplier between two adjacent zoom levels.
pub const DEFAULT_ZOOM_DELTA: f64 = 2.0;

/// Default `[min, max]` zoom limit.
pub const DEFAULT_ZOOM_LIMIT: [i32; 2] = [0, 10];

/// Side of a clustering cell in screen pixels.
pub const DEFAULT_CLUSTER_CELL_SIZE: f64 = 50.0;

/// Marker count above which clustering is offloaded to the worker thread.
pub const DEFAULT_BACKGROUND_THRESHOLD: usize = 1_000;

/// How long marker repositioning runs without animation after a zoom.
pub const NO_ANIMATION_WINDOW_MS: u64 = 400;

/// Geographic coordinates produced by the inverse projection keep this many decimals.
pub const GEO_DECIMALS: i32 = 6;

/// Pixel step used for keyboard panning.
pub const KEYBOARD_PAN_STEP: f64 = 80.0;

/// Click tolerance around marker and cluster anchors, in screen pixels.
pub const HIT_RADIUS: f64 = 12.0;
