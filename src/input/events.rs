use crate::core::{
    constants::KEYBOARD_PAN_STEP,
    geo::ScreenPoint,
    viewport::{ContainerSize, PanOutcome, ViewportChange},
};
use crate::layers::object::ObjectKind;
use serde::{Deserialize, Serialize};

/// Input events that can be handled by the map.
///
/// Positions are in container pixels, measured from the top-left corner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum InputEvent {
    /// Single click/tap
    Click { position: ScreenPoint },
    /// Double click/tap
    DoubleClick { position: ScreenPoint },
    /// Pointer moved by `delta` while pressed
    Drag { delta: ScreenPoint },
    /// Scroll wheel; negative `delta` scrolls up
    Scroll { delta: f64, position: ScreenPoint },
    /// Keyboard input
    KeyPress { key: KeyCode },
    /// Container resize
    Resize { size: ContainerSize },
}

/// Keyboard key codes the map reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyCode {
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Plus,
    Minus,
    Home,
    Other(u32),
}

/// What an event asks the map to do
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MapAction {
    /// Move the window by container pixels
    PanBy { dx: f64, dy: f64 },
    /// One zoom step, optionally centred on a container position
    Zoom {
        direction: i32,
        position: Option<ScreenPoint>,
    },
    ResetView,
    Resize(ContainerSize),
    Select(ScreenPoint),
}

/// Object hit by a click
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HitTarget {
    pub id: String,
    pub kind: ObjectKind,
}

/// Result of handling one event
#[derive(Debug, Clone, PartialEq)]
pub enum EventOutcome {
    Ignored,
    Panned(PanOutcome),
    Zoomed(ViewportChange),
    Resized(ViewportChange),
    Selected(Option<HitTarget>),
}

impl EventOutcome {
    pub fn is_handled(&self) -> bool {
        !matches!(self, EventOutcome::Ignored)
    }
}

impl InputEvent {
    /// Gets the primary position associated with this event, if any
    pub fn position(&self) -> Option<ScreenPoint> {
        match self {
            InputEvent::Click { position }
            | InputEvent::DoubleClick { position }
            | InputEvent::Scroll { position, .. } => Some(*position),
            _ => None,
        }
    }

    /// Translates the raw event into a map action.
    pub fn action(&self) -> Option<MapAction> {
        match *self {
            InputEvent::Click { position } => Some(MapAction::Select(position)),
            InputEvent::DoubleClick { position } => Some(MapAction::Zoom {
                direction: 1,
                position: Some(position),
            }),
            // Dragging the surface right moves the window left.
            InputEvent::Drag { delta } => Some(MapAction::PanBy {
                dx: -delta.x,
                dy: -delta.y,
            }),
            InputEvent::Scroll { delta, position } => {
                let direction = if delta < 0.0 {
                    1
                } else if delta > 0.0 {
                    -1
                } else {
                    return None;
                };
                Some(MapAction::Zoom {
                    direction,
                    position: Some(position),
                })
            }
            InputEvent::KeyPress { key } => key_action(key),
            InputEvent::Resize { size } => Some(MapAction::Resize(size)),
        }
    }
}

fn key_action(key: KeyCode) -> Option<MapAction> {
    let pan = |dx: f64, dy: f64| Some(MapAction::PanBy { dx, dy });
    match key {
        KeyCode::ArrowUp => pan(0.0, -KEYBOARD_PAN_STEP),
        KeyCode::ArrowDown => pan(0.0, KEYBOARD_PAN_STEP),
        KeyCode::ArrowLeft => pan(-KEYBOARD_PAN_STEP, 0.0),
        KeyCode::ArrowRight => pan(KEYBOARD_PAN_STEP, 0.0),
        KeyCode::Plus => Some(MapAction::Zoom {
            direction: 1,
            position: None,
        }),
        KeyCode::Minus => Some(MapAction::Zoom {
            direction: -1,
            position: None,
        }),
        KeyCode::Home => Some(MapAction::ResetView),
        KeyCode::Other(_) => None,
    }
}
