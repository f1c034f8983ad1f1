pub mod events;

pub use events::{EventOutcome, HitTarget, InputEvent, KeyCode, MapAction};
