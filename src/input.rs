use std::collections::HashSet;

use glam::Vec2;

use crate::camera::CameraMovement;

/// Keys the scene reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    W,
    A,
    S,
    D,
    Escape,
}

impl KeyCode {
    pub fn movement(self) -> Option<CameraMovement> {
        match self {
            KeyCode::W => Some(CameraMovement::Forward),
            KeyCode::S => Some(CameraMovement::Backward),
            KeyCode::A => Some(CameraMovement::Left),
            KeyCode::D => Some(CameraMovement::Right),
            KeyCode::Escape => None,
        }
    }
}

/// Identifier for a mouse button (left button is zero).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MouseButton(u8);

impl MouseButton {
    pub const LEFT: Self = Self(0);
    pub const RIGHT: Self = Self(1);
    pub const MIDDLE: Self = Self(2);

    pub fn new(index: u8) -> Self {
        Self(index)
    }

    pub fn name(self) -> Option<&'static str> {
        match self {
            Self::LEFT => Some("Left"),
            Self::RIGHT => Some("Right"),
            Self::MIDDLE => Some("Middle"),
            _ => None,
        }
    }
}

/// Held keys, polled once per frame.
#[derive(Debug, Default)]
pub struct InputState {
    keys: HashSet<KeyCode>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_key_down(&mut self, key: KeyCode) {
        self.keys.insert(key);
    }

    pub fn set_key_up(&mut self, key: KeyCode) {
        self.keys.remove(&key);
    }

    pub fn is_key_down(&self, key: KeyCode) -> bool {
        self.keys.contains(&key)
    }

    /// Movements for every held direction key, in W/S/A/D order.
    pub fn movements(&self) -> Vec<CameraMovement> {
        [KeyCode::W, KeyCode::S, KeyCode::A, KeyCode::D]
            .into_iter()
            .filter(|key| self.keys.contains(key))
            .filter_map(KeyCode::movement)
            .collect()
    }

    pub fn close_requested(&self) -> bool {
        self.is_key_down(KeyCode::Escape)
    }
}

/// Turns absolute cursor positions into look deltas.
#[derive(Debug, Default, Clone, Copy)]
pub struct MouseTracker {
    last: Option<Vec2>,
}

impl MouseTracker {
    /// Returns `(dx, dy)` with `dy` positive when the cursor moves up.
    /// The first sample only primes the tracker.
    pub fn delta(&mut self, position: Vec2) -> Vec2 {
        let last = self.last.replace(position).unwrap_or(position);
        Vec2::new(position.x - last.x, last.y - position.y)
    }

    pub fn reset(&mut self) {
        self.last = None;
    }
}

/// Which event stream drives the camera.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookSource {
    /// Raw device motion. A grabbed cursor stops producing useful positions.
    Motion,
    /// Window cursor positions, diffed by a [`MouseTracker`].
    Cursor,
}

/// Routes mouse events to look deltas depending on whether the cursor is
/// grabbed. Only one stream is used at a time so motion is never counted
/// twice.
#[derive(Debug, Clone, Copy)]
pub struct MouseLook {
    source: LookSource,
    tracker: MouseTracker,
}

impl Default for MouseLook {
    fn default() -> Self {
        Self::new(LookSource::Cursor)
    }
}

impl MouseLook {
    pub fn new(source: LookSource) -> Self {
        Self {
            source,
            tracker: MouseTracker::default(),
        }
    }

    pub fn source(&self) -> LookSource {
        self.source
    }

    pub fn set_source(&mut self, source: LookSource) {
        if self.source != source {
            self.source = source;
            self.tracker.reset();
        }
    }

    /// Raw motion in device units, `dy` positive downwards. Returns the look
    /// delta with `dy` positive upwards.
    pub fn on_motion(&mut self, dx: f64, dy: f64) -> Option<Vec2> {
        match self.source {
            LookSource::Motion => Some(Vec2::new(dx as f32, -dy as f32)),
            LookSource::Cursor => None,
        }
    }

    pub fn on_cursor(&mut self, position: Vec2) -> Option<Vec2> {
        match self.source {
            LookSource::Cursor => Some(self.tracker.delta(position)),
            LookSource::Motion => None,
        }
    }

    /// Forgets the last cursor sample, e.g. after focus loss.
    pub fn reset(&mut self) {
        self.tracker.reset();
    }
}
