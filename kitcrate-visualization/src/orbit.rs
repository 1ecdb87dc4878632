//! Drag-to-rotate input with eased rotation

use std::f32::consts::PI;

/// Radians of rotation per pixel dragged
pub const ROTATION_SPEED: f32 = 0.005;
/// Pitch is limited to this magnitude
pub const MAX_PITCH: f32 = PI / 3.0;
/// Fraction of the remaining distance covered per frame
pub const SMOOTHING: f32 = 0.1;

/// Model rotation: `x` is pitch, `y` is yaw, both in radians
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct OrbitRotation {
    pub x: f32,
    pub y: f32,
}

/// Pointer and touch input in window pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    PointerDown { x: f64, y: f64 },
    PointerMove { x: f64, y: f64 },
    PointerUp,
    PointerLeave,
    /// `touches` is the number of fingers down after this event
    TouchStart { touches: usize, x: f64, y: f64 },
    TouchMove { touches: usize, x: f64, y: f64 },
    TouchEnd,
}

/// Turns drags into a target rotation and eases towards it
#[derive(Debug, Clone, Default)]
pub struct OrbitController {
    dragging: bool,
    previous_position: (f64, f64),
    target: OrbitRotation,
    current: OrbitRotation,
}

impl OrbitController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    pub fn target(&self) -> OrbitRotation {
        self.target
    }

    pub fn current(&self) -> OrbitRotation {
        self.current
    }

    pub fn handle(&mut self, event: InputEvent) {
        match event {
            InputEvent::PointerDown { x, y } | InputEvent::TouchStart { touches: 1, x, y } => {
                self.dragging = true;
                self.previous_position = (x, y);
            }
            InputEvent::PointerMove { x, y } | InputEvent::TouchMove { touches: 1, x, y } => {
                self.drag_to(x, y);
            }
            InputEvent::PointerUp | InputEvent::PointerLeave | InputEvent::TouchEnd => {
                self.dragging = false;
            }
            // Multi-touch gestures are not rotations
            InputEvent::TouchStart { .. } | InputEvent::TouchMove { .. } => {}
        }
    }

    fn drag_to(&mut self, x: f64, y: f64) {
        if !self.dragging {
            return;
        }
        let dx = (x - self.previous_position.0) as f32;
        let dy = (y - self.previous_position.1) as f32;

        self.target.y += dx * ROTATION_SPEED;
        self.target.x = (self.target.x + dy * ROTATION_SPEED).clamp(-MAX_PITCH, MAX_PITCH);

        self.previous_position = (x, y);
    }

    /// Advance the current rotation one frame towards the target
    pub fn step(&mut self) -> OrbitRotation {
        self.current.x += (self.target.x - self.current.x) * SMOOTHING;
        self.current.y += (self.target.y - self.current.y) * SMOOTHING;
        self.current
    }
}
