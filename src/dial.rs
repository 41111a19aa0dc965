use crate::math::{vec2, Vec2f};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dial {
    /// Drives the x axis.
    Left,
    /// Drives the y axis.
    Right,
}

impl Dial {
    pub const ALL: [Dial; 2] = [Dial::Left, Dial::Right];

    pub fn axis(self) -> Vec2f {
        match self {
            Dial::Left => vec2(1.0, 0.0),
            Dial::Right => vec2(0.0, 1.0),
        }
    }

    fn idx(self) -> usize {
        match self {
            Dial::Left => 0,
            Dial::Right => 1,
        }
    }
}

/// An in-progress pointer drag on one dial.
struct Drag {
    center: Vec2f,
    last_angle: f32,
}

/// Rotation state of both dials. Angles accumulate without wraparound so the
/// knobs can visibly over-rotate; only drag *deltas* are wrapped.
pub struct Dials {
    angle: [f32; 2],
    drag: [Option<Drag>; 2],
}

impl Dials {
    pub fn new() -> Self {
        Self {
            angle: [0.0; 2],
            drag: [None, None],
        }
    }

    pub fn angle(&self, dial: Dial) -> f32 {
        self.angle[dial.idx()]
    }

    pub fn twist(&mut self, dial: Dial, degrees: f32) {
        self.angle[dial.idx()] += degrees;
    }

    /// Starts a drag on `dial`, replacing any session already active on it.
    /// `center` is the center of the dial's hit region in the same coordinate
    /// space as `pointer`.
    pub fn begin_drag(&mut self, dial: Dial, center: Vec2f, pointer: Vec2f) {
        self.drag[dial.idx()] = Some(Drag {
            center,
            last_angle: pointer_angle(center, pointer),
        });
    }

    /// Feeds a pointer position into the dial's active drag. Returns the
    /// wrapped angle delta in degrees, or `None` when no drag is active.
    pub fn drag_to(&mut self, dial: Dial, pointer: Vec2f) -> Option<f32> {
        let drag = self.drag[dial.idx()].as_mut()?;
        let angle = pointer_angle(drag.center, pointer);
        let delta = wrap_delta(angle - drag.last_angle);
        drag.last_angle = angle;
        self.angle[dial.idx()] += delta;
        Some(delta)
    }

    pub fn end_drag(&mut self, dial: Dial) {
        self.drag[dial.idx()] = None;
    }
}

/// Angle of `pointer` around `center` in degrees. The degenerate point right
/// on the center is defined as 0 so no NaN can leak into the accumulators.
fn pointer_angle(center: Vec2f, pointer: Vec2f) -> f32 {
    let d = pointer - center;
    if d.x == 0.0 && d.y == 0.0 {
        return 0.0;
    }
    d.y.atan2(d.x).to_degrees()
}

/// Wraps a raw angle difference into `(-180, 180]`, the shortest arc, so a
/// drag crossing the atan2 discontinuity never registers a ±360° jump.
fn wrap_delta(raw: f32) -> f32 {
    if raw > 180.0 {
        raw - 360.0
    } else if raw < -180.0 {
        raw + 360.0
    } else {
        raw
    }
}
