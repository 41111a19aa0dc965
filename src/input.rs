use std::collections::HashSet;

use crate::{
    cmd::Action,
    math::{vec2, Vec2f},
};

/// The set of movement actions whose keys are currently held. Key-repeat is
/// irrelevant to this model: the set changes only on press and release edges,
/// and is polled once per frame tick.
#[derive(Default)]
pub struct HeldKeys {
    held: HashSet<Action>,
}

impl HeldKeys {
    pub fn set(&mut self, action: Action, pressed: bool) {
        if pressed {
            self.held.insert(action);
        } else {
            self.held.remove(&action);
        }
    }

    pub fn held(&self, action: Action) -> bool {
        self.held.contains(&action)
    }

    pub fn release_all(&mut self) {
        self.held.clear();
    }
}

/// What one keyboard tick produced: a combined movement vector and the twist
/// (in degrees) each dial performed. Opposing keys cancel out.
pub struct Tick {
    pub delta: Vec2f,
    /// Degrees for the left (x) and right (y) dial.
    pub twist: [f32; 2],
}

pub fn poll(keys: &HeldKeys, step: f32, twist: f32) -> Tick {
    let mut out = Tick {
        delta: Vec2f::ZERO,
        twist: [0.0; 2],
    };
    if keys.held(Action::NudgeLeft) {
        out.delta += vec2(-step, 0.0);
        out.twist[0] -= twist;
    }
    if keys.held(Action::NudgeRight) {
        out.delta += vec2(step, 0.0);
        out.twist[0] += twist;
    }
    if keys.held(Action::NudgeUp) {
        out.delta += vec2(0.0, -step);
        out.twist[1] -= twist;
    }
    if keys.held(Action::NudgeDown) {
        out.delta += vec2(0.0, step);
        out.twist[1] += twist;
    }
    out
}
