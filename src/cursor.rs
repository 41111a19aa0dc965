use crate::math::{vec2, Vec2f};

/// The stylus position on the screen. This is the only authoritative copy;
/// everything else (the ink raster, the knob visuals) is derived from it.
pub struct Cursor {
    pos: Vec2f,
    size: Vec2f,
}

impl Cursor {
    pub fn new(width: f32, height: f32) -> Self {
        let size = vec2(width, height);
        Self {
            pos: size * 0.5,
            size,
        }
    }

    pub fn pos(&self) -> Vec2f {
        self.pos
    }

    pub fn center(&mut self) {
        self.pos = self.size * 0.5;
    }

    /// Changes the screen dimensions and recenters the stylus.
    pub fn resize(&mut self, width: f32, height: f32) {
        self.size = vec2(width, height);
        self.center();
    }

    /// Applies a movement delta, clamped to the screen bounds. Saturating at
    /// an edge truncates the delta; nothing carries over to later moves.
    /// Returns the committed position.
    pub fn offset(&mut self, delta: Vec2f) -> Vec2f {
        self.pos = (self.pos + delta).clamped(self.size);
        self.pos
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_centered() {
        let cursor = Cursor::new(200.0, 100.0);
        assert_eq!(cursor.pos(), vec2(100.0, 50.0));
    }

    #[test]
    fn stays_in_bounds() {
        let mut cursor = Cursor::new(200.0, 100.0);
        let deltas = [
            vec2(1e9, 1e9),
            vec2(-3.0, 7.5),
            vec2(-1e9, 0.25),
            vec2(50.0, -1e9),
            vec2(-0.5, -0.5),
            vec2(1e9, -1e9),
        ];
        for delta in deltas {
            let pos = cursor.offset(delta);
            assert!(pos.x >= 0.0 && pos.x <= 200.0, "x out of bounds: {pos:?}");
            assert!(pos.y >= 0.0 && pos.y <= 100.0, "y out of bounds: {pos:?}");
        }
    }

    #[test]
    fn saturation_does_not_carry_over() {
        let mut cursor = Cursor::new(200.0, 100.0);
        cursor.offset(vec2(1000.0, 0.0));
        assert_eq!(cursor.pos(), vec2(200.0, 50.0));
        // The overshoot is gone; a step back moves exactly one unit.
        cursor.offset(vec2(-1.0, 0.0));
        assert_eq!(cursor.pos(), vec2(199.0, 50.0));
    }

    #[test]
    fn resize_recenters() {
        let mut cursor = Cursor::new(200.0, 100.0);
        cursor.offset(vec2(-80.0, -30.0));
        cursor.resize(300.0, 240.0);
        assert_eq!(cursor.pos(), vec2(150.0, 120.0));
    }
}
