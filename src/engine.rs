use std::{mem, time::Instant};

use crate::{
    cmd::Action,
    config,
    cursor::Cursor,
    dial::{Dial, Dials},
    input::{self, HeldKeys},
    math::Vec2f,
    wipe::Wiper,
};

/// One stroke piece: the line from the previous stylus position to the new
/// one. Painted with round caps at a fixed width.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub from: Vec2f,
    pub to: Vec2f,
}

/// Pending raster work, drained by the render side once per redraw. `wipe`
/// means "repaint the base fill first, dropping all ink" and always precedes
/// the queued segments, so anything queued before a wipe fired is gone.
#[derive(Default)]
pub struct Frame {
    pub wipe: bool,
    pub segments: Vec<Segment>,
}

/// The whole toy behind the glass: stylus position, dial rotations, held
/// keys and the wipe cycle. All mutation funnels through the methods here;
/// nothing else writes this state.
pub struct Engine {
    cursor: Cursor,
    dials: Dials,
    keys: HeldKeys,
    wiper: Wiper,
    frame: Frame,
    tuning: config::Tuning,
}

impl Engine {
    /// Sets up a blank screen of the given size with the stylus centered.
    pub fn new(width: f32, height: f32, tuning: config::Tuning, wipe: &config::Wipe) -> Self {
        Self {
            cursor: Cursor::new(width, height),
            dials: Dials::new(),
            keys: HeldKeys::default(),
            wiper: Wiper::new(wipe),
            frame: Frame {
                wipe: true,
                segments: Vec::new(),
            },
            tuning,
        }
    }

    /// A size change re-initializes the screen: the raster is refilled and
    /// the stylus recenters. Prior drawing does not survive.
    pub fn resize(&mut self, width: f32, height: f32) {
        self.cursor.resize(width, height);
        self.frame.segments.clear();
        self.frame.wipe = true;
    }

    /// Press/release edge for a bound action. Shake fires on the press edge;
    /// the nudge actions update the held set consumed by [`Engine::tick`].
    pub fn key(&mut self, action: Action, pressed: bool, now: Instant) {
        match action {
            Action::Shake => {
                if pressed && self.wiper.trigger(now) {
                    log::info!("shake: wiping the screen");
                }
            }
            nudge => self.keys.set(nudge, pressed),
        }
    }

    /// Drops all held keys, for focus loss and similar interruptions.
    pub fn release_keys(&mut self) {
        self.keys.release_all();
    }

    /// One keyboard tick: polls the held set, twists the dials and performs
    /// at most one combined move. The dials keep turning even when the
    /// stylus is pinned at an edge and the move is swallowed by the clamp.
    pub fn tick(&mut self) {
        let tick = input::poll(&self.keys, self.tuning.key_step, self.tuning.key_twist);
        if tick.twist[0] != 0.0 {
            self.dials.twist(Dial::Left, tick.twist[0]);
        }
        if tick.twist[1] != 0.0 {
            self.dials.twist(Dial::Right, tick.twist[1]);
        }
        if tick.delta != Vec2f::ZERO {
            self.shift(tick.delta);
        }
    }

    /// Polls the wipe clock. When the wipe fires, the erase is atomic with
    /// respect to strokes: queued segments are dropped together with raising
    /// the wipe flag, and the stylus recenters.
    pub fn advance(&mut self, now: Instant) {
        if self.wiper.advance(now) {
            self.frame.segments.clear();
            self.frame.wipe = true;
            self.cursor.center();
        }
    }

    pub fn begin_drag(&mut self, dial: Dial, center: Vec2f, pointer: Vec2f) {
        self.dials.begin_drag(dial, center, pointer);
    }

    /// Feeds a pointer move into one dial's drag. Each dial moves its own
    /// axis with its own call; concurrent drags are never merged into a
    /// diagonal. Returns whether an active drag consumed the move.
    pub fn drag_to(&mut self, dial: Dial, pointer: Vec2f) -> bool {
        match self.dials.drag_to(dial, pointer) {
            Some(delta) => {
                self.shift(dial.axis() * (delta * self.tuning.drag_scale));
                true
            }
            None => false,
        }
    }

    pub fn end_drag(&mut self, dial: Dial) {
        self.dials.end_drag(dial);
    }

    pub fn cursor_pos(&self) -> Vec2f {
        self.cursor.pos()
    }

    pub fn angle(&self, dial: Dial) -> f32 {
        self.dials.angle(dial)
    }

    pub fn opacity(&self) -> f32 {
        self.wiper.opacity()
    }

    /// Hands the pending raster work to the render side. With no surface
    /// attached nothing ever drains this; position and angles still update
    /// and the toy is simply inert.
    pub fn take_frame(&mut self) -> Frame {
        mem::take(&mut self.frame)
    }

    /// The single movement entry point: clamp, queue the visible segment,
    /// commit. Moves clamped into a zero-length segment queue nothing.
    fn shift(&mut self, delta: Vec2f) {
        let from = self.cursor.pos();
        let to = self.cursor.offset(delta);
        if to != from {
            self.frame.segments.push(Segment { from, to });
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::math::vec2;

    fn tuning() -> config::Tuning {
        config::Tuning {
            key_step: 2.0,
            key_twist: 3.0,
            drag_scale: 0.3,
        }
    }

    fn wipe() -> config::Wipe {
        config::Wipe {
            fade_step: 0.5,
            fade_interval_ms: 10,
            settle_ms: 20,
            cooldown_ms: 30,
        }
    }

    fn engine() -> Engine {
        let mut engine = Engine::new(200.0, 100.0, tuning(), &wipe());
        engine.take_frame(); // discard the initial fill
        engine
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn held_key_accumulates_step_and_twist_per_tick() {
        let mut engine = engine();
        let now = Instant::now();
        engine.key(Action::NudgeRight, true, now);
        for _ in 0..5 {
            engine.tick();
        }
        assert_eq!(engine.cursor_pos(), vec2(110.0, 50.0));
        assert_eq!(engine.angle(Dial::Left), 15.0);
        assert_eq!(engine.take_frame().segments.len(), 5);
    }

    #[test]
    fn diagonal_is_one_move_per_tick() {
        let mut engine = engine();
        let now = Instant::now();
        engine.key(Action::NudgeRight, true, now);
        engine.key(Action::NudgeDown, true, now);
        engine.tick();
        let frame = engine.take_frame();
        assert_eq!(
            frame.segments,
            vec![Segment {
                from: vec2(100.0, 50.0),
                to: vec2(102.0, 52.0),
            }]
        );
    }

    #[test]
    fn dial_keeps_turning_when_pinned_at_the_edge() {
        let mut engine = engine();
        let now = Instant::now();
        engine.key(Action::NudgeRight, true, now);
        for _ in 0..100 {
            engine.tick();
        }
        assert_eq!(engine.cursor_pos().x, 200.0);
        let angle = engine.angle(Dial::Left);
        engine.tick();
        assert_eq!(engine.cursor_pos().x, 200.0);
        assert_eq!(engine.angle(Dial::Left), angle + 3.0);
        // The pinned ticks produce no degenerate segments.
        let frame = engine.take_frame();
        assert!(frame.segments.iter().all(|s| s.from != s.to));
    }

    #[test]
    fn drags_move_one_axis_and_are_never_merged() {
        let mut engine = engine();
        let left_center = vec2(40.0, 300.0);
        let right_center = vec2(160.0, 300.0);
        engine.begin_drag(Dial::Left, left_center, left_center + vec2(10.0, 0.0));
        engine.begin_drag(Dial::Right, right_center, right_center + vec2(10.0, 0.0));

        // 90° on the left dial, then 90° on the right one.
        assert!(engine.drag_to(Dial::Left, left_center + vec2(0.0, 10.0)));
        assert!(engine.drag_to(Dial::Right, right_center + vec2(0.0, 10.0)));

        let frame = engine.take_frame();
        assert_eq!(frame.segments.len(), 2);
        let first = frame.segments[0];
        let second = frame.segments[1];
        assert_eq!(first.to.y, first.from.y);
        assert!((first.to.x - first.from.x - 27.0).abs() < 1e-3); // 90 * 0.3
        assert_eq!(second.to.x, second.from.x);
        assert!((second.to.y - second.from.y - 27.0).abs() < 1e-3);
    }

    #[test]
    fn drag_after_release_is_ignored() {
        let mut engine = engine();
        let center = vec2(40.0, 300.0);
        engine.begin_drag(Dial::Left, center, center + vec2(10.0, 0.0));
        engine.end_drag(Dial::Left);
        assert!(!engine.drag_to(Dial::Left, center + vec2(0.0, 10.0)));
        assert!(engine.take_frame().segments.is_empty());
    }

    #[test]
    fn full_wipe_cycle_recenters_and_restores_brightness() {
        let mut engine = engine();
        let t0 = Instant::now();

        // Draw away from the center.
        engine.begin_drag(Dial::Left, Vec2f::ZERO, vec2(10.0, 0.0));
        engine.drag_to(Dial::Left, vec2(0.0, 10.0));
        assert_ne!(engine.cursor_pos(), vec2(100.0, 50.0));

        engine.key(Action::Shake, true, t0);
        engine.advance(t0 + ms(20)); // two fade steps -> wipe fires
        engine.advance(t0 + ms(100)); // settle + cooldown elapse

        assert_eq!(engine.cursor_pos(), vec2(100.0, 50.0));
        assert_eq!(engine.opacity(), 1.0);
        let frame = engine.take_frame();
        assert!(frame.wipe);
        assert!(frame.segments.is_empty());

        // The cycle completed, so the next shake starts a new one.
        engine.key(Action::Shake, true, t0 + ms(101));
        engine.advance(t0 + ms(111));
        assert_eq!(engine.opacity(), 0.5);
    }

    #[test]
    fn strokes_during_the_fade_are_erased_by_the_wipe() {
        let mut engine = engine();
        let t0 = Instant::now();
        engine.key(Action::Shake, true, t0);
        engine.advance(t0 + ms(10));

        // Movement is not blocked mid-fade...
        engine.key(Action::NudgeDown, true, t0 + ms(11));
        engine.tick();
        assert_eq!(engine.cursor_pos(), vec2(100.0, 52.0));

        // ...but the wipe drops everything that was queued.
        engine.advance(t0 + ms(20));
        let frame = engine.take_frame();
        assert!(frame.wipe);
        assert!(frame.segments.is_empty());
        assert_eq!(engine.cursor_pos(), vec2(100.0, 50.0));
    }

    #[test]
    fn shake_mid_fade_changes_nothing() {
        let mut engine = engine();
        let t0 = Instant::now();
        engine.key(Action::Shake, true, t0);
        engine.advance(t0 + ms(10));
        assert_eq!(engine.opacity(), 0.5);

        engine.key(Action::Shake, true, t0 + ms(11));
        assert_eq!(engine.opacity(), 0.5);
        engine.advance(t0 + ms(19));
        assert_eq!(engine.opacity(), 0.5);
        engine.advance(t0 + ms(20));
        assert_eq!(engine.opacity(), 1.0);
    }

    #[test]
    fn resize_discards_the_drawing_and_recenters() {
        let mut engine = engine();
        let now = Instant::now();
        engine.key(Action::NudgeRight, true, now);
        engine.tick();
        assert!(!engine.frame.segments.is_empty());

        engine.resize(300.0, 240.0);
        assert_eq!(engine.cursor_pos(), vec2(150.0, 120.0));
        let frame = engine.take_frame();
        assert!(frame.wipe);
        assert!(frame.segments.is_empty());
    }

    #[test]
    fn clamping_holds_under_arbitrary_input() {
        let mut engine = engine();
        let center = vec2(40.0, 300.0);
        engine.begin_drag(Dial::Left, center, center + vec2(10.0, 0.0));
        for i in 0..50 {
            let angle = (i * 73) as f32;
            let rad = angle.to_radians();
            engine.drag_to(Dial::Left, center + vec2(rad.cos() * 20.0, rad.sin() * 20.0));
            let pos = engine.cursor_pos();
            assert!(pos.x >= 0.0 && pos.x <= 200.0);
            assert!(pos.y >= 0.0 && pos.y <= 100.0);
        }
    }
}
