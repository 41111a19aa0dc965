use std::time::{Duration, Instant};

use crate::config;

/// Where the wipe cycle currently is. Deadlines are carried in the variants
/// so the machine is advanced purely by comparing against a supplied clock.
#[derive(Clone, Copy)]
enum Phase {
    Idle,
    Fading { next: Instant },
    Resetting { until: Instant },
    Cooldown { until: Instant },
}

/// The shake-to-erase cycle: fade the screen out, wipe it, recenter, then
/// refuse new shakes for a short while. Only ever one cycle at a time; the
/// phase itself is the guard, since every trigger arrives on the one thread.
pub struct Wiper {
    phase: Phase,
    opacity: f32,
    fade_step: f32,
    fade_interval: Duration,
    settle: Duration,
    cooldown: Duration,
}

impl Wiper {
    pub fn new(tuning: &config::Wipe) -> Self {
        Self {
            phase: Phase::Idle,
            opacity: 1.0,
            fade_step: tuning.fade_step,
            fade_interval: Duration::from_millis(tuning.fade_interval_ms),
            settle: Duration::from_millis(tuning.settle_ms),
            cooldown: Duration::from_millis(tuning.cooldown_ms),
        }
    }

    /// Opacity of the screen layer, stepped down during a fade and restored
    /// to 1 the moment the wipe fires.
    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    pub fn idle(&self) -> bool {
        matches!(self.phase, Phase::Idle)
    }

    /// Starts a wipe cycle. A shake while a cycle is already running is
    /// dropped, not queued. Returns whether the cycle started.
    pub fn trigger(&mut self, now: Instant) -> bool {
        if !self.idle() {
            return false;
        }
        self.phase = Phase::Fading {
            next: now + self.fade_interval,
        };
        true
    }

    /// Advances the machine to `now`, firing as many steps as have elapsed.
    /// Steps are scheduled off the previous deadline, not off `now`, so a
    /// late poll keeps the cadence. Returns `true` when the wipe fired and
    /// the raster must be erased and the cursor recentered.
    pub fn advance(&mut self, now: Instant) -> bool {
        let mut wiped = false;
        loop {
            match self.phase {
                Phase::Idle => break,
                Phase::Fading { next } => {
                    if now < next {
                        break;
                    }
                    self.opacity -= self.fade_step;
                    if self.opacity <= 0.0 {
                        self.opacity = 1.0;
                        wiped = true;
                        self.phase = Phase::Resetting {
                            until: next + self.settle,
                        };
                    } else {
                        self.phase = Phase::Fading {
                            next: next + self.fade_interval,
                        };
                    }
                }
                Phase::Resetting { until } => {
                    if now < until {
                        break;
                    }
                    self.phase = Phase::Cooldown {
                        until: until + self.cooldown,
                    };
                }
                Phase::Cooldown { until } => {
                    if now < until {
                        break;
                    }
                    self.phase = Phase::Idle;
                }
            }
        }
        wiped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tuning() -> config::Wipe {
        config::Wipe {
            fade_step: 0.25,
            fade_interval_ms: 10,
            settle_ms: 20,
            cooldown_ms: 30,
        }
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn fade_publishes_intermediate_opacities() {
        let mut wiper = Wiper::new(&tuning());
        let t0 = Instant::now();
        assert!(wiper.trigger(t0));

        assert!(!wiper.advance(t0 + ms(10)));
        assert_eq!(wiper.opacity(), 0.75);
        assert!(!wiper.advance(t0 + ms(20)));
        assert_eq!(wiper.opacity(), 0.5);
        assert!(!wiper.advance(t0 + ms(30)));
        assert_eq!(wiper.opacity(), 0.25);

        // The final step wipes and restores full brightness.
        assert!(wiper.advance(t0 + ms(40)));
        assert_eq!(wiper.opacity(), 1.0);
        assert!(!wiper.idle());
    }

    #[test]
    fn full_cycle_returns_to_idle() {
        let mut wiper = Wiper::new(&tuning());
        let t0 = Instant::now();
        wiper.trigger(t0);

        // 4 fade steps (40ms) + settle (20ms) + cooldown (30ms).
        assert!(wiper.advance(t0 + ms(40)));
        assert!(!wiper.idle());
        assert!(!wiper.advance(t0 + ms(59)));
        assert!(!wiper.idle());
        assert!(!wiper.advance(t0 + ms(90)));
        assert!(wiper.idle());
        assert!(wiper.trigger(t0 + ms(91)));
    }

    #[test]
    fn late_poll_completes_the_cycle_in_one_call() {
        let mut wiper = Wiper::new(&tuning());
        let t0 = Instant::now();
        wiper.trigger(t0);
        assert!(wiper.advance(t0 + ms(500)));
        assert!(wiper.idle());
        assert_eq!(wiper.opacity(), 1.0);
    }

    #[test]
    fn triggers_are_dropped_unless_idle() {
        let mut wiper = Wiper::new(&tuning());
        let t0 = Instant::now();
        assert!(wiper.trigger(t0));

        wiper.advance(t0 + ms(10));
        assert_eq!(wiper.opacity(), 0.75);

        // Mid-fade shake: no restart, no early reset, same schedule.
        assert!(!wiper.trigger(t0 + ms(11)));
        assert_eq!(wiper.opacity(), 0.75);
        assert!(!wiper.advance(t0 + ms(20)));
        assert_eq!(wiper.opacity(), 0.5);

        // Still gated through settle and cooldown.
        wiper.advance(t0 + ms(40));
        assert!(!wiper.trigger(t0 + ms(45)));
        wiper.advance(t0 + ms(65));
        assert!(!wiper.trigger(t0 + ms(66)));
    }
}
