//! Time-bounded interpolation polled from the render loop.

use std::time::Duration;

use crate::game::types::IsoPoint;

/// Cubic ease-out: fast start, gentle landing.
pub fn ease_out(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    1.0 - (1.0 - t).powi(3)
}

/// Point-to-point screen motion.
#[derive(Debug, Clone, PartialEq)]
pub struct Tween {
    from: IsoPoint,
    to: IsoPoint,
    duration: Duration,
    elapsed: Duration,
}

impl Tween {
    pub fn new(from: IsoPoint, to: IsoPoint, duration: Duration) -> Self {
        Self {
            from,
            to,
            duration,
            elapsed: Duration::ZERO,
        }
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn target(&self) -> IsoPoint {
        self.to
    }

    /// Linear progress in `0.0..=1.0`.
    pub fn progress(&self) -> f32 {
        if self.duration.is_zero() {
            return 1.0;
        }
        (self.elapsed.as_secs_f32() / self.duration.as_secs_f32()).min(1.0)
    }

    pub fn is_finished(&self) -> bool {
        self.elapsed >= self.duration
    }

    /// Advance by `dt`. Returns true once the tween has reached its target.
    pub fn advance(&mut self, dt: Duration) -> bool {
        self.elapsed = (self.elapsed + dt).min(self.duration);
        self.is_finished()
    }

    pub fn position(&self) -> IsoPoint {
        if self.is_finished() {
            return self.to;
        }
        self.from.lerp(self.to, ease_out(self.progress()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ease_out_hits_endpoints() {
        assert_eq!(ease_out(0.0), 0.0);
        assert_eq!(ease_out(1.0), 1.0);
        assert!(ease_out(0.5) > 0.5);
    }

    #[test]
    fn tween_lands_exactly_on_target() {
        let mut tween = Tween::new(
            IsoPoint::new(0.0, 0.0),
            IsoPoint::new(64.0, 32.0),
            Duration::from_millis(300),
        );
        assert!(!tween.advance(Duration::from_millis(100)));
        let mid = tween.position();
        assert!(mid.x > 0.0 && mid.x < 64.0);
        assert!(tween.advance(Duration::from_millis(500)));
        assert_eq!(tween.position(), IsoPoint::new(64.0, 32.0));
    }
}
