use std::f32::consts::TAU;
use std::time::{Duration, Instant};

/// GSAP-style `elastic.out`: overshoots the target, then settles on it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElasticOut {
    pub amplitude: f32,
    pub period: f32,
}

impl Default for ElasticOut {
    fn default() -> Self {
        Self {
            amplitude: 1.0,
            period: 0.3,
        }
    }
}

impl ElasticOut {
    pub fn sample(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        if t <= 0.0 {
            return 0.0;
        }
        if t >= 1.0 {
            return 1.0;
        }
        let amplitude = self.amplitude.max(1.0);
        let period = self.period.max(f32::EPSILON);
        let shift = period / TAU * (1.0 / amplitude).asin();
        amplitude * 2f32.powf(-10.0 * t) * ((t - shift) * TAU / period).sin() + 1.0
    }
}

/// Time-driven interpolation of a single scalar.
#[derive(Debug, Clone, Copy)]
pub struct Tween {
    from: f32,
    to: f32,
    start: Instant,
    duration: Duration,
    easing: ElasticOut,
}

impl Tween {
    pub fn new(from: f32, to: f32, duration: Duration, easing: ElasticOut, now: Instant) -> Self {
        Self {
            from,
            to,
            start: now,
            duration,
            easing,
        }
    }

    /// Returns the eased value at `now` and whether the tween has finished.
    pub fn sample(&self, now: Instant) -> (f32, bool) {
        let elapsed = now.saturating_duration_since(self.start);
        let progress = elapsed.as_secs_f32() / self.duration.as_secs_f32().max(f32::EPSILON);
        if progress >= 1.0 {
            return (self.to, true);
        }
        let eased = self.easing.sample(progress);
        (self.from + (self.to - self.from) * eased, false)
    }
}

/// Scalar that moves toward its latest target through a [`Tween`].
///
/// Retargeting starts the new tween from the value at the moment of the
/// call, so an in-flight animation is redirected rather than queued.
#[derive(Debug, Clone)]
pub struct Animated {
    value: f32,
    tween: Option<Tween>,
    duration: Duration,
    easing: ElasticOut,
}

impl Animated {
    pub fn new(value: f32, duration: Duration, easing: ElasticOut) -> Self {
        Self {
            value,
            tween: None,
            duration,
            easing,
        }
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    pub fn is_animating(&self) -> bool {
        self.tween.is_some()
    }

    pub fn retarget(&mut self, target: f32, now: Instant) {
        let current = self.advance(now);
        self.tween = Some(Tween::new(current, target, self.duration, self.easing, now));
    }

    /// Advances the tween to `now` and returns the current value.
    pub fn advance(&mut self, now: Instant) -> f32 {
        if let Some(tween) = self.tween {
            let (value, finished) = tween.sample(now);
            self.value = value;
            if finished {
                self.tween = None;
            }
        }
        self.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn elastic_hits_endpoints_and_overshoots() {
        let curve = ElasticOut::default();
        assert_eq!(curve.sample(0.0), 0.0);
        assert_eq!(curve.sample(1.0), 1.0);
        let peak = (1..100)
            .map(|step| curve.sample(step as f32 / 100.0))
            .fold(f32::MIN, f32::max);
        assert!(peak > 1.0, "elastic easing should overshoot, peak={peak}");
        assert!((curve.sample(0.95) - 1.0).abs() < 0.02);
    }

    #[test]
    fn tween_reports_completion() {
        let curve = ElasticOut::default();
        let start = Instant::now();
        let tween = Tween::new(0.0, 2.0, Duration::from_millis(100), curve, start);
        let (value, finished) = tween.sample(start + Duration::from_millis(50));
        assert!((value - 2.0 * curve.sample(0.5)).abs() < 1e-3);
        assert!(!finished);
        let (value, finished) = tween.sample(start + Duration::from_millis(150));
        assert_eq!(value, 2.0);
        assert!(finished);
    }

    #[test]
    fn retarget_starts_from_in_flight_value() {
        let curve = ElasticOut::default();
        let start = Instant::now();
        let mut animated = Animated::new(0.0, Duration::from_secs(1), curve);
        animated.retarget(1.0, start);
        let mid = start + Duration::from_millis(250);
        animated.retarget(0.0, mid);
        let in_flight = curve.sample(0.25);
        assert!((animated.value() - in_flight).abs() < 1e-3);

        let value = animated.advance(mid + Duration::from_millis(500));
        let expected = in_flight - in_flight * curve.sample(0.5);
        assert!((value - expected).abs() < 1e-3, "value={value} expected={expected}");
        assert_eq!(animated.advance(mid + Duration::from_secs(2)), 0.0);
        assert!(!animated.is_animating());
    }
}
