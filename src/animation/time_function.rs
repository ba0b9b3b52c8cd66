use std::time::Duration;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TimeFunction {
    #[default]
    Linear,
    EaseIn,
    EaseOut,
    EaseInOut,
    /// Holds the start value until the segment completes.
    Discrete,
}

impl TimeFunction {
    pub fn sample(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::EaseIn => t * t,
            Self::EaseOut => 1.0 - (1.0 - t) * (1.0 - t),
            Self::EaseInOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - ((-2.0 * t + 2.0).powi(2) * 0.5)
                }
            }
            Self::Discrete => {
                if t >= 1.0 {
                    1.0
                } else {
                    0.0
                }
            }
        }
    }

    pub fn interpolate(self, from: f32, to: f32, t: f32) -> f32 {
        from + (to - from) * self.sample(t)
    }
}

/// Progress of a delayed segment at `elapsed`; `None` while still inside the delay.
pub fn normalized_timeline_progress(
    elapsed: Duration,
    delay: Duration,
    duration: Duration,
) -> Option<f32> {
    if elapsed < delay {
        return None;
    }
    if duration.is_zero() {
        return Some(1.0);
    }
    Some(((elapsed - delay).as_secs_f32() / duration.as_secs_f32()).clamp(0.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn easings_hit_endpoints() {
        for function in [
            TimeFunction::Linear,
            TimeFunction::EaseIn,
            TimeFunction::EaseOut,
            TimeFunction::EaseInOut,
            TimeFunction::Discrete,
        ] {
            assert_eq!(function.sample(0.0), 0.0);
            assert_eq!(function.sample(1.0), 1.0);
        }
        assert_eq!(TimeFunction::Discrete.sample(0.99), 0.0);
        assert_eq!(TimeFunction::Linear.interpolate(10.0, 20.0, 0.5), 15.0);
    }

    #[test]
    fn progress_respects_delay_and_zero_duration() {
        let ms = Duration::from_millis;
        assert_eq!(normalized_timeline_progress(ms(50), ms(100), ms(200)), None);
        assert_eq!(normalized_timeline_progress(ms(200), ms(100), ms(200)), Some(0.5));
        assert_eq!(normalized_timeline_progress(ms(900), ms(100), ms(200)), Some(1.0));
        assert_eq!(normalized_timeline_progress(ms(100), ms(100), Duration::ZERO), Some(1.0));
    }
}
