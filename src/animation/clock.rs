use std::rc::Rc;
use std::time::Duration;

use crate::animation::{
    Poolable, RepeatBehavior, Storyboard, normalized_timeline_progress,
};
use crate::element::ElementId;
use crate::property::PropertyKey;

/// A timeline bound to a concrete element and property.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ClockTrack {
    pub target: ElementId,
    pub property: PropertyKey,
    pub from: f32,
    pub to: f32,
    pub(crate) timeline: usize,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ClockSample {
    pub target: ElementId,
    pub property: PropertyKey,
    pub value: f32,
}

/// Playback cursor of one running storyboard.
#[derive(Debug, Default)]
pub struct StoryboardClock {
    storyboard: Option<Rc<Storyboard>>,
    tracks: Vec<ClockTrack>,
    elapsed: Duration,
    finished: bool,
}

impl Poolable for StoryboardClock {
    fn reset(&mut self) {
        self.storyboard = None;
        self.tracks.clear();
        self.elapsed = Duration::ZERO;
        self.finished = false;
    }
}

impl StoryboardClock {
    pub(crate) fn start(&mut self, storyboard: Rc<Storyboard>, tracks: Vec<ClockTrack>) {
        self.reset();
        self.storyboard = Some(storyboard);
        self.tracks = tracks;
    }

    pub fn storyboard(&self) -> Option<&Rc<Storyboard>> {
        self.storyboard.as_ref()
    }

    pub fn tracks(&self) -> &[ClockTrack] {
        &self.tracks
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Moves the cursor by `delta` and appends the value of every track.
    /// A finished clock samples nothing.
    pub fn advance(&mut self, delta: Duration, out: &mut Vec<ClockSample>) {
        let Some(storyboard) = self.storyboard.as_ref() else {
            return;
        };
        if self.finished {
            return;
        }
        self.elapsed += delta;

        let period = storyboard.period();
        let local = match storyboard.repeat {
            RepeatBehavior::Count(count) => {
                if self.elapsed >= period * count {
                    self.finished = true;
                    period
                } else {
                    wrap(self.elapsed, period)
                }
            }
            RepeatBehavior::Forever => wrap(self.elapsed, period),
        };

        for track in &self.tracks {
            let Some(timeline) = storyboard.timelines.get(track.timeline) else {
                continue;
            };
            let value =
                match normalized_timeline_progress(local, timeline.delay, timeline.duration) {
                    Some(progress) => timeline.easing.interpolate(track.from, track.to, progress),
                    None => track.from,
                };
            out.push(ClockSample {
                target: track.target,
                property: track.property,
                value,
            });
        }
    }
}

fn wrap(elapsed: Duration, period: Duration) -> Duration {
    if period.is_zero() {
        return period;
    }
    let nanos = elapsed.as_nanos() % period.as_nanos();
    Duration::from_nanos(nanos as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::Timeline;
    use crate::property::OPACITY;
    use slotmap::SlotMap;

    fn clock_for(storyboard: Storyboard) -> (StoryboardClock, ElementId) {
        let mut ids: SlotMap<ElementId, ()> = SlotMap::with_key();
        let target = ids.insert(());
        let mut clock = StoryboardClock::default();
        clock.start(
            Rc::new(storyboard),
            vec![ClockTrack {
                target,
                property: &OPACITY,
                from: 0.0,
                to: 1.0,
                timeline: 0,
            }],
        );
        (clock, target)
    }

    fn step(clock: &mut StoryboardClock, millis: u64) -> Option<f32> {
        let mut out = Vec::new();
        clock.advance(Duration::from_millis(millis), &mut out);
        out.first().map(|sample| sample.value)
    }

    #[test]
    fn single_iteration_finishes_at_end_value() {
        let (mut clock, _) = clock_for(
            Storyboard::new("fade")
                .with_timeline(Timeline::new("Opacity", 1.0, Duration::from_millis(100))),
        );
        assert_eq!(step(&mut clock, 50), Some(0.5));
        assert!(!clock.is_finished());
        assert_eq!(step(&mut clock, 80), Some(1.0));
        assert!(clock.is_finished());
        assert_eq!(step(&mut clock, 10), None);
    }

    #[test]
    fn delay_holds_start_value() {
        let (mut clock, _) = clock_for(
            Storyboard::new("late").with_timeline(
                Timeline::new("Opacity", 1.0, Duration::from_millis(100))
                    .delay(Duration::from_millis(100)),
            ),
        );
        assert_eq!(step(&mut clock, 50), Some(0.0));
        assert_eq!(step(&mut clock, 100), Some(0.5));
    }

    #[test]
    fn forever_wraps_around() {
        let (mut clock, _) = clock_for(
            Storyboard::new("pulse")
                .repeat(RepeatBehavior::Forever)
                .with_timeline(Timeline::new("Opacity", 1.0, Duration::from_millis(100))),
        );
        assert_eq!(step(&mut clock, 125), Some(0.25));
        assert!(!clock.is_finished());
    }

    #[test]
    fn reset_clears_playback_state() {
        let (mut clock, _) = clock_for(
            Storyboard::new("fade")
                .with_timeline(Timeline::new("Opacity", 1.0, Duration::from_millis(10))),
        );
        step(&mut clock, 20);
        clock.reset();
        assert!(clock.storyboard().is_none());
        assert!(clock.tracks().is_empty());
        assert_eq!(clock.elapsed(), Duration::ZERO);
        assert!(!clock.is_finished());
    }
}
