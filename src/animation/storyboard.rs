use std::time::Duration;

use smol_str::SmolStr;

use crate::animation::TimeFunction;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RepeatBehavior {
    Count(u32),
    Forever,
}

impl Default for RepeatBehavior {
    fn default() -> Self {
        Self::Count(1)
    }
}

/// What a finished storyboard leaves behind on its targets.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FillBehavior {
    #[default]
    HoldEnd,
    Stop,
}

/// Drives one property of one element from `from` (or its current value)
/// to `to`.
#[derive(Clone, Debug, PartialEq)]
pub struct Timeline {
    /// Element name looked up in the view; `None` targets the element the
    /// storyboard is started on.
    pub target: Option<SmolStr>,
    /// `"Name"`, `"Owner.Name"`, or an unqualified attached name.
    pub property: SmolStr,
    pub from: Option<f32>,
    pub to: f32,
    pub duration: Duration,
    pub delay: Duration,
    pub easing: TimeFunction,
}

impl Timeline {
    pub fn new(property: impl Into<SmolStr>, to: f32, duration: Duration) -> Self {
        Self {
            target: None,
            property: property.into(),
            from: None,
            to,
            duration,
            delay: Duration::ZERO,
            easing: TimeFunction::Linear,
        }
    }

    pub fn target(mut self, name: impl Into<SmolStr>) -> Self {
        self.target = Some(name.into());
        self
    }

    pub fn from(mut self, from: f32) -> Self {
        self.from = Some(from);
        self
    }

    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn easing(mut self, easing: TimeFunction) -> Self {
        self.easing = easing;
        self
    }

    pub fn end(&self) -> Duration {
        self.delay + self.duration
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Storyboard {
    pub name: SmolStr,
    pub timelines: Vec<Timeline>,
    pub repeat: RepeatBehavior,
    pub fill: FillBehavior,
}

impl Storyboard {
    pub fn new(name: impl Into<SmolStr>) -> Self {
        Self {
            name: name.into(),
            timelines: Vec::new(),
            repeat: RepeatBehavior::default(),
            fill: FillBehavior::default(),
        }
    }

    pub fn with_timeline(mut self, timeline: Timeline) -> Self {
        self.timelines.push(timeline);
        self
    }

    pub fn repeat(mut self, repeat: RepeatBehavior) -> Self {
        self.repeat = repeat;
        self
    }

    pub fn fill(mut self, fill: FillBehavior) -> Self {
        self.fill = fill;
        self
    }

    /// Length of one iteration.
    pub fn period(&self) -> Duration {
        self.timelines
            .iter()
            .map(Timeline::end)
            .max()
            .unwrap_or(Duration::ZERO)
    }
}
