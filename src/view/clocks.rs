use std::rc::Rc;
use std::time::Duration;

use smol_str::SmolStr;
use tracing::debug;

use crate::animation::{ClockSample, ClockTrack, FillBehavior, Storyboard, StoryboardClock};
use crate::element::ElementId;
use crate::error::{LayoutError, Result};
use crate::property::{PropertyKey, PropertyValue};
use crate::view::View;

/// A storyboard playing on an element. `started` orders clocks across the
/// whole view; when two clocks write the same property, the later-started
/// one is applied last and wins.
pub(crate) struct RunningClock {
    pub name: SmolStr,
    pub started: u64,
    pub clock: Box<StoryboardClock>,
}

impl View {
    /// Resolves every timeline of `storyboard` against `id` and starts a
    /// pooled clock for it. A storyboard already running under the same name
    /// on this element is stopped first.
    pub fn begin_storyboard(&mut self, id: ElementId, storyboard: Rc<Storyboard>) -> Result<()> {
        self.node(id)?;
        let mut tracks = Vec::with_capacity(storyboard.timelines.len());
        for (index, timeline) in storyboard.timelines.iter().enumerate() {
            let target = match &timeline.target {
                Some(name) => self
                    .find_name(name)
                    .ok_or_else(|| LayoutError::UnknownName(name.clone()))?,
                None => id,
            };
            let property = self.resolve_property(target, &timeline.property)?;
            if !property.is_animatable() {
                return Err(LayoutError::NotAnimatable(property.path()));
            }
            let from = timeline.from.unwrap_or_else(|| {
                self.property(target, property).as_f32().unwrap_or(0.0)
            });
            tracks.push(ClockTrack {
                target,
                property,
                from,
                to: timeline.to,
                timeline: index,
            });
        }

        self.stop_storyboard(id, &storyboard.name)?;
        let mut clock = self.clock_pool.acquire::<StoryboardClock>();
        let name = storyboard.name.clone();
        clock.start(storyboard, tracks);
        self.clock_sequence += 1;
        let started = self.clock_sequence;
        self.node_mut(id)?.clocks.push(RunningClock {
            name,
            started,
            clock,
        });
        self.animated.insert(id);
        Ok(())
    }

    /// Returns whether a storyboard of that name was running.
    pub fn stop_storyboard(&mut self, id: ElementId, name: &str) -> Result<bool> {
        let node = self.node_mut(id)?;
        let Some(index) = node.clocks.iter().position(|running| running.name.as_str() == name) else {
            return Ok(false);
        };
        let running = node.clocks.remove(index);
        if node.clocks.is_empty() {
            self.animated.remove(&id);
        }
        self.release_clock(running.clock);
        Ok(true)
    }

    /// Storyboards running on `id`, in start order.
    pub fn active_storyboards(&self, id: ElementId) -> Vec<SmolStr> {
        self.nodes
            .get(id)
            .map(|node| node.clocks.iter().map(|running| running.name.clone()).collect())
            .unwrap_or_default()
    }

    pub fn pooled_clock_count(&self) -> usize {
        self.clock_pool.idle_count::<StoryboardClock>()
    }

    /// Moves every running clock forward by `delta` and writes the sampled
    /// values into the animated property layer in start order. Returns the
    /// number of clocks that advanced.
    pub fn advance_clocks(&mut self, delta: Duration) -> Result<usize> {
        let animated: Vec<ElementId> = self.animated.iter().copied().collect();

        let mut scratch = Vec::new();
        let mut samples: Vec<(u64, ClockSample)> = Vec::new();
        let mut finished = Vec::new();
        let mut advanced = 0;
        for id in animated {
            let Some(node) = self.nodes.get_mut(id) else {
                self.animated.remove(&id);
                continue;
            };
            for running in node.clocks.iter_mut() {
                if running.clock.is_finished() {
                    continue;
                }
                let started = running.started;
                running.clock.advance(delta, &mut scratch);
                samples.extend(scratch.drain(..).map(|sample| (started, sample)));
                advanced += 1;
                let stops = running
                    .clock
                    .storyboard()
                    .is_some_and(|storyboard| storyboard.fill == FillBehavior::Stop);
                if running.clock.is_finished() && stops {
                    finished.push((id, running.name.clone()));
                }
            }
        }

        samples.sort_by_key(|(started, _)| *started);
        for (_, sample) in samples {
            self.set_animated_value(
                sample.target,
                sample.property,
                Some(PropertyValue::Float(sample.value)),
            );
        }
        for (id, name) in finished {
            debug!(element = ?id, storyboard = %name, "storyboard completed");
            self.stop_storyboard(id, &name)?;
        }
        Ok(advanced)
    }

    fn set_animated_value(&mut self, id: ElementId, key: PropertyKey, value: Option<PropertyValue>) {
        let Some(node) = self.nodes.get_mut(id) else {
            return;
        };
        if node.props.set_animated(key, value) {
            self.property_changed(id, key);
        }
    }

    fn release_clock(&mut self, clock: Box<StoryboardClock>) {
        for track in clock.tracks() {
            self.set_animated_value(track.target, track.property, None);
        }
        self.clock_pool.release(clock);
    }

    /// Stops every storyboard running on `id`.
    pub(crate) fn release_clocks(&mut self, id: ElementId) {
        let Some(node) = self.nodes.get_mut(id) else {
            return;
        };
        let clocks: Vec<_> = node.clocks.drain(..).map(|running| running.clock).collect();
        self.animated.remove(&id);
        for clock in clocks {
            self.release_clock(clock);
        }
    }
}
