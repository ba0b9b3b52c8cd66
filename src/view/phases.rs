use std::rc::Rc;

use tracing::trace;

use crate::element::{ArrangeOptions, ElementBehavior, ElementId};
use crate::error::{LayoutError, Result};
use crate::geometry::{Point, Rect, Size, Thickness};
use crate::property::{
    HEIGHT, MARGIN, MAX_HEIGHT, MAX_WIDTH, MIN_HEIGHT, MIN_WIDTH, PropertyKey, RENDER_OFFSET_X,
    RENDER_OFFSET_Y, Visibility, WIDTH,
};
use crate::queue::Phase;
use crate::style::{StyleTarget, Stylesheet};
use crate::view::View;

/// Lower and upper bound for one axis after explicit size and min/max.
fn axis_bounds(explicit: Option<f32>, min: f32, max: f32) -> (f32, f32) {
    let min = min.max(0.0);
    let max = max.max(min);
    match explicit {
        Some(value) => {
            let value = value.min(max).max(min);
            (value, value)
        }
        None => (min, max),
    }
}

impl View {
    /// Clears the phase's valid flag and queues the element. Dropped for
    /// unknown, detached or already invalid elements, and while the element
    /// is inside its own computation for that phase.
    pub fn invalidate(&mut self, id: ElementId, phase: Phase) {
        let Some(node) = self.nodes.get_mut(id) else {
            return;
        };
        if !node.is_attached() || !node.is_valid(phase) {
            return;
        }
        if let Some(guard) = phase.guard_flag() {
            if node.flags.contains(guard) {
                return;
            }
        }
        node.flags.remove(phase.valid_flag());
        let depth = node.depth;
        self.queues[phase].push(id, depth);
    }

    pub fn invalidate_style(&mut self, id: ElementId) {
        self.invalidate(id, Phase::Style);
    }

    pub fn invalidate_measure(&mut self, id: ElementId) {
        self.invalidate(id, Phase::Measure);
    }

    pub fn invalidate_arrange(&mut self, id: ElementId) {
        self.invalidate(id, Phase::Arrange);
    }

    pub fn invalidate_position(&mut self, id: ElementId) {
        self.invalidate(id, Phase::Position);
    }

    /// Checks the behavior out of its node for the duration of `f`.
    pub(crate) fn with_behavior<R>(
        &mut self,
        id: ElementId,
        phase: Phase,
        f: impl FnOnce(&mut dyn ElementBehavior, &mut View) -> Result<R>,
    ) -> Result<R> {
        let node = self.node_mut(id)?;
        let mut behavior = node
            .behavior
            .take()
            .ok_or(LayoutError::CoreInUse { element: id, phase })?;
        let result = f(behavior.as_mut(), self);
        if let Some(node) = self.nodes.get_mut(id) {
            node.behavior = Some(behavior);
        }
        result
    }

    /// Sets the phase's reentrancy guard around `f`; the guard is cleared
    /// again whether or not `f` fails.
    fn guarded<R>(
        &mut self,
        id: ElementId,
        phase: Phase,
        f: impl FnOnce(&mut View) -> Result<R>,
    ) -> Result<R> {
        let guard = phase.guard_flag();
        if let Some(guard) = guard {
            self.node_mut(id)?.flags.insert(guard);
        }
        let result = f(self);
        if let (Some(guard), Some(node)) = (guard, self.nodes.get_mut(id)) {
            node.flags.remove(guard);
        }
        result
    }

    fn complete(&mut self, id: ElementId, phase: Phase) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.flags.insert(phase.valid_flag());
        }
        self.queues[phase].remove(id);
        self.stats.record(phase);
        if self.config.trace_layout {
            trace!(
                element = ?id,
                kind = self.type_name(id).unwrap_or_default(),
                %phase,
                "recomputed"
            );
        }
    }

    fn set_valid(&mut self, id: ElementId, phase: Phase) -> Result<()> {
        self.node_mut(id)?.flags.insert(phase.valid_flag());
        self.queues[phase].remove(id);
        Ok(())
    }

    fn thickness(&self, id: ElementId, key: PropertyKey) -> Thickness {
        self.property(id, key).as_thickness().unwrap_or_default()
    }

    fn size_bounds(&self, id: ElementId) -> ((f32, f32), (f32, f32)) {
        let value = |key: PropertyKey| self.property(id, key).as_f32();
        let width = axis_bounds(
            value(&WIDTH),
            value(&MIN_WIDTH).unwrap_or(0.0),
            value(&MAX_WIDTH).unwrap_or(f32::INFINITY),
        );
        let height = axis_bounds(
            value(&HEIGHT),
            value(&MIN_HEIGHT).unwrap_or(0.0),
            value(&MAX_HEIGHT).unwrap_or(f32::INFINITY),
        );
        (width, height)
    }

    /// Applies the element's stylesheet rules, runs its style core, then
    /// styles its logical children with the same sheet. Measure is always
    /// invalidated afterwards.
    pub fn style(&mut self, id: ElementId, stylesheet: Option<Rc<dyn Stylesheet>>) -> Result<()> {
        let node = self.node_mut(id)?;
        if !node.is_attached() {
            node.flags.insert(Phase::Style.valid_flag());
            return Ok(());
        }
        if node.is_valid(Phase::Style) && node.same_stylesheet(stylesheet.as_ref()) {
            return Ok(());
        }

        self.guarded(id, Phase::Style, |view| {
            let mut setters = Vec::new();
            if let Some(sheet) = &stylesheet {
                sheet.apply(&StyleTarget::new(view, id), &mut setters);
            }
            let values = setters
                .into_iter()
                .map(|setter| (setter.property, setter.value))
                .collect();
            let changed = view.node_mut(id)?.props.replace_styled(values);
            for key in changed {
                view.property_changed(id, key);
            }
            view.with_behavior(id, Phase::Style, |behavior, view| {
                behavior.style_core(view, id)
            })
        })?;

        self.node_mut(id)?.stylesheet = stylesheet.clone();
        self.complete(id, Phase::Style);
        self.invalidate(id, Phase::Measure);

        // Children still on another sheet are queued before any of them runs,
        // so a failing child leaves the rest of them for the next digest.
        let children = self.node(id)?.logical_children.clone();
        for child in &children {
            self.queue_restyle(*child, stylesheet.as_ref());
        }
        for child in children {
            self.style(child, stylesheet.clone())?;
        }
        Ok(())
    }

    fn queue_restyle(&mut self, id: ElementId, stylesheet: Option<&Rc<dyn Stylesheet>>) {
        let Some(node) = self.nodes.get_mut(id) else {
            return;
        };
        if !node.is_attached() || node.same_stylesheet(stylesheet) {
            return;
        }
        node.flags.remove(Phase::Style.valid_flag());
        let depth = node.depth;
        self.queues[Phase::Style].push(id, depth);
    }

    /// Computes the element's desired size for `available`, which may be
    /// infinite but never negative or NaN.
    pub fn measure(&mut self, id: ElementId, available: Size) -> Result<Size> {
        if let Some(value) = available.out_of_range_component() {
            return Err(LayoutError::ArgumentOutOfRange {
                phase: Phase::Measure,
                element: id,
                what: "available size",
                value,
            });
        }
        let node = self.node_mut(id)?;
        if !node.is_attached() {
            node.flags.insert(Phase::Measure.valid_flag());
            return Ok(node.desired_size);
        }
        if node.is_valid(Phase::Measure) && node.available_size == Some(available) {
            return Ok(node.desired_size);
        }

        let desired = if self.visibility(id) == Visibility::Collapsed {
            Size::ZERO
        } else {
            let margin = self.thickness(id, &MARGIN);
            let ((min_w, max_w), (min_h, max_h)) = self.size_bounds(id);
            let inner = available.deflate(margin);
            let constrained = Size::new(
                inner.width.min(max_w).max(min_w),
                inner.height.min(max_h).max(min_h),
            );
            let content = self.guarded(id, Phase::Measure, |view| {
                view.with_behavior(id, Phase::Measure, |behavior, view| {
                    behavior.measure_core(view, id, constrained)
                })
            })?;
            let desired = Size::new(
                content.width.min(max_w).max(min_w),
                content.height.min(max_h).max(min_h),
            )
            .inflate(margin);
            if !desired.is_finite() {
                return Err(LayoutError::UnboundedDesiredSize {
                    element: id,
                    size: desired,
                });
            }
            desired
        };

        let node = self.node_mut(id)?;
        let previous = node.desired_size;
        node.available_size = Some(available);
        node.desired_size = desired;
        let parent = node.parent();
        self.complete(id, Phase::Measure);

        if desired != previous {
            self.invalidate(id, Phase::Arrange);
            if let Some(parent) = parent {
                self.invalidate(parent, Phase::Measure);
                self.invalidate(parent, Phase::Arrange);
            }
        }
        Ok(desired)
    }

    pub fn arrange(&mut self, id: ElementId, final_rect: Rect) -> Result<Size> {
        self.arrange_with_options(id, final_rect, ArrangeOptions::default())
    }

    /// Places the element in `final_rect` (parent-relative) and returns its
    /// render size. Position is invalidated on every recompute.
    pub fn arrange_with_options(
        &mut self,
        id: ElementId,
        final_rect: Rect,
        options: ArrangeOptions,
    ) -> Result<Size> {
        if let Some(value) = final_rect.size().out_of_range_component() {
            return Err(LayoutError::ArgumentOutOfRange {
                phase: Phase::Arrange,
                element: id,
                what: "final size",
                value,
            });
        }
        let node = self.node_mut(id)?;
        if !node.is_attached() {
            node.flags.insert(Phase::Arrange.valid_flag());
            return Ok(node.render_size);
        }
        if !node.is_valid(Phase::Measure) {
            let available = node.available_size.unwrap_or(final_rect.size());
            self.measure(id, available)?;
        }

        let node = self.node(id)?;
        if node.is_valid(Phase::Arrange)
            && node.final_rect == Some(final_rect)
            && node.arrange_options == options
        {
            return Ok(node.render_size);
        }

        let collapsed = options.parent_collapsed || self.visibility(id) == Visibility::Collapsed;
        let render_size = if collapsed {
            let children = node.visual_children.clone();
            let hidden = ArrangeOptions {
                parent_collapsed: true,
            };
            for child in children {
                self.arrange_with_options(child, Rect::ZERO, hidden)?;
            }
            Size::ZERO
        } else {
            let margin = self.thickness(id, &MARGIN);
            let ((min_w, max_w), (min_h, max_h)) = self.size_bounds(id);
            let inner = final_rect.size().deflate(margin);
            let slot = Size::new(
                inner.width.min(max_w).max(min_w),
                inner.height.min(max_h).max(min_h),
            );
            self.guarded(id, Phase::Arrange, |view| {
                view.with_behavior(id, Phase::Arrange, |behavior, view| {
                    behavior.arrange_core(view, id, slot, options)
                })
            })?
        };

        let node = self.node_mut(id)?;
        node.final_rect = Some(final_rect);
        node.arrange_options = options;
        node.render_size = render_size;
        self.complete(id, Phase::Arrange);
        self.invalidate(id, Phase::Position);
        Ok(render_size)
    }

    /// Resolves relative and absolute bounds and the clip from the parent's
    /// absolute origin, then positions the visual children.
    pub fn position(&mut self, id: ElementId, parent_origin: Point) -> Result<()> {
        let node = self.node(id)?;
        if !node.is_attached() {
            return self.set_valid(id, Phase::Position);
        }
        if node.is_valid(Phase::Position) && node.parent_position == Some(parent_origin) {
            return Ok(());
        }

        let slot = node.final_rect.unwrap_or_default();
        let render_size = node.render_size;
        let previous_clip = node.clip;
        let parent_clip = node.parent().and_then(|parent| self.clip(parent));
        let margin = self.thickness(id, &MARGIN);
        let offset = Point::new(
            self.property(id, &RENDER_OFFSET_X).as_f32().unwrap_or(0.0),
            self.property(id, &RENDER_OFFSET_Y).as_f32().unwrap_or(0.0),
        );

        let relative = Rect::from_origin_size(
            slot.origin() + Point::new(margin.left, margin.top) + offset,
            render_size,
        );
        let absolute = relative.translate(parent_origin);
        let clip = self.with_behavior_ref(id, |behavior| {
            behavior.clip_core(self, id, absolute, parent_clip)
        });
        if let Some(clip) = clip {
            if clip.size().out_of_range_component().is_some() {
                return Err(LayoutError::NegativeClip { element: id, clip });
            }
        }

        let node = self.node_mut(id)?;
        node.parent_position = Some(parent_origin);
        node.relative_bounds = relative;
        node.absolute_bounds = absolute;
        node.clip = clip;
        let children = node.visual_children.clone();
        self.complete(id, Phase::Position);

        // Children keep their input origin when only the clip moved.
        let clip_changed = previous_clip != clip;
        let origin = self.child_origin(id);
        for child in children {
            if clip_changed {
                self.invalidate(child, Phase::Position);
            }
            self.position(child, origin)?;
        }
        Ok(())
    }
}
