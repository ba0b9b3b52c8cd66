use std::any::Any;

use crate::element::{ArrangeOptions, ElementBehavior, ElementId};
use crate::error::Result;
use crate::geometry::{Point, Rect, Size};
use crate::navigation::NavigationDirection;
use crate::property::{PropertyDef, PropertyFlags, PropertyValue};
use crate::view::View;

const PLACEMENT: PropertyFlags = PropertyFlags::AFFECTS_PARENT_MEASURE
    .union(PropertyFlags::AFFECTS_PARENT_ARRANGE)
    .union(PropertyFlags::ANIMATABLE);

/// Attached to children of a [`Canvas`]: horizontal offset inside it.
pub static CANVAS_LEFT: PropertyDef =
    PropertyDef::attached("Canvas", "Left", PLACEMENT, PropertyValue::Float(0.0));
pub static CANVAS_TOP: PropertyDef =
    PropertyDef::attached("Canvas", "Top", PLACEMENT, PropertyValue::Float(0.0));

/// Places children at their `Canvas.Left` / `Canvas.Top` offsets with their
/// desired size. Takes no space of its own.
#[derive(Clone, Copy, Debug, Default)]
pub struct Canvas;

impl Canvas {
    fn placement(view: &View, child: ElementId) -> Point {
        Point::new(
            view.property(child, &CANVAS_LEFT).as_f32().unwrap_or(0.0),
            view.property(child, &CANVAS_TOP).as_f32().unwrap_or(0.0),
        )
    }
}

impl ElementBehavior for Canvas {
    fn type_name(&self) -> &'static str {
        "Canvas"
    }

    fn measure_core(&mut self, view: &mut View, id: ElementId, _available: Size) -> Result<Size> {
        for child in view.visual_children(id).to_vec() {
            view.measure(child, Size::INFINITE)?;
        }
        Ok(Size::ZERO)
    }

    fn arrange_core(
        &mut self,
        view: &mut View,
        id: ElementId,
        final_size: Size,
        _options: ArrangeOptions,
    ) -> Result<Size> {
        for child in view.visual_children(id).to_vec() {
            let origin = Self::placement(view, child);
            let rect = Rect::from_origin_size(origin, view.desired_size(child));
            view.arrange(child, rect)?;
        }
        Ok(final_size)
    }

    /// Nearest focusable child, by distance between centers, that lies in
    /// `direction` from the child navigation started in.
    fn navigate_core(
        &self,
        view: &View,
        id: ElementId,
        from_child: ElementId,
        direction: NavigationDirection,
    ) -> Option<ElementId> {
        let from = view.absolute_bounds(from_child).center();
        view.visual_children(id)
            .iter()
            .filter(|child| **child != from_child)
            .filter_map(|child| view.first_focusable(*child))
            .filter_map(|candidate| {
                let delta = view.absolute_bounds(candidate).center() - from;
                let ahead = match direction {
                    NavigationDirection::Up => delta.y < 0.0,
                    NavigationDirection::Down => delta.y > 0.0,
                    NavigationDirection::Left => delta.x < 0.0,
                    NavigationDirection::Right => delta.x > 0.0,
                };
                ahead.then_some((candidate, delta.length()))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(candidate, _)| candidate)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::{Storyboard, Timeline};
    use crate::controls::Button;
    use crate::queue::Phase;
    use std::rc::Rc;
    use std::time::Duration;

    #[test]
    fn places_children_at_attached_offsets() {
        let mut view = View::new(Box::new(Canvas));
        view.set_viewport(Rect::new(0.0, 0.0, 500.0, 500.0));
        let root = view.root();
        let child = view.create_element(Box::new(Button::new("hello")));
        view.add_child(root, child).unwrap();
        view.set_property(child, &CANVAS_LEFT, 30.0).unwrap();
        view.set_property(child, &CANVAS_TOP, 40.0).unwrap();
        view.update(Duration::ZERO).unwrap();

        assert_eq!(view.desired_size(root), Size::ZERO);
        assert_eq!(view.absolute_bounds(child), Rect::new(30.0, 40.0, 40.0, 20.0));

        view.set_property(child, &CANVAS_LEFT, 60.0).unwrap();
        assert!(!view.is_valid(root, Phase::Arrange));
        let stats = view.update(Duration::ZERO).unwrap();
        assert_eq!(stats.measured, 1);
        assert_eq!(view.absolute_bounds(child).x, 60.0);
    }

    #[test]
    fn unqualified_attached_name_resolves_through_parent_type() {
        let mut view = View::new(Box::new(Canvas));
        view.set_viewport(Rect::new(0.0, 0.0, 500.0, 500.0));
        let root = view.root();
        let child = view.create_element(Box::new(Button::new("x")));
        view.add_child(root, child).unwrap();

        assert_eq!(view.resolve_property(child, "Left").unwrap(), &CANVAS_LEFT);
        assert_eq!(view.resolve_property(child, "Canvas.Top").unwrap(), &CANVAS_TOP);
        assert!(view.resolve_property(root, "Left").is_err());

        let slide = Storyboard::new("slide").with_timeline(
            Timeline::new("Left", 100.0, Duration::from_millis(100)).from(0.0),
        );
        view.begin_storyboard(child, Rc::new(slide)).unwrap();
        view.update(Duration::from_millis(50)).unwrap();
        assert_eq!(view.absolute_bounds(child).x, 50.0);
    }
}
