use std::any::Any;

use crate::element::{ArrangeOptions, ElementBehavior, ElementId};
use crate::error::Result;
use crate::geometry::{Point, Rect, Size};
use crate::property::{CLIP_TO_BOUNDS, PropertyDef, PropertyFlags, PropertyKey, PropertyValue};
use crate::view::View;

const SCROLL: PropertyFlags = PropertyFlags::AFFECTS_POSITION.union(PropertyFlags::ANIMATABLE);

pub static HORIZONTAL_OFFSET: PropertyDef =
    PropertyDef::new("HorizontalOffset", SCROLL, PropertyValue::Float(0.0));
pub static VERTICAL_OFFSET: PropertyDef =
    PropertyDef::new("VerticalOffset", SCROLL, PropertyValue::Float(0.0));

/// Gives its content unbounded room, shows the part selected by the scroll
/// offsets and clips the rest.
#[derive(Clone, Copy, Debug, Default)]
pub struct ScrollViewer;

impl ScrollViewer {
    pub fn offset(view: &View, id: ElementId) -> Point {
        Point::new(
            view.property(id, &HORIZONTAL_OFFSET).as_f32().unwrap_or(0.0),
            view.property(id, &VERTICAL_OFFSET).as_f32().unwrap_or(0.0),
        )
    }

    /// Size of the content, the largest desired size among the children.
    pub fn extent(view: &View, id: ElementId) -> Size {
        view.visual_children(id)
            .iter()
            .fold(Size::ZERO, |extent, child| extent.max(view.desired_size(*child)))
    }

    /// Scrolls to `offset`, clamped so the viewport stays inside the
    /// content. Returns the applied offset.
    pub fn scroll_to(view: &mut View, id: ElementId, offset: Point) -> Result<Point> {
        let extent = Self::extent(view, id);
        let viewport = view.render_size(id);
        let max = Point::new(
            (extent.width - viewport.width).max(0.0),
            (extent.height - viewport.height).max(0.0),
        );
        let clamped = offset.max(Point::ZERO).min(max);
        view.set_property(id, &HORIZONTAL_OFFSET, clamped.x)?;
        view.set_property(id, &VERTICAL_OFFSET, clamped.y)?;
        Ok(clamped)
    }
}

impl ElementBehavior for ScrollViewer {
    fn type_name(&self) -> &'static str {
        "ScrollViewer"
    }

    fn default_values(&self) -> Vec<(PropertyKey, PropertyValue)> {
        vec![(&CLIP_TO_BOUNDS, PropertyValue::Bool(true))]
    }

    fn measure_core(&mut self, view: &mut View, id: ElementId, available: Size) -> Result<Size> {
        let mut content = Size::ZERO;
        for child in view.visual_children(id).to_vec() {
            content = content.max(view.measure(child, Size::INFINITE)?);
        }
        Ok(Size::new(
            content.width.min(available.width),
            content.height.min(available.height),
        ))
    }

    fn arrange_core(
        &mut self,
        view: &mut View,
        id: ElementId,
        final_size: Size,
        _options: ArrangeOptions,
    ) -> Result<Size> {
        for child in view.visual_children(id).to_vec() {
            let size = view.desired_size(child).max(final_size);
            view.arrange(child, Rect::from_origin_size(Point::ZERO, size))?;
        }
        Ok(final_size)
    }

    fn content_offset(&self, view: &View, id: ElementId) -> Point {
        -Self::offset(view, id)
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
    use crate::controls::Panel;
    use crate::property::{HEIGHT, WIDTH};
    use std::time::Duration;

    fn scrolled_view() -> (View, ElementId) {
        let mut view = View::new(Box::new(ScrollViewer));
        view.set_viewport(Rect::new(0.0, 0.0, 100.0, 80.0));
        let root = view.root();
        let content = view.create_element(Box::new(Panel));
        view.add_child(root, content).unwrap();
        view.set_property(content, &WIDTH, 300.0).unwrap();
        view.set_property(content, &HEIGHT, 200.0).unwrap();
        view.update(Duration::ZERO).unwrap();
        (view, content)
    }

    #[test]
    fn content_is_offset_and_clipped() {
        let (mut view, content) = scrolled_view();
        let root = view.root();
        assert_eq!(view.clip(root), Some(Rect::new(0.0, 0.0, 100.0, 80.0)));
        assert_eq!(view.clip(content), Some(Rect::new(0.0, 0.0, 100.0, 80.0)));

        let applied = ScrollViewer::scroll_to(&mut view, root, Point::new(50.0, 500.0)).unwrap();
        assert_eq!(applied, Point::new(50.0, 120.0));
        let stats = view.update(Duration::ZERO).unwrap();
        assert_eq!(stats.measured, 0);
        assert_eq!(stats.arranged, 0);
        assert_eq!(view.absolute_bounds(content).origin(), Point::new(-50.0, -120.0));
    }

    #[test]
    fn hit_test_respects_clip() {
        let (view, content) = scrolled_view();
        assert_eq!(view.element_at_point(Point::new(50.0, 50.0)), Some(content));
        assert_eq!(view.element_at_point(Point::new(150.0, 50.0)), None);
    }
}
