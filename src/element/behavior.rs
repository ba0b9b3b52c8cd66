use std::any::Any;

use crate::element::{ArrangeOptions, ElementId};
use crate::error::Result;
use crate::geometry::{Point, Rect, Size};
use crate::navigation::NavigationDirection;
use crate::property::{CLIP_TO_BOUNDS, PropertyKey, PropertyValue};
use crate::view::View;

/// Overridable per-phase computations of an element variant.
///
/// The view takes the behavior out of its node while a `*_core` method runs,
/// so cores are free to call back into the view (measure or arrange their
/// children, read properties). Re-entering the same element's core from
/// inside it fails with [`LayoutError::CoreInUse`](crate::LayoutError::CoreInUse).
pub trait ElementBehavior: Any {
    fn type_name(&self) -> &'static str;

    /// Per-type property defaults, layered under local and styled values.
    fn default_values(&self) -> Vec<(PropertyKey, PropertyValue)> {
        Vec::new()
    }

    fn on_property_changed(&mut self, _key: PropertyKey) {}

    fn style_core(&mut self, _view: &mut View, _id: ElementId) -> Result<()> {
        Ok(())
    }

    /// `available` is already reduced by the element's margin and explicit size.
    fn measure_core(&mut self, view: &mut View, id: ElementId, available: Size) -> Result<Size> {
        let mut desired = Size::ZERO;
        for child in view.visual_children(id).to_vec() {
            desired = desired.max(view.measure(child, available)?);
        }
        Ok(desired)
    }

    fn arrange_core(
        &mut self,
        view: &mut View,
        id: ElementId,
        final_size: Size,
        _options: ArrangeOptions,
    ) -> Result<Size> {
        let slot = Rect::from_origin_size(Point::ZERO, final_size);
        for child in view.visual_children(id).to_vec() {
            view.arrange(child, slot)?;
        }
        Ok(final_size)
    }

    /// Offset applied to the absolute origin handed to visual children.
    fn content_offset(&self, _view: &View, _id: ElementId) -> Point {
        Point::ZERO
    }

    fn clip_core(
        &self,
        view: &View,
        id: ElementId,
        absolute: Rect,
        parent_clip: Option<Rect>,
    ) -> Option<Rect> {
        if view.property(id, &CLIP_TO_BOUNDS).as_bool() == Some(true) {
            Some(parent_clip.map_or(absolute, |clip| clip.intersect(&absolute)))
        } else {
            parent_clip
        }
    }

    /// Directional navigation inside this element. `from_child` is the visual
    /// child whose subtree holds the element navigation started from; `None`
    /// lets the request bubble further up.
    fn navigate_core(
        &self,
        _view: &View,
        _id: ElementId,
        _from_child: ElementId,
        _direction: NavigationDirection,
    ) -> Option<ElementId> {
        None
    }

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}
