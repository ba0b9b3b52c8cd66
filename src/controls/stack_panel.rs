use std::any::Any;

use crate::element::{ArrangeOptions, ElementBehavior, ElementId};
use crate::error::Result;
use crate::geometry::{Rect, Size};
use crate::navigation::NavigationDirection;
use crate::property::{ORIENTATION, Orientation, PropertyKey, PropertyValue};
use crate::view::View;

/// Lays children out one after another along its orientation and stretches
/// them across the other axis.
#[derive(Clone, Copy, Debug, Default)]
pub struct StackPanel {
    orientation: Orientation,
}

impl StackPanel {
    pub fn new(orientation: Orientation) -> Self {
        Self { orientation }
    }

    pub fn vertical() -> Self {
        Self::new(Orientation::Vertical)
    }

    pub fn horizontal() -> Self {
        Self::new(Orientation::Horizontal)
    }

    fn orientation(view: &View, id: ElementId) -> Orientation {
        view.property(id, &ORIENTATION)
            .as_orientation()
            .unwrap_or_default()
    }
}

impl ElementBehavior for StackPanel {
    fn type_name(&self) -> &'static str {
        "StackPanel"
    }

    fn default_values(&self) -> Vec<(PropertyKey, PropertyValue)> {
        vec![(&ORIENTATION, PropertyValue::Orientation(self.orientation))]
    }

    fn measure_core(&mut self, view: &mut View, id: ElementId, available: Size) -> Result<Size> {
        let orientation = Self::orientation(view, id);
        let slot = match orientation {
            Orientation::Vertical => Size::new(available.width, f32::INFINITY),
            Orientation::Horizontal => Size::new(f32::INFINITY, available.height),
        };
        let mut desired = Size::ZERO;
        for child in view.visual_children(id).to_vec() {
            let child_size = view.measure(child, slot)?;
            match orientation {
                Orientation::Vertical => {
                    desired.width = desired.width.max(child_size.width);
                    desired.height += child_size.height;
                }
                Orientation::Horizontal => {
                    desired.width += child_size.width;
                    desired.height = desired.height.max(child_size.height);
                }
            }
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
        let orientation = Self::orientation(view, id);
        let mut offset = 0.0;
        for child in view.visual_children(id).to_vec() {
            let desired = view.desired_size(child);
            let rect = match orientation {
                Orientation::Vertical => Rect::new(0.0, offset, final_size.width, desired.height),
                Orientation::Horizontal => {
                    Rect::new(offset, 0.0, desired.width, final_size.height)
                }
            };
            view.arrange(child, rect)?;
            offset += match orientation {
                Orientation::Vertical => desired.height,
                Orientation::Horizontal => desired.width,
            };
        }
        Ok(final_size)
    }

    fn navigate_core(
        &self,
        view: &View,
        id: ElementId,
        from_child: ElementId,
        direction: NavigationDirection,
    ) -> Option<ElementId> {
        let along_axis = match Self::orientation(view, id) {
            Orientation::Vertical => {
                matches!(direction, NavigationDirection::Up | NavigationDirection::Down)
            }
            Orientation::Horizontal => {
                matches!(direction, NavigationDirection::Left | NavigationDirection::Right)
            }
        };
        if !along_axis {
            return None;
        }
        let children = view.visual_children(id);
        let index = children.iter().position(|child| *child == from_child)?;
        if direction.is_backward() {
            children[..index]
                .iter()
                .rev()
                .find_map(|child| view.first_focusable(*child))
        } else {
            children[index + 1..]
                .iter()
                .find_map(|child| view.first_focusable(*child))
        }
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
    use crate::controls::Button;
    use crate::property::{VISIBILITY, Visibility};
    use std::time::Duration;

    #[test]
    fn stacks_horizontally_and_collapsed_children_take_no_space() {
        let mut view = View::new(Box::new(StackPanel::horizontal()));
        view.set_viewport(Rect::new(10.0, 10.0, 300.0, 50.0));
        let root = view.root();
        let ids: Vec<_> = ["ab", "cde", "f"]
            .into_iter()
            .map(|label| {
                let id = view.create_element(Box::new(Button::new(label)));
                view.add_child(root, id).unwrap();
                id
            })
            .collect();
        view.update(Duration::ZERO).unwrap();

        assert_eq!(view.desired_size(root), Size::new(48.0, 20.0));
        assert_eq!(view.absolute_bounds(ids[1]), Rect::new(26.0, 10.0, 24.0, 50.0));
        assert_eq!(view.absolute_bounds(ids[2]), Rect::new(50.0, 10.0, 8.0, 50.0));

        view.set_property(ids[1], &VISIBILITY, Visibility::Collapsed).unwrap();
        view.update(Duration::ZERO).unwrap();
        assert_eq!(view.render_size(ids[1]), Size::ZERO);
        assert_eq!(view.absolute_bounds(ids[2]), Rect::new(26.0, 10.0, 8.0, 50.0));
    }
}
