use std::any::Any;

use crate::element::ElementBehavior;

/// Overlay container: every child gets the full content box.
#[derive(Clone, Copy, Debug, Default)]
pub struct Panel;

impl ElementBehavior for Panel {
    fn type_name(&self) -> &'static str {
        "Panel"
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
    use crate::geometry::{Rect, Size, Thickness};
    use crate::property::{HEIGHT, MARGIN, WIDTH};
    use crate::view::View;
    use std::time::Duration;

    #[test]
    fn children_overlay_and_desired_is_largest_child() {
        let mut view = View::new(Box::new(Panel));
        view.set_viewport(Rect::new(0.0, 0.0, 300.0, 200.0));
        let root = view.root();
        let small = view.create_element(Box::new(Panel));
        let large = view.create_element(Box::new(Panel));
        view.add_child(root, small).unwrap();
        view.add_child(root, large).unwrap();
        view.set_property(small, &WIDTH, 40.0).unwrap();
        view.set_property(small, &HEIGHT, 10.0).unwrap();
        view.set_property(large, &WIDTH, 100.0).unwrap();
        view.set_property(large, &HEIGHT, 20.0).unwrap();
        view.set_property(large, &MARGIN, Thickness::uniform(5.0)).unwrap();
        view.update(Duration::ZERO).unwrap();

        assert_eq!(view.desired_size(root), Size::new(110.0, 30.0));
        assert_eq!(view.final_rect(small), Some(Rect::new(0.0, 0.0, 300.0, 200.0)));
        assert_eq!(view.render_size(large), Size::new(100.0, 20.0));
        assert_eq!(view.absolute_bounds(large), Rect::new(5.0, 5.0, 100.0, 20.0));
    }
}
