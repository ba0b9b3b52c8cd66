use std::any::Any;

use smol_str::SmolStr;

use crate::element::{ElementBehavior, ElementId};
use crate::error::Result;
use crate::geometry::Size;
use crate::property::{FOCUSABLE, PropertyKey, PropertyValue, TEXT};
use crate::view::View;

/// Fixed advance per character used to size button labels.
pub const GLYPH_WIDTH: f32 = 8.0;
pub const LINE_HEIGHT: f32 = 20.0;

/// Text leaf sized from its label with fixed glyph metrics. Focusable and a
/// tab stop by default.
#[derive(Clone, Debug, Default)]
pub struct Button {
    label: SmolStr,
}

impl Button {
    pub fn new(label: impl Into<SmolStr>) -> Self {
        Self {
            label: label.into(),
        }
    }

    pub fn text_size(text: &str) -> Size {
        Size::new(text.chars().count() as f32 * GLYPH_WIDTH, LINE_HEIGHT)
    }
}

impl ElementBehavior for Button {
    fn type_name(&self) -> &'static str {
        "Button"
    }

    fn default_values(&self) -> Vec<(PropertyKey, PropertyValue)> {
        vec![
            (&TEXT, PropertyValue::Text(self.label.clone())),
            (&FOCUSABLE, PropertyValue::Bool(true)),
        ]
    }

    fn measure_core(&mut self, view: &mut View, id: ElementId, _available: Size) -> Result<Size> {
        Ok(Self::text_size(
            view.property(id, &TEXT).as_text().unwrap_or_default(),
        ))
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
    use crate::geometry::Rect;
    use std::time::Duration;

    #[test]
    fn measures_label_and_follows_text_changes() {
        let mut view = View::new(Box::new(Button::new("Save")));
        view.set_viewport(Rect::new(0.0, 0.0, 200.0, 100.0));
        view.update(Duration::ZERO).unwrap();
        let root = view.root();
        assert_eq!(view.desired_size(root), Size::new(32.0, 20.0));

        view.set_property(root, &TEXT, "Save all").unwrap();
        assert!(!view.is_valid(root, crate::queue::Phase::Measure));
        view.update(Duration::ZERO).unwrap();
        assert_eq!(view.desired_size(root), Size::new(64.0, 20.0));
        assert!(view.is_tab_stop(root));
    }
}
