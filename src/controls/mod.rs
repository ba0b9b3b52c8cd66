mod button;
mod canvas;
mod panel;
mod scroll_viewer;
mod stack_panel;

pub use button::*;
pub use canvas::*;
pub use panel::*;
pub use scroll_viewer::*;
pub use stack_panel::*;

use crate::property::PropertyKey;

pub(crate) fn control_properties() -> [PropertyKey; 4] {
    [
        &CANVAS_LEFT,
        &CANVAS_TOP,
        &HORIZONTAL_OFFSET,
        &VERTICAL_OFFSET,
    ]
}
