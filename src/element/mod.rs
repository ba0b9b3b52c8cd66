use std::rc::Rc;

use bitflags::bitflags;
use smol_str::SmolStr;

use crate::geometry::{Point, Rect, Size};
use crate::property::PropertyStore;
use crate::queue::Phase;
use crate::style::Stylesheet;
use crate::view::{RunningClock, ViewId};

mod behavior;

pub use behavior::*;

slotmap::new_key_type! {
    pub struct ElementId;
}

bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct ElementFlags: u8 {
        const STYLE_VALID = 1 << 0;
        const MEASURE_VALID = 1 << 1;
        const ARRANGE_VALID = 1 << 2;
        const POSITION_VALID = 1 << 3;
        const IS_STYLING = 1 << 4;
        const IS_MEASURING = 1 << 5;
        const IS_ARRANGING = 1 << 6;
    }
}

impl ElementFlags {
    pub const ALL_VALID: Self = Self::STYLE_VALID
        .union(Self::MEASURE_VALID)
        .union(Self::ARRANGE_VALID)
        .union(Self::POSITION_VALID);
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ArrangeOptions {
    /// Set while an ancestor is collapsed; the element validates with a zero
    /// render size and never runs its arrange core.
    pub parent_collapsed: bool,
}

pub(crate) struct ElementNode {
    pub name: Option<SmolStr>,
    pub type_name: &'static str,
    pub logical_parent: Option<ElementId>,
    pub visual_parent: Option<ElementId>,
    pub logical_children: Vec<ElementId>,
    pub visual_children: Vec<ElementId>,
    pub depth: u32,
    pub order: u32,
    pub view: Option<ViewId>,
    pub flags: ElementFlags,
    pub props: PropertyStore,

    pub stylesheet: Option<Rc<dyn Stylesheet>>,
    pub available_size: Option<Size>,
    pub desired_size: Size,
    pub final_rect: Option<Rect>,
    pub arrange_options: ArrangeOptions,
    pub render_size: Size,
    pub parent_position: Option<Point>,
    pub relative_bounds: Rect,
    pub absolute_bounds: Rect,
    pub clip: Option<Rect>,

    /// Running storyboards in start order.
    pub clocks: Vec<RunningClock>,
    pub behavior: Option<Box<dyn ElementBehavior>>,
}

impl ElementNode {
    pub fn new(behavior: Box<dyn ElementBehavior>) -> Self {
        Self {
            name: None,
            type_name: behavior.type_name(),
            logical_parent: None,
            visual_parent: None,
            logical_children: Vec::new(),
            visual_children: Vec::new(),
            depth: 0,
            order: 0,
            view: None,
            // Detached elements report every phase valid.
            flags: ElementFlags::ALL_VALID,
            props: PropertyStore::with_defaults(behavior.default_values()),
            stylesheet: None,
            available_size: None,
            desired_size: Size::ZERO,
            final_rect: None,
            arrange_options: ArrangeOptions::default(),
            render_size: Size::ZERO,
            parent_position: None,
            relative_bounds: Rect::ZERO,
            absolute_bounds: Rect::ZERO,
            clip: None,
            clocks: Vec::new(),
            behavior: Some(behavior),
        }
    }

    /// Layout parent: the visual parent when one is set, otherwise the logical one.
    pub fn parent(&self) -> Option<ElementId> {
        self.visual_parent.or(self.logical_parent)
    }

    pub fn is_attached(&self) -> bool {
        self.view.is_some()
    }

    pub fn is_valid(&self, phase: Phase) -> bool {
        self.flags.contains(phase.valid_flag())
    }

    pub fn same_stylesheet(&self, other: Option<&Rc<dyn Stylesheet>>) -> bool {
        match (&self.stylesheet, other) {
            (None, None) => true,
            (Some(current), Some(other)) => Rc::ptr_eq(current, other),
            _ => false,
        }
    }
}
