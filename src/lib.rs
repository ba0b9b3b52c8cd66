//! Incremental retained-mode layout.
//!
//! A [`View`] owns a tree of elements and lays it out once per frame through
//! [`View::update`]: style, measure, arrange and position run in that order,
//! each draining a depth-ordered queue of the elements whose cached result
//! for that phase was invalidated since the last frame.

pub mod animation;
pub mod config;
pub mod controls;
pub mod dispatcher;
pub mod element;
pub mod error;
pub mod geometry;
pub mod navigation;
pub mod property;
pub mod queue;
pub mod style;
pub mod view;

pub use animation::*;
pub use config::LayoutConfig;
pub use controls::*;
pub use dispatcher::DispatcherHandle;
pub use element::{ArrangeOptions, ElementBehavior, ElementFlags, ElementId};
pub use error::{LayoutError, Result};
pub use geometry::{Point, Rect, Size, Thickness};
pub use navigation::{FocusNavigation, NavigationDirection};
pub use property::{
    Orientation, PropertyDef, PropertyFlags, PropertyKey, PropertyValue, Visibility,
};
pub use queue::{LayoutQueue, Phase};
pub use style::*;
pub use view::*;
