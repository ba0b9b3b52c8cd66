//! Keyboard focus and navigation.
//!
//! Directional moves first honour an element's explicit `Navigate*` target,
//! then bubble up the layout ancestors, letting each container's
//! `navigate_core` pick a sibling. Tab order walks the tree in pre-order with
//! children sorted by `TabIndex`, then sibling order; backwards is the exact
//! reverse of that walk.

use tracing::debug;

use crate::element::ElementId;
use crate::error::Result;
use crate::property::{
    FOCUSABLE, IS_ENABLED, IS_TAB_STOP, NAVIGATE_DOWN, NAVIGATE_LEFT, NAVIGATE_RIGHT, NAVIGATE_UP,
    PropertyKey, TAB_INDEX, Visibility,
};
use crate::view::View;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NavigationDirection {
    Up,
    Down,
    Left,
    Right,
}

impl NavigationDirection {
    fn override_key(self) -> PropertyKey {
        match self {
            Self::Up => &NAVIGATE_UP,
            Self::Down => &NAVIGATE_DOWN,
            Self::Left => &NAVIGATE_LEFT,
            Self::Right => &NAVIGATE_RIGHT,
        }
    }

    /// `true` for the directions that move towards earlier children.
    pub fn is_backward(self) -> bool {
        matches!(self, Self::Up | Self::Left)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FocusNavigation {
    Next,
    Previous,
    Direction(NavigationDirection),
}

impl View {
    /// Visible along the whole ancestor chain, enabled and focusable.
    pub fn is_focusable(&self, id: ElementId) -> bool {
        self.is_attached(id)
            && self.property(id, &FOCUSABLE).as_bool() == Some(true)
            && self.property(id, &IS_ENABLED).as_bool() != Some(false)
            && self.visibility(id) == Visibility::Visible
            && self
                .ancestors(id)
                .all(|ancestor| self.visibility(ancestor) == Visibility::Visible)
    }

    pub fn is_tab_stop(&self, id: ElementId) -> bool {
        self.is_focusable(id) && self.property(id, &IS_TAB_STOP).as_bool() != Some(false)
    }

    /// `id` itself when focusable, otherwise its first focusable descendant
    /// in visual pre-order.
    pub fn first_focusable(&self, id: ElementId) -> Option<ElementId> {
        if self.visibility(id) != Visibility::Visible {
            return None;
        }
        if self.is_focusable(id) {
            return Some(id);
        }
        self.visual_children(id)
            .iter()
            .find_map(|child| self.first_focusable(*child))
    }

    pub fn navigate(&self, from: ElementId, direction: NavigationDirection) -> Option<ElementId> {
        if !self.is_attached(from) {
            return None;
        }
        let key = direction.override_key();
        if let Some(name) = self.property(from, key).as_text().filter(|name| !name.is_empty()) {
            match self.find_name(name) {
                Some(target) => {
                    if let Some(found) = self.first_focusable(target) {
                        return Some(found);
                    }
                }
                None => debug!(element_name = name, ?direction, "navigation target not found"),
            }
        }

        let mut child = from;
        while let Some(parent) = self.parent(child) {
            let found = self.with_behavior_ref(parent, |behavior| {
                behavior.navigate_core(self, parent, child, direction)
            });
            if found.is_some() {
                return found;
            }
            child = parent;
        }
        None
    }

    /// Visual children in tab order.
    fn tab_children(&self, id: ElementId) -> Vec<ElementId> {
        let mut children = self.visual_children(id).to_vec();
        children.sort_by_key(|child| {
            (
                self.property(*child, &TAB_INDEX).as_int().unwrap_or(0),
                self.order(*child).unwrap_or(0),
            )
        });
        children
    }

    fn first_tab_stop_in(&self, id: ElementId) -> Option<ElementId> {
        if self.visibility(id) != Visibility::Visible {
            return None;
        }
        if self.is_tab_stop(id) {
            return Some(id);
        }
        self.tab_children(id)
            .into_iter()
            .find_map(|child| self.first_tab_stop_in(child))
    }

    fn last_tab_stop_in(&self, id: ElementId) -> Option<ElementId> {
        if self.visibility(id) != Visibility::Visible {
            return None;
        }
        self.tab_children(id)
            .into_iter()
            .rev()
            .find_map(|child| self.last_tab_stop_in(child))
            .or_else(|| self.is_tab_stop(id).then_some(id))
    }

    /// Next tab stop after `from` in tab order, wrapping around the tree when
    /// the view is configured to.
    pub fn next_tab_stop(&self, from: ElementId) -> Option<ElementId> {
        if !self.is_attached(from) {
            return None;
        }
        if let Some(found) = self
            .tab_children(from)
            .into_iter()
            .find_map(|child| self.first_tab_stop_in(child))
        {
            return Some(found);
        }

        let mut current = from;
        while let Some(parent) = self.parent(current) {
            let siblings = self.tab_children(parent);
            let position = siblings.iter().position(|sibling| *sibling == current);
            if let Some(position) = position {
                let later = siblings[position + 1..]
                    .iter()
                    .find_map(|sibling| self.first_tab_stop_in(*sibling));
                if later.is_some() {
                    return later;
                }
            }
            current = parent;
        }

        self.wrap_tab(from, self.first_tab_stop_in(self.root()))
    }

    pub fn previous_tab_stop(&self, from: ElementId) -> Option<ElementId> {
        if !self.is_attached(from) {
            return None;
        }
        let mut current = from;
        while let Some(parent) = self.parent(current) {
            let siblings = self.tab_children(parent);
            let position = siblings.iter().position(|sibling| *sibling == current);
            if let Some(position) = position {
                let earlier = siblings[..position]
                    .iter()
                    .rev()
                    .find_map(|sibling| self.last_tab_stop_in(*sibling));
                if earlier.is_some() {
                    return earlier;
                }
            }
            if self.is_tab_stop(parent) {
                return Some(parent);
            }
            current = parent;
        }

        self.wrap_tab(from, self.last_tab_stop_in(self.root()))
    }

    fn wrap_tab(&self, from: ElementId, wrapped: Option<ElementId>) -> Option<ElementId> {
        if !self.config().wrap_tab_navigation {
            return None;
        }
        wrapped.filter(|target| *target != from)
    }

    pub fn focused_element(&self) -> Option<ElementId> {
        self.focused
    }

    /// Returns whether focus moved to `id`.
    pub fn focus(&mut self, id: ElementId) -> Result<bool> {
        self.node(id)?;
        if !self.is_focusable(id) {
            return Ok(false);
        }
        self.focused = Some(id);
        Ok(true)
    }

    pub fn clear_focus(&mut self) {
        self.focused = None;
    }

    /// Moves focus and returns the newly focused element. Without current
    /// focus, `Next` and `Previous` start from either end of the tab order.
    pub fn move_focus(&mut self, navigation: FocusNavigation) -> Option<ElementId> {
        let root = self.root();
        let target = match (self.focused, navigation) {
            (Some(from), FocusNavigation::Next) => self.next_tab_stop(from),
            (Some(from), FocusNavigation::Previous) => self.previous_tab_stop(from),
            (Some(from), FocusNavigation::Direction(direction)) => self.navigate(from, direction),
            (None, FocusNavigation::Next) => self.first_tab_stop_in(root),
            (None, FocusNavigation::Previous) => self.last_tab_stop_in(root),
            (None, FocusNavigation::Direction(_)) => None,
        }?;
        self.focused = Some(target);
        Some(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LayoutConfig;
    use crate::controls::{Button, CANVAS_LEFT, CANVAS_TOP, Canvas, Panel, StackPanel};
    use crate::geometry::Rect;
    use crate::property::VISIBILITY;
    use std::time::Duration;

    fn button(view: &mut View, parent: ElementId, text: &str) -> ElementId {
        let id = view.create_element(Box::new(Button::new(text)));
        view.add_child(parent, id).unwrap();
        id
    }

    /// root
    /// ├── a
    /// ├── group (panel)
    /// │   ├── b
    /// │   └── c
    /// └── d
    fn tab_tree(config: LayoutConfig) -> (View, [ElementId; 4]) {
        let mut view = View::with_config(Box::new(StackPanel::vertical()), config);
        let root = view.root();
        let a = button(&mut view, root, "a");
        let group = view.create_element(Box::new(Panel));
        view.add_child(root, group).unwrap();
        let b = button(&mut view, group, "b");
        let c = button(&mut view, group, "c");
        let d = button(&mut view, root, "d");
        (view, [a, b, c, d])
    }

    #[test]
    fn forward_tab_order_is_preorder() {
        let (view, [a, b, c, d]) = tab_tree(LayoutConfig::default());
        assert_eq!(view.next_tab_stop(a), Some(b));
        assert_eq!(view.next_tab_stop(b), Some(c));
        assert_eq!(view.next_tab_stop(c), Some(d));
        assert_eq!(view.next_tab_stop(d), Some(a));
    }

    #[test]
    fn backward_tab_order_reverses_forward() {
        let (view, [a, b, c, d]) = tab_tree(LayoutConfig::default());
        assert_eq!(view.previous_tab_stop(d), Some(c));
        assert_eq!(view.previous_tab_stop(c), Some(b));
        assert_eq!(view.previous_tab_stop(b), Some(a));
        assert_eq!(view.previous_tab_stop(a), Some(d));
    }

    #[test]
    fn no_wrap_stops_at_ends() {
        let (view, [a, _, _, d]) =
            tab_tree(LayoutConfig::default().with_wrap_tab_navigation(false));
        assert_eq!(view.next_tab_stop(d), None);
        assert_eq!(view.previous_tab_stop(a), None);
    }

    #[test]
    fn tab_index_reorders_siblings_and_collapsed_are_skipped() {
        let (mut view, [a, b, c, d]) = tab_tree(LayoutConfig::default());
        view.set_property(d, &TAB_INDEX, -1).unwrap();
        assert_eq!(view.next_tab_stop(d), Some(a));
        assert_eq!(view.next_tab_stop(c), Some(d));

        view.set_property(b, &VISIBILITY, Visibility::Collapsed).unwrap();
        assert_eq!(view.next_tab_stop(a), Some(c));
        assert!(!view.is_focusable(b));
    }

    #[test]
    fn move_focus_tracks_current_element() {
        let (mut view, [a, b, _, d]) = tab_tree(LayoutConfig::default());
        assert_eq!(view.move_focus(FocusNavigation::Next), Some(a));
        assert_eq!(view.move_focus(FocusNavigation::Next), Some(b));
        assert_eq!(view.focused_element(), Some(b));
        view.clear_focus();
        assert_eq!(view.move_focus(FocusNavigation::Previous), Some(d));
    }

    #[test]
    fn detaching_focused_element_clears_focus() {
        let (mut view, [a, ..]) = tab_tree(LayoutConfig::default());
        assert!(view.focus(a).unwrap());
        let root = view.root();
        view.remove_child(root, a).unwrap();
        assert_eq!(view.focused_element(), None);
        assert!(!view.focus(a).unwrap());
    }

    #[test]
    fn stack_panel_moves_along_its_axis() {
        let (view, [a, b, _, d]) = tab_tree(LayoutConfig::default());
        assert_eq!(view.navigate(a, NavigationDirection::Down), Some(b));
        assert_eq!(view.navigate(d, NavigationDirection::Up), Some(b));
        assert_eq!(view.navigate(a, NavigationDirection::Right), None);
        assert_eq!(view.navigate(a, NavigationDirection::Up), None);
    }

    #[test]
    fn explicit_target_overrides_layout() {
        let (mut view, [a, _, c, _]) = tab_tree(LayoutConfig::default());
        view.set_name(c, "cancel").unwrap();
        view.set_property(a, &NAVIGATE_RIGHT, "cancel").unwrap();
        assert_eq!(view.navigate(a, NavigationDirection::Right), Some(c));

        view.set_property(a, &NAVIGATE_DOWN, "missing").unwrap();
        assert!(view.navigate(a, NavigationDirection::Down).is_some());
    }

    #[test]
    fn canvas_navigates_geometrically() {
        let mut view = View::new(Box::new(Canvas));
        view.set_viewport(Rect::new(0.0, 0.0, 400.0, 400.0));
        let root = view.root();
        let origin = button(&mut view, root, "o");
        let right = button(&mut view, root, "r");
        let far_right = button(&mut view, root, "f");
        let below = button(&mut view, root, "b");
        for (id, left, top) in [
            (origin, 0.0, 0.0),
            (right, 100.0, 0.0),
            (far_right, 300.0, 0.0),
            (below, 0.0, 100.0),
        ] {
            view.set_property(id, &CANVAS_LEFT, left).unwrap();
            view.set_property(id, &CANVAS_TOP, top).unwrap();
        }
        view.update(Duration::ZERO).unwrap();

        assert_eq!(view.navigate(origin, NavigationDirection::Right), Some(right));
        assert_eq!(view.navigate(origin, NavigationDirection::Down), Some(below));
        assert_eq!(view.navigate(origin, NavigationDirection::Left), None);
        assert_eq!(view.navigate(far_right, NavigationDirection::Left), Some(right));
    }
}
