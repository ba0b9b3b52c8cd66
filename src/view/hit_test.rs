use crate::element::ElementId;
use crate::geometry::{Point, Rect, Size, Thickness};
use crate::property::{IS_ENABLED, IS_HIT_TEST_VISIBLE, MARGIN, OPACITY, Visibility};
use crate::view::View;

/// Layout results of one element, as handed to a renderer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoxModelSnapshot {
    pub id: ElementId,
    pub parent: Option<ElementId>,
    pub desired_size: Size,
    pub render_size: Size,
    pub margin: Thickness,
    pub relative_bounds: Rect,
    pub absolute_bounds: Rect,
    pub clip: Option<Rect>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RenderItem {
    pub id: ElementId,
    pub type_name: &'static str,
    pub depth: u32,
    pub render_size: Size,
    pub absolute_bounds: Rect,
    pub clip: Option<Rect>,
    /// Own opacity multiplied by every ancestor's.
    pub opacity: f32,
}

impl View {
    /// Topmost element under `point` that is visible, hit-test visible and
    /// enabled. Later siblings are on top. Reads cached bounds only.
    pub fn element_at_point(&self, point: Point) -> Option<ElementId> {
        fn find(view: &View, id: ElementId, point: Point) -> Option<ElementId> {
            let node = view.nodes.get(id)?;
            if !node.is_attached() || view.visibility(id) != Visibility::Visible {
                return None;
            }
            if view.property(id, &IS_HIT_TEST_VISIBLE).as_bool() == Some(false)
                || view.property(id, &IS_ENABLED).as_bool() == Some(false)
            {
                return None;
            }
            if node.clip.is_some_and(|clip| !clip.contains(point)) {
                return None;
            }

            for child in node.visual_children.iter().rev() {
                if let Some(hit) = find(view, *child, point) {
                    return Some(hit);
                }
            }

            node.absolute_bounds.contains(point).then_some(id)
        }

        find(self, self.root, point)
    }

    pub fn box_model(&self, id: ElementId) -> Option<BoxModelSnapshot> {
        let node = self.nodes.get(id)?;
        Some(BoxModelSnapshot {
            id,
            parent: node.parent(),
            desired_size: node.desired_size,
            render_size: node.render_size,
            margin: self.property(id, &MARGIN).as_thickness().unwrap_or_default(),
            relative_bounds: node.relative_bounds,
            absolute_bounds: node.absolute_bounds,
            clip: node.clip,
        })
    }

    /// Visible elements in draw order (parents before children, siblings in
    /// visual order).
    pub fn render_items(&self) -> Vec<RenderItem> {
        fn walk(view: &View, id: ElementId, parent_opacity: f32, out: &mut Vec<RenderItem>) {
            let Some(node) = view.nodes.get(id) else {
                return;
            };
            if view.visibility(id) != Visibility::Visible {
                return;
            }
            let opacity = parent_opacity * view.property(id, &OPACITY).as_f32().unwrap_or(1.0);
            out.push(RenderItem {
                id,
                type_name: node.type_name,
                depth: node.depth,
                render_size: node.render_size,
                absolute_bounds: node.absolute_bounds,
                clip: node.clip,
                opacity,
            });
            for child in &node.visual_children {
                walk(view, *child, opacity, out);
            }
        }

        let mut out = Vec::new();
        walk(self, self.root, 1.0, &mut out);
        out
    }
}
