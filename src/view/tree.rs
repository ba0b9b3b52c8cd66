use tracing::debug;

use crate::element::{ElementFlags, ElementId};
use crate::error::{LayoutError, Result};
use crate::queue::Phase;
use crate::view::View;

impl View {
    /// Layout parent: the visual parent when set, otherwise the logical one.
    pub fn parent(&self, id: ElementId) -> Option<ElementId> {
        self.nodes.get(id)?.parent()
    }

    pub fn logical_parent(&self, id: ElementId) -> Option<ElementId> {
        self.nodes.get(id)?.logical_parent
    }

    pub fn logical_children(&self, id: ElementId) -> &[ElementId] {
        self.nodes
            .get(id)
            .map(|node| node.logical_children.as_slice())
            .unwrap_or_default()
    }

    pub fn visual_children(&self, id: ElementId) -> &[ElementId] {
        self.nodes
            .get(id)
            .map(|node| node.visual_children.as_slice())
            .unwrap_or_default()
    }

    /// Nearest first; excludes `id` itself.
    pub fn ancestors(&self, id: ElementId) -> impl Iterator<Item = ElementId> + '_ {
        std::iter::successors(self.parent(id), move |current| self.parent(*current))
    }

    pub fn is_ancestor_of(&self, ancestor: ElementId, id: ElementId) -> bool {
        self.ancestors(id).any(|current| current == ancestor)
    }

    /// Appends `child` as both logical and visual child of `parent`.
    pub fn add_child(&mut self, parent: ElementId, child: ElementId) -> Result<()> {
        let index = self.node(parent)?.visual_children.len();
        self.insert_child(parent, index, child)
    }

    pub fn insert_child(&mut self, parent: ElementId, index: usize, child: ElementId) -> Result<()> {
        self.check_attachable(parent, child)?;

        let parent_node = self.node_mut(parent)?;
        let visual_index = index.min(parent_node.visual_children.len());
        parent_node.visual_children.insert(visual_index, child);
        parent_node.logical_children.push(child);
        let child_node = self.node_mut(child)?;
        child_node.logical_parent = Some(parent);
        child_node.visual_parent = Some(parent);

        self.children_changed(parent, child);
        Ok(())
    }

    /// Hosts `child` under a visual parent that differs from its logical
    /// one, such as a part generated by a control template. `child` may be
    /// detached, a visual-only element, or a logical child still hosted by
    /// its logical parent; in the last case it moves out of the logical
    /// parent's visual children.
    pub fn add_visual_child(&mut self, parent: ElementId, child: ElementId) -> Result<()> {
        self.check_visually_attachable(parent, child)?;

        let previous_host = self.node(child)?.visual_parent;
        if let Some(host) = previous_host {
            self.node_mut(host)?.visual_children.retain(|id| *id != child);
            self.renumber(host);
            self.invalidate(host, Phase::Measure);
            self.invalidate(host, Phase::Arrange);
        }
        self.node_mut(parent)?.visual_children.push(child);
        self.node_mut(child)?.visual_parent = Some(parent);
        self.children_changed(parent, child);
        Ok(())
    }

    /// Detaches `child` from `parent`. Returns `false` when it was not a child.
    ///
    /// Removing a logical child's foreign visual host hands it back to its
    /// logical parent.
    pub fn remove_child(&mut self, parent: ElementId, child: ElementId) -> Result<bool> {
        if child == self.root {
            return Err(LayoutError::RootRemoval);
        }
        let parent_node = self.node_mut(parent)?;
        let before = parent_node.visual_children.len() + parent_node.logical_children.len();
        parent_node.visual_children.retain(|id| *id != child);
        parent_node.logical_children.retain(|id| *id != child);
        let after = parent_node.visual_children.len() + parent_node.logical_children.len();
        if before == after {
            return Ok(false);
        }

        let child_node = self.node_mut(child)?;
        if child_node.logical_parent == Some(parent) {
            child_node.logical_parent = None;
        }
        let mut rehost = None;
        if child_node.visual_parent == Some(parent) {
            child_node.visual_parent = child_node.logical_parent;
            rehost = child_node.logical_parent;
        }

        if let Some(logical) = rehost {
            self.node_mut(logical)?.visual_children.push(child);
            self.renumber(logical);
            self.invalidate(logical, Phase::Measure);
            self.invalidate(logical, Phase::Arrange);
        }
        self.children_changed(parent, child);
        Ok(true)
    }

    /// Removes the element and its subtree from the arena.
    pub fn destroy_element(&mut self, id: ElementId) -> Result<()> {
        if id == self.root {
            return Err(LayoutError::RootRemoval);
        }
        let node = self.node(id)?;
        for parent in [node.visual_parent, node.logical_parent].into_iter().flatten() {
            self.remove_child(parent, id)?;
        }

        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            // Children reached only through a secondary link survive: they
            // are either handed back to their logical parent or detached.
            let node = self.node(current)?;
            let mut children: Vec<ElementId> = node
                .visual_children
                .iter()
                .chain(&node.logical_children)
                .copied()
                .collect();
            children.sort_unstable();
            children.dedup();
            let (owned, orphans): (Vec<ElementId>, Vec<ElementId>) =
                children.into_iter().partition(|child| {
                    self.parent(*child) == Some(current)
                        && self
                            .logical_parent(*child)
                            .is_none_or(|logical| logical == current)
                });
            for orphan in orphans {
                self.remove_child(current, orphan)?;
            }
            stack.extend(owned);

            self.detach_node(current);
            if let Some(node) = self.nodes.remove(current) {
                if let Some(name) = node.name {
                    self.names.remove(&name);
                }
            }
        }
        debug!(element = ?id, "destroyed element subtree");
        Ok(())
    }

    fn check_attachable(&self, parent: ElementId, child: ElementId) -> Result<()> {
        let child_node = self.node(child)?;
        if child_node.parent().is_some() {
            return Err(LayoutError::AlreadyParented(child));
        }
        self.check_placement(parent, child)
    }

    /// A logical child still hosted by its logical parent may move to another
    /// visual parent; one already hosted elsewhere may not.
    fn check_visually_attachable(&self, parent: ElementId, child: ElementId) -> Result<()> {
        let child_node = self.node(child)?;
        if let Some(host) = child_node.visual_parent {
            if host == parent || Some(host) != child_node.logical_parent {
                return Err(LayoutError::AlreadyParented(child));
            }
        }
        self.check_placement(parent, child)
    }

    fn check_placement(&self, parent: ElementId, child: ElementId) -> Result<()> {
        self.node(parent)?;
        if child == self.root {
            return Err(LayoutError::RootRemoval);
        }
        if child == parent || self.is_ancestor_of(child, parent) {
            return Err(LayoutError::CycleDetected { parent, child });
        }
        Ok(())
    }

    /// Children whose layout parent is `id`.
    fn owned_children(&self, id: ElementId) -> Vec<ElementId> {
        let Some(node) = self.nodes.get(id) else {
            return Vec::new();
        };
        let mut owned: Vec<ElementId> = node
            .visual_children
            .iter()
            .chain(&node.logical_children)
            .copied()
            .filter(|child| self.parent(*child) == Some(id))
            .collect();
        owned.sort_unstable();
        owned.dedup();
        owned
    }

    fn children_changed(&mut self, parent: ElementId, child: ElementId) {
        self.renumber(parent);
        self.on_parent_changed(child);
        self.invalidate(parent, Phase::Measure);
        self.invalidate(parent, Phase::Arrange);
    }

    /// Sibling order follows the visual child list, then logical-only children.
    fn renumber(&mut self, parent: ElementId) {
        let Some(node) = self.nodes.get(parent) else {
            return;
        };
        let ordered: Vec<ElementId> = node
            .visual_children
            .iter()
            .chain(
                node.logical_children
                    .iter()
                    .filter(|child| !node.visual_children.contains(*child)),
            )
            .copied()
            .collect();
        for (order, child) in ordered.into_iter().enumerate() {
            if let Some(child) = self.nodes.get_mut(child) {
                child.order = order as u32;
            }
        }
    }

    /// Eagerly recomputes view membership and depth for the subtree under
    /// `id` after its parent changed, then invalidates its style.
    pub(crate) fn on_parent_changed(&mut self, id: ElementId) {
        let parent = self.parent(id);
        let (view, depth) = match parent.and_then(|parent| self.nodes.get(parent)) {
            Some(parent) => (parent.view, parent.depth + 1),
            None if id == self.root => (Some(self.id), 0),
            None => (None, 0),
        };

        let mut stack = vec![(id, depth)];
        while let Some((current, depth)) = stack.pop() {
            let Some(node) = self.nodes.get_mut(current) else {
                continue;
            };
            let was_attached = node.is_attached();
            node.view = view;
            node.depth = depth;
            match (was_attached, view.is_some()) {
                (false, true) => self.attach_node(current),
                (true, true) => self.queues.reprioritize_everywhere(current, depth),
                (true, false) => self.detach_node(current),
                (false, false) => {}
            }
            stack.extend(
                self.owned_children(current)
                    .into_iter()
                    .map(|child| (child, depth + 1)),
            );
        }

        self.invalidate(id, Phase::Style);
    }

    fn attach_node(&mut self, id: ElementId) {
        let Some(node) = self.nodes.get_mut(id) else {
            return;
        };
        node.flags.remove(ElementFlags::ALL_VALID);
        let depth = node.depth;
        for phase in Phase::ALL {
            self.queues[phase].push(id, depth);
        }
    }

    fn detach_node(&mut self, id: ElementId) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.flags.insert(ElementFlags::ALL_VALID);
        }
        self.queues.remove_everywhere(id);
        self.release_clocks(id);
        if self.focused == Some(id) {
            self.focused = None;
        }
    }
}
