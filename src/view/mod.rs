use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use rustc_hash::{FxHashMap, FxHashSet};
use slotmap::SlotMap;
use smol_str::{SmolStr, format_smolstr};
use tracing::{debug, debug_span, warn};

use crate::animation::ObjectPool;
use crate::config::LayoutConfig;
use crate::controls::{Panel, control_properties};
use crate::dispatcher::{Dispatcher, DispatcherHandle};
use crate::element::{ArrangeOptions, ElementBehavior, ElementFlags, ElementId, ElementNode};
use crate::error::{LayoutError, Result};
use crate::geometry::{Point, Rect, Size};
use crate::property::{
    PropertyFlags, PropertyKey, PropertyValue, VISIBILITY, Visibility, framework_properties,
};
use crate::queue::{Phase, PhaseQueues};
use crate::style::Stylesheet;

mod clocks;
mod hit_test;
mod phases;
mod tree;

pub(crate) use clocks::RunningClock;
pub use hit_test::{BoxModelSnapshot, RenderItem};

fn next_view_id() -> u64 {
    static NEXT_ID: AtomicU64 = AtomicU64::new(1);
    NEXT_ID.fetch_add(1, Ordering::Relaxed)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ViewId(u64);

impl ViewId {
    pub fn get(self) -> u64 {
        self.0
    }
}

/// Per-digest recompute counts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DigestStats {
    pub cycle: u64,
    pub styled: usize,
    pub measured: usize,
    pub arranged: usize,
    pub positioned: usize,
    pub clocks_advanced: usize,
    pub callbacks_run: usize,
}

impl DigestStats {
    pub fn recomputed(&self, phase: Phase) -> usize {
        match phase {
            Phase::Style => self.styled,
            Phase::Measure => self.measured,
            Phase::Arrange => self.arranged,
            Phase::Position => self.positioned,
        }
    }

    fn record(&mut self, phase: Phase) {
        match phase {
            Phase::Style => self.styled += 1,
            Phase::Measure => self.measured += 1,
            Phase::Arrange => self.arranged += 1,
            Phase::Position => self.positioned += 1,
        }
    }
}

/// Owner of an element tree and of everything needed to lay it out: the
/// element arena, one work queue per phase, the name and property
/// registries, running animation clocks and the cross-thread callback queue.
pub struct View {
    id: ViewId,
    pub(crate) nodes: SlotMap<ElementId, ElementNode>,
    root: ElementId,
    pub(crate) queues: PhaseQueues,
    names: FxHashMap<SmolStr, ElementId>,
    properties: FxHashMap<SmolStr, PropertyKey>,
    viewport: Rect,
    stylesheet: Option<Rc<dyn Stylesheet>>,
    digest_cycle: u64,
    config: LayoutConfig,
    pub(crate) focused: Option<ElementId>,
    clock_pool: ObjectPool,
    clock_sequence: u64,
    animated: FxHashSet<ElementId>,
    dispatcher: Dispatcher,
    stats: DigestStats,
}

impl View {
    pub fn new(root: Box<dyn ElementBehavior>) -> Self {
        Self::with_config(root, LayoutConfig::default())
    }

    pub fn with_config(root: Box<dyn ElementBehavior>, config: LayoutConfig) -> Self {
        let mut nodes = SlotMap::with_key();
        let root = nodes.insert(ElementNode::new(root));
        let mut view = Self {
            id: ViewId(next_view_id()),
            nodes,
            root,
            queues: PhaseQueues::new(),
            names: FxHashMap::default(),
            properties: FxHashMap::default(),
            viewport: Rect::ZERO,
            stylesheet: None,
            digest_cycle: 0,
            clock_pool: ObjectPool::new(config.clock_pool_capacity),
            clock_sequence: 0,
            config,
            focused: None,
            animated: FxHashSet::default(),
            dispatcher: Dispatcher::new(),
            stats: DigestStats::default(),
        };
        for key in framework_properties().into_iter().chain(control_properties()) {
            view.register_property(key);
        }
        view.on_parent_changed(root);
        view
    }

    pub fn id(&self) -> ViewId {
        self.id
    }

    pub fn root(&self) -> ElementId {
        self.root
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    pub fn digest_cycle(&self) -> u64 {
        self.digest_cycle
    }

    pub fn dispatcher(&self) -> DispatcherHandle {
        self.dispatcher.handle()
    }

    pub fn viewport(&self) -> Rect {
        self.viewport
    }

    pub fn set_viewport(&mut self, viewport: Rect) {
        if self.viewport == viewport {
            return;
        }
        self.viewport = viewport;
        let root = self.root;
        self.invalidate(root, Phase::Measure);
        self.invalidate(root, Phase::Arrange);
        self.invalidate(root, Phase::Position);
    }

    pub fn stylesheet(&self) -> Option<&Rc<dyn Stylesheet>> {
        self.stylesheet.as_ref()
    }

    /// Installs a new sheet; the whole tree restyles on the next digest.
    pub fn set_stylesheet(&mut self, stylesheet: Option<Rc<dyn Stylesheet>>) {
        self.stylesheet = stylesheet;
        let root = self.root;
        self.invalidate(root, Phase::Style);
    }

    /// Creates a detached element. It joins the layout once attached under
    /// the root through [`View::add_child`].
    pub fn create_element(&mut self, behavior: Box<dyn ElementBehavior>) -> ElementId {
        self.nodes.insert(ElementNode::new(behavior))
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub(crate) fn node(&self, id: ElementId) -> Result<&ElementNode> {
        self.nodes.get(id).ok_or(LayoutError::UnknownElement(id))
    }

    pub(crate) fn node_mut(&mut self, id: ElementId) -> Result<&mut ElementNode> {
        self.nodes.get_mut(id).ok_or(LayoutError::UnknownElement(id))
    }

    pub fn type_name(&self, id: ElementId) -> Option<&'static str> {
        self.nodes.get(id).map(|node| node.type_name)
    }

    pub fn behavior<T: ElementBehavior>(&self, id: ElementId) -> Option<&T> {
        self.nodes
            .get(id)?
            .behavior
            .as_deref()?
            .as_any()
            .downcast_ref::<T>()
    }

    pub fn behavior_mut<T: ElementBehavior>(&mut self, id: ElementId) -> Option<&mut T> {
        self.nodes
            .get_mut(id)?
            .behavior
            .as_deref_mut()?
            .as_any_mut()
            .downcast_mut::<T>()
    }

    /// Runs `f` against the element's behavior, or the base panel behavior
    /// while the element's own is checked out by a running core.
    pub(crate) fn with_behavior_ref<R>(
        &self,
        id: ElementId,
        f: impl FnOnce(&dyn ElementBehavior) -> R,
    ) -> R {
        match self.nodes.get(id).and_then(|node| node.behavior.as_deref()) {
            Some(behavior) => f(behavior),
            None => f(&Panel as &dyn ElementBehavior),
        }
    }

    pub fn is_attached(&self, id: ElementId) -> bool {
        self.nodes.get(id).is_some_and(ElementNode::is_attached)
    }

    pub fn is_valid(&self, id: ElementId, phase: Phase) -> bool {
        self.nodes.get(id).is_some_and(|node| node.is_valid(phase))
    }

    pub fn flags(&self, id: ElementId) -> Option<ElementFlags> {
        self.nodes.get(id).map(|node| node.flags)
    }

    pub fn is_queued(&self, id: ElementId, phase: Phase) -> bool {
        self.queues[phase].contains(id)
    }

    pub fn pending(&self, phase: Phase) -> usize {
        self.queues[phase].len()
    }

    pub fn depth(&self, id: ElementId) -> Option<u32> {
        self.nodes.get(id).map(|node| node.depth)
    }

    pub fn order(&self, id: ElementId) -> Option<u32> {
        self.nodes.get(id).map(|node| node.order)
    }

    pub fn desired_size(&self, id: ElementId) -> Size {
        self.nodes.get(id).map_or(Size::ZERO, |node| node.desired_size)
    }

    pub fn render_size(&self, id: ElementId) -> Size {
        self.nodes.get(id).map_or(Size::ZERO, |node| node.render_size)
    }

    pub fn final_rect(&self, id: ElementId) -> Option<Rect> {
        self.nodes.get(id).and_then(|node| node.final_rect)
    }

    pub fn relative_bounds(&self, id: ElementId) -> Rect {
        self.nodes.get(id).map_or(Rect::ZERO, |node| node.relative_bounds)
    }

    pub fn absolute_bounds(&self, id: ElementId) -> Rect {
        self.nodes.get(id).map_or(Rect::ZERO, |node| node.absolute_bounds)
    }

    pub fn clip(&self, id: ElementId) -> Option<Rect> {
        self.nodes.get(id).and_then(|node| node.clip)
    }

    pub fn name(&self, id: ElementId) -> Option<&str> {
        self.nodes.get(id)?.name.as_deref()
    }

    /// Names are unique across the view's arena, attached or not.
    pub fn set_name(&mut self, id: ElementId, name: impl Into<SmolStr>) -> Result<()> {
        let name = name.into();
        match self.names.get(&name) {
            Some(owner) if *owner == id => return Ok(()),
            Some(_) => return Err(LayoutError::DuplicateName(name)),
            None => {}
        }
        let node = self.node_mut(id)?;
        let previous = node.name.replace(name.clone());
        if let Some(previous) = previous {
            self.names.remove(&previous);
        }
        self.names.insert(name, id);
        self.invalidate(id, Phase::Style);
        Ok(())
    }

    /// Looks up an attached element by name.
    pub fn find_name(&self, name: &str) -> Option<ElementId> {
        self.names
            .get(name)
            .copied()
            .filter(|id| self.is_attached(*id))
    }

    pub fn register_property(&mut self, key: PropertyKey) {
        self.properties.insert(key.path(), key);
    }

    /// Resolves `"Name"` or `"Owner.Name"`. An unqualified name that is not
    /// registered is retried as an attached property of the element's parent
    /// type.
    pub fn resolve_property(&self, id: ElementId, path: &str) -> Result<PropertyKey> {
        if let Some(key) = self.properties.get(path).copied() {
            return Ok(key);
        }
        if !path.contains('.') {
            let owner = self.parent(id).and_then(|parent| self.type_name(parent));
            if let Some(owner) = owner {
                let qualified = format_smolstr!("{owner}.{path}");
                if let Some(key) = self.properties.get(&qualified).copied() {
                    return Ok(key);
                }
            }
        }
        Err(LayoutError::UnknownProperty(SmolStr::new(path)))
    }

    pub fn property(&self, id: ElementId, key: PropertyKey) -> &PropertyValue {
        self.nodes
            .get(id)
            .map_or(&key.default, |node| node.props.get(key))
    }

    pub fn local_property(&self, id: ElementId, key: PropertyKey) -> Option<&PropertyValue> {
        self.nodes.get(id)?.props.local(key)
    }

    pub fn visibility(&self, id: ElementId) -> Visibility {
        self.property(id, &VISIBILITY)
            .as_visibility()
            .unwrap_or_default()
    }

    pub fn set_property(
        &mut self,
        id: ElementId,
        key: PropertyKey,
        value: impl Into<PropertyValue>,
    ) -> Result<()> {
        if self.node_mut(id)?.props.set_local(key, value.into()) {
            self.property_changed(id, key);
        }
        Ok(())
    }

    pub fn set_property_by_path(
        &mut self,
        id: ElementId,
        path: &str,
        value: impl Into<PropertyValue>,
    ) -> Result<()> {
        let key = self.resolve_property(id, path)?;
        self.set_property(id, key, value)
    }

    pub fn clear_property(&mut self, id: ElementId, key: PropertyKey) -> Result<()> {
        if self.node_mut(id)?.props.clear_local(key) {
            self.property_changed(id, key);
        }
        Ok(())
    }

    /// Routes an effective-value change to the phases its metadata names.
    pub(crate) fn property_changed(&mut self, id: ElementId, key: PropertyKey) {
        let Some(node) = self.nodes.get_mut(id) else {
            return;
        };
        if let Some(behavior) = node.behavior.as_mut() {
            behavior.on_property_changed(key);
        }
        let parent = node.parent();
        let flags = key.flags;

        for (flag, phase) in [
            (PropertyFlags::AFFECTS_STYLE, Phase::Style),
            (PropertyFlags::AFFECTS_MEASURE, Phase::Measure),
            (PropertyFlags::AFFECTS_ARRANGE, Phase::Arrange),
            (PropertyFlags::AFFECTS_POSITION, Phase::Position),
        ] {
            if flags.contains(flag) {
                self.invalidate(id, phase);
            }
        }
        if let Some(parent) = parent {
            if flags.contains(PropertyFlags::AFFECTS_PARENT_MEASURE) {
                self.invalidate(parent, Phase::Measure);
            }
            if flags.contains(PropertyFlags::AFFECTS_PARENT_ARRANGE) {
                self.invalidate(parent, Phase::Arrange);
            }
        }
    }

    /// Runs one digest: queued callbacks, animation clocks, then the style,
    /// measure, arrange and position queues, each drained to empty in that
    /// order.
    pub fn update(&mut self, elapsed: Duration) -> Result<DigestStats> {
        self.digest_cycle += 1;
        let span = debug_span!("digest", view = self.id.0, cycle = self.digest_cycle);
        let _guard = span.enter();
        self.stats = DigestStats {
            cycle: self.digest_cycle,
            ..DigestStats::default()
        };

        for callback in self.dispatcher.drain() {
            callback(self);
            self.stats.callbacks_run += 1;
        }
        self.stats.clocks_advanced = self.advance_clocks(elapsed)?;

        for phase in Phase::ALL {
            self.drain(phase)?;
        }

        let stats = self.stats;
        debug!(
            styled = stats.styled,
            measured = stats.measured,
            arranged = stats.arranged,
            positioned = stats.positioned,
            clocks = stats.clocks_advanced,
            callbacks = stats.callbacks_run,
            "digest complete"
        );
        Ok(stats)
    }

    /// Processes one phase queue until it is empty. Elements that the
    /// processing of others queues up again are picked up in the same drain.
    fn drain(&mut self, phase: Phase) -> Result<()> {
        let limit = self.config.max_pass_iterations;
        let mut iterations = 0usize;
        while let Some(id) = self.queues[phase].pop() {
            iterations += 1;
            if iterations > limit {
                warn!(%phase, limit, "layout pass did not settle");
                return Err(LayoutError::PassLimitExceeded { phase, limit });
            }
            let Some(node) = self.nodes.get(id) else {
                continue;
            };
            if !node.is_attached() || node.is_valid(phase) {
                continue;
            }

            let result = match phase {
                Phase::Style => {
                    let stylesheet = self.stylesheet.clone();
                    self.style(id, stylesheet)
                }
                Phase::Measure => match self.measure_input(id) {
                    Some(available) => self.measure(id, available).map(drop),
                    None => {
                        self.mark_valid(id, phase);
                        Ok(())
                    }
                },
                Phase::Arrange => match self.arrange_input(id) {
                    Some((rect, options)) => {
                        self.arrange_with_options(id, rect, options).map(drop)
                    }
                    None => {
                        self.mark_valid(id, phase);
                        Ok(())
                    }
                },
                Phase::Position => {
                    let origin = self.position_input(id);
                    self.position(id, origin)
                }
            };
            if let Err(err) = result {
                self.requeue(id, phase);
                return Err(err);
            }
        }
        Ok(())
    }

    /// Puts an element whose recompute failed back in its queue so the next
    /// digest retries it.
    fn requeue(&mut self, id: ElementId, phase: Phase) {
        let Some(node) = self.nodes.get(id) else {
            return;
        };
        if node.is_attached() && !node.is_valid(phase) {
            let depth = node.depth;
            self.queues[phase].push(id, depth);
        }
    }

    fn measure_input(&self, id: ElementId) -> Option<Size> {
        if id == self.root {
            return Some(self.viewport.size());
        }
        self.nodes.get(id)?.available_size
    }

    fn arrange_input(&self, id: ElementId) -> Option<(Rect, ArrangeOptions)> {
        if id == self.root {
            let rect = Rect::from_origin_size(Point::ZERO, self.viewport.size());
            return Some((rect, ArrangeOptions::default()));
        }
        let node = self.nodes.get(id)?;
        node.final_rect.map(|rect| (rect, node.arrange_options))
    }

    fn position_input(&self, id: ElementId) -> Point {
        match self.parent(id) {
            Some(parent) => self.child_origin(parent),
            None => self.viewport.origin(),
        }
    }

    /// Absolute origin handed to the visual children of `id`.
    pub(crate) fn child_origin(&self, id: ElementId) -> Point {
        self.absolute_bounds(id).origin()
            + self.with_behavior_ref(id, |behavior| behavior.content_offset(self, id))
    }

    fn mark_valid(&mut self, id: ElementId, phase: Phase) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.flags.insert(phase.valid_flag());
        }
        self.queues[phase].remove(id);
    }
}
