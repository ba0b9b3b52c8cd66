//! Per-phase work queues.
//!
//! A [`LayoutQueue`] holds the attached elements whose validity flag for one
//! phase is currently cleared. Entries pop in ascending layout depth, so an
//! ancestor's recursive pass gets the chance to validate its descendants
//! before they are reached; within one depth, insertion order is kept.

use std::collections::BTreeSet;
use std::fmt;
use std::ops::{Index, IndexMut};

use rustc_hash::FxHashMap;

use crate::element::{ElementFlags, ElementId};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Phase {
    Style,
    Measure,
    Arrange,
    Position,
}

impl Phase {
    pub const ALL: [Phase; 4] = [Phase::Style, Phase::Measure, Phase::Arrange, Phase::Position];

    pub const fn index(self) -> usize {
        match self {
            Self::Style => 0,
            Self::Measure => 1,
            Self::Arrange => 2,
            Self::Position => 3,
        }
    }

    pub(crate) const fn valid_flag(self) -> ElementFlags {
        match self {
            Self::Style => ElementFlags::STYLE_VALID,
            Self::Measure => ElementFlags::MEASURE_VALID,
            Self::Arrange => ElementFlags::ARRANGE_VALID,
            Self::Position => ElementFlags::POSITION_VALID,
        }
    }

    /// Position is never re-entered during its own pass, so it has no guard.
    pub(crate) const fn guard_flag(self) -> Option<ElementFlags> {
        match self {
            Self::Style => Some(ElementFlags::IS_STYLING),
            Self::Measure => Some(ElementFlags::IS_MEASURING),
            Self::Arrange => Some(ElementFlags::IS_ARRANGING),
            Self::Position => None,
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Style => "style",
            Self::Measure => "measure",
            Self::Arrange => "arrange",
            Self::Position => "position",
        };
        f.write_str(name)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
struct QueueEntry {
    depth: u32,
    seq: u64,
    id: ElementId,
}

#[derive(Debug)]
pub struct LayoutQueue {
    phase: Phase,
    ordered: BTreeSet<QueueEntry>,
    members: FxHashMap<ElementId, QueueEntry>,
    next_seq: u64,
}

impl LayoutQueue {
    pub fn new(phase: Phase) -> Self {
        Self {
            phase,
            ordered: BTreeSet::new(),
            members: FxHashMap::default(),
            next_seq: 0,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Returns `false` when the element was already queued.
    pub fn push(&mut self, id: ElementId, depth: u32) -> bool {
        if self.members.contains_key(&id) {
            return false;
        }
        let entry = QueueEntry {
            depth,
            seq: self.next_seq,
            id,
        };
        self.next_seq += 1;
        self.ordered.insert(entry);
        self.members.insert(id, entry);
        true
    }

    pub fn pop(&mut self) -> Option<ElementId> {
        let entry = self.ordered.pop_first()?;
        self.members.remove(&entry.id);
        Some(entry.id)
    }

    pub fn remove(&mut self, id: ElementId) -> bool {
        let Some(entry) = self.members.remove(&id) else {
            return false;
        };
        self.ordered.remove(&entry);
        true
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.members.contains_key(&id)
    }

    /// Re-keys a queued element after reparenting changed its depth.
    pub fn reprioritize(&mut self, id: ElementId, depth: u32) {
        let Some(entry) = self.members.get_mut(&id) else {
            return;
        };
        if entry.depth == depth {
            return;
        }
        self.ordered.remove(&*entry);
        entry.depth = depth;
        self.ordered.insert(*entry);
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn clear(&mut self) {
        self.ordered.clear();
        self.members.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = ElementId> + '_ {
        self.ordered.iter().map(|entry| entry.id)
    }
}

#[derive(Debug)]
pub struct PhaseQueues {
    queues: [LayoutQueue; 4],
}

impl PhaseQueues {
    pub fn new() -> Self {
        Self {
            queues: Phase::ALL.map(LayoutQueue::new),
        }
    }

    pub fn remove_everywhere(&mut self, id: ElementId) {
        for queue in &mut self.queues {
            queue.remove(id);
        }
    }

    pub fn reprioritize_everywhere(&mut self, id: ElementId, depth: u32) {
        for queue in &mut self.queues {
            queue.reprioritize(id, depth);
        }
    }

    pub fn all_empty(&self) -> bool {
        self.queues.iter().all(LayoutQueue::is_empty)
    }
}

impl Default for PhaseQueues {
    fn default() -> Self {
        Self::new()
    }
}

impl Index<Phase> for PhaseQueues {
    type Output = LayoutQueue;

    fn index(&self, phase: Phase) -> &Self::Output {
        &self.queues[phase.index()]
    }
}

impl IndexMut<Phase> for PhaseQueues {
    fn index_mut(&mut self, phase: Phase) -> &mut Self::Output {
        &mut self.queues[phase.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;

    fn ids(count: usize) -> Vec<ElementId> {
        let mut map: SlotMap<ElementId, ()> = SlotMap::with_key();
        (0..count).map(|_| map.insert(())).collect()
    }

    #[test]
    fn pops_shallowest_first_then_fifo() {
        let ids = ids(4);
        let mut queue = LayoutQueue::new(Phase::Measure);
        queue.push(ids[0], 3);
        queue.push(ids[1], 1);
        queue.push(ids[2], 3);
        queue.push(ids[3], 0);

        let order: Vec<_> = std::iter::from_fn(|| queue.pop()).collect();
        assert_eq!(order, vec![ids[3], ids[1], ids[0], ids[2]]);
    }

    #[test]
    fn rejects_duplicates() {
        let ids = ids(1);
        let mut queue = LayoutQueue::new(Phase::Style);
        assert!(queue.push(ids[0], 2));
        assert!(!queue.push(ids[0], 0));
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.pop(), Some(ids[0]));
        assert!(queue.pop().is_none());
    }

    #[test]
    fn out_of_band_removal() {
        let ids = ids(3);
        let mut queue = LayoutQueue::new(Phase::Arrange);
        for (depth, id) in ids.iter().enumerate() {
            queue.push(*id, depth as u32);
        }
        assert!(queue.remove(ids[1]));
        assert!(!queue.remove(ids[1]));
        assert!(!queue.contains(ids[1]));
        assert_eq!(queue.iter().collect::<Vec<_>>(), vec![ids[0], ids[2]]);
    }

    #[test]
    fn reprioritize_moves_entry() {
        let ids = ids(2);
        let mut queue = LayoutQueue::new(Phase::Position);
        queue.push(ids[0], 1);
        queue.push(ids[1], 5);
        queue.reprioritize(ids[1], 0);
        assert_eq!(queue.pop(), Some(ids[1]));
        assert_eq!(queue.pop(), Some(ids[0]));
    }

    #[test]
    fn phase_queues_index_by_phase() {
        let ids = ids(1);
        let mut queues = PhaseQueues::new();
        queues[Phase::Measure].push(ids[0], 0);
        queues[Phase::Position].push(ids[0], 0);
        assert!(!queues.all_empty());
        assert_eq!(queues[Phase::Position].phase(), Phase::Position);
        queues.remove_everywhere(ids[0]);
        assert!(queues.all_empty());
    }
}
