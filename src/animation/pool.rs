use std::any::{Any, TypeId};

use rustc_hash::FxHashMap;

/// Objects that can be handed back to an [`ObjectPool`] and reused.
pub trait Poolable: Any {
    /// Returns the object to its freshly constructed state.
    fn reset(&mut self);
}

/// Type-keyed free lists of boxed objects.
#[derive(Debug)]
pub struct ObjectPool {
    idle: FxHashMap<TypeId, Vec<Box<dyn Any>>>,
    capacity: usize,
}

impl ObjectPool {
    pub fn new(capacity: usize) -> Self {
        Self {
            idle: FxHashMap::default(),
            capacity,
        }
    }

    pub fn acquire<T: Poolable + Default>(&mut self) -> Box<T> {
        self.idle
            .get_mut(&TypeId::of::<T>())
            .and_then(Vec::pop)
            .and_then(|item| item.downcast::<T>().ok())
            .unwrap_or_default()
    }

    /// Resets and stores `item`; returns `false` when the free list for its
    /// type is full and the object was dropped instead.
    pub fn release<T: Poolable>(&mut self, mut item: Box<T>) -> bool {
        item.reset();
        let idle = self.idle.entry(TypeId::of::<T>()).or_default();
        if idle.len() >= self.capacity {
            return false;
        }
        idle.push(item);
        true
    }

    pub fn idle_count<T: Any>(&self) -> usize {
        self.idle.get(&TypeId::of::<T>()).map_or(0, Vec::len)
    }
}
