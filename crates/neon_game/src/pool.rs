//! Fixed-capacity slot arrays.
//!
//! Every transient kind (bullets, enemies, grounds, ...) lives in a [`Pool`]
//! whose length is fixed at construction. Liveness is a flag on the element;
//! despawning flips the flag and never moves other elements, so slot indices
//! stored elsewhere (a prop's ground slot, for example) stay valid.

pub trait Slot {
    fn is_active(&self) -> bool;
}

#[derive(Debug, Clone)]
pub struct Pool<T> {
    slots: Vec<T>,
}

impl<T: Slot + Default> Pool<T> {
    pub fn new(capacity: usize) -> Self {
        let mut slots = Vec::with_capacity(capacity);
        slots.resize_with(capacity, T::default);
        Self { slots }
    }

    /// Place `item` in the first inactive slot. Returns `None` when every
    /// slot is in use; the item is dropped.
    pub fn spawn(&mut self, item: T) -> Option<usize> {
        let index = self.free_slot()?;
        self.slots[index] = item;
        Some(index)
    }
}

impl<T: Slot> Pool<T> {
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn free_slot(&self) -> Option<usize> {
        self.slots.iter().position(|slot| !slot.is_active())
    }

    pub fn active_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_active()).count()
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.slots.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.slots.get_mut(index)
    }

    /// Every slot, active or not, in index order.
    pub fn slots(&self) -> &[T] {
        &self.slots
    }

    pub fn iter_active(&self) -> impl Iterator<Item = (usize, &T)> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.is_active())
    }

    pub fn iter_active_mut(&mut self) -> impl Iterator<Item = (usize, &mut T)> {
        self.slots
            .iter_mut()
            .enumerate()
            .filter(|(_, slot)| slot.is_active())
    }
}
