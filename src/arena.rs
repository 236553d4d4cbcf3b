//! Index-addressed storage for tree nodes.

use std::mem;
use std::ops::{Index, IndexMut};
use std::vec::Vec;

/// A handle to an object stored in an `Arena<T>`.
///
/// Handles carry the generation of the slot they were issued for, so a handle to a slot that was
/// freed (and possibly reused) no longer resolves.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct NodeId {
    index: usize,
    generation: u32,
}

enum Slot<T> {
    Occupied { generation: u32, value: T },
    Vacant { generation: u32, next_free: Option<usize> },
    Retired,
}

/// A growable table of objects with a free list of vacant slots.
///
/// Freed slots are chained into a singly linked free list and reused last-in, first-out before
/// the table grows. All objects are dropped together with the arena.
///
/// # Examples
///
/// ```
/// use avl_ordered_set::arena::Arena;
///
/// let mut arena = Arena::new();
///
/// let x = arena.allocate(1);
/// assert_eq!(arena[x], 1);
///
/// arena[x] += 1;
/// assert_eq!(arena[x], 2);
///
/// assert_eq!(arena.free(x), 2);
/// assert_eq!(arena.get(x), None);
/// ```
pub struct Arena<T> {
    slots: Vec<Slot<T>>,
    head: Option<usize>,
    len: usize,
}

impl<T> Arena<T> {
    /// Constructs a new, empty `Arena<T>`.
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Constructs a new, empty `Arena<T>` with room for `capacity` objects before it reallocates.
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_ordered_set::arena::Arena;
    ///
    /// let arena: Arena<u32> = Arena::with_capacity(1024);
    /// assert!(arena.capacity() >= 1024);
    /// ```
    pub fn with_capacity(capacity: usize) -> Self {
        Arena {
            slots: Vec::with_capacity(capacity),
            head: None,
            len: 0,
        }
    }

    /// Returns the number of live objects.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the arena holds no live objects.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the number of slots the arena can hold without reallocating.
    pub fn capacity(&self) -> usize {
        self.slots.capacity()
    }

    /// Stores an object and returns its handle. A vacant slot is reused if one exists.
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_ordered_set::arena::Arena;
    ///
    /// let mut arena = Arena::new();
    /// let x = arena.allocate(0);
    /// assert_eq!(arena.get(x), Some(&0));
    /// ```
    pub fn allocate(&mut self, value: T) -> NodeId {
        self.len += 1;
        match self.head.take() {
            None => {
                self.slots.push(Slot::Occupied { generation: 0, value });
                NodeId {
                    index: self.slots.len() - 1,
                    generation: 0,
                }
            },
            Some(index) => {
                let (generation, next_free) = match self.slots[index] {
                    Slot::Vacant { generation, next_free } => (generation, next_free),
                    _ => panic!("Error: free list points at an occupied or retired slot."),
                };
                self.slots[index] = Slot::Occupied { generation, value };
                self.head = next_free;
                NodeId { index, generation }
            },
        }
    }

    /// Removes an object from the arena and returns it. The slot's generation is bumped so
    /// outstanding handles to it stop resolving. A slot whose generation is exhausted is retired
    /// instead of being put back on the free list.
    ///
    /// # Panics
    ///
    /// Panics if the handle does not refer to a live object.
    pub fn free(&mut self, id: NodeId) -> T {
        if !self.contains(id) {
            panic!("Error: attempting to free a vacant or stale slot.");
        }
        let next_generation = id.generation.checked_add(1);
        let vacant = match next_generation {
            Some(generation) => Slot::Vacant {
                generation,
                next_free: self.head,
            },
            None => Slot::Retired,
        };
        match mem::replace(&mut self.slots[id.index], vacant) {
            Slot::Occupied { value, .. } => {
                if next_generation.is_some() {
                    self.head = Some(id.index);
                }
                self.len -= 1;
                value
            },
            _ => unreachable!(),
        }
    }

    /// Returns `true` if the handle refers to a live object.
    pub fn contains(&self, id: NodeId) -> bool {
        self.get(id).is_some()
    }

    /// Returns an immutable reference to an object, or `None` if the handle is vacant or stale.
    pub fn get(&self, id: NodeId) -> Option<&T> {
        match self.slots.get(id.index) {
            Some(Slot::Occupied { generation, value }) if *generation == id.generation => {
                Some(value)
            },
            _ => None,
        }
    }

    /// Returns a mutable reference to an object, or `None` if the handle is vacant or stale.
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut T> {
        match self.slots.get_mut(id.index) {
            Some(Slot::Occupied { generation, value }) if *generation == id.generation => {
                Some(value)
            },
            _ => None,
        }
    }
}

impl<T> Default for Arena<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Index<NodeId> for Arena<T> {
    type Output = T;

    fn index(&self, id: NodeId) -> &Self::Output {
        self.get(id).expect("Error: node id does not refer to a live slot.")
    }
}

impl<T> IndexMut<NodeId> for Arena<T> {
    fn index_mut(&mut self, id: NodeId) -> &mut Self::Output {
        self.get_mut(id).expect("Error: node id does not refer to a live slot.")
    }
}

#[cfg(test)]
mod tests {
    use super::{Arena, NodeId, Slot};

    #[test]
    #[should_panic]
    fn test_free_invalid_slot() {
        let mut arena: Arena<u32> = Arena::new();
        arena.free(NodeId { index: 0, generation: 0 });
    }

    #[test]
    #[should_panic]
    fn test_free_twice() {
        let mut arena = Arena::new();
        let id = arena.allocate(0);
        arena.free(id);
        arena.free(id);
    }

    #[test]
    fn test_allocate() {
        let mut arena = Arena::new();
        assert_eq!(arena.allocate(0), NodeId { index: 0, generation: 0 });
        assert_eq!(arena.allocate(0), NodeId { index: 1, generation: 0 });
        assert_eq!(arena.allocate(0), NodeId { index: 2, generation: 0 });
        assert_eq!(arena.len(), 3);
    }

    #[test]
    fn test_free_reuses_slot() {
        let mut arena = Arena::new();
        let id = arena.allocate(0);
        assert_eq!(arena.free(id), 0);
        assert!(arena.is_empty());

        let reused = arena.allocate(1);
        assert_eq!(reused, NodeId { index: 0, generation: 1 });
        assert_eq!(arena.get(id), None);
        assert_eq!(arena.get(reused), Some(&1));
    }

    #[test]
    fn test_free_list_is_lifo() {
        let mut arena = Arena::new();
        let a = arena.allocate('a');
        let b = arena.allocate('b');
        arena.allocate('c');
        arena.free(a);
        arena.free(b);

        assert_eq!(arena.allocate('d').index, b.index);
        assert_eq!(arena.allocate('e').index, a.index);
        assert_eq!(arena.allocate('f').index, 3);
    }

    #[test]
    fn test_exhausted_slot_is_retired() {
        let mut arena = Arena::new();
        let id = arena.allocate(0);
        arena.slots[id.index] = Slot::Occupied {
            generation: u32::MAX,
            value: 1,
        };
        let last = NodeId {
            index: id.index,
            generation: u32::MAX,
        };
        assert_eq!(arena.free(last), 1);

        let next = arena.allocate(2);
        assert_ne!(next.index, id.index);
        assert_eq!(arena.get(last), None);
        for generation in 0..3 {
            assert_eq!(arena.get(NodeId { index: id.index, generation }), None);
        }
        assert_eq!(arena.get(next), Some(&2));
        assert_eq!(arena.len(), 1);
    }

    #[test]
    fn test_get_vacant_slot() {
        let mut arena = Arena::new();
        arena.allocate(0);
        assert_eq!(arena.get(NodeId { index: 1, generation: 0 }), None);
    }

    #[test]
    fn test_get_mut() {
        let mut arena = Arena::new();
        let id = arena.allocate(0);
        *arena.get_mut(id).unwrap() = 1;
        assert_eq!(arena[id], 1);
    }
}
