use crate::arena::NodeId;
use crate::avl_tree::set::AvlSet;
use crate::avl_tree::tree;
use crate::avl_tree::{Error, Result};
use std::sync::atomic::{AtomicUsize, Ordering};

static NEXT_TREE_ID: AtomicUsize = AtomicUsize::new(0);

/// Identifies the set a cursor was issued by.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct TreeId(usize);

impl TreeId {
    pub fn fresh() -> Self {
        TreeId(NEXT_TREE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// A position in an `AvlSet<T>`: either a value of the set or the end position past the maximum.
///
/// A cursor does not borrow its set, so the set can be modified while the cursor is held. Every
/// operation takes the set again and checks that the cursor still makes sense for it: using a
/// cursor with a set that did not issue it, or after the value it references was removed, returns
/// an error. Cursors to values that are still present remain valid across other insertions and
/// removals.
///
/// Two cursors are equal if they reference the same value of the same set. All end cursors are
/// equal.
///
/// # Examples
/// ```
/// use avl_ordered_set::avl_tree::{AvlSet, Error};
///
/// let set: AvlSet<u32> = vec![1, 2, 3].into_iter().collect();
///
/// let mut cursor = set.begin();
/// assert_eq!(cursor.get(&set), Ok(&1));
/// assert_eq!(cursor.move_prev(&set), Err(Error::NoPredecessor));
///
/// cursor.move_next(&set).unwrap();
/// cursor.move_next(&set).unwrap();
/// cursor.move_next(&set).unwrap();
/// assert_eq!(cursor, set.end());
/// assert_eq!(cursor.get(&set), Err(Error::CursorAtEnd));
/// ```
#[derive(Clone, Copy, Debug)]
pub struct Cursor {
    pub(super) node: Option<NodeId>,
    pub(super) tree: TreeId,
}

impl Cursor {
    /// Returns `true` if the cursor is at the end position.
    pub fn is_end(&self) -> bool {
        self.node.is_none()
    }

    fn node_in<T>(&self, set: &AvlSet<T>) -> Result<Option<NodeId>> {
        if self.tree != set.id {
            return Err(Error::ForeignCursor);
        }
        match self.node {
            Some(id) if !set.nodes.contains(id) => Err(Error::StaleCursor),
            node => Ok(node),
        }
    }

    /// Returns the value at the cursor.
    ///
    /// # Errors
    ///
    /// Returns `Error::CursorAtEnd` for the end position.
    pub fn get<'a, T>(&self, set: &'a AvlSet<T>) -> Result<&'a T> {
        match self.node_in(set)? {
            Some(id) => Ok(&set.nodes[id].value),
            None => Err(Error::CursorAtEnd),
        }
    }

    /// Advances the cursor to the next value in order, or to the end position after the maximum.
    ///
    /// # Errors
    ///
    /// Returns `Error::CursorAtEnd` if the cursor is already at the end position.
    pub fn move_next<T>(&mut self, set: &AvlSet<T>) -> Result<()> {
        let id = self.node_in(set)?.ok_or(Error::CursorAtEnd)?;
        self.node = tree::successor(&set.nodes, id);
        Ok(())
    }

    /// Moves the cursor to the previous value in order. From the end position it moves to the
    /// maximum; on an empty set it stays at the end position.
    ///
    /// # Errors
    ///
    /// Returns `Error::NoPredecessor` if the cursor is at the minimum; the cursor is left
    /// unchanged.
    pub fn move_prev<T>(&mut self, set: &AvlSet<T>) -> Result<()> {
        self.node = match self.node_in(set)? {
            Some(id) => Some(tree::predecessor(&set.nodes, id).ok_or(Error::NoPredecessor)?),
            None => tree::max(&set.nodes, set.root),
        };
        Ok(())
    }
}

impl PartialEq for Cursor {
    fn eq(&self, other: &Cursor) -> bool {
        match (self.node, other.node) {
            (None, None) => true,
            (Some(node), Some(other_node)) => node == other_node && self.tree == other.tree,
            _ => false,
        }
    }
}

impl Eq for Cursor {}

#[cfg(test)]
mod tests {
    use crate::avl_tree::{AvlSet, Error};

    #[test]
    fn test_walk_forward_and_back() {
        let set: AvlSet<u32> = (1..=7).collect();
        let mut cursor = set.begin();
        let mut forward = Vec::new();
        while !cursor.is_end() {
            forward.push(*cursor.get(&set).unwrap());
            cursor.move_next(&set).unwrap();
        }
        assert_eq!(forward, vec![1, 2, 3, 4, 5, 6, 7]);

        let mut backward = Vec::new();
        while cursor != set.begin() {
            cursor.move_prev(&set).unwrap();
            backward.push(*cursor.get(&set).unwrap());
        }
        assert_eq!(backward, vec![7, 6, 5, 4, 3, 2, 1]);
    }

    #[test]
    fn test_move_next_at_end() {
        let set: AvlSet<u32> = (1..=3).collect();
        let mut cursor = set.end();
        assert_eq!(cursor.move_next(&set), Err(Error::CursorAtEnd));
        assert_eq!(cursor.get(&set), Err(Error::CursorAtEnd));
    }

    #[test]
    fn test_move_prev_at_begin() {
        let set: AvlSet<u32> = (1..=3).collect();
        let mut cursor = set.begin();
        assert_eq!(cursor.move_prev(&set), Err(Error::NoPredecessor));
        assert_eq!(cursor, set.begin());
    }

    #[test]
    fn test_move_prev_from_end_of_empty() {
        let set: AvlSet<u32> = AvlSet::new();
        let mut cursor = set.end();
        assert_eq!(cursor.move_prev(&set), Ok(()));
        assert!(cursor.is_end());
    }

    #[test]
    fn test_end_tracks_current_maximum() {
        let mut set: AvlSet<u32> = (1..=3).collect();
        let mut cursor = set.end();
        set.insert(10);
        cursor.move_prev(&set).unwrap();
        assert_eq!(cursor.get(&set), Ok(&10));
    }

    #[test]
    fn test_stale_cursor() {
        let mut set: AvlSet<u32> = (1..=3).collect();
        let cursor = set.find(&2);
        set.remove(&2);
        set.insert(2);
        assert_eq!(cursor.get(&set), Err(Error::StaleCursor));
    }

    #[test]
    fn test_cursor_survives_unrelated_changes() {
        let mut set: AvlSet<u32> = (1..=3).collect();
        let cursor = set.find(&1);
        for value in 4..100 {
            set.insert(value);
        }
        set.remove(&2);
        assert_eq!(cursor.get(&set), Ok(&1));
    }

    #[test]
    fn test_foreign_cursor() {
        let set: AvlSet<u32> = (1..=3).collect();
        let other = set.clone();
        assert_eq!(set.begin().get(&other), Err(Error::ForeignCursor));
        assert_ne!(set.begin(), other.begin());
        assert_eq!(set.end(), other.end());
    }
}
