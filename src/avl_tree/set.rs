use crate::arena::{Arena, NodeId};
use crate::avl_tree::cursor::{Cursor, TreeId};
use crate::avl_tree::tree::{self, Nodes};
use log::debug;
use std::borrow::Borrow;
use std::fmt;
use std::iter::FromIterator;

/// An ordered set implemented using an avl tree.
///
/// An avl tree is a self-balancing binary search tree that maintains the invariant that the
/// heights of two child subtrees of any node differ by at most one. Nodes live in an arena and
/// link to their parents, so a `Cursor` can walk the set in both directions without any auxiliary
/// storage. Every node caches the size of its subtree, which makes `len`, `rank` and `select`
/// cheap.
///
/// # Examples
/// ```
/// use avl_ordered_set::avl_tree::AvlSet;
///
/// let mut set = AvlSet::new();
/// set.insert(0);
/// set.insert(3);
///
/// assert_eq!(set.len(), 2);
///
/// assert_eq!(set.min(), Some(&0));
/// assert_eq!(set.ceil(&2), Some(&3));
///
/// assert_eq!(set.remove(&0), Some(0));
/// assert_eq!(set.remove(&1), None);
/// ```
pub struct AvlSet<T> {
    pub(super) nodes: Nodes<T>,
    pub(super) root: Option<NodeId>,
    pub(super) id: TreeId,
}

impl<T> AvlSet<T> {
    /// Constructs a new, empty `AvlSet<T>`.
    ///
    /// # Examples
    /// ```
    /// use avl_ordered_set::avl_tree::AvlSet;
    ///
    /// let set: AvlSet<u32> = AvlSet::new();
    /// ```
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Constructs a new, empty `AvlSet<T>` that can hold `capacity` values before its node storage
    /// reallocates.
    ///
    /// # Examples
    /// ```
    /// use avl_ordered_set::avl_tree::AvlSet;
    ///
    /// let set: AvlSet<u32> = AvlSet::with_capacity(1024);
    /// assert!(set.is_empty());
    /// ```
    pub fn with_capacity(capacity: usize) -> Self {
        AvlSet {
            nodes: Arena::with_capacity(capacity),
            root: None,
            id: TreeId::fresh(),
        }
    }

    /// Returns the number of elements in the set.
    ///
    /// # Examples
    /// ```
    /// use avl_ordered_set::avl_tree::AvlSet;
    ///
    /// let mut set = AvlSet::new();
    /// set.insert(1);
    /// assert_eq!(set.len(), 1);
    /// ```
    pub fn len(&self) -> usize {
        tree::size(&self.nodes, self.root)
    }

    /// Returns `true` if the set is empty.
    ///
    /// # Examples
    /// ```
    /// use avl_ordered_set::avl_tree::AvlSet;
    ///
    /// let set: AvlSet<u32> = AvlSet::new();
    /// assert!(set.is_empty());
    /// ```
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the height of the underlying tree. An empty set has height zero.
    ///
    /// # Examples
    /// ```
    /// use avl_ordered_set::avl_tree::AvlSet;
    ///
    /// let set: AvlSet<u32> = (1..=7).collect();
    /// assert_eq!(set.height(), 3);
    /// ```
    pub fn height(&self) -> usize {
        tree::height(&self.nodes, self.root)
    }

    /// Clears the set, removing all values. Outstanding cursors to values become stale.
    ///
    /// # Examples
    /// ```
    /// use avl_ordered_set::avl_tree::AvlSet;
    ///
    /// let mut set = AvlSet::new();
    /// set.insert(1);
    /// set.insert(2);
    /// set.clear();
    /// assert_eq!(set.is_empty(), true);
    /// ```
    pub fn clear(&mut self) {
        debug!("clearing {} values", self.len());
        tree::free_subtree(&mut self.nodes, self.root.take());
    }

    /// Returns a cursor at the minimum value, or the end cursor if the set is empty.
    ///
    /// # Examples
    /// ```
    /// use avl_ordered_set::avl_tree::AvlSet;
    ///
    /// let set: AvlSet<u32> = vec![3, 1, 2].into_iter().collect();
    /// assert_eq!(set.begin().get(&set), Ok(&1));
    /// ```
    pub fn begin(&self) -> Cursor {
        self.cursor(tree::min(&self.nodes, self.root))
    }

    /// Returns the end cursor, which sits past the maximum value.
    ///
    /// # Examples
    /// ```
    /// use avl_ordered_set::avl_tree::AvlSet;
    ///
    /// let set: AvlSet<u32> = AvlSet::new();
    /// assert_eq!(set.begin(), set.end());
    /// ```
    pub fn end(&self) -> Cursor {
        self.cursor(None)
    }

    fn cursor(&self, node: Option<NodeId>) -> Cursor {
        Cursor { node, tree: self.id }
    }

    fn value(&self, node: Option<NodeId>) -> Option<&T> {
        node.map(|id| &self.nodes[id].value)
    }

    /// Returns the minimum value of the set. Returns `None` if the set is empty.
    ///
    /// # Examples
    /// ```
    /// use avl_ordered_set::avl_tree::AvlSet;
    ///
    /// let mut set = AvlSet::new();
    /// set.insert(1);
    /// set.insert(3);
    /// assert_eq!(set.min(), Some(&1));
    /// ```
    pub fn min(&self) -> Option<&T> {
        self.value(tree::min(&self.nodes, self.root))
    }

    /// Returns the maximum value of the set. Returns `None` if the set is empty.
    ///
    /// # Examples
    /// ```
    /// use avl_ordered_set::avl_tree::AvlSet;
    ///
    /// let mut set = AvlSet::new();
    /// set.insert(1);
    /// set.insert(3);
    /// assert_eq!(set.max(), Some(&3));
    /// ```
    pub fn max(&self) -> Option<&T> {
        self.value(tree::max(&self.nodes, self.root))
    }

    /// Removes and returns the minimum value of the set. Returns `None` if the set is empty.
    ///
    /// # Examples
    /// ```
    /// use avl_ordered_set::avl_tree::AvlSet;
    ///
    /// let mut set: AvlSet<u32> = vec![2, 1].into_iter().collect();
    /// assert_eq!(set.pop_min(), Some(1));
    /// assert_eq!(set.pop_min(), Some(2));
    /// assert_eq!(set.pop_min(), None);
    /// ```
    pub fn pop_min(&mut self) -> Option<T> {
        let (rest, min) = tree::remove_min(&mut self.nodes, self.root?);
        self.root = rest;
        Some(self.nodes.free(min).value)
    }

    /// Removes and returns the maximum value of the set. Returns `None` if the set is empty.
    ///
    /// # Examples
    /// ```
    /// use avl_ordered_set::avl_tree::AvlSet;
    ///
    /// let mut set: AvlSet<u32> = vec![1, 2].into_iter().collect();
    /// assert_eq!(set.pop_max(), Some(2));
    /// assert_eq!(set.pop_max(), Some(1));
    /// assert_eq!(set.pop_max(), None);
    /// ```
    pub fn pop_max(&mut self) -> Option<T> {
        let (rest, max) = tree::remove_max(&mut self.nodes, self.root?);
        self.root = rest;
        Some(self.nodes.free(max).value)
    }

    /// Returns the value with `index` smaller values in the set, if any.
    ///
    /// # Examples
    /// ```
    /// use avl_ordered_set::avl_tree::AvlSet;
    ///
    /// let set: AvlSet<u32> = vec![10, 30, 20].into_iter().collect();
    /// assert_eq!(set.select(1), Some(&20));
    /// assert_eq!(set.select(3), None);
    /// ```
    pub fn select(&self, index: usize) -> Option<&T> {
        self.value(tree::select(&self.nodes, self.root, index))
    }

    /// Returns an iterator over the set. The iterator will yield values using in-order traversal.
    ///
    /// # Examples
    /// ```
    /// use avl_ordered_set::avl_tree::AvlSet;
    ///
    /// let mut set = AvlSet::new();
    /// set.insert(1);
    /// set.insert(3);
    ///
    /// let mut iterator = set.iter();
    /// assert_eq!(iterator.next(), Some(&1));
    /// assert_eq!(iterator.next_back(), Some(&3));
    /// assert_eq!(iterator.next(), None);
    /// ```
    pub fn iter(&self) -> AvlSetIter<T> {
        AvlSetIter {
            nodes: &self.nodes,
            front: tree::min(&self.nodes, self.root),
            back: tree::max(&self.nodes, self.root),
            remaining: self.len(),
        }
    }
}

impl<T> AvlSet<T>
where
    T: Ord,
{
    /// Inserts a value into the set. Returns `false` and leaves the set unchanged if an equal value
    /// already exists.
    ///
    /// # Examples
    /// ```
    /// use avl_ordered_set::avl_tree::AvlSet;
    ///
    /// let mut set = AvlSet::new();
    /// assert!(set.insert(1));
    /// assert!(set.contains(&1));
    /// assert!(!set.insert(1));
    /// assert_eq!(set.len(), 1);
    /// ```
    pub fn insert(&mut self, value: T) -> bool {
        let (root, inserted) = tree::insert(&mut self.nodes, self.root, None, value);
        self.root = Some(root);
        inserted
    }

    /// Removes a value from the set. If the value exists in the set, it will be returned.
    /// Otherwise it will return `None` and the set is unchanged.
    ///
    /// # Examples
    /// ```
    /// use avl_ordered_set::avl_tree::AvlSet;
    ///
    /// let mut set = AvlSet::new();
    /// set.insert(1);
    /// assert_eq!(set.remove(&1), Some(1));
    /// assert_eq!(set.remove(&1), None);
    /// ```
    pub fn remove<V>(&mut self, value: &V) -> Option<T>
    where
        T: Borrow<V>,
        V: Ord + ?Sized,
    {
        let (root, ret) = tree::remove(&mut self.nodes, self.root, value);
        self.root = root;
        ret
    }

    /// Checks if a value exists in the set.
    ///
    /// # Examples
    /// ```
    /// use avl_ordered_set::avl_tree::AvlSet;
    ///
    /// let mut set = AvlSet::new();
    /// set.insert(1);
    /// assert!(!set.contains(&0));
    /// assert!(set.contains(&1));
    /// ```
    pub fn contains<V>(&self, value: &V) -> bool
    where
        T: Borrow<V>,
        V: Ord + ?Sized,
    {
        tree::find(&self.nodes, self.root, value).is_some()
    }

    /// Returns a reference to the value in the set equal to `value`, if any.
    ///
    /// # Examples
    /// ```
    /// use avl_ordered_set::avl_tree::AvlSet;
    ///
    /// let mut set = AvlSet::new();
    /// set.insert(String::from("a"));
    /// assert_eq!(set.get("a"), Some(&String::from("a")));
    /// assert_eq!(set.get("b"), None);
    /// ```
    pub fn get<V>(&self, value: &V) -> Option<&T>
    where
        T: Borrow<V>,
        V: Ord + ?Sized,
    {
        self.value(tree::find(&self.nodes, self.root, value))
    }

    /// Returns a cursor at the value equal to `value`, or the end cursor if there is none.
    ///
    /// # Examples
    /// ```
    /// use avl_ordered_set::avl_tree::AvlSet;
    ///
    /// let set: AvlSet<u32> = vec![5, 3, 8].into_iter().collect();
    /// assert_eq!(set.find(&3).get(&set), Ok(&3));
    /// assert_eq!(set.find(&4), set.end());
    /// ```
    pub fn find<V>(&self, value: &V) -> Cursor
    where
        T: Borrow<V>,
        V: Ord + ?Sized,
    {
        self.cursor(tree::find(&self.nodes, self.root, value))
    }

    /// Returns a cursor at the smallest value not less than `value`, or the end cursor if there is
    /// none.
    ///
    /// # Examples
    /// ```
    /// use avl_ordered_set::avl_tree::AvlSet;
    ///
    /// let set: AvlSet<u32> = vec![10, 20, 30].into_iter().collect();
    /// assert_eq!(set.lower_bound(&15).get(&set), Ok(&20));
    /// assert_eq!(set.lower_bound(&30).get(&set), Ok(&30));
    /// assert_eq!(set.lower_bound(&31), set.end());
    /// ```
    pub fn lower_bound<V>(&self, value: &V) -> Cursor
    where
        T: Borrow<V>,
        V: Ord + ?Sized,
    {
        self.cursor(tree::lower_bound(&self.nodes, self.root, value))
    }

    /// Returns a cursor at the smallest value greater than `value`, or the end cursor if there is
    /// none.
    ///
    /// # Examples
    /// ```
    /// use avl_ordered_set::avl_tree::AvlSet;
    ///
    /// let set: AvlSet<u32> = vec![10, 20, 30].into_iter().collect();
    /// assert_eq!(set.upper_bound(&15).get(&set), Ok(&20));
    /// assert_eq!(set.upper_bound(&20).get(&set), Ok(&30));
    /// assert_eq!(set.upper_bound(&30), set.end());
    /// ```
    pub fn upper_bound<V>(&self, value: &V) -> Cursor
    where
        T: Borrow<V>,
        V: Ord + ?Sized,
    {
        self.cursor(tree::upper_bound(&self.nodes, self.root, value))
    }

    /// Returns a value in the set that is less than or equal to a particular value. Returns `None`
    /// if such a value does not exist.
    ///
    /// # Examples
    /// ```
    /// use avl_ordered_set::avl_tree::AvlSet;
    ///
    /// let mut set = AvlSet::new();
    /// set.insert(1);
    /// assert_eq!(set.floor(&0), None);
    /// assert_eq!(set.floor(&2), Some(&1));
    /// ```
    pub fn floor<V>(&self, value: &V) -> Option<&T>
    where
        T: Borrow<V>,
        V: Ord + ?Sized,
    {
        self.value(tree::floor(&self.nodes, self.root, value))
    }

    /// Returns a value in the set that is greater than or equal to a particular value. Returns
    /// `None` if such a value does not exist.
    ///
    /// # Examples
    /// ```
    /// use avl_ordered_set::avl_tree::AvlSet;
    ///
    /// let mut set = AvlSet::new();
    /// set.insert(1);
    /// assert_eq!(set.ceil(&0), Some(&1));
    /// assert_eq!(set.ceil(&2), None);
    /// ```
    pub fn ceil<V>(&self, value: &V) -> Option<&T>
    where
        T: Borrow<V>,
        V: Ord + ?Sized,
    {
        self.value(tree::lower_bound(&self.nodes, self.root, value))
    }

    /// Returns the number of values in the set that are less than `value`.
    ///
    /// # Examples
    /// ```
    /// use avl_ordered_set::avl_tree::AvlSet;
    ///
    /// let set: AvlSet<u32> = vec![10, 20, 30].into_iter().collect();
    /// assert_eq!(set.rank(&20), 1);
    /// assert_eq!(set.rank(&25), 2);
    /// ```
    pub fn rank<V>(&self, value: &V) -> usize
    where
        T: Borrow<V>,
        V: Ord + ?Sized,
    {
        tree::rank(&self.nodes, self.root, value)
    }

    /// Verifies ordering, balance, cached sizes and heights, and parent links of every node.
    /// Returns a description of the first violation found.
    ///
    /// # Examples
    /// ```
    /// use avl_ordered_set::avl_tree::AvlSet;
    ///
    /// let mut set: AvlSet<u32> = (0..100).collect();
    /// set.remove(&50);
    /// assert_eq!(set.check_invariants(), Ok(()));
    /// ```
    pub fn check_invariants(&self) -> Result<(), String> {
        tree::check(&self.nodes, self.root)
    }
}

impl<T> AvlSet<T>
where
    T: Ord + Clone,
{
    /// Constructs a set holding a copy of every distinct value of `values`. Among equal values the
    /// first one is kept.
    ///
    /// # Examples
    /// ```
    /// use avl_ordered_set::avl_tree::AvlSet;
    ///
    /// let set = AvlSet::from_slice(&[3, 3, 1, 2, 1]);
    /// assert_eq!(set.len(), 3);
    /// ```
    pub fn from_slice(values: &[T]) -> Self {
        values.iter().cloned().collect()
    }
}

impl<T> Clone for AvlSet<T>
where
    T: Clone,
{
    fn clone(&self) -> Self {
        let mut nodes = Arena::with_capacity(self.len());
        let root = tree::copy(&self.nodes, &mut nodes, self.root, None);
        debug!("copied {} values into a new set", self.len());
        AvlSet {
            nodes,
            root,
            id: TreeId::fresh(),
        }
    }
}

impl<T> fmt::Debug for AvlSet<T>
where
    T: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<T> PartialEq for AvlSet<T>
where
    T: PartialEq,
{
    fn eq(&self, other: &AvlSet<T>) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<T> Eq for AvlSet<T> where T: Eq {}

impl<T> Default for AvlSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Extend<T> for AvlSet<T>
where
    T: Ord,
{
    fn extend<I>(&mut self, iter: I)
    where
        I: IntoIterator<Item = T>,
    {
        for value in iter {
            self.insert(value);
        }
    }
}

impl<'a, T> Extend<&'a T> for AvlSet<T>
where
    T: 'a + Ord + Copy,
{
    fn extend<I>(&mut self, iter: I)
    where
        I: IntoIterator<Item = &'a T>,
    {
        self.extend(iter.into_iter().cloned());
    }
}

impl<T> FromIterator<T> for AvlSet<T>
where
    T: Ord,
{
    fn from_iter<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = T>,
    {
        let mut set = AvlSet::new();
        set.extend(iter);
        set
    }
}

impl<T, const N: usize> From<[T; N]> for AvlSet<T>
where
    T: Ord,
{
    fn from(values: [T; N]) -> Self {
        Self::from_iter(values)
    }
}

impl<T> IntoIterator for AvlSet<T> {
    type Item = T;
    type IntoIter = AvlSetIntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        Self::IntoIter { set: self }
    }
}

impl<'a, T> IntoIterator for &'a AvlSet<T>
where
    T: 'a,
{
    type Item = &'a T;
    type IntoIter = AvlSetIter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// An owning iterator for `AvlSet<T>`.
///
/// This iterator traverses the elements of the set in-order and yields owned values.
pub struct AvlSetIntoIter<T> {
    set: AvlSet<T>,
}

impl<T> Iterator for AvlSetIntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        self.set.pop_min()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.set.len(), Some(self.set.len()))
    }
}

impl<T> DoubleEndedIterator for AvlSetIntoIter<T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.set.pop_max()
    }
}

impl<T> ExactSizeIterator for AvlSetIntoIter<T> {}

/// An iterator for `AvlSet<T>`.
///
/// This iterator traverses the elements of the set in-order and yields immutable references. It
/// moves between nodes through their child and parent links.
pub struct AvlSetIter<'a, T>
where
    T: 'a,
{
    nodes: &'a Nodes<T>,
    front: Option<NodeId>,
    back: Option<NodeId>,
    remaining: usize,
}

impl<'a, T> Iterator for AvlSetIter<'a, T>
where
    T: 'a,
{
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let id = self.front?;
        self.front = tree::successor(self.nodes, id);
        self.remaining -= 1;
        Some(&self.nodes[id].value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, T> DoubleEndedIterator for AvlSetIter<'a, T>
where
    T: 'a,
{
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let id = self.back?;
        self.back = tree::predecessor(self.nodes, id);
        self.remaining -= 1;
        Some(&self.nodes[id].value)
    }
}

impl<'a, T> ExactSizeIterator for AvlSetIter<'a, T> where T: 'a {}
