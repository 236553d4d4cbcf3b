use crate::arena::{Arena, NodeId};
use crate::avl_tree::node::Node;
use log::trace;
use std::borrow::Borrow;
use std::cmp::{self, Ordering};

pub type Nodes<T> = Arena<Node<T>>;

pub fn size<T>(nodes: &Nodes<T>, tree: Option<NodeId>) -> usize {
    match tree {
        None => 0,
        Some(id) => nodes[id].size,
    }
}

pub fn height<T>(nodes: &Nodes<T>, tree: Option<NodeId>) -> usize {
    match tree {
        None => 0,
        Some(id) => nodes[id].height,
    }
}

fn update<T>(nodes: &mut Nodes<T>, id: NodeId) {
    let (left, right) = (nodes[id].left, nodes[id].right);
    let size = size(nodes, left) + size(nodes, right) + 1;
    let height = cmp::max(height(nodes, left), height(nodes, right)) + 1;
    let node = &mut nodes[id];
    node.size = size;
    node.height = height;
}

fn balance_factor<T>(nodes: &Nodes<T>, id: NodeId) -> isize {
    let node = &nodes[id];
    height(nodes, node.right) as isize - height(nodes, node.left) as isize
}

fn rotate_left<T>(nodes: &mut Nodes<T>, id: NodeId) -> NodeId {
    let parent = nodes[id].parent;
    let child = match nodes[id].right {
        Some(child) => child,
        None => unreachable!(),
    };
    let inner = nodes[child].left;
    nodes[id].right = inner;
    if let Some(inner) = inner {
        nodes[inner].parent = Some(id);
    }
    nodes[child].left = Some(id);
    nodes[id].parent = Some(child);
    update(nodes, id);
    update(nodes, child);
    nodes[child].parent = parent;
    trace!("rotated {:?} left under {:?}", id, child);
    child
}

fn rotate_right<T>(nodes: &mut Nodes<T>, id: NodeId) -> NodeId {
    let parent = nodes[id].parent;
    let child = match nodes[id].left {
        Some(child) => child,
        None => unreachable!(),
    };
    let inner = nodes[child].right;
    nodes[id].left = inner;
    if let Some(inner) = inner {
        nodes[inner].parent = Some(id);
    }
    nodes[child].right = Some(id);
    nodes[id].parent = Some(child);
    update(nodes, id);
    update(nodes, child);
    nodes[child].parent = parent;
    trace!("rotated {:?} right under {:?}", id, child);
    child
}

/// Refreshes the caches of `id` and restores the AVL property at it, returning the new local root.
/// The subtrees of `id` must already be balanced.
pub fn balance<T>(nodes: &mut Nodes<T>, id: NodeId) -> NodeId {
    update(nodes, id);

    match balance_factor(nodes, id) {
        2 => {
            if let Some(child) = nodes[id].right {
                if balance_factor(nodes, child) < 0 {
                    let child = rotate_right(nodes, child);
                    nodes[id].right = Some(child);
                }
            }
            rotate_left(nodes, id)
        },
        -2 => {
            if let Some(child) = nodes[id].left {
                if balance_factor(nodes, child) > 0 {
                    let child = rotate_left(nodes, child);
                    nodes[id].left = Some(child);
                }
            }
            rotate_right(nodes, id)
        },
        _ => id,
    }
}

/// Inserts `value` into the subtree rooted at `tree`, whose parent is `parent`. Returns the new
/// subtree root and whether a node was added; an equal value already present is left in place.
pub fn insert<T>(
    nodes: &mut Nodes<T>,
    tree: Option<NodeId>,
    parent: Option<NodeId>,
    value: T,
) -> (NodeId, bool)
where
    T: Ord,
{
    let id = match tree {
        Some(id) => id,
        None => return (nodes.allocate(Node::new(value, parent)), true),
    };

    let inserted = match value.cmp(&nodes[id].value) {
        Ordering::Less => {
            let left = nodes[id].left;
            let (child, inserted) = insert(nodes, left, Some(id), value);
            nodes[id].left = Some(child);
            inserted
        },
        Ordering::Greater => {
            let right = nodes[id].right;
            let (child, inserted) = insert(nodes, right, Some(id), value);
            nodes[id].right = Some(child);
            inserted
        },
        Ordering::Equal => false,
    };

    if !inserted {
        return (id, false);
    }
    (balance(nodes, id), true)
}

// detaches the minimum node of a non-empty subtree; returns the remaining subtree and the minimum
pub fn remove_min<T>(nodes: &mut Nodes<T>, id: NodeId) -> (Option<NodeId>, NodeId) {
    match nodes[id].left {
        Some(left) => {
            let (rest, min) = remove_min(nodes, left);
            nodes[id].left = rest;
            (Some(balance(nodes, id)), min)
        },
        None => {
            let right = nodes[id].right.take();
            if let Some(right) = right {
                nodes[right].parent = nodes[id].parent;
            }
            (right, id)
        },
    }
}

// detaches the maximum node of a non-empty subtree; returns the remaining subtree and the maximum
pub fn remove_max<T>(nodes: &mut Nodes<T>, id: NodeId) -> (Option<NodeId>, NodeId) {
    match nodes[id].right {
        Some(right) => {
            let (rest, max) = remove_max(nodes, right);
            nodes[id].right = rest;
            (Some(balance(nodes, id)), max)
        },
        None => {
            let left = nodes[id].left.take();
            if let Some(left) = left {
                nodes[left].parent = nodes[id].parent;
            }
            (left, id)
        },
    }
}

fn combine_subtrees<T>(
    nodes: &mut Nodes<T>,
    left: NodeId,
    right: NodeId,
    parent: Option<NodeId>,
) -> NodeId {
    let (rest, new_root) = remove_min(nodes, right);
    nodes[left].parent = Some(new_root);
    if let Some(rest) = rest {
        nodes[rest].parent = Some(new_root);
    }
    let node = &mut nodes[new_root];
    node.left = Some(left);
    node.right = rest;
    node.parent = parent;
    new_root
}

/// Removes the value equal to `key` from the subtree rooted at `tree`. Returns the new subtree root
/// and the removed value, or the untouched subtree and `None` if no such value exists.
pub fn remove<T, V>(
    nodes: &mut Nodes<T>,
    tree: Option<NodeId>,
    key: &V,
) -> (Option<NodeId>, Option<T>)
where
    T: Borrow<V>,
    V: Ord + ?Sized,
{
    let id = match tree {
        Some(id) => id,
        None => return (None, None),
    };

    let ret = match key.cmp(nodes[id].value.borrow()) {
        Ordering::Less => {
            let left = nodes[id].left;
            let (child, ret) = remove(nodes, left, key);
            nodes[id].left = child;
            ret
        },
        Ordering::Greater => {
            let right = nodes[id].right;
            let (child, ret) = remove(nodes, right, key);
            nodes[id].right = child;
            ret
        },
        Ordering::Equal => {
            let Node { value, left, right, parent, .. } = nodes.free(id);
            trace!("freed {:?}", id);
            let replacement = match (left, right) {
                (None, None) => None,
                (Some(child), None) | (None, Some(child)) => {
                    nodes[child].parent = parent;
                    Some(child)
                },
                (Some(left), Some(right)) => Some(combine_subtrees(nodes, left, right, parent)),
            };
            return (replacement.map(|root| balance(nodes, root)), Some(value));
        },
    };

    match ret {
        Some(_) => (Some(balance(nodes, id)), ret),
        None => (Some(id), None),
    }
}

/// Copies the subtree rooted at `tree` from `src` into `dst`, hanging it below `parent`.
pub fn copy<T>(
    src: &Nodes<T>,
    dst: &mut Nodes<T>,
    tree: Option<NodeId>,
    parent: Option<NodeId>,
) -> Option<NodeId>
where
    T: Clone,
{
    tree.map(|id| {
        let node = &src[id];
        let new_id = dst.allocate(Node {
            value: node.value.clone(),
            size: node.size,
            height: node.height,
            left: None,
            right: None,
            parent,
        });
        let left = copy(src, dst, node.left, Some(new_id));
        let right = copy(src, dst, node.right, Some(new_id));
        let new_node = &mut dst[new_id];
        new_node.left = left;
        new_node.right = right;
        new_id
    })
}

/// Frees every node of the subtree rooted at `tree`.
pub fn free_subtree<T>(nodes: &mut Nodes<T>, tree: Option<NodeId>) {
    if let Some(id) = tree {
        let node = nodes.free(id);
        free_subtree(nodes, node.left);
        free_subtree(nodes, node.right);
    }
}

pub fn min<T>(nodes: &Nodes<T>, tree: Option<NodeId>) -> Option<NodeId> {
    let mut curr = tree?;
    while let Some(left) = nodes[curr].left {
        curr = left;
    }
    Some(curr)
}

pub fn max<T>(nodes: &Nodes<T>, tree: Option<NodeId>) -> Option<NodeId> {
    let mut curr = tree?;
    while let Some(right) = nodes[curr].right {
        curr = right;
    }
    Some(curr)
}

/// Returns the in-order successor of `id` by walking child and parent links.
pub fn successor<T>(nodes: &Nodes<T>, id: NodeId) -> Option<NodeId> {
    if let Some(right) = nodes[id].right {
        return min(nodes, Some(right));
    }
    let mut curr = id;
    while let Some(parent) = nodes[curr].parent {
        if nodes[parent].left == Some(curr) {
            return Some(parent);
        }
        curr = parent;
    }
    None
}

/// Returns the in-order predecessor of `id` by walking child and parent links.
pub fn predecessor<T>(nodes: &Nodes<T>, id: NodeId) -> Option<NodeId> {
    if let Some(left) = nodes[id].left {
        return max(nodes, Some(left));
    }
    let mut curr = id;
    while let Some(parent) = nodes[curr].parent {
        if nodes[parent].right == Some(curr) {
            return Some(parent);
        }
        curr = parent;
    }
    None
}

pub fn find<T, V>(nodes: &Nodes<T>, tree: Option<NodeId>, key: &V) -> Option<NodeId>
where
    T: Borrow<V>,
    V: Ord + ?Sized,
{
    let mut curr = tree;
    while let Some(id) = curr {
        match key.cmp(nodes[id].value.borrow()) {
            Ordering::Less => curr = nodes[id].left,
            Ordering::Greater => curr = nodes[id].right,
            Ordering::Equal => return Some(id),
        }
    }
    None
}

/// Returns the smallest node not less than `key`.
pub fn lower_bound<T, V>(nodes: &Nodes<T>, tree: Option<NodeId>, key: &V) -> Option<NodeId>
where
    T: Borrow<V>,
    V: Ord + ?Sized,
{
    let mut curr = tree;
    let mut last_left_turn = None;
    while let Some(id) = curr {
        match key.cmp(nodes[id].value.borrow()) {
            Ordering::Less => {
                last_left_turn = Some(id);
                curr = nodes[id].left;
            },
            Ordering::Greater => curr = nodes[id].right,
            Ordering::Equal => return Some(id),
        }
    }
    last_left_turn
}

/// Returns the smallest node strictly greater than `key`.
pub fn upper_bound<T, V>(nodes: &Nodes<T>, tree: Option<NodeId>, key: &V) -> Option<NodeId>
where
    T: Borrow<V>,
    V: Ord + ?Sized,
{
    let mut curr = tree;
    let mut last_left_turn = None;
    while let Some(id) = curr {
        match key.cmp(nodes[id].value.borrow()) {
            Ordering::Less => {
                last_left_turn = Some(id);
                curr = nodes[id].left;
            },
            Ordering::Greater | Ordering::Equal => curr = nodes[id].right,
        }
    }
    last_left_turn
}

/// Returns the largest node not greater than `key`.
pub fn floor<T, V>(nodes: &Nodes<T>, tree: Option<NodeId>, key: &V) -> Option<NodeId>
where
    T: Borrow<V>,
    V: Ord + ?Sized,
{
    let mut curr = tree;
    let mut last_right_turn = None;
    while let Some(id) = curr {
        match key.cmp(nodes[id].value.borrow()) {
            Ordering::Less => curr = nodes[id].left,
            Ordering::Greater => {
                last_right_turn = Some(id);
                curr = nodes[id].right;
            },
            Ordering::Equal => return Some(id),
        }
    }
    last_right_turn
}

/// Returns the number of values in the subtree strictly less than `key`.
pub fn rank<T, V>(nodes: &Nodes<T>, tree: Option<NodeId>, key: &V) -> usize
where
    T: Borrow<V>,
    V: Ord + ?Sized,
{
    let mut curr = tree;
    let mut ret = 0;
    while let Some(id) = curr {
        let node = &nodes[id];
        match key.cmp(node.value.borrow()) {
            Ordering::Less => curr = node.left,
            Ordering::Greater => {
                ret += size(nodes, node.left) + 1;
                curr = node.right;
            },
            Ordering::Equal => return ret + size(nodes, node.left),
        }
    }
    ret
}

/// Returns the node holding the `index`-th smallest value of the subtree, counting from zero.
pub fn select<T>(nodes: &Nodes<T>, tree: Option<NodeId>, mut index: usize) -> Option<NodeId> {
    let mut curr = tree;
    while let Some(id) = curr {
        let node = &nodes[id];
        let left_size = size(nodes, node.left);
        match index.cmp(&left_size) {
            Ordering::Less => curr = node.left,
            Ordering::Equal => return Some(id),
            Ordering::Greater => {
                index -= left_size + 1;
                curr = node.right;
            },
        }
    }
    None
}

/// Verifies ordering, balance, cached sizes and heights, and parent links of the whole tree.
pub fn check<T>(nodes: &Nodes<T>, tree: Option<NodeId>) -> Result<(), String>
where
    T: Ord,
{
    if let Some(id) = tree {
        if nodes[id].parent.is_some() {
            return Err(format!("root {:?} has a parent", id));
        }
    }
    check_subtree(nodes, tree, None, None).map(|_| ())
}

// returns the (size, height) of the subtree
fn check_subtree<T>(
    nodes: &Nodes<T>,
    tree: Option<NodeId>,
    lower: Option<&T>,
    upper: Option<&T>,
) -> Result<(usize, usize), String>
where
    T: Ord,
{
    let id = match tree {
        Some(id) => id,
        None => return Ok((0, 0)),
    };
    let node = match nodes.get(id) {
        Some(node) => node,
        None => return Err(format!("{:?} is not a live node", id)),
    };

    if lower.map_or(false, |lower| *lower >= node.value)
        || upper.map_or(false, |upper| node.value >= *upper)
    {
        return Err(format!("{:?} is out of order", id));
    }
    for child in node.left.iter().chain(node.right.iter()) {
        if nodes.get(*child).and_then(|child| child.parent) != Some(id) {
            return Err(format!("{:?} does not point back to its parent {:?}", child, id));
        }
    }

    let (left_size, left_height) = check_subtree(nodes, node.left, lower, Some(&node.value))?;
    let (right_size, right_height) = check_subtree(nodes, node.right, Some(&node.value), upper)?;

    let size = left_size + right_size + 1;
    let height = cmp::max(left_height, right_height) + 1;
    if node.size != size {
        return Err(format!("{:?} caches size {} instead of {}", id, node.size, size));
    }
    if node.height != height {
        return Err(format!("{:?} caches height {} instead of {}", id, node.height, height));
    }
    if (right_height as isize - left_height as isize).abs() > 1 {
        return Err(format!("{:?} is unbalanced", id));
    }
    Ok((size, height))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(values: &[u32]) -> (Nodes<u32>, Option<NodeId>) {
        let mut nodes = Arena::new();
        let mut root = None;
        for value in values {
            root = Some(insert(&mut nodes, root, None, *value).0);
        }
        (nodes, root)
    }

    fn values(nodes: &Nodes<u32>, root: Option<NodeId>) -> Vec<u32> {
        let mut ret = Vec::new();
        let mut curr = min(nodes, root);
        while let Some(id) = curr {
            ret.push(nodes[id].value);
            curr = successor(nodes, id);
        }
        ret
    }

    #[test]
    fn test_rotate_left() {
        let (mut nodes, root) = build(&[1]);
        let root = root.unwrap();
        let right = nodes.allocate(Node::new(2, Some(root)));
        nodes[root].right = Some(right);
        update(&mut nodes, root);

        let new_root = rotate_left(&mut nodes, root);
        assert_eq!(new_root, right);
        assert_eq!(nodes[right].parent, None);
        assert_eq!(nodes[right].left, Some(root));
        assert_eq!(nodes[root].parent, Some(right));
        assert_eq!(nodes[right].size, 2);
        assert_eq!(nodes[right].height, 2);
        assert_eq!(check(&nodes, Some(new_root)), Ok(()));
    }

    #[test]
    fn test_ascending_inserts_rotate() {
        let (nodes, root) = build(&[1, 2, 3]);
        let root = root.unwrap();
        assert_eq!(nodes[root].value, 2);
        assert_eq!(nodes[root].height, 2);
        assert_eq!(check(&nodes, Some(root)), Ok(()));
    }

    #[test]
    fn test_double_rotation() {
        let (nodes, root) = build(&[3, 1, 2]);
        let root = root.unwrap();
        assert_eq!(nodes[root].value, 2);
        assert_eq!(check(&nodes, Some(root)), Ok(()));

        let (nodes, root) = build(&[1, 3, 2]);
        assert_eq!(nodes[root.unwrap()].value, 2);
        assert_eq!(check(&nodes, root), Ok(()));
    }

    #[test]
    fn test_insert_duplicate() {
        let (mut nodes, root) = build(&[1, 2, 3]);
        let (new_root, inserted) = insert(&mut nodes, root, None, 2);
        assert!(!inserted);
        assert_eq!(Some(new_root), root);
        assert_eq!(nodes.len(), 3);
    }

    #[test]
    fn test_remove_two_children_splices_successor() {
        let (mut nodes, root) = build(&[2, 1, 4, 3, 5]);
        let successor = find(&nodes, root, &3).unwrap();

        let (root, removed) = remove(&mut nodes, root, &2);
        assert_eq!(removed, Some(2));
        assert_eq!(root, Some(successor));
        assert_eq!(nodes[successor].parent, None);
        assert_eq!(values(&nodes, root), vec![1, 3, 4, 5]);
        assert_eq!(check(&nodes, root), Ok(()));
    }

    #[test]
    fn test_remove_absent() {
        let (mut nodes, root) = build(&[1, 2, 3]);
        let (new_root, removed) = remove(&mut nodes, root, &4);
        assert_eq!(removed, None);
        assert_eq!(new_root, root);
        assert_eq!(nodes.len(), 3);
    }

    #[test]
    fn test_remove_min_relinks_right_child() {
        let (mut nodes, root) = build(&[2, 1, 3, 4]);
        let (rest, min) = remove_min(&mut nodes, root.unwrap());
        assert_eq!(nodes.free(min).value, 1);
        assert_eq!(values(&nodes, rest), vec![2, 3, 4]);
        assert_eq!(check(&nodes, rest), Ok(()));
    }

    #[test]
    fn test_copy() {
        let (nodes, root) = build(&[4, 2, 6, 1, 3, 5, 7]);
        let mut dst = Arena::new();
        let copied = copy(&nodes, &mut dst, root, None);
        assert_eq!(values(&dst, copied), vec![1, 2, 3, 4, 5, 6, 7]);
        assert_eq!(check(&dst, copied), Ok(()));
    }

    #[test]
    fn test_free_subtree() {
        let (mut nodes, root) = build(&[4, 2, 6, 1, 3]);
        free_subtree(&mut nodes, root);
        assert!(nodes.is_empty());
    }

    #[test]
    fn test_bounds() {
        let (nodes, root) = build(&[10, 20, 30]);
        let value = |id: Option<NodeId>| id.map(|id| nodes[id].value);

        assert_eq!(value(lower_bound(&nodes, root, &15)), Some(20));
        assert_eq!(value(lower_bound(&nodes, root, &20)), Some(20));
        assert_eq!(value(lower_bound(&nodes, root, &31)), None);
        assert_eq!(value(upper_bound(&nodes, root, &20)), Some(30));
        assert_eq!(value(upper_bound(&nodes, root, &30)), None);
        assert_eq!(value(floor(&nodes, root, &15)), Some(10));
        assert_eq!(value(floor(&nodes, root, &5)), None);
    }

    #[test]
    fn test_rank_select() {
        let (nodes, root) = build(&[10, 20, 30, 40, 50]);
        assert_eq!(rank(&nodes, root, &5), 0);
        assert_eq!(rank(&nodes, root, &30), 2);
        assert_eq!(rank(&nodes, root, &35), 3);
        assert_eq!(rank(&nodes, root, &60), 5);

        for (index, expected) in [10, 20, 30, 40, 50].iter().enumerate() {
            assert_eq!(select(&nodes, root, index).map(|id| nodes[id].value), Some(*expected));
        }
        assert_eq!(select(&nodes, root, 5), None);
    }

    #[test]
    fn test_check_detects_bad_cache() {
        let (mut nodes, root) = build(&[1, 2, 3]);
        nodes[root.unwrap()].size = 7;
        assert!(check(&nodes, root).is_err());
    }
}
