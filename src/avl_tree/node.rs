use crate::arena::NodeId;

/// A struct representing an internal node of an avl tree.
pub struct Node<T> {
    pub value: T,
    pub size: usize,
    pub height: usize,
    pub left: Option<NodeId>,
    pub right: Option<NodeId>,
    pub parent: Option<NodeId>,
}

impl<T> Node<T> {
    pub fn new(value: T, parent: Option<NodeId>) -> Self {
        Node {
            value,
            size: 1,
            height: 1,
            left: None,
            right: None,
            parent,
        }
    }
}
