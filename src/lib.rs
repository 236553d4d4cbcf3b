//! An ordered set backed by an avl tree whose nodes live in an index-addressed arena.
//!
//! Nodes link to their parents, so `avl_tree::Cursor` can step forwards and backwards through the
//! set without auxiliary storage, and every node caches its subtree size for order statistics.

pub mod arena;
pub mod avl_tree;
