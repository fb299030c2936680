//! Stable node identities.
//!
//! Every AST node gets a `NodeId` when the tree is built. Rewrite passes
//! consume one owned tree and produce another, so pointer identity is
//! meaningless across passes; cross-reference tables are keyed by `NodeId`
//! instead. In-place edits (renaming a symbol) keep the id, and synthesized
//! nodes draw fresh ids from the tree's [`NodeIdGen`].

use std::fmt;

/// Identity of an AST node, unique within one [`Ast`](crate::ast::Ast).
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct NodeId(u32);

impl NodeId {
    /// Create a new `NodeId`.
    #[inline]
    pub const fn new(raw: u32) -> Self {
        NodeId(raw)
    }

    /// Get the raw u32 value.
    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({})", self.0)
    }
}

/// Monotonic `NodeId` allocator owned by the tree.
#[derive(Clone, Debug, Default)]
pub struct NodeIdGen {
    next: u32,
}

impl NodeIdGen {
    pub fn new() -> Self {
        NodeIdGen { next: 0 }
    }

    /// Allocate the next id.
    ///
    /// # Panics
    /// Panics after `u32::MAX` allocations.
    #[inline]
    pub fn fresh(&mut self) -> NodeId {
        let id = NodeId(self.next);
        self.next = self
            .next
            .checked_add(1)
            .unwrap_or_else(|| panic!("node id space exhausted"));
        id
    }

    /// Number of ids handed out so far.
    pub fn issued(&self) -> u32 {
        self.next
    }
}
