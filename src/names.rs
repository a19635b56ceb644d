//! Node name table.
//!
//! Assigns dense `u32` ids in declaration order so the scheduler's hot sets
//! and maps become plain array indexing. Building a problem is two passes:
//! every node name is declared first, then input references (which may point
//! forward in the spec) are resolved against the full table. Unlike a
//! generic string interner, declaring a name twice is an error, not a
//! unification: two nodes with the same name are always a malformed problem.

use rustc_hash::FxHashMap;

/// Dense node id (u32 for compact storage and fast hashing).
pub type NodeId = u32;

/// Bidirectional name/id table for one problem's operators.
#[derive(Debug, Clone, Default)]
pub struct NameTable {
    ids: FxHashMap<String, NodeId>,
    names: Vec<String>,
}

impl NameTable {
    /// Create a table with pre-allocated capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            ids: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
            names: Vec::with_capacity(capacity),
        }
    }

    /// Declare a new node name, assigning the next dense id.
    /// Returns `None` when the name is already taken.
    pub fn declare(&mut self, name: &str) -> Option<NodeId> {
        use std::collections::hash_map::Entry;
        match self.ids.entry(name.to_string()) {
            Entry::Occupied(_) => None,
            Entry::Vacant(slot) => {
                let id = self.names.len() as NodeId;
                slot.insert(id);
                self.names.push(name.to_string());
                Some(id)
            }
        }
    }

    /// Resolve a name reference against the declared set.
    #[inline]
    pub fn lookup(&self, name: &str) -> Option<NodeId> {
        self.ids.get(name).copied()
    }

    /// The name behind an id. Ids are only ever issued by [`declare`], so
    /// any id held by the scheduler indexes a declared name.
    ///
    /// [`declare`]: NameTable::declare
    #[inline]
    pub fn name(&self, id: NodeId) -> &str {
        &self.names[id as usize]
    }

    /// Number of declared names.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
