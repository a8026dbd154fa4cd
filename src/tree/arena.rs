//! Sparse-set control storage with generational ids.
//!
//! Nodes live in a dense vector for cache-friendly traversal; a sparse
//! table maps stable [`ControlId`]s to dense slots. Freeing a slot bumps
//! its generation, so ids held across a removal resolve to `None` instead
//! of aliasing whatever control reused the slot. Dense removal is
//! swap-remove with a sparse fixup for the moved node.

use smallvec::SmallVec;

use crate::control::Control;
use crate::widgets::Behavior;

/// Stable identifier for a control in the tree.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct ControlId {
    index: u32,
    generation: u32,
}

impl ControlId {
    fn new(index: u32, generation: u32) -> Self {
        ControlId { index, generation }
    }
}

struct SparseEntry {
    dense_index: usize,
    generation: u32,
}

/// One tree node: the engine-owned control state, the widget behavior,
/// links, and the ordered child views with their deferred-mutation queues.
pub(crate) struct Node {
    pub(crate) control: Control,
    pub(crate) behavior: Box<dyn Behavior>,
    pub(crate) parent: Option<ControlId>,
    /// Children in insertion order; the source the views derive from.
    pub(crate) children: SmallVec<[ControlId; 8]>,
    /// Children by descending update order (input priority first).
    pub(crate) update_list: SmallVec<[ControlId; 8]>,
    /// Children by ascending draw order (back to front).
    pub(crate) draw_list: SmallVec<[ControlId; 8]>,
    /// Adds requested while `iterating`; drained before removes.
    pub(crate) pending_adds: Vec<ControlId>,
    pub(crate) pending_removes: Vec<ControlId>,
    /// Set for the span of any traversal over this node's children.
    pub(crate) iterating: bool,
    sparse_index: u32,
}

pub(crate) struct Arena {
    dense: Vec<Node>,
    sparse: Vec<Option<SparseEntry>>,
    free_indices: Vec<u32>,
}

impl Arena {
    pub(crate) fn new() -> Self {
        Arena {
            dense: Vec::new(),
            sparse: Vec::new(),
            free_indices: Vec::new(),
        }
    }

    pub(crate) fn register(&mut self, control: Control, behavior: Box<dyn Behavior>) -> ControlId {
        let (sparse_index, generation) = match self.free_indices.pop() {
            // Reused slots keep counting generations from where the last
            // occupant left off.
            Some(index) => {
                let next_generation = self.retired_generation(index).wrapping_add(1);
                (index, next_generation)
            }
            None => {
                let index = self.sparse.len() as u32;
                self.sparse.push(None);
                (index, 0)
            }
        };

        let dense_index = self.dense.len();
        self.dense.push(Node {
            control,
            behavior,
            parent: None,
            children: SmallVec::new(),
            update_list: SmallVec::new(),
            draw_list: SmallVec::new(),
            pending_adds: Vec::new(),
            pending_removes: Vec::new(),
            iterating: false,
            sparse_index,
        });
        self.sparse[sparse_index as usize] = Some(SparseEntry {
            dense_index,
            generation,
        });

        ControlId::new(sparse_index, generation)
    }

    /// Removes a node, returning it so the caller can finish teardown
    /// (release hooks, surface retirement) after the indices are fixed up.
    pub(crate) fn unregister(&mut self, id: ControlId) -> Option<Node> {
        let dense_index = self.dense_index(id)?;

        let last = self.dense.len() - 1;
        let removed = self.dense.swap_remove(dense_index);

        // The node that filled the hole needs its sparse entry repointed.
        if dense_index != last {
            let moved_sparse = self.dense[dense_index].sparse_index;
            if let Some(entry) = self.sparse[moved_sparse as usize].as_mut() {
                entry.dense_index = dense_index;
            }
        }

        self.sparse[id.index as usize] = Some(SparseEntry {
            dense_index: usize::MAX,
            generation: id.generation,
        });
        self.free_indices.push(id.index);

        Some(removed)
    }

    pub(crate) fn get(&self, id: ControlId) -> Option<&Node> {
        self.dense_index(id).map(|index| &self.dense[index])
    }

    pub(crate) fn get_mut(&mut self, id: ControlId) -> Option<&mut Node> {
        self.dense_index(id).map(|index| &mut self.dense[index])
    }

    pub(crate) fn contains(&self, id: ControlId) -> bool {
        self.dense_index(id).is_some()
    }

    pub(crate) fn len(&self) -> usize {
        self.dense.len()
    }

    fn dense_index(&self, id: ControlId) -> Option<usize> {
        self.sparse
            .get(id.index as usize)
            .and_then(|entry| entry.as_ref())
            .filter(|entry| entry.generation == id.generation && entry.dense_index != usize::MAX)
            .map(|entry| entry.dense_index)
    }

    /// Generation of a freed slot, kept in its tombstone entry.
    fn retired_generation(&self, index: u32) -> u32 {
        self.sparse[index as usize]
            .as_ref()
            .map(|entry| entry.generation)
            .unwrap_or(0)
    }
}
