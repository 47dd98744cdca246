// Copyright 2026 the Tachisto Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Flat scene graph submitted to the renderer each frame.
//!
//! The scene graph is an arena of backend node payloads addressed by
//! generational [`NodeId`] handles, plus an explicit *draw order*: the list of
//! attached nodes, back to front. A node can live in the arena without being
//! attached, which is how the draw list detaches a node while its drawable
//! rewrites it and then re-appends it.
//!
//! The root transform maps stimulus coordinates to device pixels. It is owned
//! by the surface and recomputed on every resize.

use alloc::vec::Vec;
use core::fmt;

use kurbo::Affine;

/// A handle to a node in a [`SceneGraph`].
///
/// Carries a generation counter so handles to removed nodes are rejected once
/// the slot is reused.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId {
    pub(crate) idx: u32,
    pub(crate) generation: u32,
}

impl NodeId {
    /// Returns the raw slot index (for diagnostics only).
    #[inline]
    #[must_use]
    pub const fn index(self) -> u32 {
        self.idx
    }

    /// Returns the generation counter.
    #[inline]
    #[must_use]
    pub const fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({}@gen{})", self.idx, self.generation)
    }
}

#[derive(Debug)]
struct Slot<N> {
    generation: u32,
    node: Option<N>,
}

/// Arena of backend nodes plus their back-to-front draw order.
#[derive(Debug)]
pub struct SceneGraph<N> {
    slots: Vec<Slot<N>>,
    free_list: Vec<u32>,
    order: Vec<NodeId>,
    root_transform: Affine,
}

impl<N> Default for SceneGraph<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N> SceneGraph<N> {
    /// Creates an empty scene graph with an identity root transform.
    #[must_use]
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free_list: Vec::new(),
            order: Vec::new(),
            root_transform: Affine::IDENTITY,
        }
    }

    /// Stores `node` in the arena without attaching it to the draw order.
    pub fn insert(&mut self, node: N) -> NodeId {
        if let Some(idx) = self.free_list.pop() {
            let slot = &mut self.slots[idx as usize];
            slot.generation += 1;
            slot.node = Some(node);
            NodeId {
                idx,
                generation: slot.generation,
            }
        } else {
            let idx = u32::try_from(self.slots.len()).expect("scene graph slot count exceeds u32");
            self.slots.push(Slot {
                generation: 0,
                node: Some(node),
            });
            NodeId { idx, generation: 0 }
        }
    }

    /// Detaches and frees a node, returning its payload.
    ///
    /// Returns `None` for stale handles.
    pub fn remove(&mut self, id: NodeId) -> Option<N> {
        if !self.contains(id) {
            return None;
        }
        self.detach(id);
        self.free_list.push(id.idx);
        self.slots[id.idx as usize].node.take()
    }

    /// Whether `id` refers to a live node.
    #[must_use]
    pub fn contains(&self, id: NodeId) -> bool {
        self.slots
            .get(id.idx as usize)
            .is_some_and(|slot| slot.generation == id.generation && slot.node.is_some())
    }

    /// Returns the payload for `id`.
    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&N> {
        let slot = self.slots.get(id.idx as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.node.as_ref()
    }

    /// Returns the payload for `id` mutably.
    #[must_use]
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut N> {
        let slot = self.slots.get_mut(id.idx as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.node.as_mut()
    }

    /// Appends `id` at the front-most end of the draw order.
    ///
    /// Returns `false` if the handle is stale or the node is already attached.
    pub fn append(&mut self, id: NodeId) -> bool {
        if !self.contains(id) || self.is_attached(id) {
            return false;
        }
        self.order.push(id);
        true
    }

    /// Removes `id` from the draw order, keeping the payload in the arena.
    ///
    /// Returns `false` if it was not attached.
    pub fn detach(&mut self, id: NodeId) -> bool {
        match self.order.iter().position(|&n| n == id) {
            Some(pos) => {
                self.order.remove(pos);
                true
            }
            None => false,
        }
    }

    /// Whether `id` is currently in the draw order.
    #[must_use]
    pub fn is_attached(&self, id: NodeId) -> bool {
        self.order.contains(&id)
    }

    /// Attached nodes, back to front.
    #[must_use]
    pub fn draw_order(&self) -> &[NodeId] {
        &self.order
    }

    /// Iterates attached node payloads, back to front.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &N)> + '_ {
        self.order
            .iter()
            .filter_map(move |&id| self.get(id).map(|node| (id, node)))
    }

    /// Number of attached nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether no node is attached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Transform from stimulus coordinates to device pixels.
    #[must_use]
    pub fn root_transform(&self) -> Affine {
        self.root_transform
    }

    /// Replaces the root transform.
    pub fn set_root_transform(&mut self, transform: Affine) {
        self.root_transform = transform;
    }
}
