// Copyright 2026 the Tachisto Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Drawables, their draw order, and the per-frame scene rebuild.
//!
//! A [`Drawable`] is any stimulus that can describe itself as a backend node
//! and knows when that node is stale. Drawables are shared with the caller
//! (`Rc<RefCell<_>>`) so that experiment code can keep changing their
//! attributes; the draw list only holds another reference.
//!
//! # Refresh
//!
//! [`DrawList::refresh`] walks the list front to back. Every drawable that
//! needs an update and already has a realized node goes through the same
//! three steps:
//!
//! 1. its node is detached from the scene graph,
//! 2. [`Drawable::update_if_needed`] rewrites the node payload,
//! 3. the node is appended back at the front-most end of the draw order.
//!
//! Updated nodes therefore end up in front of untouched ones, in their
//! original relative order, while untouched nodes keep their relative order.
//! Dirty drawables without a node are skipped.

use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::RefCell;
use core::fmt;

use crate::scene::{NodeId, SceneGraph};

/// A stimulus taking part in the scene graph.
///
/// `N` is the renderer's node payload type.
pub trait Drawable<N> {
    /// Whether the node payload is stale.
    fn needs_update(&self) -> bool;

    /// Flags the node payload as stale.
    fn set_needs_update(&mut self);

    /// Builds the initial node payload.
    ///
    /// Returning `None` means the drawable cannot be realized yet; it stays in
    /// the draw list without a node until [`DrawList::realize`] succeeds.
    fn realize(&mut self) -> Option<N>;

    /// Rewrites `node` if [`needs_update`](Self::needs_update) is set, then
    /// clears the flag.
    fn update_if_needed(&mut self, node: &mut N);

    /// Forces a complete rebuild on the next update.
    ///
    /// Called for every drawable on a full refresh. The default simply flags
    /// the node as stale.
    fn refresh(&mut self) {
        self.set_needs_update();
    }
}

/// A drawable shared between the caller and the draw list.
pub type SharedDrawable<N> = Rc<RefCell<dyn Drawable<N>>>;

/// A handle to an entry of a [`DrawList`].
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct DrawableId {
    idx: u32,
    generation: u32,
}

impl fmt::Debug for DrawableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DrawableId({}@gen{})", self.idx, self.generation)
    }
}

struct Entry<N> {
    drawable: SharedDrawable<N>,
    node: Option<NodeId>,
}

/// Counts reported by [`DrawList::refresh`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RefreshStats {
    /// Drawables whose node was rebuilt and re-appended.
    pub updated: usize,
    /// Dirty drawables skipped because they have no node yet.
    pub skipped: usize,
}

/// Ordered drawables plus the scene graph built from them.
pub struct DrawList<N> {
    slots: Vec<Option<Entry<N>>>,
    generations: Vec<u32>,
    free_list: Vec<u32>,
    /// Slot indices in insertion order.
    order: Vec<u32>,
    scene: SceneGraph<N>,
}

impl<N> fmt::Debug for DrawList<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DrawList")
            .field("len", &self.order.len())
            .field("attached_nodes", &self.scene.len())
            .finish_non_exhaustive()
    }
}

impl<N> Default for DrawList<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N> DrawList<N> {
    /// Creates an empty draw list with an empty scene graph.
    #[must_use]
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            generations: Vec::new(),
            free_list: Vec::new(),
            order: Vec::new(),
            scene: SceneGraph::new(),
        }
    }

    /// Appends `drawable` to the draw order.
    ///
    /// A drawable already in the list is not added twice; its existing handle
    /// is returned. The drawable is realized right away if it can be, and its
    /// node is appended to the scene graph.
    pub fn add(&mut self, drawable: SharedDrawable<N>) -> DrawableId {
        if let Some(id) = self.find(&drawable) {
            return id;
        }

        let idx = if let Some(idx) = self.free_list.pop() {
            self.generations[idx as usize] += 1;
            idx
        } else {
            let idx = u32::try_from(self.slots.len()).expect("draw list slot count exceeds u32");
            self.slots.push(None);
            self.generations.push(0);
            idx
        };
        self.slots[idx as usize] = Some(Entry {
            drawable,
            node: None,
        });
        self.order.push(idx);

        let id = DrawableId {
            idx,
            generation: self.generations[idx as usize],
        };
        self.realize(id);
        id
    }

    /// Realizes the drawable's node if it has none yet.
    ///
    /// Returns whether the drawable has a node afterwards.
    pub fn realize(&mut self, id: DrawableId) -> bool {
        let Some(entry) = self.entry_mut(id) else {
            return false;
        };
        if entry.node.is_some() {
            return true;
        }
        let Some(payload) = entry.drawable.borrow_mut().realize() else {
            return false;
        };
        let node = self.scene.insert(payload);
        self.scene.append(node);
        if let Some(entry) = self.entry_mut(id) {
            entry.node = Some(node);
        }
        true
    }

    /// Removes a drawable and frees its node.
    ///
    /// Returns `false` for stale handles.
    pub fn remove(&mut self, id: DrawableId) -> bool {
        if self.entry_mut(id).is_none() {
            return false;
        }
        if let Some(entry) = self.slots[id.idx as usize].take()
            && let Some(node) = entry.node
        {
            self.scene.remove(node);
        }
        self.order.retain(|&idx| idx != id.idx);
        self.free_list.push(id.idx);
        true
    }

    /// Whether `id` refers to a drawable in the list.
    #[must_use]
    pub fn contains(&self, id: DrawableId) -> bool {
        self.entry(id).is_some()
    }

    /// Returns the handle of `drawable` if it is in the list.
    #[must_use]
    pub fn find(&self, drawable: &SharedDrawable<N>) -> Option<DrawableId> {
        let target = Rc::as_ptr(drawable).cast::<()>();
        self.order.iter().find_map(|&idx| {
            let entry = self.slots[idx as usize].as_ref()?;
            (Rc::as_ptr(&entry.drawable).cast::<()>() == target).then(|| DrawableId {
                idx,
                generation: self.generations[idx as usize],
            })
        })
    }

    /// The scene node realized for `id`, if any.
    #[must_use]
    pub fn node_of(&self, id: DrawableId) -> Option<NodeId> {
        self.entry(id)?.node
    }

    /// Drawables in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (DrawableId, &SharedDrawable<N>)> + '_ {
        self.order.iter().filter_map(move |&idx| {
            let entry = self.slots[idx as usize].as_ref()?;
            let id = DrawableId {
                idx,
                generation: self.generations[idx as usize],
            };
            Some((id, &entry.drawable))
        })
    }

    /// Number of drawables.
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether the list is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// The scene graph built from the realized drawables.
    #[must_use]
    pub fn scene(&self) -> &SceneGraph<N> {
        &self.scene
    }

    /// The scene graph, mutably.
    pub fn scene_mut(&mut self) -> &mut SceneGraph<N> {
        &mut self.scene
    }

    /// Flags every drawable as needing an update.
    pub fn mark_all_needs_update(&mut self) {
        for (_, drawable) in self.iter() {
            drawable.borrow_mut().set_needs_update();
        }
    }

    /// Calls [`Drawable::refresh`] on every drawable.
    pub fn refresh_all(&mut self) {
        for (_, drawable) in self.iter() {
            drawable.borrow_mut().refresh();
        }
    }

    /// Rebuilds the nodes of dirty drawables, moving them to the front of the
    /// draw order.
    pub fn refresh(&mut self) -> RefreshStats {
        let mut stats = RefreshStats::default();
        for &idx in &self.order {
            let Some(entry) = self.slots[idx as usize].as_ref() else {
                continue;
            };
            let mut drawable = entry.drawable.borrow_mut();
            if !drawable.needs_update() {
                continue;
            }
            let Some(node) = entry.node else {
                stats.skipped += 1;
                continue;
            };

            self.scene.detach(node);
            if let Some(payload) = self.scene.get_mut(node) {
                drawable.update_if_needed(payload);
            }
            self.scene.append(node);
            stats.updated += 1;
        }
        stats
    }

    fn entry(&self, id: DrawableId) -> Option<&Entry<N>> {
        if self.generations.get(id.idx as usize) != Some(&id.generation) {
            return None;
        }
        self.slots[id.idx as usize].as_ref()
    }

    fn entry_mut(&mut self, id: DrawableId) -> Option<&mut Entry<N>> {
        if self.generations.get(id.idx as usize) != Some(&id.generation) {
            return None;
        }
        self.slots[id.idx as usize].as_mut()
    }
}
