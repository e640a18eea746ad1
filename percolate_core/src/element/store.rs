// Copyright 2026 the Percolate Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Struct-of-arrays element storage with allocation, topology, and values.

use alloc::vec::Vec;

use crate::attr::{AttrKey, Attrs, Tag};
use crate::value::{Value, ValueStore};

use super::id::{ElementId, INVALID};
use super::traverse::Children;

/// Struct-of-arrays storage for the elements of one or more filters.
///
/// Elements are addressed by [`ElementId`] handles. Internally, each element
/// occupies a slot in parallel arrays. Destroyed elements are recycled via a
/// free list, and generation counters prevent stale handle access.
///
/// The tree does not notify anyone of mutations. Callers pair attribute and
/// child-list changes with the matching [`router`](crate::router) call.
#[derive(Debug, Default)]
pub struct ElementTree {
    // -- Topology --
    pub(crate) parent: Vec<u32>,
    pub(crate) first_child: Vec<u32>,
    pub(crate) last_child: Vec<u32>,
    pub(crate) next_sibling: Vec<u32>,
    pub(crate) prev_sibling: Vec<u32>,

    // -- Per-element data --
    pub(crate) tag: Vec<Tag>,
    pub(crate) values: Vec<ValueStore>,

    // -- Allocation --
    pub(crate) generation: Vec<u32>,
    pub(crate) free_list: Vec<u32>,
    pub(crate) len: u32,
}

impl ElementTree {
    /// Creates an empty tree.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // -- Allocation API --

    /// Creates a detached element and returns its handle.
    pub fn create_element(&mut self, tag: Tag) -> ElementId {
        let idx = if let Some(idx) = self.free_list.pop() {
            // Reuse a freed slot.
            self.generation[idx as usize] += 1;
            self.parent[idx as usize] = INVALID;
            self.first_child[idx as usize] = INVALID;
            self.last_child[idx as usize] = INVALID;
            self.next_sibling[idx as usize] = INVALID;
            self.prev_sibling[idx as usize] = INVALID;
            self.tag[idx as usize] = tag;
            self.values[idx as usize] = ValueStore::new();
            idx
        } else {
            let idx = self.len;
            self.len += 1;
            self.parent.push(INVALID);
            self.first_child.push(INVALID);
            self.last_child.push(INVALID);
            self.next_sibling.push(INVALID);
            self.prev_sibling.push(INVALID);
            self.tag.push(tag);
            self.values.push(ValueStore::new());
            self.generation.push(0);
            idx
        };

        ElementId {
            idx,
            generation: self.generation[idx as usize],
        }
    }

    /// Destroys an element, freeing its slot for reuse.
    ///
    /// # Panics
    ///
    /// Panics if the element has children (remove them first) or if the handle
    /// is stale.
    pub fn destroy_element(&mut self, id: ElementId) {
        self.validate(id);
        let idx = id.idx;
        assert!(
            self.first_child[idx as usize] == INVALID,
            "cannot destroy element with children"
        );

        if self.parent[idx as usize] != INVALID {
            self.unlink_from_parent(idx);
        }

        // Bump generation so old handles immediately fail validation.
        self.generation[idx as usize] += 1;
        self.values[idx as usize] = ValueStore::new();
        self.free_list.push(idx);
    }

    /// Returns whether the given handle refers to a live element.
    #[must_use]
    pub fn is_alive(&self, id: ElementId) -> bool {
        (id.idx < self.len)
            && self.generation[id.idx as usize] == id.generation
            && !self.free_list.contains(&id.idx)
    }

    // -- Topology API --

    /// Adds `child` as the last child of `parent`.
    ///
    /// # Panics
    ///
    /// Panics if either handle is stale, or if `child` already has a parent.
    pub fn append_child(&mut self, parent: ElementId, child: ElementId) {
        self.insert_before(parent, child, None);
    }

    /// Inserts `child` into `parent` ahead of `reference`, or last when
    /// `reference` is `None`.
    ///
    /// # Panics
    ///
    /// Panics if a handle is stale, `child` already has a parent, or
    /// `reference` is not a child of `parent`.
    pub fn insert_before(
        &mut self,
        parent: ElementId,
        child: ElementId,
        reference: Option<ElementId>,
    ) {
        self.validate(parent);
        self.validate(child);
        assert!(
            self.parent[child.idx as usize] == INVALID,
            "child already has a parent"
        );
        let next = match reference {
            Some(r) => {
                self.validate(r);
                assert!(
                    self.parent[r.idx as usize] == parent.idx,
                    "reference is not a child of parent"
                );
                r.idx
            }
            None => INVALID,
        };
        self.link(parent.idx, child.idx, next);
    }

    /// Removes `child` from its current parent.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale or the element has no parent.
    pub fn remove_from_parent(&mut self, child: ElementId) {
        self.validate(child);
        assert!(
            self.parent[child.idx as usize] != INVALID,
            "element has no parent"
        );
        self.unlink_from_parent(child.idx);
    }

    /// Returns the parent of an element, if any.
    #[must_use]
    pub fn parent(&self, id: ElementId) -> Option<ElementId> {
        self.validate(id);
        let p = self.parent[id.idx as usize];
        if p == INVALID {
            None
        } else {
            Some(ElementId {
                idx: p,
                generation: self.generation[p as usize],
            })
        }
    }

    /// Returns an iterator over the direct children of an element.
    #[must_use]
    pub fn children(&self, id: ElementId) -> Children<'_> {
        self.validate(id);
        Children::new(self, self.first_child[id.idx as usize])
    }

    /// Returns the first child of `id` whose tag satisfies `pred`.
    #[must_use]
    pub fn first_child_where(
        &self,
        id: ElementId,
        mut pred: impl FnMut(Tag) -> bool,
    ) -> Option<ElementId> {
        self.children(id).find(|c| pred(self.tag[c.idx as usize]))
    }

    /// Returns the nearest ancestor (or `id` itself) tagged [`Tag::Filter`].
    #[must_use]
    pub fn container_of(&self, id: ElementId) -> Option<ElementId> {
        let mut current = Some(id);
        while let Some(el) = current {
            if self.tag(el) == Tag::Filter {
                return Some(el);
            }
            current = self.parent(el);
        }
        None
    }

    // -- Data API --

    /// Returns the tag of an element.
    #[must_use]
    pub fn tag(&self, id: ElementId) -> Tag {
        self.validate(id);
        self.tag[id.idx as usize]
    }

    /// Returns the explicit attribute values of an element.
    #[must_use]
    pub fn values(&self, id: ElementId) -> &ValueStore {
        self.validate(id);
        &self.values[id.idx as usize]
    }

    /// Returns the explicit attribute values of an element for mutation.
    pub fn values_mut(&mut self, id: ElementId) -> &mut ValueStore {
        self.validate(id);
        &mut self.values[id.idx as usize]
    }

    /// Returns a defaults-aware view of an element's attributes.
    #[must_use]
    pub fn attrs(&self, id: ElementId) -> Attrs<'_> {
        self.validate(id);
        Attrs::new(self.tag[id.idx as usize], &self.values[id.idx as usize])
    }

    /// Sets an attribute explicitly. Shorthand for
    /// [`values_mut`](Self::values_mut)`.set_explicit`.
    pub fn set_attribute(&mut self, id: ElementId, key: AttrKey, value: impl Into<Value>) {
        self.values_mut(id).set_explicit(key, value);
    }

    /// Removes an explicitly set attribute so its default applies again.
    pub fn remove_attribute(&mut self, id: ElementId, key: AttrKey) -> Option<Value> {
        self.values_mut(id).remove(key)
    }

    // -- Internal helpers --

    /// Panics if the handle is stale.
    fn validate(&self, id: ElementId) {
        assert!(
            id.idx < self.len && self.generation[id.idx as usize] == id.generation,
            "stale ElementId: {id:?} (current gen: {})",
            if id.idx < self.len {
                self.generation[id.idx as usize]
            } else {
                u32::MAX
            }
        );
    }

    /// Splices `c` into `p`'s child list ahead of `next` (`INVALID` = at the
    /// end).
    fn link(&mut self, p: u32, c: u32, next: u32) {
        let prev = if next == INVALID {
            self.last_child[p as usize]
        } else {
            self.prev_sibling[next as usize]
        };
        self.parent[c as usize] = p;
        self.prev_sibling[c as usize] = prev;
        self.next_sibling[c as usize] = next;
        match prev {
            INVALID => self.first_child[p as usize] = c,
            prev => self.next_sibling[prev as usize] = c,
        }
        match next {
            INVALID => self.last_child[p as usize] = c,
            next => self.prev_sibling[next as usize] = c,
        }
    }

    /// Removes `c` from its parent's child list.
    fn unlink_from_parent(&mut self, c: u32) {
        let p = self.parent[c as usize];
        let prev = core::mem::replace(&mut self.prev_sibling[c as usize], INVALID);
        let next = core::mem::replace(&mut self.next_sibling[c as usize], INVALID);
        match prev {
            INVALID => self.first_child[p as usize] = next,
            prev => self.next_sibling[prev as usize] = next,
        }
        match next {
            INVALID => self.last_child[p as usize] = prev,
            next => self.prev_sibling[next as usize] = prev,
        }
        self.parent[c as usize] = INVALID;
    }
}
