use std::cell::RefCell;
use std::collections::HashMap;
use std::iter::FusedIterator;

use unitwork_core_types::EntityId;

use crate::entity::EntityRef;
use crate::errors::{Result, UowError};

/// Registry of the entity instances enlisted in one unit of work
///
/// Slots are append-only: an id keeps its slot index for as long as it is
/// enlisted, disenlisting leaves a permanent tombstone, and indices are never
/// reused. Enumerations therefore hold a plain cursor into the slot list and
/// stay valid across `disenlist` calls made while they are in progress.
///
/// Not thread-safe; all methods take `&self` and the state lives behind a
/// `RefCell` so that an enumeration and a mutation can interleave on one
/// thread.
#[derive(Debug, Default)]
pub struct EnlistedEntityRegistry {
    state: RefCell<Slots>,
}

#[derive(Debug, Default)]
struct Slots {
    /// Live handle or tombstone, in enlistment order
    entries: Vec<Option<EntityRef>>,
    /// Slot index of every currently enlisted id
    index: HashMap<EntityId, usize>,
    live: usize,
}

impl EnlistedEntityRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty registry with room for `capacity` entities
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            state: RefCell::new(Slots {
                entries: Vec::with_capacity(capacity),
                index: HashMap::with_capacity(capacity),
                live: 0,
            }),
        }
    }

    /// Number of currently enlisted entities
    pub fn count(&self) -> usize {
        self.state.borrow().live
    }

    /// Number of slots ever assigned, tombstones included
    pub fn slot_count(&self) -> usize {
        self.state.borrow().entries.len()
    }

    /// Number of slots left empty by disenlistment
    pub fn tombstone_count(&self) -> usize {
        let state = self.state.borrow();
        state.entries.len() - state.live
    }

    /// Lazily enumerate the enlisted entities in enlistment order
    ///
    /// Each call starts a fresh, independent traversal over the slots that
    /// exist at the time of the call. Entities disenlisted before the cursor
    /// reaches them are skipped.
    pub fn enumerate(&self) -> EnlistedEntities<'_> {
        EnlistedEntities {
            registry: self,
            cursor: 0,
            end: self.slot_count(),
        }
    }

    /// Get the enlisted instance for `id`
    pub fn lookup(&self, id: &EntityId) -> Option<EntityRef> {
        let state = self.state.borrow();
        state
            .index
            .get(id)
            .and_then(|&slot| state.entries[slot].clone())
    }

    /// Check whether any instance is enlisted for `id`
    pub fn contains_id(&self, id: &EntityId) -> bool {
        self.state.borrow().index.contains_key(id)
    }

    /// Check whether this exact instance is the one enlisted for its id
    pub fn is_enlisted(&self, entity: &EntityRef) -> bool {
        self.lookup(entity.id())
            .is_some_and(|enlisted| enlisted.ptr_eq(entity))
    }

    /// Enlist an entity instance
    ///
    /// Only the entity's id is read, so this is safe to call while the entity
    /// is still being constructed.
    ///
    /// Returns `true` if a new slot was assigned and `false` if this instance
    /// was already enlisted.
    ///
    /// # Errors
    ///
    /// Returns `EntityConflict` if a different instance is enlisted under the
    /// same id. The registry is left unchanged.
    pub fn enlist(&self, entity: &EntityRef) -> Result<bool> {
        let id = entity.id().clone();
        let mut state = self.state.borrow_mut();

        if let Some(&slot) = state.index.get(&id) {
            return match &state.entries[slot] {
                Some(existing) if existing.ptr_eq(entity) => Ok(false),
                Some(_) => Err(UowError::EntityConflict { entity_id: id }),
                None => Err(UowError::Internal {
                    message: format!("index points at tombstoned slot {} for {}", slot, id),
                }),
            };
        }

        let slot = state.entries.len();
        state.entries.push(Some(entity.clone()));
        state.index.insert(id.clone(), slot);
        state.live += 1;
        tracing::debug!(entity_id = %id, slot, "enlisted");
        Ok(true)
    }

    /// Disenlist an entity instance, tombstoning its slot
    ///
    /// The id becomes free again: a new instance with the same id can be
    /// enlisted afterwards and receives a new slot.
    ///
    /// # Errors
    ///
    /// Returns `NotEnlisted` if no instance is enlisted for the id or the
    /// enlisted instance is a different one.
    pub fn disenlist(&self, entity: &EntityRef) -> Result<()> {
        let id = entity.id();
        let mut state = self.state.borrow_mut();

        let slot = match state.index.get(id) {
            Some(&slot) if state.entries[slot].as_ref().is_some_and(|e| e.ptr_eq(entity)) => slot,
            _ => {
                return Err(UowError::NotEnlisted {
                    entity_id: id.clone(),
                })
            }
        };

        state.entries[slot] = None;
        state.index.remove(id);
        state.live -= 1;
        tracing::debug!(entity_id = %id, slot, "disenlisted");
        Ok(())
    }

    fn entry_from(&self, cursor: usize, end: usize) -> Option<(usize, EntityRef)> {
        let state = self.state.borrow();
        let end = end.min(state.entries.len());
        (cursor..end).find_map(|slot| state.entries[slot].clone().map(|e| (slot, e)))
    }
}

/// Lazy enumeration over the live slots of an [`EnlistedEntityRegistry`]
///
/// The registry is re-borrowed on every step, so entities may be disenlisted
/// (or enlisted) between steps.
#[derive(Debug)]
pub struct EnlistedEntities<'a> {
    registry: &'a EnlistedEntityRegistry,
    cursor: usize,
    end: usize,
}

impl Iterator for EnlistedEntities<'_> {
    type Item = EntityRef;

    fn next(&mut self) -> Option<Self::Item> {
        match self.registry.entry_from(self.cursor, self.end) {
            Some((slot, entity)) => {
                self.cursor = slot + 1;
                Some(entity)
            }
            None => {
                self.cursor = self.end;
                None
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.end.saturating_sub(self.cursor)))
    }
}

impl FusedIterator for EnlistedEntities<'_> {}
