//! Size cache
//!
//! Write-once map from object id to finalized descriptor. Entries can carry
//! a count of parents that still need them; once that reaches zero the
//! descriptor is dropped and only a tombstone remains, so duplicate
//! discoveries are still recognized as finalized.

use gix::ObjectId;
use rustc_hash::FxHashMap;

use crate::model::Descriptor;

#[derive(Debug)]
struct Slot {
    descriptor: Option<Descriptor>,
    /// Parents not yet finalized; `None` pins the entry for the whole scan
    remaining: Option<u32>,
}

#[derive(Debug, Default)]
pub struct SizeCache {
    slots: FxHashMap<ObjectId, Slot>,
    live: usize,
}

impl SizeCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Descriptor for `id`, if finalized and not yet released
    pub fn get(&self, id: &ObjectId) -> Option<&Descriptor> {
        self.slots.get(id).and_then(|s| s.descriptor.as_ref())
    }

    /// Whether `id` has been finalized, released or not
    pub fn is_finalized(&self, id: &ObjectId) -> bool {
        self.slots.contains_key(id)
    }

    /// Insert a descriptor; a second put for the same id is a no-op
    ///
    /// `references` is the number of parents that will consume the entry,
    /// or `None` to keep it until the scan ends. Returns whether the entry
    /// was inserted.
    pub fn put(&mut self, id: ObjectId, descriptor: Descriptor, references: Option<u32>) -> bool {
        if self.slots.contains_key(&id) {
            return false;
        }
        let descriptor = match references {
            // Nothing will ever ask for it
            Some(0) => None,
            _ => {
                self.live += 1;
                Some(descriptor)
            }
        };
        self.slots.insert(
            id,
            Slot {
                descriptor,
                remaining: references,
            },
        );
        true
    }

    /// Record that one referencing parent has been finalized
    pub fn consume(&mut self, id: &ObjectId) {
        let Some(slot) = self.slots.get_mut(id) else {
            return;
        };
        if let Some(remaining) = slot.remaining.as_mut() {
            *remaining = remaining.saturating_sub(1);
            if *remaining == 0 {
                self.release(id);
            }
        }
    }

    /// Drop the descriptor for `id`, keeping it marked as finalized
    pub fn release(&mut self, id: &ObjectId) {
        if let Some(slot) = self.slots.get_mut(id) {
            if slot.descriptor.take().is_some() {
                self.live -= 1;
            }
        }
    }

    /// Number of descriptors currently held
    pub fn live(&self) -> usize {
        self.live
    }

    /// Number of finalized ids, including released ones
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}
