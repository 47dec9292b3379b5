//! Generation-checked handle table for objects owned across the C boundary.
//!
//! A handle packs a slot index (high 32 bits) and the slot's generation (low
//! 32 bits). Removing an object bumps the generation, so a stale or doubly
//! destroyed handle resolves to nothing instead of to whatever reused the slot.

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Handle {
    slot: u32,
    generation: u32,
}

impl Handle {
    fn pack(self) -> u64 {
        (u64::from(self.slot) << 32) | u64::from(self.generation)
    }

    fn unpack(raw: u64) -> Self {
        Self {
            slot: (raw >> 32) as u32,
            generation: raw as u32,
        }
    }
}

struct Entry<T> {
    generation: u32,
    value: Option<T>,
}

/// Slot table mapping packed `u64` handles to owned values.
pub(crate) struct HandleTable<T> {
    entries: Vec<Entry<T>>,
    vacant: Vec<u32>,
}

impl<T> HandleTable<T> {
    /// An empty table, usable in a `static`.
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
            vacant: Vec::new(),
        }
    }

    /// Store `value`, reusing a vacant slot when one exists.
    pub fn insert(&mut self, value: T) -> u64 {
        let handle = match self.vacant.pop() {
            Some(slot) => {
                let entry = &mut self.entries[slot as usize];
                entry.value = Some(value);
                Handle {
                    slot,
                    generation: entry.generation,
                }
            }
            None => {
                let slot = u32::try_from(self.entries.len()).expect("fewer than 2^32 live handles");
                self.entries.push(Entry {
                    generation: 0,
                    value: Some(value),
                });
                Handle {
                    slot,
                    generation: 0,
                }
            }
        };
        handle.pack()
    }

    fn entry(&self, raw: u64) -> Option<&Entry<T>> {
        let handle = Handle::unpack(raw);
        self.entries
            .get(handle.slot as usize)
            .filter(|e| e.generation == handle.generation)
    }

    /// The value behind `raw`, if the handle is live.
    pub fn get(&self, raw: u64) -> Option<&T> {
        self.entry(raw)?.value.as_ref()
    }

    /// Mutable access to the value behind `raw`, if the handle is live.
    pub fn get_mut(&mut self, raw: u64) -> Option<&mut T> {
        let handle = Handle::unpack(raw);
        self.entries
            .get_mut(handle.slot as usize)
            .filter(|e| e.generation == handle.generation)?
            .value
            .as_mut()
    }

    /// Take the value out and invalidate `raw`.
    ///
    /// A slot whose generation wraps to 0 is retired for good so that handles
    /// from its first generation can never resolve again.
    pub fn remove(&mut self, raw: u64) -> Option<T> {
        let handle = Handle::unpack(raw);
        let entry = self
            .entries
            .get_mut(handle.slot as usize)
            .filter(|e| e.generation == handle.generation)?;
        let value = entry.value.take()?;
        entry.generation = entry.generation.wrapping_add(1);
        if entry.generation != 0 {
            self.vacant.push(handle.slot);
        }
        Some(value)
    }

    /// Number of live values.
    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries.iter().filter(|e| e.value.is_some()).count()
    }
}
