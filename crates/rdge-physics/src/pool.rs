// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

//! Chunked, generation-checked object pools.
//!
//! Every long-lived simulation object (bodies, fixtures, contacts, tree nodes)
//! lives in a [`Pool`]. A pool is a single size class: it stores one `T` per
//! slot, grows by a fixed number of slots when it runs out, and recycles freed
//! slots LIFO. Storage never shrinks, so a steady-state simulation stops
//! touching the global allocator once its pools have warmed up.
//!
//! Callers never see addresses. [`Pool::allocate`] returns a [`Handle`] that
//! pairs the slot index with the slot's generation; freeing bumps the
//! generation so stale handles stop resolving instead of aliasing whatever
//! reuses the slot.

use core::cmp::Ordering;
use core::fmt;
use core::hash::{Hash, Hasher};
use core::marker::PhantomData;
use core::ops::{Index, IndexMut};

/// Slots added each time a pool runs out of room.
pub const DEFAULT_CHUNK_ELEMENTS: usize = 128;

/// Typed, generation-checked reference to a value stored in a [`Pool<T>`].
pub struct Handle<T> {
    index: u32,
    generation: u32,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Handle<T> {
    const fn new(index: u32, generation: u32) -> Self {
        Self { index, generation, _marker: PhantomData }
    }

    /// Slot index inside the owning pool.
    pub const fn index(self) -> u32 {
        self.index
    }

    /// Generation the slot had when this handle was issued.
    pub const fn generation(self) -> u32 {
        self.generation
    }

    /// A handle no pool will ever resolve.
    #[cfg(test)]
    pub(crate) const fn dangling() -> Self {
        Self::new(u32::MAX, u32::MAX)
    }
}

// Manual impls so `T` needs no bounds.
impl<T> Clone for Handle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Handle<T> {}

impl<T> PartialEq for Handle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index && self.generation == other.generation
    }
}

impl<T> Eq for Handle<T> {}

impl<T> PartialOrd for Handle<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Handle<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.index, self.generation).cmp(&(other.index, other.generation))
    }
}

impl<T> Hash for Handle<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.index.hash(state);
        self.generation.hash(state);
    }
}

impl<T> fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handle({}v{})", self.index, self.generation)
    }
}

struct Slot<T> {
    generation: u32,
    value: Option<T>,
}

/// Occupancy snapshot of a pool.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct PoolStats {
    /// Values currently allocated.
    pub live: usize,
    /// Slots reserved so far (live + free + never used).
    pub capacity: usize,
    /// Number of chunk growths performed.
    pub chunks: usize,
    /// Slots waiting on the free list.
    pub free: usize,
}

/// Fixed-chunk object pool handing out [`Handle`]s.
pub struct Pool<T> {
    slots: Vec<Slot<T>>,
    free: Vec<u32>,
    live: usize,
    chunk: usize,
    chunks: usize,
}

impl<T> Default for Pool<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Pool<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pool").field("stats", &self.stats()).finish()
    }
}

impl<T> Pool<T> {
    /// Creates an empty pool that grows by [`DEFAULT_CHUNK_ELEMENTS`].
    pub fn new() -> Self {
        Self::with_chunk_size(DEFAULT_CHUNK_ELEMENTS)
    }

    /// Creates an empty pool that grows by `chunk` slots at a time.
    ///
    /// # Panics
    /// Panics if `chunk` is zero.
    pub fn with_chunk_size(chunk: usize) -> Self {
        assert!(chunk > 0, "pool chunk size must be non-zero");
        Self { slots: Vec::new(), free: Vec::new(), live: 0, chunk, chunks: 0 }
    }

    /// Stores `value` and returns its handle.
    pub fn allocate(&mut self, value: T) -> Handle<T> {
        self.live += 1;
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            debug_assert!(slot.value.is_none(), "free list pointed at a live slot");
            slot.value = Some(value);
            return Handle::new(index, slot.generation);
        }
        if self.slots.len() == self.slots.capacity() {
            self.slots.reserve_exact(self.chunk);
            self.chunks += 1;
        }
        let index = u32::try_from(self.slots.len()).unwrap_or(u32::MAX);
        debug_assert!(index < u32::MAX, "pool index space exhausted");
        self.slots.push(Slot { generation: 0, value: Some(value) });
        Handle::new(index, 0)
    }

    /// Releases the value behind `handle`.
    ///
    /// Returns `None` for a stale or foreign handle; the pool is left untouched
    /// in that case.
    pub fn free(&mut self, handle: Handle<T>) -> Option<T> {
        let slot = self.slots.get_mut(handle.index as usize)?;
        if slot.generation != handle.generation {
            return None;
        }
        let value = slot.value.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(handle.index);
        self.live -= 1;
        Some(value)
    }

    /// Returns `true` if `handle` refers to a live value.
    pub fn contains(&self, handle: Handle<T>) -> bool {
        self.get(handle).is_some()
    }

    /// Shared access to the value behind `handle`.
    pub fn get(&self, handle: Handle<T>) -> Option<&T> {
        self.slots
            .get(handle.index as usize)
            .filter(|slot| slot.generation == handle.generation)
            .and_then(|slot| slot.value.as_ref())
    }

    /// Exclusive access to the value behind `handle`.
    pub fn get_mut(&mut self, handle: Handle<T>) -> Option<&mut T> {
        self.slots
            .get_mut(handle.index as usize)
            .filter(|slot| slot.generation == handle.generation)
            .and_then(|slot| slot.value.as_mut())
    }

    /// Number of live values.
    pub const fn len(&self) -> usize {
        self.live
    }

    /// Returns `true` when no values are live.
    pub const fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Slots reserved so far.
    pub fn capacity(&self) -> usize {
        self.slots.capacity()
    }

    /// Occupancy snapshot.
    pub fn stats(&self) -> PoolStats {
        PoolStats {
            live: self.live,
            capacity: self.slots.capacity(),
            chunks: self.chunks,
            free: self.free.len(),
        }
    }

    /// Iterates live values in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (Handle<T>, &T)> + '_ {
        self.slots.iter().enumerate().filter_map(|(i, slot)| {
            slot.value.as_ref().map(|v| (Handle::new(slot_index(i), slot.generation), v))
        })
    }

    /// Iterates live values mutably in slot order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (Handle<T>, &mut T)> + '_ {
        self.slots.iter_mut().enumerate().filter_map(|(i, slot)| {
            let generation = slot.generation;
            slot.value.as_mut().map(|v| (Handle::new(slot_index(i), generation), v))
        })
    }

    /// Collects the handles of all live values in slot order.
    ///
    /// Useful when the caller needs to mutate the pool while walking it.
    pub fn handles(&self) -> Vec<Handle<T>> {
        self.iter().map(|(h, _)| h).collect()
    }
}

impl<T> Index<Handle<T>> for Pool<T> {
    type Output = T;

    /// # Panics
    /// Panics if `handle` is stale or foreign.
    fn index(&self, handle: Handle<T>) -> &T {
        match self.get(handle) {
            Some(value) => value,
            None => stale_handle(handle),
        }
    }
}

impl<T> IndexMut<Handle<T>> for Pool<T> {
    /// # Panics
    /// Panics if `handle` is stale or foreign.
    fn index_mut(&mut self, handle: Handle<T>) -> &mut T {
        match self.get_mut(handle) {
            Some(value) => value,
            None => stale_handle(handle),
        }
    }
}

#[cold]
#[track_caller]
#[allow(clippy::panic)]
fn stale_handle<T>(handle: Handle<T>) -> ! {
    panic!("stale or foreign pool handle: {handle:?}")
}

#[allow(clippy::cast_possible_truncation)]
const fn slot_index(i: usize) -> u32 {
    // Slot indices are issued from `u32` in `allocate`.
    i as u32
}
