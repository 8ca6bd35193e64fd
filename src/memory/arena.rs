//! Linear (bump) arena over a pre-sized byte buffer
//!
//! Allocations are contiguous, never move and are never freed one by one;
//! `clear` releases everything at once by rewinding the cursor. Typed
//! allocations are restricted to `Pod` payloads, which have no destructors,
//! so rewinding can never leak a resource.

use std::marker::PhantomData;
use std::ops::Range;

use bytemuck::{Pod, Zeroable};

/// Alignment guaranteed for the start of the backing buffer
pub const ARENA_ALIGN: usize = 16;

/// Backing storage unit; keeps the buffer start 16-byte aligned
#[repr(C, align(16))]
#[derive(Clone, Copy, Pod, Zeroable)]
struct Chunk([u8; ARENA_ALIGN]);

/// A raw byte region handed out by [`Arena::push_size`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArenaSpan {
    pub offset: usize,
    pub len: usize,
}

impl ArenaSpan {
    #[inline]
    pub fn range(&self) -> Range<usize> {
        self.offset..self.offset + self.len
    }

    /// Whether two spans share at least one byte
    pub fn overlaps(&self, other: &ArenaSpan) -> bool {
        self.len > 0
            && other.len > 0
            && self.offset < other.offset + other.len
            && other.offset < self.offset + self.len
    }
}

/// Typed reference to a single value placed in an arena.
///
/// Only meaningful for the arena that produced it, and only until that
/// arena is cleared.
pub struct ArenaRef<T> {
    offset: usize,
    _marker: PhantomData<fn() -> T>,
}

impl<T> ArenaRef<T> {
    /// Rebuild a reference from an offset previously returned by `offset()`
    pub(crate) fn from_offset(offset: usize) -> Self {
        Self {
            offset,
            _marker: PhantomData,
        }
    }

    #[inline]
    pub fn offset(&self) -> usize {
        self.offset
    }
}

impl<T> Clone for ArenaRef<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for ArenaRef<T> {}

impl<T> PartialEq for ArenaRef<T> {
    fn eq(&self, other: &Self) -> bool {
        self.offset == other.offset
    }
}

impl<T> Eq for ArenaRef<T> {}

impl<T> std::fmt::Debug for ArenaRef<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ArenaRef<{}>({})", std::any::type_name::<T>(), self.offset)
    }
}

/// Typed reference to a contiguous array placed in an arena
pub struct ArenaSlice<T> {
    offset: usize,
    len: usize,
    _marker: PhantomData<fn() -> T>,
}

impl<T> ArenaSlice<T> {
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl<T> Clone for ArenaSlice<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for ArenaSlice<T> {}

impl<T> std::fmt::Debug for ArenaSlice<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "ArenaSlice<{}>({}..+{})",
            std::any::type_name::<T>(),
            self.offset,
            self.len
        )
    }
}

/// Bump allocator over a fixed-capacity buffer
pub struct Arena {
    chunks: Vec<Chunk>,
    capacity: usize,
    used: usize,
}

impl Arena {
    /// Create an arena able to hold exactly `capacity` bytes
    pub fn new(capacity: usize) -> Self {
        let chunk_count = capacity.div_ceil(ARENA_ALIGN);
        Self {
            chunks: vec![Chunk::zeroed(); chunk_count],
            capacity,
            used: 0,
        }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    pub fn used(&self) -> usize {
        self.used
    }

    #[inline]
    pub fn remaining(&self) -> usize {
        self.capacity - self.used
    }

    fn bytes(&self) -> &[u8] {
        &bytemuck::cast_slice::<Chunk, u8>(&self.chunks)[..self.capacity]
    }

    fn bytes_mut(&mut self) -> &mut [u8] {
        let capacity = self.capacity;
        &mut bytemuck::cast_slice_mut::<Chunk, u8>(&mut self.chunks)[..capacity]
    }

    /// Reserve `len` bytes at `offset`, advancing the cursor past them.
    ///
    /// Running out of space is a programming error, not a recoverable one.
    fn reserve(&mut self, offset: usize, len: usize) {
        let end = offset.checked_add(len);
        assert!(
            matches!(end, Some(end) if end <= self.capacity),
            "arena overflow: {} bytes requested at offset {} with capacity {}",
            len,
            offset,
            self.capacity
        );
        self.used = offset + len;
    }

    /// Reserve `len` raw bytes with no alignment padding
    pub fn push_size(&mut self, len: usize) -> ArenaSpan {
        let offset = self.used;
        self.reserve(offset, len);
        ArenaSpan { offset, len }
    }

    /// Bytes of a span returned by `push_size`
    pub fn span(&self, span: ArenaSpan) -> &[u8] {
        &self.bytes()[span.range()]
    }

    pub fn span_mut(&mut self, span: ArenaSpan) -> &mut [u8] {
        &mut self.bytes_mut()[span.range()]
    }

    fn aligned_cursor<T>(&self) -> usize {
        let align = std::mem::align_of::<T>();
        assert!(
            align <= ARENA_ALIGN,
            "arena cannot satisfy alignment {} of {}",
            align,
            std::any::type_name::<T>()
        );
        self.used.next_multiple_of(align)
    }

    /// Place a single value into the arena
    pub fn push<T: Pod>(&mut self, value: T) -> ArenaRef<T> {
        let offset = self.aligned_cursor::<T>();
        let size = std::mem::size_of::<T>();
        self.reserve(offset, size);
        self.bytes_mut()[offset..offset + size].copy_from_slice(bytemuck::bytes_of(&value));
        ArenaRef::from_offset(offset)
    }

    /// Place `len` zero-initialized values contiguously
    pub fn push_array<T: Pod>(&mut self, len: usize) -> ArenaSlice<T> {
        let offset = self.aligned_cursor::<T>();
        let Some(size) = std::mem::size_of::<T>().checked_mul(len) else {
            panic!(
                "arena overflow: {} x {} does not fit in usize",
                len,
                std::any::type_name::<T>()
            );
        };
        self.reserve(offset, size);
        self.bytes_mut()[offset..offset + size].fill(0);
        ArenaSlice {
            offset,
            len,
            _marker: PhantomData,
        }
    }

    pub fn get<T: Pod>(&self, at: ArenaRef<T>) -> &T {
        let size = std::mem::size_of::<T>();
        bytemuck::from_bytes(&self.bytes()[at.offset..at.offset + size])
    }

    pub fn get_mut<T: Pod>(&mut self, at: ArenaRef<T>) -> &mut T {
        let size = std::mem::size_of::<T>();
        bytemuck::from_bytes_mut(&mut self.bytes_mut()[at.offset..at.offset + size])
    }

    pub fn slice<T: Pod>(&self, at: ArenaSlice<T>) -> &[T] {
        let size = std::mem::size_of::<T>() * at.len;
        bytemuck::cast_slice(&self.bytes()[at.offset..at.offset + size])
    }

    pub fn slice_mut<T: Pod>(&mut self, at: ArenaSlice<T>) -> &mut [T] {
        let size = std::mem::size_of::<T>() * at.len;
        bytemuck::cast_slice_mut(&mut self.bytes_mut()[at.offset..at.offset + size])
    }

    /// Release every allocation at once. Outstanding references become stale.
    pub fn clear(&mut self) {
        self.used = 0;
    }
}

impl std::fmt::Debug for Arena {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Arena")
            .field("capacity", &self.capacity)
            .field("used", &self.used)
            .finish()
    }
}
