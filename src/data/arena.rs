//! The arena for syntax-tree nodes.
//!
//! One fixed-size block, taken from the global allocator up front.
//! Allocation bumps an offset; nothing is freed until the whole arena goes.
//!
//! Only `Copy` payloads go through the typed helpers:
//! the arena never runs destructors, so anything with a `Drop` would leak.
//!
//! References handed out by `alloc` and `alloc_slice_copy` borrow the arena,
//! and `release` consumes it; the borrow checker refuses a release while any
//! of them is still live.

use core::alloc::Layout;
use core::cell::Cell;
use core::ptr::NonNull;

/// Alignment of the backing block itself.
/// Requests for larger alignments are satisfied by padding inside the block.
const BLOCK_ALIGN: usize = 16;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ArenaError {
    #[error("arena capacity must be nonzero")]
    ZeroCapacity,
    #[error("could not obtain {capacity} bytes for arena")]
    Unavailable { capacity: usize },
    #[error("alignment {align} is not a power of two")]
    BadAlignment { align: usize },
    #[error("arena exhausted: requested {requested} bytes (align {align}), {remaining} remaining")]
    Exhausted {
        requested: usize,
        align: usize,
        remaining: usize,
    },
}

/// A bump-pointer arena over a single block of memory.
pub struct Arena {
    base: NonNull<u8>,
    layout: Layout,
    offset: Cell<usize>,
}

impl Arena {
    /// Obtain a block of `capacity` bytes.
    pub fn new(capacity: usize) -> Result<Self, ArenaError> {
        if capacity == 0 {
            return Err(ArenaError::ZeroCapacity);
        }
        let layout = Layout::from_size_align(capacity, BLOCK_ALIGN)
            .map_err(|_| ArenaError::Unavailable { capacity })?;
        // SAFETY: the layout has nonzero size.
        let ptr = unsafe { std::alloc::alloc(layout) };
        let base = NonNull::new(ptr).ok_or(ArenaError::Unavailable { capacity })?;
        tracing::debug!(capacity, "created arena");
        Ok(Arena {
            base,
            layout,
            offset: Cell::new(0),
        })
    }

    pub fn capacity(&self) -> usize {
        self.layout.size()
    }

    /// Bytes committed so far, including alignment padding.
    pub fn offset(&self) -> usize {
        self.offset.get()
    }

    pub fn remaining(&self) -> usize {
        self.capacity() - self.offset()
    }

    /// Reserve `size` bytes aligned to `align`.
    ///
    /// On failure the arena is left exactly as it was.
    ///
    /// The returned pointer is valid for reads and writes of `size` bytes until the
    /// arena is released. Nothing ties it to the arena's lifetime: prefer `alloc` and
    /// `alloc_slice_copy`, which do.
    pub fn allocate(&self, size: usize, align: usize) -> Result<NonNull<u8>, ArenaError> {
        if !align.is_power_of_two() {
            return Err(ArenaError::BadAlignment { align });
        }
        let offset = self.offset.get();
        let exhausted = || ArenaError::Exhausted {
            requested: size,
            align,
            remaining: self.capacity() - offset,
        };

        let addr = (self.base.as_ptr() as usize).wrapping_add(offset);
        let padding = addr.wrapping_neg() & (align - 1);
        let start = offset.checked_add(padding).ok_or_else(exhausted)?;
        let end = start
            .checked_add(size)
            .filter(|&end| end <= self.capacity())
            .ok_or_else(|| {
                tracing::debug!(size, align, offset, "arena allocation failed");
                exhausted()
            })?;

        self.offset.set(end);
        tracing::trace!(size, align, start, "arena allocation");
        // SAFETY: start <= end <= capacity, so the result stays inside (or one past) the block.
        Ok(unsafe { NonNull::new_unchecked(self.base.as_ptr().add(start)) })
    }

    /// Move `value` into the arena.
    pub fn alloc<T: Copy>(&self, value: T) -> Result<&mut T, ArenaError> {
        let layout = Layout::new::<T>();
        let ptr = self.allocate(layout.size(), layout.align())?.cast::<T>();
        // SAFETY: the region is fresh, sized and aligned for T, and exclusively ours.
        unsafe {
            ptr.as_ptr().write(value);
            Ok(&mut *ptr.as_ptr())
        }
    }

    /// Copy a slice into the arena.
    pub fn alloc_slice_copy<T: Copy>(&self, values: &[T]) -> Result<&mut [T], ArenaError> {
        let layout = Layout::for_value(values);
        let ptr = self.allocate(layout.size(), layout.align())?.cast::<T>();
        // SAFETY: as in `alloc`; the source slice cannot overlap a fresh region.
        unsafe {
            core::ptr::copy_nonoverlapping(values.as_ptr(), ptr.as_ptr(), values.len());
            Ok(core::slice::from_raw_parts_mut(ptr.as_ptr(), values.len()))
        }
    }

    /// Whether `[ptr, ptr + size)` lies inside this arena's block.
    pub fn contains(&self, ptr: NonNull<u8>, size: usize) -> bool {
        let base = self.base.as_ptr() as usize;
        let addr = ptr.as_ptr() as usize;
        addr >= base
            && addr
                .checked_add(size)
                .is_some_and(|end| end <= base + self.capacity())
    }

    /// Free the whole block.
    pub fn release(self) {
        tracing::debug!(
            capacity = self.capacity(),
            used = self.offset(),
            "releasing arena"
        );
        drop(self)
    }
}

impl Drop for Arena {
    fn drop(&mut self) {
        // SAFETY: base came from `alloc` with this layout, and drop runs once.
        unsafe { std::alloc::dealloc(self.base.as_ptr(), self.layout) }
    }
}

impl core::fmt::Debug for Arena {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Arena")
            .field("capacity", &self.capacity())
            .field("offset", &self.offset())
            .finish()
    }
}
