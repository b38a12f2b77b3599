//! A bounded window over caller-owned storage.
//!
//! The storage is fixed; the window `[begin, end)` within it is the live part.
//! A producer appends at `end`, a consumer takes from `begin`,
//! and neither can move past `capacity`.
//! Once the window is drained, the owner `reset`s it to reuse the storage
//! for the next batch.

#[derive(Debug)]
pub struct BoundedBuffer<'a, T> {
    data: &'a mut [T],
    begin: u32,
    end: u32,
}

impl<'a, T> BoundedBuffer<'a, T> {
    /// An empty window over `data`.
    ///
    /// Offsets are 32-bit: storage past `u32::MAX` slots is left unused.
    pub fn new(data: &'a mut [T]) -> Self {
        let capacity = data.len().min(u32::MAX as usize);
        BoundedBuffer {
            data: &mut data[..capacity],
            begin: 0,
            end: 0,
        }
    }

    pub fn capacity(&self) -> u32 {
        // Clamped in `new`.
        self.data.len() as u32
    }

    pub fn begin(&self) -> u32 {
        self.begin
    }

    pub fn end(&self) -> u32 {
        self.end
    }

    /// Number of live elements.
    pub fn len(&self) -> u32 {
        self.end - self.begin
    }

    pub fn is_empty(&self) -> bool {
        self.begin == self.end
    }

    /// Free slots past `end`.
    pub fn remaining(&self) -> u32 {
        self.capacity() - self.end
    }

    pub fn is_full(&self) -> bool {
        self.end == self.capacity()
    }

    /// The live elements.
    pub fn active(&self) -> &[T] {
        &self.data[self.begin as usize..self.end as usize]
    }

    /// Append at `end`. Hands the value back if there is no room.
    pub fn push(&mut self, value: T) -> Result<(), T> {
        match self.data.get_mut(self.end as usize) {
            Some(slot) => {
                *slot = value;
                self.end += 1;
                Ok(())
            }
            None => Err(value),
        }
    }

    /// Drop up to `n` elements from the front; returns how many went.
    pub fn consume(&mut self, n: u32) -> u32 {
        let n = n.min(self.len());
        self.begin += n;
        n
    }

    /// Start a fresh, empty window at the front of the storage.
    pub fn reset(&mut self) {
        self.begin = 0;
        self.end = 0;
    }
}

impl<T: Copy> BoundedBuffer<'_, T> {
    /// Take the element at `begin`.
    pub fn pop_front(&mut self) -> Option<T> {
        let value = *self.active().first()?;
        self.begin += 1;
        Some(value)
    }
}
