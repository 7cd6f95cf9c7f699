//! Growable typed buffer for per-frame vertex accumulation.
//!
//! Tracks its own logical capacity so growth is predictable: the first
//! allocation holds `max(4, count)` records, later growth doubles until
//! the new length fits. If the doubled allocation fails the buffer
//! retries with an exact fit, and if that fails too the append returns
//! [`BufferError`] with the existing contents untouched.

use bytemuck::Pod;
use thiserror::Error;

/// Capacity of the first allocation, unless the first append is larger.
pub const MIN_CAPACITY: usize = 4;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferError {
    #[error("failed to grow buffer of {record_size}-byte records to {requested} records")]
    Alloc { requested: usize, record_size: usize },

    #[error("buffer length overflow: {len} + {additional} records")]
    Overflow { len: usize, additional: usize },
}

#[derive(Clone, Debug)]
pub struct GrowableBuffer<T> {
    data: Vec<T>,
    capacity: usize,
}

impl<T> Default for GrowableBuffer<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> GrowableBuffer<T> {
    pub const fn new() -> Self {
        Self {
            data: Vec::new(),
            capacity: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Logical capacity in records.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Drop the contents, keeping the allocation.
    pub fn clear(&mut self) {
        self.data.clear();
    }

    /// Free storage and reset length and capacity to zero.
    pub fn release(&mut self) {
        self.data = Vec::new();
        self.capacity = 0;
    }

    /// Make room for `additional` more records without further growth.
    pub fn reserve(&mut self, additional: usize) -> Result<(), BufferError> {
        let needed = self.data.len().checked_add(additional).ok_or(BufferError::Overflow {
            len: self.data.len(),
            additional,
        })?;
        self.grow_to(needed)
    }

    fn grow_to(&mut self, needed: usize) -> Result<(), BufferError> {
        if needed <= self.capacity {
            return Ok(());
        }

        let target = if self.capacity == 0 {
            needed.max(MIN_CAPACITY)
        } else {
            let mut cap = self.capacity;
            while cap < needed {
                cap = cap.saturating_mul(2);
            }
            cap
        };

        if self.try_allocate(target).is_ok() {
            return Ok(());
        }
        log::warn!(
            "Buffer growth to {} records failed; retrying with exact fit {}",
            target,
            needed
        );
        self.try_allocate(needed)
    }

    fn try_allocate(&mut self, capacity: usize) -> Result<(), BufferError> {
        self.data
            .try_reserve_exact(capacity - self.data.len())
            .map_err(|_| BufferError::Alloc {
                requested: capacity,
                record_size: std::mem::size_of::<T>(),
            })?;
        self.capacity = capacity;
        Ok(())
    }
}

impl<T: Copy> GrowableBuffer<T> {
    /// Append records at the logical end.
    pub fn append(&mut self, items: &[T]) -> Result<(), BufferError> {
        self.reserve(items.len())?;
        self.data.extend_from_slice(items);
        Ok(())
    }

    pub fn push(&mut self, item: T) -> Result<(), BufferError> {
        self.append(std::slice::from_ref(&item))
    }
}

impl<T: Pod> GrowableBuffer<T> {
    /// Raw bytes for GPU upload.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.data)
    }
}

// ===================================================================
// Tests
// ===================================================================
