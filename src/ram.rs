use std::ops::Range;

use crate::{
    config::arch_config::WordType,
    device::{AccessKind, Mem, MemError},
    utils::UnsignedInteger,
};

/// Flat, zero-initialized guest memory. Its size never changes after creation.
pub struct Ram {
    data: Box<[u8]>,
}

impl Ram {
    pub fn new(size: usize) -> Self {
        Self {
            data: vec![0u8; size].into_boxed_slice(),
        }
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Byte range of an access of `width` bytes at `addr`, if `addr + (width - 1) < size`.
    #[inline]
    fn access_range(&self, addr: WordType, width: usize) -> Option<Range<usize>> {
        let start = addr as usize;
        let last = start.checked_add(width - 1)?;
        if last < self.data.len() {
            Some(start..last + 1)
        } else {
            None
        }
    }

    /// Byte range of a view, if `base + len <= size`.
    #[inline]
    fn view_range(&self, base: WordType, len: usize) -> Option<Range<usize>> {
        let start = base as usize;
        let end = start.checked_add(len)?;
        if end <= self.data.len() {
            Some(start..end)
        } else {
            None
        }
    }

    /// Borrow `len` bytes starting at `base`.
    ///
    /// A range reaching exactly the end of memory is valid; anything further fails and
    /// hands out nothing.
    pub fn view(&self, base: WordType, len: usize) -> Result<&[u8], MemError> {
        let range = self
            .view_range(base, len)
            .ok_or(MemError::new(base, AccessKind::Load))?;
        Ok(&self.data[range])
    }

    /// Mutable counterpart of [`Ram::view`].
    pub fn view_mut(&mut self, base: WordType, len: usize) -> Result<&mut [u8], MemError> {
        let range = self
            .view_range(base, len)
            .ok_or(MemError::new(base, AccessKind::Store))?;
        Ok(&mut self.data[range])
    }

    /// Copy a raw image into memory at `offset`. Nothing is copied if it does not fit.
    pub fn insert_section(&mut self, section: &[u8], offset: WordType) -> Result<(), MemError> {
        let dst = self.view_mut(offset, section.len())?;
        dst.copy_from_slice(section);
        Ok(())
    }

    /// Instruction fetch, reported as [`AccessKind::Fetch`] on failure.
    pub fn fetch(&self, addr: WordType) -> Result<u32, MemError> {
        self.read::<u32>(addr)
            .map_err(|_| MemError::new(addr, AccessKind::Fetch))
    }
}

impl Mem for Ram {
    fn read<T>(&self, addr: WordType) -> Result<T, MemError>
    where
        T: UnsignedInteger,
    {
        let range = self
            .access_range(addr, T::BYTES)
            .ok_or(MemError::new(addr, AccessKind::Load))?;
        Ok(T::from_le_slice(&self.data[range]))
    }

    fn write<T>(&mut self, addr: WordType, data: T) -> Result<(), MemError>
    where
        T: UnsignedInteger,
    {
        let range = self
            .access_range(addr, T::BYTES)
            .ok_or(MemError::new(addr, AccessKind::Store))?;
        data.write_le_slice(&mut self.data[range]);
        Ok(())
    }
}
