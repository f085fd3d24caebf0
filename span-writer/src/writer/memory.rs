// SPDX-License-Identifier: Apache-2.0

use std::ops::Range;
use crate::element::Element;
use crate::error::{Error, OperationKind, Result};
use crate::pool::Pool;
use super::SpanWriter;
use OperationKind::{Read, Reserve, Write};

/// A handle to a range of a writer's memory. Unlike the slices returned by
/// [`get_span`](SpanWriter::get_span), handles don't borrow the writer, so they
/// can be held across calls and resolved later with [`SpanWriter::memory`] or
/// [`SpanWriter::memory_mut`].
///
/// A handle is tied to the block it was issued for. Once the writer grows, it can
/// no longer be written through, but can still be read if it lies within the
/// written items, which are copied to the same offset. Clearing or disposing the
/// writer discards the written items, invalidating the handle entirely.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Memory {
	start: usize,
	len: usize,
	epoch: u64,
	generation: u64,
	writable: bool,
}

impl Memory {
	/// Returns the offset of the first item in the writer.
	pub fn start(&self) -> usize { self.start }
	pub fn len(&self) -> usize { self.len }
	pub fn is_empty(&self) -> bool { self.len == 0 }
	/// Returns `true` if the handle was issued by a reservation, rather than as a
	/// read-only view of the written items.
	pub fn is_writable(&self) -> bool { self.writable }
	pub fn range(&self) -> Range<usize> { self.start..self.start + self.len }
}

impl<T: Element, P: Pool<T>> SpanWriter<T, P> {
	/// Reserves at least `size_hint` items like [`get_span`](Self::get_span),
	/// returning a handle to the reserved space instead of a slice.
	pub fn get_memory(&mut self, size_hint: usize) -> Result<Memory> {
		let len = size_hint.max(self.size_hint);
		self.grow(len, Reserve)?;
		Ok(Memory {
			start: self.index,
			len,
			epoch: self.epoch,
			generation: self.generation,
			writable: true,
		})
	}

	/// Returns a read-only handle to the written items.
	pub fn written_memory(&self) -> Result<Memory> {
		self.block(Read)?;
		Ok(Memory {
			start: 0,
			len: self.index,
			epoch: self.epoch,
			generation: self.generation,
			writable: false,
		})
	}

	/// Resolves a memory handle into a slice. Fails with
	/// [`StaleMemory`](crate::ErrorKind::StaleMemory) if the writer was cleared
	/// since the handle was issued, or if the handle was issued for a previous
	/// block and covers items not yet written.
	pub fn memory(&self, memory: &Memory) -> Result<&[T]> {
		let block = self.block(Read)?;
		let range = memory.range();
		if memory.generation != self.generation ||
		   (memory.epoch != self.epoch && range.end > self.index) {
			return Err(Error::stale(Read))
		}

		block.get(range).ok_or_else(|| Error::stale(Read))
	}

	/// Resolves a memory handle into a mutable slice. Fails with
	/// [`StaleMemory`](crate::ErrorKind::StaleMemory) if the handle was issued for
	/// a previous block or before the writer was cleared, or is a read-only view
	/// of the written items.
	pub fn memory_mut(&mut self, memory: &Memory) -> Result<&mut [T]> {
		if !memory.writable {
			return Err(Error::other(Write, "memory handle is read-only", None))
		}

		let (epoch, generation) = (self.epoch, self.generation);
		let block = self.block_mut(Write)?;
		if memory.epoch != epoch || memory.generation != generation {
			return Err(Error::stale(Write))
		}

		block.get_mut(memory.range()).ok_or_else(|| Error::stale(Write))
	}
}
