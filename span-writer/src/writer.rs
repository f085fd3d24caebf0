// SPDX-License-Identifier: Apache-2.0

mod memory;
mod options;
mod write;

pub use memory::*;
pub use options::*;

use std::{fmt, mem};
use std::fmt::{Debug, Formatter};
use all_asserts::debug_assert_ge;
use crate::element::Element;
use crate::error::{Error, ErrorKind, OperationKind, Result, ResultContext};
use crate::growth::{GrowthPolicy, DEFAULT_GROWTH_INCREMENT};
use crate::pool::{Block, DefaultPoolContainer, Pool, pool};
use OperationKind::{Advance, Create, Dispose, Read, Reserve};

/// A growable, contiguous writer of `T` items backed by a block rented from a
/// pool. When a reservation doesn't fit, a larger block is rented, the written
/// items are copied into it, and the old block is returned to the pool.
///
/// Writers return their block when dropped or [disposed](Self::dispose). Any
/// access after disposal fails with [`ObjectDisposed`](ErrorKind::ObjectDisposed).
pub struct SpanWriter<T: Element, P: Pool<T> = DefaultPoolContainer<T>> {
	/// The rented block, `None` once disposed.
	block: Option<Block<T>>,
	index: usize,
	/// Incremented whenever the block is replaced, invalidating writes through
	/// [`Memory`] handles issued before.
	epoch: u64,
	/// Incremented whenever the written items are discarded by clearing or
	/// disposal, invalidating all [`Memory`] handles issued before.
	generation: u64,
	pool: P,
	growth: GrowthPolicy,
	size_hint: usize,
}

impl<T: Element> Default for SpanWriter<T> {
	fn default() -> Self { Self::with_pool(pool()) }
}

impl<T: Element, P: Pool<T>> Debug for SpanWriter<T, P> {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_struct("SpanWriter")
			.field("index", &self.index)
			.field("capacity", &self.capacity())
			.field("epoch", &self.epoch)
			.field("generation", &self.generation)
			.field("growth", &self.growth)
			.field("size_hint", &self.size_hint)
			.field("disposed", &self.is_disposed())
			.finish_non_exhaustive()
	}
}

impl<T: Element> SpanWriter<T> {
	/// Creates a new writer on the default pool, growing by the default increment
	/// of `256` items.
	pub fn fixed() -> Result<Self> {
		Self::with_growth_increment(DEFAULT_GROWTH_INCREMENT)
	}

	/// Creates a new writer on the default pool, growing by a fixed `increment`.
	/// One increment is rented immediately.
	pub fn with_growth_increment(increment: usize) -> Result<Self> {
		Self::new(pool(), WriterOptions::fixed(increment))
	}

	/// Creates a new writer on the default pool, multiplying its capacity by
	/// `multiple` when growing.
	pub fn with_growth_multiple(multiple: usize) -> Result<Self> {
		Self::new(pool(), WriterOptions::new().grow_times(multiple))
	}

	/// Creates a new writer on the default pool with at least `capacity` items
	/// rented immediately.
	pub fn with_capacity(capacity: usize) -> Result<Self> {
		Self::new(pool(), WriterOptions::new().with_initial_capacity(capacity))
	}
}

impl WriterOptions {
	/// Creates a writer on the default pool from these options.
	pub fn build<T: Element>(self) -> Result<SpanWriter<T>> {
		SpanWriter::new(pool(), self)
	}
}

impl<T: Element, P: Pool<T>> SpanWriter<T, P> {
	/// Creates a new writer renting from `pool`. Fails if the growth parameter is
	/// zero or the initial capacity can't be rented.
	pub fn new(
		pool: P,
		options: WriterOptions
	) -> Result<Self> {
		let WriterOptions {
			growth,
			initial_capacity,
			size_hint,
		} = options.validate().context(Create)?;
		let block = pool.rent(initial_capacity)
						.map_err(|err| Error::pool(Create, err))?;
		Ok(Self {
			block: Some(block),
			index: 0,
			epoch: 0,
			generation: 0,
			pool,
			growth,
			size_hint,
		})
	}

	/// Creates a new writer renting from `pool` with default options. Nothing is
	/// rented until the first write.
	pub fn with_pool(pool: P) -> Self {
		let WriterOptions { growth, size_hint, .. } = WriterOptions::default();
		Self {
			block: Some(Block::empty()),
			index: 0,
			epoch: 0,
			generation: 0,
			pool,
			growth,
			size_hint,
		}
	}

	/// Returns the options used to create the writer. The initial capacity is
	/// reported as the current capacity.
	pub fn options(&self) -> WriterOptions {
		WriterOptions {
			growth: self.growth,
			initial_capacity: self.capacity(),
			size_hint: self.size_hint,
		}
	}

	/// Returns the growth policy.
	pub fn growth(&self) -> GrowthPolicy { self.growth }
	/// Returns the pool the writer rents from.
	pub fn pool(&self) -> &P { &self.pool }
	/// Returns the number of items written.
	pub fn len(&self) -> usize { self.index }
	/// Returns `true` if no items have been written.
	pub fn is_empty(&self) -> bool { self.index == 0 }
	/// Returns the number of items the current block holds, or `0` once disposed.
	pub fn capacity(&self) -> usize {
		self.block.as_ref().map_or(0, |block| block.len())
	}
	/// Returns the number of items that can be written before growing.
	pub fn free_capacity(&self) -> usize { self.capacity() - self.index }
	/// Returns `true` if the writer has been disposed.
	pub fn is_disposed(&self) -> bool { self.block.is_none() }

	fn block(&self, op: OperationKind) -> Result<&Block<T>> {
		self.block.as_ref().ok_or_else(|| Error::disposed(op))
	}

	fn block_mut(&mut self, op: OperationKind) -> Result<&mut Block<T>> {
		self.block.as_mut().ok_or_else(|| Error::disposed(op))
	}

	/// Returns the written items.
	pub fn written_span(&self) -> Result<&[T]> {
		Ok(&self.block(Read)?[..self.index])
	}

	/// Returns the written items as raw bytes.
	pub fn written_bytes(&self) -> Result<&[u8]> {
		self.written_span().map(bytemuck::cast_slice)
	}

	/// Copies the written items into a new vector.
	pub fn to_vec(&self) -> Result<Vec<T>> {
		self.written_span().map(<[T]>::to_vec)
	}

	/// Copies the written items into a new vector, then disposes the writer.
	pub fn into_vec(mut self) -> Result<Vec<T>> {
		let vec = self.to_vec()?;
		self.dispose()?;
		Ok(vec)
	}

	/// Reserves at least `size_hint` items, returning a mutable slice of the
	/// uncommitted space after the written items. The slice is `size_hint` items
	/// long, or the default size hint if larger. Items written to the slice are
	/// committed by [`advance`](Self::advance).
	pub fn get_span(&mut self, size_hint: usize) -> Result<&mut [T]> {
		let len = size_hint.max(self.size_hint);
		self.reserve(len, Reserve)
	}

	/// Commits `count` items written into reserved space. Advancing never grows
	/// the writer: fails with [`InvalidAdvance`](ErrorKind::InvalidAdvance) if
	/// `count` exceeds the free capacity.
	pub fn advance(&mut self, count: usize) -> Result {
		let available = self.block(Advance)?.len() - self.index;
		if count > available {
			return Err(Error::invalid_advance(count, available))
		}

		self.index += count;
		Ok(())
	}

	/// Clears the written items, keeping the current block for reuse.
	pub fn clear(&mut self) -> Result {
		self.block(OperationKind::Other("clear writer"))?;
		self.index = 0;
		self.generation += 1;
		Ok(())
	}

	/// Returns the current block to the pool. Disposing is idempotent; the block is
	/// returned once, further calls have no effect.
	pub fn dispose(&mut self) -> Result {
		let Some(block) = self.block.take() else { return Ok(()) };
		self.index = 0;
		self.generation += 1;
		log::trace!("disposing writer, returning block of {} items", block.len());
		self.pool
			.collect(block)
			.map_err(|err| Error::pool(Dispose, err))
	}

	/// Grows if needed to fit `len` more items, returning the uncommitted slice of
	/// exactly `len` items.
	fn reserve(&mut self, len: usize, op: OperationKind) -> Result<&mut [T]> {
		self.grow(len, op)?;
		let index = self.index;
		Ok(&mut self.block_mut(op)?[index..index + len])
	}

	/// Grows the block to fit at least `additional` items past the written items.
	fn grow(&mut self, additional: usize, op: OperationKind) -> Result {
		let Self { block, index, epoch, pool, growth, .. } = self;
		let current = block.as_mut().ok_or_else(|| Error::disposed(op))?;
		let needed = index.checked_add(additional)
						  .filter(|&needed| needed <= T::MAX_LEN)
						  .ok_or_else(|| Error::capacity_overflow(op))?;
		let capacity = current.len();
		if needed <= capacity { return Ok(()) }

		let target = growth.next_capacity(capacity, *index, needed, T::MAX_LEN);
		debug_assert_ge!(target, needed);

		let mut next = pool.rent(target).map_err(|err| Error::pool(op, err))?;
		if next.len() < needed {
			if let Err(err) = pool.collect(next) {
				log::debug!("failed to return undersized block: {err}");
			}
			return Err(Error::new(
				op,
				ErrorKind::AllocationFailure,
				Some("pool returned an undersized block".into())
			))
		}

		next[..*index].copy_from_slice(&current[..*index]);
		let old = mem::replace(current, next);
		*epoch += 1;
		log::trace!(
			"grew writer from {capacity} to {} items ({needed} needed)",
			current.len()
		);
		if let Err(err) = pool.collect(old) {
			log::debug!("failed to return block of {capacity} items after growing: {err}");
		}
		Ok(())
	}
}

#[cfg(feature = "bytes")]
impl<P: Pool<u8>> SpanWriter<u8, P> {
	/// Copies the written bytes into [`Bytes`](bytes::Bytes).
	pub fn to_bytes(&self) -> Result<bytes::Bytes> {
		self.written_span().map(bytes::Bytes::copy_from_slice)
	}
}

impl<T: Element, P: Pool<T>> Drop for SpanWriter<T, P> {
	fn drop(&mut self) {
		let _ = self.dispose();
	}
}
