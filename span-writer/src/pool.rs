// SPDX-License-Identifier: Apache-2.0

//! Pooled block storage. A [`Pool`] is a cheaply cloned handle to a [`MutPool`],
//! shared between any number of writers. Writers *rent* blocks from the pool when
//! they need to grow, and *collect* them back into it when retired.

use std::any::{Any, TypeId};
use std::collections::{HashMap, TryReserveError};
use std::fmt::{self, Debug, Formatter};
use std::marker::PhantomData;
use std::ops::{Deref, DerefMut};
use std::result;
use bytemuck::Zeroable;
use cfg_if::cfg_if;
use crate::element::Element;

#[derive(Clone, Debug, thiserror::Error)]
pub enum PoolError {
	#[error("failed to borrow the pool")]
	Borrow,
	#[error("requested block of {requested} elements exceeds the maximum of {max}")]
	TooLarge { requested: usize, max: usize },
	#[error("failed to allocate a block")]
	Alloc(#[from] TryReserveError),
}

pub type Result<T = ()> = result::Result<T, PoolError>;

/// The smallest block length handed out by [`DefaultPool`].
pub const MIN_BLOCK_LEN: usize = 16;

/// A uniquely-owned, contiguous block of pooled memory. Blocks can't be cloned;
/// collecting one moves it into the pool, so a returned block is never reachable
/// from its previous owner.
pub struct Block<T: Element>(Box<[T]>);

impl<T: Element> Block<T> {
	/// Creates an empty block. Empty blocks hold no memory, and are never collected
	/// into a pool.
	pub fn empty() -> Self { Self(Box::default()) }

	/// Allocates a zero-filled block of exactly `len` elements.
	pub fn alloc(len: usize) -> Result<Self> {
		if len > T::MAX_LEN {
			return Err(PoolError::TooLarge { requested: len, max: T::MAX_LEN })
		}

		let mut vec = Vec::new();
		vec.try_reserve_exact(len)?;
		vec.resize(len, T::zeroed());
		Ok(Self(vec.into_boxed_slice()))
	}

	pub fn len(&self) -> usize { self.0.len() }

	pub fn is_empty(&self) -> bool { self.0.is_empty() }

	/// Consumes the block, returning its boxed data.
	pub fn into_inner(self) -> Box<[T]> { self.0 }
}

impl<T: Element> Default for Block<T> {
	fn default() -> Self { Self::empty() }
}

impl<T: Element> Debug for Block<T> {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_struct("Block")
			.field("len", &self.len())
			.finish_non_exhaustive()
	}
}

impl<T: Element> From<Box<[T]>> for Block<T> {
	fn from(value: Box<[T]>) -> Self { Self(value) }
}

impl<T: Element> From<Vec<T>> for Block<T> {
	fn from(value: Vec<T>) -> Self { value.into_boxed_slice().into() }
}

impl<T: Element> Deref for Block<T> {
	type Target = [T];
	fn deref(&self) -> &[T] { &self.0 }
}

impl<T: Element> DerefMut for Block<T> {
	fn deref_mut(&mut self) -> &mut [T] { &mut self.0 }
}

/// A shared handle to a block pool.
pub trait Pool<T: Element>: Clone {
	type Pool: MutPool<T> + ?Sized;
	type Ref<'p>: DerefMut<Target = Self::Pool> where Self: 'p;

	/// Borrows the pool mutably, locking it for the duration of the borrow.
	fn try_borrow(&self) -> Result<Self::Ref<'_>>;

	/// Rents a block of at least `min_len` elements. Renting zero elements returns
	/// an empty block without borrowing the pool.
	fn rent(&self, min_len: usize) -> Result<Block<T>> {
		if min_len == 0 { return Ok(Block::empty()) }

		self.try_borrow()?.rent(min_len)
	}

	/// Collects a block back into the pool. Empty blocks are discarded.
	fn collect(&self, block: Block<T>) -> Result {
		if block.is_empty() { return Ok(()) }

		self.try_borrow()?.collect(block);
		Ok(())
	}

	/// Clears blocks from the pool to free memory. The actual number of blocks
	/// cleared is left up to implementation.
	fn shed(&self) -> Result {
		self.try_borrow()?.shed();
		Ok(())
	}
}

/// A mutably-borrowed pool.
pub trait MutPool<T: Element> {
	/// Rents a block of at least `min_len` elements. The block's contents are
	/// unspecified; a reused block contains whatever its last owner wrote.
	fn rent(&mut self, min_len: usize) -> Result<Block<T>>;

	/// Collects a block back into the pool. Whether the block is kept for reuse or
	/// dropped is left up to implementation.
	fn collect(&mut self, block: Block<T>);

	/// Clears blocks from the pool to free memory.
	fn shed(&mut self);
}

/// Options for tuning [`DefaultPool`] retention.
///
/// # Max pooled length
///
/// The largest block the pool retains, in elements. Requests above this length
/// are allocated fresh on each rent and dropped when collected. Defaults to
/// `1048576` (2^20).
///
/// # Max blocks per bucket
///
/// Blocks are kept in buckets by power-of-two length. Once a bucket holds this
/// many blocks, further blocks of that length are dropped on collection. Defaults
/// to `32`.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub struct PoolOptions {
	pub max_pooled_len: usize,
	pub max_blocks_per_bucket: usize,
}

impl Default for PoolOptions {
	fn default() -> Self { Self::new() }
}

impl PoolOptions {
	pub const fn new() -> Self {
		Self {
			max_pooled_len: 1 << 20,
			max_blocks_per_bucket: 32,
		}
	}

	/// Sets the max pooled length.
	#[inline]
	pub const fn with_max_pooled_len(mut self, value: usize) -> Self {
		self.max_pooled_len = value;
		self
	}

	/// Sets the max blocks per bucket.
	#[inline]
	pub const fn with_max_blocks_per_bucket(mut self, value: usize) -> Self {
		self.max_blocks_per_bucket = value;
		self
	}
}

/// A pool bucketing blocks by power-of-two length, from [`MIN_BLOCK_LEN`] up to
/// the [max pooled length](PoolOptions#max-pooled-length).
pub struct DefaultPool<T: Element> {
	buckets: Vec<Vec<Block<T>>>,
	options: PoolOptions,
}

impl<T: Element> Default for DefaultPool<T> {
	fn default() -> Self { Self::with_options(PoolOptions::default()) }
}

impl<T: Element> DefaultPool<T> {
	pub fn with_options(options: PoolOptions) -> Self {
		Self { buckets: Vec::new(), options }
	}

	pub fn options(&self) -> PoolOptions { self.options }

	/// Returns the number of blocks currently held by the pool.
	pub fn retained(&self) -> usize {
		self.buckets.iter().map(Vec::len).sum()
	}

	/// Returns the bucket length for a request of `len` elements, or `None` if the
	/// request is too large to be pooled.
	fn bucket_len(&self, len: usize) -> Option<usize> {
		let len = len.max(MIN_BLOCK_LEN).checked_next_power_of_two()?;
		(len <= self.options.max_pooled_len).then_some(len)
	}

	fn bucket_index(bucket_len: usize) -> usize {
		(bucket_len.trailing_zeros() - MIN_BLOCK_LEN.trailing_zeros()) as usize
	}
}

impl<T: Element> MutPool<T> for DefaultPool<T> {
	fn rent(&mut self, min_len: usize) -> Result<Block<T>> {
		let Some(len) = self.bucket_len(min_len) else {
			log::debug!("allocating unpooled block of {min_len} elements");
			return Block::alloc(min_len)
		};

		let reused = self.buckets
						 .get_mut(Self::bucket_index(len))
						 .and_then(Vec::pop);
		match reused {
			Some(block) => Ok(block),
			None => Block::alloc(len)
		}
	}

	fn collect(&mut self, block: Block<T>) {
		let len = block.len();
		if self.bucket_len(len) != Some(len) {
			log::trace!("dropping unpooled block of {len} elements");
			return
		}

		let index = Self::bucket_index(len);
		if self.buckets.len() <= index {
			self.buckets.resize_with(index + 1, Vec::new);
		}

		let bucket = &mut self.buckets[index];
		if bucket.len() < self.options.max_blocks_per_bucket {
			bucket.push(block);
		}
	}

	fn shed(&mut self) {
		log::debug!("shedding {} pooled blocks", self.retained());
		self.buckets.clear()
	}
}

cfg_if! {
	if #[cfg(feature = "shared-pool")] {
		use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
		use once_cell::sync::Lazy;

		type Shared<P> = Arc<Mutex<P>>;
		pub type PoolRef<'p, P> = MutexGuard<'p, P>;

		fn share<P>(pool: P) -> Shared<P> { Arc::new(Mutex::new(pool)) }

		fn borrow<P>(pool: &Shared<P>) -> Result<PoolRef<'_, P>> {
			pool.lock().map_err(|_| PoolError::Borrow)
		}

		static POOLS: Lazy<Mutex<HashMap<TypeId, Box<dyn Any + Send + Sync>>>> = Lazy::new(Default::default);

		/// Clones a shared reference to the process-wide default pool for `T`.
		pub fn pool<T: Element>() -> DefaultPoolContainer<T> {
			let mut pools = POOLS.lock().unwrap_or_else(PoisonError::into_inner);
			let entry = pools.entry(TypeId::of::<T>()).or_insert_with(||
				Box::new(DefaultPoolContainer::<T>::default()) as Box<dyn Any + Send + Sync>
			);
			(**entry).downcast_ref::<DefaultPoolContainer<T>>()
					 .cloned()
					 .unwrap_or_default()
		}
	} else {
		use std::cell::{RefCell, RefMut};
		use std::rc::Rc;

		type Shared<P> = Rc<RefCell<P>>;
		pub type PoolRef<'p, P> = RefMut<'p, P>;

		fn share<P>(pool: P) -> Shared<P> { Rc::new(RefCell::new(pool)) }

		fn borrow<P>(pool: &Shared<P>) -> Result<PoolRef<'_, P>> {
			pool.try_borrow_mut().map_err(|_| PoolError::Borrow)
		}

		thread_local! {
			static POOLS: RefCell<HashMap<TypeId, Box<dyn Any>>> = RefCell::new(HashMap::new());
		}

		/// Clones a shared reference to the thread-local default pool for `T`.
		pub fn pool<T: Element>() -> DefaultPoolContainer<T> {
			POOLS.with(|pools| {
				let mut pools = pools.borrow_mut();
				let entry = pools.entry(TypeId::of::<T>()).or_insert_with(||
					Box::new(DefaultPoolContainer::<T>::default()) as Box<dyn Any>
				);
				(**entry).downcast_ref::<DefaultPoolContainer<T>>()
						 .cloned()
						 .unwrap_or_default()
			})
		}
	}
}

/// A shareable container for a [`MutPool`]. Without the `shared-pool` feature the
/// pool is wrapped in `Rc<RefCell<...>>` and must stay on one thread; with it, in
/// `Arc<Mutex<...>>`.
pub struct PoolContainer<T: Element, P: MutPool<T>>(Shared<P>, PhantomData<fn() -> T>);

pub type DefaultPoolContainer<T> = PoolContainer<T, DefaultPool<T>>;

impl<T: Element, P: MutPool<T>> From<P> for PoolContainer<T, P> {
	fn from(pool: P) -> Self {
		Self(share(pool), PhantomData)
	}
}

impl<T: Element, P: MutPool<T> + Default> Default for PoolContainer<T, P> {
	fn default() -> Self { P::default().into() }
}

impl<T: Element, P: MutPool<T>> Clone for PoolContainer<T, P> {
	fn clone(&self) -> Self {
		Self(self.0.clone(), PhantomData)
	}
}

impl<T: Element, P: MutPool<T>> PoolContainer<T, P> {
	/// Returns `true` if both containers share the same pool.
	pub fn ptr_eq(&self, other: &Self) -> bool {
		Shared::<P>::ptr_eq(&self.0, &other.0)
	}
}

impl<T: Element, P: MutPool<T>> Pool<T> for PoolContainer<T, P> {
	type Pool = P;
	type Ref<'p> = PoolRef<'p, P> where Self: 'p;

	fn try_borrow(&self) -> Result<Self::Ref<'_>> {
		borrow(&self.0)
	}
}

#[cfg(test)]
mod test {
	use all_asserts::assert_ge;
	use super::*;

	#[test]
	fn rent_rounds_to_bucket() {
		let mut pool = DefaultPool::<u32>::default();
		assert_eq!(pool.rent(1).unwrap().len(), MIN_BLOCK_LEN);
		assert_eq!(pool.rent(5).unwrap().len(), MIN_BLOCK_LEN);
		assert_eq!(pool.rent(17).unwrap().len(), 32);
		assert_eq!(pool.rent(256).unwrap().len(), 256);
		assert_eq!(pool.rent(300).unwrap().len(), 512);
	}

	#[test]
	fn collected_block_is_reused() {
		let mut pool = DefaultPool::<u8>::default();
		let mut block = pool.rent(100).unwrap();
		block[0] = 42;
		pool.collect(block);
		assert_eq!(pool.retained(), 1);

		let block = pool.rent(70).unwrap();
		assert_eq!(block.len(), 128);
		assert_eq!(block[0], 42);
		assert_eq!(pool.retained(), 0);
	}

	#[test]
	fn large_blocks_are_not_retained() {
		let options = PoolOptions::new().with_max_pooled_len(64);
		let mut pool = DefaultPool::<u64>::with_options(options);
		let block = pool.rent(100).unwrap();
		assert_eq!(block.len(), 100);
		pool.collect(block);
		assert_eq!(pool.retained(), 0);
	}

	#[test]
	fn foreign_lengths_are_not_retained() {
		let mut pool = DefaultPool::<u8>::default();
		pool.collect(vec![0; 100].into());
		pool.collect(vec![0; 8].into());
		assert_eq!(pool.retained(), 0);
		pool.collect(vec![0; 64].into());
		assert_eq!(pool.retained(), 1);
	}

	#[test]
	fn bucket_limit() {
		let options = PoolOptions::new().with_max_blocks_per_bucket(2);
		let mut pool = DefaultPool::<u8>::with_options(options);
		for _ in 0..4 {
			pool.collect(Block::alloc(MIN_BLOCK_LEN).unwrap());
		}
		assert_eq!(pool.retained(), 2);
		pool.shed();
		assert_eq!(pool.retained(), 0);
	}

	#[test]
	fn too_large() {
		let mut pool = DefaultPool::<u64>::default();
		let err = pool.rent(usize::MAX).unwrap_err();
		assert!(matches!(err, PoolError::TooLarge { requested: usize::MAX, .. }));
	}

	#[test]
	fn empty_rent_and_collect() {
		let pool = PoolContainer::from(DefaultPool::<u16>::default());
		let block = pool.rent(0).unwrap();
		assert!(block.is_empty());
		pool.collect(block).unwrap();
		assert_eq!(pool.try_borrow().unwrap().retained(), 0);
	}

	#[test]
	fn default_pool_is_shared() {
		let a = pool::<u32>();
		let b = pool::<u32>();
		assert!(a.ptr_eq(&b));

		let block = a.rent(1000).unwrap();
		assert_ge!(block.len(), 1000);
	}

	#[cfg(not(feature = "shared-pool"))]
	#[test]
	fn borrowed_pool_fails() {
		let pool = PoolContainer::from(DefaultPool::<u8>::default());
		let _guard = pool.try_borrow().unwrap();
		assert!(matches!(pool.rent(1), Err(PoolError::Borrow)));
	}
}
