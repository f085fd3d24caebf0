// SPDX-License-Identifier: Apache-2.0

use std::mem;

/// A fixed-layout item that can be stored in pooled blocks. Elements are plain
/// old data: any bit pattern is valid, so fresh blocks are zero-filled and the
/// written items can be viewed as raw bytes.
pub trait Element: bytemuck::Pod + Unpin + Send + Sync {
	/// The size of one element in bytes.
	const SIZE: usize = mem::size_of::<Self>();

	/// The maximum number of elements a single block can hold, such that its size
	/// in bytes doesn't exceed `isize::MAX`.
	const MAX_LEN: usize = if Self::SIZE == 0 {
		usize::MAX
	} else {
		isize::MAX as usize / Self::SIZE
	};
}

impl<T: bytemuck::Pod + Unpin + Send + Sync> Element for T { }
