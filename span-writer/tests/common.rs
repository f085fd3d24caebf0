// Copyright 2023 Strixpyrr
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

#![allow(dead_code)]

use std::collections::HashSet;
use std::fmt::{Arguments, Debug};
use span_writer::Element;
use span_writer::pool::{Block, MutPool, Pool, PoolContainer, PoolError, Result};

macro_rules! qc_assert_eq {
	($left:expr,$right:expr) => {{
		let left = $left;
		let right = $right;
		if left == right {
			TestResult::passed()
		} else {
			TestResult::error(
				common::format_qc_assert_error(&left, &right, None)
			)
		}
	}};
    ($left:expr,$right:expr,$($arg:tt)+) => {{
		let left = $left;
		let right = $right;
		if left == right {
			TestResult::passed()
		} else {
			TestResult::error(
				common::format_qc_assert_error(&left, &right, Some(format_args!($($arg)+)))
			)
		}
	}};
}

pub fn format_qc_assert_error<L: Debug, R: Debug>(left: &L, right: &R, msg: Option<Arguments>) -> String {
	if let Some(msg) = msg {
		format!(
			"assertion failed `(left == right)`: {msg}\n \
			left: `{left:?}`,\nright: `{right:?}`",
		)
	} else {
		format!(
			"assertion failed `(left == right)`:\n \
			left: `{left:?}`,\nright: `{right:?}`",
		)
	}
}

/// A pool renting blocks of exactly the requested length, counting rents and
/// collections. Blocks are tracked by address to catch double returns.
#[derive(Default)]
pub struct MockBlocks {
	pub rented: usize,
	pub collected: usize,
	pub double_collected: usize,
	pub sizes: Vec<usize>,
	/// Rents above this length fail.
	pub max_len: Option<usize>,
	outstanding: HashSet<usize>,
}

pub type MockPool<T> = PoolContainer<T, MockBlocks>;

impl<T: Element> MutPool<T> for MockBlocks {
	fn rent(&mut self, min_len: usize) -> Result<Block<T>> {
		if let Some(max) = self.max_len.filter(|&max| min_len > max) {
			return Err(PoolError::TooLarge { requested: min_len, max })
		}

		let block = Block::alloc(min_len)?;
		self.rented += 1;
		self.sizes.push(min_len);
		self.outstanding.insert(block.as_ptr() as usize);
		Ok(block)
	}

	fn collect(&mut self, block: Block<T>) {
		self.collected += 1;
		if !self.outstanding.remove(&(block.as_ptr() as usize)) {
			self.double_collected += 1;
		}
	}

	fn shed(&mut self) { }
}

pub fn mock_pool<T: Element>() -> MockPool<T> {
	MockBlocks::default().into()
}

pub fn limited_pool<T: Element>(max_len: usize) -> MockPool<T> {
	MockBlocks {
		max_len: Some(max_len),
		..MockBlocks::default()
	}.into()
}

/// Returns the rent and collect counts of a mock pool.
pub fn counts<T: Element>(pool: &MockPool<T>) -> (usize, usize) {
	let blocks = pool.try_borrow().unwrap();
	assert_eq!(blocks.double_collected, 0, "a block was returned twice");
	(blocks.rented, blocks.collected)
}
