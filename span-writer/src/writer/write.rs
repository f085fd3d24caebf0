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

use std::future::{ready, Ready};
use crate::element::Element;
use crate::error::{OperationKind, Result};
use crate::pool::Pool;
use super::SpanWriter;

impl<T: Element, P: Pool<T>> SpanWriter<T, P> {
	/// Appends a single item, growing if necessary.
	pub fn write(&mut self, item: T) -> Result {
		self.reserve(1, OperationKind::Write)?[0] = item;
		self.index += 1;
		Ok(())
	}

	/// Appends a slice of items, growing if necessary.
	pub fn write_slice(&mut self, items: &[T]) -> Result {
		self.reserve(items.len(), OperationKind::Write)?
			.copy_from_slice(items);
		self.index += items.len();
		Ok(())
	}

	/// Appends items from any owned or borrowed container, such as a [`Vec`] or a
	/// boxed slice, growing if necessary.
	pub fn write_from(&mut self, items: impl AsRef<[T]>) -> Result {
		self.write_slice(items.as_ref())
	}

	/// Appends a single item. Writing never suspends; the returned future is
	/// already resolved.
	pub fn write_async(&mut self, item: T) -> Ready<Result> {
		ready(self.write(item))
	}

	/// Appends a slice of items. Writing never suspends; the returned future is
	/// already resolved.
	pub fn write_slice_async(&mut self, items: &[T]) -> Ready<Result> {
		ready(self.write_slice(items))
	}
}
