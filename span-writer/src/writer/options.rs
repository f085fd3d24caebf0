// SPDX-License-Identifier: Apache-2.0

use crate::error::Result;
use crate::growth::GrowthPolicy;
use crate::DEFAULT_SIZE_HINT;

/// Options for tuning [`SpanWriter`](super::SpanWriter)'s behavior and
/// performance.
///
/// # Growth
///
/// The [policy](GrowthPolicy) computing the next capacity when a reservation
/// doesn't fit. Defaults to doubling. The growth parameter must be positive;
/// writers fail to construct otherwise.
///
/// # Initial capacity
///
/// The capacity rented when the writer is created. Defaults to `0`, deferring the
/// first rent to the first write or reservation.
///
/// # Size hint
///
/// The reservation size substituted when [`get_span`] or [`get_memory`] is called
/// with a hint of `0`, a request for "some" space. Defaults to `8`.
///
/// [`get_span`]: super::SpanWriter::get_span
/// [`get_memory`]: super::SpanWriter::get_memory
#[derive(Copy, Clone, Debug, PartialEq)]
#[non_exhaustive]
pub struct WriterOptions {
	pub growth: GrowthPolicy,
	pub initial_capacity: usize,
	pub size_hint: usize,
}

impl Default for WriterOptions {
	fn default() -> Self { Self::new() }
}

impl WriterOptions {
	/// Creates a new set of writer options.
	pub const fn new() -> Self {
		Self {
			growth: GrowthPolicy::doubling(),
			initial_capacity: 0,
			size_hint: DEFAULT_SIZE_HINT,
		}
	}

	/// Presets the options to grow by a fixed `increment`, with an initial capacity
	/// of one increment.
	#[inline]
	pub const fn fixed(increment: usize) -> Self {
		Self {
			growth: GrowthPolicy::Increment(increment),
			initial_capacity: increment,
			..Self::new()
		}
	}

	/// Returns the growth policy.
	#[inline]
	pub const fn growth(&self) -> GrowthPolicy { self.growth }

	/// Returns the initial capacity.
	#[inline]
	pub const fn initial_capacity(&self) -> usize { self.initial_capacity }

	/// Returns the default size hint.
	#[inline]
	pub const fn size_hint(&self) -> usize { self.size_hint }

	/// Sets the growth policy.
	#[inline]
	pub fn set_growth(&mut self, value: GrowthPolicy) {
		self.growth = value;
	}

	/// Sets the initial capacity.
	#[inline]
	pub fn set_initial_capacity(&mut self, value: usize) {
		self.initial_capacity = value;
	}

	/// Sets the default size hint.
	#[inline]
	pub fn set_size_hint(&mut self, value: usize) {
		self.size_hint = value;
	}

	/// Sets the growth policy.
	#[inline]
	pub const fn with_growth(mut self, value: GrowthPolicy) -> Self {
		self.growth = value;
		self
	}

	/// Sets the initial capacity.
	#[inline]
	pub const fn with_initial_capacity(mut self, value: usize) -> Self {
		self.initial_capacity = value;
		self
	}

	/// Sets the default size hint.
	#[inline]
	pub const fn with_size_hint(mut self, value: usize) -> Self {
		self.size_hint = value;
		self
	}

	/// Sets growth to a fixed increment.
	#[inline]
	pub const fn grow_by(self, increment: usize) -> Self {
		self.with_growth(GrowthPolicy::Increment(increment))
	}

	/// Sets growth to multiply the capacity.
	#[inline]
	pub const fn grow_times(self, multiple: usize) -> Self {
		self.with_growth(GrowthPolicy::Multiply { multiple, round_pow2: false })
	}

	/// Checks the options, failing with an "invalid configuration" error if the
	/// growth parameter is zero.
	pub fn validate(self) -> Result<Self> {
		self.growth.validate()?;
		Ok(self)
	}
}
