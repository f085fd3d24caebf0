// SPDX-License-Identifier: Apache-2.0

//! Growth policies, deciding the next capacity of a writer when a reservation
//! doesn't fit in its current block.
//!
//! A fixed increment wastes less memory for writers with a predictable output
//! size, but copies the written data O(n) times as the writer grows. Doubling
//! copies O(log n) times for amortized O(1) appends, at the cost of up to half
//! the block sitting unused. Rounding to a power of two additionally lines the
//! requested capacity up with pool buckets.

use std::fmt::{self, Debug, Formatter};
use std::num::NonZeroUsize;
use crate::error::{Error, Result};

/// The default fixed growth increment, in items.
pub const DEFAULT_GROWTH_INCREMENT: usize = 256;
/// The default growth multiple.
pub const DEFAULT_GROWTH_MULTIPLE: usize = 2;

/// A custom growth function, called with the current capacity, the current
/// index, and the needed capacity, returning the new capacity.
pub type GrowthFn = fn(capacity: usize, index: usize, needed: usize) -> usize;

/// The rule used to compute a writer's next capacity.
///
/// Custom policies never compare equal, not even to themselves, since function
/// pointer addresses aren't stable.
#[derive(Copy, Clone)]
pub enum GrowthPolicy {
	/// Grows to `max(index + increment, needed)`.
	Increment(usize),
	/// Grows to `max(capacity * multiple, needed)`, optionally rounded up to the
	/// next power of two.
	Multiply {
		multiple: usize,
		round_pow2: bool,
	},
	/// Grows by a custom function.
	Custom(GrowthFn),
}

impl Default for GrowthPolicy {
	fn default() -> Self { Self::doubling() }
}

impl PartialEq for GrowthPolicy {
	fn eq(&self, other: &Self) -> bool {
		match (self, other) {
			(Self::Increment(a), Self::Increment(b)) => a == b,
			(
				Self::Multiply { multiple: a, round_pow2: a_pow2 },
				Self::Multiply { multiple: b, round_pow2: b_pow2 }
			) => a == b && a_pow2 == b_pow2,
			_ => false
		}
	}
}

impl Debug for GrowthPolicy {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		match self {
			Self::Increment(increment) =>
				f.debug_tuple("Increment").field(increment).finish(),
			Self::Multiply { multiple, round_pow2 } =>
				f.debug_struct("Multiply")
				 .field("multiple", multiple)
				 .field("round_pow2", round_pow2)
				 .finish(),
			Self::Custom(_) => f.write_str("Custom(..)")
		}
	}
}

impl GrowthPolicy {
	/// Creates a fixed-increment policy. Fails if `increment` is zero.
	pub fn increment(increment: usize) -> Result<Self> {
		Self::Increment(increment).validate()
	}

	/// Creates a policy multiplying the capacity by `multiple`. Fails if `multiple`
	/// is zero.
	pub fn multiple(multiple: usize) -> Result<Self> {
		Self::Multiply { multiple, round_pow2: false }.validate()
	}

	/// Creates a policy doubling the capacity.
	pub const fn doubling() -> Self {
		Self::Multiply { multiple: DEFAULT_GROWTH_MULTIPLE, round_pow2: false }
	}

	/// Creates a policy doubling the capacity, rounded up to a power of two.
	pub const fn pow2() -> Self {
		Self::Multiply { multiple: DEFAULT_GROWTH_MULTIPLE, round_pow2: true }
	}

	/// Creates a policy from a custom growth function. Its result is clamped such
	/// that growth is always at least the needed capacity.
	pub const fn custom(growth: GrowthFn) -> Self {
		Self::Custom(growth)
	}

	/// Returns the policy with power-of-two rounding set. Has no effect on other
	/// policies than [`Multiply`](Self::Multiply).
	pub const fn rounded(self, round_pow2: bool) -> Self {
		match self {
			Self::Multiply { multiple, .. } => Self::Multiply { multiple, round_pow2 },
			other => other
		}
	}

	/// Returns the policy if its growth parameter is positive, or an "invalid
	/// configuration" error.
	pub fn validate(self) -> Result<Self> {
		match self {
			Self::Increment(0) =>
				Err(Error::invalid_config("growth increment must be greater than zero")),
			Self::Multiply { multiple: 0, .. } =>
				Err(Error::invalid_config("growth multiple must be greater than zero")),
			valid => Ok(valid)
		}
	}

	/// Returns the growth parameter: the increment or multiple, or `None` for a
	/// custom policy.
	pub fn parameter(&self) -> Option<NonZeroUsize> {
		match *self {
			Self::Increment(n) | Self::Multiply { multiple: n, .. } => NonZeroUsize::new(n),
			Self::Custom(_) => None
		}
	}

	/// Computes the next capacity for a writer with `capacity` and `index` needing
	/// at least `needed` items, capped at `max`. The result is at least `needed`
	/// and `capacity`, if `needed` doesn't exceed `max`.
	pub fn next_capacity(&self, capacity: usize, index: usize, needed: usize, max: usize) -> usize {
		let target = match *self {
			Self::Increment(increment) =>
				index.checked_add(increment).unwrap_or(needed),
			Self::Multiply { multiple, round_pow2 } => {
				let target = capacity.checked_mul(multiple)
									 .unwrap_or(needed)
									 .max(needed);
				if round_pow2 {
					target.checked_next_power_of_two().unwrap_or(target)
				} else {
					target
				}
			}
			Self::Custom(growth) => growth(capacity, index, needed)
		};

		target.min(max).max(needed).max(capacity)
	}
}
