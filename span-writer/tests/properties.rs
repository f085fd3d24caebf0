// SPDX-License-Identifier: Apache-2.0

use std::io::{IoSlice, Write};
use quickcheck::{Arbitrary, Gen, TestResult};
use quickcheck_macros::quickcheck;
use span_writer::{GrowthPolicy, SpanWriter, WriterOptions};
use crate::common::{counts, mock_pool};

#[macro_use]
mod common;

#[derive(Clone, Debug)]
enum Op {
	Item(u32),
	Slice(Vec<u32>),
	Owned(Vec<u32>),
	/// Reserves `hint` items, then commits as many of `values` as fit.
	Reserve {
		hint: u8,
		values: Vec<u32>,
	},
}

impl Arbitrary for Op {
	fn arbitrary(g: &mut Gen) -> Self {
		match u8::arbitrary(g) % 4 {
			0 => Self::Item(u32::arbitrary(g)),
			1 => Self::Slice(Vec::arbitrary(g)),
			2 => Self::Owned(Vec::arbitrary(g)),
			_ => Self::Reserve {
				hint: u8::arbitrary(g),
				values: Vec::arbitrary(g),
			}
		}
	}

	fn shrink(&self) -> Box<dyn Iterator<Item = Self>> {
		match self.clone() {
			Self::Item(_) => quickcheck::empty_shrinker(),
			Self::Slice(values) => Box::new(values.shrink().map(Self::Slice)),
			Self::Owned(values) => Box::new(values.shrink().map(Self::Owned)),
			Self::Reserve { hint, values } =>
				Box::new(values.shrink().map(move |values| Self::Reserve { hint, values }))
		}
	}
}

#[derive(Copy, Clone, Debug)]
struct Policy(GrowthPolicy);

impl Arbitrary for Policy {
	fn arbitrary(g: &mut Gen) -> Self {
		let param = usize::from(u8::arbitrary(g) % 64) + 1;
		Self(match u8::arbitrary(g) % 3 {
			0 => GrowthPolicy::Increment(param),
			1 => GrowthPolicy::Multiply { multiple: param % 4 + 1, round_pow2: false },
			_ => GrowthPolicy::pow2()
		})
	}
}

#[quickcheck]
fn append_fidelity(policy: Policy, initial: u8, ops: Vec<Op>) -> TestResult {
	let pool = mock_pool::<u32>();
	let options = WriterOptions::new().with_growth(policy.0)
									  .with_initial_capacity(initial.into());
	let mut writer = SpanWriter::new(pool.clone(), options).unwrap();
	let mut expected = Vec::new();
	let mut capacity = writer.capacity();

	for op in ops {
		match op {
			Op::Item(value) => {
				writer.write(value).unwrap();
				expected.push(value);
			}
			Op::Slice(values) => {
				writer.write_slice(&values).unwrap();
				expected.extend_from_slice(&values);
			}
			Op::Owned(values) => {
				expected.extend_from_slice(&values);
				writer.write_from(values).unwrap();
			}
			Op::Reserve { hint, values } => {
				let hint = usize::from(hint);
				let span = writer.get_span(hint).unwrap();
				if span.len() < hint {
					return TestResult::error(format!("reserved {} of {hint} items", span.len()))
				}

				let count = values.len().min(span.len());
				span[..count].copy_from_slice(&values[..count]);
				writer.advance(count).unwrap();
				expected.extend_from_slice(&values[..count]);
			}
		}

		if writer.capacity() < capacity {
			return TestResult::error(format!(
				"capacity shrank from {capacity} to {}", writer.capacity()
			))
		}
		capacity = writer.capacity();
	}

	let result = qc_assert_eq!(writer.written_span().unwrap(), &expected[..]);
	if result.is_failure() { return result }

	drop(writer);
	let (rented, collected) = counts(&pool);
	qc_assert_eq!(rented, collected, "every rented block should be collected")
}

#[quickcheck]
fn growth_preserves_prefix(policy: Policy, data: Vec<u32>, hint: u16) -> TestResult {
	let options = WriterOptions::new().with_growth(policy.0);
	let mut writer = SpanWriter::new(mock_pool(), options).unwrap();
	writer.write_slice(&data).unwrap();
	let before = writer.written_bytes().unwrap().to_vec();

	let hint = usize::from(hint) + writer.free_capacity() + 1;
	writer.get_span(hint).unwrap();
	qc_assert_eq!(writer.written_bytes().unwrap(), &before[..])
}

#[quickcheck]
fn io_write_matches_slices(chunks: Vec<Vec<u8>>) -> TestResult {
	let mut writer = SpanWriter::<u8>::default();
	let slices = chunks.iter()
					   .map(|chunk| IoSlice::new(chunk))
					   .collect::<Vec<_>>();
	let written = writer.write_vectored(&slices).unwrap();
	writer.flush().unwrap();
	let expected = chunks.concat();
	if written != expected.len() {
		return TestResult::error(format!("wrote {written} of {} bytes", expected.len()))
	}

	qc_assert_eq!(writer.written_span().unwrap(), &expected[..])
}

mod bytes {
	use quickcheck::TestResult;
	use quickcheck_macros::quickcheck;
	use span_writer::SpanWriter;
	use super::common;

	macro_rules! gen {
		($($ty:ident)+) => {
			$(
			paste::paste! {
				#[quickcheck]
				fn [<written_bytes_ $ty>](values: Vec<$ty>) -> TestResult {
					let mut writer = SpanWriter::<$ty>::default();
					for &value in &values {
						writer.write(value).unwrap();
					}
					qc_assert_eq!(
						writer.written_bytes().unwrap(),
						bytemuck::cast_slice::<$ty, u8>(&values)
					)
				}
			}
			)+
		};
	}

	gen! { u8 i16 u32 i64 f32 f64 u128 }
}
