// SPDX-License-Identifier: Apache-2.0

use crate::element::Element;
use crate::error::Result;
use crate::pool::Pool;
use crate::SpanWriter;

/// The reserve, write, advance protocol. Consumers such as encoders can write
/// through any implementation without knowing how it grows:
///
/// ```
/// use span_writer::{BufferWriter, SpanWriter};
///
/// fn put_varint(writer: &mut impl BufferWriter<u8>, mut value: u64) -> span_writer::Result {
///     let span = writer.get_span(10)?;
///     let mut n = 0;
///     loop {
///         let byte = (value & 0x7F) as u8;
///         value >>= 7;
///         if value == 0 {
///             span[n] = byte;
///             n += 1;
///             break
///         }
///         span[n] = byte | 0x80;
///         n += 1;
///     }
///     writer.advance(n)
/// }
///
/// let mut writer = SpanWriter::default();
/// put_varint(&mut writer, 300)?;
/// assert_eq!(writer.written_span()?, &[0xAC, 0x02]);
/// # Ok::<_, span_writer::Error>(())
/// ```
pub trait BufferWriter<T: Element> {
	/// Returns a mutable slice of at least `size_hint` uncommitted items. A hint of
	/// `0` requests a non-empty slice of any length.
	fn get_span(&mut self, size_hint: usize) -> Result<&mut [T]>;

	/// Commits `count` items written to the last returned slice.
	fn advance(&mut self, count: usize) -> Result;

	/// Appends a slice of items.
	fn write_slice(&mut self, items: &[T]) -> Result {
		let len = items.len();
		self.get_span(len)?[..len].copy_from_slice(items);
		self.advance(len)
	}
}

impl<T: Element, P: Pool<T>> BufferWriter<T> for SpanWriter<T, P> {
	#[inline]
	fn get_span(&mut self, size_hint: usize) -> Result<&mut [T]> {
		SpanWriter::get_span(self, size_hint)
	}

	#[inline]
	fn advance(&mut self, count: usize) -> Result {
		SpanWriter::advance(self, count)
	}

	#[inline]
	fn write_slice(&mut self, items: &[T]) -> Result {
		SpanWriter::write_slice(self, items)
	}
}
