// SPDX-License-Identifier: Apache-2.0

use std::io;
use std::io::{IoSlice, Write};
use crate::pool::Pool;
use crate::SpanWriter;

/// Writes bytes to the end of the writer. Writes always consume the whole input
/// unless the writer fails to grow or has been disposed.
impl<P: Pool<u8>> Write for SpanWriter<u8, P> {
	fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
		self.write_slice(buf)?;
		Ok(buf.len())
	}

	fn write_vectored(&mut self, bufs: &[IoSlice<'_>]) -> io::Result<usize> {
		let len = bufs.iter().map(|buf| buf.len()).sum();
		// Reserve once up front so the slices are copied without intermediate growth.
		self.get_span(len)?;
		for buf in bufs {
			self.write_slice(buf)?;
		}
		Ok(len)
	}

	fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
		Ok(self.write_slice(buf)?)
	}

	fn flush(&mut self) -> io::Result<()> { Ok(()) }
}
