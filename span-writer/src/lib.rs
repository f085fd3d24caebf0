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

//! ## How it works
//!
//! A [`SpanWriter`] appends items to a single contiguous *block* of memory rented
//! from a *pool*. Items can be written directly, or space can be *reserved* with
//! [`get_span`](SpanWriter::get_span), filled by the caller, then *committed* with
//! [`advance`](SpanWriter::advance). Everything written so far is available as
//! one slice from [`written_span`](SpanWriter::written_span).
//!
//! When a reservation doesn't fit, the writer grows: a larger block is rented, the
//! written items are copied into it, and the old block is returned to the pool.
//! How much larger is decided by the writer's [growth policy](GrowthPolicy), either
//! a fixed increment or a multiple of the current capacity, optionally rounded up
//! to a power of two.
//!
//! ### Pools
//!
//! Blocks are uniquely owned. Returning a block to the pool moves it, so a writer
//! can never read a block after giving it back, and a block is never returned
//! twice. The default pool keeps returned blocks in power-of-two buckets for the
//! next writer to rent. It has two modes: with the `shared-pool` feature there is
//! one pool per item type for the whole process, wrapped in an `Arc<Mutex<...>>`;
//! otherwise each thread has its own pool in a `RefCell`. The latter is faster.
//!
//! ### Disposal
//!
//! A writer returns its block when dropped, or when [disposed](SpanWriter::dispose)
//! explicitly. Disposal is idempotent. Any access after disposal fails with
//! [`ObjectDisposed`](ErrorKind::ObjectDisposed) rather than reading freed memory.
//!
//! ```
//! use span_writer::SpanWriter;
//!
//! let mut writer = SpanWriter::<u32>::with_capacity(5)?;
//! for i in 0..1000 {
//!     writer.write(i)?;
//! }
//! assert_eq!(writer.written_span()?.len(), 1000);
//!
//! let span = writer.get_span(2)?;
//! span[0] = 1000;
//! span[1] = 1001;
//! writer.advance(2)?;
//! assert_eq!(writer.written_span()?[1000..], [1000, 1001]);
//! # Ok::<_, span_writer::Error>(())
//! ```

mod buffer_writer;
mod element;
mod error;
mod growth;
pub mod pool;
mod std_io;
mod writer;

pub use buffer_writer::*;
pub use element::*;
pub use error::*;
pub use growth::*;
pub use writer::*;

/// The default reservation size, substituted for a size hint of `0`.
pub const DEFAULT_SIZE_HINT: usize = 8;
